use std::path::Path;

use serde::Serialize;
use tracing::info;

use super::encoder::{Encoder, OnnxEncoder};
use super::svc::{SvcModel, CLASSIFIER_FILE};
use super::InferenceError;

/// A quality criterion a user story is judged against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    WellFormed,
    Ambiguity,
}

impl Criterion {
    /// Directory under the model root holding this criterion's artifacts.
    pub fn artifact_dir(self) -> &'static str {
        match self {
            Criterion::WellFormed => "well_formed",
            Criterion::Ambiguity => "ambiguity",
        }
    }

    /// Human-readable outcome for a label. Label 1 is the passing side for both criteria.
    pub fn outcome_text(self, label: u8) -> &'static str {
        match (self, label) {
            (Criterion::WellFormed, 1) => "Well-formed",
            (Criterion::WellFormed, _) => "Not well-formed",
            (Criterion::Ambiguity, 1) => "Unambiguous",
            (Criterion::Ambiguity, _) => "Ambiguous",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub label: u8,
    pub outcome_text: String,
}

impl Prediction {
    pub fn new(criterion: Criterion, label: u8) -> Self {
        Self {
            label,
            outcome_text: criterion.outcome_text(label).to_string(),
        }
    }
}

/// Text in, binary prediction out. Carried in `AppState` as `Arc<dyn StoryClassifier>`
/// so handlers never see the encoder or the decision boundary.
pub trait StoryClassifier: Send + Sync {
    fn criterion(&self) -> Criterion;

    fn predict(&self, user_story: &str) -> Result<Prediction, InferenceError>;
}

/// Encoder embedding fed into a frozen SVC.
pub struct EmbeddingClassifier<E> {
    criterion: Criterion,
    encoder: E,
    svc: SvcModel,
}

impl<E: Encoder> EmbeddingClassifier<E> {
    pub fn new(criterion: Criterion, encoder: E, svc: SvcModel) -> Self {
        Self {
            criterion,
            encoder,
            svc,
        }
    }
}

impl<E: Encoder> StoryClassifier for EmbeddingClassifier<E> {
    fn criterion(&self) -> Criterion {
        self.criterion
    }

    fn predict(&self, user_story: &str) -> Result<Prediction, InferenceError> {
        let features = self.encoder.encode(user_story)?;
        let label = self.svc.predict(&features)?;
        let prediction = Prediction::new(self.criterion, label);
        info!(
            criterion = ?self.criterion,
            "Prediction: {}", prediction.outcome_text
        );
        Ok(prediction)
    }
}

/// Loads `<model_dir>/<criterion>/{model.onnx, tokenizer.json, classifier.json}`.
pub fn load_classifier(
    model_dir: &Path,
    criterion: Criterion,
    max_sequence_length: usize,
) -> Result<EmbeddingClassifier<OnnxEncoder>, InferenceError> {
    let dir = model_dir.join(criterion.artifact_dir());
    let svc = SvcModel::load(&dir.join(CLASSIFIER_FILE))?;
    let encoder = OnnxEncoder::load(&dir, max_sequence_length)?;
    info!(
        "Loaded {:?} classifier ({:?} kernel, {} features)",
        criterion,
        svc.kernel,
        svc.dimension()
    );
    Ok(EmbeddingClassifier::new(criterion, encoder, svc))
}
