//! Transformer encoder — turns a user story into a fixed-size embedding.
//!
//! The model is a BERT-family encoder exported to ONNX next to its `tokenizer.json`.
//! The embedding is the attention-masked mean of the last hidden state.

use std::path::Path;
use std::sync::Mutex;

use ort::{
    inputs,
    session::{builder::GraphOptimizationLevel, Session},
    value::Tensor,
};
use tokenizers::{Tokenizer, TruncationParams};
use tracing::{debug, info};

use super::InferenceError;

pub const MODEL_FILE: &str = "model.onnx";
pub const TOKENIZER_FILE: &str = "tokenizer.json";

/// Maps text to a fixed-dimensional vector. Implementations must be deterministic.
pub trait Encoder: Send + Sync {
    fn encode(&self, text: &str) -> Result<Vec<f32>, InferenceError>;
}

/// ONNX Runtime encoder. A session only runs one inference at a time, hence the mutex.
pub struct OnnxEncoder {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    /// DistilBERT graphs take no `token_type_ids` input; BERT graphs require it.
    uses_token_type_ids: bool,
}

impl OnnxEncoder {
    /// Loads `model.onnx` and `tokenizer.json` from `dir`.
    /// Sequences longer than `max_length` tokens are truncated (special tokens kept).
    pub fn load(dir: &Path, max_length: usize) -> Result<Self, InferenceError> {
        let model_path = dir.join(MODEL_FILE);
        let tokenizer_path = dir.join(TOKENIZER_FILE);
        info!("Loading encoder from {}", model_path.display());

        if !model_path.is_file() {
            return Err(InferenceError::ModelLoad(format!(
                "{} not found",
                model_path.display()
            )));
        }

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path).map_err(|e| {
            InferenceError::ModelLoad(format!("{}: {e}", tokenizer_path.display()))
        })?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length,
                ..Default::default()
            }))
            .map_err(|e| InferenceError::ModelLoad(format!("invalid truncation: {e}")))?;
        tokenizer.with_padding(None);

        let load_err = |e: &dyn std::fmt::Display| {
            InferenceError::ModelLoad(format!("{}: {e}", model_path.display()))
        };
        let session = Session::builder()
            .map_err(|e| load_err(&e))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| load_err(&e))?
            .commit_from_file(&model_path)
            .map_err(|e| load_err(&e))?;

        let uses_token_type_ids = session
            .inputs
            .iter()
            .any(|input| input.name == "token_type_ids");
        debug!("Encoder graph takes token_type_ids: {uses_token_type_ids}");

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            uses_token_type_ids,
        })
    }
}

impl Encoder for OnnxEncoder {
    fn encode(&self, text: &str) -> Result<Vec<f32>, InferenceError> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| InferenceError::Tokenization(e.to_string()))?;

        let mask: Vec<u32> = encoding.get_attention_mask().to_vec();
        let n_tokens = mask.len();
        debug!("Encoding {} chars as {} tokens", text.len(), n_tokens);

        let to_i64 = |values: &[u32]| values.iter().map(|&v| v as i64).collect::<Vec<i64>>();
        let runtime = |e: ort::Error| InferenceError::Runtime(e.to_string());

        let input_ids = Tensor::from_array((vec![1, n_tokens], to_i64(encoding.get_ids())))
            .map_err(runtime)?;
        let attention_mask =
            Tensor::from_array((vec![1, n_tokens], to_i64(&mask))).map_err(runtime)?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| InferenceError::Runtime("encoder session lock poisoned".to_string()))?;

        let outputs = if self.uses_token_type_ids {
            let token_type_ids =
                Tensor::from_array((vec![1, n_tokens], to_i64(encoding.get_type_ids())))
                    .map_err(runtime)?;
            session.run(inputs![
                "input_ids" => input_ids,
                "attention_mask" => attention_mask,
                "token_type_ids" => token_type_ids
            ])
        } else {
            session.run(inputs![
                "input_ids" => input_ids,
                "attention_mask" => attention_mask
            ])
        }
        .map_err(runtime)?;

        let (_, hidden_state) = outputs
            .iter()
            .next()
            .ok_or_else(|| InferenceError::UnexpectedOutput("model produced no outputs".to_string()))?;
        let (shape, data) = hidden_state.try_extract_tensor::<f32>().map_err(runtime)?;
        let dims: Vec<usize> = shape.iter().map(|&d| d as usize).collect();

        pool_output(&dims, data, &mask)
    }
}

/// Reduces the first model output to one embedding. Token-level `[1, seq, hidden]` states
/// are mean-pooled; an already pooled `[1, hidden]` output is returned as is.
pub fn pool_output(
    dims: &[usize],
    data: &[f32],
    attention_mask: &[u32],
) -> Result<Vec<f32>, InferenceError> {
    match dims {
        [1, seq_len, hidden_size] => mean_pool(data, attention_mask, *seq_len, *hidden_size),
        [1, hidden_size] if data.len() == *hidden_size => Ok(data.to_vec()),
        other => Err(InferenceError::UnexpectedOutput(format!(
            "expected [1, seq, hidden] or [1, hidden], got {other:?}"
        ))),
    }
}

/// Averages the `[seq_len, hidden_size]` row-major hidden states over tokens whose mask is 1.
pub fn mean_pool(
    hidden_states: &[f32],
    attention_mask: &[u32],
    seq_len: usize,
    hidden_size: usize,
) -> Result<Vec<f32>, InferenceError> {
    if hidden_size == 0 || hidden_states.len() != seq_len * hidden_size {
        return Err(InferenceError::UnexpectedOutput(format!(
            "hidden state has {} values, expected {seq_len}x{hidden_size}",
            hidden_states.len()
        )));
    }
    if attention_mask.len() != seq_len {
        return Err(InferenceError::UnexpectedOutput(format!(
            "attention mask covers {} tokens, hidden state has {seq_len}",
            attention_mask.len()
        )));
    }

    let mut pooled = vec![0.0f32; hidden_size];
    let mut counted = 0usize;
    for (token, row) in hidden_states.chunks_exact(hidden_size).enumerate() {
        if attention_mask[token] == 0 {
            continue;
        }
        counted += 1;
        for (acc, value) in pooled.iter_mut().zip(row) {
            *acc += value;
        }
    }

    let divisor = counted.max(1) as f32;
    for value in &mut pooled {
        *value /= divisor;
    }
    Ok(pooled)
}
