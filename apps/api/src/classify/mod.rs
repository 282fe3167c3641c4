// Story classification: text → encoder embedding → frozen SVC decision → binary label.
// One encoder/classifier pair is loaded per criterion at startup and shared read-only.

pub mod encoder;
pub mod handlers;
pub mod pipeline;
pub mod svc;

use thiserror::Error;

pub use pipeline::{Criterion, Prediction, StoryClassifier};

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("failed to load model artifact: {0}")]
    ModelLoad(String),

    #[error("tokenization failed: {0}")]
    Tokenization(String),

    #[error("onnx runtime error: {0}")]
    Runtime(String),

    #[error("unexpected encoder output: {0}")]
    UnexpectedOutput(String),

    #[error("embedding has {actual} dimensions, classifier expects {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
}
