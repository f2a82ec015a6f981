//! Single-image classification with labeled, optionally top-K, scores.

mod format;

use std::path::PathBuf;

use image::DynamicImage;
use ndarray::{Array2, ArrayView4};
use thiserror::Error;
use tracing::debug;

use crate::pipeline::{Pipeline, PipelineError, PipelineInput, collate};

pub use format::{ScoreMap, format_scores};

/// Errors raised while classifying an image.
#[derive(Debug, Error)]
pub enum InferenceError {
    /// Preprocessing failed.
    #[error("Preprocessing failed: {0}")]
    Pipeline(#[from] PipelineError),
    /// The classifier itself failed.
    #[error("Classifier failed: {0}")]
    Classifier(String),
    /// Scores and labels do not line up.
    #[error("Score shape mismatch: {0}")]
    ShapeMismatch(String),
}

/// A trained classifier: ordered class labels plus a batched forward pass.
pub trait Classifier {
    /// Labels in class-id order.
    fn classes(&self) -> &[String];

    /// Score a `[batch, channels, height, width]` tensor, one row per example.
    fn forward(&self, batch: ArrayView4<'_, f32>) -> Result<Array2<f32>, String>;
}

/// What to classify.
#[derive(Clone, Debug)]
pub enum InferenceInput {
    /// Path of an image file.
    Path(PathBuf),
    /// A decoded image.
    Image(DynamicImage),
}

impl From<InferenceInput> for PipelineInput {
    fn from(input: InferenceInput) -> Self {
        match input {
            InferenceInput::Path(filename) => PipelineInput::File {
                img_prefix: None,
                filename,
            },
            InferenceInput::Image(image) => PipelineInput::Image(image),
        }
    }
}

/// Preprocess `input`, run `classifier` on it and label the scores.
pub fn inference_model<C: Classifier + ?Sized>(
    classifier: &C,
    pipeline: &Pipeline,
    input: InferenceInput,
    top_k: Option<usize>,
) -> Result<ScoreMap, InferenceError> {
    let tensor = pipeline.run(input.into())?;
    let batch = collate(tensor);
    debug!(shape = ?batch.shape(), "Running classifier");
    let scores = classifier
        .forward(batch.view())
        .map_err(InferenceError::Classifier)?;
    format_scores(scores.view(), classifier.classes(), top_k)
}
