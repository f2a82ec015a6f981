//! Labeled image datasets and single-image classification helpers.
/// Application directories for logs and the default config.
pub mod app_dirs;
/// Dataset config files and class-label lookup.
pub mod config;
/// Sample discovery and annotation loading.
pub mod dataset;
/// Classifier invocation and score formatting.
pub mod inference;
/// Tracing subscriber setup.
pub mod logging;
/// Image preprocessing stages.
pub mod pipeline;
