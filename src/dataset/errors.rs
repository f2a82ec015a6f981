use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while resolving classes or building a sample catalog.
///
/// None of these are retried; a failed build never yields a partial catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// No class label source was configured at all.
    #[error("No class label source configured; set {env} or pass the classes explicitly")]
    NoClassSource {
        /// Environment variable consulted by the configuration layer.
        env: &'static str,
    },
    /// The class label file exists but could not be read.
    #[error("Failed to read class labels from {path}: {source}")]
    ReadClassFile {
        /// Label file path.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// Annotation mode needs a class list resolved up front.
    #[error("Annotation file {ann_file} requires an explicit class list")]
    AnnotationWithoutClasses {
        /// Annotation file that was requested.
        ann_file: String,
    },
    /// No folder under the data root held a single valid file.
    #[error("Found 0 files in subfolders of: {root}. Supported extensions are: {extensions}")]
    NoSamples {
        /// Data root that was scanned.
        root: String,
        /// Comma-separated allowed extensions.
        extensions: String,
    },
    /// The pre-resolved class list cannot be reconciled with the folder layout.
    #[error(
        "The number of subfolders ({folders}) doesn't match the number of specified classes ({classes}). Please check the data folder."
    )]
    FolderCountMismatch {
        /// Number of discovered class folders.
        folders: usize,
        /// Number of pre-resolved classes.
        classes: usize,
    },
    /// A line in the annotation file could not be parsed.
    #[error("Invalid annotation at {path}:{line}: {reason}")]
    InvalidAnnotation {
        /// Annotation file path.
        path: String,
        /// 1-based line number.
        line: usize,
        /// What was wrong with the line.
        reason: String,
    },
    /// File access failed.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: String,
        /// Underlying IO error.
        source: std::io::Error,
    },
}

/// Coarse classification of [`CatalogError`] values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CatalogErrorKind {
    /// Missing or unusable configuration.
    Configuration,
    /// Nothing usable found under the data root.
    Discovery,
    /// Class list and folder layout disagree.
    Consistency,
    /// Malformed annotation file.
    Annotation,
    /// Storage backend failure.
    Io,
}

impl CatalogError {
    /// Classify this error.
    pub fn kind(&self) -> CatalogErrorKind {
        match self {
            Self::NoClassSource { .. }
            | Self::ReadClassFile { .. }
            | Self::AnnotationWithoutClasses { .. } => CatalogErrorKind::Configuration,
            Self::NoSamples { .. } => CatalogErrorKind::Discovery,
            Self::FolderCountMismatch { .. } => CatalogErrorKind::Consistency,
            Self::InvalidAnnotation { .. } => CatalogErrorKind::Annotation,
            Self::Io { .. } => CatalogErrorKind::Io,
        }
    }
}
