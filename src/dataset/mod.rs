//! Labeled image sample catalogs.
//!
//! A catalog is built either by scanning one subfolder per class under a data
//! root, or by reading an annotation file of `path label` lines. Class ids
//! follow the sorted class names so they stay compatible with a trained
//! model across runs.

mod annotation;
mod catalog;
mod classes;
mod discovery;
mod errors;
mod file_client;
mod sample;

pub use annotation::{load_annotations, split_annotation_line};
pub use catalog::{SampleCatalog, SampleCatalogBuilder, SampleSource};
pub use classes::{ClassRegistry, ClassSource};
pub use discovery::{
    DEFAULT_EXTENSIONS, ExtensionFilter, FolderIndex, FolderScan, find_folders, get_samples,
};
pub use errors::{CatalogError, CatalogErrorKind};
pub use file_client::{FileClient, LineReader, LocalFileClient};
pub use sample::{DataInfo, Sample, SampleLabel};
