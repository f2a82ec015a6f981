use std::collections::{BTreeMap, BTreeSet};

use ndarray::Array3;
use tracing::{debug, info, warn};

use crate::pipeline::{Pipeline, PipelineError, PipelineInput};

use super::annotation::load_annotations;
use super::classes::ClassRegistry;
use super::discovery::{ExtensionFilter, FolderIndex, find_folders, get_samples};
use super::errors::CatalogError;
use super::file_client::{FileClient, LineReader};
use super::sample::{DataInfo, Sample};

/// How samples are enumerated.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SampleSource {
    /// One subfolder per class under the data root.
    #[default]
    DirectoryDiscovery,
    /// `path label` lines in the given annotation file.
    AnnotationFile(String),
}

/// Collects the inputs of a catalog build.
#[derive(Clone, Debug)]
pub struct SampleCatalogBuilder {
    data_prefix: String,
    source: SampleSource,
    extensions: ExtensionFilter,
    classes: Option<ClassRegistry>,
    test_mode: bool,
}

impl SampleCatalogBuilder {
    pub fn new(data_prefix: impl Into<String>) -> Self {
        Self {
            data_prefix: data_prefix.into(),
            source: SampleSource::default(),
            extensions: ExtensionFilter::default(),
            classes: None,
            test_mode: false,
        }
    }

    pub fn source(mut self, source: SampleSource) -> Self {
        self.source = source;
        self
    }

    pub fn extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = ExtensionFilter::new(extensions);
        self
    }

    /// Pre-resolved class list. Directory discovery then only checks that the
    /// folder count matches.
    pub fn classes(mut self, classes: ClassRegistry) -> Self {
        self.classes = Some(classes);
        self
    }

    /// Marker carried into the catalog; enumeration ignores it.
    pub fn test_mode(mut self, test_mode: bool) -> Self {
        self.test_mode = test_mode;
        self
    }

    /// Enumerate samples and validate them against the class list.
    pub fn build<C>(self, client: &C) -> Result<SampleCatalog, CatalogError>
    where
        C: FileClient + LineReader + ?Sized,
    {
        let Self {
            data_prefix,
            source,
            extensions,
            classes,
            test_mode,
        } = self;
        let (classes, folder_index, samples, empty_folders) = match &source {
            SampleSource::DirectoryDiscovery => {
                let discovered = discover(client, &data_prefix, &extensions, classes)?;
                (
                    discovered.classes,
                    Some(discovered.index),
                    discovered.samples,
                    discovered.empty_folders,
                )
            }
            SampleSource::AnnotationFile(ann_file) => {
                let classes = classes.ok_or_else(|| CatalogError::AnnotationWithoutClasses {
                    ann_file: ann_file.clone(),
                })?;
                let samples = load_annotations(client, ann_file)?;
                debug!(ann_file = %ann_file, samples = samples.len(), "Loaded annotation file");
                (classes, None, samples, BTreeSet::new())
            }
        };
        info!(
            root = %data_prefix,
            classes = classes.len(),
            samples = samples.len(),
            "Sample catalog built"
        );
        Ok(SampleCatalog {
            data_prefix,
            source,
            extensions,
            classes,
            folder_index,
            samples,
            empty_folders,
            test_mode,
        })
    }
}

struct Discovered {
    classes: ClassRegistry,
    index: FolderIndex,
    samples: Vec<Sample>,
    empty_folders: BTreeSet<String>,
}

fn discover<C: FileClient + ?Sized>(
    client: &C,
    root: &str,
    extensions: &ExtensionFilter,
    classes: Option<ClassRegistry>,
) -> Result<Discovered, CatalogError> {
    let index = find_folders(client, root)?;
    if let Some(classes) = &classes
        && classes.len() != index.len()
    {
        return Err(CatalogError::FolderCountMismatch {
            folders: index.len(),
            classes: classes.len(),
        });
    }
    let scan = get_samples(client, root, &index, extensions)?;
    if scan.samples.is_empty() {
        return Err(CatalogError::NoSamples {
            root: root.to_string(),
            extensions: extensions.describe(),
        });
    }
    if !scan.empty_folders.is_empty() {
        warn!(
            folders = %scan.empty_folders.iter().cloned().collect::<Vec<_>>().join(", "),
            extensions = %extensions.describe(),
            "Found no valid file in some class folders"
        );
    }
    let classes = classes.unwrap_or_else(|| ClassRegistry::from_names(index.folder_names()));
    Ok(Discovered {
        classes,
        index,
        samples: scan.samples,
        empty_folders: scan.empty_folders,
    })
}

/// Immutable list of labeled samples with the class list they refer to.
#[derive(Clone, Debug)]
pub struct SampleCatalog {
    data_prefix: String,
    source: SampleSource,
    extensions: ExtensionFilter,
    classes: ClassRegistry,
    folder_index: Option<FolderIndex>,
    samples: Vec<Sample>,
    empty_folders: BTreeSet<String>,
    test_mode: bool,
}

impl SampleCatalog {
    pub fn data_prefix(&self) -> &str {
        &self.data_prefix
    }

    pub fn source(&self) -> &SampleSource {
        &self.source
    }

    pub fn extensions(&self) -> &ExtensionFilter {
        &self.extensions
    }

    pub fn classes(&self) -> &ClassRegistry {
        &self.classes
    }

    /// Folder index from directory discovery; `None` in annotation mode.
    pub fn folder_index(&self) -> Option<&FolderIndex> {
        self.folder_index.as_ref()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Class folders that held no valid file.
    pub fn empty_folders(&self) -> &BTreeSet<String> {
        &self.empty_folders
    }

    pub fn test_mode(&self) -> bool {
        self.test_mode
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Record for the sample at `idx`.
    pub fn data_info(&self, idx: usize) -> Option<DataInfo> {
        self.samples.get(idx).map(|sample| DataInfo {
            img_prefix: Some(self.data_prefix.clone()),
            filename: sample.path.clone(),
            gt_label: sample.label.as_i64(),
        })
    }

    /// Records for every sample, in catalog order.
    pub fn data_infos(&self) -> Vec<DataInfo> {
        (0..self.samples.len())
            .filter_map(|idx| self.data_info(idx))
            .collect()
    }

    /// Ground-truth labels in catalog order.
    pub fn gt_labels(&self) -> Vec<i64> {
        self.samples
            .iter()
            .map(|sample| sample.label.as_i64())
            .collect()
    }

    /// Sample count per class name. Labels outside the registry are counted
    /// under their raw value.
    pub fn class_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for sample in &self.samples {
            let name = sample
                .label
                .class_id(self.classes.len())
                .and_then(|id| self.classes.name(id))
                .map(str::to_string)
                .unwrap_or_else(|| format!("<label {}>", sample.label.as_i64()));
            *counts.entry(name).or_default() += 1;
        }
        counts
    }

    /// Run `pipeline` on the sample at `idx`, returning its CHW tensor and label.
    pub fn prepare(
        &self,
        idx: usize,
        pipeline: &Pipeline,
    ) -> Result<(Array3<f32>, i64), PipelineError> {
        let info = self
            .data_info(idx)
            .ok_or(PipelineError::IndexOutOfRange {
                index: idx,
                len: self.samples.len(),
            })?;
        let tensor = pipeline.run(PipelineInput::File {
            img_prefix: info.img_prefix.map(Into::into),
            filename: info.filename.into(),
        })?;
        Ok((tensor, info.gt_label))
    }
}
