use std::collections::{BTreeMap, BTreeSet};

use super::errors::CatalogError;
use super::file_client::FileClient;
use super::sample::{Sample, SampleLabel};

/// Image extensions accepted when none are configured.
pub const DEFAULT_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".ppm", ".bmp", ".pgm", ".tif"];

/// Folder name -> class id, assigned in sorted folder-name order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FolderIndex {
    folders: BTreeMap<String, usize>,
}

impl FolderIndex {
    /// Assign ids to folder names by their sorted position.
    pub fn from_folders<I, S>(folders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: BTreeSet<String> = folders.into_iter().map(Into::into).collect();
        let folders = names
            .into_iter()
            .enumerate()
            .map(|(idx, name)| (name, idx))
            .collect();
        Self { folders }
    }

    /// Folder names in class-id order.
    pub fn folder_names(&self) -> Vec<String> {
        self.folders.keys().cloned().collect()
    }

    pub fn class_id(&self, folder: &str) -> Option<usize> {
        self.folders.get(folder).copied()
    }

    pub fn len(&self) -> usize {
        self.folders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }

    /// Iterate `(folder, class id)` in sorted folder order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.folders.iter().map(|(name, id)| (name.as_str(), *id))
    }
}

/// Case-insensitive filename suffix filter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtensionFilter {
    extensions: BTreeSet<String>,
}

impl ExtensionFilter {
    /// Lower-case and de-duplicate the allowed extensions.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|ext| ext.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// True when the lower-cased name ends with an allowed extension.
    pub fn is_valid_file(&self, filename: &str) -> bool {
        let lower = filename.to_lowercase();
        self.extensions.iter().any(|ext| lower.ends_with(ext.as_str()))
    }

    /// Allowed extensions in sorted order.
    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(String::as_str)
    }

    /// Comma-separated listing for messages.
    pub fn describe(&self) -> String {
        self.extensions().collect::<Vec<_>>().join(", ")
    }
}

impl Default for ExtensionFilter {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSIONS)
    }
}

/// List the class folders under `root` and index them by sorted name.
pub fn find_folders<C: FileClient + ?Sized>(
    client: &C,
    root: &str,
) -> Result<FolderIndex, CatalogError> {
    Ok(FolderIndex::from_folders(client.list_dirs(root)?))
}

/// Samples found under the class folders plus the folders that had none.
#[derive(Clone, Debug, Default)]
pub struct FolderScan {
    pub samples: Vec<Sample>,
    pub empty_folders: BTreeSet<String>,
}

/// Walk every indexed folder and keep the files accepted by `filter`.
///
/// Folders and files are both visited in sorted order, so the result only
/// depends on what is stored, never on listing order.
pub fn get_samples<C: FileClient + ?Sized>(
    client: &C,
    root: &str,
    index: &FolderIndex,
    filter: &ExtensionFilter,
) -> Result<FolderScan, CatalogError> {
    let mut scan = FolderScan::default();
    for (folder, class_id) in index.iter() {
        let dir = client.join_path(root, folder);
        let mut files = client.list_files_recursive(&dir)?;
        files.sort();
        let before = scan.samples.len();
        for file in files.iter().filter(|file| filter.is_valid_file(file)) {
            scan.samples.push(Sample {
                path: client.join_path(folder, file),
                label: SampleLabel::Class(class_id),
            });
        }
        if scan.samples.len() == before {
            scan.empty_folders.insert(folder.to_string());
        }
    }
    Ok(scan)
}
