/// Label attached to a catalog sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SampleLabel {
    /// Class id assigned by folder discovery.
    Class(usize),
    /// Numeric label taken verbatim from an annotation file.
    Raw(i64),
}

impl SampleLabel {
    /// Ground-truth label as stored in per-sample records.
    pub fn as_i64(self) -> i64 {
        match self {
            Self::Class(id) => id as i64,
            Self::Raw(value) => value,
        }
    }

    /// Class id when the label indexes into a registry of `classes` entries.
    pub fn class_id(self, classes: usize) -> Option<usize> {
        let id = match self {
            Self::Class(id) => id,
            Self::Raw(value) => usize::try_from(value).ok()?,
        };
        (id < classes).then_some(id)
    }
}

/// One labeled file, path relative to the data root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sample {
    pub path: String,
    pub label: SampleLabel,
}

/// Per-sample record handed to the preprocessing pipeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataInfo {
    /// Directory the filename is relative to.
    pub img_prefix: Option<String>,
    pub filename: String,
    pub gt_label: i64,
}
