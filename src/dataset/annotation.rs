use super::errors::CatalogError;
use super::file_client::LineReader;
use super::sample::{Sample, SampleLabel};

/// Split an annotation line into `(path, label)` on its last whitespace run.
///
/// Paths may contain spaces; the label is always the final token. Returns
/// `None` when the trimmed line has no whitespace to split on.
pub fn split_annotation_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    let split = line.rfind(char::is_whitespace)?;
    let path = line[..split].trim_end();
    let label = line[split..].trim_start();
    Some((path, label))
}

/// Read `(path, numeric label)` samples from an annotation file.
///
/// Blank lines are skipped. A line without a label or with a non-integer
/// label fails the whole load.
pub fn load_annotations<R: LineReader + ?Sized>(
    reader: &R,
    ann_file: &str,
) -> Result<Vec<Sample>, CatalogError> {
    let lines = reader.read_lines(ann_file)?;
    let mut samples = Vec::with_capacity(lines.len());
    for (idx, line) in lines.iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let invalid = |reason: String| CatalogError::InvalidAnnotation {
            path: ann_file.to_string(),
            line: idx + 1,
            reason,
        };
        let (path, label) = split_annotation_line(line)
            .ok_or_else(|| invalid(format!("missing label in {:?}", line.trim())))?;
        let value = label
            .parse::<i64>()
            .map_err(|err| invalid(format!("label {label:?} is not an integer: {err}")))?;
        samples.push(Sample {
            path: path.to_string(),
            label: SampleLabel::Raw(value),
        });
    }
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_last_whitespace_run() {
        assert_eq!(
            split_annotation_line("some dir/a b.png 3"),
            Some(("some dir/a b.png", "3"))
        );
        assert_eq!(
            split_annotation_line("  folder_1/xxx.png \t 12  "),
            Some(("folder_1/xxx.png", "12"))
        );
    }

    #[test]
    fn line_without_whitespace_has_no_label() {
        assert_eq!(split_annotation_line("lonely.png"), None);
        assert_eq!(split_annotation_line("   "), None);
    }
}
