use std::cmp::Reverse;

use ndarray::ArrayView2;
use ordered_float::OrderedFloat;
use serde::ser::{Serialize, SerializeMap, Serializer};

use super::InferenceError;

/// Class label -> score, in a meaningful order (class-id order for full
/// results, descending score for top-K).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScoreMap {
    entries: Vec<(String, f64)>,
}

impl ScoreMap {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Score of a label, if present.
    pub fn get(&self, label: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(name, _)| name == label)
            .map(|(_, score)| *score)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(name, score)| (name.as_str(), *score))
    }

    /// Labels in result order.
    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// JSON object with keys in result order.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl Serialize for ScoreMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, score) in &self.entries {
            map.serialize_entry(name, score)?;
        }
        map.end()
    }
}

/// Map the first row of `scores` onto `labels`.
///
/// Without `top_k`, every class is returned in class-id order. With `top_k`,
/// the `k` best classes are returned best first; equal scores keep ascending
/// class-id order. `k` beyond the class count returns every class.
pub fn format_scores(
    scores: ArrayView2<'_, f32>,
    labels: &[String],
    top_k: Option<usize>,
) -> Result<ScoreMap, InferenceError> {
    if scores.nrows() == 0 {
        return Err(InferenceError::ShapeMismatch(
            "classifier returned no score rows".into(),
        ));
    }
    let row = scores.row(0);
    if row.len() > labels.len() {
        return Err(InferenceError::ShapeMismatch(format!(
            "{} scores for {} class labels",
            row.len(),
            labels.len()
        )));
    }
    let mut order: Vec<usize> = (0..row.len()).collect();
    if let Some(k) = top_k {
        order.sort_by_key(|&idx| (Reverse(OrderedFloat(row[idx])), idx));
        order.truncate(k);
    }
    let entries = order
        .into_iter()
        .map(|idx| (labels[idx].clone(), f64::from(row[idx])))
        .collect();
    Ok(ScoreMap { entries })
}
