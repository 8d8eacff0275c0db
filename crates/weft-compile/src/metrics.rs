//! Scoring metrics for predictions against ground truth.

use crate::errors::{OptimizerError, OptimizerResult};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use weft_data::{Example, Prediction};
use weft_signature::ValueMap;

/// Custom scoring function over the prediction's and ground truth's
/// merged data views.
pub type MetricFn = Arc<dyn Fn(&ValueMap, &ValueMap) -> f64 + Send + Sync>;

/// Selectable scoring metric.
///
/// `Confidence` and `Consistency` are illustrative heuristics blending
/// exact-match with fixed offsets; they are documented placeholders, not
/// calibrated probabilities. Unknown names resolve to `Named` and fail
/// only when first used for scoring.
#[derive(Clone)]
pub enum Metric {
    ExactMatch,
    F1,
    /// Alias of `ExactMatch`.
    Accuracy,
    Confidence,
    Consistency,
    /// Unresolved name; errors at first scoring use.
    Named(String),
    Custom(MetricFn),
}

impl Metric {
    /// Resolve a metric by name. Unknown identifiers are deferred, not
    /// rejected here.
    pub fn from_name(name: &str) -> Self {
        match name {
            "exact_match" => Metric::ExactMatch,
            "f1" => Metric::F1,
            "accuracy" => Metric::Accuracy,
            "confidence" => Metric::Confidence,
            "consistency" => Metric::Consistency,
            other => Metric::Named(other.to_string()),
        }
    }

    /// Score a prediction against its ground-truth example in `[0, 1]`.
    pub fn score(&self, prediction: &Prediction, truth: &Example) -> OptimizerResult<f64> {
        let predicted = scoring_view(&prediction.to_example());
        let expected = scoring_view(truth);
        let exact = || -> f64 {
            match (extract_answer(&predicted), extract_answer(&expected)) {
                (Some(p), Some(t)) => exact_match(&p, &t),
                _ => 0.0,
            }
        };
        match self {
            Metric::ExactMatch | Metric::Accuracy => Ok(exact()),
            Metric::F1 => {
                match (extract_answer(&predicted), extract_answer(&expected)) {
                    (Some(p), Some(t)) => Ok(f1(&p, &t)),
                    _ => Ok(0.0),
                }
            }
            // Placeholder heuristics: exact hits score high, misses low.
            Metric::Confidence => Ok(if exact() == 1.0 { 0.9 } else { 0.1 }),
            Metric::Consistency => Ok(if exact() == 1.0 { 0.85 } else { 0.15 }),
            Metric::Named(name) => Err(OptimizerError::UnknownMetric(name.clone())),
            Metric::Custom(f) => Ok(f(&predicted, &expected)),
        }
    }
}

impl fmt::Debug for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Metric::ExactMatch => "exact_match",
            Metric::F1 => "f1",
            Metric::Accuracy => "accuracy",
            Metric::Confidence => "confidence",
            Metric::Consistency => "consistency",
            Metric::Named(name) => name,
            Metric::Custom(_) => "custom",
        };
        write!(f, "Metric({})", name)
    }
}

/// Merged view used for scoring: raw fields overlaid with the stripped
/// label view, so `answer_output` and bare `answer` both resolve as
/// `answer`.
fn scoring_view(example: &Example) -> ValueMap {
    let mut view = example.to_map();
    for (key, value) in example.labels() {
        view.insert(key.clone(), value.clone());
    }
    view
}

/// Extract the answer value with the fixed priority `answer` ->
/// `output` -> `result` -> first value in the map.
pub fn extract_answer(map: &ValueMap) -> Option<String> {
    for key in ["answer", "output", "result"] {
        if let Some(value) = map.get(key) {
            return Some(render(value));
        }
    }
    map.values().next().map(render)
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Case-insensitive, whitespace-trimmed string equality. 1.0 or 0.0.
fn exact_match(predicted: &str, expected: &str) -> f64 {
    if predicted.trim().to_lowercase() == expected.trim().to_lowercase() {
        1.0
    } else {
        0.0
    }
}

/// Token-level F1 after lowercasing and punctuation-stripping
/// tokenization. 0.0 if either side tokenizes empty.
fn f1(predicted: &str, expected: &str) -> f64 {
    let predicted = tokenize(predicted);
    let expected = tokenize(expected);
    if predicted.is_empty() || expected.is_empty() {
        return 0.0;
    }
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for token in &expected {
        *counts.entry(token.as_str()).or_insert(0) += 1;
    }
    let mut overlap = 0usize;
    for token in &predicted {
        if let Some(count) = counts.get_mut(token.as_str()) {
            if *count > 0 {
                *count -= 1;
                overlap += 1;
            }
        }
    }
    if overlap == 0 {
        return 0.0;
    }
    let precision = overlap as f64 / predicted.len() as f64;
    let recall = overlap as f64 / expected.len() as f64;
    2.0 * precision * recall / (precision + recall)
}

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn prediction(answer: &str) -> Prediction {
        Prediction::new(
            [("answer".to_string(), json!(answer))].into_iter().collect(),
        )
    }

    fn truth(answer: &str) -> Example {
        Example::default().with("answer", json!(answer))
    }

    #[test]
    fn test_exact_match_case_insensitive() {
        let metric = Metric::ExactMatch;
        assert_eq!(metric.score(&prediction("Paris"), &truth("paris")).unwrap(), 1.0);
        assert_eq!(metric.score(&prediction("Rome"), &truth("Paris")).unwrap(), 0.0);
        assert_eq!(metric.score(&prediction("  Paris "), &truth("paris")).unwrap(), 1.0);
    }

    #[test]
    fn test_accuracy_is_exact_match_alias() {
        assert_eq!(
            Metric::Accuracy.score(&prediction("X"), &truth("x")).unwrap(),
            1.0
        );
    }

    #[test]
    fn test_f1_partial_overlap() {
        let score = Metric::F1
            .score(&prediction("the cat sat"), &truth("the cat ran"))
            .unwrap();
        // Overlap 2 of 3 on both sides.
        assert!((score - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_f1_empty_side_is_zero() {
        assert_eq!(
            Metric::F1.score(&prediction("!!!"), &truth("words")).unwrap(),
            0.0
        );
        assert_eq!(
            Metric::F1.score(&prediction("words"), &truth("...")).unwrap(),
            0.0
        );
    }

    #[test]
    fn test_f1_punctuation_stripped() {
        assert_eq!(
            Metric::F1
                .score(&prediction("Paris, France!"), &truth("paris france"))
                .unwrap(),
            1.0
        );
    }

    #[test]
    fn test_unknown_metric_fails_at_scoring_not_construction() {
        let metric = Metric::from_name("made_up");
        assert!(matches!(metric, Metric::Named(_)));
        assert_eq!(
            metric.score(&prediction("x"), &truth("x")).unwrap_err(),
            OptimizerError::UnknownMetric("made_up".into())
        );
    }

    #[test]
    fn test_extract_answer_priority() {
        let map: ValueMap = [
            ("result".to_string(), json!("r")),
            ("output".to_string(), json!("o")),
            ("answer".to_string(), json!("a")),
        ]
        .into_iter()
        .collect();
        assert_eq!(extract_answer(&map), Some("a".to_string()));

        let map: ValueMap = [("result".to_string(), json!("r"))].into_iter().collect();
        assert_eq!(extract_answer(&map), Some("r".to_string()));

        let map: ValueMap = [("zz".to_string(), json!(5))].into_iter().collect();
        assert_eq!(extract_answer(&map), Some("5".to_string()));

        assert_eq!(extract_answer(&ValueMap::new()), None);
    }

    #[test]
    fn test_labels_with_suffix_resolve_for_truth() {
        let truth = Example::default().with("answer_output", json!("paris"));
        assert_eq!(
            Metric::ExactMatch.score(&prediction("Paris"), &truth).unwrap(),
            1.0
        );
    }

    #[test]
    fn test_confidence_and_consistency_offsets() {
        assert_eq!(
            Metric::Confidence.score(&prediction("x"), &truth("x")).unwrap(),
            0.9
        );
        assert_eq!(
            Metric::Consistency.score(&prediction("x"), &truth("y")).unwrap(),
            0.15
        );
    }

    #[test]
    fn test_custom_metric() {
        let metric = Metric::Custom(Arc::new(|predicted, _| {
            if predicted.contains_key("answer") {
                0.5
            } else {
                0.0
            }
        }));
        assert_eq!(metric.score(&prediction("x"), &truth("y")).unwrap(), 0.5);
    }
}
