//! Dataset evaluation.

use crate::errors::{OptimizerError, OptimizerResult};
use crate::metrics::Metric;
use weft_data::{Example, Prediction};
use weft_module::Program;
use weft_signature::ValueMap;

/// Keys treated as ground truth and excluded from the input view.
const ANSWER_KEYS: [&str; 3] = ["answer", "output", "result"];

/// Evaluation summary over a dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub average_score: f64,
    pub scores: Vec<f64>,
    pub total: usize,
}

/// Run `program` over every example and score its outputs.
///
/// Failed runs score 0.0; unknown-metric errors propagate. An empty
/// dataset is an explicit error, never a silent undefined average.
pub fn evaluate(
    program: &dyn Program,
    dataset: &[Example],
    metric: &Metric,
) -> OptimizerResult<Evaluation> {
    if dataset.is_empty() {
        return Err(OptimizerError::EmptyDataset);
    }
    let mut scores = Vec::with_capacity(dataset.len());
    for example in dataset {
        let inputs = input_view(example);
        let score = match program.call(inputs) {
            Ok(output) => metric.score(&Prediction::new(output.outputs), example)?,
            Err(err) => {
                tracing::debug!(error = %err, "evaluation run failed, scoring 0");
                0.0
            }
        };
        scores.push(score);
    }
    let average_score = scores.iter().sum::<f64>() / scores.len() as f64;
    Ok(Evaluation {
        average_score,
        scores,
        total: dataset.len(),
    })
}

/// Input-only view of an example: the partitioned inputs minus
/// recognized answer keys.
pub(crate) fn input_view(example: &Example) -> ValueMap {
    example
        .inputs()
        .iter()
        .filter(|(key, _)| !ANSWER_KEYS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
