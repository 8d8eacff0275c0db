//! Bootstrap few-shot optimization.

use crate::errors::{OptimizerError, OptimizerResult};
use crate::evaluate::{evaluate, input_view};
use crate::metrics::Metric;
use crate::optimizer::Optimizer;
use weft_data::{Example, Prediction};
use weft_module::{Module, Program};

/// Limits and threshold for [`BootstrapFewShot`].
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    /// Cap on demonstrations harvested from the program's own outputs.
    pub max_bootstrapped_demos: usize,
    /// Cap on demonstrations taken verbatim from the training labels.
    pub max_labeled_demos: usize,
    /// Minimum metric score for a run to qualify as a demonstration.
    pub score_threshold: f64,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            max_bootstrapped_demos: 4,
            max_labeled_demos: 16,
            score_threshold: 1.0,
        }
    }
}

/// Optimizer that teaches a program with its own correct answers.
///
/// The unoptimized program runs over the training set; predictions that
/// score at or above the threshold become demonstrations built from the
/// example's inputs and the program's outputs. If the harvest falls
/// short, label-derived demonstrations fill in up to the labeled cap.
/// Demonstrations are routed to each module whose signature accepts at
/// least one of the demonstration's input fields.
pub struct BootstrapFewShot {
    metric: Metric,
    config: BootstrapConfig,
}

impl BootstrapFewShot {
    pub fn new(metric: Metric) -> Self {
        Self {
            metric,
            config: BootstrapConfig::default(),
        }
    }

    pub fn with_config(metric: Metric, config: BootstrapConfig) -> Self {
        Self { metric, config }
    }

    pub fn config(&self) -> &BootstrapConfig {
        &self.config
    }

    /// Run the program over the training set and keep passing runs as
    /// demonstrations.
    fn harvest(&self, program: &dyn Program, trainset: &[Example]) -> OptimizerResult<Vec<Example>> {
        let mut demos = Vec::new();
        for example in trainset {
            if demos.len() >= self.config.max_bootstrapped_demos {
                break;
            }
            let inputs = input_view(example);
            let output = match program.call(inputs.clone()) {
                Ok(output) => output,
                Err(err) => {
                    tracing::debug!(error = %err, "bootstrap run failed, skipping example");
                    continue;
                }
            };
            let score = self
                .metric
                .score(&Prediction::new(output.outputs.clone()), example)?;
            if score >= self.config.score_threshold {
                let mut demo = Example::default();
                for (key, value) in &inputs {
                    demo.set(key, value.clone());
                }
                for (key, value) in &output.outputs {
                    demo.set(format!("{key}_output"), value.clone());
                }
                demos.push(demo);
            }
        }
        Ok(demos)
    }

    /// Label-derived demonstrations, skipping examples with no labels.
    fn labeled(&self, trainset: &[Example], already: usize) -> Vec<Example> {
        let budget = self.config.max_labeled_demos.saturating_sub(already);
        trainset
            .iter()
            .filter(|example| !example.labels().is_empty())
            .take(budget)
            .cloned()
            .collect()
    }
}

impl Optimizer for BootstrapFewShot {
    fn name(&self) -> &str {
        "bootstrap_few_shot"
    }

    fn compile(
        &self,
        program: &mut dyn Program,
        trainset: &[Example],
        valset: Option<&[Example]>,
    ) -> OptimizerResult<()> {
        if trainset.is_empty() {
            return Err(OptimizerError::EmptyDataset);
        }
        if self.config.score_threshold < 0.0 {
            return Err(OptimizerError::InvalidConfig(
                "score_threshold must be non-negative".to_string(),
            ));
        }

        let mut demos = self.harvest(&*program, trainset)?;
        let bootstrapped = demos.len();
        demos.extend(self.labeled(trainset, bootstrapped));
        tracing::info!(
            optimizer = self.name(),
            bootstrapped,
            labeled = demos.len() - bootstrapped,
            "demonstration harvest complete"
        );

        attach_demos(program, &demos);

        if let Some(valset) = valset {
            if !valset.is_empty() {
                let eval = evaluate(&*program, valset, &self.metric)?;
                tracing::info!(
                    optimizer = self.name(),
                    score = eval.average_score,
                    total = eval.total,
                    "validation pass"
                );
            }
        }
        Ok(())
    }

    fn optimize_module(
        &self,
        module: &mut dyn Module,
        examples: &[Example],
    ) -> OptimizerResult<()> {
        if examples.is_empty() {
            return Err(OptimizerError::EmptyDataset);
        }
        let accepted: Vec<Example> = examples
            .iter()
            .filter(|example| {
                module
                    .signature()
                    .inputs()
                    .iter()
                    .any(|field| example.inputs().contains_key(&field.name))
            })
            .take(self.config.max_labeled_demos)
            .cloned()
            .collect();
        module.set_demos(accepted);
        Ok(())
    }
}

/// Give each module the demonstrations whose input fields overlap its
/// signature inputs.
pub(crate) fn attach_demos(program: &mut dyn Program, demos: &[Example]) {
    for name in program.module_names() {
        let Some(module) = program.module_mut(&name) else {
            continue;
        };
        let accepted: Vec<Example> = demos
            .iter()
            .filter(|demo| {
                module
                    .signature()
                    .inputs()
                    .iter()
                    .any(|field| demo.inputs().contains_key(&field.name))
            })
            .cloned()
            .collect();
        if !accepted.is_empty() {
            tracing::debug!(module = %name, demos = accepted.len(), "demonstrations attached");
            module.set_demos(accepted);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{example, EchoProgram};
    use serde_json::json;

    #[test]
    fn test_empty_trainset_rejected() {
        let optimizer = BootstrapFewShot::new(Metric::ExactMatch);
        let mut program = EchoProgram::new();
        assert_eq!(
            optimizer.compile(&mut program, &[], None).unwrap_err(),
            OptimizerError::EmptyDataset
        );
    }

    #[test]
    fn test_passing_runs_become_demos() {
        let optimizer = BootstrapFewShot::new(Metric::ExactMatch);
        let mut program = EchoProgram::new();
        // Echo answers the question verbatim, so only the first two pass.
        let trainset = vec![
            example("Paris", "Paris"),
            example("Rome", "Rome"),
            example("Berlin", "Madrid"),
        ];
        optimizer.compile(&mut program, &trainset, None).unwrap();
        let demos = program.module("echo").unwrap().demos().to_vec();
        assert!(!demos.is_empty());
        let first = &demos[0];
        assert_eq!(first.inputs().get("question"), Some(&json!("Paris")));
        assert_eq!(first.labels().get("answer"), Some(&json!("Paris")));
    }

    #[test]
    fn test_bootstrapped_cap_respected() {
        let config = BootstrapConfig {
            max_bootstrapped_demos: 1,
            max_labeled_demos: 1,
            score_threshold: 1.0,
        };
        let optimizer = BootstrapFewShot::with_config(Metric::ExactMatch, config);
        let mut program = EchoProgram::new();
        let trainset = vec![example("a", "a"), example("b", "b"), example("c", "c")];
        optimizer.compile(&mut program, &trainset, None).unwrap();
        // One bootstrapped demo exhausts the labeled budget too.
        assert_eq!(program.module("echo").unwrap().demos().len(), 1);
    }

    #[test]
    fn test_failing_runs_fall_back_to_labels() {
        let optimizer = BootstrapFewShot::new(Metric::ExactMatch);
        let mut program = EchoProgram::failing("model down");
        let trainset = vec![example("a", "a"), example("b", "b")];
        optimizer.compile(&mut program, &trainset, None).unwrap();
        let demos = program.module("echo").unwrap().demos().to_vec();
        assert_eq!(demos.len(), 2);
        assert_eq!(demos[0].labels().get("answer"), Some(&json!("a")));
    }

    #[test]
    fn test_negative_threshold_is_invalid() {
        let config = BootstrapConfig {
            score_threshold: -0.5,
            ..BootstrapConfig::default()
        };
        let optimizer = BootstrapFewShot::with_config(Metric::ExactMatch, config);
        let mut program = EchoProgram::new();
        assert!(matches!(
            optimizer
                .compile(&mut program, &[example("a", "a")], None)
                .unwrap_err(),
            OptimizerError::InvalidConfig(_)
        ));
    }

    #[test]
    fn test_optimize_module_filters_by_signature_inputs() {
        let optimizer = BootstrapFewShot::new(Metric::ExactMatch);
        let mut program = EchoProgram::new();
        let matching = example("a", "a");
        let unrelated = Example::default().with("topic", json!("unrelated"));
        let module = program.module_mut("echo").unwrap();
        optimizer
            .optimize_module(module, &[matching, unrelated])
            .unwrap();
        assert_eq!(module.demos().len(), 1);
        assert_eq!(
            optimizer.optimize_module(module, &[]).unwrap_err(),
            OptimizerError::EmptyDataset
        );
    }

    #[test]
    fn test_validation_set_does_not_train() {
        let optimizer = BootstrapFewShot::new(Metric::ExactMatch);
        let mut program = EchoProgram::new();
        let trainset = vec![example("a", "a")];
        let valset = vec![example("v1", "v1"), example("v2", "v2")];
        optimizer
            .compile(&mut program, &trainset, Some(&valset))
            .unwrap();
        let demos = program.module("echo").unwrap().demos().to_vec();
        assert!(demos
            .iter()
            .all(|demo| demo.inputs().get("question") == Some(&json!("a"))));
    }
}
