//! The optimizer contract.

use crate::errors::OptimizerResult;
use weft_data::Example;
use weft_module::{Module, Program};

/// A strategy that improves a program in place from training data.
///
/// Optimizers mutate the given program (typically by attaching
/// demonstrations to its modules) rather than rebuilding it, so the
/// caller keeps ownership and can always hand the program back even
/// when optimization fails partway.
pub trait Optimizer: Send + Sync {
    /// Strategy name used in logs and compilation metrics.
    fn name(&self) -> &str;

    /// Improve `program` using `trainset`; `valset`, when given, is
    /// only scored for reporting and never trains.
    fn compile(
        &self,
        program: &mut dyn Program,
        trainset: &[Example],
        valset: Option<&[Example]>,
    ) -> OptimizerResult<()>;

    /// Improve a single module in isolation.
    fn optimize_module(&self, module: &mut dyn Module, examples: &[Example])
        -> OptimizerResult<()>;
}
