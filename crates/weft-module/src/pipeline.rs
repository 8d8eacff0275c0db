//! Sequential program composition.

use crate::errors::ModuleResult;
use crate::module::Module;
use crate::program::{Program, ProgramTrace};
use weft_signature::ValueMap;

/// Runs named modules in order. Each stage sees the original inputs
/// merged with every earlier stage's completions; the program output is
/// the union of all stage completions.
pub struct Pipeline {
    name: String,
    modules: Vec<(String, Box<dyn Module>)>,
}

impl Pipeline {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            modules: Vec::new(),
        }
    }

    pub fn with_module(mut self, name: impl Into<String>, module: Box<dyn Module>) -> Self {
        self.modules.push((name.into(), module));
        self
    }

    pub fn add_module(&mut self, name: impl Into<String>, module: Box<dyn Module>) {
        self.modules.push((name.into(), module));
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl Program for Pipeline {
    fn name(&self) -> &str {
        &self.name
    }

    fn module_names(&self) -> Vec<String> {
        self.modules.iter().map(|(name, _)| name.clone()).collect()
    }

    fn module(&self, name: &str) -> Option<&dyn Module> {
        self.modules
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, m)| m.as_ref())
    }

    fn module_mut(&mut self, name: &str) -> Option<&mut dyn Module> {
        self.modules
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, m)| &mut **m as &mut dyn Module)
    }

    fn forward(&self, inputs: ValueMap, trace: &mut ProgramTrace) -> ModuleResult<ValueMap> {
        let mut accumulated = inputs;
        let mut outputs = ValueMap::new();
        for (name, module) in &self.modules {
            let prediction = module.call(accumulated.clone())?;
            trace.record(name, accumulated.clone(), prediction.completions().clone());
            for (key, value) in prediction.completions() {
                accumulated.insert(key.clone(), value.clone());
                outputs.insert(key.clone(), value.clone());
            }
        }
        Ok(outputs)
    }
}
