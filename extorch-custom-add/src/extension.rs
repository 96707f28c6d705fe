//! Extension modules: named tables of tensor functions, built once per
//! process and shared.
//!
//! A module is populated by an init function that `def`s each entry point,
//! then published in a global registry by [`load`]. Callers reach the
//! entries dynamically by name through [`ExtensionModule::call`].

use crate::ops::{custom_add_backward, custom_add_forward};
use extorch_core::{ExtorchError, Tensor};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

/// Name the custom add extension is registered under.
pub const CUSTOM_ADD_EXTENSION: &str = "custom_add_cpp";

/// Type alias for an extension entry point.
pub type ExtensionFn = Arc<dyn Fn(&[Tensor]) -> Result<Vec<Tensor>, ExtorchError> + Send + Sync>;

/// A function exposed by an extension module.
#[derive(Clone)]
pub struct ExtensionFunction {
    pub doc: String,
    pub num_inputs: usize,
    func: ExtensionFn,
}

impl fmt::Debug for ExtensionFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionFunction")
            .field("doc", &self.doc)
            .field("num_inputs", &self.num_inputs)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub struct ExtensionModule {
    name: String,
    functions: HashMap<String, ExtensionFunction>,
}

impl ExtensionModule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            functions: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registers `func` under `name`.
    ///
    /// # Errors
    /// `DuplicateDefinition` if `name` is already defined.
    pub fn def<F>(&mut self, name: &str, doc: &str, num_inputs: usize, func: F) -> Result<(), ExtorchError>
    where
        F: Fn(&[Tensor]) -> Result<Vec<Tensor>, ExtorchError> + Send + Sync + 'static,
    {
        if self.functions.contains_key(name) {
            return Err(ExtorchError::DuplicateDefinition(name.to_string()));
        }
        self.functions.insert(
            name.to_string(),
            ExtensionFunction {
                doc: doc.to_string(),
                num_inputs,
                func: Arc::new(func),
            },
        );
        Ok(())
    }

    pub fn function(&self, name: &str) -> Option<&ExtensionFunction> {
        self.functions.get(name)
    }

    /// Names of all defined functions, sorted.
    pub fn function_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.functions.keys().cloned().collect();
        names.sort();
        names
    }

    /// Calls the function registered under `name`.
    ///
    /// # Errors
    /// * `UnknownFunction` if nothing is defined under `name`.
    /// * `ArityMismatch` if `inputs.len()` differs from the declared arity.
    /// * Whatever the function itself returns.
    pub fn call(&self, name: &str, inputs: &[Tensor]) -> Result<Vec<Tensor>, ExtorchError> {
        let function = self.function(name).ok_or_else(|| ExtorchError::UnknownFunction {
            module: self.name.clone(),
            function: name.to_string(),
        })?;
        if inputs.len() != function.num_inputs {
            return Err(ExtorchError::ArityMismatch {
                function: name.to_string(),
                expected: function.num_inputs,
                actual: inputs.len(),
            });
        }
        (function.func)(inputs)
    }
}

/// Module init for `custom_add_cpp`: defines `forward` and `backward`.
pub fn init_custom_add_module(module: &mut ExtensionModule) -> Result<(), ExtorchError> {
    module.def("forward", "Custom Add Forward", 2, |inputs| {
        Ok(vec![custom_add_forward(&inputs[0], &inputs[1])?])
    })?;
    module.def("backward", "Custom Add Backward", 1, |inputs| {
        let (grad_a, grad_b) = custom_add_backward(&inputs[0])?;
        Ok(vec![grad_a, grad_b])
    })?;
    Ok(())
}

/// Options for [`load`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    pub name: String,
    /// Log the registration at `info` instead of `debug`.
    pub verbose: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            name: CUSTOM_ADD_EXTENSION.to_string(),
            verbose: false,
        }
    }
}

impl LoadOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

static REGISTRY: Lazy<RwLock<HashMap<String, Arc<ExtensionModule>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

fn poisoned<T>(_: T) -> ExtorchError {
    ExtorchError::LockPoisoned("extension registry".to_string())
}

/// Returns the extension named `options.name`, building and registering it
/// on first use. Every later load of the same name returns the same module.
///
/// # Errors
/// * `UnknownExtension` if no init function is known for the name.
/// * `LockPoisoned` if another thread panicked while holding the registry.
pub fn load(options: &LoadOptions) -> Result<Arc<ExtensionModule>, ExtorchError> {
    if let Some(module) = REGISTRY.read().map_err(poisoned)?.get(&options.name) {
        return Ok(Arc::clone(module));
    }

    let init: fn(&mut ExtensionModule) -> Result<(), ExtorchError> = match options.name.as_str() {
        CUSTOM_ADD_EXTENSION => init_custom_add_module,
        other => return Err(ExtorchError::UnknownExtension(other.to_string())),
    };

    let mut registry = REGISTRY.write().map_err(poisoned)?;
    // Another thread may have won the race between the two locks.
    if let Some(module) = registry.get(&options.name) {
        return Ok(Arc::clone(module));
    }

    let mut module = ExtensionModule::new(options.name.clone());
    init(&mut module)?;
    let functions = module.function_names().join(", ");
    if options.verbose {
        log::info!("Loaded extension module {} [{}]", options.name, functions);
    } else {
        log::debug!("Loaded extension module {} [{}]", options.name, functions);
    }

    let module = Arc::new(module);
    registry.insert(options.name.clone(), Arc::clone(&module));
    Ok(module)
}

#[cfg(test)]
#[path = "extension_test.rs"]
mod tests;
