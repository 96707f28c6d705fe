//! Autograd integration for the custom add extension.

use crate::extension::{load, ExtensionModule, LoadOptions};
use extorch_core::{BackwardOp, ExtorchError, Tensor};
use std::sync::Arc;

/// Differentiable wrapper around the `custom_add_cpp` extension.
pub struct CustomAddFunction;

impl CustomAddFunction {
    /// Runs the extension's `forward` on `a` and `b` and, when either input
    /// requires grad, attaches a [`CustomAddBackward`] node to the result.
    pub fn apply(a: &Tensor, b: &Tensor) -> Result<Tensor, ExtorchError> {
        let module = load(&LoadOptions::default())?;
        let output = single_output(module.call("forward", &[a.clone(), b.clone()])?)?;

        if a.requires_grad() || b.requires_grad() {
            let grad_fn = CustomAddBackward {
                module,
                saved_a: a.clone(),
                saved_b: b.clone(),
            };
            output.set_grad_fn(Some(Arc::new(grad_fn)))?;
        }
        Ok(output)
    }
}

fn single_output(mut outputs: Vec<Tensor>) -> Result<Tensor, ExtorchError> {
    match outputs.len() {
        1 => Ok(outputs.remove(0)),
        n => Err(ExtorchError::InternalError(format!(
            "custom add forward returned {} outputs, expected 1",
            n
        ))),
    }
}

/// Backward node recorded by [`CustomAddFunction::apply`].
///
/// Holds the inputs saved during forward. The gradients it returns have the
/// output's shape; the engine sums them down to each input's shape.
#[derive(Debug)]
pub struct CustomAddBackward {
    module: Arc<ExtensionModule>,
    saved_a: Tensor,
    saved_b: Tensor,
}

impl BackwardOp for CustomAddBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, ExtorchError> {
        log::debug!("CustomAddFunction run to backward.");
        self.module.call("backward", std::slice::from_ref(grad_output))
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.saved_a.clone(), self.saved_b.clone()]
    }

    fn name(&self) -> &'static str {
        "CustomAddBackward"
    }
}

/// Adds `a` and `b` elementwise through the custom extension, with autograd
/// support.
///
/// ```
/// use extorch_core::Tensor;
/// use extorch_custom_add::custom_add;
///
/// let a = Tensor::new(vec![1.0, 2.0, 3.0], vec![3]).unwrap();
/// let b = Tensor::new(vec![4.0, 5.0, 6.0], vec![3]).unwrap();
/// let c = custom_add(&a, &b).unwrap();
/// assert_eq!(c.get_f32_data().unwrap(), vec![5.0, 7.0, 9.0]);
/// ```
pub fn custom_add(a: &Tensor, b: &Tensor) -> Result<Tensor, ExtorchError> {
    CustomAddFunction::apply(a, b)
}

#[cfg(test)]
#[path = "function_test.rs"]
mod tests;
