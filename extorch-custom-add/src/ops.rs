//! The raw elementwise add operator.
//!
//! Neither function records anything in the autograd graph: they are the
//! kernels behind the `forward`/`backward` entries of the `custom_add_cpp`
//! extension module. [`crate::function::CustomAddFunction`] wires them into
//! autograd.

use extorch_core::ops::arithmetic::add_kernel_op;
use extorch_core::{ExtorchError, Tensor};

/// Adds `a` and `b` elementwise with broadcasting.
///
/// The result is a fresh tensor with no `grad_fn` that does not require grad.
///
/// # Errors
/// `ShapeMismatch` when the shapes cannot be broadcast together.
pub fn custom_add_forward(a: &Tensor, b: &Tensor) -> Result<Tensor, ExtorchError> {
    log::debug!("call custom_add_forward.");
    add_kernel_op(a, b)
}

/// Gradient of `a + b` w.r.t. both operands: `grad_output` for each.
///
/// The two results are independent copies with their own buffers, so
/// neither aliases `grad_output` or the other.
pub fn custom_add_backward(grad_output: &Tensor) -> Result<(Tensor, Tensor), ExtorchError> {
    log::debug!("call custom_add_backward.");
    Ok((grad_output.deep_clone()?, grad_output.deep_clone()?))
}

#[cfg(test)]
#[path = "ops_test.rs"]
mod tests;
