use crate::error::ExtorchError;
use crate::tensor::Tensor;
use std::fmt::Debug;

/// Defines the interface for the backward pass of a differentiable tensor operation.
///
/// Any operation that creates a non-leaf `Tensor` (a tensor resulting from an operation
/// on inputs that require gradients) must have an associated `BackwardOp` implementation.
/// This implementation is stored in the output tensor's `grad_fn` field and is used
/// during the `backward()` call to propagate gradients according to the chain rule.
///
/// Extension crates implement this trait to plug custom operators into the engine.
///
/// The trait requires `Debug + Send + Sync` bounds because the `Arc<dyn BackwardOp>`
/// is shared between every handle on the output tensor, which may live on any thread.
pub trait BackwardOp: Debug + Send + Sync {
    /// Computes the gradients of the operation's inputs given the gradient of its output.
    ///
    /// # Arguments
    /// * `grad_output`: dL/dOutput, with the shape of the operation's output.
    ///
    /// # Returns
    /// One gradient per input, in the order returned by [`BackwardOp::inputs`].
    /// A gradient may keep the output's (broadcast) shape; the engine sums it
    /// down to the input's shape and casts it to the input's dtype before accumulating.
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, ExtorchError>;

    /// Handles on the input tensors that participated in the forward operation.
    ///
    /// These are the graph edges walked by the engine. The order must match
    /// the gradients returned by `backward()`.
    fn inputs(&self) -> Vec<Tensor>;

    /// Short name shown in `Debug` output of tensors and in engine errors.
    fn name(&self) -> &'static str;
}
