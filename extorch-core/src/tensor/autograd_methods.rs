use crate::autograd::graph::topological_sort;
use crate::autograd::BackwardOp;
use crate::error::ExtorchError;
use crate::ops::arithmetic::add_kernel_op;
use crate::tensor::create::ones_like;
use crate::tensor::{NodeId, Tensor};
use crate::tensor_data::TensorData;
use std::collections::HashMap;
use std::sync::Arc;

impl Tensor {
    /// Checks if this tensor requires gradient computation.
    pub fn requires_grad(&self) -> bool {
        self.read_data().requires_grad
    }

    /// Sets the `requires_grad` flag for this tensor.
    pub fn set_requires_grad(&self, requires_grad: bool) -> Result<(), ExtorchError> {
        let mut guard = self.write_data();
        if requires_grad && guard.grad_fn.is_some() {
            log::warn!(
                "Setting requires_grad=true on a non-leaf tensor. Gradients will not accumulate here during backward(). Did you mean to use .detach()?"
            );
        }
        guard.requires_grad = requires_grad;
        Ok(())
    }

    /// Returns a handle on the accumulated gradient, if any.
    pub fn grad(&self) -> Option<Tensor> {
        self.read_data().grad.clone()
    }

    /// Returns a clone of the `Arc` pointing to the backward operation node (`grad_fn`).
    pub fn grad_fn(&self) -> Option<Arc<dyn BackwardOp>> {
        self.read_data().grad_fn.clone()
    }

    /// Sets the backward operation node (`grad_fn`) for this tensor.
    ///
    /// Attaching a node also marks the tensor as requiring grad; detaching
    /// (`None`) leaves the flag untouched.
    pub fn set_grad_fn(&self, grad_fn: Option<Arc<dyn BackwardOp>>) -> Result<(), ExtorchError> {
        let mut guard = self.write_data();
        if grad_fn.is_some() {
            guard.requires_grad = true;
        }
        guard.grad_fn = grad_fn;
        Ok(())
    }

    /// A leaf is a tensor not produced by a recorded operation.
    pub fn is_leaf(&self) -> bool {
        self.read_data().grad_fn.is_none()
    }

    /// Returns a new tensor sharing this tensor's buffer but cut from the graph:
    /// no `grad_fn`, no `grad`, `requires_grad == false`.
    pub fn detach(&self) -> Tensor {
        let guard = self.read_data();
        let detached = TensorData {
            buffer: Arc::clone(&guard.buffer),
            dtype: guard.dtype,
            shape: guard.shape.clone(),
            strides: guard.strides.clone(),
            offset: guard.offset,
            requires_grad: false,
            grad: None,
            grad_fn: None,
        };
        Tensor::from_tensor_data(detached)
    }

    /// Resets the gradient of this tensor to None.
    pub fn clear_grad(&self) {
        self.write_data().grad = None;
    }

    /// Accumulates `grad_to_add` into this tensor's `grad` field.
    pub(crate) fn acc_grad(&self, grad_to_add: Tensor) -> Result<(), ExtorchError> {
        let expected = self.shape();
        let actual = grad_to_add.shape();
        if expected != actual {
            return Err(ExtorchError::GradientShapeMismatch { expected, actual });
        }

        // The existing gradient is summed outside the lock: `grad_to_add` may
        // alias this tensor.
        let existing = self.grad();
        let new_grad = match existing {
            Some(existing_grad) => add_kernel_op(&existing_grad, &grad_to_add)?,
            None => grad_to_add,
        };
        self.write_data().grad = Some(new_grad);
        Ok(())
    }

    /// Computes the gradients of this tensor w.r.t. graph leaves.
    ///
    /// # Arguments
    /// * `gradient`: dL/dself. If `None`, the tensor must hold exactly one
    ///   element and a gradient of `1` is used.
    ///
    /// Gradients are summed into the `grad` field of every leaf that requires
    /// grad; repeated calls keep accumulating.
    ///
    /// # Errors
    /// * `RequiresGradNotMet` if this tensor does not require grad.
    /// * `GradientShapeMismatch` if `gradient` does not match this tensor's shape.
    /// * `BackwardNonScalar` if `gradient` is `None` and the tensor has more than one element.
    /// * Any error raised by a `BackwardOp` along the way.
    pub fn backward(&self, gradient: Option<Tensor>) -> Result<(), ExtorchError> {
        if !self.requires_grad() {
            return Err(ExtorchError::RequiresGradNotMet);
        }

        let grad_init = match gradient {
            Some(g) => {
                let expected = self.shape();
                let actual = g.shape();
                if expected != actual {
                    return Err(ExtorchError::GradientShapeMismatch { expected, actual });
                }
                g.to_dtype(self.dtype())?
            }
            None => {
                if self.numel() != 1 {
                    return Err(ExtorchError::BackwardNonScalar);
                }
                ones_like(self)?
            }
        };

        let sorted_nodes = topological_sort(self);
        log::debug!("backward: traversing {} graph nodes", sorted_nodes.len());

        let mut pending: HashMap<NodeId, Tensor> = HashMap::new();
        pending.insert(self.node_id(), grad_init);

        for node in sorted_nodes {
            let Some(grad) = pending.remove(&node.node_id()) else {
                continue;
            };

            let Some(op) = node.grad_fn() else {
                if node.requires_grad() {
                    node.acc_grad(grad)?;
                }
                continue;
            };

            let input_grads = op.backward(&grad)?;
            let inputs = op.inputs();
            if input_grads.len() != inputs.len() {
                return Err(ExtorchError::BackwardError(format!(
                    "{} returned {} gradients, but has {} inputs",
                    op.name(),
                    input_grads.len(),
                    inputs.len()
                )));
            }

            for (input, input_grad) in inputs.into_iter().zip(input_grads) {
                if !input.requires_grad() {
                    continue;
                }
                let input_grad = input_grad
                    .reduce_to_shape(&input.shape())?
                    .to_dtype(input.dtype())?;
                let id = input.node_id();
                let merged = match pending.remove(&id) {
                    Some(existing) => add_kernel_op(&existing, &input_grad)?,
                    None => input_grad,
                };
                pending.insert(id, merged);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "autograd_methods_test.rs"]
mod tests;
