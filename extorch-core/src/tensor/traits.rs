// src/tensor/traits.rs

use crate::tensor::Tensor;
use std::fmt::{self, Debug};
use std::sync::Arc;

impl Clone for Tensor {
    /// Shallow clone: the new handle shares the same node, so autograd
    /// metadata set through one handle is visible through the other.
    fn clone(&self) -> Self {
        Tensor {
            data: Arc::clone(&self.data),
        }
    }
}

impl Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let td = self.read_data();
        f.debug_struct("Tensor")
            .field("data", &td.to_f64_vec())
            .field("shape", &td.shape)
            .field("dtype", &td.dtype)
            .field("requires_grad", &td.requires_grad)
            .field("grad_fn", &td.grad_fn.as_ref().map(|op| op.name()))
            .finish()
    }
}

impl PartialEq for Tensor {
    /// Two tensors are equal when dtype, shape and every element match.
    /// Autograd metadata is ignored.
    fn eq(&self, other: &Self) -> bool {
        if self.is_same(other) {
            return true;
        }
        let self_guard = self.read_data();
        let other_guard = other.read_data();
        self_guard.dtype == other_guard.dtype
            && self_guard.shape == other_guard.shape
            && self_guard.to_f64_vec() == other_guard.to_f64_vec()
    }
}
