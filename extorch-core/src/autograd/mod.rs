//! Reverse-mode automatic differentiation.
//!
//! Operations record a [`BackwardOp`] on their output; [`Tensor::backward`](crate::Tensor::backward)
//! walks those records in topological order and accumulates gradients into leaves.

pub mod backward_op;
pub mod grad_check;
pub(crate) mod graph;

pub use backward_op::BackwardOp;
pub use grad_check::{check_grad, GradCheckError};
