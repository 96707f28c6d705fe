//! # Tensor Operations Module (`ops`)
//!
//! Built-in operators of the tensor core. Each operation has a core function
//! (named `xxx_op`) that performs the forward computation and, when an input
//! requires grad, records a `Backward` struct implementing
//! [`BackwardOp`](crate::autograd::BackwardOp) on its output.
//!
//! ## Key Submodules:
//!
//! - [`arithmetic`]: Element-wise arithmetic with broadcasting (add).
//! - [`reduction`]: Operations that reduce tensor dimensions (sum).

pub mod arithmetic;
pub mod reduction;
