//! # extorch-core
//!
//! A small CPU tensor library: dense `f32`/`f64` storage, NumPy-style
//! broadcasting, a handful of built-in operators and a reverse-mode autograd
//! engine. Extension crates (such as `extorch-custom-add`) plug their own
//! operators into it through the [`BackwardOp`](autograd::BackwardOp) trait.

pub mod autograd;
pub mod buffer;
pub mod error;
pub mod ops;
pub mod tensor;
pub mod tensor_data;
pub mod types;
pub mod utils;

// Re-export the types most callers need so they are reachable as `extorch_core::Tensor`, etc.
pub use autograd::BackwardOp;
pub use error::ExtorchError;
pub use tensor::Tensor;
pub use types::DType;
