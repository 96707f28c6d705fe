//! # extorch-custom-add
//!
//! A custom elementwise add operator for `extorch-core`, packaged as the
//! `custom_add_cpp` extension module:
//!
//! * [`ops`]: the raw `custom_add_forward` / `custom_add_backward` kernels.
//! * [`extension`]: the extension module table and its process-wide loader.
//! * [`function`]: [`CustomAddFunction`], which records the op in the
//!   autograd graph, and the [`custom_add`] entry point.

pub mod extension;
pub mod function;
pub mod ops;

pub use extension::{load, ExtensionModule, LoadOptions, CUSTOM_ADD_EXTENSION};
pub use function::{custom_add, CustomAddFunction};
pub use ops::{custom_add_backward, custom_add_forward};
