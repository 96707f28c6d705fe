use crate::types::DType;
use thiserror::Error;

/// Custom error type for the extorch tensor core.
#[derive(Error, Debug, PartialEq, Clone)] // PartialEq for easier testing
pub enum ExtorchError {
    #[error("Shape mismatch during operation {operation}: cannot broadcast {shape1:?} with {shape2:?}")]
    ShapeMismatch {
        shape1: Vec<usize>,
        shape2: Vec<usize>,
        operation: String,
    },

    #[error("Tensor creation error: data length {data_len} does not match shape {shape:?}")]
    TensorCreationError { data_len: usize, shape: Vec<usize> },

    #[error("Gradient shape mismatch: expected {expected:?}, got {actual:?}")]
    GradientShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("Index out of bounds: index {index:?} for shape {shape:?}")]
    IndexOutOfBounds {
        index: Vec<usize>,
        shape: Vec<usize>,
    },

    #[error("Data type mismatch for operation '{operation}': expected {expected:?}, got {actual:?}")]
    DataTypeMismatch {
        expected: DType,
        actual: DType,
        operation: String,
    },

    #[error("Operation requires tensor to require grad, but it doesn't.")]
    RequiresGradNotMet,

    #[error("Backward called on non-scalar tensor without explicit gradient.")]
    BackwardNonScalar,

    #[error("Backward pass error: {0}")]
    BackwardError(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    // --- Extension modules ---
    #[error("Unknown extension '{0}'")]
    UnknownExtension(String),

    #[error("Extension '{module}' has no function named '{function}'")]
    UnknownFunction { module: String, function: String },

    #[error("Function '{0}' is already defined in this extension")]
    DuplicateDefinition(String),

    #[error("Function '{function}' expects {expected} input(s), got {actual}")]
    ArityMismatch {
        function: String,
        expected: usize,
        actual: usize,
    },

    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),
}
