use crate::error::ExtorchError;
use crate::types::DType;

/// Typed storage behind a `TensorData`.
///
/// Buffers live in main memory and are shared between a tensor and its
/// detached views through an `Arc<Buffer>` held by `TensorData`.
#[derive(Debug, Clone, PartialEq)]
pub enum Buffer {
    /// Buffer holding f32 data.
    F32(Vec<f32>),
    /// Buffer holding f64 data.
    F64(Vec<f64>),
}

impl Buffer {
    /// Data type of the stored elements.
    pub fn dtype(&self) -> DType {
        match self {
            Buffer::F32(_) => DType::F32,
            Buffer::F64(_) => DType::F64,
        }
    }

    /// Number of stored elements (not necessarily the logical numel of a view).
    pub fn len(&self) -> usize {
        match self {
            Buffer::F32(data) => data.len(),
            Buffer::F64(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Attempts to get the underlying slice if this is an F32 buffer.
    pub fn try_get_f32(&self) -> Result<&[f32], ExtorchError> {
        match self {
            Buffer::F32(data) => Ok(data),
            Buffer::F64(_) => Err(ExtorchError::DataTypeMismatch {
                expected: DType::F32,
                actual: DType::F64,
                operation: "try_get_f32".to_string(),
            }),
        }
    }

    /// Attempts to get the underlying slice if this is an F64 buffer.
    pub fn try_get_f64(&self) -> Result<&[f64], ExtorchError> {
        match self {
            Buffer::F64(data) => Ok(data),
            Buffer::F32(_) => Err(ExtorchError::DataTypeMismatch {
                expected: DType::F64,
                actual: DType::F32,
                operation: "try_get_f64".to_string(),
            }),
        }
    }

    /// Widened copy of the raw storage. Element positions are preserved, so
    /// strides and offsets computed for this buffer stay valid on the copy.
    pub fn to_f64_vec(&self) -> Vec<f64> {
        match self {
            Buffer::F32(data) => data.iter().map(|&v| v as f64).collect(),
            Buffer::F64(data) => data.clone(),
        }
    }
}
