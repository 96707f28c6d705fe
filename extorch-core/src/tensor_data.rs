// src/tensor_data.rs
use std::fmt::Debug;
use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::buffer::Buffer;
use crate::error::ExtorchError;
use crate::tensor::utils::{calculate_strides, index_to_coord};
use crate::tensor::Tensor;
use crate::types::DType;

/// Internal storage and metadata for a Tensor.
///
/// This struct holds the data buffer, shape, strides, data type and
/// autograd-related information. It is wrapped in `Arc<RwLock<TensorData>>`
/// by the `Tensor` struct to allow shared ownership and interior mutability.
#[derive(Debug)]
pub struct TensorData {
    /// The underlying typed buffer, shared by detached views.
    pub(crate) buffer: Arc<Buffer>,
    /// The data type of the elements in the buffer.
    pub(crate) dtype: DType,

    /// The shape (dimensions) of the tensor.
    pub(crate) shape: Vec<usize>,
    /// Jump in the buffer required to move one step along each dimension.
    pub(crate) strides: Vec<usize>,
    /// Position of the first element within the shared buffer.
    pub(crate) offset: usize,

    /// Whether operations involving this tensor are recorded for backward.
    pub(crate) requires_grad: bool,
    /// Accumulated gradient; same shape as this tensor.
    pub(crate) grad: Option<Tensor>,
    /// The operation that produced this tensor. Leaf tensors have `None`.
    pub(crate) grad_fn: Option<Arc<dyn BackwardOp>>,
}

impl TensorData {
    /// Creates a new `TensorData` instance with the given f32 data and shape.
    ///
    /// Takes ownership of the data vector (row-major order) and calculates
    /// contiguous strides.
    ///
    /// # Errors
    /// Returns `ExtorchError::TensorCreationError` if the length of `data_vec` does not match
    /// the total number of elements specified by `shape`.
    pub fn new(data_vec: Vec<f32>, shape: Vec<usize>) -> Result<Self, ExtorchError> {
        Self::from_buffer(Buffer::F32(data_vec), shape)
    }

    /// Same as [`TensorData::new`] for `f64` data.
    pub fn new_f64(data_vec: Vec<f64>, shape: Vec<usize>) -> Result<Self, ExtorchError> {
        Self::from_buffer(Buffer::F64(data_vec), shape)
    }

    pub(crate) fn from_buffer(buffer: Buffer, shape: Vec<usize>) -> Result<Self, ExtorchError> {
        let numel: usize = shape.iter().product();
        let data_len = buffer.len();
        if data_len != numel {
            return Err(ExtorchError::TensorCreationError { data_len, shape });
        }
        let strides = calculate_strides(&shape);
        Ok(TensorData {
            dtype: buffer.dtype(),
            buffer: Arc::new(buffer),
            shape,
            strides,
            offset: 0,
            requires_grad: false,
            grad: None,
            grad_fn: None,
        })
    }

    /// Creates a `TensorData` sharing an existing buffer with new metadata.
    ///
    /// Views do not require gradients and have no `grad_fn`.
    pub(crate) fn new_view(
        buffer: Arc<Buffer>,
        offset: usize,
        shape: Vec<usize>,
        strides: Vec<usize>,
    ) -> Result<Self, ExtorchError> {
        if shape.len() != strides.len() {
            return Err(ExtorchError::InternalError(format!(
                "View rank mismatch: shape {:?} vs strides {:?}",
                shape, strides
            )));
        }
        let numel: usize = shape.iter().product();
        if numel > 0 {
            let last = offset
                + shape
                    .iter()
                    .zip(strides.iter())
                    .map(|(&dim, &stride)| (dim - 1) * stride)
                    .sum::<usize>();
            if last >= buffer.len() {
                return Err(ExtorchError::IndexOutOfBounds {
                    index: vec![last],
                    shape: vec![buffer.len()],
                });
            }
        }
        Ok(TensorData {
            dtype: buffer.dtype(),
            buffer,
            shape,
            strides,
            offset,
            requires_grad: false,
            grad: None,
            grad_fn: None,
        })
    }

    /// Returns the number of elements (1 for a scalar of shape `[]`).
    pub fn numel(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn is_contiguous(&self) -> bool {
        self.strides == calculate_strides(&self.shape)
    }

    /// Buffer position of the element at `coords`.
    pub fn get_offset(&self, coords: &[usize]) -> usize {
        self.offset
            + coords
                .iter()
                .zip(self.strides.iter())
                .map(|(&coord, &stride)| coord * stride)
                .sum::<usize>()
    }

    pub fn buffer(&self) -> &Arc<Buffer> {
        &self.buffer
    }

    /// Collects the logical elements in row-major order from `data`, which must
    /// be this tensor's buffer slice.
    pub(crate) fn gather<T: Copy>(&self, data: &[T]) -> Vec<T> {
        let numel = self.numel();
        if self.is_contiguous() {
            return data[self.offset..self.offset + numel].to_vec();
        }
        (0..numel)
            .map(|i| data[self.get_offset(&index_to_coord(i, &self.shape))])
            .collect()
    }

    /// Logical elements widened to `f64`.
    pub(crate) fn to_f64_vec(&self) -> Vec<f64> {
        match &*self.buffer {
            Buffer::F32(data) => self.gather(data).into_iter().map(|v| v as f64).collect(),
            Buffer::F64(data) => self.gather(data),
        }
    }

    /// Fresh contiguous copy of the logical elements.
    pub(crate) fn gather_buffer(&self) -> Buffer {
        match &*self.buffer {
            Buffer::F32(data) => Buffer::F32(self.gather(data)),
            Buffer::F64(data) => Buffer::F64(self.gather(data)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_checks_length() {
        let err = TensorData::new(vec![1.0, 2.0, 3.0], vec![2, 2]).unwrap_err();
        assert_eq!(
            err,
            ExtorchError::TensorCreationError { data_len: 3, shape: vec![2, 2] }
        );
    }

    #[test]
    fn test_scalar_numel() {
        let td = TensorData::new(vec![7.0], vec![]).unwrap();
        assert_eq!(td.numel(), 1);
        assert!(td.strides.is_empty());
        assert!(td.is_contiguous());
    }

    #[test]
    fn test_gather_strided_view() {
        // Column 1 of a 2x3 matrix: offset 1, stride 3.
        let td = TensorData::new(vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0], vec![2, 3]).unwrap();
        let view = TensorData::new_view(Arc::clone(&td.buffer), 1, vec![2], vec![3]).unwrap();
        assert!(!view.is_contiguous());
        assert_eq!(view.to_f64_vec(), vec![1.0, 4.0]);
    }

    #[test]
    fn test_view_out_of_bounds() {
        let td = TensorData::new(vec![0.0; 4], vec![4]).unwrap();
        let result = TensorData::new_view(Arc::clone(&td.buffer), 2, vec![3], vec![1]);
        assert!(matches!(result, Err(ExtorchError::IndexOutOfBounds { .. })));
    }
}
