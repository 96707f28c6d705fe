// src/tensor/mod.rs

use crate::error::ExtorchError;
use crate::tensor_data::TensorData;
use crate::types::DType;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

mod autograd_methods;
mod traits;
pub mod broadcast_utils;
pub mod create;
pub mod utils;

// Re-export creation functions to make them public
pub use create::{full, ones, ones_like, rand, randn, zeros, zeros_like};

/// Represents a multi-dimensional array (tensor).
///
/// `Tensor` uses `Arc<RwLock<TensorData>>` internally to allow for:
/// 1.  **Shared Ownership:** cloning a `Tensor` is cheap and yields another
///     handle on the same node; the data itself is not copied.
/// 2.  **Interior Mutability:** autograd metadata (`requires_grad`, `grad`,
///     `grad_fn`) can be updated through a shared reference.
///
/// Use [`Tensor::deep_clone`] for an independent copy of the values.
pub struct Tensor {
    pub(crate) data: Arc<RwLock<TensorData>>,
}

/// Identity of an autograd graph node: the address of its shared `TensorData`.
/// Only ever compared and hashed, never dereferenced.
pub(crate) type NodeId = *const RwLock<TensorData>;

impl Tensor {
    /// Creates a new Tensor with the given f32 data and shape.
    ///
    /// This is the primary constructor for creating tensors from raw data.
    /// It calculates contiguous strides automatically.
    pub fn new(data_vec: Vec<f32>, shape: Vec<usize>) -> Result<Self, ExtorchError> {
        Ok(Self::from_tensor_data(TensorData::new(data_vec, shape)?))
    }

    /// Creates a new Tensor with the given f64 data and shape.
    pub fn new_f64(data_vec: Vec<f64>, shape: Vec<usize>) -> Result<Self, ExtorchError> {
        Ok(Self::from_tensor_data(TensorData::new_f64(data_vec, shape)?))
    }

    pub(crate) fn from_tensor_data(tensor_data: TensorData) -> Self {
        Tensor {
            data: Arc::new(RwLock::new(tensor_data)),
        }
    }

    /// Returns the data type (`DType`) of the tensor elements.
    pub fn dtype(&self) -> DType {
        self.read_data().dtype
    }

    /// Returns a clone of the tensor's shape.
    pub fn shape(&self) -> Vec<usize> {
        self.read_data().shape.clone()
    }

    /// Returns a clone of the tensor's strides.
    pub fn strides(&self) -> Vec<usize> {
        self.read_data().strides.clone()
    }

    pub fn rank(&self) -> usize {
        self.read_data().shape.len()
    }

    /// Checks if the tensor is contiguous in memory.
    pub fn is_contiguous(&self) -> bool {
        self.read_data().is_contiguous()
    }

    /// Returns the number of elements in the tensor.
    pub fn numel(&self) -> usize {
        self.read_data().numel()
    }

    /// Acquires a read lock on the tensor's data.
    ///
    /// Panics if the RwLock is poisoned.
    pub fn read_data(&self) -> RwLockReadGuard<'_, TensorData> {
        self.data.read().expect("RwLock poisoned")
    }

    /// Acquires a write lock on the tensor's data.
    ///
    /// Panics if the RwLock is poisoned.
    pub fn write_data(&self) -> RwLockWriteGuard<'_, TensorData> {
        self.data.write().expect("RwLock poisoned")
    }

    /// Returns the elements as a row-major `Vec<f32>`.
    ///
    /// Fails with `DataTypeMismatch` if the tensor is not `F32`.
    pub fn get_f32_data(&self) -> Result<Vec<f32>, ExtorchError> {
        let guard = self.read_data();
        let data = guard.buffer.try_get_f32()?;
        Ok(guard.gather(data))
    }

    /// Returns the elements as a row-major `Vec<f64>`.
    ///
    /// Fails with `DataTypeMismatch` if the tensor is not `F64`.
    pub fn get_f64_data(&self) -> Result<Vec<f64>, ExtorchError> {
        let guard = self.read_data();
        let data = guard.buffer.try_get_f64()?;
        Ok(guard.gather(data))
    }

    /// Returns the elements widened to `f64`, whatever the tensor's dtype.
    pub fn to_f64_vec(&self) -> Vec<f64> {
        self.read_data().to_f64_vec()
    }

    /// Creates an independent copy: fresh contiguous buffer, same values,
    /// no gradient, no `grad_fn`, `requires_grad == false`.
    pub fn deep_clone(&self) -> Result<Tensor, ExtorchError> {
        let guard = self.read_data();
        let buffer = guard.gather_buffer();
        let shape = guard.shape.clone();
        drop(guard);
        Ok(Self::from_tensor_data(TensorData::from_buffer(buffer, shape)?))
    }

    /// Converts to `dtype`. Returns a shallow clone when the dtype already matches.
    pub fn to_dtype(&self, dtype: DType) -> Result<Tensor, ExtorchError> {
        let guard = self.read_data();
        if guard.dtype == dtype {
            drop(guard);
            return Ok(self.clone());
        }
        let values = guard.to_f64_vec();
        let shape = guard.shape.clone();
        drop(guard);
        match dtype {
            DType::F32 => Tensor::new(values.into_iter().map(|v| v as f32).collect(), shape),
            DType::F64 => Tensor::new_f64(values, shape),
        }
    }

    /// Returns true if both handles point at the same node.
    pub fn is_same(&self, other: &Tensor) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    /// Returns true if both tensors read from the same underlying buffer.
    pub fn shares_buffer_with(&self, other: &Tensor) -> bool {
        if self.is_same(other) {
            return true;
        }
        let a = self.read_data();
        let b = other.read_data();
        Arc::ptr_eq(&a.buffer, &b.buffer)
    }

    pub(crate) fn node_id(&self) -> NodeId {
        Arc::as_ptr(&self.data)
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
