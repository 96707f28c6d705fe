// extorch-core/src/ops/arithmetic/add.rs

use crate::autograd::BackwardOp;
use crate::buffer::Buffer;
use crate::error::ExtorchError;
use crate::tensor::utils::{broadcast_shapes, broadcast_source_offset, index_to_coord};
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;
use std::ops::Add;
use std::sync::{Arc, RwLockReadGuard};

// --- Forward Operation ---

/// Performs element-wise addition of two tensors with broadcasting and
/// records `AddBackward` when either input requires grad.
///
/// Mixed `F32`/`F64` inputs produce an `F64` result.
///
/// # Errors
/// `ShapeMismatch` (operation `"add"`) if the shapes are not broadcastable.
pub fn add_op(a: &Tensor, b: &Tensor) -> Result<Tensor, ExtorchError> {
    let output = add_kernel_op(a, b)?;

    if a.requires_grad() || b.requires_grad() {
        let grad_fn = AddBackward {
            input_a: a.clone(),
            input_b: b.clone(),
        };
        output.set_grad_fn(Some(Arc::new(grad_fn)))?;
    }
    Ok(output)
}

/// Element-wise addition with broadcasting, without recording anything in
/// the autograd graph. The result is a fresh contiguous leaf tensor.
pub fn add_kernel_op(a: &Tensor, b: &Tensor) -> Result<Tensor, ExtorchError> {
    let a_guard = a.read_data();
    // `a + a` must not take the same read lock twice.
    let b_guard_storage: Option<RwLockReadGuard<'_, TensorData>> =
        if a.is_same(b) { None } else { Some(b.read_data()) };
    let b_guard: &TensorData = b_guard_storage.as_deref().unwrap_or(&*a_guard);

    let output_shape = broadcast_shapes(&a_guard.shape, &b_guard.shape).map_err(|_| {
        ExtorchError::ShapeMismatch {
            shape1: a_guard.shape.clone(),
            shape2: b_guard.shape.clone(),
            operation: "add".to_string(),
        }
    })?;

    let buffer = match (&*a_guard.buffer, &*b_guard.buffer) {
        (Buffer::F32(a_data), Buffer::F32(b_data)) => {
            Buffer::F32(add_kernel(&a_guard, a_data, b_guard, b_data, &output_shape))
        }
        (Buffer::F64(a_data), Buffer::F64(b_data)) => {
            Buffer::F64(add_kernel(&a_guard, a_data, b_guard, b_data, &output_shape))
        }
        (a_buffer, b_buffer) => {
            // Widening keeps element positions, so the layouts still apply.
            let a_data = a_buffer.to_f64_vec();
            let b_data = b_buffer.to_f64_vec();
            Buffer::F64(add_kernel(&a_guard, &a_data, b_guard, &b_data, &output_shape))
        }
    };

    drop(b_guard_storage);
    drop(a_guard);

    Ok(Tensor::from_tensor_data(TensorData::from_buffer(buffer, output_shape)?))
}

fn add_kernel<T>(
    a: &TensorData,
    a_data: &[T],
    b: &TensorData,
    b_data: &[T],
    output_shape: &[usize],
) -> Vec<T>
where
    T: Copy + Add<Output = T>,
{
    let numel: usize = output_shape.iter().product();
    (0..numel)
        .map(|i| {
            let coord = index_to_coord(i, output_shape);
            let offset_a = broadcast_source_offset(&coord, &a.shape, &a.strides, a.offset);
            let offset_b = broadcast_source_offset(&coord, &b.shape, &b.strides, b.offset);
            a_data[offset_a] + b_data[offset_b]
        })
        .collect()
}

// --- Backward Operation ---

/// Backward operation for addition: d(a + b)/da = d(a + b)/db = 1.
///
/// The upstream gradient is handed to both inputs unchanged; the engine sums
/// it down to each input's shape when broadcasting happened.
#[derive(Debug)]
struct AddBackward {
    input_a: Tensor,
    input_b: Tensor,
}

impl BackwardOp for AddBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, ExtorchError> {
        Ok(vec![grad_output.clone(), grad_output.clone()])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input_a.clone(), self.input_b.clone()]
    }

    fn name(&self) -> &'static str {
        "AddBackward"
    }
}

#[cfg(test)]
#[path = "add_test.rs"]
mod tests;
