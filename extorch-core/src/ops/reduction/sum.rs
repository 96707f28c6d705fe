use crate::autograd::BackwardOp;
use crate::buffer::Buffer;
use crate::error::ExtorchError;
use crate::tensor::utils::{calculate_strides, index_to_coord};
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;
use num_traits::Zero;
use std::ops::AddAssign;
use std::sync::Arc;

/// Sums the elements of `input` along `axes`.
///
/// * `axes == None` reduces every axis.
/// * `axes == Some(&[])` reduces nothing and returns a copy.
/// * With `keep_dims`, reduced axes stay in the output with size 1.
///
/// Records `SumBackward` when `input` requires grad.
///
/// # Errors
/// `IndexOutOfBounds` if an axis is not smaller than the rank.
pub fn sum_op(input: &Tensor, axes: Option<&[usize]>, keep_dims: bool) -> Result<Tensor, ExtorchError> {
    let input_shape = input.shape();
    let rank = input_shape.len();

    let mut axes: Vec<usize> = match axes {
        Some(axes) => axes.to_vec(),
        None => (0..rank).collect(),
    };
    if let Some(&axis) = axes.iter().find(|&&axis| axis >= rank) {
        return Err(ExtorchError::IndexOutOfBounds {
            index: vec![axis],
            shape: input_shape,
        });
    }
    axes.sort_unstable();
    axes.dedup();

    let kept_shape: Vec<usize> = input_shape
        .iter()
        .enumerate()
        .map(|(dim, &size)| if axes.contains(&dim) { 1 } else { size })
        .collect();
    let output_shape: Vec<usize> = if keep_dims {
        kept_shape.clone()
    } else {
        input_shape
            .iter()
            .enumerate()
            .filter(|(dim, _)| !axes.contains(dim))
            .map(|(_, &size)| size)
            .collect()
    };

    let guard = input.read_data();
    let buffer = match &*guard.buffer {
        Buffer::F32(data) => Buffer::F32(sum_kernel(&guard, data, &kept_shape)),
        Buffer::F64(data) => Buffer::F64(sum_kernel(&guard, data, &kept_shape)),
    };
    drop(guard);

    let output = Tensor::from_tensor_data(TensorData::from_buffer(buffer, output_shape)?);

    if input.requires_grad() {
        let grad_fn = SumBackward {
            input: input.clone(),
            input_shape,
            kept_shape,
        };
        output.set_grad_fn(Some(Arc::new(grad_fn)))?;
    }
    Ok(output)
}

/// Accumulates every element of `source` into the slot of `kept_shape` it
/// projects onto. Reduced axes have size 1 in `kept_shape`.
fn sum_kernel<T>(source: &TensorData, data: &[T], kept_shape: &[usize]) -> Vec<T>
where
    T: Copy + Zero + AddAssign,
{
    let kept_strides = calculate_strides(kept_shape);
    let kept_numel: usize = kept_shape.iter().product();
    let mut result = vec![T::zero(); kept_numel];

    for i in 0..source.numel() {
        let coord = index_to_coord(i, &source.shape);
        let mut out_index = 0;
        for (dim, &c) in coord.iter().enumerate() {
            if kept_shape[dim] != 1 {
                out_index += c * kept_strides[dim];
            }
        }
        result[out_index] += data[source.get_offset(&coord)];
    }
    result
}

// --- Backward Operation ---

/// Backward of a sum: every input element receives the upstream gradient of
/// the slot it was summed into.
#[derive(Debug)]
struct SumBackward {
    input: Tensor,
    input_shape: Vec<usize>,
    kept_shape: Vec<usize>,
}

impl BackwardOp for SumBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, ExtorchError> {
        let grad_input = grad_output
            .reshape_contiguous(self.kept_shape.clone())?
            .expand_to_shape(&self.input_shape)?;
        Ok(vec![grad_input])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.clone()]
    }

    fn name(&self) -> &'static str {
        "SumBackward"
    }
}

#[cfg(test)]
#[path = "sum_test.rs"]
mod tests;
