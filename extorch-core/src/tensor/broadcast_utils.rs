use crate::buffer::Buffer;
use crate::error::ExtorchError;
use crate::ops::reduction::sum_op;
use crate::tensor::utils::{broadcast_shapes, broadcast_source_offset, index_to_coord};
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;
use std::sync::Arc;

impl Tensor {
    /// Reduces the tensor (gradient) to match a target shape by summing along broadcasted dimensions.
    ///
    /// Counterpart of broadcasting in the backward pass: leading dimensions the
    /// target lacks are summed away, and dimensions where the target has size 1
    /// are summed with `keep_dims`.
    pub fn reduce_to_shape(&self, target_shape: &[usize]) -> Result<Tensor, ExtorchError> {
        let current_shape = self.shape();
        if current_shape == target_shape {
            return Ok(self.clone());
        }

        let current_rank = current_shape.len();
        let target_rank = target_shape.len();
        if current_rank < target_rank {
            return Err(ExtorchError::BackwardError(format!(
                "Cannot reduce shape {:?} to target {:?}: current rank < target rank.",
                current_shape, target_shape
            )));
        }

        let rank_diff = current_rank - target_rank;
        let mut axes_to_reduce: Vec<usize> = (0..rank_diff).collect();
        for (i, &target_dim) in target_shape.iter().enumerate() {
            let current_dim = current_shape[rank_diff + i];
            if current_dim == target_dim {
                continue;
            }
            if target_dim == 1 {
                axes_to_reduce.push(rank_diff + i);
            } else {
                return Err(ExtorchError::BackwardError(format!(
                    "Cannot reduce shape {:?} to target {:?}: incompatible dim {} ({} vs target {}).",
                    current_shape, target_shape, i, current_dim, target_dim
                )));
            }
        }

        let reduced = sum_op(self, Some(&axes_to_reduce), true)?;
        reduced.reshape_contiguous(target_shape.to_vec())
    }

    /// Materializes this tensor broadcast to `target_shape` in a new buffer.
    pub fn expand_to_shape(&self, target_shape: &[usize]) -> Result<Tensor, ExtorchError> {
        let current_shape = self.shape();
        if current_shape == target_shape {
            return Ok(self.clone());
        }
        match broadcast_shapes(&current_shape, target_shape) {
            Ok(shape) if shape == target_shape => {}
            _ => {
                return Err(ExtorchError::ShapeMismatch {
                    shape1: current_shape,
                    shape2: target_shape.to_vec(),
                    operation: "expand".to_string(),
                })
            }
        }

        let guard = self.read_data();
        let buffer = match &*guard.buffer {
            Buffer::F32(data) => Buffer::F32(expand_kernel(&guard, data, target_shape)),
            Buffer::F64(data) => Buffer::F64(expand_kernel(&guard, data, target_shape)),
        };
        drop(guard);
        Ok(Tensor::from_tensor_data(TensorData::from_buffer(buffer, target_shape.to_vec())?))
    }

    /// Reinterprets the elements under `new_shape` (same numel). Shares the
    /// buffer when contiguous, copies otherwise. The result is detached.
    pub(crate) fn reshape_contiguous(&self, new_shape: Vec<usize>) -> Result<Tensor, ExtorchError> {
        let guard = self.read_data();
        let new_numel: usize = new_shape.iter().product();
        if new_numel != guard.numel() {
            return Err(ExtorchError::TensorCreationError {
                data_len: guard.numel(),
                shape: new_shape,
            });
        }
        if guard.is_contiguous() {
            let strides = crate::tensor::utils::calculate_strides(&new_shape);
            let view = TensorData::new_view(Arc::clone(&guard.buffer), guard.offset, new_shape, strides)?;
            return Ok(Tensor::from_tensor_data(view));
        }
        let buffer = guard.gather_buffer();
        drop(guard);
        Ok(Tensor::from_tensor_data(TensorData::from_buffer(buffer, new_shape)?))
    }
}

/// Gathers `source` broadcast onto `target_shape` in row-major order.
pub(crate) fn expand_kernel<T: Copy>(source: &TensorData, data: &[T], target_shape: &[usize]) -> Vec<T> {
    let target_numel: usize = target_shape.iter().product();
    (0..target_numel)
        .map(|i| {
            let coord = index_to_coord(i, target_shape);
            data[broadcast_source_offset(&coord, &source.shape, &source.strides, source.offset)]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::error::ExtorchError;
    use crate::utils::testing::{check_tensor_near, create_test_tensor};

    #[test]
    fn test_reduce_to_shape_identity() {
        let t = create_test_tensor(vec![1.0, 2.0], vec![2]);
        let r = t.reduce_to_shape(&[2]).unwrap();
        assert!(r.is_same(&t));
    }

    #[test]
    fn test_reduce_to_shape_row_vector() {
        let t = create_test_tensor(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]);
        let r = t.reduce_to_shape(&[1, 2]).unwrap();
        check_tensor_near(&r, &[1, 2], &[4.0, 6.0], 1e-6);
    }

    #[test]
    fn test_reduce_to_shape_leading_dims() {
        let t = create_test_tensor(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![2, 3]);
        let r = t.reduce_to_shape(&[3]).unwrap();
        check_tensor_near(&r, &[3], &[5.0, 7.0, 9.0], 1e-6);
    }

    #[test]
    fn test_reduce_to_scalar() {
        let t = create_test_tensor(vec![1.0, 2.0, 3.0], vec![3]);
        let r = t.reduce_to_shape(&[]).unwrap();
        check_tensor_near(&r, &[], &[6.0], 1e-6);
    }

    #[test]
    fn test_reduce_to_shape_incompatible() {
        let t = create_test_tensor(vec![1.0, 2.0, 3.0], vec![3]);
        assert!(matches!(t.reduce_to_shape(&[2]), Err(ExtorchError::BackwardError(_))));
        assert!(matches!(t.reduce_to_shape(&[1, 3]), Err(ExtorchError::BackwardError(_))));
    }

    #[test]
    fn test_expand_to_shape() {
        let t = create_test_tensor(vec![10.0, 20.0], vec![1, 2]);
        let e = t.expand_to_shape(&[3, 2]).unwrap();
        check_tensor_near(&e, &[3, 2], &[10.0, 20.0, 10.0, 20.0, 10.0, 20.0], 1e-6);
        assert!(e.is_contiguous());
    }

    #[test]
    fn test_expand_to_shape_rejects_shrinking() {
        let t = create_test_tensor(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]);
        assert!(matches!(
            t.expand_to_shape(&[1, 2]),
            Err(ExtorchError::ShapeMismatch { .. })
        ));
    }
}
