use crate::tensor::Tensor;
use approx::abs_diff_eq;

/// Checks that `actual` has `expected_shape` and that every element lies
/// within `tolerance` of `expected_data`. Works for both dtypes.
///
/// Panics with the first offending index otherwise.
pub fn check_tensor_near(actual: &Tensor, expected_shape: &[usize], expected_data: &[f64], tolerance: f64) {
    assert_eq!(actual.shape(), expected_shape, "Shape mismatch");

    let actual_data = actual.to_f64_vec();
    assert_eq!(actual_data.len(), expected_data.len(), "Data length mismatch");

    for (i, (a, e)) in actual_data.iter().zip(expected_data).enumerate() {
        if !abs_diff_eq!(*a, *e, epsilon = tolerance) {
            panic!(
                "Data mismatch at index {}: actual={:?}, expected={:?}, diff={:?}, tolerance={:?}",
                i,
                a,
                e,
                (a - e).abs(),
                tolerance
            );
        }
    }
}

#[cfg(test)]
pub(crate) fn create_test_tensor(data: Vec<f32>, shape: Vec<usize>) -> Tensor {
    Tensor::new(data, shape).expect("Failed to create test tensor")
}

#[cfg(test)]
pub(crate) fn create_test_tensor_with_grad(data: Vec<f32>, shape: Vec<usize>) -> Tensor {
    let tensor = create_test_tensor(data, shape);
    tensor.write_data().requires_grad = true;
    tensor
}
