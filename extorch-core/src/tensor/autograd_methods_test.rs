use super::*;
use crate::ops::arithmetic::add_op;
use crate::ops::reduction::sum_op;
use crate::utils::testing::{check_tensor_near, create_test_tensor, create_test_tensor_with_grad};

#[test]
fn test_detach_basic() {
    let t1 = create_test_tensor_with_grad(vec![1.0, 2.0, 3.0], vec![3]);
    let t1_added = add_op(&t1, &t1).unwrap();
    assert!(t1_added.requires_grad(), "Result of add should require grad");
    assert!(t1_added.grad_fn().is_some(), "Result of add should have grad_fn");

    let t2 = t1_added.detach();

    assert!(!t2.requires_grad(), "Detached tensor should not require grad");
    assert!(t2.grad_fn().is_none(), "Detached tensor should not have grad_fn");
    assert!(t2.grad().is_none(), "Detached tensor should not have grad");
    assert_eq!(t1_added.shape(), t2.shape());
    assert_eq!(t1_added.strides(), t2.strides());
    assert!(t2.shares_buffer_with(&t1_added), "Detach should share the buffer");
    assert_eq!(t1_added.get_f32_data().unwrap(), t2.get_f32_data().unwrap());
}

#[test]
fn test_backward_requires_grad() {
    let t = create_test_tensor(vec![1.0], vec![1]);
    assert_eq!(t.backward(None), Err(ExtorchError::RequiresGradNotMet));
}

#[test]
fn test_backward_non_scalar_without_gradient() {
    let a = create_test_tensor_with_grad(vec![1.0, 2.0], vec![2]);
    let out = add_op(&a, &a).unwrap();
    assert_eq!(out.backward(None), Err(ExtorchError::BackwardNonScalar));
}

#[test]
fn test_backward_gradient_shape_mismatch() {
    let a = create_test_tensor_with_grad(vec![1.0, 2.0, 3.0], vec![3]);
    let out = add_op(&a, &a).unwrap();
    let wrong = create_test_tensor(vec![1.0, 1.0], vec![2]);
    assert_eq!(
        out.backward(Some(wrong)),
        Err(ExtorchError::GradientShapeMismatch { expected: vec![3], actual: vec![2] })
    );
}

#[test]
fn test_backward_same_input_twice_accumulates() {
    // out = a + a  =>  d out / d a = 2
    let a = create_test_tensor_with_grad(vec![1.0, 2.0], vec![2]);
    let out = add_op(&a, &a).unwrap();
    let loss = sum_op(&out, None, false).unwrap();
    loss.backward(None).unwrap();
    check_tensor_near(&a.grad().unwrap(), &[2], &[2.0, 2.0], 1e-6);
}

#[test]
fn test_backward_called_twice_accumulates_in_leaf() {
    let a = create_test_tensor_with_grad(vec![3.0], vec![1]);
    let b = create_test_tensor(vec![4.0], vec![1]);
    let out = add_op(&a, &b).unwrap();
    out.backward(None).unwrap();
    out.backward(None).unwrap();
    check_tensor_near(&a.grad().unwrap(), &[1], &[2.0], 1e-6);
    assert!(b.grad().is_none(), "Inputs that do not require grad get no gradient");
}

#[test]
fn test_backward_on_leaf_sets_its_own_grad() {
    let a = create_test_tensor_with_grad(vec![5.0], vec![]);
    a.backward(None).unwrap();
    check_tensor_near(&a.grad().unwrap(), &[], &[1.0], 1e-6);
}

#[test]
fn test_backward_mixed_dtype_casts_to_leaf_dtype() {
    let a = create_test_tensor_with_grad(vec![1.0, 2.0], vec![2]);
    let b = Tensor::new_f64(vec![0.5, 0.5], vec![2]).unwrap();
    b.set_requires_grad(true).unwrap();
    let out = add_op(&a, &b).unwrap();
    assert_eq!(out.dtype(), crate::DType::F64);

    let loss = sum_op(&out, None, false).unwrap();
    loss.backward(None).unwrap();
    assert_eq!(a.grad().unwrap().dtype(), crate::DType::F32);
    assert_eq!(b.grad().unwrap().dtype(), crate::DType::F64);
    check_tensor_near(&a.grad().unwrap(), &[2], &[1.0, 1.0], 1e-6);
}

#[test]
fn test_set_grad_fn_marks_requires_grad() {
    let a = create_test_tensor_with_grad(vec![1.0], vec![1]);
    let out = add_op(&a, &a).unwrap();
    let plain = create_test_tensor(vec![0.0], vec![1]);
    plain.set_grad_fn(out.grad_fn()).unwrap();
    assert!(plain.requires_grad());
    assert!(!plain.is_leaf());
}

#[test]
fn test_clear_grad() {
    let a = create_test_tensor_with_grad(vec![1.0], vec![1]);
    a.backward(None).unwrap();
    assert!(a.grad().is_some());
    a.clear_grad();
    assert!(a.grad().is_none());
}
