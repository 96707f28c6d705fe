use super::*;
use extorch_core::ops::arithmetic::add_op;
use extorch_core::ops::reduction::sum_op;
use extorch_core::tensor::create::{from_vec_f32, from_vec_f64, ones};
use extorch_core::utils::testing::check_tensor_near;

fn leaf(data: Vec<f32>, shape: Vec<usize>) -> Tensor {
    let t = from_vec_f32(data, shape).unwrap();
    t.set_requires_grad(true).unwrap();
    t
}

#[test]
fn test_apply_without_grad_records_nothing() {
    let a = from_vec_f32(vec![1.0, 2.0], vec![2]).unwrap();
    let b = from_vec_f32(vec![3.0, 4.0], vec![2]).unwrap();
    let out = CustomAddFunction::apply(&a, &b).unwrap();
    check_tensor_near(&out, &[2], &[4.0, 6.0], 1e-6);
    assert!(!out.requires_grad());
    assert!(out.grad_fn().is_none());
}

#[test]
fn test_apply_records_backward_node() {
    let a = leaf(vec![1.0, 2.0], vec![2]);
    let b = from_vec_f32(vec![3.0, 4.0], vec![2]).unwrap();
    let out = CustomAddFunction::apply(&a, &b).unwrap();
    assert!(out.requires_grad());
    let grad_fn = out.grad_fn().expect("grad_fn missing");
    assert_eq!(grad_fn.name(), "CustomAddBackward");
    let saved = grad_fn.inputs();
    assert!(saved[0].is_same(&a));
    assert!(saved[1].is_same(&b));
}

#[test]
fn test_custom_add_end_to_end() {
    let a = leaf(vec![1.0, 2.0, 3.0], vec![3]);
    let b = leaf(vec![4.0, 5.0, 6.0], vec![3]);
    let out = custom_add(&a, &b).unwrap();
    check_tensor_near(&out, &[3], &[5.0, 7.0, 9.0], 1e-6);

    sum_op(&out, None, false).unwrap().backward(None).unwrap();
    check_tensor_near(&a.grad().unwrap(), &[3], &[1.0, 1.0, 1.0], 1e-6);
    check_tensor_near(&b.grad().unwrap(), &[3], &[1.0, 1.0, 1.0], 1e-6);
}

#[test]
fn test_custom_add_broadcast_gradients() {
    let a = leaf(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]);
    let b = leaf(vec![10.0, 20.0], vec![1, 2]);
    let out = custom_add(&a, &b).unwrap();
    out.backward(Some(ones(&[2, 2]).unwrap())).unwrap();

    check_tensor_near(&a.grad().unwrap(), &[2, 2], &[1.0, 1.0, 1.0, 1.0], 1e-6);
    check_tensor_near(&b.grad().unwrap(), &[1, 2], &[2.0, 2.0], 1e-6);
}

#[test]
fn test_custom_add_matches_builtin_add() {
    let a1 = leaf(vec![0.5, -1.0, 2.0, 3.0, 4.0, 5.0], vec![2, 3]);
    let b1 = leaf(vec![1.0, 2.0, 3.0], vec![3]);
    let a2 = leaf(vec![0.5, -1.0, 2.0, 3.0, 4.0, 5.0], vec![2, 3]);
    let b2 = leaf(vec![1.0, 2.0, 3.0], vec![3]);
    let upstream = from_vec_f32(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![2, 3]).unwrap();

    let custom = custom_add(&a1, &b1).unwrap();
    let builtin = add_op(&a2, &b2).unwrap();
    assert_eq!(custom, builtin);

    custom.backward(Some(upstream.clone())).unwrap();
    builtin.backward(Some(upstream)).unwrap();
    assert_eq!(a1.grad().unwrap(), a2.grad().unwrap());
    assert_eq!(b1.grad().unwrap(), b2.grad().unwrap());
    check_tensor_near(&b1.grad().unwrap(), &[3], &[5.0, 7.0, 9.0], 1e-6);
}

#[test]
fn test_custom_add_in_a_chain() {
    // y = sum(custom_add(custom_add(a, b), a)): d y / d a = 2
    let a = leaf(vec![1.0, 2.0], vec![2]);
    let b = leaf(vec![3.0, 4.0], vec![2]);
    let ab = custom_add(&a, &b).unwrap();
    let y = sum_op(&custom_add(&ab, &a).unwrap(), None, false).unwrap();
    y.backward(None).unwrap();
    check_tensor_near(&a.grad().unwrap(), &[2], &[2.0, 2.0], 1e-6);
    check_tensor_near(&b.grad().unwrap(), &[2], &[1.0, 1.0], 1e-6);
}

#[test]
fn test_custom_add_shape_mismatch() {
    let a = from_vec_f64(vec![1.0, 2.0, 3.0], vec![3]).unwrap();
    let b = from_vec_f64(vec![1.0, 2.0], vec![2]).unwrap();
    assert!(matches!(
        custom_add(&a, &b),
        Err(ExtorchError::ShapeMismatch { .. })
    ));
}
