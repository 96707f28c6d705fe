use super::*;
use crate::buffer::Buffer;

#[test]
fn test_new_and_accessors() {
    let t = Tensor::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![2, 3]).unwrap();
    assert_eq!(t.shape(), vec![2, 3]);
    assert_eq!(t.strides(), vec![3, 1]);
    assert_eq!(t.rank(), 2);
    assert_eq!(t.numel(), 6);
    assert_eq!(t.dtype(), DType::F32);
    assert!(t.is_contiguous());
    assert!(!t.requires_grad());
    assert!(t.is_leaf());
}

#[test]
fn test_get_data_checks_dtype() {
    let t = Tensor::new_f64(vec![1.5, 2.5], vec![2]).unwrap();
    assert_eq!(t.get_f64_data().unwrap(), vec![1.5, 2.5]);
    assert!(matches!(
        t.get_f32_data(),
        Err(ExtorchError::DataTypeMismatch { expected: DType::F32, actual: DType::F64, .. })
    ));
}

#[test]
fn test_clone_is_shallow() {
    let t = Tensor::new(vec![1.0], vec![1]).unwrap();
    let handle = t.clone();
    assert!(handle.is_same(&t));
    handle.set_requires_grad(true).unwrap();
    assert!(t.requires_grad(), "Metadata is shared between handles");
}

#[test]
fn test_deep_clone_is_independent() {
    let t = Tensor::new(vec![1.0, 2.0], vec![2]).unwrap();
    t.set_requires_grad(true).unwrap();
    let copy = t.deep_clone().unwrap();
    assert_eq!(copy, t);
    assert!(!copy.is_same(&t));
    assert!(!copy.shares_buffer_with(&t));
    assert!(!copy.requires_grad());
    assert!(copy.grad_fn().is_none());
}

#[test]
fn test_deep_clone_of_strided_view_is_contiguous() {
    let base = Tensor::new(vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0], vec![2, 3]).unwrap();
    let buffer = Arc::clone(base.read_data().buffer());
    let column = Tensor::from_tensor_data(TensorData::new_view(buffer, 2, vec![2], vec![3]).unwrap());
    let copy = column.deep_clone().unwrap();
    assert!(copy.is_contiguous());
    assert_eq!(copy.get_f32_data().unwrap(), vec![2.0, 5.0]);
    assert_eq!(*copy.read_data().buffer().as_ref(), Buffer::F32(vec![2.0, 5.0]));
}

#[test]
fn test_to_dtype() {
    let t = Tensor::new(vec![1.0, 2.0], vec![2]).unwrap();
    let same = t.to_dtype(DType::F32).unwrap();
    assert!(same.is_same(&t));
    let wide = t.to_dtype(DType::F64).unwrap();
    assert_eq!(wide.dtype(), DType::F64);
    assert_eq!(wide.get_f64_data().unwrap(), vec![1.0, 2.0]);
}

#[test]
fn test_tensor_equality() {
    let t1 = Tensor::new(vec![1.0, 2.0], vec![2]).unwrap();
    let t2 = Tensor::new(vec![1.0, 2.0], vec![2]).unwrap();
    assert_eq!(t1, t2, "Tensors with same data and shape should be equal");

    let t3 = Tensor::new(vec![1.0, 2.5], vec![2]).unwrap();
    assert_ne!(t1, t3, "Tensors with different data should not be equal");

    let t4 = Tensor::new(vec![1.0, 2.0], vec![1, 2]).unwrap();
    assert_ne!(t1, t4, "Tensors with different shape should not be equal");

    let t5 = Tensor::new_f64(vec![1.0, 2.0], vec![2]).unwrap();
    assert_ne!(t1, t5, "Tensors with different dtype should not be equal");
}

#[test]
fn test_debug_shows_values() {
    let t = Tensor::new(vec![1.0, 2.0], vec![2]).unwrap();
    let text = format!("{:?}", t);
    assert!(text.contains("[1.0, 2.0]"), "{}", text);
    assert!(text.contains("F32"), "{}", text);
}

#[test]
fn test_tensor_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Tensor>();
}
