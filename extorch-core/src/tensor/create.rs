// src/tensor/create.rs

use crate::error::ExtorchError;
use crate::tensor::Tensor;
use crate::types::DType;
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

/// Creates a new f32 tensor filled with zeros with the specified shape.
pub fn zeros(shape: &[usize]) -> Result<Tensor, ExtorchError> {
    full(shape, 0.0)
}

/// Creates a new f64 tensor filled with zeros with the specified shape.
pub fn zeros_f64(shape: &[usize]) -> Result<Tensor, ExtorchError> {
    full_f64(shape, 0.0)
}

/// Creates a new f32 tensor filled with ones with the specified shape.
pub fn ones(shape: &[usize]) -> Result<Tensor, ExtorchError> {
    full(shape, 1.0)
}

pub fn ones_f64(shape: &[usize]) -> Result<Tensor, ExtorchError> {
    full_f64(shape, 1.0)
}

/// Creates a new f32 tensor filled with `value`.
pub fn full(shape: &[usize], value: f32) -> Result<Tensor, ExtorchError> {
    let numel: usize = shape.iter().product();
    Tensor::new(vec![value; numel], shape.to_vec())
}

pub fn full_f64(shape: &[usize], value: f64) -> Result<Tensor, ExtorchError> {
    let numel: usize = shape.iter().product();
    Tensor::new_f64(vec![value; numel], shape.to_vec())
}

/// Creates a tensor filled with `value` with the shape and dtype of `tensor`.
pub fn full_like(tensor: &Tensor, value: f64) -> Result<Tensor, ExtorchError> {
    let shape = tensor.shape();
    match tensor.dtype() {
        DType::F32 => full(&shape, value as f32),
        DType::F64 => full_f64(&shape, value),
    }
}

/// Creates a new tensor filled with zeros, with the same shape and DType as the input tensor.
pub fn zeros_like(tensor: &Tensor) -> Result<Tensor, ExtorchError> {
    full_like(tensor, 0.0)
}

/// Creates a new tensor filled with ones, with the same shape and DType as the input tensor.
pub fn ones_like(tensor: &Tensor) -> Result<Tensor, ExtorchError> {
    full_like(tensor, 1.0)
}

/// Creates a CPU F32 Tensor from a Vec<f32> and shape.
pub fn from_vec_f32(data_vec: Vec<f32>, shape: Vec<usize>) -> Result<Tensor, ExtorchError> {
    Tensor::new(data_vec, shape)
}

/// Creates a CPU F64 Tensor from a Vec<f64> and shape.
pub fn from_vec_f64(data_vec: Vec<f64>, shape: Vec<usize>) -> Result<Tensor, ExtorchError> {
    Tensor::new_f64(data_vec, shape)
}

// Note: rand and randn draw from the thread RNG; the `_with_rng` variants
// take an explicit generator so tests can seed it.

/// Uniform samples in `[0, 1)`.
pub fn rand(shape: &[usize]) -> Result<Tensor, ExtorchError> {
    rand_with_rng(shape, &mut rand::thread_rng())
}

pub fn rand_with_rng<R: Rng + ?Sized>(shape: &[usize], rng: &mut R) -> Result<Tensor, ExtorchError> {
    let numel: usize = shape.iter().product();
    let data_vec: Vec<f32> = (0..numel).map(|_| rng.gen::<f32>()).collect();
    Tensor::new(data_vec, shape.to_vec())
}

/// Samples from the standard normal distribution.
pub fn randn(shape: &[usize]) -> Result<Tensor, ExtorchError> {
    randn_with_rng(shape, &mut rand::thread_rng())
}

pub fn randn_with_rng<R: Rng + ?Sized>(shape: &[usize], rng: &mut R) -> Result<Tensor, ExtorchError> {
    let numel: usize = shape.iter().product();
    let data_vec: Vec<f32> = (0..numel).map(|_| StandardNormal.sample(&mut *rng)).collect();
    Tensor::new(data_vec, shape.to_vec())
}

#[cfg(test)]
#[path = "create_test.rs"]
mod tests;
