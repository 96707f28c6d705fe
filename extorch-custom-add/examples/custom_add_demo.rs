//! # Custom add demo
//!
//! Adds two small tensors through the `custom_add_cpp` extension, then runs
//! `sum().backward()` and prints the gradient of each input.
//!
//! ## Running
//! `RUST_LOG=debug cargo run -p extorch-custom-add --example custom_add_demo`
//!
//! With `RUST_LOG=debug` the trace lines of the extension (forward, the
//! autograd wrapper and backward) are printed as well.

use extorch_core::ops::reduction::sum_op;
use extorch_core::{ExtorchError, Tensor};
use extorch_custom_add::{custom_add, load, LoadOptions};

fn main() -> Result<(), ExtorchError> {
    env_logger::init();

    // Load eagerly so a verbose registration line is emitted up front.
    load(&LoadOptions::default().verbose(true))?;

    let input1 = Tensor::new(vec![1.0, 2.0, 3.0], vec![3])?;
    input1.set_requires_grad(true)?;
    let input2 = Tensor::new(vec![4.0, 5.0, 6.0], vec![3])?;
    input2.set_requires_grad(true)?;

    let output = custom_add(&input1, &input2)?;
    println!("Output after custom add: {:?}", output);

    sum_op(&output, None, false)?.backward(None)?;

    match (input1.grad(), input2.grad()) {
        (Some(grad1), Some(grad2)) => {
            println!("Gradient of input1: {:?}", grad1);
            println!("Gradient of input2: {:?}", grad2);
            Ok(())
        }
        _ => Err(ExtorchError::BackwardError(
            "inputs did not receive gradients".to_string(),
        )),
    }
}
