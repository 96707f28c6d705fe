use crate::error::ExtorchError;
use crate::tensor::Tensor;
use crate::types::DType;
use thiserror::Error;

/// Error type specifically for gradient checking failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GradCheckError {
    #[error("Gradient check failed for input tensor at index {input_index}, element index {element_index}: Analytical grad {analytical_grad:?} != Numerical grad {numerical_grad:?}. Difference: {difference:?}")]
    GradientMismatch {
        input_index: usize,
        element_index: usize,
        analytical_grad: f64,
        numerical_grad: f64,
        difference: f64,
    },
    #[error("Forward function execution failed during gradient check: {0}")]
    ForwardPassError(ExtorchError),
    #[error("Backward pass execution failed during gradient check: {0}")]
    BackwardPassError(ExtorchError),
    #[error("Tensor error during intermediate calculation: {0}")]
    TensorError(ExtorchError),
    #[error("Input tensor {input_index} requires grad but has no gradient after backward pass.")]
    MissingAnalyticalGrad { input_index: usize },
    #[error("Numerical gradient is NaN or infinite for input {input_index}, element {element_index}. Details: Loss+: {loss_plus:?}, Loss-: {loss_minus:?}")]
    NumericalGradNaNOrInfinite {
        input_index: usize,
        element_index: usize,
        loss_plus: f64,
        loss_minus: f64,
    },
    #[error("Gradient check input tensor must be a leaf node (no grad_fn). Input index: {input_index}")]
    InputNotLeaf { input_index: usize },
    #[error("Output has {actual} elements but the output gradient has {expected}.")]
    OutputGradLengthMismatch { expected: usize, actual: usize },
    #[error("Function did not propagate requires_grad correctly.")]
    RequiresGradPropagationError,
}

impl From<ExtorchError> for GradCheckError {
    fn from(err: ExtorchError) -> Self {
        GradCheckError::TensorError(err)
    }
}

/// Compares the analytical gradients produced by the autograd engine against
/// central finite differences.
///
/// The scalar loss is `sum(func(inputs) * output_grad)`, so the analytical
/// gradient of input `i` is what `backward(Some(output_grad))` leaves in
/// `inputs[i].grad()`. Every element of every input that requires grad is
/// perturbed by `±epsilon`; the check fails when
/// `|analytical - numerical| > tolerance * (1 + |numerical|)`.
///
/// Existing gradients on the inputs are cleared first.
pub fn check_grad<F>(
    func: F,
    inputs: &[Tensor],
    output_grad: &Tensor,
    epsilon: f64,
    tolerance: f64,
) -> Result<(), GradCheckError>
where
    F: Fn(&[Tensor]) -> Result<Tensor, ExtorchError>,
{
    for (input_index, input) in inputs.iter().enumerate() {
        if input.grad_fn().is_some() {
            return Err(GradCheckError::InputNotLeaf { input_index });
        }
        input.clear_grad();
    }

    // --- Analytical gradients ---
    let output = func(inputs).map_err(GradCheckError::ForwardPassError)?;
    if !output.requires_grad() {
        return Err(GradCheckError::RequiresGradPropagationError);
    }
    output
        .backward(Some(output_grad.clone()))
        .map_err(GradCheckError::BackwardPassError)?;
    let output_grad_values = output_grad.to_f64_vec();

    // --- Numerical gradients ---
    for (input_index, input) in inputs.iter().enumerate() {
        if !input.requires_grad() {
            continue;
        }
        let analytical = input
            .grad()
            .ok_or(GradCheckError::MissingAnalyticalGrad { input_index })?
            .to_f64_vec();
        let base_values = input.to_f64_vec();

        for element_index in 0..base_values.len() {
            let perturb = |delta: f64| {
                perturbed_loss(&func, inputs, input_index, &base_values, element_index, delta, &output_grad_values)
            };
            let loss_plus = perturb(epsilon)?;
            let loss_minus = perturb(-epsilon)?;
            let numerical_grad = (loss_plus - loss_minus) / (2.0 * epsilon);
            if !numerical_grad.is_finite() {
                return Err(GradCheckError::NumericalGradNaNOrInfinite {
                    input_index,
                    element_index,
                    loss_plus,
                    loss_minus,
                });
            }

            let analytical_grad = analytical[element_index];
            let difference = (analytical_grad - numerical_grad).abs();
            if difference > tolerance * (1.0 + numerical_grad.abs()) {
                return Err(GradCheckError::GradientMismatch {
                    input_index,
                    element_index,
                    analytical_grad,
                    numerical_grad,
                    difference,
                });
            }
        }
    }
    Ok(())
}

/// Evaluates `sum(func(inputs') * output_grad)` where `inputs'` is `inputs`
/// with one element shifted by `delta`. All inputs are detached so no graph is built.
fn perturbed_loss<F>(
    func: &F,
    inputs: &[Tensor],
    input_index: usize,
    base_values: &[f64],
    element_index: usize,
    delta: f64,
    output_grad: &[f64],
) -> Result<f64, GradCheckError>
where
    F: Fn(&[Tensor]) -> Result<Tensor, ExtorchError>,
{
    let mut values = base_values.to_vec();
    values[element_index] += delta;
    let target = &inputs[input_index];
    let perturbed = match target.dtype() {
        DType::F32 => Tensor::new(values.into_iter().map(|v| v as f32).collect(), target.shape())?,
        DType::F64 => Tensor::new_f64(values, target.shape())?,
    };

    let mut call_inputs: Vec<Tensor> = inputs.iter().map(Tensor::detach).collect();
    call_inputs[input_index] = perturbed;

    let output = func(&call_inputs).map_err(GradCheckError::ForwardPassError)?;
    let output_values = output.to_f64_vec();
    if output_values.len() != output_grad.len() {
        return Err(GradCheckError::OutputGradLengthMismatch {
            expected: output_grad.len(),
            actual: output_values.len(),
        });
    }
    Ok(output_values.iter().zip(output_grad).map(|(v, g)| v * g).sum())
}
