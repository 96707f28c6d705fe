use extorch_core::Tensor;

#[allow(dead_code)]
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[allow(dead_code)]
pub fn create_test_tensor(data: Vec<f32>, shape: Vec<usize>) -> Tensor {
    Tensor::new(data, shape).expect("Test tensor creation failed")
}

#[allow(dead_code)]
pub fn create_leaf(data: Vec<f32>, shape: Vec<usize>) -> Tensor {
    let t = create_test_tensor(data, shape);
    t.set_requires_grad(true).expect("set_requires_grad failed");
    t
}
