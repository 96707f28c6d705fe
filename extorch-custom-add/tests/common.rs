use extorch_core::Tensor;

#[allow(dead_code)]
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[allow(dead_code)]
pub fn create_leaf(data: Vec<f32>, shape: Vec<usize>) -> Tensor {
    let t = Tensor::new(data, shape).expect("Test tensor creation failed");
    t.set_requires_grad(true).expect("set_requires_grad failed");
    t
}
