pub mod add;

pub use add::{add_kernel_op, add_op};
