/// Defines the possible data types for Tensor elements.
///
/// This enum allows the framework to handle tensors with different
/// numerical types dynamically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    /// 32-bit floating-point type.
    F32,
    /// 64-bit floating-point type.
    F64,
}

impl DType {
    /// Data type of the result of a binary operation between `self` and `other`.
    ///
    /// Mixed precision promotes to `F64`.
    pub fn promote(self, other: DType) -> DType {
        match (self, other) {
            (DType::F32, DType::F32) => DType::F32,
            _ => DType::F64,
        }
    }

    /// Size in bytes of one element.
    pub fn size_of(&self) -> usize {
        match self {
            DType::F32 => std::mem::size_of::<f32>(),
            DType::F64 => std::mem::size_of::<f64>(),
        }
    }
}
