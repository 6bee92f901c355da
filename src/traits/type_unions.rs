use std::fmt::Debug;

use num_complex::{Complex, ComplexFloat};
use num_traits::{Float as NumFloat, NumAssign};

use crate::enums::dtype::DType;

/// Trait for types valid as tensor elements.
///
/// Every element type carries its logical [`DType`] so that the unified
/// [`crate::NumericTensor`] enum and the typed `Tensor<T>` storage stay in
/// agreement without runtime bookkeeping.
pub trait Element: Copy + Default + PartialEq + Debug + Send + Sync + 'static {
    /// Logical dtype of this element type.
    const DTYPE: DType;
}

impl Element for bool {
    const DTYPE: DType = DType::Bool;
}
impl Element for i32 {
    const DTYPE: DType = DType::Int32;
}
impl Element for i64 {
    const DTYPE: DType = DType::Int64;
}
impl Element for f32 {
    const DTYPE: DType = DType::Float32;
}
impl Element for f64 {
    const DTYPE: DType = DType::Float64;
}
impl Element for Complex<f32> {
    const DTYPE: DType = DType::Complex64;
}
impl Element for Complex<f64> {
    const DTYPE: DType = DType::Complex128;
}

/// Trait for types valid as real floating-point elements.
///
/// Useful when specifying `my_fn::<T: Real>() {}`.
///
/// Extends and constrains the *num-traits* `Float` implementation to fit the
/// crate's type universe.
pub trait Real: NumFloat + NumAssign + Element {}
impl Real for f32 {}
impl Real for f64 {}

/// Trait for types valid as linear-algebra scalars: real or complex,
/// single or double precision.
///
/// Extends the *num-complex* `ComplexFloat` implementation with the lift
/// from the associated real type, so generic kernels can form values like
/// `sqrt(re)` without branching on realness.
pub trait LinalgScalar: ComplexFloat + NumAssign + Element {
    /// Embeds a real value into this scalar type.
    fn from_real(re: Self::Real) -> Self;

    /// Dtype a kernel produces when it must upcast this type to complex.
    const COMPLEX_DTYPE: DType;
}

impl LinalgScalar for f32 {
    #[inline]
    fn from_real(re: f32) -> f32 {
        re
    }
    const COMPLEX_DTYPE: DType = DType::Complex64;
}

impl LinalgScalar for f64 {
    #[inline]
    fn from_real(re: f64) -> f64 {
        re
    }
    const COMPLEX_DTYPE: DType = DType::Complex128;
}

impl LinalgScalar for Complex<f32> {
    #[inline]
    fn from_real(re: f32) -> Complex<f32> {
        Complex::new(re, 0.0)
    }
    const COMPLEX_DTYPE: DType = DType::Complex64;
}

impl LinalgScalar for Complex<f64> {
    #[inline]
    fn from_real(re: f64) -> Complex<f64> {
        Complex::new(re, 0.0)
    }
    const COMPLEX_DTYPE: DType = DType::Complex128;
}
