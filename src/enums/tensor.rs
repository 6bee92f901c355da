//! # **NumericTensor Module** - *High-Level Tensor Type for Unified Signature Dispatch*
//!
//! NumericTensor unifies the real, complex, integer, and boolean tensor
//! variants into a single enum so that kernels and the batching machinery
//! can move operands around without generics at the call surface.
//!
//! ## Features
//! - direct variant access
//! - zero-cost access when the type is known
//! - per-variant dtype tracking with no runtime bookkeeping
//! - centralises dispatch
//!
//! Output dtype is whatever the kernel produced; the adapter never coerces
//! a result to match the input dtype.

use std::fmt::{Display, Formatter};
use std::sync::Arc;

use num_complex::Complex;

use crate::enums::dtype::DType;
use crate::structs::tensor::Tensor;
use crate::traits::type_unions::Element;
use crate::{impl_tensor_from, with_numeric_tensor};

/// # NumericTensor
///
/// Unified numeric tensor container.
///
/// ## Purpose
/// Exists to unify operand handling across element types,
/// simplify API's and streamline user ergonomics.
///
/// ## Usage
/// - Construct from any typed [`Tensor`] via `From`/`Into`.
/// - Drill down with the typed accessors, e.g. `.f64()`, when the variant
///   is known at the call site.
/// - `Null` is a default marker for `mem::take`; populated values never
///   hold it.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum NumericTensor {
    Bool(Arc<Tensor<bool>>),
    Int32(Arc<Tensor<i32>>),
    Int64(Arc<Tensor<i64>>),
    Float32(Arc<Tensor<f32>>),
    Float64(Arc<Tensor<f64>>),
    Complex64(Arc<Tensor<Complex<f32>>>),
    Complex128(Arc<Tensor<Complex<f64>>>),
    #[default]
    Null,
}

impl_tensor_from!(
    bool => Bool,
    i32 => Int32,
    i64 => Int64,
    f32 => Float32,
    f64 => Float64,
    Complex<f32> => Complex64,
    Complex<f64> => Complex128,
);

impl NumericTensor {
    /// Logical element type.
    #[inline]
    pub fn dtype(&self) -> DType {
        match self {
            NumericTensor::Bool(_) => DType::Bool,
            NumericTensor::Int32(_) => DType::Int32,
            NumericTensor::Int64(_) => DType::Int64,
            NumericTensor::Float32(_) => DType::Float32,
            NumericTensor::Float64(_) => DType::Float64,
            NumericTensor::Complex64(_) => DType::Complex64,
            NumericTensor::Complex128(_) => DType::Complex128,
            NumericTensor::Null => unreachable!("dtype of Null tensor marker"),
        }
    }

    /// Dimension sizes, outermost first.
    #[inline]
    pub fn shape(&self) -> &[usize] {
        with_numeric_tensor!(self, t => t.shape.as_slice(), &[])
    }

    /// Number of dimensions.
    #[inline]
    pub fn rank(&self) -> usize {
        self.shape().len()
    }

    /// Total number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        with_numeric_tensor!(self, t => t.len(), 0)
    }

    /// Returns true if the tensor holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copies the contiguous core block starting at element `offset` into
    /// a fresh tensor of shape `core_shape`, preserving the variant.
    ///
    /// The caller guarantees the block lies within bounds; the batching
    /// planner derives `offset` from validated batch strides.
    pub fn core_block(&self, offset: usize, core_shape: &[usize]) -> NumericTensor {
        let core_len: usize = core_shape.iter().product();
        with_numeric_tensor!(
            self,
            t => NumericTensor::from(Tensor::new(
                core_shape.to_vec(),
                t.block(offset, core_len).to_vec(),
            )),
            NumericTensor::Null
        )
    }

    /// Typed accessor for `Bool`.
    #[inline]
    pub fn bool_(&self) -> Option<&Tensor<bool>> {
        match self {
            NumericTensor::Bool(t) => Some(t),
            _ => None,
        }
    }

    /// Typed accessor for `Int32`.
    #[inline]
    pub fn i32(&self) -> Option<&Tensor<i32>> {
        match self {
            NumericTensor::Int32(t) => Some(t),
            _ => None,
        }
    }

    /// Typed accessor for `Int64`.
    #[inline]
    pub fn i64(&self) -> Option<&Tensor<i64>> {
        match self {
            NumericTensor::Int64(t) => Some(t),
            _ => None,
        }
    }

    /// Typed accessor for `Float32`.
    #[inline]
    pub fn f32(&self) -> Option<&Tensor<f32>> {
        match self {
            NumericTensor::Float32(t) => Some(t),
            _ => None,
        }
    }

    /// Typed accessor for `Float64`.
    #[inline]
    pub fn f64(&self) -> Option<&Tensor<f64>> {
        match self {
            NumericTensor::Float64(t) => Some(t),
            _ => None,
        }
    }

    /// Typed accessor for `Complex64`.
    #[inline]
    pub fn c64(&self) -> Option<&Tensor<Complex<f32>>> {
        match self {
            NumericTensor::Complex64(t) => Some(t),
            _ => None,
        }
    }

    /// Typed accessor for `Complex128`.
    #[inline]
    pub fn c128(&self) -> Option<&Tensor<Complex<f64>>> {
        match self {
            NumericTensor::Complex128(t) => Some(t),
            _ => None,
        }
    }

    /// Widens any floating variant to a flat `Complex<f64>` buffer.
    ///
    /// Returns `None` for boolean and integer variants; those compare
    /// exactly rather than numerically.
    pub fn to_complex128_vec(&self) -> Option<Vec<Complex<f64>>> {
        match self {
            NumericTensor::Float32(t) => Some(
                t.data.iter().map(|&v| Complex::new(v as f64, 0.0)).collect(),
            ),
            NumericTensor::Float64(t) => {
                Some(t.data.iter().map(|&v| Complex::new(v, 0.0)).collect())
            }
            NumericTensor::Complex64(t) => Some(
                t.data
                    .iter()
                    .map(|v| Complex::new(v.re as f64, v.im as f64))
                    .collect(),
            ),
            NumericTensor::Complex128(t) => Some(t.data.clone()),
            _ => None,
        }
    }

    /// Elementwise closeness: identical shape and dtype family, with
    /// floating values compared by magnitude against `atol` and integer
    /// or boolean values compared exactly.
    pub fn allclose(&self, other: &NumericTensor, atol: f64) -> bool {
        if self.shape() != other.shape() {
            return false;
        }
        match (self.to_complex128_vec(), other.to_complex128_vec()) {
            (Some(a), Some(b)) => a
                .iter()
                .zip(&b)
                .all(|(x, y)| (x - y).norm() <= atol),
            _ => self == other,
        }
    }

    /// Allocates a zero-filled tensor of the given dtype and shape.
    pub fn zeros(dtype: DType, shape: &[usize]) -> NumericTensor {
        match dtype {
            DType::Bool => Tensor::<bool>::zeros(shape.to_vec()).into(),
            DType::Int32 => Tensor::<i32>::zeros(shape.to_vec()).into(),
            DType::Int64 => Tensor::<i64>::zeros(shape.to_vec()).into(),
            DType::Float32 => Tensor::<f32>::zeros(shape.to_vec()).into(),
            DType::Float64 => Tensor::<f64>::zeros(shape.to_vec()).into(),
            DType::Complex64 => Tensor::<Complex<f32>>::zeros(shape.to_vec()).into(),
            DType::Complex128 => Tensor::<Complex<f64>>::zeros(shape.to_vec()).into(),
        }
    }
}

/// Convenience constructor used pervasively by kernels and tests.
pub fn tensor_of<T: Element>(shape: impl Into<Vec<usize>>, data: Vec<T>) -> Tensor<T> {
    Tensor::new(shape, data)
}

impl Display for NumericTensor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            NumericTensor::Null => write!(f, "NumericTensor::Null"),
            other => write!(
                f,
                "NumericTensor (dtype: {}, shape: {:?})",
                other.dtype(),
                other.shape()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dtype_and_shape() {
        let t: NumericTensor = Tensor::new([2, 2], vec![1.0f64, 2.0, 3.0, 4.0]).into();
        assert_eq!(t.dtype(), DType::Float64);
        assert_eq!(t.shape(), &[2, 2]);
        assert_eq!(t.rank(), 2);
        assert_eq!(t.len(), 4);
    }

    #[test]
    fn test_core_block_preserves_variant() {
        let t: NumericTensor = Tensor::new([2, 2], vec![1i32, 2, 3, 4]).into();
        let block = t.core_block(2, &[2]);
        assert_eq!(block.dtype(), DType::Int32);
        assert_eq!(block.i32().unwrap().data, vec![3, 4]);
    }

    #[test]
    fn test_allclose_across_precisions() {
        let a: NumericTensor = Tensor::new([2], vec![1.0f32, 2.0]).into();
        let b: NumericTensor = Tensor::new([2], vec![1.0f64, 2.0 + 1e-9]).into();
        assert!(a.allclose(&b, 1e-6));
        assert!(!a.allclose(&b, 1e-12));
    }

    #[test]
    fn test_zeros_by_dtype() {
        let z = NumericTensor::zeros(DType::Complex64, &[3]);
        assert_eq!(z.dtype(), DType::Complex64);
        assert_eq!(z.len(), 3);
    }
}
