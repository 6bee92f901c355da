//! # DType Enum Module
//!
//! Logical element types in the crate's numeric universe, with the
//! promotion rules kernels rely on when mixing operands.

use std::fmt;

/// Logical element type of a [`crate::NumericTensor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    Bool,
    Int32,
    Int64,
    Float32,
    Float64,
    Complex64,
    Complex128,
}

impl DType {
    /// True for `Float32`/`Float64`/`Complex64`/`Complex128`.
    #[inline]
    pub fn is_floating(self) -> bool {
        matches!(
            self,
            DType::Float32 | DType::Float64 | DType::Complex64 | DType::Complex128
        )
    }

    /// True for `Complex64`/`Complex128`.
    #[inline]
    pub fn is_complex(self) -> bool {
        matches!(self, DType::Complex64 | DType::Complex128)
    }

    /// The complex dtype of the same precision.
    ///
    /// Used by kernels that upcast real input to complex output,
    /// e.g. polynomial roots of a real coefficient vector.
    #[inline]
    pub fn to_complex(self) -> DType {
        match self {
            DType::Float32 | DType::Complex64 => DType::Complex64,
            _ => DType::Complex128,
        }
    }

    /// NumPy-style promotion of two dtypes within this universe.
    ///
    /// Width and realness promote independently: any complex operand makes
    /// the result complex, and any double-precision operand makes the
    /// result double precision. Integers and booleans promote to `Float64`
    /// when mixed with floating types, matching NumPy's default behaviour.
    pub fn promote(self, other: DType) -> DType {
        use DType::*;
        if self == other {
            return self;
        }
        match (self, other) {
            (Bool, x) | (x, Bool) => x,
            (Int32, Int64) | (Int64, Int32) => Int64,
            (Int32 | Int64, x) | (x, Int32 | Int64) if x.is_floating() => {
                if x.is_complex() { Complex128 } else { Float64 }
            }
            (Float32, Float64) | (Float64, Float32) => Float64,
            (Float32, Complex64) | (Complex64, Float32) => Complex64,
            (Float32, Complex128) | (Complex128, Float32) => Complex128,
            (Float64, Complex64) | (Complex64, Float64) => Complex128,
            (Float64, Complex128) | (Complex128, Float64) => Complex128,
            (Complex64, Complex128) | (Complex128, Complex64) => Complex128,
            _ => Float64,
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DType::Bool => "bool",
            DType::Int32 => "int32",
            DType::Int64 => "int64",
            DType::Float32 => "float32",
            DType::Float64 => "float64",
            DType::Complex64 => "complex64",
            DType::Complex128 => "complex128",
        };
        write!(f, "{}", s)
    }
}
