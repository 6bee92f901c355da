//! # Arg Enum Module
//!
//! Call-argument value union for the adapter surface.
//!
//! A routine call is a sequence of `Arg` values: tensor operands plus any
//! scalar configuration flags. `Arg::None` marks a parameter the caller
//! did not supply; the kernel applies its own default in that case - the
//! adapter never invents one.

use std::fmt;

use crate::enums::tensor::NumericTensor;
use crate::structs::tensor::Tensor;
use crate::traits::type_unions::Element;

/// A single call-argument value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Arg {
    /// A tensor operand (batched or not, per the routine's signature).
    Tensor(NumericTensor),
    /// A real scalar configuration value, e.g. a tolerance.
    Float(f64),
    /// An integer configuration value, e.g. a target dimension.
    Int(i64),
    /// A boolean flag, e.g. `lower` for a triangular factor.
    Bool(bool),
    /// A string option, e.g. a mode selector.
    Str(String),
    /// Not supplied; the kernel applies its own default.
    #[default]
    None,
}

impl Arg {
    /// Returns true for `Arg::None`.
    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self, Arg::None)
    }

    /// Typed accessor for tensor operands.
    #[inline]
    pub fn tensor(&self) -> Option<&NumericTensor> {
        match self {
            Arg::Tensor(t) => Some(t),
            _ => None,
        }
    }

    /// Typed accessor for real scalars.
    #[inline]
    pub fn float(&self) -> Option<f64> {
        match self {
            Arg::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Typed accessor for integers.
    #[inline]
    pub fn int(&self) -> Option<i64> {
        match self {
            Arg::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Typed accessor for boolean flags.
    #[inline]
    pub fn bool_(&self) -> Option<bool> {
        match self {
            Arg::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Typed accessor for string options.
    #[inline]
    pub fn str_(&self) -> Option<&str> {
        match self {
            Arg::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl From<NumericTensor> for Arg {
    fn from(t: NumericTensor) -> Self {
        Arg::Tensor(t)
    }
}

impl<T: Element> From<Tensor<T>> for Arg
where
    NumericTensor: From<Tensor<T>>,
{
    fn from(t: Tensor<T>) -> Self {
        Arg::Tensor(t.into())
    }
}

impl From<f64> for Arg {
    fn from(v: f64) -> Self {
        Arg::Float(v)
    }
}

impl From<i64> for Arg {
    fn from(v: i64) -> Self {
        Arg::Int(v)
    }
}

impl From<bool> for Arg {
    fn from(v: bool) -> Self {
        Arg::Bool(v)
    }
}

impl From<&str> for Arg {
    fn from(s: &str) -> Self {
        Arg::Str(s.to_string())
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Tensor(t) => write!(f, "{}", t),
            Arg::Float(v) => write!(f, "{}", v),
            Arg::Int(v) => write!(f, "{}", v),
            Arg::Bool(v) => write!(f, "{}", v),
            Arg::Str(s) => write!(f, "'{}'", s),
            Arg::None => write!(f, "None"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let a: Arg = Tensor::new([1], vec![1.0f64]).into();
        assert!(a.tensor().is_some());
        assert!(a.float().is_none());

        let b: Arg = 1.5f64.into();
        assert_eq!(b.float(), Some(1.5));

        let c: Arg = true.into();
        assert_eq!(c.bool_(), Some(true));

        assert!(Arg::None.is_none());
    }
}
