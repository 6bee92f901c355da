//! # Macros Module - *Variant Dispatch Helpers*
//!
//! Implementation macros that keep the `NumericTensor` match lanes from
//! being hand-repeated for every element type.

/// Expands `$body` once per populated `NumericTensor` variant, binding
/// `$t` to the inner `Arc<Tensor<_>>` of the matching element type.
///
/// `$null` handles the `Null` marker variant.
#[macro_export]
macro_rules! with_numeric_tensor {
    ($self:expr, $t:ident => $body:expr, $null:expr) => {
        match $self {
            $crate::NumericTensor::Bool($t) => $body,
            $crate::NumericTensor::Int32($t) => $body,
            $crate::NumericTensor::Int64($t) => $body,
            $crate::NumericTensor::Float32($t) => $body,
            $crate::NumericTensor::Float64($t) => $body,
            $crate::NumericTensor::Complex64($t) => $body,
            $crate::NumericTensor::Complex128($t) => $body,
            $crate::NumericTensor::Null => $null,
        }
    };
}

/// Expands `$body` once per floating variant (real and complex, single and
/// double precision), the type universe of the linear-algebra kernels.
/// Non-floating variants fall through to an `UnsupportedType` error.
#[macro_export]
macro_rules! dispatch_float_complex {
    ($tensor:expr, $routine:literal, $t:ident => $body:expr) => {
        match $tensor {
            $crate::NumericTensor::Float32($t) => $body,
            $crate::NumericTensor::Float64($t) => $body,
            $crate::NumericTensor::Complex64($t) => $body,
            $crate::NumericTensor::Complex128($t) => $body,
            other => Err($crate::KernelError::UnsupportedType(format!(
                "{}: dtype {} is not supported",
                $routine,
                other.dtype()
            ))),
        }
    };
}

/// Expands `$body` once per real floating variant. Complex variants fall
/// through to an `UnsupportedType` error; used by kernels restricted to
/// real symmetric input.
#[macro_export]
macro_rules! dispatch_real {
    ($tensor:expr, $routine:literal, $t:ident => $body:expr) => {
        match $tensor {
            $crate::NumericTensor::Float32($t) => $body,
            $crate::NumericTensor::Float64($t) => $body,
            other => Err($crate::KernelError::UnsupportedType(format!(
                "{}: dtype {} is not supported, expected real floating",
                $routine,
                other.dtype()
            ))),
        }
    };
}

/// Expands `$body` once per floating variant pair of matching element
/// type, for two-operand kernels. Mixed or non-floating dtypes fall
/// through to an `UnsupportedType` error; operand dtype unification is a
/// caller concern, not a kernel one.
#[macro_export]
macro_rules! dispatch_float_complex_pair {
    ($a:expr, $b:expr, $routine:literal, $x:ident, $y:ident => $body:expr) => {
        match ($a, $b) {
            ($crate::NumericTensor::Float32($x), $crate::NumericTensor::Float32($y)) => $body,
            ($crate::NumericTensor::Float64($x), $crate::NumericTensor::Float64($y)) => $body,
            ($crate::NumericTensor::Complex64($x), $crate::NumericTensor::Complex64($y)) => $body,
            ($crate::NumericTensor::Complex128($x), $crate::NumericTensor::Complex128($y)) => {
                $body
            }
            (lhs, rhs) => Err($crate::KernelError::UnsupportedType(format!(
                "{}: operands must share a floating dtype, got {} and {}",
                $routine,
                lhs.dtype(),
                rhs.dtype()
            ))),
        }
    };
}

/// Implements `From<Tensor<T>> for NumericTensor` per element type.
#[macro_export]
macro_rules! impl_tensor_from {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$crate::Tensor<$t>> for $crate::NumericTensor {
                fn from(t: $crate::Tensor<$t>) -> Self {
                    $crate::NumericTensor::$variant(std::sync::Arc::new(t))
                }
            }
        )*
    };
}
