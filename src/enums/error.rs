//! # Error Module - Custom *Minbatch* Error Types
//!
//! Defines the unified error types for Minbatch.
//!
//! ## Features
//! - `KernelError` covers domain failures raised by the numeric kernels
//! themselves: singular matrices, non-convergence, unsupported element
//! types, and shape violations.
//! - `BatchError` covers failures of the batching adapter: ambiguous
//! argument binding, incompatible batch shapes, output drift across batch
//! indices, and kernel errors annotated with the failing multi-index.
//! - Both implement `Display` for readable output and `Error` for
//! integration with standard Rust error handling.

use std::error::Error;
use std::fmt;

/// Domain error raised by an unbatched numeric kernel.
///
/// The adapter never retries, suppresses, or downgrades these; they abort
/// the whole batched call, annotated with the failing batch index.
#[derive(Debug, Clone, PartialEq)]
pub enum KernelError {
    /// The matrix is singular to working precision.
    Singular(String),
    /// The matrix is not positive definite.
    NotPositiveDefinite(String),
    /// An iterative routine failed to converge.
    NonConvergence(String),
    /// The kernel does not support the supplied element type.
    UnsupportedType(String),
    /// Operand shapes violate the kernel's contract.
    ShapeMismatch(String),
    /// An argument value is missing or invalid.
    InvalidArgument(String),
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelError::Singular(msg) => write!(f, "Singular matrix: {}", msg),
            KernelError::NotPositiveDefinite(msg) => {
                write!(f, "Matrix is not positive definite: {}", msg)
            }
            KernelError::NonConvergence(msg) => write!(f, "Did not converge: {}", msg),
            KernelError::UnsupportedType(msg) => write!(f, "Unsupported type: {}", msg),
            KernelError::ShapeMismatch(msg) => write!(f, "Shape mismatch: {}", msg),
            KernelError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
        }
    }
}

impl Error for KernelError {}

/// Catch all error type for the batching adapter.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchError {
    /// A parameter was supplied both positionally and by keyword.
    AmbiguousArgument { param: &'static str },
    /// A keyword name does not match any declared parameter.
    UnknownParameter { routine: &'static str, name: String },
    /// More positional arguments than declared parameters.
    ExtraPositional {
        routine: &'static str,
        n_params: usize,
        n_args: usize,
    },
    /// A batched parameter was supplied as a non-tensor value.
    NotATensor { param: &'static str },
    /// A batched operand has fewer dimensions than its declared core rank.
    CoreRank {
        param: &'static str,
        rank: usize,
        core_rank: usize,
    },
    /// Two required-compatible operands have incompatible batch shapes.
    Broadcast {
        left: &'static str,
        left_shape: Vec<usize>,
        right: &'static str,
        right_shape: Vec<usize>,
    },
    /// A later batch index produced a different number of outputs than
    /// the first.
    InconsistentArity {
        expected: usize,
        found: usize,
        index: Vec<usize>,
    },
    /// A later batch index produced an output whose shape or dtype
    /// diverges from the first call's determination.
    InconsistentOutput {
        output: usize,
        expected: String,
        found: String,
        index: Vec<usize>,
    },
    /// The routine returned a different output arity than the caller
    /// requested via the single-output convenience surface.
    OutputArity {
        routine: &'static str,
        expected: usize,
        found: usize,
    },
    /// A kernel failure at one batch index, propagated unchanged and
    /// annotated with the offending multi-index.
    Kernel {
        index: Vec<usize>,
        source: KernelError,
    },
}

impl fmt::Display for BatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchError::AmbiguousArgument { param } => {
                write!(
                    f,
                    "Ambiguous argument: parameter '{}' supplied both positionally and by keyword.",
                    param
                )
            }
            BatchError::UnknownParameter { routine, name } => {
                write!(
                    f,
                    "Unknown parameter: '{}' is not a parameter of routine '{}'.",
                    name, routine
                )
            }
            BatchError::ExtraPositional {
                routine,
                n_params,
                n_args,
            } => {
                write!(
                    f,
                    "Routine '{}' takes {} arguments but {} were given positionally.",
                    routine, n_params, n_args
                )
            }
            BatchError::NotATensor { param } => {
                write!(f, "Batched parameter '{}' must be a tensor.", param)
            }
            BatchError::CoreRank {
                param,
                rank,
                core_rank,
            } => {
                write!(
                    f,
                    "Operand '{}' has rank {} but its core rank is {}.",
                    param, rank, core_rank
                )
            }
            BatchError::Broadcast {
                left,
                left_shape,
                right,
                right_shape,
            } => {
                write!(
                    f,
                    "Cannot broadcast batch shape {:?} of '{}' with batch shape {:?} of '{}'.",
                    left_shape, left, right_shape, right
                )
            }
            BatchError::InconsistentArity {
                expected,
                found,
                index,
            } => {
                write!(
                    f,
                    "Inconsistent output arity at batch index {:?}: first call returned {} outputs, this call returned {}.",
                    index, expected, found
                )
            }
            BatchError::InconsistentOutput {
                output,
                expected,
                found,
                index,
            } => {
                write!(
                    f,
                    "Inconsistent output {} at batch index {:?}: expected {}, found {}.",
                    output, index, expected, found
                )
            }
            BatchError::OutputArity {
                routine,
                expected,
                found,
            } => {
                write!(
                    f,
                    "Routine '{}' returned {} outputs where {} expected.",
                    routine, found, expected
                )
            }
            BatchError::Kernel { index, source } => {
                if index.is_empty() {
                    write!(f, "{}", source)
                } else {
                    write!(f, "{} (at batch index {:?})", source, index)
                }
            }
        }
    }
}

impl Error for BatchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            BatchError::Kernel { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<KernelError> for BatchError {
    /// A kernel error outside the dispatch loop carries no batch index.
    fn from(source: KernelError) -> Self {
        BatchError::Kernel {
            index: Vec::new(),
            source,
        }
    }
}
