//! # Aliases Module - *Shared Type Shorthands*
//!
//! Type aliases shared across the crate and its call surface.

use std::sync::Arc;

use crate::enums::arg::Arg;
use crate::enums::error::{BatchError, KernelError};
use crate::enums::tensor::NumericTensor;

/// The fixed-arity result tuple of one kernel invocation.
///
/// Internally every kernel result is a `Vec<NumericTensor>`, a singleton
/// when the routine has one output. Unwrapping the singleton happens only
/// at the outward-facing boundary via [`crate::Batched::call1`].
pub type KernelResult = Result<Vec<NumericTensor>, KernelError>;

/// Result of a batched adapter call.
pub type BatchResult<T> = Result<T, BatchError>;

/// An opaque, unbatched numeric kernel.
///
/// Receives one `Arg` slot per declared parameter, in signature order.
/// Unsupplied slots are `Arg::None` and the kernel applies its own defaults.
pub type KernelFn = Arc<dyn Fn(&[Arg]) -> KernelResult + Send + Sync>;
