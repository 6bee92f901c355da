// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! The declarative routine table: maps each reference routine to its
//! registered [`Batched`] adapter, plus the argument-extraction helpers
//! shared by the kernel closures.

use crate::enums::arg::Arg;
use crate::enums::error::KernelError;
use crate::enums::tensor::NumericTensor;
use crate::kernels::linalg::{basic, decomp, eigen, poly, props, solve};
use crate::kernels::routing::dispatch::Batched;
use crate::structs::tensor::Tensor;
use crate::traits::type_unions::Element;

/// Every reference routine, registered under its batching contract.
///
/// Constructed on demand; adapters are stateless and cheap to build.
pub fn registry() -> Vec<Batched> {
    vec![
        basic::matmul(),
        basic::inv(),
        basic::det(),
        decomp::cholesky(),
        decomp::lu_factor(),
        decomp::qr(),
        solve::solve(),
        solve::solve_triangular(),
        eigen::eigh(),
        eigen::eigvalsh(),
        poly::roots(),
        poly::polyval(),
        props::issymmetric(),
        props::ishermitian(),
        props::bandwidth(),
        props::diagsvd(),
    ]
}

/// Looks up a registered routine by name.
pub fn lookup(name: &str) -> Option<Batched> {
    registry().into_iter().find(|b| b.signature().name() == name)
}

pub(crate) fn require_tensor<'a>(
    args: &'a [Arg],
    pos: usize,
    name: &'static str,
) -> Result<&'a NumericTensor, KernelError> {
    args.get(pos)
        .and_then(|a| a.tensor())
        .ok_or_else(|| KernelError::InvalidArgument(format!("missing tensor operand '{}'", name)))
}

pub(crate) fn opt_bool(args: &[Arg], pos: usize, default: bool) -> Result<bool, KernelError> {
    match args.get(pos) {
        None | Some(Arg::None) => Ok(default),
        Some(Arg::Bool(v)) => Ok(*v),
        Some(other) => Err(KernelError::InvalidArgument(format!(
            "expected a boolean flag, got {}",
            other
        ))),
    }
}

pub(crate) fn opt_float(args: &[Arg], pos: usize, default: f64) -> Result<f64, KernelError> {
    match args.get(pos) {
        None | Some(Arg::None) => Ok(default),
        Some(Arg::Float(v)) => Ok(*v),
        Some(Arg::Int(v)) => Ok(*v as f64),
        Some(other) => Err(KernelError::InvalidArgument(format!(
            "expected a real scalar, got {}",
            other
        ))),
    }
}

pub(crate) fn require_int(
    args: &[Arg],
    pos: usize,
    name: &'static str,
) -> Result<usize, KernelError> {
    match args.get(pos) {
        Some(Arg::Int(v)) if *v >= 0 => Ok(*v as usize),
        Some(Arg::Int(v)) => Err(KernelError::InvalidArgument(format!(
            "'{}' must be non-negative, got {}",
            name, v
        ))),
        _ => Err(KernelError::InvalidArgument(format!(
            "missing integer argument '{}'",
            name
        ))),
    }
}

pub(crate) fn matrix_dims<T: Element>(
    a: &Tensor<T>,
    routine: &str,
) -> Result<(usize, usize), KernelError> {
    match a.shape[..] {
        [m, n] => Ok((m, n)),
        _ => Err(KernelError::ShapeMismatch(format!(
            "{}: expected a matrix, got shape {:?}",
            routine, a.shape
        ))),
    }
}

pub(crate) fn square_dim<T: Element>(a: &Tensor<T>, routine: &str) -> Result<usize, KernelError> {
    let (m, n) = matrix_dims(a, routine)?;
    if m != n {
        return Err(KernelError::ShapeMismatch(format!(
            "{}: expected a square matrix, got shape {:?}",
            routine, a.shape
        )));
    }
    Ok(n)
}

pub(crate) fn vector_len<T: Element>(a: &Tensor<T>, routine: &str) -> Result<usize, KernelError> {
    match a.shape[..] {
        [n] => Ok(n),
        _ => Err(KernelError::ShapeMismatch(format!(
            "{}: expected a vector, got shape {:?}",
            routine, a.shape
        ))),
    }
}
