// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! Structural matrix predicates and constructors: symmetry tests,
//! bandwidth measurement, and the SVD-style diagonal embedding.
//!
//! The predicates return rank-0 tensors, the degenerate core: a batched
//! call over shape `(b1, ..., bk, n, n)` yields a boolean tensor of shape
//! `(b1, ..., bk)`. `bandwidth` returns two rank-0 integers and
//! `diagsvd` grows a rank-1 core into a rank-2 one.

use num_complex::Complex;

use crate::dispatch_float_complex;
use crate::enums::error::KernelError;
use crate::enums::tensor::NumericTensor;
use crate::kernels::linalg::registry::{opt_float, require_int, require_tensor, vector_len};
use crate::kernels::routing::dispatch::Batched;
use crate::structs::signature::Signature;
use crate::structs::tensor::Tensor;
use crate::traits::type_unions::{Element, LinalgScalar};

fn square_shape(t: &NumericTensor, routine: &str) -> Result<usize, KernelError> {
    match t.shape() {
        [m, n] if m == n => Ok(*n),
        other => Err(KernelError::ShapeMismatch(format!(
            "{}: expected a square matrix, got shape {:?}",
            routine, other
        ))),
    }
}

/// Widens any numeric variant to a flat complex buffer; boolean and
/// integer entries embed exactly.
fn to_c128_any(t: &NumericTensor) -> Result<Vec<Complex<f64>>, KernelError> {
    if let Some(v) = t.to_complex128_vec() {
        return Ok(v);
    }
    let v = match t {
        NumericTensor::Bool(t) => t
            .data
            .iter()
            .map(|&b| Complex::new(if b { 1.0 } else { 0.0 }, 0.0))
            .collect(),
        NumericTensor::Int32(t) => t.data.iter().map(|&v| Complex::new(v as f64, 0.0)).collect(),
        NumericTensor::Int64(t) => t.data.iter().map(|&v| Complex::new(v as f64, 0.0)).collect(),
        other => {
            return Err(KernelError::UnsupportedType(format!(
                "dtype {} is not supported",
                other.dtype()
            )));
        }
    };
    Ok(v)
}

fn exact_mirror<T: Element>(t: &Tensor<T>, n: usize) -> bool {
    (0..n).all(|i| (i + 1..n).all(|j| t.data[i * n + j] == t.data[j * n + i]))
}

fn mirror_test(
    t: &NumericTensor,
    atol: f64,
    conjugate: bool,
    routine: &str,
) -> Result<bool, KernelError> {
    let n = square_shape(t, routine)?;
    if let Some(v) = t.to_complex128_vec() {
        let ok = (0..n).all(|i| {
            (i..n).all(|j| {
                let mirrored = if conjugate { v[j * n + i].conj() } else { v[j * n + i] };
                (v[i * n + j] - mirrored).norm() <= atol
            })
        });
        return Ok(ok);
    }
    // Integer and boolean input: exact comparison, conjugation is identity.
    let ok = match t {
        NumericTensor::Bool(t) => exact_mirror(t, n),
        NumericTensor::Int32(t) => exact_mirror(t, n),
        NumericTensor::Int64(t) => exact_mirror(t, n),
        other => {
            return Err(KernelError::UnsupportedType(format!(
                "{}: dtype {} is not supported",
                routine,
                other.dtype()
            )));
        }
    };
    Ok(ok)
}

/// Lower and upper bandwidth of a matrix: the number of populated
/// sub- and super-diagonals.
pub fn bandwidth_of(t: &NumericTensor) -> Result<(i64, i64), KernelError> {
    let (m, n) = match t.shape() {
        [m, n] => (*m, *n),
        other => {
            return Err(KernelError::ShapeMismatch(format!(
                "bandwidth: expected a matrix, got shape {:?}",
                other
            )));
        }
    };
    let v = to_c128_any(t).map_err(|e| match e {
        KernelError::UnsupportedType(msg) => {
            KernelError::UnsupportedType(format!("bandwidth: {}", msg))
        }
        other => other,
    })?;
    let mut below = 0i64;
    let mut above = 0i64;
    for i in 0..m {
        for j in 0..n {
            if v[i * n + j].norm() > 0.0 {
                if i > j {
                    below = below.max((i - j) as i64);
                } else {
                    above = above.max((j - i) as i64);
                }
            }
        }
    }
    Ok((below, above))
}

/// `issymmetric(a, atol=0.0)`: batched symmetry predicate; one rank-0
/// boolean per batch index.
pub fn issymmetric() -> Batched {
    Batched::new(
        Signature::new("issymmetric")
            .batched("a", 2)
            .passthrough("atol")
            .out_core_ranks(&[0]),
        |args| {
            let a = require_tensor(args, 0, "a")?;
            let atol = opt_float(args, 1, 0.0)?;
            let ok = mirror_test(a, atol, false, "issymmetric")?;
            Ok(vec![Tensor::from_scalar(ok).into()])
        },
    )
}

/// `ishermitian(a, atol=0.0)`: batched conjugate-symmetry predicate.
pub fn ishermitian() -> Batched {
    Batched::new(
        Signature::new("ishermitian")
            .batched("a", 2)
            .passthrough("atol")
            .out_core_ranks(&[0]),
        |args| {
            let a = require_tensor(args, 0, "a")?;
            let atol = opt_float(args, 1, 0.0)?;
            let ok = mirror_test(a, atol, true, "ishermitian")?;
            Ok(vec![Tensor::from_scalar(ok).into()])
        },
    )
}

/// `bandwidth(a)`: batched bandwidth measurement; two rank-0 integer
/// outputs per batch index.
pub fn bandwidth() -> Batched {
    Batched::new(
        Signature::new("bandwidth")
            .batched("a", 2)
            .n_out(2)
            .out_core_ranks(&[0, 0]),
        |args| {
            let a = require_tensor(args, 0, "a")?;
            let (below, above) = bandwidth_of(a)?;
            Ok(vec![
                Tensor::from_scalar(below).into(),
                Tensor::from_scalar(above).into(),
            ])
        },
    )
}

fn diagsvd_t<T: LinalgScalar>(s: &Tensor<T>, m: usize, n: usize) -> Tensor<T> {
    let mut out = Tensor::<T>::zeros([m, n]);
    for (i, &v) in s.data.iter().enumerate() {
        out.data[i * n + i] = v;
    }
    out
}

/// `diagsvd(s, m, n)`: embeds a singular-value vector into the `(m, n)`
/// rectangular diagonal matrix of an SVD. The rank-1 core grows to rank 2;
/// `m` and `n` pass through unbatched.
pub fn diagsvd() -> Batched {
    Batched::new(
        Signature::new("diagsvd")
            .batched("s", 1)
            .passthrough("m")
            .passthrough("n")
            .out_core_ranks(&[2]),
        |args| {
            let s = require_tensor(args, 0, "s")?;
            let m = require_int(args, 1, "m")?;
            let n = require_int(args, 2, "n")?;
            dispatch_float_complex!(s, "diagsvd", t => {
                let len = vector_len(t, "diagsvd")?;
                if len != m.min(n) {
                    return Err(KernelError::ShapeMismatch(format!(
                        "diagsvd: {} singular values for a ({}, {}) matrix, expected {}",
                        len, m, n, m.min(n)
                    )));
                }
                Ok(vec![diagsvd_t(t, m, n).into()])
            })
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::arg::Arg;
    use crate::enums::dtype::DType;

    #[test]
    fn test_issymmetric_exact_and_tolerant() {
        let sym: NumericTensor = Tensor::new([2, 2], vec![1.0, 2.0, 2.0, 3.0]).into();
        let out = issymmetric().call1(&[sym.into()], &[]).unwrap();
        assert_eq!(out.bool_().unwrap().get(&[]), true);

        let near: NumericTensor = Tensor::new([2, 2], vec![1.0, 2.0, 2.0 + 1e-12, 3.0]).into();
        let strict = issymmetric().call1(&[near.clone().into()], &[]).unwrap();
        assert_eq!(strict.bool_().unwrap().get(&[]), false);
        let loose = issymmetric()
            .call1(&[near.into()], &[("atol", Arg::Float(1e-9))])
            .unwrap();
        assert_eq!(loose.bool_().unwrap().get(&[]), true);
    }

    #[test]
    fn test_ishermitian_complex() {
        let i = Complex::new(0.0f64, 1.0);
        let herm: NumericTensor = Tensor::new(
            [2, 2],
            vec![Complex::new(1.0, 0.0), i, -i, Complex::new(2.0, 0.0)],
        )
        .into();
        let out = ishermitian().call1(&[herm.clone().into()], &[]).unwrap();
        assert_eq!(out.bool_().unwrap().get(&[]), true);
        // Hermitian but not symmetric.
        let sym = issymmetric().call1(&[herm.into()], &[]).unwrap();
        assert_eq!(sym.bool_().unwrap().get(&[]), false);
    }

    #[test]
    fn test_issymmetric_integer_exact() {
        let t: NumericTensor = Tensor::new([2, 2], vec![1i64, 5, 5, 2]).into();
        let out = issymmetric().call1(&[t.into()], &[]).unwrap();
        assert_eq!(out.bool_().unwrap().get(&[]), true);
    }

    #[test]
    fn test_bandwidth_tridiagonal() {
        let t: NumericTensor = Tensor::new(
            [3, 3],
            vec![1.0, 2.0, 0.0, 3.0, 4.0, 5.0, 0.0, 6.0, 7.0],
        )
        .into();
        let outs = bandwidth().call(&[t.into()], &[]).unwrap();
        assert_eq!(outs[0].i64().unwrap().get(&[]), 1);
        assert_eq!(outs[1].i64().unwrap().get(&[]), 1);
        assert_eq!(outs[0].dtype(), DType::Int64);
    }

    #[test]
    fn test_bandwidth_batched_scalar_cores() {
        // Batch (2,): a diagonal matrix and a dense one.
        let t: NumericTensor = Tensor::new(
            [2, 2, 2],
            vec![1.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 1.0],
        )
        .into();
        let outs = bandwidth().call(&[t.into()], &[]).unwrap();
        assert_eq!(outs[0].shape(), &[2]);
        assert_eq!(outs[0].i64().unwrap().data, vec![0, 1]);
        assert_eq!(outs[1].i64().unwrap().data, vec![0, 1]);
    }

    #[test]
    fn test_diagsvd_rectangular() {
        let s: NumericTensor = Tensor::new([2], vec![3.0, 1.0]).into();
        let out = diagsvd()
            .call1(&[s.into(), Arg::Int(2), Arg::Int(3)], &[])
            .unwrap();
        assert_eq!(out.shape(), &[2, 3]);
        let t = out.f64().unwrap();
        assert_eq!(t.get(&[0, 0]), 3.0);
        assert_eq!(t.get(&[1, 1]), 1.0);
        assert_eq!(t.get(&[1, 2]), 0.0);
    }

    #[test]
    fn test_diagsvd_length_check() {
        let s: NumericTensor = Tensor::new([3], vec![3.0, 2.0, 1.0]).into();
        let err = diagsvd()
            .call1(&[s.into(), Arg::Int(2), Arg::Int(3)], &[])
            .unwrap_err();
        assert!(err.to_string().contains("singular values"));
    }
}
