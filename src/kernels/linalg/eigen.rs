// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! Symmetric eigendecomposition by cyclic Jacobi rotations.
//!
//! Real symmetric input only; complex Hermitian input dispatches to an
//! `UnsupportedType` error rather than silently dropping imaginary parts.
//! The `eigvals_only` flag changes the returned arity at call time, which
//! the batching layer accommodates by observing the actual result tuple.

use std::cmp::Ordering;

use crate::dispatch_real;
use crate::enums::error::KernelError;
use crate::kernels::linalg::registry::{opt_bool, require_tensor, square_dim};
use crate::kernels::routing::dispatch::Batched;
use crate::structs::signature::Signature;
use crate::structs::tensor::Tensor;
use crate::traits::type_unions::Real;

const MAX_SWEEPS: usize = 64;

/// Eigendecomposition of a real symmetric matrix.
///
/// Returns eigenvalues in ascending order and the matrix whose column `k`
/// is the eigenvector for eigenvalue `k`. Fails with `NonConvergence` if
/// the off-diagonal norm has not collapsed after [`MAX_SWEEPS`] sweeps,
/// which for finite symmetric input does not happen in practice.
pub fn eigh_t<T: Real>(a: &Tensor<T>) -> Result<(Tensor<T>, Tensor<T>), KernelError> {
    let n = square_dim(a, "eigh")?;
    let mut m = a.data.clone();
    let mut v = Tensor::<T>::eye(n).data;

    let frob = m
        .iter()
        .fold(T::zero(), |acc, &x| acc + x * x)
        .sqrt();
    let tol = T::epsilon() * frob;

    let mut converged = false;
    for _ in 0..MAX_SWEEPS {
        let off = off_diagonal_norm(&m, n);
        if off <= tol {
            converged = true;
            break;
        }
        for p in 0..n.saturating_sub(1) {
            for q in p + 1..n {
                let apq = m[p * n + q];
                if apq == T::zero() {
                    continue;
                }
                let (c, s) = rotation(m[p * n + p], m[q * n + q], apq);
                // A <- G^T A G, columns then rows.
                for i in 0..n {
                    let aip = m[i * n + p];
                    let aiq = m[i * n + q];
                    m[i * n + p] = c * aip - s * aiq;
                    m[i * n + q] = s * aip + c * aiq;
                }
                for j in 0..n {
                    let apj = m[p * n + j];
                    let aqj = m[q * n + j];
                    m[p * n + j] = c * apj - s * aqj;
                    m[q * n + j] = s * apj + c * aqj;
                }
                // V <- V G accumulates the eigenvector columns.
                for i in 0..n {
                    let vip = v[i * n + p];
                    let viq = v[i * n + q];
                    v[i * n + p] = c * vip - s * viq;
                    v[i * n + q] = s * vip + c * viq;
                }
            }
        }
    }
    if !converged {
        return Err(KernelError::NonConvergence(format!(
            "eigh: Jacobi iteration did not converge within {} sweeps",
            MAX_SWEEPS
        )));
    }

    // Ascending eigenvalue order, eigenvector columns permuted alongside.
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| {
        m[i * n + i]
            .partial_cmp(&m[j * n + j])
            .unwrap_or(Ordering::Equal)
    });
    let w: Vec<T> = order.iter().map(|&i| m[i * n + i]).collect();
    let mut vecs = vec![T::zero(); n * n];
    for (k, &src) in order.iter().enumerate() {
        for i in 0..n {
            vecs[i * n + k] = v[i * n + src];
        }
    }
    Ok((Tensor::new([n], w), Tensor::new([n, n], vecs)))
}

fn off_diagonal_norm<T: Real>(m: &[T], n: usize) -> T {
    let mut acc = T::zero();
    for p in 0..n {
        for q in 0..n {
            if p != q {
                acc += m[p * n + q] * m[p * n + q];
            }
        }
    }
    acc.sqrt()
}

/// Jacobi rotation `(c, s)` annihilating the `(p, q)` entry.
fn rotation<T: Real>(app: T, aqq: T, apq: T) -> (T, T) {
    let two = T::one() + T::one();
    let tau = (aqq - app) / (two * apq);
    let t = if tau >= T::zero() {
        T::one() / (tau + (T::one() + tau * tau).sqrt())
    } else {
        -T::one() / (-tau + (T::one() + tau * tau).sqrt())
    };
    let c = T::one() / (T::one() + t * t).sqrt();
    (c, t * c)
}

/// `eigh(a, eigvals_only=false)`: batched symmetric eigendecomposition.
/// With `eigvals_only` the result tuple shrinks to the eigenvalues alone.
pub fn eigh() -> Batched {
    Batched::new(
        Signature::new("eigh")
            .batched("a", 2)
            .passthrough("eigvals_only")
            .n_out(2)
            .out_core_ranks(&[1, 2]),
        |args| {
            let a = require_tensor(args, 0, "a")?;
            let eigvals_only = opt_bool(args, 1, false)?;
            dispatch_real!(a, "eigh", t => {
                let (w, v) = eigh_t(t)?;
                Ok(if eigvals_only {
                    vec![w.into()]
                } else {
                    vec![w.into(), v.into()]
                })
            })
        },
    )
}

/// `eigvalsh(a)`: batched symmetric eigenvalues only.
pub fn eigvalsh() -> Batched {
    Batched::new(
        Signature::new("eigvalsh")
            .batched("a", 2)
            .out_core_ranks(&[1]),
        |args| {
            let a = require_tensor(args, 0, "a")?;
            dispatch_real!(a, "eigvalsh", t => {
                let (w, _) = eigh_t(t)?;
                Ok(vec![w.into()])
            })
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::arg::Arg;
    use num_complex::Complex;

    #[test]
    fn test_eigh_known_spectrum() {
        let a = Tensor::new([2, 2], vec![2.0f64, 1.0, 1.0, 2.0]);
        let (w, v) = eigh_t(&a).unwrap();
        assert!((w.data[0] - 1.0).abs() < 1e-12);
        assert!((w.data[1] - 3.0).abs() < 1e-12);
        // Columns are unit eigenvectors: A v = lambda v.
        let n = 2;
        for k in 0..n {
            for i in 0..n {
                let av: f64 = (0..n).map(|j| a.data[i * n + j] * v.data[j * n + k]).sum();
                assert!((av - w.data[k] * v.data[i * n + k]).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_eigh_diagonal_input() {
        let a = Tensor::new([3, 3], vec![3.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 2.0]);
        let (w, _) = eigh_t(&a).unwrap();
        assert_eq!(w.data, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_eigvals_only_changes_arity() {
        let a = Tensor::new([2, 2], vec![2.0f64, 1.0, 1.0, 2.0]);
        let full = eigh().call(&[a.clone().into()], &[]).unwrap();
        assert_eq!(full.len(), 2);
        let only = eigh()
            .call(&[a.into()], &[("eigvals_only", Arg::Bool(true))])
            .unwrap();
        assert_eq!(only.len(), 1);
        assert_eq!(only[0].shape(), &[2]);
    }

    #[test]
    fn test_complex_input_rejected() {
        let a = Tensor::new([1, 1], vec![Complex::new(1.0f64, 0.0)]);
        let err = eigvalsh().call(&[a.into()], &[]).unwrap_err();
        assert!(err.to_string().contains("not supported"));
    }
}
