// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! Matrix factorisation kernels: Cholesky, pivoted LU, and Householder QR.
//!
//! `lu_factor` is the canonical mixed-rank multi-output routine: a rank-2
//! input produces a rank-2 combined factor plus a rank-1 integer pivot
//! vector, exercising per-output core ranks and dtype independence in the
//! batching layer.

use num_traits::{Float, One, Zero};

use crate::dispatch_float_complex;
use crate::enums::error::KernelError;
use crate::kernels::linalg::registry::{matrix_dims, opt_bool, require_tensor, square_dim};
use crate::kernels::routing::dispatch::Batched;
use crate::structs::signature::Signature;
use crate::structs::tensor::Tensor;
use crate::traits::type_unions::LinalgScalar;

/// Cholesky factor of a Hermitian positive-definite matrix.
///
/// Reads only the triangle selected by `lower` and mirrors the other, so
/// callers may pass a matrix with garbage in the unused triangle. Returns
/// the lower factor `L` with `A = L L^H` when `lower`, otherwise the upper
/// factor `U = L^H` with `A = U^H U`.
pub fn cholesky_t<T: LinalgScalar>(a: &Tensor<T>, lower: bool) -> Result<Tensor<T>, KernelError> {
    let n = square_dim(a, "cholesky")?;
    // Element (i, j) of the lower triangle, regardless of which triangle
    // the caller populated.
    let at = |i: usize, j: usize| -> T {
        if lower {
            a.data[i * n + j]
        } else {
            a.data[j * n + i].conj()
        }
    };

    let mut l = vec![T::zero(); n * n];
    for j in 0..n {
        let mut s = at(j, j);
        for k in 0..j {
            s -= l[j * n + k] * l[j * n + k].conj();
        }
        let d = s.re();
        if !(d > T::Real::zero()) {
            return Err(KernelError::NotPositiveDefinite(format!(
                "cholesky: leading minor of order {} is not positive definite",
                j + 1
            )));
        }
        let diag = T::from_real(d.sqrt());
        l[j * n + j] = diag;
        for i in j + 1..n {
            let mut s = at(i, j);
            for k in 0..j {
                s -= l[i * n + k] * l[j * n + k].conj();
            }
            l[i * n + j] = s / diag;
        }
    }

    if lower {
        return Ok(Tensor::new([n, n], l));
    }
    let mut u = vec![T::zero(); n * n];
    for i in 0..n {
        for j in i..n {
            u[i * n + j] = l[j * n + i].conj();
        }
    }
    Ok(Tensor::new([n, n], u))
}

/// Pivoted LU factorisation of a square matrix, LAPACK `getrf` style.
///
/// Returns the combined factor (unit-diagonal `L` below, `U` on and above
/// the diagonal) and a 0-based pivot vector where `piv[k]` is the row
/// swapped with row `k` at step `k`. An exactly zero pivot leaves the
/// column uneliminated; the factorisation still completes.
pub fn lu_factor_t<T: LinalgScalar>(
    a: &Tensor<T>,
) -> Result<(Tensor<T>, Tensor<i32>), KernelError> {
    let n = square_dim(a, "lu_factor")?;
    let mut lu = a.data.clone();
    let mut piv = vec![0i32; n];

    for k in 0..n {
        let mut p = k;
        let mut best = lu[k * n + k].abs();
        for r in k + 1..n {
            let v = lu[r * n + k].abs();
            if v > best {
                best = v;
                p = r;
            }
        }
        piv[k] = p as i32;
        if p != k {
            for j in 0..n {
                lu.swap(p * n + j, k * n + j);
            }
        }
        let pivot = lu[k * n + k];
        if pivot == T::zero() {
            continue;
        }
        for r in k + 1..n {
            let f = lu[r * n + k] / pivot;
            lu[r * n + k] = f;
            for j in k + 1..n {
                let upd = f * lu[k * n + j];
                lu[r * n + j] -= upd;
            }
        }
    }
    Ok((Tensor::new([n, n], lu), Tensor::new([n], piv)))
}

/// Householder QR of an `(m, n)` matrix: unitary `Q` of shape `(m, m)` and
/// upper-trapezoidal `R` of shape `(m, n)` with `A = Q R`.
///
/// The reflector phase is chosen complex-safely: the diagonal of `R` picks
/// up `-sign(x_0) * ||x||`, which keeps the elimination stable for both
/// real and complex input.
pub fn qr_t<T: LinalgScalar>(a: &Tensor<T>) -> Result<(Tensor<T>, Tensor<T>), KernelError> {
    let (m, n) = matrix_dims(a, "qr")?;
    let mut r = a.data.clone();
    let mut q = Tensor::<T>::eye(m).data;
    let two = T::Real::one() + T::Real::one();

    for k in 0..n.min(m.saturating_sub(1)) {
        let norm2 = (k..m).fold(T::Real::zero(), |acc, i| {
            let v = r[i * n + k].abs();
            acc + v * v
        });
        if norm2 == T::Real::zero() {
            continue;
        }
        let norm = norm2.sqrt();
        let x0 = r[k * n + k];
        let alpha = if x0 == T::zero() {
            T::from_real(-norm)
        } else {
            -(x0 / T::from_real(x0.abs())) * T::from_real(norm)
        };

        let mut v: Vec<T> = (k..m).map(|i| r[i * n + k]).collect();
        v[0] -= alpha;
        let vnorm2 = v.iter().fold(T::Real::zero(), |acc, z| {
            let a = z.abs();
            acc + a * a
        });
        if vnorm2 == T::Real::zero() {
            continue;
        }
        let coef = T::from_real(two / vnorm2);

        // R <- (I - coef v v^H) R on the trailing columns.
        for j in k..n {
            let mut w = T::zero();
            for (i, &vi) in v.iter().enumerate() {
                w += vi.conj() * r[(k + i) * n + j];
            }
            let w = w * coef;
            for (i, &vi) in v.iter().enumerate() {
                let upd = vi * w;
                r[(k + i) * n + j] -= upd;
            }
        }
        // Q <- Q (I - coef v v^H), accumulating the product of reflectors.
        for i in 0..m {
            let mut t = T::zero();
            for (l, &vl) in v.iter().enumerate() {
                t += q[i * m + k + l] * vl;
            }
            let t = t * coef;
            for (l, &vl) in v.iter().enumerate() {
                let upd = t * vl.conj();
                q[i * m + k + l] -= upd;
            }
        }
    }

    // The subdiagonal is eliminated up to roundoff; return it exactly zero.
    for i in 0..m {
        for j in 0..i.min(n) {
            r[i * n + j] = T::zero();
        }
    }
    Ok((Tensor::new([m, m], q), Tensor::new([m, n], r)))
}

/// `cholesky(a, lower=false)`: batched Cholesky factor; upper by default.
pub fn cholesky() -> Batched {
    Batched::new(
        Signature::new("cholesky").batched("a", 2).passthrough("lower"),
        |args| {
            let a = require_tensor(args, 0, "a")?;
            let lower = opt_bool(args, 1, false)?;
            dispatch_float_complex!(a, "cholesky", t => {
                Ok(vec![cholesky_t(t, lower)?.into()])
            })
        },
    )
}

/// `lu_factor(a)`: batched pivoted LU; two outputs of differing core rank
/// and dtype.
pub fn lu_factor() -> Batched {
    Batched::new(
        Signature::new("lu_factor")
            .batched("a", 2)
            .n_out(2)
            .out_core_ranks(&[2, 1]),
        |args| {
            let a = require_tensor(args, 0, "a")?;
            dispatch_float_complex!(a, "lu_factor", t => {
                let (lu, piv) = lu_factor_t(t)?;
                Ok(vec![lu.into(), piv.into()])
            })
        },
    )
}

/// `qr(a)`: batched Householder QR.
pub fn qr() -> Batched {
    Batched::new(
        Signature::new("qr")
            .batched("a", 2)
            .n_out(2)
            .out_core_ranks(&[2, 2]),
        |args| {
            let a = require_tensor(args, 0, "a")?;
            dispatch_float_complex!(a, "qr", t => {
                let (q, r) = qr_t(t)?;
                Ok(vec![q.into(), r.into()])
            })
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::linalg::basic::matmul_t;
    use num_complex::Complex;

    fn close(a: &[f64], b: &[f64], tol: f64) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() < tol)
    }

    #[test]
    fn test_cholesky_lower_reconstructs() {
        let a = Tensor::new([2, 2], vec![4.0, 2.0, 2.0, 3.0]);
        let l = cholesky_t(&a, true).unwrap();
        // L L^T = A for real input.
        let lt = Tensor::new([2, 2], vec![l.data[0], l.data[2], l.data[1], l.data[3]]);
        let prod = matmul_t(&l, &lt).unwrap();
        assert!(close(&prod.data, &a.data, 1e-12));
        // Strict upper triangle is zero.
        assert_eq!(l.data[1], 0.0);
    }

    #[test]
    fn test_cholesky_upper_is_transpose_of_lower() {
        let a = Tensor::new([2, 2], vec![4.0, 2.0, 2.0, 3.0]);
        let l = cholesky_t(&a, true).unwrap();
        let u = cholesky_t(&a, false).unwrap();
        assert_eq!(u.data, vec![l.data[0], l.data[2], l.data[1], l.data[3]]);
    }

    #[test]
    fn test_cholesky_not_positive_definite() {
        let a = Tensor::new([2, 2], vec![1.0, 2.0, 2.0, 1.0]);
        assert!(matches!(
            cholesky_t(&a, true),
            Err(KernelError::NotPositiveDefinite(_))
        ));
    }

    #[test]
    fn test_cholesky_hermitian_complex() {
        let i = Complex::new(0.0, 1.0);
        let a = Tensor::new(
            [2, 2],
            vec![
                Complex::new(2.0, 0.0),
                i,
                -i,
                Complex::new(2.0, 0.0),
            ],
        );
        let l = cholesky_t(&a, true).unwrap();
        // L L^H = A.
        let lh = Tensor::new(
            [2, 2],
            vec![
                l.data[0].conj(),
                l.data[2].conj(),
                l.data[1].conj(),
                l.data[3].conj(),
            ],
        );
        let prod = matmul_t(&l, &lh).unwrap();
        for (x, y) in prod.data.iter().zip(&a.data) {
            assert!((x - y).norm() < 1e-12);
        }
    }

    #[test]
    fn test_lu_factor_pivots_and_reconstruction() {
        let a = Tensor::new([3, 3], vec![0.0, 2.0, 1.0, 1.0, 1.0, 0.0, 4.0, 1.0, 2.0]);
        let (lu, piv) = lu_factor_t(&a).unwrap();
        assert_eq!(lu.shape, vec![3, 3]);
        assert_eq!(piv.shape, vec![3]);
        // First pivot selects the largest entry of column 0, which is row 2.
        assert_eq!(piv.data[0], 2);

        // Reconstruct P A = L U and compare against the pivoted input.
        let n = 3;
        let mut l = Tensor::<f64>::eye(n);
        let mut u = Tensor::<f64>::zeros([n, n]);
        for i in 0..n {
            for j in 0..n {
                if i > j {
                    l.data[i * n + j] = lu.data[i * n + j];
                } else {
                    u.data[i * n + j] = lu.data[i * n + j];
                }
            }
        }
        let prod = matmul_t(&l, &u).unwrap();
        let mut pa = a.data.clone();
        for k in 0..n {
            let p = piv.data[k] as usize;
            if p != k {
                for j in 0..n {
                    pa.swap(p * n + j, k * n + j);
                }
            }
        }
        assert!(close(&prod.data, &pa, 1e-12));
    }

    #[test]
    fn test_qr_reconstructs_and_q_orthogonal() {
        let a = Tensor::new([3, 2], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let (q, r) = qr_t(&a).unwrap();
        assert_eq!(q.shape, vec![3, 3]);
        assert_eq!(r.shape, vec![3, 2]);
        let prod = matmul_t(&q, &r).unwrap();
        assert!(close(&prod.data, &a.data, 1e-12));
        // Q^T Q = I.
        let mut qt = Tensor::<f64>::zeros([3, 3]);
        for i in 0..3 {
            for j in 0..3 {
                qt.data[i * 3 + j] = q.data[j * 3 + i];
            }
        }
        let qtq = matmul_t(&qt, &q).unwrap();
        assert!(close(&qtq.data, &Tensor::<f64>::eye(3).data, 1e-12));
        // R is upper triangular.
        assert_eq!(r.data[2], 0.0);
        assert_eq!(r.data[4], 0.0);
    }

    #[test]
    fn test_lu_factor_adapter_two_outputs() {
        let a = Tensor::new(
            [2, 2, 2],
            vec![4.0, 3.0, 6.0, 3.0, 2.0, 1.0, 1.0, 2.0],
        );
        let outs = lu_factor().call(&[a.into()], &[]).unwrap();
        assert_eq!(outs.len(), 2);
        assert_eq!(outs[0].shape(), &[2, 2, 2]);
        assert_eq!(outs[1].shape(), &[2, 2]);
        assert!(outs[1].i32().is_some());
    }
}
