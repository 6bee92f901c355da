// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! Linear-system kernels: general and triangular solves.
//!
//! `solve` pairs a rank-2 coefficient operand with a rank-1 right-hand
//! side, the canonical mixed-core-rank two-operand routine: batch shapes
//! of `a` and `b` broadcast against each other while their core ranks
//! stay 2 and 1.

use num_traits::Zero;

use crate::dispatch_float_complex_pair;
use crate::enums::error::KernelError;
use crate::kernels::linalg::registry::{opt_bool, require_tensor, square_dim, vector_len};
use crate::kernels::routing::dispatch::Batched;
use crate::structs::signature::Signature;
use crate::structs::tensor::Tensor;
use crate::traits::type_unions::LinalgScalar;

/// Solves `a x = b` for a square `a` and a vector `b` by Gaussian
/// elimination with partial pivoting.
pub fn solve_t<T: LinalgScalar>(a: &Tensor<T>, b: &Tensor<T>) -> Result<Tensor<T>, KernelError> {
    let n = square_dim(a, "solve")?;
    let bn = vector_len(b, "solve")?;
    if bn != n {
        return Err(KernelError::ShapeMismatch(format!(
            "solve: matrix of order {} against right-hand side of length {}",
            n, bn
        )));
    }
    let mut m = a.data.clone();
    let mut x = b.data.clone();

    for col in 0..n {
        let mut p = col;
        let mut best = m[col * n + col].abs();
        for r in col + 1..n {
            let v = m[r * n + col].abs();
            if v > best {
                best = v;
                p = r;
            }
        }
        if best == T::Real::zero() {
            return Err(KernelError::Singular(
                "solve: matrix is singular".to_string(),
            ));
        }
        if p != col {
            for j in col..n {
                m.swap(p * n + j, col * n + j);
            }
            x.swap(p, col);
        }
        let pivot = m[col * n + col];
        for r in col + 1..n {
            let f = m[r * n + col] / pivot;
            if f == T::zero() {
                continue;
            }
            for j in col + 1..n {
                let upd = f * m[col * n + j];
                m[r * n + j] -= upd;
            }
            let upd = f * x[col];
            x[r] -= upd;
        }
    }

    for i in (0..n).rev() {
        let mut s = x[i];
        for j in i + 1..n {
            s -= m[i * n + j] * x[j];
        }
        x[i] = s / m[i * n + i];
    }
    Ok(Tensor::new([n], x))
}

/// Solves a triangular system `a x = b` by substitution, reading only the
/// triangle selected by `lower`.
pub fn solve_triangular_t<T: LinalgScalar>(
    a: &Tensor<T>,
    b: &Tensor<T>,
    lower: bool,
) -> Result<Tensor<T>, KernelError> {
    let n = square_dim(a, "solve_triangular")?;
    let bn = vector_len(b, "solve_triangular")?;
    if bn != n {
        return Err(KernelError::ShapeMismatch(format!(
            "solve_triangular: matrix of order {} against right-hand side of length {}",
            n, bn
        )));
    }
    let mut x = b.data.clone();

    if lower {
        for i in 0..n {
            let mut s = x[i];
            for j in 0..i {
                s -= a.data[i * n + j] * x[j];
            }
            let d = a.data[i * n + i];
            if d == T::zero() {
                return Err(KernelError::Singular(format!(
                    "solve_triangular: zero diagonal at position {}",
                    i
                )));
            }
            x[i] = s / d;
        }
    } else {
        for i in (0..n).rev() {
            let mut s = x[i];
            for j in i + 1..n {
                s -= a.data[i * n + j] * x[j];
            }
            let d = a.data[i * n + i];
            if d == T::zero() {
                return Err(KernelError::Singular(format!(
                    "solve_triangular: zero diagonal at position {}",
                    i
                )));
            }
            x[i] = s / d;
        }
    }
    Ok(Tensor::new([n], x))
}

/// `solve(a, b)`: batched general linear solve with a vector right-hand
/// side. The two operands broadcast over their batch dimensions.
pub fn solve() -> Batched {
    Batched::new(
        Signature::new("solve")
            .batched("a", 2)
            .batched("b", 1)
            .out_core_ranks(&[1]),
        |args| {
            let a = require_tensor(args, 0, "a")?;
            let b = require_tensor(args, 1, "b")?;
            dispatch_float_complex_pair!(a, b, "solve", x, y => {
                Ok(vec![solve_t(x, y)?.into()])
            })
        },
    )
}

/// `solve_triangular(a, b, lower=false)`: batched triangular solve.
pub fn solve_triangular() -> Batched {
    Batched::new(
        Signature::new("solve_triangular")
            .batched("a", 2)
            .batched("b", 1)
            .passthrough("lower")
            .out_core_ranks(&[1]),
        |args| {
            let a = require_tensor(args, 0, "a")?;
            let b = require_tensor(args, 1, "b")?;
            let lower = opt_bool(args, 2, false)?;
            dispatch_float_complex_pair!(a, b, "solve_triangular", x, y => {
                Ok(vec![solve_triangular_t(x, y, lower)?.into()])
            })
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::arg::Arg;

    #[test]
    fn test_solve_known_system() {
        let a: Tensor<f64> = Tensor::new([2, 2], vec![3.0, 1.0, 1.0, 2.0]);
        let b: Tensor<f64> = Tensor::new([2], vec![9.0, 8.0]);
        let x = solve_t(&a, &b).unwrap();
        assert!((x.data[0] - 2.0).abs() < 1e-12);
        assert!((x.data[1] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_solve_needs_pivoting() {
        let a = Tensor::new([2, 2], vec![0.0, 1.0, 1.0, 0.0]);
        let b = Tensor::new([2], vec![5.0, 7.0]);
        let x = solve_t(&a, &b).unwrap();
        assert_eq!(x.data, vec![7.0, 5.0]);
    }

    #[test]
    fn test_solve_singular() {
        let a = Tensor::new([2, 2], vec![1.0, 2.0, 2.0, 4.0]);
        let b = Tensor::new([2], vec![1.0, 2.0]);
        assert!(matches!(solve_t(&a, &b), Err(KernelError::Singular(_))));
    }

    #[test]
    fn test_solve_length_mismatch() {
        let a = Tensor::new([2, 2], vec![1.0, 0.0, 0.0, 1.0]);
        let b = Tensor::new([3], vec![1.0, 2.0, 3.0]);
        assert!(matches!(
            solve_t(&a, &b),
            Err(KernelError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_solve_triangular_both_triangles() {
        let lo = Tensor::new([2, 2], vec![2.0, 0.0, 1.0, 3.0]);
        let b = Tensor::new([2], vec![4.0, 11.0]);
        let x = solve_triangular_t(&lo, &b, true).unwrap();
        assert_eq!(x.data, vec![2.0, 3.0]);

        let up = Tensor::new([2, 2], vec![2.0, 1.0, 0.0, 3.0]);
        let b = Tensor::new([2], vec![7.0, 9.0]);
        let x = solve_triangular_t(&up, &b, false).unwrap();
        assert_eq!(x.data, vec![2.0, 3.0]);
    }

    #[test]
    fn test_solve_triangular_zero_diagonal() {
        let a = Tensor::new([2, 2], vec![0.0, 0.0, 1.0, 3.0]);
        let b = Tensor::new([2], vec![1.0, 2.0]);
        assert!(matches!(
            solve_triangular_t(&a, &b, true),
            Err(KernelError::Singular(_))
        ));
    }

    #[test]
    fn test_solve_adapter_mixed_core_ranks_broadcast() {
        // a: batch (2,), core (2, 2); b: no batch, core (2,).
        let a = Tensor::new(
            [2, 2, 2],
            vec![1.0, 0.0, 0.0, 1.0, 2.0, 0.0, 0.0, 2.0],
        );
        let b = Tensor::new([2], vec![4.0, 6.0]);
        let out = solve().call1(&[a.into(), b.into()], &[]).unwrap();
        assert_eq!(out.shape(), &[2, 2]);
        let x = out.f64().unwrap();
        assert_eq!(x.get(&[0, 0]), 4.0);
        assert_eq!(x.get(&[1, 1]), 3.0);
    }

    #[test]
    fn test_solve_triangular_keyword_flag() {
        let a = Tensor::new([2, 2], vec![2.0, 0.0, 1.0, 3.0]);
        let b = Tensor::new([2], vec![4.0, 11.0]);
        let out = solve_triangular()
            .call1(&[a.into(), b.into()], &[("lower", Arg::Bool(true))])
            .unwrap();
        assert_eq!(out.f64().unwrap().data, vec![2.0, 3.0]);
    }
}
