// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! Elementary dense-matrix kernels: product, inverse, determinant.
//!
//! These are reference kernels: straightforward dense algorithms with
//! partial pivoting, generic over the four floating element types. Each
//! operates on one unbatched operand set; batching over leading
//! dimensions is entirely the adapter's concern.

use num_traits::Zero;

use crate::enums::error::KernelError;
use crate::kernels::linalg::registry::{matrix_dims, require_tensor, square_dim};
use crate::kernels::routing::dispatch::Batched;
use crate::structs::signature::Signature;
use crate::structs::tensor::Tensor;
use crate::traits::type_unions::LinalgScalar;
use crate::{dispatch_float_complex, dispatch_float_complex_pair};

/// Dense matrix product of an `(m, k)` by a `(k, n)` matrix.
pub fn matmul_t<T: LinalgScalar>(a: &Tensor<T>, b: &Tensor<T>) -> Result<Tensor<T>, KernelError> {
    let (m, k) = matrix_dims(a, "matmul")?;
    let (k2, n) = matrix_dims(b, "matmul")?;
    if k != k2 {
        return Err(KernelError::ShapeMismatch(format!(
            "matmul: inner dimensions differ, {:?} x {:?}",
            a.shape, b.shape
        )));
    }
    let mut out = vec![T::zero(); m * n];
    for i in 0..m {
        for p in 0..k {
            let aip = a.data[i * k + p];
            if aip == T::zero() {
                continue;
            }
            for j in 0..n {
                out[i * n + j] += aip * b.data[p * n + j];
            }
        }
    }
    Ok(Tensor::new([m, n], out))
}

/// Inverse of a square matrix by Gauss-Jordan elimination with partial
/// pivoting. Fails with `Singular` when a pivot column is exactly zero.
pub fn inv_t<T: LinalgScalar>(a: &Tensor<T>) -> Result<Tensor<T>, KernelError> {
    let n = square_dim(a, "inv")?;
    let mut m = a.data.clone();
    let mut inv = Tensor::<T>::eye(n).data;

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
            return Err(KernelError::Singular(format!(
                "inv: matrix is singular, no pivot in column {}",
                col
            )));
        }
        if p != col {
            for j in 0..n {
                m.swap(p * n + j, col * n + j);
                inv.swap(p * n + j, col * n + j);
            }
        }
        let pivot = m[col * n + col];
        for j in 0..n {
            m[col * n + j] /= pivot;
            inv[col * n + j] /= pivot;
        }
        for r in 0..n {
            if r == col {
                continue;
            }
            let f = m[r * n + col];
            if f == T::zero() {
                continue;
            }
            for j in 0..n {
                let um = f * m[col * n + j];
                let ui = f * inv[col * n + j];
                m[r * n + j] -= um;
                inv[r * n + j] -= ui;
            }
        }
    }
    Ok(Tensor::new([n, n], inv))
}

/// Determinant via LU elimination with partial pivoting; an exactly
/// singular matrix yields zero rather than an error.
pub fn det_t<T: LinalgScalar>(a: &Tensor<T>) -> Result<T, KernelError> {
    let n = square_dim(a, "det")?;
    let mut m = a.data.clone();
    let mut det = T::one();

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
            return Ok(T::zero());
        }
        if p != col {
            for j in col..n {
                m.swap(p * n + j, col * n + j);
            }
            det = -det;
        }
        let pivot = m[col * n + col];
        det = det * pivot;
        for r in col + 1..n {
            let f = m[r * n + col] / pivot;
            if f == T::zero() {
                continue;
            }
            for j in col + 1..n {
                let upd = f * m[col * n + j];
                m[r * n + j] -= upd;
            }
        }
    }
    Ok(det)
}

/// `matmul(a, b)`: batched matrix product. Both operands broadcast
/// against each other over their leading dimensions.
pub fn matmul() -> Batched {
    Batched::new(
        Signature::new("matmul").batched("a", 2).batched("b", 2),
        |args| {
            let a = require_tensor(args, 0, "a")?;
            let b = require_tensor(args, 1, "b")?;
            dispatch_float_complex_pair!(a, b, "matmul", x, y => {
                Ok(vec![matmul_t(x, y)?.into()])
            })
        },
    )
}

/// `inv(a)`: batched matrix inverse.
pub fn inv() -> Batched {
    Batched::new(Signature::new("inv").batched("a", 2), |args| {
        let a = require_tensor(args, 0, "a")?;
        dispatch_float_complex!(a, "inv", t => Ok(vec![inv_t(t)?.into()]))
    })
}

/// `det(a)`: batched determinant. A rank-2 input yields a rank-0 output;
/// batch dimensions carry over unchanged.
pub fn det() -> Batched {
    Batched::new(
        Signature::new("det").batched("a", 2).out_core_ranks(&[0]),
        |args| {
            let a = require_tensor(args, 0, "a")?;
            dispatch_float_complex!(a, "det", t => {
                Ok(vec![Tensor::from_scalar(det_t(t)?).into()])
            })
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::tensor::NumericTensor;

    fn mat(data: Vec<f64>) -> Tensor<f64> {
        let n = (data.len() as f64).sqrt() as usize;
        Tensor::new([n, n], data)
    }

    #[test]
    fn test_matmul_known_product() {
        let a = Tensor::new([2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let b = Tensor::new([3, 2], vec![7.0, 8.0, 9.0, 10.0, 11.0, 12.0]);
        let c = matmul_t(&a, &b).unwrap();
        assert_eq!(c.shape, vec![2, 2]);
        assert_eq!(c.data, vec![58.0, 64.0, 139.0, 154.0]);
    }

    #[test]
    fn test_matmul_inner_mismatch() {
        let a = Tensor::new([2, 3], vec![0.0; 6]);
        let b = Tensor::new([2, 2], vec![0.0; 4]);
        assert!(matches!(
            matmul_t(&a, &b),
            Err(KernelError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_inv_times_original_is_identity() {
        let a = mat(vec![4.0, 7.0, 2.0, 6.0]);
        let ainv = inv_t(&a).unwrap();
        let prod = matmul_t(&a, &ainv).unwrap();
        let eye = Tensor::<f64>::eye(2);
        for (x, y) in prod.data.iter().zip(&eye.data) {
            assert!((x - y).abs() < 1e-12);
        }
    }

    #[test]
    fn test_inv_singular() {
        let a = mat(vec![1.0, 2.0, 2.0, 4.0]);
        assert!(matches!(inv_t(&a), Err(KernelError::Singular(_))));
    }

    #[test]
    fn test_det_values() {
        assert!((det_t(&mat(vec![4.0, 7.0, 2.0, 6.0])).unwrap() - 10.0).abs() < 1e-12);
        // Singular determinant is zero, not an error.
        assert_eq!(det_t(&mat(vec![1.0, 2.0, 2.0, 4.0])).unwrap(), 0.0);
        // Row swap flips the sign.
        let swapped = mat(vec![2.0, 6.0, 4.0, 7.0]);
        assert!((det_t(&swapped).unwrap() + 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_det_adapter_scalar_core() {
        let a: NumericTensor = mat(vec![4.0, 7.0, 2.0, 6.0]).into();
        let out = det().call1(&[a.into()], &[]).unwrap();
        assert_eq!(out.shape(), &[] as &[usize]);
        assert!((out.f64().unwrap().get(&[]) - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_matmul_rejects_mixed_dtypes() {
        let a: NumericTensor = Tensor::new([1, 1], vec![1.0f64]).into();
        let b: NumericTensor = Tensor::new([1, 1], vec![1.0f32]).into();
        let err = matmul().call(&[a.into(), b.into()], &[]).unwrap_err();
        assert!(err.to_string().contains("floating dtype"));
    }
}
