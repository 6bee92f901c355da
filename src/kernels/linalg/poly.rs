// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! Polynomial kernels: root finding by Durand-Kerner iteration and
//! batched evaluation.
//!
//! `roots` is the dtype-promotion witness of the kernel library: real
//! coefficient input produces complex output, so batched assembly must
//! take its dtype from what the kernel returned rather than from the
//! operand. Output precision follows input precision; the iteration
//! itself always runs in double precision. `polyval` is the
//! independent-operand witness: its sample points never broadcast
//! against the coefficient batch.

use num_complex::Complex;

use crate::dispatch_float_complex_pair;
use crate::enums::dtype::DType;
use crate::enums::error::KernelError;
use crate::enums::tensor::NumericTensor;
use crate::kernels::linalg::registry::{require_tensor, vector_len};
use crate::kernels::routing::dispatch::Batched;
use crate::structs::signature::Signature;
use crate::structs::tensor::Tensor;
use crate::traits::type_unions::LinalgScalar;

const MAX_ITERS: usize = 500;
const TOL: f64 = 1e-13;

/// All roots of the polynomial with the given coefficients, highest order
/// first.
///
/// The root count equals `len - 1`, so a coefficient vector of fixed
/// length always produces a fixed output shape; a zero leading coefficient
/// is rejected rather than trimmed, keeping batched output shapes
/// deterministic.
pub fn roots_c128(coeffs: &[Complex<f64>]) -> Result<Vec<Complex<f64>>, KernelError> {
    if coeffs.is_empty() {
        return Err(KernelError::InvalidArgument(
            "roots: empty coefficient vector".to_string(),
        ));
    }
    let lead = coeffs[0];
    if lead.norm() == 0.0 {
        return Err(KernelError::InvalidArgument(
            "roots: leading coefficient is zero".to_string(),
        ));
    }
    let n = coeffs.len() - 1;
    if n == 0 {
        return Ok(Vec::new());
    }
    let monic: Vec<Complex<f64>> = coeffs.iter().map(|c| c / lead).collect();

    // Standard Durand-Kerner seeding: powers of a point that is neither
    // real nor on the unit circle.
    let seed = Complex::new(0.4, 0.9);
    let mut z: Vec<Complex<f64>> = (0..n).map(|i| seed.powu(i as u32 + 1)).collect();

    for _ in 0..MAX_ITERS {
        let mut max_step = 0.0f64;
        for i in 0..n {
            let p = horner(&monic, z[i]);
            let mut denom = Complex::new(1.0, 0.0);
            for j in 0..n {
                if j != i {
                    denom *= z[i] - z[j];
                }
            }
            if denom.norm() == 0.0 {
                // Coincident iterates; nudge apart and retry next pass.
                z[i] += Complex::new(f64::EPSILON.sqrt(), f64::EPSILON.sqrt());
                continue;
            }
            let step = p / denom;
            z[i] -= step;
            max_step = max_step.max(step.norm());
        }
        let scale = z.iter().fold(1.0f64, |acc, v| acc.max(v.norm()));
        if max_step <= TOL * scale {
            z.sort_by(|a, b| {
                (a.re, a.im)
                    .partial_cmp(&(b.re, b.im))
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            return Ok(z);
        }
    }
    Err(KernelError::NonConvergence(format!(
        "roots: Durand-Kerner iteration did not converge within {} iterations",
        MAX_ITERS
    )))
}

fn horner(coeffs: &[Complex<f64>], x: Complex<f64>) -> Complex<f64> {
    coeffs
        .iter()
        .fold(Complex::new(0.0, 0.0), |acc, &c| acc * x + c)
}

/// Evaluates the polynomial with the given coefficients, highest order
/// first, at every sample point. Output length equals the point count.
pub fn polyval_t<T: LinalgScalar>(
    c: &Tensor<T>,
    x: &Tensor<T>,
) -> Result<Tensor<T>, KernelError> {
    vector_len(c, "polyval")?;
    let n = vector_len(x, "polyval")?;
    let out: Vec<T> = x
        .data
        .iter()
        .map(|&xi| c.data.iter().fold(T::zero(), |acc, &ci| acc * xi + ci))
        .collect();
    Ok(Tensor::new([n], out))
}

/// `roots(c)`: batched polynomial roots. Output is always complex, in the
/// precision of the input: `Complex64` for single, `Complex128` for
/// double.
pub fn roots() -> Batched {
    Batched::new(
        Signature::new("roots").batched("c", 1).out_core_ranks(&[1]),
        |args| {
            let c = require_tensor(args, 0, "c")?;
            if c.rank() != 1 {
                return Err(KernelError::ShapeMismatch(format!(
                    "roots: expected a coefficient vector, got shape {:?}",
                    c.shape()
                )));
            }
            let coeffs = c.to_complex128_vec().ok_or_else(|| {
                KernelError::UnsupportedType(format!(
                    "roots: dtype {} is not supported",
                    c.dtype()
                ))
            })?;
            let found = roots_c128(&coeffs)?;
            let out: NumericTensor = match c.dtype().to_complex() {
                DType::Complex64 => Tensor::new(
                    [found.len()],
                    found
                        .iter()
                        .map(|z| Complex::new(z.re as f32, z.im as f32))
                        .collect(),
                )
                .into(),
                _ => Tensor::new([found.len()], found).into(),
            };
            Ok(vec![out])
        },
    )
}

/// `polyval(c, x)`: batched polynomial evaluation at a shared set of
/// sample points.
///
/// `x` is an `Independent` operand: it never reconciles with the
/// coefficient batch shape and is replayed whole to every call, so one
/// point set is evaluated against every coefficient vector in the batch.
pub fn polyval() -> Batched {
    Batched::new(
        Signature::new("polyval")
            .batched("c", 1)
            .batched_independent("x", 1)
            .out_core_ranks(&[1]),
        |args| {
            let c = require_tensor(args, 0, "c")?;
            let x = require_tensor(args, 1, "x")?;
            dispatch_float_complex_pair!(c, x, "polyval", a, b => {
                Ok(vec![polyval_t(a, b)?.into()])
            })
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(re: f64) -> Complex<f64> {
        Complex::new(re, 0.0)
    }

    #[test]
    fn test_real_roots() {
        // (x - 1)(x - 2) = x^2 - 3x + 2.
        let r = roots_c128(&[c(1.0), c(-3.0), c(2.0)]).unwrap();
        assert!((r[0] - c(1.0)).norm() < 1e-9);
        assert!((r[1] - c(2.0)).norm() < 1e-9);
    }

    #[test]
    fn test_complex_conjugate_pair() {
        // x^2 + 1 = (x - i)(x + i).
        let r = roots_c128(&[c(1.0), c(0.0), c(1.0)]).unwrap();
        assert!((r[0] - Complex::new(0.0, -1.0)).norm() < 1e-9);
        assert!((r[1] - Complex::new(0.0, 1.0)).norm() < 1e-9);
    }

    #[test]
    fn test_zero_leading_coefficient_rejected() {
        assert!(matches!(
            roots_c128(&[c(0.0), c(1.0), c(2.0)]),
            Err(KernelError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_constant_polynomial_has_no_roots() {
        assert!(roots_c128(&[c(5.0)]).unwrap().is_empty());
    }

    #[test]
    fn test_output_dtype_promotes_real_input() {
        let c64: NumericTensor = Tensor::new([3], vec![1.0f64, 0.0, 1.0]).into();
        let out = roots().call1(&[c64.into()], &[]).unwrap();
        assert_eq!(out.dtype(), DType::Complex128);
        assert_eq!(out.shape(), &[2]);

        let c32: NumericTensor = Tensor::new([3], vec![1.0f32, 0.0, 1.0]).into();
        let out = roots().call1(&[c32.into()], &[]).unwrap();
        assert_eq!(out.dtype(), DType::Complex64);
    }

    #[test]
    fn test_polyval_known_values() {
        // x^2 - 3x + 2 at 0, 1, 4.
        let c = Tensor::new([3], vec![1.0f64, -3.0, 2.0]);
        let x = Tensor::new([3], vec![0.0f64, 1.0, 4.0]);
        let y = polyval_t(&c, &x).unwrap();
        assert_eq!(y.data, vec![2.0, 0.0, 6.0]);
    }

    #[test]
    fn test_polyval_points_shared_across_batch() {
        // Two quadratics, one shared point set of a different length
        // than any batch dimension.
        let c: NumericTensor =
            Tensor::new([2, 3], vec![1.0f64, 0.0, 0.0, 0.0, 0.0, 1.0]).into();
        let x: NumericTensor = Tensor::new([3], vec![1.0f64, 2.0, 3.0]).into();
        let out = polyval().call1(&[c.into(), x.into()], &[]).unwrap();
        assert_eq!(out.shape(), &[2, 3]);
        let y = out.f64().unwrap();
        // First row: x^2; second row: the constant 1.
        assert_eq!(y.get(&[0, 2]), 9.0);
        assert_eq!(y.get(&[1, 0]), 1.0);
        assert_eq!(y.get(&[1, 2]), 1.0);
    }

    #[test]
    fn test_batched_promotion() {
        // Two cubics, batch shape (2,); real input, complex output.
        let data = vec![1.0f64, 0.0, 0.0, -1.0, 1.0, -6.0, 11.0, -6.0];
        let t: NumericTensor = Tensor::new([2, 4], data).into();
        let out = roots().call1(&[t.into()], &[]).unwrap();
        assert_eq!(out.dtype(), DType::Complex128);
        assert_eq!(out.shape(), &[2, 3]);
        let v = out.c128().unwrap();
        // Second cubic factors as (x-1)(x-2)(x-3), sorted ascending by real part.
        assert!((v.get(&[1, 0]) - c(1.0)).norm() < 1e-8);
        assert!((v.get(&[1, 2]) - c(3.0)).norm() < 1e-8);
    }
}
