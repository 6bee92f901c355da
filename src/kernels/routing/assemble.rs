// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! Output assembly: determines each output's core shape and dtype from
//! the first kernel invocation, allocates one destination tensor per
//! output with shape `batch_shape + core_shape`, and writes every
//! per-index result tuple into its disjoint slot.
//!
//! The adapter never assumes an output dtype equals the input dtype;
//! kernels may upcast real input to complex output and the first call's
//! observation is authoritative. Later calls must match it exactly.

use num_complex::Complex;

use crate::aliases::KernelFn;
use crate::enums::arg::Arg;
use crate::enums::dtype::DType;
use crate::enums::error::BatchError;
use crate::enums::tensor::NumericTensor;
use crate::structs::signature::{BroadcastPolicy, ParamRole, Signature};
use crate::structs::tensor::Tensor;
use crate::traits::type_unions::Element;

/// Accumulates per-index result tuples into batched destination tensors.
pub struct OutputAssembler {
    batch_shape: Vec<usize>,
    outputs: Vec<Dest>,
}

struct Dest {
    dtype: DType,
    core_shape: Vec<usize>,
    core_len: usize,
    data: DestData,
}

enum DestData {
    Bool(Vec<bool>),
    I32(Vec<i32>),
    I64(Vec<i64>),
    F32(Vec<f32>),
    F64(Vec<f64>),
    C64(Vec<Complex<f32>>),
    C128(Vec<Complex<f64>>),
}

impl DestData {
    fn alloc(dtype: DType, len: usize) -> DestData {
        match dtype {
            DType::Bool => DestData::Bool(vec![false; len]),
            DType::Int32 => DestData::I32(vec![0; len]),
            DType::Int64 => DestData::I64(vec![0; len]),
            DType::Float32 => DestData::F32(vec![0.0; len]),
            DType::Float64 => DestData::F64(vec![0.0; len]),
            DType::Complex64 => DestData::C64(vec![Complex::default(); len]),
            DType::Complex128 => DestData::C128(vec![Complex::default(); len]),
        }
    }

    fn write_block(&mut self, offset: usize, src: &NumericTensor) {
        match (self, src) {
            (DestData::Bool(d), NumericTensor::Bool(s)) => {
                d[offset..offset + s.len()].copy_from_slice(&s.data)
            }
            (DestData::I32(d), NumericTensor::Int32(s)) => {
                d[offset..offset + s.len()].copy_from_slice(&s.data)
            }
            (DestData::I64(d), NumericTensor::Int64(s)) => {
                d[offset..offset + s.len()].copy_from_slice(&s.data)
            }
            (DestData::F32(d), NumericTensor::Float32(s)) => {
                d[offset..offset + s.len()].copy_from_slice(&s.data)
            }
            (DestData::F64(d), NumericTensor::Float64(s)) => {
                d[offset..offset + s.len()].copy_from_slice(&s.data)
            }
            (DestData::C64(d), NumericTensor::Complex64(s)) => {
                d[offset..offset + s.len()].copy_from_slice(&s.data)
            }
            (DestData::C128(d), NumericTensor::Complex128(s)) => {
                d[offset..offset + s.len()].copy_from_slice(&s.data)
            }
            _ => unreachable!("dtype validated before block write"),
        }
    }

    fn into_tensor(self, shape: Vec<usize>) -> NumericTensor {
        match self {
            DestData::Bool(d) => Tensor::new(shape, d).into(),
            DestData::I32(d) => Tensor::new(shape, d).into(),
            DestData::I64(d) => Tensor::new(shape, d).into(),
            DestData::F32(d) => Tensor::new(shape, d).into(),
            DestData::F64(d) => Tensor::new(shape, d).into(),
            DestData::C64(d) => Tensor::new(shape, d).into(),
            DestData::C128(d) => Tensor::new(shape, d).into(),
        }
    }
}

impl OutputAssembler {
    /// Builds the assembler from the first invocation's result tuple,
    /// fixing each output's core shape and dtype and writing slot 0.
    pub fn from_first(batch_shape: &[usize], first: Vec<NumericTensor>) -> OutputAssembler {
        let total: usize = batch_shape.iter().product();
        let outputs = first
            .into_iter()
            .map(|t| {
                let dtype = t.dtype();
                let core_shape = t.shape().to_vec();
                let core_len = t.len();
                let mut data = DestData::alloc(dtype, total * core_len);
                data.write_block(0, &t);
                Dest {
                    dtype,
                    core_shape,
                    core_len,
                    data,
                }
            })
            .collect();
        OutputAssembler {
            batch_shape: batch_shape.to_vec(),
            outputs,
        }
    }

    /// Writes one later result tuple at row-major position `flat`,
    /// validating arity, shape, and dtype against the first call.
    pub fn write(
        &mut self,
        flat: usize,
        index: &[usize],
        outs: Vec<NumericTensor>,
    ) -> Result<(), BatchError> {
        if outs.len() != self.outputs.len() {
            return Err(BatchError::InconsistentArity {
                expected: self.outputs.len(),
                found: outs.len(),
                index: index.to_vec(),
            });
        }
        for (k, (dest, t)) in self.outputs.iter_mut().zip(outs).enumerate() {
            if t.dtype() != dest.dtype || t.shape() != dest.core_shape.as_slice() {
                return Err(BatchError::InconsistentOutput {
                    output: k,
                    expected: format!("dtype {} shape {:?}", dest.dtype, dest.core_shape),
                    found: format!("dtype {} shape {:?}", t.dtype(), t.shape()),
                    index: index.to_vec(),
                });
            }
            dest.data.write_block(flat * dest.core_len, &t);
        }
        Ok(())
    }

    /// Finalises the destinations into batched output tensors, in
    /// declared output order.
    pub fn finish(self) -> Vec<NumericTensor> {
        let batch_shape = self.batch_shape;
        self.outputs
            .into_iter()
            .map(|dest| {
                let mut shape = batch_shape.clone();
                shape.extend_from_slice(&dest.core_shape);
                dest.data.into_tensor(shape)
            })
            .collect()
    }
}

/// Builds the outputs for a batch shape containing a zero-sized axis.
///
/// No per-index dispatch occurs, so the first-call observation is
/// unavailable, yet the outputs must still carry the arity, core shapes,
/// and dtypes a non-empty batch of the same call would produce: a square
/// orthogonal factor from a rectangular input, integer pivot vectors
/// from a float operand, an arity shrunk by a values-only flag. The
/// kernel is therefore invoked once on identity-like stand-in cores of
/// each supplied operand's core shape and dtype, with passthrough
/// arguments intact, and its result tuple supplies the metadata. When
/// the kernel rejects the stand-in input, metadata falls back to the
/// declared output core ranks, core shapes borrowed from the trailing
/// dimensions of the first supplied batched operand and dtype taken as
/// the promotion of the supplied operands' dtypes.
pub fn empty_outputs(
    signature: &Signature,
    args: &[Arg],
    batch_shape: &[usize],
    kernel: &KernelFn,
) -> Vec<NumericTensor> {
    if let Some(outs) = standin_call(signature, args, kernel) {
        return outs
            .into_iter()
            .map(|t| {
                let mut shape = batch_shape.to_vec();
                shape.extend_from_slice(t.shape());
                NumericTensor::zeros(t.dtype(), &shape)
            })
            .collect();
    }

    let mut dtype: Option<DType> = None;
    let mut first_core: Option<Vec<usize>> = None;
    for (i, param) in signature.params().iter().enumerate() {
        let ParamRole::Batched { core_rank, .. } = param.role else {
            continue;
        };
        let Some(t) = args[i].tensor() else { continue };
        dtype = Some(match dtype {
            Some(d) => d.promote(t.dtype()),
            None => t.dtype(),
        });
        if first_core.is_none() {
            first_core = Some(t.shape()[t.rank() - core_rank..].to_vec());
        }
    }
    let dtype = dtype.unwrap_or(DType::Float64);
    let first_core = first_core.unwrap_or_default();

    let default_rank = signature.input_core_rank().unwrap_or(0);
    let out_ranks: Vec<usize> = match signature.declared_out_core_ranks() {
        Some(ranks) => ranks.to_vec(),
        None => vec![default_rank; signature.declared_n_out()],
    };

    out_ranks
        .iter()
        .map(|&rank| {
            let mut shape = batch_shape.to_vec();
            if rank <= first_core.len() {
                shape.extend_from_slice(&first_core[first_core.len() - rank..]);
            } else {
                shape.extend(std::iter::repeat(0).take(rank));
            }
            NumericTensor::zeros(dtype, &shape)
        })
        .collect()
}

/// One kernel invocation on stand-in cores, to observe output metadata
/// without any batch data. `Independent` operands pass through whole, as
/// they would on a real dispatch.
fn standin_call(
    signature: &Signature,
    args: &[Arg],
    kernel: &KernelFn,
) -> Option<Vec<NumericTensor>> {
    let mut trial: Vec<Arg> = args.to_vec();
    for (i, param) in signature.params().iter().enumerate() {
        let ParamRole::Batched { core_rank, policy } = param.role else {
            continue;
        };
        if policy == BroadcastPolicy::Independent {
            continue;
        }
        let Some(t) = args[i].tensor() else { continue };
        let core_shape = t.shape()[t.rank() - core_rank..].to_vec();
        trial[i] = Arg::Tensor(identity_core(t.dtype(), &core_shape));
    }
    kernel(&trial).ok()
}

/// A core-shaped operand with ones on the principal diagonal of its
/// trailing two axes, or plain ones at rank 0 and 1. Square stand-in
/// cores stay invertible and positive definite; vectors keep a nonzero
/// leading entry.
fn identity_core(dtype: DType, shape: &[usize]) -> NumericTensor {
    fn build<T: Element>(shape: &[usize], one: T) -> Tensor<T> {
        let mut t = Tensor::<T>::zeros(shape.to_vec());
        match shape.len() {
            0 => t.data[0] = one,
            1 => {
                for v in &mut t.data {
                    *v = one;
                }
            }
            _ => {
                let n = shape[shape.len() - 1];
                let m = shape[shape.len() - 2];
                let block = m * n;
                if block > 0 {
                    for b in 0..t.len() / block {
                        for i in 0..m.min(n) {
                            t.data[b * block + i * n + i] = one;
                        }
                    }
                }
            }
        }
        t
    }
    match dtype {
        DType::Bool => build(shape, true).into(),
        DType::Int32 => build(shape, 1i32).into(),
        DType::Int64 => build(shape, 1i64).into(),
        DType::Float32 => build(shape, 1.0f32).into(),
        DType::Float64 => build(shape, 1.0f64).into(),
        DType::Complex64 => build(shape, Complex::new(1.0f32, 0.0)).into(),
        DType::Complex128 => build(shape, Complex::new(1.0f64, 0.0)).into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn out(shape: &[usize], fill: f64) -> NumericTensor {
        let len: usize = shape.iter().product();
        Tensor::new(shape.to_vec(), vec![fill; len]).into()
    }

    #[test]
    fn test_two_outputs_mixed_core_rank() {
        let mut asm = OutputAssembler::from_first(
            &[2],
            vec![out(&[3, 3], 0.0), out(&[3], 0.0)],
        );
        asm.write(1, &[1], vec![out(&[3, 3], 1.0), out(&[3], 1.0)])
            .unwrap();
        let outs = asm.finish();
        assert_eq!(outs[0].shape(), &[2, 3, 3]);
        assert_eq!(outs[1].shape(), &[2, 3]);
        assert_eq!(outs[1].f64().unwrap().get(&[1, 2]), 1.0);
    }

    #[test]
    fn test_shape_drift_is_rejected() {
        let mut asm = OutputAssembler::from_first(&[2], vec![out(&[3, 3], 0.0)]);
        let err = asm.write(1, &[1], vec![out(&[2, 2], 1.0)]).unwrap_err();
        assert!(matches!(err, BatchError::InconsistentOutput { output: 0, .. }));
    }

    #[test]
    fn test_dtype_drift_is_rejected() {
        let mut asm = OutputAssembler::from_first(&[2], vec![out(&[3], 0.0)]);
        let drift: NumericTensor = Tensor::new([3], vec![0.0f32; 3]).into();
        let err = asm.write(1, &[1], vec![drift]).unwrap_err();
        assert!(matches!(err, BatchError::InconsistentOutput { .. }));
    }

    #[test]
    fn test_arity_drift_is_rejected() {
        let mut asm = OutputAssembler::from_first(&[2], vec![out(&[3], 0.0)]);
        let err = asm
            .write(1, &[1], vec![out(&[3], 0.0), out(&[3], 0.0)])
            .unwrap_err();
        assert!(matches!(err, BatchError::InconsistentArity { .. }));
    }

    #[test]
    fn test_empty_outputs_observe_kernel_metadata() {
        // An lu_factor-shaped kernel: float factor plus integer pivots.
        let sig = Signature::new("lu_factor")
            .batched("a", 2)
            .n_out(2)
            .out_core_ranks(&[2, 1]);
        let kernel: KernelFn = std::sync::Arc::new(|args: &[Arg]| {
            let a = args[0].tensor().unwrap();
            let n = a.shape()[0];
            Ok(vec![
                NumericTensor::zeros(DType::Float64, &[n, n]),
                NumericTensor::zeros(DType::Int32, &[n]),
            ])
        });
        let args = vec![Arg::Tensor(out(&[0, 4, 4], 0.0))];
        let outs = empty_outputs(&sig, &args, &[0], &kernel);
        assert_eq!(outs[0].shape(), &[0, 4, 4]);
        assert_eq!(outs[0].dtype(), DType::Float64);
        assert_eq!(outs[1].shape(), &[0, 4]);
        assert_eq!(outs[1].dtype(), DType::Int32);
        assert!(outs[0].is_empty());
    }

    #[test]
    fn test_empty_outputs_square_factor_from_rectangular_core() {
        // A qr-shaped kernel: (m, n) in, (m, m) and (m, n) out.
        let sig = Signature::new("qr")
            .batched("a", 2)
            .n_out(2)
            .out_core_ranks(&[2, 2]);
        let kernel: KernelFn = std::sync::Arc::new(|args: &[Arg]| {
            let a = args[0].tensor().unwrap();
            let (m, n) = (a.shape()[0], a.shape()[1]);
            Ok(vec![
                NumericTensor::zeros(DType::Float64, &[m, m]),
                NumericTensor::zeros(DType::Float64, &[m, n]),
            ])
        });
        let args = vec![Arg::Tensor(out(&[0, 4, 3], 0.0))];
        let outs = empty_outputs(&sig, &args, &[0], &kernel);
        assert_eq!(outs[0].shape(), &[0, 4, 4]);
        assert_eq!(outs[1].shape(), &[0, 4, 3]);
    }

    #[test]
    fn test_empty_outputs_fall_back_to_declared_ranks() {
        let sig = Signature::new("lu_factor")
            .batched("a", 2)
            .n_out(2)
            .out_core_ranks(&[2, 1]);
        let kernel: KernelFn = std::sync::Arc::new(|_: &[Arg]| {
            Err(crate::enums::error::KernelError::InvalidArgument(
                "rejects everything".to_string(),
            ))
        });
        let args = vec![Arg::Tensor(out(&[0, 4, 4], 0.0))];
        let outs = empty_outputs(&sig, &args, &[0], &kernel);
        assert_eq!(outs[0].shape(), &[0, 4, 4]);
        assert_eq!(outs[1].shape(), &[0, 4]);
        assert_eq!(outs[1].dtype(), DType::Float64);
    }
}
