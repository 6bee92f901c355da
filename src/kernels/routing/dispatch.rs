// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! The batched adapter and its dispatch loop.
//!
//! [`Batched`] owns a routine's [`Signature`] and its opaque unbatched
//! kernel. A call runs normalise -> plan -> dispatch -> assemble:
//! every multi-index of the resolved batch shape is enumerated exactly
//! once in row-major order, each batched operand is replaced by its core
//! block at the mapped offset, and the kernel's result tuple is written
//! into the batched destinations.
//!
//! Dispatch is synchronous and sequential: kernels are treated as
//! potentially non-reentrant and later iterations reuse freshly
//! allocated destination buffers. Iterations read disjoint input slices
//! and write disjoint output slots, so the optional `parallel_proc`
//! executor can evaluate them on the rayon pool while reporting any
//! failure as if execution had stopped at the first failing index in
//! canonical order.
//!
//! Failure is fail-fast with no partial results: a kernel error at any
//! index aborts the whole batched call, annotated with that index.
//! Batched linear-algebra failures are data errors, not transient
//! faults.

use crate::aliases::{BatchResult, KernelFn, KernelResult};
use crate::enums::arg::Arg;
use crate::enums::error::BatchError;
use crate::enums::tensor::NumericTensor;
use crate::kernels::routing::assemble::{OutputAssembler, empty_outputs};
use crate::kernels::routing::normalize::normalize;
use crate::kernels::routing::plan::{BroadcastPlan, plan};
use crate::structs::signature::Signature;
use crate::utils::{MultiIndex, stride_offset};

#[cfg(feature = "parallel_proc")]
use rayon::prelude::*;

/// # Batched
///
/// A routine lifted over leading batch dimensions.
///
/// Holds the immutable [`Signature`] registered for the routine and the
/// unbatched kernel as an opaque callable. No state persists across
/// calls; broadcast plans and destination buffers are per-call.
#[derive(Clone)]
pub struct Batched {
    signature: Signature,
    kernel: KernelFn,
}

impl Batched {
    /// Registers `kernel` under `signature`.
    pub fn new(
        signature: Signature,
        kernel: impl Fn(&[Arg]) -> KernelResult + Send + Sync + 'static,
    ) -> Self {
        Batched {
            signature,
            kernel: std::sync::Arc::new(kernel),
        }
    }

    /// The routine's batching contract.
    #[inline]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Invokes the routine with positional and keyword arguments.
    ///
    /// Operands without batch dimensions take the direct path: one
    /// kernel call, results returned unwrapped and bit-identical to
    /// calling the kernel itself. Otherwise returns one batched tensor
    /// per kernel output, in the kernel's own output order and arity.
    pub fn call(
        &self,
        positional: &[Arg],
        keyword: &[(&str, Arg)],
    ) -> BatchResult<Vec<NumericTensor>> {
        let args = normalize(&self.signature, positional, keyword)?;
        let plan = plan(&self.signature, &args)?;

        if plan.direct {
            return (self.kernel)(&args).map_err(BatchError::from);
        }
        if plan.batch_count() == 0 {
            return Ok(empty_outputs(
                &self.signature,
                &args,
                &plan.batch_shape,
                &self.kernel,
            ));
        }

        let mut call_args = args.clone();
        let mut assembler: Option<OutputAssembler> = None;
        for (flat, idx) in MultiIndex::new(&plan.batch_shape).enumerate() {
            self.slice_operands(&plan, &args, &idx, &mut call_args);
            let outs = (self.kernel)(&call_args).map_err(|e| BatchError::Kernel {
                index: idx.clone(),
                source: e,
            })?;
            match assembler.as_mut() {
                None => assembler = Some(OutputAssembler::from_first(&plan.batch_shape, outs)),
                Some(asm) => asm.write(flat, &idx, outs)?,
            }
        }
        Ok(assembler.expect("batch is non-empty").finish())
    }

    /// Single-output convenience surface: unwraps the singleton result
    /// tuple of an `n_out == 1` routine.
    pub fn call1(
        &self,
        positional: &[Arg],
        keyword: &[(&str, Arg)],
    ) -> BatchResult<NumericTensor> {
        let mut outs = self.call(positional, keyword)?;
        if outs.len() != 1 {
            return Err(BatchError::OutputArity {
                routine: self.signature.name(),
                expected: 1,
                found: outs.len(),
            });
        }
        Ok(outs.pop().expect("length checked"))
    }

    /// Parallel executor: evaluates independent batch indices on the
    /// rayon pool. Ordering guarantees are preserved - any failure is
    /// reported as if execution had stopped at the first failing index
    /// in canonical row-major order.
    #[cfg(feature = "parallel_proc")]
    pub fn call_parallel(
        &self,
        positional: &[Arg],
        keyword: &[(&str, Arg)],
    ) -> BatchResult<Vec<NumericTensor>> {
        let args = normalize(&self.signature, positional, keyword)?;
        let plan = plan(&self.signature, &args)?;

        if plan.direct {
            return (self.kernel)(&args).map_err(BatchError::from);
        }
        if plan.batch_count() == 0 {
            return Ok(empty_outputs(
                &self.signature,
                &args,
                &plan.batch_shape,
                &self.kernel,
            ));
        }

        let indices: Vec<Vec<usize>> = MultiIndex::new(&plan.batch_shape).collect();
        let results: Vec<BatchResult<Vec<NumericTensor>>> = indices
            .par_iter()
            .map(|idx| {
                let mut call_args = args.clone();
                self.slice_operands(&plan, &args, idx, &mut call_args);
                (self.kernel)(&call_args).map_err(|e| BatchError::Kernel {
                    index: idx.clone(),
                    source: e,
                })
            })
            .collect();

        let mut assembler: Option<OutputAssembler> = None;
        for (flat, (idx, res)) in indices.iter().zip(results).enumerate() {
            let outs = res?;
            match assembler.as_mut() {
                None => assembler = Some(OutputAssembler::from_first(&plan.batch_shape, outs)),
                Some(asm) => asm.write(flat, idx, outs)?,
            }
        }
        Ok(assembler.expect("batch is non-empty").finish())
    }

    /// Replaces each planned operand in `call_args` with its core block
    /// at `idx`. Size-1 operand axes replay the same block via their
    /// zero stride; `Independent` operands stay whole.
    fn slice_operands(
        &self,
        plan: &BroadcastPlan,
        args: &[Arg],
        idx: &[usize],
        call_args: &mut [Arg],
    ) {
        for op in &plan.operands {
            if op.replay_whole {
                continue;
            }
            let src = args[op.param].tensor().expect("validated by planner");
            let offset = stride_offset(idx, &op.batch_strides);
            call_args[op.param] = Arg::Tensor(src.core_block(offset, &op.core_shape));
        }
    }
}
