// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! Broadcast planning: strips each batched operand's declared core
//! dimensions, reconciles the remaining batch shapes with right-aligned
//! NumPy-style broadcasting, and precomputes the element strides that map
//! a common batch multi-index to each operand's own core block.

use crate::enums::arg::Arg;
use crate::enums::error::BatchError;
use crate::structs::signature::{BroadcastPolicy, ParamRole, Signature};

/// Per-operand slice of a [`BroadcastPlan`].
#[derive(Debug, Clone, PartialEq)]
pub struct OperandPlan {
    /// Position of the parameter in the signature's ordered list.
    pub param: usize,
    /// Element strides over the common batch axes. Size-1 operand axes
    /// are stretched with a zero stride, missing leading axes likewise.
    pub batch_strides: Vec<usize>,
    /// The operand's trailing core shape.
    pub core_shape: Vec<usize>,
    /// True for `Independent` operands: passed whole to every call
    /// rather than sliced per index.
    pub replay_whole: bool,
}

/// The resolved common batch shape plus per-operand index mappings.
///
/// Constructed fresh per call and discarded on return; no state persists
/// across invocations.
#[derive(Debug, Clone, PartialEq)]
pub struct BroadcastPlan {
    /// Common batch shape of all participating operands. Empty when no
    /// supplied operand carries batch dimensions.
    pub batch_shape: Vec<usize>,
    /// One entry per supplied batched operand.
    pub operands: Vec<OperandPlan>,
    /// True when the call degenerates to a single direct kernel
    /// invocation with results returned unwrapped.
    pub direct: bool,
}

impl BroadcastPlan {
    /// Number of kernel invocations the plan will drive.
    #[inline]
    pub fn batch_count(&self) -> usize {
        self.batch_shape.iter().product()
    }
}

struct BatchedOperand {
    param: usize,
    name: &'static str,
    core_rank: usize,
    policy: BroadcastPolicy,
    shape: Vec<usize>,
}

/// Computes the broadcast plan for one normalised call.
///
/// Fails with `Broadcast` before any kernel call when two
/// required-compatible operands have incompatible batch shapes, naming
/// both operands and shapes.
pub fn plan(signature: &Signature, args: &[Arg]) -> Result<BroadcastPlan, BatchError> {
    debug_assert_eq!(args.len(), signature.n_params());

    // Collect the batched parameters the caller actually supplied.
    let mut supplied: Vec<BatchedOperand> = Vec::new();
    for (i, param) in signature.params().iter().enumerate() {
        let ParamRole::Batched { core_rank, policy } = param.role else {
            continue;
        };
        match &args[i] {
            Arg::None => continue,
            Arg::Tensor(t) => {
                if t.rank() < core_rank {
                    return Err(BatchError::CoreRank {
                        param: param.name,
                        rank: t.rank(),
                        core_rank,
                    });
                }
                supplied.push(BatchedOperand {
                    param: i,
                    name: param.name,
                    core_rank,
                    policy,
                    shape: t.shape().to_vec(),
                });
            }
            _ => return Err(BatchError::NotATensor { param: param.name }),
        }
    }

    // Right-aligned broadcast over the participating batch shapes,
    // tracking which operand fixed each non-1 axis for error reporting.
    let mut shape_rev: Vec<usize> = Vec::new();
    let mut owner_rev: Vec<Option<usize>> = Vec::new();
    for (k, op) in supplied.iter().enumerate() {
        if op.policy != BroadcastPolicy::Required {
            continue;
        }
        let batch = &op.shape[..op.shape.len() - op.core_rank];
        for (i, &dim) in batch.iter().rev().enumerate() {
            if i == shape_rev.len() {
                shape_rev.push(dim);
                owner_rev.push((dim != 1).then_some(k));
                continue;
            }
            let cur = shape_rev[i];
            if dim == 1 || dim == cur {
                continue;
            }
            if cur == 1 {
                shape_rev[i] = dim;
                owner_rev[i] = Some(k);
                continue;
            }
            let owner = &supplied[owner_rev[i].expect("non-1 axis always has an owner")];
            return Err(BatchError::Broadcast {
                left: owner.name,
                left_shape: owner.shape[..owner.shape.len() - owner.core_rank].to_vec(),
                right: op.name,
                right_shape: batch.to_vec(),
            });
        }
    }
    let batch_shape: Vec<usize> = shape_rev.iter().rev().copied().collect();
    let rank = batch_shape.len();

    // Per-operand stride mapping into the common batch space.
    let mut operands = Vec::with_capacity(supplied.len());
    for op in &supplied {
        let core_shape = op.shape[op.shape.len() - op.core_rank..].to_vec();
        if op.policy == BroadcastPolicy::Independent {
            operands.push(OperandPlan {
                param: op.param,
                batch_strides: vec![0; rank],
                core_shape,
                replay_whole: true,
            });
            continue;
        }
        let batch = &op.shape[..op.shape.len() - op.core_rank];
        // Own row-major element strides over the batch axes; the stride
        // of batch axis i spans everything to its right, core included.
        let mut own = vec![0usize; batch.len()];
        let mut acc: usize = op.shape[batch.len()..].iter().product();
        for i in (0..batch.len()).rev() {
            own[i] = acc;
            acc *= batch[i];
        }
        let mut strides = vec![0usize; rank];
        for i in 0..batch.len() {
            let plan_axis = rank - batch.len() + i;
            strides[plan_axis] = if batch[i] == 1 { 0 } else { own[i] };
        }
        operands.push(OperandPlan {
            param: op.param,
            batch_strides: strides,
            core_shape,
            replay_whole: false,
        });
    }

    let direct = batch_shape.is_empty();
    Ok(BroadcastPlan {
        batch_shape,
        operands,
        direct,
    })
}
