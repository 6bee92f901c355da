//! Copyright © 2025 Peter Garfield Bower. All rights reserved.
//!
//! # Minbatch
//!
//! Batch-broadcasting adapter for dense linear-algebra kernels.
//!
//! Routines defined on a single matrix or vector are lifted into routines
//! that accept any number of leading batch dimensions. Batch shapes are
//! reconciled with NumPy-style broadcasting, the underlying kernel is
//! invoked once per batch index, and the per-index results are reassembled
//! into batched output tensors whose dtype follows the kernel's own
//! promotion rules. Calls remain compatible with the unbatched routine:
//! operands may be passed positionally or by parameter name, and inputs
//! without batch dimensions take a zero-overhead direct path.

pub mod enums {
    pub mod arg;
    pub mod dtype;
    pub mod error;
    pub mod tensor;
}

pub mod structs {
    pub mod signature;
    pub mod tensor;
}

pub mod traits {
    pub mod type_unions;
}

pub mod kernels {
    pub mod routing {
        pub mod assemble;
        pub mod dispatch;
        pub mod normalize;
        pub mod plan;
    }
    pub mod linalg {
        pub mod basic;
        pub mod decomp;
        pub mod eigen;
        pub mod poly;
        pub mod props;
        pub mod registry;
        pub mod solve;
    }
}

pub mod aliases;
pub mod macros;
pub mod utils;

pub use aliases::{BatchResult, KernelFn, KernelResult};
pub use enums::arg::Arg;
pub use enums::dtype::DType;
pub use enums::error::{BatchError, KernelError};
pub use enums::tensor::NumericTensor;
pub use enums::tensor::tensor_of;
pub use kernels::linalg::registry::{lookup, registry};
pub use kernels::routing::dispatch::Batched;
pub use kernels::routing::plan::{BroadcastPlan, OperandPlan};
pub use structs::signature::{BroadcastPolicy, Param, ParamRole, Signature};
pub use structs::tensor::Tensor;
pub use traits::type_unions::{Element, LinalgScalar, Real};
