//! # Signature Module - *Per-Routine Batching Contract*
//!
//! Static metadata describing how one routine is batched: its ordered
//! parameter list, which parameters are batched tensor operands and at
//! what core rank, the declared output count, and optional per-output
//! core ranks when outputs differ in rank from the inputs (e.g. an
//! eigendecomposition returning rank-1 eigenvalues and rank-2 vectors
//! from a rank-2 input).
//!
//! A `Signature` is built once when a routine is registered and is
//! immutable thereafter. The batching contract is carried as data, not
//! per-kernel code branches: every routine is normalised to "ordered
//! operand list in, ordered result tuple out".

/// Broadcasting participation of a batched parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BroadcastPolicy {
    /// Participates in the common batch-shape computation; its batch
    /// shape must be pairwise compatible with every other `Required`
    /// operand's.
    Required,
    /// Excluded from the compatibility check and replayed whole to every
    /// call; the kernel broadcasts it internally.
    Independent,
}

/// Role of one declared parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamRole {
    /// A tensor operand with `core_rank` trailing core dimensions; any
    /// leading dimensions are batch dimensions.
    Batched {
        core_rank: usize,
        policy: BroadcastPolicy,
    },
    /// Passed through unchanged to every per-index call: scalars,
    /// flags, and configuration values.
    Passthrough,
}

/// One declared parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Param {
    pub name: &'static str,
    pub role: ParamRole,
}

/// # Signature
///
/// Immutable per-routine batching contract.
///
/// ### Construction
/// Builder-style, at registration time:
///
/// ```rust
/// use minbatch::Signature;
///
/// let sig = Signature::new("lu_factor")
///     .batched("a", 2)
///     .n_out(2)
///     .out_core_ranks(&[2, 1]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    name: &'static str,
    params: Vec<Param>,
    n_out: usize,
    out_core_ranks: Option<Vec<usize>>,
}

impl Signature {
    /// Starts a signature for the named routine. Declared output count
    /// defaults to 1.
    pub fn new(name: &'static str) -> Self {
        Signature {
            name,
            params: Vec::new(),
            n_out: 1,
            out_core_ranks: None,
        }
    }

    /// Declares a batched tensor parameter with the given core rank,
    /// participating in batch-shape broadcasting.
    pub fn batched(self, name: &'static str, core_rank: usize) -> Self {
        self.push(Param {
            name,
            role: ParamRole::Batched {
                core_rank,
                policy: BroadcastPolicy::Required,
            },
        })
    }

    /// Declares a batched tensor parameter excluded from the pairwise
    /// compatibility check; it is replayed whole to every call.
    pub fn batched_independent(self, name: &'static str, core_rank: usize) -> Self {
        self.push(Param {
            name,
            role: ParamRole::Batched {
                core_rank,
                policy: BroadcastPolicy::Independent,
            },
        })
    }

    /// Declares a non-batched parameter passed through to every call.
    pub fn passthrough(self, name: &'static str) -> Self {
        self.push(Param {
            name,
            role: ParamRole::Passthrough,
        })
    }

    /// Declares the routine's default output count.
    ///
    /// Kernels whose flags alter their arity are assembled from the arity
    /// they actually return; the declared count serves the empty-batch
    /// path and the single-output convenience surface.
    pub fn n_out(mut self, n: usize) -> Self {
        self.n_out = n;
        self
    }

    /// Declares per-output core ranks. Defaults to the core rank of the
    /// first batched input when outputs mirror inputs.
    pub fn out_core_ranks(mut self, ranks: &[usize]) -> Self {
        self.out_core_ranks = Some(ranks.to_vec());
        self
    }

    fn push(mut self, param: Param) -> Self {
        assert!(
            self.params.iter().all(|p| p.name != param.name),
            "duplicate parameter '{}' in signature '{}'",
            param.name,
            self.name
        );
        self.params.push(param);
        self
    }

    /// Routine name.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Ordered declared parameters.
    #[inline]
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Number of declared parameters.
    #[inline]
    pub fn n_params(&self) -> usize {
        self.params.len()
    }

    /// Declared default output count.
    #[inline]
    pub fn declared_n_out(&self) -> usize {
        self.n_out
    }

    /// Declared per-output core ranks, if any.
    #[inline]
    pub fn declared_out_core_ranks(&self) -> Option<&[usize]> {
        self.out_core_ranks.as_deref()
    }

    /// Position of a parameter by name.
    #[inline]
    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|p| p.name == name)
    }

    /// Core rank of the first batched parameter, the default for outputs
    /// that mirror inputs.
    pub fn input_core_rank(&self) -> Option<usize> {
        self.params.iter().find_map(|p| match p.role {
            ParamRole::Batched { core_rank, .. } => Some(core_rank),
            ParamRole::Passthrough => None,
        })
    }
}
