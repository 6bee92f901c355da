//! # Tensor Module - *Dense Row-Major N-Dimensional Storage*
//!
//! Dense N-dimensional tensor with a flat row-major buffer.
//!
//! Row-major layout gives the batching machinery its key invariant: the
//! trailing "core" dimensions of any operand form one contiguous block per
//! batch index, so the dispatch loop slices cores with plain offset
//! arithmetic and the assembler writes results with plain block copies.

use std::fmt;

use crate::traits::type_unions::Element;

/// # Tensor
///
/// Dense row-major N-dimensional tensor.
///
/// ### Properties
/// - `shape`: Dimension sizes, outermost first. Empty for a rank-0 scalar.
/// - `data`: Flat buffer in row-major order; its length always equals the
///   product of `shape`.
///
/// ### Notes
/// - Rank-0 tensors hold exactly one element.
/// - There are no views or strides on this type itself; the batching layer
///   computes element offsets externally and reads contiguous blocks.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Tensor<T> {
    pub shape: Vec<usize>,
    pub data: Vec<T>,
}

impl<T: Element> Tensor<T> {
    /// Constructs a tensor from a shape and flat row-major data.
    /// Panics if the data length does not match the shape product.
    pub fn new(shape: impl Into<Vec<usize>>, data: Vec<T>) -> Self {
        let shape = shape.into();
        let expected: usize = shape.iter().product();
        assert_eq!(
            data.len(),
            expected,
            "Tensor shape {:?} does not match buffer length {}",
            shape,
            data.len()
        );
        Tensor { shape, data }
    }

    /// Constructs a zero-filled tensor with the given shape.
    pub fn zeros(shape: impl Into<Vec<usize>>) -> Self {
        let shape = shape.into();
        let len: usize = shape.iter().product();
        Tensor {
            shape,
            data: vec![T::default(); len],
        }
    }

    /// Constructs a rank-0 tensor holding a single value.
    pub fn from_scalar(value: T) -> Self {
        Tensor {
            shape: Vec::new(),
            data: vec![value],
        }
    }

    /// Number of dimensions.
    #[inline]
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Total number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the tensor holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Row-major element strides, one per dimension.
    pub fn strides(&self) -> Vec<usize> {
        let mut strides = vec![1usize; self.shape.len()];
        for i in (0..self.shape.len().saturating_sub(1)).rev() {
            strides[i] = strides[i + 1] * self.shape[i + 1];
        }
        strides
    }

    /// Returns the element at a full multi-index. Panics if out of bounds.
    pub fn get(&self, idx: &[usize]) -> T {
        self.data[self.flat_index(idx)]
    }

    /// Sets the element at a full multi-index. Panics if out of bounds.
    pub fn set(&mut self, idx: &[usize], value: T) {
        let flat = self.flat_index(idx);
        self.data[flat] = value;
    }

    fn flat_index(&self, idx: &[usize]) -> usize {
        debug_assert_eq!(idx.len(), self.shape.len(), "index rank mismatch");
        let strides = self.strides();
        idx.iter()
            .zip(&strides)
            .zip(&self.shape)
            .map(|((&i, &s), &d)| {
                debug_assert!(i < d, "index out of bounds");
                i * s
            })
            .sum()
    }

    /// Returns the contiguous block of `len` elements starting at `offset`.
    #[inline]
    pub fn block(&self, offset: usize, len: usize) -> &[T] {
        &self.data[offset..offset + len]
    }

    /// Returns an immutable reference to the flat buffer.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Returns a mutable reference to the flat buffer.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }
}

impl<T: Element + num_traits::One> Tensor<T> {
    /// Constructs the `n` x `n` identity matrix.
    pub fn eye(n: usize) -> Self {
        let mut t = Tensor::zeros([n, n]);
        for i in 0..n {
            t.data[i * n + i] = T::one();
        }
        t
    }
}

impl<T: Element + fmt::Display> fmt::Display for Tensor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const MAX_PREVIEW: usize = 10;
        writeln!(f, "Tensor {:?} [{} values]", self.shape, self.len())?;
        write!(f, "[")?;
        for (i, v) in self.data.iter().take(MAX_PREVIEW).enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", v)?;
        }
        if self.len() > MAX_PREVIEW {
            write!(f, ", … ({} total)", self.len())?;
        }
        write!(f, "]")
    }
}
