//! # Utilities - *Internal Helper Utilities*
//!
//! A small collection of internal utilities supporting shape arithmetic
//! and batch enumeration elsewhere within the crate.

/// Total element count of a shape. The empty shape counts one element.
#[inline(always)]
pub fn elem_count(shape: &[usize]) -> usize {
    shape.iter().product()
}

/// Row-major odometer over a shape.
///
/// Yields every multi-index exactly once in row-major order; the
/// enumeration position of each index equals its row-major flat offset.
/// A shape with a zero-sized axis yields nothing. The empty shape yields
/// a single empty index.
pub struct MultiIndex {
    shape: Vec<usize>,
    next: Option<Vec<usize>>,
}

impl MultiIndex {
    pub fn new(shape: &[usize]) -> Self {
        let next = if shape.iter().any(|&d| d == 0) {
            None
        } else {
            Some(vec![0usize; shape.len()])
        };
        MultiIndex {
            shape: shape.to_vec(),
            next,
        }
    }
}

impl Iterator for MultiIndex {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        let current = self.next.take()?;
        // Increment from the innermost axis; exhaustion leaves `next` empty.
        let mut succ = current.clone();
        let mut axis = self.shape.len();
        loop {
            if axis == 0 {
                break;
            }
            axis -= 1;
            succ[axis] += 1;
            if succ[axis] < self.shape[axis] {
                self.next = Some(succ);
                break;
            }
            succ[axis] = 0;
        }
        Some(current)
    }
}

/// Dot product of a multi-index with per-axis element strides.
#[inline(always)]
pub fn stride_offset(idx: &[usize], strides: &[usize]) -> usize {
    idx.iter().zip(strides).map(|(&i, &s)| i * s).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_major_order() {
        let all: Vec<Vec<usize>> = MultiIndex::new(&[2, 3]).collect();
        assert_eq!(
            all,
            vec![
                vec![0, 0],
                vec![0, 1],
                vec![0, 2],
                vec![1, 0],
                vec![1, 1],
                vec![1, 2]
            ]
        );
    }

    #[test]
    fn test_empty_shape_yields_single_index() {
        let all: Vec<Vec<usize>> = MultiIndex::new(&[]).collect();
        assert_eq!(all, vec![Vec::<usize>::new()]);
    }

    #[test]
    fn test_zero_axis_yields_nothing() {
        assert_eq!(MultiIndex::new(&[3, 0, 2]).count(), 0);
    }

    #[test]
    fn test_enumeration_matches_flat_offset() {
        let shape = [2, 2, 2];
        let strides = [4usize, 2, 1];
        for (flat, idx) in MultiIndex::new(&shape).enumerate() {
            assert_eq!(stride_offset(&idx, &strides), flat);
        }
    }
}
