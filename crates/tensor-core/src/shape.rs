// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Tensor shape descriptors and memory layout (dim order, strides).

use crate::TensorError;
use std::fmt;

/// Describes the dimensionality of a [`crate::Tensor`].
///
/// Shapes are immutable once created. An empty shape describes a scalar,
/// which holds exactly one element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Shape {
    dims: Vec<usize>,
}

impl Shape {
    /// Creates a new shape from the given dimensions.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::Shape;
    /// let s = Shape::new(vec![2, 3, 4]);
    /// assert_eq!(s.rank(), 3);
    /// assert_eq!(s.num_elements(), 24);
    /// ```
    pub fn new(dims: Vec<usize>) -> Self {
        Self { dims }
    }

    /// Creates a scalar shape (rank 0).
    pub fn scalar() -> Self {
        Self { dims: vec![] }
    }

    /// Creates a 1-D shape.
    pub fn vector(len: usize) -> Self {
        Self { dims: vec![len] }
    }

    /// Returns the number of dimensions (rank).
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Returns the total number of elements.
    ///
    /// For a scalar shape (rank 0), returns 1. Saturates at `usize::MAX`
    /// when the product overflows.
    pub fn num_elements(&self) -> usize {
        self.checked_num_elements().unwrap_or(usize::MAX)
    }

    /// Returns the total number of elements, or `None` on overflow.
    pub fn checked_num_elements(&self) -> Option<usize> {
        if self.dims.contains(&0) {
            return Some(0);
        }
        self.dims.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
    }

    /// Returns the dimensions as a slice.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Returns the size of a specific dimension, or `None` if out of bounds.
    pub fn dim(&self, index: usize) -> Option<usize> {
        self.dims.get(index).copied()
    }

    /// Computes the memory footprint in bytes for a given [`crate::ScalarType`].
    ///
    /// Saturates at `usize::MAX`.
    pub fn size_bytes(&self, dtype: crate::ScalarType) -> usize {
        self.checked_size_bytes(dtype).unwrap_or(usize::MAX)
    }

    /// Memory footprint in bytes, or `None` on overflow.
    pub fn checked_size_bytes(&self, dtype: crate::ScalarType) -> Option<usize> {
        self.checked_num_elements()?.checked_mul(dtype.element_size())
    }

    /// Computes row-major (C-order) strides for this shape.
    ///
    /// The stride for dimension `i` is the number of elements to skip
    /// in the flat buffer to advance one step along that dimension.
    pub fn strides(&self) -> Vec<usize> {
        strides_for_dim_order(self, &identity_dim_order(self.rank()))
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{d}")?;
        }
        write!(f, "]")
    }
}

/// Convenience: `Shape::from(vec![2, 3])`.
impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Self::new(dims)
    }
}

/// Convenience: `Shape::from(&[2, 3][..])`.
impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Self::new(dims.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for Shape {
    fn from(dims: [usize; N]) -> Self {
        Self::new(dims.to_vec())
    }
}

// ── Layout helpers ─────────────────────────────────────────────────

/// Returns `[0, 1, ..., rank - 1]`.
pub fn identity_dim_order(rank: usize) -> Vec<usize> {
    (0..rank).collect()
}

/// Derives a dim order from explicit strides: axes sorted from the
/// largest stride (outermost) to the smallest, ties keeping axis order.
pub fn dim_order_from_strides(strides: &[usize]) -> Vec<usize> {
    let mut order = identity_dim_order(strides.len());
    order.sort_by(|&a, &b| strides[b].cmp(&strides[a]));
    order
}

/// Computes element strides for a shape laid out in the given dim order.
///
/// The innermost axis (`dim_order[rank - 1]`) gets stride 1 and each outer
/// axis steps over the full extent of the axis inside it. Strides saturate
/// at `usize::MAX`.
pub fn strides_for_dim_order(shape: &Shape, dim_order: &[usize]) -> Vec<usize> {
    let dims = shape.dims();
    let rank = dims.len();
    let mut strides = vec![0usize; rank];
    if rank == 0 {
        return strides;
    }
    strides[dim_order[rank - 1]] = 1;
    for i in (0..rank - 1).rev() {
        let inner = dim_order[i + 1];
        strides[dim_order[i]] = strides[inner].saturating_mul(dims[inner]);
    }
    strides
}

/// Checks that `dim_order` is a permutation of `[0, rank)`.
///
/// # Errors
/// Returns [`TensorError::InvalidArgument`] on a length mismatch, an
/// out-of-range axis, or a repeated axis.
pub fn validate_dim_order(dim_order: &[usize], rank: usize) -> Result<(), TensorError> {
    if dim_order.len() != rank {
        return Err(TensorError::InvalidArgument(format!(
            "dim order {dim_order:?} has {} entries, expected {rank}",
            dim_order.len()
        )));
    }
    let mut seen = vec![false; rank];
    for &axis in dim_order {
        match seen.get_mut(axis) {
            Some(slot) if !*slot => *slot = true,
            _ => {
                return Err(TensorError::InvalidArgument(format!(
                    "dim order {dim_order:?} is not a permutation of 0..{rank}"
                )))
            }
        }
    }
    Ok(())
}
