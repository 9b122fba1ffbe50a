// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for tensor construction and conversion.

use crate::{ScalarType, Shape};

/// Errors that can occur while building, converting or sampling tensors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TensorError {
    /// An argument is malformed (unknown scalar type code, empty literal
    /// sequence, invalid dim order, bad sampling parameters, ...).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The backing storage holds fewer elements than the shape requires.
    #[error("insufficient storage for shape {shape}: need {needed} elements, have {available}")]
    InsufficientStorage {
        shape: Shape,
        needed: usize,
        available: usize,
    },

    /// Sibling sequences of a nested literal disagree in length or kind.
    #[error("shape mismatch at depth {depth}: {detail}")]
    ShapeMismatch { depth: usize, detail: String },

    /// A literal leaf has a type that cannot be stored in a tensor.
    #[error("unsupported literal: {0}")]
    TypeError(String),

    /// A scalar was requested from a tensor that does not hold exactly one element.
    #[error("expected a tensor with exactly one element, got {size}")]
    ShapeError { size: usize },

    /// The operation has no representation for the given scalar type.
    #[error("unsupported operation {op} for dtype {dtype}")]
    UnsupportedOperation { op: &'static str, dtype: ScalarType },
}
