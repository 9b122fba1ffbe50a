// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Numeric operations over tensors.
//!
//! Currently the decoding step that turns output logits into a discrete
//! choice; softmax is its internal building block.

mod sample_op;
mod softmax_op;

pub use sample_op::{sample, Sampler, SamplingParams};
