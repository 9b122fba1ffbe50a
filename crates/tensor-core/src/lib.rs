// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # tensor-core
//!
//! Typed tensors exchanged with exported inference programs.
//!
//! This crate provides:
//! - [`ScalarType`]: the ten element kinds and their byte widths.
//! - [`Shape`] plus layout helpers for dim orders and strides.
//! - [`Literal`]: nested host values with dtype/shape inference.
//! - [`Tensor`]: a typed view over a shared [`Buffer`], built either from
//!   caller-owned bytes (zero-copy) or from an encoded literal.
//! - [`TypedArray`]: decoded fixed-width element arrays.
//! - [`Sampler`] / [`sample`]: temperature and nucleus sampling of logits.
//!
//! # Design Goals
//! - Zero-copy views of external buffers, with lifetimes tied together by
//!   reference counting.
//! - Metadata fixed at construction and validated up front.
//! - Clean error types via `thiserror`.

mod buffer;
mod dtype;
mod element;
mod error;
mod literal;
mod ops;
pub mod shape;
mod tensor;

pub use buffer::Buffer;
pub use dtype::{element_size, ScalarType};
pub use error::TensorError;
pub use literal::Literal;
pub use ops::{sample, Sampler, SamplingParams};
pub use shape::Shape;
pub use tensor::{Tensor, TypedArray};
