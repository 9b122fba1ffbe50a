// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Little-endian element codec shared by literal encoding and decoding.
//!
//! Values travel through `f64`, the widest representation a literal leaf
//! carries. Integer targets use Rust's saturating `as` casts (fractions are
//! truncated toward zero, NaN becomes 0); the half-width float encodings
//! round to nearest-even through the `half` crate.

use crate::ScalarType;
use half::{bf16, f16};

/// Appends the encoding of `value` as `dtype` to `out`.
pub(crate) fn encode_into(dtype: ScalarType, value: f64, out: &mut Vec<u8>) {
    match dtype {
        ScalarType::UInt8 => out.push(value as u8),
        ScalarType::Int8 => out.extend_from_slice(&(value as i8).to_le_bytes()),
        ScalarType::Int16 => out.extend_from_slice(&(value as i16).to_le_bytes()),
        ScalarType::Int32 => out.extend_from_slice(&(value as i32).to_le_bytes()),
        ScalarType::Int64 => out.extend_from_slice(&(value as i64).to_le_bytes()),
        ScalarType::Float16 => out.extend_from_slice(&f16::from_f64(value).to_le_bytes()),
        ScalarType::Float32 => out.extend_from_slice(&(value as f32).to_le_bytes()),
        ScalarType::Float64 => out.extend_from_slice(&value.to_le_bytes()),
        ScalarType::Bool => out.push(u8::from(value != 0.0)),
        ScalarType::BFloat16 => out.extend_from_slice(&bf16::from_f64(value).to_le_bytes()),
    }
}

/// Decodes one element. `bytes` must hold at least `dtype.element_size()` bytes.
pub(crate) fn decode(dtype: ScalarType, bytes: &[u8]) -> f64 {
    match dtype {
        ScalarType::UInt8 => f64::from(bytes[0]),
        ScalarType::Int8 => f64::from(i8::from_le_bytes([bytes[0]])),
        ScalarType::Int16 => f64::from(i16::from_le_bytes(le(bytes))),
        ScalarType::Int32 => f64::from(i32::from_le_bytes(le(bytes))),
        ScalarType::Int64 => i64::from_le_bytes(le(bytes)) as f64,
        ScalarType::Float16 => f16::from_le_bytes(le(bytes)).to_f64(),
        ScalarType::Float32 => f64::from(f32::from_le_bytes(le(bytes))),
        ScalarType::Float64 => f64::from_le_bytes(le(bytes)),
        ScalarType::Bool => f64::from(u8::from(bytes[0] != 0)),
        ScalarType::BFloat16 => bf16::from_le_bytes(le(bytes)).to_f64(),
    }
}

/// Decodes one element straight to `f32` (exact for the half encodings).
pub(crate) fn decode_f32(dtype: ScalarType, bytes: &[u8]) -> f32 {
    match dtype {
        ScalarType::Float16 => f16::from_le_bytes(le(bytes)).to_f32(),
        ScalarType::Float32 => f32::from_le_bytes(le(bytes)),
        ScalarType::BFloat16 => bf16::from_le_bytes(le(bytes)).to_f32(),
        other => decode(other, bytes) as f32,
    }
}

/// Decodes a run of fixed-width little-endian values.
pub(crate) fn decode_run<const N: usize, T>(bytes: &[u8], f: fn([u8; N]) -> T) -> Vec<T> {
    bytes.chunks_exact(N).map(|c| f(le(c))).collect()
}

fn le<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[..N]);
    out
}
