// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Scalar element types and their fixed byte widths.

use crate::TensorError;
use std::fmt;

/// Enumerates the element kinds a [`crate::Tensor`] can hold.
///
/// The discriminants are the numeric codes used by exported programs, so
/// `ScalarType::from_code(st as i64)` round-trips for every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[repr(u8)]
pub enum ScalarType {
    /// 8-bit unsigned integer.
    #[serde(rename = "uint8", alias = "u8", alias = "byte")]
    UInt8 = 0,
    /// 8-bit signed integer.
    #[serde(rename = "int8", alias = "i8", alias = "char")]
    Int8 = 1,
    /// 16-bit signed integer.
    #[serde(rename = "int16", alias = "i16", alias = "short")]
    Int16 = 2,
    /// 32-bit signed integer.
    #[serde(rename = "int32", alias = "i32", alias = "int")]
    Int32 = 3,
    /// 64-bit signed integer.
    #[serde(rename = "int64", alias = "i64", alias = "long")]
    Int64 = 4,
    /// 16-bit IEEE 754 half precision float.
    #[serde(rename = "float16", alias = "f16", alias = "half")]
    Float16 = 5,
    /// 32-bit IEEE 754 floating point.
    #[serde(rename = "float32", alias = "f32", alias = "float")]
    Float32 = 6,
    /// 64-bit IEEE 754 floating point.
    #[serde(rename = "float64", alias = "f64", alias = "double")]
    Float64 = 7,
    /// Boolean stored as one byte (0 or 1).
    #[serde(rename = "bool")]
    Bool = 8,
    /// 16-bit brain floating point.
    #[serde(rename = "bfloat16", alias = "bf16")]
    BFloat16 = 9,
}

impl ScalarType {
    /// Every scalar type, ordered by numeric code.
    pub const ALL: [ScalarType; 10] = [
        ScalarType::UInt8,
        ScalarType::Int8,
        ScalarType::Int16,
        ScalarType::Int32,
        ScalarType::Int64,
        ScalarType::Float16,
        ScalarType::Float32,
        ScalarType::Float64,
        ScalarType::Bool,
        ScalarType::BFloat16,
    ];

    /// Returns the size of a single element in bytes.
    pub fn element_size(self) -> usize {
        match self {
            ScalarType::UInt8 | ScalarType::Int8 | ScalarType::Bool => 1,
            ScalarType::Int16 | ScalarType::Float16 | ScalarType::BFloat16 => 2,
            ScalarType::Int32 | ScalarType::Float32 => 4,
            ScalarType::Int64 | ScalarType::Float64 => 8,
        }
    }

    /// Returns the numeric code of this scalar type.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Resolves a numeric code into a scalar type.
    ///
    /// # Errors
    /// Returns [`TensorError::InvalidArgument`] for codes outside `0..=9`.
    pub fn from_code(code: i64) -> Result<Self, TensorError> {
        usize::try_from(code)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .ok_or_else(|| TensorError::InvalidArgument(format!("unknown scalar type code {code}")))
    }

    /// Parses a scalar type name.
    ///
    /// Accepts canonical names (`"float32"`) and short aliases (`"f32"`,
    /// `"bf16"`, `"half"`), case-insensitively.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "uint8" | "u8" | "byte" => Some(Self::UInt8),
            "int8" | "i8" | "char" => Some(Self::Int8),
            "int16" | "i16" | "short" => Some(Self::Int16),
            "int32" | "i32" | "int" => Some(Self::Int32),
            "int64" | "i64" | "long" => Some(Self::Int64),
            "float16" | "f16" | "half" => Some(Self::Float16),
            "float32" | "f32" | "float" => Some(Self::Float32),
            "float64" | "f64" | "double" => Some(Self::Float64),
            "bool" | "boolean" => Some(Self::Bool),
            "bfloat16" | "bf16" => Some(Self::BFloat16),
            _ => None,
        }
    }

    /// Returns the canonical name of this scalar type.
    pub fn as_str(self) -> &'static str {
        match self {
            ScalarType::UInt8 => "uint8",
            ScalarType::Int8 => "int8",
            ScalarType::Int16 => "int16",
            ScalarType::Int32 => "int32",
            ScalarType::Int64 => "int64",
            ScalarType::Float16 => "float16",
            ScalarType::Float32 => "float32",
            ScalarType::Float64 => "float64",
            ScalarType::Bool => "bool",
            ScalarType::BFloat16 => "bfloat16",
        }
    }

    /// Returns `true` if elements of this type map onto a Rust primitive.
    ///
    /// The half-width float encodings only exist as raw bits.
    pub fn has_native_repr(self) -> bool {
        !matches!(self, ScalarType::Float16 | ScalarType::BFloat16)
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns the byte width for a raw scalar type code.
///
/// # Errors
/// Returns [`TensorError::InvalidArgument`] for codes outside `0..=9`.
pub fn element_size(code: i64) -> Result<usize, TensorError> {
    ScalarType::from_code(code).map(ScalarType::element_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_sizes_in_code_order() {
        let sizes: Vec<usize> = (0..10).map(|c| element_size(c).unwrap()).collect();
        assert_eq!(sizes, vec![1, 1, 2, 4, 8, 2, 4, 8, 1, 2]);
    }

    #[test]
    fn test_out_of_range_code() {
        assert!(matches!(element_size(10), Err(TensorError::InvalidArgument(_))));
        assert!(matches!(element_size(-1), Err(TensorError::InvalidArgument(_))));
    }

    #[test]
    fn test_code_roundtrip() {
        for st in ScalarType::ALL {
            assert_eq!(ScalarType::from_code(st.code() as i64).unwrap(), st);
        }
    }

    #[test]
    fn test_from_str_loose() {
        assert_eq!(ScalarType::from_str_loose("F32"), Some(ScalarType::Float32));
        assert_eq!(ScalarType::from_str_loose("bf16"), Some(ScalarType::BFloat16));
        assert_eq!(ScalarType::from_str_loose("uint8"), Some(ScalarType::UInt8));
        assert_eq!(ScalarType::from_str_loose("complex64"), None);
    }

    #[test]
    fn test_native_repr() {
        assert!(ScalarType::Float32.has_native_repr());
        assert!(ScalarType::Bool.has_native_repr());
        assert!(!ScalarType::Float16.has_native_repr());
        assert!(!ScalarType::BFloat16.has_native_repr());
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&ScalarType::BFloat16).unwrap();
        assert_eq!(json, "\"bfloat16\"");
        let back: ScalarType = serde_json::from_str("\"f32\"").unwrap();
        assert_eq!(back, ScalarType::Float32);
    }
}
