// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Nested host literals and dtype/shape inference over them.
//!
//! A [`Literal`] is what callers hand to [`crate::Tensor::from_literal`] and
//! what [`crate::Tensor::tolist`] hands back: a tree of lists whose leaves
//! are booleans or numbers.

use crate::{ScalarType, Shape, TensorError};

/// A nested boolean/number value.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// A boolean leaf.
    Bool(bool),
    /// A numeric leaf. Integer and float inputs are both carried as `f64`.
    Number(f64),
    /// A sequence of sub-literals.
    List(Vec<Literal>),
}

impl Literal {
    /// Returns `true` for a non-sequence value.
    pub fn is_leaf(&self) -> bool {
        !matches!(self, Literal::List(_))
    }

    /// Returns the numeric value of a leaf (`true` is 1, `false` is 0).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Literal::Bool(b) => Some(f64::from(u8::from(*b))),
            Literal::Number(n) => Some(*n),
            Literal::List(_) => None,
        }
    }

    /// Infers the scalar type by descending to the first leaf.
    ///
    /// Boolean leaves yield [`ScalarType::Bool`], numeric leaves the default
    /// [`ScalarType::Float32`].
    ///
    /// # Errors
    /// Returns [`TensorError::TypeError`] when the first branch ends in an
    /// empty sequence, so there is no leaf to inspect.
    pub fn infer_dtype(&self) -> Result<ScalarType, TensorError> {
        match self {
            Literal::Bool(_) => Ok(ScalarType::Bool),
            Literal::Number(_) => Ok(ScalarType::Float32),
            Literal::List(items) => match items.first() {
                Some(first) => first.infer_dtype(),
                None => Err(TensorError::TypeError("sequence has no leaf value".into())),
            },
        }
    }

    /// Infers the shape as the list of per-level sequence lengths.
    ///
    /// # Errors
    /// - [`TensorError::InvalidArgument`] if any sequence is empty.
    /// - [`TensorError::ShapeMismatch`] if siblings at some level differ in
    ///   length, or mix leaves with sequences.
    pub fn infer_shape(&self) -> Result<Shape, TensorError> {
        self.dims_at(0).map(Shape::new)
    }

    fn dims_at(&self, depth: usize) -> Result<Vec<usize>, TensorError> {
        let items = match self {
            Literal::List(items) => items,
            _ => return Ok(Vec::new()),
        };
        let (first, rest) = items.split_first().ok_or_else(|| {
            TensorError::InvalidArgument(format!("empty sequence at depth {depth}"))
        })?;
        let sub = first.dims_at(depth + 1)?;
        for item in rest {
            let other = item.dims_at(depth + 1)?;
            if other != sub {
                // First level at which the sub-shapes disagree.
                let level = sub
                    .iter()
                    .zip(&other)
                    .position(|(a, b)| a != b)
                    .unwrap_or_else(|| sub.len().min(other.len()));
                return Err(TensorError::ShapeMismatch {
                    depth: depth + 1 + level,
                    detail: format!("expected sub-shape {sub:?}, found {other:?}"),
                });
            }
        }
        let mut dims = Vec::with_capacity(sub.len() + 1);
        dims.push(items.len());
        dims.extend(sub);
        Ok(dims)
    }

    /// Flattens all leaves depth-first into their numeric values.
    pub fn flatten(&self) -> Vec<f64> {
        let mut out = Vec::new();
        self.flatten_into(&mut out);
        out
    }

    fn flatten_into(&self, out: &mut Vec<f64>) {
        match self {
            Literal::List(items) => items.iter().for_each(|item| item.flatten_into(out)),
            leaf => out.extend(leaf.as_f64()),
        }
    }

    /// Converts a JSON value into a literal.
    ///
    /// # Errors
    /// Returns [`TensorError::TypeError`] for strings, nulls and objects.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, TensorError> {
        use serde_json::Value;
        match value {
            Value::Bool(b) => Ok(Literal::Bool(*b)),
            Value::Number(n) => n
                .as_f64()
                .map(Literal::Number)
                .ok_or_else(|| TensorError::TypeError(format!("number {n} is not representable"))),
            Value::Array(items) => items
                .iter()
                .map(Literal::from_json)
                .collect::<Result<Vec<_>, _>>()
                .map(Literal::List),
            other => Err(TensorError::TypeError(format!("unsupported leaf {other}"))),
        }
    }

    /// Converts the literal into a JSON value (numbers become JSON floats;
    /// non-finite numbers become `null`).
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;
        match self {
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Number(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Literal::List(items) => Value::Array(items.iter().map(Literal::to_json).collect()),
        }
    }
}

impl TryFrom<&serde_json::Value> for Literal {
    type Error = TensorError;

    fn try_from(value: &serde_json::Value) -> Result<Self, Self::Error> {
        Literal::from_json(value)
    }
}

impl From<bool> for Literal {
    fn from(b: bool) -> Self {
        Literal::Bool(b)
    }
}

macro_rules! impl_numeric_literal {
    ($($t:ty),*) => {
        $(impl From<$t> for Literal {
            fn from(v: $t) -> Self {
                Literal::Number(v as f64)
            }
        })*
    };
}

impl_numeric_literal!(u8, i8, u16, i16, u32, i32, i64, f32, f64);

impl<T: Into<Literal>> From<Vec<T>> for Literal {
    fn from(items: Vec<T>) -> Self {
        Literal::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Literal>, const N: usize> From<[T; N]> for Literal {
    fn from(items: [T; N]) -> Self {
        Literal::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Literal> + Clone> From<&[T]> for Literal {
    fn from(items: &[T]) -> Self {
        Literal::List(items.iter().cloned().map(Into::into).collect())
    }
}
