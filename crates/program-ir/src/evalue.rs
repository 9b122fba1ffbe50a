// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Evaluation values: the arguments and results exchanged with methods.

use crate::{SlotMeta, Tag};
use tensor_core::{Tensor, TensorError};

/// A boolean or numeric scalar, as carried by [`EValue::ListScalar`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Double(f64),
}

impl Scalar {
    pub fn to_json(self) -> serde_json::Value {
        match self {
            Scalar::Bool(b) => b.into(),
            Scalar::Int(i) => i.into(),
            Scalar::Double(d) => d.into(),
        }
    }
}

/// A value passed to or returned from a method.
///
/// Every variant corresponds to exactly one [`Tag`].
#[derive(Debug, Clone, PartialEq)]
pub enum EValue {
    None,
    Tensor(Tensor),
    String(String),
    Double(f64),
    Int(i64),
    Bool(bool),
    ListBool(Vec<bool>),
    ListDouble(Vec<f64>),
    ListInt(Vec<i64>),
    ListTensor(Vec<Tensor>),
    ListScalar(Vec<Scalar>),
    ListOptionalTensor(Vec<Option<Tensor>>),
}

impl EValue {
    pub fn tag(&self) -> Tag {
        match self {
            EValue::None => Tag::None,
            EValue::Tensor(_) => Tag::Tensor,
            EValue::String(_) => Tag::String,
            EValue::Double(_) => Tag::Double,
            EValue::Int(_) => Tag::Int,
            EValue::Bool(_) => Tag::Bool,
            EValue::ListBool(_) => Tag::ListBool,
            EValue::ListDouble(_) => Tag::ListDouble,
            EValue::ListInt(_) => Tag::ListInt,
            EValue::ListTensor(_) => Tag::ListTensor,
            EValue::ListScalar(_) => Tag::ListScalar,
            EValue::ListOptionalTensor(_) => Tag::ListOptionalTensor,
        }
    }

    /// The zero value for a slot: a zero-filled tensor for tensor slots,
    /// `0`/`false`/empty for everything else.
    ///
    /// # Errors
    /// Fails if a tensor slot's sizes are too large to allocate.
    pub fn zero_for(slot: &SlotMeta) -> Result<Self, TensorError> {
        match (slot.tag, &slot.tensor) {
            (Tag::Tensor, Some(info)) => {
                Ok(EValue::Tensor(Tensor::zeros(info.shape(), info.scalar_type)?))
            }
            (tag, _) => Self::zero_for_tag(tag),
        }
    }

    fn zero_for_tag(tag: Tag) -> Result<Self, TensorError> {
        Ok(match tag {
            Tag::None => EValue::None,
            Tag::Tensor => EValue::Tensor(Tensor::zeros(
                tensor_core::Shape::scalar(),
                tensor_core::ScalarType::Float32,
            )?),
            Tag::String => EValue::String(String::new()),
            Tag::Double => EValue::Double(0.0),
            Tag::Int => EValue::Int(0),
            Tag::Bool => EValue::Bool(false),
            Tag::ListBool => EValue::ListBool(Vec::new()),
            Tag::ListDouble => EValue::ListDouble(Vec::new()),
            Tag::ListInt => EValue::ListInt(Vec::new()),
            Tag::ListTensor => EValue::ListTensor(Vec::new()),
            Tag::ListScalar => EValue::ListScalar(Vec::new()),
            Tag::ListOptionalTensor => EValue::ListOptionalTensor(Vec::new()),
        })
    }

    pub fn is_none(&self) -> bool {
        matches!(self, EValue::None)
    }

    pub fn as_tensor(&self) -> Option<&Tensor> {
        match self {
            EValue::Tensor(t) => Some(t),
            _ => None,
        }
    }

    pub fn into_tensor(self) -> Option<Tensor> {
        match self {
            EValue::Tensor(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            EValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            EValue::Double(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            EValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            EValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Renders the value as JSON; tensors become nested arrays.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;
        match self {
            EValue::None => Value::Null,
            EValue::Tensor(t) => t.tolist().to_json(),
            EValue::String(s) => Value::String(s.clone()),
            EValue::Double(d) => (*d).into(),
            EValue::Int(i) => (*i).into(),
            EValue::Bool(b) => (*b).into(),
            EValue::ListBool(v) => v.clone().into(),
            EValue::ListDouble(v) => v.clone().into(),
            EValue::ListInt(v) => v.clone().into(),
            EValue::ListTensor(v) => Value::Array(v.iter().map(|t| t.tolist().to_json()).collect()),
            EValue::ListScalar(v) => Value::Array(v.iter().map(|s| s.to_json()).collect()),
            EValue::ListOptionalTensor(v) => Value::Array(
                v.iter()
                    .map(|t| t.as_ref().map_or(Value::Null, |t| t.tolist().to_json()))
                    .collect(),
            ),
        }
    }
}

impl From<Tensor> for EValue {
    fn from(t: Tensor) -> Self {
        EValue::Tensor(t)
    }
}

impl From<i64> for EValue {
    fn from(i: i64) -> Self {
        EValue::Int(i)
    }
}

impl From<f64> for EValue {
    fn from(d: f64) -> Self {
        EValue::Double(d)
    }
}

impl From<bool> for EValue {
    fn from(b: bool) -> Self {
        EValue::Bool(b)
    }
}

impl From<String> for EValue {
    fn from(s: String) -> Self {
        EValue::String(s)
    }
}

impl From<&str> for EValue {
    fn from(s: &str) -> Self {
        EValue::String(s.to_owned())
    }
}

impl From<Scalar> for EValue {
    fn from(s: Scalar) -> Self {
        match s {
            Scalar::Bool(b) => EValue::Bool(b),
            Scalar::Int(i) => EValue::Int(i),
            Scalar::Double(d) => EValue::Double(d),
        }
    }
}

impl From<()> for EValue {
    fn from(_: ()) -> Self {
        EValue::None
    }
}
