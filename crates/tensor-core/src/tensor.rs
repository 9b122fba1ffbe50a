// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Core tensor type and typed array conversions.

use crate::element;
use std::borrow::Cow;
use crate::shape::{dim_order_from_strides, identity_dim_order, strides_for_dim_order, validate_dim_order};
use crate::{Buffer, Literal, ScalarType, Shape, TensorError};

/// An n-dimensional tensor over shared byte storage.
///
/// `Tensor` is the data carrier exchanged with exported programs. Its
/// metadata (dtype, shape, dim order, strides) is fixed at construction.
///
/// # Memory Layout
/// Elements are stored little-endian in a [`Buffer`]. The buffer is either
/// a zero-copy view of caller-owned bytes ([`Tensor::from_buffer`]) or
/// storage the tensor allocated while encoding a literal
/// ([`Tensor::from_literal`]). Cloning a tensor shares the buffer.
#[derive(Debug, Clone)]
pub struct Tensor {
    buffer: Buffer,
    dtype: ScalarType,
    shape: Shape,
    dim_order: Vec<usize>,
    strides: Vec<usize>,
}

/// Tensors are equal when their metadata and viewed bytes are equal,
/// regardless of which buffer backs them.
impl PartialEq for Tensor {
    fn eq(&self, other: &Self) -> bool {
        self.dtype == other.dtype
            && self.shape == other.shape
            && self.dim_order == other.dim_order
            && self.strides == other.strides
            && self.data() == other.data()
    }
}

impl Tensor {
    /// Creates a tensor by inferring both dtype and shape from a literal.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::{ScalarType, Tensor};
    /// let t = Tensor::new([[1, 2, 3]]).unwrap();
    /// assert_eq!(t.dtype(), ScalarType::Float32);
    /// assert_eq!(t.shape().dims(), &[1, 3]);
    /// assert_eq!(t.strides(), &[3, 1]);
    /// assert_eq!(t.nbytes(), 12);
    /// ```
    pub fn new(literal: impl Into<Literal>) -> Result<Self, TensorError> {
        Self::from_literal(literal, None, None)
    }

    /// Creates a tensor from a nested literal, encoding it into a newly
    /// allocated buffer.
    ///
    /// `dtype` defaults to the inferred type (Bool for boolean leaves,
    /// Float32 otherwise) and `shape` to the inferred per-level lengths.
    /// With an explicit shape the literal is flattened as-is and its first
    /// `shape.num_elements()` values are used.
    ///
    /// # Errors
    /// - Shape/dtype inference errors (see [`Literal::infer_shape`]).
    /// - [`TensorError::InsufficientStorage`] if an explicit shape needs more
    ///   values than the literal provides.
    pub fn from_literal(
        literal: impl Into<Literal>,
        dtype: Option<ScalarType>,
        shape: Option<Shape>,
    ) -> Result<Self, TensorError> {
        let literal = literal.into();
        let shape = match shape {
            Some(shape) => shape,
            None => literal.infer_shape()?,
        };
        let dtype = match dtype {
            Some(dtype) => dtype,
            None => literal.infer_dtype()?,
        };

        let values = literal.flatten();
        let needed = shape.num_elements();
        if values.len() < needed {
            return Err(TensorError::InsufficientStorage {
                shape,
                needed,
                available: values.len(),
            });
        }

        let mut bytes = Vec::with_capacity(needed * dtype.element_size());
        for &value in &values[..needed] {
            element::encode_into(dtype, value, &mut bytes);
        }
        Self::from_parts(bytes, dtype, shape, None, None)
    }

    /// Creates a tensor viewing an existing buffer with default layout.
    ///
    /// The buffer is not copied.
    ///
    /// # Errors
    /// Returns [`TensorError::InsufficientStorage`] if the buffer holds fewer
    /// than `shape.num_elements()` whole elements.
    pub fn from_buffer(
        buffer: impl Into<Buffer>,
        dtype: ScalarType,
        shape: impl Into<Shape>,
    ) -> Result<Self, TensorError> {
        Self::from_parts(buffer, dtype, shape, None, None)
    }

    /// Creates a tensor viewing an existing buffer with an explicit layout.
    ///
    /// Missing `strides` are derived from the dim order; a missing
    /// `dim_order` is derived from the strides (largest stride outermost),
    /// or is the identity when neither is given.
    ///
    /// # Errors
    /// - [`TensorError::InsufficientStorage`] if the buffer is too small.
    /// - [`TensorError::InvalidArgument`] if `dim_order` is not a permutation
    ///   of the axes or `strides` has the wrong length.
    pub fn from_parts(
        buffer: impl Into<Buffer>,
        dtype: ScalarType,
        shape: impl Into<Shape>,
        dim_order: Option<Vec<usize>>,
        strides: Option<Vec<usize>>,
    ) -> Result<Self, TensorError> {
        let buffer = buffer.into();
        let shape = shape.into();
        let rank = shape.rank();

        let needed = shape.num_elements();
        let available = buffer.len() / dtype.element_size();
        if available < needed {
            return Err(TensorError::InsufficientStorage {
                shape,
                needed,
                available,
            });
        }

        if let Some(order) = &dim_order {
            validate_dim_order(order, rank)?;
        }
        if let Some(strides) = &strides {
            if strides.len() != rank {
                return Err(TensorError::InvalidArgument(format!(
                    "strides {strides:?} have {} entries, expected {rank}",
                    strides.len()
                )));
            }
        }

        let (dim_order, strides) = match (dim_order, strides) {
            (Some(order), Some(strides)) => (order, strides),
            (Some(order), None) => {
                let strides = strides_for_dim_order(&shape, &order);
                (order, strides)
            }
            (None, Some(strides)) => (dim_order_from_strides(&strides), strides),
            (None, None) => {
                let order = identity_dim_order(rank);
                let strides = strides_for_dim_order(&shape, &order);
                (order, strides)
            }
        };

        // Explicit strides may address elements past the dense extent.
        if needed > 0 {
            let span = shape
                .dims()
                .iter()
                .zip(&strides)
                .try_fold(1usize, |acc, (d, s)| (d - 1).checked_mul(*s)?.checked_add(acc))
                .ok_or_else(|| {
                    TensorError::InvalidArgument(format!(
                        "strides {strides:?} overflow the address space for shape {shape}"
                    ))
                })?;
            if span > available {
                return Err(TensorError::InsufficientStorage {
                    shape,
                    needed: span,
                    available,
                });
            }
        }

        Ok(Self {
            buffer,
            dtype,
            shape,
            dim_order,
            strides,
        })
    }

    /// Creates a new tensor filled with zeros.
    ///
    /// # Errors
    /// Returns [`TensorError::InvalidArgument`] if the shape's byte size
    /// cannot be allocated.
    pub fn zeros(shape: impl Into<Shape>, dtype: ScalarType) -> Result<Self, TensorError> {
        let shape = shape.into();
        let nbytes = shape
            .checked_size_bytes(dtype)
            .filter(|&n| n <= isize::MAX as usize)
            .ok_or_else(|| {
                TensorError::InvalidArgument(format!("shape {shape} of {dtype} is too large"))
            })?;
        let order = identity_dim_order(shape.rank());
        let strides = strides_for_dim_order(&shape, &order);
        Ok(Self {
            buffer: Buffer::from(vec![0u8; nbytes]),
            dtype,
            shape,
            dim_order: order,
            strides,
        })
    }

    /// Returns the tensor's data type.
    pub fn dtype(&self) -> ScalarType {
        self.dtype
    }

    /// Returns the tensor's shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Returns the number of dimensions.
    pub fn ndim(&self) -> usize {
        self.shape.rank()
    }

    /// Returns the axis traversal order, outermost first.
    pub fn dim_order(&self) -> &[usize] {
        &self.dim_order
    }

    /// Returns per-axis element strides.
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Returns the number of elements (1 for a scalar).
    pub fn size(&self) -> usize {
        self.shape.num_elements()
    }

    /// Returns the byte width of one element.
    pub fn itemsize(&self) -> usize {
        self.dtype.element_size()
    }

    /// Returns `size * itemsize`.
    pub fn nbytes(&self) -> usize {
        self.size() * self.itemsize()
    }

    /// Returns the tensor's bytes (`nbytes` long, in storage order),
    /// borrowed for as long as the tensor is.
    pub fn data(&self) -> &[u8] {
        &self.buffer.as_bytes()[..self.nbytes()]
    }

    /// Returns the shared buffer handle. Holding it keeps the storage alive
    /// independently of this tensor.
    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    /// Converts a single-element tensor into its scalar value.
    ///
    /// # Errors
    /// Returns [`TensorError::ShapeError`] if `size() != 1`.
    pub fn item(&self) -> Result<Literal, TensorError> {
        if self.size() != 1 {
            return Err(TensorError::ShapeError { size: self.size() });
        }
        Ok(self.element_at(0))
    }

    /// Rebuilds a nested literal mirroring `shape`, honouring strides.
    pub fn tolist(&self) -> Literal {
        self.nest(0, 0)
    }

    fn nest(&self, axis: usize, offset: usize) -> Literal {
        if axis == self.ndim() {
            return self.element_at(offset);
        }
        let extent = self.shape.dims()[axis];
        let stride = self.strides[axis];
        Literal::List(
            (0..extent)
                .map(|i| self.nest(axis + 1, offset + i * stride))
                .collect(),
        )
    }

    /// True when logical row-major order matches storage order.
    fn is_dense(&self) -> bool {
        self.strides == self.shape.strides()
    }

    /// Element offsets in logical (row-major) order.
    fn logical_offsets(&self) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.size());
        self.push_offsets(0, 0, &mut out);
        out
    }

    fn push_offsets(&self, axis: usize, offset: usize, out: &mut Vec<usize>) {
        if axis == self.ndim() {
            out.push(offset);
            return;
        }
        let stride = self.strides[axis];
        for i in 0..self.shape.dims()[axis] {
            self.push_offsets(axis + 1, offset + i * stride, out);
        }
    }

    /// The elements' bytes in logical order; borrowed when the layout is
    /// dense, gathered through the strides otherwise.
    fn logical_bytes(&self) -> Cow<'_, [u8]> {
        if self.is_dense() {
            return Cow::Borrowed(self.data());
        }
        let width = self.itemsize();
        let storage = self.buffer.as_bytes();
        let mut bytes = Vec::with_capacity(self.nbytes());
        for offset in self.logical_offsets() {
            let start = offset * width;
            bytes.extend_from_slice(&storage[start..start + width]);
        }
        Cow::Owned(bytes)
    }

    fn element_at(&self, offset: usize) -> Literal {
        let width = self.itemsize();
        let start = offset * width;
        let bytes = &self.buffer.as_bytes()[start..start + width];
        match self.dtype {
            ScalarType::Bool => Literal::Bool(bytes[0] != 0),
            dtype => Literal::Number(element::decode(dtype, bytes)),
        }
    }

    /// Decodes the tensor's elements, in logical order, into a typed array.
    ///
    /// # Errors
    /// Returns [`TensorError::UnsupportedOperation`] for Float16 and
    /// BFloat16, which have no native Rust element type.
    pub fn to_typed_array(&self) -> Result<TypedArray, TensorError> {
        let logical = self.logical_bytes();
        let bytes: &[u8] = &logical;
        let typed = match self.dtype {
            ScalarType::UInt8 => Some(TypedArray::UInt8(bytes.to_vec())),
            ScalarType::Bool => Some(TypedArray::Bool(bytes.to_vec())),
            ScalarType::Int8 => Some(TypedArray::Int8(element::decode_run(bytes, i8::from_le_bytes))),
            ScalarType::Int16 => {
                Some(TypedArray::Int16(element::decode_run(bytes, i16::from_le_bytes)))
            }
            ScalarType::Int32 => {
                Some(TypedArray::Int32(element::decode_run(bytes, i32::from_le_bytes)))
            }
            ScalarType::Int64 => {
                Some(TypedArray::Int64(element::decode_run(bytes, i64::from_le_bytes)))
            }
            ScalarType::Float32 => {
                Some(TypedArray::Float32(element::decode_run(bytes, f32::from_le_bytes)))
            }
            ScalarType::Float64 => {
                Some(TypedArray::Float64(element::decode_run(bytes, f64::from_le_bytes)))
            }
            ScalarType::Float16 | ScalarType::BFloat16 => None,
        };
        typed.ok_or(TensorError::UnsupportedOperation {
            op: "to_typed_array",
            dtype: self.dtype,
        })
    }

    /// Decodes every element, in logical order, to `f32`.
    pub fn to_f32_vec(&self) -> Vec<f32> {
        self.logical_bytes()
            .chunks_exact(self.itemsize())
            .map(|c| element::decode_f32(self.dtype, c))
            .collect()
    }
}

/// A decoded, fixed-width view of a tensor's elements.
///
/// Booleans are kept as their stored bytes (0 or 1).
#[derive(Debug, Clone, PartialEq)]
pub enum TypedArray {
    UInt8(Vec<u8>),
    Int8(Vec<i8>),
    Int16(Vec<i16>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    Bool(Vec<u8>),
}

impl TypedArray {
    /// Returns the number of elements.
    pub fn len(&self) -> usize {
        match self {
            TypedArray::UInt8(v) | TypedArray::Bool(v) => v.len(),
            TypedArray::Int8(v) => v.len(),
            TypedArray::Int16(v) => v.len(),
            TypedArray::Int32(v) => v.len(),
            TypedArray::Int64(v) => v.len(),
            TypedArray::Float32(v) => v.len(),
            TypedArray::Float64(v) => v.len(),
        }
    }

    /// Returns `true` if the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the scalar type the array was decoded from.
    pub fn dtype(&self) -> ScalarType {
        match self {
            TypedArray::UInt8(_) => ScalarType::UInt8,
            TypedArray::Int8(_) => ScalarType::Int8,
            TypedArray::Int16(_) => ScalarType::Int16,
            TypedArray::Int32(_) => ScalarType::Int32,
            TypedArray::Int64(_) => ScalarType::Int64,
            TypedArray::Float32(_) => ScalarType::Float32,
            TypedArray::Float64(_) => ScalarType::Float64,
            TypedArray::Bool(_) => ScalarType::Bool,
        }
    }
}
