// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Reference-counted byte storage backing tensors.

use std::fmt;
use std::sync::Arc;

/// Immutable, shared byte storage.
///
/// A `Buffer` either wraps storage a tensor allocated for itself or
/// borrows an externally owned container (a `Vec<u8>`, an `Arc<[u8]>`, a
/// memory map, ...) without copying it. Clones share the same storage, and
/// the storage is released when the last clone is dropped, so a view handed
/// out by a tensor can never outlive the bytes it points at.
#[derive(Clone)]
pub struct Buffer {
    inner: Arc<dyn AsRef<[u8]> + Send + Sync>,
}

impl Buffer {
    /// Wraps any byte container without copying it.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::Buffer;
    /// let b = Buffer::from_owner(vec![1u8, 2, 3]);
    /// assert_eq!(b.as_bytes(), &[1, 2, 3]);
    /// ```
    pub fn from_owner<T>(owner: T) -> Self
    where
        T: AsRef<[u8]> + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(owner),
        }
    }

    /// Returns the stored bytes.
    pub fn as_bytes(&self) -> &[u8] {
        (*self.inner).as_ref()
    }

    /// Returns the length in bytes.
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// Returns `true` if the buffer holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if both handles share the same storage.
    pub fn ptr_eq(&self, other: &Buffer) -> bool {
        Arc::as_ptr(&self.inner).cast::<()>() == Arc::as_ptr(&other.inner).cast::<()>()
    }

    /// Returns how many handles currently keep the storage alive.
    pub fn holders(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}

impl AsRef<[u8]> for Buffer {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl From<Vec<u8>> for Buffer {
    fn from(bytes: Vec<u8>) -> Self {
        Buffer::from_owner(bytes)
    }
}

impl From<Arc<[u8]>> for Buffer {
    fn from(bytes: Arc<[u8]>) -> Self {
        Buffer::from_owner(bytes)
    }
}

impl From<&'static [u8]> for Buffer {
    fn from(bytes: &'static [u8]) -> Self {
        Buffer::from_owner(bytes)
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("len", &self.len())
            .field("holders", &self.holders())
            .finish()
    }
}
