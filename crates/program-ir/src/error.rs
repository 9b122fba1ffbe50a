// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for program descriptors and manifests.

/// Errors that can occur when reading or querying program descriptors.
#[derive(Debug, thiserror::Error)]
pub enum ProgramError {
    /// The manifest file could not be read.
    #[error("failed to read manifest: {0}")]
    ManifestReadError(#[from] std::io::Error),

    /// The manifest JSON is malformed.
    #[error("failed to parse manifest: {0}")]
    ManifestParseError(#[from] serde_json::Error),

    /// A method, slot or buffer index does not exist, or a tensor query hit
    /// a non-tensor slot.
    #[error("not found: {0}")]
    NotFound(String),

    /// Descriptors are inconsistent with each other.
    #[error("invalid program '{program}': {detail}")]
    InvalidProgram { program: String, detail: String },
}
