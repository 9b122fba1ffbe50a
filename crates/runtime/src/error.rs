// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the dispatch runtime.

use crate::EngineFault;

/// Errors surfaced by modules and bound methods.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// A caller-supplied argument is unusable (e.g. wrong input count).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A method name, slot or buffer index does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A method was requested before the module finished loading.
    #[error("module is not loaded")]
    NotLoaded,

    /// The engine failed while loading, querying or executing.
    #[error("engine failure: {0}")]
    ExternalEngineFailure(EngineFault),

    /// Tensor construction or conversion failed.
    #[error("tensor error: {0}")]
    Tensor(#[from] tensor_core::TensorError),

    /// A program descriptor could not be read or queried.
    #[error("program error: {0}")]
    Program(#[from] program_ir::ProgramError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// A blocking task panicked or was cancelled.
    #[error("background task failed: {0}")]
    TaskFailed(String),
}

impl From<EngineFault> for RuntimeError {
    fn from(fault: EngineFault) -> Self {
        RuntimeError::ExternalEngineFailure(fault)
    }
}

impl From<tokio::task::JoinError> for RuntimeError {
    fn from(e: tokio::task::JoinError) -> Self {
        RuntimeError::TaskFailed(e.to_string())
    }
}
