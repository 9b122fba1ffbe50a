// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Read-only metadata queries against a loaded engine.

use crate::{Engine, EngineErrorCode, EngineFault, RuntimeError};
use program_ir::{MethodMeta, ProgramError, Tag, TensorInfo};

/// Answers "what methods exist and what do they take" for a loaded engine.
///
/// Every lookup by unknown name or index is an error; nothing is
/// defaulted.
#[derive(Debug)]
pub struct MetadataResolver<'a, E: Engine> {
    engine: &'a E,
}

impl<'a, E: Engine> MetadataResolver<'a, E> {
    /// Wraps an engine.
    ///
    /// # Errors
    /// [`RuntimeError::NotLoaded`] if the engine has not loaded a program.
    pub fn new(engine: &'a E) -> Result<Self, RuntimeError> {
        if !engine.is_loaded() {
            return Err(RuntimeError::NotLoaded);
        }
        Ok(Self { engine })
    }

    pub fn method_names(&self) -> Result<Vec<String>, RuntimeError> {
        self.engine.method_names().map_err(engine_error)
    }

    pub fn method_meta(&self, name: &str) -> Result<MethodMeta, RuntimeError> {
        self.engine.method_meta(name).map_err(engine_error)
    }

    /// Descriptors of every method, in declaration order.
    pub fn methods(&self) -> Result<Vec<MethodMeta>, RuntimeError> {
        self.method_names()?
            .iter()
            .map(|name| self.method_meta(name))
            .collect()
    }

    pub fn input_tag(&self, method: &str, index: usize) -> Result<Tag, RuntimeError> {
        self.method_meta(method)?.input_tag(index).map_err(program_error)
    }

    pub fn output_tag(&self, method: &str, index: usize) -> Result<Tag, RuntimeError> {
        self.method_meta(method)?.output_tag(index).map_err(program_error)
    }

    pub fn input_tensor_meta(&self, method: &str, index: usize) -> Result<TensorInfo, RuntimeError> {
        let meta = self.method_meta(method)?;
        meta.input_tensor_meta(index).cloned().map_err(program_error)
    }

    pub fn output_tensor_meta(
        &self,
        method: &str,
        index: usize,
    ) -> Result<TensorInfo, RuntimeError> {
        let meta = self.method_meta(method)?;
        meta.output_tensor_meta(index).cloned().map_err(program_error)
    }

    pub fn memory_planned_buffer_size(
        &self,
        method: &str,
        index: usize,
    ) -> Result<usize, RuntimeError> {
        self.method_meta(method)?
            .memory_planned_buffer_size(index)
            .map_err(program_error)
    }
}

/// Engine lookups that miss become [`RuntimeError::NotFound`]; everything
/// else is an engine failure.
fn engine_error(fault: EngineFault) -> RuntimeError {
    match fault.code {
        EngineErrorCode::NotFound => RuntimeError::NotFound(fault.message),
        _ => RuntimeError::ExternalEngineFailure(fault),
    }
}

fn program_error(err: ProgramError) -> RuntimeError {
    match err {
        ProgramError::NotFound(what) => RuntimeError::NotFound(what),
        other => RuntimeError::Program(other),
    }
}
