// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # runtime
//!
//! Metadata-driven dispatch over loaded inference programs.
//!
//! The runtime takes:
//! - An [`Engine`] that can open, load and execute a program.
//! - A [`RuntimeConfig`] naming the program and its verification level.
//!
//! And exposes the program's methods by name: on load, every method the
//! engine reports is bound into a [`DispatchTable`], and each
//! [`BoundMethod`] can be called blocking or on the tokio blocking pool.
//!
//! # Lifecycle
//! ```text
//! Module::from_path / from_bytes / new(engine)
//!     │  .load() / .load_async()
//!     ▼
//! Loaded ── method_names() / methods() / method(name)
//!     │  .call(name, inputs) / .call_async(name, inputs)
//!     ▼
//!   MethodOutput { Single | Multiple }
//! ```
//!
//! [`SyntheticEngine`] implements [`Engine`] over a JSON program manifest
//! and is what the CLI and tests use.

mod config;
mod engine;
mod error;
mod module;
mod resolver;
mod synthetic;

pub use config::{RuntimeConfig, SamplingConfig};
pub use engine::{Engine, EngineErrorCode, EngineFault, ExecOutcome, ProgramSource};
pub use error::RuntimeError;
pub use module::{BoundMethod, DispatchTable, MethodOutput, Module};
pub use resolver::MetadataResolver;
pub use synthetic::{Kernel, SyntheticEngine};
