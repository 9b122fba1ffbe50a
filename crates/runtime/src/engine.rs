// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The seam between the dispatch layer and whatever executes programs.
//!
//! ```text
//! Engine::open(source)
//!     │  .load(verification)
//!     ▼
//! loaded engine ── method_names() / method_meta(name)
//!     │  .execute(name, inputs)
//!     ▼
//!   ExecOutcome { Values | Diagnostic | Fault }
//! ```
//!
//! Engines are shared across threads and called through `&self`; any
//! serialization of concurrent calls is the engine's own business.

use program_ir::{EValue, MethodMeta, Verification};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

// ── Error codes ────────────────────────────────────────────────────

/// Failure categories reported by an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum EngineErrorCode {
    Internal,
    InvalidState,
    EndOfMethod,
    NotSupported,
    NotImplemented,
    InvalidArgument,
    InvalidType,
    OperatorMissing,
    NotFound,
    MemoryAllocationFailed,
    AccessFailed,
    InvalidProgram,
    DelegateInvalidCompatibility,
    DelegateMemoryAllocationFailed,
    DelegateInvalidHandle,
}

impl EngineErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Internal => "Internal",
            Self::InvalidState => "InvalidState",
            Self::EndOfMethod => "EndOfMethod",
            Self::NotSupported => "NotSupported",
            Self::NotImplemented => "NotImplemented",
            Self::InvalidArgument => "InvalidArgument",
            Self::InvalidType => "InvalidType",
            Self::OperatorMissing => "OperatorMissing",
            Self::NotFound => "NotFound",
            Self::MemoryAllocationFailed => "MemoryAllocationFailed",
            Self::AccessFailed => "AccessFailed",
            Self::InvalidProgram => "InvalidProgram",
            Self::DelegateInvalidCompatibility => "DelegateInvalidCompatibility",
            Self::DelegateMemoryAllocationFailed => "DelegateMemoryAllocationFailed",
            Self::DelegateInvalidHandle => "DelegateInvalidHandle",
        }
    }

    /// Human-readable description used when a fault carries no message.
    pub fn default_message(self) -> &'static str {
        match self {
            Self::Internal => "An internal error occurred",
            Self::InvalidState => "Executor is in an invalid state for a target operation",
            Self::EndOfMethod => "There are no more steps of execution to run",
            Self::NotSupported => "Operation is not supported in the current context",
            Self::NotImplemented => "Operation is not yet implemented",
            Self::InvalidArgument => "User provided an invalid argument",
            Self::InvalidType => "Object is an invalid type for the operation",
            Self::OperatorMissing => "Operator(s) missing in the operator registry",
            Self::NotFound => "Requested resource could not be found",
            Self::MemoryAllocationFailed => "Could not allocate the requested memory",
            Self::AccessFailed => "Could not access a resource",
            Self::InvalidProgram => "Error caused by the contents of a program",
            Self::DelegateInvalidCompatibility => {
                "Backend receives an incompatible delegate version"
            }
            Self::DelegateMemoryAllocationFailed => "Backend fails to allocate memory",
            Self::DelegateInvalidHandle => "The handle is invalid",
        }
    }
}

impl fmt::Display for EngineErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── EngineFault ────────────────────────────────────────────────────

/// A structured failure reported by an engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code}: {message}")]
pub struct EngineFault {
    pub code: EngineErrorCode,
    pub message: String,
}

impl EngineFault {
    pub fn new(code: EngineErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// A fault carrying the code's default message.
    pub fn from_code(code: EngineErrorCode) -> Self {
        Self::new(code, code.default_message())
    }
}

impl From<EngineErrorCode> for EngineFault {
    fn from(code: EngineErrorCode) -> Self {
        Self::from_code(code)
    }
}

// ── Program sources and outcomes ───────────────────────────────────

/// Where an engine reads its program from.
#[derive(Clone)]
pub enum ProgramSource {
    /// A file on disk; engines are expected to memory-map it.
    Path(PathBuf),
    /// Program bytes already in memory.
    Bytes(Arc<[u8]>),
}

impl ProgramSource {
    pub fn describe(&self) -> String {
        match self {
            ProgramSource::Path(p) => p.display().to_string(),
            ProgramSource::Bytes(b) => format!("<{} bytes in memory>", b.len()),
        }
    }
}

impl fmt::Debug for ProgramSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProgramSource({})", self.describe())
    }
}

impl From<PathBuf> for ProgramSource {
    fn from(p: PathBuf) -> Self {
        ProgramSource::Path(p)
    }
}

impl From<Vec<u8>> for ProgramSource {
    fn from(b: Vec<u8>) -> Self {
        ProgramSource::Bytes(b.into())
    }
}

impl From<Arc<[u8]>> for ProgramSource {
    fn from(b: Arc<[u8]>) -> Self {
        ProgramSource::Bytes(b)
    }
}

/// What an engine returns from [`Engine::execute`].
///
/// A diagnostic is a failure described only by text; it is never a
/// successful string result.
#[derive(Debug, Clone)]
pub enum ExecOutcome {
    Values(Vec<EValue>),
    Diagnostic(String),
    Fault(EngineFault),
}

// ── Engine trait ───────────────────────────────────────────────────

/// An executor of loaded programs.
///
/// Implementors must be shareable across threads: bound methods hold the
/// engine behind an `Arc` and call it from the blocking pool.
pub trait Engine: Send + Sync + 'static {
    /// Opens a program without loading it.
    fn open(source: ProgramSource) -> Result<Self, EngineFault>
    where
        Self: Sized;

    /// Loads the program, checking it at the given level.
    fn load(&self, verification: Verification) -> Result<(), EngineFault>;

    fn is_loaded(&self) -> bool;

    /// Names of the program's methods, in declaration order.
    fn method_names(&self) -> Result<Vec<String>, EngineFault>;

    fn method_meta(&self, name: &str) -> Result<MethodMeta, EngineFault>;

    /// Runs `name` on `inputs`, blocking until it finishes.
    fn execute(&self, name: &str, inputs: &[EValue]) -> ExecOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_messages() {
        let f = EngineFault::from_code(EngineErrorCode::OperatorMissing);
        assert_eq!(f.message, "Operator(s) missing in the operator registry");
        assert_eq!(
            f.to_string(),
            "OperatorMissing: Operator(s) missing in the operator registry"
        );
    }

    #[test]
    fn test_program_source_describe() {
        let s = ProgramSource::from(vec![0u8; 16]);
        assert_eq!(s.describe(), "<16 bytes in memory>");
        let p = ProgramSource::from(PathBuf::from("/tmp/add.json"));
        assert!(format!("{p:?}").contains("/tmp/add.json"));
    }
}
