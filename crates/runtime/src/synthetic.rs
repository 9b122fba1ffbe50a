// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! A manifest-driven [`Engine`] for testing and tooling.
//!
//! [`SyntheticEngine`] reads a JSON [`ProgramManifest`] instead of a
//! compiled program. Methods run registered Rust kernels; a method with no
//! kernel returns zero values shaped by its output descriptors.
//!
//! Two program sources are supported:
//!
//! 1. **Path**: the manifest file is memory-mapped with `memmap2`.
//! 2. **Bytes**: the manifest is read from a shared in-memory buffer.

use crate::{Engine, EngineErrorCode, EngineFault, ExecOutcome, ProgramSource};
use program_ir::{EValue, MethodMeta, ProgramManifest, Tag, Verification};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

/// A method implementation: inputs in, outputs or a diagnostic out.
pub type Kernel = Arc<dyn Fn(&[EValue]) -> Result<Vec<EValue>, String> + Send + Sync>;

enum ProgramBytes {
    Mapped(memmap2::Mmap),
    Shared(Arc<[u8]>),
}

impl ProgramBytes {
    fn as_slice(&self) -> &[u8] {
        match self {
            ProgramBytes::Mapped(m) => &m[..],
            ProgramBytes::Shared(b) => &b[..],
        }
    }
}

/// Executes manifest-described programs with pluggable kernels.
pub struct SyntheticEngine {
    origin: String,
    bytes: ProgramBytes,
    manifest: OnceLock<ProgramManifest>,
    kernels: HashMap<String, Kernel>,
}

impl SyntheticEngine {
    /// Serialises `manifest` and opens it from memory.
    pub fn from_manifest(manifest: &ProgramManifest) -> Result<Self, EngineFault> {
        let json = manifest
            .to_json()
            .map_err(|e| EngineFault::new(EngineErrorCode::InvalidProgram, e.to_string()))?;
        Self::open(ProgramSource::Bytes(json.into_bytes().into()))
    }

    /// Registers the implementation of `method`.
    pub fn with_kernel<F>(mut self, method: impl Into<String>, kernel: F) -> Self
    where
        F: Fn(&[EValue]) -> Result<Vec<EValue>, String> + Send + Sync + 'static,
    {
        self.kernels.insert(method.into(), Arc::new(kernel));
        self
    }

    /// The loaded manifest, if any.
    pub fn manifest(&self) -> Option<&ProgramManifest> {
        self.manifest.get()
    }

    fn loaded(&self) -> Result<&ProgramManifest, EngineFault> {
        self.manifest.get().ok_or_else(|| {
            EngineFault::new(
                EngineErrorCode::InvalidState,
                format!("program '{}' is not loaded", self.origin),
            )
        })
    }

    fn lookup(&self, name: &str) -> Result<&MethodMeta, EngineFault> {
        let manifest = self.loaded()?;
        manifest
            .methods
            .iter()
            .find(|m| m.name == name)
            .ok_or_else(|| {
                EngineFault::new(EngineErrorCode::NotFound, format!("method '{name}' not found"))
            })
    }

    fn run(&self, name: &str, inputs: &[EValue]) -> Result<ExecOutcome, EngineFault> {
        let meta = self.lookup(name)?;
        check_inputs(meta, inputs)?;

        match self.kernels.get(name) {
            Some(kernel) => Ok(match kernel(inputs) {
                Ok(values) => ExecOutcome::Values(values),
                Err(diagnostic) => ExecOutcome::Diagnostic(diagnostic),
            }),
            None => {
                let zeros = meta
                    .outputs
                    .iter()
                    .map(EValue::zero_for)
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| {
                        EngineFault::new(EngineErrorCode::MemoryAllocationFailed, e.to_string())
                    })?;
                Ok(ExecOutcome::Values(zeros))
            }
        }
    }
}

impl Engine for SyntheticEngine {
    fn open(source: ProgramSource) -> Result<Self, EngineFault> {
        let origin = source.describe();
        let bytes = match source {
            ProgramSource::Path(path) => {
                let file = std::fs::File::open(&path).map_err(|e| {
                    EngineFault::new(
                        EngineErrorCode::AccessFailed,
                        format!("cannot open '{}': {e}", path.display()),
                    )
                })?;
                // SAFETY: the mapping is read-only and program files are not
                // modified while open.
                let mmap = unsafe { memmap2::Mmap::map(&file) }.map_err(|e| {
                    EngineFault::new(EngineErrorCode::AccessFailed, format!("mmap failed: {e}"))
                })?;
                tracing::info!(
                    "synthetic engine: mmap'd {} ({} bytes)",
                    path.display(),
                    mmap.len()
                );
                ProgramBytes::Mapped(mmap)
            }
            ProgramSource::Bytes(bytes) => ProgramBytes::Shared(bytes),
        };

        Ok(Self {
            origin,
            bytes,
            manifest: OnceLock::new(),
            kernels: HashMap::new(),
        })
    }

    fn load(&self, verification: Verification) -> Result<(), EngineFault> {
        if self.manifest.get().is_some() {
            return Ok(());
        }

        let invalid = |detail: String| EngineFault::new(EngineErrorCode::InvalidProgram, detail);
        let manifest = ProgramManifest::from_slice(self.bytes.as_slice())
            .map_err(|e| invalid(e.to_string()))?;
        manifest
            .validate(verification)
            .map_err(|e| invalid(e.to_string()))?;

        for method in &manifest.methods {
            if !self.kernels.contains_key(&method.name) {
                tracing::warn!(
                    "no kernel for '{}'; calls return zero-filled outputs",
                    method.name
                );
            }
        }
        tracing::info!(
            "synthetic engine: loaded '{}' from {} ({} methods)",
            manifest.name,
            self.origin,
            manifest.methods.len()
        );

        // A concurrent load may have won; either copy is equivalent.
        let _ = self.manifest.set(manifest);
        Ok(())
    }

    fn is_loaded(&self) -> bool {
        self.manifest.get().is_some()
    }

    fn method_names(&self) -> Result<Vec<String>, EngineFault> {
        Ok(self.loaded()?.method_names())
    }

    fn method_meta(&self, name: &str) -> Result<MethodMeta, EngineFault> {
        self.lookup(name).cloned()
    }

    fn execute(&self, name: &str, inputs: &[EValue]) -> ExecOutcome {
        self.run(name, inputs).unwrap_or_else(ExecOutcome::Fault)
    }
}

/// Checks inputs against the method's input descriptors.
fn check_inputs(meta: &MethodMeta, inputs: &[EValue]) -> Result<(), EngineFault> {
    if inputs.len() != meta.num_inputs() {
        return Err(EngineFault::new(
            EngineErrorCode::InvalidArgument,
            format!(
                "'{}' expects {} inputs, got {}",
                meta.name,
                meta.num_inputs(),
                inputs.len()
            ),
        ));
    }

    for (index, (slot, value)) in meta.inputs.iter().zip(inputs).enumerate() {
        if value.tag() != slot.tag {
            return Err(EngineFault::new(
                EngineErrorCode::InvalidType,
                format!("input {index}: expected {}, got {}", slot.tag, value.tag()),
            ));
        }
        if let (Tag::Tensor, Some(info), EValue::Tensor(t)) = (slot.tag, &slot.tensor, value) {
            if t.dtype() != info.scalar_type {
                return Err(EngineFault::new(
                    EngineErrorCode::InvalidType,
                    format!(
                        "input {index}: expected {} tensor, got {}",
                        info.scalar_type,
                        t.dtype()
                    ),
                ));
            }
            if t.shape().dims() != info.sizes.as_slice() {
                return Err(EngineFault::new(
                    EngineErrorCode::InvalidArgument,
                    format!(
                        "input {index}: expected shape {}, got {}",
                        info.shape(),
                        t.shape()
                    ),
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use program_ir::{SlotMeta, TensorInfo};
    use tensor_core::{ScalarType, Tensor};

    fn manifest() -> ProgramManifest {
        ProgramManifest::new(
            "synthetic",
            vec![MethodMeta::new("forward")
                .with_input(SlotMeta::tensor(TensorInfo::new([3], ScalarType::Float32)))
                .with_input(SlotMeta::value(Tag::Double))
                .with_output(SlotMeta::tensor(TensorInfo::new([1, 3], ScalarType::Int64)))],
        )
    }

    fn loaded() -> SyntheticEngine {
        let e = SyntheticEngine::from_manifest(&manifest()).unwrap();
        e.load(Verification::Minimal).unwrap();
        e
    }

    fn good_inputs() -> Vec<EValue> {
        vec![Tensor::new([1.0, 2.0, 3.0]).unwrap().into(), EValue::Double(0.5)]
    }

    #[test]
    fn test_not_loaded_is_invalid_state() {
        let e = SyntheticEngine::from_manifest(&manifest()).unwrap();
        assert!(!e.is_loaded());
        assert_eq!(e.method_names().unwrap_err().code, EngineErrorCode::InvalidState);
        match e.execute("forward", &good_inputs()) {
            ExecOutcome::Fault(f) => assert_eq!(f.code, EngineErrorCode::InvalidState),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_zero_fallback() {
        let e = loaded();
        match e.execute("forward", &good_inputs()) {
            ExecOutcome::Values(v) => {
                let t = v[0].as_tensor().unwrap();
                assert_eq!(t.dtype(), ScalarType::Int64);
                assert_eq!(t.shape().dims(), &[1, 3]);
                assert_eq!(t.nbytes(), 24);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_kernel_and_diagnostic() {
        let e = SyntheticEngine::from_manifest(&manifest())
            .unwrap()
            .with_kernel("forward", |inputs| match inputs[1].as_double() {
                Some(d) if d > 0.0 => Ok(vec![EValue::Double(d * 2.0)]),
                _ => Err("scale must be positive".to_string()),
            });
        e.load(Verification::Minimal).unwrap();

        match e.execute("forward", &good_inputs()) {
            ExecOutcome::Values(v) => assert_eq!(v, vec![EValue::Double(1.0)]),
            other => panic!("unexpected {other:?}"),
        }
        let mut inputs = good_inputs();
        inputs[1] = EValue::Double(-1.0);
        assert!(matches!(e.execute("forward", &inputs), ExecOutcome::Diagnostic(_)));
    }

    #[test]
    fn test_input_checks() {
        let e = loaded();
        let fault = |inputs: &[EValue]| match e.execute("forward", inputs) {
            ExecOutcome::Fault(f) => f.code,
            other => panic!("unexpected {other:?}"),
        };

        assert_eq!(fault(&[]), EngineErrorCode::InvalidArgument);
        assert_eq!(
            fault(&[EValue::Int(1), EValue::Double(0.5)]),
            EngineErrorCode::InvalidType
        );
        let wrong_dtype = Tensor::from_literal([1, 2, 3], Some(ScalarType::Int32), None).unwrap();
        assert_eq!(
            fault(&[wrong_dtype.into(), EValue::Double(0.5)]),
            EngineErrorCode::InvalidType
        );
        let wrong_shape = Tensor::new([1.0, 2.0]).unwrap();
        assert_eq!(
            fault(&[wrong_shape.into(), EValue::Double(0.5)]),
            EngineErrorCode::InvalidArgument
        );
    }

    #[test]
    fn test_unknown_method() {
        let e = loaded();
        assert_eq!(e.method_meta("nope").unwrap_err().code, EngineErrorCode::NotFound);
    }

    #[test]
    fn test_bad_program_fails_load() {
        let e = SyntheticEngine::open(ProgramSource::from(b"not json".to_vec())).unwrap();
        let fault = e.load(Verification::Minimal).unwrap_err();
        assert_eq!(fault.code, EngineErrorCode::InvalidProgram);
        assert!(!e.is_loaded());
    }

    #[test]
    fn test_missing_file() {
        let fault = SyntheticEngine::open(ProgramSource::Path("/nonexistent/p.json".into()))
            .err()
            .unwrap();
        assert_eq!(fault.code, EngineErrorCode::AccessFailed);
    }
}
