// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Integration tests: end-to-end dispatch.
//!
//! These tests exercise the complete flow from program manifest on disk →
//! engine open → module load → dispatch table → blocking and suspending
//! calls, proving that tensors, descriptors and the dispatch layer compose.

use program_ir::{EValue, MethodMeta, ProgramManifest, SlotMeta, Tag, TensorInfo, Verification};
use runtime::{
    Engine, EngineErrorCode, EngineFault, ExecOutcome, MethodOutput, Module, ProgramSource,
    RuntimeConfig, RuntimeError, SyntheticEngine,
};
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tensor_core::{Literal, ScalarType, Tensor};

// ── Helpers ────────────────────────────────────────────────────

const ADD_MUL: &str = r#"{
    "name": "add_mul",
    "methods": [
        {
            "name": "forward",
            "inputs": [
                { "tag": "tensor", "tensor": {
                    "sizes": [1], "dim_order": [0], "scalar_type": "float32",
                    "is_memory_planned": true, "nbytes": 4 } },
                { "tag": "tensor", "tensor": {
                    "sizes": [1], "dim_order": [0], "scalar_type": "float32",
                    "is_memory_planned": true, "nbytes": 4 } }
            ],
            "outputs": [
                { "tag": "tensor", "tensor": {
                    "sizes": [1], "dim_order": [0], "scalar_type": "float32",
                    "is_memory_planned": true, "nbytes": 4 } }
            ],
            "memory_planned_buffers": [48]
        },
        {
            "name": "split",
            "inputs": [ { "tag": "int" } ],
            "outputs": [ { "tag": "int" }, { "tag": "double" }, { "tag": "bool" } ]
        }
    ]
}"#;

fn manifest_file(json: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn scalar(v: f64) -> EValue {
    Tensor::new([v]).unwrap().into()
}

fn first_f32(value: &EValue) -> f32 {
    value.as_tensor().unwrap().to_f32_vec()[0]
}

/// Engine whose `forward` adds its two inputs.
fn adder() -> SyntheticEngine {
    SyntheticEngine::open(ProgramSource::from(ADD_MUL.as_bytes().to_vec()))
        .unwrap()
        .with_kernel("forward", |inputs| {
            let sum: f64 = inputs
                .iter()
                .map(|v| v.as_tensor().map_or(0.0, |t| t.to_f32_vec()[0] as f64))
                .sum();
            Tensor::new([sum]).map(|t| vec![t.into()]).map_err(|e| e.to_string())
        })
        .with_kernel("split", |inputs| {
            let n = inputs[0].as_int().ok_or("expected int")?;
            Ok(vec![EValue::Int(n), EValue::Double(n as f64 / 2.0), EValue::Bool(n % 2 == 0)])
        })
}

/// Engine that counts loads and can be told to fail them.
struct ScriptedEngine {
    loads: AtomicUsize,
    fail_loads: AtomicUsize,
    loaded: std::sync::atomic::AtomicBool,
    load_fault: EngineErrorCode,
}

impl ScriptedEngine {
    fn failing(times: usize) -> Self {
        Self::failing_with(times, EngineErrorCode::InvalidProgram)
    }

    fn failing_with(times: usize, code: EngineErrorCode) -> Self {
        Self {
            loads: AtomicUsize::new(0),
            fail_loads: AtomicUsize::new(times),
            loaded: std::sync::atomic::AtomicBool::new(false),
            load_fault: code,
        }
    }
}

impl Engine for ScriptedEngine {
    fn open(_source: ProgramSource) -> Result<Self, EngineFault> {
        Ok(Self::failing(0))
    }

    fn load(&self, _verification: Verification) -> Result<(), EngineFault> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if self.fail_loads.load(Ordering::SeqCst) > 0 {
            self.fail_loads.fetch_sub(1, Ordering::SeqCst);
            return Err(EngineFault::new(self.load_fault, "backend not registered"));
        }
        self.loaded.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::SeqCst)
    }

    fn method_names(&self) -> Result<Vec<String>, EngineFault> {
        Ok(vec!["fail".into(), "diagnose".into()])
    }

    fn method_meta(&self, name: &str) -> Result<MethodMeta, EngineFault> {
        Ok(MethodMeta::new(name).with_output(SlotMeta::value(Tag::Int)))
    }

    fn execute(&self, name: &str, _inputs: &[EValue]) -> ExecOutcome {
        match name {
            "fail" => ExecOutcome::Fault(EngineFault::from_code(EngineErrorCode::OperatorMissing)),
            _ => ExecOutcome::Diagnostic("kernel aborted".into()),
        }
    }
}

// ── Loading ────────────────────────────────────────────────────

#[test]
fn test_load_from_path() {
    let file = manifest_file(ADD_MUL);
    let mut module = Module::<SyntheticEngine>::from_path(file.path()).unwrap();
    assert!(!module.is_loaded());

    module.load().unwrap();
    assert!(module.is_loaded());
    assert_eq!(module.method_names().unwrap(), vec!["forward", "split"]);
}

#[test]
fn test_load_from_bytes() {
    let mut module = Module::<SyntheticEngine>::from_bytes(ADD_MUL.as_bytes().to_vec()).unwrap();
    module.load().unwrap();
    assert_eq!(module.methods().unwrap().len(), 2);
}

#[test]
fn test_load_from_config() {
    let file = manifest_file(ADD_MUL);
    let config = RuntimeConfig {
        program_path: Some(file.path().to_path_buf()),
        verification: Verification::InternalConsistency,
        ..Default::default()
    };
    let mut module = Module::<SyntheticEngine>::from_config(&config).unwrap();
    assert_eq!(module.verification(), Verification::InternalConsistency);
    module.load().unwrap();

    assert!(matches!(
        Module::<SyntheticEngine>::from_config(&RuntimeConfig::default()),
        Err(RuntimeError::Config(_))
    ));
}

#[test]
fn test_missing_program_file() {
    let err = Module::<SyntheticEngine>::from_path("/nonexistent/program.json").unwrap_err();
    match err {
        RuntimeError::ExternalEngineFailure(f) => assert_eq!(f.code, EngineErrorCode::AccessFailed),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_verification_level_applies() {
    let inconsistent = ADD_MUL.replacen("\"nbytes\": 4", "\"nbytes\": 5", 1);

    let mut lenient = Module::<SyntheticEngine>::from_bytes(inconsistent.clone().into_bytes()).unwrap();
    lenient.load().unwrap();

    let mut strict = Module::<SyntheticEngine>::from_bytes(inconsistent.into_bytes())
        .unwrap()
        .with_verification(Verification::InternalConsistency);
    let err = strict.load().unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::ExternalEngineFailure(EngineFault { code: EngineErrorCode::InvalidProgram, .. })
    ));
    assert!(!strict.is_loaded());
    assert!(strict.load_error().is_some());
    assert!(matches!(strict.method_names(), Err(RuntimeError::NotLoaded)));
}

#[test]
fn test_reload_is_noop() {
    let mut module = Module::new(ScriptedEngine::failing(0));
    module.load().unwrap();
    module.load().unwrap();
    assert_eq!(module.engine().loads.load(Ordering::SeqCst), 1);
}

#[test]
fn test_failed_load_retries() {
    let mut module = Module::new(ScriptedEngine::failing(1));
    assert!(module.load().is_err());
    assert!(!module.is_loaded());

    module.load().unwrap();
    assert!(module.is_loaded());
    assert!(module.load_error().is_none());
    assert_eq!(module.engine().loads.load(Ordering::SeqCst), 2);
}

#[test]
fn test_load_fault_is_engine_failure() {
    let mut module = Module::new(ScriptedEngine::failing_with(1, EngineErrorCode::NotFound));
    match module.load() {
        Err(RuntimeError::ExternalEngineFailure(fault)) => {
            assert_eq!(fault.code, EngineErrorCode::NotFound);
            assert_eq!(fault.message, "backend not registered");
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(!module.is_loaded());
}

#[tokio::test]
async fn test_load_async() {
    let file = manifest_file(ADD_MUL);
    let mut module = Module::<SyntheticEngine>::from_path(file.path()).unwrap();
    module.load_async().await.unwrap();
    assert!(module.is_loaded());
}

// ── Metadata ───────────────────────────────────────────────────

#[test]
fn test_method_metadata() {
    let mut module = Module::new(adder());
    module.load().unwrap();

    let resolver = module.resolver().unwrap();
    assert_eq!(resolver.input_tag("forward", 0).unwrap(), Tag::Tensor);
    assert_eq!(resolver.output_tag("split", 1).unwrap(), Tag::Double);

    let info = resolver.input_tensor_meta("forward", 1).unwrap();
    assert_eq!(info.sizes, vec![1]);
    assert_eq!(info.dim_order, vec![0]);
    assert_eq!(info.scalar_type, ScalarType::Float32);
    assert!(info.is_memory_planned);
    assert_eq!(info.nbytes, 4);

    assert_eq!(resolver.memory_planned_buffer_size("forward", 0).unwrap(), 48);
}

#[test]
fn test_metadata_misses_are_not_found() {
    let mut module = Module::new(adder());
    module.load().unwrap();
    let resolver = module.resolver().unwrap();

    assert!(matches!(resolver.method_meta("backward"), Err(RuntimeError::NotFound(_))));
    assert!(matches!(resolver.input_tag("forward", 2), Err(RuntimeError::NotFound(_))));
    assert!(matches!(resolver.output_tensor_meta("split", 0), Err(RuntimeError::NotFound(_))));
    assert!(matches!(
        resolver.memory_planned_buffer_size("split", 0),
        Err(RuntimeError::NotFound(_))
    ));
}

// ── Dispatch ───────────────────────────────────────────────────

#[test]
fn test_call_before_load() {
    let module = Module::new(adder());
    assert!(matches!(
        module.call("forward", &[scalar(1.0), scalar(2.0)]),
        Err(RuntimeError::NotLoaded)
    ));
}

#[test]
fn test_single_output() {
    let mut module = Module::new(adder());
    module.load().unwrap();

    match module.call("forward", &[scalar(1.0), scalar(2.0)]).unwrap() {
        MethodOutput::Single(v) => assert_eq!(first_f32(&v), 3.0),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_multiple_outputs_in_order() {
    let mut module = Module::new(adder());
    module.load().unwrap();

    let out = module.call("split", &[EValue::Int(7)]).unwrap();
    assert_eq!(
        out,
        MethodOutput::Multiple(vec![EValue::Int(7), EValue::Double(3.5), EValue::Bool(false)])
    );
}

#[test]
fn test_wrong_arity_and_types() {
    let mut module = Module::new(adder());
    module.load().unwrap();

    assert!(matches!(
        module.call("forward", &[scalar(1.0)]),
        Err(RuntimeError::InvalidArgument(_))
    ));
    // Arity matches; the engine rejects the tag.
    let err = module.call("forward", &[scalar(1.0), EValue::Int(2)]).unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::ExternalEngineFailure(EngineFault { code: EngineErrorCode::InvalidType, .. })
    ));
}

#[test]
fn test_engine_failures_surface() {
    let mut module = Module::new(ScriptedEngine::failing(0));
    module.load().unwrap();

    match module.call("fail", &[]).unwrap_err() {
        RuntimeError::ExternalEngineFailure(f) => {
            assert_eq!(f.code, EngineErrorCode::OperatorMissing);
        }
        other => panic!("unexpected {other:?}"),
    }
    match module.call("diagnose", &[]).unwrap_err() {
        RuntimeError::ExternalEngineFailure(f) => assert_eq!(f.message, "kernel aborted"),
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn test_call_async() {
    let mut module = Module::new(adder());
    module.load_async().await.unwrap();

    let out = module
        .call_async("forward", vec![scalar(0.25), scalar(0.5)])
        .await
        .unwrap();
    let values = out.into_values();
    assert_eq!(values.len(), 1);
    assert_eq!(first_f32(&values[0]), 0.75);

    let err = module.call_async("diagnose", vec![]).await.unwrap_err();
    assert!(matches!(err, RuntimeError::NotFound(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_calls() {
    let mut module = Module::new(adder());
    module.load().unwrap();
    let forward = module.method("forward").unwrap().clone();

    let mut handles = Vec::new();
    for i in 0..16 {
        let method = forward.clone();
        handles.push(tokio::spawn(async move {
            let out = method
                .call_async(vec![scalar(i as f64), scalar(1.0)])
                .await
                .unwrap();
            (i, out)
        }));
    }
    for handle in handles {
        let (i, out) = handle.await.unwrap();
        match out {
            MethodOutput::Single(v) => assert_eq!(first_f32(&v), i as f32 + 1.0),
            other => panic!("unexpected {other:?}"),
        }
    }
}

// ── Tensors across the boundary ────────────────────────────────

#[test]
fn test_zero_filled_outputs_without_kernel() {
    let manifest = ProgramManifest::new(
        "zeros",
        vec![MethodMeta::new("logits")
            .with_output(SlotMeta::tensor(TensorInfo::new([1, 4], ScalarType::BFloat16)))],
    );
    let mut module = Module::new(SyntheticEngine::from_manifest(&manifest).unwrap());
    module.load().unwrap();

    let out = module.call("logits", &[]).unwrap().into_values();
    let t = out[0].as_tensor().unwrap();
    assert_eq!(t.dtype(), ScalarType::BFloat16);
    assert_eq!(t.nbytes(), 8);
    assert_eq!(
        t.tolist(),
        Literal::List(vec![Literal::List(vec![Literal::Number(0.0); 4])])
    );
}

#[test]
fn test_shared_buffer_outlives_caller() {
    let backing: Arc<[u8]> = Arc::from(1.5f32.to_le_bytes().to_vec());
    let input = Tensor::from_buffer(Arc::clone(&backing), ScalarType::Float32, [1]).unwrap();
    drop(backing);

    let mut module = Module::new(adder());
    module.load().unwrap();
    let out = module.call("forward", &[input.clone().into(), scalar(1.0)]).unwrap();
    assert_eq!(first_f32(&out.into_values()[0]), 2.5);
    assert_eq!(input.item().unwrap(), Literal::Number(1.5));
}

#[test]
fn test_sample_method_output() {
    let manifest = ProgramManifest::new(
        "lm",
        vec![MethodMeta::new("forward")
            .with_output(SlotMeta::tensor(TensorInfo::new([1, 128], ScalarType::Float32)))],
    );
    let engine = SyntheticEngine::from_manifest(&manifest)
        .unwrap()
        .with_kernel("forward", |_| {
            let mut logits = vec![0.5f64; 128];
            logits[89] = 1.0;
            Tensor::from_literal(vec![logits], None, None)
                .map(|t| vec![t.into()])
                .map_err(|e| e.to_string())
        });
    let mut module = Module::new(engine);
    module.load().unwrap();

    let out = module.call("forward", &[]).unwrap().into_values();
    let logits = out[0].as_tensor().unwrap();
    assert_eq!(tensor_core::sample(logits, 0.0, 1.0).unwrap(), 89);
}
