// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Modules: a program plus the table of callable methods discovered when it
//! is loaded.
//!
//! ```text
//! Module (Unloaded)
//!     │  .load() / .load_async()
//!     ├──────────────► Loaded(DispatchTable)
//!     └──────────────► LoadFailed(reason)   ── .load() retries
//! ```
//!
//! The dispatch table maps each method name to a [`BoundMethod`]. Bound
//! methods do no computation of their own: they check arity, forward to the
//! engine, and reshape the engine's answer into a [`MethodOutput`].

use crate::{Engine, EngineErrorCode, EngineFault, ExecOutcome, MetadataResolver};
use crate::{ProgramSource, RuntimeConfig, RuntimeError};
use program_ir::{EValue, MethodMeta, Verification};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

// ── MethodOutput ───────────────────────────────────────────────────

/// The result of a successful method call.
#[derive(Debug, Clone, PartialEq)]
pub enum MethodOutput {
    /// The method produced exactly one value.
    Single(EValue),
    /// The method produced zero or several values, in order.
    Multiple(Vec<EValue>),
}

impl MethodOutput {
    fn from_values(mut values: Vec<EValue>) -> Self {
        if values.len() == 1 {
            MethodOutput::Single(values.remove(0))
        } else {
            MethodOutput::Multiple(values)
        }
    }

    pub fn len(&self) -> usize {
        match self {
            MethodOutput::Single(_) => 1,
            MethodOutput::Multiple(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flattens into an ordered list.
    pub fn into_values(self) -> Vec<EValue> {
        match self {
            MethodOutput::Single(v) => vec![v],
            MethodOutput::Multiple(v) => v,
        }
    }
}

// ── BoundMethod ────────────────────────────────────────────────────

/// An invocation record for one method of a loaded program.
///
/// Cloning is cheap; clones share the engine and descriptor.
pub struct BoundMethod<E: Engine> {
    engine: Arc<E>,
    meta: Arc<MethodMeta>,
}

impl<E: Engine> Clone for BoundMethod<E> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            meta: Arc::clone(&self.meta),
        }
    }
}

impl<E: Engine> std::fmt::Debug for BoundMethod<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundMethod")
            .field("name", &self.meta.name)
            .field("num_inputs", &self.meta.num_inputs())
            .field("num_outputs", &self.meta.num_outputs())
            .finish()
    }
}

impl<E: Engine> BoundMethod<E> {
    pub fn name(&self) -> &str {
        &self.meta.name
    }

    pub fn meta(&self) -> &MethodMeta {
        &self.meta
    }

    /// Calls the method, blocking until the engine finishes.
    ///
    /// # Errors
    /// - [`RuntimeError::InvalidArgument`] if `inputs.len()` differs from
    ///   the declared input count.
    /// - [`RuntimeError::ExternalEngineFailure`] if the engine reports a
    ///   fault or a diagnostic.
    pub fn call(&self, inputs: &[EValue]) -> Result<MethodOutput, RuntimeError> {
        self.check_arity(inputs)?;
        tracing::debug!("calling '{}' with {} inputs", self.meta.name, inputs.len());
        convert_outcome(self.engine.execute(&self.meta.name, inputs))
    }

    /// Calls the method on the blocking pool and resumes with its result.
    ///
    /// Errors as [`call`](Self::call), plus [`RuntimeError::TaskFailed`] if
    /// the blocking task panics.
    pub async fn call_async(&self, inputs: Vec<EValue>) -> Result<MethodOutput, RuntimeError> {
        self.check_arity(&inputs)?;
        tracing::debug!(
            "dispatching '{}' with {} inputs to the blocking pool",
            self.meta.name,
            inputs.len()
        );
        let engine = Arc::clone(&self.engine);
        let meta = Arc::clone(&self.meta);
        let outcome =
            tokio::task::spawn_blocking(move || engine.execute(&meta.name, &inputs)).await?;
        convert_outcome(outcome)
    }

    fn check_arity(&self, inputs: &[EValue]) -> Result<(), RuntimeError> {
        let expected = self.meta.num_inputs();
        if inputs.len() != expected {
            return Err(RuntimeError::InvalidArgument(format!(
                "method '{}' takes {expected} inputs, got {}",
                self.meta.name,
                inputs.len()
            )));
        }
        Ok(())
    }
}

fn convert_outcome(outcome: ExecOutcome) -> Result<MethodOutput, RuntimeError> {
    match outcome {
        ExecOutcome::Values(values) => Ok(MethodOutput::from_values(values)),
        ExecOutcome::Diagnostic(message) => Err(RuntimeError::ExternalEngineFailure(
            EngineFault::new(EngineErrorCode::Internal, message),
        )),
        ExecOutcome::Fault(fault) => Err(RuntimeError::ExternalEngineFailure(fault)),
    }
}

// ── DispatchTable ──────────────────────────────────────────────────

/// Method name → bound method, plus the program's declaration order.
#[derive(Debug)]
pub struct DispatchTable<E: Engine> {
    methods: HashMap<String, BoundMethod<E>>,
    order: Vec<String>,
}

impl<E: Engine> DispatchTable<E> {
    /// Discovers every method of a loaded engine and binds it.
    fn build(engine: &Arc<E>) -> Result<Self, RuntimeError> {
        let resolver = MetadataResolver::new(&**engine)?;
        let order = resolver.method_names()?;
        let mut methods = HashMap::with_capacity(order.len());
        for name in &order {
            let meta = resolver.method_meta(name)?;
            tracing::debug!("binding {}", meta.summary());
            methods.insert(
                name.clone(),
                BoundMethod {
                    engine: Arc::clone(engine),
                    meta: Arc::new(meta),
                },
            );
        }
        Ok(Self { methods, order })
    }

    pub fn get(&self, name: &str) -> Option<&BoundMethod<E>> {
        self.methods.get(name)
    }

    /// Method names in declaration order.
    pub fn names(&self) -> &[String] {
        &self.order
    }

    /// Bound methods in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &BoundMethod<E>> {
        self.order.iter().filter_map(|n| self.methods.get(n))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

// ── Module ─────────────────────────────────────────────────────────

#[derive(Debug)]
enum ModuleState<E: Engine> {
    Unloaded,
    Loaded(DispatchTable<E>),
    LoadFailed(String),
}

/// A program opened by an engine, with methods callable by name once
/// loaded.
///
/// # Example
/// ```no_run
/// use program_ir::EValue;
/// use runtime::{Module, SyntheticEngine};
/// use tensor_core::Tensor;
///
/// # async fn example() -> Result<(), runtime::RuntimeError> {
/// let mut module = Module::<SyntheticEngine>::from_path("add.json")?;
/// module.load_async().await?;
/// let x = Tensor::new([1.0])?;
/// let out = module.call_async("forward", vec![EValue::from(x.clone()), x.into()]).await?;
/// println!("{out:?}");
/// # Ok(())
/// # }
/// ```
pub struct Module<E: Engine> {
    engine: Arc<E>,
    verification: Verification,
    state: ModuleState<E>,
}

impl<E: Engine> Module<E> {
    /// Wraps an already-opened engine.
    pub fn new(engine: E) -> Self {
        Self {
            engine: Arc::new(engine),
            verification: Verification::default(),
            state: ModuleState::Unloaded,
        }
    }

    /// Opens the program at `path`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RuntimeError> {
        let engine = E::open(ProgramSource::Path(path.as_ref().to_path_buf()))?;
        Ok(Self::new(engine))
    }

    /// Opens a program from in-memory bytes.
    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>) -> Result<Self, RuntimeError> {
        let engine = E::open(ProgramSource::Bytes(bytes.into()))?;
        Ok(Self::new(engine))
    }

    /// Opens the program named by `config.program_path` and adopts the
    /// config's verification level.
    pub fn from_config(config: &RuntimeConfig) -> Result<Self, RuntimeError> {
        let path = config
            .program_path
            .as_ref()
            .ok_or_else(|| RuntimeError::Config("no program_path configured".into()))?;
        Ok(Self::from_path(path)?.with_config(config))
    }

    /// Adopts the verification level from `config`.
    pub fn with_config(self, config: &RuntimeConfig) -> Self {
        self.with_verification(config.verification)
    }

    pub fn with_verification(mut self, verification: Verification) -> Self {
        self.verification = verification;
        self
    }

    pub fn verification(&self) -> Verification {
        self.verification
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Loads the program and installs a bound method per method name.
    ///
    /// Loading an already-loaded module does nothing. A failed load leaves
    /// the module in the failed state with no callable methods; loading
    /// again retries.
    pub fn load(&mut self) -> Result<(), RuntimeError> {
        if self.is_loaded() {
            tracing::debug!("module already loaded");
            return Ok(());
        }
        let result = install(&self.engine, self.verification);
        self.finish_load(result)
    }

    /// Like [`load`](Self::load), but runs on the blocking pool.
    pub async fn load_async(&mut self) -> Result<(), RuntimeError> {
        if self.is_loaded() {
            tracing::debug!("module already loaded");
            return Ok(());
        }
        let engine = Arc::clone(&self.engine);
        let verification = self.verification;
        let result = tokio::task::spawn_blocking(move || install(&engine, verification))
            .await
            .map_err(RuntimeError::from)
            .and_then(|r| r);
        self.finish_load(result)
    }

    fn finish_load(&mut self, result: Result<DispatchTable<E>, RuntimeError>) -> Result<(), RuntimeError> {
        match result {
            Ok(table) => {
                tracing::info!(
                    "module loaded ({} verification): {} methods [{}]",
                    self.verification,
                    table.len(),
                    table.names().join(", ")
                );
                self.state = ModuleState::Loaded(table);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("module load failed: {e}");
                self.state = ModuleState::LoadFailed(e.to_string());
                Err(e)
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, ModuleState::Loaded(_))
    }

    /// The reason the last load failed, if it did.
    pub fn load_error(&self) -> Option<&str> {
        match &self.state {
            ModuleState::LoadFailed(reason) => Some(reason),
            _ => None,
        }
    }

    pub fn dispatch_table(&self) -> Result<&DispatchTable<E>, RuntimeError> {
        match &self.state {
            ModuleState::Loaded(table) => Ok(table),
            _ => Err(RuntimeError::NotLoaded),
        }
    }

    pub fn method_names(&self) -> Result<Vec<String>, RuntimeError> {
        Ok(self.dispatch_table()?.names().to_vec())
    }

    /// Descriptors of every method, in declaration order.
    pub fn methods(&self) -> Result<Vec<MethodMeta>, RuntimeError> {
        Ok(self.dispatch_table()?.iter().map(|m| m.meta().clone()).collect())
    }

    /// Live metadata queries against the engine.
    pub fn resolver(&self) -> Result<MetadataResolver<'_, E>, RuntimeError> {
        self.dispatch_table()?;
        MetadataResolver::new(&*self.engine)
    }

    /// Looks up a bound method.
    ///
    /// # Errors
    /// [`RuntimeError::NotLoaded`] before a successful load,
    /// [`RuntimeError::NotFound`] for an unknown name.
    pub fn method(&self, name: &str) -> Result<&BoundMethod<E>, RuntimeError> {
        self.dispatch_table()?
            .get(name)
            .ok_or_else(|| RuntimeError::NotFound(format!("method '{name}'")))
    }

    /// Calls `name` on `inputs`, blocking.
    pub fn call(&self, name: &str, inputs: &[EValue]) -> Result<MethodOutput, RuntimeError> {
        self.method(name)?.call(inputs)
    }

    /// Calls `name` on `inputs` via the blocking pool.
    pub async fn call_async(
        &self,
        name: &str,
        inputs: Vec<EValue>,
    ) -> Result<MethodOutput, RuntimeError> {
        let method = self.method(name)?.clone();
        method.call_async(inputs).await
    }
}

impl<E: Engine> std::fmt::Debug for Module<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match &self.state {
            ModuleState::Unloaded => "unloaded".to_string(),
            ModuleState::Loaded(t) => format!("loaded ({} methods)", t.len()),
            ModuleState::LoadFailed(reason) => format!("load failed: {reason}"),
        };
        f.debug_struct("Module")
            .field("engine", &std::any::type_name::<E>())
            .field("verification", &self.verification)
            .field("state", &state)
            .finish()
    }
}

fn install<E: Engine>(
    engine: &Arc<E>,
    verification: Verification,
) -> Result<DispatchTable<E>, RuntimeError> {
    engine
        .load(verification)
        .map_err(RuntimeError::ExternalEngineFailure)?;
    DispatchTable::build(engine)
}
