// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `pte-rt run` command: call a method with JSON inputs.
//!
//! Each `--input` is converted according to the tag of the slot it fills:
//! tensor slots take nested arrays (encoded as the slot's scalar type unless
//! `--dtype` says otherwise), scalar slots take plain JSON values.

use anyhow::{bail, Context};
use program_ir::{EValue, Scalar, SlotMeta, Tag};
use runtime::{MethodOutput, Module, RuntimeConfig, SyntheticEngine};
use serde_json::Value;
use std::path::PathBuf;
use tensor_core::{Literal, ScalarType, Tensor};

pub async fn execute(
    config: &RuntimeConfig,
    program: Option<PathBuf>,
    method: String,
    inputs: Vec<String>,
    dtype: Option<String>,
) -> anyhow::Result<()> {
    let path = super::resolve_program(program, config)?;
    let dtype = super::parse_dtype(dtype.as_deref())?;

    let mut module = Module::<SyntheticEngine>::from_path(&path)
        .map_err(|e| anyhow::anyhow!("failed to open '{}': {e}", path.display()))?
        .with_config(config);
    module.load_async().await?;

    let bound = module.method(&method)?;
    let meta = bound.meta();
    if inputs.len() != meta.num_inputs() {
        bail!(
            "'{method}' takes {} inputs, {} given",
            meta.num_inputs(),
            inputs.len()
        );
    }

    let mut values = Vec::with_capacity(inputs.len());
    for (i, (json, slot)) in inputs.iter().zip(&meta.inputs).enumerate() {
        let value = to_evalue(json, slot, dtype).with_context(|| format!("input {i}"))?;
        tracing::debug!("input {i}: {}", value.tag());
        values.push(value);
    }

    println!("  Calling {}", meta.summary());
    let output = bound.call_async(values).await?;

    match &output {
        MethodOutput::Single(_) => println!("  Output (single):"),
        MethodOutput::Multiple(v) => println!("  Outputs ({}):", v.len()),
    }
    for (i, value) in output.into_values().iter().enumerate() {
        print_value(i, value);
    }
    Ok(())
}

fn to_evalue(json: &str, slot: &SlotMeta, dtype: Option<ScalarType>) -> anyhow::Result<EValue> {
    let v: Value = serde_json::from_str(json).with_context(|| format!("invalid JSON '{json}'"))?;
    let declared = slot.tensor.as_ref().map(|t| t.scalar_type);

    let value = match slot.tag {
        Tag::None if v.is_null() => EValue::None,
        Tag::Tensor => EValue::Tensor(to_tensor(&v, dtype.or(declared))?),
        Tag::String => EValue::String(v.as_str().context("expected a string")?.to_owned()),
        Tag::Double => EValue::Double(v.as_f64().context("expected a number")?),
        Tag::Int => EValue::Int(v.as_i64().context("expected an integer")?),
        Tag::Bool => EValue::Bool(v.as_bool().context("expected a boolean")?),
        Tag::ListBool => EValue::ListBool(serde_json::from_value(v)?),
        Tag::ListDouble => EValue::ListDouble(serde_json::from_value(v)?),
        Tag::ListInt => EValue::ListInt(serde_json::from_value(v)?),
        Tag::ListTensor => EValue::ListTensor(
            elements(&v)?
                .iter()
                .map(|e| to_tensor(e, dtype))
                .collect::<anyhow::Result<_>>()?,
        ),
        Tag::ListOptionalTensor => EValue::ListOptionalTensor(
            elements(&v)?
                .iter()
                .map(|e| if e.is_null() { Ok(None) } else { to_tensor(e, dtype).map(Some) })
                .collect::<anyhow::Result<_>>()?,
        ),
        Tag::ListScalar => EValue::ListScalar(
            elements(&v)?
                .iter()
                .map(to_scalar)
                .collect::<anyhow::Result<_>>()?,
        ),
        Tag::None => bail!("expected null"),
    };
    Ok(value)
}

fn elements(v: &Value) -> anyhow::Result<&Vec<Value>> {
    v.as_array().context("expected an array")
}

fn to_tensor(v: &Value, dtype: Option<ScalarType>) -> anyhow::Result<Tensor> {
    let literal = Literal::from_json(v)?;
    Ok(Tensor::from_literal(literal, dtype, None)?)
}

fn to_scalar(v: &Value) -> anyhow::Result<Scalar> {
    if let Some(b) = v.as_bool() {
        Ok(Scalar::Bool(b))
    } else if let Some(i) = v.as_i64() {
        Ok(Scalar::Int(i))
    } else if let Some(d) = v.as_f64() {
        Ok(Scalar::Double(d))
    } else {
        bail!("expected a boolean or number, got {v}")
    }
}

fn print_value(index: usize, value: &EValue) {
    let rendered = super::truncate(&value.to_json().to_string(), 96);
    match value.as_tensor() {
        Some(t) => println!("   [{index}] tensor<{}>{} = {rendered}", t.dtype(), t.shape()),
        None => println!("   [{index}] {} = {rendered}", value.tag()),
    }
}
