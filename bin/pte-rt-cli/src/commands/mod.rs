// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Subcommands and the helpers they share.

pub mod inspect;
pub mod run;
pub mod sample;
pub mod tensor;

use anyhow::Context;
use runtime::RuntimeConfig;
use std::path::{Path, PathBuf};
use tensor_core::{Literal, ScalarType};

/// Installs the global subscriber; `RUST_LOG` wins over `-v`.
pub fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<RuntimeConfig> {
    match path {
        Some(p) => {
            let config = RuntimeConfig::from_file(p)?;
            tracing::info!("loaded config from {}", p.display());
            Ok(config)
        }
        None => Ok(RuntimeConfig::default()),
    }
}

/// The explicit `--program` flag, else the config's `program_path`.
pub fn resolve_program(flag: Option<PathBuf>, config: &RuntimeConfig) -> anyhow::Result<PathBuf> {
    flag.or_else(|| config.program_path.clone())
        .context("no program given; pass --program or set program_path in the config")
}

pub fn parse_dtype(name: Option<&str>) -> anyhow::Result<Option<ScalarType>> {
    name.map(|n| {
        ScalarType::from_str_loose(n).with_context(|| format!("unknown dtype '{n}'"))
    })
    .transpose()
}

pub fn parse_literal(json: &str) -> anyhow::Result<Literal> {
    let value: serde_json::Value =
        serde_json::from_str(json).with_context(|| format!("invalid JSON literal '{json}'"))?;
    Ok(Literal::from_json(&value)?)
}

/// Truncates a string to `max_len` characters with ellipsis if needed.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{head}...")
    }
}
