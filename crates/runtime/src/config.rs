// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Runtime configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! program_path = "./programs/add.json"
//! verification = "internal-consistency"
//!
//! [sampling]
//! temperature = 0.8
//! top_p = 0.9
//! seed = 42
//! ```

use program_ir::Verification;
use std::path::{Path, PathBuf};
use tensor_core::{Sampler, SamplingParams};

/// Configuration for modules and the sampler.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct RuntimeConfig {
    /// Program to open when none is given explicitly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program_path: Option<PathBuf>,
    /// Load-time verification level.
    #[serde(default)]
    pub verification: Verification,
    /// Decoding parameters.
    #[serde(default)]
    pub sampling: SamplingConfig,
}

/// The `[sampling]` table.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SamplingConfig {
    #[serde(default = "default_one")]
    pub temperature: f32,
    #[serde(default = "default_one")]
    pub top_p: f32,
    /// Fixed seed for reproducible draws; entropy-seeded when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn default_one() -> f32 {
    1.0
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            top_p: 1.0,
            seed: None,
        }
    }
}

impl SamplingConfig {
    pub fn params(&self) -> SamplingParams {
        SamplingParams {
            temperature: self.temperature,
            top_p: self.top_p,
        }
    }

    /// Builds a sampler honoring `seed`.
    pub fn sampler(&self) -> Sampler {
        match self.seed {
            Some(seed) => Sampler::seeded(seed),
            None => Sampler::from_entropy(),
        }
    }
}

impl RuntimeConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, super::RuntimeError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            super::RuntimeError::Config(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string and validates it.
    pub fn from_toml(toml_str: &str) -> Result<Self, super::RuntimeError> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| super::RuntimeError::Config(format!("TOML parse error: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, super::RuntimeError> {
        toml::to_string_pretty(self)
            .map_err(|e| super::RuntimeError::Config(format!("TOML serialise error: {e}")))
    }

    /// Checks the sampling parameters are in range.
    pub fn validate(&self) -> Result<(), super::RuntimeError> {
        self.sampling
            .params()
            .validate()
            .map_err(|e| super::RuntimeError::Config(format!("[sampling]: {e}")))
    }
}
