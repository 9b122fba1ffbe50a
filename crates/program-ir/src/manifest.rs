// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! JSON program manifest parsing.
//!
//! The manifest describes every method a program exposes: its input and
//! output slots and its memory-planned buffers.
//!
//! # Format
//! ```json
//! {
//!   "name": "add",
//!   "methods": [
//!     {
//!       "name": "forward",
//!       "inputs": [
//!         { "tag": "tensor", "tensor": {
//!             "sizes": [1], "dim_order": [0], "scalar_type": "float32",
//!             "is_memory_planned": true, "nbytes": 4 } },
//!         { "tag": "int" }
//!       ],
//!       "outputs": [ ... ],
//!       "memory_planned_buffers": [48]
//!     }
//!   ]
//! }
//! ```

use crate::{MethodMeta, ProgramError, Verification};
use std::collections::HashSet;
use std::path::Path;

/// Top-level program manifest.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProgramManifest {
    /// Human-readable program name.
    #[serde(default = "default_name")]
    pub name: String,
    /// Method descriptors, in declaration order.
    pub methods: Vec<MethodMeta>,
}

fn default_name() -> String {
    "program".to_string()
}

impl ProgramManifest {
    pub fn new(name: impl Into<String>, methods: Vec<MethodMeta>) -> Self {
        Self {
            name: name.into(),
            methods,
        }
    }

    /// Loads a manifest from a JSON file path.
    pub fn from_file(path: &Path) -> Result<Self, ProgramError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parses a manifest from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ProgramError> {
        let manifest: Self = serde_json::from_str(json)?;
        Ok(manifest)
    }

    /// Parses a manifest from raw bytes (e.g. a memory map).
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ProgramError> {
        let manifest: Self = serde_json::from_slice(bytes)?;
        Ok(manifest)
    }

    pub fn to_json(&self) -> Result<String, ProgramError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validates the manifest at the given verification level.
    ///
    /// Checks:
    /// - At least one method is defined.
    /// - Method names are non-empty and unique.
    /// - Every method passes [`MethodMeta::validate`].
    pub fn validate(&self, verification: Verification) -> Result<(), ProgramError> {
        if self.methods.is_empty() {
            return Err(self.invalid("manifest declares no methods".into()));
        }

        let mut seen = HashSet::new();
        for method in &self.methods {
            if method.name.is_empty() {
                return Err(self.invalid("method with empty name".into()));
            }
            if !seen.insert(method.name.as_str()) {
                return Err(self.invalid(format!("duplicate method '{}'", method.name)));
            }
            method
                .validate(verification)
                .map_err(|detail| self.invalid(format!("method '{}': {detail}", method.name)))?;

            if method.memory_planned_buffers.is_empty()
                && method
                    .inputs
                    .iter()
                    .chain(&method.outputs)
                    .any(|s| s.tensor.as_ref().is_some_and(|t| t.is_memory_planned))
            {
                tracing::warn!(
                    "method '{}' has memory-planned tensors but declares no planned buffers",
                    method.name,
                );
            }
        }

        Ok(())
    }

    pub fn method_names(&self) -> Vec<String> {
        self.methods.iter().map(|m| m.name.clone()).collect()
    }

    /// Looks up a method by name.
    pub fn method(&self, name: &str) -> Result<&MethodMeta, ProgramError> {
        self.methods
            .iter()
            .find(|m| m.name == name)
            .ok_or_else(|| ProgramError::NotFound(format!("method '{name}' in '{}'", self.name)))
    }

    fn invalid(&self, detail: String) -> ProgramError {
        ProgramError::InvalidProgram {
            program: self.name.clone(),
            detail,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tag;
    use tensor_core::ScalarType;

    fn sample_manifest_json() -> &'static str {
        r#"{
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
                    "inputs": [
                        { "tag": "tensor", "tensor": {
                            "sizes": [2, 3], "scalar_type": "bf16", "nbytes": 12 } }
                    ],
                    "outputs": [
                        { "tag": "tensor", "tensor": {
                            "sizes": [3], "scalar_type": "bf16", "nbytes": 6 } },
                        { "tag": "tensor", "tensor": {
                            "sizes": [3], "scalar_type": "bf16", "nbytes": 6 } },
                        { "tag": "int" }
                    ]
                }
            ]
        }"#
    }

    #[test]
    fn test_parse_manifest() {
        let m = ProgramManifest::from_json(sample_manifest_json()).unwrap();
        assert_eq!(m.name, "add_mul");
        assert_eq!(m.method_names(), vec!["forward", "split"]);

        let split = m.method("split").unwrap();
        assert_eq!(split.num_outputs(), 3);
        assert_eq!(split.output_tag(2).unwrap(), Tag::Int);
        assert_eq!(
            split.input_tensor_meta(0).unwrap().scalar_type,
            ScalarType::BFloat16
        );
        assert!(split.input_tensor_meta(0).unwrap().dim_order.is_empty());
    }

    #[test]
    fn test_validate_ok() {
        let m = ProgramManifest::from_json(sample_manifest_json()).unwrap();
        m.validate(Verification::Minimal).unwrap();
        m.validate(Verification::InternalConsistency).unwrap();
    }

    #[test]
    fn test_from_slice() {
        let m = ProgramManifest::from_slice(sample_manifest_json().as_bytes()).unwrap();
        assert_eq!(m.methods.len(), 2);
    }

    #[test]
    fn test_validate_empty_methods() {
        let m = ProgramManifest::from_json(r#"{ "name": "empty", "methods": [] }"#).unwrap();
        assert!(matches!(
            m.validate(Verification::Minimal),
            Err(ProgramError::InvalidProgram { .. })
        ));
    }

    #[test]
    fn test_validate_duplicate_names() {
        let json = r#"{
            "methods": [ { "name": "forward" }, { "name": "forward" } ]
        }"#;
        let m = ProgramManifest::from_json(json).unwrap();
        assert_eq!(m.name, "program");
        assert!(m.validate(Verification::Minimal).is_err());
    }

    #[test]
    fn test_validate_inconsistent_nbytes() {
        let json = r#"{
            "name": "bad",
            "methods": [ { "name": "forward", "inputs": [
                { "tag": "tensor", "tensor": { "sizes": [4], "scalar_type": "int64", "nbytes": 8 } }
            ] } ]
        }"#;
        let m = ProgramManifest::from_json(json).unwrap();
        assert!(m.validate(Verification::Minimal).is_ok());
        assert!(m.validate(Verification::InternalConsistency).is_err());
    }

    #[test]
    fn test_unknown_method() {
        let m = ProgramManifest::from_json(sample_manifest_json()).unwrap();
        assert!(matches!(m.method("backward"), Err(ProgramError::NotFound(_))));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            ProgramManifest::from_json("{ \"methods\": 3 }"),
            Err(ProgramError::ManifestParseError(_))
        ));
    }

    #[test]
    fn test_serde_roundtrip() {
        let m = ProgramManifest::from_json(sample_manifest_json()).unwrap();
        let back = ProgramManifest::from_json(&m.to_json().unwrap()).unwrap();
        assert_eq!(back, m);
    }
}
