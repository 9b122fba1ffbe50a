// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

/// How thoroughly a program is checked when it is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Verification {
    /// Structural checks only.
    #[default]
    Minimal,
    /// Structural checks plus cross-checks between descriptor fields.
    InternalConsistency,
}

impl Verification {
    /// Parses `"minimal"` or `"internal-consistency"` (underscores accepted).
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "minimal" => Some(Self::Minimal),
            "internal-consistency" | "internalconsistency" => Some(Self::InternalConsistency),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Minimal => "minimal",
            Self::InternalConsistency => "internal-consistency",
        }
    }
}

impl std::fmt::Display for Verification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_minimal() {
        assert_eq!(Verification::default(), Verification::Minimal);
    }

    #[test]
    fn test_parse() {
        assert_eq!(
            Verification::from_str_loose("internal_consistency"),
            Some(Verification::InternalConsistency)
        );
        assert_eq!(Verification::from_str_loose("Minimal"), Some(Verification::Minimal));
        assert_eq!(Verification::from_str_loose("paranoid"), None);
        let v: Verification = serde_json::from_str("\"internal-consistency\"").unwrap();
        assert_eq!(v, Verification::InternalConsistency);
    }
}
