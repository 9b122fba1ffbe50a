// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Value kinds carried by method input and output slots.

/// The kind of value a method slot holds.
///
/// Discriminants are the numeric codes used by exported programs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Tag {
    None = 0,
    Tensor = 1,
    String = 2,
    Double = 3,
    Int = 4,
    Bool = 5,
    ListBool = 6,
    ListDouble = 7,
    ListInt = 8,
    ListTensor = 9,
    ListScalar = 10,
    ListOptionalTensor = 11,
}

impl Tag {
    /// Every tag, ordered by numeric code.
    pub const ALL: [Tag; 12] = [
        Tag::None,
        Tag::Tensor,
        Tag::String,
        Tag::Double,
        Tag::Int,
        Tag::Bool,
        Tag::ListBool,
        Tag::ListDouble,
        Tag::ListInt,
        Tag::ListTensor,
        Tag::ListScalar,
        Tag::ListOptionalTensor,
    ];

    /// Returns the numeric code of this tag.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Looks up a tag by numeric code.
    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    /// Parses a tag from a manifest string.
    ///
    /// Accepts snake_case (`"list_int"`) and compact forms (`"listint"`,
    /// `"int_list"`).
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "none" | "null" => Some(Self::None),
            "tensor" => Some(Self::Tensor),
            "string" | "str" => Some(Self::String),
            "double" | "float" => Some(Self::Double),
            "int" | "integer" => Some(Self::Int),
            "bool" | "boolean" => Some(Self::Bool),
            "list_bool" | "listbool" | "bool_list" => Some(Self::ListBool),
            "list_double" | "listdouble" | "double_list" => Some(Self::ListDouble),
            "list_int" | "listint" | "int_list" => Some(Self::ListInt),
            "list_tensor" | "listtensor" | "tensor_list" => Some(Self::ListTensor),
            "list_scalar" | "listscalar" | "scalar_list" => Some(Self::ListScalar),
            "list_optional_tensor" | "listoptionaltensor" => Some(Self::ListOptionalTensor),
            _ => None,
        }
    }

    /// Returns the snake_case label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Tensor => "tensor",
            Self::String => "string",
            Self::Double => "double",
            Self::Int => "int",
            Self::Bool => "bool",
            Self::ListBool => "list_bool",
            Self::ListDouble => "list_double",
            Self::ListInt => "list_int",
            Self::ListTensor => "list_tensor",
            Self::ListScalar => "list_scalar",
            Self::ListOptionalTensor => "list_optional_tensor",
        }
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_positional() {
        for (i, tag) in Tag::ALL.iter().enumerate() {
            assert_eq!(tag.code() as usize, i);
            assert_eq!(Tag::from_code(i as u32), Some(*tag));
        }
        assert_eq!(Tag::from_code(12), None);
    }

    #[test]
    fn test_from_str_loose() {
        assert_eq!(Tag::from_str_loose("Tensor"), Some(Tag::Tensor));
        assert_eq!(Tag::from_str_loose("int_list"), Some(Tag::ListInt));
        assert_eq!(Tag::from_str_loose("quaternion"), None);
        for tag in Tag::ALL {
            assert_eq!(Tag::from_str_loose(tag.as_str()), Some(tag));
        }
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&Tag::ListOptionalTensor).unwrap();
        assert_eq!(json, "\"list_optional_tensor\"");
        let tag: Tag = serde_json::from_str("\"double\"").unwrap();
        assert_eq!(tag, Tag::Double);
    }
}
