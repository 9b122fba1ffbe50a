// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Method descriptors: what a method takes, what it returns, and how much
//! planned memory it needs.
//!
//! A [`MethodMeta`] is produced once per successful program load and is
//! read-only afterward. Slot queries never default: an index past the end,
//! or a tensor query on a non-tensor slot, is [`ProgramError::NotFound`].

use crate::{ProgramError, Tag, Verification};
use tensor_core::{shape, ScalarType, Shape};

// ── TensorInfo ─────────────────────────────────────────────────────

/// Static description of a tensor slot.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TensorInfo {
    /// Dimension sizes.
    pub sizes: Vec<usize>,
    /// Axis permutation, outermost first. Identity when omitted.
    #[serde(default)]
    pub dim_order: Vec<usize>,
    /// Element type.
    pub scalar_type: ScalarType,
    /// Whether the runtime pre-allocates this tensor's storage.
    #[serde(default)]
    pub is_memory_planned: bool,
    /// Storage size in bytes.
    pub nbytes: usize,
}

impl TensorInfo {
    /// Creates a contiguous descriptor with `nbytes` derived from the sizes.
    pub fn new(sizes: impl Into<Vec<usize>>, scalar_type: ScalarType) -> Self {
        let sizes = sizes.into();
        let nbytes = Shape::new(sizes.clone()).size_bytes(scalar_type);
        Self {
            dim_order: shape::identity_dim_order(sizes.len()),
            sizes,
            scalar_type,
            is_memory_planned: false,
            nbytes,
        }
    }

    /// Marks the tensor as memory-planned.
    pub fn memory_planned(mut self) -> Self {
        self.is_memory_planned = true;
        self
    }

    pub fn shape(&self) -> Shape {
        Shape::new(self.sizes.clone())
    }

    /// The declared dim order, or the identity if none was declared.
    pub fn resolved_dim_order(&self) -> Vec<usize> {
        if self.dim_order.is_empty() {
            shape::identity_dim_order(self.sizes.len())
        } else {
            self.dim_order.clone()
        }
    }

    /// Cross-checks the dim order and byte count against the sizes.
    fn check_consistency(&self) -> Result<(), String> {
        if !self.dim_order.is_empty() {
            shape::validate_dim_order(&self.dim_order, self.sizes.len())
                .map_err(|e| e.to_string())?;
        }
        let expected = self
            .shape()
            .checked_size_bytes(self.scalar_type)
            .ok_or_else(|| format!("sizes {:?} overflow the address space", self.sizes))?;
        if self.nbytes != expected {
            return Err(format!(
                "nbytes {} does not match {} x {} ({expected} bytes)",
                self.nbytes,
                self.shape(),
                self.scalar_type,
            ));
        }
        Ok(())
    }
}

// ── SlotMeta ───────────────────────────────────────────────────────

/// One input or output position of a method.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SlotMeta {
    pub tag: Tag,
    /// Present exactly when `tag` is [`Tag::Tensor`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tensor: Option<TensorInfo>,
}

impl SlotMeta {
    pub fn tensor(info: TensorInfo) -> Self {
        Self {
            tag: Tag::Tensor,
            tensor: Some(info),
        }
    }

    /// A non-tensor slot.
    pub fn value(tag: Tag) -> Self {
        Self { tag, tensor: None }
    }
}

impl std::fmt::Display for SlotMeta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.tensor {
            Some(info) => write!(
                f,
                "tensor<{}>{}{}",
                info.scalar_type,
                info.shape(),
                if info.is_memory_planned { " planned" } else { "" }
            ),
            None => f.write_str(self.tag.as_str()),
        }
    }
}

// ── MethodMeta ─────────────────────────────────────────────────────

/// Descriptor of one callable method in a loaded program.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MethodMeta {
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<SlotMeta>,
    #[serde(default)]
    pub outputs: Vec<SlotMeta>,
    /// Sizes in bytes of the method's memory-planned buffers.
    #[serde(default)]
    pub memory_planned_buffers: Vec<usize>,
}

impl MethodMeta {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            memory_planned_buffers: Vec::new(),
        }
    }

    /// Appends an input slot.
    pub fn with_input(mut self, slot: SlotMeta) -> Self {
        self.inputs.push(slot);
        self
    }

    /// Appends an output slot.
    pub fn with_output(mut self, slot: SlotMeta) -> Self {
        self.outputs.push(slot);
        self
    }

    /// Appends a memory-planned buffer of `nbytes`.
    pub fn with_planned_buffer(mut self, nbytes: usize) -> Self {
        self.memory_planned_buffers.push(nbytes);
        self
    }

    pub fn num_inputs(&self) -> usize {
        self.inputs.len()
    }

    pub fn num_outputs(&self) -> usize {
        self.outputs.len()
    }

    pub fn num_memory_planned_buffers(&self) -> usize {
        self.memory_planned_buffers.len()
    }

    pub fn input_tag(&self, index: usize) -> Result<Tag, ProgramError> {
        self.input_slot(index).map(|s| s.tag)
    }

    pub fn output_tag(&self, index: usize) -> Result<Tag, ProgramError> {
        self.output_slot(index).map(|s| s.tag)
    }

    /// Tensor descriptor of input `index`.
    ///
    /// # Errors
    /// [`ProgramError::NotFound`] if the index is out of range or the slot
    /// does not hold a tensor.
    pub fn input_tensor_meta(&self, index: usize) -> Result<&TensorInfo, ProgramError> {
        let slot = self.input_slot(index)?;
        self.tensor_info(slot, "input", index)
    }

    /// Tensor descriptor of output `index`. Errors as
    /// [`input_tensor_meta`](Self::input_tensor_meta).
    pub fn output_tensor_meta(&self, index: usize) -> Result<&TensorInfo, ProgramError> {
        let slot = self.output_slot(index)?;
        self.tensor_info(slot, "output", index)
    }

    pub fn memory_planned_buffer_size(&self, index: usize) -> Result<usize, ProgramError> {
        self.memory_planned_buffers.get(index).copied().ok_or_else(|| {
            ProgramError::NotFound(format!(
                "memory-planned buffer {index} of method '{}' ({} buffers)",
                self.name,
                self.memory_planned_buffers.len()
            ))
        })
    }

    pub fn input_slot(&self, index: usize) -> Result<&SlotMeta, ProgramError> {
        self.inputs.get(index).ok_or_else(|| self.missing_slot("input", index, self.inputs.len()))
    }

    pub fn output_slot(&self, index: usize) -> Result<&SlotMeta, ProgramError> {
        self.outputs
            .get(index)
            .ok_or_else(|| self.missing_slot("output", index, self.outputs.len()))
    }

    /// Checks this descriptor at the given verification level.
    ///
    /// # Checks
    /// - Minimal: every tensor slot carries a [`TensorInfo`] and no
    ///   non-tensor slot does.
    /// - Internal consistency: additionally, dim orders are permutations
    ///   and `nbytes` matches the sizes and scalar type.
    pub fn validate(&self, verification: Verification) -> Result<(), String> {
        let slots = self
            .inputs
            .iter()
            .enumerate()
            .map(|(i, s)| ("input", i, s))
            .chain(self.outputs.iter().enumerate().map(|(i, s)| ("output", i, s)));

        for (kind, index, slot) in slots {
            match (slot.tag, &slot.tensor) {
                (Tag::Tensor, None) => {
                    return Err(format!("{kind} {index} is a tensor slot without tensor info"));
                }
                (tag, Some(_)) if tag != Tag::Tensor => {
                    return Err(format!("{kind} {index} carries tensor info but is tagged {tag}"));
                }
                (_, Some(info)) if verification == Verification::InternalConsistency => {
                    info.check_consistency()
                        .map_err(|detail| format!("{kind} {index}: {detail}"))?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn tensor_info<'a>(
        &self,
        slot: &'a SlotMeta,
        kind: &str,
        index: usize,
    ) -> Result<&'a TensorInfo, ProgramError> {
        slot.tensor.as_ref().ok_or_else(|| {
            ProgramError::NotFound(format!(
                "{kind} {index} of method '{}' is {}, not a tensor",
                self.name, slot.tag
            ))
        })
    }

    fn missing_slot(&self, kind: &str, index: usize, len: usize) -> ProgramError {
        ProgramError::NotFound(format!(
            "{kind} {index} of method '{}' ({len} {kind}s)",
            self.name
        ))
    }

    /// One-line summary for logs and the CLI.
    pub fn summary(&self) -> String {
        let join = |slots: &[SlotMeta]| {
            slots.iter().map(|s| s.to_string()).collect::<Vec<_>>().join(", ")
        };
        format!(
            "{}({}) -> ({}) [{} planned buffers, {} bytes]",
            self.name,
            join(&self.inputs),
            join(&self.outputs),
            self.memory_planned_buffers.len(),
            self.memory_planned_buffers.iter().sum::<usize>(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forward() -> MethodMeta {
        MethodMeta::new("forward")
            .with_input(SlotMeta::tensor(TensorInfo::new([1, 3], ScalarType::Float32)))
            .with_input(SlotMeta::value(Tag::Int))
            .with_output(SlotMeta::tensor(
                TensorInfo::new([1, 8], ScalarType::Float32).memory_planned(),
            ))
            .with_planned_buffer(4096)
    }

    #[test]
    fn test_tensor_info_new() {
        let info = TensorInfo::new([2, 3], ScalarType::Int16);
        assert_eq!(info.nbytes, 12);
        assert_eq!(info.dim_order, vec![0, 1]);
        assert!(!info.is_memory_planned);
    }

    #[test]
    fn test_slot_queries() {
        let m = forward();
        assert_eq!(m.num_inputs(), 2);
        assert_eq!(m.num_outputs(), 1);
        assert_eq!(m.input_tag(0).unwrap(), Tag::Tensor);
        assert_eq!(m.input_tag(1).unwrap(), Tag::Int);
        assert_eq!(m.output_tag(0).unwrap(), Tag::Tensor);
        assert_eq!(m.input_tensor_meta(0).unwrap().sizes, vec![1, 3]);
        assert!(m.output_tensor_meta(0).unwrap().is_memory_planned);
        assert_eq!(m.memory_planned_buffer_size(0).unwrap(), 4096);
    }

    #[test]
    fn test_out_of_range_is_not_found() {
        let m = forward();
        assert!(matches!(m.input_tag(2), Err(ProgramError::NotFound(_))));
        assert!(matches!(m.output_tag(1), Err(ProgramError::NotFound(_))));
        assert!(matches!(m.output_tensor_meta(5), Err(ProgramError::NotFound(_))));
        assert!(matches!(m.memory_planned_buffer_size(1), Err(ProgramError::NotFound(_))));
    }

    #[test]
    fn test_tensor_query_on_value_slot() {
        let err = forward().input_tensor_meta(1).unwrap_err();
        assert!(matches!(err, ProgramError::NotFound(ref msg) if msg.contains("int")));
    }

    #[test]
    fn test_validate_minimal() {
        assert!(forward().validate(Verification::Minimal).is_ok());

        let missing = MethodMeta::new("bad").with_input(SlotMeta::value(Tag::Tensor));
        assert!(missing.validate(Verification::Minimal).is_err());

        let stray = MethodMeta::new("bad").with_output(SlotMeta {
            tag: Tag::Int,
            tensor: Some(TensorInfo::new([1], ScalarType::Int64)),
        });
        assert!(stray.validate(Verification::Minimal).is_err());
    }

    #[test]
    fn test_validate_internal_consistency() {
        let mut info = TensorInfo::new([2, 2], ScalarType::Float32);
        info.nbytes = 15;
        let m = MethodMeta::new("bad").with_input(SlotMeta::tensor(info));
        assert!(m.validate(Verification::Minimal).is_ok());
        assert!(m.validate(Verification::InternalConsistency).is_err());

        let mut info = TensorInfo::new([2, 2], ScalarType::Float32);
        info.dim_order = vec![1, 1];
        let m = MethodMeta::new("bad").with_input(SlotMeta::tensor(info));
        assert!(m.validate(Verification::InternalConsistency).is_err());

        let huge = TensorInfo::new([usize::MAX / 2 + 1, 2], ScalarType::Float32);
        assert_eq!(huge.nbytes, usize::MAX);
        let m = MethodMeta::new("huge").with_output(SlotMeta::tensor(huge));
        assert!(m.validate(Verification::InternalConsistency).is_err());
    }

    #[test]
    fn test_summary() {
        let s = forward().summary();
        assert!(s.starts_with("forward(tensor<float32>"));
        assert!(s.contains("4096 bytes"));
    }
}
