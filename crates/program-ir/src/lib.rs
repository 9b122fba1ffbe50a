// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # program-ir
//!
//! Descriptors and values for exported inference programs.
//!
//! A program exposes named methods. This crate captures what a caller needs
//! to know about them without executing anything:
//!
//! - [`Tag`]: the kind of value an input or output slot holds.
//! - [`TensorInfo`]: sizes, dim order, scalar type and byte count of a
//!   tensor slot.
//! - [`MethodMeta`]: a method's slots and memory-planned buffers.
//! - [`EValue`]: the closed set of values passed to and returned from
//!   methods.
//! - [`Verification`]: how strictly a program is checked at load time.
//! - [`ProgramManifest`]: the JSON program descriptor.
//!
//! # Example
//! ```no_run
//! use program_ir::{ProgramManifest, Verification};
//! use std::path::Path;
//!
//! let manifest = ProgramManifest::from_file(Path::new("./add.json")).unwrap();
//! manifest.validate(Verification::InternalConsistency).unwrap();
//! for method in &manifest.methods {
//!     println!("  {}", method.summary());
//! }
//! ```

mod error;
mod evalue;
mod manifest;
mod method;
mod tag;
mod verification;

pub use error::ProgramError;
pub use evalue::{EValue, Scalar};
pub use manifest::ProgramManifest;
pub use method::{MethodMeta, SlotMeta, TensorInfo};
pub use tag::Tag;
pub use verification::Verification;
