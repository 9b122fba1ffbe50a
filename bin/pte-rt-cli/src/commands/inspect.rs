// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `pte-rt inspect` command: display a program's methods.
//!
//! Loads the program at the configured verification level and prints each
//! method's input and output slots and memory-planned buffers.

use program_ir::SlotMeta;
use runtime::{Module, RuntimeConfig, SyntheticEngine};
use std::path::PathBuf;

pub async fn execute(config: &RuntimeConfig, program: Option<PathBuf>) -> anyhow::Result<()> {
    let path = super::resolve_program(program, config)?;

    println!("╔══════════════════════════════════════════════════════╗");
    println!("║              pte-rt · Program Inspector              ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    let mut module = Module::<SyntheticEngine>::from_path(&path)
        .map_err(|e| anyhow::anyhow!("failed to open '{}': {e}", path.display()))?
        .with_config(config);
    module.load_async().await?;

    let methods = module.methods()?;

    // ── Summary ────────────────────────────────────────────────
    println!("  Program:      {}", path.display());
    println!("  Verification: {}", module.verification());
    println!("  Methods:      {}", methods.len());
    println!();

    // ── Per-Method Detail ──────────────────────────────────────
    for meta in &methods {
        println!("  {}", meta.name);
        print_slots("in ", &meta.inputs);
        print_slots("out", &meta.outputs);
        if meta.memory_planned_buffers.is_empty() {
            println!("    planned buffers: none");
        } else {
            let total: usize = meta.memory_planned_buffers.iter().sum();
            println!(
                "    planned buffers: {:?} ({:.1} KB total)",
                meta.memory_planned_buffers,
                total as f64 / 1024.0,
            );
        }
        println!();
    }

    Ok(())
}

fn print_slots(label: &str, slots: &[SlotMeta]) {
    if slots.is_empty() {
        println!("    {label} -");
        return;
    }
    for (i, slot) in slots.iter().enumerate() {
        match &slot.tensor {
            Some(info) => println!(
                "    {label} [{i}] {:<8} {:<9} {:<14} order {:?}  {} B{}",
                slot.tag.as_str(),
                info.scalar_type.as_str(),
                super::truncate(&info.shape().to_string(), 14),
                info.resolved_dim_order(),
                info.nbytes,
                if info.is_memory_planned { "  planned" } else { "" },
            ),
            None => println!("    {label} [{i}] {}", slot.tag.as_str()),
        }
    }
}
