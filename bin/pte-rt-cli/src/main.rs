// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # pte-rt
//!
//! Command-line interface for inspecting and invoking exported programs.
//!
//! ## Usage
//! ```bash
//! # List methods and their slots
//! pte-rt inspect --program ./programs/add.json
//!
//! # Call a method with JSON literals as inputs
//! pte-rt run --program ./programs/add.json --method forward --input '[1.0]' --input '[2.0]'
//!
//! # Sample an index from logits
//! pte-rt sample --logits '[0.1, 0.7, 0.2]' --temperature 0.8 --top-p 0.9 --seed 42
//!
//! # Show how a literal becomes a tensor
//! pte-rt tensor --literal '[[1, 2, 3]]' --dtype bf16
//! ```

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "pte-rt",
    about = "Inspect and invoke exported inference programs",
    version,
    author
)]
struct Cli {
    /// Path to a TOML configuration file (explicit flags take precedence).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a program and print every method's inputs, outputs and buffers.
    Inspect {
        /// Path to the program manifest (defaults to `program_path` from the config).
        #[arg(short, long)]
        program: Option<PathBuf>,
    },

    /// Call a method with inputs given as JSON literals.
    Run {
        /// Path to the program manifest (defaults to `program_path` from the config).
        #[arg(short, long)]
        program: Option<PathBuf>,

        /// Method to call.
        #[arg(short, long, default_value = "forward")]
        method: String,

        /// One JSON literal per method input, in order.
        #[arg(short, long = "input")]
        inputs: Vec<String>,

        /// Element type for tensor inputs (defaults to each slot's declared type).
        #[arg(short, long)]
        dtype: Option<String>,
    },

    /// Pick an index from a logits vector.
    Sample {
        /// Logits as a JSON array, shaped [N] or [1, N].
        #[arg(short, long)]
        logits: String,

        /// Softmax temperature; 0 selects the maximum.
        #[arg(short, long)]
        temperature: Option<f32>,

        /// Nucleus threshold in (0, 1].
        #[arg(long)]
        top_p: Option<f32>,

        /// Seed for reproducible draws.
        #[arg(short, long)]
        seed: Option<u64>,

        /// Element type the logits are encoded as.
        #[arg(short, long)]
        dtype: Option<String>,
    },

    /// Build a tensor from a JSON literal and print its properties.
    Tensor {
        /// Nested JSON array, number or boolean.
        #[arg(short, long)]
        literal: String,

        /// Element type (inferred from the literal when omitted).
        #[arg(short, long)]
        dtype: Option<String>,

        /// Comma-separated shape, e.g. "2,3" (inferred when omitted).
        #[arg(short, long)]
        shape: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing/logging based on verbosity.
    commands::init_tracing(cli.verbose);

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Inspect { program } => commands::inspect::execute(&config, program).await,
        Commands::Run {
            program,
            method,
            inputs,
            dtype,
        } => commands::run::execute(&config, program, method, inputs, dtype).await,
        Commands::Sample {
            logits,
            temperature,
            top_p,
            seed,
            dtype,
        } => commands::sample::execute(&config, logits, temperature, top_p, seed, dtype),
        Commands::Tensor {
            literal,
            dtype,
            shape,
        } => commands::tensor::execute(literal, dtype, shape),
    }
}
