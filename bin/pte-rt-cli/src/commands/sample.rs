// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `pte-rt sample` command: pick an index from logits.

use runtime::RuntimeConfig;
use tensor_core::Tensor;

pub fn execute(
    config: &RuntimeConfig,
    logits: String,
    temperature: Option<f32>,
    top_p: Option<f32>,
    seed: Option<u64>,
    dtype: Option<String>,
) -> anyhow::Result<()> {
    let dtype = super::parse_dtype(dtype.as_deref())?;
    let literal = super::parse_literal(&logits)?;
    let tensor = Tensor::from_literal(literal, dtype, None)?;

    // Flags override the [sampling] table.
    let mut sampling = config.sampling.clone();
    if let Some(t) = temperature {
        sampling.temperature = t;
    }
    if let Some(p) = top_p {
        sampling.top_p = p;
    }
    if seed.is_some() {
        sampling.seed = seed;
    }

    let params = sampling.params();
    let index = sampling.sampler().sample(&tensor, params)?;
    tracing::info!(
        "sampled {index} from {} {} logits (temperature {}, top_p {})",
        tensor.size(),
        tensor.dtype(),
        params.temperature,
        params.top_p,
    );
    println!("{index}");
    Ok(())
}
