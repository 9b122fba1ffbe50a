// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Temperature + nucleus (top-p) sampling over a score vector.
//!
//! The decision procedure, for a score tensor of shape `[N]` or `[1, N]`:
//!
//! ```text
//! temperature == 0  ──►  argmax (first maximum wins)
//! otherwise         ──►  softmax(scores / temperature)
//!                        top_p == 1  ──►  draw from the full distribution
//!                        top_p <  1  ──►  draw from the nucleus prefix
//! ```

use super::softmax_op::softmax_in_place;
use crate::{Tensor, TensorError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cmp::Ordering;

/// Sampling knobs.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SamplingParams {
    /// Softmax temperature; `0` selects greedy argmax.
    #[serde(default = "default_one")]
    pub temperature: f32,
    /// Nucleus threshold in `(0, 1]`; `1` disables nucleus filtering.
    #[serde(default = "default_one")]
    pub top_p: f32,
}

fn default_one() -> f32 {
    1.0
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            top_p: 1.0,
        }
    }
}

impl SamplingParams {
    /// Greedy decoding.
    pub fn greedy() -> Self {
        Self {
            temperature: 0.0,
            top_p: 1.0,
        }
    }

    /// Checks `temperature >= 0` and `top_p` in `(0, 1]`.
    ///
    /// # Errors
    /// Returns [`TensorError::InvalidArgument`] otherwise (NaN included).
    pub fn validate(&self) -> Result<(), TensorError> {
        if !(self.temperature >= 0.0) {
            return Err(TensorError::InvalidArgument(format!(
                "temperature must be >= 0, got {}",
                self.temperature
            )));
        }
        if !(self.top_p > 0.0 && self.top_p <= 1.0) {
            return Err(TensorError::InvalidArgument(format!(
                "top_p must be in (0, 1], got {}",
                self.top_p
            )));
        }
        Ok(())
    }
}

/// Draws indices from score tensors using its own random source.
///
/// # Example
/// ```
/// use tensor_core::{SamplingParams, Sampler, Tensor};
///
/// let logits = Tensor::new([0.1, 0.7, 0.2]).unwrap();
/// let mut sampler = Sampler::seeded(7);
/// assert_eq!(sampler.sample(&logits, SamplingParams::greedy()).unwrap(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Sampler<R = StdRng> {
    rng: R,
}

impl Sampler<StdRng> {
    /// Creates a sampler with a deterministic seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Creates a sampler seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl<R: Rng> Sampler<R> {
    /// Creates a sampler over an existing random source.
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Samples an index from `logits`.
    ///
    /// # Errors
    /// Returns [`TensorError::InvalidArgument`] if the tensor is empty, is
    /// not shaped `[N]` or `[1, N]`, or `params` are out of range.
    pub fn sample(&mut self, logits: &Tensor, params: SamplingParams) -> Result<usize, TensorError> {
        validate_logits(logits)?;
        params.validate()?;

        let mut scores = logits.to_f32_vec();
        if params.temperature == 0.0 {
            return Ok(argmax(&scores));
        }

        for s in scores.iter_mut() {
            *s /= params.temperature;
        }
        softmax_in_place(&mut scores);

        let coin: f32 = self.rng.gen();
        if params.top_p >= 1.0 {
            Ok(sample_mult(&scores, coin))
        } else {
            Ok(sample_top_p(&scores, params.top_p, coin))
        }
    }
}

/// Samples an index from `logits` with a thread-local random source.
///
/// See [`Sampler::sample`] for the procedure and errors.
pub fn sample(logits: &Tensor, temperature: f32, top_p: f32) -> Result<usize, TensorError> {
    Sampler::with_rng(rand::thread_rng()).sample(logits, SamplingParams { temperature, top_p })
}

fn validate_logits(logits: &Tensor) -> Result<(), TensorError> {
    if logits.size() == 0 {
        return Err(TensorError::InvalidArgument("logits must not be empty".into()));
    }
    let dims = logits.shape().dims();
    let ok = match dims {
        [_] => true,
        [lead, _] => *lead == 1,
        _ => false,
    };
    if !ok {
        return Err(TensorError::InvalidArgument(format!(
            "logits must be shaped [N] or [1, N], got {}",
            logits.shape()
        )));
    }
    Ok(())
}

/// Index of the first maximum.
fn argmax(values: &[f32]) -> usize {
    let mut max_i = 0;
    let mut max_v = values[0];
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > max_v {
            max_i = i;
            max_v = v;
        }
    }
    max_i
}

/// First index whose running CDF exceeds `coin`; the last index absorbs
/// round-off.
fn sample_mult(probs: &[f32], coin: f32) -> usize {
    let mut cdf = 0.0f32;
    for (i, &p) in probs.iter().enumerate() {
        cdf += p;
        if coin < cdf {
            return i;
        }
    }
    probs.len() - 1
}

fn sample_top_p(probs: &[f32], top_p: f32, coin: f32) -> usize {
    let n = probs.len();
    if n == 1 {
        return 0;
    }

    // Candidates below the cutoff can never be part of the nucleus.
    let cutoff = (1.0 - top_p) / (n - 1) as f32;
    let mut candidates: Vec<(usize, f32)> = probs
        .iter()
        .copied()
        .enumerate()
        .filter(|&(_, p)| p >= cutoff)
        .collect();
    if candidates.is_empty() {
        return argmax(probs);
    }
    candidates.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    let mut cumulative = 0.0f32;
    let mut last = candidates.len() - 1;
    for (i, &(_, p)) in candidates.iter().enumerate() {
        cumulative += p;
        if cumulative > top_p {
            last = i;
            break;
        }
    }

    let r = coin * cumulative;
    let mut cdf = 0.0f32;
    for &(index, p) in &candidates[..=last] {
        cdf += p;
        if r < cdf {
            return index;
        }
    }
    candidates[last].0
}
