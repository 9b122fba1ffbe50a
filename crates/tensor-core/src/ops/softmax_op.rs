// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Softmax activation over a single row of scores.

/// Computes softmax in place: `x[i] = exp(x[i] - max) / sum(exp(x - max))`.
///
/// Uses the numerically stable variant that subtracts the maximum value
/// before exponentiation to prevent overflow. An empty row is left as is.
pub(crate) fn softmax_in_place(row: &mut [f32]) {
    if row.is_empty() {
        return;
    }

    // Find max for numerical stability.
    let max_val = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);

    let mut sum = 0.0f32;
    for x in row.iter_mut() {
        let e = (*x - max_val).exp();
        *x = e;
        sum += e;
    }

    if sum > 0.0 {
        let inv_sum = 1.0 / sum;
        for x in row.iter_mut() {
            *x *= inv_sum;
        }
    }
}
