// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `pte-rt tensor` command: show how a literal is laid out as a tensor.

use anyhow::Context;
use tensor_core::{Shape, Tensor};

pub fn execute(literal: String, dtype: Option<String>, shape: Option<String>) -> anyhow::Result<()> {
    let dtype = super::parse_dtype(dtype.as_deref())?;
    let shape = shape.as_deref().map(parse_shape).transpose()?;
    let literal = super::parse_literal(&literal)?;
    let tensor = Tensor::from_literal(literal, dtype, shape)?;

    println!("  dtype:     {}", tensor.dtype());
    println!("  shape:     {}", tensor.shape());
    println!("  dim_order: {:?}", tensor.dim_order());
    println!("  strides:   {:?}", tensor.strides());
    println!("  size:      {}", tensor.size());
    println!("  itemsize:  {}", tensor.itemsize());
    println!("  nbytes:    {}", tensor.nbytes());
    println!("  bytes:     {}", super::truncate(&format!("{:?}", tensor.data()), 72));
    println!("  tolist:    {}", tensor.tolist().to_json());
    if tensor.dtype().has_native_repr() {
        let typed = tensor.to_typed_array()?;
        println!("  typed:     {}", super::truncate(&format!("{typed:?}"), 72));
    }
    if let Ok(item) = tensor.item() {
        println!("  item:      {}", item.to_json());
    }
    Ok(())
}

fn parse_shape(s: &str) -> anyhow::Result<Shape> {
    if s.trim().is_empty() {
        return Ok(Shape::scalar());
    }
    let dims = s
        .split(',')
        .map(|d| {
            d.trim()
                .parse::<usize>()
                .with_context(|| format!("invalid dimension '{d}' in shape '{s}'"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(Shape::new(dims))
}
