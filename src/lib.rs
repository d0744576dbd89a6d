// Copyright 2020 Xavier Gillard
//
// Permission is hereby granted, free of charge, to any person obtaining a copy of
// this software and associated documentation files (the "Software"), to deal in
// the Software without restriction, including without limitation the rights to
// use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of
// the Software, and to permit persons to whom the Software is furnished to do so,
// subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS
// FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR
// COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER
// IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
// CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! # LUTMAP
//! LUTMAP maps a network of two-input gates onto K-input lookup tables,
//! minimizing either the LUT count (area) or the logic depth (delay). It is
//! the classic cut-based flow: enumerate every K-feasible cut of every
//! node, pick one cut per node so that the outputs are covered at minimum
//! cost, then locally improve the choice by cut resubstitution. On top of
//! the greedy covering, two meta-search drivers (a Monte-Carlo tree search
//! and a simulated annealing) explore which multi-fanout nodes should be
//! forced to become LUT outputs, re-running the area covering for each
//! candidate split and keeping the best mapping seen.
//!
//! ## Quick Example
//! The typical interaction goes through the `LutMapper` facade: build a
//! `BoolNetwork`, configure `MapParams`, and map.
//!
//! ```
//! use lutmap::*;
//!
//! // y = (a & b) & c
//! let mut bn = BoolNetwork::new("demo");
//! let a = bn.new_input();
//! let b = bn.new_input();
//! let c = bn.new_input();
//! let t = bn.new_logic(BnNodeType::And, vec![a, b]);
//! let y = bn.new_logic(BnNodeType::And, vec![t, c]);
//! bn.add_output(y);
//!
//! let params = MapParamsBuilder::default()
//!     .cut_size(3)
//!     .flow_policy(FlowPolicy::Flow)
//!     .build()
//!     .unwrap();
//! let outcome = LutMapper::new(params).map(&bn).unwrap();
//!
//! // a 3-input AND fits in one 3-LUT
//! assert_eq!(1, outcome.lut_num);
//! assert_eq!(1, outcome.depth);
//! ```
//!
//! The individual pipeline stages (`CutStore::enumerate`, `AreaCover`,
//! `DelayCover`, `CutResub`, `MctSearch`, `SaSearch`, `MapGen`, `MapEst`)
//! are all public, so a client willing to orchestrate its own flow (say,
//! re-covering the same cut store under many boundary sets) can do so
//! without paying the enumeration again.

mod abstraction;
mod common;
mod implementation;
#[cfg(test)]
mod test_utils;

pub use abstraction::*;
pub use common::*;
pub use implementation::*;
