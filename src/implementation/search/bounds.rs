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

//! An optimistic lower bound on the reachable LUT count, used to normalize
//! the meta-search rewards. Every logic node must be absorbed by some LUT,
//! and the largest enumerated cone through a node bounds how many siblings
//! that LUT can absorb with it: summing the reciprocals can never
//! overestimate the price of covering everything.

use crate::{CutStore, NodeId, SubjectGraph};

/// Returns `ceil(sum over logic nodes v of 1 / c(v))` where `c(v)` is the
/// size of the largest enumerated cut cone containing `v`.
pub fn lower_bound(graph: &SubjectGraph, cuts: &CutStore) -> usize {
    let mut largest = vec![0usize; graph.node_num()];
    let mut cone: Vec<NodeId> = vec![];
    let mut stack: Vec<NodeId> = vec![];

    for &root in graph.logics() {
        for &cut in cuts.cuts_of(root) {
            if cuts.is_trivial(cut) {
                continue;
            }
            let leaves = cuts.leaves(cut);
            cone.clear();
            stack.clear();
            stack.push(root);
            while let Some(v) = stack.pop() {
                if leaves.binary_search(&v).is_ok() || cone.contains(&v) {
                    continue;
                }
                cone.push(v);
                for h in graph.node(v).fanins() {
                    stack.push(h.node().expect("logic fanins are never constants"));
                }
            }
            for &m in &cone {
                largest[m.0] = largest[m.0].max(cone.len());
            }
        }
    }

    let sum: f64 = graph
        .logics()
        .iter()
        .filter(|v| largest[v.0] > 0)
        .map(|v| 1.0 / largest[v.0] as f64)
        .sum();
    sum.ceil() as usize
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
