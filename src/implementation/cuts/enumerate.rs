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

//! Bottom-up enumeration of all K-feasible cuts. Nodes are processed in
//! topological order; the cuts of a logic node are the pairwise merges of
//! its fanins' cuts that stay within the leaf bound, deduplicated under
//! set-equality of the leaves, plus the trivial cut. Inputs only get their
//! trivial cut. Re-enumerating with a different K simply builds a new store.

use fxhash::FxHashSet;

use crate::{CutStore, NodeId, SubjectGraph};

impl CutStore {
    /// Enumerates every cut of at most `limit` leaves for every node of
    /// `graph`. The resulting store is read-only.
    pub fn enumerate(graph: &SubjectGraph, limit: usize) -> CutStore {
        assert!(limit >= 2, "a cut bound below 2 cannot cover a binary gate");
        let mut store = CutStore::with_node_count(graph.node_num(), limit);

        for &input in graph.inputs() {
            store.add_trivial(input);
        }

        let mut seen: FxHashSet<Vec<NodeId>> = FxHashSet::default();
        let mut found: Vec<Vec<NodeId>> = vec![];
        for &v in graph.logics() {
            let [ha, hb] = graph.node(v).fanins();
            let a = ha.node().expect("logic fanins are never constants");
            let b = hb.node().expect("logic fanins are never constants");

            seen.clear();
            found.clear();
            for &ca in store.cuts_of(a) {
                for &cb in store.cuts_of(b) {
                    if let Some(leaves) = merge_leaves(store.leaves(ca), store.leaves(cb), limit) {
                        if seen.insert(leaves.clone()) {
                            found.push(leaves);
                        }
                    }
                }
            }
            // same-size cuts keep their discovery order
            found.sort_by_key(|leaves| leaves.len());
            for leaves in found.drain(..) {
                store.add_cut(v, &leaves);
            }
            store.add_trivial(v);
        }
        store
    }
}

/// Merges two sorted leaf lists, counting shared leaves once. Returns `None`
/// as soon as the merge exceeds `limit` leaves.
fn merge_leaves(x: &[NodeId], y: &[NodeId], limit: usize) -> Option<Vec<NodeId>> {
    let mut out = Vec::with_capacity(limit);
    let (mut i, mut j) = (0, 0);
    while i < x.len() || j < y.len() {
        let next = if j == y.len() || (i < x.len() && x[i] < y[j]) {
            i += 1;
            x[i - 1]
        } else if i == x.len() || y[j] < x[i] {
            j += 1;
            y[j - 1]
        } else {
            i += 1;
            j += 1;
            x[i - 1]
        };
        if out.len() == limit {
            return None;
        }
        out.push(next);
    }
    Some(out)
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
