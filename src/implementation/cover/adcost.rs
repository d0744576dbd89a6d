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

//! The per-node (depth, area) Pareto front used by the delay-mode covering.
//! The front is kept ordered with the deepest (hence cheapest) point first,
//! so the backward selection pass returns the first point meeting a depth
//! requirement and gets the minimum feasible area for free.

use crate::CutId;

/// One point of a node's Pareto front: realizing the node with `cut` takes
/// `depth` levels and `area` weighted LUTs. Inputs carry a single point with
/// no cut at all.
#[derive(Copy, Clone, Debug)]
pub struct AdCost {
    pub cut: Option<CutId>,
    pub depth: usize,
    pub area: f64,
}

/// A Pareto front of `AdCost` points: no point dominates another in
/// (depth ≤, area ≤) with at least one strict inequality; points with equal
/// depth keep the smaller area only.
#[derive(Clone, Debug, Default)]
pub struct AdCostList {
    items: Vec<AdCost>,
}

impl AdCostList {
    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// The points, deepest first.
    pub fn iter(&self) -> std::slice::Iter<'_, AdCost> {
        self.items.iter()
    }

    pub fn get(&self, i: usize) -> &AdCost {
        &self.items[i]
    }

    /// Inserts a candidate point, unless some present point is at least as
    /// good on both axes; points the candidate renders useless are dropped.
    pub fn insert(&mut self, cut: Option<CutId>, depth: usize, area: f64) {
        let mut i = 0;
        while i < self.items.len() {
            let cur = self.items[i];
            if cur.depth > depth {
                if cur.area >= area {
                    // deeper and not cheaper: useless
                    self.items.remove(i);
                } else {
                    i += 1;
                }
            } else if cur.depth == depth {
                if cur.area > area {
                    self.items[i] = AdCost { cut, depth, area };
                }
                return;
            } else {
                // cur.depth < depth
                if cur.area > area {
                    self.items.insert(i, AdCost { cut, depth, area });
                }
                return;
            }
        }
        self.items.push(AdCost { cut, depth, area });
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
