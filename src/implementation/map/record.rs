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

//! A mapping solution: one chosen cut per node. The record is nothing but an
//! id-indexed array of cut ids, so copying it (to snapshot the incumbent of
//! a meta-search, say) is cheap.

use crate::{CutId, NodeId, SubjectGraph};

/// The solution of one covering attempt. Constructed fresh per attempt.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MapRecord {
    cuts: Vec<Option<CutId>>,
}

impl MapRecord {
    pub fn new() -> Self {
        Default::default()
    }

    /// Re-initializes the record for `graph`: every node unmapped.
    pub fn init(&mut self, graph: &SubjectGraph) {
        self.cuts.clear();
        self.cuts.resize(graph.node_num(), None);
    }

    pub fn set_cut(&mut self, node: NodeId, cut: CutId) {
        self.cuts[node.0] = Some(cut);
    }

    pub fn clear_cut(&mut self, node: NodeId) {
        self.cuts[node.0] = None;
    }

    /// The cut chosen for `node`, if any.
    pub fn cut(&self, node: NodeId) -> Option<CutId> {
        self.cuts[node.0]
    }
}
