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

//! This module defines the seam between the mapping pipeline and the DAG
//! covering heuristics. A covering heuristic consumes the subject graph and
//! the enumerated cuts, and records one chosen cut per (useful) logic node
//! in a `MapRecord`. Two implementations ship with the crate: `AreaCover`
//! and `DelayCover`.

use crate::{CutStore, MapError, MapRecord, SubjectGraph};

/// How the area cost of a shared leaf is split among the cuts that use it.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FlowPolicy {
    /// Each leaf contributes its cost divided by its fanout count.
    Fanout,
    /// Each leaf contributes its cost weighted by the share of the root's
    /// flow that reaches it (the flow is divided by the fanout count of
    /// each node it traverses).
    Flow,
}

impl FlowPolicy {
    pub fn is_fanout(self) -> bool {
        matches!(self, FlowPolicy::Fanout)
    }
}

/// A DAG covering heuristic. Implementations select, for every logic node of
/// the subject graph, the cut realizing it in the mapped network.
///
/// The covering must guarantee that, starting from any primary-output driver
/// and repeatedly following the leaves of the chosen cuts, one only ever
/// reaches nodes that carry a chosen cut themselves or are inputs.
pub trait DagCover {
    /// Performs one covering attempt and records the chosen cuts in
    /// `maprec`. The record is re-initialized by the call.
    fn record_cuts(
        &mut self,
        graph: &SubjectGraph,
        cuts: &CutStore,
        maprec: &mut MapRecord,
    ) -> Result<(), MapError>;
}
