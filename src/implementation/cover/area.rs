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

//! Area-mode DAG covering. A real-valued cost is propagated from the inputs
//! (cost 0) along the topological order; the cost of a cut is one (the LUT
//! itself) plus the weighted costs of its leaves, the weights discounting
//! leaves whose area is shared with other cuts. The cut of minimum cost
//! wins, ties going to the earlier-enumerated cut.
//!
//! A set of boundary nodes may be supplied: those are treated as already
//! covered, so using them as leaves costs nothing. The meta-search drivers
//! rely on this to pin parts of the graph.

use crate::{CutStore, DagCover, FlowPolicy, MapError, MapRecord, NodeId, SubjectGraph};

/// The area-mode covering heuristic.
pub struct AreaCover {
    policy: FlowPolicy,
    /// Best cost reached so far, per node id.
    best_cost: Vec<f64>,
    /// Boundary flag per node id.
    boundary: Vec<bool>,
    /// Leaf weights of the cut under evaluation.
    weight: Vec<f64>,
}

impl AreaCover {
    pub fn new(policy: FlowPolicy) -> Self {
        AreaCover {
            policy,
            best_cost: vec![],
            boundary: vec![],
            weight: vec![],
        }
    }

    pub fn policy(&self) -> FlowPolicy {
        self.policy
    }

    /// Covering with a boundary set: the subject-graph cost of a boundary
    /// node is treated as zero upstream of it.
    pub fn record_cuts_with_boundary(
        &mut self,
        graph: &SubjectGraph,
        cuts: &CutStore,
        boundary_list: &[NodeId],
        maprec: &mut MapRecord,
    ) -> Result<(), MapError> {
        let n = graph.node_num();
        self.best_cost.clear();
        self.best_cost.resize(n, f64::INFINITY);
        self.boundary.clear();
        self.boundary.resize(n, false);
        for &b in boundary_list {
            self.boundary[b.0] = true;
        }
        self.weight.resize(cuts.limit(), 0.0);
        maprec.init(graph);

        for &input in graph.inputs() {
            self.best_cost[input.0] = 0.0;
        }

        for &v in graph.logics() {
            let mut min_cost = f64::INFINITY;
            let mut best_cut = None;
            for &cut in cuts.cuts_of(v) {
                if cuts.is_trivial(cut) {
                    // a node never realizes itself
                    continue;
                }
                let leaves = cuts.leaves(cut);
                if leaves
                    .iter()
                    .any(|l| self.best_cost[l.0].is_infinite() && !self.boundary[l.0])
                {
                    // unreachable under the current boundary
                    continue;
                }

                let ni = leaves.len();
                match self.policy {
                    FlowPolicy::Fanout => {
                        for (i, l) in leaves.iter().enumerate() {
                            let fo = graph.node(*l).fanout_num();
                            self.weight[i] = if fo == 0 { 0.0 } else { 1.0 / fo as f64 };
                        }
                    }
                    FlowPolicy::Flow => {
                        self.weight[..ni].fill(0.0);
                        calc_weight(graph, leaves, v, &mut self.weight);
                    }
                }

                let mut cur_cost = 1.0;
                for (i, l) in leaves.iter().enumerate() {
                    if !self.boundary[l.0] {
                        cur_cost += self.best_cost[l.0] * self.weight[i];
                    }
                }
                if cur_cost < min_cost {
                    min_cost = cur_cost;
                    best_cut = Some(cut);
                }
            }
            let best_cut = best_cut.ok_or(MapError::Infeasible(v))?;
            maprec.set_cut(v, best_cut);
            self.best_cost[v.0] = min_cost;
        }
        Ok(())
    }
}

impl DagCover for AreaCover {
    fn record_cuts(
        &mut self,
        graph: &SubjectGraph,
        cuts: &CutStore,
        maprec: &mut MapRecord,
    ) -> Result<(), MapError> {
        self.record_cuts_with_boundary(graph, cuts, &[], maprec)
    }
}

/// Flow-mode weights: the share of the root's flow reaching each leaf, the
/// flow being divided by the fanout count at every traversed edge. Leaves
/// that drive an output keep weight zero (their LUT is mandatory anyway, so
/// their area is not up for sharing). Iterative on an explicit stack; the
/// number of root-to-leaf paths is bounded by the cut cone.
pub(crate) fn calc_weight(
    graph: &SubjectGraph,
    leaves: &[NodeId],
    root: NodeId,
    weight: &mut [f64],
) {
    let mut stack: Vec<(NodeId, f64)> = vec![(root, 1.0)];
    while let Some((v, w)) = stack.pop() {
        if let Ok(pos) = leaves.binary_search(&v) {
            if !graph.node(v).pomark() {
                weight[pos] += w;
            }
            continue;
        }
        let node = graph.node(v);
        if !node.is_logic() {
            continue;
        }
        for h in node.fanins() {
            let f = h.node().expect("logic fanins are never constants");
            let fo = graph.node(f).fanout_num();
            let w2 = if fo == 0 { 0.0 } else { w / fo as f64 };
            stack.push((f, w2));
        }
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_area_cover {
    use super::*;
    use crate::{CutStore, Handle, MapRecord, SubjectGraph};

    #[test]
    fn test_tiny_and_takes_one_lut() {
        // t = a & b ; y = t & c with K = 3: the full-support cut costs 1
        let mut g = SubjectGraph::new("t");
        let a = Handle::new(g.new_input(), false);
        let b = Handle::new(g.new_input(), false);
        let c = Handle::new(g.new_input(), false);
        let t = g.new_and2(a, b);
        let y = g.new_and2(t, c);
        g.new_output(y);

        let cuts = CutStore::enumerate(&g, 3);
        let mut cover = AreaCover::new(FlowPolicy::Flow);
        let mut rec = MapRecord::new();
        cover.record_cuts(&g, &cuts, &mut rec).unwrap();

        let chosen = rec.cut(y.node().unwrap()).unwrap();
        assert_eq!(3, cuts.leaf_num(chosen));
        let leaves = cuts.leaves(chosen);
        assert!(leaves.iter().all(|l| g.node(*l).is_input()));
    }

    #[test]
    fn test_boundary_pins_a_leaf() {
        // same graph, but t is forced to be a LUT output: the cut {t, c}
        // becomes free of t's cost and beats {a, b, c} on ties... both cost
        // 1.0 here, so the earlier-enumerated {t, c} wins.
        let mut g = SubjectGraph::new("t");
        let a = Handle::new(g.new_input(), false);
        let b = Handle::new(g.new_input(), false);
        let c = Handle::new(g.new_input(), false);
        let t = g.new_and2(a, b);
        let y = g.new_and2(t, c);
        g.new_output(y);

        let cuts = CutStore::enumerate(&g, 3);
        let mut cover = AreaCover::new(FlowPolicy::Flow);
        let mut rec = MapRecord::new();
        let t = t.node().unwrap();
        cover
            .record_cuts_with_boundary(&g, &cuts, &[t], &mut rec)
            .unwrap();

        let chosen = rec.cut(y.node().unwrap()).unwrap();
        assert_eq!(&[c.node().unwrap(), t], cuts.leaves(chosen));
    }

    #[test]
    fn test_every_logic_node_gets_a_cut() {
        let mut g = SubjectGraph::new("t");
        let hs: Vec<Handle> = (0..6).map(|_| Handle::new(g.new_input(), false)).collect();
        let y = g.new_and(&hs);
        g.new_output(y);

        let cuts = CutStore::enumerate(&g, 4);
        let mut cover = AreaCover::new(FlowPolicy::Fanout);
        let mut rec = MapRecord::new();
        cover.record_cuts(&g, &cuts, &mut rec).unwrap();
        for &v in g.logics() {
            assert!(rec.cut(v).is_some());
        }
    }
}
