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

//! Delay-mode DAG covering: depth first, area second, under a slack. The
//! forward pass grows a (depth, area) Pareto front per node by combining the
//! fronts of each candidate cut's leaves in lock-step. The minimum possible
//! depth over the output drivers plus the slack then becomes the required
//! depth of every output, which the backward pass propagates while picking,
//! for each needed node, the cheapest point meeting its requirement.

use super::adcost::AdCostList;
use super::area::calc_weight;
use crate::{CutStore, DagCover, FlowPolicy, MapError, MapRecord, NodeId, SubjectGraph};

#[derive(Clone, Debug, Default)]
struct NodeInfo {
    cost_list: AdCostList,
    min_depth: usize,
    req_depth: Option<usize>,
}

/// The delay-mode covering heuristic.
pub struct DelayCover {
    policy: FlowPolicy,
    slack: usize,
    node_info: Vec<NodeInfo>,
    /// Leaf weights of the cut under evaluation.
    weight: Vec<f64>,
    /// Per-leaf cursor into the leaf's front during lock-step combination.
    cursors: Vec<usize>,
}

impl DelayCover {
    pub fn new(policy: FlowPolicy, slack: usize) -> Self {
        DelayCover {
            policy,
            slack,
            node_info: vec![],
            weight: vec![],
            cursors: vec![],
        }
    }

    pub fn policy(&self) -> FlowPolicy {
        self.policy
    }

    pub fn slack(&self) -> usize {
        self.slack
    }

    /// Forward pass for one node: fill its Pareto front from its cuts.
    fn record(&mut self, graph: &SubjectGraph, cuts: &CutStore, v: NodeId) {
        let mut min_depth = usize::MAX;
        for &cut in cuts.cuts_of(v) {
            if cuts.is_trivial(cut) {
                continue;
            }
            let leaves = cuts.leaves(cut);
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

            let max_input_depth = leaves
                .iter()
                .map(|l| self.node_info[l.0].min_depth)
                .max()
                .unwrap_or(0);
            min_depth = min_depth.min(max_input_depth + 1);

            // lock-step walk of the leaf fronts, deepest points first: each
            // round realizes one depth-distinct combination, then every leaf
            // sitting at the round's depth moves on to its next point
            self.cursors[..ni].fill(0);
            loop {
                let mut idepth = 0;
                let mut area = 1.0;
                let mut exhausted = false;
                for (i, l) in leaves.iter().enumerate() {
                    let front = &self.node_info[l.0].cost_list;
                    if self.cursors[i] >= front.len() {
                        exhausted = true;
                        break;
                    }
                    let cost = front.get(self.cursors[i]);
                    idepth = idepth.max(cost.depth);
                    area += cost.area * self.weight[i];
                }
                if exhausted {
                    break;
                }
                self.node_info[v.0]
                    .cost_list
                    .insert(Some(cut), idepth + 1, area);
                for (i, l) in leaves.iter().enumerate() {
                    let front = &self.node_info[l.0].cost_list;
                    if front.get(self.cursors[i]).depth == idepth {
                        self.cursors[i] += 1;
                    }
                }
            }
        }
        self.node_info[v.0].min_depth = min_depth;
    }

    /// Backward pass for one node: pick the cheapest point meeting the
    /// requirement, then tighten the requirement of the chosen cut's leaves.
    fn select(
        &mut self,
        cuts: &CutStore,
        v: NodeId,
        maprec: &mut MapRecord,
    ) -> Result<(), MapError> {
        let Some(rd) = self.node_info[v.0].req_depth else {
            // this node is not needed by anything downstream
            return Ok(());
        };
        let chosen = self.node_info[v.0]
            .cost_list
            .iter()
            .find(|c| c.depth <= rd)
            .and_then(|c| c.cut)
            .ok_or(MapError::Infeasible(v))?;
        maprec.set_cut(v, chosen);

        let rd = rd - 1;
        for &l in cuts.leaves(chosen) {
            let req = &mut self.node_info[l.0].req_depth;
            *req = Some(req.map_or(rd, |r| r.min(rd)));
        }
        Ok(())
    }
}

impl DagCover for DelayCover {
    fn record_cuts(
        &mut self,
        graph: &SubjectGraph,
        cuts: &CutStore,
        maprec: &mut MapRecord,
    ) -> Result<(), MapError> {
        let n = graph.node_num();
        self.node_info.clear();
        self.node_info.resize_with(n, Default::default);
        self.weight.resize(cuts.limit(), 0.0);
        self.cursors.resize(cuts.limit(), 0);
        maprec.init(graph);

        for &input in graph.inputs() {
            let info = &mut self.node_info[input.0];
            info.cost_list.insert(None, 0, 0.0);
            info.min_depth = 0;
        }

        for &v in graph.logics() {
            self.record(graph, cuts, v);
        }

        // the depth the best mapping cannot beat, plus the slack, becomes
        // the requirement at every output driver
        let mut min_depth = 0;
        for &o in graph.outputs() {
            if let Some(driver) = graph.node(o).output_fanin().node() {
                min_depth = min_depth.max(self.node_info[driver.0].min_depth);
            }
        }
        let required = min_depth + self.slack;
        for &o in graph.outputs() {
            if let Some(driver) = graph.node(o).output_fanin().node() {
                let req = &mut self.node_info[driver.0].req_depth;
                *req = Some(req.map_or(required, |r| r.min(required)));
            }
        }

        for &v in graph.logics().iter().rev() {
            self.select(cuts, v, maprec)?;
        }
        Ok(())
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
