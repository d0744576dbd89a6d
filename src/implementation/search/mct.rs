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

//! Monte-Carlo tree search over boundary selections. Each level of the tree
//! decides whether one multi-fanout node is forced to be a LUT output; a
//! leaf evaluation runs the area cover with the accumulated boundary set and
//! scores the LUT count against precomputed bounds. The classic UCB1 scheme
//! (descend the best expanded child, expand one child per trial, roll out
//! randomly below, back the reward up) steers the selection.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{
    AreaCover, CutStore, FlowPolicy, MapError, MapEst, MapRecord, NodeId, SubjectGraph,
};

use super::bounds::lower_bound;

/// The UCB1 exploration constant.
const CP: f64 = 0.5;

/// One node of the search tree. Children are kept ordered with the
/// UCB1-best child first.
#[derive(Debug)]
struct MctNode {
    parent: Option<usize>,
    /// The fan-out point this node's decision applies to.
    index: usize,
    /// Whether that point is forced to be a boundary.
    selected: bool,
    /// Number of children not yet created (2 per internal node).
    unexpanded: usize,
    children: Vec<usize>,
    sum: f64,
    num: usize,
    mean: f64,
}

impl MctNode {
    fn new(parent: Option<usize>, index: usize, selected: bool, leaf: bool) -> Self {
        MctNode {
            parent,
            index,
            selected,
            unexpanded: if leaf { 0 } else { 2 },
            children: vec![],
            sum: 0.0,
            num: 0,
            mean: 0.0,
        }
    }

    fn update(&mut self, val: f64) {
        self.sum += val;
        self.num += 1;
        self.mean = self.sum / self.num as f64;
    }

    fn ucb1(&self, n_all_ln: f64, cp: f64) -> f64 {
        self.mean + cp * (2.0 * n_all_ln / self.num as f64).sqrt()
    }
}

/// The rollout / descent state: the boundary set built so far and the next
/// fan-out point to decide.
struct MctState {
    boundary: Vec<NodeId>,
    index: usize,
}

/// The MCTS driver. One instance owns its PRNG (the seed is part of the
/// interface) and amortizes the covering scratch across trials.
pub struct MctSearch<'a> {
    graph: &'a SubjectGraph,
    cuts: &'a CutStore,
    area_cover: AreaCover,
    est: MapEst,
    /// Multi-fanout logic nodes open for selection, in topological order.
    fanout_points: Vec<NodeId>,
    /// Reconvergent-fanin cone size of each fan-out point (rollout bias).
    cone_size: Vec<usize>,
    /// Output drivers: boundaries under every selection.
    initial_boundary: Vec<NodeId>,
    upper_bound: usize,
    lower_bound: usize,
    width: f64,
    /// Search-tree arena; rebuilt by each `search` call.
    nodes: Vec<MctNode>,
    num_all: usize,
    minimum_lut_num: usize,
    best_record: MapRecord,
    rng: StdRng,
}

impl<'a> MctSearch<'a> {
    pub fn new(
        graph: &'a SubjectGraph,
        cuts: &'a CutStore,
        policy: FlowPolicy,
        seed: u64,
    ) -> Self {
        let upper_bound = graph.logic_num();
        let lb = lower_bound(graph, cuts);
        let width = (upper_bound.saturating_sub(lb)).max(1) as f64;

        // output drivers must be LUT roots no matter what: they are pruned
        // from the searchable points and pinned in the boundary instead
        let mut initial_boundary = vec![];
        for &o in graph.outputs() {
            if let Some(d) = graph.node(o).output_fanin().node() {
                if graph.node(d).is_logic() && !initial_boundary.contains(&d) {
                    initial_boundary.push(d);
                }
            }
        }
        let mut fanout_points = vec![];
        let mut cone_size = vec![];
        for &v in graph.logics() {
            let node = graph.node(v);
            if node.fanout_num() > 1 && !node.pomark() {
                fanout_points.push(v);
                cone_size.push(reconvergent_size(graph, v));
            }
        }
        log::debug!(
            "mct: {} logic nodes, {} fan-out points",
            graph.logic_num(),
            fanout_points.len()
        );

        MctSearch {
            graph,
            cuts,
            area_cover: AreaCover::new(policy),
            est: MapEst::new(),
            fanout_points,
            cone_size,
            initial_boundary,
            upper_bound,
            lower_bound: lb,
            width,
            nodes: vec![],
            num_all: 0,
            minimum_lut_num: graph.node_num() + 1,
            best_record: MapRecord::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn bounds(&self) -> (usize, usize) {
        (self.lower_bound, self.upper_bound)
    }

    /// Runs `search_limit` trials and returns the best record seen.
    pub fn search(&mut self, search_limit: usize) -> Result<MapRecord, MapError> {
        self.nodes.clear();
        self.nodes.push(MctNode::new(
            None,
            0,
            false,
            self.fanout_points.is_empty(),
        ));
        self.minimum_lut_num = self.graph.node_num() + 1;

        // the incumbent starts at the empty selection (plain cover)
        let mut baseline = MctState {
            boundary: self.initial_boundary.clone(),
            index: self.fanout_points.len(),
        };
        self.default_policy(&mut baseline)?;

        for trial in 1..=search_limit {
            self.num_all = trial;
            let mut state = MctState {
                boundary: self.initial_boundary.clone(),
                index: 0,
            };
            let node = self.tree_policy(&mut state);
            let val = self.default_policy(&mut state)?;
            self.back_up(node, val);
        }
        Ok(self.best_record.clone())
    }

    /// Descends through expanded nodes along UCB1-best children, expanding
    /// the first not-fully-expanded node met on the way.
    fn tree_policy(&mut self, state: &mut MctState) -> usize {
        let mut cur = 0usize;
        while state.index < self.fanout_points.len() {
            if self.nodes[cur].unexpanded > 0 {
                let child = self.expand(cur, state.index);
                self.apply(child, state);
                return child;
            }
            cur = self.nodes[cur].children[0];
            self.apply(cur, state);
        }
        cur
    }

    /// Creates the next unexpanded child: first the selecting one, then the
    /// non-selecting one.
    fn expand(&mut self, parent: usize, index: usize) -> usize {
        let selected = self.nodes[parent].unexpanded == 2;
        self.nodes[parent].unexpanded -= 1;
        let leaf = index + 1 >= self.fanout_points.len();
        let child = self.nodes.len();
        self.nodes
            .push(MctNode::new(Some(parent), index, selected, leaf));
        self.nodes[parent].children.push(child);
        child
    }

    fn apply(&self, node: usize, state: &mut MctState) {
        let n = &self.nodes[node];
        if n.selected {
            state.boundary.push(self.fanout_points[n.index]);
        }
        state.index = n.index + 1;
    }

    /// Finishes the selection at random (biased by reconvergence size),
    /// covers, and scores.
    fn default_policy(&mut self, state: &mut MctState) -> Result<f64, MapError> {
        while state.index < self.fanout_points.len() {
            let skip_ratio = 1.0 / self.cone_size[state.index].clamp(2, 64) as f64;
            let r: f64 = self.rng.gen();
            if r >= skip_ratio {
                state.boundary.push(self.fanout_points[state.index]);
            }
            state.index += 1;
        }

        let mut record = MapRecord::new();
        self.area_cover.record_cuts_with_boundary(
            self.graph,
            self.cuts,
            &state.boundary,
            &mut record,
        )?;
        let (lut_num, _) = self.est.estimate(self.graph, self.cuts, &record)?;
        if lut_num < self.minimum_lut_num {
            self.minimum_lut_num = lut_num;
            self.best_record = record;
        }
        log::debug!(
            "mct trial {}: {lut_num} LUTs (best {})",
            self.num_all,
            self.minimum_lut_num
        );

        let val = (self.upper_bound as f64 - lut_num as f64) / self.width;
        Ok(val.clamp(0.0, 1.0))
    }

    /// Propagates the reward to the root, re-ranking siblings by UCB1.
    fn back_up(&mut self, mut node: usize, val: f64) {
        let n_all_ln = (self.num_all as f64).ln();
        loop {
            self.nodes[node].update(val);
            let Some(parent) = self.nodes[node].parent else {
                break;
            };
            self.reorder(parent, n_all_ln);
            node = parent;
        }
    }

    fn reorder(&mut self, parent: usize, n_all_ln: f64) {
        let mut scored: Vec<(f64, usize)> = self.nodes[parent]
            .children
            .iter()
            .map(|&c| (self.nodes[c].ucb1(n_all_ln, CP), c))
            .collect();
        // stable: equal scores keep the leftmost child first
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        self.nodes[parent].children = scored.into_iter().map(|(_, c)| c).collect();
    }
}

/// The size of the single-fanout cone feeding `v`: how much logic would be
/// swallowed by a LUT rooted at `v`. Large cones make a point a likelier
/// boundary during rollouts.
fn reconvergent_size(graph: &SubjectGraph, v: NodeId) -> usize {
    let mut mark = vec![v];
    let mut stack: Vec<NodeId> = graph.node(v).fanins().iter().filter_map(|h| h.node()).collect();
    let mut n = 0;
    while let Some(u) = stack.pop() {
        if mark.contains(&u) {
            continue;
        }
        mark.push(u);
        n += 1;
        let node = graph.node(u);
        if node.is_logic() && node.fanout_num() == 1 {
            for h in node.fanins() {
                stack.push(h.node().expect("logic fanins are never constants"));
            }
        }
    }
    n
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_mct {
    use super::*;
    use crate::test_utils::random_graph;
    use crate::{AreaCover, CutStore, DagCover, FlowPolicy, MapEst};

    #[test]
    fn test_search_beats_or_matches_greedy() {
        let g = random_graph(120, 0xC0FFEE);
        let cuts = CutStore::enumerate(&g, 4);

        let mut rec = crate::MapRecord::new();
        AreaCover::new(FlowPolicy::Flow)
            .record_cuts(&g, &cuts, &mut rec)
            .unwrap();
        let (greedy, _) = MapEst::new().estimate(&g, &cuts, &rec).unwrap();

        let mut mct = MctSearch::new(&g, &cuts, FlowPolicy::Flow, 42);
        let best = mct.search(200).unwrap();
        let (mct_luts, _) = MapEst::new().estimate(&g, &cuts, &best).unwrap();
        assert!(mct_luts <= greedy, "mct {mct_luts} > greedy {greedy}");
    }

    #[test]
    fn test_deterministic_under_seed() {
        let g = random_graph(60, 7);
        let cuts = CutStore::enumerate(&g, 4);

        let r1 = MctSearch::new(&g, &cuts, FlowPolicy::Flow, 99)
            .search(50)
            .unwrap();
        let r2 = MctSearch::new(&g, &cuts, FlowPolicy::Flow, 99)
            .search(50)
            .unwrap();
        assert_eq!(r1, r2);
    }

    #[test]
    fn test_bounds_sane() {
        let g = random_graph(60, 3);
        let cuts = CutStore::enumerate(&g, 4);
        let mct = MctSearch::new(&g, &cuts, FlowPolicy::Flow, 0);
        let (lb, ub) = mct.bounds();
        assert!(lb <= ub);
        assert_eq!(g.logic_num(), ub);
    }
}
