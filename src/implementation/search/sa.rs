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

//! Simulated annealing over the same boundary-selection space as the MCTS
//! driver: the state is a boolean vector over the fan-out points, a move
//! flips one bit, and worse neighbours are accepted with the Metropolis
//! probability under a geometrically cooling temperature.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{
    AreaCover, CutStore, FlowPolicy, MapError, MapEst, MapRecord, NodeId, SubjectGraph,
};

use super::bounds::lower_bound;

/// Default initial temperature.
const INIT_TEMP: f64 = 1.0;
/// Default geometric cooling factor per trial.
const DECREMENT: f64 = 0.999;

/// The simulated-annealing driver.
pub struct SaSearch<'a> {
    graph: &'a SubjectGraph,
    cuts: &'a CutStore,
    area_cover: AreaCover,
    est: MapEst,
    fanout_points: Vec<NodeId>,
    initial_boundary: Vec<NodeId>,
    init_temp: f64,
    decrement: f64,
    upper_bound: usize,
    lower_bound: usize,
    width: f64,
    minimum_lut_num: usize,
    best_record: MapRecord,
    rng: StdRng,
}

impl<'a> SaSearch<'a> {
    pub fn new(
        graph: &'a SubjectGraph,
        cuts: &'a CutStore,
        policy: FlowPolicy,
        seed: u64,
    ) -> Self {
        let upper_bound = graph.logic_num();
        let lb = lower_bound(graph, cuts);
        let width = (upper_bound.saturating_sub(lb)).max(1) as f64;

        let mut initial_boundary = vec![];
        for &o in graph.outputs() {
            if let Some(d) = graph.node(o).output_fanin().node() {
                if graph.node(d).is_logic() && !initial_boundary.contains(&d) {
                    initial_boundary.push(d);
                }
            }
        }
        let fanout_points = graph
            .logics()
            .iter()
            .copied()
            .filter(|&v| {
                let node = graph.node(v);
                node.fanout_num() > 1 && !node.pomark()
            })
            .collect();

        SaSearch {
            graph,
            cuts,
            area_cover: AreaCover::new(policy),
            est: MapEst::new(),
            fanout_points,
            initial_boundary,
            init_temp: INIT_TEMP,
            decrement: DECREMENT,
            upper_bound,
            lower_bound: lb,
            width,
            minimum_lut_num: graph.node_num() + 1,
            best_record: MapRecord::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn bounds(&self) -> (usize, usize) {
        (self.lower_bound, self.upper_bound)
    }

    /// Runs `search_limit` annealing steps and returns the best record.
    pub fn search(&mut self, search_limit: usize) -> Result<MapRecord, MapError> {
        self.minimum_lut_num = self.graph.node_num() + 1;
        let nf = self.fanout_points.len();

        let mut state = vec![false; nf];
        let mut cur = self.evaluate(&state)?;
        if nf == 0 {
            return Ok(self.best_record.clone());
        }

        let mut temp = self.init_temp;
        for trial in 0..search_limit {
            let flip = self.rng.gen_range(0..nf);
            state[flip] = !state[flip];
            let neighbour = self.evaluate(&state)?;

            let delta = neighbour as f64 - cur as f64;
            let accept = delta <= 0.0 || self.rng.gen::<f64>() < (-delta / temp).exp();
            if accept {
                cur = neighbour;
            } else {
                state[flip] = !state[flip];
            }
            let reward = (self.upper_bound as f64 - cur as f64) / self.width;
            log::debug!(
                "sa trial {trial}: {cur} LUTs (best {}, reward {:.3})",
                self.minimum_lut_num,
                reward.clamp(0.0, 1.0)
            );
            temp *= self.decrement;
        }
        Ok(self.best_record.clone())
    }

    /// Covers under the boundary set the state denotes and returns the LUT
    /// count, keeping the incumbent up to date.
    fn evaluate(&mut self, state: &[bool]) -> Result<usize, MapError> {
        let mut boundary = self.initial_boundary.clone();
        for (i, &sel) in state.iter().enumerate() {
            if sel {
                boundary.push(self.fanout_points[i]);
            }
        }
        let mut record = MapRecord::new();
        self.area_cover
            .record_cuts_with_boundary(self.graph, self.cuts, &boundary, &mut record)?;
        let (lut_num, _) = self.est.estimate(self.graph, self.cuts, &record)?;
        if lut_num < self.minimum_lut_num {
            self.minimum_lut_num = lut_num;
            self.best_record = record;
        }
        Ok(lut_num)
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_sa {
    use super::*;
    use crate::test_utils::random_graph;
    use crate::{AreaCover, CutStore, DagCover, FlowPolicy, MapEst, MapRecord};

    #[test]
    fn test_never_worse_than_greedy() {
        let g = random_graph(100, 0xBEEF);
        let cuts = CutStore::enumerate(&g, 4);

        let mut rec = MapRecord::new();
        AreaCover::new(FlowPolicy::Flow)
            .record_cuts(&g, &cuts, &mut rec)
            .unwrap();
        let (greedy, _) = MapEst::new().estimate(&g, &cuts, &rec).unwrap();

        let mut sa = SaSearch::new(&g, &cuts, FlowPolicy::Flow, 5);
        let best = sa.search(150).unwrap();
        let (sa_luts, _) = MapEst::new().estimate(&g, &cuts, &best).unwrap();
        assert!(sa_luts <= greedy, "sa {sa_luts} > greedy {greedy}");
    }

    #[test]
    fn test_deterministic_under_seed() {
        let g = random_graph(60, 11);
        let cuts = CutStore::enumerate(&g, 4);
        let r1 = SaSearch::new(&g, &cuts, FlowPolicy::Flow, 4).search(60).unwrap();
        let r2 = SaSearch::new(&g, &cuts, FlowPolicy::Flow, 4).search(60).unwrap();
        assert_eq!(r1, r2);
    }
}
