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

//! Mapping estimation: walks a `MapRecord` exactly the way the generator
//! does (demand both polarities from the outputs, close the positive demand
//! over the chosen cuts, count one LUT per realized node and polarity) but
//! only tallies LUT count and depth, without building any network. This is
//! the inner loop of the meta-search rollouts.

use crate::{CutStore, MapError, MapRecord, NodeId, SubjectGraph};

/// Per-polarity bookkeeping for one node: index 0 is the plain signal,
/// index 1 the inverted one.
#[derive(Clone, Debug, Default)]
pub(crate) struct PolarityInfo {
    pub ref_count: [usize; 2],
    pub mapped: [bool; 2],
    pub depth: [usize; 2],
}

impl PolarityInfo {
    pub fn inc_ref(&mut self, inv: bool) {
        self.ref_count[usize::from(inv)] += 1;
    }
    /// True iff only the inverted signal is ever consumed, in which case a
    /// single LUT with a complemented table suffices.
    pub fn inv_req(&self) -> bool {
        self.ref_count[1] > 0 && self.ref_count[0] == 0
    }
}

/// Computes, for a mapping record, the demanded polarities of every node
/// and the positive closure of the chosen cuts. This is the part shared by
/// the estimator and the generator.
pub(crate) struct DemandMap {
    pub info: Vec<PolarityInfo>,
    pub const0: bool,
    pub const1: bool,
}

impl DemandMap {
    pub fn compute(
        graph: &SubjectGraph,
        cuts: &CutStore,
        record: &MapRecord,
    ) -> Result<Self, MapError> {
        let mut dm = DemandMap {
            info: vec![Default::default(); graph.node_num()],
            const0: false,
            const1: false,
        };

        // what the outputs ask for
        let mut stack: Vec<NodeId> = vec![];
        let mut expanded = vec![false; graph.node_num()];
        for &o in graph.outputs() {
            let h = graph.node(o).output_fanin();
            match h.node() {
                None => {
                    if h.is_one() {
                        dm.const1 = true;
                    } else {
                        dm.const0 = true;
                    }
                }
                Some(d) => {
                    dm.info[d.0].inc_ref(h.inv());
                    if graph.node(d).is_logic() && !expanded[d.0] {
                        expanded[d.0] = true;
                        stack.push(d);
                    }
                }
            }
        }

        // close the positive demand over the chosen cuts: whatever polarity
        // a root is consumed in, its cut consumes the leaves plain
        while let Some(v) = stack.pop() {
            let cut = record.cut(v).ok_or(MapError::Infeasible(v))?;
            for &l in cuts.leaves(cut) {
                dm.info[l.0].inc_ref(false);
                if graph.node(l).is_logic() && !expanded[l.0] {
                    expanded[l.0] = true;
                    stack.push(l);
                }
            }
        }
        Ok(dm)
    }
}

/// The estimator itself.
#[derive(Default)]
pub struct MapEst;

impl MapEst {
    pub fn new() -> Self {
        MapEst
    }

    /// Returns (LUT count, depth) of the mapped network `record` describes,
    /// without building it.
    pub fn estimate(
        &mut self,
        graph: &SubjectGraph,
        cuts: &CutStore,
        record: &MapRecord,
    ) -> Result<(usize, usize), MapError> {
        let mut dm = DemandMap::compute(graph, cuts, record)?;
        let mut lut_num = usize::from(dm.const0) + usize::from(dm.const1);

        // inputs come for free in their plain polarity; an inverted demand
        // costs one NOT-LUT
        for &i in graph.inputs() {
            let info = &mut dm.info[i.0];
            info.mapped[0] = true;
            info.depth[0] = 0;
            if info.ref_count[1] > 0 {
                info.mapped[1] = true;
                info.depth[1] = 1;
                lut_num += 1;
            }
        }

        // one LUT per demanded (logic node, polarity); when both polarities
        // are live the inverted one is a NOT-LUT stacked on the plain one
        for &v in graph.logics() {
            let demand = dm.info[v.0].ref_count;
            if demand[0] == 0 && demand[1] == 0 {
                continue;
            }
            let cut = record.cut(v).ok_or(MapError::Infeasible(v))?;
            let leaf_depth = cuts
                .leaves(cut)
                .iter()
                .map(|l| dm.info[l.0].depth[0])
                .max()
                .unwrap_or(0);

            let info = &mut dm.info[v.0];
            if demand[0] > 0 {
                info.mapped[0] = true;
                info.depth[0] = leaf_depth + 1;
                lut_num += 1;
            }
            if demand[1] > 0 {
                info.mapped[1] = true;
                info.depth[1] = if info.inv_req() {
                    leaf_depth + 1
                } else {
                    info.depth[0] + 1
                };
                lut_num += 1;
            }
        }

        let mut depth = 0;
        for &o in graph.outputs() {
            let h = graph.node(o).output_fanin();
            if let Some(d) = h.node() {
                let inv = usize::from(h.inv());
                debug_assert!(dm.info[d.0].mapped[inv]);
                depth = depth.max(dm.info[d.0].depth[inv]);
            }
        }
        Ok((lut_num, depth))
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_estimate {
    use super::*;
    use crate::{AreaCover, CutStore, DagCover, FlowPolicy, Handle, MapRecord, SubjectGraph};

    fn cover(g: &SubjectGraph, k: usize) -> (CutStore, MapRecord) {
        let cuts = CutStore::enumerate(g, k);
        let mut rec = MapRecord::new();
        AreaCover::new(FlowPolicy::Flow)
            .record_cuts(g, &cuts, &mut rec)
            .unwrap();
        (cuts, rec)
    }

    #[test]
    fn test_single_lut() {
        let mut g = SubjectGraph::new("t");
        let a = Handle::new(g.new_input(), false);
        let b = Handle::new(g.new_input(), false);
        let c = Handle::new(g.new_input(), false);
        let t = g.new_and2(a, b);
        let y = g.new_and2(t, c);
        g.new_output(y);

        let (cuts, rec) = cover(&g, 3);
        let (lut_num, depth) = MapEst::new().estimate(&g, &cuts, &rec).unwrap();
        assert_eq!(1, lut_num);
        assert_eq!(1, depth);
    }

    #[test]
    fn test_inverted_output_costs_nothing_extra() {
        // the inverted demand is folded into the single LUT's table
        let mut g = SubjectGraph::new("t");
        let a = Handle::new(g.new_input(), false);
        let b = Handle::new(g.new_input(), false);
        let y = g.new_and2(a, b);
        g.new_output(y.inverted());

        let (cuts, rec) = cover(&g, 2);
        let (lut_num, depth) = MapEst::new().estimate(&g, &cuts, &rec).unwrap();
        assert_eq!(1, lut_num);
        assert_eq!(1, depth);
    }

    #[test]
    fn test_both_polarities_add_a_not() {
        let mut g = SubjectGraph::new("t");
        let a = Handle::new(g.new_input(), false);
        let b = Handle::new(g.new_input(), false);
        let y = g.new_and2(a, b);
        g.new_output(y);
        g.new_output(y.inverted());

        let (cuts, rec) = cover(&g, 2);
        let (lut_num, depth) = MapEst::new().estimate(&g, &cuts, &rec).unwrap();
        assert_eq!(2, lut_num);
        assert_eq!(2, depth);
    }

    #[test]
    fn test_inverted_input_and_constant() {
        let mut g = SubjectGraph::new("t");
        let a = Handle::new(g.new_input(), false);
        g.new_output(a.inverted());
        g.new_output(Handle::one());

        let cuts = CutStore::enumerate(&g, 2);
        let mut rec = MapRecord::new();
        rec.init(&g);
        let (lut_num, depth) = MapEst::new().estimate(&g, &cuts, &rec).unwrap();
        // one NOT-LUT for !a, one constant LUT
        assert_eq!(2, lut_num);
        assert_eq!(1, depth);
    }

    #[test]
    fn test_unused_logic_not_counted() {
        let mut g = SubjectGraph::new("t");
        let a = Handle::new(g.new_input(), false);
        let b = Handle::new(g.new_input(), false);
        let y = g.new_and2(a, b);
        let _dead = g.new_xor2(a, b);
        g.new_output(y);

        let (cuts, rec) = cover(&g, 2);
        let (lut_num, _) = MapEst::new().estimate(&g, &cuts, &rec).unwrap();
        assert_eq!(1, lut_num);
    }
}
