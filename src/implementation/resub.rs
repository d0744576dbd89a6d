//! Cut resubstitution: a local-search post-pass that swaps single chosen
//! cuts for alternates from the store whenever that strictly lowers the
//! number of LUT roots, optionally under a depth budget. Candidates are
//! drained from a priority queue ordered by gain (ties to the smaller node
//! id); popped entries are revalidated against the current cover before
//! being applied, so stale queue content is harmless. The search stops at a
//! local minimum (a full re-seeding that applies nothing) or after a
//! bounded number of rounds.

use std::cmp::Ordering;

use binary_heap_plus::BinaryHeap;
use compare::Compare;

use crate::{CutId, CutStore, MapError, MapRecord, NodeId, SubjectGraph};

/// Re-seeding rounds are bounded; convergence happens way earlier since any
/// applied swap strictly shrinks the cover.
const MAX_ROUND: usize = 16;

/// One queued swap opportunity.
#[derive(Copy, Clone, Debug)]
struct Candidate {
    gain: isize,
    node: NodeId,
    cut: CutId,
}

/// Orders candidates by decreasing gain, then increasing node id.
#[derive(Debug, Clone, Copy)]
struct CompareGain;
impl Compare<Candidate> for CompareGain {
    fn compare(&self, l: &Candidate, r: &Candidate) -> Ordering {
        l.gain.cmp(&r.gain).then_with(|| r.node.cmp(&l.node))
    }
}

/// The resubstitution pass.
pub struct CutResub {
    /// Live references per node: chosen cuts using it as a leaf, plus the
    /// outputs consuming it.
    ref_count: Vec<usize>,
    /// Whether a logic node currently is a LUT root of the cover.
    live: Vec<bool>,
    /// Undo journal for speculative gain evaluation.
    journal: Vec<Undo>,
    /// Depth of every node under the current record (None when the record
    /// holds no cut for it). Only maintained under a depth budget.
    depth: Vec<Option<usize>>,
    /// Propagated required depth. Only maintained under a depth budget.
    required: Vec<Option<usize>>,
}

#[derive(Copy, Clone, Debug)]
enum Undo {
    Ref(NodeId, usize),
    Live(NodeId, bool),
}

impl CutResub {
    pub fn new() -> Self {
        CutResub {
            ref_count: vec![],
            live: vec![],
            journal: vec![],
            depth: vec![],
            required: vec![],
        }
    }

    /// Improves `maprec` in place. With `slack = None` the depth is left
    /// unconstrained; with `Some(s)` no swap may push any output beyond the
    /// depth the incoming mapping already reaches (which, coming out of the
    /// delay cover, is the minimum depth plus `s`).
    pub fn run(
        &mut self,
        graph: &SubjectGraph,
        cuts: &CutStore,
        maprec: &mut MapRecord,
        slack: Option<usize>,
    ) -> Result<(), MapError> {
        self.journal.clear();
        self.depth.clear();
        self.required.clear();

        let constrained = slack.is_some();
        let target = if constrained {
            self.recompute_depths(graph, cuts, maprec);
            let mut target = 0;
            for &o in graph.outputs() {
                if let Some(d) = graph.node(o).output_fanin().node() {
                    target = target.max(self.depth[d.0].ok_or(MapError::Infeasible(d))?);
                }
            }
            Some(target)
        } else {
            None
        };

        for _ in 0..MAX_ROUND {
            self.rebuild(graph, cuts, maprec)?;
            if constrained {
                self.recompute_depths(graph, cuts, maprec);
                self.recompute_required(graph, cuts, maprec, target.unwrap());
            }

            // seed the queue with the current best swap of every live root
            let mut seed = vec![];
            for &v in graph.logics() {
                if self.live[v.0] {
                    if let Some(c) = self.best_candidate(graph, cuts, maprec, v) {
                        seed.push(c);
                    }
                }
            }
            let mut heap = BinaryHeap::from_vec_cmp(seed, CompareGain);

            let mut applied = 0usize;
            while let Some(cand) = heap.pop() {
                if !self.live[cand.node.0] {
                    continue;
                }
                // revalidate: the cover may have shifted under this entry
                let Some(cur) = self.best_candidate(graph, cuts, maprec, cand.node) else {
                    continue;
                };
                if cur.gain != cand.gain || cur.cut != cand.cut {
                    heap.push(cur);
                    continue;
                }
                self.apply(graph, cuts, maprec, cand.node, cand.cut)?;
                applied += 1;
                if constrained {
                    self.recompute_depths(graph, cuts, maprec);
                    self.recompute_required(graph, cuts, maprec, target.unwrap());
                }
                if let Some(c) = self.best_candidate(graph, cuts, maprec, cand.node) {
                    heap.push(c);
                }
            }

            if applied == 0 {
                break;
            }
            log::debug!("cut resubstitution: {applied} swaps this round");
        }
        Ok(())
    }

    /// Reference counts and liveness of the current cover, from scratch.
    fn rebuild(
        &mut self,
        graph: &SubjectGraph,
        cuts: &CutStore,
        maprec: &MapRecord,
    ) -> Result<(), MapError> {
        let n = graph.node_num();
        self.ref_count.clear();
        self.ref_count.resize(n, 0);
        self.live.clear();
        self.live.resize(n, false);

        let mut stack = vec![];
        for &o in graph.outputs() {
            if let Some(d) = graph.node(o).output_fanin().node() {
                self.ref_count[d.0] += 1;
                if graph.node(d).is_logic() && !self.live[d.0] {
                    self.live[d.0] = true;
                    stack.push(d);
                }
            }
        }
        while let Some(v) = stack.pop() {
            let cut = maprec.cut(v).ok_or(MapError::Infeasible(v))?;
            for &l in cuts.leaves(cut) {
                self.ref_count[l.0] += 1;
                if graph.node(l).is_logic() && !self.live[l.0] {
                    self.live[l.0] = true;
                    stack.push(l);
                }
            }
        }
        Ok(())
    }

    /// The best strictly-positive-gain alternate cut of `v`, if any.
    fn best_candidate(
        &mut self,
        graph: &SubjectGraph,
        cuts: &CutStore,
        maprec: &MapRecord,
        v: NodeId,
    ) -> Option<Candidate> {
        let old = maprec.cut(v)?;
        let mut best: Option<Candidate> = None;
        for &c in cuts.cuts_of(v) {
            if c == old || cuts.is_trivial(c) {
                continue;
            }
            if !self.depth_ok(cuts, v, c) {
                continue;
            }
            if let Some(gain) = self.eval_gain(graph, cuts, maprec, old, c) {
                if gain > 0 && best.map_or(true, |b| gain > b.gain) {
                    best = Some(Candidate { gain, node: v, cut: c });
                }
            }
        }
        best
    }

    /// Speculatively swaps `old` for `new` and reports the net number of
    /// LUT roots saved; the cover is left untouched.
    fn eval_gain(
        &mut self,
        graph: &SubjectGraph,
        cuts: &CutStore,
        maprec: &MapRecord,
        old: CutId,
        new: CutId,
    ) -> Option<isize> {
        let mark = self.journal.len();
        let mut removed = 0isize;
        let mut added = 0isize;
        self.release_leaves(cuts, maprec, old, &mut removed);
        let feasible = self.acquire_leaves(graph, cuts, maprec, new, &mut added);
        self.rollback(mark);
        feasible.then_some(removed - added)
    }

    fn apply(
        &mut self,
        graph: &SubjectGraph,
        cuts: &CutStore,
        maprec: &mut MapRecord,
        v: NodeId,
        new: CutId,
    ) -> Result<(), MapError> {
        let old = maprec.cut(v).ok_or(MapError::Infeasible(v))?;
        let mut removed = 0isize;
        let mut added = 0isize;
        self.release_leaves(cuts, maprec, old, &mut removed);
        if !self.acquire_leaves(graph, cuts, maprec, new, &mut added) {
            return Err(MapError::Infeasible(v));
        }
        self.journal.clear();
        maprec.set_cut(v, new);
        Ok(())
    }

    /// Drops one reference from every leaf of `cut`; roots whose reference
    /// count reaches zero die and release their own leaves in turn. Only
    /// logic nodes ever carry the live flag, so inputs simply lose the
    /// reference.
    fn release_leaves(
        &mut self,
        cuts: &CutStore,
        maprec: &MapRecord,
        cut: CutId,
        removed: &mut isize,
    ) {
        let mut stack: Vec<NodeId> = cuts.leaves(cut).to_vec();
        while let Some(l) = stack.pop() {
            self.journal.push(Undo::Ref(l, self.ref_count[l.0]));
            self.ref_count[l.0] -= 1;
            if self.ref_count[l.0] == 0 && self.live[l.0] {
                self.journal.push(Undo::Live(l, true));
                self.live[l.0] = false;
                *removed += 1;
                if let Some(c) = maprec.cut(l) {
                    stack.extend_from_slice(cuts.leaves(c));
                }
            }
        }
    }

    /// Adds one reference to every leaf of `cut`; leaves that were not part
    /// of the cover come alive through their recorded cut. Fails when some
    /// needed node has no recorded cut.
    fn acquire_leaves(
        &mut self,
        graph: &SubjectGraph,
        cuts: &CutStore,
        maprec: &MapRecord,
        cut: CutId,
        added: &mut isize,
    ) -> bool {
        let mut stack: Vec<NodeId> = cuts.leaves(cut).to_vec();
        while let Some(l) = stack.pop() {
            self.journal.push(Undo::Ref(l, self.ref_count[l.0]));
            self.ref_count[l.0] += 1;
            if graph.node(l).is_logic() && !self.live[l.0] {
                let Some(c) = maprec.cut(l) else {
                    return false;
                };
                self.journal.push(Undo::Live(l, false));
                self.live[l.0] = true;
                *added += 1;
                stack.extend_from_slice(cuts.leaves(c));
            }
        }
        true
    }

    fn rollback(&mut self, mark: usize) {
        while self.journal.len() > mark {
            match self.journal.pop().unwrap() {
                Undo::Ref(n, old) => self.ref_count[n.0] = old,
                Undo::Live(n, old) => self.live[n.0] = old,
            }
        }
    }

    /// Depth of every node under the current record, in topological order.
    fn recompute_depths(&mut self, graph: &SubjectGraph, cuts: &CutStore, maprec: &MapRecord) {
        let n = graph.node_num();
        self.depth.clear();
        self.depth.resize(n, None);
        for &i in graph.inputs() {
            self.depth[i.0] = Some(0);
        }
        for &v in graph.logics() {
            if let Some(cut) = maprec.cut(v) {
                let mut worst = Some(0);
                for &l in cuts.leaves(cut) {
                    worst = match (worst, self.depth[l.0]) {
                        (Some(w), Some(d)) => Some(w.max(d)),
                        _ => None,
                    };
                }
                self.depth[v.0] = worst.map(|w| w + 1);
            }
        }
    }

    /// Required depths over the live cover, from the outputs backward.
    fn recompute_required(
        &mut self,
        graph: &SubjectGraph,
        cuts: &CutStore,
        maprec: &MapRecord,
        target: usize,
    ) {
        let n = graph.node_num();
        self.required.clear();
        self.required.resize(n, None);
        for &o in graph.outputs() {
            if let Some(d) = graph.node(o).output_fanin().node() {
                let r = &mut self.required[d.0];
                *r = Some(r.map_or(target, |x| x.min(target)));
            }
        }
        for &v in graph.logics().iter().rev() {
            if !self.live[v.0] {
                continue;
            }
            let Some(rv) = self.required[v.0] else {
                continue;
            };
            let Some(cut) = maprec.cut(v) else { continue };
            let rd = rv.saturating_sub(1);
            for &l in cuts.leaves(cut) {
                let r = &mut self.required[l.0];
                *r = Some(r.map_or(rd, |x| x.min(rd)));
            }
        }
    }

    /// Depth admissibility of swapping `v` to `cut`: the new depth must not
    /// exceed the propagated requirement. Always true when unconstrained.
    fn depth_ok(&self, cuts: &CutStore, v: NodeId, cut: CutId) -> bool {
        if self.required.is_empty() {
            return true;
        }
        let Some(rv) = self.required[v.0] else {
            return true;
        };
        let mut new_depth = 0;
        for &l in cuts.leaves(cut) {
            match self.depth[l.0] {
                Some(d) => new_depth = new_depth.max(d),
                None => return false,
            }
        }
        new_depth + 1 <= rv
    }
}

impl Default for CutResub {
    fn default() -> Self {
        Self::new()
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_resub {
    use super::*;
    use crate::{
        AreaCover, DagCover, DelayCover, FlowPolicy, Handle, MapEst, MapRecord, SubjectGraph,
    };

    /// A graph where fanout-mode covering leaves an improvable solution:
    /// two outputs share a three-input prefix chain.
    fn shared_prefix() -> SubjectGraph {
        let mut g = SubjectGraph::new("shared");
        let a = Handle::new(g.new_input(), false);
        let b = Handle::new(g.new_input(), false);
        let c = Handle::new(g.new_input(), false);
        let d = Handle::new(g.new_input(), false);
        let e = Handle::new(g.new_input(), false);
        let t1 = g.new_and2(a, b);
        let t2 = g.new_and2(t1, c);
        let y1 = g.new_and2(t2, d);
        let y2 = g.new_and2(t2, e);
        g.new_output(y1);
        g.new_output(y2);
        g
    }

    #[test]
    fn test_never_worsens() {
        let g = shared_prefix();
        let cuts = crate::CutStore::enumerate(&g, 4);
        let mut rec = MapRecord::new();
        AreaCover::new(FlowPolicy::Fanout)
            .record_cuts(&g, &cuts, &mut rec)
            .unwrap();
        let (before, _) = MapEst::new().estimate(&g, &cuts, &rec).unwrap();

        CutResub::new().run(&g, &cuts, &mut rec, None).unwrap();
        let (after, _) = MapEst::new().estimate(&g, &cuts, &rec).unwrap();
        assert!(after <= before);
    }

    #[test]
    fn test_idempotent_at_local_minimum() {
        let g = shared_prefix();
        let cuts = crate::CutStore::enumerate(&g, 4);
        let mut rec = MapRecord::new();
        AreaCover::new(FlowPolicy::Flow)
            .record_cuts(&g, &cuts, &mut rec)
            .unwrap();

        let mut resub = CutResub::new();
        resub.run(&g, &cuts, &mut rec, None).unwrap();
        let frozen = rec.clone();
        resub.run(&g, &cuts, &mut rec, None).unwrap();
        assert_eq!(frozen, rec);
    }

    #[test]
    fn test_depth_budget_respected() {
        let g = shared_prefix();
        let cuts = crate::CutStore::enumerate(&g, 2);
        let mut rec = MapRecord::new();
        DelayCover::new(FlowPolicy::Flow, 0)
            .record_cuts(&g, &cuts, &mut rec)
            .unwrap();
        let (_, depth_before) = MapEst::new().estimate(&g, &cuts, &rec).unwrap();

        CutResub::new().run(&g, &cuts, &mut rec, Some(0)).unwrap();
        let (_, depth_after) = MapEst::new().estimate(&g, &cuts, &rec).unwrap();
        assert!(depth_after <= depth_before);
    }

    #[test]
    fn test_covers_stay_complete() {
        let g = shared_prefix();
        let cuts = crate::CutStore::enumerate(&g, 3);
        let mut rec = MapRecord::new();
        AreaCover::new(FlowPolicy::Fanout)
            .record_cuts(&g, &cuts, &mut rec)
            .unwrap();
        CutResub::new().run(&g, &cuts, &mut rec, None).unwrap();
        // the estimator walks the cover from every output; it fails if a
        // needed node lost its cut
        assert!(MapEst::new().estimate(&g, &cuts, &rec).is_ok());
    }
}
