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

//! The subject graph is the structure the mapper actually covers: a DAG of
//! two-input And/Xor nodes whose fanin handles carry the inversions, plus
//! input and output marker nodes. It is built once (usually from a
//! `BoolNetwork`) and never mutated afterwards.
//!
//! The builder folds constants and absorbs buffers/inverters on the fly, so
//! `Not` and `Buf` never materialize as nodes: an inverter chain collapses
//! into a single inverted handle.

use crate::{Expr, GateKind, Handle, NodeId};

/// What a subject-graph node is.
#[derive(Clone, Debug)]
pub enum SbjNodeKind {
    /// A primary input or the output of a DFF/latch. No fanin.
    Input,
    /// A primary output or the data pin of a DFF/latch. One fanin handle.
    Output { fanin: Handle },
    /// A two-input gate. The handles carry the fanin inversions.
    Logic { gate: GateKind, fanins: [Handle; 2] },
}

/// One node of the subject graph. Fanout edges are recorded so that reverse
/// traversals are O(fanout); edges towards output nodes are included in the
/// count.
#[derive(Clone, Debug)]
pub struct SbjNode {
    id: NodeId,
    kind: SbjNodeKind,
    fanouts: Vec<NodeId>,
    pomark: bool,
}

impl SbjNode {
    pub fn id(&self) -> NodeId {
        self.id
    }
    pub fn kind(&self) -> &SbjNodeKind {
        &self.kind
    }
    pub fn is_input(&self) -> bool {
        matches!(self.kind, SbjNodeKind::Input)
    }
    pub fn is_output(&self) -> bool {
        matches!(self.kind, SbjNodeKind::Output { .. })
    }
    pub fn is_logic(&self) -> bool {
        matches!(self.kind, SbjNodeKind::Logic { .. })
    }
    /// The two fanin handles of a logic node.
    pub fn fanins(&self) -> [Handle; 2] {
        match &self.kind {
            SbjNodeKind::Logic { fanins, .. } => *fanins,
            _ => panic!("fanins() called on a non-logic node"),
        }
    }
    pub fn fanin(&self, pos: usize) -> Handle {
        self.fanins()[pos]
    }
    pub fn gate(&self) -> GateKind {
        match &self.kind {
            SbjNodeKind::Logic { gate, .. } => *gate,
            _ => panic!("gate() called on a non-logic node"),
        }
    }
    /// The single fanin handle of an output node.
    pub fn output_fanin(&self) -> Handle {
        match &self.kind {
            SbjNodeKind::Output { fanin } => *fanin,
            _ => panic!("output_fanin() called on a non-output node"),
        }
    }
    /// The nodes (logic and output alike) referencing this node.
    pub fn fanouts(&self) -> &[NodeId] {
        &self.fanouts
    }
    pub fn fanout_num(&self) -> usize {
        self.fanouts.len()
    }
    /// True iff at least one output node references this node.
    pub fn pomark(&self) -> bool {
        self.pomark
    }
}

/// A D flip-flop of the subject graph. `data` is an output node, `q` an
/// input node; the control pins reference plain nodes.
#[derive(Clone, Debug)]
pub struct SbjDff {
    pub data: NodeId,
    pub q: NodeId,
    pub clock: NodeId,
    pub clear: Option<NodeId>,
    pub preset: Option<NodeId>,
}

/// A latch; same shape as a DFF with `enable` in place of the clock.
#[derive(Clone, Debug)]
pub struct SbjLatch {
    pub data: NodeId,
    pub q: NodeId,
    pub enable: NodeId,
    pub clear: Option<NodeId>,
    pub preset: Option<NodeId>,
}

/// A named bit-vector port.
#[derive(Clone, Debug)]
pub struct SbjPort {
    pub name: String,
    pub bits: Vec<NodeId>,
}

/// The subject graph itself. Node ids are dense in `0..node_num()` and every
/// node belongs to exactly one of the three ordered sequences (inputs,
/// outputs, logic). The logic sequence is topologically ordered: a node is
/// always created after both its fanins.
#[derive(Clone, Debug, Default)]
pub struct SubjectGraph {
    name: String,
    nodes: Vec<SbjNode>,
    inputs: Vec<NodeId>,
    outputs: Vec<NodeId>,
    logics: Vec<NodeId>,
    dffs: Vec<SbjDff>,
    latches: Vec<SbjLatch>,
    ports: Vec<SbjPort>,
}

impl SubjectGraph {
    pub fn new(name: impl Into<String>) -> Self {
        SubjectGraph {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn node(&self, id: NodeId) -> &SbjNode {
        &self.nodes[id.0]
    }
    pub fn node_num(&self) -> usize {
        self.nodes.len()
    }
    pub fn inputs(&self) -> &[NodeId] {
        &self.inputs
    }
    pub fn outputs(&self) -> &[NodeId] {
        &self.outputs
    }
    /// The logic nodes in topological (fanin-before-fanout) order.
    pub fn logics(&self) -> &[NodeId] {
        &self.logics
    }
    pub fn input_num(&self) -> usize {
        self.inputs.len()
    }
    pub fn output_num(&self) -> usize {
        self.outputs.len()
    }
    pub fn logic_num(&self) -> usize {
        self.logics.len()
    }
    pub fn dffs(&self) -> &[SbjDff] {
        &self.dffs
    }
    pub fn latches(&self) -> &[SbjLatch] {
        &self.latches
    }
    pub fn ports(&self) -> &[SbjPort] {
        &self.ports
    }

    // ------------------------------------------------------------------------
    // --- CONSTRUCTION -------------------------------------------------------
    // ------------------------------------------------------------------------

    pub fn new_input(&mut self) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(SbjNode {
            id,
            kind: SbjNodeKind::Input,
            fanouts: vec![],
            pomark: false,
        });
        self.inputs.push(id);
        id
    }

    /// Creates an output node fed by `fanin`. The referenced node (if any)
    /// gets its output mark set and a fanout edge added.
    pub fn new_output(&mut self, fanin: Handle) -> NodeId {
        let id = NodeId(self.nodes.len());
        if let Some(src) = fanin.node() {
            self.nodes[src.0].fanouts.push(id);
            self.nodes[src.0].pomark = true;
        }
        self.nodes.push(SbjNode {
            id,
            kind: SbjNodeKind::Output { fanin },
            fanouts: vec![],
            pomark: false,
        });
        self.outputs.push(id);
        id
    }

    fn new_logic(&mut self, gate: GateKind, fanins: [Handle; 2]) -> Handle {
        let id = NodeId(self.nodes.len());
        for h in fanins {
            let src = h.node().expect("logic fanins cannot be constants");
            debug_assert!(
                !self.nodes[src.0].is_output(),
                "logic fanins never reference outputs"
            );
            self.nodes[src.0].fanouts.push(id);
        }
        self.nodes.push(SbjNode {
            id,
            kind: SbjNodeKind::Logic { gate, fanins },
            fanouts: vec![],
            pomark: false,
        });
        self.logics.push(id);
        Handle::new(id, false)
    }

    /// Two-input AND with constant folding and the trivial absorptions.
    pub fn new_and2(&mut self, a: Handle, b: Handle) -> Handle {
        if a.is_zero() || b.is_zero() || a == b.inverted() {
            Handle::zero()
        } else if a.is_one() || a == b {
            b
        } else if b.is_one() {
            a
        } else {
            self.new_logic(GateKind::And, [a, b])
        }
    }

    /// Two-input XOR. Inversions are folded out of the node and returned on
    /// the handle, so XOR fanins are always positive.
    pub fn new_xor2(&mut self, a: Handle, b: Handle) -> Handle {
        if a.is_const() {
            return if a.is_one() { b.inverted() } else { b };
        }
        if b.is_const() {
            return if b.is_one() { a.inverted() } else { a };
        }
        if a == b {
            return Handle::zero();
        }
        if a == b.inverted() {
            return Handle::one();
        }
        let inv = a.inv() ^ b.inv();
        let h = self.new_logic(GateKind::Xor, [a.positive(), b.positive()]);
        if inv {
            h.inverted()
        } else {
            h
        }
    }

    /// N-ary AND, decomposed into a balanced tree of two-input nodes.
    pub fn new_and(&mut self, fanins: &[Handle]) -> Handle {
        if fanins.iter().any(|h| h.is_zero()) {
            return Handle::zero();
        }
        let live: Vec<Handle> = fanins.iter().copied().filter(|h| !h.is_one()).collect();
        self.balanced(&live, Handle::one(), Self::new_and2)
    }

    /// N-ary OR, through De Morgan over the AND builder.
    pub fn new_or(&mut self, fanins: &[Handle]) -> Handle {
        let inverted: Vec<Handle> = fanins.iter().map(|h| h.inverted()).collect();
        self.new_and(&inverted).inverted()
    }

    /// N-ary XOR (balanced tree).
    pub fn new_xor(&mut self, fanins: &[Handle]) -> Handle {
        self.balanced(fanins, Handle::zero(), Self::new_xor2)
    }

    fn balanced(
        &mut self,
        fanins: &[Handle],
        empty: Handle,
        mut op: impl Copy + FnMut(&mut Self, Handle, Handle) -> Handle,
    ) -> Handle {
        match fanins.len() {
            0 => empty,
            1 => fanins[0],
            n => {
                let (lo, hi) = fanins.split_at(n / 2);
                let l = self.balanced(lo, empty, op);
                let r = self.balanced(hi, empty, op);
                op(self, l, r)
            }
        }
    }

    /// Builds the handle realizing `expr` over the given fanin handles.
    pub fn new_expr(&mut self, expr: &Expr, fanins: &[Handle]) -> Handle {
        match expr {
            Expr::Const0 => Handle::zero(),
            Expr::Const1 => Handle::one(),
            Expr::Var(i) => fanins[*i],
            Expr::Not(e) => self.new_expr(e, fanins).inverted(),
            Expr::And(es) => {
                let hs: Vec<Handle> = es.iter().map(|e| self.new_expr(e, fanins)).collect();
                self.new_and(&hs)
            }
            Expr::Or(es) => {
                let hs: Vec<Handle> = es.iter().map(|e| self.new_expr(e, fanins)).collect();
                self.new_or(&hs)
            }
            Expr::Xor(es) => {
                let hs: Vec<Handle> = es.iter().map(|e| self.new_expr(e, fanins)).collect();
                self.new_xor(&hs)
            }
        }
    }

    pub fn add_dff(&mut self, dff: SbjDff) {
        self.dffs.push(dff);
    }
    pub fn add_latch(&mut self, latch: SbjLatch) {
        self.latches.push(latch);
    }
    pub fn add_port(&mut self, name: impl Into<String>, bits: Vec<NodeId>) {
        self.ports.push(SbjPort {
            name: name.into(),
            bits,
        });
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
