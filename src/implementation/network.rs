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

//! This module provides the two network containers the mapper talks to:
//! `BoolNetwork` is the technology-independent Boolean network handed in by
//! the caller (typically produced by some file front end, which is not part
//! of this crate), and `LutNetwork` is the mapped result where every
//! combinational node is a truth-table LUT. Sequential elements (DFFs and
//! latches) and ports travel through the mapper unchanged.

// ----------------------------------------------------------------------------
// --- BOOLEAN NETWORK (input side) -------------------------------------------
// ----------------------------------------------------------------------------

/// Identifies one node of a `BoolNetwork`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct BnId(pub usize);

/// A Boolean expression over the fanins of an expression node. `Var(i)`
/// denotes the i-th fanin.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Expr {
    Const0,
    Const1,
    Var(usize),
    Not(Box<Expr>),
    And(Vec<Expr>),
    Or(Vec<Expr>),
    Xor(Vec<Expr>),
}

/// The functional type of a `BoolNetwork` logic node.
#[derive(Clone, Debug, PartialEq)]
pub enum BnNodeType {
    C0,
    C1,
    Buf,
    Not,
    And,
    Nand,
    Or,
    Nor,
    Xor,
    Xnor,
    /// An arbitrary expression over the fanins.
    Expr(Expr),
    /// A truth-vector node. The mapper rejects these on input (they only
    /// ever appear in mapped networks, which use `LutNetwork` instead).
    TvFunc(TruthTable),
}

/// One node of a `BoolNetwork`: either an input (no fanin) or a typed logic
/// node over previously created nodes.
#[derive(Clone, Debug)]
pub enum BnNode {
    Input,
    Logic { ty: BnNodeType, fanins: Vec<BnId> },
}

/// A D flip-flop: `data` is sampled on `clock` and shows up on `q`.
#[derive(Clone, Debug)]
pub struct BnDff {
    pub data: BnId,
    pub q: BnId,
    pub clock: BnId,
    pub clear: Option<BnId>,
    pub preset: Option<BnId>,
}

/// A level-sensitive latch; same shape as a DFF with `enable` in place of
/// the clock.
#[derive(Clone, Debug)]
pub struct BnLatch {
    pub data: BnId,
    pub q: BnId,
    pub enable: BnId,
    pub clear: Option<BnId>,
    pub preset: Option<BnId>,
}

/// A named bit-vector port.
#[derive(Clone, Debug)]
pub struct BnPort {
    pub name: String,
    pub bits: Vec<BnId>,
}

/// The input container: a technology-independent Boolean network. Logic
/// nodes must be created fanin-first (the constructor methods check this),
/// so iterating them in creation order is a topological traversal.
#[derive(Clone, Debug, Default)]
pub struct BoolNetwork {
    name: String,
    nodes: Vec<BnNode>,
    inputs: Vec<BnId>,
    outputs: Vec<BnId>,
    dffs: Vec<BnDff>,
    latches: Vec<BnLatch>,
    ports: Vec<BnPort>,
}

impl BoolNetwork {
    pub fn new(name: impl Into<String>) -> Self {
        BoolNetwork {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn node(&self, id: BnId) -> &BnNode {
        &self.nodes[id.0]
    }
    pub fn node_num(&self) -> usize {
        self.nodes.len()
    }
    pub fn inputs(&self) -> &[BnId] {
        &self.inputs
    }
    pub fn outputs(&self) -> &[BnId] {
        &self.outputs
    }
    pub fn dffs(&self) -> &[BnDff] {
        &self.dffs
    }
    pub fn latches(&self) -> &[BnLatch] {
        &self.latches
    }
    pub fn ports(&self) -> &[BnPort] {
        &self.ports
    }
    /// All node ids in creation (hence topological) order.
    pub fn node_ids(&self) -> impl Iterator<Item = BnId> {
        (0..self.nodes.len()).map(BnId)
    }

    /// Creates a primary input (or sequential output) node.
    pub fn new_input(&mut self) -> BnId {
        let id = BnId(self.nodes.len());
        self.nodes.push(BnNode::Input);
        self.inputs.push(id);
        id
    }

    /// Creates a typed logic node. All fanins must already exist.
    pub fn new_logic(&mut self, ty: BnNodeType, fanins: Vec<BnId>) -> BnId {
        assert!(
            fanins.iter().all(|f| f.0 < self.nodes.len()),
            "logic fanins must be created before the node that uses them"
        );
        let id = BnId(self.nodes.len());
        self.nodes.push(BnNode::Logic { ty, fanins });
        id
    }

    /// Declares `src` to drive a primary output (or a sequential data pin).
    pub fn add_output(&mut self, src: BnId) {
        self.outputs.push(src);
    }

    pub fn add_dff(&mut self, dff: BnDff) {
        self.dffs.push(dff);
    }
    pub fn add_latch(&mut self, latch: BnLatch) {
        self.latches.push(latch);
    }
    pub fn add_port(&mut self, name: impl Into<String>, bits: Vec<BnId>) {
        self.ports.push(BnPort {
            name: name.into(),
            bits,
        });
    }
}

// ----------------------------------------------------------------------------
// --- TRUTH TABLE ------------------------------------------------------------
// ----------------------------------------------------------------------------

/// The truth table of a LUT: a 2^k-bit vector over k inputs, packed in
/// 64-bit words. Bit p of the table is the function value under the input
/// assignment where input i takes bit i of p.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct TruthTable {
    num_vars: usize,
    words: Vec<u64>,
}

impl TruthTable {
    /// Number of 64-bit words needed for a table over `num_vars` inputs.
    pub fn word_count(num_vars: usize) -> usize {
        if num_vars < 6 {
            1
        } else {
            1 << (num_vars - 6)
        }
    }

    /// Builds a table from raw words; unused high bits are masked off.
    pub fn new(num_vars: usize, mut words: Vec<u64>) -> Self {
        assert_eq!(Self::word_count(num_vars), words.len());
        if num_vars < 6 {
            words[0] &= (1u64 << (1 << num_vars)) - 1;
        }
        TruthTable { num_vars, words }
    }

    /// Convenience constructor for tables of at most 6 inputs.
    pub fn from_bits(num_vars: usize, bits: u64) -> Self {
        assert!(num_vars <= 6);
        Self::new(num_vars, vec![bits])
    }

    /// The constant-0 or constant-1 zero-input table.
    pub fn constant(value: bool) -> Self {
        Self::from_bits(0, u64::from(value))
    }

    pub fn num_vars(&self) -> usize {
        self.num_vars
    }
    pub fn words(&self) -> &[u64] {
        &self.words
    }

    /// The function value for input pattern `p`.
    pub fn bit(&self, p: usize) -> bool {
        (self.words[p >> 6] >> (p & 63)) & 1 == 1
    }

    /// The complemented table.
    #[must_use]
    pub fn complement(&self) -> Self {
        let words = self.words.iter().map(|w| !w).collect();
        Self::new(self.num_vars, words)
    }
}

// ----------------------------------------------------------------------------
// --- LUT NETWORK (output side) ----------------------------------------------
// ----------------------------------------------------------------------------

/// Identifies one node of a `LutNetwork`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct LutId(pub usize);

/// One node of the mapped network.
#[derive(Clone, Debug)]
pub enum LutNode {
    Input,
    Lut {
        fanins: Vec<LutId>,
        table: TruthTable,
    },
}

#[derive(Clone, Debug)]
pub struct LutDff {
    pub data: LutId,
    pub q: LutId,
    pub clock: LutId,
    pub clear: Option<LutId>,
    pub preset: Option<LutId>,
}

#[derive(Clone, Debug)]
pub struct LutLatch {
    pub data: LutId,
    pub q: LutId,
    pub enable: LutId,
    pub clear: Option<LutId>,
    pub preset: Option<LutId>,
}

#[derive(Clone, Debug)]
pub struct LutPort {
    pub name: String,
    pub bits: Vec<LutId>,
}

/// The mapped result: same port/DFF/latch topology as the source network,
/// with every combinational node turned into a truth-table LUT.
#[derive(Clone, Debug, Default)]
pub struct LutNetwork {
    name: String,
    nodes: Vec<LutNode>,
    inputs: Vec<LutId>,
    outputs: Vec<LutId>,
    dffs: Vec<LutDff>,
    latches: Vec<LutLatch>,
    ports: Vec<LutPort>,
}

impl LutNetwork {
    pub fn new(name: impl Into<String>) -> Self {
        LutNetwork {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn node(&self, id: LutId) -> &LutNode {
        &self.nodes[id.0]
    }
    pub fn node_num(&self) -> usize {
        self.nodes.len()
    }
    pub fn inputs(&self) -> &[LutId] {
        &self.inputs
    }
    pub fn outputs(&self) -> &[LutId] {
        &self.outputs
    }
    pub fn dffs(&self) -> &[LutDff] {
        &self.dffs
    }
    pub fn latches(&self) -> &[LutLatch] {
        &self.latches
    }
    pub fn ports(&self) -> &[LutPort] {
        &self.ports
    }

    /// Number of LUT nodes (inputs excluded).
    pub fn lut_num(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, LutNode::Lut { .. }))
            .count()
    }

    /// All LUT nodes in creation order, with their ids.
    pub fn luts(&self) -> impl Iterator<Item = (LutId, &[LutId], &TruthTable)> {
        self.nodes.iter().enumerate().filter_map(|(i, n)| match n {
            LutNode::Input => None,
            LutNode::Lut { fanins, table } => Some((LutId(i), fanins.as_slice(), table)),
        })
    }

    pub fn new_input(&mut self) -> LutId {
        let id = LutId(self.nodes.len());
        self.nodes.push(LutNode::Input);
        self.inputs.push(id);
        id
    }

    pub fn new_lut(&mut self, fanins: Vec<LutId>, table: TruthTable) -> LutId {
        assert_eq!(fanins.len(), table.num_vars());
        let id = LutId(self.nodes.len());
        self.nodes.push(LutNode::Lut { fanins, table });
        id
    }

    pub fn add_output(&mut self, src: LutId) {
        self.outputs.push(src);
    }
    pub fn add_dff(&mut self, dff: LutDff) {
        self.dffs.push(dff);
    }
    pub fn add_latch(&mut self, latch: LutLatch) {
        self.latches.push(latch);
    }
    pub fn add_port(&mut self, name: impl Into<String>, bits: Vec<LutId>) {
        self.ports.push(LutPort {
            name: name.into(),
            bits,
        });
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
