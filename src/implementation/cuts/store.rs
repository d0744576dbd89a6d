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

//! The cut store owns every cut of one (graph, K) enumeration. A cut is a
//! root node plus an ordered list of at most K leaves such that every
//! root-to-input path goes through a leaf. Cuts are immutable once created;
//! they are stored as flat records whose leaf lists are ranges into one
//! shared pool, and they are addressed by value-type ids. Per node, the
//! store keeps the list of cuts rooted there, ordered by increasing leaf
//! count with the trivial cut last.

use crate::NodeId;

/// Identifies one cut inside a `CutStore`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct CutId(pub usize);

/// One cut record: the root and the range of its leaves in the leaf pool.
#[derive(Copy, Clone, Debug)]
struct CutRecord {
    root: NodeId,
    from: usize,
    to: usize,
}

/// Owns the cuts of one enumeration run. Populated once, then read-only.
#[derive(Clone, Debug)]
pub struct CutStore {
    /// The cut-size bound the store was enumerated with.
    limit: usize,
    /// Shared pool of leaf ids; each cut owns one contiguous slice.
    pool: Vec<NodeId>,
    cuts: Vec<CutRecord>,
    /// For each node id, the cuts rooted at that node.
    lists: Vec<Vec<CutId>>,
}

impl CutStore {
    pub(crate) fn with_node_count(node_num: usize, limit: usize) -> Self {
        CutStore {
            limit,
            pool: vec![],
            cuts: vec![],
            lists: vec![vec![]; node_num],
        }
    }

    /// The cut-size bound (K) this store was enumerated with.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Total number of cuts in the store.
    pub fn cut_num(&self) -> usize {
        self.cuts.len()
    }

    /// The root node of a cut.
    pub fn root(&self, cut: CutId) -> NodeId {
        self.cuts[cut.0].root
    }

    /// The leaves of a cut, sorted by ascending node id.
    pub fn leaves(&self, cut: CutId) -> &[NodeId] {
        let c = &self.cuts[cut.0];
        &self.pool[c.from..c.to]
    }

    pub fn leaf_num(&self, cut: CutId) -> usize {
        let c = &self.cuts[cut.0];
        c.to - c.from
    }

    /// True iff the cut is the singleton {root}.
    pub fn is_trivial(&self, cut: CutId) -> bool {
        self.leaf_num(cut) == 1 && self.leaves(cut)[0] == self.root(cut)
    }

    /// The cuts rooted at `node`, by increasing leaf count, trivial last.
    pub fn cuts_of(&self, node: NodeId) -> &[CutId] {
        &self.lists[node.0]
    }

    pub(crate) fn add_cut(&mut self, root: NodeId, leaves: &[NodeId]) -> CutId {
        debug_assert!(leaves.windows(2).all(|w| w[0] < w[1]));
        let id = CutId(self.cuts.len());
        let from = self.pool.len();
        self.pool.extend_from_slice(leaves);
        self.cuts.push(CutRecord {
            root,
            from,
            to: self.pool.len(),
        });
        self.lists[root.0].push(id);
        id
    }

    pub(crate) fn add_trivial(&mut self, node: NodeId) -> CutId {
        self.add_cut(node, &[node])
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_store {
    use super::*;

    #[test]
    fn test_add_and_query() {
        let mut store = CutStore::with_node_count(5, 3);
        let c = store.add_cut(NodeId(4), &[NodeId(0), NodeId(1), NodeId(2)]);
        let t = store.add_trivial(NodeId(4));

        assert_eq!(NodeId(4), store.root(c));
        assert_eq!(&[NodeId(0), NodeId(1), NodeId(2)], store.leaves(c));
        assert_eq!(3, store.leaf_num(c));
        assert!(!store.is_trivial(c));
        assert!(store.is_trivial(t));
        assert_eq!(&[c, t], store.cuts_of(NodeId(4)));
        assert!(store.cuts_of(NodeId(1)).is_empty());
    }
}
