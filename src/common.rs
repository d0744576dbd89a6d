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

//! This module defines the most basic data types that are used throughout all
//! the code of our library (both at the abstraction and implementation
//! levels). These are also the types your client code is likely to work with.

use thiserror::Error;

// ----------------------------------------------------------------------------
// --- NODE ID ----------------------------------------------------------------
// ----------------------------------------------------------------------------
/// This type identifies one node of a subject graph. Each node is identified
/// with an integer ranging from 0 until `graph.node_num()`, and that integer
/// is the position of the node in the graph's node vector.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct NodeId(pub usize);
impl NodeId {
    #[inline]
    /// This function returns the id (numeric value) of the node.
    ///
    /// # Examples:
    /// ```
    /// # use lutmap::NodeId;
    /// assert_eq!(0, NodeId(0).id());
    /// assert_eq!(1, NodeId(1).id());
    /// ```
    pub fn id(self) -> usize {
        self.0
    }
}

// ----------------------------------------------------------------------------
// --- GATE KIND --------------------------------------------------------------
// ----------------------------------------------------------------------------
/// The type of a two-input logic node in the subject graph. Together with the
/// inversion bits carried by the fanin handles, these two primitives suffice
/// to express all the gate types of the source network.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum GateKind {
    And,
    Xor,
}

// ----------------------------------------------------------------------------
// --- HANDLE -----------------------------------------------------------------
// ----------------------------------------------------------------------------
/// A handle is a (possibly inverted) reference to a subject-graph node. The
/// two constants are not materialized as nodes: they are encoded as handles
/// referencing no node at all. The whole thing is packed in one machine word:
/// the low bit holds the inversion flag and the remaining bits hold the node
/// id (offset by one so that zero is left for the constants).
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct Handle(usize);

impl Handle {
    /// Creates a handle referencing `node`, inverted iff `inv` is true.
    pub fn new(node: NodeId, inv: bool) -> Self {
        Handle(((node.0 + 1) << 1) | usize::from(inv))
    }
    /// The constant-zero handle.
    pub const fn zero() -> Self {
        Handle(0)
    }
    /// The constant-one handle.
    pub const fn one() -> Self {
        Handle(1)
    }
    /// The referenced node, or `None` for a constant handle.
    pub fn node(self) -> Option<NodeId> {
        let raw = self.0 >> 1;
        if raw == 0 {
            None
        } else {
            Some(NodeId(raw - 1))
        }
    }
    /// True iff the handle carries an inversion.
    pub fn inv(self) -> bool {
        (self.0 & 1) == 1
    }
    /// True iff the handle encodes one of the two constants.
    pub fn is_const(self) -> bool {
        (self.0 >> 1) == 0
    }
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
    pub fn is_one(self) -> bool {
        self.0 == 1
    }
    /// The same handle with the opposite polarity.
    #[must_use]
    pub fn inverted(self) -> Self {
        Handle(self.0 ^ 1)
    }
    /// The same handle with the polarity forced positive.
    #[must_use]
    pub fn positive(self) -> Self {
        Handle(self.0 & !1)
    }
}

impl std::ops::Not for Handle {
    type Output = Handle;
    fn not(self) -> Handle {
        self.inverted()
    }
}

impl std::fmt::Debug for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.node() {
            None => write!(f, "Const({})", u8::from(self.inv())),
            Some(n) => {
                if self.inv() {
                    write!(f, "!{}", n.0)
                } else {
                    write!(f, "{}", n.0)
                }
            }
        }
    }
}

// ----------------------------------------------------------------------------
// --- ERRORS -----------------------------------------------------------------
// ----------------------------------------------------------------------------
/// The ways a mapping call can fail. Any error aborts the call: partial
/// results are never returned.
#[derive(Debug, Error)]
pub enum MapError {
    /// The source network (or a parameter) cannot be mapped at all. This is
    /// detected before any real work starts.
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },
    /// A node acquired no feasible cut during covering. This cannot happen
    /// once cut enumeration has completed; it is an internal consistency
    /// check surfaced as an error rather than a panic.
    #[error("no feasible cut for node {0:?}")]
    Infeasible(NodeId),
}

impl MapError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        MapError::InvalidInput {
            reason: reason.into(),
        }
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_handle {
    use crate::{Handle, NodeId};

    #[test]
    fn test_pack_unpack() {
        let h = Handle::new(NodeId(42), false);
        assert_eq!(Some(NodeId(42)), h.node());
        assert!(!h.inv());
        assert!(!h.is_const());

        let h = Handle::new(NodeId(0), true);
        assert_eq!(Some(NodeId(0)), h.node());
        assert!(h.inv());
    }

    #[test]
    fn test_constants() {
        assert!(Handle::zero().is_const());
        assert!(Handle::zero().is_zero());
        assert!(Handle::one().is_one());
        assert_eq!(None, Handle::zero().node());
        assert_eq!(Handle::one(), !Handle::zero());
    }

    #[test]
    fn test_invert() {
        let h = Handle::new(NodeId(7), false);
        assert_eq!(h, !!h);
        assert!((!h).inv());
        assert_eq!(h, (!h).positive());
    }
}
