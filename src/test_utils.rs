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

//! This module provides utilities which are reused by the tests of several
//! modules (hence it is only compiled for tests).

use crate::{Handle, SubjectGraph};

/// A seeded pseudo-random two-input network with reconvergence and shared
/// fanout, sized by its gate count. The same seed always yields the same
/// graph.
pub(crate) fn random_graph(gates: usize, seed: u64) -> SubjectGraph {
    let mut g = SubjectGraph::new("bench");
    let mut pool: Vec<Handle> = (0..8).map(|_| Handle::new(g.new_input(), false)).collect();
    let mut x = seed | 1;
    let mut next = move || {
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        x
    };
    while g.logic_num() < gates {
        let i = (next() as usize) % pool.len();
        let j = (next() as usize) % pool.len();
        let a = pool[i];
        let b = if next() % 4 == 0 {
            pool[j].inverted()
        } else {
            pool[j]
        };
        let h = if next() % 3 == 0 {
            g.new_xor2(a, b)
        } else {
            g.new_and2(a, b)
        };
        if h.is_const() || h.node().map_or(true, |n| !g.node(n).is_logic()) {
            continue;
        }
        pool.push(h);
    }
    // the freshest signals become the outputs
    for h in pool.iter().rev().take(4) {
        g.new_output(*h);
    }
    g
}
