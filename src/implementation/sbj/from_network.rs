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

//! Conversion of a `BoolNetwork` into the two-input subject graph the mapper
//! covers. All the gate flavors of the source network are expressed with
//! And/Xor nodes and inverted handles; buffers and inverters vanish into the
//! handles. Truth-vector nodes are rejected with a diagnostic.

use crate::{
    BnDff, BnId, BnLatch, BnNode, BnNodeType, BoolNetwork, Handle, MapError, MessageSink, NodeId,
    SbjDff, SbjLatch, SubjectGraph,
};

/// Converts `src` into a subject graph. The conversion fails fast on
/// unsupported node types; nothing is returned in that case.
pub fn from_network(src: &BoolNetwork, sink: &dyn MessageSink) -> Result<SubjectGraph, MapError> {
    let mut graph = SubjectGraph::new(src.name());

    // handle realizing each source node
    let mut node_map: Vec<Handle> = vec![Handle::zero(); src.node_num()];

    for id in src.node_ids() {
        let handle = match src.node(id) {
            BnNode::Input => Handle::new(graph.new_input(), false),
            BnNode::Logic { ty, fanins } => {
                let fh: Vec<Handle> = fanins.iter().map(|f| node_map[f.0]).collect();
                match ty {
                    BnNodeType::C0 => Handle::zero(),
                    BnNodeType::C1 => Handle::one(),
                    BnNodeType::Buf => fh[0],
                    BnNodeType::Not => fh[0].inverted(),
                    BnNodeType::And => graph.new_and(&fh),
                    BnNodeType::Nand => graph.new_and(&fh).inverted(),
                    BnNodeType::Or => graph.new_or(&fh),
                    BnNodeType::Nor => graph.new_or(&fh).inverted(),
                    BnNodeType::Xor => graph.new_xor(&fh),
                    BnNodeType::Xnor => graph.new_xor(&fh).inverted(),
                    BnNodeType::Expr(expr) => graph.new_expr(expr, &fh),
                    BnNodeType::TvFunc(_) => {
                        sink.emit(&format!(
                            "node {} is a truth-vector node, which is not supported",
                            id.0
                        ));
                        return Err(MapError::invalid("truth-vector node in source network"));
                    }
                }
            }
        };
        node_map[id.0] = handle;
    }

    // one output node per declared output source; remember which output node
    // realizes which source id so the sequential elements can find them.
    let mut out_map: Vec<Option<NodeId>> = vec![None; src.node_num()];
    for &oid in src.outputs() {
        let onode = graph.new_output(node_map[oid.0]);
        out_map[oid.0] = Some(onode);
    }

    let plain = |node_map: &[Handle], id: BnId, what: &str| -> Result<NodeId, MapError> {
        let h = node_map[id.0];
        if h.inv() || h.is_const() {
            Err(MapError::invalid(format!(
                "{what} pin must be a plain (non-inverted, non-constant) node"
            )))
        } else {
            Ok(h.node().unwrap())
        }
    };
    let data_of = |out_map: &[Option<NodeId>], id: BnId, what: &str| -> Result<NodeId, MapError> {
        out_map[id.0].ok_or_else(|| {
            MapError::invalid(format!("{what} data pin is not a declared output"))
        })
    };

    for BnDff {
        data,
        q,
        clock,
        clear,
        preset,
    } in src.dffs()
    {
        graph.add_dff(SbjDff {
            data: data_of(&out_map, *data, "dff")?,
            q: plain(&node_map, *q, "dff q")?,
            clock: plain(&node_map, *clock, "dff clock")?,
            clear: clear.map(|c| plain(&node_map, c, "dff clear")).transpose()?,
            preset: preset
                .map(|p| plain(&node_map, p, "dff preset"))
                .transpose()?,
        });
    }

    for BnLatch {
        data,
        q,
        enable,
        clear,
        preset,
    } in src.latches()
    {
        graph.add_latch(SbjLatch {
            data: data_of(&out_map, *data, "latch")?,
            q: plain(&node_map, *q, "latch q")?,
            enable: plain(&node_map, *enable, "latch enable")?,
            clear: clear
                .map(|c| plain(&node_map, c, "latch clear"))
                .transpose()?,
            preset: preset
                .map(|p| plain(&node_map, p, "latch preset"))
                .transpose()?,
        });
    }

    for port in src.ports() {
        let bits = port
            .bits
            .iter()
            .map(|&b| {
                out_map[b.0]
                    .map(Ok)
                    .unwrap_or_else(|| plain(&node_map, b, "port"))
            })
            .collect::<Result<Vec<_>, _>>()?;
        graph.add_port(port.name.clone(), bits);
    }

    Ok(graph)
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
