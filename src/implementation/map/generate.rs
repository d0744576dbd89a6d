//! Mapped-network generation: materializes a `MapRecord` as a `LutNetwork`.
//! Each output back-traces through the chosen cuts; every (node, polarity)
//! actually demanded becomes one LUT whose table is obtained by simulating
//! the cut cone over all leaf assignments, 64 patterns at a time. Inputs,
//! outputs, ports, DFFs and latches are inherited from the subject graph.

use crate::{
    CutStore, GateKind, Handle, LutDff, LutId, LutLatch, LutNetwork, MapError, MapRecord, NodeId,
    SubjectGraph, TruthTable,
};

use super::estimate::DemandMap;

/// Bit masks giving the value of leaf `i < 6` across one block of 64
/// consecutive input patterns.
const LEAF_MASK: [u64; 6] = [
    0xAAAA_AAAA_AAAA_AAAA,
    0xCCCC_CCCC_CCCC_CCCC,
    0xF0F0_F0F0_F0F0_F0F0,
    0xFF00_FF00_FF00_FF00,
    0xFFFF_0000_FFFF_0000,
    0xFFFF_FFFF_0000_0000,
];

/// The generator. One instance may be reused across calls; it keeps no state
/// between them.
#[derive(Default)]
pub struct MapGen {
    /// Scratch: simulation value per node of the cone being synthesized.
    values: Vec<u64>,
    /// Scratch: the cone nodes in topological order.
    cone: Vec<NodeId>,
}

impl MapGen {
    pub fn new() -> Self {
        Default::default()
    }

    /// Builds the mapped network and returns it along with its LUT count
    /// and depth.
    pub fn generate(
        &mut self,
        graph: &SubjectGraph,
        cuts: &CutStore,
        record: &MapRecord,
    ) -> Result<(LutNetwork, usize, usize), MapError> {
        let mut dm = DemandMap::compute(graph, cuts, record)?;
        let mut net = LutNetwork::new(graph.name());

        // mapped node per (subject node, polarity)
        let mut map_node: Vec<[Option<LutId>; 2]> = vec![[None; 2]; graph.node_num()];

        let const0 = dm
            .const0
            .then(|| net.new_lut(vec![], TruthTable::constant(false)));
        let const1 = dm
            .const1
            .then(|| net.new_lut(vec![], TruthTable::constant(true)));

        for &i in graph.inputs() {
            let id = net.new_input();
            let info = &mut dm.info[i.0];
            map_node[i.0][0] = Some(id);
            info.mapped[0] = true;
            if info.ref_count[1] > 0 {
                map_node[i.0][1] = Some(net.new_lut(vec![id], TruthTable::from_bits(1, 0b01)));
                info.mapped[1] = true;
                info.depth[1] = 1;
            }
        }

        for &v in graph.logics() {
            let demand = dm.info[v.0].ref_count;
            if demand[0] == 0 && demand[1] == 0 {
                continue;
            }
            let cut = record.cut(v).ok_or(MapError::Infeasible(v))?;
            let leaves = cuts.leaves(cut);
            let fanins: Vec<LutId> = leaves
                .iter()
                .map(|l| map_node[l.0][0].ok_or(MapError::Infeasible(*l)))
                .collect::<Result<_, _>>()?;
            let table = self.cut_table(graph, leaves, v);
            let leaf_depth = leaves
                .iter()
                .map(|l| dm.info[l.0].depth[0])
                .max()
                .unwrap_or(0);

            let info = &mut dm.info[v.0];
            if demand[0] > 0 {
                map_node[v.0][0] = Some(net.new_lut(fanins.clone(), table.clone()));
                info.mapped[0] = true;
                info.depth[0] = leaf_depth + 1;
            }
            if demand[1] > 0 {
                info.mapped[1] = true;
                if info.inv_req() {
                    map_node[v.0][1] = Some(net.new_lut(fanins, table.complement()));
                    info.depth[1] = leaf_depth + 1;
                } else {
                    let plain = map_node[v.0][0].expect("plain polarity mapped above");
                    map_node[v.0][1] =
                        Some(net.new_lut(vec![plain], TruthTable::from_bits(1, 0b01)));
                    info.depth[1] = info.depth[0] + 1;
                }
            }
        }

        let mut depth = 0;
        for &o in graph.outputs() {
            let h = graph.node(o).output_fanin();
            let target = match h.node() {
                None => {
                    if h.is_one() {
                        const1.expect("constant demand recorded")
                    } else {
                        const0.expect("constant demand recorded")
                    }
                }
                Some(d) => {
                    let inv = usize::from(h.inv());
                    debug_assert!(dm.info[d.0].mapped[inv]);
                    depth = depth.max(dm.info[d.0].depth[inv]);
                    map_node[d.0][inv].ok_or(MapError::Infeasible(d))?
                }
            };
            net.add_output(target);
        }

        // the sequential skeleton travels through unchanged
        let resolve_out = |o: NodeId, map_node: &Vec<[Option<LutId>; 2]>| -> Result<LutId, MapError> {
            let h = graph.node(o).output_fanin();
            match h.node() {
                None => Ok(if h.is_one() {
                    const1.expect("constant demand recorded")
                } else {
                    const0.expect("constant demand recorded")
                }),
                Some(d) => map_node[d.0][usize::from(h.inv())].ok_or(MapError::Infeasible(d)),
            }
        };
        let resolve_plain = |n: NodeId, map_node: &Vec<[Option<LutId>; 2]>| -> Result<LutId, MapError> {
            map_node[n.0][0].ok_or_else(|| {
                MapError::invalid("sequential or port pin is not driven by a mapped node")
            })
        };

        for dff in graph.dffs() {
            net.add_dff(LutDff {
                data: resolve_out(dff.data, &map_node)?,
                q: resolve_plain(dff.q, &map_node)?,
                clock: resolve_plain(dff.clock, &map_node)?,
                clear: dff.clear.map(|c| resolve_plain(c, &map_node)).transpose()?,
                preset: dff.preset.map(|p| resolve_plain(p, &map_node)).transpose()?,
            });
        }
        for latch in graph.latches() {
            net.add_latch(LutLatch {
                data: resolve_out(latch.data, &map_node)?,
                q: resolve_plain(latch.q, &map_node)?,
                enable: resolve_plain(latch.enable, &map_node)?,
                clear: latch
                    .clear
                    .map(|c| resolve_plain(c, &map_node))
                    .transpose()?,
                preset: latch
                    .preset
                    .map(|p| resolve_plain(p, &map_node))
                    .transpose()?,
            });
        }
        for port in graph.ports() {
            let bits = port
                .bits
                .iter()
                .map(|&b| {
                    if graph.node(b).is_output() {
                        resolve_out(b, &map_node)
                    } else {
                        resolve_plain(b, &map_node)
                    }
                })
                .collect::<Result<Vec<_>, _>>()?;
            net.add_port(port.name.clone(), bits);
        }

        let lut_num = net.lut_num();
        Ok((net, lut_num, depth))
    }

    /// Synthesizes the truth table of the cone rooted at `root` over the cut
    /// leaves, by batched simulation: each 64-pattern block assigns every
    /// leaf its pattern mask and evaluates the cone bottom-up.
    fn cut_table(&mut self, graph: &SubjectGraph, leaves: &[NodeId], root: NodeId) -> TruthTable {
        let k = leaves.len();

        // cone nodes between root and leaves; ids grow along the
        // topological order, so sorting them is enough
        self.cone.clear();
        let mut stack = vec![root];
        let mut visiting = vec![root];
        while let Some(v) = stack.pop() {
            if leaves.binary_search(&v).is_ok() {
                continue;
            }
            self.cone.push(v);
            for h in graph.node(v).fanins() {
                let f = h.node().expect("logic fanins are never constants");
                if !visiting.contains(&f) {
                    visiting.push(f);
                    stack.push(f);
                }
            }
        }
        self.cone.sort_unstable();

        self.values.resize(graph.node_num(), 0);
        let mut words = Vec::with_capacity(TruthTable::word_count(k));
        for block in 0..TruthTable::word_count(k) {
            for (i, l) in leaves.iter().enumerate() {
                self.values[l.0] = if i < 6 {
                    LEAF_MASK[i]
                } else if (block >> (i - 6)) & 1 == 1 {
                    !0
                } else {
                    0
                };
            }
            for &v in &self.cone {
                let node = graph.node(v);
                let [h0, h1] = node.fanins();
                let v0 = self.fanin_value(h0);
                let v1 = self.fanin_value(h1);
                self.values[v.0] = match node.gate() {
                    GateKind::And => v0 & v1,
                    GateKind::Xor => v0 ^ v1,
                };
            }
            words.push(self.values[root.0]);
        }
        TruthTable::new(k, words)
    }

    fn fanin_value(&self, h: Handle) -> u64 {
        let v = self.values[h.node().expect("logic fanins are never constants").0];
        if h.inv() {
            !v
        } else {
            v
        }
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_generate {
    use super::*;
    use crate::{AreaCover, DagCover, FlowPolicy, LutNode, MapEst, MapRecord};

    fn map_area(g: &SubjectGraph, k: usize) -> (CutStore, MapRecord) {
        let cuts = CutStore::enumerate(g, k);
        let mut rec = MapRecord::new();
        AreaCover::new(FlowPolicy::Flow)
            .record_cuts(g, &cuts, &mut rec)
            .unwrap();
        (cuts, rec)
    }

    #[test]
    fn test_reconvergent_xor_table() {
        // f = (a & b) ^ (a & c) over (a, b, c) is 0x28
        let mut g = SubjectGraph::new("t");
        let a = Handle::new(g.new_input(), false);
        let b = Handle::new(g.new_input(), false);
        let c = Handle::new(g.new_input(), false);
        let u = g.new_and2(a, b);
        let v = g.new_and2(a, c);
        let f = g.new_xor2(u, v);
        g.new_output(f);

        let (cuts, rec) = map_area(&g, 3);
        let (net, lut_num, depth) = MapGen::new().generate(&g, &cuts, &rec).unwrap();
        assert_eq!(1, lut_num);
        assert_eq!(1, depth);
        let (_, fanins, table) = net.luts().next().unwrap();
        assert_eq!(3, fanins.len());
        assert_eq!(&[0x28], table.words());
    }

    #[test]
    fn test_generate_agrees_with_estimate() {
        let mut g = SubjectGraph::new("t");
        let hs: Vec<Handle> = (0..6).map(|_| Handle::new(g.new_input(), false)).collect();
        let s1 = g.new_and(&hs[..3]);
        let s2 = g.new_xor(&hs[3..]);
        let y = g.new_and2(s1, s2.inverted());
        g.new_output(y);
        g.new_output(s1.inverted());

        let (cuts, rec) = map_area(&g, 4);
        let (_, lut_num, depth) = MapGen::new().generate(&g, &cuts, &rec).unwrap();
        let (est_num, est_depth) = MapEst::new().estimate(&g, &cuts, &rec).unwrap();
        assert_eq!(est_num, lut_num);
        assert_eq!(est_depth, depth);
    }

    #[test]
    fn test_round_trip_tables() {
        // every chosen cut's table must equal an exhaustive simulation of
        // the subject cone it realizes
        let mut g = SubjectGraph::new("t");
        let a = Handle::new(g.new_input(), false);
        let b = Handle::new(g.new_input(), false);
        let c = Handle::new(g.new_input(), false);
        let d = Handle::new(g.new_input(), false);
        let u = g.new_and2(a, b.inverted());
        let v = g.new_xor2(u, c);
        let w = g.new_and2(v, d);
        let y = g.new_xor2(w, a);
        g.new_output(y);

        let (cuts, rec) = map_area(&g, 4);
        let mut gen = MapGen::new();
        for &n in g.logics() {
            let Some(cut) = rec.cut(n) else { continue };
            let leaves = cuts.leaves(cut).to_vec();
            let table = gen.cut_table(&g, &leaves, n);
            for p in 0..(1usize << leaves.len()) {
                let mut vals = vec![None; g.node_num()];
                for (i, l) in leaves.iter().enumerate() {
                    vals[l.0] = Some((p >> i) & 1 == 1);
                }
                assert_eq!(eval(&g, n, &mut vals), table.bit(p), "pattern {p}");
            }
        }

        fn eval(g: &SubjectGraph, n: crate::NodeId, vals: &mut Vec<Option<bool>>) -> bool {
            if let Some(v) = vals[n.0] {
                return v;
            }
            let node = g.node(n);
            let [h0, h1] = node.fanins();
            let f = |h: Handle, g: &SubjectGraph, vals: &mut Vec<Option<bool>>| {
                eval(g, h.node().unwrap(), vals) ^ h.inv()
            };
            let (v0, v1) = (f(h0, g, vals), f(h1, g, vals));
            let v = match node.gate() {
                crate::GateKind::And => v0 && v1,
                crate::GateKind::Xor => v0 ^ v1,
            };
            vals[n.0] = Some(v);
            v
        }
    }

    #[test]
    fn test_constant_output_lut() {
        let mut g = SubjectGraph::new("t");
        let _a = g.new_input();
        g.new_output(Handle::zero());

        let cuts = CutStore::enumerate(&g, 2);
        let mut rec = MapRecord::new();
        rec.init(&g);
        let (net, lut_num, depth) = MapGen::new().generate(&g, &cuts, &rec).unwrap();
        assert_eq!(1, lut_num);
        assert_eq!(0, depth);
        let out = net.outputs()[0];
        match net.node(out) {
            LutNode::Lut { fanins, table } => {
                assert!(fanins.is_empty());
                assert!(!table.bit(0));
            }
            _ => panic!("constant output must be a 0-input LUT"),
        }
    }

    #[test]
    fn test_wide_cut_uses_two_words() {
        // a 7-input AND in one LUT needs a 128-bit table
        let mut g = SubjectGraph::new("t");
        let hs: Vec<Handle> = (0..7).map(|_| Handle::new(g.new_input(), false)).collect();
        let y = g.new_and(&hs);
        g.new_output(y);

        let (cuts, rec) = map_area(&g, 7);
        let (net, lut_num, _) = MapGen::new().generate(&g, &cuts, &rec).unwrap();
        assert_eq!(1, lut_num);
        let (_, fanins, table) = net.luts().next().unwrap();
        assert_eq!(7, fanins.len());
        assert_eq!(&[0, 0x8000_0000_0000_0000], table.words());
    }
}
