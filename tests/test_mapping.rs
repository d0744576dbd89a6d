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

//! End-to-end mapping scenarios through the `LutMapper` facade.

#![cfg(test)]

use lutmap::*;

fn mapper(k: usize, policy: FlowPolicy, algorithm: Algorithm) -> LutMapper {
    LutMapper::new(
        MapParamsBuilder::default()
            .cut_size(k)
            .flow_policy(policy)
            .algorithm(algorithm)
            .build()
            .unwrap(),
    )
}

/// Inputs a, b, c; t = a & b; y = t & c.
fn tiny_and() -> BoolNetwork {
    let mut bn = BoolNetwork::new("tiny_and");
    let a = bn.new_input();
    let b = bn.new_input();
    let c = bn.new_input();
    let t = bn.new_logic(BnNodeType::And, vec![a, b]);
    let y = bn.new_logic(BnNodeType::And, vec![t, c]);
    bn.add_output(y);
    bn
}

#[test]
fn tiny_and_is_one_lut() {
    let out = mapper(3, FlowPolicy::Flow, Algorithm::Area)
        .map(&tiny_and())
        .unwrap();
    assert_eq!(1, out.lut_num);
    assert_eq!(1, out.depth);
    let (_, fanins, table) = out.network.luts().next().unwrap();
    assert_eq!(3, fanins.len());
    assert_eq!(&[0x80], table.words());
}

#[test]
fn inverter_chain_collapses() {
    let mut bn = BoolNetwork::new("inverters");
    let a = bn.new_input();
    let mut cur = a;
    for _ in 0..9 {
        cur = bn.new_logic(BnNodeType::Not, vec![cur]);
    }
    bn.add_output(cur);

    let out = mapper(4, FlowPolicy::Fanout, Algorithm::Area)
        .map(&bn)
        .unwrap();
    assert_eq!(1, out.lut_num);
    assert_eq!(1, out.depth);
    // nine inverters collapse to a single NOT-LUT
    let (_, fanins, table) = out.network.luts().next().unwrap();
    assert_eq!(1, fanins.len());
    assert!(table.bit(0) && !table.bit(1));
}

#[test]
fn reconvergent_xor_truth_table() {
    // f = (a & b) ^ (a & c) over (a, b, c): 0x28
    let mut bn = BoolNetwork::new("reconv");
    let a = bn.new_input();
    let b = bn.new_input();
    let c = bn.new_input();
    let u = bn.new_logic(BnNodeType::And, vec![a, b]);
    let v = bn.new_logic(BnNodeType::And, vec![a, c]);
    let f = bn.new_logic(BnNodeType::Xor, vec![u, v]);
    bn.add_output(f);

    let out = mapper(3, FlowPolicy::Flow, Algorithm::Area).map(&bn).unwrap();
    assert_eq!(1, out.lut_num);
    let (_, fanins, table) = out.network.luts().next().unwrap();
    assert_eq!(3, fanins.len());
    assert_eq!(&[0x28], table.words());
}

/// A balanced AND tree over 8 inputs.
fn and_tree() -> BoolNetwork {
    let mut bn = BoolNetwork::new("and8");
    let inputs: Vec<_> = (0..8).map(|_| bn.new_input()).collect();
    let mut level = inputs;
    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|p| bn.new_logic(BnNodeType::And, vec![p[0], p[1]]))
            .collect();
    }
    bn.add_output(level[0]);
    bn
}

#[test]
fn depth_vs_area_tradeoff() {
    let m0 = mapper(2, FlowPolicy::Flow, Algorithm::Delay { slack: 0 });
    let out0 = m0.map(&and_tree()).unwrap();
    assert_eq!(3, out0.depth);
    assert_eq!(7, out0.lut_num);

    let m1 = mapper(2, FlowPolicy::Flow, Algorithm::Delay { slack: 1 });
    let out1 = m1.map(&and_tree()).unwrap();
    assert!(out1.depth <= 4);
    assert_eq!(7, out1.lut_num);
}

#[test]
fn multi_output_sharing() {
    // y1 = (a & b) & c, y2 = (a & b) & d
    let mut bn = BoolNetwork::new("share");
    let a = bn.new_input();
    let b = bn.new_input();
    let c = bn.new_input();
    let d = bn.new_input();
    let t = bn.new_logic(BnNodeType::And, vec![a, b]);
    let y1 = bn.new_logic(BnNodeType::And, vec![t, c]);
    let y2 = bn.new_logic(BnNodeType::And, vec![t, d]);
    bn.add_output(y1);
    bn.add_output(y2);

    let flow = mapper(3, FlowPolicy::Flow, Algorithm::Area).map(&bn).unwrap();
    assert_eq!(2, flow.lut_num);

    let fanout = mapper(3, FlowPolicy::Fanout, Algorithm::Area).map(&bn).unwrap();
    assert!(fanout.lut_num <= 3);
}

#[test]
fn k_feasibility_of_the_result() {
    let bn = and_tree();
    for k in [2, 3, 4, 5] {
        let out = mapper(k, FlowPolicy::Fanout, Algorithm::Area).map(&bn).unwrap();
        for (_, fanins, table) in out.network.luts() {
            assert!(fanins.len() <= k);
            assert_eq!(fanins.len(), table.num_vars());
        }
    }
}

#[test]
fn gate_zoo_maps_correctly() {
    // one output per gate flavor over the same two inputs
    let mut bn = BoolNetwork::new("zoo");
    let a = bn.new_input();
    let b = bn.new_input();
    let tys = [
        (BnNodeType::And, 0b1000u64),
        (BnNodeType::Nand, 0b0111),
        (BnNodeType::Or, 0b1110),
        (BnNodeType::Nor, 0b0001),
        (BnNodeType::Xor, 0b0110),
        (BnNodeType::Xnor, 0b1001),
    ];
    for (ty, _) in tys.iter() {
        let n = bn.new_logic(ty.clone(), vec![a, b]);
        bn.add_output(n);
    }

    let out = mapper(2, FlowPolicy::Flow, Algorithm::Area).map(&bn).unwrap();
    assert_eq!(1, out.depth);
    for (i, &o) in out.network.outputs().iter().enumerate() {
        match out.network.node(o) {
            LutNode::Lut { fanins, table } => {
                assert_eq!(2, fanins.len());
                assert_eq!(&[tys[i].1], table.words(), "flavor {i}");
            }
            LutNode::Input => panic!("output {i} must be a LUT"),
        }
    }
}

#[test]
fn expression_nodes() {
    // y = (a | b) & !c as one expression node
    let mut bn = BoolNetwork::new("expr");
    let a = bn.new_input();
    let b = bn.new_input();
    let c = bn.new_input();
    let e = Expr::And(vec![
        Expr::Or(vec![Expr::Var(0), Expr::Var(1)]),
        Expr::Not(Box::new(Expr::Var(2))),
    ]);
    let y = bn.new_logic(BnNodeType::Expr(e), vec![a, b, c]);
    bn.add_output(y);

    let out = mapper(3, FlowPolicy::Flow, Algorithm::Area).map(&bn).unwrap();
    assert_eq!(1, out.lut_num);
    let (_, _, table) = out.network.luts().next().unwrap();
    // (a | b) & !c: patterns 1, 2, 3
    assert_eq!(&[0b0000_1110], table.words());
}

#[test]
fn sequential_skeleton_travels_through() {
    // q feeds back through one AND gate into the DFF data pin
    let mut bn = BoolNetwork::new("dff");
    let clk = bn.new_input();
    let en = bn.new_input();
    let q = bn.new_input();
    let data = bn.new_logic(BnNodeType::And, vec![en, q]);
    bn.add_output(data);
    bn.add_dff(BnDff {
        data,
        q,
        clock: clk,
        clear: None,
        preset: None,
    });
    bn.add_port("clk", vec![clk]);

    let out = mapper(4, FlowPolicy::Flow, Algorithm::Area).map(&bn).unwrap();
    assert_eq!(1, out.lut_num);
    assert_eq!(1, out.network.dffs().len());
    let dff = &out.network.dffs()[0];
    assert!(matches!(out.network.node(dff.q), LutNode::Input));
    assert!(matches!(out.network.node(dff.data), LutNode::Lut { .. }));
    assert_eq!(1, out.network.ports().len());
}

#[test]
fn truth_vector_input_rejected() {
    let mut bn = BoolNetwork::new("tv");
    let a = bn.new_input();
    let tv = bn.new_logic(BnNodeType::TvFunc(TruthTable::from_bits(1, 0b10)), vec![a]);
    bn.add_output(tv);

    let err = mapper(4, FlowPolicy::Flow, Algorithm::Area).map(&bn);
    assert!(matches!(err, Err(MapError::InvalidInput { .. })));
}

#[test]
fn resub_never_worsens_the_area() {
    let bn = and_tree();
    let with = LutMapper::new(
        MapParamsBuilder::default()
            .cut_size(4)
            .cut_resub(true)
            .build()
            .unwrap(),
    );
    let without = LutMapper::new(
        MapParamsBuilder::default()
            .cut_size(4)
            .cut_resub(false)
            .build()
            .unwrap(),
    );
    let w = with.map(&bn).unwrap();
    let wo = without.map(&bn).unwrap();
    assert!(w.lut_num <= wo.lut_num);
}
