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

//! This example shows how to drive the mapper end to end. Since file front
//! ends are not part of the crate, the circuit is generated: either a ripple
//! carry adder of a requested width, or a seeded random gate soup. The demo
//! maps it with the requested parameters and prints the resulting counts.

use clap::Parser;
use lutmap::*;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The circuit to generate: "adder" or "random"
    #[clap(short, long, default_value = "adder")]
    circuit: String,
    /// Adder width (bits) or random gate count
    #[clap(short, long, default_value = "16")]
    size: usize,
    /// The LUT input bound (K)
    #[clap(short, long, default_value = "5")]
    k: usize,
    /// The covering algorithm: "area", "delay", "mct" or "sa"
    #[clap(short, long, default_value = "area")]
    algorithm: String,
    /// Delay slack (only meaningful with the delay algorithm)
    #[clap(long, default_value = "0")]
    slack: usize,
    /// Meta-search trial count
    #[clap(short, long, default_value = "1000")]
    trials: usize,
    /// Use flow weights instead of fanout weights
    #[clap(long)]
    flow: bool,
    /// Disable the resubstitution post-pass
    #[clap(long)]
    no_resub: bool,
    /// Seed of the meta-search PRNG
    #[clap(long, default_value = "0")]
    seed: u64,
}

/// A ripple carry adder: two `width`-bit operands, one carry in.
fn adder(width: usize) -> BoolNetwork {
    let mut bn = BoolNetwork::new("adder");
    let xs: Vec<BnId> = (0..width).map(|_| bn.new_input()).collect();
    let ys: Vec<BnId> = (0..width).map(|_| bn.new_input()).collect();
    let mut carry = bn.new_input();

    for i in 0..width {
        let p = bn.new_logic(BnNodeType::Xor, vec![xs[i], ys[i]]);
        let s = bn.new_logic(BnNodeType::Xor, vec![p, carry]);
        let g = bn.new_logic(BnNodeType::And, vec![xs[i], ys[i]]);
        let pc = bn.new_logic(BnNodeType::And, vec![p, carry]);
        carry = bn.new_logic(BnNodeType::Or, vec![g, pc]);
        bn.add_output(s);
    }
    bn.add_output(carry);
    bn
}

/// A seeded random soup of two-input gates.
fn random(gates: usize, seed: u64) -> BoolNetwork {
    let mut bn = BoolNetwork::new("random");
    let mut pool: Vec<BnId> = (0..8).map(|_| bn.new_input()).collect();
    let mut x = seed | 1;
    let mut next = move || {
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        x
    };
    for _ in 0..gates {
        let a = pool[(next() as usize) % pool.len()];
        let b = pool[(next() as usize) % pool.len()];
        if a == b {
            continue;
        }
        let ty = match next() % 4 {
            0 => BnNodeType::Xor,
            1 => BnNodeType::Nand,
            _ => BnNodeType::And,
        };
        pool.push(bn.new_logic(ty, vec![a, b]));
    }
    for i in 0..4.min(pool.len()) {
        bn.add_output(pool[pool.len() - 1 - i]);
    }
    bn
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let bn = match args.circuit.as_str() {
        "random" => random(args.size, args.seed),
        _ => adder(args.size),
    };

    let (algorithm, meta) = match args.algorithm.as_str() {
        "delay" => (Algorithm::Delay { slack: args.slack }, MetaSearch::None),
        "mct" => (Algorithm::Area, MetaSearch::Mct { trials: args.trials }),
        "sa" => (Algorithm::Area, MetaSearch::Sa { trials: args.trials }),
        _ => (Algorithm::Area, MetaSearch::None),
    };
    let params = MapParamsBuilder::default()
        .cut_size(args.k)
        .algorithm(algorithm)
        .meta(meta)
        .flow_policy(if args.flow {
            FlowPolicy::Flow
        } else {
            FlowPolicy::Fanout
        })
        .cut_resub(!args.no_resub)
        .seed(args.seed)
        .build()
        .unwrap();

    match LutMapper::new(params).map(&bn) {
        Ok(outcome) => {
            println!(
                "{}: {} LUTs, depth {}",
                outcome.network.name(),
                outcome.lut_num,
                outcome.depth
            );
        }
        Err(e) => {
            eprintln!("mapping failed: {e}");
            std::process::exit(1);
        }
    }
}
