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

//! The mapper facade: one object holding the whole configuration surface and
//! running the pipeline end to end, from the Boolean network all the way to
//! the mapped LUT network and its counts.

use derive_builder::Builder;

use crate::{
    from_network, AreaCover, BoolNetwork, CutResub, CutStore, DagCover, DelayCover, FlowPolicy,
    LogSink, LutNetwork, MapError, MapGen, MapRecord, MctSearch, MessageSink, SaSearch,
};

/// Which covering algorithm drives the mapping.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Algorithm {
    /// Minimize the LUT count.
    Area,
    /// Minimize the depth first, the area second, allowing `slack` levels
    /// above the minimum reachable depth.
    Delay { slack: usize },
}

/// The optional meta-search wrapped around the area covering.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MetaSearch {
    None,
    Mct { trials: usize },
    Sa { trials: usize },
}

/// The default trial count when a meta-search is enabled through the
/// options string rather than through the builder.
const DEFAULT_TRIALS: usize = 1000;

/// The full configuration surface of a mapping run.
///
/// # Example
/// ```
/// # use lutmap::*;
/// let params = MapParamsBuilder::default()
///     .cut_size(4)
///     .algorithm(Algorithm::Area)
///     .flow_policy(FlowPolicy::Flow)
///     .build()
///     .unwrap();
/// assert!(params.cut_resub);
/// ```
#[derive(Debug, Clone, Builder)]
pub struct MapParams {
    /// The LUT input bound (K). Accepted range is 2..=16.
    #[builder(default = "5")]
    pub cut_size: usize,
    #[builder(default = "Algorithm::Area")]
    pub algorithm: Algorithm,
    #[builder(default = "FlowPolicy::Fanout")]
    pub flow_policy: FlowPolicy,
    /// Whether the resubstitution post-pass runs.
    #[builder(default = "true")]
    pub cut_resub: bool,
    #[builder(default = "MetaSearch::None")]
    pub meta: MetaSearch,
    /// Seed of the PRNG owned by the meta-search drivers.
    #[builder(default = "0")]
    pub seed: u64,
    /// When set, the drivers emit one `log::debug!` line per trial.
    #[builder(default = "false")]
    pub verbose: bool,
}

impl Default for MapParams {
    fn default() -> Self {
        MapParamsBuilder::default().build().unwrap()
    }
}

/// What a successful mapping returns.
#[derive(Debug)]
pub struct MapOutcome {
    pub network: LutNetwork,
    pub lut_num: usize,
    pub depth: usize,
}

/// The manager tying everything together.
pub struct LutMapper {
    params: MapParams,
    sink: Box<dyn MessageSink>,
}

impl LutMapper {
    pub fn new(params: MapParams) -> Self {
        LutMapper {
            params,
            sink: Box::new(LogSink),
        }
    }

    /// Mirrors the legacy constructor: a LUT size and an options string.
    pub fn with_option(lut_size: usize, option: &str) -> Self {
        let mut mapper = LutMapper::new(MapParams {
            cut_size: lut_size,
            ..Default::default()
        });
        mapper.set_option(option);
        mapper
    }

    pub fn params(&self) -> &MapParams {
        &self.params
    }

    pub fn set_sink(&mut self, sink: Box<dyn MessageSink>) {
        self.sink = sink;
    }

    /// Applies an options string: comma- or colon-separated `key` or
    /// `key=value` tokens. Recognized keys are `algorithm=<name>`, `fanout`,
    /// `flow`, `cut_resub` and `no_cut_resub`; anything else is silently
    /// ignored.
    pub fn set_option(&mut self, option: &str) {
        for token in option.split([',', ':']) {
            let token = token.trim();
            let (key, val) = match token.split_once('=') {
                Some((k, v)) => (k, Some(v)),
                None => (token, None),
            };
            match (key, val) {
                ("algorithm", Some("area")) => {
                    self.params.algorithm = Algorithm::Area;
                    self.params.meta = MetaSearch::None;
                }
                ("algorithm", Some("delay")) => {
                    self.params.algorithm = Algorithm::Delay { slack: 0 };
                    self.params.meta = MetaSearch::None;
                }
                ("algorithm", Some("mct")) => {
                    self.params.algorithm = Algorithm::Area;
                    self.params.meta = MetaSearch::Mct {
                        trials: DEFAULT_TRIALS,
                    };
                }
                ("algorithm", Some("sa")) => {
                    self.params.algorithm = Algorithm::Area;
                    self.params.meta = MetaSearch::Sa {
                        trials: DEFAULT_TRIALS,
                    };
                }
                ("fanout", None) => self.params.flow_policy = FlowPolicy::Fanout,
                ("flow", None) => self.params.flow_policy = FlowPolicy::Flow,
                ("cut_resub", None) => self.params.cut_resub = true,
                ("no_cut_resub", None) => self.params.cut_resub = false,
                _ => {}
            }
        }
    }

    /// Convenience entry point: area-mode mapping.
    pub fn area_map(&self, network: &BoolNetwork) -> Result<MapOutcome, MapError> {
        let mut params = self.params.clone();
        params.algorithm = Algorithm::Area;
        self.run(network, &params)
    }

    /// Convenience entry point: delay-mode mapping under `slack`.
    pub fn delay_map(&self, network: &BoolNetwork, slack: usize) -> Result<MapOutcome, MapError> {
        let mut params = self.params.clone();
        params.algorithm = Algorithm::Delay { slack };
        params.meta = MetaSearch::None;
        self.run(network, &params)
    }

    /// Runs the pipeline with the configured parameters.
    pub fn map(&self, network: &BoolNetwork) -> Result<MapOutcome, MapError> {
        self.run(network, &self.params)
    }

    fn run(&self, network: &BoolNetwork, params: &MapParams) -> Result<MapOutcome, MapError> {
        if !(2..=16).contains(&params.cut_size) {
            return Err(MapError::invalid(format!(
                "cut size {} out of range (2..=16)",
                params.cut_size
            )));
        }
        if params.meta != MetaSearch::None && !matches!(params.algorithm, Algorithm::Area) {
            return Err(MapError::invalid(
                "the meta-search wraps the area covering only",
            ));
        }

        let graph = from_network(network, self.sink.as_ref())?;
        let cuts = CutStore::enumerate(&graph, params.cut_size);
        if params.verbose {
            log::info!(
                "{}: {} logic node(s), {} cut(s) enumerated",
                graph.name(),
                graph.logic_num(),
                cuts.cut_num()
            );
        }

        let mut maprec = MapRecord::new();
        match (params.algorithm, params.meta) {
            (Algorithm::Area, MetaSearch::Mct { trials }) => {
                let mut mct = MctSearch::new(&graph, &cuts, params.flow_policy, params.seed);
                maprec = mct.search(trials)?;
            }
            (Algorithm::Area, MetaSearch::Sa { trials }) => {
                let mut sa = SaSearch::new(&graph, &cuts, params.flow_policy, params.seed);
                maprec = sa.search(trials)?;
            }
            (Algorithm::Area, MetaSearch::None) => {
                AreaCover::new(params.flow_policy).record_cuts(&graph, &cuts, &mut maprec)?;
            }
            (Algorithm::Delay { slack }, _) => {
                DelayCover::new(params.flow_policy, slack).record_cuts(&graph, &cuts, &mut maprec)?;
            }
        }

        if params.cut_resub {
            let slack = match params.algorithm {
                Algorithm::Area => None,
                Algorithm::Delay { slack } => Some(slack),
            };
            CutResub::new().run(&graph, &cuts, &mut maprec, slack)?;
        }

        let (network, lut_num, depth) = MapGen::new().generate(&graph, &cuts, &maprec)?;
        log::info!(
            "mapped {} onto {lut_num} LUT(s), depth {depth} (K = {})",
            network.name(),
            params.cut_size
        );
        Ok(MapOutcome {
            network,
            lut_num,
            depth,
        })
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_mapper {
    use super::*;
    use crate::{BnNodeType, BoolNetwork};

    fn tiny_and() -> BoolNetwork {
        let mut bn = BoolNetwork::new("tiny");
        let a = bn.new_input();
        let b = bn.new_input();
        let c = bn.new_input();
        let t = bn.new_logic(BnNodeType::And, vec![a, b]);
        let y = bn.new_logic(BnNodeType::And, vec![t, c]);
        bn.add_output(y);
        bn
    }

    #[test]
    fn test_option_string() {
        let mut m = LutMapper::with_option(4, "flow,no_cut_resub");
        assert_eq!(FlowPolicy::Flow, m.params().flow_policy);
        assert!(!m.params().cut_resub);

        m.set_option("algorithm=delay:fanout:cut_resub");
        assert_eq!(Algorithm::Delay { slack: 0 }, m.params().algorithm);
        assert_eq!(FlowPolicy::Fanout, m.params().flow_policy);
        assert!(m.params().cut_resub);

        // unknown keys are silently ignored
        m.set_option("whatever,algorithm=mct,frobnicate=3");
        assert_eq!(MetaSearch::Mct { trials: 1000 }, m.params().meta);
    }

    #[test]
    fn test_cut_size_validated() {
        let bn = tiny_and();
        let m = LutMapper::new(MapParams {
            cut_size: 1,
            ..Default::default()
        });
        assert!(m.map(&bn).is_err());
        let m = LutMapper::new(MapParams {
            cut_size: 17,
            ..Default::default()
        });
        assert!(m.map(&bn).is_err());
    }

    #[test]
    fn test_meta_requires_area() {
        let bn = tiny_and();
        let m = LutMapper::new(MapParams {
            algorithm: Algorithm::Delay { slack: 0 },
            meta: MetaSearch::Sa { trials: 10 },
            ..Default::default()
        });
        assert!(m.map(&bn).is_err());
    }

    #[test]
    fn test_tiny_and_end_to_end() {
        let bn = tiny_and();
        let m = LutMapper::new(MapParams {
            cut_size: 3,
            flow_policy: FlowPolicy::Flow,
            ..Default::default()
        });
        let out = m.map(&bn).unwrap();
        assert_eq!(1, out.lut_num);
        assert_eq!(1, out.depth);
        assert_eq!(3, out.network.inputs().len());
    }
}
