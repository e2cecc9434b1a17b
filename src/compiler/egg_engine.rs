//! Saturation engine based on the [egg](https://docs.rs/egg) e-graph library
//!
//! The network is loaded in an e-graph, saturated with the majority axioms, and the network
//! with the fewest gates is extracted back. Inverters only break ties between equal gate counts.

use std::fmt;
use std::ops;
use std::time::{Duration, Instant};

use egg::{
    define_language, rewrite, CostFunction, EGraph, Extractor, Id, Language, Rewrite, Runner,
    StopReason,
};
use fxhash::{FxHashMap, FxHashSet};
use log::{debug, log, Level};

use super::program::compile_program;
use super::statistics::{EGraphMetrics, PhaseTimings};
use super::{
    transmit, CompileError, CompilerSettingsReduced, CompilerStatistics, ExchangeNode,
    ExchangeSignal, NetworkSink, SaturationEngine, TransmittedNetwork,
};
use crate::network::Gate;
use crate::{Network, Signal};

define_language! {
    /// Term language of majority-inverter graphs
    pub enum MigLanguage {
        "false" = False,
        "!" = Not(Id),
        "maj" = Maj([Id; 3]),
        Input(u32),
    }
}

/// Default maximum number of saturation iterations
pub const DEFAULT_ITER_LIMIT: usize = 30;
/// Default maximum number of e-nodes
pub const DEFAULT_NODE_LIMIT: usize = 10_000;
/// Default maximum saturation time
pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(5);

/// Rewrite rules of the majority algebra
pub fn rules() -> Vec<Rewrite<MigLanguage, ()>> {
    let mut rules = vec![
        rewrite!("commute_1"; "(maj ?a ?b ?c)" => "(maj ?b ?a ?c)"),
        rewrite!("commute_2"; "(maj ?a ?b ?c)" => "(maj ?a ?c ?b)"),
        rewrite!("not_not"; "(! (! ?a))" => "?a"),
        rewrite!("maj_1"; "(maj ?a ?a ?b)" => "?a"),
        rewrite!("maj_2"; "(maj ?a (! ?a) ?b)" => "?b"),
        rewrite!("associativity"; "(maj ?a ?b (maj ?c ?b ?d))" => "(maj ?d ?b (maj ?c ?b ?a))"),
    ];
    rules.extend(rewrite!("invert"; "(! (maj ?a ?b ?c))" <=> "(maj (! ?a) (! ?b) (! ?c))"));
    rules.extend(rewrite!("distributivity";
        "(maj ?a ?b (maj ?c ?d ?e))" <=> "(maj (maj ?a ?b ?c) (maj ?a ?b ?d) ?e)"));
    rules
}

/// Equality-saturation engine built on egg
///
/// The saturation is bounded by a number of iterations, a number of e-nodes and a time limit.
/// Reaching a limit is not an error: the network is extracted from the partially saturated
/// e-graph.
pub struct EggEngine {
    rules: Vec<Rewrite<MigLanguage, ()>>,
    iter_limit: usize,
    node_limit: usize,
    time_limit: Duration,
}

impl Default for EggEngine {
    fn default() -> Self {
        EggEngine {
            rules: rules(),
            iter_limit: DEFAULT_ITER_LIMIT,
            node_limit: DEFAULT_NODE_LIMIT,
            time_limit: DEFAULT_TIME_LIMIT,
        }
    }
}

impl fmt::Debug for EggEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EggEngine")
            .field("nb_rules", &self.rules.len())
            .field("iter_limit", &self.iter_limit)
            .field("node_limit", &self.node_limit)
            .field("time_limit", &self.time_limit)
            .finish()
    }
}

impl EggEngine {
    /// Set the maximum number of saturation iterations
    pub fn with_iter_limit(self, iter_limit: usize) -> Self {
        EggEngine { iter_limit, ..self }
    }

    /// Set the maximum number of e-nodes
    pub fn with_node_limit(self, node_limit: usize) -> Self {
        EggEngine { node_limit, ..self }
    }

    /// Set the maximum saturation time
    pub fn with_time_limit(self, time_limit: Duration) -> Self {
        EggEngine { time_limit, ..self }
    }

    /// Build the e-graph, saturate it and extract the best network
    fn optimize(
        &self,
        settings: &CompilerSettingsReduced,
        network: &TransmittedNetwork,
    ) -> Result<(Network, EGraphMetrics, PhaseTimings), CompileError> {
        let level = if settings.verbose {
            Level::Info
        } else {
            Level::Debug
        };
        let (mut egraph, roots) = build_egraph(network)?;

        let mut timings = PhaseTimings::default();
        if settings.rewrite {
            let start = Instant::now();
            let runner = Runner::default()
                .with_egraph(egraph)
                .with_iter_limit(self.iter_limit)
                .with_node_limit(self.node_limit)
                .with_time_limit(self.time_limit)
                .run(&self.rules);
            timings.runner = start.elapsed();
            match &runner.stop_reason {
                Some(StopReason::Saturated) | None => {
                    debug!("E-graph saturated in {} iterations", runner.iterations.len())
                }
                Some(reason) => log!(level, "Saturation stopped early: {:?}", reason),
            }
            if settings.verbose {
                log!(level, "Runner report:\n{}", runner.report());
            }
            egraph = runner.egraph;
        } else {
            egraph.rebuild();
        }

        let metrics = EGraphMetrics {
            classes: egraph.number_of_classes(),
            nodes: egraph.total_number_of_nodes(),
            size: egraph.total_size(),
        };
        log!(
            level,
            "E-graph: {} classes, {} nodes, size {}",
            metrics.classes,
            metrics.nodes,
            metrics.size
        );

        let start = Instant::now();
        let extractor = Extractor::new(&egraph, MigCostFunction);
        let roots: Vec<Id> = roots.iter().map(|r| egraph.find(*r)).collect();
        let mig = extract_network(&egraph, &extractor, &roots, network)?;
        timings.extractor = start.elapsed();
        log!(level, "Extracted network with {} gates", mig.nb_nodes());

        Ok((mig, metrics, timings))
    }
}

impl SaturationEngine for EggEngine {
    fn compile(
        &self,
        settings: CompilerSettingsReduced,
        network: TransmittedNetwork,
    ) -> Result<CompilerStatistics, CompileError> {
        let start = Instant::now();
        let (mig, metrics, mut timings) = self.optimize(&settings, &network)?;
        let program = compile_program(&mig);
        if settings.print_program {
            println!("{}", program);
        } else if settings.verbose {
            log::info!("Compiled program:\n{}", program);
        }
        timings.compiler = start.elapsed();
        let stats = CompilerStatistics::aggregate(metrics, Some(program.len()), timings);
        report(&settings, &stats);
        Ok(stats)
    }

    fn rewrite(
        &self,
        settings: CompilerSettingsReduced,
        network: TransmittedNetwork,
        sink: &mut dyn NetworkSink,
    ) -> Result<CompilerStatistics, CompileError> {
        let start = Instant::now();
        let (mig, metrics, mut timings) = self.optimize(&settings, &network)?;
        transmit(&mig)?.send(sink)?;
        timings.compiler = start.elapsed();
        let stats = CompilerStatistics::aggregate(metrics, None, timings);
        report(&settings, &stats);
        Ok(stats)
    }
}

fn report(settings: &CompilerSettingsReduced, stats: &CompilerStatistics) {
    if settings.verbose {
        log::info!("{}", stats);
    }
}

/// E-class of an exchange node, created on first use for the constant and the inputs
fn class_of(
    egraph: &mut EGraph<MigLanguage, ()>,
    network: &TransmittedNetwork,
    ids: &mut [Option<Id>],
    s: &ExchangeSignal,
) -> Result<Id, CompileError> {
    let node = s.node as usize;
    let id = match ids.get(node) {
        Some(Some(id)) => *id,
        Some(None) => {
            let id = match network.nodes()[node] {
                ExchangeNode::False => egraph.add(MigLanguage::False),
                ExchangeNode::Input(k) => egraph.add(MigLanguage::Input(k)),
                ExchangeNode::Maj(_) => {
                    return Err(CompileError::MalformedNetwork(format!(
                        "reference to gate {node} before its definition"
                    )))
                }
            };
            ids[node] = Some(id);
            id
        }
        None => {
            return Err(CompileError::MalformedNetwork(format!(
                "reference to missing node {node}"
            )))
        }
    };
    if s.inverted {
        Ok(egraph.add(MigLanguage::Not(id)))
    } else {
        Ok(id)
    }
}

/// Load a network in a new e-graph; return the e-classes of the outputs
///
/// The constant and the inputs are only added if they are used.
fn build_egraph(
    network: &TransmittedNetwork,
) -> Result<(EGraph<MigLanguage, ()>, Vec<Id>), CompileError> {
    let mut egraph = EGraph::default();
    let mut ids = vec![None; network.nodes().len()];
    for (i, n) in network.nodes().iter().enumerate() {
        if let ExchangeNode::Maj(deps) = n {
            let a = class_of(&mut egraph, network, &mut ids, &deps[0])?;
            let b = class_of(&mut egraph, network, &mut ids, &deps[1])?;
            let c = class_of(&mut egraph, network, &mut ids, &deps[2])?;
            ids[i] = Some(egraph.add(MigLanguage::Maj([a, b, c])));
        }
    }
    let roots = network
        .outputs()
        .iter()
        .map(|o| class_of(&mut egraph, network, &mut ids, o))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((egraph, roots))
}

/// Cost of a term: number of gates first, number of inverters to break ties
///
/// Every operator has a positive cost, so that the best terms never form a cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct MigCost {
    /// Number of majority gates
    pub gates: usize,
    /// Number of inverters
    pub inverters: usize,
}

impl ops::Add for MigCost {
    type Output = MigCost;
    fn add(self, rhs: MigCost) -> MigCost {
        MigCost {
            gates: self.gates.saturating_add(rhs.gates),
            inverters: self.inverters.saturating_add(rhs.inverters),
        }
    }
}

/// Cost function selecting the term with the fewest gates, then the fewest inverters
#[derive(Debug, Clone, Copy, Default)]
pub struct MigCostFunction;

impl CostFunction<MigLanguage> for MigCostFunction {
    type Cost = MigCost;

    fn cost<C>(&mut self, enode: &MigLanguage, mut costs: C) -> MigCost
    where
        C: FnMut(Id) -> MigCost,
    {
        let own = match enode {
            MigLanguage::Maj(_) => MigCost {
                gates: 1,
                inverters: 0,
            },
            MigLanguage::Not(_) => MigCost {
                gates: 0,
                inverters: 1,
            },
            MigLanguage::False | MigLanguage::Input(_) => MigCost::default(),
        };
        enode.fold(own, |acc, c| acc + costs(c))
    }
}

/// Build the network made of the best node of each e-class reachable from the outputs
fn extract_network(
    egraph: &EGraph<MigLanguage, ()>,
    extractor: &Extractor<MigCostFunction, MigLanguage, ()>,
    roots: &[Id],
    network: &TransmittedNetwork,
) -> Result<Network, CompileError> {
    let mut mig = Network::new();
    mig.add_inputs(network.nb_inputs());

    let mut built = FxHashMap::<Id, Signal>::default();
    let mut visiting = FxHashSet::<Id>::default();
    for root in roots {
        let mut to_visit = vec![(*root, false)];
        while let Some((id, expanded)) = to_visit.pop() {
            if built.contains_key(&id) {
                continue;
            }
            let node = extractor.find_best_node(id);
            let children: Vec<Id> = node.children().iter().map(|c| egraph.find(*c)).collect();
            if !expanded && !children.is_empty() {
                if !visiting.insert(id) {
                    return Err(CompileError::Extraction(format!(
                        "cycle through e-class {id}"
                    )));
                }
                to_visit.push((id, true));
                to_visit.extend(
                    children
                        .iter()
                        .filter(|c| !built.contains_key(*c))
                        .map(|c| (*c, false)),
                );
                continue;
            }
            let s = match node {
                MigLanguage::False => Signal::zero(),
                MigLanguage::Input(k) => {
                    if *k as usize >= network.nb_inputs() {
                        return Err(CompileError::Extraction(format!("unknown input {k}")));
                    }
                    Signal::from_input(*k)
                }
                MigLanguage::Not(_) => !built[&children[0]],
                MigLanguage::Maj(_) => mig.add(Gate::maj(
                    built[&children[0]],
                    built[&children[1]],
                    built[&children[2]],
                )),
            };
            visiting.remove(&id);
            built.insert(id, s);
        }
    }
    let outputs = roots.iter().map(|r| built[r]).collect();
    mig.set_outputs(outputs);
    Ok(mig)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use egg::{CostFunction, EGraph, Extractor, RecExpr};

    use super::{build_egraph, EggEngine, MigCost, MigCostFunction, MigLanguage};
    use crate::compiler::{receive, transmit, CompilerSettings, SaturationEngine};
    use crate::equiv::check_equivalence_comb;
    use crate::network::generators::adder::ripple_carry;
    use crate::network::generators::random::random_mig;
    use crate::network::Gate;
    use crate::sim::truth_tables;
    use crate::{Network, Signal};

    fn small_engine() -> EggEngine {
        EggEngine::default()
            .with_iter_limit(4)
            .with_node_limit(2_000)
            .with_time_limit(Duration::from_secs(2))
    }

    fn rewrite(engine: &EggEngine, mig: &Network, rewrite: bool) -> Network {
        let settings = CompilerSettings::default().with_rewrite(rewrite).reduced();
        let mut ret = Network::new();
        engine
            .rewrite(settings, transmit(mig).unwrap(), &mut receive(&mut ret))
            .unwrap();
        ret
    }

    #[test]
    fn test_lazy_leaves() {
        let mut mig = Network::new();
        mig.add_inputs(4);
        let (egraph, roots) = build_egraph(&transmit(&mig).unwrap()).unwrap();
        assert_eq!(egraph.number_of_classes(), 0);
        assert!(roots.is_empty());

        let i3 = mig.input(3);
        mig.add_output(!i3);
        let (egraph, roots) = build_egraph(&transmit(&mig).unwrap()).unwrap();
        assert_eq!(egraph.number_of_classes(), 2);
        assert_eq!(roots.len(), 1);
    }

    #[test]
    fn test_cost_function() {
        let expr: RecExpr<MigLanguage> = "(! (maj 0 (! 1) false))".parse().unwrap();
        assert_eq!(
            MigCostFunction.cost_rec(&expr),
            MigCost {
                gates: 1,
                inverters: 2
            }
        );

        let mut egraph = EGraph::<MigLanguage, ()>::default();
        let a = egraph.add_expr(&"(maj (! 0) (! 1) (! 2))".parse().unwrap());
        let b = egraph.add_expr(&"(! (maj 0 1 2))".parse().unwrap());
        egraph.union(a, b);
        egraph.rebuild();
        let extractor = Extractor::new(&egraph, MigCostFunction);
        let (cost, best) = extractor.find_best(a);
        assert_eq!(
            cost,
            MigCost {
                gates: 1,
                inverters: 1
            }
        );
        assert_eq!(best.to_string(), "(! (maj 0 1 2))");
    }

    #[test]
    fn test_single_gate() {
        let mut mig = Network::new();
        let i0 = mig.add_input();
        let i1 = mig.add_input();
        let i2 = mig.add_input();
        let x = mig.add(Gate::maj(i0, i1, i2));
        mig.add_output(x);
        for r in [false, true] {
            let ret = rewrite(&small_engine(), &mig, r);
            assert_eq!(ret.nb_inputs(), 3);
            assert_eq!(ret.nb_nodes(), 1);
            assert_eq!(truth_tables(&ret), truth_tables(&mig));
        }
    }

    #[test]
    fn test_no_saturation() {
        let mig = ripple_carry(2);
        let settings = CompilerSettings::default().with_rewrite(false).reduced();
        let mut ret = Network::new();
        let stats = small_engine()
            .rewrite(settings, transmit(&mig).unwrap(), &mut receive(&mut ret))
            .unwrap();
        assert_eq!(stats.t_runner, 0);
        assert_eq!(stats.instructions(), None);
        assert!(stats.egraph_classes > 0);
        assert_eq!(truth_tables(&ret), truth_tables(&mig));
    }

    #[test]
    fn test_absorption() {
        let mut mig = Network::new();
        let a = mig.add_input();
        let b = mig.add_input();
        let c = mig.add_input();
        let x0 = mig.add(Gate::maj(a, b, c));
        let x1 = mig.add(Gate::maj(a, b, x0));
        mig.add_output(x1);
        let engine = EggEngine::default()
            .with_iter_limit(10)
            .with_node_limit(10_000);
        let ret = rewrite(&engine, &mig, true);
        assert_eq!(ret.nb_nodes(), 1);
        assert_eq!(truth_tables(&ret), truth_tables(&mig));
    }

    #[test]
    fn test_double_inversion() {
        let mut mig = Network::new();
        let i0 = mig.add_input();
        let i1 = mig.add_input();
        let x0 = mig.add(Gate::maj(!i0, !i1, Signal::one()));
        mig.add_output(!x0);
        let ret = rewrite(&small_engine(), &mig, true);
        assert_eq!(ret.nb_nodes(), 1);
        assert_eq!(truth_tables(&ret), truth_tables(&mig));
    }

    #[test]
    fn test_random() {
        for seed in 0..8 {
            let mig = random_mig(6, 30, 4, seed);
            let ret = rewrite(&small_engine(), &mig, true);
            assert_eq!(ret.nb_inputs(), mig.nb_inputs());
            assert_eq!(ret.nb_outputs(), mig.nb_outputs());
            assert_eq!(truth_tables(&ret), truth_tables(&mig));
            check_equivalence_comb(&mig, &ret).unwrap();
        }
    }

    #[test]
    fn test_compile() {
        let mig = ripple_carry(2);
        let settings = CompilerSettings::default().reduced();
        let stats = small_engine()
            .compile(settings, transmit(&mig).unwrap())
            .unwrap();
        assert!(stats.instruction_count > 0);
        assert!(stats.egraph_size >= stats.egraph_nodes);
        assert!(stats.egraph_nodes >= stats.egraph_classes);
        assert!(stats.t_compiler >= stats.t_runner + stats.t_extractor);
    }

    #[test]
    fn test_compile_verbose() {
        let mig = ripple_carry(1);
        let settings = CompilerSettings::new(false, true).reduced();
        let stats = small_engine()
            .compile(settings, transmit(&mig).unwrap())
            .unwrap();
        assert!(stats.instructions().is_some_and(|n| n > 0));
    }

    #[test]
    fn test_empty() {
        let settings = CompilerSettings::default().reduced();
        let stats = small_engine()
            .compile(settings, transmit(&Network::new()).unwrap())
            .unwrap();
        assert_eq!(stats.egraph_classes, 0);
        assert_eq!(stats.egraph_nodes, 0);
        assert_eq!(stats.egraph_size, 0);
        assert_eq!(stats.instruction_count, 0);
    }
}
