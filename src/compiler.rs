//! Compilation and rewriting of majority-inverter graphs with an equality-saturation engine
//!
//! A run goes through fixed steps: the network is optionally preoptimized, serialized into
//! the exchange form, and handed to a [`SaturationEngine`]. In compile mode, only the
//! statistics come back; in rewrite mode, the engine also streams the optimized network into
//! a fresh [`Network`].
//!
//! ```
//! # use migsat::Network;
//! use migsat::compiler::{CompilerSettings, Compiler};
//!
//! let mut mig = Network::new();
//! let a = mig.add_input();
//! let b = mig.add_input();
//! let c = mig.add_input();
//! let x = mig.maj(a, b, c);
//! mig.add_output(x);
//!
//! let compiler: Compiler = Compiler::default();
//! let (rewritten, stats) = compiler.rewrite(CompilerSettings::default(), &mut mig).unwrap();
//! assert_eq!(rewritten.nb_outputs(), 1);
//! println!("{}", stats);
//! ```

mod egg_engine;
mod engine;
pub mod program;
mod receive;
mod settings;
mod statistics;
mod transmit;

pub use egg_engine::{
    rules, EggEngine, MigCost, MigCostFunction, MigLanguage, DEFAULT_ITER_LIMIT,
    DEFAULT_NODE_LIMIT, DEFAULT_TIME_LIMIT,
};
pub use engine::{CompileError, NetworkSink, SaturationEngine};
pub use receive::{receive, NetworkReceiver};
pub use settings::{CompilerSettings, CompilerSettingsReduced};
pub use statistics::{CompilerStatistics, EGraphMetrics, PhaseTimings};
pub use transmit::{check_network, transmit, ExchangeNode, ExchangeSignal, TransmittedNetwork};

use crate::optim::preoptimize;
use crate::Network;

/// Compile a network and return the statistics of the run
///
/// The network is modified in place by the preoptimization, if enabled, and left
/// untouched otherwise. A network with loops or dangling signals is rejected before any
/// modification.
pub fn compile<E: SaturationEngine + ?Sized>(
    engine: &E,
    settings: CompilerSettings,
    mig: &mut Network,
) -> Result<CompilerStatistics, CompileError> {
    check_network(mig)?;
    if settings.preoptimize {
        preoptimize(mig);
    }
    let transmitted = transmit(mig)?;
    engine.compile(settings.reduced(), transmitted)
}

/// Rewrite a network; return the rewritten network and the statistics of the run
///
/// The network is modified in place by the preoptimization, if enabled, and left
/// untouched otherwise. The rewritten network has the same inputs and outputs.
pub fn rewrite<E: SaturationEngine + ?Sized>(
    engine: &E,
    settings: CompilerSettings,
    mig: &mut Network,
) -> Result<(Network, CompilerStatistics), CompileError> {
    check_network(mig)?;
    if settings.preoptimize {
        preoptimize(mig);
    }
    let transmitted = transmit(mig)?;
    let mut ret = Network::new();
    let stats = engine.rewrite(settings.reduced(), transmitted, &mut receive(&mut ret))?;
    // Inputs that nothing depends on may not be sent back
    if ret.nb_inputs() < mig.nb_inputs() {
        ret.add_inputs(mig.nb_inputs() - ret.nb_inputs());
    }
    if ret.nb_inputs() != mig.nb_inputs() || ret.nb_outputs() != mig.nb_outputs() {
        return Err(CompileError::MalformedNetwork(format!(
            "rewritten network has {} inputs and {} outputs, expected {} and {}",
            ret.nb_inputs(),
            ret.nb_outputs(),
            mig.nb_inputs(),
            mig.nb_outputs()
        )));
    }
    Ok((ret, stats))
}

/// A saturation engine, with methods to compile and rewrite networks
#[derive(Debug)]
pub struct Compiler<E = EggEngine> {
    engine: E,
}

impl Default for Compiler<EggEngine> {
    fn default() -> Self {
        Compiler::new(EggEngine::default())
    }
}

impl<E: SaturationEngine> Compiler<E> {
    /// Create a compiler using this engine
    pub fn new(engine: E) -> Self {
        Compiler { engine }
    }

    /// The underlying engine
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Compile a network; see [`compile`]
    pub fn compile(
        &self,
        settings: CompilerSettings,
        mig: &mut Network,
    ) -> Result<CompilerStatistics, CompileError> {
        compile(&self.engine, settings, mig)
    }

    /// Rewrite a network; see [`rewrite`]
    pub fn rewrite(
        &self,
        settings: CompilerSettings,
        mig: &mut Network,
    ) -> Result<(Network, CompilerStatistics), CompileError> {
        rewrite(&self.engine, settings, mig)
    }
}
