use thiserror::Error;

use super::{
    CompilerSettingsReduced, CompilerStatistics, ExchangeNode, ExchangeSignal, TransmittedNetwork,
};

/// Failure of a compilation or rewriting run
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// The network crossing the engine boundary is not a valid majority-inverter graph
    #[error("malformed network: {0}")]
    MalformedNetwork(String),
    /// No network could be extracted from the e-graph
    #[error("extraction failed: {0}")]
    Extraction(String),
}

/// Destination of a rewritten network, fed node by node by the engine
///
/// Nodes are appended in the exchange order: the constant first, then the inputs,
/// then the majority gates, each referring only to previously appended nodes.
pub trait NetworkSink {
    /// Append the next node
    fn append(&mut self, node: ExchangeNode) -> Result<(), CompileError>;

    /// Set the primary outputs, once all nodes are appended
    fn set_outputs(&mut self, outputs: &[ExchangeSignal]) -> Result<(), CompileError>;
}

/// An equality-saturation engine for majority-inverter graphs
///
/// The rule set, the saturation budget and the extraction cost are internal to the engine.
pub trait SaturationEngine {
    /// Saturate and extract the network, then compile it to a program
    fn compile(
        &self,
        settings: CompilerSettingsReduced,
        network: TransmittedNetwork,
    ) -> Result<CompilerStatistics, CompileError>;

    /// Saturate and extract the network, then stream it into the sink
    fn rewrite(
        &self,
        settings: CompilerSettingsReduced,
        network: TransmittedNetwork,
        sink: &mut dyn NetworkSink,
    ) -> Result<CompilerStatistics, CompileError>;
}
