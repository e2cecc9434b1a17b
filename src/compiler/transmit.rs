use std::fmt;

use super::{CompileError, NetworkSink};
use crate::{Network, Signal};

/// Reference to a node of the exchange form, with its polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExchangeSignal {
    /// Index of the node
    pub node: u32,
    /// Whether the value is inverted
    pub inverted: bool,
}

/// Node of the exchange form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExchangeNode {
    /// Constant zero, always the first node
    False,
    /// Primary input
    Input(u32),
    /// Majority gate over previous nodes
    Maj([ExchangeSignal; 3]),
}

/// A network in the flat form exchanged with a saturation engine
///
/// Node 0 is the constant, followed by the inputs and by the gates in topological order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransmittedNetwork {
    nb_inputs: u32,
    nodes: Vec<ExchangeNode>,
    outputs: Vec<ExchangeSignal>,
}

impl ExchangeSignal {
    /// The constant zero
    pub const FALSE: ExchangeSignal = ExchangeSignal {
        node: 0,
        inverted: false,
    };

    /// Non-inverted reference to a node
    pub fn new(node: u32) -> ExchangeSignal {
        ExchangeSignal {
            node,
            inverted: false,
        }
    }
}

impl std::ops::Not for ExchangeSignal {
    type Output = ExchangeSignal;
    fn not(self) -> ExchangeSignal {
        ExchangeSignal {
            node: self.node,
            inverted: !self.inverted,
        }
    }
}

impl fmt::Display for ExchangeSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.inverted {
            write!(f, "!")?;
        }
        write!(f, "n{}", self.node)
    }
}

impl TransmittedNetwork {
    /// Number of primary inputs
    pub fn nb_inputs(&self) -> usize {
        self.nb_inputs as usize
    }

    /// Number of majority gates
    pub fn nb_gates(&self) -> usize {
        self.nodes.len() - 1 - self.nb_inputs()
    }

    /// All nodes, in exchange order
    pub fn nodes(&self) -> &[ExchangeNode] {
        &self.nodes
    }

    /// Primary outputs
    pub fn outputs(&self) -> &[ExchangeSignal] {
        &self.outputs
    }

    /// Stream the network into a sink, node by node
    pub fn send(&self, sink: &mut dyn NetworkSink) -> Result<(), CompileError> {
        for n in &self.nodes {
            sink.append(*n)?;
        }
        sink.set_outputs(&self.outputs)
    }
}

/// Index of the exchange node for a signal
fn to_exchange(mig: &Network, s: Signal, position: &[u32]) -> ExchangeSignal {
    let node = if s.is_constant() {
        0
    } else if s.is_input() {
        1 + s.input()
    } else {
        1 + mig.nb_inputs() as u32 + position[s.var() as usize]
    };
    ExchangeSignal {
        node,
        inverted: s.is_inverted(),
    }
}

/// Number of exchange nodes, if they can all be indexed by a `u32`
fn exchange_size(nb_inputs: usize, nb_gates: usize) -> Option<u32> {
    let n = nb_inputs.checked_add(nb_gates)?.checked_add(1)?;
    u32::try_from(n).ok()
}

/// Check that a network can be exchanged; return the order in which its gates are emitted
///
/// The network is rejected if it references missing nodes, contains a loop, or has more
/// nodes than the exchange form can index. A sorted network keeps its order.
pub fn check_network(mig: &Network) -> Result<Vec<u32>, CompileError> {
    let valid = (0..mig.nb_nodes())
        .flat_map(|i| mig.gate(i).dependencies().iter().copied())
        .chain(mig.outputs())
        .all(|s| mig.is_valid(s));
    if !valid {
        return Err(CompileError::MalformedNetwork(
            "signal referencing a missing node".to_string(),
        ));
    }
    if exchange_size(mig.nb_inputs(), mig.nb_nodes()).is_none() {
        return Err(CompileError::MalformedNetwork(format!(
            "too many nodes to exchange: {} inputs and {} gates",
            mig.nb_inputs(),
            mig.nb_nodes()
        )));
    }
    if mig.is_topo_sorted() {
        Ok((0..mig.nb_nodes() as u32).collect())
    } else {
        mig.topo_order()
            .ok_or_else(|| CompileError::MalformedNetwork("combinational loop".to_string()))
    }
}

/// Serialize a network into the exchange form
///
/// Gates are emitted in topological order; a sorted network keeps its order.
/// The network is rejected if [`check_network`] fails.
pub fn transmit(mig: &Network) -> Result<TransmittedNetwork, CompileError> {
    let order = check_network(mig)?;
    let nb_inputs = mig.nb_inputs() as u32;

    let mut position = vec![0u32; mig.nb_nodes()];
    for (p, v) in order.iter().enumerate() {
        position[*v as usize] = p as u32;
    }

    let mut nodes = Vec::with_capacity(1 + mig.nb_inputs() + mig.nb_nodes());
    nodes.push(ExchangeNode::False);
    nodes.extend((0..nb_inputs).map(ExchangeNode::Input));
    for v in &order {
        let deps = *mig.gate(*v as usize).dependencies();
        nodes.push(ExchangeNode::Maj(
            deps.map(|s| to_exchange(mig, s, &position)),
        ));
    }
    let outputs = mig
        .outputs()
        .map(|s| to_exchange(mig, s, &position))
        .collect();
    Ok(TransmittedNetwork {
        nb_inputs,
        nodes,
        outputs,
    })
}
