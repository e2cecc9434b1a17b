use super::{CompileError, ExchangeNode, ExchangeSignal, NetworkSink};
use crate::network::Gate;
use crate::{Network, Signal};

/// Sink rebuilding a network from the exchange form
///
/// Exchange nodes are mapped to signals of the network as they arrive; a reference to a
/// node that was not received yet is an error.
#[derive(Debug)]
pub struct NetworkReceiver<'a> {
    mig: &'a mut Network,
    received: Vec<Signal>,
}

/// Bind a sink to an output network
pub fn receive(mig: &mut Network) -> NetworkReceiver<'_> {
    NetworkReceiver {
        mig,
        received: Vec::new(),
    }
}

impl NetworkReceiver<'_> {
    /// Number of nodes received so far
    pub fn nb_received(&self) -> usize {
        self.received.len()
    }

    fn signal(&self, s: &ExchangeSignal) -> Result<Signal, CompileError> {
        match self.received.get(s.node as usize) {
            Some(sig) => Ok(*sig ^ s.inverted),
            None => Err(CompileError::MalformedNetwork(format!(
                "reference to node {} before it was received",
                s.node
            ))),
        }
    }
}

impl NetworkSink for NetworkReceiver<'_> {
    fn append(&mut self, node: ExchangeNode) -> Result<(), CompileError> {
        let s = match node {
            ExchangeNode::False => Signal::zero(),
            ExchangeNode::Input(k) => {
                if self.mig.nb_inputs() <= k as usize {
                    let missing = k as usize + 1 - self.mig.nb_inputs();
                    self.mig.add_inputs(missing);
                }
                Signal::from_input(k)
            }
            ExchangeNode::Maj(deps) => {
                let [a, b, c] = [
                    self.signal(&deps[0])?,
                    self.signal(&deps[1])?,
                    self.signal(&deps[2])?,
                ];
                self.mig.add(Gate::maj(a, b, c))
            }
        };
        self.received.push(s);
        Ok(())
    }

    fn set_outputs(&mut self, outputs: &[ExchangeSignal]) -> Result<(), CompileError> {
        let sigs = outputs
            .iter()
            .map(|s| self.signal(s))
            .collect::<Result<Vec<_>, _>>()?;
        self.mig.set_outputs(sigs);
        Ok(())
    }
}
