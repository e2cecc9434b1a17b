//! Compute gate statistics
//!
//! ```
//! # use migsat::Network;
//! # let mig = Network::new();
//! use migsat::network::stats::stats;
//! let stats = stats(&mig);
//!
//! // Check that there is no majority gate
//! assert_eq!(stats.nb_gates(), 0);
//!
//! // Show the statistics
//! println!("{}", stats);
//! ```

use std::cmp;
use std::fmt;

use crate::Network;

/// Number of inputs, outputs and gates in a network
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkStats {
    /// Number of inputs
    pub nb_inputs: usize,
    /// Number of outputs
    pub nb_outputs: usize,
    /// Number of majority gates with three non-constant fan-ins
    pub nb_maj: usize,
    /// Number of majority gates with a constant fan-in, behaving as And or Or
    pub nb_and_or: usize,
    /// Number of inverted edges, including outputs
    pub nb_inverted: usize,
    /// Number of gates on the longest path from an input to an output
    pub depth: usize,
}

impl NetworkStats {
    /// Total number of majority gates
    pub fn nb_gates(&self) -> usize {
        self.nb_maj + self.nb_and_or
    }
}

impl fmt::Display for NetworkStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Stats:")?;
        writeln!(f, "  Inputs: {}", self.nb_inputs)?;
        writeln!(f, "  Outputs: {}", self.nb_outputs)?;
        writeln!(f, "  Gates: {}", self.nb_gates())?;
        if self.nb_maj != 0 {
            writeln!(f, "      Maj: {}", self.nb_maj)?;
        }
        if self.nb_and_or != 0 {
            writeln!(f, "      And/Or: {}", self.nb_and_or)?;
        }
        writeln!(f, "  Inverted edges: {}", self.nb_inverted)?;
        writeln!(f, "  Depth: {}", self.depth)
    }
}

/// Compute the statistics of the network
///
/// The network must be topologically sorted.
pub fn stats(a: &Network) -> NetworkStats {
    assert!(a.is_topo_sorted());
    let mut ret = NetworkStats {
        nb_inputs: a.nb_inputs(),
        nb_outputs: a.nb_outputs(),
        nb_maj: 0,
        nb_and_or: 0,
        nb_inverted: a.outputs().filter(|s| s.is_inverted() && !s.is_constant()).count(),
        depth: 0,
    };
    let mut levels = vec![0usize; a.nb_nodes()];
    for i in 0..a.nb_nodes() {
        let g = a.gate(i);
        let deps = g.dependencies();
        if deps.iter().any(|s| s.is_constant()) {
            ret.nb_and_or += 1;
        } else {
            ret.nb_maj += 1;
        }
        ret.nb_inverted += deps
            .iter()
            .filter(|s| s.is_inverted() && !s.is_constant())
            .count();
        levels[i] = 1 + g.vars().map(|v| levels[v as usize]).max().unwrap_or(0);
    }
    for o in a.outputs() {
        if o.is_var() {
            ret.depth = cmp::max(ret.depth, levels[o.var() as usize]);
        }
    }
    ret
}
