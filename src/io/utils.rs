use std::collections::HashSet;

use itertools::Itertools;

use crate::{Network, Signal};

/// Ad-hoc to_string function to represent signals in bench files
pub fn sig_to_string(s: &Signal) -> String {
    if *s == Signal::one() {
        return "vdd".to_string();
    }
    if *s == Signal::zero() {
        return "gnd".to_string();
    }
    s.without_inversion().to_string() + (if s.is_inverted() { "_n" } else { "" })
}

/// Find the set of signals that are used inverted
pub fn get_inverted_signals(mig: &Network) -> Vec<Signal> {
    let mut signals_with_inv = HashSet::new();
    let used = (0..mig.nb_nodes())
        .flat_map(|i| mig.gate(i).dependencies().iter().copied())
        .chain(mig.outputs());
    for s in used {
        if s.is_inverted() && !s.is_constant() {
            signals_with_inv.insert(!s);
        }
    }
    signals_with_inv.into_iter().sorted().collect()
}
