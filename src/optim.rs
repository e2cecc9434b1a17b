//! Optimization of majority-inverter graphs
//!
//! [`preoptimize`] is a cheap, purely local pass, run before handing a network to the
//! saturation engine so that the e-graph starts from a smaller network.

use std::collections::hash_map::Entry;

use fxhash::FxHashMap;

use crate::network::{Gate, Normalization};
use crate::{Network, Signal};

/// Detect a gate absorbed by one of its fan-ins
///
/// `M(x, y, M(x, y, z)) = M(x, y, z)`, and by self-duality
/// `M(x, y, !M(!x, !y, z)) = !M(!x, !y, z)`.
fn absorbing_fanin(mig: &Network, g: &Gate) -> Option<Signal> {
    let deps = g.dependencies();
    for (k, s) in deps.iter().enumerate() {
        if !s.is_var() {
            continue;
        }
        let inner = mig.gate(s.var() as usize).dependencies();
        let absorbed = (0..3)
            .filter(|j| *j != k)
            .all(|j| inner.contains(&(deps[j] ^ s.is_inverted())));
        if absorbed {
            return Some(*s);
        }
    }
    None
}

/// Add a gate to the network after local simplification and structural hashing
fn add_simplified(mig: &mut Network, hsh: &mut FxHashMap<Gate, Signal>, g: &Gate) -> Signal {
    match g.make_canonical() {
        Normalization::Copy(s) => s,
        Normalization::Node(g, inv) => {
            if let Some(s) = absorbing_fanin(mig, &g) {
                return s ^ inv;
            }
            match hsh.entry(g) {
                Entry::Occupied(e) => e.get() ^ inv,
                Entry::Vacant(e) => {
                    let s = mig.add(g);
                    e.insert(s);
                    s ^ inv
                }
            }
        }
    }
}

/// Simplify a network in place with local rules, without any global search
///
/// The pass canonicalizes every gate (majority axiom, constant propagation, inverter
/// normalization), applies the absorption rule, merges structurally identical gates and
/// removes the gates that no output depends on.
/// It is idempotent: a second run leaves the network unchanged.
pub fn preoptimize(mig: &mut Network) {
    if !mig.is_topo_sorted() {
        mig.topo_sort();
    }

    let mut ret = Network::new();
    ret.add_inputs(mig.nb_inputs());
    let mut hsh = FxHashMap::default();
    let mut translation = Vec::with_capacity(mig.nb_nodes());
    for i in 0..mig.nb_nodes() {
        let g = mig.gate(i).remap_order(&translation);
        translation.push(add_simplified(&mut ret, &mut hsh, &g));
    }
    for o in mig.outputs() {
        ret.add_output(o.remap_order(&translation));
    }
    ret.sweep();
    ret.check();
    log::debug!(
        "Preoptimization: {} -> {} gates",
        mig.nb_nodes(),
        ret.nb_nodes()
    );
    *mig = ret;
}
