use std::fmt;

use crate::network::signal::Signal;

/// Three-input majority gate, the only logic node of a majority-inverter graph
///
/// Majority gates have a canonical form, which makes structural hashing effective:
///   * fan-ins are sorted, so that commuted gates compare equal;
///   * gates with repeated or complementary fan-ins are replaced by the signal that decides them;
///   * at most one fan-in is inverted, the inversion being pushed to the output otherwise.
///
/// With a constant fan-in, the gate behaves as an And (`M(0, a, b)`) or an Or (`M(1, a, b)`).
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct Gate {
    fanins: [Signal; 3],
}

/// Result of normalizing a majority gate
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum Normalization {
    /// A gate, with an optional inverted output
    Node(Gate, bool),
    /// The trivial case, where the gate reduces to a single signal or constant
    Copy(Signal),
}

impl Gate {
    /// Create a majority gate
    pub fn maj(a: Signal, b: Signal, c: Signal) -> Gate {
        Gate { fanins: [a, b, c] }
    }

    /// Create an And gate, as a majority gate with a constant zero fan-in
    pub fn and(a: Signal, b: Signal) -> Gate {
        Gate::maj(Signal::zero(), a, b)
    }

    /// Create an Or gate, as a majority gate with a constant one fan-in
    pub fn or(a: Signal, b: Signal) -> Gate {
        Gate::maj(Signal::one(), a, b)
    }

    /// Obtain the three fan-ins of the gate
    pub fn dependencies(&self) -> &[Signal; 3] {
        &self.fanins
    }

    /// Obtain the internal variables feeding this gate (not inputs or constants)
    pub fn vars(&self) -> impl Iterator<Item = u32> + '_ {
        self.fanins.iter().filter(|s| s.is_var()).map(|s| s.var())
    }

    /// Returns whether the gate is in canonical form
    pub fn is_canonical(&self) -> bool {
        let [a, b, c] = self.fanins;
        a.ind() < b.ind() && b.ind() < c.ind() && self.nb_inverted() <= 1
    }

    /// Obtain the canonical form of the gate
    pub fn make_canonical(&self) -> Normalization {
        let [a, b, c] = self.fanins;
        make_maj(a, b, c, false)
    }

    fn nb_inverted(&self) -> usize {
        self.fanins.iter().filter(|s| s.is_inverted()).count()
    }

    /// Apply a remapping of the signals to the gate
    pub(crate) fn remap<F: Fn(&Signal) -> Signal>(&self, t: F) -> Gate {
        let [a, b, c] = &self.fanins;
        Gate::maj(t(a), t(b), t(c))
    }

    /// Apply a remapping of variable order to the gate
    pub(crate) fn remap_order(&self, t: &[Signal]) -> Gate {
        self.remap(|s| s.remap_order(t))
    }
}

/// Normalize a Maj
fn make_maj(a: Signal, b: Signal, c: Signal, inv: bool) -> Normalization {
    use Normalization::*;
    let mut sorted = [a, b, c];
    sorted.sort();
    let [i0, i1, i2] = sorted;
    // Complementary signals are adjacent once sorted, as they only differ by their lowest bit
    if i0 == i1 || i1 == !i2 {
        Copy(i0 ^ inv)
    } else if i1 == i2 || i0 == !i1 {
        Copy(i2 ^ inv)
    } else if [i0, i1, i2].iter().filter(|s| s.is_inverted()).count() >= 2 {
        // Inverter propagation; the sort order is unchanged by the inversion
        Node(Gate::maj(!i0, !i1, !i2), !inv)
    } else {
        Node(Gate::maj(i0, i1, i2), inv)
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c] = self.fanins;
        write!(f, "Maj({a}, {b}, {c})")
    }
}
