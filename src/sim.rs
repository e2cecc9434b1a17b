//! Simulation of a majority-inverter graph
//!
//! Simulation is bit-parallel: each input word carries 64 independent patterns.
//! For small networks, [`truth_tables`] enumerates every input assignment, which gives
//! an exact functional comparison between two networks.

mod simple_sim;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::Network;

use simple_sim::SimpleSimulator;

/// Maximum number of inputs for exhaustive simulation
pub const MAX_EXHAUSTIVE_INPUTS: usize = 20;

/// Simulate a network for a single pattern; return the output values
pub fn simulate_comb(a: &Network, input_values: &[bool]) -> Vec<bool> {
    let words: Vec<u64> = input_values.iter().map(|b| if *b { !0 } else { 0 }).collect();
    simulate_multi(a, &words).iter().map(|w| *w & 1 != 0).collect()
}

/// Simulate a network with 64 patterns at once; return the output words
pub fn simulate_multi(a: &Network, input_values: &[u64]) -> Vec<u64> {
    let mut sim = SimpleSimulator::from_network(a);
    sim.run(input_values)
}

/// Value of input `i` for the 64 assignments starting at `offset`, in truth table order
fn exhaustive_word(i: usize, offset: u64) -> u64 {
    // The 6 first inputs vary within a word, the others from word to word
    const PATTERNS: [u64; 6] = [
        0xaaaa_aaaa_aaaa_aaaa,
        0xcccc_cccc_cccc_cccc,
        0xf0f0_f0f0_f0f0_f0f0,
        0xff00_ff00_ff00_ff00,
        0xffff_0000_ffff_0000,
        0xffff_ffff_0000_0000,
    ];
    if i < 6 {
        PATTERNS[i]
    } else if (offset >> i) & 1 != 0 {
        !0
    } else {
        0
    }
}

/// Compute the truth table of each output by exhaustive simulation
///
/// Bit `k` of the table is the output value when input `i` is set to bit `i` of `k`.
/// Tables of networks with less than 6 inputs are padded by repetition.
pub fn truth_tables(a: &Network) -> Vec<Vec<u64>> {
    assert!(
        a.nb_inputs() <= MAX_EXHAUSTIVE_INPUTS,
        "Too many inputs for exhaustive simulation"
    );
    let nb_words = 1usize << a.nb_inputs().saturating_sub(6);
    let mut ret = vec![Vec::with_capacity(nb_words); a.nb_outputs()];
    let mut sim = SimpleSimulator::from_network(a);
    for w in 0..nb_words {
        let offset = (w as u64) << 6;
        let inputs: Vec<u64> = (0..a.nb_inputs())
            .map(|i| exhaustive_word(i, offset))
            .collect();
        for (o, v) in sim.run(&inputs).into_iter().enumerate() {
            ret[o].push(v);
        }
    }
    ret
}

/// Generate random 64-bit simulation words, one per input
pub fn random_words(nb_inputs: usize, seed: u64) -> Vec<u64> {
    let mut rng = SmallRng::seed_from_u64(seed);
    (0..nb_inputs).map(|_| rng.gen()).collect()
}

/// Find an input pattern on which two networks differ, by random simulation
///
/// Returns None if no difference was found, which does not prove equivalence.
pub fn find_difference(a: &Network, b: &Network, nb_rounds: usize, seed: u64) -> Option<Vec<bool>> {
    assert_eq!(a.nb_inputs(), b.nb_inputs());
    assert_eq!(a.nb_outputs(), b.nb_outputs());
    for round in 0..nb_rounds {
        let inputs = random_words(a.nb_inputs(), seed.wrapping_add(round as u64));
        let va = simulate_multi(a, &inputs);
        let vb = simulate_multi(b, &inputs);
        let diff = va.iter().zip(vb.iter()).fold(0u64, |acc, (x, y)| acc | (x ^ y));
        if diff != 0 {
            let bit = diff.trailing_zeros();
            return Some(inputs.iter().map(|w| (w >> bit) & 1 != 0).collect());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::{find_difference, simulate_comb, truth_tables};
    use crate::network::Gate;
    use crate::{Network, Signal};

    #[test]
    fn test_basic() {
        let mut mig = Network::default();
        let i0 = mig.add_input();
        let i1 = mig.add_input();
        let i2 = mig.add_input();
        let x1 = mig.xor(i0, i1);
        let x2 = mig.and(i0, i2);
        let x3 = mig.and(x2, !i1);
        mig.add_output(x1);
        mig.add_output(x3);

        assert_eq!(simulate_comb(&mig, &[false, false, false]), vec![false, false]);
        assert_eq!(simulate_comb(&mig, &[true, false, false]), vec![true, false]);
        assert_eq!(simulate_comb(&mig, &[true, false, true]), vec![true, true]);
        assert_eq!(simulate_comb(&mig, &[true, true, true]), vec![false, false]);
    }

    #[test]
    fn test_majority_table() {
        let mut mig = Network::default();
        let i0 = mig.add_input();
        let i1 = mig.add_input();
        let i2 = mig.add_input();
        let x = mig.add(Gate::maj(i0, i1, i2));
        mig.add_output(x);
        mig.add_output(!x);
        mig.add_output(Signal::one());
        let t = truth_tables(&mig);
        assert_eq!(t.len(), 3);
        // Assignments 3, 5, 6 and 7 have at least two ones; padded to 64 bits
        assert_eq!(t[0][0] & 0xff, 0b1110_1000);
        assert_eq!(t[1][0] & 0xff, 0b0001_0111);
        assert_eq!(t[2][0], !0);
    }

    #[test]
    fn test_large_table() {
        let mut mig = Network::default();
        let inputs: Vec<Signal> = (0..8).map(|_| mig.add_input()).collect();
        let x = mig.and_n(&inputs);
        mig.add_output(x);
        let t = truth_tables(&mig);
        assert_eq!(t[0].len(), 4);
        assert_eq!(t[0][0], 0);
        assert_eq!(t[0][3], 1u64 << 63);
    }

    #[test]
    fn test_find_difference() {
        let mut a = Network::default();
        let i0 = a.add_input();
        let i1 = a.add_input();
        let x = a.and(i0, i1);
        a.add_output(x);
        let mut b = Network::default();
        b.add_inputs(2);
        let y = b.or(i0, i1);
        b.add_output(y);
        let pattern = find_difference(&a, &b, 4, 1).unwrap();
        assert_ne!(simulate_comb(&a, &pattern), simulate_comb(&b, &pattern));
        assert_eq!(find_difference(&a, &a, 4, 1), None);
    }
}
