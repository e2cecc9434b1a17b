//! Network generators and templates

/// Adder generators
pub mod adder {
    use crate::{Network, Signal};

    /// A simple and slow ripple-carry adder
    ///
    /// Inputs are interleaved (a0, b0, a1, b1, ...), and the carry out is the last output.
    pub fn ripple_carry(len: usize) -> Network {
        let mut ret = Network::new();
        let mut c = Signal::zero();
        for _ in 0..len {
            let a = ret.add_input();
            let b = ret.add_input();
            let o = ret.xor3(a, b, c);
            c = ret.maj(a, b, c);
            ret.add_output(o);
        }
        ret.add_output(c);
        ret.check();
        ret
    }
}

/// Randomized generators, mostly useful for testing
pub mod random {
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use crate::network::Gate;
    use crate::{Network, Signal};

    /// Generate a random topologically sorted network
    ///
    /// Gates are added without simplification, so that the result may contain trivial,
    /// duplicate and unused gates. Each fan-in is inverted with probability 1/2 and is a
    /// constant with a small probability.
    pub fn random_mig(nb_inputs: usize, nb_gates: usize, nb_outputs: usize, seed: u64) -> Network {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut ret = Network::new();
        ret.add_inputs(nb_inputs);

        let pick = |rng: &mut SmallRng, nb_nodes: usize| -> Signal {
            let s = if nb_inputs + nb_nodes == 0 || rng.gen_ratio(1, 16) {
                Signal::zero()
            } else {
                let i = rng.gen_range(0..nb_inputs + nb_nodes);
                if i < nb_inputs {
                    Signal::from_input(i as u32)
                } else {
                    Signal::from_var((i - nb_inputs) as u32)
                }
            };
            s ^ rng.gen::<bool>()
        };

        for i in 0..nb_gates {
            let a = pick(&mut rng, i);
            let b = pick(&mut rng, i);
            let c = pick(&mut rng, i);
            ret.add(Gate::maj(a, b, c));
        }
        for _ in 0..nb_outputs {
            // Favor the last gates, so that most of the network is used
            let s = if nb_gates > 0 && rng.gen_ratio(3, 4) {
                let lo = nb_gates - nb_gates.min(4);
                Signal::from_var(rng.gen_range(lo..nb_gates) as u32) ^ rng.gen::<bool>()
            } else {
                pick(&mut rng, nb_gates)
            };
            ret.add_output(s);
        }
        ret.check();
        ret
    }
}

#[cfg(test)]
mod tests {
    use super::adder::ripple_carry;
    use super::random::random_mig;
    use crate::sim::simulate_comb;

    #[test]
    fn test_ripple_carry() {
        let adder = ripple_carry(3);
        assert_eq!(adder.nb_inputs(), 6);
        assert_eq!(adder.nb_outputs(), 4);
        for a in 0..8u32 {
            for b in 0..8u32 {
                let mut inputs = Vec::new();
                for bit in 0..3 {
                    inputs.push((a >> bit) & 1 != 0);
                    inputs.push((b >> bit) & 1 != 0);
                }
                let outputs = simulate_comb(&adder, &inputs);
                let sum: u32 = outputs
                    .iter()
                    .enumerate()
                    .map(|(i, o)| (*o as u32) << i)
                    .sum();
                assert_eq!(sum, a + b);
            }
        }
    }

    #[test]
    fn test_random_mig() {
        for seed in 0..10 {
            let mig = random_mig(5, 30, 4, seed);
            assert_eq!(mig.nb_inputs(), 5);
            assert_eq!(mig.nb_nodes(), 30);
            assert_eq!(mig.nb_outputs(), 4);
            assert!(mig.is_topo_sorted());
        }
        assert_eq!(random_mig(3, 10, 2, 42), random_mig(3, 10, 2, 42));
    }
}
