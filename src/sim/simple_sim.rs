use crate::{Network, Signal};

/// Structure for simulation based directly on the network representation
///
/// Each value is a 64-bit word, so that 64 patterns are simulated at once.
pub struct SimpleSimulator<'a> {
    mig: &'a Network,
    input_values: Vec<u64>,
    node_values: Vec<u64>,
}

/// Convert the inversion to a word for bitwise operations
fn pol_to_word(s: Signal) -> u64 {
    let pol = s.raw() & 1;
    (!(pol as u64)).wrapping_add(1)
}

fn maj(a: u64, b: u64, c: u64) -> u64 {
    (b & c) | (a & (b | c))
}

impl<'a> SimpleSimulator<'a> {
    pub fn from_network(mig: &'a Network) -> SimpleSimulator<'a> {
        assert!(mig.is_topo_sorted());
        SimpleSimulator {
            mig,
            input_values: vec![0; mig.nb_inputs()],
            node_values: vec![0; mig.nb_nodes()],
        }
    }

    pub fn run(&mut self, inputs: &[u64]) -> Vec<u64> {
        assert_eq!(inputs.len(), self.input_values.len());
        self.input_values.copy_from_slice(inputs);
        for i in 0..self.mig.nb_nodes() {
            let [a, b, c] = *self.mig.gate(i).dependencies();
            self.node_values[i] = maj(self.get_value(a), self.get_value(b), self.get_value(c));
        }
        self.mig.outputs().map(|o| self.get_value(o)).collect()
    }

    fn get_value(&self, s: Signal) -> u64 {
        let v = if s.is_constant() {
            0
        } else if s.is_input() {
            self.input_values[s.input() as usize]
        } else {
            self.node_values[s.var() as usize]
        };
        v ^ pol_to_word(s)
    }
}

#[cfg(test)]
mod tests {
    use super::{maj, pol_to_word};
    use crate::Signal;

    #[test]
    fn test_words() {
        assert_eq!(pol_to_word(Signal::zero()), 0);
        assert_eq!(pol_to_word(Signal::one()), !0);
        assert_eq!(maj(0b1100, 0b1010, 0b0110), 0b1110);
    }
}
