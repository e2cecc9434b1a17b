use core::fmt;
use std::collections::hash_map::Entry;

use fxhash::FxHashMap;

use crate::network::gates::{Gate, Normalization};
use crate::network::signal::Signal;

/// Representation of a logic network as a majority-inverter graph
///
/// Nodes are three-input majority gates, and inverters are implicit in the `Signal` edges.
/// Gates are numbered in insertion order; most algorithms expect them to be topologically sorted,
/// so that a gate only references gates with a lower index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Network {
    nb_inputs: usize,
    nodes: Vec<Gate>,
    outputs: Vec<Signal>,
}

impl Network {
    /// Create a new, empty network
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the number of primary inputs
    pub fn nb_inputs(&self) -> usize {
        self.nb_inputs
    }

    /// Return the number of primary outputs
    pub fn nb_outputs(&self) -> usize {
        self.outputs.len()
    }

    /// Return the number of majority nodes in the network
    pub fn nb_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Get the input at index i
    pub fn input(&self, i: usize) -> Signal {
        assert!(i < self.nb_inputs());
        Signal::from_input(i as u32)
    }

    /// Get the output at index i
    pub fn output(&self, i: usize) -> Signal {
        self.outputs[i]
    }

    /// Iterate over the primary outputs, in order
    pub fn outputs(&self) -> impl Iterator<Item = Signal> + '_ {
        self.outputs.iter().copied()
    }

    /// Get the signal driven by the node at index i
    pub fn node(&self, i: usize) -> Signal {
        Signal::from_var(i as u32)
    }

    /// Get the gate at index i
    pub fn gate(&self, i: usize) -> &Gate {
        &self.nodes[i]
    }

    /// Add a new primary input
    pub fn add_input(&mut self) -> Signal {
        self.nb_inputs += 1;
        self.input(self.nb_inputs() - 1)
    }

    /// Add multiple primary inputs
    pub fn add_inputs(&mut self, nb: usize) {
        self.nb_inputs += nb;
    }

    /// Add a new primary output based on an existing signal
    pub fn add_output(&mut self, s: Signal) {
        self.outputs.push(s)
    }

    /// Replace all primary outputs
    pub fn set_outputs(&mut self, outputs: Vec<Signal>) {
        self.outputs = outputs;
    }

    /// Create a majority gate, simplified if possible
    pub fn maj(&mut self, a: Signal, b: Signal, c: Signal) -> Signal {
        self.add_canonical(Gate::maj(a, b, c))
    }

    /// Create an And2 gate
    pub fn and(&mut self, a: Signal, b: Signal) -> Signal {
        self.add_canonical(Gate::and(a, b))
    }

    /// Create an Or2 gate
    pub fn or(&mut self, a: Signal, b: Signal) -> Signal {
        self.add_canonical(Gate::or(a, b))
    }

    /// Create a Xor2 function, using three majority gates
    pub fn xor(&mut self, a: Signal, b: Signal) -> Signal {
        let x = self.and(a, !b);
        let y = self.and(!a, b);
        self.or(x, y)
    }

    /// Create a Xor3 function, using three majority gates
    pub fn xor3(&mut self, a: Signal, b: Signal, c: Signal) -> Signal {
        let m = self.maj(a, b, c);
        let m_n = self.maj(a, b, !c);
        self.maj(!m, m_n, c)
    }

    /// Create an n-ary And as a balanced tree
    pub fn and_n(&mut self, sigs: &[Signal]) -> Signal {
        match sigs.len() {
            0 => Signal::one(),
            1 => sigs[0],
            n => {
                let a = self.and_n(&sigs[..n / 2]);
                let b = self.and_n(&sigs[n / 2..]);
                self.and(a, b)
            }
        }
    }

    /// Create an n-ary Or as a balanced tree
    pub fn or_n(&mut self, sigs: &[Signal]) -> Signal {
        let inv: Vec<Signal> = sigs.iter().map(|s| !s).collect();
        !self.and_n(&inv)
    }

    /// Create an n-ary Xor as a balanced tree
    pub fn xor_n(&mut self, sigs: &[Signal]) -> Signal {
        match sigs.len() {
            0 => Signal::zero(),
            1 => sigs[0],
            n => {
                let a = self.xor_n(&sigs[..n / 2]);
                let b = self.xor_n(&sigs[n / 2..]);
                self.xor(a, b)
            }
        }
    }

    /// Add a new gate, and make it canonical. The gate may be simplified immediately
    pub fn add_canonical(&mut self, gate: Gate) -> Signal {
        match gate.make_canonical() {
            Normalization::Copy(l) => l,
            Normalization::Node(g, inv) => self.add(g) ^ inv,
        }
    }

    /// Add a new gate as is
    pub fn add(&mut self, gate: Gate) -> Signal {
        let l = Signal::from_var(self.nodes.len() as u32);
        self.nodes.push(gate);
        l
    }

    /// Return whether the network is already topologically sorted
    pub fn is_topo_sorted(&self) -> bool {
        self.nodes
            .iter()
            .enumerate()
            .all(|(i, g)| g.vars().all(|v| v < i as u32))
    }

    /// Remap nodes; there may be holes in the translation
    fn remap(&mut self, order: &[u32]) -> Box<[Signal]> {
        let mut translation = vec![Signal::zero(); self.nb_nodes()];
        for (new_i, old_i) in order.iter().enumerate() {
            translation[*old_i as usize] = Signal::from_var(new_i as u32);
        }

        self.nodes = order
            .iter()
            .map(|o| self.gate(*o as usize).remap_order(translation.as_slice()))
            .collect();
        self.remap_outputs(&translation);
        translation.into()
    }

    fn remap_outputs(&mut self, translation: &[Signal]) {
        for o in self.outputs.iter_mut() {
            *o = o.remap_order(translation);
        }
    }

    /// Remove logic that no output depends on; this will invalidate all signals
    ///
    /// Returns the mapping of old variable indices to signals, if needed.
    /// Removed signals are mapped to zero.
    pub fn sweep(&mut self) -> Box<[Signal]> {
        let mut visited = vec![false; self.nb_nodes()];
        let mut to_visit: Vec<u32> = self
            .outputs
            .iter()
            .filter(|s| s.is_var())
            .map(|s| s.var())
            .collect();
        while let Some(node) = to_visit.pop() {
            if visited[node as usize] {
                continue;
            }
            visited[node as usize] = true;
            to_visit.extend(self.gate(node as usize).vars());
        }

        let order: Vec<u32> = visited
            .iter()
            .enumerate()
            .filter(|(_, v)| **v)
            .map(|(i, _)| i as u32)
            .collect();
        self.remap(order.as_slice())
    }

    /// Remove duplicate logic and make all gates canonical; this will invalidate all signals
    ///
    /// Returns the mapping of old variable indices to signals, if needed.
    pub fn dedup(&mut self) -> Vec<Signal> {
        // Gate inputs must be replaced before the gate itself
        assert!(self.is_topo_sorted());
        let mut translation = Vec::with_capacity(self.nb_nodes());
        let mut hsh = FxHashMap::<Gate, Signal>::default();
        let mut new_nodes = Vec::new();

        for i in 0..self.nb_nodes() {
            let g = self.gate(i).remap_order(translation.as_slice());
            let s = match g.make_canonical() {
                Normalization::Copy(sig) => sig,
                Normalization::Node(g, inv) => match hsh.entry(g) {
                    Entry::Occupied(e) => e.get() ^ inv,
                    Entry::Vacant(e) => {
                        let node_s = Signal::from_var(new_nodes.len() as u32);
                        e.insert(node_s);
                        new_nodes.push(g);
                        node_s ^ inv
                    }
                },
            };
            translation.push(s);
        }

        self.nodes = new_nodes;
        self.remap_outputs(&translation);
        self.check();
        translation
    }

    /// Compute a topological order of the nodes, or None if there is a combinatorial loop
    pub fn topo_order(&self) -> Option<Vec<u32>> {
        // Count the fanouts of each gate
        let mut count_deps = vec![0u32; self.nb_nodes()];
        for g in self.nodes.iter() {
            for v in g.vars() {
                count_deps[v as usize] += 1;
            }
        }

        // Visit from the gates without fanout, so the order is built in reverse
        let mut rev_order: Vec<u32> = Vec::new();
        let mut visited = vec![false; self.nb_nodes()];
        let mut to_visit: Vec<u32> = (0..self.nb_nodes() as u32)
            .filter(|v| count_deps[*v as usize] == 0)
            .rev()
            .collect();
        while let Some(v) = to_visit.pop() {
            if visited[v as usize] {
                continue;
            }
            visited[v as usize] = true;
            rev_order.push(v);
            for d in self.gate(v as usize).vars() {
                count_deps[d as usize] -= 1;
                if count_deps[d as usize] == 0 {
                    to_visit.push(d);
                }
            }
        }

        if rev_order.len() != self.nb_nodes() {
            return None;
        }
        rev_order.reverse();
        Some(rev_order)
    }

    /// Topologically sort the network; this will invalidate all signals
    ///
    /// Ordering may be changed even if already sorted.
    /// Returns the mapping of old variable indices to signals, if needed.
    pub fn topo_sort(&mut self) -> Box<[Signal]> {
        let order = self
            .topo_order()
            .expect("Unable to find a valid topological sort: there must be a combinatorial loop");
        self.remap(order.as_slice())
    }

    /// Check consistency of the datastructure
    pub fn check(&self) {
        for i in 0..self.nb_nodes() {
            for v in self.gate(i).dependencies() {
                assert!(self.is_valid(*v), "Invalid signal {v}");
            }
        }
        for o in self.outputs() {
            assert!(self.is_valid(o), "Invalid output {o}");
        }
    }

    /// Returns whether a signal is valid (within bounds) in the network
    pub fn is_valid(&self, s: Signal) -> bool {
        if s.is_input() {
            s.input() < self.nb_inputs() as u32
        } else if s.is_var() {
            s.var() < self.nb_nodes() as u32
        } else {
            true
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Network with {} inputs, {} outputs:",
            self.nb_inputs(),
            self.nb_outputs()
        )?;
        for i in 0..self.nb_nodes() {
            writeln!(f, "\t{} = {}", self.node(i), self.gate(i))?;
        }
        for (i, o) in self.outputs().enumerate() {
            writeln!(f, "\to{} = {}", i, o)?;
        }
        Ok(())
    }
}
