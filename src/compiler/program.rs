//! Straight-line programs computing a majority-inverter graph
//!
//! A program evaluates the gates one after the other in a register file. Inverted fan-ins
//! are computed in scratch registers just before the gate that reads them, and registers are
//! reused as soon as their value is dead.

use std::fmt;

use itertools::Itertools;

use crate::{Network, Signal};

/// Location of a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Address {
    /// Constant value
    Const(bool),
    /// Primary input
    In(u64),
    /// Primary output
    Out(u64),
    /// Register
    Reg(u32),
}

/// A single operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instruction {
    /// Majority of three values
    Maj(Address, [Address; 3]),
    /// Inverted copy
    Not(Address, Address),
    /// Copy
    Copy(Address, Address),
}

/// A compiled program
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    nb_inputs: usize,
    nb_outputs: usize,
    nb_registers: u32,
    instructions: Vec<Instruction>,
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Const(b) => write!(f, "{}", *b as u8),
            Address::In(i) => write!(f, "in{}", i),
            Address::Out(i) => write!(f, "out{}", i),
            Address::Reg(r) => write!(f, "r{}", r),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Maj(dst, ops) => write!(f, "{} = maj({})", dst, ops.iter().join(", ")),
            Instruction::Not(dst, src) => write!(f, "{} = not({})", dst, src),
            Instruction::Copy(dst, src) => write!(f, "{} = {}", dst, src),
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "# {} inputs, {} outputs, {} registers",
            self.nb_inputs, self.nb_outputs, self.nb_registers
        )?;
        for i in &self.instructions {
            writeln!(f, "{}", i)?;
        }
        Ok(())
    }
}

impl Program {
    /// Number of instructions
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns whether the program has no instruction
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Instructions, in execution order
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Number of registers used
    pub fn nb_registers(&self) -> u32 {
        self.nb_registers
    }

    /// Execute the program on a single input pattern; return the output values
    pub fn evaluate(&self, inputs: &[bool]) -> Vec<bool> {
        assert_eq!(inputs.len(), self.nb_inputs);
        let mut regs = vec![false; self.nb_registers as usize];
        let mut outs = vec![false; self.nb_outputs];
        let read = |regs: &[bool], outs: &[bool], a: Address| match a {
            Address::Const(b) => b,
            Address::In(i) => inputs[i as usize],
            Address::Out(i) => outs[i as usize],
            Address::Reg(r) => regs[r as usize],
        };
        for instr in &self.instructions {
            let (dst, val) = match *instr {
                Instruction::Maj(dst, [a, b, c]) => {
                    let (a, b, c) = (
                        read(&regs, &outs, a),
                        read(&regs, &outs, b),
                        read(&regs, &outs, c),
                    );
                    (dst, (a & b) | (a & c) | (b & c))
                }
                Instruction::Not(dst, src) => (dst, !read(&regs, &outs, src)),
                Instruction::Copy(dst, src) => (dst, read(&regs, &outs, src)),
            };
            match dst {
                Address::Reg(r) => regs[r as usize] = val,
                Address::Out(i) => outs[i as usize] = val,
                _ => panic!("Instruction {instr} writes to a read-only location"),
            }
        }
        outs
    }
}

/// Register allocation with reuse of the freed registers
#[derive(Default)]
struct Registers {
    free: Vec<u32>,
    nb: u32,
}

impl Registers {
    fn alloc(&mut self) -> u32 {
        self.free.pop().unwrap_or_else(|| {
            self.nb += 1;
            self.nb - 1
        })
    }

    fn release(&mut self, r: u32) {
        self.free.push(r);
    }
}

/// Location of a non-inverted signal
fn address(s: Signal, location: &[Address]) -> Address {
    if s.is_constant() {
        Address::Const(s == Signal::one())
    } else if s.is_input() {
        Address::In(s.input() as u64)
    } else {
        location[s.var() as usize]
    }
}

/// Count one use of a signal, freeing its register after the last one
fn release(regs: &mut Registers, uses: &mut [u32], location: &[Address], s: Signal) {
    if s.is_var() {
        let v = s.var() as usize;
        uses[v] -= 1;
        if let (0, Address::Reg(r)) = (uses[v], location[v]) {
            regs.release(r);
        }
    }
}

/// Compile a topologically sorted network to a program
///
/// Gates that no output depends on are skipped.
pub fn compile_program(mig: &Network) -> Program {
    assert!(mig.is_topo_sorted());

    let mut uses = vec![0u32; mig.nb_nodes()];
    for i in 0..mig.nb_nodes() {
        for v in mig.gate(i).vars() {
            uses[v as usize] += 1;
        }
    }
    for o in mig.outputs().filter(|o| o.is_var()) {
        uses[o.var() as usize] += 1;
    }
    // Dead gates do not hold their fan-ins alive
    for i in (0..mig.nb_nodes()).rev() {
        if uses[i] == 0 {
            for v in mig.gate(i).vars() {
                uses[v as usize] -= 1;
            }
        }
    }

    let mut regs = Registers::default();
    let mut location = vec![Address::Const(false); mig.nb_nodes()];
    let mut instructions = Vec::new();

    for i in 0..mig.nb_nodes() {
        if uses[i] == 0 {
            continue;
        }
        let deps = *mig.gate(i).dependencies();
        let mut scratch = Vec::new();
        let mut ops = [Address::Const(false); 3];
        for (op, s) in ops.iter_mut().zip(deps) {
            if s.is_inverted() && !s.is_constant() {
                let r = regs.alloc();
                instructions.push(Instruction::Not(
                    Address::Reg(r),
                    address(!s, &location),
                ));
                scratch.push(r);
                *op = Address::Reg(r);
            } else {
                *op = address(s, &location);
            }
        }
        let dst = regs.alloc();
        instructions.push(Instruction::Maj(Address::Reg(dst), ops));
        location[i] = Address::Reg(dst);
        for r in scratch {
            regs.release(r);
        }
        for s in deps {
            release(&mut regs, &mut uses, &location, s);
        }
    }

    for (k, o) in mig.outputs().enumerate() {
        let dst = Address::Out(k as u64);
        if o.is_inverted() && !o.is_constant() {
            instructions.push(Instruction::Not(dst, address(!o, &location)));
        } else {
            instructions.push(Instruction::Copy(dst, address(o, &location)));
        }
        release(&mut regs, &mut uses, &location, o);
    }

    Program {
        nb_inputs: mig.nb_inputs(),
        nb_outputs: mig.nb_outputs(),
        nb_registers: regs.nb,
        instructions,
    }
}

#[cfg(test)]
mod tests {
    use super::{compile_program, Address, Instruction};
    use crate::network::generators::adder::ripple_carry;
    use crate::network::generators::random::random_mig;
    use crate::network::Gate;
    use crate::sim::simulate_comb;
    use crate::{Network, Signal};

    fn check_all_patterns(mig: &Network) {
        let program = compile_program(mig);
        for k in 0..(1u32 << mig.nb_inputs()) {
            let inputs: Vec<bool> = (0..mig.nb_inputs()).map(|i| (k >> i) & 1 != 0).collect();
            assert_eq!(program.evaluate(&inputs), simulate_comb(mig, &inputs));
        }
    }

    #[test]
    fn test_inverted_fanin() {
        let mut mig = Network::new();
        let i0 = mig.add_input();
        let i1 = mig.add_input();
        let i2 = mig.add_input();
        let x0 = mig.add(Gate::maj(!i0, i1, i2));
        mig.add_output(x0);
        let program = compile_program(&mig);
        assert_eq!(
            program.instructions(),
            &[
                Instruction::Not(Address::Reg(0), Address::In(0)),
                Instruction::Maj(
                    Address::Reg(1),
                    [Address::Reg(0), Address::In(1), Address::In(2)]
                ),
                Instruction::Copy(Address::Out(0), Address::Reg(1)),
            ]
        );
        assert_eq!(program.nb_registers(), 2);
        assert_eq!(
            program.to_string(),
            "# 3 inputs, 1 outputs, 2 registers\nr0 = not(in0)\nr1 = maj(r0, in1, in2)\nout0 = r1\n"
        );
    }

    #[test]
    fn test_outputs() {
        let mut mig = Network::new();
        let i0 = mig.add_input();
        mig.add_output(Signal::one());
        mig.add_output(!i0);
        mig.add_output(i0);
        let program = compile_program(&mig);
        assert_eq!(
            program.instructions(),
            &[
                Instruction::Copy(Address::Out(0), Address::Const(true)),
                Instruction::Not(Address::Out(1), Address::In(0)),
                Instruction::Copy(Address::Out(2), Address::In(0)),
            ]
        );
        assert_eq!(program.evaluate(&[false]), vec![true, true, false]);
    }

    #[test]
    fn test_register_reuse() {
        let mut mig = Network::new();
        let i0 = mig.add_input();
        let i1 = mig.add_input();
        let mut x = mig.add_input();
        for _ in 0..20 {
            x = mig.add(Gate::maj(x, i0, i1));
        }
        mig.add_output(x);
        let program = compile_program(&mig);
        assert_eq!(program.nb_registers(), 2);
        assert_eq!(program.len(), 21);
        check_all_patterns(&mig);
    }

    #[test]
    fn test_dead_gates() {
        let mut mig = Network::new();
        let i0 = mig.add_input();
        let i1 = mig.add_input();
        let x0 = mig.add(Gate::maj(i0, i1, Signal::zero()));
        mig.add(Gate::maj(x0, i1, !i0));
        mig.add_output(i0);
        let program = compile_program(&mig);
        assert_eq!(program.len(), 1);
        assert_eq!(program.nb_registers(), 0);
    }

    #[test]
    fn test_adder() {
        check_all_patterns(&ripple_carry(3));
    }

    #[test]
    fn test_random() {
        for seed in 0..10 {
            check_all_patterns(&random_mig(6, 40, 5, seed));
        }
    }
}
