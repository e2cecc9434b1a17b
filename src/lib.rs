//! Compilation and rewriting of majority-inverter graphs with equality saturation
//!
//! This crate loads logic networks in an e-graph, saturates them with the axioms of the
//! majority algebra, and extracts the smallest equivalent network it can find. The result is
//! either a new network ("rewrite" mode) or a straight-line program with the statistics of the
//! run ("compile" mode).
//!
//! # Usage
//!
//! ```bash
//! # Show available commands
//! # At the moment, only .bench files are supported
//! migsat help
//! # Rewrite the logic, and check the result with a SAT solver
//! migsat rewrite mydesign.bench -o optimized.bench --check
//! # Compile the logic and show the statistics
//! migsat compile mydesign.bench --print-program --verbose
//! # Check equivalence between the two
//! migsat equiv mydesign.bench optimized.bench
//! ```
//!
//! # Development
//!
//! ## Datastructures
//!
//! `Network` is a Majority-Inverter Graph: every gate is a 3-input majority, and inverters
//! are implicit, occupying just one bit in `Signal`. And and Or gates are majority gates with
//! a constant input.
//!
//! For example, here is a full adder circuit:
//! ```
//! # use migsat::Network;
//! let mut net = Network::new();
//! let i0 = net.add_input();
//! let i1 = net.add_input();
//! let i2 = net.add_input();
//! let carry = net.maj(i0, i1, i2);
//! let out = net.xor3(i0, i1, i2);
//! net.add_output(carry);
//! net.add_output(out);
//! ```
//!
//! ## Compilation pipeline
//!
//! The [`compiler`] module sequences the run: local simplification with
//! [`optim::preoptimize`], transfer to a [`compiler::SaturationEngine`], and transfer of the
//! result back. The engine is a trait, and [`compiler::EggEngine`] is the default
//! implementation, based on the [egg](https://docs.rs/egg) library.

#![warn(missing_docs)]

pub mod compiler;
pub mod equiv;
pub mod io;
pub mod network;
pub mod optim;
pub mod sim;

pub use compiler::{
    CompileError, Compiler, CompilerSettings, CompilerSettingsReduced, CompilerStatistics,
};
pub use network::{stats, Gate, Network, Signal};
