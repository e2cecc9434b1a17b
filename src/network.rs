//! Representation and handling of majority-inverter graphs

mod gates;
pub mod generators;
mod network;
mod signal;
pub mod stats;

pub use gates::{Gate, Normalization};
pub use network::Network;
pub use signal::Signal;
