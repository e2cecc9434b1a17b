//! Read and write logic networks to files

mod bench;
mod utils;

use std::fs::File;
use std::path::Path;

pub use bench::{read_bench, write_bench};

use crate::Network;

/// Read a logic network from a file
///
/// Following extensions are supported: .bench
pub fn read_network_file(path: &Path) -> Result<Network, String> {
    match path.extension() {
        None => Err(format!("No extension given for {}", path.display())),
        Some(s) if s == "bench" => {
            let f = File::open(path).map_err(|e| format!("Cannot open {}: {e}", path.display()))?;
            read_bench(f)
        }
        Some(s) => Err(format!("Unknown extension {}", s.to_string_lossy())),
    }
}

/// Write a logic network to a file
///
/// Following extensions are supported: .bench
pub fn write_network_file(path: &Path, mig: &Network) -> Result<(), String> {
    match path.extension() {
        None => Err(format!("No extension given for {}", path.display())),
        Some(s) if s == "bench" => {
            let mut f =
                File::create(path).map_err(|e| format!("Cannot create {}: {e}", path.display()))?;
            write_bench(&mut f, mig).map_err(|e| format!("Cannot write {}: {e}", path.display()))
        }
        Some(s) => Err(format!("Unknown extension {}", s.to_string_lossy())),
    }
}
