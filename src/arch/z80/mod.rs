//! Z80 instruction set, as found in the ZX Spectrum

mod dis;
mod table;
mod types;

pub use dis::*;
pub use table::{lookup, OPCODES, PASSTHROUGH};
pub use types::*;

#[cfg(test)]
mod tests;
