//! The block scripting language.
//!
//! Data and pattern blocks carry small programs: literal text interleaved
//! with `%` constructs that read the image, keep sixteen 16-bit slots, test
//! conditions, loop, call library routines and emit comments. This module
//! holds the evaluator and the state it runs against.

mod charset;
mod context;
mod error;
mod float;
mod interp;
mod operand;
mod programs;

pub use charset::*;
pub use context::*;
pub use error::*;
pub use float::*;
pub use interp::{run, run_pattern, Interpreter, Outcome, LOOP_LIMIT};
pub use operand::OperandSpec;
pub use programs::{preset, Preset, PresetKind, PRESETS, RAW_BYTES};

#[cfg(test)]
mod tests;
