//! Z80 disassembler with a scriptable annotation overlay.
//!
//! The entry point is [`analysis::disassemble`], which walks a window of an
//! object code image, merges it with a set of [`annotate::Directive`]s and
//! yields an annotated listing.

#[macro_use]
extern crate clap;

#[macro_use]
extern crate lazy_static;

#[macro_use]
extern crate serde_plain;

pub mod analysis;
pub mod annotate;
pub mod arch;
pub mod cli;
pub mod error;
pub mod listing;
pub mod maths;
pub mod memory;
pub mod project;
pub mod routines;
pub mod script;

pub use analysis::{disassemble, disassemble_with};
pub use error::{Error, Result};
