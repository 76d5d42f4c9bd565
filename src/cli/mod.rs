//! CLI commands

mod common;
mod directives;
mod dis;
mod main;

pub use common::{resolve_program, Command};
pub use directives::directives;
pub use dis::dis;
pub use main::main;
