//! Project file structures

mod format;
mod program;
mod repr;

pub use format::FormatOverride;
pub use program::{PresetBlock, Program};
pub use repr::Project;

#[cfg(test)]
mod tests;
