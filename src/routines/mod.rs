//! Library routines callable from scripts with `%PName(args)`

mod args;
mod dump;
mod message;
mod search;

pub use args::{Args, Value};
pub use message::Terminator;

use crate::script::{Context, ScriptErrorKind};
use tracing::trace;

/// What a routine hands back to the calling block.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RoutineOutput {
    /// Folded into the block's running boolean when present.
    pub truth: Option<bool>,
}

impl RoutineOutput {
    pub fn done() -> Self {
        RoutineOutput { truth: None }
    }

    pub fn truth(truth: bool) -> Self {
        RoutineOutput { truth: Some(truth) }
    }
}

/// Call the routine `name` with the raw argument text `args`. Names match
/// case-insensitively.
pub fn call(name: &str, args: &str, ctx: &mut Context<'_>) -> Result<RoutineOutput, ScriptErrorKind> {
    let args = Args::parse(name, args)?;
    trace!("call {} at {:04X}", name, ctx.current_address());

    match name.to_ascii_lowercase().as_ref() {
        "bytedump" => dump::byte_dump(&args, ctx),
        "worddump" => dump::word_dump(&args, ctx),
        "messagedump" => message::message_dump(&args, ctx),
        "findbytes" => search::find_bytes(&args, ctx),
        "offsetrange" => search::offset_range(&args, ctx),
        _ => Err(ScriptErrorKind::UnknownRoutine(name.to_string())),
    }
}

#[cfg(test)]
mod tests;
