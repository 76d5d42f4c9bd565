//! Script errors

use thiserror::Error;

/// What went wrong while running a script.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ScriptErrorKind {
    #[error("unknown tag %{0}")]
    UnknownTag(char),

    #[error("expected %( to open a block")]
    MissingOpen,

    #[error("block is never closed")]
    MissingClose,

    #[error("%) without a matching %(")]
    UnbalancedClose,

    #[error("bad hex digit {0:?}")]
    BadHex(char),

    #[error("program ended inside a construct")]
    UnexpectedEnd,

    #[error("operand {0:02X} cannot be used here")]
    BadOperand(u8),

    #[error("read outside the image at {0:04X}")]
    OutOfRange(u32),

    #[error("division by zero")]
    DivisionByZero,

    #[error("slot {0} is read-only")]
    ReadOnlySlot(u8),

    #[error("unknown arithmetic operation {0:X}")]
    UnknownOperation(u8),

    #[error("unknown comparison {0:?}")]
    UnknownComparison(String),

    #[error("unknown comment kind {0:?}")]
    UnknownCommentKind(char),

    #[error("unknown routine {0:?}")]
    UnknownRoutine(String),

    #[error("bad argument to {routine}: {reason}")]
    BadArgument { routine: String, reason: String },

    #[error("loop ran for more than {0} iterations")]
    LoopLimit(usize),
}

impl ScriptErrorKind {
    pub fn bad_argument(routine: &str, reason: &str) -> Self {
        ScriptErrorKind::BadArgument {
            routine: routine.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// A script error located in its program and in the image.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{kind} at line {line}, column {column} (address {address:04X}) near {snippet:?}")]
pub struct ScriptError {
    pub kind: ScriptErrorKind,
    pub line: usize,
    pub column: usize,
    pub address: u16,
    pub snippet: String,
}
