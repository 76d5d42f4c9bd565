//! Output lines, as built by the decode pass and finished by the label pass

use crate::annotate::{CommentPosition, LabelPolicy, LineAfterJump};
use crate::arch::z80::JumpClass;
use crate::maths::{address_width, format_address, Base};

/// The address a line starts at, with everything the label pass needs to
/// decide whether to print it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddressMarker {
    pub address: u16,
    pub base: Base,
    pub labels: LabelPolicy,
    pub period: u8,

    /// Whether the line renders data rather than an instruction.
    pub data: bool,
}

/// The columns of a decoded instruction. Hidden columns are `None`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CodeColumns {
    pub bytes: Option<String>,
    pub instruction: String,
    pub flags: Option<String>,
    pub timing: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Body {
    Code(CodeColumns),
    Data(String),
    Blank,
}

/// What the label pass decided to show in the address column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AddressColumn {
    /// The line has no address column at all.
    None,

    /// Padding of the given width.
    Hidden(usize),

    Shown(String),
}

impl AddressColumn {
    pub fn shown(marker: &AddressMarker) -> Self {
        AddressColumn::Shown(format_address(marker.address, marker.base))
    }

    pub fn hidden(marker: &AddressMarker) -> Self {
        AddressColumn::Hidden(address_width(marker.base))
    }
}

/// One listing line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineRecord {
    pub marker: Option<AddressMarker>,
    pub body: Body,
    pub comments: Vec<String>,
    pub before: Vec<String>,
    pub after: Vec<String>,
    pub jump: JumpClass,
    pub line_after: LineAfterJump,
    pub separator: String,
}

impl LineRecord {
    pub fn new(marker: Option<AddressMarker>, body: Body, separator: &str) -> Self {
        LineRecord {
            marker,
            body,
            comments: Vec::new(),
            before: Vec::new(),
            after: Vec::new(),
            jump: JumpClass::None,
            line_after: LineAfterJump::Never,
            separator: separator.to_string(),
        }
    }

    pub fn blank() -> Self {
        LineRecord::new(None, Body::Blank, "")
    }

    pub fn attach(&mut self, position: CommentPosition, text: String) {
        match position {
            CommentPosition::Before => self.before.push(text),
            CommentPosition::EndOfLine => self.comments.push(text),
            CommentPosition::After => self.after.push(text),
        }
    }

    /// Whether the line ends a run of code such that the blank-line policy
    /// asks for a gap after it.
    pub fn wants_gap(&self) -> bool {
        match (self.line_after, self.jump) {
            (LineAfterJump::Never, _) | (_, JumpClass::None) => false,
            (LineAfterJump::AfterAbsolute, JumpClass::Unconditional) => true,
            (LineAfterJump::AfterAbsolute, JumpClass::Conditional) => false,
            (LineAfterJump::AfterAll, _) => true,
        }
    }

    /// The end-of-line comments joined into one.
    pub fn comment(&self) -> Option<String> {
        if self.comments.is_empty() {
            None
        } else {
            Some(self.comments.join("; "))
        }
    }
}
