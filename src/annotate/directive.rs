//! Directive records

use crate::annotate::FormatChange;
use crate::arch::z80::{IndexRegister, Operand};

/// Where a comment is placed relative to the line it annotates.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CommentPosition {
    /// On its own line before the annotated line.
    Before,

    /// At the end of the annotated line.
    EndOfLine,

    /// On its own line after the annotated line.
    After,
}

impl CommentPosition {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(CommentPosition::Before),
            1 => Some(CommentPosition::EndOfLine),
            2 => Some(CommentPosition::After),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            CommentPosition::Before => 0,
            CommentPosition::EndOfLine => 1,
            CommentPosition::After => 2,
        }
    }

    /// Scripts name positions `B`, `E` and `A`.
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_uppercase() {
            'B' => Some(CommentPosition::Before),
            'E' => Some(CommentPosition::EndOfLine),
            'A' => Some(CommentPosition::After),
            _ => None,
        }
    }
}

/// Which operand kinds a reference comment matches.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ReferenceMatch {
    Address,
    Number,
    Both,
}

impl ReferenceMatch {
    pub fn matches(self, operand: &Operand) -> Option<u16> {
        match (self, operand) {
            (ReferenceMatch::Address, Operand::Address(v))
            | (ReferenceMatch::Number, Operand::Number(v))
            | (ReferenceMatch::Both, Operand::Address(v))
            | (ReferenceMatch::Both, Operand::Number(v)) => Some(*v),
            _ => None,
        }
    }
}

/// Which index register a displacement comment matches.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DisplacementMatch {
    IX,
    IY,
    Both,
}

impl DisplacementMatch {
    pub fn matches(self, operand: &Operand) -> Option<i8> {
        match (self, operand) {
            (DisplacementMatch::IX, Operand::Displacement(IndexRegister::IX, d))
            | (DisplacementMatch::IY, Operand::Displacement(IndexRegister::IY, d))
            | (DisplacementMatch::Both, Operand::Displacement(_, d)) => Some(*d),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DirectiveKind {
    /// Change formatting for the directive's range.
    Format(FormatChange),

    /// Render the range with a script instead of decoding it.
    DataBlock(String),

    /// Run a script over every address in the range, without consuming it.
    PatternBlock(String),

    Comment {
        position: CommentPosition,
        text: String,
    },

    /// Comment any instruction in range whose address or immediate operand
    /// equals `value`.
    CommentReference {
        position: CommentPosition,
        matching: ReferenceMatch,
        value: u16,
        text: String,
    },

    /// Comment any instruction in range using index displacement
    /// `displacement`.
    CommentDisplacement {
        position: CommentPosition,
        matching: DisplacementMatch,
        displacement: i8,
        text: String,
    },
}

/// An annotation covering the inclusive address range `start..=end`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Directive {
    pub start: u16,
    pub end: u16,
    pub kind: DirectiveKind,
}

impl Directive {
    pub fn new(start: u16, end: u16, kind: DirectiveKind) -> Self {
        Directive { start, end, kind }
    }

    pub fn format(start: u16, end: u16, change: FormatChange) -> Self {
        Self::new(start, end, DirectiveKind::Format(change))
    }

    pub fn data_block(start: u16, end: u16, program: &str) -> Self {
        Self::new(start, end, DirectiveKind::DataBlock(program.to_string()))
    }

    pub fn pattern_block(start: u16, end: u16, program: &str) -> Self {
        Self::new(start, end, DirectiveKind::PatternBlock(program.to_string()))
    }

    pub fn comment(start: u16, end: u16, position: CommentPosition, text: &str) -> Self {
        Self::new(
            start,
            end,
            DirectiveKind::Comment {
                position,
                text: text.to_string(),
            },
        )
    }

    /// Whether this is a format change spanning the whole address space.
    pub fn is_global_format(&self) -> bool {
        self.start == 0 && self.end == 0xFFFF && matches!(self.kind, DirectiveKind::Format(_))
    }

    pub fn is_plain_comment(&self) -> bool {
        matches!(self.kind, DirectiveKind::Comment { .. })
    }

    pub fn contains(&self, address: u32) -> bool {
        self.start as u32 <= address && address <= self.end as u32
    }
}

/// Order directives by range, keeping insertion order between equal ranges.
pub fn sort_directives(directives: &mut Vec<Directive>) {
    directives.sort_by_key(|d| (d.start, d.end));
}
