//! Formatting scopes

use crate::maths::Base;
use serde::Serialize;
use std::{fmt, result, str};

/// Which cycle counts a code line shows.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum TimingDisplay {
    Off,
    Total,
    States,
    Both,
}

impl TimingDisplay {
    pub fn from_bits(bits: u32) -> Self {
        match bits & 3 {
            0 => TimingDisplay::Off,
            1 => TimingDisplay::Total,
            2 => TimingDisplay::States,
            _ => TimingDisplay::Both,
        }
    }

    pub fn bits(self) -> u32 {
        self as u32
    }
}

impl str::FromStr for TimingDisplay {
    type Err = ();

    fn from_str(s: &str) -> result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_ref() {
            "off" | "none" => Ok(TimingDisplay::Off),
            "total" => Ok(TimingDisplay::Total),
            "states" | "cycles" => Ok(TimingDisplay::States),
            "both" => Ok(TimingDisplay::Both),
            _ => Err(()),
        }
    }
}

derive_deserialize_from_str!(TimingDisplay, "valid timing display");

/// When a blank line is inserted after a control transfer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum LineAfterJump {
    Never,

    /// After unconditional jumps and returns.
    AfterAbsolute,

    /// After every jump, return or `DJNZ`, conditional or not.
    AfterAll,
}

impl LineAfterJump {
    pub fn from_bits(bits: u32) -> Self {
        match bits & 3 {
            0 => LineAfterJump::Never,
            1 => LineAfterJump::AfterAbsolute,
            _ => LineAfterJump::AfterAll,
        }
    }

    pub fn bits(self) -> u32 {
        self as u32
    }
}

impl str::FromStr for LineAfterJump {
    type Err = ();

    fn from_str(s: &str) -> result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_ref() {
            "never" => Ok(LineAfterJump::Never),
            "absolute" | "afterabsolute" => Ok(LineAfterJump::AfterAbsolute),
            "all" | "afterall" => Ok(LineAfterJump::AfterAll),
            _ => Err(()),
        }
    }
}

derive_deserialize_from_str!(LineAfterJump, "valid line-after-jump policy");

/// Which lines show their address.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum LabelPolicy {
    All,
    Never,

    /// Only addresses that some instruction refers to.
    Referenced,
}

impl LabelPolicy {
    pub fn from_bits(bits: u32) -> Self {
        match bits & 3 {
            0 => LabelPolicy::All,
            1 => LabelPolicy::Never,
            _ => LabelPolicy::Referenced,
        }
    }

    pub fn bits(self) -> u32 {
        self as u32
    }
}

impl str::FromStr for LabelPolicy {
    type Err = ();

    fn from_str(s: &str) -> result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_ref() {
            "all" => Ok(LabelPolicy::All),
            "never" | "none" => Ok(LabelPolicy::Never),
            "referenced" => Ok(LabelPolicy::Referenced),
            _ => Err(()),
        }
    }
}

derive_deserialize_from_str!(LabelPolicy, "valid label policy");

/// Every formatting option in effect at some address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FormatScope {
    pub address_base: Base,
    pub number_base: Base,

    /// Base of the opcode-bytes column, or `None` to hide it.
    pub opcode_bytes: Option<Base>,
    pub timing: TimingDisplay,
    pub line_after_jump: LineAfterJump,
    pub labels: LabelPolicy,

    /// With `LabelPolicy::Referenced`, force a label after this many
    /// unlabelled lines. Zero disables it.
    pub label_period: u8,
    pub comments: bool,
    pub separator: String,
    pub flags: bool,
    pub mark_undocumented: bool,
    pub markup: bool,

    /// Record 16-bit immediates as referenced addresses.
    pub data_references: bool,
}

impl Default for FormatScope {
    fn default() -> Self {
        FormatScope {
            address_base: Base::Hex,
            number_base: Base::Hex,
            opcode_bytes: None,
            timing: TimingDisplay::Off,
            line_after_jump: LineAfterJump::Never,
            labels: LabelPolicy::All,
            label_period: 0,
            comments: true,
            separator: "  ".to_string(),
            flags: false,
            mark_undocumented: false,
            markup: false,
            data_references: true,
        }
    }
}

impl FormatScope {
    /// Pack every option except the separator into the 32-bit form used by
    /// custom format directives.
    pub fn pack(&self) -> u32 {
        let opcode_bytes = match self.opcode_bytes {
            None => 0,
            Some(base) => base.bits() + 1,
        };

        self.address_base.bits()
            | self.number_base.bits() << 2
            | opcode_bytes << 4
            | self.timing.bits() << 7
            | self.line_after_jump.bits() << 9
            | self.labels.bits() << 11
            | (self.comments as u32) << 13
            | (self.flags as u32) << 14
            | (self.mark_undocumented as u32) << 15
            | (self.markup as u32) << 16
            | (self.data_references as u32) << 17
            | (self.label_period as u32) << 24
    }

    pub fn unpack(packed: u32, separator: &str) -> Self {
        let opcode_bytes = match (packed >> 4) & 7 {
            0 => None,
            n => Some(Base::from_bits(n - 1)),
        };

        FormatScope {
            address_base: Base::from_bits(packed),
            number_base: Base::from_bits(packed >> 2),
            opcode_bytes,
            timing: TimingDisplay::from_bits(packed >> 7),
            line_after_jump: LineAfterJump::from_bits(packed >> 9),
            labels: LabelPolicy::from_bits(packed >> 11),
            label_period: (packed >> 24) as u8,
            comments: packed & 1 << 13 != 0,
            separator: separator.to_string(),
            flags: packed & 1 << 14 != 0,
            mark_undocumented: packed & 1 << 15 != 0,
            markup: packed & 1 << 16 != 0,
            data_references: packed & 1 << 17 != 0,
        }
    }
}

/// A change to one formatting option, or to all of them at once.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormatChange {
    AddressBase(Base),
    NumberBase(Base),
    OpcodeBytes(Option<Base>),
    Timing(TimingDisplay),
    LineAfterJump(LineAfterJump),
    Labels(LabelPolicy),
    LabelPeriod(u8),
    Comments(bool),
    Separator(String),
    Flags(bool),
    Undocumented(bool),
    Markup(bool),
    DataReferences(bool),
    Custom(FormatScope),
}

impl FormatChange {
    pub fn apply(&self, scope: &mut FormatScope) {
        match self {
            FormatChange::AddressBase(b) => scope.address_base = *b,
            FormatChange::NumberBase(b) => scope.number_base = *b,
            FormatChange::OpcodeBytes(b) => scope.opcode_bytes = *b,
            FormatChange::Timing(t) => scope.timing = *t,
            FormatChange::LineAfterJump(l) => scope.line_after_jump = *l,
            FormatChange::Labels(l) => scope.labels = *l,
            FormatChange::LabelPeriod(p) => scope.label_period = *p,
            FormatChange::Comments(c) => scope.comments = *c,
            FormatChange::Separator(s) => scope.separator = s.clone(),
            FormatChange::Flags(f) => scope.flags = *f,
            FormatChange::Undocumented(u) => scope.mark_undocumented = *u,
            FormatChange::Markup(m) => scope.markup = *m,
            FormatChange::DataReferences(d) => scope.data_references = *d,
            FormatChange::Custom(s) => *scope = s.clone(),
        }
    }

    /// The option number used in directive codes.
    pub fn option(&self) -> u8 {
        match self {
            FormatChange::AddressBase(_) => 0x01,
            FormatChange::NumberBase(_) => 0x02,
            FormatChange::OpcodeBytes(_) => 0x03,
            FormatChange::Timing(_) => 0x04,
            FormatChange::LineAfterJump(_) => 0x05,
            FormatChange::Labels(_) => 0x06,
            FormatChange::LabelPeriod(_) => 0x07,
            FormatChange::Comments(_) => 0x08,
            FormatChange::Separator(_) => 0x09,
            FormatChange::Flags(_) => 0x0A,
            FormatChange::Undocumented(_) => 0x0B,
            FormatChange::Markup(_) => 0x0C,
            FormatChange::DataReferences(_) => 0x0D,
            FormatChange::Custom(_) => 0xFF,
        }
    }

    /// The single-byte value of a simple option. `None` for the separator
    /// and custom forms, which carry a string payload.
    pub fn value(&self) -> Option<u8> {
        Some(match self {
            FormatChange::AddressBase(b) | FormatChange::NumberBase(b) => b.bits() as u8,
            FormatChange::OpcodeBytes(None) => 0xFF,
            FormatChange::OpcodeBytes(Some(b)) => b.bits() as u8,
            FormatChange::Timing(t) => t.bits() as u8,
            FormatChange::LineAfterJump(l) => l.bits() as u8,
            FormatChange::Labels(l) => l.bits() as u8,
            FormatChange::LabelPeriod(p) => *p,
            FormatChange::Comments(v)
            | FormatChange::Flags(v)
            | FormatChange::Undocumented(v)
            | FormatChange::Markup(v)
            | FormatChange::DataReferences(v) => *v as u8,
            FormatChange::Separator(_) | FormatChange::Custom(_) => return None,
        })
    }

    /// Rebuild a simple option from its number and value.
    pub fn from_option(option: u8, value: u8) -> Option<Self> {
        let bits = value as u32;

        Some(match option {
            0x01 => FormatChange::AddressBase(Base::from_bits(bits)),
            0x02 => FormatChange::NumberBase(Base::from_bits(bits)),
            0x03 if value == 0xFF => FormatChange::OpcodeBytes(None),
            0x03 => FormatChange::OpcodeBytes(Some(Base::from_bits(bits))),
            0x04 => FormatChange::Timing(TimingDisplay::from_bits(bits)),
            0x05 => FormatChange::LineAfterJump(LineAfterJump::from_bits(bits)),
            0x06 => FormatChange::Labels(LabelPolicy::from_bits(bits)),
            0x07 => FormatChange::LabelPeriod(value),
            0x08 => FormatChange::Comments(value != 0),
            0x0A => FormatChange::Flags(value != 0),
            0x0B => FormatChange::Undocumented(value != 0),
            0x0C => FormatChange::Markup(value != 0),
            0x0D => FormatChange::DataReferences(value != 0),
            _ => return None,
        })
    }
}

impl fmt::Display for FormatScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "address {}, numbers {}, labels {:?}, timing {:?}",
            self.address_base, self.number_base, self.labels, self.timing
        )
    }
}

/// The formatting scopes in effect at the cursor.
///
/// The base scope is never removed. Every other scope lasts until the cursor
/// passes its end address and is derived from whichever scope was current
/// when it was pushed.
#[derive(Clone, Debug)]
pub struct ScopeStack {
    base: FormatScope,
    scoped: Vec<(u16, FormatScope)>,
}

impl ScopeStack {
    pub fn new(base: FormatScope) -> Self {
        ScopeStack {
            base,
            scoped: Vec::new(),
        }
    }

    pub fn current(&self) -> &FormatScope {
        self.scoped
            .last()
            .map(|(_, scope)| scope)
            .unwrap_or(&self.base)
    }

    pub fn depth(&self) -> usize {
        self.scoped.len()
    }

    pub fn push(&mut self, end: u16, change: &FormatChange) {
        let mut scope = self.current().clone();
        change.apply(&mut scope);
        self.scoped.push((end, scope));
    }

    /// Drop every scope that ends before `cursor`.
    pub fn expire(&mut self, cursor: u32) {
        self.scoped.retain(|(end, _)| *end as u32 >= cursor);
    }
}
