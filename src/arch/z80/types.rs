//! Types used in modeling the Z80 opcode tables

use std::fmt;

/// How an instruction affects one bit of the F register.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FlagEffect {
    Unaffected,
    Expected,
    Reset,
    Set,
    Parity,
    Overflow,
    Undefined,
}

impl FlagEffect {
    pub fn from_symbol(c: char) -> Option<Self> {
        match c {
            '-' => Some(FlagEffect::Unaffected),
            '*' => Some(FlagEffect::Expected),
            '0' => Some(FlagEffect::Reset),
            '1' => Some(FlagEffect::Set),
            'P' => Some(FlagEffect::Parity),
            'V' => Some(FlagEffect::Overflow),
            '?' => Some(FlagEffect::Undefined),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            FlagEffect::Unaffected => '-',
            FlagEffect::Expected => '*',
            FlagEffect::Reset => '0',
            FlagEffect::Set => '1',
            FlagEffect::Parity => 'P',
            FlagEffect::Overflow => 'V',
            FlagEffect::Undefined => '?',
        }
    }
}

/// Flag effects in `S Z H P/V N C` order.
pub type FlagSet = [FlagEffect; 6];

/// Execution time of an instruction in T-states.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Timing {
    /// Only the total is known.
    Total(u8),

    /// T-states per machine cycle. `alternate` is the path taken when a
    /// condition fails or a block instruction finishes.
    States {
        primary: Vec<u8>,
        alternate: Option<Vec<u8>>,
    },
}

impl Timing {
    pub fn total(&self) -> u32 {
        match self {
            Timing::Total(t) => *t as u32,
            Timing::States { primary, .. } => primary.iter().map(|t| *t as u32).sum(),
        }
    }

    pub fn alternate_total(&self) -> Option<u32> {
        match self {
            Timing::Total(_) => None,
            Timing::States { alternate, .. } => alternate
                .as_ref()
                .map(|a| a.iter().map(|t| *t as u32).sum()),
        }
    }

    /// Totals, e.g. `12/7`.
    pub fn describe_total(&self) -> String {
        match self.alternate_total() {
            Some(alt) => format!("{}/{}", self.total(), alt),
            None => format!("{}", self.total()),
        }
    }

    /// Per machine cycle, e.g. `4,3,5/4,3`.
    pub fn describe_states(&self) -> String {
        fn list(states: &[u8]) -> String {
            states
                .iter()
                .map(|t| t.to_string())
                .collect::<Vec<_>>()
                .join(",")
        }

        match self {
            Timing::Total(t) => format!("{}", t),
            Timing::States {
                primary,
                alternate: Some(alt),
            } => format!("{}/{}", list(primary), list(alt)),
            Timing::States { primary, .. } => list(primary),
        }
    }
}

/// How an instruction redirects control flow.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum JumpClass {
    None,
    Unconditional,
    Conditional,
}

/// The index register selected by a `DD` or `FD` prefix.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum IndexRegister {
    IX,
    IY,
}

impl IndexRegister {
    pub fn from_prefix(prefix: u8) -> Option<Self> {
        match prefix {
            0xDD => Some(IndexRegister::IX),
            0xFD => Some(IndexRegister::IY),
            _ => None,
        }
    }
}

impl fmt::Display for IndexRegister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexRegister::IX => write!(f, "IX"),
            IndexRegister::IY => write!(f, "IY"),
        }
    }
}

/// One decodable opcode.
///
/// Operand placeholders are the only lower-case text in `template`: `d` is a
/// signed index displacement, `j` a relative jump target, `aa` an absolute
/// address, `nn` a 16-bit immediate and `n` an 8-bit immediate. Each
/// lower-case letter stands for one byte of the encoding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpcodeEntry {
    pub template: String,
    pub flags: FlagSet,
    pub timing: Timing,
    pub undocumented: bool,
    pub length: u8,
    pub jump: JumpClass,

    /// Set on the `CB`, `DD`, `ED`, `FD`, `DDCB` and `FDCB` sentinels, which
    /// only direct the decoder to a further table.
    pub prefix: bool,
}

impl OpcodeEntry {
    pub fn has_flags(&self) -> bool {
        self.flags.iter().any(|f| *f != FlagEffect::Unaffected)
    }

    /// Flag effects as a six character string such as `***V0*`.
    pub fn describe_flags(&self) -> String {
        self.flags.iter().map(|f| f.symbol()).collect()
    }
}
