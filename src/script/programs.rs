//! Built-in block programs

use crate::annotate::Directive;

/// Whether a program renders a data block or searches a pattern block.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PresetKind {
    Data,
    Pattern,
}

/// A named block program shipped with the disassembler.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Preset {
    pub name: &'static str,
    pub kind: PresetKind,
    pub summary: &'static str,
    pub text: &'static str,
}

impl Preset {
    /// A directive running this program over `start..=end`.
    pub fn directive(&self, start: u16, end: u16) -> Directive {
        match self.kind {
            PresetKind::Data => Directive::data_block(start, end, self.text),
            PresetKind::Pattern => Directive::pattern_block(start, end, self.text),
        }
    }
}

/// Program the driver falls back to for bytes it cannot decode.
pub const RAW_BYTES: &str = "%PByteDump()";

const fn data(name: &'static str, summary: &'static str, text: &'static str) -> Preset {
    Preset {
        name,
        kind: PresetKind::Data,
        summary,
        text,
    }
}

const fn pattern(name: &'static str, summary: &'static str, text: &'static str) -> Preset {
    Preset {
        name,
        kind: PresetKind::Pattern,
        summary,
        text,
    }
}

pub static PRESETS: [Preset; 18] = [
    data("bytes", "DEFB lines of eight bytes", RAW_BYTES),
    data("bytes-decimal", "DEFB lines of eight decimal bytes", "%PByteDump(\"dec\")"),
    data("bytes-signed", "DEFB lines of eight signed decimal bytes", "%PByteDump(\"dec\", true)"),
    data("words", "DEFW lines of four words", "%PWordDump()"),
    data(
        "words-big-endian",
        "DEFW lines of four big-endian words",
        "%PWordDump(big_endian=true)",
    ),
    data("message", "Text running to the end of the block", "%PMessageDump()"),
    data("message-zero", "Text ended by a zero byte", "%PMessageDump(\"zero\")"),
    data(
        "message-highbit",
        "Text whose last character has bit 7 set",
        "%PMessageDump(\"highbit\")",
    ),
    data("message-len1", "Text after a length byte", "%PMessageDump(\"len1\")"),
    data("message-len2", "Text after a length word", "%PMessageDump(\"len2le\")"),
    data(
        "message-len2-big-endian",
        "Text after a big-endian length word",
        "%PMessageDump(\"len2be\")",
    ),
    data(
        "graphics",
        "One binary DEFB per line, for character and sprite bitmaps",
        "%F03%L%(%?LE8F8E%)%(%SDEFB%T%B2F%E%)",
    ),
    data(
        "floats",
        "Five-byte floating point numbers, one per line",
        "%L%(%?LE8F8E%)%(%SDEFF%T%G2F%E%)",
    ),
    data(
        "vectors",
        "Address tables, one referenced DEFW per line",
        "%L%(%?LE8F8E%)%(%SDEFW%T%A3F%E%)",
    ),
    pattern(
        "save-bytes",
        "Comment calls to the tape save routine",
        "%(%PFindBytes(\"CD C2 04\", \"Save IX,DE bytes\")%)",
    ),
    pattern(
        "load-bytes",
        "Comment calls to the tape load routine",
        "%(%PFindBytes(\"CD 56 05\", \"Load IX,DE bytes\")%)",
    ),
    pattern(
        "print-string",
        "Comment calls to the string printer",
        "%(%PFindBytes(\"CD 3C 20\", \"Print BC bytes from DE\")%)",
    ),
    pattern(
        "rom-calls",
        "Comment calls to common ROM routines",
        "%(%?BO%PFindBytes(\"CD C2 04\", \"Save IX,DE bytes\")%PFindBytes(\"CD 56 05\", \"Load IX,DE bytes\")%PFindBytes(\"CD 3C 20\", \"Print BC bytes from DE\")%PFindBytes(\"CD 01 16\", \"Open channel A\")%PFindBytes(\"CD B5 03\", \"Beep for DE cycles of HL\")%PFindBytes(\"CD 6B 0D\", \"Clear the screen\")%)",
    ),
];

/// Look a preset up by name, ignoring case.
pub fn preset(name: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}
