//! Numeral rendering for operands, address columns and opcode bytes

use serde::Serialize;
use std::{fmt, result, str};

/// The four numeric bases a listing can be rendered in.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Base {
    Hex,
    Decimal,
    Octal,
    Binary,
}

impl Base {
    /// Decode the two-bit base field used by directives and `%F`.
    pub fn from_bits(bits: u32) -> Self {
        match bits & 3 {
            0 => Base::Hex,
            1 => Base::Decimal,
            2 => Base::Octal,
            _ => Base::Binary,
        }
    }

    pub fn bits(self) -> u32 {
        match self {
            Base::Hex => 0,
            Base::Decimal => 1,
            Base::Octal => 2,
            Base::Binary => 3,
        }
    }
}

impl Default for Base {
    fn default() -> Self {
        Base::Hex
    }
}

impl fmt::Display for Base {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Base::Hex => write!(f, "hex"),
            Base::Decimal => write!(f, "dec"),
            Base::Octal => write!(f, "oct"),
            Base::Binary => write!(f, "bin"),
        }
    }
}

impl str::FromStr for Base {
    type Err = ();

    fn from_str(s: &str) -> result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_ref() {
            "hex" | "hexadecimal" | "0" => Ok(Base::Hex),
            "dec" | "decimal" | "1" => Ok(Base::Decimal),
            "oct" | "octal" | "2" => Ok(Base::Octal),
            "bin" | "binary" | "3" => Ok(Base::Binary),
            _ => Err(()),
        }
    }
}

derive_deserialize_from_str!(Base, "valid numeric base");

/// Width of a rendered quantity.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Width {
    Byte,
    Word,
}

impl Width {
    pub fn bytes(self) -> u16 {
        match self {
            Width::Byte => 1,
            Width::Word => 2,
        }
    }

    fn mask(self) -> u32 {
        match self {
            Width::Byte => 0xFF,
            Width::Word => 0xFFFF,
        }
    }
}

/// Render an operand value.
///
/// Hexadecimal is prefixed with `#`, octal with `@` and binary with `%`;
/// decimal has no prefix. When `signed` is set, values with the top bit of
/// `width` set are rendered as a minus sign and their magnitude.
pub fn format_number(value: u32, width: Width, base: Base, signed: bool) -> String {
    let value = value & width.mask();
    let sign_bit = (width.mask() + 1) >> 1;

    if signed && value & sign_bit != 0 {
        let magnitude = (width.mask() + 1) - value;
        return format!("-{}", format_number(magnitude, width, base, false));
    }

    match (base, width) {
        (Base::Hex, Width::Byte) => format!("#{:02X}", value),
        (Base::Hex, Width::Word) => format!("#{:04X}", value),
        (Base::Decimal, _) => format!("{}", value),
        (Base::Octal, _) => format!("@{:o}", value),
        (Base::Binary, Width::Byte) => format!("%{:08b}", value),
        (Base::Binary, Width::Word) => format!("%{:016b}", value),
    }
}

/// Render a signed index displacement, sign first: `+#05`, `-#02`.
pub fn format_displacement(disp: i8, base: Base) -> String {
    let magnitude = (disp as i16).abs() as u32;
    let sign = if disp < 0 { '-' } else { '+' };

    format!("{}{}", sign, format_number(magnitude, Width::Byte, base, false))
}

/// Render the address column. Addresses carry no prefix and are zero padded
/// to the full width of a 16-bit value in the chosen base.
pub fn format_address(address: u16, base: Base) -> String {
    match base {
        Base::Hex => format!("{:04X}", address),
        Base::Decimal => format!("{:05}", address),
        Base::Octal => format!("{:06o}", address),
        Base::Binary => format!("{:016b}", address),
    }
}

/// Number of characters `format_address` produces in `base`.
pub fn address_width(base: Base) -> usize {
    match base {
        Base::Hex => 4,
        Base::Decimal => 5,
        Base::Octal => 6,
        Base::Binary => 16,
    }
}

/// Render the opcode-bytes column.
///
/// Hexadecimal bytes are run together; other bases are zero padded and comma
/// separated.
pub fn format_opcode_bytes(bytes: &[u8], base: Base) -> String {
    match base {
        Base::Hex => bytes.iter().map(|b| format!("{:02X}", b)).collect(),
        Base::Decimal => join(bytes.iter().map(|b| format!("{:03}", b))),
        Base::Octal => join(bytes.iter().map(|b| format!("{:03o}", b))),
        Base::Binary => join(bytes.iter().map(|b| format!("{:08b}", b))),
    }
}

fn join<I: Iterator<Item = String>>(items: I) -> String {
    items.collect::<Vec<_>>().join(",")
}

/// Parse a run of hexadecimal digits with no prefix.
pub fn parse_hex(s: &str) -> Option<u32> {
    if s.is_empty() || s.len() > 8 || !s.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    u32::from_str_radix(s, 16).ok()
}

/// Parse an integer written as decimal, `#hex`, `$hex` or `0xhex`, with an
/// optional leading minus sign.
pub fn parse_number(s: &str) -> Option<i64> {
    let s = s.trim();
    let (negative, s) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };

    let magnitude = if let Some(hex) = s
        .strip_prefix('#')
        .or_else(|| s.strip_prefix('$'))
        .or_else(|| s.strip_prefix("0x"))
        .or_else(|| s.strip_prefix("0X"))
    {
        parse_hex(hex)? as i64
    } else if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) {
        s.parse::<i64>().ok()?
    } else {
        return None;
    };

    Some(if negative { -magnitude } else { magnitude })
}
