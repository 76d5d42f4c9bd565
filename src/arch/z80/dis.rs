//! Instruction decoding

use crate::arch::z80::{lookup, IndexRegister, OpcodeEntry, PASSTHROUGH};
use crate::maths::{format_displacement, format_number, Base, Width};
use thiserror::Error;

/// A value found in an instruction's operand bytes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Operand {
    /// Target of a relative jump, already resolved to an address.
    Relative(u16),

    /// Absolute address (`aa`).
    Address(u16),

    /// 16-bit immediate (`nn`).
    Number(u16),

    /// 8-bit immediate (`n`).
    Immediate(u8),

    /// Index register displacement (`d`).
    Displacement(IndexRegister, i8),
}

/// A decoded instruction.
#[derive(Clone, Debug)]
pub struct Instruction {
    pub text: String,
    pub entry: &'static OpcodeEntry,
    pub operands: Vec<Operand>,
}

impl Instruction {
    pub fn len(&self) -> usize {
        self.entry.length as usize
    }

    pub fn is_empty(&self) -> bool {
        self.entry.length == 0
    }
}

/// The window ended partway through an instruction.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("instruction at {address:04X} needs {needed} bytes but only {available} remain")]
pub struct Truncated {
    pub address: u16,
    pub needed: usize,
    pub available: usize,
}

/// Decode the instruction at the start of `bytes`, which is located at
/// `address`. Operands are rendered in `base`.
pub fn decode(bytes: &[u8], address: u16, base: Base) -> Result<Instruction, Truncated> {
    let byte = |i: usize| {
        bytes.get(i).copied().ok_or(Truncated {
            address,
            needed: i + 1,
            available: bytes.len(),
        })
    };

    let first = byte(0)?;
    let (entry, index, mut position) = match first {
        0xCB | 0xED => (lookup((first as u32) << 8 | byte(1)? as u32), None, 2),
        0xDD | 0xFD => {
            let index = IndexRegister::from_prefix(first);
            let second = byte(1)?;

            if second == 0xCB {
                let op = byte(3)?;
                (lookup((first as u32) << 16 | 0xCB00 | op as u32), index, 2)
            } else {
                match lookup((first as u32) << 8 | second as u32) {
                    Some(entry) => (Some(entry), index, 2),
                    None => (Some(&*PASSTHROUGH), None, 1),
                }
            }
        }
        _ => (lookup(first as u32), None, 1),
    };
    let entry = entry.unwrap_or(&*PASSTHROUGH);

    if entry.length as usize > bytes.len() {
        return Err(Truncated {
            address,
            needed: entry.length as usize,
            available: bytes.len(),
        });
    }

    let mut operands = Vec::new();
    let mut displacement = None;
    let mut relative = None;
    let mut absolute = None;
    let mut word = None;
    let mut immediate = None;

    let template = entry.template.as_bytes();
    let mut i = 0;
    while i < template.len() {
        if !template[i].is_ascii_lowercase() {
            i += 1;
            continue;
        }

        let run = template[i..]
            .iter()
            .take_while(|c| c.is_ascii_lowercase())
            .count();

        match &entry.template[i..i + run] {
            "d" => {
                let d = bytes[position] as i8;
                if let Some(ix) = index {
                    operands.push(Operand::Displacement(ix, d));
                }
                displacement = Some(format_displacement(d, base));
            }
            "j" => {
                let e = bytes[position] as i8;
                let target = address
                    .wrapping_add(entry.length as u16)
                    .wrapping_add(e as i16 as u16);
                operands.push(Operand::Relative(target));
                relative = Some(format_number(target as u32, Width::Word, base, false));
            }
            "aa" => {
                let value = bytes[position] as u16 | (bytes[position + 1] as u16) << 8;
                operands.push(Operand::Address(value));
                absolute = Some(format_number(value as u32, Width::Word, base, false));
            }
            "nn" => {
                let value = bytes[position] as u16 | (bytes[position + 1] as u16) << 8;
                operands.push(Operand::Number(value));
                word = Some(format_number(value as u32, Width::Word, base, false));
            }
            _ => {
                let value = bytes[position];
                operands.push(Operand::Immediate(value));
                immediate = Some(format_number(value as u32, Width::Byte, base, false));
            }
        }

        position += run;
        i += run;
    }

    let mut text = entry.template.clone();
    for (placeholder, value) in [
        ("+d", displacement),
        ("j", relative),
        ("aa", absolute),
        ("nn", word),
        ("n", immediate),
    ]
    .iter()
    {
        if let Some(value) = value {
            text = text.replacen(*placeholder, value, 1);
        }
    }

    Ok(Instruction {
        text,
        entry,
        operands,
    })
}
