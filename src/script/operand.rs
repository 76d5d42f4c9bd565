//! Construct operands

use crate::maths::Width;
use crate::script::{Context, ScriptErrorKind};

/// A parsed operand: a selector byte, optionally followed by a literal.
///
/// Selector bits: 7 set for the value itself rather than the buffer content
/// at that address; 6 set when a literal follows, otherwise bits 0-3 name a
/// slot; 5 set to advance slot 12 past a buffer read; 4 set to read a word
/// where a construct would otherwise read a byte.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct OperandSpec {
    pub selector: u8,
    pub literal: Option<u16>,
}

impl OperandSpec {
    pub fn has_literal(selector: u8) -> bool {
        selector & 0x40 != 0
    }

    pub fn is_direct(&self) -> bool {
        self.selector & 0x80 != 0
    }

    pub fn advances(&self) -> bool {
        self.selector & 0x20 != 0
    }

    pub fn is_word(&self) -> bool {
        self.selector & 0x10 != 0
    }

    pub fn slot(&self) -> u8 {
        self.selector & 0x0F
    }

    fn base_value(&self, ctx: &Context<'_>) -> u16 {
        self.literal.unwrap_or_else(|| ctx.slot(self.slot()))
    }

    /// Width used by `%X`, `%?` and friends: a byte unless bit 4 is set.
    pub fn natural_width(&self) -> Width {
        if self.is_word() {
            Width::Word
        } else {
            Width::Byte
        }
    }

    pub fn evaluate(&self, ctx: &mut Context<'_>, width: Width) -> Result<u16, ScriptErrorKind> {
        let value = self.base_value(ctx);
        if self.is_direct() {
            return Ok(value);
        }

        let read = match width {
            Width::Byte => ctx.read_byte(value as u32)? as u16,
            Width::Word => ctx.read_word(value as u32)?,
        };

        if self.advances() {
            ctx.advance(width.bytes());
        }

        Ok(read)
    }

    /// Read the five bytes of a floating point number at the operand's
    /// address.
    pub fn read_float(&self, ctx: &mut Context<'_>) -> Result<[u8; 5], ScriptErrorKind> {
        if self.is_direct() {
            return Err(ScriptErrorKind::BadOperand(self.selector));
        }

        let address = self.base_value(ctx) as u32;
        let mut bytes = [0u8; 5];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = ctx.read_byte(address + i as u32)?;
        }

        if self.advances() {
            ctx.advance(5);
        }

        Ok(bytes)
    }
}
