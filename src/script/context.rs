//! Execution context shared by scripts and routines

use crate::annotate::{Directive, FormatScope, Overlay};
use crate::listing::{AddressMarker, Body, LineRecord};
use crate::maths::Base;
use crate::memory::Image;
use crate::script::{CharacterSet, FloatCodec, ScriptErrorKind};
use std::collections::BTreeSet;

pub const SLOT_LINE_START: u8 = 10;
pub const SLOT_LINE_COUNT: u8 = 11;
pub const SLOT_LINE_OFFSET: u8 = 12;
pub const SLOT_BLOCK_START: u8 = 13;
pub const SLOT_BLOCK_END: u8 = 14;
pub const SLOT_CURRENT: u8 = 15;

/// Everything a script can see or change outside its own context.
pub struct Environment<'a> {
    pub image: Image<'a>,
    pub scope: &'a FormatScope,
    pub overlay: &'a mut Overlay,
    pub references: &'a mut BTreeSet<u16>,
    pub charset: &'a dyn CharacterSet,
    pub floats: &'a dyn FloatCodec,
}

/// How `%B`, `%W` and the dump routines render numbers, and how lines are
/// spaced.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct NumberFormat {
    pub base: Base,
    pub signed: bool,
    pub big_endian: bool,

    /// Blank lines after each finished line.
    pub spacing: u8,
}

impl NumberFormat {
    pub fn from_scope(scope: &FormatScope) -> Self {
        NumberFormat {
            base: scope.number_base,
            signed: false,
            big_endian: false,
            spacing: 0,
        }
    }

    /// Decode a `%F` operand: bits 0-1 base, bit 2 signed, bit 3 big-endian,
    /// bits 4-5 line spacing.
    pub fn from_bits(bits: u8) -> Self {
        NumberFormat {
            base: Base::from_bits(bits as u32),
            signed: bits & 4 != 0,
            big_endian: bits & 8 != 0,
            spacing: (bits >> 4) & 3,
        }
    }
}

struct OpenLine {
    marker: AddressMarker,
    text: String,
}

/// The state of one data or pattern block evaluation.
pub struct Context<'a> {
    env: Environment<'a>,
    slots: [u16; 16],
    pub format: NumberFormat,
    line: Option<OpenLine>,
    lines: Vec<LineRecord>,

    /// Set when the block was shrunk before its first byte.
    emptied: bool,
}

impl<'a> Context<'a> {
    pub fn new(env: Environment<'a>, start: u16, end: u16) -> Self {
        let mut slots = [0; 16];
        slots[SLOT_LINE_START as usize] = start;
        slots[SLOT_BLOCK_START as usize] = start;
        slots[SLOT_BLOCK_END as usize] = end;

        Context {
            format: NumberFormat::from_scope(env.scope),
            env,
            slots,
            line: None,
            lines: Vec::new(),
            emptied: false,
        }
    }

    pub fn scope(&self) -> &'a FormatScope {
        self.env.scope
    }

    pub fn charset(&self) -> &'a dyn CharacterSet {
        self.env.charset
    }

    pub fn floats(&self) -> &'a dyn FloatCodec {
        self.env.floats
    }

    pub fn slot(&self, slot: u8) -> u16 {
        match slot {
            SLOT_CURRENT => self.current_address(),
            _ => self.slots[(slot & 0xF) as usize],
        }
    }

    /// Store into a slot. Slot 12 takes an absolute address and keeps its
    /// offset from the line start.
    pub fn set_slot(&mut self, slot: u8, value: u16) -> Result<(), ScriptErrorKind> {
        match slot {
            SLOT_LINE_START | SLOT_LINE_COUNT | SLOT_BLOCK_START | SLOT_CURRENT => {
                Err(ScriptErrorKind::ReadOnlySlot(slot))
            }
            SLOT_LINE_OFFSET => {
                self.slots[slot as usize] = value.wrapping_sub(self.slots[SLOT_LINE_START as usize]);
                Ok(())
            }
            SLOT_BLOCK_END => {
                self.set_block_end(value);
                Ok(())
            }
            _ => {
                self.slots[(slot & 0xF) as usize] = value;
                Ok(())
            }
        }
    }

    pub fn current_address(&self) -> u16 {
        self.slots[SLOT_LINE_START as usize].wrapping_add(self.slots[SLOT_LINE_OFFSET as usize])
    }

    /// The current address without 16-bit wrap, for range checks.
    fn position(&self) -> u32 {
        self.slots[SLOT_LINE_START as usize] as u32 + self.slots[SLOT_LINE_OFFSET as usize] as u32
    }

    pub fn block_start(&self) -> u16 {
        self.slots[SLOT_BLOCK_START as usize]
    }

    pub fn block_end(&self) -> u16 {
        self.slots[SLOT_BLOCK_END as usize]
    }

    pub fn set_block_end(&mut self, end: u16) {
        self.slots[SLOT_BLOCK_END as usize] = end;
        self.emptied = false;
    }

    /// Make the last consumed byte the end of the block. When nothing has
    /// been consumed at address 0 the block becomes empty instead of
    /// wrapping round to `FFFF`.
    pub fn end_block_here(&mut self) {
        let position = self.position();
        self.set_block_end(position.wrapping_sub(1) as u16);
        self.emptied = position == 0;
    }

    /// The first address after the block.
    pub fn resume(&self) -> u32 {
        if self.emptied {
            self.block_start() as u32
        } else {
            self.block_end() as u32 + 1
        }
    }

    /// Bytes left between the current address and the block end, inclusive.
    pub fn remaining(&self) -> u32 {
        self.resume().saturating_sub(self.position())
    }

    pub fn advance(&mut self, bytes: u16) {
        let offset = &mut self.slots[SLOT_LINE_OFFSET as usize];
        *offset = offset.wrapping_add(bytes);
    }

    pub fn read_byte(&self, address: u32) -> Result<u8, ScriptErrorKind> {
        self.env
            .image
            .read_byte(address)
            .ok_or(ScriptErrorKind::OutOfRange(address))
    }

    /// Read a word in the current byte order.
    pub fn read_word(&self, address: u32) -> Result<u16, ScriptErrorKind> {
        self.env
            .image
            .read_word(address, self.format.big_endian)
            .ok_or(ScriptErrorKind::OutOfRange(address))
    }

    /// Read the byte at the current address and step past it.
    pub fn next_byte(&mut self) -> Result<u8, ScriptErrorKind> {
        let byte = self.read_byte(self.position())?;
        self.advance(1);
        Ok(byte)
    }

    /// Read the word at the current address and step past it.
    pub fn next_word(&mut self) -> Result<u16, ScriptErrorKind> {
        let word = self.read_word(self.position())?;
        self.advance(2);
        Ok(word)
    }

    /// Whether the image holds `bytes` (with `None` matching anything) at
    /// the current address. Bytes outside the image never match.
    pub fn matches_here(&self, bytes: &[Option<u8>]) -> bool {
        let here = self.position();

        bytes.iter().enumerate().all(|(i, expected)| {
            match self.env.image.read_byte(here + i as u32) {
                Some(actual) => expected.map(|e| e == actual).unwrap_or(true),
                None => false,
            }
        })
    }

    /// Begin a line at the current line start.
    pub fn start_line(&mut self) {
        let marker = AddressMarker {
            address: self.slots[SLOT_LINE_START as usize],
            base: self.env.scope.address_base,
            labels: self.env.scope.labels,
            period: self.env.scope.label_period,
            data: true,
        };

        match &mut self.line {
            Some(line) => line.marker = marker,
            None => {
                self.line = Some(OpenLine {
                    marker,
                    text: String::new(),
                })
            }
        }
    }

    pub fn push_text(&mut self, text: &str) {
        if self.line.is_none() {
            self.start_line();
        }

        if let Some(line) = &mut self.line {
            line.text.push_str(text);
        }
    }

    pub fn push_char(&mut self, c: char) {
        let mut buf = [0; 4];
        self.push_text(c.encode_utf8(&mut buf));
    }

    pub fn push_separator(&mut self) {
        let separator = self.env.scope.separator.clone();
        self.push_text(&separator);
    }

    /// Take the text of the line under construction, abandoning the line.
    pub fn take_line_text(&mut self) -> String {
        self.line.take().map(|line| line.text).unwrap_or_default()
    }

    /// Finish the line under construction, collect the comments that fall
    /// inside it, and move the line start past the consumed bytes.
    pub fn end_line(&mut self) {
        if let Some(line) = self.line.take() {
            let first = self.slots[SLOT_LINE_START as usize] as u32;
            let consumed = self.slots[SLOT_LINE_OFFSET as usize].max(1) as u32;
            let comments = self.env.overlay.take_comments(first, first + consumed - 1);

            let scope = self.env.scope;
            let mut record = LineRecord::new(Some(line.marker), Body::Data(line.text), &scope.separator);
            record.line_after = scope.line_after_jump;

            if scope.comments {
                for (position, text) in comments {
                    record.attach(position, text);
                }
            }

            self.lines.push(record);
            for _ in 0..self.format.spacing {
                self.lines.push(LineRecord::blank());
            }
        }

        let offset = self.slots[SLOT_LINE_OFFSET as usize];
        let start = &mut self.slots[SLOT_LINE_START as usize];
        *start = start.wrapping_add(offset);
        self.slots[SLOT_LINE_COUNT as usize] = self.slots[SLOT_LINE_COUNT as usize].wrapping_add(1);
        self.slots[SLOT_LINE_OFFSET as usize] = 0;
    }

    /// Make the last consumed byte the end of the block, then end the line.
    pub fn shrink_to_current(&mut self) {
        self.end_block_here();
        self.end_line();
    }

    pub fn insert_directive(&mut self, directive: Directive) {
        self.env.overlay.insert(directive);
    }

    pub fn record_reference(&mut self, address: u16) {
        self.env.references.insert(address);
    }

    /// Reset the line state for one candidate address of a pattern block.
    pub fn begin_candidate(&mut self, address: u16, matches: u16) {
        self.slots[SLOT_LINE_START as usize] = address;
        self.slots[SLOT_LINE_OFFSET as usize] = 0;
        self.slots[SLOT_LINE_COUNT as usize] = matches;
        self.line = None;
    }

    /// Close any open line and hand back the lines and the final block end.
    pub fn finish(mut self) -> (Vec<LineRecord>, u16) {
        if self.line.is_some() {
            self.end_line();
        }

        let end = self.block_end();
        (self.lines, end)
    }
}
