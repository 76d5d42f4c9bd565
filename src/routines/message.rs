//! Text message dumps

use crate::maths::{format_number, Base, Width};
use crate::routines::{Args, RoutineOutput};
use crate::script::{Context, Glyph, ScriptErrorKind};
use std::{result, str};

/// How the end of a message is found.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Terminator {
    /// The message runs to the end of the block.
    Raw,

    /// A zero byte follows the message.
    Zero,

    /// The last character has bit 7 set.
    HighBit,

    /// A length byte precedes the message.
    Len1,

    /// A little-endian length word precedes the message.
    Len2Le,

    /// A big-endian length word precedes the message.
    Len2Be,
}

impl Terminator {
    pub fn default_title(self) -> &'static str {
        match self {
            Terminator::Raw => "DM",
            Terminator::Zero => "DM0",
            Terminator::HighBit => "DMH",
            Terminator::Len1 => "DM1",
            Terminator::Len2Le => "DM2",
            Terminator::Len2Be => "DM2B",
        }
    }
}

impl str::FromStr for Terminator {
    type Err = ();

    fn from_str(s: &str) -> result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_ref() {
            "raw" => Ok(Terminator::Raw),
            "zero" => Ok(Terminator::Zero),
            "highbit" => Ok(Terminator::HighBit),
            "len1" => Ok(Terminator::Len1),
            "len2le" => Ok(Terminator::Len2Le),
            "len2be" => Ok(Terminator::Len2Be),
            _ => Err(()),
        }
    }
}

/// The items of one message line: quoted runs of printable characters and
/// bare numbers, comma separated.
#[derive(Default)]
struct MessageLine {
    text: String,
    quoted: bool,
    items: usize,
    bytes: usize,
}

impl MessageLine {
    fn printable(&mut self, c: char) {
        if !self.quoted {
            if self.items > 0 {
                self.text.push(',');
            }
            self.text.push('"');
            self.quoted = true;
            self.items += 1;
        }

        if c == '"' {
            self.text.push_str("\"\"");
        } else {
            self.text.push(c);
        }
        self.bytes += 1;
    }

    fn number(&mut self, text: &str) {
        self.close_quote();
        if self.items > 0 {
            self.text.push(',');
        }
        self.text.push_str(text);
        self.items += 1;
        self.bytes += 1;
    }

    /// A character with `marker` added to its code, as `"c"+marker`.
    fn marked(&mut self, c: char, marker: &str) {
        self.close_quote();
        if self.items > 0 {
            self.text.push(',');
        }
        self.text.push('"');
        if c == '"' {
            self.text.push_str("\"\"");
        } else {
            self.text.push(c);
        }
        self.text.push_str("\"+");
        self.text.push_str(marker);
        self.items += 1;
        self.bytes += 1;
    }

    fn close_quote(&mut self) {
        if self.quoted {
            self.text.push('"');
            self.quoted = false;
        }
    }
}

struct MessageWriter {
    title: String,
    base: Base,
    per_line: usize,
    line: MessageLine,
}

impl MessageWriter {
    fn flush(&mut self, ctx: &mut Context<'_>) {
        let mut line = std::mem::take(&mut self.line);
        if line.items == 0 {
            return;
        }

        line.close_quote();
        ctx.start_line();
        ctx.push_text(&self.title);
        ctx.push_separator();
        ctx.push_text(&line.text);
        ctx.end_line();
    }

    fn wrap(&mut self, ctx: &mut Context<'_>) {
        if self.per_line > 0 && self.line.bytes >= self.per_line {
            self.flush(ctx);
        }
    }

    fn number(&mut self, value: u32, width: Width) {
        self.line.number(&format_number(value, width, self.base, false));
        if width == Width::Word {
            self.line.bytes += 1;
        }
    }

    fn marked(&mut self, c: char, marker: u32) {
        self.line
            .marked(c, &format_number(marker, Width::Byte, self.base, false));
    }

    /// Read the next message byte, first ending the line if it is full.
    fn next_byte(&mut self, ctx: &mut Context<'_>) -> Result<u8, ScriptErrorKind> {
        self.wrap(ctx);
        ctx.next_byte()
    }
}

/// `MessageDump(terminator="raw", per_line=0, title)`
pub fn message_dump(args: &Args, ctx: &mut Context<'_>) -> Result<RoutineOutput, ScriptErrorKind> {
    let terminator: Terminator = args
        .string("terminator", 0, "raw")?
        .parse()
        .map_err(|_| args.error("unknown terminator"))?;
    let per_line = args.count("per_line", 1, 0, 0xFFFF)?;
    let title = args.string("title", 2, terminator.default_title())?;

    let mut writer = MessageWriter {
        title,
        base: ctx.format.base,
        per_line,
        line: MessageLine::default(),
    };

    let here = ctx.current_address() as u32;
    let remaining = ctx.remaining();
    let charset = ctx.charset();

    // Message length, and whether a final byte ends it.
    let (length, terminated) = match terminator {
        Terminator::Raw => (remaining, false),
        Terminator::Zero | Terminator::HighBit => {
            let mut found = None;
            let mut operand_bytes = 0;
            for i in 0..remaining {
                let byte = ctx.read_byte(here + i)?;

                // Parameters of a control code never end the message.
                if operand_bytes > 0 {
                    operand_bytes -= 1;
                    continue;
                }

                let ends = match terminator {
                    Terminator::Zero => byte == 0,
                    _ => byte & 0x80 != 0,
                };
                if ends {
                    found = Some(i);
                    break;
                }

                if let Glyph::Control { operands } = charset.glyph(byte) {
                    operand_bytes = operands;
                }
            }

            match found {
                Some(i) => (i, true),
                None => (remaining, false),
            }
        }
        Terminator::Len1 => {
            let length = ctx.next_byte()?;
            writer.number(length as u32, Width::Byte);
            (length as u32, true)
        }
        Terminator::Len2Le | Terminator::Len2Be => {
            let first = ctx.next_byte()? as u16;
            let second = ctx.next_byte()? as u16;
            let length = if terminator == Terminator::Len2Be {
                first << 8 | second
            } else {
                second << 8 | first
            };
            writer.number(length as u32, Width::Word);
            (length as u32, true)
        }
    };

    let mut operand_bytes = 0;
    for _ in 0..length {
        let byte = writer.next_byte(ctx)?;

        if operand_bytes > 0 {
            operand_bytes -= 1;
            writer.number(byte as u32, Width::Byte);
            continue;
        }

        match charset.glyph(byte) {
            Glyph::Printable(c) => writer.line.printable(c),
            Glyph::Control { operands } => {
                operand_bytes = operands;
                writer.number(byte as u32, Width::Byte);
            }
            _ => writer.number(byte as u32, Width::Byte),
        }
    }

    if terminated {
        match terminator {
            Terminator::Zero => {
                let byte = writer.next_byte(ctx)?;
                writer.number(byte as u32, Width::Byte);
            }
            Terminator::HighBit => {
                let byte = writer.next_byte(ctx)?;
                match charset.glyph(byte & 0x7F) {
                    Glyph::Printable(c) => writer.marked(c, 0x80),
                    _ => writer.number(byte as u32, Width::Byte),
                }
            }
            _ => {}
        }

        ctx.end_block_here();
    }

    writer.flush(ctx);

    Ok(RoutineOutput::done())
}
