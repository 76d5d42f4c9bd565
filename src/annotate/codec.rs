//! Textual form of directives.
//!
//! A directive is one line: `<code>#<start>#<end>#<newlines>#<payload>`.
//! Code, start and end are four hex digits. Newlines are stripped from the
//! payload and their byte offsets into the stripped payload are listed,
//! comma separated, in the fourth field.

use crate::annotate::{
    CommentPosition, Directive, DirectiveKind, DisplacementMatch, FormatChange, FormatScope,
    ReferenceMatch,
};
use crate::error::{Error, Result};
use crate::maths::parse_hex;
use std::{fmt, str};

impl Directive {
    /// The four digit directive code.
    pub fn code(&self) -> u16 {
        match &self.kind {
            DirectiveKind::Format(change) => 0x0100 | change.option() as u16,
            DirectiveKind::DataBlock(_) => 0x0200,
            DirectiveKind::PatternBlock(_) => 0x0300,
            DirectiveKind::Comment { position, .. } => 0x0400 | position.code() as u16,
            DirectiveKind::CommentReference {
                position, matching, ..
            } => {
                let mode = match matching {
                    ReferenceMatch::Address => 1,
                    ReferenceMatch::Number => 2,
                    ReferenceMatch::Both => 3,
                };
                0x0400 | mode << 4 | position.code() as u16
            }
            DirectiveKind::CommentDisplacement {
                position, matching, ..
            } => {
                let mode = match matching {
                    DisplacementMatch::IX => 4,
                    DisplacementMatch::IY => 5,
                    DisplacementMatch::Both => 6,
                };
                0x0400 | mode << 4 | position.code() as u16
            }
        }
    }

    /// The payload with its newlines intact.
    pub fn payload(&self) -> String {
        match &self.kind {
            DirectiveKind::Format(FormatChange::Separator(s)) => s.clone(),
            DirectiveKind::Format(FormatChange::Custom(scope)) => {
                format!("{:08X}{}", scope.pack(), scope.separator)
            }
            DirectiveKind::Format(change) => format!("{:02X}", change.value().unwrap_or(0)),
            DirectiveKind::DataBlock(program) | DirectiveKind::PatternBlock(program) => {
                program.clone()
            }
            DirectiveKind::Comment { text, .. } => text.clone(),
            DirectiveKind::CommentReference { value, text, .. } => {
                format!("{:04X}{}", value, text)
            }
            DirectiveKind::CommentDisplacement {
                displacement, text, ..
            } => format!("{:02X}{}", *displacement as u8, text),
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let payload = self.payload();
        let mut stripped = String::with_capacity(payload.len());
        let mut offsets = Vec::new();

        for c in payload.chars() {
            if c == '\n' {
                offsets.push(stripped.len().to_string());
            } else {
                stripped.push(c);
            }
        }

        write!(
            f,
            "{:04X}#{:04X}#{:04X}#{}#{}",
            self.code(),
            self.start,
            self.end,
            offsets.join(","),
            stripped
        )
    }
}

fn hex_field(text: &str, field: &str, name: &str) -> Result<u32> {
    if field.len() != 4 {
        return Err(Error::malformed(
            text,
            &format!("{} must be four hex digits", name),
        ));
    }

    parse_hex(field).ok_or_else(|| Error::malformed(text, &format!("bad hex digit in {}", name)))
}

/// Put the stripped newlines back into a payload.
fn restore_newlines(text: &str, offsets: &str, stripped: &str) -> Result<String> {
    if offsets.is_empty() {
        return Ok(stripped.to_string());
    }

    let mut positions = Vec::new();
    for offset in offsets.split(',') {
        let position: usize = offset
            .trim()
            .parse()
            .map_err(|_| Error::malformed(text, "bad newline offset"))?;

        if position > stripped.len() || !stripped.is_char_boundary(position) {
            return Err(Error::malformed(text, "newline offset outside payload"));
        }
        if positions.last().map(|last| *last > position).unwrap_or(false) {
            return Err(Error::malformed(text, "newline offsets out of order"));
        }

        positions.push(position);
    }

    let mut restored = String::with_capacity(stripped.len() + positions.len());
    let mut last = 0;
    for position in positions {
        restored.push_str(&stripped[last..position]);
        restored.push('\n');
        last = position;
    }
    restored.push_str(&stripped[last..]);

    Ok(restored)
}

fn split_hex_prefix<'a>(text: &str, payload: &'a str, digits: usize) -> Result<(u32, &'a str)> {
    let prefix = payload
        .get(..digits)
        .ok_or_else(|| Error::malformed(text, "payload too short"))?;
    let value = parse_hex(prefix)
        .filter(|_| prefix.len() == digits)
        .ok_or_else(|| Error::malformed(text, "bad hex digit in payload"))?;

    Ok((value, &payload[digits..]))
}

impl str::FromStr for Directive {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self> {
        let fields: Vec<&str> = text.splitn(5, '#').collect();
        if fields.len() != 5 {
            return Err(Error::malformed(text, "expected five '#' separated fields"));
        }

        let code = hex_field(text, fields[0], "code")?;
        let start = hex_field(text, fields[1], "start")? as u16;
        let end = hex_field(text, fields[2], "end")? as u16;
        let payload = restore_newlines(text, fields[3], fields[4])?;

        if end < start {
            return Err(Error::malformed(text, "range ends before it starts"));
        }

        let group = code >> 8;
        let low = (code & 0xFF) as u8;

        let kind = match group {
            0x01 if low == 0x09 => DirectiveKind::Format(FormatChange::Separator(payload)),
            0x01 if low == 0xFF => {
                let (packed, separator) = split_hex_prefix(text, &payload, 8)?;
                DirectiveKind::Format(FormatChange::Custom(FormatScope::unpack(
                    packed, separator,
                )))
            }
            0x01 => {
                let (value, rest) = split_hex_prefix(text, &payload, 2)?;
                if !rest.is_empty() {
                    return Err(Error::malformed(text, "trailing text after option value"));
                }

                DirectiveKind::Format(
                    FormatChange::from_option(low, value as u8)
                        .ok_or_else(|| Error::malformed(text, "unknown format option"))?,
                )
            }
            0x02 if low == 0 => DirectiveKind::DataBlock(payload),
            0x03 if low == 0 => DirectiveKind::PatternBlock(payload),
            0x04 => {
                let position = CommentPosition::from_code(low & 0xF)
                    .ok_or_else(|| Error::malformed(text, "unknown comment position"))?;

                match low >> 4 {
                    0 => DirectiveKind::Comment {
                        position,
                        text: payload,
                    },
                    mode @ 1..=3 => {
                        let (value, rest) = split_hex_prefix(text, &payload, 4)?;
                        let matching = match mode {
                            1 => ReferenceMatch::Address,
                            2 => ReferenceMatch::Number,
                            _ => ReferenceMatch::Both,
                        };

                        DirectiveKind::CommentReference {
                            position,
                            matching,
                            value: value as u16,
                            text: rest.to_string(),
                        }
                    }
                    mode @ 4..=6 => {
                        let (value, rest) = split_hex_prefix(text, &payload, 2)?;
                        let matching = match mode {
                            4 => DisplacementMatch::IX,
                            5 => DisplacementMatch::IY,
                            _ => DisplacementMatch::Both,
                        };

                        DirectiveKind::CommentDisplacement {
                            position,
                            matching,
                            displacement: value as u8 as i8,
                            text: rest.to_string(),
                        }
                    }
                    _ => return Err(Error::malformed(text, "unknown comment kind")),
                }
            }
            _ => return Err(Error::malformed(text, "unknown directive code")),
        };

        Ok(Directive { start, end, kind })
    }
}

/// Parse a directive file: one directive per line. Blank lines and lines
/// starting with `;` are skipped.
pub fn parse_directives(text: &str) -> Result<Vec<Directive>> {
    text.lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty() && !line.starts_with(';'))
        .map(|line| line.parse())
        .collect()
}
