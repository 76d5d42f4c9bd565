//! The decode pass and the label pass.

use crate::analysis::Progress;
use crate::annotate::{
    Directive, DirectiveKind, FormatScope, LabelPolicy, Overlay, ScopeStack, TimingDisplay,
};
use crate::arch::z80::{decode, Instruction, Operand};
use crate::error::Result;
use crate::listing::{AddressColumn, AddressMarker, Body, CodeColumns, LineRecord, Listing};
use crate::maths::format_opcode_bytes;
use crate::memory::Image;
use crate::script::{self, CharacterSet, Context, Environment, FloatCodec, RAW_BYTES};
use std::collections::BTreeSet;
use std::io::{self, Write};
use tracing::{debug, trace, warn};

/// The state of one disassembly call.
pub struct Walk<'a> {
    image: Image<'a>,
    scopes: ScopeStack,
    overlay: Overlay,
    references: BTreeSet<u16>,
    lines: Vec<LineRecord>,
    charset: &'a dyn CharacterSet,
    floats: &'a dyn FloatCodec,
}

/// Render the optional columns of a decoded instruction.
fn code_columns(instruction: &Instruction, bytes: &[u8], scope: &FormatScope) -> CodeColumns {
    let entry = instruction.entry;

    let text = if scope.mark_undocumented && entry.undocumented {
        format!("{}*", instruction.text)
    } else {
        instruction.text.clone()
    };

    let timing = match scope.timing {
        TimingDisplay::Off => None,
        TimingDisplay::Total => Some(entry.timing.describe_total()),
        TimingDisplay::States => Some(entry.timing.describe_states()),
        TimingDisplay::Both => Some(format!(
            "{} ({})",
            entry.timing.describe_total(),
            entry.timing.describe_states()
        )),
    };

    CodeColumns {
        bytes: scope.opcode_bytes.map(|base| format_opcode_bytes(bytes, base)),
        instruction: text,
        flags: if scope.flags && entry.has_flags() {
            Some(entry.describe_flags())
        } else {
            None
        },
        timing,
    }
}

impl<'a> Walk<'a> {
    pub fn new(
        image: Image<'a>,
        base: FormatScope,
        directives: Vec<Directive>,
        charset: &'a dyn CharacterSet,
        floats: &'a dyn FloatCodec,
    ) -> Self {
        Walk {
            image,
            scopes: ScopeStack::new(base),
            overlay: Overlay::new(directives),
            references: BTreeSet::new(),
            lines: Vec::new(),
            charset,
            floats,
        }
    }

    /// Walk the window once, turning every address into part of a line.
    pub fn decode_pass(&mut self, progress: &mut Progress<'_>) -> Result<()> {
        let origin = self.image.origin() as u32;
        let end = self.image.end();
        let mut cursor = origin;

        while cursor < end {
            progress.report((cursor - origin) as usize);

            self.scopes.expire(cursor);
            self.overlay.expire(cursor);

            cursor = match self.activate(cursor)? {
                Some(resume) => resume,
                None => self.decode_line(cursor)?,
            };
        }

        Ok(())
    }

    /// Activate every directive that has started by `cursor`. Returns where
    /// to resume when a data block consumed the cursor.
    fn activate(&mut self, cursor: u32) -> Result<Option<u32>> {
        while let Some(directive) = self.overlay.take_active(cursor) {
            if (directive.end as u32) < cursor {
                debug!(
                    "skipping directive {:04X}-{:04X} that ended before {:04X}",
                    directive.start, directive.end, cursor
                );
                continue;
            }

            debug!(
                "activating {:04X} directive {:04X}-{:04X} at {:04X}",
                directive.code(),
                directive.start,
                directive.end,
                cursor
            );

            match directive.kind {
                DirectiveKind::Format(change) => self.scopes.push(directive.end, &change),
                DirectiveKind::CommentReference { .. } | DirectiveKind::CommentDisplacement { .. } => {
                    self.overlay.activate(directive)
                }
                DirectiveKind::DataBlock(program) => {
                    return self.data_block(cursor, directive.end, &program).map(Some)
                }
                DirectiveKind::PatternBlock(program) => {
                    self.pattern_block(cursor, directive.end, &program)?
                }
                DirectiveKind::Comment { .. } => {}
            }
        }

        Ok(None)
    }

    /// Last address of the window.
    fn last(&self) -> u16 {
        (self.image.end() - 1) as u16
    }

    /// Evaluate a data block from `cursor`, returning the address after it.
    fn data_block(&mut self, cursor: u32, end: u16, program: &str) -> Result<u32> {
        let start = cursor as u16;
        let end = end.min(self.last());

        let env = Environment {
            image: self.image,
            scope: self.scopes.current(),
            overlay: &mut self.overlay,
            references: &mut self.references,
            charset: self.charset,
            floats: self.floats,
        };

        let mut ctx = Context::new(env, start, end);
        script::run(program, &mut ctx)?;
        let resume = ctx.resume();
        let (lines, end) = ctx.finish();

        debug!(
            "data block at {:04X} rendered {} lines, ending at {:04X}",
            start,
            lines.len(),
            end
        );
        self.lines.extend(lines);

        Ok(resume.max(cursor + 1))
    }

    /// Evaluate a pattern block over `cursor..=end`. It consumes nothing.
    fn pattern_block(&mut self, cursor: u32, end: u16, program: &str) -> Result<()> {
        let start = cursor as u16;
        let end = end.min(self.last());

        let env = Environment {
            image: self.image,
            scope: self.scopes.current(),
            overlay: &mut self.overlay,
            references: &mut self.references,
            charset: self.charset,
            floats: self.floats,
        };

        let mut ctx = Context::new(env, start, end);
        let matches = script::run_pattern(program, &mut ctx)?;
        debug!("pattern block at {:04X}-{:04X} matched {} times", start, end, matches);

        Ok(())
    }

    /// Decode one instruction at `cursor`, returning the address after it.
    fn decode_line(&mut self, cursor: u32) -> Result<u32> {
        let window = self.image.window_from(cursor);
        let address = cursor as u16;

        let instruction = match decode(window, address, self.scopes.current().number_base) {
            Ok(instruction) => instruction,
            Err(truncated) => {
                warn!("{}, dumping the rest as bytes", truncated);
                let last = self.last();
                return self.data_block(cursor, last, RAW_BYTES);
            }
        };

        let length = instruction.len();
        let scope = self.scopes.current();
        let columns = code_columns(&instruction, &window[..length], scope);

        for operand in instruction.operands.iter() {
            match *operand {
                Operand::Relative(target) | Operand::Address(target) => {
                    self.references.insert(target);
                }
                Operand::Number(value) if scope.data_references => {
                    self.references.insert(value);
                }
                _ => {}
            }
        }

        let marker = AddressMarker {
            address,
            base: scope.address_base,
            labels: scope.labels,
            period: scope.label_period,
            data: false,
        };

        let mut line = LineRecord::new(Some(marker), Body::Code(columns), &scope.separator);
        line.jump = instruction.entry.jump;
        line.line_after = scope.line_after_jump;

        let last = cursor + length as u32 - 1;
        let comments = self.overlay.take_comments(cursor, last);
        if scope.comments {
            for (position, text) in comments {
                line.attach(position, text);
            }

            for operand in instruction.operands.iter() {
                for (position, text) in self.overlay.match_operand(cursor, operand) {
                    line.attach(position, text);
                }
            }
        }

        trace!("{:04X}  {}", address, instruction.text);
        self.lines.push(line);

        Ok(cursor + length as u32)
    }

    /// Decide every address column, then write the listing.
    pub fn label_pass(
        &self,
        listing: &mut dyn Listing,
        stream: &mut dyn Write,
        progress: &mut Progress<'_>,
    ) -> io::Result<()> {
        let first_half = progress.total() / 2;
        let mut since_label: usize = 0;
        let mut last_data = None;

        listing.begin(stream)?;

        for (i, line) in self.lines.iter().enumerate() {
            progress.report(first_half + i.min(first_half));

            let column = match &line.marker {
                None => AddressColumn::None,
                Some(marker) => {
                    if last_data != Some(marker.data) {
                        since_label = 0;
                        last_data = Some(marker.data);
                    }

                    let show = match marker.labels {
                        LabelPolicy::All => true,
                        LabelPolicy::Never => false,
                        LabelPolicy::Referenced => {
                            self.references.contains(&marker.address)
                                || (marker.period > 0 && since_label >= marker.period as usize)
                        }
                    };

                    if show {
                        since_label = 0;
                        AddressColumn::shown(marker)
                    } else {
                        since_label += 1;
                        AddressColumn::hidden(marker)
                    }
                }
            };

            listing.emit_record(stream, &column, line)?;
            if line.wants_gap() {
                listing.emit_blank(stream)?;
            }
        }

        listing.end(stream)
    }
}
