//! Plain text listings

use crate::listing::{AddressColumn, Body, LineRecord, Listing};
use std::io::{Result, Write};

/// Columns joined by the scope's separator, comments introduced by `;`.
#[derive(Clone, Debug, Default)]
pub struct PlainText;

impl Listing for PlainText {
    fn begin(&mut self, _stream: &mut dyn Write) -> Result<()> {
        Ok(())
    }

    fn emit_comment(&mut self, stream: &mut dyn Write, comment: &str) -> Result<()> {
        writeln!(stream, ";{}", comment)
    }

    fn emit_line(
        &mut self,
        stream: &mut dyn Write,
        address: &AddressColumn,
        line: &LineRecord,
    ) -> Result<()> {
        let mut fields = Vec::new();

        match address {
            AddressColumn::None => {}
            AddressColumn::Hidden(width) => fields.push(" ".repeat(*width)),
            AddressColumn::Shown(text) => fields.push(text.clone()),
        }

        match &line.body {
            Body::Blank => return self.emit_blank(stream),
            Body::Data(text) => fields.push(text.clone()),
            Body::Code(columns) => {
                if let Some(bytes) = &columns.bytes {
                    fields.push(bytes.clone());
                }
                fields.push(columns.instruction.clone());
                if let Some(flags) = &columns.flags {
                    fields.push(flags.clone());
                }
                if let Some(timing) = &columns.timing {
                    fields.push(timing.clone());
                }
            }
        }

        if let Some(comment) = line.comment() {
            fields.push(format!(";{}", comment));
        }

        writeln!(stream, "{}", fields.join(&line.separator))
    }

    fn emit_blank(&mut self, stream: &mut dyn Write) -> Result<()> {
        writeln!(stream)
    }

    fn end(&mut self, _stream: &mut dyn Write) -> Result<()> {
        Ok(())
    }
}
