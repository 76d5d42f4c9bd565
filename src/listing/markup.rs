//! XML listings

use crate::listing::{AddressColumn, Body, LineRecord, Listing};
use std::io::{Result, Write};

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }

    escaped
}

fn element(stream: &mut dyn Write, name: &str, text: &str) -> Result<()> {
    write!(stream, "<{}>{}</{}>", name, escape(text), name)
}

/// A `<disassembly>` document with one `<line>` element per output line.
#[derive(Clone, Debug, Default)]
pub struct Markup;

impl Listing for Markup {
    fn begin(&mut self, stream: &mut dyn Write) -> Result<()> {
        writeln!(stream, "<disassembly>")
    }

    fn emit_comment(&mut self, stream: &mut dyn Write, comment: &str) -> Result<()> {
        write!(stream, "<line>")?;
        element(stream, "comment", comment)?;
        writeln!(stream, "</line>")
    }

    fn emit_line(
        &mut self,
        stream: &mut dyn Write,
        address: &AddressColumn,
        line: &LineRecord,
    ) -> Result<()> {
        if let Body::Blank = line.body {
            return self.emit_blank(stream);
        }

        write!(stream, "<line>")?;

        if let AddressColumn::Shown(text) = address {
            element(stream, "address", text)?;
        }

        match &line.body {
            Body::Code(columns) => {
                if let Some(bytes) = &columns.bytes {
                    element(stream, "bytes", bytes)?;
                }
                element(stream, "instruction", &columns.instruction)?;
                if let Some(flags) = &columns.flags {
                    element(stream, "flags", flags)?;
                }
                if let Some(timing) = &columns.timing {
                    element(stream, "timing", timing)?;
                }
            }
            Body::Data(text) => element(stream, "data", text)?,
            Body::Blank => {}
        }

        if let Some(comment) = line.comment() {
            element(stream, "comment", &comment)?;
        }

        writeln!(stream, "</line>")
    }

    fn emit_blank(&mut self, stream: &mut dyn Write) -> Result<()> {
        writeln!(stream, "<line/>")
    }

    fn end(&mut self, stream: &mut dyn Write) -> Result<()> {
        writeln!(stream, "</disassembly>")
    }
}
