//! Listing trait

use crate::listing::{AddressColumn, LineRecord};
use std::io::{Result, Write};

/// Trait which represents a particular listing syntax.
pub trait Listing {
    /// Emit whatever opens the listing.
    fn begin(&mut self, stream: &mut dyn Write) -> Result<()>;

    /// Emit a comment on its own line.
    fn emit_comment(&mut self, stream: &mut dyn Write, comment: &str) -> Result<()>;

    /// Emit the body of a line, including its end-of-line comment but not
    /// its before/after comment lines.
    fn emit_line(
        &mut self,
        stream: &mut dyn Write,
        address: &AddressColumn,
        line: &LineRecord,
    ) -> Result<()>;

    fn emit_blank(&mut self, stream: &mut dyn Write) -> Result<()>;

    /// Emit whatever closes the listing.
    fn end(&mut self, stream: &mut dyn Write) -> Result<()>;

    /// Emit a whole record: before comments, the line and after comments.
    fn emit_record(
        &mut self,
        stream: &mut dyn Write,
        address: &AddressColumn,
        line: &LineRecord,
    ) -> Result<()> {
        for comment in line.before.iter() {
            self.emit_comment(stream, comment)?;
        }

        self.emit_line(stream, address, line)?;

        for comment in line.after.iter() {
            self.emit_comment(stream, comment)?;
        }

        Ok(())
    }
}
