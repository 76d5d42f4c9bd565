//! The disassembly driver.
//!
//! A call walks the window once, activating directives as the cursor reaches
//! them and decoding everything they do not claim, then makes a second pass
//! over the finished lines to decide which addresses to print.

mod passes;
mod progress;

pub use passes::Walk;
pub use progress::Progress;

use crate::annotate::{Directive, DirectiveKind, FormatScope};
use crate::error::Result;
use crate::listing::{Listing, Markup, PlainText};
use crate::memory::Image;
use crate::script::{CharacterSet, FloatCodec, SpectrumCharset, SpectrumFloat};
use tracing::debug;

/// Disassemble `length` bytes of `buffer` starting at `offset`, with the
/// first byte at address `origin`, using the Spectrum character set and
/// number format.
pub fn disassemble(
    buffer: &[u8],
    offset: usize,
    origin: u16,
    length: usize,
    directives: &[Directive],
    progress: Option<&mut dyn FnMut(usize, usize)>,
) -> Result<String> {
    let image = Image::new(buffer, offset, origin, length)?;

    disassemble_with(
        image,
        directives,
        FormatScope::default(),
        &SpectrumCharset,
        &SpectrumFloat,
        progress,
    )
}

/// Disassemble `image` starting from the `defaults` format.
pub fn disassemble_with(
    image: Image<'_>,
    directives: &[Directive],
    defaults: FormatScope,
    charset: &dyn CharacterSet,
    floats: &dyn FloatCodec,
    progress: Option<&mut dyn FnMut(usize, usize)>,
) -> Result<String> {
    let mut base = defaults;
    let mut scoped = Vec::with_capacity(directives.len());

    for directive in directives {
        match &directive.kind {
            DirectiveKind::Format(change) if directive.is_global_format() => change.apply(&mut base),
            _ => scoped.push(directive.clone()),
        }
    }

    debug!(
        "disassembling {} bytes at {:04X} with {} directives",
        image.len(),
        image.origin(),
        scoped.len()
    );

    let mut listing: Box<dyn Listing> = if base.markup {
        Box::new(Markup)
    } else {
        Box::new(PlainText)
    };

    let mut progress = Progress::new(progress, image.len() * 2);
    let mut walk = Walk::new(image, base, scoped, charset, floats);
    walk.decode_pass(&mut progress)?;

    let mut out = Vec::new();
    walk.label_pass(listing.as_mut(), &mut out, &mut progress)?;
    progress.finish();

    Ok(String::from_utf8_lossy(&out).into_owned())
}
