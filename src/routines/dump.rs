//! Byte and word dumps

use crate::maths::{format_number, Width};
use crate::routines::{Args, RoutineOutput};
use crate::script::{Context, ScriptErrorKind};

/// Separator before the item at `index` of a line.
fn item_separator(index: usize, gap: usize) -> &'static str {
    match index {
        0 => "",
        _ if gap > 0 && index % gap == 0 => ", ",
        _ => ",",
    }
}

/// `ByteDump(format, signed=false, per_line=8, gap=0, title="DEFB")`
pub fn byte_dump(args: &Args, ctx: &mut Context<'_>) -> Result<RoutineOutput, ScriptErrorKind> {
    let base = args.base("format", 0, ctx.format.base)?;
    let signed = args.boolean("signed", 1, false)?;
    let per_line = args.count("per_line", 2, 8, 0xFFFF)?;
    let gap = args.count("gap", 3, 0, 0xFFFF)?;
    let title = args.string("title", 4, "DEFB")?;

    while ctx.remaining() > 0 {
        ctx.start_line();
        ctx.push_text(&title);
        ctx.push_separator();

        let mut items = 0;
        while ctx.remaining() > 0 && (per_line == 0 || items < per_line) {
            let byte = ctx.next_byte()?;
            ctx.push_text(item_separator(items, gap));
            ctx.push_text(&format_number(byte as u32, Width::Byte, base, signed));
            items += 1;
        }

        ctx.end_line();
    }

    Ok(RoutineOutput::done())
}

/// `WordDump(format, signed=false, big_endian=false, per_line=4, gap=0,
/// title="DEFW")`. A final odd byte is dumped on a `DEFB` line of its own.
pub fn word_dump(args: &Args, ctx: &mut Context<'_>) -> Result<RoutineOutput, ScriptErrorKind> {
    let base = args.base("format", 0, ctx.format.base)?;
    let signed = args.boolean("signed", 1, false)?;
    let big_endian = args.boolean("big_endian", 2, false)?;
    let per_line = args.count("per_line", 3, 4, 0xFFFF)?;
    let gap = args.count("gap", 4, 0, 0xFFFF)?;
    let title = args.string("title", 5, "DEFW")?;

    while ctx.remaining() >= 2 {
        ctx.start_line();
        ctx.push_text(&title);
        ctx.push_separator();

        let mut items = 0;
        while ctx.remaining() >= 2 && (per_line == 0 || items < per_line) {
            let first = ctx.next_byte()? as u16;
            let second = ctx.next_byte()? as u16;
            let word = if big_endian {
                first << 8 | second
            } else {
                second << 8 | first
            };

            ctx.push_text(item_separator(items, gap));
            ctx.push_text(&format_number(word as u32, Width::Word, base, signed));
            items += 1;
        }

        ctx.end_line();
    }

    if ctx.remaining() == 1 {
        let byte = ctx.next_byte()?;
        ctx.start_line();
        ctx.push_text("DEFB");
        ctx.push_separator();
        ctx.push_text(&format_number(byte as u32, Width::Byte, base, signed));
        ctx.end_line();
    }

    Ok(RoutineOutput::done())
}
