//! Byte pattern search and range helpers

use crate::annotate::{CommentPosition, Directive};
use crate::routines::{Args, RoutineOutput};
use crate::script::{Context, ScriptErrorKind};

/// Parse hex byte pairs, with `??` matching any byte. Spaces are ignored.
fn parse_pattern(args: &Args, text: &str) -> Result<Vec<Option<u8>>, ScriptErrorKind> {
    let digits: Vec<char> = text.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.is_empty() || digits.len() % 2 != 0 {
        return Err(args.error("bytes must be whole hex pairs"));
    }

    digits
        .chunks(2)
        .map(|pair| match pair {
            ['?', '?'] => Ok(None),
            [hi, lo] => match (hi.to_digit(16), lo.to_digit(16)) {
                (Some(hi), Some(lo)) => Ok(Some((hi << 4 | lo) as u8)),
                _ => Err(args.error("bad hex digit in bytes")),
            },
            _ => Err(args.error("bytes must be whole hex pairs")),
        })
        .collect()
}

/// `FindBytes(bytes, comment, position="E")`
pub fn find_bytes(args: &Args, ctx: &mut Context<'_>) -> Result<RoutineOutput, ScriptErrorKind> {
    let pattern = parse_pattern(args, &args.string("bytes", 0, "")?)?;
    let comment = args.optional_string("comment", 1)?;
    let position = args
        .string("position", 2, "E")?
        .chars()
        .next()
        .and_then(CommentPosition::from_letter)
        .ok_or_else(|| args.error("position must be B, E or A"))?;

    let found = ctx.matches_here(&pattern);

    if let (true, Some(text)) = (found, comment) {
        let start = ctx.current_address();
        let end = start.wrapping_add(pattern.len() as u16 - 1);
        ctx.insert_directive(Directive::comment(start, end, position, &text));
    }

    Ok(RoutineOutput::truth(found))
}

/// `OffsetRange(start=0, end=0, into_start=0, into_end=1)`
pub fn offset_range(args: &Args, ctx: &mut Context<'_>) -> Result<RoutineOutput, ScriptErrorKind> {
    let start = args.int("start", 0, 0)?;
    let end = args.int("end", 1, 0)?;
    let into_start = args.count("into_start", 2, 0, 9)?;
    let into_end = args.count("into_end", 3, 1, 9)?;

    let here = ctx.current_address() as i64;
    ctx.set_slot(into_start as u8, ((here + start) & 0xFFFF) as u16)?;
    ctx.set_slot(into_end as u8, ((here + end) & 0xFFFF) as u16)?;

    Ok(RoutineOutput::truth(true))
}
