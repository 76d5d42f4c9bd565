//! The Spectrum character set

/// How a character code renders.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Glyph {
    Printable(char),

    /// A control code followed by `operands` parameter bytes.
    Control { operands: u8 },

    /// A 2x2 block graphic.
    Graphic(char),

    /// A user-defined graphic, named by its letter.
    Udg(char),

    /// A BASIC keyword token.
    Command(&'static str),
}

/// A mapping from character codes to glyphs.
pub trait CharacterSet {
    fn glyph(&self, code: u8) -> Glyph;

    /// Translate a literal character of script text into the character it
    /// stands for in listings.
    fn translate(&self, c: char) -> char;
}

static KEYWORDS: [&str; 91] = [
    "RND", "INKEY$", "PI", "FN", "POINT", "SCREEN$", "ATTR", "AT", "TAB", "VAL$", "CODE", "VAL",
    "LEN", "SIN", "COS", "TAN", "ASN", "ACS", "ATN", "LN", "EXP", "INT", "SQR", "SGN", "ABS",
    "PEEK", "IN", "USR", "STR$", "CHR$", "NOT", "BIN", "OR", "AND", "<=", ">=", "<>", "LINE",
    "THEN", "TO", "STEP", "DEF FN", "CAT", "FORMAT", "MOVE", "ERASE", "OPEN #", "CLOSE #",
    "MERGE", "VERIFY", "BEEP", "CIRCLE", "INK", "PAPER", "FLASH", "BRIGHT", "INVERSE", "OVER",
    "OUT", "LPRINT", "LLIST", "STOP", "READ", "DATA", "RESTORE", "NEW", "BORDER", "CONTINUE",
    "DIM", "REM", "FOR", "GO TO", "GO SUB", "INPUT", "LOAD", "LIST", "LET", "PAUSE", "NEXT",
    "POKE", "PRINT", "PLOT", "RUN", "SAVE", "RANDOMIZE", "IF", "CLS", "DRAW", "CLEAR", "RETURN",
    "COPY",
];

static BLOCK_GRAPHICS: [char; 16] = [
    ' ', '▝', '▘', '▀', '▗', '▐', '▚', '▜', '▖', '▞', '▌', '▛', '▄', '▟', '▙', '█',
];

/// The 48K ROM character set.
#[derive(Clone, Copy, Debug, Default)]
pub struct SpectrumCharset;

impl CharacterSet for SpectrumCharset {
    fn glyph(&self, code: u8) -> Glyph {
        match code {
            0x10..=0x15 => Glyph::Control { operands: 1 },
            0x16..=0x17 => Glyph::Control { operands: 2 },
            0x00..=0x1F => Glyph::Control { operands: 0 },
            0x20..=0x7F => Glyph::Printable(self.translate(code as char)),
            0x80..=0x8F => Glyph::Graphic(BLOCK_GRAPHICS[(code - 0x80) as usize]),
            0x90..=0xA4 => Glyph::Udg((b'A' + (code - 0x90)) as char),
            _ => Glyph::Command(KEYWORDS[(code - 0xA5) as usize]),
        }
    }

    fn translate(&self, c: char) -> char {
        match c {
            '^' => '↑',
            '`' => '£',
            '\x7F' => '©',
            _ => c,
        }
    }
}
