//! Recursive evaluator for block programs.
//!
//! A program is literal text interleaved with `%` constructs. Every construct
//! is a tag character followed by fixed-width hexadecimal operands, so the
//! evaluator walks the program text directly without a separate parse.

use crate::annotate::{
    CommentPosition, Directive, DirectiveKind, DisplacementMatch, ReferenceMatch,
};
use crate::maths::{format_number, Width};
use crate::routines;
use crate::script::{
    Context, Glyph, NumberFormat, OperandSpec, ScriptError, ScriptErrorKind,
};
use tracing::trace;

/// Most iterations one `%L` loop may run.
pub const LOOP_LIMIT: usize = 262_144;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Combinator {
    And,
    Or,
    Xor,
}

/// The running boolean of one block.
struct Running {
    truth: bool,
    tested: bool,
    combinator: Combinator,
}

impl Running {
    fn new() -> Self {
        Running {
            truth: true,
            tested: false,
            combinator: Combinator::And,
        }
    }

    fn fold(&mut self, result: bool) {
        if !self.tested {
            self.truth = result;
            self.tested = true;
            return;
        }

        self.truth = match self.combinator {
            Combinator::And => self.truth && result,
            Combinator::Or => self.truth || result,
            Combinator::Xor => self.truth ^ result,
        };
    }

    /// Whether further AND/OR terms can no longer change the outcome.
    fn decided(&self) -> bool {
        self.tested
            && match self.combinator {
                Combinator::And => !self.truth,
                Combinator::Or => self.truth,
                Combinator::Xor => false,
            }
    }
}

/// Result of evaluating a bracketed block.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Outcome {
    pub truth: bool,
    pub brk: bool,
    pub cont: bool,
}

/// What a construct asks of its enclosing block.
enum Flow {
    Next,
    Close,
    Break,
    Continue,
}

/// A construct error, located once it reaches the block that ran it.
enum Fault {
    Kind(ScriptErrorKind),
    Located(ScriptError),
}

impl From<ScriptErrorKind> for Fault {
    fn from(kind: ScriptErrorKind) -> Self {
        Fault::Kind(kind)
    }
}

impl From<ScriptError> for Fault {
    fn from(err: ScriptError) -> Self {
        Fault::Located(err)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Relation {
    Lt,
    Gt,
    Eq,
    Le,
    Ge,
    Ne,
}

impl Relation {
    fn parse(text: &str) -> Option<Self> {
        match text {
            "LT" => Some(Relation::Lt),
            "GT" => Some(Relation::Gt),
            "EQ" => Some(Relation::Eq),
            "LE" => Some(Relation::Le),
            "GE" => Some(Relation::Ge),
            "NE" => Some(Relation::Ne),
            _ => None,
        }
    }

    fn holds(self, a: u16, b: u16) -> bool {
        match self {
            Relation::Lt => a < b,
            Relation::Gt => a > b,
            Relation::Eq => a == b,
            Relation::Le => a <= b,
            Relation::Ge => a >= b,
            Relation::Ne => a != b,
        }
    }
}

pub struct Interpreter {
    chars: Vec<char>,
    pos: usize,
}

impl Interpreter {
    pub fn new(program: &str) -> Self {
        Interpreter {
            chars: program.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn next(&mut self) -> Result<char, ScriptErrorKind> {
        let c = self.peek().ok_or(ScriptErrorKind::UnexpectedEnd)?;
        self.pos += 1;
        Ok(c)
    }

    fn at(&self, text: &str) -> bool {
        text.chars()
            .enumerate()
            .all(|(i, c)| self.chars.get(self.pos + i) == Some(&c))
    }

    fn locate(&self, kind: ScriptErrorKind, at: usize, ctx: &Context<'_>) -> ScriptError {
        let at = at.min(self.chars.len());
        let before = &self.chars[..at];
        let line = before.iter().filter(|c| **c == '\n').count() + 1;
        let column = at - before.iter().rposition(|c| *c == '\n').map(|i| i + 1).unwrap_or(0) + 1;
        let snippet = self.chars[at..].iter().take(16).collect();

        ScriptError {
            kind,
            line,
            column,
            address: ctx.current_address(),
            snippet,
        }
    }

    fn hex(&mut self, digits: usize) -> Result<u32, ScriptErrorKind> {
        let mut value = 0;

        for _ in 0..digits {
            let c = self.next()?;
            let digit = c.to_digit(16).ok_or(ScriptErrorKind::BadHex(c))?;
            value = value << 4 | digit;
        }

        Ok(value)
    }

    fn operand(&mut self) -> Result<OperandSpec, ScriptErrorKind> {
        let selector = self.hex(2)? as u8;
        let literal = if OperandSpec::has_literal(selector) {
            Some(self.hex(4)? as u16)
        } else {
            None
        };

        Ok(OperandSpec { selector, literal })
    }

    /// Skip a line break and the indentation after it.
    fn skip_newline(&mut self) {
        while let Some('\n') | Some('\r') = self.peek() {
            self.pos += 1;
        }

        while let Some(' ') | Some('\t') = self.peek() {
            self.pos += 1;
        }
    }

    /// Skip a `%'` comment up to, not including, the end of its line.
    fn skip_comment(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' || c == '\r' {
                break;
            }
            self.pos += 1;
        }
    }

    /// Skip line breaks, indentation and comments between constructs.
    fn skip_layout(&mut self) {
        loop {
            match self.peek() {
                Some('\n') | Some('\r') => self.skip_newline(),
                Some('%') if self.at("%'") => self.skip_comment(),
                _ => break,
            }
        }
    }

    fn expect_open(&mut self) -> Result<(), ScriptErrorKind> {
        self.skip_layout();

        if self.at("%(") {
            self.pos += 2;
            Ok(())
        } else if self.peek().is_none() {
            Err(ScriptErrorKind::UnexpectedEnd)
        } else {
            Err(ScriptErrorKind::MissingOpen)
        }
    }

    /// Move past the `%)` closing the block whose `%(` was just consumed.
    fn skip_to_close(&mut self) -> Result<(), ScriptErrorKind> {
        let mut depth = 1;

        while depth > 0 {
            let c = self.next().map_err(|_| ScriptErrorKind::MissingClose)?;
            if c != '%' {
                continue;
            }

            match self.next().map_err(|_| ScriptErrorKind::MissingClose)? {
                '(' => depth += 1,
                ')' => depth -= 1,
                '\'' => self.skip_comment(),
                _ => {}
            }
        }

        Ok(())
    }

    /// The source text of the next bracketed block, without its brackets.
    fn block_text(&mut self) -> Result<String, ScriptErrorKind> {
        self.expect_open()?;
        let start = self.pos;
        self.skip_to_close()?;

        Ok(self.chars[start..self.pos - 2].iter().collect())
    }

    /// Evaluate the next bracketed block.
    fn nested(&mut self, ctx: &mut Context<'_>) -> Result<Outcome, Fault> {
        self.expect_open()?;
        Ok(self.block(ctx, true)?)
    }

    /// Evaluate until the `%)` closing this block, or the end of the program
    /// when not `nested`.
    fn block(&mut self, ctx: &mut Context<'_>, nested: bool) -> Result<Outcome, ScriptError> {
        let mut running = Running::new();

        loop {
            match self.peek() {
                None if nested => {
                    return Err(self.locate(ScriptErrorKind::MissingClose, self.pos, ctx))
                }
                None => break,
                Some('\n') | Some('\r') => self.skip_newline(),
                Some('%') => {
                    let at = self.pos;
                    self.pos += 1;

                    let flow = match self.construct(ctx, &mut running, nested) {
                        Ok(flow) => flow,
                        Err(Fault::Kind(kind)) => return Err(self.locate(kind, at, ctx)),
                        Err(Fault::Located(err)) => return Err(err),
                    };

                    let (brk, cont) = match flow {
                        Flow::Next => continue,
                        Flow::Close => break,
                        Flow::Break => (true, false),
                        Flow::Continue => (false, true),
                    };

                    if nested {
                        if let Err(kind) = self.skip_to_close() {
                            return Err(self.locate(kind, at, ctx));
                        }
                    }

                    return Ok(Outcome {
                        truth: running.truth,
                        brk,
                        cont,
                    });
                }
                Some(c) => {
                    self.pos += 1;
                    ctx.push_char(ctx.charset().translate(c));
                }
            }
        }

        Ok(Outcome {
            truth: running.truth,
            ..Outcome::default()
        })
    }

    fn construct(
        &mut self,
        ctx: &mut Context<'_>,
        running: &mut Running,
        nested: bool,
    ) -> Result<Flow, Fault> {
        match self.next()? {
            '%' => ctx.push_char('%'),
            '\'' => self.skip_comment(),
            '(' => {
                let inner = self.block(ctx, true)?;
                if inner.brk {
                    return Ok(Flow::Break);
                }
                if inner.cont {
                    return Ok(Flow::Continue);
                }
                running.fold(inner.truth);
            }
            ')' if nested => return Ok(Flow::Close),
            ')' => return Err(ScriptErrorKind::UnbalancedClose.into()),
            'F' => {
                let bits = self.hex(2)? as u8;
                ctx.format = if bits == 0xFF {
                    NumberFormat::from_scope(ctx.scope())
                } else {
                    NumberFormat::from_bits(bits)
                };
            }
            'B' => {
                let value = self.operand()?.evaluate(ctx, Width::Byte)?;
                let text = format_number(value as u32, Width::Byte, ctx.format.base, ctx.format.signed);
                ctx.push_text(&text);
            }
            'W' => {
                let value = self.operand()?.evaluate(ctx, Width::Word)?;
                let text = format_number(value as u32, Width::Word, ctx.format.base, ctx.format.signed);
                ctx.push_text(&text);
            }
            'A' => {
                let value = self.operand()?.evaluate(ctx, Width::Word)?;
                ctx.record_reference(value);
                let text = format_number(value as u32, Width::Word, ctx.format.base, false);
                ctx.push_text(&text);
            }
            'C' => {
                let value = self.operand()?.evaluate(ctx, Width::Byte)? as u8;
                match ctx.charset().glyph(value) {
                    Glyph::Printable(c) | Glyph::Graphic(c) => ctx.push_char(c),
                    Glyph::Command(keyword) => ctx.push_text(keyword),
                    Glyph::Udg(_) | Glyph::Control { .. } => {
                        let text = format_number(value as u32, Width::Byte, ctx.format.base, false);
                        ctx.push_text(&text);
                    }
                }
            }
            'G' => {
                let bytes = self.operand()?.read_float(ctx)?;
                let text = ctx.floats().render(&bytes);
                ctx.push_text(&text);
            }
            'X' => self.arithmetic(ctx)?,
            '?' => self.comparison(ctx, running)?,
            'I' => return self.conditional(ctx),
            'L' => self.repeat(ctx)?,
            'Y' => return Ok(Flow::Break),
            'Z' => return Ok(Flow::Continue),
            'S' => ctx.start_line(),
            'E' => ctx.end_line(),
            'Q' => ctx.shrink_to_current(),
            'T' => ctx.push_separator(),
            'P' => {
                if let Some(truth) = self.call(ctx)? {
                    running.fold(truth);
                }
            }
            ';' => self.comment(ctx)?,
            'K' => {
                let start = self.value(ctx)?;
                let end = self.value(ctx)?;
                let program = self.block_text()?;
                trace!("enqueue data block {:04X}-{:04X}", start, end);
                ctx.insert_directive(Directive::data_block(start, end, &program));
            }
            other => return Err(ScriptErrorKind::UnknownTag(other).into()),
        }

        Ok(Flow::Next)
    }

    /// Parse and evaluate one operand at its natural width.
    fn value(&mut self, ctx: &mut Context<'_>) -> Result<u16, ScriptErrorKind> {
        let spec = self.operand()?;
        spec.evaluate(ctx, spec.natural_width())
    }

    /// `%X o s a [b]`
    fn arithmetic(&mut self, ctx: &mut Context<'_>) -> Result<(), ScriptErrorKind> {
        let op = self.hex(1)? as u8;
        let slot = self.hex(1)? as u8;

        if op > 8 {
            return Err(ScriptErrorKind::UnknownOperation(op));
        }

        let a = self.value(ctx)? as u32;
        let result = if op == 0 {
            a
        } else {
            let b = self.value(ctx)? as u32;
            match op {
                1 => a + b,
                2 => a + 0x10000 - b,
                3 => a * b,
                4 | 5 if b == 0 => return Err(ScriptErrorKind::DivisionByZero),
                4 => a / b,
                5 => a % b,
                6 => a & b,
                7 => a | b,
                _ => a ^ b,
            }
        };

        ctx.set_slot(slot, (result & 0xFFFF) as u16)
    }

    /// `%?rr a b` or `%?Bc`
    fn comparison(
        &mut self,
        ctx: &mut Context<'_>,
        running: &mut Running,
    ) -> Result<(), ScriptErrorKind> {
        let first = self.next()?;

        if first == 'B' {
            running.combinator = match self.next()? {
                'A' => Combinator::And,
                'O' => Combinator::Or,
                'X' => Combinator::Xor,
                other => return Err(ScriptErrorKind::UnknownComparison(format!("B{}", other))),
            };
            return Ok(());
        }

        let name: String = [first, self.next()?].iter().collect();
        let relation =
            Relation::parse(&name).ok_or(ScriptErrorKind::UnknownComparison(name))?;
        let a = self.operand()?;
        let b = self.operand()?;

        if running.decided() {
            return Ok(());
        }

        let a = a.evaluate(ctx, a.natural_width())?;
        let b = b.evaluate(ctx, b.natural_width())?;
        running.fold(relation.holds(a, b));

        Ok(())
    }

    /// `%I%(test%)%(yes%)` with an optional `%J%(no%)`.
    fn conditional(&mut self, ctx: &mut Context<'_>) -> Result<Flow, Fault> {
        let test = self.nested(ctx)?;
        let mut flow = Flow::Next;

        self.expect_open()?;
        if test.truth {
            flow = flow_of(self.block(ctx, true)?);
        } else {
            self.skip_to_close()?;
        }

        let resume = self.pos;
        self.skip_layout();
        if self.at("%J") {
            self.pos += 2;
            self.expect_open()?;
            if test.truth {
                self.skip_to_close()?;
            } else {
                flow = flow_of(self.block(ctx, true)?);
            }
        } else {
            self.pos = resume;
        }

        Ok(flow)
    }

    /// `%L%(test%)%(body%)`
    fn repeat(&mut self, ctx: &mut Context<'_>) -> Result<(), Fault> {
        let test_at = self.pos;
        let mut iterations = 0;

        loop {
            self.pos = test_at;
            let test = self.nested(ctx)?;

            self.expect_open()?;
            if !test.truth {
                self.skip_to_close()?;
                return Ok(());
            }

            iterations += 1;
            if iterations > LOOP_LIMIT {
                return Err(ScriptErrorKind::LoopLimit(LOOP_LIMIT).into());
            }

            if self.block(ctx, true)?.brk {
                return Ok(());
            }
        }
    }

    /// `%PName(args)`
    /// Skip spaces and tabs.
    fn skip_blanks(&mut self) {
        while let Some(' ') | Some('\t') = self.peek() {
            self.pos += 1;
        }
    }

    fn call(&mut self, ctx: &mut Context<'_>) -> Result<Option<bool>, ScriptErrorKind> {
        self.skip_blanks();
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if !(c.is_ascii_alphanumeric() || c == '_') {
                break;
            }
            name.push(c);
            self.pos += 1;
        }

        self.skip_blanks();
        if self.next()? != '(' {
            return Err(ScriptErrorKind::bad_argument(&name, "expected ( after routine name"));
        }

        let mut args = String::new();
        let mut quoted = false;
        loop {
            let c = self
                .next()
                .map_err(|_| ScriptErrorKind::bad_argument(&name, "unterminated argument list"))?;

            match c {
                '\\' if quoted => {
                    args.push(c);
                    args.push(self.next()?);
                    continue;
                }
                '"' => quoted = !quoted,
                ')' if !quoted => break,
                _ => {}
            }

            args.push(c);
        }

        Ok(routines::call(&name, &args, ctx)?.truth)
    }

    /// `%;` source, position, kind, operands and text.
    fn comment(&mut self, ctx: &mut Context<'_>) -> Result<(), ScriptErrorKind> {
        let source = self.next()?;
        let position_letter = self.next()?;
        let position = CommentPosition::from_letter(position_letter)
            .ok_or(ScriptErrorKind::UnknownCommentKind(position_letter))?;
        let kind = self.next()?;

        let start = self.value(ctx)?;
        let end = self.value(ctx)?;
        let operand = match kind {
            'C' => None,
            'A' | 'N' | 'B' | 'X' | 'Y' | 'D' => Some(self.value(ctx)?),
            other => return Err(ScriptErrorKind::UnknownCommentKind(other)),
        };

        let text = match source {
            'L' => ctx.take_line_text(),
            'R' => {
                let from = self.pos;
                self.skip_comment();
                self.chars[from..self.pos]
                    .iter()
                    .collect::<String>()
                    .trim_start()
                    .to_string()
            }
            other => return Err(ScriptErrorKind::UnknownCommentKind(other)),
        };

        let value = operand.unwrap_or(0);
        let kind = match kind {
            'A' | 'N' | 'B' => DirectiveKind::CommentReference {
                position,
                matching: match kind {
                    'A' => ReferenceMatch::Address,
                    'N' => ReferenceMatch::Number,
                    _ => ReferenceMatch::Both,
                },
                value,
                text,
            },
            'X' | 'Y' | 'D' => DirectiveKind::CommentDisplacement {
                position,
                matching: match kind {
                    'X' => DisplacementMatch::IX,
                    'Y' => DisplacementMatch::IY,
                    _ => DisplacementMatch::Both,
                },
                displacement: value as u8 as i8,
                text,
            },
            _ => DirectiveKind::Comment { position, text },
        };

        trace!("comment directive {:04X}-{:04X}", start, end);
        ctx.insert_directive(Directive::new(start, end, kind));

        Ok(())
    }

    /// Evaluate a whole program as a data block.
    pub fn run(&mut self, ctx: &mut Context<'_>) -> Result<Outcome, ScriptError> {
        self.pos = 0;
        self.skip_newline();
        self.block(ctx, false)
    }

    /// Evaluate a pattern program at every address of the block, returning
    /// the number of matches.
    pub fn run_pattern(&mut self, ctx: &mut Context<'_>) -> Result<u16, ScriptError> {
        self.pos = 0;
        self.skip_layout();
        self.skip_blanks();

        let test_at = self.pos;
        let bracketed = self.at("%(");
        let mut matches: u16 = 0;

        for address in ctx.block_start() as u32..=ctx.block_end() as u32 {
            ctx.begin_candidate(address as u16, matches);
            self.pos = test_at;

            let truth = if bracketed {
                self.pos += 2;
                self.block(ctx, true)?.truth
            } else {
                self.block(ctx, false)?.truth
            };

            if !truth {
                continue;
            }

            matches = matches.wrapping_add(1);
            trace!("pattern matched at {:04X}", address);

            if bracketed {
                self.skip_layout();
                if self.at("%(") {
                    self.pos += 2;
                    self.block(ctx, true)?;
                }
            }
        }

        Ok(matches)
    }
}

fn flow_of(outcome: Outcome) -> Flow {
    if outcome.brk {
        Flow::Break
    } else if outcome.cont {
        Flow::Continue
    } else {
        Flow::Next
    }
}

/// Run `program` as a data block in `ctx`.
pub fn run(program: &str, ctx: &mut Context<'_>) -> Result<Outcome, ScriptError> {
    Interpreter::new(program).run(ctx)
}

/// Run `program` as a pattern block in `ctx`.
pub fn run_pattern(program: &str, ctx: &mut Context<'_>) -> Result<u16, ScriptError> {
    Interpreter::new(program).run_pattern(ctx)
}
