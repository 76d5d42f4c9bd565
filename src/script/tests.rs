//! Script evaluator tests

use crate::annotate::{
    CommentPosition, DirectiveKind, FormatScope, Overlay, ReferenceMatch,
};
use crate::listing::{Body, LineRecord};
use crate::memory::Image;
use crate::script::{
    preset, run, run_pattern, Context, Environment, PresetKind, ScriptErrorKind,
    SpectrumCharset, SpectrumFloat, LOOP_LIMIT, PRESETS,
};
use std::collections::BTreeSet;

struct Fixture {
    data: Vec<u8>,
    origin: u16,
    scope: FormatScope,
    overlay: Overlay,
    references: BTreeSet<u16>,
}

impl Fixture {
    fn new(origin: u16, data: &[u8]) -> Self {
        Fixture {
            data: data.to_vec(),
            origin,
            scope: FormatScope::default(),
            overlay: Overlay::default(),
            references: BTreeSet::new(),
        }
    }

    fn context(&mut self, start: u16, end: u16) -> Context<'_> {
        let env = Environment {
            image: Image::new(&self.data, 0, self.origin, self.data.len()).unwrap(),
            scope: &self.scope,
            overlay: &mut self.overlay,
            references: &mut self.references,
            charset: &SpectrumCharset,
            floats: &SpectrumFloat,
        };

        Context::new(env, start, end)
    }

    /// Run `program` over the whole image and return the text of each line.
    fn lines(&mut self, program: &str) -> Vec<String> {
        let start = self.origin;
        let end = self.origin + self.data.len().max(1) as u16 - 1;
        let mut ctx = self.context(start, end);
        run(program, &mut ctx).unwrap();
        let (lines, _) = ctx.finish();

        texts(&lines)
    }

    fn error(&mut self, program: &str) -> ScriptErrorKind {
        let start = self.origin;
        let mut ctx = self.context(start, start);
        run(program, &mut ctx).unwrap_err().kind
    }
}

fn texts(lines: &[LineRecord]) -> Vec<String> {
    lines
        .iter()
        .map(|line| match &line.body {
            Body::Data(text) => text.clone(),
            other => panic!("not a data line: {:?}", other),
        })
        .collect()
}

#[test]
fn defb_program() {
    let data: Vec<u8> = (0..10).collect();
    let mut fixture = Fixture::new(0x8000, &data);

    let mut ctx = fixture.context(0x8000, 0x8009);
    run(
        "%L%(%?LE8F8E%)%(%SDEFB%T%B2F%L%(%?LE8F8E%?LT8CC00008%)%(,%B2F%)%E%)",
        &mut ctx,
    )
    .unwrap();
    let (lines, end) = ctx.finish();

    assert_eq!(end, 0x8009);
    assert_eq!(
        texts(&lines),
        vec![
            "DEFB  #00,#01,#02,#03,#04,#05,#06,#07",
            "DEFB  #08,#09",
        ]
    );
    assert_eq!(lines[0].marker.as_ref().unwrap().address, 0x8000);
    assert_eq!(lines[1].marker.as_ref().unwrap().address, 0x8008);
    assert!(lines[1].marker.as_ref().unwrap().data);
}

#[test]
fn arithmetic() {
    let mut fixture = Fixture::new(0x8000, &[0; 4]);

    assert_eq!(fixture.lines("%X10C0000AC00003%W80"), vec!["#000D"]);
    assert_eq!(fixture.lines("%X20C00001C00002%W80"), vec!["#FFFF"]);
    assert_eq!(fixture.lines("%X31C00101C00100%W81"), vec!["#0100"]);
    assert_eq!(fixture.lines("%X52C00011C00005%W82"), vec!["#0002"]);
    assert_eq!(fixture.lines("%X83C000FFC0000F%W83"), vec!["#00F0"]);
}

#[test]
fn slot_rules() {
    let mut fixture = Fixture::new(0x8000, &[0; 8]);

    // Writing slot 12 takes an absolute address.
    assert_eq!(fixture.lines("%X0CC08003%W8F"), vec!["#8003"]);
    assert_eq!(fixture.lines("%W8D-%W8E"), vec!["#8000-#8007"]);

    assert_eq!(fixture.error("%X0AC00001"), ScriptErrorKind::ReadOnlySlot(10));
    assert_eq!(fixture.error("%X0BC00001"), ScriptErrorKind::ReadOnlySlot(11));
    assert_eq!(fixture.error("%X0DC00001"), ScriptErrorKind::ReadOnlySlot(13));
    assert_eq!(fixture.error("%X0FC00001"), ScriptErrorKind::ReadOnlySlot(15));
    assert_eq!(fixture.error("%X40C00001C00000"), ScriptErrorKind::DivisionByZero);
    assert_eq!(fixture.error("%X50C00001C00000"), ScriptErrorKind::DivisionByZero);
    assert_eq!(fixture.error("%X90C00001"), ScriptErrorKind::UnknownOperation(9));
}

#[test]
fn comparisons() {
    let mut fixture = Fixture::new(0x8000, &[0; 2]);

    assert_eq!(
        fixture.lines("%I%(%?LTC00001C00002%)%(yes%)%J%(no%)"),
        vec!["yes"]
    );
    assert_eq!(
        fixture.lines("%I%(%?GEC00001C00002%)%(yes%)%J%(no%)"),
        vec!["no"]
    );
    assert_eq!(
        fixture.lines("%I%(%?EQC00001C00001%?BX%?EQC00001C00001%)%(yes%)%J%(no%)"),
        vec!["no"]
    );
    assert_eq!(
        fixture.error("%I%(%?ZZC00001C00001%)%(yes%)"),
        ScriptErrorKind::UnknownComparison("ZZ".to_string())
    );
}

#[test]
fn comparisons_short_circuit() {
    let mut fixture = Fixture::new(0x8000, &[0; 2]);

    // The second test would read outside the image.
    assert_eq!(
        fixture.lines("%I%(%?EQC00001C00002%?EQ40FFFFC00000%)%(yes%)%J%(no%)"),
        vec!["no"]
    );
    assert_eq!(
        fixture.lines("%I%(%?EQC00001C00001%?BO%?EQ40FFFFC00000%)%(yes%)%J%(no%)"),
        vec!["yes"]
    );
    assert_eq!(
        fixture.error("%I%(%?EQC00001C00001%?EQ40FFFFC00000%)%(yes%)"),
        ScriptErrorKind::OutOfRange(0xFFFF)
    );
}

#[test]
fn loops() {
    let mut fixture = Fixture::new(0x8000, &[0; 2]);

    let program = "%F01%X00C00000\n\
                   %L%(%?LT80C0000A%)%(\n\
                   %X1080C00001\n\
                   %I%(%?EQ80C00003%)%(%Z%)\n\
                   %I%(%?EQ80C00006%)%(%Y%)\n\
                   %B80,%)";
    assert_eq!(fixture.lines(program), vec!["1,2,4,5,"]);

    assert_eq!(
        fixture.error("%L%(%?EQC00000C00000%)%(%)"),
        ScriptErrorKind::LoopLimit(LOOP_LIMIT)
    );
}

#[test]
fn literals() {
    let mut fixture = Fixture::new(0x8000, &[0; 2]);

    assert_eq!(fixture.lines("a^b`%%"), vec!["a↑b£%"]);
    assert_eq!(fixture.lines("%'ignored\nkept"), vec!["kept"]);
}

#[test]
fn number_formats() {
    let mut fixture = Fixture::new(0x8000, &[0xFE, 0x12, 0x34]);

    assert_eq!(
        fixture.lines("%B0F %F01%B0F %F05%B0F %F02%B0F %F03%B0F %FFF%B0F"),
        vec!["#FE 254 -2 @376 %11111110 #FE"]
    );
    assert_eq!(
        fixture.lines("%X0CC08001%W0F %F08%W0F"),
        vec!["#3412 #1234"]
    );
}

#[test]
fn line_spacing() {
    let mut fixture = Fixture::new(0x8000, &[1, 2, 3]);

    let mut ctx = fixture.context(0x8000, 0x8002);
    run("%F20%B2F%E%FFF%B2F%E%F10%B2F", &mut ctx).unwrap();
    let (lines, _) = ctx.finish();

    let bodies: Vec<Body> = lines.into_iter().map(|line| line.body).collect();
    assert_eq!(
        bodies,
        vec![
            Body::Data("#01".to_string()),
            Body::Blank,
            Body::Blank,
            Body::Data("#02".to_string()),
            Body::Data("#03".to_string()),
            Body::Blank,
        ]
    );
}

#[test]
fn reference_recording() {
    let mut fixture = Fixture::new(0x8000, &[0x00, 0x5C]);
    assert_eq!(fixture.lines("%A1F"), vec!["#5C00"]);
    assert!(fixture.references.contains(&0x5C00));
}

#[test]
fn characters() {
    let mut fixture = Fixture::new(0x8000, &[0x41, 0x60, 0x85, 0x92, 0xF5, 0x16]);
    assert_eq!(
        fixture.lines("%C2F%C2F%C2F%C2F%C2F%C2F"),
        vec!["A£▐#92PRINT#16"]
    );
}

#[test]
fn floats() {
    let mut fixture = Fixture::new(
        0x8000,
        &[
            0x00, 0x00, 0x01, 0x00, 0x00, // 1
            0x80, 0x00, 0x00, 0x00, 0x00, // 0.5
            0x82, 0x49, 0x0F, 0xDA, 0xA2, // pi
            0x00, 0xFF, 0xFF, 0xFF, 0x00, // -1
        ],
    );

    assert_eq!(
        fixture.lines("%G2F %G2F %G2F %G2F"),
        vec!["1 0.5 3.14159265 -1"]
    );
    assert_eq!(fixture.error("%G8F"), ScriptErrorKind::BadOperand(0x8F));
}

#[test]
fn line_control() {
    let mut fixture = Fixture::new(0x8000, &[1, 2, 3, 4]);

    let mut ctx = fixture.context(0x8000, 0x8003);
    run("%SDEFB%T%B2F%Q", &mut ctx).unwrap();
    let (lines, end) = ctx.finish();

    assert_eq!(texts(&lines), vec!["DEFB  #01"]);
    assert_eq!(end, 0x8000);
}

#[test]
fn shrinking_before_the_first_byte() {
    let mut fixture = Fixture::new(0x0000, &[1, 2, 3]);

    let mut ctx = fixture.context(0x0000, 0x0002);
    run("%Q", &mut ctx).unwrap();
    assert_eq!(ctx.remaining(), 0);
    assert_eq!(ctx.resume(), 0x0000);

    // Writing the end slot afterwards makes the block real again.
    run("%X0EC00001", &mut ctx).unwrap();
    assert_eq!(ctx.resume(), 0x0002);

    let mut ctx = fixture.context(0x0000, 0x0002);
    run("%B2F%Q", &mut ctx).unwrap();
    assert_eq!(ctx.resume(), 0x0001);
    let (_, end) = ctx.finish();
    assert_eq!(end, 0x0000);
}

#[test]
fn error_location() {
    let mut fixture = Fixture::new(0x8000, &[0; 2]);

    let mut ctx = fixture.context(0x8000, 0x8001);
    let err = run("ab\n  %X0AC00001", &mut ctx).unwrap_err();
    assert_eq!(err.kind, ScriptErrorKind::ReadOnlySlot(10));
    assert_eq!(err.line, 2);
    assert_eq!(err.column, 3);
    assert_eq!(err.address, 0x8000);
    assert!(err.snippet.starts_with("%X0A"));

    assert_eq!(fixture.error("%@"), ScriptErrorKind::UnknownTag('@'));
    assert_eq!(fixture.error("%(abc"), ScriptErrorKind::MissingClose);
    assert_eq!(fixture.error("%)"), ScriptErrorKind::UnbalancedClose);
    assert_eq!(fixture.error("%B0G"), ScriptErrorKind::BadHex('G'));
    assert_eq!(fixture.error("%B0"), ScriptErrorKind::UnexpectedEnd);
    assert_eq!(
        fixture.error("%PNoSuchRoutine()"),
        ScriptErrorKind::UnknownRoutine("NoSuchRoutine".to_string())
    );
}

#[test]
fn enqueue_block() {
    let mut fixture = Fixture::new(0x8000, &[0; 2]);
    fixture.lines("%KC08010C0801F%(%PByteDump()%)");

    assert_eq!(fixture.overlay.pending_len(), 1);
    let directive = fixture.overlay.take_active(0x8010).unwrap();
    assert_eq!((directive.start, directive.end), (0x8010, 0x801F));
    assert_eq!(
        directive.kind,
        DirectiveKind::DataBlock("%PByteDump()".to_string())
    );
}

#[test]
fn comment_constructs() {
    let mut fixture = Fixture::new(0x4000, &[0; 2]);
    fixture.lines("%;REC8A8A  Save IX,DE bytes");

    assert_eq!(
        fixture.overlay.take_comments(0x4000, 0x4000),
        vec![(CommentPosition::EndOfLine, "Save IX,DE bytes".to_string())]
    );

    assert_eq!(fixture.lines("hello%;LAA8A8AC05C00"), Vec::<String>::new());
    let directive = fixture.overlay.take_active(0x4000).unwrap();
    assert_eq!(
        directive.kind,
        DirectiveKind::CommentReference {
            position: CommentPosition::After,
            matching: ReferenceMatch::Address,
            value: 0x5C00,
            text: "hello".to_string(),
        }
    );

    assert_eq!(
        fixture.error("%;RQC8A8A x"),
        ScriptErrorKind::UnknownCommentKind('Q')
    );
}

#[test]
fn pattern_blocks() {
    let mut fixture = Fixture::new(0x4000, &[0x00, 0xCD, 0x00, 0xCD]);

    let mut ctx = fixture.context(0x4000, 0x4003);
    let matches = run_pattern("%(%?EQ2FC000CD%)%(%;REC8A8A call\n%)", &mut ctx).unwrap();
    let (lines, _) = ctx.finish();

    assert_eq!(matches, 2);
    assert!(lines.is_empty());
    assert_eq!(fixture.overlay.pending_len(), 2);
    assert_eq!(
        fixture.overlay.take_comments(0x4000, 0x4001),
        vec![(CommentPosition::EndOfLine, "call".to_string())]
    );
    assert_eq!(fixture.overlay.pending_len(), 1);
}

#[test]
fn routine_truth_folds() {
    let mut fixture = Fixture::new(0x4000, &[0xCD, 0xC2, 0x04]);

    assert_eq!(
        fixture.lines("%I%(%PFindBytes(\"CD ?? 04\")%)%(found%)%J%(missing%)"),
        vec!["found"]
    );
    assert_eq!(
        fixture.lines("%I%(%PFindBytes(\"C3\")%)%(found%)%J%(missing%)"),
        vec!["missing"]
    );

    // Blanks around the routine name are allowed.
    assert_eq!(
        fixture.lines("%I%(%P\tFindBytes (\"CD C2\")%)%(found%)%J%(missing%)"),
        vec!["found"]
    );
}

#[test]
fn data_presets() {
    let cases: &[(&str, &[u8], &[&str])] = &[
        ("bytes", &[1, 2], &["DEFB  #01,#02"]),
        ("bytes-decimal", &[1, 2], &["DEFB  1,2"]),
        ("bytes-signed", &[0xFF, 1], &["DEFB  -1,1"]),
        ("words", &[0x34, 0x12], &["DEFW  #1234"]),
        ("words-big-endian", &[0x12, 0x34], &["DEFW  #1234"]),
        ("message", b"AB", &["DM  \"AB\""]),
        ("message-zero", &[0x41, 0x00], &["DM0  \"A\",#00"]),
        ("message-highbit", &[0x41, 0xC2], &["DMH  \"A\",\"B\"+#80"]),
        ("message-len1", &[0x01, 0x41], &["DM1  #01,\"A\""]),
        ("message-len2", &[0x01, 0x00, 0x41], &["DM2  #0001,\"A\""]),
        ("message-len2-big-endian", &[0x00, 0x01, 0x41], &["DM2B  #0001,\"A\""]),
        ("graphics", &[0x3C, 0x42], &["DEFB  %00111100", "DEFB  %01000010"]),
        (
            "floats",
            &[0x00, 0x00, 0x01, 0x00, 0x00, 0x80, 0x00, 0x00, 0x00, 0x00],
            &["DEFF  1", "DEFF  0.5"],
        ),
        ("vectors", &[0x00, 0x5C, 0x03, 0x40], &["DEFW  #5C00", "DEFW  #4003"]),
    ];

    for (name, data, expected) in cases.iter() {
        let program = preset(name).unwrap();
        assert_eq!(program.kind, PresetKind::Data, "{}", name);

        let mut fixture = Fixture::new(0x4000, data);
        assert_eq!(fixture.lines(program.text), *expected, "{}", name);
    }

    let covered = cases.len();
    let data_presets = PRESETS.iter().filter(|p| p.kind == PresetKind::Data).count();
    assert_eq!(covered, data_presets);
}

#[test]
fn vector_preset_records_references() {
    let mut fixture = Fixture::new(0x4000, &[0x00, 0x5C, 0x03, 0x40]);
    fixture.lines(preset("VECTORS").unwrap().text);

    assert!(fixture.references.contains(&0x5C00));
    assert!(fixture.references.contains(&0x4003));
    assert!(preset("nothing").is_none());
}

#[test]
fn pattern_presets() {
    let code = [
        0xCD, 0xC2, 0x04, 0xCD, 0x56, 0x05, 0xCD, 0x3C, 0x20, 0xCD, 0x01, 0x16, 0xCD, 0xB5,
        0x03, 0xCD, 0x6B, 0x0D,
    ];
    let cases = [
        ("save-bytes", 1),
        ("load-bytes", 1),
        ("print-string", 1),
        ("rom-calls", 6),
    ];

    for (name, comments) in cases.iter() {
        let program = preset(name).unwrap();
        assert_eq!(program.kind, PresetKind::Pattern, "{}", name);

        let mut fixture = Fixture::new(0x4000, &code);
        let mut ctx = fixture.context(0x4000, 0x4011);
        run_pattern(program.text, &mut ctx).unwrap();
        let (lines, _) = ctx.finish();

        assert!(lines.is_empty(), "{}", name);
        assert_eq!(fixture.overlay.pending_len(), *comments, "{}", name);
    }

    let mut fixture = Fixture::new(0x4000, &code);
    let mut ctx = fixture.context(0x4000, 0x4011);
    run_pattern(preset("rom-calls").unwrap().text, &mut ctx).unwrap();
    assert_eq!(
        fixture.overlay.take_comments(0x400C, 0x400E),
        vec![(CommentPosition::EndOfLine, "Beep for DE cycles of HL".to_string())]
    );

    let pattern_presets = PRESETS.iter().filter(|p| p.kind == PresetKind::Pattern).count();
    assert_eq!(pattern_presets, cases.len());
}
