//! Routine library tests

use crate::annotate::{CommentPosition, FormatScope, Overlay};
use crate::listing::Body;
use crate::memory::Image;
use crate::routines::{Args, Terminator, Value};
use crate::script::{run, Context, Environment, ScriptErrorKind, SpectrumCharset, SpectrumFloat};
use std::collections::BTreeSet;

struct Fixture {
    data: Vec<u8>,
    scope: FormatScope,
    overlay: Overlay,
    references: BTreeSet<u16>,
}

const ORIGIN: u16 = 0x4000;

impl Fixture {
    fn new(data: &[u8]) -> Self {
        Fixture {
            data: data.to_vec(),
            scope: FormatScope::default(),
            overlay: Overlay::default(),
            references: BTreeSet::new(),
        }
    }

    fn context(&mut self) -> Context<'_> {
        let end = ORIGIN + self.data.len() as u16 - 1;
        let env = Environment {
            image: Image::new(&self.data, 0, ORIGIN, self.data.len()).unwrap(),
            scope: &self.scope,
            overlay: &mut self.overlay,
            references: &mut self.references,
            charset: &SpectrumCharset,
            floats: &SpectrumFloat,
        };

        Context::new(env, ORIGIN, end)
    }

    /// Run `program`, returning the text and address of each line and the
    /// final block end.
    fn run(&mut self, program: &str) -> (Vec<(u16, String)>, u16) {
        let mut ctx = self.context();
        run(program, &mut ctx).unwrap();
        let (lines, end) = ctx.finish();

        let lines = lines
            .into_iter()
            .map(|line| match (line.marker, line.body) {
                (Some(marker), Body::Data(text)) => (marker.address, text),
                other => panic!("not a data line: {:?}", other),
            })
            .collect();

        (lines, end)
    }

    fn texts(&mut self, program: &str) -> Vec<String> {
        self.run(program).0.into_iter().map(|(_, text)| text).collect()
    }

    fn error(&mut self, program: &str) -> ScriptErrorKind {
        let mut ctx = self.context();
        run(program, &mut ctx).unwrap_err().kind
    }
}

macro_rules! assert_bad_argument {
    ($fixture: expr, $program: expr) => {
        assert!(matches!(
            $fixture.error($program),
            ScriptErrorKind::BadArgument { .. }
        ))
    };
}

#[test]
fn argument_lists() {
    let args = Args::parse("Test", r#""a,b", per_line = 4, true, -3, "q\"x", Title=#10"#).unwrap();

    assert_eq!(args.get("first", 0), Some(&Value::Str("a,b".to_string())));
    assert_eq!(args.get("per_line", 9), Some(&Value::Int(4)));
    assert_eq!(args.get("second", 1), Some(&Value::Bool(true)));
    assert_eq!(args.get("third", 2), Some(&Value::Int(-3)));
    assert_eq!(args.get("fourth", 3), Some(&Value::Str("q\"x".to_string())));
    assert_eq!(args.get("title", 9), Some(&Value::Int(0x10)));
    assert_eq!(args.get("missing", 9), None);

    assert_eq!(args.count("per_line", 9, 0, 8), Ok(4));
    assert!(args.count("per_line", 9, 0, 3).is_err());
    assert!(args.string("per_line", 9, "").is_err());
    assert!(Args::parse("Test", "x=").is_err());
    assert!(Args::parse("Test", "\"open").is_err());
}

#[test]
fn terminators() {
    assert_eq!("zero".parse::<Terminator>(), Ok(Terminator::Zero));
    assert_eq!("HighBit".parse::<Terminator>(), Ok(Terminator::HighBit));
    assert_eq!("len2be".parse::<Terminator>(), Ok(Terminator::Len2Be));
    assert_eq!("nul".parse::<Terminator>(), Err(()));
    assert_eq!(Terminator::Len2Le.default_title(), "DM2");
}

#[test]
fn byte_dump() {
    let data: Vec<u8> = (0..10).collect();
    let mut fixture = Fixture::new(&data);

    let (lines, end) = fixture.run("%PByteDump()");
    assert_eq!(end, 0x4009);
    assert_eq!(
        lines,
        vec![
            (0x4000, "DEFB  #00,#01,#02,#03,#04,#05,#06,#07".to_string()),
            (0x4008, "DEFB  #08,#09".to_string()),
        ]
    );

    let mut fixture = Fixture::new(&[1, 2, 3, 4, 5]);
    assert_eq!(
        fixture.texts("%PByteDump(1, per_line=4, gap=2, title=\"DB\")"),
        vec!["DB  1,2, 3,4", "DB  5"]
    );
    assert_eq!(
        fixture.texts("%Pbytedump(per_line=0)"),
        vec!["DEFB  #01,#02,#03,#04,#05"]
    );

    let mut fixture = Fixture::new(&[0xFF, 0x01]);
    assert_eq!(fixture.texts("%PByteDump(\"dec\", true)"), vec!["DEFB  -1,1"]);
    assert_bad_argument!(fixture, "%PByteDump(format=\"hexx\")");
    assert_bad_argument!(fixture, "%PByteDump(per_line=-1)");
}

#[test]
fn word_dump() {
    let mut fixture = Fixture::new(&[0x34, 0x12, 0x78, 0x56, 0xAA]);
    assert_eq!(
        fixture.run("%PWordDump()").0,
        vec![
            (0x4000, "DEFW  #1234,#5678".to_string()),
            (0x4004, "DEFB  #AA".to_string()),
        ]
    );

    let mut fixture = Fixture::new(&[0x12, 0x34]);
    assert_eq!(
        fixture.texts("%PWordDump(big_endian=true)"),
        vec!["DEFW  #1234"]
    );
}

#[test]
fn zero_terminated_message() {
    let mut fixture = Fixture::new(&[0x41, 0x42, 0x43, 0x00, 0x99]);
    let (lines, end) = fixture.run("%PMessageDump(\"zero\")");

    assert_eq!(lines, vec![(0x4000, "DM0  \"ABC\",#00".to_string())]);
    assert_eq!(end, 0x4003);

    // Without a terminator in the block the whole block is dumped.
    let mut fixture = Fixture::new(&[0x41, 0x42]);
    let (lines, end) = fixture.run("%PMessageDump(\"zero\")");
    assert_eq!(lines, vec![(0x4000, "DM0  \"AB\"".to_string())]);
    assert_eq!(end, 0x4001);
}

#[test]
fn terminated_messages() {
    let mut fixture = Fixture::new(&[0x48, 0xC9, 0x00]);
    let (lines, end) = fixture.run("%PMessageDump(\"highbit\")");
    assert_eq!(lines, vec![(0x4000, "DMH  \"H\",\"I\"+#80".to_string())]);
    assert_eq!(end, 0x4001);

    // A marked code with no printable form stays a number.
    let mut fixture = Fixture::new(&[0x41, 0x8D]);
    let (lines, _) = fixture.run("%PMessageDump(\"highbit\")");
    assert_eq!(lines, vec![(0x4000, "DMH  \"A\",#8D".to_string())]);

    let mut fixture = Fixture::new(&[0x02, 0x41, 0x22, 0xFF]);
    let (lines, end) = fixture.run("%PMessageDump(terminator=\"len1\")");
    assert_eq!(lines, vec![(0x4000, "DM1  #02,\"A\"\"\"".to_string())]);
    assert_eq!(end, 0x4002);

    let mut fixture = Fixture::new(&[0x00, 0x01, 0x41, 0x42]);
    let (lines, end) = fixture.run("%PMessageDump(\"len2be\")");
    assert_eq!(lines, vec![(0x4000, "DM2B  #0001,\"A\"".to_string())]);
    assert_eq!(end, 0x4002);
}

#[test]
fn control_parameters_do_not_terminate() {
    let mut fixture = Fixture::new(&[0x16, 0x00, 0x05, 0x41, 0x00]);
    let (lines, end) = fixture.run("%PMessageDump(\"zero\")");
    assert_eq!(
        lines,
        vec![(0x4000, "DM0  #16,#00,#05,\"A\",#00".to_string())]
    );
    assert_eq!(end, 0x4004);

    let mut fixture = Fixture::new(&[0x11, 0x80, 0x42, 0xC3, 0x00]);
    let (lines, end) = fixture.run("%PMessageDump(\"highbit\")");
    assert_eq!(
        lines,
        vec![(0x4000, "DMH  #11,#80,\"B\",\"C\"+#80".to_string())]
    );
    assert_eq!(end, 0x4003);
}

#[test]
fn message_controls_and_wrapping() {
    let mut fixture = Fixture::new(&[0x16, 0x41, 0x42, 0x43]);
    assert_eq!(
        fixture.texts("%PMessageDump()"),
        vec!["DM  #16,#41,#42,\"C\""]
    );

    let mut fixture = Fixture::new(b"ABCDE");
    assert_eq!(
        fixture.run("%PMessageDump(\"raw\", 2, \"DEFM\")").0,
        vec![
            (0x4000, "DEFM  \"AB\"".to_string()),
            (0x4002, "DEFM  \"CD\"".to_string()),
            (0x4004, "DEFM  \"E\"".to_string()),
        ]
    );

    assert_bad_argument!(fixture, "%PMessageDump(\"nul\")");
}

#[test]
fn find_bytes() {
    let mut fixture = Fixture::new(&[0xCD, 0xC2, 0x04]);

    assert!(fixture
        .texts("%PFindBytes(\"CD ?? 04\", \"ROM call\", \"A\")")
        .is_empty());
    assert_eq!(
        fixture.overlay.take_comments(0x4000, 0x4002),
        vec![(CommentPosition::After, "ROM call".to_string())]
    );

    assert_eq!(
        fixture.texts("%I%(%PFindBytes(\"CD C2 04 00\", \"past the end\")%)%(yes%)%J%(no%)"),
        vec!["no"]
    );
    assert_eq!(fixture.overlay.pending_len(), 0);

    assert_bad_argument!(fixture, "%PFindBytes()");
    assert_bad_argument!(fixture, "%PFindBytes(\"C\")");
    assert_bad_argument!(fixture, "%PFindBytes(\"XY\")");
    assert_bad_argument!(fixture, "%PFindBytes(\"CD\", \"x\", \"Q\")");
}

#[test]
fn offset_range() {
    let mut fixture = Fixture::new(&[0; 4]);

    assert_eq!(
        fixture.texts("%POffsetRange(-2, 5, 3, 4)%W83 %W84"),
        vec!["#3FFE #4005"]
    );
    assert_eq!(
        fixture.texts("%POffsetRange(end=3)%W80-%W81"),
        vec!["#4000-#4003"]
    );
    assert_bad_argument!(fixture, "%POffsetRange(0, 1, 10)");
}
