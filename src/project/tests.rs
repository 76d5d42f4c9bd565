//! Project file tests

use crate::annotate::{Directive, LabelPolicy, TimingDisplay};
use crate::maths::Base;
use crate::project::{PresetBlock, Program, Project};
use crate::script::preset;
use std::io;
use std::path::Path;

const PROJECT: &str = r##"{
    "programs": {
        "rom": {
            "image": "images/48.rom",
            "origin": 0,
            "length": 16384,
            "format": {
                "number_base": "dec",
                "labels": "referenced",
                "timing": "both",
                "markup": true
            },
            "directives": ["0200#3D00#3FFF##%PByteDump()"]
        },
        "game": {
            "image": "game.bin",
            "offset": 27,
            "origin": 32768
        }
    }
}"##;

#[test]
fn read_programs() {
    let project = Project::from_json(PROJECT, Path::new("work")).unwrap();
    let rom = project.program("rom").unwrap();

    assert_eq!(rom.as_name(), Some("rom"));
    assert_eq!(
        rom.image_path(project.root()).unwrap(),
        Path::new("work").join("images").join("48.rom")
    );
    assert_eq!(rom.origin(), 0);
    assert_eq!(rom.offset(), 0);
    assert_eq!(rom.length(49152), 16384);

    let scope = rom.format().scope();
    assert_eq!(scope.number_base, Base::Decimal);
    assert_eq!(scope.address_base, Base::Hex);
    assert_eq!(scope.labels, LabelPolicy::Referenced);
    assert_eq!(scope.timing, TimingDisplay::Both);
    assert!(scope.markup);

    assert_eq!(
        rom.load_directives(project.root()).unwrap(),
        vec![Directive::data_block(0x3D00, 0x3FFF, "%PByteDump()")]
    );

    let game = project.program("game").unwrap();
    assert_eq!(game.origin(), 0x8000);
    assert_eq!(game.length(1027), 1000);

    let (name, _) = project.default_program().unwrap();
    assert_eq!(name, "game");
    assert_eq!(project.iter_programs().count(), 2);
}

#[test]
fn overrides() {
    let project = Project::from_json(PROJECT, Path::new(".")).unwrap();
    let rom = project.program("rom").unwrap();
    let cli: Program =
        serde_json::from_str(r#"{"origin": 1024, "format": {"number_base": "hex"}}"#).unwrap();

    let merged = rom.apply_override(&cli);
    assert_eq!(merged.origin(), 0x400);
    assert_eq!(merged.length(0), 16384);
    assert_eq!(merged.as_name(), Some("rom"));

    let scope = merged.format().scope();
    assert_eq!(scope.number_base, Base::Hex);
    assert_eq!(scope.labels, LabelPolicy::Referenced);
}

#[test]
fn bad_settings() {
    assert!(Project::from_json(
        r#"{"programs": {"a": {"format": {"timing": "sometimes"}}}}"#,
        Path::new(".")
    )
    .is_err());

    let program: Program = serde_json::from_str(r#"{"directives": ["0200#40#4003##x"]}"#).unwrap();
    let err = program.load_directives(Path::new(".")).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidInput);

    assert!(program.image_path(Path::new(".")).is_err());
}

#[test]
fn preset_blocks() {
    let program: Program = serde_json::from_str(
        r#"{"presets": [{"program": "Message-Zero", "start": 16384, "end": 16400}]}"#,
    )
    .unwrap();
    assert_eq!(
        program.load_directives(Path::new(".")).unwrap(),
        vec![preset("message-zero").unwrap().directive(0x4000, 0x4010)]
    );

    let program: Program =
        serde_json::from_str(r#"{"presets": [{"program": "nope", "start": 0, "end": 1}]}"#).unwrap();
    let err = program.load_directives(Path::new(".")).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidInput);

    assert_eq!(
        PresetBlock::from_arg("rom-calls:#4000:16400").unwrap(),
        PresetBlock {
            program: "rom-calls".to_string(),
            start: 0x4000,
            end: 0x4010,
        }
    );
    assert!(PresetBlock::from_arg("rom-calls:#4000").is_err());
    assert!(PresetBlock::from_arg(":0:1").is_err());
    assert!(PresetBlock::from_arg("bytes:0:#10000").is_err());
}
