//! Program identifier

use crate::annotate::{parse_directives, Directive};
use crate::maths::parse_number;
use crate::script::preset;
use crate::project::FormatOverride;
use clap::{App, Arg, ArgMatches, ArgSettings};
use relative_path::RelativePathBuf;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::{fs, io};

/// One image to disassemble and everything needed to annotate it.
///
/// Paths are relative to the directory holding the project file.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    image: Option<RelativePathBuf>,
    offset: Option<usize>,
    origin: Option<u16>,
    length: Option<usize>,

    #[serde(default)]
    format: FormatOverride,

    /// Directives in their text form.
    #[serde(default)]
    directives: Vec<String>,

    /// Files of directives, one per line.
    #[serde(default)]
    directive_files: Vec<RelativePathBuf>,

    /// Built-in block programs applied to address ranges.
    #[serde(default)]
    presets: Vec<PresetBlock>,

    #[serde(skip)]
    name: Option<String>,
}

/// A built-in program, by name, over `start..=end`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PresetBlock {
    pub program: String,
    pub start: u16,
    pub end: u16,
}

impl PresetBlock {
    /// Parse `name:start:end` as given on the command line.
    pub fn from_arg(text: &str) -> io::Result<Self> {
        let mut parts = text.split(':');
        let program = parts.next().unwrap_or_default();
        let mut address = || {
            parts
                .next()
                .and_then(parse_number)
                .filter(|value| *value >= 0 && *value <= 0xFFFF)
                .map(|value| value as u16)
        };

        match (address(), address()) {
            (Some(start), Some(end)) if !program.is_empty() => Ok(PresetBlock {
                program: program.to_string(),
                start,
                end,
            }),
            _ => Err(invalid(format!("Invalid value {:?} for --preset", text))),
        }
    }
}

fn invalid(message: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, message)
}

/// Parse a numeric option no larger than `max`.
fn numeric(args: &ArgMatches, name: &str, max: i64) -> io::Result<Option<i64>> {
    match args.value_of(name) {
        None => Ok(None),
        Some(text) => match parse_number(text) {
            Some(value) if value >= 0 && value <= max => Ok(Some(value)),
            _ => Err(invalid(format!("Invalid value {:?} for --{}", text, name))),
        },
    }
}

impl Program {
    pub fn configure_app<'a, 'b>(app: App<'a, 'b>) -> App<'a, 'b> {
        let app = app
            .arg(
                Arg::with_name("image")
                    .long("image")
                    .value_name("image.bin")
                    .help("The program image file to disassemble.")
                    .takes_value(true)
                    .set(ArgSettings::Global),
            )
            .arg(
                Arg::with_name("origin")
                    .long("origin")
                    .value_name("#4000")
                    .help("Address of the first disassembled byte.")
                    .takes_value(true)
                    .set(ArgSettings::Global),
            )
            .arg(
                Arg::with_name("offset")
                    .long("offset")
                    .value_name("0")
                    .help("Position of the first disassembled byte in the image.")
                    .takes_value(true)
                    .set(ArgSettings::Global),
            )
            .arg(
                Arg::with_name("length")
                    .long("length")
                    .value_name("16384")
                    .help("How many bytes to disassemble.")
                    .takes_value(true)
                    .set(ArgSettings::Global),
            )
            .arg(
                Arg::with_name("directives")
                    .long("directives")
                    .value_name("annotations.txt")
                    .help("A file of directives to apply, one per line.")
                    .takes_value(true)
                    .multiple(true)
                    .number_of_values(1)
                    .set(ArgSettings::Global),
            )
            .arg(
                Arg::with_name("preset")
                    .long("preset")
                    .value_name("message-zero:#4000:#4010")
                    .help("A built-in block program to run over an address range.")
                    .takes_value(true)
                    .multiple(true)
                    .number_of_values(1)
                    .set(ArgSettings::Global),
            );

        FormatOverride::configure_app(app)
    }

    /// Construct a Program from clap ArgMatches
    pub fn from_arg_matches(args: &ArgMatches) -> io::Result<Program> {
        Ok(Program {
            image: args.value_of("image").map(RelativePathBuf::from),
            offset: numeric(args, "offset", i64::from(u32::MAX))?.map(|v| v as usize),
            origin: numeric(args, "origin", 0xFFFF)?.map(|v| v as u16),
            length: numeric(args, "length", 0x10000)?.map(|v| v as usize),
            format: FormatOverride::from_arg_matches(args)?,
            directives: Vec::new(),
            directive_files: args
                .values_of("directives")
                .map_or(Vec::new(), |v| v.map(RelativePathBuf::from).collect()),
            presets: args
                .values_of("preset")
                .map_or(Ok(Vec::new()), |v| v.map(PresetBlock::from_arg).collect())?,
            name: None,
        })
    }

    /// Where the image lives, resolved against `root`.
    pub fn image_path(&self, root: &Path) -> io::Result<PathBuf> {
        self.image
            .as_ref()
            .map(|path| path.to_path(root))
            .ok_or_else(|| invalid("Did not specify an image".to_string()))
    }

    pub fn offset(&self) -> usize {
        self.offset.unwrap_or(0)
    }

    pub fn origin(&self) -> u16 {
        self.origin.unwrap_or(0)
    }

    /// The window length, or everything from the offset to the end of an
    /// image of `image_len` bytes.
    pub fn length(&self, image_len: usize) -> usize {
        self.length
            .unwrap_or_else(|| image_len.saturating_sub(self.offset()))
    }

    pub fn format(&self) -> &FormatOverride {
        &self.format
    }

    /// Decode the inline directives, then every directive file in order.
    pub fn load_directives(&self, root: &Path) -> io::Result<Vec<Directive>> {
        let mut directives = Vec::new();

        for text in self.directives.iter() {
            directives.push(text.parse::<Directive>()?);
        }

        for file in self.directive_files.iter() {
            let path = file.to_path(root);
            let text = fs::read_to_string(&path).map_err(|e| {
                io::Error::new(e.kind(), format!("Cannot read {}: {}", path.display(), e))
            })?;
            directives.extend(parse_directives(&text)?);
        }

        for block in self.presets.iter() {
            let program = preset(&block.program).ok_or_else(|| {
                invalid(format!("There is no built-in program called {}", block.program))
            })?;
            directives.push(program.directive(block.start, block.end));
        }

        Ok(directives)
    }

    pub fn as_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = Some(name.to_string());
    }

    /// Settings present in `other` win over ours. Directive lists are
    /// concatenated.
    pub fn apply_override(&self, other: &Program) -> Program {
        Program {
            image: other.image.clone().or_else(|| self.image.clone()),
            offset: other.offset.or(self.offset),
            origin: other.origin.or(self.origin),
            length: other.length.or(self.length),
            format: self.format.apply_override(&other.format),
            directives: self
                .directives
                .iter()
                .chain(other.directives.iter())
                .cloned()
                .collect(),
            directive_files: self
                .directive_files
                .iter()
                .chain(other.directive_files.iter())
                .cloned()
                .collect(),
            presets: self
                .presets
                .iter()
                .chain(other.presets.iter())
                .cloned()
                .collect(),
            name: other.name.clone().or_else(|| self.name.clone()),
        }
    }
}
