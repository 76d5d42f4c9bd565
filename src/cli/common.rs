//! Common utilities for command implementations

use crate::project::{Program, Project};
use clap::{App, Arg, SubCommand};
use std::io;
use std::str::FromStr;

/// Enumeration of all CLI commands
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Disassemble,
    Directives,
}

impl Command {
    /// Enumerate all commands that zxdis recognizes.
    pub fn enumerate() -> Vec<Self> {
        use Command::*;

        vec![Disassemble, Directives]
    }

    /// Construct the subcommand object for this particular `Command`.
    pub fn into_clap_subcommand<'a, 'b>(self) -> App<'a, 'b> {
        match self {
            Command::Disassemble => SubCommand::with_name("dis")
                .about("Disassemble a program with its directives applied")
                .arg(
                    Arg::with_name("output")
                        .long("output")
                        .short("o")
                        .value_name("listing.txt")
                        .takes_value(true)
                        .help("Write the listing here instead of standard output"),
                )
                .arg(
                    Arg::with_name("progress")
                        .long("progress")
                        .help("Report progress on standard error"),
                ),
            Command::Directives => SubCommand::with_name("directives")
                .about("Check a program's directives and list them in address order")
                .arg(
                    Arg::with_name("explain")
                        .long("explain")
                        .help("Describe each directive instead of printing its text form"),
                )
                .arg(
                    Arg::with_name("presets")
                        .long("presets")
                        .help("List the built-in block programs instead"),
                ),
        }
    }
}

impl FromStr for Command {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_ref() {
            "dis" => Ok(Command::Disassemble),
            "directives" => Ok(Command::Directives),
            _ => Err(()),
        }
    }
}

/// Combine the named program (or the project's default program) with
/// settings given on the command line, which take precedence.
pub fn resolve_program(
    project: &Project,
    version: Option<&str>,
    prog: Program,
) -> io::Result<Program> {
    match version {
        Some(version) => match project.program(version) {
            Some(project_program) => Ok(project_program.apply_override(&prog)),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("The specified program {} does not exist.", version),
            )),
        },
        None => match project.default_program() {
            Some((_, default_program)) => Ok(default_program.apply_override(&prog)),
            None => Ok(prog),
        },
    }
}
