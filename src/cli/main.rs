//! CLI support for non-command bits

use crate::cli::common::{resolve_program, Command};
use crate::{cli, project};
use clap::{AppSettings, Arg, ArgSettings};
use std::io;
use std::path::Path;
use std::str::FromStr;

pub fn main() -> io::Result<()> {
    let mut app = app_from_crate!().setting(AppSettings::SubcommandRequiredElseHelp);
    app = app.arg(
        Arg::with_name("program")
            .long("program")
            .value_name("rom")
            .takes_value(true)
            .help("Which program to disassemble")
            .set(ArgSettings::Global),
    );
    app = project::Program::configure_app(app);
    app = app.arg(
        Arg::with_name("project")
            .long("project")
            .value_name("zxdis.json")
            .takes_value(true)
            .help("The project file to load")
            .set(ArgSettings::Global),
    );

    for cmd in Command::enumerate().iter() {
        app = app.subcommand(cmd.into_clap_subcommand());
    }

    let matches = app.get_matches();
    let (command, submatches) = matches.subcommand();
    let command = cli::Command::from_str(command).map_err(|_| {
        io::Error::new(io::ErrorKind::InvalidInput, "Please enter a command")
    })?;

    // Global arguments reach the subcommand wherever they were given.
    let args = submatches.unwrap_or(&matches);

    let project_filename = args.value_of("project").unwrap_or("zxdis.json");
    let project = project::Project::read_or_default(Path::new(project_filename))?;
    let prog = project::Program::from_arg_matches(args)?;
    let prog = resolve_program(&project, args.value_of("program"), prog)?;

    match command {
        cli::Command::Disassemble => cli::dis(&prog, project.root(), args),
        cli::Command::Directives => cli::directives(&prog, project.root(), args),
    }
}
