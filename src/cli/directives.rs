//! List and check a program's directives

use crate::annotate::sort_directives;
use crate::project::Program;
use crate::script::{PresetKind, PRESETS};
use clap::ArgMatches;
use std::io;
use std::path::Path;

pub fn directives(prog: &Program, root: &Path, args: &ArgMatches) -> io::Result<()> {
    if args.is_present("presets") {
        for preset in PRESETS.iter() {
            let kind = match preset.kind {
                PresetKind::Data => "data",
                PresetKind::Pattern => "pattern",
            };
            println!("{:<24} {:<8} {}", preset.name, kind, preset.summary);
        }

        return Ok(());
    }

    let mut directives = prog.load_directives(root)?;
    sort_directives(&mut directives);

    for directive in directives.iter() {
        if args.is_present("explain") {
            println!(
                "{:04X}-{:04X} {:?}",
                directive.start, directive.end, directive.kind
            );
        } else {
            println!("{}", directive);
        }
    }

    eprintln!("{} directives", directives.len());

    Ok(())
}
