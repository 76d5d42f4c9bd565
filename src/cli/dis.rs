//! Disassemble a program

use crate::analysis::disassemble_with;
use crate::memory::Image;
use crate::project::Program;
use crate::script::{SpectrumCharset, SpectrumFloat};
use clap::ArgMatches;
use std::path::Path;
use std::{fs, io};
use tracing::info;

pub fn dis(prog: &Program, root: &Path, args: &ArgMatches) -> io::Result<()> {
    let image_path = prog.image_path(root)?;
    let data = fs::read(&image_path)?;
    let length = prog.length(data.len());
    let image = Image::new(&data, prog.offset(), prog.origin(), length)?;

    let directives = prog.load_directives(root)?;
    info!(
        "Disassembling {} bytes of {} at {:04X} with {} directives",
        length,
        image_path.display(),
        prog.origin(),
        directives.len()
    );

    let mut report = |done: usize, total: usize| eprint!("\r{}/{}", done, total);
    let progress: Option<&mut dyn FnMut(usize, usize)> = if args.is_present("progress") {
        Some(&mut report)
    } else {
        None
    };

    let listing = disassemble_with(
        image,
        &directives,
        prog.format().scope(),
        &SpectrumCharset,
        &SpectrumFloat,
        progress,
    )?;

    if args.is_present("progress") {
        eprintln!();
    }

    match args.value_of("output") {
        Some(output) => fs::write(output, listing),
        None => {
            print!("{}", listing);
            Ok(())
        }
    }
}
