//! Project configuration file representation

use crate::project::program::Program;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::{fs, io};

/// In-memory representation of the current project configuration.
///
/// This file is typically read from a file named `zxdis.json`, and it
/// contains every program in the project keyed by name.
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct Project {
    #[serde(default)]
    programs: BTreeMap<String, Program>,

    /// Directory the project file was read from.
    #[serde(skip)]
    root: PathBuf,
}

impl Project {
    pub fn read(filename: &Path) -> io::Result<Self> {
        let project_file = fs::File::open(filename)?;
        let mut project: Self = serde_json::from_reader(project_file)?;

        for (name, prog) in project.programs.iter_mut() {
            prog.set_name(name);
        }

        project.root = filename
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        Ok(project)
    }

    /// Read the project file if there is one, or start an empty project
    /// rooted in the current directory.
    pub fn read_or_default(filename: &Path) -> io::Result<Self> {
        match Self::read(filename) {
            Err(ref e) if e.kind() == io::ErrorKind::NotFound => Ok(Project::default()),
            result => result,
        }
    }

    pub fn from_json(json: &str, root: &Path) -> io::Result<Self> {
        let mut project: Self = serde_json::from_str(json)?;

        for (name, prog) in project.programs.iter_mut() {
            prog.set_name(name);
        }
        project.root = root.to_path_buf();

        Ok(project)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the program with the given name within the project.
    pub fn program(&self, name: &str) -> Option<&Program> {
        self.programs.get(name)
    }

    /// Get the project's default program.
    pub fn default_program(&self) -> Option<(&String, &Program)> {
        self.programs.iter().next()
    }

    pub fn iter_programs(&self) -> impl Iterator<Item = (&str, &Program)> {
        self.programs.iter().map(|(k, v)| (k.as_str(), v))
    }
}
