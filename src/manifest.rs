use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use miette::Diagnostic;
use thiserror::Error;

use crate::utils::is_contained;

/// Subdirectories every generated project gets, whether or not a file lands in them.
pub const DIRECTORIES: &[&str] = &[
    "src/config",
    "src/controllers",
    "src/routes",
    "src/routes/api",
    "src/models",
    "src/middlewares",
    "src/services",
    "src/utils",
    "src/helpers",
    "tests",
    "public",
];

#[derive(Debug, Error, Diagnostic)]
pub enum ManifestError {
    #[error("manifest path '{path}' does not stay inside the project root")]
    #[diagnostic(
        code(create_backend_app::manifest::escapes_root),
        help("Manifest paths must be relative and made of plain components only")
    )]
    EscapesRoot { path: PathBuf },

    #[error("manifest path '{path}' was added twice")]
    #[diagnostic(code(create_backend_app::manifest::duplicate))]
    Duplicate { path: PathBuf },
}

/// A file or directory to be created under the target root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Path relative to the target root.
    pub relative_path: PathBuf,
    /// Text payload for files, `None` for directory entries.
    pub content: Option<String>,
}
impl ManifestEntry {
    pub fn is_file(&self) -> bool {
        self.content.is_some()
    }
}

/// Ordered list of everything a scaffold run writes, built in memory before touching disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteManifest {
    entries: Vec<ManifestEntry>,
}
impl WriteManifest {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn add_directory<P: Into<PathBuf>>(&mut self, path: P) -> Result<(), ManifestError> {
        self.push(ManifestEntry {
            relative_path: path.into(),
            content: None,
        })
    }

    pub fn add_file<P: Into<PathBuf>, C: Into<String>>(
        &mut self,
        path: P,
        content: C,
    ) -> Result<(), ManifestError> {
        self.push(ManifestEntry {
            relative_path: path.into(),
            content: Some(content.into()),
        })
    }

    fn push(&mut self, entry: ManifestEntry) -> Result<(), ManifestError> {
        if !is_contained(&entry.relative_path) {
            return Err(ManifestError::EscapesRoot {
                path: entry.relative_path,
            });
        }

        if self.get(&entry.relative_path).is_some() {
            return Err(ManifestError::Duplicate {
                path: entry.relative_path,
            });
        }

        self.entries.push(entry);

        Ok(())
    }

    pub fn get<P: AsRef<Path>>(&self, path: P) -> Option<&ManifestEntry> {
        self.entries
            .iter()
            .find(|entry| entry.relative_path == path.as_ref())
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn directories(&self) -> impl Iterator<Item = &ManifestEntry> {
        self.entries.iter().filter(|entry| !entry.is_file())
    }

    pub fn files(&self) -> impl Iterator<Item = &ManifestEntry> {
        self.entries.iter().filter(|entry| entry.is_file())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every path that exists under the root once the manifest is applied, implied parents included.
    pub fn path_set(&self) -> BTreeSet<PathBuf> {
        let mut paths = BTreeSet::new();

        for entry in &self.entries {
            for ancestor in entry.relative_path.ancestors() {
                if ancestor.as_os_str().is_empty() {
                    break;
                }
                paths.insert(ancestor.to_path_buf());
            }
        }

        paths
    }
}
