//! Single-directory listing and classification

use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::Path;

use super::config::GIT_DIR_NAME;

/// What a directory child is, judged without following symlinks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    RealDir,
    Symlink,
    Other,
}

impl From<fs::FileType> for EntryKind {
    fn from(file_type: fs::FileType) -> Self {
        if file_type.is_symlink() {
            EntryKind::Symlink
        } else if file_type.is_dir() {
            EntryKind::RealDir
        } else {
            EntryKind::Other
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildEntry {
    pub name: OsString,
    pub kind: EntryKind,
}

impl ChildEntry {
    pub fn new(name: impl Into<OsString>, kind: EntryKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Result of listing one directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirListing {
    pub children: Vec<ChildEntry>,
    /// The directory holds a real `.git` directory
    pub is_repository: bool,
}

impl DirListing {
    /// Builds a listing and derives `is_repository` from the children
    pub fn from_children(children: Vec<ChildEntry>) -> Self {
        let is_repository = children
            .iter()
            .any(|child| child.kind == EntryKind::RealDir && child.name == GIT_DIR_NAME);
        Self {
            children,
            is_repository,
        }
    }

    /// Names of children that are real (non-symlink) directories
    pub fn real_dirs(&self) -> impl Iterator<Item = &OsStr> {
        self.children
            .iter()
            .filter(|child| child.kind == EntryKind::RealDir)
            .map(|child| child.name.as_os_str())
    }
}

/// Lists a directory's children
///
/// Implementations perform blocking I/O; the scheduler calls them from
/// blocking worker threads.
pub trait DirectoryScanner: Send + Sync + 'static {
    fn scan(&self, path: &Path) -> io::Result<DirListing>;
}

/// [`DirectoryScanner`] backed by `std::fs::read_dir`
#[derive(Debug, Clone, Copy, Default)]
pub struct FsScanner;

impl DirectoryScanner for FsScanner {
    fn scan(&self, path: &Path) -> io::Result<DirListing> {
        let mut children = Vec::new();

        for entry in fs::read_dir(path)? {
            // An entry can vanish between readdir and stat; skip it rather
            // than losing the rest of the directory
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::debug!("Skipping unreadable entry in {}: {e}", path.display());
                    continue;
                }
            };

            // DirEntry::file_type does not follow symlinks. When the
            // filesystem does not report a type, fall back to lstat.
            let kind = match entry.file_type() {
                Ok(file_type) => EntryKind::from(file_type),
                Err(_) => match fs::symlink_metadata(entry.path()) {
                    Ok(metadata) => EntryKind::from(metadata.file_type()),
                    Err(e) => {
                        tracing::debug!("Skipping {}: {e}", entry.path().display());
                        continue;
                    }
                },
            };

            children.push(ChildEntry::new(entry.file_name(), kind));
        }

        Ok(DirListing::from_children(children))
    }
}
