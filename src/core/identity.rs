//! Canonical directory identities and the visited-set cycle guard
//!
//! The walk never descends through a symlink, so on its own it cannot loop.
//! The guard additionally keeps a directory that is reachable through two
//! real paths (bind mounts, directory hard links where the platform allows
//! them) from being scanned twice. What counts as "the same directory" is
//! decided by an [`IdentityPolicy`].

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Key used to recognise a directory that has already been scheduled
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DirIdentity {
    /// Device and inode numbers of the directory itself
    Inode { dev: u64, ino: u64 },
    /// Fully resolved absolute path
    Path(PathBuf),
}

/// Computes the identity of a directory
///
/// Called from blocking worker threads, so implementations may touch the
/// filesystem.
pub trait IdentityPolicy: Send + Sync + 'static {
    fn identify(&self, path: &Path) -> io::Result<DirIdentity>;

    /// Identity of the starting directory
    ///
    /// The root is the one path whose symlink is followed, so it must be
    /// identified by the directory it points at.
    fn identify_root(&self, path: &Path) -> io::Result<DirIdentity> {
        self.identify(path)
    }

    /// Identity used when [`identify`](Self::identify) fails, for example
    /// because the directory vanished after it was listed
    fn fallback(&self, path: &Path) -> DirIdentity {
        DirIdentity::Path(path.to_path_buf())
    }
}

/// Device + inode identity
///
/// Two paths that name the same directory object collapse into one entry,
/// whichever way they were reached.
#[cfg(unix)]
#[derive(Debug, Clone, Copy, Default)]
pub struct DeviceInode;

#[cfg(unix)]
impl IdentityPolicy for DeviceInode {
    fn identify(&self, path: &Path) -> io::Result<DirIdentity> {
        use std::os::unix::fs::MetadataExt;

        let metadata = fs::symlink_metadata(path)?;
        Ok(DirIdentity::Inode {
            dev: metadata.dev(),
            ino: metadata.ino(),
        })
    }

    fn identify_root(&self, path: &Path) -> io::Result<DirIdentity> {
        use std::os::unix::fs::MetadataExt;

        let metadata = fs::metadata(path)?;
        Ok(DirIdentity::Inode {
            dev: metadata.dev(),
            ino: metadata.ino(),
        })
    }
}

/// Resolved-real-path identity via `fs::canonicalize`
#[derive(Debug, Clone, Copy, Default)]
pub struct CanonicalPath;

impl IdentityPolicy for CanonicalPath {
    fn identify(&self, path: &Path) -> io::Result<DirIdentity> {
        fs::canonicalize(path).map(DirIdentity::Path)
    }
}

/// Uses the path exactly as walked, without touching the filesystem
///
/// Useful when the tree is known to be free of aliases and stat calls are
/// expensive (network mounts).
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalPath;

impl IdentityPolicy for LexicalPath {
    fn identify(&self, path: &Path) -> io::Result<DirIdentity> {
        Ok(DirIdentity::Path(path.to_path_buf()))
    }
}

/// Platform default: device + inode on unix, resolved path elsewhere
#[cfg(unix)]
pub type DefaultIdentity = DeviceInode;
#[cfg(not(unix))]
pub type DefaultIdentity = CanonicalPath;

/// Identifies `path`, falling back to the policy's fallback on error
pub(crate) fn identify_or_fallback<P: IdentityPolicy + ?Sized>(policy: &P, path: &Path) -> DirIdentity {
    policy.identify(path).unwrap_or_else(|e| {
        tracing::debug!("Could not identify {}: {e}", path.display());
        policy.fallback(path)
    })
}

/// Identifies the starting directory, following a symlinked root
pub(crate) fn identify_root_or_fallback<P: IdentityPolicy + ?Sized>(policy: &P, root: &Path) -> DirIdentity {
    policy.identify_root(root).unwrap_or_else(|e| {
        tracing::debug!("Could not identify root {}: {e}", root.display());
        policy.fallback(root)
    })
}

/// Set of identities that have already been scheduled for a scan
#[derive(Debug, Default)]
pub struct CycleGuard {
    visited: HashSet<DirIdentity>,
}

impl CycleGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            visited: HashSet::with_capacity(capacity),
        }
    }

    /// True if `identity` has not been marked yet
    pub fn should_visit(&self, identity: &DirIdentity) -> bool {
        !self.visited.contains(identity)
    }

    /// Records `identity`; returns false if it was already present
    pub fn mark_visited(&mut self, identity: DirIdentity) -> bool {
        self.visited.insert(identity)
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}
