//! Test fixtures and builders

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A directory tree on disk with automatic cleanup
pub struct TestTree {
    pub temp_dir: TempDir,
}

impl TestTree {
    /// Root of the tree, made absolute and free of symlinks so it can be
    /// compared against reported paths
    pub fn root(&self) -> PathBuf {
        fs::canonicalize(self.temp_dir.path()).unwrap_or_else(|_| self.temp_dir.path().to_path_buf())
    }

    /// Absolute path of `relative` inside the tree
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }
}

/// Builder for directory trees containing repositories
///
/// Paths are relative to the tree root and use `/` as separator.
#[derive(Default)]
pub struct TreeBuilder {
    dirs: Vec<String>,
    repos: Vec<String>,
    files: Vec<String>,
    dir_links: Vec<(String, String)>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plain directory (parents created as needed)
    pub fn with_dir(mut self, path: impl Into<String>) -> Self {
        self.dirs.push(path.into());
        self
    }

    /// Directory holding a `.git` directory
    pub fn with_repo(mut self, path: impl Into<String>) -> Self {
        self.repos.push(path.into());
        self
    }

    /// Regular file (parents created as needed)
    pub fn with_file(mut self, path: impl Into<String>) -> Self {
        self.files.push(path.into());
        self
    }

    /// Symlink at `link` pointing to the directory `target`, both relative to the root
    pub fn with_dir_symlink(mut self, link: impl Into<String>, target: impl Into<String>) -> Self {
        self.dir_links.push((link.into(), target.into()));
        self
    }

    pub fn build(self) -> Result<TestTree> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();

        for dir in &self.dirs {
            fs::create_dir_all(root.join(dir))?;
        }
        for repo in &self.repos {
            fs::create_dir_all(root.join(repo).join(".git"))?;
            fs::write(root.join(repo).join(".git").join("HEAD"), "ref: refs/heads/main\n")?;
        }
        for file in &self.files {
            let path = root.join(file);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, "test")?;
        }
        for (link, target) in &self.dir_links {
            let link_path = root.join(link);
            if let Some(parent) = link_path.parent() {
                fs::create_dir_all(parent)?;
            }
            symlink_dir(&root.join(target), &link_path)?;
        }

        Ok(TestTree { temp_dir })
    }
}

#[cfg(unix)]
fn symlink_dir(target: &Path, link: &Path) -> Result<()> {
    std::os::unix::fs::symlink(target, link)?;
    Ok(())
}

#[cfg(windows)]
fn symlink_dir(target: &Path, link: &Path) -> Result<()> {
    std::os::windows::fs::symlink_dir(target, link)?;
    Ok(())
}

/// Creates `width` directories per level, `depth` levels deep, marking every
/// `repo_every`th directory as a repository
///
/// Returns the `.git` paths that a full crawl must report: repositories
/// nested under another repository are created on disk but excluded.
pub fn generate_tree(root: &Path, width: usize, depth: usize, repo_every: usize) -> Result<Vec<PathBuf>> {
    let mut expected = Vec::new();
    let mut counter = 0usize;
    let mut level: Vec<(PathBuf, bool)> = vec![(root.to_path_buf(), false)];

    for _ in 0..depth {
        let mut next = Vec::with_capacity(level.len() * width);
        for (parent, inside_repo) in &level {
            for i in 0..width {
                let dir = parent.join(format!("d{i}"));
                fs::create_dir_all(&dir)?;
                counter += 1;

                let is_repo = repo_every > 0 && counter % repo_every == 0;
                if is_repo {
                    fs::create_dir(dir.join(".git"))?;
                    if !inside_repo {
                        expected.push(dir.join(".git"));
                    }
                }
                next.push((dir, *inside_repo || is_repo));
            }
        }
        level = next;
    }

    Ok(expected)
}

/// `.git` paths for the given repository directories under `root`
pub fn git_paths(root: &Path, repos: &[&str]) -> Vec<PathBuf> {
    repos.iter().map(|repo| root.join(repo).join(".git")).collect()
}
