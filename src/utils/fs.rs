//! Path display helpers
//!
//! Pure functions applied at the output boundary; the engine always works
//! with native `PathBuf`s.

use std::path::Path;

/// Separator style used when rendering paths for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathSeparator {
    /// Leave paths as the platform produced them
    #[default]
    Native,
    /// Forward slashes everywhere
    Slash,
    /// Backslashes everywhere (Windows style)
    Backslash,
}

impl PathSeparator {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "native" => Some(Self::Native),
            "slash" | "/" | "unix" => Some(Self::Slash),
            "backslash" | "\\" | "windows" => Some(Self::Backslash),
            _ => None,
        }
    }
}

/// Rewrites every separator in `path` to the requested style
pub fn normalize_separators(path: &str, separator: PathSeparator) -> String {
    match separator {
        PathSeparator::Native => path.to_string(),
        PathSeparator::Slash => path.replace('\\', "/"),
        PathSeparator::Backslash => path.replace('/', "\\"),
    }
}

/// Renders a path for display with the requested separator style
pub fn display_path(path: &Path, separator: PathSeparator) -> String {
    normalize_separators(&path.to_string_lossy(), separator)
}

/// Shortens long paths for display
pub fn shorten_path(path: &str, max_length: usize) -> String {
    if path.chars().count() <= max_length {
        return path.to_string();
    }

    let components: Vec<&str> = path
        .split(['/', '\\'])
        .filter(|s| !s.is_empty())
        .collect();
    if components.len() <= 2 {
        // Too few components to shorten meaningfully
        return path.to_string();
    }

    // Keep last 2 components with ellipsis prefix
    let prefix = if path.starts_with("./") { "./" } else { "" };
    format!(
        "{}.../{}/{}",
        prefix,
        components[components.len() - 2],
        components[components.len() - 1]
    )
}
