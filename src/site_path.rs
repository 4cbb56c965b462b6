//! Site paths: `/`-separated paths rooted at `/`.
//!
//! Every node of the resolved tree carries a source and a destination site
//! path such as `/guide/install.md` or `/guide/`. They read like URLs, so the
//! navigation uses destination paths directly as hrefs, and they are only
//! turned into filesystem paths at the edges ([`to_fs`]).
//!
//! ## Conventions
//!
//! - A trailing `/` marks a directory: `/guide/`
//! - `.` segments are dropped, `..` pops one segment
//! - Climbing above the root stays at the root: `join("/", "../a.md")` → `/a.md`
//! - Repeated separators collapse: `join("/a//", "b")` → `/a/b`

use std::path::{Path, PathBuf};

/// Join `name` onto the directory `dir` and normalise the result.
///
/// The result always starts with `/`. It ends with `/` when `name` does,
/// which is how manifests mark subdirectory entries.
pub fn join(dir: &str, name: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in dir.split('/').chain(name.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    if segments.is_empty() {
        return "/".to_string();
    }

    let mut joined = String::with_capacity(dir.len() + name.len() + 1);
    for segment in &segments {
        joined.push('/');
        joined.push_str(segment);
    }
    if name.ends_with('/') {
        joined.push('/');
    }
    joined
}

/// Whether the site path names a directory.
pub fn is_dir(path: &str) -> bool {
    path.ends_with('/')
}

/// A site path split the way file-name templates see it.
#[derive(Debug, Clone, PartialEq)]
pub struct PathParts<'a> {
    /// Everything before the final segment, without trailing `/`.
    pub dir: &'a str,
    /// Final segment without its extension.
    pub name: &'a str,
    /// Extension including the leading dot, or empty.
    pub ext: &'a str,
}

/// Split a path into directory, file name, and extension.
///
/// - `"/guide/install.md"` → dir=`/guide`, name=`install`, ext=`.md`
/// - `"/archive.tar.gz"` → dir=``, name=`archive.tar`, ext=`.gz`
/// - `"/.nojekyll"` → dir=``, name=`.nojekyll`, ext=``
/// - `"index.md"` → dir=``, name=`index`, ext=`.md`
pub fn split(path: &str) -> PathParts<'_> {
    let trimmed = path.strip_suffix('/').unwrap_or(path);
    let (dir, base) = match trimmed.rfind('/') {
        Some(pos) => (&trimmed[..pos], &trimmed[pos + 1..]),
        None => ("", trimmed),
    };
    // A leading dot belongs to the name, not the extension
    let (name, ext) = match base.rfind('.') {
        Some(pos) if pos > 0 => (&base[..pos], &base[pos..]),
        _ => (base, ""),
    };
    PathParts { dir, name, ext }
}

/// Map a site path onto a filesystem root.
pub fn to_fs(root: &Path, path: &str) -> PathBuf {
    let relative = path.trim_start_matches('/');
    if relative.is_empty() {
        root.to_path_buf()
    } else {
        root.join(relative)
    }
}
