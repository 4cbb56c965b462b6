//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Each navigation entry
//! leads with its positional index and title, the way a reader sees it in the
//! rendered navigation; source paths and compilers are secondary context on
//! indented `Source:` lines. Static entries have no position since they never
//! appear in navigation.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! My Docs → /index.html
//! 001 Getting Started → /intro.html
//!     Source: /intro.md (markdown)
//! 002 Guide → /guide/
//!     001 Install → /guide/install.html
//!         Source: /guide/install.md (markdown)
//!     Static: /guide/assets/ → /guide/assets/ (copy)
//! Static: /logo.svg → /logo.svg (copy)
//! ```
//!
//! ## Build
//!
//! ```text
//! Built 3 directories, 3 pages, 2 static files
//!     Output: /home/me/project/docs
//! ```
//!
//! ## Errors
//!
//! ```text
//! [ERROR] Failed to compile /intro.md -> /intro.html
//!     Caused by: IO error on /home/me/project/src/intro.md: No such file or directory (os error 2)
//! ```
//!
//! # Architecture
//!
//! Each display has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout, or stderr for
//! errors. Format functions are pure: no I/O, no side effects.

use crate::build::BuildReport;
use crate::types::NavNode;
use std::error::Error;
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(count: usize, one: &str, many: &str) -> String {
    if count == 1 {
        format!("{count} {one}")
    } else {
        format!("{count} {many}")
    }
}

// ============================================================================
// Check: resolved tree
// ============================================================================

/// Format the resolved site tree.
///
/// `index_dst` is the destination file name of each directory's index page,
/// shown on the root line.
pub fn format_tree(root: &NavNode, index_dst: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let title = root.title().unwrap_or_default();
    lines.push(format!("{title} → {}{index_dst}", root.dst()));
    format_children(root.children(), 0, &mut lines);
    lines
}

fn format_children(children: &[NavNode], depth: usize, lines: &mut Vec<String>) {
    let pad = indent(depth);
    let mut position = 0;
    for child in children {
        match child {
            NavNode::Directory {
                title,
                dst,
                children,
                ..
            } => {
                position += 1;
                lines.push(format!("{pad}{} {title} → {dst}", format_index(position)));
                format_children(children, depth + 1, lines);
            }
            NavNode::Content {
                title,
                src,
                dst,
                compile,
            } => {
                position += 1;
                lines.push(format!("{pad}{} {title} → {dst}", format_index(position)));
                lines.push(format!("{pad}    Source: {src} ({})", compile.name()));
            }
            NavNode::Static { src, dst, compile } => {
                lines.push(format!("{pad}Static: {src} → {dst} ({})", compile.name()));
            }
        }
    }
}

pub fn print_tree(root: &NavNode, index_dst: &str) {
    for line in format_tree(root, index_dst) {
        println!("{line}");
    }
}

// ============================================================================
// Build summary
// ============================================================================

pub fn format_build_report(report: &BuildReport, dst_root: &Path) -> Vec<String> {
    vec![
        format!(
            "Built {}, {}, {}",
            plural(report.directories, "directory", "directories"),
            plural(report.content, "page", "pages"),
            plural(report.statics, "static file", "static files"),
        ),
        format!("{}Output: {}", indent(1), dst_root.display()),
    ]
}

pub fn print_build_report(report: &BuildReport, dst_root: &Path) {
    for line in format_build_report(report, dst_root) {
        println!("{line}");
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Format an error and its chain of causes.
///
/// A cause whose message the previous line already ends with is skipped, so
/// wrappers that quote their source do not print it twice.
pub fn format_error(err: &dyn Error) -> Vec<String> {
    let mut lines = vec![format!("[ERROR] {err}")];
    let mut cause = err.source();
    while let Some(inner) = cause {
        let message = inner.to_string();
        let repeated = lines.last().is_some_and(|prev| prev.ends_with(&message));
        if !repeated {
            lines.push(format!("{}Caused by: {message}", indent(1)));
        }
        cause = inner.source();
    }
    lines
}

pub fn print_error(err: &dyn Error) {
    for line in format_error(err) {
        eprintln!("{line}");
    }
}
