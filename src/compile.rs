//! Pluggable file compilers.
//!
//! A [`Compiler`] turns one source path into output at a destination path,
//! given the rendered navigation fragment. The build never looks inside a
//! compiler: it calls [`Compiler::compile`] and waits for success or failure.
//!
//! Three built-in compilers can be named from `site.toml` rules:
//!
//! | Name | Behaviour |
//! |------|-----------|
//! | `copy` | Recursive verbatim copy of a file or directory (the fallback) |
//! | `markdown` | Markdown → full HTML page with the navigation injected |
//! | `html` | HTML fragment → full HTML page with the navigation injected |
//!
//! Library users can supply their own: any `Fn(&Path, &Path, &str)` closure
//! returning `Result<(), CompileError>` is a compiler.

use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Options, Parser, html as md_html};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum CompileError {
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to walk {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("{0}")]
    Failed(String),
}

impl CompileError {
    fn io(path: &Path) -> impl FnOnce(std::io::Error) -> Self + '_ {
        move |source| CompileError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Transforms a source path into output at a destination path.
///
/// Called concurrently from the rayon pool, hence `Send + Sync`. Each call
/// owns its destination path exclusively; no two calls in one build write
/// to the same destination.
pub trait Compiler: Send + Sync {
    fn compile(&self, src: &Path, dst: &Path, nav: &str) -> Result<(), CompileError>;

    /// Short label used in `check` output and debug logs.
    fn name(&self) -> &str {
        "custom"
    }
}

impl<F> Compiler for F
where
    F: Fn(&Path, &Path, &str) -> Result<(), CompileError> + Send + Sync,
{
    fn compile(&self, src: &Path, dst: &Path, nav: &str) -> Result<(), CompileError> {
        self(src, dst, nav)
    }
}

impl fmt::Debug for dyn Compiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Compiler({})", self.name())
    }
}

/// Names accepted by [`builtin`].
pub const BUILTIN_NAMES: &[&str] = &["copy", "markdown", "html"];

/// Look up a built-in compiler by the name used in `site.toml`.
pub fn builtin(name: &str) -> Option<Arc<dyn Compiler>> {
    match name {
        "copy" => Some(Arc::new(CopyCompiler)),
        "markdown" => Some(Arc::new(MarkdownCompiler)),
        "html" => Some(Arc::new(HtmlCompiler)),
        _ => None,
    }
}

// ============================================================================
// Copy
// ============================================================================

/// Copies the source verbatim. Directories are copied recursively.
#[derive(Debug, Clone, Copy, Default)]
pub struct CopyCompiler;

impl Compiler for CopyCompiler {
    fn compile(&self, src: &Path, dst: &Path, _nav: &str) -> Result<(), CompileError> {
        let metadata = fs::metadata(src).map_err(CompileError::io(src))?;
        if metadata.is_dir() {
            copy_dir_recursive(src, dst)
        } else {
            ensure_parent(dst)?;
            fs::copy(src, dst).map_err(CompileError::io(dst))?;
            Ok(())
        }
    }

    fn name(&self) -> &str {
        "copy"
    }
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<(), CompileError> {
    for entry in WalkDir::new(src) {
        let entry = entry.map_err(|source| CompileError::Walk {
            path: src.to_path_buf(),
            source,
        })?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| CompileError::Failed(e.to_string()))?;
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(CompileError::io(&target))?;
        } else {
            fs::copy(entry.path(), &target).map_err(CompileError::io(&target))?;
        }
    }
    Ok(())
}

fn ensure_parent(dst: &Path) -> Result<(), CompileError> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent).map_err(CompileError::io(parent))?;
    }
    Ok(())
}

// ============================================================================
// Markdown and HTML pages
// ============================================================================

const CSS: &str = include_str!("../static/style.css");

/// Renders markdown into a standalone page.
///
/// The page title is the first `# ` heading, or the file stem when the
/// document has none.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownCompiler;

impl Compiler for MarkdownCompiler {
    fn compile(&self, src: &Path, dst: &Path, nav: &str) -> Result<(), CompileError> {
        let source = fs::read_to_string(src).map_err(CompileError::io(src))?;
        let title = markdown_title(&source).unwrap_or_else(|| file_stem(src));

        let mut body = String::new();
        let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
        md_html::push_html(&mut body, Parser::new_ext(&source, options));

        write_page(dst, page_document(&title, nav, &body))
    }

    fn name(&self) -> &str {
        "markdown"
    }
}

/// Wraps an HTML fragment in the page shell. Title is the file stem.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlCompiler;

impl Compiler for HtmlCompiler {
    fn compile(&self, src: &Path, dst: &Path, nav: &str) -> Result<(), CompileError> {
        let fragment = fs::read_to_string(src).map_err(CompileError::io(src))?;
        write_page(dst, page_document(&file_stem(src), nav, &fragment))
    }

    fn name(&self) -> &str {
        "html"
    }
}

fn write_page(dst: &Path, page: Markup) -> Result<(), CompileError> {
    ensure_parent(dst)?;
    fs::write(dst, page.into_string()).map_err(CompileError::io(dst))
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Title from the first `# heading` line.
fn markdown_title(source: &str) -> Option<String> {
    source
        .lines()
        .find(|line| line.starts_with("# "))
        .map(|line| line.trim_start_matches("# ").trim().to_string())
        .filter(|title| !title.is_empty())
}

/// Full HTML document: navigation sidebar plus the rendered body.
///
/// `nav` and `body` are already HTML and are inserted verbatim.
fn page_document(title: &str, nav: &str, body: &str) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(CSS)) }
            }
            body {
                (PreEscaped(nav))
                main.page-content {
                    (PreEscaped(body))
                }
            }
        }
    }
}
