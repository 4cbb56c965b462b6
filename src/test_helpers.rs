//! Shared test utilities for the dirsite test suite.
//!
//! Provides a throwaway site builder, a compiler that records its calls, and
//! navigation tree assertions over resolved [`NavNode`] trees.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let site = TestSite::new();
//! site.manifest("/", "nav:\n  - {title: Guide, src: guide/}\n");
//! site.manifest("/guide/", "nav:\n  - {title: Install, src: install.md}\n");
//!
//! let root = resolve_tree(&site.options(vec![md_rule()])).unwrap();
//! assert_nav_shape(&root, &[("Guide", &["Install"][..])]);
//! ```

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use crate::compile::{CompileError, Compiler, CopyCompiler};
use crate::config::{self, CompileOptions};
use crate::rules::{Rule, RuleSet};
use crate::site_path;
use crate::types::NavNode;
use regex::Regex;

pub const TEST_SITE_NAME: &str = "Test Site";
pub const TEST_DIRINFO: &str = "@dirinfo.yml";

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/site/` to a temp directory and return it.
///
/// Tests get an isolated copy they can build into without affecting other
/// tests or the source fixtures. The copy goes through [`CopyCompiler`], the
/// same recursive copy static directories use.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    CopyCompiler.compile(&fixtures, tmp.path(), "").unwrap();
    tmp
}

/// Copy the fixture site and load its `site.toml`.
pub fn setup_fixture_options() -> (TempDir, CompileOptions) {
    let tmp = setup_fixtures();
    let options = config::load_options(&tmp.path().join("site.toml")).unwrap();
    (tmp, options)
}

// =========================================================================
// Ad-hoc sites
// =========================================================================

/// A site laid out in a temp directory: `<tmp>/src` in, `<tmp>/docs` out.
pub struct TestSite {
    tmp: TempDir,
}

impl TestSite {
    pub fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("src")).unwrap();
        Self { tmp }
    }

    pub fn root(&self) -> &Path {
        self.tmp.path()
    }

    pub fn src_root(&self) -> PathBuf {
        self.tmp.path().join("src")
    }

    pub fn dst_root(&self) -> PathBuf {
        self.tmp.path().join("docs")
    }

    /// Write the manifest of the directory at site path `dir`.
    pub fn manifest(&self, dir: &str, yaml: &str) {
        let dir = site_path::to_fs(&self.src_root(), dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(TEST_DIRINFO), yaml).unwrap();
    }

    /// Write a source file at site path `path`.
    pub fn file(&self, path: &str, content: &str) {
        let path = site_path::to_fs(&self.src_root(), path);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    pub fn options(&self, rules: Vec<Rule>) -> CompileOptions {
        CompileOptions {
            name: TEST_SITE_NAME.to_string(),
            src_root: self.src_root(),
            dst_root: self.dst_root(),
            dirinfo_name: TEST_DIRINFO.to_string(),
            index_name: "index.md".to_string(),
            rules: RuleSet::new(rules),
        }
    }
}

// =========================================================================
// Compilers and rules
// =========================================================================

/// One recorded [`Compiler::compile`] call.
#[derive(Debug, Clone)]
pub struct CompileCall {
    pub src: PathBuf,
    pub dst: PathBuf,
    pub nav: String,
}

/// Records every call and writes the source path into the destination.
///
/// Never reads the source, so tree-level tests need no content files.
#[derive(Debug, Default)]
pub struct RecordingCompiler {
    calls: Mutex<Vec<CompileCall>>,
}

impl RecordingCompiler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<CompileCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn navs(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.nav).collect()
    }

    /// Destination paths as site paths under `dst_root`, in call order.
    pub fn destinations(&self, dst_root: &Path) -> Vec<String> {
        self.calls()
            .iter()
            .map(|c| {
                let relative = c.dst.strip_prefix(dst_root).unwrap();
                let parts: Vec<String> = relative
                    .components()
                    .map(|part| part.as_os_str().to_string_lossy().into_owned())
                    .collect();
                format!("/{}", parts.join("/"))
            })
            .collect()
    }
}

impl Compiler for RecordingCompiler {
    fn compile(&self, src: &Path, dst: &Path, nav: &str) -> Result<(), CompileError> {
        self.calls.lock().unwrap().push(CompileCall {
            src: src.to_path_buf(),
            dst: dst.to_path_buf(),
            nav: nav.to_string(),
        });
        std::fs::create_dir_all(dst.parent().unwrap()).unwrap();
        std::fs::write(dst, src.to_string_lossy().as_bytes()).unwrap();
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

pub fn rule(test: &str, output: &str, compile: Arc<dyn Compiler>) -> Rule {
    Rule {
        test: Regex::new(test).unwrap(),
        output: output.to_string(),
        compile,
    }
}

/// `\.md$` → `[name].html`, compiled by a fresh [`RecordingCompiler`].
pub fn md_rule() -> Rule {
    rule(r"\.md$", "[name].html", RecordingCompiler::new())
}

// =========================================================================
// Navigation helpers
// =========================================================================

/// Titles of a directory's navigable children, in order.
pub fn nav_titles(node: &NavNode) -> Vec<&str> {
    node.children().iter().filter_map(NavNode::title).collect()
}

/// Child titles under a given nav parent. Panics if parent not found.
pub fn nav_children_titles<'a>(root: &'a NavNode, parent_title: &str) -> Vec<&'a str> {
    root.children()
        .iter()
        .find(|n| n.title() == Some(parent_title))
        .map(nav_titles)
        .unwrap_or_else(|| {
            let titles = nav_titles(root);
            panic!("nav item '{parent_title}' not found. Available: {titles:?}")
        })
}

/// Assert that the top two levels of navigation match an expected shape.
///
/// Each entry is `(title, children)`. Use `&[][..]` for leaf nodes.
pub fn assert_nav_shape(root: &NavNode, expected: &[(&str, &[&str])]) {
    let actual = nav_titles(root);
    let expected_titles: Vec<&str> = expected.iter().map(|(t, _)| *t).collect();
    assert_eq!(actual, expected_titles, "nav top-level titles mismatch");

    for (title, children) in expected {
        let actual_children = nav_children_titles(root, title);
        assert_eq!(
            actual_children,
            children.to_vec(),
            "nav children of '{title}' mismatch"
        );
    }
}

// =========================================================================
// Log capture
// =========================================================================

#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with every tracing event on this thread written to a string.
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (String, T) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let result = tracing::subscriber::with_default(subscriber, f);
    let logs = String::from_utf8_lossy(&buffer.0.lock().unwrap()).into_owned();
    (logs, result)
}
