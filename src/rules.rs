//! Rule matching: source path → destination path and compiler.
//!
//! Rules are tried in declared order and the first whose pattern matches the
//! source site path wins. Its `output` template names the destination file,
//! relative to the source file's directory:
//!
//! ```text
//! test = '\.md$'    output = "[name].html"    /guide/install.md → /guide/install.html
//! test = '\.scss$'  output = "[name].css"     /theme.scss       → /theme.css
//! (no match)                                  /logo.svg         → /logo.svg (copy)
//! ```
//!
//! Matching is total: a path no rule claims is copied verbatim to the same
//! relative location.

use crate::compile::{Compiler, CopyCompiler};
use crate::site_path;
use regex::Regex;
use std::sync::Arc;

/// A single pattern → template → compiler mapping.
#[derive(Debug, Clone)]
pub struct Rule {
    pub test: Regex,
    /// Destination file template; `[name]` and `[ext]` are substituted.
    pub output: String,
    pub compile: Arc<dyn Compiler>,
}

/// Where one source file goes and how it gets there.
#[derive(Debug, Clone)]
pub struct FileTarget {
    pub src: String,
    pub dst: String,
    pub compile: Arc<dyn Compiler>,
}

/// The ordered rule list plus the copy fallback.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<Rule>,
    fallback: Arc<dyn Compiler>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self {
            rules,
            fallback: Arc::new(CopyCompiler),
        }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    fn matching(&self, path: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.test.is_match(path))
    }

    /// Map a source site path to its destination and compiler.
    pub fn resolve(&self, src: &str) -> FileTarget {
        match self.matching(src) {
            Some(rule) => {
                let parts = site_path::split(src);
                let file = expand_output(&rule.output, parts.name, parts.ext);
                FileTarget {
                    src: src.to_string(),
                    dst: site_path::join(parts.dir, &file),
                    compile: Arc::clone(&rule.compile),
                }
            }
            None => FileTarget {
                src: src.to_string(),
                dst: src.to_string(),
                compile: Arc::clone(&self.fallback),
            },
        }
    }

    /// Resolve a bare file name, such as the per-directory index name.
    ///
    /// Returns the destination file name (relative, possibly with its own
    /// subdirectory if the template has one) and the compiler.
    pub fn resolve_name(&self, name: &str) -> (String, Arc<dyn Compiler>) {
        match self.matching(name) {
            Some(rule) => {
                let parts = site_path::split(name);
                (
                    expand_output(&rule.output, parts.name, parts.ext),
                    Arc::clone(&rule.compile),
                )
            }
            None => (name.to_string(), Arc::clone(&self.fallback)),
        }
    }
}

/// Substitute every `[name]` and `[ext]` in `template`.
///
/// Single pass: text coming from `name` or `ext` is never re-scanned, so a
/// file literally called `[ext].md` does not get substituted twice.
pub fn expand_output(template: &str, name: &str, ext: &str) -> String {
    let mut out = String::with_capacity(template.len() + name.len() + ext.len());
    let mut rest = template;
    while let Some(pos) = rest.find('[') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        if let Some(after) = tail.strip_prefix("[name]") {
            out.push_str(name);
            rest = after;
        } else if let Some(after) = tail.strip_prefix("[ext]") {
            out.push_str(ext);
            rest = after;
        } else {
            out.push('[');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}
