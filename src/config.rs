//! Site configuration module.
//!
//! Handles loading and validating `site.toml`, then turning it into the
//! immutable [`CompileOptions`] every other module receives by reference.
//!
//! ## Config File Location
//!
//! The config path comes from `--config`, else the `SITE_CONFIG` environment
//! variable, else `./site.toml`. Relative roots resolve against the directory
//! holding the config file:
//!
//! ```text
//! project/
//! ├── site.toml            # name, rules, roots
//! ├── src/                 # src_root (default)
//! │   ├── @dirinfo.yml
//! │   └── index.md
//! └── docs/                # dst_root (default), cleared on every build
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! name = "My Docs"                 # Required: site name shown as nav home link
//! src_root = "src"                 # Source tree
//! dst_root = "docs"                # Output tree
//! dirinfo_name = "@dirinfo.yml"    # Per-directory manifest file name
//! index_name = "index.md"          # Per-directory index source file name
//!
//! [[rules]]                        # First matching rule wins
//! test = '\.md$'                   # Regex tested against /path/from/src_root
//! output = "[name].html"           # [name] = stem, [ext] = extension with dot
//! compile = "markdown"             # copy | markdown | html
//! ```
//!
//! The camelCase spellings `srcRoot`, `dstRoot`, `dirinfoName` and
//! `indexName` are accepted as aliases. Unknown keys are rejected to catch
//! typos early.

use crate::compile::{self, BUILTIN_NAMES};
use crate::rules::{Rule, RuleSet};
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file {} does not exist", .0.display())]
    Missing(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "site.toml";

/// Site configuration as written in `site.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Site name, rendered as the navigation home link.
    pub name: String,
    /// Source root; `<config dir>/src` when absent.
    #[serde(default, alias = "srcRoot")]
    pub src_root: Option<PathBuf>,
    /// Destination root; `<config dir>/docs` when absent.
    #[serde(default, alias = "dstRoot")]
    pub dst_root: Option<PathBuf>,
    /// Manifest file name looked up in every directory.
    #[serde(default = "default_dirinfo_name", alias = "dirinfoName")]
    pub dirinfo_name: String,
    /// Index source file name compiled once per directory.
    #[serde(default = "default_index_name", alias = "indexName")]
    pub index_name: String,
    /// Ordered compile rules.
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

/// One `[[rules]]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleConfig {
    /// Regular expression tested against the source site path.
    pub test: String,
    /// Destination file name template.
    pub output: String,
    /// Built-in compiler name.
    #[serde(default = "default_compiler")]
    pub compile: String,
}

fn default_dirinfo_name() -> String {
    "@dirinfo.yml".to_string()
}

fn default_index_name() -> String {
    "index.md".to_string()
}

fn default_compiler() -> String {
    "copy".to_string()
}

impl SiteConfig {
    /// Validate values serde cannot check.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Validation("name must not be empty".into()));
        }
        for (key, value) in [
            ("dirinfo_name", &self.dirinfo_name),
            ("index_name", &self.index_name),
        ] {
            if value.is_empty() || value.contains('/') {
                return Err(ConfigError::Validation(format!(
                    "{key} must be a plain file name, got {value:?}"
                )));
            }
        }
        for (i, rule) in self.rules.iter().enumerate() {
            rule.validate()
                .map_err(|msg| ConfigError::Validation(format!("rules[{i}]: {msg}")))?;
        }
        Ok(())
    }
}

impl RuleConfig {
    fn validate(&self) -> Result<(), String> {
        Regex::new(&self.test).map_err(|e| format!("invalid test pattern: {e}"))?;
        if self.output.is_empty() {
            return Err("output must not be empty".into());
        }
        if compile::builtin(&self.compile).is_none() {
            return Err(format!(
                "unknown compiler {:?} (expected one of: {})",
                self.compile,
                BUILTIN_NAMES.join(", ")
            ));
        }
        Ok(())
    }

    fn to_rule(&self) -> Result<Rule, ConfigError> {
        let test = Regex::new(&self.test)
            .map_err(|e| ConfigError::Validation(format!("invalid test pattern: {e}")))?;
        let compile = compile::builtin(&self.compile)
            .ok_or_else(|| ConfigError::Validation(format!("unknown compiler {:?}", self.compile)))?;
        Ok(Rule {
            test,
            output: self.output.clone(),
            compile,
        })
    }
}

/// Everything a build needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    pub name: String,
    /// Absolute source root.
    pub src_root: PathBuf,
    /// Absolute destination root.
    pub dst_root: PathBuf,
    pub dirinfo_name: String,
    pub index_name: String,
    pub rules: RuleSet,
}

impl CompileOptions {
    /// Resolve a validated config against the directory it was loaded from.
    pub fn from_config(config: &SiteConfig, config_dir: &Path) -> Result<Self, ConfigError> {
        config.validate()?;
        let root = |value: &Option<PathBuf>, default: &str| -> Result<PathBuf, ConfigError> {
            let relative = value.clone().unwrap_or_else(|| PathBuf::from(default));
            Ok(std::path::absolute(config_dir.join(relative))?)
        };
        let rules = config
            .rules
            .iter()
            .map(RuleConfig::to_rule)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: config.name.clone(),
            src_root: root(&config.src_root, "src")?,
            dst_root: root(&config.dst_root, "docs")?,
            dirinfo_name: config.dirinfo_name.clone(),
            index_name: config.index_name.clone(),
            rules: RuleSet::new(rules),
        })
    }
}

/// Load and validate a config file.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::Missing(path.to_path_buf()));
    }
    let content = fs::read_to_string(path)?;
    let config: SiteConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Load a config file and resolve it into [`CompileOptions`].
pub fn load_options(path: &Path) -> Result<CompileOptions, ConfigError> {
    let config = load_config(path)?;
    let config_dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    CompileOptions::from_config(&config, &config_dir)
}

/// Returns a fully-commented stock `site.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# dirsite configuration
# =====================
# Only `name` is required. Values shown below are the defaults.
# Relative paths resolve against the directory holding this file.
# Unknown keys will cause an error.

# Site name, shown as the home link at the top of the navigation.
name = "My Site"

# Source tree. Every directory that takes part in the site needs a manifest.
src_root = "src"

# Output tree. It is cleared at the start of every build.
dst_root = "docs"

# Per-directory manifest file name.
dirinfo_name = "@dirinfo.yml"

# Per-directory index source file, compiled once in every directory.
index_name = "index.md"

# ---------------------------------------------------------------------------
# Compile rules
# ---------------------------------------------------------------------------
# Rules are tried in order; the first whose `test` regex matches the source
# path (e.g. "/guide/install.md") wins. `output` names the destination file
# next to the source: [name] is the file name without extension, [ext] the
# extension including the dot. Files no rule matches are copied as-is.
#
# Available compilers:
#   copy      copy the file or directory verbatim
#   markdown  render markdown into a page with the navigation
#   html      wrap an HTML fragment into a page with the navigation

[[rules]]
test = '\.md$'
output = "[name].html"
compile = "markdown"

[[rules]]
test = '\.htm$'
output = "[name].html"
compile = "html"
"##
}
