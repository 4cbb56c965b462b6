//! Per-directory manifest loading.
//!
//! Every directory that takes part in the site carries a manifest (by
//! default `@dirinfo.yml`) declaring what it contains and in which order:
//!
//! ```yaml
//! nav:
//!   - title: Getting Started
//!     src: intro.md
//!   - title: Guide
//!     src: guide/          # trailing slash = subdirectory
//! static:
//!   - logo.svg
//!   - assets/
//! ```
//!
//! `nav` entries appear in the navigation in the listed order; `static`
//! entries are compiled but never shown. Files and directories not listed
//! are ignored, whatever the filesystem contains.
//!
//! Loading distinguishes two failures: the file could not be read or is not
//! YAML at all ([`ManifestError::Read`]), or it is YAML of the wrong shape
//! ([`ManifestError::Schema`]). Unknown keys are schema errors.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Fail to open file {file_name} in {}", dir.display())]
    Read {
        dir: PathBuf,
        file_name: String,
        #[source]
        source: ReadFailure,
    },
    #[error("Invalid {file_name} in {}: {detail}", dir.display())]
    Schema {
        dir: PathBuf,
        file_name: String,
        detail: String,
    },
}

/// Underlying cause of [`ManifestError::Read`].
#[derive(Error, Debug)]
pub enum ReadFailure {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

/// Parsed contents of one directory's manifest.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Navigation entries, in display order.
    pub nav: Vec<NavEntry>,
    /// Files (or directories) compiled without a navigation entry.
    #[serde(default, rename = "static")]
    pub static_files: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NavEntry {
    pub title: String,
    /// Path relative to the manifest's directory; `name/` for a subdirectory.
    pub src: String,
}

impl Manifest {
    /// Static entries, empty when the key is absent or null.
    pub fn static_files(&self) -> &[String] {
        self.static_files.as_deref().unwrap_or_default()
    }

    /// Checks serde cannot express.
    fn validate(&self) -> Result<(), String> {
        for (i, entry) in self.nav.iter().enumerate() {
            if entry.title.trim().is_empty() {
                return Err(format!("nav[{i}].title must not be empty"));
            }
            if entry.src.trim().is_empty() {
                return Err(format!("nav[{i}].src must not be empty"));
            }
        }
        for (i, src) in self.static_files().iter().enumerate() {
            if src.trim().is_empty() {
                return Err(format!("static[{i}] must not be empty"));
            }
        }
        Ok(())
    }
}

/// Load and validate `<dir>/<file_name>`.
pub fn load_manifest(dir: &Path, file_name: &str) -> Result<Manifest, ManifestError> {
    let read_error = |source: ReadFailure| ManifestError::Read {
        dir: dir.to_path_buf(),
        file_name: file_name.to_string(),
        source,
    };
    let schema_error = |detail: String| ManifestError::Schema {
        dir: dir.to_path_buf(),
        file_name: file_name.to_string(),
        detail,
    };

    let content =
        fs::read_to_string(dir.join(file_name)).map_err(|e| read_error(ReadFailure::Io(e)))?;
    let value: serde_yaml::Value =
        serde_yaml::from_str(&content).map_err(|e| read_error(ReadFailure::Yaml(e)))?;

    let manifest: Manifest =
        serde_yaml::from_value(value).map_err(|e| schema_error(e.to_string()))?;
    manifest.validate().map_err(schema_error)?;
    Ok(manifest)
}
