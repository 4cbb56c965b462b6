//! Build orchestration: resolve, render navigation, clear, compile.
//!
//! ```text
//! site.toml ──► CompileOptions
//!                   │
//!                   ▼
//!         tree::resolve_tree ──► NavNode tree
//!                   │                 │
//!                   ▼                 ▼
//!            nav::render_nav    compile_tree ──► dst_root/
//! ```
//!
//! ## Compilation Order
//!
//! Every directory, the root included, compiles its index page and all of its
//! children concurrently. A directory is done once its index and every child
//! subtree are done. The only ordering guarantee is that a node's destination
//! directory exists before anything writes into it.
//!
//! The first failure aborts the build. Siblings already running are not
//! cancelled; their results are discarded.

use crate::compile::{CompileError, Compiler};
use crate::config::CompileOptions;
use crate::nav;
use crate::site_path;
use crate::tree::{self, ResolveError};
use crate::types::NavNode;
use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error("Destination {} contains the source root {}", dst_root.display(), src_root.display())]
    Overlap { src_root: PathBuf, dst_root: PathBuf },
    #[error("Failed to clear {}", path.display())]
    Clear {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to create directory {}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to compile {src} -> {dst}")]
    Compile {
        src: String,
        dst: String,
        #[source]
        source: CompileError,
    },
}

/// What a build produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Directories, root included. Each produced one index page.
    pub directories: usize,
    pub content: usize,
    pub statics: usize,
}

impl BuildReport {
    pub fn from_tree(root: &NavNode) -> Self {
        let mut report = Self::default();
        report.count(root);
        report
    }

    fn count(&mut self, node: &NavNode) {
        match node {
            NavNode::Directory { children, .. } => {
                self.directories += 1;
                for child in children {
                    self.count(child);
                }
            }
            NavNode::Content { .. } => self.content += 1,
            NavNode::Static { .. } => self.statics += 1,
        }
    }

    pub fn index_pages(&self) -> usize {
        self.directories
    }
}

/// Run a complete build.
pub fn build_site(options: &CompileOptions) -> Result<BuildReport, BuildError> {
    info!("Resolving {}", options.src_root.display());
    let root = tree::resolve_tree(options)?;
    let nav = nav::render_nav(root.children(), &options.name);

    if options.src_root.starts_with(&options.dst_root) {
        return Err(BuildError::Overlap {
            src_root: options.src_root.clone(),
            dst_root: options.dst_root.clone(),
        });
    }

    info!("Clearing {}", options.dst_root.display());
    clear_dir(&options.dst_root)?;

    info!("Compiling into {}", options.dst_root.display());
    compile_tree(options, &root, &nav)?;

    Ok(BuildReport::from_tree(&root))
}

/// Remove every entry inside `dir`, keeping `dir` itself.
///
/// A directory that cannot be listed (typically: does not exist yet) is left
/// alone. Entries that vanish while being removed are not errors, but an
/// entry that cannot be read is: it might be stale output.
pub fn clear_dir(dir: &Path) -> Result<(), BuildError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("Nothing to clear at {}", dir.display());
            return Ok(());
        }
        Err(e) => {
            warn!("Not clearing {}: {e}", dir.display());
            return Ok(());
        }
    };
    let paths = entry_paths(dir, entries.map(|entry| entry.map(|e| e.path())))?;

    paths.par_iter().try_for_each(|path| {
        let result = match fs::symlink_metadata(path) {
            Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
            Ok(_) => fs::remove_file(path),
            Err(e) => Err(e),
        };
        match result {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(BuildError::Clear {
                path: path.clone(),
                source: e,
            }),
            _ => Ok(()),
        }
    })
}

fn entry_paths(
    dir: &Path,
    entries: impl Iterator<Item = io::Result<PathBuf>>,
) -> Result<Vec<PathBuf>, BuildError> {
    entries
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| BuildError::Clear {
            path: dir.to_path_buf(),
            source,
        })
}

/// Compile a resolved tree into the destination root.
///
/// The index compiler and its destination name are resolved once from
/// `options.index_name` and reused for every directory.
pub fn compile_tree(options: &CompileOptions, root: &NavNode, nav: &str) -> Result<(), BuildError> {
    let (index_dst, index_compile) = options.rules.resolve_name(&options.index_name);
    let job = CompileJob {
        options,
        nav,
        index_dst,
        index_compile,
    };
    job.compile_node(root)
}

struct CompileJob<'a> {
    options: &'a CompileOptions,
    nav: &'a str,
    index_dst: String,
    index_compile: Arc<dyn Compiler>,
}

impl CompileJob<'_> {
    fn compile_node(&self, node: &NavNode) -> Result<(), BuildError> {
        let src_path = site_path::to_fs(&self.options.src_root, node.src());
        let dst_path = site_path::to_fs(&self.options.dst_root, node.dst());

        match node {
            NavNode::Directory {
                src, dst, children, ..
            } => {
                create_dir(&dst_path)?;
                let (index, subtree) = rayon::join(
                    || {
                        self.run(
                            self.index_compile.as_ref(),
                            site_path::join(src, &self.options.index_name),
                            site_path::join(dst, &self.index_dst),
                            &src_path.join(&self.options.index_name),
                            &dst_path.join(&self.index_dst),
                        )
                    },
                    || {
                        children
                            .par_iter()
                            .try_for_each(|child| self.compile_node(child))
                    },
                );
                index.and(subtree)
            }
            NavNode::Content {
                src, dst, compile, ..
            }
            | NavNode::Static { src, dst, compile } => {
                if let Some(parent) = dst_path.parent() {
                    create_dir(parent)?;
                }
                self.run(
                    compile.as_ref(),
                    src.clone(),
                    dst.clone(),
                    &src_path,
                    &dst_path,
                )
            }
        }
    }

    fn run(
        &self,
        compile: &dyn Compiler,
        src: String,
        dst: String,
        src_path: &Path,
        dst_path: &Path,
    ) -> Result<(), BuildError> {
        match compile.compile(src_path, dst_path, self.nav) {
            Ok(()) => {
                debug!("{src} -> {dst}");
                Ok(())
            }
            Err(source) => Err(BuildError::Compile { src, dst, source }),
        }
    }
}

fn create_dir(path: &Path) -> Result<(), BuildError> {
    fs::create_dir_all(path).map_err(|source| BuildError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}
