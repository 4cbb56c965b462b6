//! Manifest-driven tree resolution.
//!
//! Expands the source root into a [`NavNode`] tree by following manifests,
//! never the filesystem listing:
//!
//! ```text
//! src/
//! ├── @dirinfo.yml        nav: [intro.md, guide/]   static: [logo.svg]
//! ├── index.md
//! ├── intro.md            → Content  /intro.md   → /intro.html
//! ├── logo.svg            → Static   /logo.svg   → /logo.svg
//! ├── guide/              → Directory /guide/ (its own @dirinfo.yml)
//! │   ├── @dirinfo.yml
//! │   └── ...
//! └── drafts/             (not listed anywhere: invisible)
//! ```
//!
//! ## Ordering
//!
//! A directory's children are its `nav` entries in declared order, followed
//! by its `static` entries in declared order. Siblings resolve in parallel on
//! the rayon pool; the output order is always the declared order.
//!
//! ## Validation
//!
//! - A `nav` directory entry that points back at the directory itself or one
//!   of its ancestors is a cycle and fails fast instead of recursing forever.
//! - Two siblings compiling to the same destination fail instead of silently
//!   overwriting each other. The directory's own index page counts as a
//!   sibling: a `nav` entry for `index.md` clashes with it.

use crate::config::CompileOptions;
use crate::manifest::{self, ManifestError};
use crate::rules::RuleSet;
use crate::site_path;
use crate::types::NavNode;
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    #[error("Directory {dir} lists {entry}, which is itself or an ancestor (chain: {chain})")]
    Cycle {
        dir: String,
        entry: String,
        chain: String,
    },
    #[error("Entries {first} and {second} in {dir} both compile to {dst}")]
    DuplicateDestination {
        dir: String,
        dst: String,
        first: String,
        second: String,
    },
}

/// A manifest entry waiting to be resolved.
enum Pending {
    Directory { title: String, src: String },
    Content { title: String, src: String },
    Static { src: String },
}

/// Resolves directories against one source root, manifest name and rule set.
pub struct Resolver<'a> {
    src_root: &'a Path,
    dirinfo_name: &'a str,
    index_name: &'a str,
    /// Destination file name of every directory's index page.
    index_dst: String,
    rules: &'a RuleSet,
}

impl<'a> Resolver<'a> {
    pub fn new(options: &'a CompileOptions) -> Self {
        let (index_dst, _) = options.rules.resolve_name(&options.index_name);
        Self {
            src_root: &options.src_root,
            dirinfo_name: &options.dirinfo_name,
            index_name: &options.index_name,
            index_dst,
            rules: &options.rules,
        }
    }

    /// Resolve the whole site under the synthetic root directory.
    pub fn resolve_root(&self, title: &str) -> Result<NavNode, ResolveError> {
        let children = self.resolve_dir("/")?;
        Ok(NavNode::root(title, children))
    }

    /// Resolve the children of one directory, given as a site path.
    pub fn resolve_dir(&self, dir: &str) -> Result<Vec<NavNode>, ResolveError> {
        self.resolve_in(dir, &[])
    }

    fn resolve_in(&self, dir: &str, ancestors: &[&str]) -> Result<Vec<NavNode>, ResolveError> {
        let manifest =
            manifest::load_manifest(&site_path::to_fs(self.src_root, dir), self.dirinfo_name)?;

        let chain: Vec<&str> = ancestors.iter().copied().chain([dir]).collect();

        let mut pending = Vec::with_capacity(manifest.nav.len() + manifest.static_files().len());
        for entry in &manifest.nav {
            let src = site_path::join(dir, &entry.src);
            if site_path::is_dir(&src) {
                if chain.contains(&src.as_str()) {
                    return Err(ResolveError::Cycle {
                        dir: dir.to_string(),
                        entry: entry.src.clone(),
                        chain: chain.join(" -> "),
                    });
                }
                pending.push(Pending::Directory {
                    title: entry.title.clone(),
                    src,
                });
            } else {
                pending.push(Pending::Content {
                    title: entry.title.clone(),
                    src,
                });
            }
        }
        for name in manifest.static_files() {
            pending.push(Pending::Static {
                src: site_path::join(dir, name),
            });
        }

        let children = pending
            .into_par_iter()
            .map(|entry| self.resolve_entry(entry, &chain))
            .collect::<Result<Vec<_>, _>>()?;

        let index = (
            site_path::join(dir, &self.index_dst),
            site_path::join(dir, self.index_name),
        );
        check_unique_destinations(dir, &index, &children)?;
        debug!("resolved {dir}: {} entries", children.len());
        Ok(children)
    }

    fn resolve_entry(&self, entry: Pending, chain: &[&str]) -> Result<NavNode, ResolveError> {
        match entry {
            Pending::Directory { title, src } => {
                let children = self.resolve_in(&src, chain)?;
                Ok(NavNode::Directory {
                    dst: src.clone(),
                    src,
                    title,
                    children,
                })
            }
            Pending::Content { title, src } => {
                let target = self.rules.resolve(&src);
                Ok(NavNode::Content {
                    src: target.src,
                    dst: target.dst,
                    title,
                    compile: target.compile,
                })
            }
            Pending::Static { src } => {
                let target = self.rules.resolve(&src);
                Ok(NavNode::Static {
                    src: target.src,
                    dst: target.dst,
                    compile: target.compile,
                })
            }
        }
    }
}

/// `index` is the `(dst, src)` pair of the directory's own index page.
fn check_unique_destinations(
    dir: &str,
    index: &(String, String),
    children: &[NavNode],
) -> Result<(), ResolveError> {
    let mut seen: HashMap<&str, &str> = HashMap::with_capacity(children.len() + 1);
    seen.insert(&index.0, &index.1);
    for child in children {
        if let Some(first) = seen.insert(child.dst(), child.src()) {
            return Err(ResolveError::DuplicateDestination {
                dir: dir.to_string(),
                dst: child.dst().to_string(),
                first: first.to_string(),
                second: child.src().to_string(),
            });
        }
    }
    Ok(())
}

/// Resolve the full site tree for a build.
pub fn resolve_tree(options: &CompileOptions) -> Result<NavNode, ResolveError> {
    Resolver::new(options).resolve_root(&options.name)
}
