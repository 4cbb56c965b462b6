//! # dirsite
//!
//! A manifest-driven static site compiler. Every directory declares, in a
//! small YAML manifest, which files it publishes and in which order. Files
//! are compiled by pattern rules into a mirrored output tree, and every page
//! receives the same navigation fragment built from the declared order, not
//! from whatever the filesystem happens to list.
//!
//! # Architecture: Resolve, Render, Compile
//!
//! ```text
//! 1. Resolve   src/ + @dirinfo.yml  →  NavNode tree     (manifests → structured data)
//! 2. Render    NavNode tree         →  <nav> fragment   (one string for every page)
//! 3. Compile   NavNode tree + nav   →  docs/            (rules pick a compiler per file)
//! ```
//!
//! The tree is built once and never mutated; rendering and compiling only
//! read it. Both resolution and compilation fan out across siblings on the
//! rayon pool, and both keep the declared order wherever order is visible.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`manifest`] | Loads and validates one directory's `@dirinfo.yml` |
//! | [`rules`] | First-match rule lookup: source path → destination path + compiler |
//! | [`tree`] | Recursive resolution of manifests into the [`types::NavNode`] tree |
//! | [`nav`] | Renders the navigation fragment, with HTML escaping |
//! | [`build`] | Clears the output and compiles the tree: index pages, content, statics |
//! | [`compile`] | The [`compile::Compiler`] trait and the built-in copy/markdown/html compilers |
//! | [`config`] | `site.toml` loading and validation into [`config::CompileOptions`] |
//! | [`site_path`] | `/`-rooted site path joining and splitting |
//! | [`types`] | The resolved tree type shared by every stage |
//! | [`output`] | CLI output formatting for trees, build summaries and errors |
//!
//! # Design Decisions
//!
//! ## Manifests Over Directory Listings
//!
//! A directory's content is exactly what its manifest lists. Unlisted files
//! and subdirectories are invisible: drafts can live next to published pages
//! without any ignore rules, and navigation order is whatever the author
//! wrote rather than an alphabetical accident.
//!
//! ## Opaque Compilers
//!
//! The build never inspects what a compiler does. It hands over a source
//! path, a destination path and the navigation fragment, and waits. Adding a
//! format means adding a [`compile::Compiler`], with no change to the
//! traversal.
//!
//! ## Fail Fast
//!
//! The first error aborts the run with the path that caused it. Cycles
//! between manifests and two entries compiling to the same destination are
//! errors, not silent overwrites.

pub mod build;
pub mod compile;
pub mod config;
pub mod manifest;
pub mod nav;
pub mod output;
pub mod rules;
pub mod site_path;
pub mod tree;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
