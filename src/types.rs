//! The resolved site tree.
//!
//! Built once by [`crate::tree`], then read by both the navigation renderer
//! and the build. Nothing mutates it after resolution.

use crate::compile::Compiler;
use serde::{Serialize, Serializer};
use std::sync::Arc;

/// One node of the resolved site.
///
/// `src` and `dst` are site paths (see [`crate::site_path`]) relative to the
/// source and destination roots.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NavNode {
    /// A subdirectory with its own manifest. `dst` ends with `/`.
    Directory {
        src: String,
        dst: String,
        title: String,
        children: Vec<NavNode>,
    },
    /// A navigation entry backed by a file.
    Content {
        src: String,
        dst: String,
        title: String,
        #[serde(rename = "compiler", serialize_with = "compiler_name")]
        compile: Arc<dyn Compiler>,
    },
    /// Compiled but never shown in navigation.
    Static {
        src: String,
        dst: String,
        #[serde(rename = "compiler", serialize_with = "compiler_name")]
        compile: Arc<dyn Compiler>,
    },
}

fn compiler_name<S: Serializer>(compile: &Arc<dyn Compiler>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(compile.name())
}

impl NavNode {
    /// The synthetic site root: `src = dst = "/"`.
    pub fn root(title: impl Into<String>, children: Vec<NavNode>) -> Self {
        NavNode::Directory {
            src: "/".to_string(),
            dst: "/".to_string(),
            title: title.into(),
            children,
        }
    }

    pub fn src(&self) -> &str {
        match self {
            NavNode::Directory { src, .. }
            | NavNode::Content { src, .. }
            | NavNode::Static { src, .. } => src,
        }
    }

    pub fn dst(&self) -> &str {
        match self {
            NavNode::Directory { dst, .. }
            | NavNode::Content { dst, .. }
            | NavNode::Static { dst, .. } => dst,
        }
    }

    /// Navigation title; static nodes have none.
    pub fn title(&self) -> Option<&str> {
        match self {
            NavNode::Directory { title, .. } | NavNode::Content { title, .. } => Some(title),
            NavNode::Static { .. } => None,
        }
    }

    /// Child nodes; empty for files.
    pub fn children(&self) -> &[NavNode] {
        match self {
            NavNode::Directory { children, .. } => children,
            NavNode::Content { .. } | NavNode::Static { .. } => &[],
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            NavNode::Directory { .. } => "directory",
            NavNode::Content { .. } => "content",
            NavNode::Static { .. } => "static",
        }
    }
}
