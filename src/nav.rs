//! Navigation fragment rendering.
//!
//! Turns the resolved tree into one `<nav>` fragment shared by every page:
//!
//! ```html
//! <nav>
//!   <svg style="display:none"><polyline id="svg-folder" .../></svg>   sprite, once
//!   <a href="/" class="nav-root">Site</a>
//!   <div>
//!     <div class="nav-entry"><a href="/intro.html">Intro</a></div>
//!     <div class="nav-dir">
//!       <div class="nav-entry"><a href="/guide/">Guide</a><svg>…folder icon…</svg></div>
//!       <div class="nav-dir-child">…</div>
//!     </div>
//!   </div>
//! </nav>
//! ```
//!
//! Directories without children render flat, like a content entry. Static
//! nodes render nothing. Every title, href and the site name goes through
//! [`escape_html`].

use crate::types::NavNode;
use maud::{Markup, PreEscaped, html};

const FOLDER_SPRITE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" style="display:none"><polyline id="svg-folder" points="6 3 4 5 2 3"></polyline></svg>"#;
const FOLDER_ICON: &str = r##"<svg viewBox="0 0 8 8"><use xlink:href="#svg-folder"/></svg>"##;

/// Escape `& < > ' "` for use in both text and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\'' => out.push_str("&#39;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}

/// Render the navigation fragment for the root's children.
pub fn render_nav(children: &[NavNode], site_name: &str) -> String {
    let markup = html! {
        nav {
            (PreEscaped(FOLDER_SPRITE))
            a href="/" class="nav-root" { (PreEscaped(escape_html(site_name))) }
            div {
                @for child in children {
                    (render_node(child))
                }
            }
        }
    };
    markup.into_string()
}

fn render_node(node: &NavNode) -> Markup {
    match node {
        NavNode::Directory {
            dst,
            title,
            children,
            ..
        } if children.iter().any(is_visible) => html! {
            div.nav-dir {
                div.nav-entry {
                    (link(dst, title))
                    (PreEscaped(FOLDER_ICON))
                }
                div.nav-dir-child {
                    @for child in children {
                        (render_node(child))
                    }
                }
            }
        },
        NavNode::Directory { dst, title, .. } | NavNode::Content { dst, title, .. } => html! {
            div.nav-entry { (link(dst, title)) }
        },
        NavNode::Static { .. } => html! {},
    }
}

/// Whether a node produces any navigation markup.
fn is_visible(node: &NavNode) -> bool {
    !matches!(node, NavNode::Static { .. })
}

fn link(href: &str, title: &str) -> Markup {
    html! {
        a href=(PreEscaped(escape_html(href))) { (PreEscaped(escape_html(title))) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::CopyCompiler;
    use std::sync::Arc;

    fn content(dst: &str, title: &str) -> NavNode {
        NavNode::Content {
            src: dst.to_string(),
            dst: dst.to_string(),
            title: title.to_string(),
            compile: Arc::new(CopyCompiler),
        }
    }

    fn directory(dst: &str, title: &str, children: Vec<NavNode>) -> NavNode {
        NavNode::Directory {
            src: dst.to_string(),
            dst: dst.to_string(),
            title: title.to_string(),
            children,
        }
    }

    fn static_file(dst: &str) -> NavNode {
        NavNode::Static {
            src: dst.to_string(),
            dst: dst.to_string(),
            compile: Arc::new(CopyCompiler),
        }
    }

    fn unescape(text: &str) -> String {
        text.replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&#39;", "'")
            .replace("&quot;", "\"")
            .replace("&amp;", "&")
    }

    #[test]
    fn renders_whole_fragment() {
        let nav = render_nav(&[content("/a.html", "A")], "Docs");
        assert_eq!(
            nav,
            format!(
                r#"<nav>{FOLDER_SPRITE}<a href="/" class="nav-root">Docs</a><div><div class="nav-entry"><a href="/a.html">A</a></div></div></nav>"#
            )
        );
    }

    #[test]
    fn directory_with_children_nests() {
        let nav = render_nav(
            &[directory("/sub/", "Sub", vec![content("/sub/x.html", "X")])],
            "S",
        );
        assert!(nav.contains(&format!(
            r#"<div class="nav-dir"><div class="nav-entry"><a href="/sub/">Sub</a>{FOLDER_ICON}</div><div class="nav-dir-child"><div class="nav-entry"><a href="/sub/x.html">X</a></div></div></div>"#
        )));
    }

    #[test]
    fn empty_directory_renders_flat() {
        let nav = render_nav(&[directory("/sub/", "Sub", vec![])], "S");
        assert!(nav.contains(r#"<div class="nav-entry"><a href="/sub/">Sub</a></div>"#));
        assert!(!nav.contains("nav-dir"));
        assert!(!nav.contains(FOLDER_ICON));
    }

    #[test]
    fn directory_with_only_statics_renders_flat() {
        let nav = render_nav(
            &[directory("/sub/", "Sub", vec![static_file("/sub/a.png")])],
            "S",
        );
        assert!(!nav.contains("nav-dir"));
        assert!(!nav.contains("a.png"));
    }

    #[test]
    fn statics_render_nothing() {
        let nav = render_nav(&[static_file("/img.png")], "S");
        assert!(nav.ends_with("<div></div></nav>"));
        assert!(!nav.contains("img.png"));
    }

    #[test]
    fn sprite_defined_once() {
        let nav = render_nav(
            &[
                directory("/a/", "A", vec![content("/a/1.html", "1")]),
                directory("/b/", "B", vec![content("/b/2.html", "2")]),
            ],
            "S",
        );
        assert_eq!(nav.matches(r#"id="svg-folder""#).count(), 1);
        assert_eq!(nav.matches(FOLDER_ICON).count(), 2);
    }

    #[test]
    fn titles_hrefs_and_site_name_are_escaped() {
        let nav = render_nav(
            &[content("/q\"s'.html", "<b>Tom & Jerry</b>")],
            "It's \"<mine>\"",
        );
        assert!(nav.contains("It&#39;s &quot;&lt;mine&gt;&quot;"));
        assert!(nav.contains(r#"href="/q&quot;s&#39;.html""#));
        assert!(nav.contains("&lt;b&gt;Tom &amp; Jerry&lt;/b&gt;"));
        assert!(!nav.contains("<b>"));
    }

    /// Every sequence of up to three pieces: the five special characters,
    /// ordinary text, and text that already looks escaped.
    fn escape_inputs() -> Vec<String> {
        const PIECES: [&str; 13] = [
            "&", "<", ">", "'", "\"", "a", " ", "&amp;", "&lt;", "&#39;", "&amp;lt;", "lt;",
            "#39;",
        ];
        let mut inputs = vec![String::new()];
        let mut last = vec![String::new()];
        for _ in 0..3 {
            last = last
                .iter()
                .flat_map(|prefix| PIECES.iter().map(move |piece| format!("{prefix}{piece}")))
                .collect();
            inputs.extend(last.iter().cloned());
        }
        inputs
    }

    #[test]
    fn escape_removes_raw_special_characters() {
        let inputs = escape_inputs();
        assert_eq!(inputs.len(), 1 + 13 + 13 * 13 + 13 * 13 * 13);
        for input in &inputs {
            let escaped = escape_html(input);
            assert!(!escaped.contains(['<', '>', '\'', '"']), "{input:?} -> {escaped}");
            assert!(
                escaped.match_indices('&').all(|(i, _)| {
                    let rest = &escaped[i..];
                    ["&amp;", "&lt;", "&gt;", "&#39;", "&quot;"]
                        .iter()
                        .any(|entity| rest.starts_with(entity))
                }),
                "{input:?} -> {escaped}"
            );
            assert_eq!(&unescape(&escaped), input, "{escaped}");
        }
    }

    #[test]
    fn escaped_entities_are_escaped_again() {
        assert_eq!(escape_html("&amp;lt;"), "&amp;amp;lt;");
        assert_eq!(escape_html("&#39;"), "&amp;#39;");
    }
}
