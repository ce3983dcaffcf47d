//! Rendering of dashboard results.
//!
//! - [`svg`]: charts as standalone SVG documents
//! - [`html`]: dashboard pages with forms and inline charts
//! - [`export`]: JSON, Markdown and standalone HTML exports

pub mod export;
pub mod html;
pub mod svg;

pub use export::{export_metadata, generate_json_report, generate_markdown_report, write_report};

/// Escape text for inclusion in HTML or SVG markup.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
