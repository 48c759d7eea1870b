//! Visible-text extraction from HTML.

use scraper::{ElementRef, Html};

/// Elements whose text content is never user-visible.
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Extract the visible text of an HTML document.
///
/// Script, style and other non-visible elements are dropped; the rest is
/// lowercased with element boundaries and runs of whitespace collapsed to
/// single spaces.
pub fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut pieces = Vec::new();
    collect_text(document.root_element(), &mut pieces);

    pieces
        .join(" ")
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn collect_text(element: ElementRef, out: &mut Vec<String>) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            let piece: &str = &text.text;
            out.push(piece.to_string());
        } else if let Some(child_element) = ElementRef::wrap(child) {
            if !SKIPPED_ELEMENTS.contains(&child_element.value().name()) {
                collect_text(child_element, out);
            }
        }
    }
}
