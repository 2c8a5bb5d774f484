//! Small helpers over `scraper` used by the extraction cascades.

use scraper::{ElementRef, Html, Selector};

use crate::utils::collapse_whitespace;

/// Parse a selector, treating an invalid one as "matches nothing".
pub fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

/// First element in the document matching `css`.
pub fn select_first<'a>(doc: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let sel = selector(css)?;
    doc.select(&sel).next()
}

/// All elements in the document matching `css`, in document order.
pub fn select_all<'a>(doc: &'a Html, css: &str) -> Vec<ElementRef<'a>> {
    match selector(css) {
        Some(sel) => doc.select(&sel).collect(),
        None => Vec::new(),
    }
}

/// Visible text of an element with whitespace folded.
pub fn element_text(el: ElementRef<'_>) -> String {
    collapse_whitespace(&el.text().collect::<Vec<_>>().join(" "))
}

/// Attribute value, or an empty string when absent.
pub fn attr_or_empty(el: ElementRef<'_>, name: &str) -> String {
    el.value().attr(name).unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_text_folds_whitespace() {
        let doc = Html::parse_document("<div class='x'>  Space\n  <b>Race</b> </div>");
        let el = select_first(&doc, ".x").unwrap();
        assert_eq!(element_text(el), "Space Race");
    }

    #[test]
    fn test_invalid_selector_matches_nothing() {
        let doc = Html::parse_document("<p>hi</p>");
        assert!(select_first(&doc, "p[").is_none());
        assert!(select_all(&doc, "p[").is_empty());
    }
}
