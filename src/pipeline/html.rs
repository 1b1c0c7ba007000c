//! HTML document access for the extractor.
//!
//! The extractor only needs four capabilities: read the text of the first
//! match, read an attribute, concatenate the text of every match, and prune
//! subtrees. [`HtmlDocument`] names exactly those so the extraction priority
//! order can be tested against any implementation; [`ScrapedPage`] provides
//! them on top of `scraper`.

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// Read/prune operations over a parsed HTML page.
pub trait HtmlDocument {
    /// Text of the first element matching `selector`, if any.
    fn select_first(&self, selector: &str) -> Option<String>;

    /// Attribute `attr` of the first element matching `selector`.
    fn select_attr(&self, selector: &str, attr: &str) -> Option<String>;

    /// Concatenated text of every element matching `selector`.
    fn select_all_text(&self, selector: &str) -> String;

    /// Detach every element matching any of `selectors` from the tree.
    fn remove_all(&mut self, selectors: &[&str]);

    /// Whole visible body text (or the document text when there is no body).
    fn body_text(&self) -> String;
}

/// A page parsed with `scraper`.
pub struct ScrapedPage {
    html: Html,
}

impl ScrapedPage {
    pub fn parse(source: &str) -> Self {
        Self {
            html: Html::parse_document(source),
        }
    }
}

fn parse_selector(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(s) => Some(s),
        Err(e) => {
            debug!("Ignoring invalid selector '{}': {:?}", selector, e);
            None
        }
    }
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>()
}

impl HtmlDocument for ScrapedPage {
    fn select_first(&self, selector: &str) -> Option<String> {
        let sel = parse_selector(selector)?;
        self.html.select(&sel).next().map(element_text)
    }

    fn select_attr(&self, selector: &str, attr: &str) -> Option<String> {
        let sel = parse_selector(selector)?;
        self.html
            .select(&sel)
            .next()
            .and_then(|el| el.value().attr(attr))
            .map(|v| v.to_string())
    }

    fn select_all_text(&self, selector: &str) -> String {
        let Some(sel) = parse_selector(selector) else {
            return String::new();
        };
        self.html.select(&sel).map(element_text).collect()
    }

    fn remove_all(&mut self, selectors: &[&str]) {
        let mut ids = Vec::new();
        for selector in selectors {
            if let Some(sel) = parse_selector(selector) {
                ids.extend(self.html.select(&sel).map(|el| el.id()));
            }
        }
        for id in ids {
            // Nested matches may already be gone with their ancestor.
            if let Some(mut node) = self.html.tree.get_mut(id) {
                node.detach();
            }
        }
    }

    fn body_text(&self) -> String {
        self.select_first("body")
            .unwrap_or_else(|| self.html.root_element().text().collect())
    }
}
