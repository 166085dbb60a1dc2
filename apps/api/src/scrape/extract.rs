//! Extraction rules: an ordered pipeline over one parsed document.
//!
//! Every rule sees the same completed document. Field-setting rules only fill a field that
//! is still unset, so precedence is the order of `RULES`. Missing tags are not errors: each
//! rule contributes what it finds and moves on.

use html_scraper::node::Node;
use html_scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::scrape::platform::Platform;
use crate::scrape::ScrapedRecord;

/// Upper bound on the raw text handed to the LLM, in characters.
pub const RAW_TEXT_LIMIT: usize = 8000;

/// Script blocks that carry page data for client-rendered sites.
const STRUCTURED_DATA_SELECTOR: &str =
    r#"script#__NEXT_DATA__, script[type="application/ld+json"]"#;

/// Elements whose text is never visible on the page.
const HIDDEN_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// Working state shared by all rules for one document.
#[derive(Debug, Default)]
struct Extraction {
    title: Option<String>,
    description: Option<String>,
    raw_parts: Vec<String>,
}

type ExtractionRule = fn(&Html, &mut Extraction);

const RULES: &[(&str, ExtractionRule)] = &[
    ("structured_data", structured_data_blocks),
    ("og_title", og_title),
    ("og_description", og_description),
    ("page_title", page_title),
    ("body_text", body_text),
];

/// Runs every rule over `html` and assembles the scraped record for `url`.
pub fn extract_record(html: &str, url: &str) -> ScrapedRecord {
    let document = Html::parse_document(html);
    let mut extraction = Extraction::default();

    for (name, rule) in RULES {
        rule(&document, &mut extraction);
        debug!(rule = *name, parts = extraction.raw_parts.len(), "extraction rule applied");
    }

    ScrapedRecord {
        title: extraction.title,
        description: extraction.description,
        platform: Platform::detect(url),
        raw_text: truncate_chars(extraction.raw_parts.join("\n"), RAW_TEXT_LIMIT),
        ..ScrapedRecord::default()
    }
}

fn structured_data_blocks(document: &Html, extraction: &mut Extraction) {
    let Some(selector) = selector(STRUCTURED_DATA_SELECTOR) else {
        return;
    };
    for block in document.select(&selector) {
        let text: String = block.text().collect();
        if !text.trim().is_empty() {
            extraction.raw_parts.push(text);
        }
    }
}

fn og_title(document: &Html, extraction: &mut Extraction) {
    let value = meta_content(document, r#"meta[property="og:title"]"#);
    set_if_unset(&mut extraction.title, value);
}

fn og_description(document: &Html, extraction: &mut Extraction) {
    let value = meta_content(document, r#"meta[property="og:description"]"#);
    set_if_unset(&mut extraction.description, value);
}

fn page_title(document: &Html, extraction: &mut Extraction) {
    let value = selector("title")
        .and_then(|sel| document.select(&sel).next())
        .map(|el| el.text().collect::<String>().trim().to_string());
    set_if_unset(&mut extraction.title, value);
}

fn body_text(document: &Html, extraction: &mut Extraction) {
    let Some(selector) = selector("body") else {
        return;
    };
    for body in document.select(&selector) {
        let text = visible_text(body);
        if !text.is_empty() {
            extraction.raw_parts.push(text);
        }
    }
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

fn meta_content(document: &Html, css: &str) -> Option<String> {
    let sel = selector(css)?;
    let el = document.select(&sel).next()?;
    Some(el.value().attr("content")?.trim().to_string())
}

/// Stores `value` only when the slot is empty and the value carries text.
fn set_if_unset(slot: &mut Option<String>, value: Option<String>) {
    if slot.is_none() {
        *slot = value.filter(|v| !v.is_empty());
    }
}

/// Text nodes under `root`, trimmed and newline-joined, skipping hidden subtrees.
fn visible_text(root: ElementRef<'_>) -> String {
    let mut parts = Vec::new();
    for node in root.descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| match ancestor.value() {
            Node::Element(el) => HIDDEN_TAGS.contains(&el.name()),
            _ => false,
        });
        let text = text.trim();
        if !hidden && !text.is_empty() {
            parts.push(text);
        }
    }
    parts.join("\n")
}

/// Cuts `text` to at most `limit` characters on a char boundary.
fn truncate_chars(text: String, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text,
    }
}
