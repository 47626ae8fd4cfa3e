//! HTML to queryable plain text.
//!
//! Deliberately "good enough" and deterministic, not a readability engine:
//! paragraph text from the most article-like container, with script/style/
//! noscript/iframe subtrees contributing nothing. Their text leaking into
//! extracted content would poison downstream summaries.

use html_scraper::{ElementRef, Html, Selector};

const SKIP_TAGS: [&str; 4] = ["script", "style", "noscript", "iframe"];

fn is_skip_tag(name: &str) -> bool {
    SKIP_TAGS.iter().any(|t| name.eq_ignore_ascii_case(t))
}

fn norm_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

// Text of an element, in document order, never descending into skip tags.
fn text_excluding_skipped(el: ElementRef<'_>, out: &mut String) {
    if is_skip_tag(el.value().name()) {
        return;
    }
    for child in el.children() {
        if let Some(t) = child.value().as_text() {
            out.push_str(t);
            out.push(' ');
        } else if let Some(ce) = ElementRef::wrap(child) {
            text_excluding_skipped(ce, out);
        }
    }
}

fn paragraph_text(el: ElementRef<'_>) -> String {
    let mut out = String::new();
    text_excluding_skipped(el, &mut out);
    norm_ws(&out)
}

fn container<'a>(doc: &'a Html) -> Option<ElementRef<'a>> {
    let article = Selector::parse("article").ok()?;
    if let Some(el) = doc.select(&article).next() {
        return Some(el);
    }
    let main = Selector::parse("main").ok()?;
    if let Some(el) = doc.select(&main).next() {
        return Some(el);
    }
    doc.root_element().into()
}

fn meta_description(doc: &Html) -> Option<String> {
    let sel =
        Selector::parse(r#"meta[name="description"], meta[property="og:description"]"#).ok()?;
    doc.select(&sel)
        .filter_map(|m| m.value().attr("content"))
        .map(norm_ws)
        .find(|c| !c.is_empty())
}

fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => s[..byte_idx].to_string(),
        None => s.to_string(),
    }
}

/// Extract the main readable text of an HTML page, bounded to `max_chars`.
///
/// Container preference is `<article>`, then `<main>`, then the whole
/// document; paragraphs are joined with blank lines. Pages with no paragraph
/// markup fall back to the description meta tag so they still yield some
/// queryable text.
pub fn page_text_from_html(html: &str, max_chars: usize) -> String {
    let doc = Html::parse_document(html);

    let mut paragraphs: Vec<String> = Vec::new();
    if let (Some(root), Ok(p_sel)) = (container(&doc), Selector::parse("p")) {
        for p in root.select(&p_sel) {
            let text = paragraph_text(p);
            if !text.is_empty() {
                paragraphs.push(text);
            }
        }
    }

    if paragraphs.is_empty() {
        if let Some(desc) = meta_description(&doc) {
            paragraphs.push(desc);
        }
    }

    truncate_chars(&paragraphs.join("\n\n"), max_chars)
}
