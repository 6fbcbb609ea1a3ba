//! # Content Reducer Module
//!
//! Turns a noisy job posting page into a bounded, information-dense HTML
//! payload for the prompt.
//!
//! The reduction runs in three steps:
//!
//! 1. Strip noise: scripts, styles, comments, page chrome, ads, tracking and
//!    social widgets, and forms that have nothing to do with applying.
//! 2. Pick the content root: the first main-content candidate with enough
//!    text, otherwise the cleaned `<body>`.
//! 3. Enforce the size budget: prune low-value elements from the end of the
//!    document, then cut at a tag boundary if that was not enough.
//!
//! [`reduce`] never fails. Any internal fault degrades to a plain truncation
//! of the input so a hostile page can't abort an otherwise recoverable
//! extraction.

mod metadata;
mod selectors;

pub use metadata::{extract_metadata, PageMetadata};

use std::panic::{self, AssertUnwindSafe};
use std::sync::LazyLock;

use ego_tree::NodeId;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::{debug, warn};

use selectors::{has_job_keyword, MAIN_CONTENT_SELECTORS, NOISE_SELECTORS};

/// Default size budget for reduced content, in bytes
pub const DEFAULT_MAX_CONTENT_LENGTH: usize = 50_000;

/// A main-content candidate needs more text than this to be picked
const MIN_MAIN_CONTENT_CHARS: usize = 200;

/// Elements with less text than this and no job keyword may be pruned
const LOW_VALUE_TEXT_CHARS: usize = 80;

/// Pruning stops once the content fits in this share of the budget
const RETAINED_BUDGET_RATIO: f64 = 0.8;

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

#[derive(Debug, Error)]
enum ReduceError {
    #[error("invalid selector '{selector}': {message}")]
    Selector {
        selector: &'static str,
        message: String,
    },

    #[error("content root vanished from the document")]
    MissingRoot,
}

/// Reduce `html` to at most `max_length` bytes of job-relevant markup
///
/// Deterministic: the same input and budget always produce the same output.
pub fn reduce(html: &str, max_length: usize) -> String {
    reduce_with(html, max_length, try_reduce)
}

/// Run `reducer`, degrading to plain truncation if it fails or panics
fn reduce_with<F>(html: &str, max_length: usize, reducer: F) -> String
where
    F: FnOnce(&str, usize) -> Result<String, ReduceError>,
{
    match panic::catch_unwind(AssertUnwindSafe(|| reducer(html, max_length))) {
        Ok(Ok(reduced)) => reduced,
        Ok(Err(e)) => {
            warn!("Content reduction failed, truncating raw input: {}", e);
            truncate_to_char_boundary(html, max_length).to_string()
        }
        Err(_) => {
            warn!("Content reduction panicked, truncating raw input");
            truncate_to_char_boundary(html, max_length).to_string()
        }
    }
}

/// Longest prefix of `text` that fits in `max_length` bytes without splitting a character
pub fn truncate_to_char_boundary(text: &str, max_length: usize) -> &str {
    if text.len() <= max_length {
        return text;
    }
    let mut end = max_length;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

fn try_reduce(html: &str, max_length: usize) -> Result<String, ReduceError> {
    let mut document = Html::parse_document(html);

    let removed = strip_noise(&mut document)?;
    let root = select_content_root(&document)?;

    let raw = outer_html(&document, root)?;
    let compact = collapse_whitespace(&raw);
    debug!(
        removed,
        input_bytes = html.len(),
        output_bytes = compact.len(),
        "Stripped noise"
    );
    if compact.len() <= max_length {
        return Ok(compact);
    }

    // Sizes during pruning are measured on the raw serialization, so the
    // target is scaled by how much whitespace collapsing saves.
    let ratio = compact.len() as f64 / raw.len().max(1) as f64;
    let target = max_length as f64 * RETAINED_BUDGET_RATIO;
    let raw_target = (target / ratio.max(f64::EPSILON)) as usize;
    prune_low_value(&mut document, root, raw.len(), raw_target);

    let pruned = collapse_whitespace(&outer_html(&document, root)?);
    if pruned.len() <= max_length {
        return Ok(pruned);
    }

    debug!(bytes = pruned.len(), max_length, "Hard-cutting reduced content");
    Ok(cut_at_tag_boundary(&pruned, max_length).to_string())
}

/// Detach every noise element and comment, returning how many were removed
fn strip_noise(document: &mut Html) -> Result<usize, ReduceError> {
    let mut doomed: Vec<NodeId> = Vec::new();

    for &selector_str in NOISE_SELECTORS {
        let selector = parse_selector(selector_str)?;
        doomed.extend(
            document
                .root_element()
                .select(&selector)
                .filter(|element| !matches!(element.value().name(), "html" | "body"))
                .map(|element| element.id()),
        );
    }

    let forms = parse_selector("form")?;
    doomed.extend(
        document
            .root_element()
            .select(&forms)
            .filter(|form| !has_job_keyword(&element_text(form)))
            .map(|form| form.id()),
    );

    doomed.extend(
        document
            .tree
            .root()
            .descendants()
            .filter(|node| node.value().is_comment())
            .map(|node| node.id()),
    );

    let removed = doomed.len();
    for id in doomed {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
    Ok(removed)
}

/// First main-content candidate with enough text, else `<body>`
///
/// Searches from the root element so detached noise is never a candidate.
fn select_content_root(document: &Html) -> Result<NodeId, ReduceError> {
    let live = document.root_element();
    for &selector_str in MAIN_CONTENT_SELECTORS {
        let selector = parse_selector(selector_str)?;
        if let Some(candidate) = live.select(&selector).next() {
            let chars = element_text(&candidate).chars().count();
            if chars > MIN_MAIN_CONTENT_CHARS {
                debug!(selector = selector_str, chars, "Selected main content");
                return Ok(candidate.id());
            }
        }
    }

    debug!("No main content candidate qualified, using body");
    let body = parse_selector("body")?;
    let root = live.select(&body).next().unwrap_or(live);
    Ok(root.id())
}

/// Remove low-value elements walking backward from the end of `root`
///
/// `current` is the raw serialized size of `root`; returns the estimated size
/// after pruning.
fn prune_low_value(document: &mut Html, root: NodeId, mut current: usize, target: usize) -> usize {
    let Some(root_node) = document.tree.get(root) else {
        return current;
    };
    let candidates: Vec<NodeId> = root_node
        .descendants()
        .skip(1)
        .filter(|node| node.value().is_element())
        .map(|node| node.id())
        .collect();

    let mut pruned = 0;
    for id in candidates.into_iter().rev() {
        if current <= target {
            break;
        }
        let size = match document.tree.get(id).and_then(ElementRef::wrap) {
            Some(element) if is_low_value(&element) => element.html().len(),
            _ => continue,
        };
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
        current = current.saturating_sub(size);
        pruned += 1;
    }

    debug!(pruned, remaining = current, target, "Pruned low-value elements");
    current
}

fn is_low_value(element: &ElementRef<'_>) -> bool {
    let text = element_text(element);
    text.chars().count() < LOW_VALUE_TEXT_CHARS && !has_job_keyword(&text)
}

fn cut_at_tag_boundary(html: &str, max_length: usize) -> &str {
    let prefix = truncate_to_char_boundary(html, max_length);
    match prefix.rfind('>') {
        Some(end) => &prefix[..=end],
        None => prefix,
    }
}

fn outer_html(document: &Html, id: NodeId) -> Result<String, ReduceError> {
    document
        .tree
        .get(id)
        .and_then(ElementRef::wrap)
        .map(|element| element.html())
        .ok_or(ReduceError::MissingRoot)
}

fn element_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn collapse_whitespace(html: &str) -> String {
    WHITESPACE_RUN.replace_all(html.trim(), " ").into_owned()
}

fn parse_selector(selector: &'static str) -> Result<Selector, ReduceError> {
    Selector::parse(selector).map_err(|e| ReduceError::Selector {
        selector,
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSIBILITIES: &str = "Responsibilities: design and operate the payments API, \
        own the reliability of our event pipeline, and mentor engineers on Rust and Postgres. \
        Requirements: five years of backend experience.";

    fn posting_page() -> String {
        format!(
            r#"<!DOCTYPE html>
<html>
<head><title>Senior Backend Engineer</title><style>body {{ color: red; }}</style></head>
<body>
  <nav><a href="/">Home</a><a href="/about">About us</a></nav>
  <script>window.dataLayer = [];</script>
  <!-- tracking pixel -->
  <div class="cookie-banner">We use cookies</div>
  <main>
    <h1>Senior Backend Engineer</h1>
    <p>{RESPONSIBILITIES}</p>
    <form><input name="q"><button>Subscribe to newsletter</button></form>
    <form><button>Apply for this job</button></form>
  </main>
  <div class="share-buttons">Share on LinkedIn</div>
  <footer>Copyright 2024</footer>
</body>
</html>"#
        )
    }

    #[test]
    fn test_strips_noise_and_keeps_posting() {
        let reduced = reduce(&posting_page(), DEFAULT_MAX_CONTENT_LENGTH);

        assert!(reduced.starts_with("<main>"));
        assert!(reduced.contains("Senior Backend Engineer"));
        assert!(reduced.contains("payments API"));
        assert!(reduced.contains("Apply for this job"));

        for noise in [
            "dataLayer",
            "About us",
            "tracking pixel",
            "We use cookies",
            "Subscribe to newsletter",
            "Share on LinkedIn",
            "Copyright",
            "color: red",
        ] {
            assert!(!reduced.contains(noise), "noise '{noise}' survived");
        }
    }

    #[test]
    fn test_first_qualifying_candidate_wins() {
        let long_text = "Experience with distributed systems. ".repeat(10);
        let html = format!(
            r#"<html><body>
                <main>Too short</main>
                <article>{long_text}</article>
                <div class="content">{long_text}{long_text}{long_text}</div>
            </body></html>"#
        );

        let reduced = reduce(&html, DEFAULT_MAX_CONTENT_LENGTH);

        assert!(reduced.starts_with("<article>"));
        assert!(!reduced.contains("Too short"));
    }

    #[test]
    fn test_falls_back_to_body() {
        let html = "<html><body><nav>menu</nav><div><h2>Barista</h2><p>Coffee shop in Lyon</p></div></body></html>";

        let reduced = reduce(html, DEFAULT_MAX_CONTENT_LENGTH);

        assert!(reduced.starts_with("<body>"));
        assert!(reduced.contains("Barista"));
        assert!(!reduced.contains("menu"));
    }

    #[test]
    fn test_prunes_low_value_elements_from_the_end() {
        let duties: String = (0..10)
            .map(|i| format!("<p>Duty {i}: responsibilities include designing resilient services and mentoring engineers.</p>"))
            .collect();
        let links: String = (0..100)
            .map(|i| format!("<span>Footer link {i}</span>"))
            .collect();
        let html = format!("<html><body><main><h1>Site Reliability Engineer</h1>{duties}{links}</main></body></html>");

        let reduced = reduce(&html, 2_000);

        assert!(reduced.len() <= 2_000);
        assert!(reduced.contains("Site Reliability Engineer"));
        assert!(reduced.contains("Duty 0"));
        assert!(reduced.contains("Duty 9"));
        assert!(!reduced.contains("Footer link 99"));
        assert!(reduced.ends_with("</main>"));
    }

    #[test]
    fn test_hard_cut_lands_on_tag_boundary() {
        let paragraphs = format!("<p>{RESPONSIBILITIES}</p>").repeat(40);
        let html = format!("<html><body><main>{paragraphs}</main></body></html>");

        let reduced = reduce(&html, 1_000);

        assert!(reduced.len() <= 1_000);
        assert!(reduced.ends_with('>'));
        assert!(reduced.starts_with("<main>"));
    }

    #[test]
    fn test_output_is_bounded_and_deterministic() {
        let inputs = [
            posting_page(),
            "plain text without any markup at all".repeat(50),
            "<div><p>unclosed <b>tags <i>everywhere".repeat(30),
            "Ünïcödé ✓ 職務内容 ".repeat(200),
            String::new(),
        ];

        for input in &inputs {
            for max_length in [0, 1, 17, 256, 1_000, DEFAULT_MAX_CONTENT_LENGTH] {
                let first = reduce(input, max_length);
                let second = reduce(input, max_length);
                assert!(first.len() <= max_length, "{} > {}", first.len(), max_length);
                assert_eq!(first, second);
            }
        }
    }

    #[test]
    fn test_noise_never_becomes_main_content() {
        let teaser = "Read our latest blog post about company culture, offsites and hackathons. ".repeat(3);
        let html = format!(
            r#"<html><body>
                <div class="job-description"><h1>Senior Backend Engineer</h1><p>{RESPONSIBILITIES}</p></div>
                <footer><article>{teaser}</article></footer>
            </body></html>"#
        );

        let reduced = reduce(&html, DEFAULT_MAX_CONTENT_LENGTH);

        assert!(reduced.contains("Senior Backend Engineer"));
        assert!(!reduced.contains("latest blog post"));
    }

    #[test]
    fn test_reducer_error_falls_back_to_truncation() {
        let html = "<html><body><main>Ünïcödé posting body</main></body></html>";

        let reduced = reduce_with(html, 20, |_, _| Err(ReduceError::MissingRoot));

        assert_eq!(reduced, truncate_to_char_boundary(html, 20));
    }

    #[test]
    fn test_reducer_panic_falls_back_to_truncation() {
        let html = "<html><body><main>Ünïcödé posting body</main></body></html>";

        let reduced = reduce_with(html, 33, |_, _| panic!("parser blew up"));

        assert_eq!(reduced, truncate_to_char_boundary(html, 33));
        assert!(reduced.len() <= 33);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_to_char_boundary("héllo", 2), "h");
        assert_eq!(truncate_to_char_boundary("héllo", 3), "hé");
        assert_eq!(truncate_to_char_boundary("abc", 10), "abc");
    }
}
