//! Page metadata extraction

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Metadata hints pulled from a page's `<head>`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    /// Contents of `<title>`
    pub title: Option<String>,

    /// `meta[name=description]`
    pub description: Option<String>,

    /// `meta[property='og:site_name']`, often the employer or job board
    pub site_name: Option<String>,
}

impl PageMetadata {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.site_name.is_none()
    }
}

/// Extract metadata from a page
///
/// Missing or unparseable fields are left as `None`.
pub fn extract_metadata(html: &str) -> PageMetadata {
    let document = Html::parse_document(html);

    let title = select_first(&document, "title", |element| {
        Some(element.text().collect::<String>())
    });
    let description = select_first(&document, "meta[name='description']", |element| {
        element.value().attr("content").map(str::to_string)
    });
    let site_name = select_first(&document, "meta[property='og:site_name']", |element| {
        element.value().attr("content").map(str::to_string)
    });

    PageMetadata {
        title,
        description,
        site_name,
    }
}

fn select_first<F>(document: &Html, selector: &str, read: F) -> Option<String>
where
    F: Fn(scraper::ElementRef<'_>) -> Option<String>,
{
    let selector = match Selector::parse(selector) {
        Ok(selector) => selector,
        Err(e) => {
            warn!("Failed to parse selector '{}': {}", selector, e);
            return None;
        }
    };

    document
        .select(&selector)
        .next()
        .and_then(read)
        .map(|value| value.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_head_metadata() {
        let html = r#"<html><head>
            <title>  Staff Engineer
              | Initech Careers </title>
            <meta name="description" content="Join Initech as a Staff Engineer.">
            <meta property="og:site_name" content="Initech">
        </head><body></body></html>"#;

        let metadata = extract_metadata(html);

        assert_eq!(metadata.title.as_deref(), Some("Staff Engineer | Initech Careers"));
        assert_eq!(
            metadata.description.as_deref(),
            Some("Join Initech as a Staff Engineer.")
        );
        assert_eq!(metadata.site_name.as_deref(), Some("Initech"));
    }

    #[test]
    fn test_missing_metadata_is_none() {
        let metadata = extract_metadata("<p>no head at all</p>");
        assert!(metadata.is_empty());
    }
}
