//! # Prompt Builder Module
//!
//! Wraps reduced page content (or pasted text) in the extraction instructions
//! and the output contract the response parser and validator rely on.
//!
//! Both input variants share the exact same output contract; only the framing
//! sentence differs, plus optional source hints for pages fetched from a URL.

use crate::reducer::PageMetadata;

/// Where the content embedded in the prompt came from
#[derive(Debug, Clone, Copy)]
pub enum PromptSource<'a> {
    /// Reduced HTML fetched from a job posting URL
    Url {
        url: &'a str,
        metadata: &'a PageMetadata,
    },

    /// Text pasted by the user
    PastedText,
}

/// System preamble for the extraction model
pub const EXTRACTION_PREAMBLE: &str = "You are a precise information extraction engine for job postings. \
You only answer with the requested JSON object.";

const OUTPUT_CONTRACT: &str = r#"Return exactly one JSON object with the following keys and nothing else:

- "jobTitle" (string, required): the job title exactly as advertised.
- "companyName" (string, required): the name of the hiring company.
- "jobDescriptionText" (string or null): the description of the role, its responsibilities and context, as plain text without markup. Use null if the posting has no description.
- "language" (string, required): the ISO 639-1 code of the language the posting is written in, for example "en", "de" or "fr".
- "location" (string or null): where the job is located, including remote or hybrid arrangements.
- "salary" (string or null): the salary or salary range as written, including currency and period.
- "keyDetails" (array of objects with string fields "key" and "value", or null): short structured highlights such as contract type, seniority, working hours or start date.
- "jobPrerequisites" (string or null): the required skills, experience and qualifications as a bulleted list with one "- " prefixed item per line. ALWAYS write this field in English, translating it if the posting is in another language.
- "notes" (null): reserved, always null.

Do not invent information that is not present in the content; use null for optional fields you cannot find.

Wrap the JSON object in a single fenced code block that starts with ```json and ends with ```. Do not write anything before or after the code block."#;

/// Build the extraction prompt for `content`
pub fn build(content: &str, source: &PromptSource<'_>) -> String {
    let mut prompt = String::with_capacity(content.len() + OUTPUT_CONTRACT.len() + 512);

    match source {
        PromptSource::Url { url, metadata } => {
            prompt.push_str(
                "Extract structured information about the job posting contained in the following HTML, \
                 which was taken from a job posting web page.\n\n",
            );
            prompt.push_str(&format!("Source URL: {}\n", url));
            if let Some(title) = &metadata.title {
                prompt.push_str(&format!("Page title: {}\n", title));
            }
            if let Some(site_name) = &metadata.site_name {
                prompt.push_str(&format!("Site name: {}\n", site_name));
            }
            if let Some(description) = &metadata.description {
                prompt.push_str(&format!("Page description: {}\n", description));
            }
            prompt.push_str("\nHTML content:\n<<<\n");
        }
        PromptSource::PastedText => {
            prompt.push_str(
                "Extract structured information about the job posting contained in the following text, \
                 which was pasted by a user.\n\nText content:\n<<<\n",
            );
        }
    }

    prompt.push_str(content);
    prompt.push_str("\n>>>\n\n");
    prompt.push_str(OUTPUT_CONTRACT);
    prompt
}
