//! Selector and keyword tables used by the reducer

/// Elements that never carry posting content
pub(super) const NOISE_SELECTORS: &[&str] = &[
    "script",
    "style",
    "noscript",
    "template",
    "iframe",
    "svg",
    "link",
    "meta",
    // navigation and page chrome
    "nav",
    "header",
    "footer",
    "aside",
    "[role='navigation']",
    "[role='banner']",
    "[role='contentinfo']",
    "[role='complementary']",
    ".navigation",
    ".menu",
    ".breadcrumb",
    ".breadcrumbs",
    ".sidebar",
    "#sidebar",
    "[class*='sidebar']",
    // ads and tracking
    ".ad",
    ".ads",
    ".advert",
    ".advertisement",
    "[class*='advert']",
    "[class^='ad-']",
    "[id^='ad-']",
    "[id*='google_ads']",
    "[class*='tracking']",
    "[id*='tracking']",
    "[class*='analytics']",
    "[class*='cookie']",
    "[id*='cookie']",
    "[class*='consent']",
    // social widgets
    "[class*='social']",
    "[class*='share']",
    "[id*='share']",
];

/// Candidate containers for the posting body, in priority order
///
/// The first candidate whose text is long enough wins, even if a later one
/// would be longer.
pub(super) const MAIN_CONTENT_SELECTORS: &[&str] = &[
    "main",
    "article",
    "[role='main']",
    "[class*='job-description']",
    "[id*='job-description']",
    "[class*='jobDescription']",
    "[id*='jobDescription']",
    "[class*='job']",
    "[id*='job']",
    "[class*='description']",
    "[id*='description']",
    "[class*='content']",
    "[id*='content']",
];

/// Lowercase fragments that mark text as relevant to a job posting
pub(super) const JOB_KEYWORDS: &[&str] = &[
    "job",
    "position",
    "responsib",
    "requirement",
    "qualification",
    "experience",
    "skill",
    "salary",
    "compensation",
    "benefit",
    "apply",
    "application",
    "candidate",
    "career",
    "hiring",
    "remote",
    "resume",
    "vacanc",
    "stelle",
    "bewerb",
    "poste",
    "emploi",
];

/// Whether `text` mentions anything job related
pub(super) fn has_job_keyword(text: &str) -> bool {
    let lower = text.to_lowercase();
    JOB_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
}
