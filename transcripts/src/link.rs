//! Google Meet link recognition.
//!
//! A negative result is the common case when scanning calendar text, so every
//! entry point returns `Option`/`Vec` rather than an error.

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// Host every conferencing link lives under.
pub const MEET_HOST: &str = "meet.google.com";

fn meet_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"https://meet\.google\.com/([a-z0-9-]+)").expect("meet link regex should compile")
    })
}

/// A recognized conferencing link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MeetingLink {
    /// Meeting code, e.g. `abc-defg-hij`
    pub code: String,
    /// The URL as it was supplied, trimmed
    pub original_url: String,
    /// Query parameters present on the original URL
    pub query_params: Vec<(String, String)>,
}

impl MeetingLink {
    /// Canonical URL rebuilt from the code.
    pub fn url(&self) -> String {
        format(&self.code)
    }
}

/// Parse a conferencing URL into its meeting code.
///
/// Surrounding whitespace is ignored. Returns `None` when no link is present.
pub fn parse(url: &str) -> Option<MeetingLink> {
    let url = url.trim();
    let captures = meet_regex().captures(url)?;
    let code = captures.get(1)?.as_str().to_string();

    Some(MeetingLink {
        code,
        original_url: url.to_string(),
        query_params: query_params(url),
    })
}

/// Rebuild the canonical URL for a meeting code. The code is not validated.
pub fn format(code: &str) -> String {
    format!("https://{}/{}", MEET_HOST, code)
}

/// Every conferencing link embedded in free-form text, in canonical form.
pub fn find_all(text: &str) -> Vec<String> {
    meet_regex()
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|code| format(code.as_str()))
        .collect()
}

pub fn is_meeting_link(text: &str) -> bool {
    meet_regex().is_match(text)
}

fn query_params(url: &str) -> Vec<(String, String)> {
    match url::Url::parse(url) {
        Ok(parsed) => parsed
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect(),
        Err(_) => Vec::new(),
    }
}
