//! File name conventions.
//!
//! Transcript documents are named `<meeting title> (<date and time>) - Transcript`.
//! Nothing in the name ties the file to a calendar event, so everything parsed
//! here is best effort.

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::OnceLock;

use crate::models::{InferredDate, MeetingDescriptor, ParsedDate};

/// Suffix the conferencing service appends to transcript documents.
pub const TRANSCRIPT_SUFFIX: &str = " - Transcript";

/// Longest title component kept in generated file names.
pub const MAX_TITLE_CHARS: usize = 100;

const DATETIME_FORMATS: &[&str] = &[
    "%b %d, %Y, %I:%M %p",
    "%b %d, %Y %I:%M %p",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%b %d, %Y", "%Y-%m-%d", "%Y/%m/%d"];

fn title_and_date_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"^(.+?)\s*\((.+?)\)$").expect("title/date regex should compile")
    })
}

fn code_regexes() -> &'static [Regex; 2] {
    static REGEXES: OnceLock<[Regex; 2]> = OnceLock::new();
    REGEXES.get_or_init(|| {
        [
            Regex::new(r"([a-z0-9]{3}-[a-z0-9]{4}-[a-z0-9]{3})")
                .expect("canonical code regex should compile"),
            Regex::new(r"([a-z0-9-]{10,})").expect("generic code regex should compile"),
        ]
    })
}

fn timezone_suffix_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"\s+(?:(?:GMT|UTC)(?:[+-]\d{1,2}(?::?\d{2})?)?|[A-Z]{2,5})$")
            .expect("timezone regex should compile")
    })
}

fn illegal_chars_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r#"[<>:"/\\|?*]"#).expect("illegal char regex should compile"))
}

fn whitespace_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"\s+").expect("whitespace regex should compile"))
}

/// Title and date segment of a transcript file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecomposedName {
    pub title: String,
    pub date: Option<InferredDate>,
}

/// Remove the transcript suffix, ignoring case. Other names are returned as is.
pub fn strip_transcript_suffix(name: &str) -> &str {
    let split_at = name.len().saturating_sub(TRANSCRIPT_SUFFIX.len());
    match name.get(split_at..) {
        Some(tail) if tail.eq_ignore_ascii_case(TRANSCRIPT_SUFFIX) => &name[..split_at],
        _ => name,
    }
}

/// Split `Title (date and time) - Transcript` into its parts.
///
/// Without a parenthesized segment the whole stripped name becomes the title.
pub fn decompose_transcript_name(name: &str) -> DecomposedName {
    let stripped = strip_transcript_suffix(name);

    match title_and_date_regex().captures(stripped) {
        Some(captures) => {
            let title = captures.get(1).map_or("", |m| m.as_str()).trim().to_string();
            let raw = captures.get(2).map_or("", |m| m.as_str()).trim().to_string();
            DecomposedName {
                title,
                date: Some(parse_meeting_date(&raw)),
            }
        }
        None => DecomposedName {
            title: stripped.trim().to_string(),
            date: None,
        },
    }
}

/// Guess a meeting code from a file name.
///
/// Transcript names do not normally carry codes, so this can return nothing or
/// match unrelated text such as dates. Treat the result as a hint.
pub fn extract_meeting_code(name: &str) -> Option<String> {
    let lowered = name.to_lowercase();
    code_regexes()
        .iter()
        .find_map(|re| re.captures(&lowered))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Parse the date segment of a transcript name, keeping the raw text.
pub fn parse_meeting_date(raw: &str) -> InferredDate {
    let trimmed = raw.trim();
    // "3:00 PM" looks like a zone abbreviation, so the untouched text goes first.
    let parsed = parse_date_candidate(trimmed)
        .or_else(|| {
            let without_zone = timezone_suffix_regex().replace(trimmed, "");
            parse_date_candidate(without_zone.trim())
        })
        .unwrap_or(ParsedDate::Unparsed);

    InferredDate {
        raw: trimmed.to_string(),
        parsed,
    }
}

fn parse_date_candidate(candidate: &str) -> Option<ParsedDate> {
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(candidate, fmt).ok())
        .map(ParsedDate::DateTime)
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(candidate, fmt).ok())
                .map(ParsedDate::Date)
        })
}

/// Make a string safe to use as a file name component.
///
/// Characters illegal on common file systems become `_`, whitespace runs
/// collapse to a single `_`, and the result is cut to [`MAX_TITLE_CHARS`].
pub fn sanitize_file_name(name: &str) -> String {
    let replaced = illegal_chars_regex().replace_all(name, "_");
    let collapsed = whitespace_regex().replace_all(replaced.trim(), "_");
    collapsed.chars().take(MAX_TITLE_CHARS).collect()
}

/// `<YYYYMMDD_HHMM>_<sanitized title>_transcript.<ext>`
pub fn transcript_file_name(meeting: &MeetingDescriptor, extension: &str) -> String {
    let date = meeting
        .start
        .map(|start| start.local().format("%Y%m%d_%H%M").to_string())
        .unwrap_or_else(|| "unknown_date".to_string());
    format!(
        "{}_{}_transcript.{}",
        date,
        sanitize_file_name(&meeting.title),
        extension.trim_start_matches('.')
    )
}
