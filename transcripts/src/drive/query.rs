//! Typed search queries.
//!
//! Queries are built from predicates and rendered to the Drive query language
//! only at the adapter boundary, so user-supplied text is always escaped.

use chrono::{DateTime, SecondsFormat, Utc};

use super::FileRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    NameEquals(String),
    NameContains(String),
    MimeTypeEquals(String),
    InParents(String),
    ModifiedAtOrAfter(DateTime<Utc>),
    ModifiedAtOrBefore(DateTime<Utc>),
    Trashed(bool),
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

impl Predicate {
    fn render(&self) -> String {
        match self {
            Predicate::NameEquals(name) => format!("name = '{}'", escape(name)),
            Predicate::NameContains(text) => format!("name contains '{}'", escape(text)),
            Predicate::MimeTypeEquals(mime) => format!("mimeType = '{}'", escape(mime)),
            Predicate::InParents(id) => format!("'{}' in parents", escape(id)),
            Predicate::ModifiedAtOrAfter(t) => format!("modifiedTime >= '{}'", timestamp(t)),
            Predicate::ModifiedAtOrBefore(t) => format!("modifiedTime <= '{}'", timestamp(t)),
            Predicate::Trashed(trashed) => format!("trashed = {}", trashed),
            Predicate::And(parts) => join(parts, " and "),
            Predicate::Or(parts) => join(parts, " or "),
        }
    }

    /// Evaluate against file metadata held in memory.
    ///
    /// Name containment ignores case, as the remote search does.
    pub fn matches(&self, file: &FileRecord) -> bool {
        match self {
            Predicate::NameEquals(name) => file.name == *name,
            Predicate::NameContains(text) => file.name.to_lowercase().contains(&text.to_lowercase()),
            Predicate::MimeTypeEquals(mime) => file.mime_type == *mime,
            Predicate::InParents(id) => file.parents.iter().any(|p| p == id),
            Predicate::ModifiedAtOrAfter(t) => file.modified_time.is_some_and(|m| m >= *t),
            Predicate::ModifiedAtOrBefore(t) => file.modified_time.is_some_and(|m| m <= *t),
            Predicate::Trashed(trashed) => file.trashed == *trashed,
            Predicate::And(parts) => parts.iter().all(|p| p.matches(file)),
            Predicate::Or(parts) => parts.iter().any(|p| p.matches(file)),
        }
    }

    fn is_compound(&self) -> bool {
        matches!(self, Predicate::And(parts) | Predicate::Or(parts) if parts.len() > 1)
    }
}

/// A conjunction of predicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriveQuery {
    predicates: Vec<Predicate>,
}

impl DriveQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn and(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Render to the Drive query language.
    pub fn to_query_string(&self) -> String {
        join(&self.predicates, " and ")
    }

    pub fn matches(&self, file: &FileRecord) -> bool {
        self.predicates.iter().all(|p| p.matches(file))
    }
}

fn join(parts: &[Predicate], separator: &str) -> String {
    parts
        .iter()
        .map(|p| {
            if p.is_compound() {
                format!("({})", p.render())
            } else {
                p.render()
            }
        })
        .collect::<Vec<_>>()
        .join(separator)
}

/// Backslashes first, then single quotes.
fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

fn timestamp(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drive::FOLDER_MIME;
    use chrono::TimeZone;

    #[test]
    fn test_folder_lookup_query() {
        let query = DriveQuery::new()
            .and(Predicate::NameEquals("Meet Recordings".to_string()))
            .and(Predicate::MimeTypeEquals(FOLDER_MIME.to_string()));
        assert_eq!(
            query.to_query_string(),
            "name = 'Meet Recordings' and mimeType = 'application/vnd.google-apps.folder'"
        );
    }

    #[test]
    fn test_user_text_is_escaped() {
        let query = DriveQuery::new().and(Predicate::NameContains(r"Bob's C:\ review".to_string()));
        assert_eq!(query.to_query_string(), r"name contains 'Bob\'s C:\\ review'");
    }

    #[test]
    fn test_nested_disjunction_is_parenthesized() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let query = DriveQuery::new()
            .and(Predicate::ModifiedAtOrAfter(start))
            .and(Predicate::Or(vec![
                Predicate::NameContains("transcript".to_string()),
                Predicate::NameContains("Transcript".to_string()),
            ]))
            .and(Predicate::Trashed(false));
        assert_eq!(
            query.to_query_string(),
            "modifiedTime >= '2024-01-01T00:00:00Z' and (name contains 'transcript' or name contains 'Transcript') and trashed = false"
        );
    }

    #[test]
    fn test_in_memory_evaluation() {
        let file = FileRecord {
            id: "f1".to_string(),
            name: "Weekly Sync (Jan 5, 2024) - Transcript".to_string(),
            mime_type: "text/plain".to_string(),
            parents: vec!["folder".to_string()],
            modified_time: Some(Utc.with_ymd_and_hms(2024, 1, 5, 16, 0, 0).unwrap()),
            ..FileRecord::default()
        };

        let query = DriveQuery::new()
            .and(Predicate::InParents("folder".to_string()))
            .and(Predicate::NameContains("weekly sync".to_string()))
            .and(Predicate::Trashed(false));
        assert!(query.matches(&file));

        let later = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        assert!(!Predicate::ModifiedAtOrAfter(later).matches(&file));
        assert!(!Predicate::InParents("other".to_string()).matches(&file));
    }
}
