//! In-memory calendar and drive backends.
//!
//! They evaluate queries locally and count calls, which is what the locator
//! and pipeline tests assert on.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::calendar::{CalendarApi, EventWindow, RawEvent};
use crate::drive::{DriveApi, DriveQuery, FieldSet, FileRecord};
use crate::error::RemoteError;

#[derive(Default)]
pub struct FakeCalendar {
    events: Mutex<Vec<RawEvent>>,
    failure: Mutex<Option<RemoteError>>,
    scripted: Mutex<VecDeque<RemoteError>>,
    windows: Mutex<Vec<EventWindow>>,
}

impl FakeCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_events(events: Vec<RawEvent>) -> Self {
        let calendar = Self::new();
        *lock(&calendar.events) = events;
        calendar
    }

    /// Every subsequent call fails with `error`.
    pub fn fail_with(&self, error: RemoteError) {
        *lock(&self.failure) = Some(error);
    }

    /// The next call fails with `error`. Queued errors are used up in order
    /// before any `fail_with` error applies.
    pub fn fail_next(&self, error: RemoteError) {
        lock(&self.scripted).push_back(error);
    }

    /// Windows passed to `list_events`, oldest first.
    pub fn windows(&self) -> Vec<EventWindow> {
        lock(&self.windows).clone()
    }

    fn check_failure(&self) -> Result<(), RemoteError> {
        next_failure(&self.scripted, &self.failure)
    }
}

#[async_trait]
impl CalendarApi for FakeCalendar {
    async fn list_events(&self, window: &EventWindow) -> Result<Vec<RawEvent>, RemoteError> {
        lock(&self.windows).push(window.clone());
        self.check_failure()?;
        Ok(lock(&self.events).clone())
    }

    async fn get_event(&self, event_id: &str) -> Result<Option<RawEvent>, RemoteError> {
        self.check_failure()?;
        Ok(lock(&self.events)
            .iter()
            .find(|e| e.id.as_deref() == Some(event_id))
            .cloned())
    }
}

#[derive(Default)]
pub struct FakeDrive {
    files: Mutex<Vec<(FileRecord, Vec<u8>)>>,
    exports: Mutex<HashMap<(String, String), Vec<u8>>>,
    failure: Mutex<Option<RemoteError>>,
    scripted: Mutex<VecDeque<RemoteError>>,
    queries: Mutex<Vec<String>>,
    search_calls: AtomicUsize,
    content_calls: AtomicUsize,
    export_calls: AtomicUsize,
}

impl FakeDrive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&self, record: FileRecord, content: &[u8]) {
        lock(&self.files).push((record, content.to_vec()));
    }

    /// Bytes returned when `file_id` is exported as `mime_type`.
    pub fn add_export(&self, file_id: &str, mime_type: &str, content: &[u8]) {
        lock(&self.exports).insert((file_id.to_string(), mime_type.to_string()), content.to_vec());
    }

    /// Every subsequent call fails with `error`.
    pub fn fail_with(&self, error: RemoteError) {
        *lock(&self.failure) = Some(error);
    }

    /// The next call fails with `error`. Queued errors are used up in order
    /// before any `fail_with` error applies.
    pub fn fail_next(&self, error: RemoteError) {
        lock(&self.scripted).push_back(error);
    }

    /// Rendered query strings, in call order.
    pub fn queries(&self) -> Vec<String> {
        lock(&self.queries).clone()
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn content_calls(&self) -> usize {
        self.content_calls.load(Ordering::SeqCst)
    }

    pub fn export_calls(&self) -> usize {
        self.export_calls.load(Ordering::SeqCst)
    }

    fn check_failure(&self) -> Result<(), RemoteError> {
        next_failure(&self.scripted, &self.failure)
    }
}

#[async_trait]
impl DriveApi for FakeDrive {
    async fn search(&self, query: &DriveQuery, _fields: FieldSet) -> Result<Vec<FileRecord>, RemoteError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.queries).push(query.to_query_string());
        self.check_failure()?;

        Ok(lock(&self.files)
            .iter()
            .filter(|(record, _)| query.matches(record))
            .map(|(record, _)| record.clone())
            .collect())
    }

    async fn get_metadata(&self, file_id: &str) -> Result<Option<FileRecord>, RemoteError> {
        self.check_failure()?;
        Ok(lock(&self.files)
            .iter()
            .find(|(record, _)| record.id == file_id)
            .map(|(record, _)| record.clone()))
    }

    async fn get_content(&self, file_id: &str) -> Result<Vec<u8>, RemoteError> {
        self.content_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        lock(&self.files)
            .iter()
            .find(|(record, _)| record.id == file_id)
            .map(|(_, content)| content.clone())
            .ok_or_else(|| RemoteError::permanent("download file", format!("{} not found", file_id)))
    }

    async fn export(&self, file_id: &str, mime_type: &str) -> Result<Vec<u8>, RemoteError> {
        self.export_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        lock(&self.exports)
            .get(&(file_id.to_string(), mime_type.to_string()))
            .cloned()
            .ok_or_else(|| {
                RemoteError::permanent(
                    "export document",
                    format!("{} has no {} export", file_id, mime_type),
                )
            })
    }
}

fn next_failure(
    scripted: &Mutex<VecDeque<RemoteError>>,
    failure: &Mutex<Option<RemoteError>>,
) -> Result<(), RemoteError> {
    if let Some(error) = lock(scripted).pop_front() {
        return Err(error);
    }
    match lock(failure).clone() {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
