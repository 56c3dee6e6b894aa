//! Bounded exponential backoff for remote calls.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::calendar::{CalendarApi, EventWindow, RawEvent};
use crate::config::RetryConfig;
use crate::drive::{DriveApi, DriveQuery, FieldSet, FileRecord};
use crate::error::RemoteError;

/// Retries transient remote failures with exponentially increasing delays.
///
/// Permanent failures are returned on the first attempt.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before retry number `n_past_retries + 1`.
    fn exponential_delay(&self, n_past_retries: u32) -> Duration {
        let delay = self.base_delay.as_secs_f64() * 2_f64.powi(n_past_retries as i32);
        Duration::from_secs_f64(delay.min(self.max_delay.as_secs_f64()))
    }

    /// Run `call` until it succeeds, fails permanently, or attempts run out.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut call: F) -> Result<T, RemoteError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RemoteError>>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match call().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < self.max_attempts => {
                    let delay = self.exponential_delay(attempt - 1);
                    tracing::warn!(
                        "{} failed (attempt {}/{}), retrying in {:?}: {}",
                        operation,
                        attempt,
                        self.max_attempts,
                        delay,
                        err.message
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.base_delay_ms),
            Duration::from_millis(config.max_delay_ms),
        )
    }
}

/// [`CalendarApi`] whose calls are repeated on transient failure.
pub struct RetryingCalendar {
    inner: Arc<dyn CalendarApi>,
    policy: RetryPolicy,
}

impl RetryingCalendar {
    pub fn new(inner: Arc<dyn CalendarApi>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl CalendarApi for RetryingCalendar {
    async fn list_events(&self, window: &EventWindow) -> Result<Vec<RawEvent>, RemoteError> {
        self.policy
            .run("list calendar events", || self.inner.list_events(window))
            .await
    }

    async fn get_event(&self, event_id: &str) -> Result<Option<RawEvent>, RemoteError> {
        self.policy
            .run("get calendar event", || self.inner.get_event(event_id))
            .await
    }
}

/// [`DriveApi`] whose calls are repeated on transient failure.
///
/// A failed search is repeated from its first page.
pub struct RetryingDrive {
    inner: Arc<dyn DriveApi>,
    policy: RetryPolicy,
}

impl RetryingDrive {
    pub fn new(inner: Arc<dyn DriveApi>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl DriveApi for RetryingDrive {
    async fn search(&self, query: &DriveQuery, fields: FieldSet) -> Result<Vec<FileRecord>, RemoteError> {
        self.policy
            .run("search drive files", || self.inner.search(query, fields))
            .await
    }

    async fn get_metadata(&self, file_id: &str) -> Result<Option<FileRecord>, RemoteError> {
        self.policy
            .run("get file metadata", || self.inner.get_metadata(file_id))
            .await
    }

    async fn get_content(&self, file_id: &str) -> Result<Vec<u8>, RemoteError> {
        self.policy
            .run("download file", || self.inner.get_content(file_id))
            .await
    }

    async fn export(&self, file_id: &str, mime_type: &str) -> Result<Vec<u8>, RemoteError> {
        self.policy
            .run("export document", || self.inner.export(file_id, mime_type))
            .await
    }
}
