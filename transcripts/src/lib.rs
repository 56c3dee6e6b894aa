//! Google Meet transcript discovery.
//!
//! Lists meetings from the calendar, finds the transcript documents the
//! conferencing service saved to drive, and turns them into text or local files.

pub mod calendar;
pub mod config;
pub mod content;
pub mod drive;
pub mod error;
pub mod google;
pub mod link;
pub mod locator;
pub mod models;
pub mod naming;
pub mod retry;
pub mod service;
pub mod session;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use config::TranscriptsConfig;
pub use content::TranscriptText;
pub use error::{RemoteError, RemoteErrorKind, Result, TranscriptError};
pub use link::MeetingLink;
pub use locator::LocateRequest;
pub use models::{EventTime, InferredDate, MeetingDescriptor, ParsedDate, TranscriptDescriptor};
pub use service::TranscriptService;
pub use session::Session;
