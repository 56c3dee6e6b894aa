use std::sync::Arc;

use crate::calendar::CalendarApi;
use crate::drive::DriveApi;
use crate::retry::{RetryPolicy, RetryingCalendar, RetryingDrive};

/// The authenticated backends every operation runs against.
///
/// Built once (see [`crate::google::connect`]) and passed to the service.
#[derive(Clone)]
pub struct Session {
    pub calendar: Arc<dyn CalendarApi>,
    pub drive: Arc<dyn DriveApi>,
}

impl Session {
    pub fn new(calendar: Arc<dyn CalendarApi>, drive: Arc<dyn DriveApi>) -> Self {
        Self { calendar, drive }
    }

    /// The same backends, with every call run under `policy`.
    pub fn with_retry(self, policy: RetryPolicy) -> Self {
        Self {
            calendar: Arc::new(RetryingCalendar::new(self.calendar, policy.clone())),
            drive: Arc::new(RetryingDrive::new(self.drive, policy)),
        }
    }
}
