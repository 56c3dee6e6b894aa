pub mod health;
pub mod meetings;
pub mod transcripts;

use ::transcripts::TranscriptError;

use crate::error::ApiResult;

/// Listing endpoints answer with an empty list and a warning when the remote
/// backend fails, instead of an error status.
fn degrade<T>(result: Result<Vec<T>, TranscriptError>) -> ApiResult<(Vec<T>, Option<String>)> {
    match result {
        Ok(items) => Ok((items, None)),
        Err(TranscriptError::Remote(e)) => {
            tracing::warn!("Returning empty list: {}", e);
            Ok((Vec::new(), Some(e.to_string())))
        }
        Err(e) => Err(e.into()),
    }
}
