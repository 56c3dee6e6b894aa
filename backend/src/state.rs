use std::sync::Arc;

use transcripts::TranscriptService;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<TranscriptService>,
}

impl AppState {
    pub fn new(service: TranscriptService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}
