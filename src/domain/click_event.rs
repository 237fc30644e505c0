//! Click event model for the pixel pipeline.

use chrono::{DateTime, Utc};

use crate::domain::entities::RequestMetadata;

/// A pixel hit waiting to be recorded.
///
/// Handlers push it onto a bounded channel and answer immediately; the
/// [`crate::domain::click_worker`] resolves the code and stores the click.
#[derive(Debug, Clone)]
pub struct ClickEvent {
    pub code: String,
    pub metadata: RequestMetadata,
    pub received_at: DateTime<Utc>,
}

impl ClickEvent {
    pub fn new(code: impl Into<String>, metadata: RequestMetadata) -> Self {
        Self {
            code: code.into(),
            metadata,
            received_at: Utc::now(),
        }
    }
}
