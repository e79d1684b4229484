//! Storage sink interface
//!
//! Provider modules hand every normalized record to an [`AudioSink`]. The
//! SQLite implementation lives in [`crate::db::audio`]; [`LoggingAudioSink`]
//! backs dry runs.

use crate::models::NormalizedAudioRecord;
use crate::Result;
use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

/// Destination for normalized audio records
#[async_trait]
pub trait AudioSink: Send + Sync {
    /// Store one record, returning an opaque stored-item identifier
    async fn add_item(&self, record: NormalizedAudioRecord) -> Result<String>;
}

/// Sink that only logs records (used for `--dry-run`)
#[derive(Debug, Default)]
pub struct LoggingAudioSink;

#[async_trait]
impl AudioSink for LoggingAudioSink {
    async fn add_item(&self, record: NormalizedAudioRecord) -> Result<String> {
        info!(
            foreign_identifier = %record.foreign_identifier,
            title = ?record.title,
            creator = ?record.creator,
            license = %record.license_info.license,
            "Dry run: would store audio record"
        );
        Ok(Uuid::new_v4().to_string())
    }
}
