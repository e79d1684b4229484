//! Audio record persistence
//!
//! SQLite-backed [`AudioSink`]. Rows are keyed by `(provider,
//! foreign_identifier)`; storing the same track again refreshes the row and
//! keeps its guid.

use crate::models::NormalizedAudioRecord;
use crate::sink::AudioSink;
use crate::{Error, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Audio sink writing to the shared catalog database
#[derive(Clone)]
pub struct SqliteAudioStore {
    pool: SqlitePool,
    provider: String,
}

impl SqliteAudioStore {
    /// Create a store tagging every row with `provider`
    pub fn new(pool: SqlitePool, provider: impl Into<String>) -> Self {
        Self {
            pool,
            provider: provider.into(),
        }
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// Number of rows stored for this store's provider
    pub async fn count_items(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM audio WHERE provider = ?")
            .bind(&self.provider)
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    /// Load a stored record by foreign identifier
    pub async fn load_item(&self, foreign_identifier: &str) -> Result<Option<NormalizedAudioRecord>> {
        let row = sqlx::query(
            r#"
            SELECT foreign_identifier, foreign_landing_url, audio_url, filetype, duration,
                   title, creator, creator_url, audio_set, set_foreign_id, set_position,
                   set_url, set_thumbnail, thumbnail_url, genres, raw_tags, license,
                   license_version, license_url, raw_license_url, meta_data, category
            FROM audio
            WHERE provider = ? AND foreign_identifier = ?
            "#,
        )
        .bind(&self.provider)
        .bind(foreign_identifier)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let genres: String = row.get("genres");
        let raw_tags: String = row.get("raw_tags");
        let meta_data: String = row.get("meta_data");
        let category: String = row.get("category");
        let duration: Option<i64> = row.get("duration");
        let set_position: Option<i64> = row.get("set_position");

        Ok(Some(NormalizedAudioRecord {
            foreign_identifier: row.get("foreign_identifier"),
            foreign_landing_url: row.get("foreign_landing_url"),
            audio_url: row.get("audio_url"),
            filetype: row.get("filetype"),
            duration: duration.and_then(|d| u64::try_from(d).ok()),
            title: row.get("title"),
            creator: row.get("creator"),
            creator_url: row.get("creator_url"),
            audio_set: row.get("audio_set"),
            set_foreign_id: row.get("set_foreign_id"),
            set_position: set_position.and_then(|p| u32::try_from(p).ok()),
            set_url: row.get("set_url"),
            set_thumbnail: row.get("set_thumbnail"),
            thumbnail_url: row.get("thumbnail_url"),
            genres: serde_json::from_str(&genres)?,
            raw_tags: serde_json::from_str(&raw_tags)?,
            license_info: crate::LicenseInfo {
                license: row.get("license"),
                version: row.get("license_version"),
                url: row.get("license_url"),
                raw_url: row.get("raw_license_url"),
            },
            meta_data: serde_json::from_str(&meta_data)?,
            category: serde_json::from_value(serde_json::Value::String(category))?,
        }))
    }
}

#[async_trait]
impl AudioSink for SqliteAudioStore {
    async fn add_item(&self, record: NormalizedAudioRecord) -> Result<String> {
        if record.foreign_identifier.is_empty() || record.audio_url.is_empty() {
            return Err(Error::InvalidInput(format!(
                "audio record from {} lacks identifier or audio URL",
                self.provider
            )));
        }

        let guid: String = sqlx::query_scalar(
            r#"
            INSERT INTO audio (
                guid, provider, foreign_identifier, foreign_landing_url, audio_url, filetype,
                duration, title, creator, creator_url, audio_set, set_foreign_id, set_position,
                set_url, set_thumbnail, thumbnail_url, genres, raw_tags, license,
                license_version, license_url, raw_license_url, meta_data, category
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(provider, foreign_identifier) DO UPDATE SET
                foreign_landing_url = excluded.foreign_landing_url,
                audio_url = excluded.audio_url,
                filetype = excluded.filetype,
                duration = excluded.duration,
                title = excluded.title,
                creator = excluded.creator,
                creator_url = excluded.creator_url,
                audio_set = excluded.audio_set,
                set_foreign_id = excluded.set_foreign_id,
                set_position = excluded.set_position,
                set_url = excluded.set_url,
                set_thumbnail = excluded.set_thumbnail,
                thumbnail_url = excluded.thumbnail_url,
                genres = excluded.genres,
                raw_tags = excluded.raw_tags,
                license = excluded.license,
                license_version = excluded.license_version,
                license_url = excluded.license_url,
                raw_license_url = excluded.raw_license_url,
                meta_data = excluded.meta_data,
                category = excluded.category,
                updated_at = CURRENT_TIMESTAMP
            RETURNING guid
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&self.provider)
        .bind(&record.foreign_identifier)
        .bind(&record.foreign_landing_url)
        .bind(&record.audio_url)
        .bind(&record.filetype)
        .bind(record.duration.and_then(|d| i64::try_from(d).ok()))
        .bind(&record.title)
        .bind(&record.creator)
        .bind(&record.creator_url)
        .bind(&record.audio_set)
        .bind(&record.set_foreign_id)
        .bind(record.set_position.map(i64::from))
        .bind(&record.set_url)
        .bind(&record.set_thumbnail)
        .bind(&record.thumbnail_url)
        .bind(serde_json::to_string(&record.genres)?)
        .bind(serde_json::to_string(&record.raw_tags)?)
        .bind(&record.license_info.license)
        .bind(&record.license_info.version)
        .bind(&record.license_info.url)
        .bind(&record.license_info.raw_url)
        .bind(serde_json::to_string(&record.meta_data)?)
        .bind(record.category.as_str())
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(
            provider = %self.provider,
            foreign_identifier = %record.foreign_identifier,
            guid = %guid,
            "Stored audio record"
        );

        Ok(guid)
    }
}
