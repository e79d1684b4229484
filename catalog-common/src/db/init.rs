//! Database initialization
//!
//! Opens (creating on first run) the shared catalog database and applies the
//! idempotent schema.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    create_audio_table(&pool).await?;

    Ok(pool)
}

/// Create the audio table (one row per provider track)
pub async fn create_audio_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS audio (
            guid TEXT PRIMARY KEY,
            provider TEXT NOT NULL,
            foreign_identifier TEXT NOT NULL,
            foreign_landing_url TEXT NOT NULL,
            audio_url TEXT NOT NULL,
            filetype TEXT,
            duration INTEGER,
            title TEXT,
            creator TEXT,
            creator_url TEXT,
            audio_set TEXT,
            set_foreign_id TEXT,
            set_position INTEGER,
            set_url TEXT,
            set_thumbnail TEXT,
            thumbnail_url TEXT,
            genres TEXT NOT NULL DEFAULT '[]',
            raw_tags TEXT NOT NULL DEFAULT '[]',
            license TEXT NOT NULL,
            license_version TEXT NOT NULL,
            license_url TEXT NOT NULL,
            raw_license_url TEXT NOT NULL,
            meta_data TEXT NOT NULL DEFAULT '{}',
            category TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE(provider, foreign_identifier)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
