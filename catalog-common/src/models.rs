//! Normalized record types handed from provider modules to storage

use crate::licenses::LicenseInfo;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Media category of a stored audio record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaCategory {
    Music,
    SoundEffect,
    Podcast,
}

impl MediaCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaCategory::Music => "music",
            MediaCategory::SoundEffect => "sound_effect",
            MediaCategory::Podcast => "podcast",
        }
    }
}

impl fmt::Display for MediaCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider-specific counters kept alongside a record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioMetadata {
    pub downloads: u64,
    pub listens: u64,
    pub playlists: u64,
    pub release_date: Option<String>,
}

/// Storage-ready audio record
///
/// Only constructed once identifier, audio URL and license are known, so a
/// value of this type is always complete enough to store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedAudioRecord {
    pub foreign_identifier: String,
    pub foreign_landing_url: String,
    pub audio_url: String,
    pub filetype: Option<String>,
    /// Duration in milliseconds
    pub duration: Option<u64>,
    pub title: Option<String>,
    pub creator: Option<String>,
    pub creator_url: Option<String>,
    /// Name of the set (album) the track belongs to
    pub audio_set: Option<String>,
    pub set_foreign_id: Option<String>,
    pub set_position: Option<u32>,
    pub set_url: Option<String>,
    pub set_thumbnail: Option<String>,
    pub thumbnail_url: Option<String>,
    pub genres: Vec<String>,
    pub raw_tags: Vec<String>,
    pub license_info: LicenseInfo,
    pub meta_data: AudioMetadata,
    pub category: MediaCategory,
}
