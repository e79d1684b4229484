//! catalog-jamendo library interface
//!
//! Jamendo provider ingestion: pages through the `/v3.0/tracks` API,
//! normalizes every track into a [`catalog_common::NormalizedAudioRecord`]
//! and hands the valid ones to an [`catalog_common::AudioSink`].

pub mod config;
pub mod extractor;
pub mod ingester;
pub mod models;
pub mod query_params;
pub mod tags;
pub mod url_utils;

pub use crate::config::JamendoConfig;
pub use crate::extractor::{extract_audio_data, AudioSetInfo, CreatorInfo};
pub use crate::ingester::JamendoIngester;

/// Provider name stored with every record
pub const PROVIDER: &str = "jamendo";
