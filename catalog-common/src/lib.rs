//! # Catalog Common Library
//!
//! Shared code for all catalog provider ingestion modules including:
//! - Normalized record types handed to storage
//! - Storage sink trait and the SQLite implementation
//! - JSON transport trait and the rate-limited HTTP requester
//! - Creative Commons license resolution
//! - Configuration loading

pub mod config;
pub mod db;
pub mod error;
pub mod licenses;
pub mod models;
pub mod requester;
pub mod sink;

pub use error::{Error, Result};
pub use licenses::LicenseInfo;
pub use models::{AudioMetadata, MediaCategory, NormalizedAudioRecord};
pub use requester::{JsonRequester, QueryParams, UrlResolver};
pub use sink::AudioSink;
