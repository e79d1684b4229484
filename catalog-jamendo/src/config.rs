//! Configuration resolution for catalog-jamendo
//!
//! Combines command-line overrides, the `JAMENDO_CLIENT_ID` environment
//! variable and the `[jamendo]` section of `catalog.toml`.

use crate::query_params::{PAGE_SIZE, TRACKS_ENDPOINT};
use catalog_common::config::{resolve_api_key, TomlConfig};
use catalog_common::requester::RequesterSettings;
use catalog_common::Result;
use std::time::Duration;

/// Environment variable holding the Jamendo client id
pub const CLIENT_ID_ENV: &str = "JAMENDO_CLIENT_ID";

/// Everything the Jamendo ingester needs to run
#[derive(Debug, Clone)]
pub struct JamendoConfig {
    pub endpoint: String,
    pub client_id: String,
    /// Offset step between pages; matches the `limit` parameter
    pub page_size: u32,
    /// Stop after this many pages (None: run until the API is exhausted)
    pub max_pages: Option<u32>,
    pub requester: RequesterSettings,
}

impl JamendoConfig {
    /// Defaults for everything but the client id
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            endpoint: TRACKS_ENDPOINT.to_string(),
            client_id: client_id.into(),
            page_size: PAGE_SIZE,
            max_pages: None,
            requester: RequesterSettings::default(),
        }
    }

    /// Resolve from CLI overrides and the TOML file
    ///
    /// Client id priority: CLI → ENV → TOML. Missing everywhere is an error.
    pub fn resolve(
        cli_client_id: Option<&str>,
        max_pages: Option<u32>,
        toml_config: &TomlConfig,
    ) -> Result<Self> {
        let section = &toml_config.jamendo;
        let client_id = resolve_api_key(
            "Jamendo",
            cli_client_id,
            CLIENT_ID_ENV,
            section.client_id.as_deref(),
        )?;

        let mut config = Self::new(client_id);
        config.max_pages = max_pages;

        if let Some(ms) = section.request_delay_ms {
            config.requester.delay = Duration::from_millis(ms);
        }
        if let Some(retries) = section.max_retries {
            config.requester.max_retries = retries;
        }
        if let Some(secs) = section.timeout_secs {
            config.requester.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}
