//! Jamendo ingestion loop
//!
//! Pages through the tracks endpoint one offset at a time, strictly in
//! sequence: a page is fetched, every item is extracted and stored, and only
//! then is the next page requested. Politeness delays and retries are the
//! requester's business; transport and storage errors abort the run as-is.
//!
//! With a [`UrlResolver`] attached, landing, artist and album URLs are
//! rewritten to the page Jamendo redirects them to before storage. Each
//! distinct URL is resolved once per ingester.

use crate::config::JamendoConfig;
use crate::extractor::extract_audio_data;
use crate::query_params::{build_query_params, default_query_params};
use catalog_common::{AudioSink, JsonRequester, NormalizedAudioRecord, QueryParams, Result, UrlResolver};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Drives one ingestion run against injected transport and storage
pub struct JamendoIngester {
    requester: Arc<dyn JsonRequester>,
    sink: Arc<dyn AudioSink>,
    endpoint: String,
    /// Defaults plus client id; `offset` is added per page
    query_params: QueryParams,
    page_size: u32,
    max_pages: Option<u32>,
    url_resolver: Option<Arc<dyn UrlResolver>>,
    resolved_urls: Mutex<HashMap<String, String>>,
}

impl JamendoIngester {
    pub fn new(
        config: &JamendoConfig,
        requester: Arc<dyn JsonRequester>,
        sink: Arc<dyn AudioSink>,
    ) -> Self {
        let mut query_params = default_query_params();
        query_params.insert("client_id".to_string(), config.client_id.clone());
        query_params.insert("limit".to_string(), config.page_size.to_string());

        Self {
            requester,
            sink,
            endpoint: config.endpoint.clone(),
            query_params,
            page_size: config.page_size,
            max_pages: config.max_pages,
            url_resolver: None,
            resolved_urls: Mutex::new(HashMap::new()),
        }
    }

    /// Rewrite page URLs through `resolver` before storing records
    pub fn with_url_resolver(mut self, resolver: Arc<dyn UrlResolver>) -> Self {
        self.url_resolver = Some(resolver);
        self
    }

    /// Base parameters sent with every page request
    pub fn query_params(&self) -> &QueryParams {
        &self.query_params
    }

    /// Run until the API stops returning items; returns the stored count
    pub async fn run_ingestion(&self) -> Result<u64> {
        let mut offset = 0u32;
        let mut pages = 0u32;
        let mut total_stored = 0u64;

        info!(endpoint = %self.endpoint, "Starting Jamendo ingestion");

        loop {
            if self.max_pages.is_some_and(|max| pages >= max) {
                info!(pages, "Page limit reached, stopping");
                break;
            }

            let items = match self.get_batch(offset, None).await? {
                Some(items) if !items.is_empty() => items,
                _ => {
                    debug!(offset, "No more results");
                    break;
                }
            };

            let stored = self.process_batch(&items).await?;
            total_stored += stored;
            pages += 1;

            info!(
                offset,
                fetched = items.len(),
                stored,
                total_stored,
                "Processed Jamendo page"
            );

            offset = match offset.checked_add(self.page_size) {
                Some(next) => next,
                None => {
                    warn!(offset, "Offset limit reached, stopping");
                    break;
                }
            };
        }

        info!(pages, total_stored, "Jamendo ingestion finished");
        Ok(total_stored)
    }

    /// Fetch the page at `offset`
    ///
    /// `query_params` replaces the ingester's base parameters when given.
    /// Returns `None` when the response is absent or has no `results` array.
    pub async fn get_batch(
        &self,
        offset: u32,
        query_params: Option<&QueryParams>,
    ) -> Result<Option<Vec<Value>>> {
        let params = build_query_params(offset, Some(query_params.unwrap_or(&self.query_params)));

        let Some(mut body) = self
            .requester
            .get_response_json(&self.endpoint, &params)
            .await?
        else {
            return Ok(None);
        };

        log_api_error(&body, offset);

        match body.get_mut("results").map(Value::take) {
            Some(Value::Array(items)) => Ok(Some(items)),
            _ => Ok(None),
        }
    }

    /// Extract every item and store the valid ones; returns the stored count
    ///
    /// Items that fail extraction are skipped. A storage error stops the
    /// batch, leaving earlier items of the batch stored.
    pub async fn process_batch(&self, items: &[Value]) -> Result<u64> {
        let mut stored = 0u64;
        let mut skipped = 0usize;

        for item in items {
            match extract_audio_data(item) {
                Some(mut record) => {
                    self.cleanse_urls(&mut record).await;
                    self.sink.add_item(record).await?;
                    stored += 1;
                }
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            debug!(skipped, stored, "Skipped invalid Jamendo items");
        }

        Ok(stored)
    }

    async fn cleanse_urls(&self, record: &mut NormalizedAudioRecord) {
        let Some(resolver) = &self.url_resolver else {
            return;
        };

        record.foreign_landing_url = self
            .cleanse_url(resolver.as_ref(), &record.foreign_landing_url)
            .await;
        for slot in [&mut record.creator_url, &mut record.set_url] {
            if let Some(url) = slot.take() {
                *slot = Some(self.cleanse_url(resolver.as_ref(), &url).await);
            }
        }
    }

    /// Resolved form of `url`; the URL itself when resolution fails
    async fn cleanse_url(&self, resolver: &dyn UrlResolver, url: &str) -> String {
        if let Some(hit) = self.resolved_urls.lock().await.get(url) {
            return hit.clone();
        }

        let resolved = match resolver.resolve_url(url).await {
            Ok(resolved) => resolved,
            Err(e) => {
                debug!(url, error = %e, "Keeping unresolved URL");
                url.to_string()
            }
        };

        self.resolved_urls
            .lock()
            .await
            .insert(url.to_string(), resolved.clone());
        resolved
    }
}

/// Jamendo reports request problems in `headers` with a 200 status
fn log_api_error(body: &Value, offset: u32) {
    let Some(headers) = body.get("headers") else {
        return;
    };

    let code = headers.get("code").and_then(Value::as_i64).unwrap_or(0);
    if code == 0 {
        return;
    }

    // Locals keep serde_json::Value out of the macro, which shadows `Value`
    let status = headers.get("status").and_then(Value::as_str).unwrap_or("");
    let message = headers
        .get("error_message")
        .and_then(Value::as_str)
        .unwrap_or("");
    warn!(offset, code, status, message, "Jamendo API reported an error");
}
