//! Test doubles for the Jamendo ingester
//!
//! In-memory transport and storage so ingestion runs without network or
//! database access.

#![allow(dead_code)]

use async_trait::async_trait;
use catalog_common::{
    AudioSink, Error, JsonRequester, NormalizedAudioRecord, QueryParams, Result, UrlResolver,
};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Load a JSON fixture from `tests/fixtures`
pub fn fixture(name: &str) -> Value {
    let path = format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name);
    let content = std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("read {}: {}", path, e));
    serde_json::from_str(&content).unwrap_or_else(|e| panic!("parse {}: {}", path, e))
}

/// Requester returning queued responses in order, then `None`
#[derive(Default)]
pub struct FakeRequester {
    responses: Mutex<VecDeque<Result<Option<Value>>>>,
    calls: Mutex<Vec<(String, QueryParams)>>,
}

impl FakeRequester {
    pub fn new(responses: Vec<Option<Value>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(Ok).collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue a transport failure after the current responses
    pub fn push_error(&self, message: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(Error::Transport(message.to_string())));
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// `offset` parameter of every request, in order
    pub fn offsets(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, params)| params.get("offset").cloned().unwrap_or_default())
            .collect()
    }

    pub fn calls(&self) -> Vec<(String, QueryParams)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl JsonRequester for FakeRequester {
    async fn get_response_json(&self, endpoint: &str, params: &QueryParams) -> Result<Option<Value>> {
        self.calls
            .lock()
            .unwrap()
            .push((endpoint.to_string(), params.clone()));
        self.responses.lock().unwrap().pop_front().unwrap_or(Ok(None))
    }
}

/// Sink keeping every record it receives
#[derive(Default)]
pub struct RecordingSink {
    records: Mutex<Vec<NormalizedAudioRecord>>,
}

impl RecordingSink {
    pub fn records(&self) -> Vec<NormalizedAudioRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn identifiers(&self) -> Vec<String> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.foreign_identifier.clone())
            .collect()
    }
}

#[async_trait]
impl AudioSink for RecordingSink {
    async fn add_item(&self, record: NormalizedAudioRecord) -> Result<String> {
        let mut records = self.records.lock().unwrap();
        records.push(record);
        Ok(records.len().to_string())
    }
}

/// Sink that accepts `accept` records, then fails every call
pub struct FailingSink {
    accept: usize,
    stored: Mutex<Vec<String>>,
}

impl FailingSink {
    pub fn after(accept: usize) -> Self {
        Self {
            accept,
            stored: Mutex::new(Vec::new()),
        }
    }

    pub fn stored(&self) -> Vec<String> {
        self.stored.lock().unwrap().clone()
    }
}

#[async_trait]
impl AudioSink for FailingSink {
    async fn add_item(&self, record: NormalizedAudioRecord) -> Result<String> {
        let mut stored = self.stored.lock().unwrap();
        if stored.len() >= self.accept {
            return Err(Error::Internal("disk full".to_string()));
        }
        stored.push(record.foreign_identifier);
        Ok(stored.len().to_string())
    }
}

/// Resolver following a fixed redirect table; unknown URLs resolve to themselves
#[derive(Default)]
pub struct FakeResolver {
    redirects: HashMap<String, String>,
    failing: Vec<String>,
    calls: Mutex<Vec<String>>,
}

impl FakeResolver {
    pub fn redirect(mut self, from: &str, to: &str) -> Self {
        self.redirects.insert(from.to_string(), to.to_string());
        self
    }

    /// Make resolving `url` fail with a transport error
    pub fn failing(mut self, url: &str) -> Self {
        self.failing.push(url.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl UrlResolver for FakeResolver {
    async fn resolve_url(&self, url: &str) -> Result<String> {
        self.calls.lock().unwrap().push(url.to_string());
        if self.failing.iter().any(|f| f == url) {
            return Err(Error::Transport(format!("{} returned 503", url)));
        }
        Ok(self.redirects.get(url).cloned().unwrap_or_else(|| url.to_string()))
    }
}
