// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! An in-memory transport, handy for tests and embedded resources.

use super::decode_data_uri;
use porter_core::fetch::{FetchError, FetchRequest, Fetcher, SettlementSender};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Serves bytes registered under exact URLs.
///
/// Requests settle immediately from inside [`Fetcher::fetch`]; the loader
/// still observes them only when it drains its settlements. `data:` URIs are
/// decoded inline, unknown URLs settle as [`FetchError::NotFound`].
///
/// Clones share the same resource table and request log.
#[derive(Debug, Clone, Default)]
pub struct MemoryFetcher {
    resources: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    requested: Arc<Mutex<Vec<String>>>,
}

impl MemoryFetcher {
    /// Creates an empty fetcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `bytes` under `url`, replacing any previous body.
    pub fn insert(&self, url: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        if let Ok(mut resources) = self.resources.lock() {
            resources.insert(url.into(), bytes.into());
        }
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(self, url: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(url, bytes);
        self
    }

    /// Removes the body registered under `url`.
    pub fn remove(&self, url: &str) -> bool {
        self.resources
            .lock()
            .map(|mut resources| resources.remove(url).is_some())
            .unwrap_or(false)
    }

    /// Every URL requested so far, in request order.
    pub fn requested(&self) -> Vec<String> {
        self.requested
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }

    fn lookup(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        if url.starts_with("data:") {
            return decode_data_uri(url);
        }
        self.resources
            .lock()
            .ok()
            .and_then(|resources| resources.get(url).cloned())
            .ok_or_else(|| FetchError::NotFound(url.to_string()))
    }
}

impl Fetcher for MemoryFetcher {
    fn fetch(&mut self, request: FetchRequest, settle: SettlementSender) {
        if let Ok(mut log) = self.requested.lock() {
            log.push(request.url.clone());
        }
        settle.settle(self.lookup(&request.url));
    }
}
