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

//! The contract between the loader and the transports that actually fetch bytes.
//!
//! A [`Fetcher`] receives a [`FetchRequest`] together with a
//! [`SettlementSender`]. The sender is consumed when the fetch settles, and a
//! sender that is dropped unused settles the request as
//! [`FetchError::Dropped`], so every request settles exactly once.
//!
//! Settlements travel over a channel back to the loader, which drains them
//! one at a time on its own thread.

mod settings;

pub use settings::*;

use crate::item::{FileType, ItemId};
use thiserror::Error;

/// Identifies one load cycle. A settlement carrying a stale token is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct CycleToken(u64);

impl CycleToken {
    /// The token following this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// The raw counter value.
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Errors a fetcher can settle a request with.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Reading the resource failed.
    #[error("I/O error while fetching '{url}': {source}")]
    Io {
        /// The URL being fetched.
        url: String,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
    /// A `data:` URI could not be decoded.
    #[error("malformed data URI: {0}")]
    InvalidDataUri(String),
    /// The fetcher has nothing registered under the URL.
    #[error("resource not found: '{0}'")]
    NotFound(String),
    /// The fetcher cannot handle the URL's scheme.
    #[error("unsupported URL '{0}'")]
    Unsupported(String),
    /// The fetch took longer than the configured timeout.
    #[error("fetch of '{url}' timed out after {timeout_ms} ms")]
    TimedOut {
        /// The URL being fetched.
        url: String,
        /// The configured timeout.
        timeout_ms: u64,
    },
    /// The fetcher discarded the request without settling it.
    #[error("fetcher dropped the request without settling it")]
    Dropped,
}

/// Everything a fetcher needs to retrieve one item.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    /// The item being fetched.
    pub item: ItemId,
    /// The item's key, for logging.
    pub key: String,
    /// The item's file type.
    pub file_type: FileType,
    /// The fully resolved URL.
    pub url: String,
    /// Effective fetch settings for this item.
    pub settings: FetchSettings,
    /// Effective cross-origin policy for this item.
    pub cross_origin: Option<String>,
}

/// The outcome of a single fetch, as delivered back to the loader.
#[derive(Debug)]
pub struct Settlement {
    /// The settled item.
    pub item: ItemId,
    /// The cycle the request was issued in.
    pub cycle: CycleToken,
    /// The fetched bytes, or why the fetch failed.
    pub outcome: Result<Vec<u8>, FetchError>,
}

impl Settlement {
    /// Whether the fetch succeeded.
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// One-shot handle a fetcher uses to settle a request.
///
/// Consumed by [`settle`](Self::settle). Dropping it unused settles the
/// request as [`FetchError::Dropped`].
#[derive(Debug)]
pub struct SettlementSender {
    item: ItemId,
    cycle: CycleToken,
    tx: Option<flume::Sender<Settlement>>,
}

impl SettlementSender {
    /// Creates a sender for `item` in `cycle` that reports on `tx`.
    pub fn new(item: ItemId, cycle: CycleToken, tx: flume::Sender<Settlement>) -> Self {
        Self {
            item,
            cycle,
            tx: Some(tx),
        }
    }

    /// The item this sender settles.
    pub fn item(&self) -> ItemId {
        self.item
    }

    /// Settles the request with `outcome`.
    pub fn settle(mut self, outcome: Result<Vec<u8>, FetchError>) {
        self.send(outcome);
    }

    /// Settles the request successfully.
    pub fn succeed(self, bytes: Vec<u8>) {
        self.settle(Ok(bytes));
    }

    /// Settles the request as failed.
    pub fn fail(self, error: FetchError) {
        self.settle(Err(error));
    }

    fn send(&mut self, outcome: Result<Vec<u8>, FetchError>) {
        if let Some(tx) = self.tx.take() {
            let settlement = Settlement {
                item: self.item,
                cycle: self.cycle,
                outcome,
            };
            if tx.send(settlement).is_err() {
                log::debug!(
                    "Settlement for item {} dropped: loader is gone.",
                    self.item.raw()
                );
            }
        }
    }
}

impl Drop for SettlementSender {
    fn drop(&mut self) {
        if self.tx.is_some() {
            self.send(Err(FetchError::Dropped));
        }
    }
}

/// A transport that retrieves the bytes for an item.
///
/// Implementations must not block: they start the retrieval and return,
/// settling later through the provided sender, possibly from another thread.
pub trait Fetcher: Send {
    /// Starts fetching `request`, settling through `settle` exactly once.
    fn fetch(&mut self, request: FetchRequest, settle: SettlementSender);
}

/// Schemes that make a URL absolute, bypassing the base URL and path.
const ABSOLUTE_PREFIXES: [&str; 5] = ["blob:", "data:", "http://", "https://", "//"];

/// Returns `true` if `url` should be used as-is.
pub fn is_absolute_url(url: &str) -> bool {
    ABSOLUTE_PREFIXES.iter().any(|p| url.starts_with(p))
}

/// Resolves `url` against the loader's base URL and path.
pub fn resolve_url(url: &str, base_url: &str, path: &str) -> String {
    if is_absolute_url(url) {
        url.to_owned()
    } else {
        format!("{base_url}{path}{url}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative_url() {
        assert_eq!(
            resolve_url("hero.png", "https://cdn.test/", "img/"),
            "https://cdn.test/img/hero.png"
        );
        assert_eq!(resolve_url("hero.png", "", ""), "hero.png");
    }

    #[test]
    fn test_resolve_absolute_urls() {
        for url in [
            "data:text/plain;base64,aGk=",
            "blob:abc",
            "http://x.test/a",
            "https://x.test/a",
            "//x.test/a",
        ] {
            assert_eq!(resolve_url(url, "base/", "path/"), url);
        }
    }

    #[test]
    fn test_settle_sends_once() {
        let (tx, rx) = flume::unbounded();
        let sender = SettlementSender::new(ItemId::from_raw(3), CycleToken::default(), tx);
        sender.succeed(vec![1, 2, 3]);

        let settlement = rx.try_recv().unwrap();
        assert_eq!(settlement.item, ItemId::from_raw(3));
        assert_eq!(settlement.outcome.unwrap(), vec![1, 2, 3]);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_dropped_sender_settles_as_failure() {
        let (tx, rx) = flume::unbounded();
        {
            let _sender = SettlementSender::new(ItemId::from_raw(4), CycleToken::default(), tx);
        }
        let settlement = rx.try_recv().unwrap();
        assert!(matches!(settlement.outcome, Err(FetchError::Dropped)));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_settle_after_loader_gone_is_silent() {
        let (tx, rx) = flume::unbounded::<Settlement>();
        drop(rx);
        let sender = SettlementSender::new(ItemId::from_raw(5), CycleToken::default(), tx);
        sender.fail(FetchError::NotFound("x".into()));
    }

    #[test]
    fn test_cycle_tokens_increase() {
        let a = CycleToken::default();
        let b = a.next();
        assert!(b > a);
        assert_eq!(b.raw(), 1);
    }
}
