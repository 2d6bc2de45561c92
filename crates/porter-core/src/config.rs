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

//! Loader configuration, read from RON.

use crate::fetch::FetchSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while reading a [`LoaderConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read loader config '{path}': {source}")]
    Io {
        /// The config path.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid RON for a `LoaderConfig`.
    #[error("invalid loader config: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

/// Settings shared by every item a loader fetches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Prefix for every relative URL.
    pub base_url: String,
    /// Path appended to `base_url`, assigned to items at enqueue time.
    pub path: String,
    /// Upper bound on simultaneous fetches.
    pub max_parallel_downloads: usize,
    /// When `false`, items are fetched one at a time.
    pub enable_parallel: bool,
    /// Cross-origin policy for items that do not set their own.
    pub cross_origin: Option<String>,
    /// Transport settings for items that do not set their own.
    pub fetch: FetchSettings,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            path: String::new(),
            max_parallel_downloads: 4,
            enable_parallel: true,
            cross_origin: None,
            fetch: FetchSettings::default(),
        }
    }
}

impl LoaderConfig {
    /// Parses a config from RON text. Missing fields take their defaults.
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(text)?)
    }

    /// Reads and parses a RON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&text)
    }

    /// The effective concurrency limit, never below one.
    pub fn max_parallel(&self) -> usize {
        if !self.enable_parallel {
            return 1;
        }
        if self.max_parallel_downloads == 0 {
            log::warn!("max_parallel_downloads is 0, clamping to 1.");
            return 1;
        }
        self.max_parallel_downloads
    }

    /// Sets the path, appending a trailing `/` to non-empty paths.
    pub fn set_path(&mut self, path: impl Into<String>) {
        self.path = normalize_path(path.into());
    }
}

/// Appends a trailing `/` to non-empty paths that lack one.
pub fn normalize_path(mut path: String) -> String {
    if !path.is_empty() && !path.ends_with('/') {
        path.push('/');
    }
    path
}
