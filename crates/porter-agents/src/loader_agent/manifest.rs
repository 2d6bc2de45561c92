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

//! Declarative load lists ("packs") read from RON.

use porter_core::asset::SpriteSheetConfig;
use porter_core::item::{FileType, LinkKind};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while reading a [`LoadManifest`].
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The file could not be read.
    #[error("failed to read manifest '{path}': {source}")]
    Io {
        /// The manifest path.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The text is not a valid manifest.
    #[error("invalid manifest: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

/// One request in a manifest.
///
/// A missing `key` deserializes as empty; such entries are dropped with a
/// warning when the manifest is enqueued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ManifestEntry {
    /// A standalone file.
    File {
        /// The file's type.
        file_type: FileType,
        /// Registry key.
        #[serde(default)]
        key: String,
        /// Explicit URL, else `key.<ext>`.
        #[serde(default)]
        url: Option<String>,
        /// Frame grid, required for spritesheets.
        #[serde(default)]
        frame_config: Option<SpriteSheetConfig>,
    },
    /// Two files forming one composite asset. Both halves share the key.
    Pair {
        /// What the pair forms.
        kind: LinkKind,
        /// Registry key.
        #[serde(default)]
        key: String,
        /// URL of the binary half.
        #[serde(default)]
        binary_url: Option<String>,
        /// URL of the descriptor half.
        #[serde(default)]
        descriptor_url: Option<String>,
    },
    /// A multi-page atlas as `(texture_url, atlas_url)` pages.
    MultiAtlas {
        /// Registry key of the assembled texture.
        #[serde(default)]
        key: String,
        /// Pages in order.
        pages: Vec<(String, String)>,
    },
}

impl ManifestEntry {
    /// The entry's key.
    pub fn key(&self) -> &str {
        match self {
            ManifestEntry::File { key, .. }
            | ManifestEntry::Pair { key, .. }
            | ManifestEntry::MultiAtlas { key, .. } => key,
        }
    }
}

/// A list of requests plus the path they are relative to.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadManifest {
    /// Loader path applied before the entries are enqueued.
    pub path: Option<String>,
    /// The requests.
    pub files: Vec<ManifestEntry>,
}

impl LoadManifest {
    /// Parses a manifest from RON text.
    pub fn from_ron_str(text: &str) -> Result<Self, ManifestError> {
        Ok(ron::from_str(text)?)
    }

    /// Reads and parses a manifest file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&text)
    }
}

/// The outcome of enqueuing a manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ManifestReport {
    /// Entries queued.
    pub queued: usize,
    /// Entries dropped for a missing key or rejected by the loader.
    pub dropped: usize,
}
