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

//! Loadable items: the unit of work tracked by the loader.
//!
//! An item is a single requested file. It carries its identity (a key plus a
//! [`FileType`]), the settings used to fetch it, and, as it moves through its
//! lifecycle, the raw bytes and then the decoded payload.

mod link;

pub use link::*;

use crate::asset::{ProcessedPayload, SpriteSheetConfig};
use crate::fetch::{resolve_url, FetchSettings};
use crate::state::{ItemState, ItemStateError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque arena id of an item. Ids are never reused by a loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(u64);

impl ItemId {
    /// Wraps a raw id. Only loaders should mint ids.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw numeric id.
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// The closed set of per-file types the loader knows how to fetch and decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileType {
    /// A raster image decoded to RGBA8.
    Image,
    /// A JSON document.
    Json,
    /// An XML document, kept as text.
    Xml,
    /// Plain UTF-8 text.
    Text,
    /// Opaque bytes.
    Binary,
    /// An audio clip.
    Audio,
    /// An image sliced into a regular frame grid.
    SpriteSheet,
    /// Animation definitions that reference already-registered textures.
    AnimationJson,
    /// SVG markup registered as a texture source.
    Svg,
    /// HTML markup registered as a texture source.
    Html,
    /// GLSL shader source.
    Glsl,
    /// A CSV tilemap.
    TilemapCsv,
    /// A Tiled JSON tilemap.
    TilemapJson,
}

impl FileType {
    /// The conventional file extension used when an item has no explicit URL.
    pub fn default_extension(self) -> Option<&'static str> {
        match self {
            FileType::Image | FileType::SpriteSheet => Some("png"),
            FileType::Json | FileType::AnimationJson | FileType::TilemapJson => Some("json"),
            FileType::Xml => Some("xml"),
            FileType::Text => Some("txt"),
            FileType::Binary => Some("bin"),
            FileType::Svg => Some("svg"),
            FileType::Html => Some("html"),
            FileType::Glsl => Some("glsl"),
            FileType::TilemapCsv => Some("csv"),
            FileType::Audio => None,
        }
    }

    /// Short lowercase name, used in logs and manifests.
    pub fn name(self) -> &'static str {
        match self {
            FileType::Image => "image",
            FileType::Json => "json",
            FileType::Xml => "xml",
            FileType::Text => "text",
            FileType::Binary => "binary",
            FileType::Audio => "audio",
            FileType::SpriteSheet => "spritesheet",
            FileType::AnimationJson => "animation-json",
            FileType::Svg => "svg",
            FileType::Html => "html",
            FileType::Glsl => "glsl",
            FileType::TilemapCsv => "tilemap-csv",
            FileType::TilemapJson => "tilemap-json",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Caller-facing identity of an item: its key scoped by its file type.
///
/// An atlas image and its JSON descriptor usually share a key, so the key
/// alone is not unique.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemKey {
    /// The type of the file.
    pub file_type: FileType,
    /// The key the file is registered under.
    pub key: String,
}

impl ItemKey {
    /// Creates a new key.
    pub fn new(file_type: FileType, key: impl Into<String>) -> Self {
        Self {
            file_type,
            key: key.into(),
        }
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file_type, self.key)
    }
}

/// A single requestable file and its progress through the load pipeline.
#[derive(Debug, Clone)]
pub struct LoadableItem {
    key: String,
    file_type: FileType,
    url: Option<String>,
    path: String,
    settings: Option<FetchSettings>,
    cross_origin: Option<String>,
    frame_config: Option<SpriteSheetConfig>,
    state: ItemState,
    link: Option<ItemLink>,
    raw: Option<Vec<u8>>,
    payload: Option<ProcessedPayload>,
}

impl LoadableItem {
    /// Creates a pending item of the given type.
    pub fn new(file_type: FileType, key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            file_type,
            url: None,
            path: String::new(),
            settings: None,
            cross_origin: None,
            frame_config: None,
            state: ItemState::Pending,
            link: None,
            raw: None,
            payload: None,
        }
    }

    /// Sets an explicit URL, relative to the loader's base URL and path.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Overrides the loader's shared fetch settings for this item.
    pub fn with_settings(mut self, settings: FetchSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Overrides the loader's cross-origin policy for this item.
    pub fn with_cross_origin(mut self, cross_origin: impl Into<String>) -> Self {
        self.cross_origin = Some(cross_origin.into());
        self
    }

    /// Attaches the frame grid used to slice a spritesheet.
    pub fn with_frame_config(mut self, config: SpriteSheetConfig) -> Self {
        self.frame_config = Some(config);
        self
    }

    /// The item's key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The item's file type.
    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    /// The item's full identity.
    pub fn item_key(&self) -> ItemKey {
        ItemKey::new(self.file_type, self.key.clone())
    }

    /// The explicit URL, if any.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// The loader path assigned at enqueue time.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Assigns the loader path. Called by the loader on enqueue.
    pub fn set_path(&mut self, path: impl Into<String>) {
        self.path = path.into();
    }

    /// The effective fetch settings, once inherited or overridden.
    pub fn settings(&self) -> Option<&FetchSettings> {
        self.settings.as_ref()
    }

    /// The effective cross-origin policy.
    pub fn cross_origin(&self) -> Option<&str> {
        self.cross_origin.as_deref()
    }

    /// The spritesheet frame grid, if any.
    pub fn frame_config(&self) -> Option<&SpriteSheetConfig> {
        self.frame_config.as_ref()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ItemState {
        self.state
    }

    /// The pair link, if this item is half of a pair.
    pub fn link(&self) -> Option<&ItemLink> {
        self.link.as_ref()
    }

    /// Links this item to its pair partner.
    pub fn set_link(&mut self, link: ItemLink) {
        self.link = Some(link);
    }

    /// The decoded payload, present once the item is complete.
    pub fn payload(&self) -> Option<&ProcessedPayload> {
        self.payload.as_ref()
    }

    /// Removes and returns the decoded payload.
    pub fn take_payload(&mut self) -> Option<ProcessedPayload> {
        self.payload.take()
    }

    /// Removes and returns the raw fetched bytes.
    pub fn take_raw(&mut self) -> Option<Vec<u8>> {
        self.raw.take()
    }

    /// Resolves the URL to fetch, relative to `base_url` and the item's path.
    ///
    /// Items without an explicit URL fall back to `key.<ext>`.
    pub fn resolved_url(&self, base_url: &str) -> String {
        let url = match (&self.url, self.file_type.default_extension()) {
            (Some(url), _) => url.clone(),
            (None, Some(ext)) => format!("{}.{}", self.key, ext),
            (None, None) => self.key.clone(),
        };
        resolve_url(&url, base_url, &self.path)
    }

    /// Fills in fetch settings and cross-origin policy the item did not override.
    pub fn inherit_settings(&mut self, settings: &FetchSettings, cross_origin: Option<&str>) {
        if self.settings.is_none() {
            self.settings = Some(settings.clone());
        }
        if self.cross_origin.is_none() {
            self.cross_origin = cross_origin.map(str::to_owned);
        }
    }

    fn transition(&mut self, next: ItemState) -> Result<(), ItemStateError> {
        if !self.state.can_transition_to(next) {
            return Err(ItemStateError {
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        Ok(())
    }

    /// Pending -> InFlight.
    pub fn begin_fetch(&mut self) -> Result<(), ItemStateError> {
        self.transition(ItemState::InFlight)
    }

    /// InFlight -> Loaded, attaching the fetched bytes.
    pub fn finish_fetch(&mut self, bytes: Vec<u8>) -> Result<(), ItemStateError> {
        self.transition(ItemState::Loaded)?;
        self.raw = Some(bytes);
        Ok(())
    }

    /// Loaded -> Complete, attaching the decoded payload.
    pub fn complete(&mut self, payload: ProcessedPayload) -> Result<(), ItemStateError> {
        self.transition(ItemState::Complete)?;
        self.payload = Some(payload);
        Ok(())
    }

    /// InFlight or Loaded -> Errored. Any bytes or payload are dropped.
    pub fn fail(&mut self) -> Result<(), ItemStateError> {
        self.transition(ItemState::Errored)?;
        self.raw = None;
        self.payload = None;
        Ok(())
    }
}
