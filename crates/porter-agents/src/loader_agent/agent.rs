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

//! The `LoaderAgent` owns a scheduler, its transport and the registries it fills.

use super::manifest::{LoadManifest, ManifestEntry, ManifestReport};
use anyhow::{Context, Result};
use porter_core::asset::SpriteSheetConfig;
use porter_core::event::{CycleCompleted, CycleStarted, SubscriptionId};
use porter_core::fetch::Fetcher;
use porter_core::group::MultiPartGroup;
use porter_core::item::{FileType, ItemId, LinkKind, LoadableItem};
use porter_core::registry::Registries;
use porter_core::{LoaderConfig, LoaderError, LoaderState};
use porter_data::{AnimationManager, CacheManager, TextureManager};
use porter_lanes::asset_lane::{LoadProgress, LoadQueueLane};
use std::path::Path;
use std::time::Duration;

/// Request-level front end of the loader.
///
/// Typed helpers build items and pairs, `start` begins a cycle, and `update`
/// must be pumped until the cycle completes. Finished assets land in the
/// agent's own registries.
pub struct LoaderAgent {
    lane: LoadQueueLane,
    textures: TextureManager,
    caches: CacheManager,
    animations: AnimationManager,
}

fn file(file_type: FileType, key: &str, url: Option<&str>) -> LoadableItem {
    let item = LoadableItem::new(file_type, key);
    match url {
        Some(url) => item.with_url(url),
        None => item,
    }
}

impl LoaderAgent {
    /// Creates an agent fetching through `fetcher`.
    pub fn new(config: LoaderConfig, fetcher: impl Fetcher + 'static) -> Self {
        Self {
            lane: LoadQueueLane::new(config, Box::new(fetcher)),
            textures: TextureManager::new(),
            caches: CacheManager::default(),
            animations: AnimationManager::new(),
        }
    }

    /// Creates an agent configured from a RON file.
    pub fn from_config_file(path: impl AsRef<Path>, fetcher: impl Fetcher + 'static) -> Result<Self> {
        let path = path.as_ref();
        let config = LoaderConfig::load(path)
            .with_context(|| format!("Failed to load loader config '{}'", path.display()))?;
        Ok(Self::new(config, fetcher))
    }

    // --- Registries ---

    /// Textures delivered so far.
    pub fn textures(&self) -> &TextureManager {
        &self.textures
    }

    /// Cached non-texture assets delivered so far.
    pub fn caches(&self) -> &CacheManager {
        &self.caches
    }

    /// Animations imported so far.
    pub fn animations(&self) -> &AnimationManager {
        &self.animations
    }

    /// The underlying scheduler.
    pub fn lane(&self) -> &LoadQueueLane {
        &self.lane
    }

    // --- Configuration and state ---

    /// Sets the path for items requested from now on.
    pub fn set_path(&mut self, path: impl Into<String>) -> &mut Self {
        self.lane.set_path(path);
        self
    }

    /// Sets the base URL for relative URLs.
    pub fn set_base_url(&mut self, base_url: impl Into<String>) -> &mut Self {
        self.lane.set_base_url(base_url);
        self
    }

    /// The loader state.
    pub fn state(&self) -> LoaderState {
        self.lane.state()
    }

    /// Current collection sizes.
    pub fn progress(&self) -> LoadProgress {
        self.lane.progress()
    }

    /// Subscribes to cycle starts.
    pub fn on_start(&mut self, listener: impl FnMut(&CycleStarted) + Send + 'static) -> SubscriptionId {
        self.lane.on_start(listener)
    }

    /// Subscribes to cycle completions.
    pub fn on_complete(&mut self, listener: impl FnMut(&CycleCompleted) + Send + 'static) -> SubscriptionId {
        self.lane.on_complete(listener)
    }

    // --- Single-file requests ---

    /// Queues a prepared item.
    pub fn add(&mut self, item: LoadableItem) -> Result<ItemId, LoaderError> {
        self.lane.enqueue(item)
    }

    /// Queues a raster image.
    pub fn image(&mut self, key: &str, url: Option<&str>) -> Result<ItemId, LoaderError> {
        self.add(file(FileType::Image, key, url))
    }

    /// Queues a JSON document.
    pub fn json(&mut self, key: &str, url: Option<&str>) -> Result<ItemId, LoaderError> {
        self.add(file(FileType::Json, key, url))
    }

    /// Queues an XML document.
    pub fn xml(&mut self, key: &str, url: Option<&str>) -> Result<ItemId, LoaderError> {
        self.add(file(FileType::Xml, key, url))
    }

    /// Queues plain text.
    pub fn text(&mut self, key: &str, url: Option<&str>) -> Result<ItemId, LoaderError> {
        self.add(file(FileType::Text, key, url))
    }

    /// Queues opaque bytes.
    pub fn binary(&mut self, key: &str, url: Option<&str>) -> Result<ItemId, LoaderError> {
        self.add(file(FileType::Binary, key, url))
    }

    /// Queues an audio clip. Audio has no default extension, so pass a URL.
    pub fn audio(&mut self, key: &str, url: Option<&str>) -> Result<ItemId, LoaderError> {
        self.add(file(FileType::Audio, key, url))
    }

    /// Queues GLSL source.
    pub fn glsl(&mut self, key: &str, url: Option<&str>) -> Result<ItemId, LoaderError> {
        self.add(file(FileType::Glsl, key, url))
    }

    /// Queues SVG markup as a texture source.
    pub fn svg(&mut self, key: &str, url: Option<&str>) -> Result<ItemId, LoaderError> {
        self.add(file(FileType::Svg, key, url))
    }

    /// Queues HTML markup as a texture source.
    pub fn html(&mut self, key: &str, url: Option<&str>) -> Result<ItemId, LoaderError> {
        self.add(file(FileType::Html, key, url))
    }

    /// Queues a CSV tilemap.
    pub fn tilemap_csv(&mut self, key: &str, url: Option<&str>) -> Result<ItemId, LoaderError> {
        self.add(file(FileType::TilemapCsv, key, url))
    }

    /// Queues a Tiled JSON tilemap.
    pub fn tilemap_json(&mut self, key: &str, url: Option<&str>) -> Result<ItemId, LoaderError> {
        self.add(file(FileType::TilemapJson, key, url))
    }

    /// Queues animation definitions, imported after every texture of the cycle.
    pub fn animation(&mut self, key: &str, url: Option<&str>) -> Result<ItemId, LoaderError> {
        self.add(file(FileType::AnimationJson, key, url))
    }

    /// Queues an image sliced into a grid of frames.
    pub fn spritesheet(
        &mut self,
        key: &str,
        url: Option<&str>,
        config: SpriteSheetConfig,
    ) -> Result<ItemId, LoaderError> {
        self.add(file(FileType::SpriteSheet, key, url).with_frame_config(config))
    }

    // --- Pairs and groups ---

    fn pair(
        &mut self,
        kind: LinkKind,
        key: &str,
        binary_url: Option<&str>,
        descriptor_url: Option<&str>,
    ) -> Result<(ItemId, ItemId), LoaderError> {
        self.lane.enqueue_pair(
            kind,
            file(kind.binary_type(), key, binary_url),
            file(kind.descriptor_type(), key, descriptor_url),
        )
    }

    /// Queues an image and its JSON atlas (hash or array layout).
    pub fn atlas(
        &mut self,
        key: &str,
        texture_url: Option<&str>,
        atlas_url: Option<&str>,
    ) -> Result<(ItemId, ItemId), LoaderError> {
        self.pair(LinkKind::AtlasJson, key, texture_url, atlas_url)
    }

    /// Queues an image and its Unity text atlas.
    pub fn unity_atlas(
        &mut self,
        key: &str,
        texture_url: Option<&str>,
        atlas_url: Option<&str>,
    ) -> Result<(ItemId, ItemId), LoaderError> {
        self.pair(LinkKind::UnityAtlas, key, texture_url, atlas_url)
    }

    /// Queues a glyph page and its BMFont XML descriptor.
    pub fn bitmap_font(
        &mut self,
        key: &str,
        texture_url: Option<&str>,
        xml_url: Option<&str>,
    ) -> Result<(ItemId, ItemId), LoaderError> {
        self.pair(LinkKind::BitmapFont, key, texture_url, xml_url)
    }

    /// Queues an audio clip and its JSON sprite map.
    pub fn audio_sprite(
        &mut self,
        key: &str,
        audio_url: Option<&str>,
        json_url: Option<&str>,
    ) -> Result<(ItemId, ItemId), LoaderError> {
        self.pair(LinkKind::AudioSprite, key, audio_url, json_url)
    }

    /// Queues a multi-page atlas assembled into one texture named `key`.
    ///
    /// Page `i` is queued as image and JSON items keyed `key-i`. If any page
    /// is rejected, nothing is queued.
    pub fn multi_atlas(&mut self, key: &str, pages: &[(&str, &str)]) -> Result<(), LoaderError> {
        let items: Vec<LoadableItem> = pages
            .iter()
            .enumerate()
            .flat_map(|(i, (texture_url, atlas_url))| {
                let page = format!("{}-{}", key, i);
                [
                    file(FileType::Image, &page, Some(*texture_url)),
                    file(FileType::Json, &page, Some(*atlas_url)),
                ]
            })
            .collect();
        let group = MultiPartGroup::new(key, items.iter().map(LoadableItem::item_key).collect())?;
        self.lane.enqueue_group(group, items).map(drop)
    }

    // --- Manifests ---

    /// Queues every entry of `manifest`.
    ///
    /// Entries without a key, and entries the loader rejects, are dropped
    /// with a warning. Only a loader that is not ready fails the whole call.
    pub fn enqueue_manifest(&mut self, manifest: &LoadManifest) -> Result<ManifestReport, LoaderError> {
        if !self.lane.is_ready() {
            return Err(LoaderError::NotReady {
                state: self.lane.state(),
            });
        }
        if let Some(path) = &manifest.path {
            self.lane.set_path(path.clone());
        }

        let mut report = ManifestReport::default();
        for entry in &manifest.files {
            if entry.key().is_empty() {
                log::warn!("Dropping manifest entry without a key: {:?}", entry);
                report.dropped += 1;
                continue;
            }
            match self.enqueue_entry(entry) {
                Ok(()) => report.queued += 1,
                Err(err) => {
                    log::warn!("Dropping manifest entry '{}': {}", entry.key(), err);
                    report.dropped += 1;
                }
            }
        }
        log::info!(
            "Manifest queued {} entries, dropped {}.",
            report.queued,
            report.dropped
        );
        Ok(report)
    }

    fn enqueue_entry(&mut self, entry: &ManifestEntry) -> Result<(), LoaderError> {
        match entry {
            ManifestEntry::File {
                file_type,
                key,
                url,
                frame_config,
            } => {
                let mut item = file(*file_type, key, url.as_deref());
                if let Some(config) = frame_config {
                    item = item.with_frame_config(config.clone());
                }
                self.add(item).map(drop)
            }
            ManifestEntry::Pair {
                kind,
                key,
                binary_url,
                descriptor_url,
            } => self
                .pair(*kind, key, binary_url.as_deref(), descriptor_url.as_deref())
                .map(drop),
            ManifestEntry::MultiAtlas { key, pages } => {
                let pages: Vec<(&str, &str)> = pages
                    .iter()
                    .map(|(texture, atlas)| (texture.as_str(), atlas.as_str()))
                    .collect();
                self.multi_atlas(key, &pages)
            }
        }
    }

    /// Reads a RON manifest and queues it.
    pub fn enqueue_manifest_file(&mut self, path: impl AsRef<Path>) -> Result<ManifestReport> {
        let path = path.as_ref();
        let manifest = LoadManifest::load(path)
            .with_context(|| format!("Failed to read manifest '{}'", path.display()))?;
        Ok(self.enqueue_manifest(&manifest)?)
    }

    // --- Cycle ---

    /// Starts a cycle over everything queued.
    pub fn start(&mut self) -> Result<(), LoaderError> {
        let mut registries = Registries::new(&mut self.textures, &mut self.caches, &mut self.animations);
        self.lane.start(&mut registries)
    }

    /// Handles every settlement that has arrived. Call once per frame.
    pub fn update(&mut self) -> usize {
        let mut registries = Registries::new(&mut self.textures, &mut self.caches, &mut self.animations);
        self.lane.update(&mut registries)
    }

    /// Blocks until the running cycle completes.
    ///
    /// Returns `false` if no settlement arrived for `idle_timeout`.
    pub fn wait(&mut self, idle_timeout: Duration) -> bool {
        while self.lane.is_loading() {
            let mut registries = Registries::new(&mut self.textures, &mut self.caches, &mut self.animations);
            if !self.lane.update_blocking(&mut registries, idle_timeout) {
                log::warn!(
                    "No fetch settled within {:?}; {} still in flight.",
                    idle_timeout,
                    self.lane.progress().in_flight
                );
                return false;
            }
        }
        true
    }

    /// Abandons all work and detaches every listener. Registries keep their contents.
    pub fn reset(&mut self) {
        self.lane.reset();
    }

    /// Resets and refuses further work.
    pub fn destroy(&mut self) {
        self.lane.destroy();
    }
}
