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

use super::Assets;
use porter_core::asset::{AssetHandle, AudioData, BitmapFontEntry, TilemapData};
use porter_core::registry::CacheRegistry;
use serde_json::Value;

/// One keyed cache per non-texture payload kind.
///
/// Adding under an existing key replaces the previous entry.
#[derive(Default, Clone)]
pub struct CacheManager {
    /// Parsed JSON documents (including audio sprite maps).
    pub json: Assets<Value>,
    /// XML documents.
    pub xml: Assets<String>,
    /// Plain text.
    pub text: Assets<String>,
    /// Opaque bytes.
    pub binary: Assets<Vec<u8>>,
    /// Audio clips.
    pub audio: Assets<AudioData>,
    /// GLSL sources.
    pub shader: Assets<String>,
    /// Tilemaps tagged with their source format.
    pub tilemap: Assets<TilemapData>,
    /// Bitmap font layouts.
    pub bitmap_font: Assets<BitmapFontEntry>,
}

impl CacheManager {
    /// Creates empty caches.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of cached entries across every cache.
    pub fn len(&self) -> usize {
        self.json.len()
            + self.xml.len()
            + self.text.len()
            + self.binary.len()
            + self.audio.len()
            + self.shader.len()
            + self.tilemap.len()
            + self.bitmap_font.len()
    }

    /// Returns `true` if every cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn replace<A: porter_core::asset::Asset>(cache: &mut Assets<A>, name: &str, key: &str, value: A) {
    if cache.insert(key, AssetHandle::new(value)).is_some() {
        log::debug!("Replaced '{}' in the {} cache.", key, name);
    }
}

impl CacheRegistry for CacheManager {
    fn add_json(&mut self, key: &str, data: Value) {
        replace(&mut self.json, "json", key, data);
    }

    fn add_xml(&mut self, key: &str, data: String) {
        replace(&mut self.xml, "xml", key, data);
    }

    fn add_text(&mut self, key: &str, data: String) {
        replace(&mut self.text, "text", key, data);
    }

    fn add_binary(&mut self, key: &str, data: Vec<u8>) {
        replace(&mut self.binary, "binary", key, data);
    }

    fn add_audio(&mut self, key: &str, data: AudioData) {
        replace(&mut self.audio, "audio", key, data);
    }

    fn add_shader(&mut self, key: &str, source: String) {
        replace(&mut self.shader, "shader", key, source);
    }

    fn add_tilemap(&mut self, key: &str, data: TilemapData) {
        replace(&mut self.tilemap, "tilemap", key, data);
    }

    fn add_bitmap_font(&mut self, key: &str, entry: BitmapFontEntry) {
        replace(&mut self.bitmap_font, "bitmap font", key, entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use porter_core::asset::{TilemapFormat, TilemapSource};

    #[test]
    fn test_each_payload_lands_in_its_cache() {
        let mut caches = CacheManager::new();
        caches.add_json("cfg", serde_json::json!({"a": 1}));
        caches.add_text("notes", "hi".into());
        caches.add_shader("blur", "void main(){}".into());
        caches.add_tilemap(
            "level",
            TilemapData {
                format: TilemapFormat::Csv,
                data: TilemapSource::Csv("1,2".into()),
            },
        );

        assert!(caches.json.contains("cfg"));
        assert!(caches.text.contains("notes"));
        assert!(caches.shader.contains("blur"));
        assert!(!caches.text.contains("blur"));
        assert_eq!(
            caches.tilemap.get("level").map(|t| t.format),
            Some(TilemapFormat::Csv)
        );
        assert_eq!(caches.len(), 4);
    }
}
