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

//! Interface contracts for the destinations of dispatched assets.
//!
//! The loader never stores finished assets itself. At the end of a cycle it
//! hands each payload to one of these registries. Duplicate-key behaviour is
//! the registry's business.

use crate::asset::{AudioData, BitmapFontEntry, ImageData, ImageSource, SpriteSheetConfig, TilemapData};
use serde_json::Value;

/// Owns textures and the frames cut from them.
pub trait TextureRegistry {
    /// Registers a single-frame texture.
    fn add_image(&mut self, key: &str, source: ImageSource);

    /// Registers a texture sliced into a regular grid.
    fn add_sprite_sheet(&mut self, key: &str, image: ImageData, config: SpriteSheetConfig);

    /// Registers a texture whose frames are described by a JSON atlas.
    fn add_atlas(&mut self, key: &str, image: ImageSource, atlas: Value);

    /// Registers a texture whose frames are described by a Unity text atlas.
    fn add_unity_atlas(&mut self, key: &str, image: ImageSource, atlas: String);

    /// Registers a multi-page atlas whose descriptors list frames as arrays.
    fn add_atlas_json_array(&mut self, key: &str, images: Vec<ImageSource>, atlases: Vec<Value>);

    /// Registers a multi-page atlas whose descriptors key frames by name.
    fn add_atlas_json_hash(&mut self, key: &str, images: Vec<ImageSource>, atlases: Vec<Value>);

    /// Returns `true` if a texture is registered under `key`.
    fn contains(&self, key: &str) -> bool;
}

/// Keyed caches for non-texture payloads.
pub trait CacheRegistry {
    /// Adds parsed JSON.
    fn add_json(&mut self, key: &str, data: Value);
    /// Adds XML text.
    fn add_xml(&mut self, key: &str, data: String);
    /// Adds plain text.
    fn add_text(&mut self, key: &str, data: String);
    /// Adds opaque bytes.
    fn add_binary(&mut self, key: &str, data: Vec<u8>);
    /// Adds an audio clip.
    fn add_audio(&mut self, key: &str, data: AudioData);
    /// Adds GLSL source.
    fn add_shader(&mut self, key: &str, source: String);
    /// Adds a tilemap tagged with its format.
    fn add_tilemap(&mut self, key: &str, data: TilemapData);
    /// Adds a bitmap font layout.
    fn add_bitmap_font(&mut self, key: &str, entry: BitmapFontEntry);
}

/// Imports animation definitions that reference registered textures.
pub trait AnimationRegistry {
    /// Imports every animation described by `data`.
    ///
    /// `textures` is the registry the referenced frames are resolved against.
    fn import_json(&mut self, data: &Value, textures: &dyn TextureRegistry);
}

/// The set of registries a cycle dispatches into.
pub struct Registries<'a> {
    /// Texture destination.
    pub textures: &'a mut dyn TextureRegistry,
    /// Cache destination.
    pub caches: &'a mut dyn CacheRegistry,
    /// Animation destination.
    pub animations: &'a mut dyn AnimationRegistry,
}

impl<'a> Registries<'a> {
    /// Bundles the three registries.
    pub fn new(
        textures: &'a mut dyn TextureRegistry,
        caches: &'a mut dyn CacheRegistry,
        animations: &'a mut dyn AnimationRegistry,
    ) -> Self {
        Self {
            textures,
            caches,
            animations,
        }
    }
}
