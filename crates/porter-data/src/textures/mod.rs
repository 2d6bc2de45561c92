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

//! Textures and the named frames cut from them.

mod parse;

pub use parse::*;

use porter_core::asset::{Asset, AssetHandle, ImageData, ImageSource, SpriteSheetConfig};
use porter_core::registry::TextureRegistry;
use serde_json::Value;
use std::collections::BTreeMap;

/// Name of the frame covering a whole source image.
pub const BASE_FRAME: &str = "__BASE";

/// A rectangle on one of a texture's source images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Index into [`Texture::sources`].
    pub source_index: usize,
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
    /// Whether the packer rotated the frame 90 degrees.
    pub rotated: bool,
}

/// One or more source images plus their named frames.
#[derive(Debug, Clone)]
pub struct Texture {
    /// The key the texture is registered under.
    pub key: String,
    /// Source images, one per atlas page.
    pub sources: Vec<ImageSource>,
    /// Named frames.
    pub frames: BTreeMap<String, Frame>,
}

impl Asset for Texture {}

impl Texture {
    fn new(key: &str, sources: Vec<ImageSource>) -> Self {
        let mut frames = BTreeMap::new();
        if let Some((width, height)) = sources.first().and_then(ImageSource::dimensions) {
            frames.insert(
                BASE_FRAME.to_string(),
                Frame {
                    source_index: 0,
                    x: 0,
                    y: 0,
                    width,
                    height,
                    rotated: false,
                },
            );
        }
        Self {
            key: key.to_string(),
            sources,
            frames,
        }
    }

    /// Looks up a frame by name.
    pub fn frame(&self, name: &str) -> Option<&Frame> {
        self.frames.get(name)
    }

    /// Number of named frames, excluding the base frame.
    pub fn frame_count(&self) -> usize {
        self.frames.len() - usize::from(self.frames.contains_key(BASE_FRAME))
    }
}

/// The texture registry.
///
/// The first texture registered under a key wins; later registrations under
/// the same key are rejected with a warning.
#[derive(Debug, Default)]
pub struct TextureManager {
    textures: BTreeMap<String, AssetHandle<Texture>>,
}

impl TextureManager {
    /// Creates an empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a texture.
    pub fn get(&self, key: &str) -> Option<&AssetHandle<Texture>> {
        self.textures.get(key)
    }

    /// Number of registered textures.
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Registered keys, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.textures.keys().map(String::as_str)
    }

    fn insert(&mut self, texture: Texture) {
        if self.textures.contains_key(&texture.key) {
            log::warn!("Texture key '{}' already in use, ignoring.", texture.key);
            return;
        }
        log::debug!(
            "Registered texture '{}' ({} frame(s)).",
            texture.key,
            texture.frame_count()
        );
        self.textures
            .insert(texture.key.clone(), AssetHandle::new(texture));
    }
}

impl TextureRegistry for TextureManager {
    fn add_image(&mut self, key: &str, source: ImageSource) {
        self.insert(Texture::new(key, vec![source]));
    }

    fn add_sprite_sheet(&mut self, key: &str, image: ImageData, config: SpriteSheetConfig) {
        let frames = sprite_sheet_frames(image.width, image.height, &config);
        let mut texture = Texture::new(key, vec![ImageSource::Bitmap(image)]);
        texture.frames.extend(frames);
        self.insert(texture);
    }

    fn add_atlas(&mut self, key: &str, image: ImageSource, atlas: Value) {
        let mut texture = Texture::new(key, vec![image]);
        texture.frames.extend(atlas_frames(&atlas, 0));
        self.insert(texture);
    }

    fn add_unity_atlas(&mut self, key: &str, image: ImageSource, atlas: String) {
        let height = image.dimensions().map(|(_, h)| h);
        let mut texture = Texture::new(key, vec![image]);
        texture.frames.extend(unity_frames(&atlas, height));
        self.insert(texture);
    }

    fn add_atlas_json_array(&mut self, key: &str, images: Vec<ImageSource>, atlases: Vec<Value>) {
        self.insert(multi_atlas(key, images, &atlases));
    }

    fn add_atlas_json_hash(&mut self, key: &str, images: Vec<ImageSource>, atlases: Vec<Value>) {
        self.insert(multi_atlas(key, images, &atlases));
    }

    fn contains(&self, key: &str) -> bool {
        self.textures.contains_key(key)
    }
}

fn multi_atlas(key: &str, images: Vec<ImageSource>, atlases: &[Value]) -> Texture {
    let mut texture = Texture::new(key, images);
    for (index, atlas) in atlases.iter().enumerate() {
        texture.frames.extend(atlas_frames(atlas, index));
    }
    texture
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bitmap(width: u32, height: u32) -> ImageData {
        ImageData {
            width,
            height,
            pixels: vec![0; (width * height * 4) as usize],
        }
    }

    #[test]
    fn test_add_image_gets_base_frame() {
        let mut textures = TextureManager::new();
        textures.add_image("logo", ImageSource::Bitmap(bitmap(8, 4)));

        let logo = textures.get("logo").unwrap();
        assert_eq!(logo.frame(BASE_FRAME).map(|f| (f.width, f.height)), Some((8, 4)));
        assert_eq!(logo.frame_count(), 0);
    }

    #[test]
    fn test_svg_has_no_base_frame() {
        let mut textures = TextureManager::new();
        textures.add_image("icon", ImageSource::Svg("<svg/>".into()));
        assert!(textures.get("icon").unwrap().frame(BASE_FRAME).is_none());
    }

    #[test]
    fn test_duplicate_key_keeps_first() {
        let mut textures = TextureManager::new();
        textures.add_image("a", ImageSource::Bitmap(bitmap(1, 1)));
        textures.add_image("a", ImageSource::Bitmap(bitmap(2, 2)));
        assert_eq!(textures.len(), 1);
        assert_eq!(
            textures.get("a").unwrap().sources[0].dimensions(),
            Some((1, 1))
        );
    }

    #[test]
    fn test_multi_atlas_frames_point_at_their_page() {
        let mut textures = TextureManager::new();
        textures.add_atlas_json_array(
            "mega",
            vec![
                ImageSource::Bitmap(bitmap(16, 16)),
                ImageSource::Bitmap(bitmap(16, 16)),
            ],
            vec![
                json!({"frames": [{"filename": "a", "frame": {"x": 0, "y": 0, "w": 8, "h": 8}}]}),
                json!({"frames": [{"filename": "b", "frame": {"x": 8, "y": 8, "w": 8, "h": 8}}]}),
            ],
        );
        let mega = textures.get("mega").unwrap();
        assert_eq!(mega.sources.len(), 2);
        assert_eq!(mega.frame("a").unwrap().source_index, 0);
        assert_eq!(mega.frame("b").unwrap().source_index, 1);
    }
}
