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

//! Animation definitions imported from JSON.
//!
//! Only the data side lives here. Playback is somebody else's job.

use porter_core::registry::{AnimationRegistry, TextureRegistry};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// One frame of an animation: a texture plus an optional frame within it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationFrame {
    /// Key of the texture.
    pub texture: String,
    /// Frame name within the texture, or the whole texture if `None`.
    pub frame: Option<String>,
    /// Extra hold time in milliseconds.
    pub duration: u32,
}

/// A named sequence of frames.
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    /// Animation key.
    pub key: String,
    /// Frames whose textures existed at import time.
    pub frames: Vec<AnimationFrame>,
    /// Playback rate in frames per second.
    pub frame_rate: f32,
    /// Extra loops, `-1` for forever.
    pub repeat: i32,
    /// Whether playback reverses at the end.
    pub yoyo: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnimationConfig {
    key: String,
    #[serde(default)]
    frames: Vec<FrameConfig>,
    #[serde(default = "default_frame_rate")]
    frame_rate: f32,
    #[serde(default)]
    repeat: i32,
    #[serde(default)]
    yoyo: bool,
}

#[derive(Deserialize)]
struct FrameConfig {
    key: String,
    #[serde(default)]
    frame: Option<Value>,
    #[serde(default)]
    duration: u32,
}

fn default_frame_rate() -> f32 {
    24.0
}

/// Stores imported animations by key.
#[derive(Debug, Default)]
pub struct AnimationManager {
    animations: BTreeMap<String, Animation>,
}

impl AnimationManager {
    /// Creates an empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up an animation.
    pub fn get(&self, key: &str) -> Option<&Animation> {
        self.animations.get(key)
    }

    /// Number of animations.
    pub fn len(&self) -> usize {
        self.animations.len()
    }

    /// Returns `true` if no animation is registered.
    pub fn is_empty(&self) -> bool {
        self.animations.is_empty()
    }

    fn import_one(&mut self, entry: &Value, textures: &dyn TextureRegistry) {
        let config = match AnimationConfig::deserialize(entry) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Skipping malformed animation: {}", err);
                return;
            }
        };
        if self.animations.contains_key(&config.key) {
            log::warn!("Animation key '{}' already in use, ignoring.", config.key);
            return;
        }

        let frames = config
            .frames
            .into_iter()
            .filter_map(|frame| {
                if !textures.contains(&frame.key) {
                    log::warn!(
                        "Animation '{}' references missing texture '{}'.",
                        config.key,
                        frame.key
                    );
                    return None;
                }
                Some(AnimationFrame {
                    texture: frame.key,
                    frame: frame.frame.and_then(|f| match f {
                        Value::String(name) => Some(name),
                        Value::Number(n) => Some(n.to_string()),
                        _ => None,
                    }),
                    duration: frame.duration,
                })
            })
            .collect();

        self.animations.insert(
            config.key.clone(),
            Animation {
                key: config.key,
                frames,
                frame_rate: config.frame_rate,
                repeat: config.repeat,
                yoyo: config.yoyo,
            },
        );
    }
}

impl AnimationRegistry for AnimationManager {
    /// Accepts `{"anims": [...]}`, a bare array, or a single animation object.
    fn import_json(&mut self, data: &Value, textures: &dyn TextureRegistry) {
        match data {
            Value::Array(list) => list.iter().for_each(|a| self.import_one(a, textures)),
            Value::Object(map) => match map.get("anims") {
                Some(Value::Array(list)) => list.iter().for_each(|a| self.import_one(a, textures)),
                _ => self.import_one(data, textures),
            },
            _ => log::warn!("Animation JSON must be an object or an array."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::textures::TextureManager;
    use porter_core::asset::ImageSource;
    use serde_json::json;

    #[test]
    fn test_import_resolves_frames_against_textures() {
        let mut textures = TextureManager::new();
        textures.add_image("hero", ImageSource::Svg("<svg/>".into()));

        let mut anims = AnimationManager::new();
        anims.import_json(
            &json!({"anims": [{
                "key": "walk",
                "frameRate": 12,
                "repeat": -1,
                "frames": [
                    {"key": "hero", "frame": "walk0"},
                    {"key": "hero", "frame": 1},
                    {"key": "ghost", "frame": "x"}
                ]
            }]}),
            &textures,
        );

        let walk = anims.get("walk").unwrap();
        assert_eq!(walk.frame_rate, 12.0);
        assert_eq!(walk.repeat, -1);
        assert_eq!(walk.frames.len(), 2);
        assert_eq!(walk.frames[1].frame.as_deref(), Some("1"));
    }

    #[test]
    fn test_single_object_and_duplicates() {
        let textures = TextureManager::new();
        let mut anims = AnimationManager::new();
        anims.import_json(&json!({"key": "idle"}), &textures);
        anims.import_json(&json!([{"key": "idle", "frameRate": 2}]), &textures);

        assert_eq!(anims.len(), 1);
        assert_eq!(anims.get("idle").unwrap().frame_rate, 24.0);
    }

    #[test]
    fn test_malformed_input_is_skipped() {
        let textures = TextureManager::new();
        let mut anims = AnimationManager::new();
        anims.import_json(&json!(42), &textures);
        anims.import_json(&json!([{"frames": []}]), &textures);
        assert!(anims.is_empty());
    }
}
