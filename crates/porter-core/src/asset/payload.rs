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

use super::Asset;
use crate::item::FileType;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A decoded raster image in RGBA8, row-major, top-left origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// `width * height * 4` bytes.
    pub pixels: Vec<u8>,
}

impl Asset for ImageData {}

/// Anything that can back a texture.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    /// A decoded raster image.
    Bitmap(ImageData),
    /// SVG markup, rasterized by the consumer.
    Svg(String),
    /// HTML markup, rasterized by the consumer.
    Html(String),
}

impl ImageSource {
    /// Pixel dimensions, if known without rasterizing.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        match self {
            ImageSource::Bitmap(image) => Some((image.width, image.height)),
            ImageSource::Svg(_) | ImageSource::Html(_) => None,
        }
    }
}

/// How a spritesheet image is cut into frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpriteSheetConfig {
    /// Width of one frame in pixels.
    pub frame_width: u32,
    /// Height of one frame in pixels.
    pub frame_height: u32,
    /// Index of the first frame to keep.
    pub start_frame: u32,
    /// Index of the last frame to keep, inclusive. `None` keeps the rest.
    pub end_frame: Option<u32>,
    /// Border around the whole sheet.
    pub margin: u32,
    /// Gap between frames.
    pub spacing: u32,
}

impl Default for SpriteSheetConfig {
    fn default() -> Self {
        Self {
            frame_width: 32,
            frame_height: 32,
            start_frame: 0,
            end_frame: None,
            margin: 0,
            spacing: 0,
        }
    }
}

/// Decoded PCM audio.
#[derive(Debug, Clone, PartialEq)]
pub struct SoundData {
    /// The raw, interleaved audio samples.
    /// For stereo, samples are ordered `[L, R, L, R, ...]`.
    /// Values are expected to be in the range `[-1.0, 1.0]`.
    pub samples: Vec<f32>,
    /// The number of channels in the audio data (e.g., 1 for mono, 2 for stereo).
    pub channels: u16,
    /// The number of samples per second (e.g., 44100 Hz).
    pub sample_rate: u32,
}

/// An audio clip as delivered to the audio cache.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioData {
    /// Decoded samples (WAV input).
    Pcm(SoundData),
    /// A compressed container the loader does not decode (OGG, MP3, ...).
    Encoded(Vec<u8>),
}

impl Asset for AudioData {}

/// Source format of a tilemap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TilemapFormat {
    /// Comma-separated tile indices.
    Csv,
    /// Tiled's JSON export.
    TiledJson,
}

/// The body of a tilemap in its source format.
#[derive(Debug, Clone, PartialEq)]
pub enum TilemapSource {
    /// CSV text.
    Csv(String),
    /// Parsed Tiled JSON.
    Json(Value),
}

/// A tilemap tagged with its source format.
#[derive(Debug, Clone, PartialEq)]
pub struct TilemapData {
    /// The source format.
    pub format: TilemapFormat,
    /// The tilemap body.
    pub data: TilemapSource,
}

impl Asset for TilemapData {}

/// The decoded result of an item's post-fetch hook, one variant per file type.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessedPayload {
    /// Image, SVG or HTML texture source.
    Image(ImageSource),
    /// A decoded spritesheet with its frame grid.
    SpriteSheet {
        /// The decoded sheet.
        image: ImageData,
        /// How to slice it.
        config: SpriteSheetConfig,
    },
    /// Parsed JSON.
    Json(Value),
    /// XML text.
    Xml(String),
    /// Plain text.
    Text(String),
    /// Opaque bytes.
    Binary(Vec<u8>),
    /// An audio clip.
    Audio(AudioData),
    /// GLSL source.
    Glsl(String),
    /// A tilemap in either source format.
    Tilemap(TilemapData),
    /// Animation definitions.
    AnimationJson(Value),
}

impl ProcessedPayload {
    /// The file type that produces this kind of payload.
    ///
    /// Image sources map back to the markup type they came from.
    pub fn file_type(&self) -> FileType {
        match self {
            ProcessedPayload::Image(ImageSource::Bitmap(_)) => FileType::Image,
            ProcessedPayload::Image(ImageSource::Svg(_)) => FileType::Svg,
            ProcessedPayload::Image(ImageSource::Html(_)) => FileType::Html,
            ProcessedPayload::SpriteSheet { .. } => FileType::SpriteSheet,
            ProcessedPayload::Json(_) => FileType::Json,
            ProcessedPayload::Xml(_) => FileType::Xml,
            ProcessedPayload::Text(_) => FileType::Text,
            ProcessedPayload::Binary(_) => FileType::Binary,
            ProcessedPayload::Audio(_) => FileType::Audio,
            ProcessedPayload::Glsl(_) => FileType::Glsl,
            ProcessedPayload::Tilemap(TilemapData {
                format: TilemapFormat::Csv,
                ..
            }) => FileType::TilemapCsv,
            ProcessedPayload::Tilemap(TilemapData {
                format: TilemapFormat::TiledJson,
                ..
            }) => FileType::TilemapJson,
            ProcessedPayload::AnimationJson(_) => FileType::AnimationJson,
        }
    }
}
