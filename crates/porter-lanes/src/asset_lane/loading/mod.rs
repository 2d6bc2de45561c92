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

//! Post-fetch decoding: turns an item's raw bytes into its typed payload.

mod audio_loader_lane;
mod image_loader_lane;

pub use audio_loader_lane::*;
pub use image_loader_lane::*;

use porter_core::asset::{ImageSource, ProcessedPayload, TilemapData, TilemapFormat, TilemapSource};
use porter_core::item::{FileType, LoadableItem};
use std::error::Error;
use thiserror::Error;

/// A trait for types that decode one kind of payload from a byte slice.
pub trait AssetLoaderLane<A> {
    /// Parses `bytes` into an `A`.
    fn load(&self, bytes: &[u8]) -> Result<A, Box<dyn Error + Send + Sync>>;
}

/// Why an item's post-fetch hook rejected its bytes.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The bytes are not a valid instance of the item's format.
    #[error("failed to decode {file_type} '{key}': {source}")]
    Decode {
        /// The item's declared type.
        file_type: FileType,
        /// The item's key.
        key: String,
        /// The decoder's error.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// A textual format was not UTF-8.
    #[error("{file_type} '{key}' is not valid UTF-8")]
    InvalidUtf8 {
        /// The item's declared type.
        file_type: FileType,
        /// The item's key.
        key: String,
        /// The conversion error.
        #[source]
        source: std::string::FromUtf8Error,
    },
    /// A spritesheet was enqueued without its frame grid.
    #[error("spritesheet '{key}' has no frame configuration")]
    MissingFrameConfig {
        /// The item's key.
        key: String,
    },
}

/// Runs the post-fetch hook matching each item's file type.
#[derive(Default)]
pub struct ProcessingLane {
    images: ImageLoaderLane,
    audio: AudioLoaderLane,
}

impl ProcessingLane {
    /// Creates the lane.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes `bytes` as the payload of `item`.
    pub fn process(&self, item: &LoadableItem, bytes: Vec<u8>) -> Result<ProcessedPayload, ProcessError> {
        let file_type = item.file_type();
        let key = item.key();
        let decode_err = |source: Box<dyn Error + Send + Sync>| ProcessError::Decode {
            file_type,
            key: key.to_string(),
            source,
        };
        let text = |bytes: Vec<u8>| {
            String::from_utf8(bytes).map_err(|source| ProcessError::InvalidUtf8 {
                file_type,
                key: key.to_string(),
                source,
            })
        };
        let json = |bytes: &[u8]| serde_json::from_slice(bytes).map_err(|e| decode_err(e.into()));

        let payload = match file_type {
            FileType::Image => ProcessedPayload::Image(ImageSource::Bitmap(
                self.images.load(&bytes).map_err(decode_err)?,
            )),
            FileType::SpriteSheet => {
                let config = item
                    .frame_config()
                    .cloned()
                    .ok_or_else(|| ProcessError::MissingFrameConfig { key: key.to_string() })?;
                ProcessedPayload::SpriteSheet {
                    image: self.images.load(&bytes).map_err(decode_err)?,
                    config,
                }
            }
            FileType::Svg => ProcessedPayload::Image(ImageSource::Svg(text(bytes)?)),
            FileType::Html => ProcessedPayload::Image(ImageSource::Html(text(bytes)?)),
            FileType::Json => ProcessedPayload::Json(json(&bytes)?),
            FileType::AnimationJson => ProcessedPayload::AnimationJson(json(&bytes)?),
            FileType::Xml => {
                let document = text(bytes)?;
                if !document.trim_start().starts_with('<') {
                    return Err(decode_err("document does not start with an XML tag".into()));
                }
                ProcessedPayload::Xml(document)
            }
            FileType::Text => ProcessedPayload::Text(text(bytes)?),
            FileType::Glsl => ProcessedPayload::Glsl(text(bytes)?),
            FileType::Binary => ProcessedPayload::Binary(bytes),
            FileType::Audio => ProcessedPayload::Audio(self.audio.load(&bytes).map_err(decode_err)?),
            FileType::TilemapCsv => ProcessedPayload::Tilemap(TilemapData {
                format: TilemapFormat::Csv,
                data: TilemapSource::Csv(text(bytes)?),
            }),
            FileType::TilemapJson => ProcessedPayload::Tilemap(TilemapData {
                format: TilemapFormat::TiledJson,
                data: TilemapSource::Json(json(&bytes)?),
            }),
        };
        Ok(payload)
    }
}
