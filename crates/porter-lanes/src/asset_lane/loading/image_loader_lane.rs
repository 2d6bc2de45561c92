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

//! Raster image decoding.

use super::AssetLoaderLane;
use anyhow::Context;
use porter_core::asset::ImageData;
use std::error::Error;

/// A lane decoding PNG, JPEG and the other formats the `image` crate knows to RGBA8.
#[derive(Debug, Clone, Default)]
pub struct ImageLoaderLane;

impl AssetLoaderLane<ImageData> for ImageLoaderLane {
    fn load(&self, bytes: &[u8]) -> Result<ImageData, Box<dyn Error + Send + Sync>> {
        let img = image::load_from_memory(bytes).context("Failed to decode image from memory")?;

        // Straight RGBA8, no colour-space conversion.
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();

        Ok(ImageData {
            width,
            height,
            pixels: rgba.into_raw(),
        })
    }
}
