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
use std::collections::HashMap;

/// Placement of one glyph on the font's texture page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Glyph {
    /// Left edge on the page.
    pub x: u32,
    /// Top edge on the page.
    pub y: u32,
    /// Width of the glyph rectangle.
    pub width: u32,
    /// Height of the glyph rectangle.
    pub height: u32,
    /// Horizontal offset applied when drawing.
    pub x_offset: i32,
    /// Vertical offset applied when drawing.
    pub y_offset: i32,
    /// How far the pen advances after this glyph.
    pub x_advance: i32,
}

/// Glyph layout of a bitmap font.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BitmapFontData {
    /// Face name.
    pub font: String,
    /// Nominal size in pixels.
    pub size: i32,
    /// Distance between baselines.
    pub line_height: i32,
    /// Glyphs keyed by code point.
    pub chars: HashMap<u32, Glyph>,
    /// Kerning adjustments keyed by `(first, second)` code points.
    pub kernings: HashMap<(u32, u32), i32>,
}

impl BitmapFontData {
    /// Kerning between two code points, zero if none is defined.
    pub fn kerning(&self, first: u32, second: u32) -> i32 {
        self.kernings.get(&(first, second)).copied().unwrap_or(0)
    }
}

/// What the bitmap font cache stores: the layout and the texture it samples.
#[derive(Debug, Clone, PartialEq)]
pub struct BitmapFontEntry {
    /// The parsed glyph layout.
    pub data: BitmapFontData,
    /// Key of the texture holding the glyph page.
    pub texture: String,
    /// Frame within that texture, when the page lives in an atlas.
    pub frame: Option<String>,
}

impl Asset for BitmapFontEntry {}
