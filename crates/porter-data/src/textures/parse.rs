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

//! Frame extraction from atlas descriptors and spritesheet grids.
//!
//! Malformed entries are skipped with a warning rather than failing the whole
//! texture.

use super::Frame;
use porter_core::asset::SpriteSheetConfig;
use serde::Deserialize;
use serde_json::Value;

#[derive(Deserialize)]
struct Rect {
    x: u32,
    y: u32,
    w: u32,
    h: u32,
}

#[derive(Deserialize)]
struct HashEntry {
    frame: Rect,
    #[serde(default)]
    rotated: bool,
}

#[derive(Deserialize)]
struct ArrayEntry {
    filename: String,
    frame: Rect,
    #[serde(default)]
    rotated: bool,
}

fn to_frame(rect: Rect, rotated: bool, source_index: usize) -> Frame {
    Frame {
        source_index,
        x: rect.x,
        y: rect.y,
        width: rect.w,
        height: rect.h,
        rotated,
    }
}

/// Returns `true` if a JSON atlas lists its frames as an array.
pub fn is_json_array_atlas(atlas: &Value) -> bool {
    matches!(atlas.get("frames"), Some(Value::Array(_)))
}

/// Extracts named frames from a JSON atlas in either the hash or array layout.
pub fn atlas_frames(atlas: &Value, source_index: usize) -> Vec<(String, Frame)> {
    match atlas.get("frames") {
        Some(Value::Array(entries)) => entries
            .iter()
            .filter_map(|entry| match ArrayEntry::deserialize(entry) {
                Ok(e) => Some((e.filename, to_frame(e.frame, e.rotated, source_index))),
                Err(err) => {
                    log::warn!("Skipping malformed atlas frame: {}", err);
                    None
                }
            })
            .collect(),
        Some(Value::Object(entries)) => entries
            .iter()
            .filter_map(|(name, entry)| match HashEntry::deserialize(entry) {
                Ok(e) => Some((name.clone(), to_frame(e.frame, e.rotated, source_index))),
                Err(err) => {
                    log::warn!("Skipping malformed atlas frame '{}': {}", name, err);
                    None
                }
            })
            .collect(),
        _ => {
            log::warn!("Atlas descriptor has no 'frames' entry.");
            Vec::new()
        }
    }
}

#[derive(Default)]
struct UnitySprite {
    name: String,
    x: Option<u32>,
    y: Option<u32>,
    width: Option<u32>,
    height: Option<u32>,
}

impl UnitySprite {
    fn into_frame(self, image_height: Option<u32>) -> Option<(String, Frame)> {
        let (x, y, width, height) = (self.x?, self.y?, self.width?, self.height?);
        // Unity measures y from the bottom edge.
        let y = match image_height {
            Some(h) => h.saturating_sub(y + height),
            None => y,
        };
        Some((
            self.name,
            Frame {
                source_index: 0,
                x,
                y,
                width,
                height,
                rotated: false,
            },
        ))
    }
}

/// Extracts frames from a Unity `.meta` sprite list.
///
/// Only `name`, `x`, `y`, `width` and `height` are read; everything else in
/// the document is ignored.
pub fn unity_frames(text: &str, image_height: Option<u32>) -> Vec<(String, Frame)> {
    let mut frames = Vec::new();
    let mut current: Option<UnitySprite> = None;

    for line in text.lines() {
        let line = line.trim();
        let line = line.strip_prefix("- ").unwrap_or(line);
        let Some((field, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();

        match field.trim() {
            "name" => {
                if let Some(frame) = current.take().and_then(|s| s.into_frame(image_height)) {
                    frames.push(frame);
                }
                current = Some(UnitySprite {
                    name: value.to_string(),
                    ..Default::default()
                });
            }
            field @ ("x" | "y" | "width" | "height") => {
                let (Some(sprite), Ok(number)) = (current.as_mut(), value.parse::<u32>()) else {
                    continue;
                };
                match field {
                    "x" => sprite.x = Some(number),
                    "y" => sprite.y = Some(number),
                    "width" => sprite.width = Some(number),
                    _ => sprite.height = Some(number),
                }
            }
            _ => {}
        }
    }

    if let Some(frame) = current.and_then(|s| s.into_frame(image_height)) {
        frames.push(frame);
    }
    frames
}

/// Returns `(columns, step_x, step_y, total)`, or `None` on overflow.
fn grid_size(width: u32, height: u32, config: &SpriteSheetConfig) -> Option<(u32, u32, u32, u32)> {
    let step_x = config.frame_width.checked_add(config.spacing)?;
    let step_y = config.frame_height.checked_add(config.spacing)?;
    let usable_w = width.checked_add(config.spacing)?.saturating_sub(config.margin);
    let usable_h = height.checked_add(config.spacing)?.saturating_sub(config.margin);
    let columns = usable_w / step_x;
    let rows = usable_h / step_y;
    Some((columns, step_x, step_y, columns.checked_mul(rows)?))
}

/// Cuts a `width` x `height` image into the grid described by `config`.
///
/// Frames are named by their index in the full grid.
pub fn sprite_sheet_frames(width: u32, height: u32, config: &SpriteSheetConfig) -> Vec<(String, Frame)> {
    if config.frame_width == 0 || config.frame_height == 0 {
        log::warn!("Spritesheet frame size must be non-zero.");
        return Vec::new();
    }
    let Some((columns, step_x, step_y, total)) = grid_size(width, height, config) else {
        log::warn!(
            "Spritesheet layout overflows (spacing {}, margin {}).",
            config.spacing,
            config.margin
        );
        return Vec::new();
    };
    if total == 0 {
        log::warn!(
            "Spritesheet {}x{} is smaller than one {}x{} frame.",
            width,
            height,
            config.frame_width,
            config.frame_height
        );
        return Vec::new();
    }

    let start = if config.start_frame >= total {
        log::warn!("Spritesheet start frame {} out of range.", config.start_frame);
        0
    } else {
        config.start_frame
    };
    let end = config.end_frame.map_or(total - 1, |e| e.min(total - 1));

    (start..=end)
        .map(|index| {
            let column = index % columns;
            let row = index / columns;
            (
                index.to_string(),
                Frame {
                    source_index: 0,
                    x: config.margin + column * step_x,
                    y: config.margin + row * step_y,
                    width: config.frame_width,
                    height: config.frame_height,
                    rotated: false,
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hash_atlas() {
        let atlas = json!({
            "frames": {
                "idle": {"frame": {"x": 0, "y": 0, "w": 10, "h": 12}},
                "jump": {"frame": {"x": 10, "y": 0, "w": 10, "h": 12}, "rotated": true},
                "broken": {"frame": {"x": "nope"}}
            }
        });
        let frames = atlas_frames(&atlas, 0);
        assert!(!is_json_array_atlas(&atlas));
        assert_eq!(frames.len(), 2);
        let jump = frames.iter().find(|(n, _)| n == "jump").unwrap();
        assert!(jump.1.rotated);
        assert_eq!(jump.1.x, 10);
    }

    #[test]
    fn test_array_atlas() {
        let atlas = json!({
            "frames": [
                {"filename": "a", "frame": {"x": 1, "y": 2, "w": 3, "h": 4}}
            ]
        });
        assert!(is_json_array_atlas(&atlas));
        let frames = atlas_frames(&atlas, 3);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].0, "a");
        assert_eq!(frames[0].1.source_index, 3);
        assert_eq!((frames[0].1.width, frames[0].1.height), (3, 4));
    }

    #[test]
    fn test_atlas_without_frames() {
        assert!(atlas_frames(&json!({"meta": {}}), 0).is_empty());
    }

    #[test]
    fn test_unity_frames_flip_y() {
        let text = "\
TextureImporter:
  spritesheet:
    sprites:
    - name: ship
      rect:
        serializedVersion: 2
        x: 5
        y: 10
        width: 20
        height: 30
    - name: rock
      rect:
        x: 0
        y: 0
        width: 8
        height: 8
";
        let frames = unity_frames(text, Some(100));
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].0, "ship");
        assert_eq!(frames[0].1.y, 100 - (10 + 30));
        assert_eq!(frames[1].0, "rock");
        assert_eq!(frames[1].1.y, 92);
    }

    #[test]
    fn test_sprite_sheet_grid() {
        let config = SpriteSheetConfig {
            frame_width: 16,
            frame_height: 16,
            ..Default::default()
        };
        let frames = sprite_sheet_frames(64, 32, &config);
        assert_eq!(frames.len(), 8);
        assert_eq!(frames[5].0, "5");
        assert_eq!((frames[5].1.x, frames[5].1.y), (16, 16));
    }

    #[test]
    fn test_sprite_sheet_margin_spacing_and_range() {
        let config = SpriteSheetConfig {
            frame_width: 10,
            frame_height: 10,
            margin: 1,
            spacing: 2,
            start_frame: 1,
            end_frame: Some(2),
        };
        // usable width (34 + 2 - 1) / 12 = 2 columns, 1 row
        let frames = sprite_sheet_frames(34, 12, &config);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].0, "1");
        assert_eq!(frames[0].1.x, 1 + 12);
    }

    #[test]
    fn test_sprite_sheet_overflowing_layout_yields_no_frames() {
        let wide_spacing = SpriteSheetConfig {
            frame_width: 16,
            frame_height: 16,
            spacing: u32::MAX,
            ..Default::default()
        };
        assert!(sprite_sheet_frames(64, 64, &wide_spacing).is_empty());

        let huge_grid = SpriteSheetConfig {
            frame_width: 1,
            frame_height: 1,
            ..Default::default()
        };
        assert!(sprite_sheet_frames(u32::MAX, u32::MAX, &huge_grid).is_empty());

        let huge_margin = SpriteSheetConfig {
            frame_width: 16,
            frame_height: 16,
            margin: u32::MAX,
            ..Default::default()
        };
        assert!(sprite_sheet_frames(64, 64, &huge_margin).is_empty());
    }

    #[test]
    fn test_sprite_sheet_too_small() {
        let config = SpriteSheetConfig::default();
        assert!(sprite_sheet_frames(8, 8, &config).is_empty());
    }
}
