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

//! End-of-cycle delivery of decoded payloads to the reference registries.

mod bitmap_font;

pub use bitmap_font::*;

use porter_core::asset::{BitmapFontEntry, ImageSource, ProcessedPayload};
use porter_core::group::MultiPartGroup;
use porter_core::item::{FileType, ItemId, ItemKey, LinkKind};
use porter_core::registry::Registries;
use porter_data::textures::is_json_array_atlas;
use serde_json::Value;

/// A completed item awaiting dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredFile {
    /// The item's arena id.
    pub id: ItemId,
    /// The item's declared type.
    pub file_type: FileType,
    /// The item's key.
    pub key: String,
    /// The decoded payload.
    pub payload: ProcessedPayload,
}

impl StoredFile {
    fn matches(&self, member: &ItemKey) -> bool {
        self.file_type == member.file_type && self.key == member.key
    }
}

/// One entry of a cycle's storage. A pair is stored once, as a unit.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredEntry {
    /// An item that stands alone.
    Single(StoredFile),
    /// Both halves of a linked pair.
    Pair {
        /// The composite kind.
        kind: LinkKind,
        /// The half supplying the binary payload.
        binary: StoredFile,
        /// The half supplying the descriptor.
        descriptor: StoredFile,
    },
}

/// What a dispatch pass delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchReport {
    /// Standalone files handed to a registry.
    pub singles: usize,
    /// Pairs handed to a registry.
    pub pairs: usize,
    /// Multi-part groups assembled and registered.
    pub groups: usize,
    /// Animation documents imported after everything else.
    pub animations: usize,
    /// Entries that could not be delivered.
    pub dropped: usize,
}

/// Hands every stored payload to the registry that owns its kind.
///
/// Multi-part groups are resolved first, animation documents last, so that
/// animations can reference any texture delivered in the same cycle.
#[derive(Debug, Default)]
pub struct DispatchLane;

impl DispatchLane {
    /// Creates the lane.
    pub fn new() -> Self {
        Self
    }

    /// Dispatches `storage`, consuming it.
    pub fn dispatch(
        &self,
        storage: Vec<StoredEntry>,
        groups: &[MultiPartGroup],
        registries: &mut Registries<'_>,
    ) -> DispatchReport {
        let mut report = DispatchReport::default();
        let mut slots: Vec<Option<StoredEntry>> = storage.into_iter().map(Some).collect();

        for group in groups {
            if self.dispatch_group(group, &mut slots, registries) {
                report.groups += 1;
            }
        }

        let mut deferred = Vec::new();
        for entry in slots.into_iter().flatten() {
            match entry {
                StoredEntry::Single(StoredFile {
                    payload: ProcessedPayload::AnimationJson(data),
                    key,
                    ..
                }) => deferred.push((key, data)),
                StoredEntry::Single(file) => {
                    self.dispatch_single(file, registries);
                    report.singles += 1;
                }
                StoredEntry::Pair {
                    kind,
                    binary,
                    descriptor,
                } => {
                    if self.dispatch_pair(kind, binary, descriptor, registries) {
                        report.pairs += 1;
                    } else {
                        report.dropped += 1;
                    }
                }
            }
        }

        for (key, data) in deferred {
            log::debug!("Importing animations from '{}'.", key);
            registries.animations.import_json(&data, &*registries.textures);
            report.animations += 1;
        }
        report
    }

    /// Pulls a group's members out of `slots` and registers them as one texture.
    ///
    /// A group is only registered when every member arrived and at least one
    /// descriptor is present. Members are removed from `slots` either way.
    fn dispatch_group(
        &self,
        group: &MultiPartGroup,
        slots: &mut [Option<StoredEntry>],
        registries: &mut Registries<'_>,
    ) -> bool {
        let mut images: Vec<ImageSource> = Vec::new();
        let mut atlases: Vec<Value> = Vec::new();
        let mut found = 0;

        for member in group.members() {
            let slot = slots.iter_mut().find(|slot| {
                matches!(slot, Some(StoredEntry::Single(file)) if file.matches(member))
            });
            let Some(Some(StoredEntry::Single(file))) = slot.map(Option::take) else {
                continue;
            };
            found += 1;
            match file.payload {
                ProcessedPayload::Image(source) => images.push(source),
                ProcessedPayload::Json(atlas) => atlases.push(atlas),
                other => log::warn!(
                    "Group '{}' member '{}' is a {}, neither image nor atlas.",
                    group.name(),
                    member,
                    other.file_type()
                ),
            }
        }

        let usable = images.len() + atlases.len();
        if usable != group.expected_len() || atlases.is_empty() {
            log::warn!(
                "Group '{}' incomplete ({}/{} members, {} usable), not registered.",
                group.name(),
                found,
                group.expected_len(),
                usable
            );
            return false;
        }

        // The first descriptor decides the layout for the whole group.
        if is_json_array_atlas(&atlases[0]) {
            registries.textures.add_atlas_json_array(group.name(), images, atlases);
        } else {
            registries.textures.add_atlas_json_hash(group.name(), images, atlases);
        }
        true
    }

    fn dispatch_single(&self, file: StoredFile, registries: &mut Registries<'_>) {
        let key = file.key.as_str();
        match file.payload {
            ProcessedPayload::Image(source) => registries.textures.add_image(key, source),
            ProcessedPayload::SpriteSheet { image, config } => {
                registries.textures.add_sprite_sheet(key, image, config)
            }
            ProcessedPayload::Json(data) => registries.caches.add_json(key, data),
            ProcessedPayload::Xml(data) => registries.caches.add_xml(key, data),
            ProcessedPayload::Text(data) => registries.caches.add_text(key, data),
            ProcessedPayload::Binary(data) => registries.caches.add_binary(key, data),
            ProcessedPayload::Audio(data) => registries.caches.add_audio(key, data),
            ProcessedPayload::Glsl(source) => registries.caches.add_shader(key, source),
            ProcessedPayload::Tilemap(data) => registries.caches.add_tilemap(key, data),
            ProcessedPayload::AnimationJson(data) => {
                registries.animations.import_json(&data, &*registries.textures)
            }
        }
    }

    fn dispatch_pair(
        &self,
        kind: LinkKind,
        binary: StoredFile,
        descriptor: StoredFile,
        registries: &mut Registries<'_>,
    ) -> bool {
        match (kind, binary.payload, descriptor.payload) {
            (LinkKind::AtlasJson, ProcessedPayload::Image(image), ProcessedPayload::Json(atlas)) => {
                registries.textures.add_atlas(&binary.key, image, atlas);
            }
            (LinkKind::UnityAtlas, ProcessedPayload::Image(image), ProcessedPayload::Text(atlas)) => {
                registries.textures.add_unity_atlas(&binary.key, image, atlas);
            }
            (LinkKind::BitmapFont, ProcessedPayload::Image(image), ProcessedPayload::Xml(xml)) => {
                match parse_bitmap_font(&xml) {
                    Ok(data) => registries.caches.add_bitmap_font(
                        &descriptor.key,
                        BitmapFontEntry {
                            data,
                            texture: binary.key.clone(),
                            frame: None,
                        },
                    ),
                    Err(err) => log::error!("Bitmap font '{}' is unusable: {}", descriptor.key, err),
                }
                registries.textures.add_image(&binary.key, image);
            }
            (LinkKind::AudioSprite, ProcessedPayload::Audio(audio), ProcessedPayload::Json(map)) => {
                registries.caches.add_audio(&binary.key, audio);
                registries.caches.add_json(&descriptor.key, map);
            }
            (kind, b, d) => {
                log::error!(
                    "{} pair '{}' + '{}' has mismatched payloads ({} + {}).",
                    kind,
                    binary.key,
                    descriptor.key,
                    b.file_type(),
                    d.file_type()
                );
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use porter_core::asset::{AudioData, ImageData};
    use porter_core::registry::TextureRegistry;
    use porter_data::{AnimationManager, CacheManager, TextureManager};
    use serde_json::json;

    struct Sinks {
        textures: TextureManager,
        caches: CacheManager,
        animations: AnimationManager,
    }

    impl Sinks {
        fn new() -> Self {
            Self {
                textures: TextureManager::new(),
                caches: CacheManager::default(),
                animations: AnimationManager::new(),
            }
        }

        fn dispatch(&mut self, storage: Vec<StoredEntry>, groups: &[MultiPartGroup]) -> DispatchReport {
            let mut registries = Registries::new(&mut self.textures, &mut self.caches, &mut self.animations);
            DispatchLane::new().dispatch(storage, groups, &mut registries)
        }
    }

    fn file(id: u64, file_type: FileType, key: &str, payload: ProcessedPayload) -> StoredFile {
        StoredFile {
            id: ItemId::from_raw(id),
            file_type,
            key: key.into(),
            payload,
        }
    }

    fn bitmap() -> ImageSource {
        ImageSource::Bitmap(ImageData {
            width: 4,
            height: 4,
            pixels: vec![0; 64],
        })
    }

    #[test]
    fn test_singles_go_to_their_registries() {
        let mut sinks = Sinks::new();
        let report = sinks.dispatch(
            vec![
                StoredEntry::Single(file(1, FileType::Image, "logo", ProcessedPayload::Image(bitmap()))),
                StoredEntry::Single(file(2, FileType::Json, "cfg", ProcessedPayload::Json(json!({"a": 1})))),
                StoredEntry::Single(file(3, FileType::Glsl, "frag", ProcessedPayload::Glsl("void main(){}".into()))),
            ],
            &[],
        );
        assert_eq!(report.singles, 3);
        assert!(sinks.textures.contains("logo"));
        assert!(sinks.caches.json.contains("cfg"));
        assert!(sinks.caches.shader.contains("frag"));
    }

    #[test]
    fn test_animations_are_imported_after_textures() {
        let mut sinks = Sinks::new();
        // Animation first in storage, its texture second.
        let report = sinks.dispatch(
            vec![
                StoredEntry::Single(file(
                    1,
                    FileType::AnimationJson,
                    "anims",
                    ProcessedPayload::AnimationJson(json!({"anims": [{"key": "spin", "frames": [{"key": "coin"}]}]})),
                )),
                StoredEntry::Single(file(2, FileType::Image, "coin", ProcessedPayload::Image(bitmap()))),
            ],
            &[],
        );
        assert_eq!(report.animations, 1);
        assert_eq!(sinks.animations.get("spin").unwrap().frames.len(), 1);
    }

    #[test]
    fn test_pairs_resolve_by_kind() {
        let mut sinks = Sinks::new();
        let font_xml = r#"<font><info face="f" size="8"/><common lineHeight="10"/></font>"#;
        let report = sinks.dispatch(
            vec![
                StoredEntry::Pair {
                    kind: LinkKind::AtlasJson,
                    binary: file(1, FileType::Image, "hero", ProcessedPayload::Image(bitmap())),
                    descriptor: file(
                        2,
                        FileType::Json,
                        "hero",
                        ProcessedPayload::Json(json!({"frames": {"run": {"frame": {"x": 0, "y": 0, "w": 2, "h": 2}}}})),
                    ),
                },
                StoredEntry::Pair {
                    kind: LinkKind::BitmapFont,
                    binary: file(3, FileType::Image, "font-page", ProcessedPayload::Image(bitmap())),
                    descriptor: file(4, FileType::Xml, "font", ProcessedPayload::Xml(font_xml.into())),
                },
                StoredEntry::Pair {
                    kind: LinkKind::AudioSprite,
                    binary: file(5, FileType::Audio, "sfx", ProcessedPayload::Audio(AudioData::Encoded(vec![1]))),
                    descriptor: file(6, FileType::Json, "sfx-map", ProcessedPayload::Json(json!({"spritemap": {}}))),
                },
            ],
            &[],
        );

        assert_eq!(report.pairs, 3);
        assert!(sinks.textures.get("hero").unwrap().frame("run").is_some());
        assert!(sinks.textures.contains("font-page"));
        let font = sinks.caches.bitmap_font.get("font").unwrap();
        assert_eq!(font.texture, "font-page");
        assert_eq!(font.data.line_height, 10);
        assert!(sinks.caches.audio.contains("sfx"));
        assert!(sinks.caches.json.contains("sfx-map"));
    }

    #[test]
    fn test_mismatched_pair_is_dropped() {
        let mut sinks = Sinks::new();
        let report = sinks.dispatch(
            vec![StoredEntry::Pair {
                kind: LinkKind::UnityAtlas,
                binary: file(1, FileType::Image, "ship", ProcessedPayload::Image(bitmap())),
                descriptor: file(2, FileType::Text, "ship", ProcessedPayload::Json(json!({}))),
            }],
            &[],
        );
        assert_eq!(report.dropped, 1);
        assert!(sinks.textures.is_empty());
    }

    #[test]
    fn test_group_members_are_consumed_and_assembled() {
        let mut sinks = Sinks::new();
        let group = MultiPartGroup::new(
            "mega",
            vec![
                ItemKey::new(FileType::Image, "mega-0"),
                ItemKey::new(FileType::Json, "mega-0"),
                ItemKey::new(FileType::Image, "mega-1"),
                ItemKey::new(FileType::Json, "mega-1"),
            ],
        )
        .unwrap();
        let page = |n: &str| json!({"frames": [{"filename": n, "frame": {"x": 0, "y": 0, "w": 1, "h": 1}}]});

        let report = sinks.dispatch(
            vec![
                StoredEntry::Single(file(1, FileType::Image, "mega-0", ProcessedPayload::Image(bitmap()))),
                StoredEntry::Single(file(2, FileType::Json, "mega-0", ProcessedPayload::Json(page("a")))),
                StoredEntry::Single(file(3, FileType::Image, "mega-1", ProcessedPayload::Image(bitmap()))),
                StoredEntry::Single(file(4, FileType::Json, "mega-1", ProcessedPayload::Json(page("b")))),
                StoredEntry::Single(file(5, FileType::Text, "readme", ProcessedPayload::Text("hi".into()))),
            ],
            &[group],
        );

        assert_eq!(report.groups, 1);
        assert_eq!(report.singles, 1);
        let mega = sinks.textures.get("mega").unwrap();
        assert_eq!(mega.sources.len(), 2);
        assert_eq!(mega.frame("b").unwrap().source_index, 1);
        assert!(!sinks.textures.contains("mega-0"));
        assert!(sinks.caches.json.is_empty());
    }

    #[test]
    fn test_incomplete_group_is_skipped() {
        let mut sinks = Sinks::new();
        let group = MultiPartGroup::new(
            "mega",
            vec![ItemKey::new(FileType::Image, "p0"), ItemKey::new(FileType::Json, "p0")],
        )
        .unwrap();
        let report = sinks.dispatch(
            vec![StoredEntry::Single(file(1, FileType::Image, "p0", ProcessedPayload::Image(bitmap())))],
            &[group],
        );
        assert_eq!(report.groups, 0);
        assert_eq!(report.singles, 0);
        assert!(sinks.textures.is_empty());
    }
}
