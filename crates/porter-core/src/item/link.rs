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

use super::{FileType, ItemId};
use crate::error::LoaderError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of composite asset formed by two linked files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkKind {
    /// An image plus a JSON frame descriptor (hash or array layout).
    AtlasJson,
    /// An image plus a Unity text-format descriptor.
    UnityAtlas,
    /// A glyph page image plus a BMFont XML descriptor.
    BitmapFont,
    /// An audio clip plus a JSON sprite map.
    AudioSprite,
}

impl LinkKind {
    /// The file type that supplies the binary half of the pair.
    pub fn binary_type(self) -> FileType {
        match self {
            LinkKind::AtlasJson | LinkKind::UnityAtlas | LinkKind::BitmapFont => FileType::Image,
            LinkKind::AudioSprite => FileType::Audio,
        }
    }

    /// The file type that supplies the descriptor half of the pair.
    pub fn descriptor_type(self) -> FileType {
        match self {
            LinkKind::AtlasJson | LinkKind::AudioSprite => FileType::Json,
            LinkKind::UnityAtlas => FileType::Text,
            LinkKind::BitmapFont => FileType::Xml,
        }
    }

    /// Resolves the role a file of `file_type` plays in this kind of pair.
    pub fn role_of(self, file_type: FileType) -> Option<LinkRole> {
        if file_type == self.binary_type() {
            Some(LinkRole::Binary)
        } else if file_type == self.descriptor_type() {
            Some(LinkRole::Descriptor)
        } else {
            None
        }
    }
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkKind::AtlasJson => write!(f, "atlas-json"),
            LinkKind::UnityAtlas => write!(f, "unity-atlas"),
            LinkKind::BitmapFont => write!(f, "bitmap-font"),
            LinkKind::AudioSprite => write!(f, "audio-sprite"),
        }
    }
}

/// Which half of a pair an item supplies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkRole {
    /// The image or audio payload.
    Binary,
    /// The data describing how to interpret the binary payload.
    Descriptor,
}

/// The per-item view of a pair: who the partner is and what this item supplies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemLink {
    /// The other half of the pair.
    pub partner: ItemId,
    /// The composite asset the pair forms.
    pub kind: LinkKind,
    /// This item's role.
    pub role: LinkRole,
}

/// A symmetric association between two items that are only usable together.
///
/// Roles come from the declared file types, so the pair resolves the same way
/// no matter which half arrives first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairLink {
    /// The composite asset kind.
    pub kind: LinkKind,
    /// The item supplying the binary payload.
    pub binary: ItemId,
    /// The item supplying the descriptor.
    pub descriptor: ItemId,
}

impl PairLink {
    /// Builds a link from two `(id, type)` halves given in any order.
    ///
    /// # Errors
    /// Returns [`LoaderError::InvalidPair`] if the two types are not exactly
    /// the binary and descriptor types of `kind`.
    pub fn new(
        kind: LinkKind,
        first: (ItemId, FileType),
        second: (ItemId, FileType),
    ) -> Result<Self, LoaderError> {
        let invalid = || LoaderError::InvalidPair {
            kind,
            first: first.1,
            second: second.1,
        };
        match (kind.role_of(first.1), kind.role_of(second.1)) {
            (Some(LinkRole::Binary), Some(LinkRole::Descriptor)) => Ok(Self {
                kind,
                binary: first.0,
                descriptor: second.0,
            }),
            (Some(LinkRole::Descriptor), Some(LinkRole::Binary)) => Ok(Self {
                kind,
                binary: second.0,
                descriptor: first.0,
            }),
            _ => Err(invalid()),
        }
    }

    /// The per-item link for one half of the pair.
    pub fn item_link(&self, id: ItemId) -> Option<ItemLink> {
        if id == self.binary {
            Some(ItemLink {
                partner: self.descriptor,
                kind: self.kind,
                role: LinkRole::Binary,
            })
        } else if id == self.descriptor {
            Some(ItemLink {
                partner: self.binary,
                kind: self.kind,
                role: LinkRole::Descriptor,
            })
        } else {
            None
        }
    }
}
