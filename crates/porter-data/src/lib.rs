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

//! Reference registries for the porter loader.
//!
//! [`TextureManager`], [`CacheManager`] and [`AnimationManager`] implement the
//! registry contracts from `porter-core` and keep dispatched assets in memory
//! behind [`AssetHandle`](porter_core::asset::AssetHandle)s.

#![warn(missing_docs)]

pub mod animation;
pub mod assets;
pub mod textures;

pub use animation::AnimationManager;
pub use assets::{Assets, CacheManager};
pub use textures::TextureManager;
