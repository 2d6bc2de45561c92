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

//! Asset payload types shared between the loader and the registries.
//!
//! Payloads are produced by the post-fetch hooks and consumed by the
//! registries on dispatch. Everything stored in a registry implements the
//! [`Asset`] marker trait and is held behind an [`AssetHandle`].

mod font;
mod handle;
mod payload;

pub use font::*;
pub use handle::*;
pub use payload::*;

/// Marker trait for anything a registry can hold.
pub trait Asset: Send + Sync + 'static {}

impl Asset for String {}
impl Asset for Vec<u8> {}
impl Asset for serde_json::Value {}
