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

//! Foundational types and contracts for the porter asset loader.
//!
//! This crate holds what every other porter crate agrees on: the item model
//! and its lifecycle, pair and group associations, the fetch contract, the
//! registry contract, the payload types that flow between them, loader
//! configuration, and cycle notifications. It contains no scheduling logic.

#![warn(missing_docs)]

pub mod asset;
pub mod config;
pub mod error;
pub mod event;
pub mod fetch;
pub mod group;
pub mod item;
pub mod registry;
pub mod state;

pub use config::LoaderConfig;
pub use error::LoaderError;
pub use state::{ItemState, LoaderState};
