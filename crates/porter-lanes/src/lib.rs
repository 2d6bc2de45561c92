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

//! Hot-path pipelines of the porter loader.
//!
//! The [`LoadQueueLane`](asset_lane::LoadQueueLane) is the scheduler. It
//! leans on the decoding lanes in [`asset_lane::loading`], the registry
//! dispatch in [`asset_lane::dispatch`] and any transport implementing
//! [`Fetcher`](porter_core::fetch::Fetcher), such as those in
//! [`asset_lane::fetch`].

#![warn(missing_docs)]

pub mod asset_lane;
