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

//! Error types surfaced by the loader's public contract.

use crate::item::{FileType, LinkKind};
use crate::state::{ItemState, LoaderState};
use thiserror::Error;

/// Errors returned when the loader rejects a request.
///
/// None of these abort a cycle in progress; they only reject the call that
/// produced them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoaderError {
    /// `enqueue` or `start` was called while a cycle is running or after destroy.
    #[error("loader is not ready to accept work (state: {state})")]
    NotReady {
        /// The loader state at the time of the call.
        state: LoaderState,
    },
    /// The item has no key and cannot be identified.
    #[error("{file_type} file has no key")]
    MissingKey {
        /// Type of the rejected item.
        file_type: FileType,
    },
    /// An item with the same key and type is already pending.
    #[error("'{key}' ({file_type}) is already queued")]
    DuplicateKey {
        /// The duplicated key.
        key: String,
        /// Its file type.
        file_type: FileType,
    },
    /// The two files do not form the requested kind of pair.
    #[error("{first} + {second} cannot form a {kind} pair")]
    InvalidPair {
        /// The requested pair kind.
        kind: LinkKind,
        /// Type of the first file.
        first: FileType,
        /// Type of the second file.
        second: FileType,
    },
    /// The item has left `Pending` and cannot enter a new cycle.
    #[error("'{key}' ({file_type}) is {state:?}, only pending items can be queued")]
    NotPending {
        /// Key of the rejected item.
        key: String,
        /// Its file type.
        file_type: FileType,
        /// The state it was in.
        state: ItemState,
    },
    /// A multi-part group was declared with no members.
    #[error("group '{name}' has no members")]
    EmptyGroup {
        /// Name of the rejected group.
        name: String,
    },
}
