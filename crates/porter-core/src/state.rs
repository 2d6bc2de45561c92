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

//! Lifecycle states for individual items and for the loader as a whole.

use std::fmt;
use thiserror::Error;

/// The lifecycle of a single loadable item within one load cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ItemState {
    /// Queued, waiting for a free slot under the concurrency gate.
    #[default]
    Pending,
    /// A fetch has been issued and has not settled yet.
    InFlight,
    /// The fetch succeeded; raw bytes are attached but not yet decoded.
    Loaded,
    /// The post-fetch hook decoded the raw bytes into a payload.
    Complete,
    /// The fetch or the decode failed.
    Errored,
}

impl ItemState {
    /// Whether the item has reached a terminal state for the current cycle.
    pub fn is_terminal(self) -> bool {
        matches!(self, ItemState::Complete | ItemState::Errored)
    }

    /// Checks if a transition from `self` to `next` is legal.
    pub fn can_transition_to(self, next: ItemState) -> bool {
        use ItemState::*;
        matches!(
            (self, next),
            (Pending, InFlight)
                | (InFlight, Loaded)
                | (InFlight, Errored)
                | (Loaded, Complete)
                | (Loaded, Errored)
        )
    }
}

/// Error returned when an item is asked to perform an illegal transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("illegal item transition {from:?} -> {to:?}")]
pub struct ItemStateError {
    /// The state the item was in.
    pub from: ItemState,
    /// The state that was requested.
    pub to: ItemState,
}

/// The state of a loader's current cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LoaderState {
    /// Fresh or reset; accepting work.
    #[default]
    Idle,
    /// Fetches are being admitted and settled.
    Loading,
    /// Every fetch settled; fetched items are being decoded and paired.
    Processing,
    /// The cycle finished and results were dispatched.
    Complete,
    /// The cycle finished with failures and nothing to dispatch.
    Failed,
    /// Terminal. The loader no longer accepts work.
    Destroyed,
}

impl LoaderState {
    /// Whether `enqueue` and `start` are legal in this state.
    pub fn is_ready(self) -> bool {
        matches!(
            self,
            LoaderState::Idle | LoaderState::Complete | LoaderState::Failed
        )
    }

    /// Whether a cycle is actively loading or processing.
    pub fn is_loading(self) -> bool {
        matches!(self, LoaderState::Loading | LoaderState::Processing)
    }
}

impl fmt::Display for LoaderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoaderState::Idle => write!(f, "Idle"),
            LoaderState::Loading => write!(f, "Loading"),
            LoaderState::Processing => write!(f, "Processing"),
            LoaderState::Complete => write!(f, "Complete"),
            LoaderState::Failed => write!(f, "Failed"),
            LoaderState::Destroyed => write!(f, "Destroyed"),
        }
    }
}
