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

//! Typed, synchronous notifications for load cycles.
//!
//! Listeners subscribe to an [`EventBus`] and are called in subscription
//! order, on the loader's thread, while the loader publishes. Subscriptions
//! live as long as the bus does unless cleared.

mod bus;

pub use self::bus::{EventBus, SubscriptionId};

use crate::fetch::CycleToken;

/// Published when a cycle starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleStarted {
    /// The cycle that started.
    pub cycle: CycleToken,
    /// Number of items queued for the cycle.
    pub queued: usize,
}

/// Published once a cycle has dispatched its results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleCompleted {
    /// The cycle that completed.
    pub cycle: CycleToken,
    /// Storage entries that reached dispatch. A pair counts once.
    pub succeeded: usize,
    /// Items that failed to fetch or decode.
    pub failed: usize,
}
