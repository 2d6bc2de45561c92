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

use porter_core::item::ItemId;

/// Bounds the number of simultaneously in-flight fetches.
///
/// The gate is also the in-flight collection itself, so the bound cannot be
/// bypassed by tracking in-flight items elsewhere.
#[derive(Debug, Clone)]
pub struct ConcurrencyGate {
    limit: usize,
    in_flight: Vec<ItemId>,
}

impl ConcurrencyGate {
    /// Creates a gate admitting at most `limit` items. A limit of zero is raised to one.
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
            in_flight: Vec::new(),
        }
    }

    /// The current limit.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Changes the limit. Items already admitted stay admitted.
    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit.max(1);
    }

    /// Whether another item can be admitted.
    pub fn has_capacity(&self) -> bool {
        self.in_flight.len() < self.limit
    }

    /// Admits `id`. Returns `false` if the gate is full or `id` is already in.
    pub fn admit(&mut self, id: ItemId) -> bool {
        if !self.has_capacity() || self.contains(id) {
            return false;
        }
        self.in_flight.push(id);
        true
    }

    /// Releases `id`. Returns `false` if it was not in flight.
    pub fn release(&mut self, id: ItemId) -> bool {
        match self.in_flight.iter().position(|&i| i == id) {
            Some(index) => {
                self.in_flight.remove(index);
                true
            }
            None => false,
        }
    }

    /// Whether `id` is in flight.
    pub fn contains(&self, id: ItemId) -> bool {
        self.in_flight.contains(&id)
    }

    /// Items in flight, in admission order.
    pub fn in_flight(&self) -> &[ItemId] {
        &self.in_flight
    }

    /// Number of items in flight.
    pub fn len(&self) -> usize {
        self.in_flight.len()
    }

    /// Returns `true` if nothing is in flight.
    pub fn is_empty(&self) -> bool {
        self.in_flight.is_empty()
    }

    /// Forgets every in-flight item.
    pub fn clear(&mut self) {
        self.in_flight.clear();
    }
}
