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

use porter_core::asset::{Asset, AssetHandle};
use std::collections::HashMap;

/// A keyed store of asset handles of one type.
pub struct Assets<A: Asset> {
    storage: HashMap<String, AssetHandle<A>>,
}

impl<A: Asset> Default for Assets<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Asset> Clone for Assets<A> {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
        }
    }
}

impl<A: Asset> Assets<A> {
    /// Creates a new, empty asset storage.
    pub fn new() -> Self {
        Self {
            storage: HashMap::new(),
        }
    }

    /// Inserts an asset handle into the storage, associated with its key.
    /// If an asset with the same key already exists, it is replaced and the
    /// previous handle returned.
    ///
    /// # Arguments
    /// * `key` - The key the asset is registered under.
    /// * `handle` - The handle to the asset to be stored.
    pub fn insert(&mut self, key: impl Into<String>, handle: AssetHandle<A>) -> Option<AssetHandle<A>> {
        self.storage.insert(key.into(), handle)
    }

    /// Retrieves a reference to the asset handle associated with the given key.
    /// Returns `None` if no asset with the specified key is found.
    pub fn get(&self, key: &str) -> Option<&AssetHandle<A>> {
        self.storage.get(key)
    }

    /// Checks if an asset with the specified key exists in the storage.
    pub fn contains(&self, key: &str) -> bool {
        self.storage.contains_key(key)
    }

    /// Removes an asset, returning its handle.
    pub fn remove(&mut self, key: &str) -> Option<AssetHandle<A>> {
        self.storage.remove(key)
    }

    /// Number of stored assets.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Iterates over stored keys.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.storage.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_replaces_and_returns_previous() {
        let mut assets = Assets::<String>::new();
        assert!(assets.insert("a", AssetHandle::new("one".to_string())).is_none());
        let previous = assets.insert("a", AssetHandle::new("two".to_string()));

        assert_eq!(previous.as_deref().map(String::as_str), Some("one"));
        assert_eq!(assets.get("a").map(|h| h.as_str()), Some("two"));
        assert_eq!(assets.len(), 1);
    }

    #[test]
    fn test_remove() {
        let mut assets = Assets::<Vec<u8>>::new();
        assets.insert("bytes", AssetHandle::new(vec![1, 2]));
        assert!(assets.contains("bytes"));
        assert!(assets.remove("bytes").is_some());
        assert!(assets.is_empty());
    }
}
