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

//! Multi-part groups: composites such as multi-page atlases that resolve
//! only when every member loaded.

use crate::error::LoaderError;
use crate::item::ItemKey;

/// A named composite built from several independently loaded files.
///
/// Members are plain image and JSON items. The group resolves at dispatch
/// time only if every member made it into storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiPartGroup {
    name: String,
    members: Vec<ItemKey>,
}

impl MultiPartGroup {
    /// Declares a group.
    ///
    /// # Errors
    /// Returns [`LoaderError::EmptyGroup`] if `members` is empty.
    pub fn new(name: impl Into<String>, members: Vec<ItemKey>) -> Result<Self, LoaderError> {
        let name = name.into();
        if members.is_empty() {
            return Err(LoaderError::EmptyGroup { name });
        }
        Ok(Self { name, members })
    }

    /// The key the composite is registered under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Expected members, in declaration order.
    pub fn members(&self) -> &[ItemKey] {
        &self.members
    }

    /// Number of members expected for the group to resolve.
    pub fn expected_len(&self) -> usize {
        self.members.len()
    }
}
