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

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How the transport should hand back the response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResponseType {
    /// Raw bytes.
    #[default]
    Binary,
    /// UTF-8 text.
    Text,
}

/// Transport settings shared by every item unless an item overrides them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    /// Expected body encoding.
    pub response_type: ResponseType,
    /// Upper bound on a single fetch, if any.
    pub timeout_ms: Option<u64>,
    /// Extra request headers.
    pub headers: Vec<(String, String)>,
    /// Whether credentials accompany cross-origin requests.
    pub with_credentials: bool,
}

impl FetchSettings {
    /// The timeout as a [`Duration`].
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}
