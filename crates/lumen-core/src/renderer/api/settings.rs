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

//! Configuration consumed by a render device.

use crate::renderer::error::RenderError;
use serde::Deserialize;

/// Maximum number of command lists recorded concurrently.
pub const COMMANDLIST_COUNT: usize = 32;

/// Device-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RhiSettings {
    /// Swapchain images in flight. Destroyed objects are kept alive this many frames.
    pub backbuffer_count: u32,
    /// Enables the native validation layer. Only changes native error verbosity.
    pub debug_device: bool,
    /// Capacity of the timestamp query pool.
    pub max_timestamp_queries: u32,
    /// Capacity of the occlusion query pool.
    pub max_occlusion_queries: u32,
}

impl Default for RhiSettings {
    fn default() -> Self {
        Self {
            backbuffer_count: 2,
            debug_device: false,
            max_timestamp_queries: 1024,
            max_occlusion_queries: 1024,
        }
    }
}

impl RhiSettings {
    /// Parses settings from a JSON document. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, RenderError> {
        let settings: RhiSettings = serde_json::from_str(json)
            .map_err(|e| RenderError::InvalidConfiguration(format!("Malformed settings: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Checks that every value is usable.
    pub fn validate(&self) -> Result<(), RenderError> {
        if self.backbuffer_count == 0 {
            return Err(RenderError::InvalidConfiguration(
                "backbuffer_count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
