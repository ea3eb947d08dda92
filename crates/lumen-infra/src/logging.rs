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

//! Logger initialization shared by the binaries of the workspace.

use env_logger::{Builder, Env};
use log::LevelFilter;

/// Installs `env_logger` as the global logger.
///
/// `RUST_LOG` overrides the default `info` filter. `wgpu_hal` is capped to errors
/// because it is very chatty at `info`.
pub fn init() {
    build().init();
}

/// Like [`init`], but does nothing if a logger is already installed.
pub fn try_init() -> bool {
    build().try_init().is_ok()
}

fn build() -> Builder {
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));
    builder.filter_module("wgpu_hal", LevelFilter::Error);
    builder
}
