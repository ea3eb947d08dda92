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

//! Backend-neutral descriptions, handles and configuration.

pub mod binding;
pub mod format;
pub mod pipeline;
pub mod resource;
pub mod settings;
pub mod state;
pub mod stats;
pub mod vertex;

pub use self::binding::*;
pub use self::format::*;
pub use self::pipeline::*;
pub use self::resource::*;
pub use self::settings::*;
pub use self::state::*;
pub use self::stats::*;
pub use self::vertex::*;
