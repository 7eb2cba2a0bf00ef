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

//! Deferred construction of non-critical page sections.

pub mod handle;

pub use handle::{LazySection, SectionFactory, SectionView};

use std::time::Duration;

/// Tuning knobs for deferred section loading.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Delay before loading anyway when idle detection (or viewport
    /// watching, for the `Visible` policy) is unsupported by the host.
    /// Bounds how long a below-the-fold section can stay unloaded on a
    /// degraded host.
    pub idle_fallback_delay: Duration,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            idle_fallback_delay: Duration::from_millis(200),
        }
    }
}
