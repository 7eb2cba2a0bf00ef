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

//! Page-load-scoped state shared across provider instances.

use vitrine_core::resource::ResourceDescriptor;
use vitrine_loader::ResourcePreloader;
use vitrine_telemetry::VitalsCollector;

/// The singleton owning everything scoped to one page load rather than to
/// one provider instance.
///
/// Rules: the embedding host creates exactly one `PageSession` per true
/// navigation and shares it (behind an `Arc`) with every provider instance
/// mounted during that page's life. The session's guards — the collector's
/// subscribe-once flag and the preloader's issued-identity set — transition
/// forward exactly once and are never reset, so a provider that remounts
/// without a new navigation cannot double-subscribe or re-issue hints. The
/// session is dropped with the page; there is no explicit teardown.
pub struct PageSession {
    collector: VitalsCollector,
    preloader: ResourcePreloader,
}

impl PageSession {
    /// Creates a session with an explicit critical-resource list.
    pub fn new(resources: Vec<ResourceDescriptor>) -> Self {
        Self {
            collector: VitalsCollector::new(),
            preloader: ResourcePreloader::new(resources),
        }
    }

    /// Creates a session preloading the storefront's default critical
    /// resources.
    pub fn with_default_resources() -> Self {
        Self {
            collector: VitalsCollector::new(),
            preloader: ResourcePreloader::with_critical_defaults(),
        }
    }

    /// The page-load-wide vitals collector.
    pub fn collector(&self) -> &VitalsCollector {
        &self.collector
    }

    /// The page-load-wide resource preloader.
    pub fn preloader(&self) -> &ResourcePreloader {
        &self.preloader
    }
}

impl Default for PageSession {
    fn default() -> Self {
        Self::with_default_resources()
    }
}
