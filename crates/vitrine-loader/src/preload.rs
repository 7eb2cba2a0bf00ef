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

//! Once-per-page-load hinting of critical resources.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, OnceLock};

use vitrine_core::host::{Capability, PreloadApi};
use vitrine_core::resource::{ResourceDescriptor, ResourceIdentity, ResourceKind, ResourcePriority};

/// The storefront's default critical-resource list: the assets the
/// above-the-fold render blocks on.
pub fn critical_resources() -> &'static [ResourceDescriptor] {
    static LIST: OnceLock<Vec<ResourceDescriptor>> = OnceLock::new();
    LIST.get_or_init(|| {
        vec![
            ResourceDescriptor::new(
                "/assets/fonts/storefront-sans.woff2",
                ResourceKind::Font,
                ResourcePriority::Critical,
            ),
            ResourceDescriptor::new(
                "/assets/css/storefront.css",
                ResourceKind::Style,
                ResourcePriority::Critical,
            ),
            ResourceDescriptor::new(
                "/assets/img/hero-banner.avif",
                ResourceKind::Image,
                ResourcePriority::Critical,
            ),
        ]
    })
}

/// Issues preload hints for a fixed set of resources, at most once per
/// `(url, kind)` identity for the preloader's lifetime.
///
/// The preloader is page-session-scoped: the page session owns one
/// instance, so a provider remount cannot re-issue hints. Hinting is
/// fire-and-forget; an individual resource failing neither raises nor
/// stops the remaining resources, and a failed attempt is not retried.
pub struct ResourcePreloader {
    resources: Vec<ResourceDescriptor>,
    issued: Mutex<HashSet<ResourceIdentity>>,
}

impl ResourcePreloader {
    /// Creates a preloader over an explicit resource list.
    pub fn new(resources: Vec<ResourceDescriptor>) -> Self {
        Self {
            resources,
            issued: Mutex::new(HashSet::new()),
        }
    }

    /// Creates a preloader over [`critical_resources`].
    pub fn with_critical_defaults() -> Self {
        Self::new(critical_resources().to_vec())
    }

    /// Hints every not-yet-attempted resource. Idempotent per identity:
    /// calling this twice issues no duplicate hints. Safe to call before
    /// any paint and never blocks the caller beyond hint registration.
    pub fn preload_critical(&self, preload: &Capability<Arc<dyn PreloadApi>>) {
        let api = match preload.as_available() {
            Some(api) => api,
            None => {
                log::debug!("preload hinting unavailable; skipping critical resources");
                return;
            }
        };

        for descriptor in &self.resources {
            let identity = descriptor.identity();
            {
                let mut issued = self.issued.lock().unwrap();
                if !issued.insert(identity.clone()) {
                    log::trace!("already hinted {identity}");
                    continue;
                }
            }
            match api.issue_hint(descriptor) {
                Ok(()) => log::debug!("preload hint issued for {identity}"),
                Err(err) => log::warn!("preload hint failed for {identity}: {err}"),
            }
        }
    }

    /// Number of identities attempted so far.
    pub fn issued_count(&self) -> usize {
        self.issued.lock().unwrap().len()
    }

    /// Whether a hint has been attempted for the given identity.
    pub fn was_issued(&self, identity: &ResourceIdentity) -> bool {
        self.issued.lock().unwrap().contains(identity)
    }
}
