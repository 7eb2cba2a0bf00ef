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

//! Bridge over the host's performance-entry observer, restricted to
//! navigation timing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use vitrine_core::entry::{EntryKind, PerformanceEntry};
use vitrine_core::host::{Capability, EntryHandler, EntryObserverApi, ObserverSubscription};

/// The report function a bridge notifies for each navigation entry.
pub type EntryReportFn = Arc<dyn Fn(&PerformanceEntry) + Send + Sync>;

/// One live navigation-timing observation, torn down exactly once.
///
/// When the host has no entry-observation capability the bridge is a no-op
/// whose [`disconnect`](NavigationObserverBridge::disconnect) is equally a
/// no-op; page initialization never fails on a missing observer. Dropping
/// an undisconnected bridge disconnects it.
pub struct NavigationObserverBridge {
    subscription: Option<Box<dyn ObserverSubscription>>,
    disconnected: AtomicBool,
}

impl NavigationObserverBridge {
    /// Opens the bridge, notifying `report` for every navigation entry.
    ///
    /// Entries of any other kind are filtered out here, before `report`
    /// can see them, even if the host's observer delivers more than it was
    /// asked for.
    pub fn open(
        entries: &Capability<Arc<dyn EntryObserverApi>>,
        report: EntryReportFn,
    ) -> Self {
        let subscription = match entries.as_available() {
            Some(api) => {
                let handler: EntryHandler = Arc::new(move |entry| {
                    if entry.kind == EntryKind::Navigation {
                        report(&entry);
                    } else {
                        log::trace!("ignoring {} entry '{}'", entry.kind, entry.name);
                    }
                });
                Some(api.observe(&[EntryKind::Navigation], handler))
            }
            None => {
                log::debug!("entry observation unavailable; navigation bridge is a no-op");
                None
            }
        };

        Self {
            subscription,
            disconnected: AtomicBool::new(false),
        }
    }

    /// Opens the bridge with the reference report function,
    /// [`log_navigation_entry`].
    pub fn with_default_report(entries: &Capability<Arc<dyn EntryObserverApi>>) -> Self {
        Self::open(entries, Arc::new(log_navigation_entry))
    }

    /// Tears the observation down. Idempotent: only the first call reaches
    /// the host, later calls (and the `Drop` impl) return quietly.
    pub fn disconnect(&self) {
        if self.disconnected.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(subscription) = &self.subscription {
            subscription.disconnect();
            log::debug!("navigation observer disconnected");
        }
    }

    /// Whether `disconnect` has run.
    pub fn is_disconnected(&self) -> bool {
        self.disconnected.load(Ordering::SeqCst)
    }
}

impl Drop for NavigationObserverBridge {
    fn drop(&mut self) {
        self.disconnect();
    }
}

/// The reference report function: one structured log line per navigation
/// entry. Never panics.
pub fn log_navigation_entry(entry: &PerformanceEntry) {
    match serde_json::to_string(entry) {
        Ok(json) => log::info!(target: "vitrine::navigation", "{json}"),
        Err(err) => log::warn!("could not serialize navigation entry '{}': {err}", entry.name),
    }
}
