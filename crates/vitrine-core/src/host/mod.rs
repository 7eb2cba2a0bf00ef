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

//! Capability traits through which the performance layer talks to its
//! host environment.
//!
//! Every browser-level facility the layer consumes is modeled as a trait
//! object wrapped in a [`Capability`]: present hosts hand over an
//! implementation, absent ones select [`Capability::Unavailable`] once at
//! construction. Downstream code matches on the capability exactly once
//! and never re-checks presence.

use crate::entry::{EntryKind, PerformanceEntry};
use crate::resource::{PreloadHintError, ResourceDescriptor};
use crate::vitals::{MetricSample, VitalKind};
use std::sync::Arc;
use std::time::Duration;

/// A unit of deferred work handed to the host scheduler.
pub type Task = Box<dyn FnOnce() + Send>;

/// A callback receiving performance entries from an observer.
pub type EntryHandler = Arc<dyn Fn(PerformanceEntry) + Send + Sync>;

/// A callback receiving web-vital samples from the host.
pub type VitalHandler = Arc<dyn Fn(MetricSample) + Send + Sync>;

/// A host facility that is either present or absent, decided once at
/// construction.
#[derive(Debug, Clone)]
pub enum Capability<T> {
    /// The host exposes the facility.
    Available(T),
    /// The host does not expose the facility; consumers degrade to no-ops.
    Unavailable,
}

impl<T> Capability<T> {
    /// Wraps a present facility.
    pub fn available(value: T) -> Self {
        Capability::Available(value)
    }

    /// Returns `true` if the facility is present.
    pub fn is_available(&self) -> bool {
        matches!(self, Capability::Available(_))
    }

    /// Returns the facility if present.
    pub fn as_available(&self) -> Option<&T> {
        match self {
            Capability::Available(value) => Some(value),
            Capability::Unavailable => None,
        }
    }
}

/// A live observer registration that can be torn down.
///
/// `disconnect` must be safe to call more than once; wrappers additionally
/// guard with their own once-flags so a double disconnect never reaches a
/// host that cannot tolerate it.
pub trait ObserverSubscription: Send + Sync {
    /// Stops delivery. Idempotent.
    fn disconnect(&self);
}

/// The host's performance-entry observation facility.
pub trait EntryObserverApi: Send + Sync {
    /// Opens an observer for the given entry kinds. Entries flow to
    /// `handler` until the returned subscription is disconnected.
    fn observe(&self, kinds: &[EntryKind], handler: EntryHandler) -> Box<dyn ObserverSubscription>;
}

/// The host's web-vitals signal source.
pub trait VitalsApi: Send + Sync {
    /// Subscribes `handler` to one vital. Returns `false` when the host
    /// cannot measure that vital; the handler then simply never fires.
    fn subscribe(&self, kind: VitalKind, handler: VitalHandler) -> bool;
}

/// The host's resource hinting facility.
pub trait PreloadApi: Send + Sync {
    /// Hints the host to start fetching a resource. Must not block: the
    /// fetch itself happens in the background, the call only registers the
    /// hint.
    fn issue_hint(&self, descriptor: &ResourceDescriptor) -> Result<(), PreloadHintError>;
}

/// The host's macrotask queue. Always present: it *is* the event loop.
pub trait TaskQueueApi: Send + Sync {
    /// Enqueues a task to run on a later turn of the event loop.
    fn post(&self, task: Task);

    /// Enqueues a task to run once `delay` has elapsed.
    fn post_delayed(&self, delay: Duration, task: Task);
}

/// The host's idle-time scheduler.
pub trait IdleApi: Send + Sync {
    /// Runs `task` the next time the host reports it is idle.
    fn request_idle(&self, task: Task);
}

/// The host's viewport-proximity facility.
pub trait ViewportApi: Send + Sync {
    /// Fires `on_approach` once when the named region enters or approaches
    /// the viewport. The returned subscription cancels the watch.
    fn watch_approach(&self, region: &str, on_approach: Task) -> Box<dyn ObserverSubscription>;
}

/// The full set of host facilities handed to the performance layer.
///
/// Built once per page visit by the embedding host. Only the task queue is
/// mandatory; every other facility may be [`Capability::Unavailable`].
#[derive(Clone)]
pub struct HostCapabilities {
    /// The event loop's macrotask queue.
    pub tasks: Arc<dyn TaskQueueApi>,
    /// Performance-entry observation.
    pub entries: Capability<Arc<dyn EntryObserverApi>>,
    /// Web-vitals signals.
    pub vitals: Capability<Arc<dyn VitalsApi>>,
    /// Resource preload hinting.
    pub preload: Capability<Arc<dyn PreloadApi>>,
    /// Idle-time scheduling.
    pub idle: Capability<Arc<dyn IdleApi>>,
    /// Viewport-proximity watching.
    pub viewport: Capability<Arc<dyn ViewportApi>>,
}

impl HostCapabilities {
    /// A host that offers nothing beyond its task queue. Useful for tests
    /// and for degraded environments.
    pub fn bare(tasks: Arc<dyn TaskQueueApi>) -> Self {
        Self {
            tasks,
            entries: Capability::Unavailable,
            vitals: Capability::Unavailable,
            preload: Capability::Unavailable,
            idle: Capability::Unavailable,
            viewport: Capability::Unavailable,
        }
    }
}
