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

//! A deterministic, single-threaded implementation of every host
//! capability, driven manually by tests and demos.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use vitrine_core::entry::{EntryKind, PerformanceEntry};
use vitrine_core::host::{
    Capability, EntryHandler, EntryObserverApi, HostCapabilities, IdleApi, ObserverSubscription,
    PreloadApi, Task, TaskQueueApi, ViewportApi, VitalHandler, VitalsApi,
};
use vitrine_core::resource::{PreloadHintError, ResourceDescriptor, ResourceIdentity};
use vitrine_core::vitals::{MetricSample, VitalKind};

/// A cooperative event loop standing in for a browser page runtime.
///
/// Nothing runs spontaneously: tasks execute when the driver drains the
/// queue, time passes when the driver advances the virtual clock, idle
/// callbacks fire when the driver declares the loop idle, and viewport
/// watchers fire when the driver scrolls. This makes every interleaving in
/// the performance layer reproducible in tests.
#[derive(Clone, Default)]
pub struct HeadlessHost {
    inner: Arc<HostInner>,
}

#[derive(Default)]
struct HostInner {
    now: Mutex<Duration>,
    seq: AtomicU64,
    tasks: Mutex<VecDeque<Task>>,
    timers: Mutex<Vec<Timer>>,
    idle: Mutex<Vec<Task>>,
    regions: Mutex<HashMap<String, Vec<RegionWatch>>>,
    vital_subs: Mutex<Vec<(VitalKind, VitalHandler)>>,
    unsupported_vitals: Mutex<HashSet<VitalKind>>,
    entry_subs: Mutex<Vec<EntrySub>>,
    hints: Mutex<Vec<ResourceIdentity>>,
    rejected_urls: Mutex<HashSet<String>>,
}

struct Timer {
    due: Duration,
    seq: u64,
    task: Task,
}

struct RegionWatch {
    on_approach: Option<Task>,
    active: Arc<AtomicBool>,
}

struct EntrySub {
    kinds: Vec<EntryKind>,
    handler: EntryHandler,
    active: Arc<AtomicBool>,
}

/// Subscription handle whose disconnect simply deactivates the source.
struct FlagSubscription {
    active: Arc<AtomicBool>,
}

impl ObserverSubscription for FlagSubscription {
    fn disconnect(&self) {
        self.active.store(false, Ordering::SeqCst);
    }
}

impl HeadlessHost {
    /// Creates a host at virtual time zero with every capability present.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the capability set handed to the performance layer. Every
    /// facility is `Available`; tests degrade individual slots by
    /// overwriting them with [`Capability::Unavailable`].
    pub fn capabilities(&self) -> HostCapabilities {
        HostCapabilities {
            tasks: Arc::new(Backend(Arc::clone(&self.inner))),
            entries: Capability::available(
                Arc::new(Backend(Arc::clone(&self.inner))) as Arc<dyn EntryObserverApi>
            ),
            vitals: Capability::available(
                Arc::new(Backend(Arc::clone(&self.inner))) as Arc<dyn VitalsApi>
            ),
            preload: Capability::available(
                Arc::new(Backend(Arc::clone(&self.inner))) as Arc<dyn PreloadApi>
            ),
            idle: Capability::available(
                Arc::new(Backend(Arc::clone(&self.inner))) as Arc<dyn IdleApi>
            ),
            viewport: Capability::available(
                Arc::new(Backend(Arc::clone(&self.inner))) as Arc<dyn ViewportApi>
            ),
        }
    }

    /// Runs queued macrotasks until the queue is empty, including tasks
    /// they enqueue.
    pub fn run_until_idle(&self) {
        loop {
            let task = self.inner.tasks.lock().unwrap().pop_front();
            match task {
                Some(task) => task(),
                None => break,
            }
        }
    }

    /// Advances the virtual clock, firing timers that came due in
    /// scheduling order, then drains the queue.
    pub fn advance(&self, delta: Duration) {
        let now = {
            let mut now = self.inner.now.lock().unwrap();
            *now += delta;
            *now
        };

        let mut due = {
            let mut timers = self.inner.timers.lock().unwrap();
            let mut fired = Vec::new();
            let mut remaining = Vec::new();
            for timer in timers.drain(..) {
                if timer.due <= now {
                    fired.push(timer);
                } else {
                    remaining.push(timer);
                }
            }
            *timers = remaining;
            fired
        };
        due.sort_by_key(|timer| (timer.due, timer.seq));

        {
            let mut tasks = self.inner.tasks.lock().unwrap();
            for timer in due {
                tasks.push_back(timer.task);
            }
        }
        self.run_until_idle();
    }

    /// Declares the loop idle, running every pending idle callback.
    pub fn go_idle(&self) {
        let drained: Vec<Task> = self.inner.idle.lock().unwrap().drain(..).collect();
        for task in drained {
            task();
        }
        self.run_until_idle();
    }

    /// Scrolls the named region into view, firing its active watchers.
    pub fn scroll_to(&self, region: &str) {
        let fired: Vec<Task> = {
            let mut regions = self.inner.regions.lock().unwrap();
            match regions.get_mut(region) {
                Some(watches) => watches
                    .iter_mut()
                    .filter(|watch| watch.active.load(Ordering::SeqCst))
                    .filter_map(|watch| watch.on_approach.take())
                    .collect(),
                None => Vec::new(),
            }
        };
        {
            let mut tasks = self.inner.tasks.lock().unwrap();
            for task in fired {
                tasks.push_back(task);
            }
        }
        self.run_until_idle();
    }

    /// Delivers a vital sample to its subscribers and drains the queue.
    pub fn emit_vital(&self, sample: MetricSample) {
        let handlers: Vec<VitalHandler> = self
            .inner
            .vital_subs
            .lock()
            .unwrap()
            .iter()
            .filter(|(kind, _)| *kind == sample.kind)
            .map(|(_, handler)| Arc::clone(handler))
            .collect();
        {
            let mut tasks = self.inner.tasks.lock().unwrap();
            for handler in handlers {
                let sample = sample.clone();
                tasks.push_back(Box::new(move || handler(sample)));
            }
        }
        self.run_until_idle();
    }

    /// Delivers a performance entry to observers subscribed to its kind
    /// and drains the queue.
    pub fn emit_entry(&self, entry: PerformanceEntry) {
        let handlers: Vec<EntryHandler> = self
            .inner
            .entry_subs
            .lock()
            .unwrap()
            .iter()
            .filter(|sub| sub.active.load(Ordering::SeqCst) && sub.kinds.contains(&entry.kind))
            .map(|sub| Arc::clone(&sub.handler))
            .collect();
        {
            let mut tasks = self.inner.tasks.lock().unwrap();
            for handler in handlers {
                let entry = entry.clone();
                tasks.push_back(Box::new(move || handler(entry)));
            }
        }
        self.run_until_idle();
    }

    /// Marks a vital as unmeasurable: later subscriptions for it are
    /// refused.
    pub fn mark_vital_unsupported(&self, kind: VitalKind) {
        self.inner.unsupported_vitals.lock().unwrap().insert(kind);
    }

    /// Makes future hints for the given URL fail, simulating a network
    /// refusal.
    pub fn reject_hints_for(&self, url: &str) {
        self.inner
            .rejected_urls
            .lock()
            .unwrap()
            .insert(url.to_string());
    }

    /// Every hint issued so far, in issue order.
    pub fn issued_hints(&self) -> Vec<ResourceIdentity> {
        self.inner.hints.lock().unwrap().clone()
    }

    /// The current virtual time.
    pub fn virtual_now(&self) -> Duration {
        *self.inner.now.lock().unwrap()
    }
}

/// The trait-object face of the host, one `Arc` per capability slot.
struct Backend(Arc<HostInner>);

impl TaskQueueApi for Backend {
    fn post(&self, task: Task) {
        self.0.tasks.lock().unwrap().push_back(task);
    }

    fn post_delayed(&self, delay: Duration, task: Task) {
        let due = *self.0.now.lock().unwrap() + delay;
        let seq = self.0.seq.fetch_add(1, Ordering::SeqCst);
        self.0.timers.lock().unwrap().push(Timer { due, seq, task });
    }
}

impl IdleApi for Backend {
    fn request_idle(&self, task: Task) {
        self.0.idle.lock().unwrap().push(task);
    }
}

impl ViewportApi for Backend {
    fn watch_approach(&self, region: &str, on_approach: Task) -> Box<dyn ObserverSubscription> {
        let active = Arc::new(AtomicBool::new(true));
        self.0
            .regions
            .lock()
            .unwrap()
            .entry(region.to_string())
            .or_default()
            .push(RegionWatch {
                on_approach: Some(on_approach),
                active: Arc::clone(&active),
            });
        Box::new(FlagSubscription { active })
    }
}

impl VitalsApi for Backend {
    fn subscribe(&self, kind: VitalKind, handler: VitalHandler) -> bool {
        if self.0.unsupported_vitals.lock().unwrap().contains(&kind) {
            return false;
        }
        self.0.vital_subs.lock().unwrap().push((kind, handler));
        true
    }
}

impl EntryObserverApi for Backend {
    fn observe(&self, kinds: &[EntryKind], handler: EntryHandler) -> Box<dyn ObserverSubscription> {
        let active = Arc::new(AtomicBool::new(true));
        self.0.entry_subs.lock().unwrap().push(EntrySub {
            kinds: kinds.to_vec(),
            handler,
            active: Arc::clone(&active),
        });
        Box::new(FlagSubscription { active })
    }
}

impl PreloadApi for Backend {
    fn issue_hint(&self, descriptor: &ResourceDescriptor) -> Result<(), PreloadHintError> {
        if self.0.rejected_urls.lock().unwrap().contains(&descriptor.url) {
            return Err(PreloadHintError::Rejected {
                url: descriptor.url.clone(),
                reason: "simulated network refusal".to_string(),
            });
        }
        self.0.hints.lock().unwrap().push(descriptor.identity());
        Ok(())
    }
}
