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

//! The per-page-load web-vitals collector.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use vitrine_core::host::{Capability, VitalsApi};
use vitrine_core::vitals::{MetricSample, MetricSink, VitalKind};

/// Collects web-vital samples for one page load and fans them out to
/// registered sinks.
///
/// The collector subscribes to the host's vital signals at most once per
/// page load: the subscription guard is an explicit field on this instance,
/// and the instance is meant to be owned by the page session singleton, so
/// provider remounts within the same page visit reuse the same guard.
#[derive(Clone, Default)]
pub struct VitalsCollector {
    inner: Arc<CollectorInner>,
}

#[derive(Default)]
struct CollectorInner {
    /// Transitions false → true exactly once per page load; never reset.
    subscribed: AtomicBool,
    /// Invocation order is registration order.
    sinks: Mutex<Vec<Arc<dyn MetricSink>>>,
    /// Latest forwarded sample per vital, keyed for supersede linkage.
    latest: Mutex<HashMap<VitalKind, MetricSample>>,
}

impl VitalsCollector {
    /// Creates a collector with no sinks and no subscriptions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to every vital the host can measure.
    ///
    /// The first call wins; any later call is a logged no-op, including
    /// calls made after a first call that found the capability absent.
    /// Vitals the host reports as unsupported are skipped silently.
    pub fn track_web_vitals(&self, vitals: &Capability<Arc<dyn VitalsApi>>) {
        if self.inner.subscribed.swap(true, Ordering::SeqCst) {
            log::debug!("vitals already subscribed for this page load; ignoring");
            return;
        }

        let api = match vitals.as_available() {
            Some(api) => api,
            None => {
                log::debug!("host has no vitals source; nothing will be collected");
                return;
            }
        };

        for kind in VitalKind::ALL {
            let inner = Arc::clone(&self.inner);
            let accepted = api.subscribe(
                kind,
                Arc::new(move |sample| {
                    inner.ingest(sample);
                }),
            );
            if accepted {
                log::trace!("subscribed to {kind}");
            } else {
                log::trace!("{kind} unsupported by host; skipped");
            }
        }
    }

    /// Registers an additional sink. Sinks receive every forwarded sample
    /// in registration order.
    pub fn report_web_vitals(&self, sink: Arc<dyn MetricSink>) {
        log::info!("registered metric sink: {}", sink.sink_id());
        self.inner.sinks.lock().unwrap().push(sink);
    }

    /// Number of registered sinks.
    pub fn sink_count(&self) -> usize {
        self.inner.sinks.lock().unwrap().len()
    }

    /// Whether the host subscription step has already run.
    pub fn is_subscribed(&self) -> bool {
        self.inner.subscribed.load(Ordering::SeqCst)
    }

    /// The latest forwarded sample for one vital, if any.
    pub fn latest(&self, kind: VitalKind) -> Option<MetricSample> {
        self.inner.latest.lock().unwrap().get(&kind).cloned()
    }

    /// The latest forwarded sample for every vital seen so far, in
    /// [`VitalKind::ALL`] order.
    pub fn snapshot(&self) -> Vec<MetricSample> {
        let latest = self.inner.latest.lock().unwrap();
        VitalKind::ALL
            .iter()
            .filter_map(|kind| latest.get(kind).cloned())
            .collect()
    }

    /// Feeds a sample into the collector directly, bypassing the host
    /// subscription. Hosts that push samples themselves use this.
    pub fn ingest(&self, sample: MetricSample) {
        self.inner.ingest(sample);
    }
}

impl CollectorInner {
    fn ingest(&self, sample: MetricSample) {
        let forwarded = {
            let mut latest = self.latest.lock().unwrap();
            let previous = latest
                .get(&sample.kind)
                .map(|previous| (previous.id.clone(), previous.revision));
            match previous {
                Some((previous_id, previous_revision)) if previous_id == sample.id => {
                    if sample.kind.is_single_shot() {
                        log::debug!(
                            "duplicate {} report for id {}; single-shot vitals forward once",
                            sample.kind,
                            sample.id
                        );
                        None
                    } else {
                        // Refinement of a known measurement: keep the id,
                        // force the revision forward so sinks see the link.
                        let mut refined = sample;
                        if refined.revision <= previous_revision {
                            refined.revision = previous_revision + 1;
                        }
                        latest.insert(refined.kind, refined.clone());
                        Some(refined)
                    }
                }
                _ => {
                    latest.insert(sample.kind, sample.clone());
                    Some(sample)
                }
            }
        };

        if let Some(sample) = forwarded {
            self.dispatch(&sample);
        }
    }

    fn dispatch(&self, sample: &MetricSample) {
        // Snapshot the registry so a sink registering further sinks cannot
        // deadlock the dispatch loop.
        let sinks: Vec<Arc<dyn MetricSink>> = self.sinks.lock().unwrap().clone();
        for sink in sinks {
            let outcome = catch_unwind(AssertUnwindSafe(|| sink.consume(sample)));
            if outcome.is_err() {
                log::warn!(
                    "metric sink '{}' panicked on {} sample {}; continuing with remaining sinks",
                    sink.sink_id(),
                    sample.kind,
                    sample.id
                );
            }
        }
    }
}
