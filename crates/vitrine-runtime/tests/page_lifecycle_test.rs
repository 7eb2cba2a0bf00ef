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

//! End-to-end page-visit lifecycle: mount, preload, vitals fan-out,
//! navigation observation, unmount.

use std::borrow::Cow;
use std::sync::{Arc, Mutex};

use vitrine_core::entry::{NavigationPhases, PerformanceEntry};
use vitrine_core::resource::{ResourceDescriptor, ResourceKind, ResourcePriority};
use vitrine_core::vitals::{MetricSample, MetricSink, VitalKind};
use vitrine_runtime::{HeadlessHost, PageSession, PerformanceProvider, ProviderConfig, ProviderPhase};

struct RecordingSink {
    tag: &'static str,
    log: Arc<Mutex<Vec<(String, MetricSample)>>>,
}

impl MetricSink for RecordingSink {
    fn sink_id(&self) -> Cow<'static, str> {
        Cow::Borrowed(self.tag)
    }

    fn consume(&self, sample: &MetricSample) {
        self.log
            .lock()
            .unwrap()
            .push((self.tag.to_string(), sample.clone()));
    }
}

fn critical_list() -> Vec<ResourceDescriptor> {
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
}

#[test]
fn full_page_visit_lifecycle() {
    let host = HeadlessHost::new();
    let session = Arc::new(PageSession::new(critical_list()));
    let provider = PerformanceProvider::with_config(
        Arc::clone(&session),
        host.capabilities(),
        ProviderConfig {
            register_log_sink: false,
        },
    );

    let log = Arc::new(Mutex::new(Vec::new()));
    provider.add_sink(Arc::new(RecordingSink {
        tag: "first",
        log: Arc::clone(&log),
    }));
    provider.add_sink(Arc::new(RecordingSink {
        tag: "second",
        log: Arc::clone(&log),
    }));

    // Mount: preload fires for all three critical resources.
    provider.mount();
    assert_eq!(provider.phase(), ProviderPhase::Active);
    assert_eq!(host.issued_hints().len(), 3);

    // Re-running the preload trigger issues no duplicate hints.
    session.preloader().preload_critical(&host.capabilities().preload);
    assert_eq!(host.issued_hints().len(), 3);

    // LCP arrives: both sinks see it, registration order preserved.
    host.emit_vital(MetricSample::with_id(VitalKind::Lcp, 1200.0, "v1"));
    {
        let log = log.lock().unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].0, "first");
        assert_eq!(log[1].0, "second");
        assert_eq!(log[0].1.value, 1200.0);
        assert_eq!(log[0].1.id, "v1");
    }

    // CLS arrives twice under the same identity: sinks see two linked
    // samples, the second superseding the first.
    host.emit_vital(MetricSample::with_id(VitalKind::Cls, 0.05, "v2"));
    host.emit_vital(MetricSample::with_id(VitalKind::Cls, 0.08, "v2"));
    {
        let log = log.lock().unwrap();
        let cls: Vec<&MetricSample> = log
            .iter()
            .filter(|(tag, sample)| tag == "first" && sample.kind == VitalKind::Cls)
            .map(|(_, sample)| sample)
            .collect();
        assert_eq!(cls.len(), 2);
        assert_eq!(cls[0].value, 0.05);
        assert_eq!(cls[1].value, 0.08);
        assert!(cls[1].supersedes(cls[0]));
    }
    assert_eq!(session.collector().latest(VitalKind::Cls).unwrap().value, 0.08);

    // A navigation entry flows through the bridge without disturbing the
    // sinks.
    host.emit_entry(PerformanceEntry::navigation(
        "https://shop.example/",
        1850.0,
        NavigationPhases {
            ttfb_ms: 120.0,
            dom_content_loaded_ms: 900.0,
            load_event_end_ms: 1850.0,
        },
    ));

    // Unmount: disposed exactly once, a second unmount is harmless.
    provider.unmount();
    assert_eq!(provider.phase(), ProviderPhase::Disposed);
    provider.unmount();
    assert_eq!(provider.phase(), ProviderPhase::Disposed);
}

#[test]
fn remounting_provider_does_not_resubscribe_or_rehint() {
    let host = HeadlessHost::new();
    let session = Arc::new(PageSession::new(critical_list()));

    let first = PerformanceProvider::with_config(
        Arc::clone(&session),
        host.capabilities(),
        ProviderConfig {
            register_log_sink: false,
        },
    );
    first.mount();
    first.unmount();

    let log = Arc::new(Mutex::new(Vec::new()));
    let second = PerformanceProvider::with_config(
        Arc::clone(&session),
        host.capabilities(),
        ProviderConfig {
            register_log_sink: false,
        },
    );
    second.add_sink(Arc::new(RecordingSink {
        tag: "late",
        log: Arc::clone(&log),
    }));
    second.mount();

    // The page-session guards held: three hints total, one subscription
    // set. Samples emitted once are delivered once per sink.
    assert_eq!(host.issued_hints().len(), 3);
    host.emit_vital(MetricSample::with_id(VitalKind::Fcp, 310.0, "f1"));
    assert_eq!(log.lock().unwrap().len(), 1);

    second.unmount();
}

#[test]
fn provider_on_a_bare_host_still_mounts_and_unmounts() {
    let host = HeadlessHost::new();
    let mut capabilities = host.capabilities();
    capabilities.entries = vitrine_core::Capability::Unavailable;
    capabilities.vitals = vitrine_core::Capability::Unavailable;
    capabilities.preload = vitrine_core::Capability::Unavailable;

    let session = Arc::new(PageSession::new(critical_list()));
    let provider = PerformanceProvider::new(Arc::clone(&session), capabilities);

    provider.mount();
    assert_eq!(provider.phase(), ProviderPhase::Active);
    assert!(host.issued_hints().is_empty());

    provider.unmount();
    assert_eq!(provider.phase(), ProviderPhase::Disposed);
}

#[test]
fn dropping_an_active_provider_disposes_it() {
    let host = HeadlessHost::new();
    let session = Arc::new(PageSession::new(critical_list()));
    {
        let provider = PerformanceProvider::new(Arc::clone(&session), host.capabilities());
        provider.mount();
        // Dropped while Active: Drop must unmount without panicking.
    }
    // A fresh provider on the same session still works.
    let provider = PerformanceProvider::new(Arc::clone(&session), host.capabilities());
    provider.mount();
    provider.unmount();
}
