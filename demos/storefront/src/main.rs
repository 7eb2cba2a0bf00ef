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

// Storefront demo
// Simulates one page visit end to end against the headless host.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use vitrine_core::entry::{NavigationPhases, PerformanceEntry};
use vitrine_core::section::TriggerPolicy;
use vitrine_core::vitals::{MetricSample, VitalKind};
use vitrine_loader::{LazySection, SectionView};
use vitrine_runtime::{HeadlessHost, PageSession, PerformanceProvider};
use vitrine_telemetry::ChannelSink;

fn describe<C: std::fmt::Display + Send + Sync + 'static>(section: &LazySection<C>) -> String {
    let body = match section.view() {
        SectionView::Content(content) => format!("{content}"),
        SectionView::Fallback(fallback) => format!("{fallback} (placeholder)"),
    };
    format!("[{}] {:?}: {}", section.id(), section.phase(), body)
}

fn main() -> Result<()> {
    env_logger::init();

    let host = HeadlessHost::new();
    let capabilities = host.capabilities();

    // One session per navigation; the provider borrows it.
    let session = Arc::new(PageSession::with_default_resources());
    let provider = PerformanceProvider::new(Arc::clone(&session), capabilities.clone());

    // Forward samples to a pretend analytics consumer alongside the log.
    let (analytics, analytics_rx) = ChannelSink::bounded(32);
    provider.add_sink(Arc::new(analytics));

    // The page tree declares its deferred sections.
    let hero = LazySection::new("hero", TriggerPolicy::Immediate, "hero skeleton", || {
        Ok("hero banner with featured products")
    });
    let benefits = LazySection::new("benefits", TriggerPolicy::Idle, "benefits skeleton", || {
        Ok("why-choose-us benefit cards")
    });
    let reviews = LazySection::new("reviews", TriggerPolicy::Visible, "reviews skeleton", || {
        Ok("customer review grid")
    });

    log::info!("--- page mount ---");
    provider.mount();
    hero.mount(&capabilities);
    benefits.mount(&capabilities);
    reviews.mount(&capabilities);

    host.run_until_idle();
    log::info!("after first paint work: {}", describe(&hero));
    log::info!("after first paint work: {}", describe(&benefits));
    log::info!("after first paint work: {}", describe(&reviews));

    log::info!("--- vitals arrive ---");
    host.emit_vital(MetricSample::with_id(VitalKind::Ttfb, 120.0, "t1"));
    host.emit_vital(MetricSample::with_id(VitalKind::Fcp, 310.0, "f1"));
    host.emit_vital(MetricSample::with_id(VitalKind::Lcp, 1200.0, "v1"));

    log::info!("--- browser goes idle ---");
    host.go_idle();
    log::info!("{}", describe(&benefits));

    log::info!("--- user scrolls towards the reviews ---");
    host.scroll_to("reviews");
    log::info!("{}", describe(&reviews));

    // Layout settles twice; CLS refines under the same identity.
    host.emit_vital(MetricSample::with_id(VitalKind::Cls, 0.05, "v2"));
    host.emit_vital(MetricSample::with_id(VitalKind::Cls, 0.08, "v2"));

    host.emit_entry(PerformanceEntry::navigation(
        "https://shop.example/",
        1850.0,
        NavigationPhases {
            ttfb_ms: 120.0,
            dom_content_loaded_ms: 900.0,
            load_event_end_ms: 1850.0,
        },
    ));
    host.advance(Duration::from_millis(500));

    log::info!("--- page unmount ---");
    reviews.unmount();
    benefits.unmount();
    hero.unmount();
    provider.unmount();

    println!("preload hints issued:");
    for identity in host.issued_hints() {
        println!("  {identity}");
    }

    println!("final vitals snapshot:");
    for sample in session.collector().snapshot() {
        println!(
            "  {} = {:.2} {} (id {}, revision {})",
            sample.kind,
            sample.value,
            sample.kind.unit(),
            sample.id,
            sample.revision
        );
    }

    println!("samples forwarded to analytics: {}", analytics_rx.len());

    Ok(())
}
