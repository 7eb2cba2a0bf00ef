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

//! The per-mount orchestrator of the performance layer.

use std::sync::{Arc, Mutex};

use crate::session::PageSession;
use vitrine_core::host::HostCapabilities;
use vitrine_core::vitals::MetricSink;
use vitrine_telemetry::{LogSink, NavigationObserverBridge};

/// The lifecycle phase of one provider instance.
///
/// `Uninitialized → Active → Disposed`, each transition exactly once.
/// There is no way back from `Disposed`; a fresh mount constructs a fresh
/// instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderPhase {
    /// Constructed, not yet mounted.
    #[default]
    Uninitialized,
    /// Mounted: vitals flowing, bridge open.
    Active,
    /// Unmounted: bridge disconnected.
    Disposed,
}

impl ProviderPhase {
    /// Whether the phase machine admits a transition from `self` to
    /// `next`.
    pub fn can_transition_to(self, next: ProviderPhase) -> bool {
        matches!(
            (self, next),
            (ProviderPhase::Uninitialized, ProviderPhase::Active)
                | (ProviderPhase::Active, ProviderPhase::Disposed)
        )
    }
}

/// Configuration for a provider instance.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Whether to register the reference [`LogSink`] at mount, ahead of
    /// any caller-supplied sinks.
    pub register_log_sink: bool,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            register_log_sink: true,
        }
    }
}

/// Orchestrates the performance layer at the page-lifecycle boundary.
///
/// On [`mount`](Self::mount), in one synchronous step: triggers the
/// session's preloader, subscribes the session's collector to the host
/// vitals, registers the configured sinks, and opens the navigation
/// bridge. On [`unmount`](Self::unmount), disconnects the bridge — and
/// nothing else: preloading and vitals subscription are page-session
/// scoped, so a remounting provider re-runs them harmlessly against the
/// session's guards.
pub struct PerformanceProvider {
    session: Arc<PageSession>,
    host: HostCapabilities,
    config: ProviderConfig,
    pending_sinks: Mutex<Vec<Arc<dyn MetricSink>>>,
    phase: Mutex<ProviderPhase>,
    bridge: Mutex<Option<NavigationObserverBridge>>,
}

impl PerformanceProvider {
    /// Creates a provider with the default configuration.
    pub fn new(session: Arc<PageSession>, host: HostCapabilities) -> Self {
        Self::with_config(session, host, ProviderConfig::default())
    }

    /// Creates a provider with explicit configuration.
    pub fn with_config(
        session: Arc<PageSession>,
        host: HostCapabilities,
        config: ProviderConfig,
    ) -> Self {
        Self {
            session,
            host,
            config,
            pending_sinks: Mutex::new(Vec::new()),
            phase: Mutex::new(ProviderPhase::Uninitialized),
            bridge: Mutex::new(None),
        }
    }

    /// Queues a sink to be registered at mount, after the reference sink.
    /// Has no effect once the provider has mounted.
    pub fn add_sink(&self, sink: Arc<dyn MetricSink>) {
        if *self.phase.lock().unwrap() != ProviderPhase::Uninitialized {
            log::warn!("sink added after mount is ignored; register sinks before mounting");
            return;
        }
        self.pending_sinks.lock().unwrap().push(sink);
    }

    /// The current lifecycle phase.
    pub fn phase(&self) -> ProviderPhase {
        *self.phase.lock().unwrap()
    }

    /// The session this provider instance belongs to.
    pub fn session(&self) -> &Arc<PageSession> {
        &self.session
    }

    /// Mounts the provider: preload, subscribe, register sinks, open the
    /// bridge. Exactly once per instance; later calls are logged no-ops.
    pub fn mount(&self) {
        {
            let mut phase = self.phase.lock().unwrap();
            if !phase.can_transition_to(ProviderPhase::Active) {
                log::warn!("mount ignored in {:?} phase", *phase);
                return;
            }
            *phase = ProviderPhase::Active;
        }

        log::info!("performance provider mounting");

        self.session.preloader().preload_critical(&self.host.preload);
        self.session.collector().track_web_vitals(&self.host.vitals);

        if self.config.register_log_sink {
            self.session.collector().report_web_vitals(Arc::new(LogSink));
        }
        for sink in self.pending_sinks.lock().unwrap().drain(..) {
            self.session.collector().report_web_vitals(sink);
        }

        let bridge = NavigationObserverBridge::with_default_report(&self.host.entries);
        *self.bridge.lock().unwrap() = Some(bridge);
    }

    /// Unmounts the provider, synchronously disconnecting the bridge.
    /// Exactly once per instance; later calls are quiet no-ops.
    pub fn unmount(&self) {
        {
            let mut phase = self.phase.lock().unwrap();
            if !phase.can_transition_to(ProviderPhase::Disposed) {
                log::debug!("unmount ignored in {:?} phase", *phase);
                return;
            }
            *phase = ProviderPhase::Disposed;
        }

        if let Some(bridge) = self.bridge.lock().unwrap().take() {
            bridge.disconnect();
        }
        log::info!("performance provider disposed");
    }
}

impl Drop for PerformanceProvider {
    fn drop(&mut self) {
        let active = { *self.phase.lock().unwrap() == ProviderPhase::Active };
        if active {
            self.unmount();
        }
    }
}
