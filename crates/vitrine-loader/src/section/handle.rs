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

//! The deferred-section handle and its loading state machine.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::section::LoaderConfig;
use vitrine_core::host::{HostCapabilities, ObserverSubscription, TaskQueueApi};
use vitrine_core::section::{SectionPhase, TriggerPolicy};

/// The deferred factory producing a section's real content. Invoked at
/// most once per handle; the resolved value is cached for the handle's
/// remaining lifetime.
pub type SectionFactory<C> = Box<dyn FnOnce() -> anyhow::Result<C> + Send>;

/// What a renderer should show for a section right now.
pub enum SectionView<'a, C> {
    /// The placeholder: shown while `Pending`, `Loading`, and `Failed`.
    Fallback(&'a C),
    /// The resolved content.
    Content(Arc<C>),
}

/// A handle to one deferred page section.
///
/// Cloning is cheap and shares the underlying state, so the page tree can
/// hold one clone for rendering and another for lifecycle calls. The phase
/// machine is `Pending → Loading → Ready | Failed` with no way back; a
/// failed section is retried by declaring a fresh handle. Handles are
/// single-mount: remounting an unmounted handle is not supported.
pub struct LazySection<C: Send + Sync + 'static> {
    inner: Arc<SectionInner<C>>,
}

impl<C: Send + Sync + 'static> Clone for LazySection<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct SectionInner<C: Send + Sync + 'static> {
    id: String,
    policy: TriggerPolicy,
    fallback: C,
    config: LoaderConfig,
    mounted: AtomicBool,
    state: Mutex<SectionState<C>>,
    watch: Mutex<Option<Box<dyn ObserverSubscription>>>,
}

enum SectionState<C> {
    Pending { factory: Option<SectionFactory<C>> },
    Loading,
    Ready(Arc<C>),
    Failed(Arc<anyhow::Error>),
}

impl<C: Send + Sync + 'static> LazySection<C> {
    /// Declares a deferred section with the default [`LoaderConfig`].
    pub fn new(
        id: impl Into<String>,
        policy: TriggerPolicy,
        fallback: C,
        factory: impl FnOnce() -> anyhow::Result<C> + Send + 'static,
    ) -> Self {
        Self::with_config(id, policy, fallback, factory, LoaderConfig::default())
    }

    /// Declares a deferred section with explicit tuning.
    pub fn with_config(
        id: impl Into<String>,
        policy: TriggerPolicy,
        fallback: C,
        factory: impl FnOnce() -> anyhow::Result<C> + Send + 'static,
        config: LoaderConfig,
    ) -> Self {
        Self {
            inner: Arc::new(SectionInner {
                id: id.into(),
                policy,
                fallback,
                config,
                mounted: AtomicBool::new(false),
                state: Mutex::new(SectionState::Pending {
                    factory: Some(Box::new(factory)),
                }),
                watch: Mutex::new(None),
            }),
        }
    }

    /// The section's identifier (also the viewport region name for the
    /// `Visible` policy).
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// The trigger policy the section was declared with.
    pub fn policy(&self) -> TriggerPolicy {
        self.inner.policy
    }

    /// The current lifecycle phase.
    pub fn phase(&self) -> SectionPhase {
        match &*self.inner.state.lock().unwrap() {
            SectionState::Pending { .. } => SectionPhase::Pending,
            SectionState::Loading => SectionPhase::Loading,
            SectionState::Ready(_) => SectionPhase::Ready,
            SectionState::Failed(_) => SectionPhase::Failed,
        }
    }

    /// The resolved content, once `Ready`.
    pub fn content(&self) -> Option<Arc<C>> {
        match &*self.inner.state.lock().unwrap() {
            SectionState::Ready(content) => Some(Arc::clone(content)),
            _ => None,
        }
    }

    /// The load error, once `Failed`. Callers use this to show a retry
    /// affordance; the loader itself never retries.
    pub fn error(&self) -> Option<Arc<anyhow::Error>> {
        match &*self.inner.state.lock().unwrap() {
            SectionState::Failed(err) => Some(Arc::clone(err)),
            _ => None,
        }
    }

    /// The placeholder declared for this section.
    pub fn fallback(&self) -> &C {
        &self.inner.fallback
    }

    /// What to render right now: the content once `Ready`, the fallback
    /// otherwise.
    pub fn view(&self) -> SectionView<'_, C> {
        match self.content() {
            Some(content) => SectionView::Content(content),
            None => SectionView::Fallback(&self.inner.fallback),
        }
    }

    /// Whether the section is currently mounted.
    pub fn is_mounted(&self) -> bool {
        self.inner.mounted.load(Ordering::SeqCst)
    }

    /// Mounts the section, arming its trigger against the host.
    pub fn mount(&self, host: &HostCapabilities) {
        if self.inner.mounted.swap(true, Ordering::SeqCst) {
            log::warn!("section '{}' mounted twice; ignoring", self.inner.id);
            return;
        }

        match self.inner.policy {
            TriggerPolicy::Immediate => {
                SectionInner::begin_load(&self.inner, &host.tasks);
            }
            TriggerPolicy::Idle => self.arm_idle(host),
            TriggerPolicy::Visible => match host.viewport.as_available() {
                Some(viewport) => {
                    let inner = Arc::clone(&self.inner);
                    let tasks = Arc::clone(&host.tasks);
                    let subscription = viewport.watch_approach(
                        &self.inner.id,
                        Box::new(move || SectionInner::begin_load(&inner, &tasks)),
                    );
                    *self.inner.watch.lock().unwrap() = Some(subscription);
                }
                None => {
                    log::debug!(
                        "viewport watching unavailable; section '{}' falls back to idle loading",
                        self.inner.id
                    );
                    self.arm_idle(host);
                }
            },
        }
    }

    /// Unmounts the section. A load still in flight is allowed to finish;
    /// its result is discarded instead of being applied to the torn-down
    /// view.
    pub fn unmount(&self) {
        if !self.inner.mounted.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Some(subscription) = self.inner.watch.lock().unwrap().take() {
            subscription.disconnect();
        }
        log::trace!("section '{}' unmounted", self.inner.id);
    }

    fn arm_idle(&self, host: &HostCapabilities) {
        let inner = Arc::clone(&self.inner);
        let tasks = Arc::clone(&host.tasks);
        let trigger = Box::new(move || SectionInner::begin_load(&inner, &tasks));
        match host.idle.as_available() {
            Some(idle) => idle.request_idle(trigger),
            None => host
                .tasks
                .post_delayed(self.inner.config.idle_fallback_delay, trigger),
        }
    }
}

impl<C: Send + Sync + 'static> SectionInner<C> {
    /// Fires the trigger: takes the factory (first trigger wins), moves to
    /// `Loading`, and posts the factory to the host task queue.
    fn begin_load(inner: &Arc<Self>, tasks: &Arc<dyn TaskQueueApi>) {
        if !inner.mounted.load(Ordering::SeqCst) {
            log::trace!("section '{}' trigger fired after unmount", inner.id);
            return;
        }

        let factory = {
            let mut state = inner.state.lock().unwrap();
            match &mut *state {
                SectionState::Pending { factory } => {
                    let factory = factory.take();
                    *state = SectionState::Loading;
                    factory
                }
                _ => None,
            }
        };

        let Some(factory) = factory else {
            return;
        };

        log::debug!("section '{}' loading", inner.id);
        let inner = Arc::clone(inner);
        tasks.post(Box::new(move || {
            let result = factory();
            Self::complete(&inner, result);
        }));
    }

    fn complete(inner: &Arc<Self>, result: anyhow::Result<C>) {
        if !inner.mounted.load(Ordering::SeqCst) {
            log::trace!("section '{}' resolved after unmount; discarding", inner.id);
            return;
        }

        let mut state = inner.state.lock().unwrap();
        if !matches!(*state, SectionState::Loading) {
            return;
        }
        match result {
            Ok(content) => {
                *state = SectionState::Ready(Arc::new(content));
                log::debug!("section '{}' ready", inner.id);
            }
            Err(err) => {
                log::warn!("section '{}' failed to load: {err:#}", inner.id);
                *state = SectionState::Failed(Arc::new(err));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::collections::{HashMap, VecDeque};
    use std::sync::atomic::AtomicU32;
    use std::time::Duration;
    use vitrine_core::host::{Capability, IdleApi, Task, ViewportApi};

    #[derive(Default)]
    struct ManualQueue {
        tasks: Mutex<VecDeque<Task>>,
        delayed: Mutex<Vec<(Duration, Task)>>,
    }

    impl ManualQueue {
        fn run_all(&self) {
            loop {
                let task = self.tasks.lock().unwrap().pop_front();
                match task {
                    Some(task) => task(),
                    None => break,
                }
            }
        }

        fn fire_delayed(&self) -> Vec<Duration> {
            let drained: Vec<(Duration, Task)> =
                self.delayed.lock().unwrap().drain(..).collect();
            let mut delays = Vec::new();
            for (delay, task) in drained {
                delays.push(delay);
                task();
            }
            self.run_all();
            delays
        }
    }

    impl TaskQueueApi for ManualQueue {
        fn post(&self, task: Task) {
            self.tasks.lock().unwrap().push_back(task);
        }

        fn post_delayed(&self, delay: Duration, task: Task) {
            self.delayed.lock().unwrap().push((delay, task));
        }
    }

    #[derive(Default)]
    struct ManualIdle {
        pending: Mutex<Vec<Task>>,
    }

    impl ManualIdle {
        fn go_idle(&self) {
            let drained: Vec<Task> = self.pending.lock().unwrap().drain(..).collect();
            for task in drained {
                task();
            }
        }
    }

    impl IdleApi for ManualIdle {
        fn request_idle(&self, task: Task) {
            self.pending.lock().unwrap().push(task);
        }
    }

    struct RegionWatch {
        on_approach: Option<Task>,
        active: Arc<AtomicBool>,
    }

    #[derive(Default)]
    struct ManualViewport {
        regions: Mutex<HashMap<String, Vec<RegionWatch>>>,
        disconnects: Arc<AtomicU32>,
    }

    struct ViewportSubscription {
        active: Arc<AtomicBool>,
        disconnects: Arc<AtomicU32>,
    }

    impl ObserverSubscription for ViewportSubscription {
        fn disconnect(&self) {
            if self.active.swap(false, Ordering::SeqCst) {
                self.disconnects.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    impl ManualViewport {
        fn scroll_to(&self, region: &str) {
            let mut regions = self.regions.lock().unwrap();
            if let Some(watches) = regions.get_mut(region) {
                for watch in watches.iter_mut() {
                    if watch.active.load(Ordering::SeqCst) {
                        if let Some(task) = watch.on_approach.take() {
                            task();
                        }
                    }
                }
            }
        }
    }

    impl ViewportApi for ManualViewport {
        fn watch_approach(
            &self,
            region: &str,
            on_approach: Task,
        ) -> Box<dyn ObserverSubscription> {
            let active = Arc::new(AtomicBool::new(true));
            self.regions
                .lock()
                .unwrap()
                .entry(region.to_string())
                .or_default()
                .push(RegionWatch {
                    on_approach: Some(on_approach),
                    active: Arc::clone(&active),
                });
            Box::new(ViewportSubscription {
                active,
                disconnects: Arc::clone(&self.disconnects),
            })
        }
    }

    struct Fixture {
        queue: Arc<ManualQueue>,
        idle: Arc<ManualIdle>,
        viewport: Arc<ManualViewport>,
        host: HostCapabilities,
    }

    fn fixture() -> Fixture {
        let queue = Arc::new(ManualQueue::default());
        let idle = Arc::new(ManualIdle::default());
        let viewport = Arc::new(ManualViewport::default());
        let mut host = HostCapabilities::bare(Arc::clone(&queue) as Arc<dyn TaskQueueApi>);
        host.idle = Capability::available(Arc::clone(&idle) as Arc<dyn IdleApi>);
        host.viewport = Capability::available(Arc::clone(&viewport) as Arc<dyn ViewportApi>);
        Fixture {
            queue,
            idle,
            viewport,
            host,
        }
    }

    fn host_without(fixture: &Fixture, idle: bool, viewport: bool) -> HostCapabilities {
        let mut host = fixture.host.clone();
        if !idle {
            host.idle = Capability::Unavailable;
        }
        if !viewport {
            host.viewport = Capability::Unavailable;
        }
        host
    }

    #[test]
    fn immediate_section_reaches_ready() {
        let fx = fixture();
        let section = LazySection::new("hero", TriggerPolicy::Immediate, "placeholder", || {
            Ok("hero grid")
        });

        assert_eq!(section.phase(), SectionPhase::Pending);
        assert!(matches!(section.view(), SectionView::Fallback(&"placeholder")));

        section.mount(&fx.host);
        assert_eq!(section.phase(), SectionPhase::Loading);
        assert!(matches!(section.view(), SectionView::Fallback(_)));

        fx.queue.run_all();
        assert_eq!(section.phase(), SectionPhase::Ready);
        assert_eq!(*section.content().unwrap(), "hero grid");
        assert!(matches!(section.view(), SectionView::Content(_)));
    }

    #[test]
    fn failing_factory_ends_failed_not_pending() {
        let fx = fixture();
        let section = LazySection::new("reviews", TriggerPolicy::Immediate, "placeholder", || {
            Err::<&str, _>(anyhow!("chunk fetch failed"))
        });

        section.mount(&fx.host);
        fx.queue.run_all();

        assert_eq!(section.phase(), SectionPhase::Failed);
        assert!(section.error().unwrap().to_string().contains("chunk fetch"));
        assert!(matches!(section.view(), SectionView::Fallback(_)));
    }

    #[test]
    fn unmount_while_loading_discards_the_result() {
        let fx = fixture();
        let applied = Arc::new(AtomicU32::new(0));
        let applied_clone = Arc::clone(&applied);
        let section = LazySection::new("footer", TriggerPolicy::Immediate, (), move || {
            applied_clone.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        section.mount(&fx.host);
        assert_eq!(section.phase(), SectionPhase::Loading);
        section.unmount();

        fx.queue.run_all();

        // The factory may have run, but its result was not applied.
        assert_eq!(applied.load(Ordering::SeqCst), 1);
        assert_ne!(section.phase(), SectionPhase::Ready);
        assert!(section.content().is_none());
    }

    #[test]
    fn idle_section_waits_for_host_idle() {
        let fx = fixture();
        let section =
            LazySection::new("benefits", TriggerPolicy::Idle, "placeholder", || Ok("benefits"));

        section.mount(&fx.host);
        fx.queue.run_all();
        assert_eq!(section.phase(), SectionPhase::Pending);

        fx.idle.go_idle();
        fx.queue.run_all();
        assert_eq!(section.phase(), SectionPhase::Ready);
    }

    #[test]
    fn idle_section_falls_back_to_bounded_delay() {
        let fx = fixture();
        let host = host_without(&fx, false, true);
        let section =
            LazySection::new("benefits", TriggerPolicy::Idle, "placeholder", || Ok("benefits"));

        section.mount(&host);
        assert_eq!(section.phase(), SectionPhase::Pending);

        let delays = fx.queue.fire_delayed();
        assert_eq!(delays, vec![LoaderConfig::default().idle_fallback_delay]);
        assert_eq!(section.phase(), SectionPhase::Ready);
    }

    #[test]
    fn visible_section_waits_for_viewport_approach() {
        let fx = fixture();
        let section =
            LazySection::new("reviews", TriggerPolicy::Visible, "placeholder", || Ok("reviews"));

        section.mount(&fx.host);
        fx.queue.run_all();
        fx.idle.go_idle();
        fx.queue.run_all();
        assert_eq!(section.phase(), SectionPhase::Pending);

        fx.viewport.scroll_to("reviews");
        fx.queue.run_all();
        assert_eq!(section.phase(), SectionPhase::Ready);
    }

    #[test]
    fn visible_section_degrades_to_idle_without_viewport() {
        let fx = fixture();
        let host = host_without(&fx, true, false);
        let section =
            LazySection::new("reviews", TriggerPolicy::Visible, "placeholder", || Ok("reviews"));

        section.mount(&host);
        fx.idle.go_idle();
        fx.queue.run_all();
        assert_eq!(section.phase(), SectionPhase::Ready);
    }

    #[test]
    fn unmount_cancels_the_viewport_watch() {
        let fx = fixture();
        let section =
            LazySection::new("reviews", TriggerPolicy::Visible, "placeholder", || Ok("reviews"));

        section.mount(&fx.host);
        section.unmount();
        assert_eq!(fx.viewport.disconnects.load(Ordering::SeqCst), 1);

        fx.viewport.scroll_to("reviews");
        fx.queue.run_all();
        assert_eq!(section.phase(), SectionPhase::Pending);
    }

    #[test]
    fn double_trigger_loads_once() {
        let fx = fixture();
        let runs = Arc::new(AtomicU32::new(0));
        let runs_clone = Arc::clone(&runs);
        let section = LazySection::new("grid", TriggerPolicy::Visible, (), move || {
            runs_clone.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        section.mount(&fx.host);
        fx.viewport.scroll_to("grid");
        fx.viewport.scroll_to("grid");
        fx.queue.run_all();

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(section.phase(), SectionPhase::Ready);
    }

    #[test]
    fn sections_load_independently() {
        let fx = fixture();
        let ok = LazySection::new("a", TriggerPolicy::Immediate, "fb", || Ok("a"));
        let failing = LazySection::new("b", TriggerPolicy::Immediate, "fb", || {
            Err::<&str, _>(anyhow!("boom"))
        });

        failing.mount(&fx.host);
        ok.mount(&fx.host);
        fx.queue.run_all();

        assert_eq!(ok.phase(), SectionPhase::Ready);
        assert_eq!(failing.phase(), SectionPhase::Failed);
    }

    #[test]
    fn mounting_twice_is_ignored() {
        let fx = fixture();
        let runs = Arc::new(AtomicU32::new(0));
        let runs_clone = Arc::clone(&runs);
        let section = LazySection::new("hero", TriggerPolicy::Immediate, (), move || {
            runs_clone.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        section.mount(&fx.host);
        section.mount(&fx.host);
        fx.queue.run_all();

        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }
}
