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

//! Trigger and phase types shared by deferred page sections.

use serde::{Deserialize, Serialize};

/// The condition that starts loading a deferred section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerPolicy {
    /// Load as soon as the section is mounted.
    Immediate,
    /// Load when the host reports it is idle, or after a bounded fallback
    /// delay when idle detection is unsupported.
    Idle,
    /// Load when the section's placeholder approaches the viewport.
    Visible,
}

/// The lifecycle phase of a deferred section.
///
/// Phases only move forward: `Pending → Loading → Ready | Failed`. There
/// is no transition back; retrying a failed section means constructing a
/// fresh handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SectionPhase {
    /// Only the fallback is rendered; the implementation has not been
    /// requested.
    #[default]
    Pending,
    /// The deferred factory has been dispatched and has not resolved yet.
    Loading,
    /// The real content replaced the fallback.
    Ready,
    /// The deferred factory failed; distinct from `Pending` so callers can
    /// detect it and decide whether to retry.
    Failed,
}

impl SectionPhase {
    /// Whether the phase machine admits a transition from `self` to
    /// `next`.
    pub fn can_transition_to(self, next: SectionPhase) -> bool {
        matches!(
            (self, next),
            (SectionPhase::Pending, SectionPhase::Loading)
                | (SectionPhase::Loading, SectionPhase::Ready)
                | (SectionPhase::Loading, SectionPhase::Failed)
        )
    }

    /// Whether no further transition is possible.
    pub fn is_terminal(self) -> bool {
        matches!(self, SectionPhase::Ready | SectionPhase::Failed)
    }
}
