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

//! Host-reported performance entries.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// The type tag of a performance entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryKind {
    /// Timing phases of a page navigation.
    Navigation,
    /// Timing of an individual sub-resource fetch.
    Resource,
    /// A paint milestone.
    Paint,
    /// A user-defined mark.
    Mark,
    /// A main-thread task long enough to be reported.
    LongTask,
}

impl EntryKind {
    /// Returns the kebab-case tag used when registering observers.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Navigation => "navigation",
            EntryKind::Resource => "resource",
            EntryKind::Paint => "paint",
            EntryKind::Mark => "mark",
            EntryKind::LongTask => "long-task",
        }
    }
}

impl Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Timing breakdown of a navigation, relative to navigation start.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NavigationPhases {
    /// Milliseconds until the first response byte arrived.
    pub ttfb_ms: f64,
    /// Milliseconds until the document was parsed and deferred scripts ran.
    pub dom_content_loaded_ms: f64,
    /// Milliseconds until the load event finished.
    pub load_event_end_ms: f64,
}

/// One record from the host's performance-entry stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceEntry {
    /// The entry's type tag.
    pub kind: EntryKind,
    /// The entry name (for navigation entries, the document URL).
    pub name: String,
    /// Start offset in milliseconds from the time origin.
    pub start_ms: f64,
    /// Duration in milliseconds.
    pub duration_ms: f64,
    /// Phase breakdown, present on navigation entries.
    pub navigation: Option<NavigationPhases>,
}

impl PerformanceEntry {
    /// Creates an entry without navigation phases.
    pub fn new(kind: EntryKind, name: impl Into<String>, start_ms: f64, duration_ms: f64) -> Self {
        Self {
            kind,
            name: name.into(),
            start_ms,
            duration_ms,
            navigation: None,
        }
    }

    /// Creates a navigation entry with its phase breakdown.
    pub fn navigation(name: impl Into<String>, duration_ms: f64, phases: NavigationPhases) -> Self {
        Self {
            kind: EntryKind::Navigation,
            name: name.into(),
            start_ms: 0.0,
            duration_ms,
            navigation: Some(phases),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigation_constructor_tags_and_attaches_phases() {
        let entry = PerformanceEntry::navigation(
            "https://shop.example/",
            1850.0,
            NavigationPhases {
                ttfb_ms: 120.0,
                dom_content_loaded_ms: 900.0,
                load_event_end_ms: 1850.0,
            },
        );

        assert_eq!(entry.kind, EntryKind::Navigation);
        assert_eq!(entry.start_ms, 0.0);
        assert_eq!(entry.navigation.unwrap().ttfb_ms, 120.0);
    }

    #[test]
    fn plain_entries_carry_no_phases() {
        let entry = PerformanceEntry::new(EntryKind::Paint, "first-paint", 310.0, 0.0);
        assert!(entry.navigation.is_none());
    }

    #[test]
    fn entry_kind_tags() {
        assert_eq!(EntryKind::Navigation.as_str(), "navigation");
        assert_eq!(EntryKind::LongTask.as_str(), "long-task");
    }
}
