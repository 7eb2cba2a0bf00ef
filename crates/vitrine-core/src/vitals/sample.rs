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

//! Value types for a single web-vital measurement.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// The core web-vital signals tracked for every page visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VitalKind {
    /// Largest Contentful Paint.
    #[serde(rename = "LCP")]
    Lcp,
    /// Interaction to Next Paint (successor of First Input Delay).
    #[serde(rename = "INP")]
    Inp,
    /// Cumulative Layout Shift.
    #[serde(rename = "CLS")]
    Cls,
    /// Time To First Byte.
    #[serde(rename = "TTFB")]
    Ttfb,
    /// First Contentful Paint.
    #[serde(rename = "FCP")]
    Fcp,
}

impl VitalKind {
    /// Every vital the collector subscribes to, in subscription order.
    pub const ALL: [VitalKind; 5] = [
        VitalKind::Ttfb,
        VitalKind::Fcp,
        VitalKind::Lcp,
        VitalKind::Cls,
        VitalKind::Inp,
    ];

    /// Returns the conventional uppercase acronym.
    pub fn as_str(&self) -> &'static str {
        match self {
            VitalKind::Lcp => "LCP",
            VitalKind::Inp => "INP",
            VitalKind::Cls => "CLS",
            VitalKind::Ttfb => "TTFB",
            VitalKind::Fcp => "FCP",
        }
    }

    /// Whether the host reports this vital once and never refines it.
    ///
    /// `TTFB` and `FCP` are fixed the moment they are measured. The other
    /// vitals may be re-reported with increasingly accurate values while
    /// the page stays alive.
    pub fn is_single_shot(&self) -> bool {
        matches!(self, VitalKind::Ttfb | VitalKind::Fcp)
    }

    /// The unit of the measured value.
    pub fn unit(&self) -> &'static str {
        match self {
            VitalKind::Cls => "score",
            _ => "ms",
        }
    }
}

impl Display for VitalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How the page visit that produced a sample was initiated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NavigationType {
    /// A regular navigation (link click, address bar).
    #[default]
    Navigate,
    /// A reload of the current document.
    Reload,
    /// A history traversal.
    BackForward,
    /// A prerendered document being activated.
    Prerender,
}

impl NavigationType {
    /// Returns the kebab-case tag used in sample payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            NavigationType::Navigate => "navigate",
            NavigationType::Reload => "reload",
            NavigationType::BackForward => "back-forward",
            NavigationType::Prerender => "prerender",
        }
    }
}

impl Display for NavigationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One web-vital measurement as delivered to sinks.
///
/// Refinable vitals (`LCP`, `CLS`, `INP`) may be delivered several times
/// for the same underlying measurement. Such updates are linked: they share
/// an `id` and carry a strictly increasing `revision`, so a sink can tell
/// "this supersedes the previous sample for this id" apart from "this is a
/// new, independent sample".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    /// Which vital was measured.
    pub kind: VitalKind,
    /// The measured value, in [`VitalKind::unit`] units.
    pub value: f64,
    /// Identity of the measurement, unique per page load and vital.
    pub id: String,
    /// How the page visit was initiated.
    pub navigation_type: NavigationType,
    /// Zero for the first report of an id; each superseding report
    /// increments it.
    pub revision: u32,
}

impl MetricSample {
    /// Creates a first-revision sample with a generated id.
    pub fn new(kind: VitalKind, value: f64) -> Self {
        Self::with_id(kind, value, uuid::Uuid::new_v4().to_string())
    }

    /// Creates a first-revision sample with a host-provided id.
    pub fn with_id(kind: VitalKind, value: f64, id: impl Into<String>) -> Self {
        Self {
            kind,
            value,
            id: id.into(),
            navigation_type: NavigationType::default(),
            revision: 0,
        }
    }

    /// Sets the navigation type, returning the sample.
    pub fn with_navigation_type(mut self, navigation_type: NavigationType) -> Self {
        self.navigation_type = navigation_type;
        self
    }

    /// Returns the superseding sample for a refined value: same identity,
    /// next revision.
    pub fn refined(&self, value: f64) -> Self {
        Self {
            kind: self.kind,
            value,
            id: self.id.clone(),
            navigation_type: self.navigation_type,
            revision: self.revision + 1,
        }
    }

    /// Whether `self` supersedes `other` (same vital and id, later
    /// revision).
    pub fn supersedes(&self, other: &MetricSample) -> bool {
        self.kind == other.kind && self.id == other.id && self.revision > other.revision
    }
}
