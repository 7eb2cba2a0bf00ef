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

//! Value types describing preloadable page assets.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// The class of asset a resource descriptor points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// A web font file.
    Font,
    /// A raster or vector image.
    Image,
    /// A stylesheet.
    Style,
    /// A script bundle.
    Script,
    /// A data payload (e.g., a JSON catalog fragment).
    Data,
}

impl ResourceKind {
    /// Returns the lowercase tag used in hints and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Font => "font",
            ResourceKind::Image => "image",
            ResourceKind::Style => "style",
            ResourceKind::Script => "script",
            ResourceKind::Data => "data",
        }
    }
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How urgently a resource is needed relative to first paint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourcePriority {
    /// Required for the initial above-the-fold render.
    Critical,
    /// Wanted early but not paint-blocking.
    High,
    /// Everything else.
    Normal,
}

/// An immutable description of one preloadable asset.
///
/// Identity is `(url, kind)`: the same URL fetched as two different kinds
/// (say, a stylesheet and a data payload) counts as two resources, while
/// repeated descriptors for the same pair collapse to one hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    /// Location of the asset.
    pub url: String,
    /// The asset class, which decides the hint flavour.
    pub kind: ResourceKind,
    /// Fetch urgency relative to first paint.
    pub priority: ResourcePriority,
}

impl ResourceDescriptor {
    /// Creates a new descriptor.
    pub fn new(url: impl Into<String>, kind: ResourceKind, priority: ResourcePriority) -> Self {
        Self {
            url: url.into(),
            kind,
            priority,
        }
    }

    /// Returns the `(url, kind)` identity used for deduplication.
    pub fn identity(&self) -> ResourceIdentity {
        ResourceIdentity {
            url: self.url.clone(),
            kind: self.kind,
        }
    }
}

/// The deduplication key of a resource: its URL plus its kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceIdentity {
    /// Location of the asset.
    pub url: String,
    /// The asset class.
    pub kind: ResourceKind,
}

impl Display for ResourceIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.url, self.kind)
    }
}

/// An error raised by the host when a preload hint cannot be issued.
///
/// Hint failures are always absorbed by the preloader; this type exists so
/// the host can say *why* and the failure can be logged per resource.
#[derive(Debug, Clone)]
pub enum PreloadHintError {
    /// The host has no hint mechanism for this resource kind.
    UnsupportedKind(ResourceKind),
    /// The host rejected the hint (malformed URL, quota, network refusal).
    Rejected {
        /// URL of the resource the hint was issued for.
        url: String,
        /// Host-provided reason.
        reason: String,
    },
}

impl Display for PreloadHintError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PreloadHintError::UnsupportedKind(kind) => {
                write!(f, "no preload hint available for {kind} resources")
            }
            PreloadHintError::Rejected { url, reason } => {
                write!(f, "preload hint rejected for {url}: {reason}")
            }
        }
    }
}

impl std::error::Error for PreloadHintError {}
