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

//! The consumer-side contract for metric samples.

use crate::vitals::MetricSample;
use std::borrow::Cow;

/// A registered consumer of [`MetricSample`]s.
///
/// Sinks are invoked in registration order, each in isolation: a sink that
/// panics is logged and skipped, and must never prevent later sinks from
/// receiving the sample. Implementations should therefore not rely on any
/// particular sibling sink having run.
pub trait MetricSink: Send + Sync {
    /// A short identifier used when logging registration and failures.
    fn sink_id(&self) -> Cow<'static, str> {
        Cow::Borrowed("unnamed-sink")
    }

    /// Receives one sample. Nothing observable is returned to the emitter.
    fn consume(&self, sample: &MetricSample);
}
