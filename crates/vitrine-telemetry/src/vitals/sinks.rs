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

//! Reference metric sinks.

use crossbeam_channel::{Receiver, Sender, TrySendError};
use std::borrow::Cow;
use vitrine_core::vitals::{MetricSample, MetricSink};

/// The reference sink: one structured log line per sample, for developer
/// visibility. Never panics.
#[derive(Debug, Default)]
pub struct LogSink;

impl MetricSink for LogSink {
    fn sink_id(&self) -> Cow<'static, str> {
        Cow::Borrowed("log")
    }

    fn consume(&self, sample: &MetricSample) {
        match serde_json::to_string(sample) {
            Ok(json) => log::info!(target: "vitrine::vitals", "{json}"),
            Err(err) => log::warn!(
                "could not serialize {} sample {}: {err}",
                sample.kind,
                sample.id
            ),
        }
    }
}

/// Forwards samples into a bounded channel for an out-of-band consumer
/// (an analytics uploader, a diagnostics overlay).
///
/// If the consumer falls behind and the buffer is full, new samples are
/// dropped with a logged warning; the sink never blocks the metric
/// pipeline.
#[derive(Debug)]
pub struct ChannelSink {
    tx: Sender<MetricSample>,
}

impl ChannelSink {
    /// Creates a sink with a buffer of `capacity` samples, returning the
    /// consumer end alongside it.
    pub fn bounded(capacity: usize) -> (Self, Receiver<MetricSample>) {
        let (tx, rx) = crossbeam_channel::bounded(capacity);
        (Self { tx }, rx)
    }
}

impl MetricSink for ChannelSink {
    fn sink_id(&self) -> Cow<'static, str> {
        Cow::Borrowed("channel")
    }

    fn consume(&self, sample: &MetricSample) {
        match self.tx.try_send(sample.clone()) {
            Ok(()) => {}
            Err(TrySendError::Full(sample)) => {
                log::warn!(
                    "analytics buffer full; dropping {} sample {}",
                    sample.kind,
                    sample.id
                );
            }
            Err(TrySendError::Disconnected(_)) => {
                log::debug!("analytics consumer gone; sample dropped");
            }
        }
    }
}
