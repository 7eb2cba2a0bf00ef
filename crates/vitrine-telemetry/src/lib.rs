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

//! # Vitrine Telemetry
//!
//! Web-vitals collection and navigation timing observation for one page
//! visit: the [`VitalsCollector`] subscribes to the host's vital signals
//! exactly once per page load and fans samples out to registered sinks;
//! the [`NavigationObserverBridge`] wraps the host's performance-entry
//! observer, filtered to navigation entries, with guaranteed teardown.

#![warn(missing_docs)]

pub mod navigation;
pub mod vitals;

pub use navigation::{log_navigation_entry, NavigationObserverBridge};
pub use vitals::collector::VitalsCollector;
pub use vitals::sinks::{ChannelSink, LogSink};
