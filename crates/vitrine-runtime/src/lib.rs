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

//! # Vitrine Runtime
//!
//! The page-lifecycle boundary of the performance layer: the
//! [`PageSession`] singleton owns the once-per-page-load state, the
//! [`PerformanceProvider`] orchestrates preloading, vitals subscription,
//! sink registration and navigation observation across one mount/unmount
//! cycle, and the [`HeadlessHost`] is a deterministic single-threaded host
//! implementation for tests and demos.

#![warn(missing_docs)]

pub mod host;
pub mod provider;
pub mod session;

pub use host::headless::HeadlessHost;
pub use provider::{PerformanceProvider, ProviderConfig, ProviderPhase};
pub use session::PageSession;
