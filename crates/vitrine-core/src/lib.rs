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

//! # Vitrine Core
//!
//! Foundational crate containing the value types and host capability
//! contracts of the page performance layer: metric samples, resource
//! descriptors, performance entries, section trigger/phase types, and the
//! traits through which the rest of the workspace talks to the host
//! environment.

#![warn(missing_docs)]

pub mod entry;
pub mod host;
pub mod resource;
pub mod section;
pub mod vitals;

pub use host::Capability;
