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

//! # Vitrine Loader
//!
//! The adaptive loading half of the performance layer: the
//! [`ResourcePreloader`] hints the host to fetch critical assets before
//! layout needs them, and [`LazySection`] defers construction of
//! non-critical page sections until their trigger condition fires.

#![warn(missing_docs)]

pub mod preload;
pub mod section;

pub use preload::{critical_resources, ResourcePreloader};
pub use section::{LazySection, LoaderConfig, SectionFactory, SectionView};
