//
// Copyright 2025-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Colloquy Common Types
//!
//! This crate defines the types shared between the world engine and whatever
//! layer stores saved games:
//! - `Record`, the flat keyed record participants save into and restore from
//! - `RecordError`, raised by typed record accessors

pub mod record;

pub use record::{Record, RecordError, RecordResult, RecordValue};
