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

//! Schedule component controlling a character's autonomous behavior

use colloquy_common::{Record, RecordResult};
use serde::{Deserialize, Serialize};

/// Observable state of a schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleState {
    Active,
    Suspended,
}

/// Autonomous behavior controller
///
/// Suspensions nest: every `set_active(false)` must be matched by a
/// `set_active(true)` before the schedule runs again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// Name of the manager script that picks the next schedule
    pub manager: String,
    paused: u16,
}

impl Schedule {
    /// Create an active schedule driven by the given manager
    pub fn new(manager: impl Into<String>) -> Self {
        Self {
            manager: manager.into(),
            paused: 0,
        }
    }

    /// Suspend (`false`) or resume (`true`) the schedule
    pub fn set_active(&mut self, active: bool) {
        if !active {
            let Some(paused) = self.paused.checked_add(1) else {
                tracing::warn!(
                    "Schedule '{}' cannot be paused more than {} times",
                    self.manager,
                    u16::MAX
                );
                return;
            };
            self.paused = paused;
            if self.paused == 1 {
                tracing::debug!("Schedule '{}' paused", self.manager);
            }
        } else if self.paused > 0 {
            self.paused -= 1;
            if self.paused == 0 {
                tracing::debug!("Schedule '{}' resumed", self.manager);
            }
        } else {
            tracing::warn!("Schedule '{}' is active already", self.manager);
        }
    }

    pub fn is_active(&self) -> bool {
        self.paused == 0
    }

    pub fn state(&self) -> ScheduleState {
        if self.is_active() {
            ScheduleState::Active
        } else {
            ScheduleState::Suspended
        }
    }

    /// Number of outstanding suspensions
    pub fn paused(&self) -> u16 {
        self.paused
    }

    /// Save into a record
    pub fn put_state(&self, record: &mut Record) {
        record.put_string("manager", self.manager.as_str());
        record.put_u16("paused", self.paused);
    }

    /// Restore from a record written by `put_state`
    pub fn get_state(record: &Record) -> RecordResult<Self> {
        Ok(Self {
            manager: record.get_string("manager")?.to_string(),
            paused: record.get_u16("paused")?,
        })
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Self::new("idle")
    }
}
