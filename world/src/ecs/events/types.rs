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

//! Event type definitions

use crate::ecs::EcsEntity;
use crate::ecs::interaction::{InteractionOutcome, SessionId};
use crate::presentation::DialogId;
use serde::{Deserialize, Serialize};

/// Identifier of a one-shot notification, such as a dialog being finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signal(pub uuid::Uuid);

impl Signal {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for Signal {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "signal {}", self.0)
    }
}

/// All possible game events
///
/// Events use EcsEntity (hecs::Entity) since they are runtime notifications
/// and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    // Entity lifecycle
    EntityDespawned {
        entity: EcsEntity,
    },

    // Presentation
    DialogFinished {
        dialog: DialogId,
        signal: Signal,
    },

    // Interactions
    InteractionStarted {
        session: SessionId,
        initiator: EcsEntity,
        target: EcsEntity,
        dialog: DialogId,
    },
    InteractionEnded {
        session: SessionId,
        initiator: EcsEntity,
        target: EcsEntity,
        outcome: InteractionOutcome,
    },

    // Custom events
    Custom {
        event_type: String,
        data: String,
    },
}

impl GameEvent {
    /// The signal raised by this event, if it completes a one-shot registration
    pub fn signal(&self) -> Option<Signal> {
        match self {
            GameEvent::DialogFinished { signal, .. } => Some(*signal),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_dialog_finished_carries_signal() {
        let signal = Signal::new();
        let finished = GameEvent::DialogFinished {
            dialog: DialogId::new(),
            signal,
        };
        let custom = GameEvent::Custom {
            event_type: "test".into(),
            data: "data".into(),
        };

        assert_eq!(finished.signal(), Some(signal));
        assert_eq!(custom.signal(), None);
    }

    #[test]
    fn test_signals_are_unique() {
        assert_ne!(Signal::new(), Signal::new());
    }
}
