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

//! Presentation layer contract
//!
//! The world never draws anything itself. Conversations are shown by a
//! `Presentation` implementation injected into the `WorldContext`; when the
//! player closes a conversation, the implementation publishes
//! `GameEvent::DialogFinished` carrying the dialog's completion signal.

mod headless;

pub use headless::{
    ConversationRequest, DEFAULT_SCREEN_LENGTH, HeadlessPresentation, MAX_REQUESTS,
};

use crate::ecs::components::Mind;
use crate::ecs::events::{EventQueue, Signal};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier of a dialog created by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DialogId(pub uuid::Uuid);

impl DialogId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for DialogId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DialogId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A dialog created for a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogHandle {
    id: DialogId,
    finished: Signal,
}

impl DialogHandle {
    pub fn new(id: DialogId, finished: Signal) -> Self {
        Self { id, finished }
    }

    pub fn id(&self) -> DialogId {
        self.id
    }

    /// Signal raised once the dialog is finished
    pub fn completion_signal(&self) -> Signal {
        self.finished
    }
}

/// Errors raised by a presentation backend
#[derive(Debug, Error)]
pub enum PresentationError {
    /// The dialog was never created or has already been closed.
    #[error("Dialog {0} is unknown to the presentation layer")]
    UnknownDialog(DialogId),

    /// The requested dialog does not fit the display.
    #[error("Dialog of {width}x{height} does not fit the display")]
    InvalidSize { width: u32, height: u32 },

    /// The character has nothing to say.
    #[error("Character '{0}' has no dialogue script")]
    NoDialogue(String),

    /// Any other backend failure.
    #[error("Presentation backend failure: {0}")]
    Backend(String),
}

/// Conversation display capability
#[cfg_attr(test, mockall::automock)]
pub trait Presentation {
    /// Usable width of the display
    fn screen_length(&self) -> u32;

    /// Build a conversation dialog driven by the given mind
    fn create_conversation(
        &mut self,
        mind: &Mind,
        width: u32,
        height: u32,
    ) -> Result<DialogHandle, PresentationError>;

    /// Put a created dialog on screen
    fn place(&mut self, x: i32, y: i32, dialog: &DialogHandle) -> Result<(), PresentationError>;

    /// Remove a dialog without raising its completion signal
    fn dismiss(&mut self, dialog: &DialogHandle);

    /// Advance one tick. Finished dialogs are reported through `events`.
    fn update(&mut self, events: &EventQueue) {
        let _ = events;
    }
}
