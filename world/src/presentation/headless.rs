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

//! Presentation without a screen
//!
//! Used by the demo binary and by tests. Conversations are written to the
//! log and either finish on their own after a number of ticks or when
//! `finish` is called. Clones share state, so a test can keep one handle
//! while the world owns another.

use super::{DialogHandle, DialogId, Presentation, PresentationError};
use crate::ecs::components::Mind;
use crate::ecs::events::{EventQueue, GameEvent, Signal};
use parking_lot::Mutex;
use std::sync::Arc;

/// Default display width used when nothing is configured
pub const DEFAULT_SCREEN_LENGTH: u32 = 640;

/// Requests kept for inspection. Beyond this the oldest closed ones are
/// dropped.
pub const MAX_REQUESTS: usize = 256;

/// A conversation the world asked for
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationRequest {
    pub dialog: DialogHandle,
    pub mind: Mind,
    pub width: u32,
    pub height: u32,
    pub placed_at: Option<(i32, i32)>,
    pub dismissed: bool,
}

#[derive(Debug)]
struct OpenDialog {
    handle: DialogHandle,
    remaining: Option<u32>,
}

#[derive(Debug, Default)]
struct HeadlessState {
    requests: Vec<ConversationRequest>,
    open: Vec<OpenDialog>,
}

impl HeadlessState {
    fn request_mut(&mut self, id: DialogId) -> Option<&mut ConversationRequest> {
        self.requests.iter_mut().find(|r| r.dialog.id() == id)
    }

    fn close(&mut self, id: DialogId) -> Option<DialogHandle> {
        let index = self.open.iter().position(|d| d.handle.id() == id)?;
        Some(self.open.remove(index).handle)
    }

    fn is_closed(&self, request: &ConversationRequest) -> bool {
        request.dismissed
            || (request.placed_at.is_some()
                && !self.open.iter().any(|d| d.handle.id() == request.dialog.id()))
    }

    fn push(&mut self, request: ConversationRequest) {
        while self.requests.len() >= MAX_REQUESTS {
            let Some(index) = self.requests.iter().position(|r| self.is_closed(r)) else {
                break;
            };
            self.requests.remove(index);
        }
        self.requests.push(request);
    }
}

#[derive(Debug, Clone)]
pub struct HeadlessPresentation {
    screen_length: u32,
    auto_finish: Option<u32>,
    state: Arc<Mutex<HeadlessState>>,
}

impl HeadlessPresentation {
    /// `auto_finish` is the number of ticks a placed dialog stays open;
    /// `None` keeps it open until `finish` is called.
    pub fn new(screen_length: u32, auto_finish: Option<u32>) -> Self {
        Self {
            screen_length,
            auto_finish,
            state: Arc::new(Mutex::new(HeadlessState::default())),
        }
    }

    /// Conversations requested so far, in order. Only the most recent
    /// closed ones are kept once `MAX_REQUESTS` is reached.
    pub fn requests(&self) -> Vec<ConversationRequest> {
        self.state.lock().requests.clone()
    }

    /// Dialogs that are placed and not yet finished
    pub fn open_dialogs(&self) -> Vec<DialogHandle> {
        self.state.lock().open.iter().map(|d| d.handle).collect()
    }

    /// Close a dialog as if the player ended the conversation. Returns
    /// `false` when the dialog is not open.
    pub fn finish(&self, dialog: DialogId, events: &EventQueue) -> bool {
        let closed = self.state.lock().close(dialog);
        match closed {
            Some(handle) => {
                tracing::debug!("Dialog {} finished", dialog);
                events.publish(finished_event(handle));
                true
            }
            None => false,
        }
    }
}

impl Default for HeadlessPresentation {
    fn default() -> Self {
        Self::new(DEFAULT_SCREEN_LENGTH, None)
    }
}

fn finished_event(handle: DialogHandle) -> GameEvent {
    GameEvent::DialogFinished {
        dialog: handle.id(),
        signal: handle.completion_signal(),
    }
}

impl Presentation for HeadlessPresentation {
    fn screen_length(&self) -> u32 {
        self.screen_length
    }

    fn create_conversation(
        &mut self,
        mind: &Mind,
        width: u32,
        height: u32,
    ) -> Result<DialogHandle, PresentationError> {
        if width == 0 || height == 0 || width > self.screen_length {
            return Err(PresentationError::InvalidSize { width, height });
        }
        if !mind.has_dialogue() {
            return Err(PresentationError::NoDialogue(mind.id.clone()));
        }

        let handle = DialogHandle::new(DialogId::new(), Signal::new());
        self.state.lock().push(ConversationRequest {
            dialog: handle,
            mind: mind.clone(),
            width,
            height,
            placed_at: None,
            dismissed: false,
        });
        tracing::debug!(
            "Conversation {} created for '{}' ({}x{})",
            handle.id(),
            mind.id,
            width,
            height
        );
        Ok(handle)
    }

    fn place(&mut self, x: i32, y: i32, dialog: &DialogHandle) -> Result<(), PresentationError> {
        let mut state = self.state.lock();
        let request = state
            .request_mut(dialog.id())
            .filter(|r| !r.dismissed && r.placed_at.is_none())
            .ok_or(PresentationError::UnknownDialog(dialog.id()))?;
        request.placed_at = Some((x, y));
        tracing::info!(
            "{} begins dialogue '{}' at ({}, {})",
            request.mind.name,
            request.mind.dialogue,
            x,
            y
        );

        state.open.push(OpenDialog {
            handle: *dialog,
            remaining: self.auto_finish,
        });
        Ok(())
    }

    fn dismiss(&mut self, dialog: &DialogHandle) {
        let mut state = self.state.lock();
        state.close(dialog.id());
        if let Some(request) = state.request_mut(dialog.id()) {
            request.dismissed = true;
        }
        tracing::debug!("Dialog {} dismissed", dialog.id());
    }

    fn update(&mut self, events: &EventQueue) {
        let mut state = self.state.lock();
        let mut expired = Vec::new();
        for dialog in state.open.iter_mut() {
            if let Some(remaining) = dialog.remaining.as_mut() {
                *remaining = remaining.saturating_sub(1);
                if *remaining == 0 {
                    expired.push(dialog.handle.id());
                }
            }
        }
        for id in expired {
            if let Some(handle) = state.close(id) {
                tracing::debug!("Dialog {} finished", id);
                events.publish(finished_event(handle));
            }
        }
    }
}
