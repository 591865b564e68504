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

//! Conversations between two characters
//!
//! An `InteractionSession` is created when one character addresses another.
//! Starting it suspends both schedules, stops the initiator, turns the target
//! toward the initiator and opens a conversation dialog. The session is then
//! handed to the event bus, which owns it until the dialog's completion
//! signal fires. Delivery consumes the session, resuming both schedules.
//!
//! A session may also be withdrawn before the signal fires, either through
//! `WorldContext::abandon_interaction` or by the configured timeout. Either
//! way the schedules are resumed exactly once.

use crate::ecs::actions::ActionKind;
use crate::ecs::components::{Mind, Motion, Schedule};
use crate::ecs::context::{ActiveSession, WorldContext};
use crate::ecs::events::{GameEvent, Listener, ListenerScope, Withdrawal};
use crate::ecs::{EcsEntity, GameWorld};
use crate::presentation::{DialogHandle, PresentationError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier of an interaction session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub uuid::Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a session came to an end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InteractionOutcome {
    /// The dialog signalled it was finished
    Completed,
    /// The session was withdrawn by the game
    Abandoned,
    /// The session outlived the configured timeout
    TimedOut,
}

/// Which side of an interaction a check failed for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Initiator,
    Target,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Initiator => write!(f, "initiator"),
            Role::Target => write!(f, "target"),
        }
    }
}

/// Errors that can occur when performing an action.
#[derive(Debug, Error)]
pub enum InteractionError {
    /// A participant has no world entity.
    #[error("The {0} is not bound to a world entity")]
    Unbound(Role),

    /// A participant's world entity has been despawned.
    #[error("The {role} entity {entity:?} no longer exists")]
    NoSuchEntity { role: Role, entity: EcsEntity },

    /// A participant lacks a component the interaction needs.
    #[error("The {role} entity {entity:?} has no {component} component")]
    MissingComponent {
        role: Role,
        entity: EcsEntity,
        component: &'static str,
    },

    /// The action kind has no interaction and unknown actions are rejected.
    #[error("Action {0} is not handled by this character")]
    UnhandledAction(ActionKind),

    /// The conversation could not be shown.
    #[error("Presentation failed: {0}")]
    Presentation(#[from] PresentationError),
}

/// Result type for interaction operations.
pub type InteractionResult<T> = Result<T, InteractionError>;

fn component_error(
    role: Role,
    entity: EcsEntity,
    component: &'static str,
    error: hecs::ComponentError,
) -> InteractionError {
    match error {
        hecs::ComponentError::NoSuchEntity => InteractionError::NoSuchEntity { role, entity },
        hecs::ComponentError::MissingComponent(_) => InteractionError::MissingComponent {
            role,
            entity,
            component,
        },
    }
}

fn require_schedule(entities: &GameWorld, role: Role, entity: EcsEntity) -> InteractionResult<()> {
    entities
        .get::<&Schedule>(entity)
        .map(|_| ())
        .map_err(|e| component_error(role, entity, "Schedule", e))
}

fn set_schedule_active(entities: &GameWorld, entity: EcsEntity, active: bool) {
    match entities.get::<&mut Schedule>(entity) {
        Ok(mut schedule) => schedule.set_active(active),
        Err(_) => {
            tracing::warn!(
                "Entity {:?} has no schedule to {}",
                entity,
                if active { "resume" } else { "suspend" }
            );
        }
    }
}

/// One conversation in progress
#[derive(Debug)]
pub struct InteractionSession {
    id: SessionId,
    initiator: EcsEntity,
    target: EcsEntity,
    dialog: DialogHandle,
}

impl InteractionSession {
    /// Start a conversation between `initiator` and `target`.
    ///
    /// All preconditions are checked before anything changes. If the
    /// presentation fails after the schedules were suspended, they are
    /// resumed again before the error is returned.
    pub fn start(
        context: &mut WorldContext,
        initiator: EcsEntity,
        target: EcsEntity,
    ) -> InteractionResult<SessionId> {
        require_schedule(&context.entities, Role::Initiator, initiator)?;
        require_schedule(&context.entities, Role::Target, target)?;
        let mind = context
            .entities
            .get::<&Mind>(target)
            .map(|mind| (*mind).clone())
            .map_err(|e| component_error(Role::Target, target, "Mind", e))?;

        set_schedule_active(&context.entities, initiator, false);
        set_schedule_active(&context.entities, target, false);

        if let Ok(mut motion) = context.entities.get::<&mut Motion>(initiator) {
            motion.stop();
        }
        context.orientation.face(&mut context.entities, target, initiator);

        let settings = context.config;
        let width = context
            .presentation
            .screen_length()
            .saturating_sub(settings.dialog_margin);
        let dialog = match context
            .presentation
            .create_conversation(&mind, width, settings.dialog_height)
        {
            Ok(dialog) => dialog,
            Err(error) => {
                tracing::warn!("Conversation with '{}' could not be created: {}", mind.id, error);
                Self::rollback(&context.entities, initiator, target);
                return Err(error.into());
            }
        };

        let id = SessionId::new();
        let signal = dialog.completion_signal();
        let session = InteractionSession {
            id,
            initiator,
            target,
            dialog,
        };
        let listener = context.bus.listen_once(signal, Box::new(session));

        if let Err(error) = context
            .presentation
            .place(settings.dialog_x, settings.dialog_y, &dialog)
        {
            tracing::warn!("Conversation with '{}' could not be placed: {}", mind.id, error);
            drop(context.bus.unlisten(listener));
            context.presentation.dismiss(&dialog);
            Self::rollback(&context.entities, initiator, target);
            return Err(error.into());
        }

        context.sessions.insert(
            id,
            ActiveSession {
                listener,
                signal,
                dialog: dialog.id(),
                initiator,
                target,
                started_at: context.tick,
            },
        );
        context.bus.publish(GameEvent::InteractionStarted {
            session: id,
            initiator,
            target,
            dialog: dialog.id(),
        });
        tracing::info!(
            "Interaction {} started: {:?} talks to '{}'",
            id,
            initiator,
            mind.id
        );

        Ok(id)
    }

    fn rollback(entities: &GameWorld, initiator: EcsEntity, target: EcsEntity) {
        set_schedule_active(entities, initiator, true);
        set_schedule_active(entities, target, true);
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn initiator(&self) -> EcsEntity {
        self.initiator
    }

    pub fn target(&self) -> EcsEntity {
        self.target
    }

    pub fn dialog(&self) -> &DialogHandle {
        &self.dialog
    }

    fn end(self, scope: ListenerScope<'_>, outcome: InteractionOutcome) {
        set_schedule_active(scope.entities, self.initiator, true);
        set_schedule_active(scope.entities, self.target, true);

        scope.events.publish(GameEvent::InteractionEnded {
            session: self.id,
            initiator: self.initiator,
            target: self.target,
            outcome,
        });
        tracing::info!("Interaction {} ended: {:?}", self.id, outcome);
    }
}

impl Listener for InteractionSession {
    fn on_signal(self: Box<Self>, scope: ListenerScope<'_>, _event: &GameEvent) {
        self.end(scope, InteractionOutcome::Completed);
    }

    fn on_withdraw(self: Box<Self>, scope: ListenerScope<'_>, reason: Withdrawal) {
        scope.presentation.dismiss(&self.dialog);
        let outcome = match reason {
            Withdrawal::Cancelled => InteractionOutcome::Abandoned,
            Withdrawal::TimedOut => InteractionOutcome::TimedOut,
        };
        self.end(scope, outcome);
    }
}
