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

use crate::config::InteractionConfig;
use crate::ecs::components::{Schedule, ScheduleState};
use crate::ecs::events::{
    EventBus, EventQueue, GameEvent, ListenerId, ListenerScope, Signal, Withdrawal,
};
use crate::ecs::interaction::SessionId;
use crate::ecs::systems::Orientation;
use crate::ecs::{EcsEntity, GameWorld};
use crate::presentation::{DialogId, Presentation};
use std::collections::HashMap;

/// Bookkeeping for a session that is waiting on its dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveSession {
    pub listener: ListenerId,
    pub signal: Signal,
    pub dialog: DialogId,
    pub initiator: EcsEntity,
    pub target: EcsEntity,
    /// Tick on which the session started
    pub started_at: u64,
}

/// World context that owns the entity store and the collaborators
/// interactions depend on
///
/// # Architecture
///
/// - **ECS World**: hecs::World holding schedules, positions, motion and minds
/// - **Event Bus**: queue of game events plus the one-shot listeners that
///   sessions register for their dialog's completion signal
/// - **Presentation**: injected display capability for conversations
/// - **Orientation**: injected helper turning characters toward each other
///
/// Everything runs on the game loop thread. `update` advances one tick:
/// it lets the presentation report finished dialogs, delivers all queued
/// events, then expires timed out sessions.
///
/// # Examples
///
/// ```ignore
/// let mut context = WorldContext::new(
///     Box::new(HeadlessPresentation::default()),
///     Box::new(CardinalOrientation),
///     InteractionConfig::default(),
/// );
/// let erek = CharacterBuilder::new("erek", "Erek").with_dialogue("erek_intro").spawn(&mut context);
/// let mut player = CharacterBuilder::new("player", "Player").spawn(&mut context);
/// player.perform_action(&mut context, ActionKind::NORMAL, &erek)?;
/// context.update();
/// ```
pub struct WorldContext {
    pub(crate) entities: GameWorld,
    pub(crate) bus: EventBus,
    pub(crate) presentation: Box<dyn Presentation>,
    pub(crate) orientation: Box<dyn Orientation>,
    pub(crate) config: InteractionConfig,
    pub(crate) sessions: HashMap<SessionId, ActiveSession>,
    pub(crate) tick: u64,
}

impl WorldContext {
    /// Create a new world context with the given collaborators
    pub fn new(
        presentation: Box<dyn Presentation>,
        orientation: Box<dyn Orientation>,
        config: InteractionConfig,
    ) -> Self {
        Self {
            entities: GameWorld::new(),
            bus: EventBus::new(),
            presentation,
            orientation,
            config,
            sessions: HashMap::new(),
            tick: 0,
        }
    }

    // ============================================================================
    // Direct Access
    // ============================================================================

    /// Get the ECS world
    pub fn entities(&self) -> &GameWorld {
        &self.entities
    }

    /// Get the ECS world for modification
    pub fn entities_mut(&mut self) -> &mut GameWorld {
        &mut self.entities
    }

    /// Interaction settings this world was built with
    pub fn config(&self) -> &InteractionConfig {
        &self.config
    }

    /// Handle for publishing events from outside the world
    pub fn events(&self) -> EventQueue {
        self.bus.publisher()
    }

    /// Observe every event delivered by `process_events`
    pub fn subscribe<F>(&mut self, handler: F)
    where
        F: Fn(&GameEvent) + 'static,
    {
        self.bus.subscribe(handler);
    }

    /// Number of ticks processed so far
    pub fn tick(&self) -> u64 {
        self.tick
    }

    // ============================================================================
    // Entity Operations
    // ============================================================================

    /// Spawn a new entity with the given components
    pub fn spawn(&mut self, bundle: impl hecs::DynamicBundle) -> EcsEntity {
        self.entities.spawn(bundle)
    }

    /// Despawn an entity and announce it. Returns `false` if it was
    /// already gone.
    pub fn despawn(&mut self, entity: EcsEntity) -> bool {
        match self.entities.despawn(entity) {
            Ok(()) => {
                self.bus.publish(GameEvent::EntityDespawned { entity });
                true
            }
            Err(_) => false,
        }
    }

    /// Check if an entity exists in the world
    pub fn contains(&self, entity: EcsEntity) -> bool {
        self.entities.contains(entity)
    }

    /// Current schedule state of an entity, if it has a schedule
    pub fn schedule_state(&self, entity: EcsEntity) -> Option<ScheduleState> {
        self.entities
            .get::<&Schedule>(entity)
            .ok()
            .map(|schedule| schedule.state())
    }

    // ============================================================================
    // Sessions
    // ============================================================================

    /// Look up a session that has not ended yet
    pub fn session(&self, id: SessionId) -> Option<&ActiveSession> {
        self.sessions.get(&id)
    }

    /// Whether the session is still waiting on its dialog
    pub fn is_interaction_active(&self, id: SessionId) -> bool {
        self.sessions.contains_key(&id)
    }

    /// Number of sessions waiting on their dialogs
    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }

    /// End a session without waiting for its dialog. The dialog is
    /// dismissed and both schedules resume. Returns `false` if the session
    /// already ended.
    pub fn abandon_interaction(&mut self, id: SessionId) -> bool {
        self.withdraw(id, Withdrawal::Cancelled)
    }

    fn withdraw(&mut self, id: SessionId, reason: Withdrawal) -> bool {
        let Some(active) = self.sessions.remove(&id) else {
            return false;
        };
        let Some(listener) = self.bus.unlisten(active.listener) else {
            tracing::warn!("Session {} was tracked without a listener", id);
            return false;
        };

        let events = self.bus.publisher();
        listener.on_withdraw(
            ListenerScope {
                entities: &mut self.entities,
                events: &events,
                presentation: self.presentation.as_mut(),
            },
            reason,
        );
        true
    }

    // ============================================================================
    // Game Loop
    // ============================================================================

    /// Advance the world by one tick and return the events delivered
    ///
    /// Events queued before or during this tick are delivered before any
    /// session is timed out, so a dialog finished on the expiry tick still
    /// completes.
    pub fn update(&mut self) -> Vec<GameEvent> {
        self.tick += 1;

        let events = self.bus.publisher();
        self.presentation.update(&events);
        let mut delivered = self.process_events();

        if self.expire_sessions() {
            delivered.extend(self.process_events());
        }
        delivered
    }

    /// Withdraw sessions that outlived `timeout_ticks`. Returns `true` if
    /// any session was withdrawn.
    fn expire_sessions(&mut self) -> bool {
        let Some(timeout) = self.config.timeout_ticks else {
            return false;
        };
        let tick = self.tick;
        let mut expired: Vec<SessionId> = self
            .sessions
            .iter()
            .filter(|(_, session)| tick.saturating_sub(session.started_at) >= timeout)
            .map(|(id, _)| *id)
            .collect();
        expired.sort_by_key(|id| id.0);

        let mut withdrawn = false;
        for id in expired {
            tracing::warn!("Interaction {} timed out after {} ticks", id, timeout);
            withdrawn |= self.withdraw(id, Withdrawal::TimedOut);
        }
        withdrawn
    }

    /// Deliver all queued events without advancing the tick
    pub fn process_events(&mut self) -> Vec<GameEvent> {
        let processed = self
            .bus
            .process_events(&mut self.entities, self.presentation.as_mut());

        for event in processed.iter() {
            if let GameEvent::InteractionEnded { session, .. } = event {
                self.sessions.remove(session);
            }
        }
        processed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::test_utils::{create_test_context, spawn_speaker};

    #[test]
    fn test_despawn_publishes_once() {
        let (mut context, _presentation) = create_test_context();
        let entity = spawn_speaker(&mut context, "erek", 0.0);

        assert!(context.despawn(entity));
        assert!(!context.despawn(entity));

        let events = context.process_events();
        assert_eq!(events, vec![GameEvent::EntityDespawned { entity }]);
    }

    #[test]
    fn test_update_advances_tick() {
        let (mut context, _presentation) = create_test_context();
        assert_eq!(context.tick(), 0);
        context.update();
        context.update();
        assert_eq!(context.tick(), 2);
    }

    #[test]
    fn test_schedule_state_without_schedule() {
        let (mut context, _presentation) = create_test_context();
        let entity = context.spawn((crate::ecs::components::Position::default(),));
        assert_eq!(context.schedule_state(entity), None);
    }

    #[test]
    fn test_abandon_unknown_session() {
        let (mut context, _presentation) = create_test_context();
        assert!(!context.abandon_interaction(SessionId::new()));
    }
}
