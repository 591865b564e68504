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

//! Characters that can be addressed by other characters
//!
//! A `Character` is a thin handle onto a world entity. Its schedule, motion
//! and mind live in the ECS and are looked up when needed, so the handle can
//! be cloned and passed around freely. An unbound character does nothing:
//! teardown and persistence on it succeed without effect.

use crate::ecs::actions::{ActionKind, AreaOfEffect, Interaction, UnknownActionPolicy};
use crate::ecs::components::{Mind, Motion, Position, Schedule, ScheduleState};
use crate::ecs::context::WorldContext;
use crate::ecs::interaction::{
    InteractionError, InteractionResult, InteractionSession, Role, SessionId,
};
use crate::ecs::EcsEntity;
use colloquy_common::{Record, RecordError};
use thiserror::Error;

/// Errors raised while saving or restoring a participant
#[derive(Debug, Error)]
pub enum StateError {
    #[error(transparent)]
    Record(#[from] RecordError),

    #[error("Entity {0:?} no longer exists")]
    NoSuchEntity(EcsEntity),
}

/// Something that can take part in an interaction
pub trait Participant {
    /// The world entity backing this participant, if bound
    fn record(&self) -> Option<EcsEntity>;

    fn is_bound(&self) -> bool {
        self.record().is_some()
    }

    /// Area affected when this participant performs `action`
    fn area_of_effect(&self, action: ActionKind) -> AreaOfEffect {
        let _ = action;
        AreaOfEffect::DEFAULT
    }

    /// Respond to `action` directed at this participant by `initiator`
    fn perform_action(
        &mut self,
        context: &mut WorldContext,
        action: ActionKind,
        initiator: &dyn Participant,
    ) -> InteractionResult<()>;

    /// Remove the backing entity from the world. Safe to call repeatedly.
    fn destroy(&mut self, context: &mut WorldContext);

    /// Write this participant's state into `record`
    fn put_state(&self, context: &WorldContext, record: &mut Record) -> Result<(), StateError> {
        let _ = (context, record);
        Ok(())
    }

    /// Restore this participant's state from `record`
    fn get_state(&mut self, context: &mut WorldContext, record: &Record) -> Result<(), StateError> {
        let _ = (context, record);
        Ok(())
    }
}

/// An addressable character
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Character {
    record: Option<EcsEntity>,
    interaction: Option<SessionId>,
}

impl Character {
    /// Create an unbound character
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a character bound to an existing entity
    pub fn bound(record: EcsEntity) -> Self {
        Self {
            record: Some(record),
            interaction: None,
        }
    }

    pub fn bind(&mut self, record: EcsEntity) {
        self.record = Some(record);
    }

    /// The last session started by addressing this character
    pub fn interaction(&self) -> Option<SessionId> {
        self.interaction
    }

    /// Current schedule state, if bound to an entity with a schedule
    pub fn schedule_state(&self, context: &WorldContext) -> Option<ScheduleState> {
        self.record
            .and_then(|record| context.schedule_state(record))
    }

    /// Current motion, if bound to an entity that moves
    pub fn motion(&self, context: &WorldContext) -> Option<Motion> {
        let record = self.record?;
        context.entities().get::<&Motion>(record).ok().map(|m| *m)
    }
}

impl Participant for Character {
    fn record(&self) -> Option<EcsEntity> {
        self.record
    }

    fn perform_action(
        &mut self,
        context: &mut WorldContext,
        action: ActionKind,
        initiator: &dyn Participant,
    ) -> InteractionResult<()> {
        match Interaction::for_action(action) {
            Some(Interaction::Conversation) => {
                let source = initiator
                    .record()
                    .ok_or(InteractionError::Unbound(Role::Initiator))?;
                let target = self.record.ok_or(InteractionError::Unbound(Role::Target))?;

                let session = InteractionSession::start(context, source, target)?;
                self.interaction = Some(session);
                Ok(())
            }
            None => match context.config().unknown_actions {
                UnknownActionPolicy::Ignore => {
                    tracing::debug!("Ignoring {} directed at {:?}", action, self.record);
                    Ok(())
                }
                UnknownActionPolicy::Reject => Err(InteractionError::UnhandledAction(action)),
            },
        }
    }

    fn destroy(&mut self, context: &mut WorldContext) {
        if let Some(record) = self.record.take() {
            if !context.despawn(record) {
                tracing::debug!("Entity {:?} was already removed", record);
            }
        }
    }
}

/// A non-player character whose state survives save and restore
///
/// Mind, position, motion and schedule are written under nested keys of
/// the same names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Npc {
    character: Character,
}

impl Npc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bound(record: EcsEntity) -> Self {
        Self {
            character: Character::bound(record),
        }
    }

    pub fn character(&self) -> &Character {
        &self.character
    }

    pub fn character_mut(&mut self) -> &mut Character {
        &mut self.character
    }
}

impl From<Character> for Npc {
    fn from(character: Character) -> Self {
        Self { character }
    }
}

impl Participant for Npc {
    fn record(&self) -> Option<EcsEntity> {
        self.character.record()
    }

    fn area_of_effect(&self, action: ActionKind) -> AreaOfEffect {
        self.character.area_of_effect(action)
    }

    fn perform_action(
        &mut self,
        context: &mut WorldContext,
        action: ActionKind,
        initiator: &dyn Participant,
    ) -> InteractionResult<()> {
        self.character.perform_action(context, action, initiator)
    }

    fn destroy(&mut self, context: &mut WorldContext) {
        self.character.destroy(context);
    }

    fn put_state(&self, context: &WorldContext, record: &mut Record) -> Result<(), StateError> {
        let Some(entity) = self.record() else {
            return Ok(());
        };
        let entities = context.entities();
        if !entities.contains(entity) {
            return Err(StateError::NoSuchEntity(entity));
        }

        if let Ok(mind) = entities.get::<&Mind>(entity) {
            let mut nested = Record::new();
            mind.put_state(&mut nested);
            record.put_record("mind", nested);
        }
        if let Ok(position) = entities.get::<&Position>(entity) {
            let mut nested = Record::new();
            position.put_state(&mut nested);
            record.put_record("position", nested);
        }
        if let Ok(motion) = entities.get::<&Motion>(entity) {
            let mut nested = Record::new();
            motion.put_state(&mut nested);
            record.put_record("motion", nested);
        }
        if let Ok(schedule) = entities.get::<&Schedule>(entity) {
            let mut nested = Record::new();
            schedule.put_state(&mut nested);
            record.put_record("schedule", nested);
        }
        Ok(())
    }

    fn get_state(&mut self, context: &mut WorldContext, record: &Record) -> Result<(), StateError> {
        let Some(entity) = self.record() else {
            return Ok(());
        };

        // Parse everything before touching the world
        let mind = record.get_record_opt("mind")?.map(Mind::get_state).transpose()?;
        let position = record
            .get_record_opt("position")?
            .map(Position::get_state)
            .transpose()?;
        let motion = record.get_record_opt("motion")?.map(Motion::get_state).transpose()?;
        let schedule = record
            .get_record_opt("schedule")?
            .map(Schedule::get_state)
            .transpose()?;

        let entities = context.entities_mut();
        if !entities.contains(entity) {
            return Err(StateError::NoSuchEntity(entity));
        }
        let missing = |_| StateError::NoSuchEntity(entity);
        if let Some(mind) = mind {
            entities.insert_one(entity, mind).map_err(missing)?;
        }
        if let Some(position) = position {
            entities.insert_one(entity, position).map_err(missing)?;
        }
        if let Some(motion) = motion {
            entities.insert_one(entity, motion).map_err(missing)?;
        }
        if let Some(schedule) = schedule {
            entities.insert_one(entity, schedule).map_err(missing)?;
        }
        tracing::debug!("Restored state of {:?}", entity);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::Direction;
    use crate::ecs::test_utils::{create_test_context, spawn_speaker};
    use proptest::prelude::*;

    #[test]
    fn test_unbound_character_is_inert() {
        let (mut context, _presentation) = create_test_context();
        let mut character = Character::new();

        character.destroy(&mut context);
        assert!(!character.is_bound());
        assert_eq!(character.schedule_state(&context), None);

        let mut record = Record::new();
        character.put_state(&context, &mut record).unwrap();
        assert!(record.is_empty());
    }

    #[test]
    fn test_bound_later_starts_conversation() {
        let (mut context, presentation) = create_test_context();
        let player = Character::bound(spawn_speaker(&mut context, "player", 0.0));
        let entity = spawn_speaker(&mut context, "erek", 1.0);

        let mut target = Character::new();
        target.bind(entity);
        assert!(target.is_bound());
        assert_eq!(target.record(), Some(entity));

        target
            .perform_action(&mut context, ActionKind::NORMAL, &player)
            .unwrap();

        assert!(target.interaction().is_some());
        assert_eq!(target.schedule_state(&context), Some(ScheduleState::Suspended));
        assert_eq!(presentation.requests().len(), 1);
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let (mut context, _presentation) = create_test_context();
        let entity = spawn_speaker(&mut context, "erek", 0.0);
        let mut character = Character::bound(entity);

        character.destroy(&mut context);
        assert!(!character.is_bound());
        assert!(!context.contains(entity));

        character.destroy(&mut context);
        assert!(!character.is_bound());
    }

    #[test]
    fn test_destroy_already_despawned() {
        let (mut context, _presentation) = create_test_context();
        let entity = spawn_speaker(&mut context, "erek", 0.0);
        let mut first = Character::bound(entity);
        let mut second = Character::bound(entity);

        first.destroy(&mut context);
        second.destroy(&mut context);

        assert!(!second.is_bound());
    }

    #[test]
    fn test_unbound_initiator_rejected() {
        let (mut context, _presentation) = create_test_context();
        let entity = spawn_speaker(&mut context, "erek", 0.0);
        let mut target = Character::bound(entity);

        let result = target.perform_action(&mut context, ActionKind::NORMAL, &Character::new());

        assert!(matches!(result, Err(InteractionError::Unbound(Role::Initiator))));
        assert_eq!(target.interaction(), None);
        assert_eq!(context.schedule_state(entity), Some(ScheduleState::Active));
    }

    #[test]
    fn test_unbound_target_rejected() {
        let (mut context, _presentation) = create_test_context();
        let entity = spawn_speaker(&mut context, "player", 0.0);
        let initiator = Character::bound(entity);

        let result =
            Character::new().perform_action(&mut context, ActionKind::NORMAL, &initiator);

        assert!(matches!(result, Err(InteractionError::Unbound(Role::Target))));
    }

    #[test]
    fn test_npc_state_round_trip() {
        let (mut context, _presentation) = create_test_context();
        let entity = spawn_speaker(&mut context, "erek", 4.0);
        context
            .entities()
            .get::<&mut Schedule>(entity)
            .unwrap()
            .set_active(false);
        let npc = Npc::bound(entity);

        let mut record = Record::new();
        npc.put_state(&context, &mut record).unwrap();
        assert!(record.contains("mind"));
        assert!(record.contains("schedule"));

        let restored_entity = context.spawn((Position::default(),));
        let mut restored = Npc::bound(restored_entity);
        restored.get_state(&mut context, &record).unwrap();

        let entities = context.entities();
        assert_eq!(entities.get::<&Mind>(restored_entity).unwrap().id, "erek");
        assert_eq!(entities.get::<&Position>(restored_entity).unwrap().x, 4.0);
        assert_eq!(
            entities.get::<&Motion>(restored_entity).unwrap().heading,
            Direction::South
        );
        assert_eq!(entities.get::<&Schedule>(restored_entity).unwrap().paused(), 1);
    }

    #[test]
    fn test_npc_get_state_rejects_bad_record_without_changes() {
        let (mut context, _presentation) = create_test_context();
        let entity = spawn_speaker(&mut context, "erek", 4.0);
        let mut npc = Npc::bound(entity);

        let mut position = Record::new();
        position.put_f32("x", 1.0);
        let mut record = Record::new();
        record.put_record("position", position);

        assert!(npc.get_state(&mut context, &record).is_err());
        assert_eq!(context.entities().get::<&Position>(entity).unwrap().x, 4.0);
    }

    #[test]
    fn test_npc_get_state_rejects_corrupt_motion() {
        let (mut context, _presentation) = create_test_context();
        let entity = spawn_speaker(&mut context, "erek", 4.0);
        let mut npc = Npc::bound(entity);

        let mut saved = Record::new();
        npc.put_state(&context, &mut saved).unwrap();

        let mut motion = Record::new();
        motion.put_u16("dir", 0x0102);
        motion.put_u16("heading", 0x0108);
        let mut record = saved.clone();
        record.put_record("motion", motion);
        record.put_record("position", {
            let mut position = Record::new();
            Position::new(9.0, 9.0, 0.0).put_state(&mut position);
            position
        });

        assert!(matches!(
            npc.get_state(&mut context, &record),
            Err(StateError::Record(RecordError::OutOfRange { .. }))
        ));
        let entities = context.entities();
        assert_eq!(entities.get::<&Position>(entity).unwrap().x, 4.0);
        assert_eq!(entities.get::<&Motion>(entity).unwrap().heading, Direction::South);
    }

    #[test]
    fn test_npc_of_despawned_entity() {
        let (mut context, _presentation) = create_test_context();
        let entity = spawn_speaker(&mut context, "erek", 0.0);
        context.despawn(entity);

        let npc = Npc::bound(entity);
        let mut record = Record::new();
        assert!(matches!(
            npc.put_state(&context, &mut record),
            Err(StateError::NoSuchEntity(_))
        ));
    }

    proptest! {
        #[test]
        fn test_area_of_effect_is_constant(kind in any::<u16>()) {
            let character = Character::new();
            let area = character.area_of_effect(ActionKind(kind));
            prop_assert_eq!(area.arc, 120);
            prop_assert_eq!(area.radius, 30);
        }
    }
}
