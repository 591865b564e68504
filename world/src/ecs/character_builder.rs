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

//! Character builder
//!
//! Collects everything needed to put a character into the world and spawns
//! the backing entity in one step. Builders deserialize from the `cast`
//! section of the configuration file.

use crate::ecs::character::{Character, Npc};
use crate::ecs::components::{DEFAULT_SPEECH_COLOR, Direction, Mind, Motion, Position, Schedule};
use crate::ecs::context::WorldContext;
use serde::{Deserialize, Serialize};

fn default_color() -> u32 {
    DEFAULT_SPEECH_COLOR
}

fn default_heading() -> Direction {
    Direction::South
}

fn default_manager() -> String {
    "idle".to_string()
}

/// Character builder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterBuilder {
    /// Identity key of the character's mind
    pub id: String,

    /// Display name
    pub name: String,

    /// Dialogue script; characters without one cannot be talked to
    #[serde(default)]
    pub dialogue: String,

    /// Speech color as 0xRRGGBB
    #[serde(default = "default_color")]
    pub color: u32,

    #[serde(default)]
    pub portrait: Option<String>,

    /// Map position as `[x, y]`
    #[serde(default)]
    pub position: (f32, f32),

    #[serde(default = "default_heading")]
    pub heading: Direction,

    /// Manager script driving the character's schedule
    #[serde(default = "default_manager")]
    pub manager: String,
}

impl CharacterBuilder {
    /// Create a builder for a character standing at the origin, facing south
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            dialogue: String::new(),
            color: default_color(),
            portrait: None,
            position: (0.0, 0.0),
            heading: default_heading(),
            manager: default_manager(),
        }
    }

    pub fn with_dialogue(mut self, dialogue: impl Into<String>) -> Self {
        self.dialogue = dialogue.into();
        self
    }

    pub fn with_color(mut self, color: u32) -> Self {
        self.color = color;
        self
    }

    pub fn with_portrait(mut self, portrait: impl Into<String>) -> Self {
        self.portrait = Some(portrait.into());
        self
    }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.position = (x, y);
        self
    }

    pub fn facing(mut self, heading: Direction) -> Self {
        self.heading = heading;
        self
    }

    pub fn with_manager(mut self, manager: impl Into<String>) -> Self {
        self.manager = manager.into();
        self
    }

    fn mind(&self) -> Mind {
        let mind = Mind::new(self.id.as_str(), self.name.as_str())
            .with_dialogue(self.dialogue.as_str())
            .with_color(self.color);
        match &self.portrait {
            Some(portrait) => mind.with_portrait(portrait.as_str()),
            None => mind,
        }
    }

    /// Spawn the character's entity and return a bound handle
    pub fn spawn(&self, context: &mut WorldContext) -> Character {
        let (x, y) = self.position;
        let entity = context.spawn((
            self.mind(),
            Position::new(x, y, 0.0),
            Motion::standing(self.heading),
            Schedule::new(self.manager.as_str()),
        ));
        tracing::debug!("Spawned '{}' as {:?}", self.id, entity);
        Character::bound(entity)
    }

    /// Spawn the character as a persistent non-player character
    pub fn spawn_npc(&self, context: &mut WorldContext) -> Npc {
        Npc::from(self.spawn(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::character::Participant;
    use crate::ecs::components::ScheduleState;
    use crate::ecs::test_utils::create_test_context;

    #[test]
    fn test_spawn_components() {
        let (mut context, _presentation) = create_test_context();
        let character = CharacterBuilder::new("erek", "Erek")
            .with_dialogue("erek_intro")
            .with_color(0x336699)
            .at(12.0, 3.0)
            .facing(Direction::West)
            .with_manager("patrol")
            .spawn(&mut context);

        let entity = character.record().unwrap();
        let entities = context.entities();
        let mind = entities.get::<&Mind>(entity).unwrap();
        assert_eq!(mind.name, "Erek");
        assert_eq!(mind.dialogue, "erek_intro");
        assert_eq!(mind.color, 0x336699);
        assert_eq!(entities.get::<&Position>(entity).unwrap().x, 12.0);
        assert_eq!(entities.get::<&Motion>(entity).unwrap().heading, Direction::West);
        assert_eq!(entities.get::<&Schedule>(entity).unwrap().manager, "patrol");
        drop(mind);
        assert_eq!(character.schedule_state(&context), Some(ScheduleState::Active));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let builder: CharacterBuilder =
            serde_yaml::from_str("id: erek\nname: Erek\ndialogue: erek_intro\nposition: [5.0, 2.0]\n")
                .unwrap();

        assert_eq!(builder.position, (5.0, 2.0));
        assert_eq!(builder.color, DEFAULT_SPEECH_COLOR);
        assert_eq!(builder.heading, Direction::South);
        assert_eq!(builder.manager, "idle");
        assert_eq!(builder.portrait, None);
    }
}
