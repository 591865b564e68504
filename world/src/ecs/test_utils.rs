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

//! Test utilities for ECS testing

use crate::config::InteractionConfig;
use crate::ecs::EcsEntity;
use crate::ecs::components::{Direction, Mind, Motion, Position, Schedule};
use crate::ecs::context::WorldContext;
use crate::ecs::systems::CardinalOrientation;
use crate::presentation::HeadlessPresentation;

/// Create a test context backed by a headless presentation. The returned
/// presentation shares state with the one the context owns.
pub fn create_test_context() -> (WorldContext, HeadlessPresentation) {
    create_test_context_with(InteractionConfig::default())
}

/// Same as `create_test_context` with custom interaction settings
pub fn create_test_context_with(config: InteractionConfig) -> (WorldContext, HeadlessPresentation) {
    let presentation = HeadlessPresentation::default();
    let context = WorldContext::new(
        Box::new(presentation.clone()),
        Box::new(CardinalOrientation),
        config,
    );
    (context, presentation)
}

/// Spawn an entity that can take part in a conversation
pub fn spawn_speaker(context: &mut WorldContext, id: &str, x: f32) -> EcsEntity {
    context.spawn((
        Mind::new(id, id).with_dialogue(format!("{}_intro", id)),
        Schedule::new("wander"),
        Position::new(x, 0.0, 0.0),
        Motion::standing(Direction::South),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::ScheduleState;

    #[test]
    fn test_spawn_speaker() {
        let (mut context, _presentation) = create_test_context();
        let entity = spawn_speaker(&mut context, "erek", 3.0);

        assert!(context.entities().get::<&Mind>(entity).is_ok());
        assert_eq!(context.schedule_state(entity), Some(ScheduleState::Active));
    }
}
