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

//! Turning characters toward each other

use crate::ecs::components::{Direction, Motion, Position};
use crate::ecs::{EcsEntity, GameWorld};

/// Turns one entity to face another
#[cfg_attr(test, mockall::automock)]
pub trait Orientation {
    /// Turn `observer` toward `target`
    fn face(&self, entities: &mut GameWorld, observer: EcsEntity, target: EcsEntity);
}

/// Faces along whichever axis separates the two entities most
#[derive(Debug, Clone, Copy, Default)]
pub struct CardinalOrientation;

impl CardinalOrientation {
    /// Cardinal direction from `from` toward `to`; `None` if they share a spot
    pub fn direction_between(from: &Position, to: &Position) -> Option<Direction> {
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        if dx == 0.0 && dy == 0.0 {
            None
        } else if dx.abs() >= dy.abs() {
            Some(if dx > 0.0 { Direction::East } else { Direction::West })
        } else {
            Some(if dy > 0.0 { Direction::South } else { Direction::North })
        }
    }
}

impl Orientation for CardinalOrientation {
    fn face(&self, entities: &mut GameWorld, observer: EcsEntity, target: EcsEntity) {
        let positions = {
            let from = entities.get::<&Position>(observer).map(|p| *p);
            let to = entities.get::<&Position>(target).map(|p| *p);
            from.ok().zip(to.ok())
        };
        let Some((from, to)) = positions else {
            tracing::debug!("Cannot face {:?} from {:?}: missing position", target, observer);
            return;
        };
        let Some(heading) = Self::direction_between(&from, &to) else {
            return;
        };

        match entities.get::<&mut Motion>(observer) {
            Ok(mut motion) => motion.heading = heading,
            Err(_) => {
                tracing::debug!("Entity {:?} has no motion to turn", observer);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_between() {
        let origin = Position::new(0.0, 0.0, 0.0);
        assert_eq!(
            CardinalOrientation::direction_between(&origin, &Position::new(5.0, 2.0, 0.0)),
            Some(Direction::East)
        );
        assert_eq!(
            CardinalOrientation::direction_between(&origin, &Position::new(-1.0, 4.0, 0.0)),
            Some(Direction::South)
        );
        assert_eq!(
            CardinalOrientation::direction_between(&origin, &Position::new(0.0, -3.0, 0.0)),
            Some(Direction::North)
        );
        assert_eq!(CardinalOrientation::direction_between(&origin, &origin), None);
    }

    #[test]
    fn test_face_turns_observer() {
        let mut world = GameWorld::new();
        let observer = world.spawn((Position::new(0.0, 0.0, 0.0), Motion::standing(Direction::South)));
        let target = world.spawn((Position::new(-8.0, 1.0, 0.0), Motion::standing(Direction::East)));

        CardinalOrientation.face(&mut world, observer, target);

        assert_eq!(world.get::<&Motion>(observer).unwrap().heading, Direction::West);
        assert_eq!(world.get::<&Motion>(target).unwrap().heading, Direction::East);
    }

    #[test]
    fn test_face_without_position_is_noop() {
        let mut world = GameWorld::new();
        let observer = world.spawn((Motion::standing(Direction::South),));
        let target = world.spawn((Position::new(3.0, 0.0, 0.0),));

        CardinalOrientation.face(&mut world, observer, target);

        assert_eq!(world.get::<&Motion>(observer).unwrap().heading, Direction::South);
    }
}
