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

//! Spatial components for positioning and movement

use colloquy_common::{Record, RecordError, RecordResult};
use flagset::{FlagSet, flags};
use serde::{Deserialize, Serialize};

flags! {
    /// Cardinal directions. Movement combines them, so north-east walking is
    /// `Direction::North | Direction::East`.
    #[derive(Serialize, Deserialize)]
    pub enum Direction: u8 {
        West = 0b0001,
        East = 0b0010,
        North = 0b0100,
        South = 0b1000,
    }
}

impl Direction {
    /// Decode a single direction from its flag bits
    pub fn from_bits(bits: u8) -> Option<Direction> {
        match bits {
            0b0001 => Some(Direction::West),
            0b0010 => Some(Direction::East),
            0b0100 => Some(Direction::North),
            0b1000 => Some(Direction::South),
            _ => None,
        }
    }
}

/// Position of an entity on the map. `y` grows southwards.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Planar distance, ignoring height
    pub fn distance(&self, other: &Position) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn put_state(&self, record: &mut Record) {
        record.put_f32("x", self.x);
        record.put_f32("y", self.y);
        record.put_f32("z", self.z);
    }

    pub fn get_state(record: &Record) -> RecordResult<Self> {
        Ok(Self {
            x: record.get_f32("x")?,
            y: record.get_f32("y")?,
            z: record.get_f32("z")?,
        })
    }
}

/// Current walking direction and the direction the character faces
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Motion {
    /// Directions the character is currently walking in, empty when standing
    pub direction: FlagSet<Direction>,
    /// Direction the character is facing
    pub heading: Direction,
}

impl Motion {
    /// A character standing still, facing the given direction
    pub fn standing(heading: Direction) -> Self {
        Self {
            direction: FlagSet::default(),
            heading,
        }
    }

    /// Start walking. The heading follows the walk unless the current
    /// heading is already part of it (walking diagonally keeps the sprite).
    pub fn set_direction(&mut self, direction: impl Into<FlagSet<Direction>>) {
        let direction = direction.into();
        if !direction.is_empty() && !direction.contains(self.heading) {
            if let Some(first) = direction.into_iter().next() {
                self.heading = first;
            }
        }
        self.direction = direction;
    }

    /// Stop walking; the heading is kept
    pub fn stop(&mut self) {
        self.direction = FlagSet::default();
    }

    pub fn is_moving(&self) -> bool {
        !self.direction.is_empty()
    }

    pub fn put_state(&self, record: &mut Record) {
        record.put_u16("dir", u16::from(self.direction.bits()));
        record.put_u16("heading", u16::from(FlagSet::from(self.heading).bits()));
    }

    pub fn get_state(record: &Record) -> RecordResult<Self> {
        let dir = record.get_u16("dir")?;
        let direction = u8::try_from(dir)
            .ok()
            .and_then(|bits| FlagSet::<Direction>::new(bits).ok())
            .ok_or_else(|| out_of_range("dir", dir, "direction flags"))?;
        let heading = record.get_u16("heading")?;
        let heading = u8::try_from(heading)
            .ok()
            .and_then(Direction::from_bits)
            .ok_or_else(|| out_of_range("heading", heading, "a single direction"))?;
        Ok(Self { direction, heading })
    }
}

fn out_of_range(key: &str, value: u16, expected: &'static str) -> RecordError {
    RecordError::OutOfRange {
        key: key.to_string(),
        value: i64::from(value),
        expected,
    }
}

impl Default for Motion {
    fn default() -> Self {
        Self::standing(Direction::South)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walking_turns_heading() {
        let mut motion = Motion::standing(Direction::South);
        motion.set_direction(Direction::West);

        assert!(motion.is_moving());
        assert_eq!(motion.heading, Direction::West);
    }

    #[test]
    fn test_diagonal_keeps_matching_heading() {
        let mut motion = Motion::standing(Direction::North);
        motion.set_direction(Direction::North | Direction::East);

        assert_eq!(motion.heading, Direction::North);
    }

    #[test]
    fn test_stop_keeps_heading() {
        let mut motion = Motion::standing(Direction::South);
        motion.set_direction(Direction::East);
        motion.stop();

        assert!(!motion.is_moving());
        assert_eq!(motion.heading, Direction::East);
    }

    #[test]
    fn test_motion_record() {
        let mut motion = Motion::default();
        motion.set_direction(Direction::South | Direction::West);

        let mut record = Record::new();
        motion.put_state(&mut record);

        assert_eq!(Motion::get_state(&record).unwrap(), motion);
    }

    #[test]
    fn test_motion_record_rejects_unknown_bits() {
        let mut record = Record::new();
        record.put_u16("dir", 0x0102);
        record.put_u16("heading", 0b1000);
        assert!(matches!(
            Motion::get_state(&record),
            Err(RecordError::OutOfRange { key, .. }) if key == "dir"
        ));

        record.put_u16("dir", 0b1_0000);
        assert!(Motion::get_state(&record).is_err());

        record.put_u16("dir", 0b0010);
        record.put_u16("heading", 0x0108);
        assert!(matches!(
            Motion::get_state(&record),
            Err(RecordError::OutOfRange { key, .. }) if key == "heading"
        ));

        // Two bits at once is a walk, not a heading
        record.put_u16("heading", 0b0011);
        assert!(Motion::get_state(&record).is_err());
    }

    #[test]
    fn test_distance_is_planar() {
        let a = Position::new(0.0, 0.0, 0.0);
        let b = Position::new(3.0, 4.0, 10.0);
        assert_eq!(a.distance(&b), 5.0);
    }
}
