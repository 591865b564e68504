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

//! Action kinds and how characters respond to them

use crate::ecs::components::{Direction, Position};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Tag of an action one character directs at another
///
/// The dispatcher deciding who targets whom speaks in these tags; only a
/// subset is understood by any given character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionKind(pub u16);

impl ActionKind {
    /// The default action: addressing someone
    pub const NORMAL: ActionKind = ActionKind(0);
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            ActionKind::NORMAL => write!(f, "normal"),
            ActionKind(other) => write!(f, "action #{}", other),
        }
    }
}

impl FromStr for ActionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "normal" => Ok(ActionKind::NORMAL),
            other => other
                .parse::<u16>()
                .map(ActionKind)
                .map_err(|_| format!("Unknown action kind: {}", s)),
        }
    }
}

/// Interactions a character can start in response to an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interaction {
    /// A two-party conversation
    Conversation,
}

impl Interaction {
    /// Route an action to the interaction it triggers, if any
    pub fn for_action(action: ActionKind) -> Option<Interaction> {
        match action {
            ActionKind::NORMAL => Some(Interaction::Conversation),
            _ => None,
        }
    }
}

/// What a character does with an action it has no interaction for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownActionPolicy {
    /// Do nothing
    #[default]
    Ignore,
    /// Fail with `InteractionError::UnhandledAction`
    Reject,
}

impl FromStr for UnknownActionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ignore" => Ok(UnknownActionPolicy::Ignore),
            "reject" => Ok(UnknownActionPolicy::Reject),
            _ => Err(format!("Unknown action policy: {}", s)),
        }
    }
}

/// Area affected when a character performs an action: a circular sector
/// in front of the character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaOfEffect {
    /// Opening angle in degrees, centered on the heading
    pub arc: u16,
    /// Reach in map units
    pub radius: u32,
}

impl AreaOfEffect {
    pub const DEFAULT: AreaOfEffect = AreaOfEffect {
        arc: 120,
        radius: 30,
    };

    /// Whether `point` lies within the sector of a character standing at
    /// `origin` facing `heading`. The origin itself is always inside.
    pub fn contains(&self, origin: &Position, heading: Direction, point: &Position) -> bool {
        let dx = point.x - origin.x;
        let dy = point.y - origin.y;
        let distance = (dx * dx + dy * dy).sqrt();
        if distance == 0.0 {
            return true;
        }
        if distance > self.radius as f32 {
            return false;
        }

        let (hx, hy) = match heading {
            Direction::West => (-1.0, 0.0),
            Direction::East => (1.0, 0.0),
            Direction::North => (0.0, -1.0),
            Direction::South => (0.0, 1.0),
        };
        let cos = ((dx * hx + dy * hy) / distance).clamp(-1.0, 1.0);
        let angle = cos.acos().to_degrees();
        angle <= f32::from(self.arc) / 2.0 + f32::EPSILON
    }
}

impl Default for AreaOfEffect {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routing() {
        assert_eq!(
            Interaction::for_action(ActionKind::NORMAL),
            Some(Interaction::Conversation)
        );
        assert_eq!(Interaction::for_action(ActionKind(7)), None);
    }

    #[test]
    fn test_action_kind_parsing() {
        assert_eq!("normal".parse::<ActionKind>().unwrap(), ActionKind::NORMAL);
        assert_eq!(" Normal ".parse::<ActionKind>().unwrap(), ActionKind::NORMAL);
        assert_eq!("3".parse::<ActionKind>().unwrap(), ActionKind(3));
        assert!("attack".parse::<ActionKind>().is_err());
        assert_eq!(ActionKind::NORMAL.to_string(), "normal");
        assert_eq!(ActionKind(4).to_string(), "action #4");
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!(UnknownActionPolicy::default(), UnknownActionPolicy::Ignore);
        assert_eq!(
            "REJECT".parse::<UnknownActionPolicy>().unwrap(),
            UnknownActionPolicy::Reject
        );
        assert!("maybe".parse::<UnknownActionPolicy>().is_err());
    }

    #[test]
    fn test_area_contains_point_ahead() {
        let area = AreaOfEffect::DEFAULT;
        let origin = Position::new(0.0, 0.0, 0.0);

        assert!(area.contains(&origin, Direction::East, &Position::new(10.0, 0.0, 0.0)));
        // 45 degrees off the heading is inside a 120 degree arc
        assert!(area.contains(&origin, Direction::East, &Position::new(10.0, 10.0, 0.0)));
        // 90 degrees off is not
        assert!(!area.contains(&origin, Direction::East, &Position::new(0.0, 10.0, 0.0)));
        // behind
        assert!(!area.contains(&origin, Direction::East, &Position::new(-10.0, 0.0, 0.0)));
    }

    #[test]
    fn test_area_respects_radius() {
        let area = AreaOfEffect::DEFAULT;
        let origin = Position::new(0.0, 0.0, 0.0);

        assert!(area.contains(&origin, Direction::South, &Position::new(0.0, 30.0, 0.0)));
        assert!(!area.contains(&origin, Direction::South, &Position::new(0.0, 30.5, 0.0)));
        assert!(area.contains(&origin, Direction::South, &origin));
    }
}
