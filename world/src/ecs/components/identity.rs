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

//! Identity components for characters

use colloquy_common::{Record, RecordResult};
use serde::{Deserialize, Serialize};

/// Default speech color (white)
pub const DEFAULT_SPEECH_COLOR: u32 = 0xFFFFFF;

/// The dialogue-producing side of a character
///
/// Conversation displays are built from the target's mind: it names the
/// dialogue script to run and how the speaker is shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mind {
    /// Unique character id
    pub id: String,
    /// Display name, not necessarily unique
    pub name: String,
    /// Dialogue script assigned to this character
    pub dialogue: String,
    /// Color used for the character's speech
    pub color: u32,
    /// Sprite shown next to the character's lines
    pub portrait: Option<String>,
}

impl Mind {
    /// Create a new mind without a dialogue script
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            dialogue: String::new(),
            color: DEFAULT_SPEECH_COLOR,
            portrait: None,
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

    /// Whether a dialogue script has been assigned
    pub fn has_dialogue(&self) -> bool {
        !self.dialogue.is_empty()
    }

    pub fn put_state(&self, record: &mut Record) {
        record.put_string("id", self.id.as_str());
        record.put_string("name", self.name.as_str());
        record.put_string("dialogue", self.dialogue.as_str());
        record.put_u32("color", self.color);
        if let Some(portrait) = &self.portrait {
            record.put_string("portrait", portrait.as_str());
        }
    }

    pub fn get_state(record: &Record) -> RecordResult<Self> {
        let portrait = if record.contains("portrait") {
            Some(record.get_string("portrait")?.to_string())
        } else {
            None
        };
        Ok(Self {
            id: record.get_string("id")?.to_string(),
            name: record.get_string("name")?.to_string(),
            dialogue: record.get_string("dialogue")?.to_string(),
            color: record.get_u32("color")?,
            portrait,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mind_builder() {
        let mind = Mind::new("erek", "Erek")
            .with_dialogue("erek_intro")
            .with_color(0x00FF00)
            .with_portrait("erek.png");

        assert!(mind.has_dialogue());
        assert_eq!(mind.color, 0x00FF00);
        assert_eq!(mind.portrait.as_deref(), Some("erek.png"));
        assert!(!Mind::new("x", "X").has_dialogue());
    }

    #[test]
    fn test_mind_without_portrait_restores() {
        let mind = Mind::new("talan", "Talan").with_dialogue("talan_gate");
        let mut record = Record::new();
        mind.put_state(&mut record);

        assert!(!record.contains("portrait"));
        assert_eq!(Mind::get_state(&record).unwrap(), mind);
    }
}
