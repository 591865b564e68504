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

//! Entity Component System (ECS) module
//!
//! This module provides the core ECS infrastructure for the game world,
//! including components, characters, interactions and event handling.

pub use hecs::{Entity, World};

/// Type alias for hecs runtime entity handles (non-persistent, memory-only)
pub type EcsEntity = Entity;

/// Type alias for the game world
pub type GameWorld = World;

// Re-exports
pub mod actions;
pub mod character;
pub mod character_builder;
pub mod components;
pub mod events;
pub mod interaction;
pub mod systems;

pub use character::{Character, Npc, Participant, StateError};
pub use character_builder::CharacterBuilder;
pub use interaction::{InteractionError, InteractionOutcome, InteractionSession, SessionId};

pub mod context;
#[cfg(test)]
pub mod test_utils;
