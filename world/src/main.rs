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

use clap::Parser;
use colloquy_common::Record;
use colloquy_world::config::{Arguments, Configuration};
use colloquy_world::ecs::actions::ActionKind;
use colloquy_world::ecs::components::{Motion, Position};
use colloquy_world::ecs::context::WorldContext;
use colloquy_world::ecs::events::GameEvent;
use colloquy_world::ecs::systems::CardinalOrientation;
use colloquy_world::ecs::{Npc, Participant};
use colloquy_world::presentation::HeadlessPresentation;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load arguments from the command line
    let arguments: Arguments = Parser::parse();

    // Initialize tracing/logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_thread_ids(true)
        .with_level(true)
        .with_ansi(true)
        .init();

    // Load environment variables from .env file if specified
    if let Some(ref env_file) = arguments.env_file {
        if std::path::Path::new(env_file).exists() {
            tracing::debug!("Loading environment variables from file: {}", env_file);
            dotenv::from_filename(env_file).ok();
        }
    } else {
        // Try default .env file
        tracing::debug!("Loading environment variables from default file");
        dotenv::dotenv().ok();
    }

    // Load configuration from a file with environment variable substitution
    let config = Configuration::load(&arguments.config_file)?;
    tracing::debug!("Configuration loaded: {:?}", config);
    tracing::info!("Starting Colloquy World...");

    let presentation = HeadlessPresentation::new(
        *config.presentation.screen_length,
        config.presentation.auto_finish_ticks,
    );
    let mut context = WorldContext::new(
        Box::new(presentation),
        Box::new(CardinalOrientation),
        config.interaction,
    );
    context.subscribe(|event| tracing::debug!("Event: {:?}", event));

    let mut cast: Vec<Npc> = config
        .cast
        .iter()
        .map(|builder| builder.spawn_npc(&mut context))
        .collect();
    tracing::info!("Spawned {} characters", cast.len());

    let [initiator, target, ..] = cast.as_mut_slice() else {
        return Err("The cast needs at least two characters".into());
    };

    if !in_reach(&context, initiator, target) {
        tracing::info!("Nobody is within reach of the first character, nothing to do");
        return Ok(());
    }
    target.perform_action(&mut context, ActionKind::NORMAL, &*initiator)?;
    let session = target.character().interaction();

    let max_ticks = *config.runtime.max_ticks;
    let mut interval = tokio::time::interval(Duration::from_millis(*config.runtime.tick_millis));
    loop {
        tokio::select! {
            _ = interval.tick() => {
                let events = context.update();
                if let Some(outcome) = events.iter().find_map(|event| match event {
                    GameEvent::InteractionEnded { outcome, .. } => Some(*outcome),
                    _ => None,
                }) {
                    tracing::info!("Conversation ended after {} ticks: {:?}", context.tick(), outcome);
                    break;
                }
                if context.tick() >= max_ticks {
                    tracing::warn!("Giving up after {} ticks", max_ticks);
                    abandon(&mut context, session);
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                abandon(&mut context, session);
                break;
            }
        }
    }

    let mut record = Record::new();
    target.put_state(&context, &mut record)?;
    tracing::debug!("Final state of the target: {:?}", record);

    for npc in cast.iter_mut() {
        npc.destroy(&mut context);
    }
    context.process_events();
    tracing::info!("Colloquy World stopped");

    Ok(())
}

/// Whether `target` stands inside the area `initiator` addresses
fn in_reach(context: &WorldContext, initiator: &Npc, target: &Npc) -> bool {
    let (Some(from), Some(to)) = (initiator.record(), target.record()) else {
        return false;
    };
    let entities = context.entities();
    let (Ok(origin), Ok(motion), Ok(point)) = (
        entities.get::<&Position>(from),
        entities.get::<&Motion>(from),
        entities.get::<&Position>(to),
    ) else {
        return false;
    };
    initiator
        .area_of_effect(ActionKind::NORMAL)
        .contains(&origin, motion.heading, &point)
}

fn abandon(context: &mut WorldContext, session: Option<colloquy_world::ecs::SessionId>) {
    if let Some(session) = session {
        if context.abandon_interaction(session) {
            context.process_events();
        }
    }
}
