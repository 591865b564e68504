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

use crate::ecs::CharacterBuilder;
use crate::ecs::actions::UnknownActionPolicy;
use crate::presentation::DEFAULT_SCREEN_LENGTH;
use clap::Parser;
use serde::{Deserialize, Serialize};
use serde_env_field::EnvField;
use thiserror::Error;

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Arguments {
    #[arg(
        short = 'c',
        long = "config",
        help = "Path to configuration file",
        default_value = "world/config.yaml"
    )]
    pub config_file: String,

    #[arg(
        short = 'e',
        long = "env",
        help = "Path to environment file",
        default_value = "world/.env"
    )]
    pub env_file: Option<String>,
}

impl Default for Arguments {
    fn default() -> Self {
        Self {
            config_file: "config.yaml".to_string(),
            env_file: Some(".env".to_string()),
        }
    }
}

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to open config file {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(default)]
    pub interaction: InteractionConfig,
    #[serde(default)]
    pub presentation: PresentationConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
    /// Characters spawned by the demo, in order
    #[serde(default)]
    pub cast: Vec<CharacterBuilder>,
}

impl Configuration {
    pub fn load(path: &str) -> Result<Configuration, ConfigError> {
        let file = std::fs::File::open(path).map_err(|source| ConfigError::Open {
            path: path.to_string(),
            source,
        })?;
        let conf = serde_yaml::from_reader(file)?;

        Ok(conf)
    }
}

/// Layout and policy of conversations
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Horizontal space left free around the dialog
    pub dialog_margin: u32,
    pub dialog_height: u32,
    pub dialog_x: i32,
    pub dialog_y: i32,
    /// What to do with action kinds that start no interaction
    pub unknown_actions: UnknownActionPolicy,
    /// Abandon sessions older than this many ticks; never when unset
    pub timeout_ticks: Option<u64>,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            dialog_margin: 40,
            dialog_height: 200,
            dialog_x: 20,
            dialog_y: 20,
            unknown_actions: UnknownActionPolicy::Ignore,
            timeout_ticks: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentationConfig {
    pub screen_length: EnvField<u32>,
    /// Ticks a headless dialog stays open; forever when unset
    pub auto_finish_ticks: Option<u32>,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            screen_length: DEFAULT_SCREEN_LENGTH.into(),
            auto_finish_ticks: Some(3),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Milliseconds between ticks
    pub tick_millis: EnvField<u64>,
    /// Stop after this many ticks even if conversations are still open
    pub max_ticks: EnvField<u64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            tick_millis: 100.into(),
            max_ticks: 100.into(),
        }
    }
}
