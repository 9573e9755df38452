// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Run configuration (participant count + log locations)
//!
//! Sources, lowest precedence first: built-in defaults, optional TOML file named by
//! `NEXUS_BARRIER_CONFIG`, then `NEXUS_BARRIER_EVENTS_LOG` / `NEXUS_BARRIER_PIPES_LOG`.
//! The participant count only ever comes from the command line.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Environment variable naming an optional TOML config file.
pub const ENV_CONFIG: &str = "NEXUS_BARRIER_CONFIG";
/// Environment override for the event log path.
pub const ENV_EVENTS_LOG: &str = "NEXUS_BARRIER_EVENTS_LOG";
/// Environment override for the pipe diagnostic log path.
pub const ENV_PIPES_LOG: &str = "NEXUS_BARRIER_PIPES_LOG";

/// Default event log location (relative to the working directory).
pub const DEFAULT_EVENTS_LOG: &str = "events.log";
/// Default pipe diagnostic log location (relative to the working directory).
pub const DEFAULT_PIPES_LOG: &str = "pipes.log";

/// Settings for one barrier run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BarrierConfig {
    /// Number of participants to spawn.
    pub participants: usize,
    /// Append-only protocol event log.
    pub events_log: PathBuf,
    /// Append-only raw pipe endpoint log.
    pub pipes_log: PathBuf,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    events_log: Option<PathBuf>,
    pipes_log: Option<PathBuf>,
}

/// Errors produced while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Location of the config file.
        path: PathBuf,
        /// Underlying operating system error.
        source: std::io::Error,
    },
    /// Config file is not valid TOML for this schema.
    #[error("failed to parse config {path}: {source}")]
    Parse {
        /// Location of the config file.
        path: PathBuf,
        /// Error returned by the TOML deserializer.
        source: toml::de::Error,
    },
}

impl BarrierConfig {
    /// Defaults for `participants` participants.
    pub fn new(participants: usize) -> Self {
        Self {
            participants,
            events_log: PathBuf::from(DEFAULT_EVENTS_LOG),
            pipes_log: PathBuf::from(DEFAULT_PIPES_LOG),
        }
    }

    /// Loads configuration from the process environment.
    pub fn from_env(participants: usize) -> Result<Self, ConfigError> {
        Self::load(participants, |key| std::env::var_os(key).map(PathBuf::from))
    }

    /// Loads configuration using `lookup` in place of the process environment.
    pub fn load<F>(participants: usize, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<PathBuf>,
    {
        let mut config = Self::new(participants);
        if let Some(path) = lookup(ENV_CONFIG) {
            config.apply(read_file(&path)?);
        }
        if let Some(events_log) = lookup(ENV_EVENTS_LOG) {
            config.events_log = events_log;
        }
        if let Some(pipes_log) = lookup(ENV_PIPES_LOG) {
            config.pipes_log = pipes_log;
        }
        Ok(config)
    }

    fn apply(&mut self, raw: RawConfig) {
        if let Some(events_log) = raw.events_log {
            self.events_log = events_log;
        }
        if let Some(pipes_log) = raw.pipes_log {
            self.pipes_log = pipes_log;
        }
    }
}

fn read_file(path: &Path) -> Result<RawConfig, ConfigError> {
    let text = fs::read_to_string(path)
        .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
    toml::from_str(&text).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
}
