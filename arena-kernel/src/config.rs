// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Kernel configuration
//!
//! Tunables for a [`Simulation`](crate::simulation::Simulation): pickup
//! radius, shard granularity for parallel scans, worker count and the
//! optional arena clamp. Values can be built in code or read from TOML.
//!
//! ```toml
//! pickup_radius = 2.0
//! shard_size = 64
//! worker_threads = 4
//! arena_half_extent = 14.0
//! ```

use crate::error::{ConfigError, KernelError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default pickup radius in world units
pub const DEFAULT_PICKUP_RADIUS: f64 = 2.0;

/// Default number of entities per shard
pub const DEFAULT_SHARD_SIZE: usize = 64;

/// Configuration for the simulation kernel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Distance within which the player collects a score box
    pub pickup_radius: f64,
    /// Entities handed to one worker per parallel shard
    pub shard_size: usize,
    /// Dedicated worker count; `None` uses rayon's global pool
    pub worker_threads: Option<usize>,
    /// Clamp the player's x/z to `[-h, h]` after movement
    pub arena_half_extent: Option<f64>,
}

impl Default for KernelConfig {
    fn default() -> Self {
        KernelConfig {
            pickup_radius: DEFAULT_PICKUP_RADIUS,
            shard_size: DEFAULT_SHARD_SIZE,
            worker_threads: None,
            arena_half_extent: None,
        }
    }
}

impl KernelConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pickup radius
    pub fn with_pickup_radius(mut self, radius: f64) -> Self {
        self.pickup_radius = radius;
        self
    }

    /// Set the shard size used by parallel scans
    pub fn with_shard_size(mut self, shard_size: usize) -> Self {
        self.shard_size = shard_size;
        self
    }

    /// Run frames on a dedicated pool with this many workers
    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = Some(threads);
        self
    }

    /// Clamp the player inside a square arena of the given half extent
    pub fn with_arena_half_extent(mut self, half_extent: f64) -> Self {
        self.arena_half_extent = Some(half_extent);
        self
    }

    /// Squared pickup radius, the value the collision scan compares against
    pub fn pickup_threshold_sq(&self) -> f64 {
        self.pickup_radius * self.pickup_radius
    }

    /// Check every value against its documented domain
    pub fn validate(&self) -> Result<(), KernelError> {
        if !self.pickup_radius.is_finite() || self.pickup_radius < 0.0 {
            return Err(KernelError::InvalidConfiguration(format!(
                "pickup radius must be finite and non-negative, got {}",
                self.pickup_radius
            )));
        }
        if self.shard_size == 0 {
            return Err(KernelError::InvalidConfiguration(
                "shard size must be at least 1".to_string(),
            ));
        }
        if self.worker_threads == Some(0) {
            return Err(KernelError::InvalidConfiguration(
                "worker thread count must be at least 1".to_string(),
            ));
        }
        if let Some(extent) = self.arena_half_extent {
            if !extent.is_finite() || extent < 0.0 {
                return Err(KernelError::InvalidConfiguration(format!(
                    "arena half extent must be finite and non-negative, got {}",
                    extent
                )));
            }
        }
        Ok(())
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: KernelConfig =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Render as TOML
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }
}
