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
//! Score box pickup
//!
//! Each frame the player's position is compared against every
//! `ScoreBox` + `Position` entity using squared distance. The score-box array
//! is cut into shards of `shard_size` entities; shard `i` is scanned by one
//! worker that records into command shard `i` only:
//!
//! - a `DestroyEntity` for every box within the pickup radius, in storage
//!   order;
//! - one trailing `AddScore` carrying the shard's partial point sum and
//!   pickup count.
//!
//! Nothing is mutated during the scan. Playback applies shards in index
//! order, so the destroyed set and the final score do not depend on how many
//! shards ran or in which order they finished.

use crate::config::{KernelConfig, DEFAULT_PICKUP_RADIUS, DEFAULT_SHARD_SIZE};
use crate::ecs::components::{Position, ScoreBox};
use crate::ecs::{
    CommandBuffer, CommandShard, ComponentStorage, DenseStorage, Entity, FrameInput, System, World,
};
use crate::error::KernelError;
use std::ops::Add;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// What one scan found
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Boxes within the pickup radius
    pub pickups: usize,
    /// Sum of their points
    pub points: u64,
}

impl Add for ScanSummary {
    type Output = ScanSummary;

    fn add(self, rhs: ScanSummary) -> ScanSummary {
        ScanSummary {
            pickups: self.pickups + rhs.pickups,
            points: self.points.saturating_add(rhs.points),
        }
    }
}

/// Detects pickups and defers their effects to the command buffer
#[derive(Debug, Clone)]
pub struct CollisionSystem {
    threshold_sq: f64,
    shard_size: usize,
    last_scan: ScanSummary,
}

impl CollisionSystem {
    /// Create a collision system with the default radius and shard size
    pub fn new() -> Self {
        CollisionSystem {
            threshold_sq: DEFAULT_PICKUP_RADIUS * DEFAULT_PICKUP_RADIUS,
            shard_size: DEFAULT_SHARD_SIZE,
            last_scan: ScanSummary::default(),
        }
    }

    /// Create a collision system from a config, validating it first
    pub fn from_config(config: &KernelConfig) -> Result<Self, KernelError> {
        config.validate()?;
        Ok(Self::new()
            .with_pickup_radius(config.pickup_radius)?
            .with_shard_size(config.shard_size))
    }

    /// Set the pickup radius in world units
    ///
    /// Fails with `InvalidConfiguration` unless the radius is finite and
    /// non-negative.
    pub fn with_pickup_radius(mut self, radius: f64) -> Result<Self, KernelError> {
        if !radius.is_finite() || radius < 0.0 {
            return Err(KernelError::InvalidConfiguration(format!(
                "pickup radius must be finite and non-negative, got {}",
                radius
            )));
        }
        self.threshold_sq = radius * radius;
        Ok(self)
    }

    /// Set the number of score boxes per shard (minimum 1)
    pub fn with_shard_size(mut self, shard_size: usize) -> Self {
        self.shard_size = shard_size.max(1);
        self
    }

    /// Squared pickup radius
    pub fn threshold_sq(&self) -> f64 {
        self.threshold_sq
    }

    /// Score boxes per shard
    pub fn shard_size(&self) -> usize {
        self.shard_size
    }

    /// Result of the most recent [`scan`](Self::scan)
    pub fn last_scan(&self) -> ScanSummary {
        self.last_scan
    }

    /// Number of shards a scan over `boxes` score boxes uses
    pub fn shard_count(&self, boxes: usize) -> usize {
        if boxes == 0 {
            0
        } else {
            (boxes - 1) / self.shard_size + 1
        }
    }

    /// Scan every score box against the player's position
    ///
    /// Records destroys and per-shard score sums into `commands`; the world is
    /// left untouched until the buffer is played back.
    pub fn scan(&mut self, world: &World, player: Entity, commands: &mut CommandBuffer) -> ScanSummary {
        let store = world.store();
        let Some(&origin) = store.try_get::<Position>(player) else {
            self.last_scan = ScanSummary::default();
            return self.last_scan;
        };

        let positions = store.storage::<Position>();
        let boxes = store.storage::<ScoreBox>();
        let shard_count = self.shard_count(boxes.len());
        let shards = commands.shards_mut(shard_count);
        let probe = Probe {
            origin,
            threshold_sq: self.threshold_sq,
            player,
            positions,
        };

        #[cfg(feature = "parallel")]
        let summary = boxes
            .entities()
            .par_chunks(self.shard_size)
            .zip(boxes.components().par_chunks(self.shard_size))
            .zip(shards.par_iter_mut())
            .map(|((entities, score_boxes), shard)| probe.scan_shard(entities, score_boxes, shard))
            .reduce(ScanSummary::default, Add::add);

        #[cfg(not(feature = "parallel"))]
        let summary = boxes
            .entities()
            .chunks(self.shard_size)
            .zip(boxes.components().chunks(self.shard_size))
            .zip(shards.iter_mut())
            .map(|((entities, score_boxes), shard)| probe.scan_shard(entities, score_boxes, shard))
            .fold(ScanSummary::default(), Add::add);

        self.last_scan = summary;
        summary
    }
}

impl Default for CollisionSystem {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only state shared by every shard of one scan
struct Probe<'a> {
    origin: Position,
    threshold_sq: f64,
    player: Entity,
    positions: &'a DenseStorage<Position>,
}

impl Probe<'_> {
    fn scan_shard(&self, entities: &[Entity], score_boxes: &[ScoreBox], shard: &mut CommandShard) -> ScanSummary {
        let mut summary = ScanSummary::default();
        for (&entity, score_box) in entities.iter().zip(score_boxes) {
            let Some(position) = self.positions.get(entity) else {
                continue;
            };
            if self.origin.distance_squared(position) < self.threshold_sq {
                shard.destroy(entity);
                summary.pickups += 1;
                summary.points = summary.points.saturating_add(u64::from(score_box.points()));
            }
        }
        if summary.points > 0 {
            shard.record_pickups(self.player, summary.pickups, summary.points);
        }
        summary
    }
}

impl System for CollisionSystem {
    fn run(&mut self, _frame: &FrameInput, world: &mut World, commands: &mut CommandBuffer) {
        let Some(player) = world.player() else {
            self.last_scan = ScanSummary::default();
            return;
        };
        let summary = self.scan(world, player, commands);
        if summary.pickups > 0 {
            log::debug!("{} pickups worth {} points", summary.pickups, summary.points);
        }
    }

    fn name(&self) -> &str {
        "collision"
    }
}
