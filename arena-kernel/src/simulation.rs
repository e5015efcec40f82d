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
//! Frame driver
//!
//! [`Simulation`] owns everything one game session needs: the world, the
//! staged scheduler with the three gameplay systems, the command buffer that
//! is reused every frame, and optionally a dedicated Rayon pool. The embedding
//! layer calls [`Simulation::step`] once per frame and reads the player's
//! position, score and the renderables back from [`Simulation::world`].

use crate::config::KernelConfig;
use crate::ecs::components::Position;
use crate::ecs::scheduler::stages;
use crate::ecs::systems::{CollisionSystem, MovementSystem, RotationSystem};
use crate::ecs::{CommandBuffer, FrameInput, PlaybackStats, Scheduler, StageId, System, World};
use crate::error::{KernelError, Result};

/// Summary of one simulated frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    /// 1-based frame number
    pub frame: u64,
    /// Score boxes collected by the pickup scan this frame
    pub pickups: usize,
    /// Points added this frame
    pub score_delta: u64,
    /// Player score after the frame
    pub score: u64,
    /// Command playback details
    pub playback: PlaybackStats,
}

/// A running game session
pub struct Simulation {
    world: World,
    scheduler: Scheduler,
    commands: CommandBuffer,
    config: KernelConfig,
    frame: u64,
    #[cfg(feature = "parallel")]
    pool: Option<rayon::ThreadPool>,
}

impl Simulation {
    /// Create a session with an empty world and the default systems
    ///
    /// Fails with `InvalidConfiguration` if the config does not validate or
    /// the worker pool cannot be built.
    pub fn new(config: KernelConfig) -> Result<Self> {
        Self::with_world(config, World::new())
    }

    /// Create a session around an already populated world
    pub fn with_world(config: KernelConfig, world: World) -> Result<Self> {
        config.validate()?;

        let mut scheduler = Scheduler::new();
        scheduler.add_system(MovementSystem::from_config(&config), stages::MOTION);
        scheduler.add_system(RotationSystem::from_config(&config), stages::MOTION);
        scheduler.add_system(CollisionSystem::from_config(&config)?, stages::COLLISION);

        Ok(Simulation {
            world,
            scheduler,
            commands: CommandBuffer::new(),
            #[cfg(feature = "parallel")]
            pool: build_pool(&config)?,
            config,
            frame: 0,
        })
    }

    /// The world, for reading outputs
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The world, for setup between frames
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Active configuration
    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    /// Number of frames stepped so far
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Register an extra system, run in registration order within its stage
    pub fn add_system<S: System + 'static>(&mut self, system: S, stage: StageId) {
        self.scheduler.add_system(system, stage);
    }

    /// Check the frame-start contract: exactly one player, with a position
    pub fn validate_world(&self) -> Result<()> {
        match self.world.player_count() {
            1 => {}
            0 => {
                return Err(KernelError::InvalidConfiguration(
                    "no player entity exists".to_string(),
                ))
            }
            n => {
                return Err(KernelError::InvalidConfiguration(format!(
                    "expected exactly one player entity, found {}",
                    n
                )))
            }
        }
        let player = self.world.player().ok_or_else(|| {
            KernelError::InvalidConfiguration("no player entity exists".to_string())
        })?;
        if !self.world.has::<Position>(player) {
            return Err(KernelError::InvalidConfiguration(format!(
                "player {} has no position",
                player
            )));
        }
        Ok(())
    }

    /// Advance one frame
    ///
    /// Runs movement and rotation, then the collision scan, then plays the
    /// command buffer back. The world is left untouched when the frame-start
    /// contract is violated.
    pub fn step(&mut self, frame: FrameInput) -> Result<FrameReport> {
        self.validate_world()?;
        let score_before = self.world.player_score().unwrap_or(0);

        let playback = self.run_stages(&frame);

        self.frame += 1;
        let score = self.world.player_score().unwrap_or(0);
        let report = FrameReport {
            frame: self.frame,
            pickups: playback.pickups,
            score_delta: score.saturating_sub(score_before),
            score,
            playback,
        };
        log::debug!(
            "frame {}: {} pickups, score {} (+{})",
            report.frame,
            report.pickups,
            report.score,
            report.score_delta
        );
        Ok(report)
    }

    /// Validate raw input and advance one frame
    pub fn step_with(&mut self, delta_time: f64, horizontal: f64, vertical: f64) -> Result<FrameReport> {
        let frame = FrameInput::new(delta_time, horizontal, vertical)?;
        self.step(frame)
    }

    #[cfg(feature = "parallel")]
    fn run_stages(&mut self, frame: &FrameInput) -> PlaybackStats {
        let Simulation {
            world,
            scheduler,
            commands,
            pool,
            ..
        } = self;
        match pool {
            Some(pool) => pool.install(|| scheduler.run_frame(frame, world, commands)),
            None => scheduler.run_frame(frame, world, commands),
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn run_stages(&mut self, frame: &FrameInput) -> PlaybackStats {
        self.scheduler.run_frame(frame, &mut self.world, &mut self.commands)
    }
}

#[cfg(feature = "parallel")]
fn build_pool(config: &KernelConfig) -> Result<Option<rayon::ThreadPool>> {
    let Some(threads) = config.worker_threads else {
        return Ok(None);
    };
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|index| format!("arena-worker-{}", index))
        .build()
        .map(Some)
        .map_err(|e| KernelError::InvalidConfiguration(format!("cannot build worker pool: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn session() -> Simulation {
        let mut sim = Simulation::new(KernelConfig::default()).unwrap();
        sim.world_mut()
            .spawn_player(Position::new(0.0, 0.5, 0.0), 15.0)
            .unwrap();
        sim
    }

    #[test]
    fn test_step_moves_then_collects() {
        let mut sim = session();
        // Out of reach at frame start, within reach after moving 1.5 along +x
        let reward = sim
            .world_mut()
            .spawn_score_box(Position::new(3.0, 0.5, 0.0), 4, Some(90.0))
            .unwrap();

        let report = sim.step_with(0.1, 1.0, 0.0).unwrap();
        assert_eq!(report.frame, 1);
        assert_eq!(report.pickups, 1);
        assert_eq!(report.score_delta, 4);
        assert_eq!(report.score, 4);
        assert_eq!(report.playback.destroyed, vec![reward]);
        assert!(!sim.world().is_alive(reward));
        assert_relative_eq!(sim.world().player_position().unwrap().x(), 1.5, epsilon = 1e-9);
    }

    #[test]
    fn test_missing_player_is_fatal() {
        let mut sim = Simulation::new(KernelConfig::default()).unwrap();
        let err = sim.step(FrameInput::idle(0.016).unwrap()).unwrap_err();
        assert!(matches!(err, KernelError::InvalidConfiguration(_)));
        assert_eq!(sim.frame_count(), 0);
    }

    #[test]
    fn test_two_players_is_fatal() {
        let mut sim = session();
        let second = sim.world_mut().spawn();
        sim.world_mut().insert(second, crate::ecs::components::Player::new()).unwrap();
        assert!(matches!(
            sim.step_with(0.016, 0.0, 0.0),
            Err(KernelError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_player_without_position_is_fatal() {
        let mut sim = Simulation::new(KernelConfig::default()).unwrap();
        let player = sim.world_mut().spawn();
        sim.world_mut().insert(player, crate::ecs::components::Player::new()).unwrap();
        assert!(sim.validate_world().is_err());
    }

    #[test]
    fn test_bad_input_is_rejected() {
        let mut sim = session();
        assert!(matches!(
            sim.step_with(-1.0, 0.0, 0.0),
            Err(KernelError::InvalidFrameInput(_))
        ));
        assert_eq!(sim.frame_count(), 0);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = KernelConfig::new().with_pickup_radius(-1.0);
        assert!(Simulation::new(config).is_err());
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_dedicated_pool() {
        let config = KernelConfig::new().with_worker_threads(2).with_shard_size(1);
        let mut sim = Simulation::new(config).unwrap();
        sim.world_mut().spawn_player(Position::zero(), 1.0).unwrap();
        for i in 0..10 {
            sim.world_mut()
                .spawn_score_box(Position::new(0.1 * i as f64, 0.0, 0.0), 1, None)
                .unwrap();
        }

        let report = sim.step_with(0.0, 0.0, 0.0).unwrap();
        assert_eq!(report.pickups, 10);
        assert_eq!(report.score, 10);
    }

    #[test]
    fn test_arena_bound_from_config() {
        let config = KernelConfig::new().with_arena_half_extent(1.0);
        let mut sim = Simulation::new(config).unwrap();
        sim.world_mut().spawn_player(Position::zero(), 100.0).unwrap();
        sim.step_with(1.0, -1.0, 1.0).unwrap();

        let position = sim.world().player_position().unwrap();
        assert_eq!(position.x(), -1.0);
        assert_eq!(position.z(), 1.0);
    }

    struct Sweeper;

    impl System for Sweeper {
        fn run(&mut self, _frame: &FrameInput, world: &mut World, commands: &mut CommandBuffer) {
            for entity in world.query(crate::ecs::ComponentSet::ROTATION) {
                commands.shard_mut(0).destroy(entity);
            }
        }
    }

    #[test]
    fn test_pickups_exclude_other_destroys() {
        let mut sim = session();
        sim.add_system(Sweeper, stages::POST_PROCESS);
        let near = sim
            .world_mut()
            .spawn_score_box(Position::new(1.0, 0.5, 0.0), 2, None)
            .unwrap();
        let decoration = sim
            .world_mut()
            .spawn_score_box(Position::new(30.0, 0.5, 0.0), 1, Some(45.0))
            .unwrap();

        let report = sim.step_with(0.0, 0.0, 0.0).unwrap();
        assert_eq!(report.playback.destroyed.len(), 2);
        assert_eq!(report.pickups, 1);
        assert_eq!(report.score_delta, 2);
        assert!(!sim.world().is_alive(near));
        assert!(!sim.world().is_alive(decoration));
    }
}
