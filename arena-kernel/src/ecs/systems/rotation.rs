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
//! Decoration spin
//!
//! Every entity holding both [`Rotation`] and [`RotationSpeed`] turns about
//! the vertical axis by `speed * dt` degrees per frame. The rotation array is
//! split into shards of `shard_size` entities; each shard is written by one
//! worker and never touches `Position`, so the system can share a stage with
//! movement.

use crate::config::{KernelConfig, DEFAULT_SHARD_SIZE};
use crate::ecs::components::{Rotation, RotationSpeed};
use crate::ecs::{
    CommandBuffer, ComponentStorage, ComponentStore, DenseStorage, Entity, FrameInput, System,
    World,
};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Spins rotating entities in place
#[derive(Debug, Clone)]
pub struct RotationSystem {
    shard_size: usize,
}

impl RotationSystem {
    /// Create a rotation system with the default shard size
    pub fn new() -> Self {
        RotationSystem {
            shard_size: DEFAULT_SHARD_SIZE,
        }
    }

    /// Create a rotation system using the config's shard size
    pub fn from_config(config: &KernelConfig) -> Self {
        Self::new().with_shard_size(config.shard_size)
    }

    /// Set the number of entities per parallel shard (minimum 1)
    pub fn with_shard_size(mut self, shard_size: usize) -> Self {
        self.shard_size = shard_size.max(1);
        self
    }

    /// Entities per shard
    pub fn shard_size(&self) -> usize {
        self.shard_size
    }

    /// Advance every spinning entity by `delta_time` seconds
    ///
    /// Returns the number of entities rotated.
    pub fn spin(&self, store: &mut ComponentStore, delta_time: f64) -> usize {
        let ComponentStore {
            rotations,
            rotation_speeds,
            ..
        } = store;
        let speeds: &DenseStorage<RotationSpeed> = rotation_speeds;
        let (entities, orientations) = rotations.split_mut();

        #[cfg(feature = "parallel")]
        {
            entities
                .par_chunks(self.shard_size)
                .zip(orientations.par_chunks_mut(self.shard_size))
                .map(|(entities, orientations)| spin_shard(entities, orientations, speeds, delta_time))
                .sum()
        }

        #[cfg(not(feature = "parallel"))]
        {
            entities
                .chunks(self.shard_size)
                .zip(orientations.chunks_mut(self.shard_size))
                .map(|(entities, orientations)| spin_shard(entities, orientations, speeds, delta_time))
                .sum()
        }
    }
}

impl Default for RotationSystem {
    fn default() -> Self {
        Self::new()
    }
}

fn spin_shard(
    entities: &[Entity],
    orientations: &mut [Rotation],
    speeds: &DenseStorage<RotationSpeed>,
    delta_time: f64,
) -> usize {
    let mut rotated = 0;
    for (&entity, orientation) in entities.iter().zip(orientations.iter_mut()) {
        if let Some(speed) = speeds.get(entity) {
            orientation.rotate_y(speed.radians_per_second() * delta_time);
            rotated += 1;
        }
    }
    rotated
}

impl System for RotationSystem {
    fn run(&mut self, frame: &FrameInput, world: &mut World, _commands: &mut CommandBuffer) {
        let (_, store) = world.split_mut();
        let rotated = self.spin(store, frame.delta_time());
        log::trace!("rotated {} entities", rotated);
    }

    fn name(&self) -> &str {
        "rotation"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::Position;
    use approx::assert_relative_eq;

    fn spinning_box(world: &mut World, degrees_per_second: f64) -> Entity {
        world
            .spawn_score_box(Position::zero(), 1, Some(degrees_per_second))
            .unwrap()
    }

    fn step(system: &mut RotationSystem, world: &mut World, delta_time: f64) {
        let mut commands = CommandBuffer::new();
        system.run(&FrameInput::idle(delta_time).unwrap(), world, &mut commands);
        assert!(commands.is_empty());
    }

    #[test]
    fn test_fifty_degrees_in_one_second() {
        let mut world = World::new();
        let spinner = spinning_box(&mut world, 50.0);

        let mut system = RotationSystem::new();
        step(&mut system, &mut world, 1.0);

        let rotation = world.get::<Rotation>(spinner).unwrap();
        assert_relative_eq!(rotation.yaw_degrees(), 50.0, epsilon = 1e-9);
        assert_relative_eq!(rotation.magnitude(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rotation_without_speed_is_untouched() {
        let mut world = World::new();
        let still = world.spawn();
        world.insert(still, Rotation::from_yaw_degrees(30.0)).unwrap();

        let mut system = RotationSystem::new();
        step(&mut system, &mut world, 1.0);

        assert_relative_eq!(world.get::<Rotation>(still).unwrap().yaw_degrees(), 30.0, epsilon = 1e-9);
    }

    #[test]
    fn test_unit_norm_after_many_frames() {
        let mut world = World::new();
        let spinners: Vec<Entity> = (0..10)
            .map(|i| spinning_box(&mut world, 17.0 + i as f64 * 13.7))
            .collect();

        let mut system = RotationSystem::new().with_shard_size(3);
        for _ in 0..10_000 {
            step(&mut system, &mut world, 1.0 / 60.0);
        }

        for spinner in spinners {
            let magnitude = world.get::<Rotation>(spinner).unwrap().magnitude();
            assert!((magnitude - 1.0).abs() < 1e-5, "magnitude drifted to {}", magnitude);
        }
    }

    #[test]
    fn test_shard_size_does_not_change_result() {
        let build = || {
            let mut world = World::new();
            for i in 0..50 {
                spinning_box(&mut world, i as f64 * 7.5);
            }
            world
        };

        let mut coarse = build();
        let mut fine = build();
        let (_, store) = coarse.split_mut();
        assert_eq!(RotationSystem::new().with_shard_size(1000).spin(store, 0.25), 50);
        let (_, store) = fine.split_mut();
        assert_eq!(RotationSystem::new().with_shard_size(1).spin(store, 0.25), 50);

        let coarse: Vec<_> = coarse.iter::<(Rotation,)>().map(|(e, (r,))| (e, *r)).collect();
        let fine: Vec<_> = fine.iter::<(Rotation,)>().map(|(e, (r,))| (e, *r)).collect();
        assert_eq!(coarse, fine);
    }

    #[test]
    fn test_zero_shard_size_is_raised_to_one() {
        assert_eq!(RotationSystem::new().with_shard_size(0).shard_size(), 1);
    }
}
