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
//! Player movement
//!
//! Two forms are supported. A player carrying [`MoveSpeed`] moves
//! kinematically: `position += direction * speed * dt`. A player without
//! `MoveSpeed` but with [`MovementForce`] and [`Velocity`] receives an
//! impulse `direction * force / mass` and is then advanced with
//! semi-implicit Euler, `position += velocity * dt`.
//!
//! Only the player entity is touched, so no command buffer is needed.

use crate::config::KernelConfig;
use crate::ecs::components::{Mass, MoveSpeed, MovementForce, Position, Velocity};
use crate::ecs::{CommandBuffer, ComponentStorage, ComponentStore, Entity, FrameInput, System, World};

/// Moves the player from the frame's input axes
#[derive(Debug, Clone, Default)]
pub struct MovementSystem {
    arena_half_extent: Option<f64>,
}

impl MovementSystem {
    /// Create an unbounded movement system
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a movement system using the config's arena bounds
    pub fn from_config(config: &KernelConfig) -> Self {
        MovementSystem {
            arena_half_extent: config.arena_half_extent,
        }
    }

    /// Clamp the player's x/z to `[-half_extent, half_extent]` after moving
    pub fn with_arena_half_extent(mut self, half_extent: f64) -> Self {
        self.arena_half_extent = Some(half_extent);
        self
    }

    /// Arena bound in use, if any
    pub fn arena_half_extent(&self) -> Option<f64> {
        self.arena_half_extent
    }

    /// Move one player entity
    ///
    /// Returns false when the entity lacks the components either movement
    /// form needs.
    pub fn move_player(&self, store: &mut ComponentStore, player: Entity, frame: &FrameInput) -> bool {
        let [dx, dy, dz] = frame.direction();
        let dt = frame.delta_time();

        let delta = match store.move_speeds.get(player).map(MoveSpeed::value) {
            Some(speed) => {
                let step = speed * dt;
                [dx * step, dy * step, dz * step]
            }
            None => match apply_impulse(store, player, frame) {
                Some(velocity) => [velocity.dx() * dt, velocity.dy() * dt, velocity.dz() * dt],
                None => return false,
            },
        };

        let Some(position) = store.positions.get_mut(player) else {
            return false;
        };
        position.translate(delta[0], delta[1], delta[2]);
        if let Some(half_extent) = self.arena_half_extent {
            clamp_to_arena(position, half_extent);
        }
        true
    }
}

/// Kick the player's velocity with this frame's input force
fn apply_impulse(store: &mut ComponentStore, player: Entity, frame: &FrameInput) -> Option<Velocity> {
    let force = store.movement_forces.get(player).map(MovementForce::value)?;
    let inverse_mass = store.masses.get(player).map_or(1.0, Mass::inverse);
    let [dx, dy, dz] = frame.direction();
    let scale = force * inverse_mass;

    let velocity = store.velocities.get_mut(player)?;
    velocity.apply_delta(dx * scale, dy * scale, dz * scale);
    Some(*velocity)
}

fn clamp_to_arena(position: &mut Position, half_extent: f64) {
    position.set_x(position.x().clamp(-half_extent, half_extent));
    position.set_z(position.z().clamp(-half_extent, half_extent));
}

impl System for MovementSystem {
    fn run(&mut self, frame: &FrameInput, world: &mut World, _commands: &mut CommandBuffer) {
        let Some(player) = world.player() else {
            return;
        };
        let (_, store) = world.split_mut();
        if !self.move_player(store, player, frame) {
            log::trace!("{} has no movement components", player);
        }
    }

    fn name(&self) -> &str {
        "movement"
    }
}
