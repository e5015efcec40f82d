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
//! Entity Component System (ECS) core implementation
//!
//! This module provides the foundational ECS architecture including:
//! - Generational entity handles with slot recycling
//! - Dense, cache-friendly component storage with presence masks
//! - A deferred command buffer for structural changes
//! - Staged system execution, with shard-parallel systems via Rayon

mod entity;
mod component;
mod registry;
mod system;
mod world;

pub mod commands;
pub mod components;
pub mod scheduler;
pub mod store;
pub mod systems;

pub use commands::{Command, CommandBuffer, CommandShard, ComponentValue, PlaybackStats};
pub use component::{Component, ComponentKind, ComponentSet, ComponentStorage, DenseStorage};
pub use entity::{Entity, EntityId};
pub use registry::EntityRegistry;
pub use scheduler::{stages, Scheduler, StageId};
pub use store::{ComponentStore, Query};
pub use system::{FrameInput, System};
pub use world::{Renderable, World};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::Position;

    #[test]
    fn test_world_creation() {
        let world = World::new();
        assert_eq!(world.entity_count(), 0);
    }

    #[test]
    fn test_entity_creation() {
        let mut world = World::new();
        let entity = world.spawn();
        assert_eq!(world.entity_count(), 1);
        assert!(world.is_alive(entity));
    }

    #[test]
    fn test_registry_and_store_stay_in_sync() {
        let mut world = World::new();
        let player = world.spawn_player(Position::zero(), 5.0).unwrap();
        let mask = world.registry().components(player).unwrap();
        assert_eq!(mask, ComponentSet::POSITION | ComponentSet::MOVE_SPEED | ComponentSet::PLAYER);

        assert!(world.despawn(player));
        assert_eq!(world.store().len::<Position>(), 0);
    }
}
