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
//! World management
//!
//! The World pairs the [`EntityRegistry`] with the [`ComponentStore`] and keeps
//! them consistent: every component attached through the World is recorded in
//! the entity's presence mask, and destroying an entity drops exactly the
//! storages that mask names. It is constructed once and handed to systems by
//! reference; there is no global "active world".

use crate::ecs::components::{MoveSpeed, Player, Position, Rotation, RotationSpeed, ScoreBox};
use crate::ecs::store::Query;
use crate::ecs::{Component, ComponentKind, ComponentSet, ComponentStore, Entity, EntityRegistry};
use crate::error::KernelError;

/// Position and (optional) orientation of one drawable entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Renderable {
    /// Entity being drawn
    pub entity: Entity,
    /// World location
    pub position: Position,
    /// Orientation, if the entity has one
    pub rotation: Option<Rotation>,
}

/// The main ECS world container
#[derive(Debug, Clone, Default)]
pub struct World {
    registry: EntityRegistry,
    store: ComponentStore,
}

impl World {
    /// Create a new empty world
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a bare entity
    pub fn spawn(&mut self) -> Entity {
        self.registry.create()
    }

    /// Destroy an entity and all its components
    ///
    /// Returns false (and does nothing) if the handle is already dead.
    pub fn despawn(&mut self, entity: Entity) -> bool {
        match self.registry.destroy(entity) {
            Some(components) => {
                self.store.remove_all(entity, components);
                true
            }
            None => false,
        }
    }

    /// Check if an entity is alive
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.registry.is_alive(entity)
    }

    /// Attach or overwrite a component on a live entity
    ///
    /// Fails with `StaleEntityHandle` for dead handles and with
    /// `InvalidConfiguration` when the entity would carry both `Player` and
    /// `ScoreBox`.
    pub fn insert<T: Component>(&mut self, entity: Entity, value: T) -> Result<(), KernelError> {
        let present = self
            .registry
            .components(entity)
            .ok_or(KernelError::StaleEntityHandle(entity))?;
        check_exclusive(entity, present, T::KIND)?;

        self.store.set(entity, value);
        self.registry.mark(entity, T::KIND);
        Ok(())
    }

    /// Detach a component from a live entity
    pub fn remove<T: Component>(&mut self, entity: Entity) -> Result<Option<T>, KernelError> {
        if !self.registry.unmark(entity, T::KIND) {
            return Err(KernelError::StaleEntityHandle(entity));
        }
        Ok(self.store.remove::<T>(entity))
    }

    /// Read a component of a live entity
    pub fn get<T: Component>(&self, entity: Entity) -> Result<&T, KernelError> {
        if !self.registry.is_alive(entity) {
            return Err(KernelError::StaleEntityHandle(entity));
        }
        self.store.get::<T>(entity)
    }

    /// Mutable access to a component of a live entity
    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> Result<&mut T, KernelError> {
        if !self.registry.is_alive(entity) {
            return Err(KernelError::StaleEntityHandle(entity));
        }
        self.store.get_mut::<T>(entity).ok_or(KernelError::MissingComponent {
            entity,
            component: T::KIND,
        })
    }

    /// Check if a live entity carries a component
    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        self.registry
            .components(entity)
            .map_or(false, |present| present.contains(T::KIND.as_set()))
    }

    /// Live entities carrying every kind in `required`
    pub fn query(&self, required: ComponentSet) -> impl Iterator<Item = Entity> + '_ {
        self.registry.query(required)
    }

    /// Lazily iterate component tuples, see [`ComponentStore::iter`]
    pub fn iter<Q: Query>(&self) -> impl Iterator<Item = (Entity, Q::Item<'_>)> + '_ {
        self.store.iter::<Q>()
    }

    /// Create the player entity with the components the frame loop requires
    ///
    /// Fails if a live player already exists.
    pub fn spawn_player(&mut self, position: Position, move_speed: f64) -> Result<Entity, KernelError> {
        if let Some(existing) = self.player() {
            return Err(KernelError::InvalidConfiguration(format!(
                "a player already exists: {}",
                existing
            )));
        }
        let entity = self.spawn();
        self.insert(entity, position)?;
        self.insert(entity, MoveSpeed::new(move_speed))?;
        self.insert(entity, Player::new())?;
        log::debug!("spawned player {} at {:?}", entity, position.as_array());
        Ok(entity)
    }

    /// Create a reward entity, optionally spinning at `rotation_speed` degrees per second
    pub fn spawn_score_box(
        &mut self,
        position: Position,
        points: u32,
        rotation_speed: Option<f64>,
    ) -> Result<Entity, KernelError> {
        let score_box = ScoreBox::try_new(points).ok_or_else(|| {
            KernelError::InvalidConfiguration("score box points must be positive".to_string())
        })?;
        let entity = self.spawn();
        self.insert(entity, position)?;
        self.insert(entity, score_box)?;
        if let Some(speed) = rotation_speed {
            self.insert(entity, Rotation::identity())?;
            self.insert(entity, RotationSpeed::new(speed))?;
        }
        Ok(entity)
    }

    /// The player entity, if one exists
    pub fn player(&self) -> Option<Entity> {
        self.store.players.entities().first().copied()
    }

    /// Number of live entities tagged `Player`
    pub fn player_count(&self) -> usize {
        self.store.players.len()
    }

    /// Player location, for camera follow
    pub fn player_position(&self) -> Option<Position> {
        let player = self.player()?;
        self.store.try_get::<Position>(player).copied()
    }

    /// Player score, for UI display
    pub fn player_score(&self) -> Option<u64> {
        self.store.players.components().first().map(Player::score)
    }

    /// Number of live score boxes
    pub fn score_box_count(&self) -> usize {
        self.store.score_boxes.len()
    }

    /// Every entity with a position, for draw submission
    pub fn renderables(&self) -> impl Iterator<Item = Renderable> + '_ {
        self.store.positions.iter().map(move |(entity, position)| Renderable {
            entity,
            position: *position,
            rotation: self.store.try_get::<Rotation>(entity).copied(),
        })
    }

    /// Get the number of live entities
    pub fn entity_count(&self) -> usize {
        self.registry.len()
    }

    /// The entity registry
    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    /// The component store
    pub fn store(&self) -> &ComponentStore {
        &self.store
    }

    /// Registry and store borrowed together, the store mutably
    ///
    /// Systems use this to write components of a fixed, known set of
    /// entities. It must not be used to attach or detach components, since
    /// those changes bypass the registry's presence masks.
    pub(crate) fn split_mut(&mut self) -> (&EntityRegistry, &mut ComponentStore) {
        (&self.registry, &mut self.store)
    }

    /// Remove all entities and components
    pub fn clear(&mut self) {
        self.registry.clear();
        self.store.clear();
    }
}

fn check_exclusive(entity: Entity, present: ComponentSet, kind: ComponentKind) -> Result<(), KernelError> {
    let conflict = match kind {
        ComponentKind::Player => present.contains(ComponentSet::SCORE_BOX),
        ComponentKind::ScoreBox => present.contains(ComponentSet::PLAYER),
        _ => false,
    };
    if conflict {
        return Err(KernelError::InvalidConfiguration(format!(
            "{} cannot carry both Player and ScoreBox",
            entity
        )));
    }
    Ok(())
}
