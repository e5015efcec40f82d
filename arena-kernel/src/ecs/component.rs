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
//! Component storage and management
//!
//! Components are plain data records attached to entities. Every component
//! type lives in its own [`DenseStorage`], a sparse set that keeps the values
//! packed in one contiguous array so systems can walk them (or split them into
//! shards) without chasing pointers.

use crate::ecs::commands::ComponentValue;
use crate::ecs::store::ComponentStore;
use crate::ecs::Entity;
use bitflags::bitflags;
use std::fmt;

/// Identifies one component type of the game's data model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// World location
    Position,
    /// Orientation quaternion
    Rotation,
    /// Player locomotion multiplier
    MoveSpeed,
    /// Spin rate of decorations
    RotationSpeed,
    /// Player tag carrying the score
    Player,
    /// Reward tag carrying the points
    ScoreBox,
    /// Linear velocity (force-driven movement)
    Velocity,
    /// Mass (force-driven movement)
    Mass,
    /// Impulse strength (force-driven movement)
    MovementForce,
}

impl ComponentKind {
    /// Every kind, in storage order
    pub const ALL: [ComponentKind; 9] = [
        ComponentKind::Position,
        ComponentKind::Rotation,
        ComponentKind::MoveSpeed,
        ComponentKind::RotationSpeed,
        ComponentKind::Player,
        ComponentKind::ScoreBox,
        ComponentKind::Velocity,
        ComponentKind::Mass,
        ComponentKind::MovementForce,
    ];

    /// The single-bit set for this kind
    pub fn as_set(self) -> ComponentSet {
        match self {
            ComponentKind::Position => ComponentSet::POSITION,
            ComponentKind::Rotation => ComponentSet::ROTATION,
            ComponentKind::MoveSpeed => ComponentSet::MOVE_SPEED,
            ComponentKind::RotationSpeed => ComponentSet::ROTATION_SPEED,
            ComponentKind::Player => ComponentSet::PLAYER,
            ComponentKind::ScoreBox => ComponentSet::SCORE_BOX,
            ComponentKind::Velocity => ComponentSet::VELOCITY,
            ComponentKind::Mass => ComponentSet::MASS,
            ComponentKind::MovementForce => ComponentSet::MOVEMENT_FORCE,
        }
    }

    /// Human readable name
    pub fn name(self) -> &'static str {
        match self {
            ComponentKind::Position => "Position",
            ComponentKind::Rotation => "Rotation",
            ComponentKind::MoveSpeed => "MoveSpeed",
            ComponentKind::RotationSpeed => "RotationSpeed",
            ComponentKind::Player => "Player",
            ComponentKind::ScoreBox => "ScoreBox",
            ComponentKind::Velocity => "Velocity",
            ComponentKind::Mass => "Mass",
            ComponentKind::MovementForce => "MovementForce",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

bitflags! {
    /// Set of component kinds, used both as an entity's presence mask and as
    /// the "all of these" filter of registry queries.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ComponentSet: u16 {
        /// [`ComponentKind::Position`]
        const POSITION = 1 << 0;
        /// [`ComponentKind::Rotation`]
        const ROTATION = 1 << 1;
        /// [`ComponentKind::MoveSpeed`]
        const MOVE_SPEED = 1 << 2;
        /// [`ComponentKind::RotationSpeed`]
        const ROTATION_SPEED = 1 << 3;
        /// [`ComponentKind::Player`]
        const PLAYER = 1 << 4;
        /// [`ComponentKind::ScoreBox`]
        const SCORE_BOX = 1 << 5;
        /// [`ComponentKind::Velocity`]
        const VELOCITY = 1 << 6;
        /// [`ComponentKind::Mass`]
        const MASS = 1 << 7;
        /// [`ComponentKind::MovementForce`]
        const MOVEMENT_FORCE = 1 << 8;
    }
}

impl ComponentSet {
    /// Kinds contained in this set, in storage order
    pub fn kinds(self) -> impl Iterator<Item = ComponentKind> {
        ComponentKind::ALL
            .into_iter()
            .filter(move |kind| self.contains(kind.as_set()))
    }
}

impl From<ComponentKind> for ComponentSet {
    fn from(kind: ComponentKind) -> Self {
        kind.as_set()
    }
}

/// Trait that all components must implement
///
/// Components are small `Copy` records without behavior. The trait ties each
/// type to its [`ComponentKind`] and to the storage slot it occupies inside the
/// [`ComponentStore`], which is what lets `ComponentStore::set::<T>` and friends
/// resolve statically without any type-erased lookup.
pub trait Component: 'static + Send + Sync + Copy + fmt::Debug {
    /// Kind tag of this component type
    const KIND: ComponentKind;

    /// Storage holding every value of this type
    fn storage(store: &ComponentStore) -> &DenseStorage<Self>;

    /// Mutable storage holding every value of this type
    fn storage_mut(store: &mut ComponentStore) -> &mut DenseStorage<Self>;

    /// Wrap the value for deferred application through a command buffer
    fn into_value(self) -> ComponentValue;

    /// Record the owning entity in components that carry a back-reference
    fn bind(&mut self, _owner: Entity) {}
}

/// Storage interface for components
pub trait ComponentStorage: Send + Sync {
    /// The component type this storage manages
    type Component: Component;

    /// Insert a component for the given entity, replacing any previous value
    fn insert(&mut self, entity: Entity, component: Self::Component);

    /// Remove a component for the given entity
    fn remove(&mut self, entity: Entity) -> Option<Self::Component>;

    /// Get a reference to a component for the given entity
    fn get(&self, entity: Entity) -> Option<&Self::Component>;

    /// Get a mutable reference to a component for the given entity
    fn get_mut(&mut self, entity: Entity) -> Option<&mut Self::Component>;

    /// Check if an entity has this component
    fn contains(&self, entity: Entity) -> bool;

    /// Clear all components
    fn clear(&mut self);
}

const EMPTY: u32 = u32::MAX;

/// Dense, cache-friendly component storage
///
/// A sparse set: `sparse` maps an entity's slot index to a position in the
/// packed `entities`/`components` arrays. Removal swaps the last element into
/// the hole, so the packed arrays never contain gaps and iteration order is
/// storage order.
///
/// ```text
/// sparse:     [0, -, 2, 1]        indexed by entity slot
/// entities:   [e0, e3, e2]        packed
/// components: [c0, c3, c2]        packed, same order
/// ```
///
/// A slot holds at most one generation at a time. Inserting for a newer
/// generation of an occupied slot overwrites the stale occupant.
///
/// # Example
///
/// ```
/// use arena_kernel::ecs::{Entity, ComponentStorage, DenseStorage};
/// use arena_kernel::ecs::components::Position;
///
/// let mut storage = DenseStorage::<Position>::new();
/// let entity = Entity::new(1, 0);
///
/// storage.insert(entity, Position::new(1.0, 2.0, 3.0));
/// assert!(storage.contains(entity));
/// assert_eq!(storage.get(entity).unwrap().x(), 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct DenseStorage<T: Component> {
    sparse: Vec<u32>,
    entities: Vec<Entity>,
    components: Vec<T>,
}

impl<T: Component> DenseStorage<T> {
    /// Create a new empty storage
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a new storage with room for `capacity` components
    pub fn with_capacity(capacity: usize) -> Self {
        DenseStorage {
            sparse: Vec::with_capacity(capacity),
            entities: Vec::with_capacity(capacity),
            components: Vec::with_capacity(capacity),
        }
    }

    /// Get the number of components stored
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Check if the storage is empty
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Reserve space for at least `additional` more components
    ///
    /// The slot index is sized for `len() + additional` slots, matching
    /// `with_capacity`; entities with higher slot indices still grow it.
    pub fn reserve(&mut self, additional: usize) {
        let slots = self.components.len().saturating_add(additional);
        self.sparse.reserve(slots.saturating_sub(self.sparse.len()));
        self.entities.reserve(additional);
        self.components.reserve(additional);
    }

    /// Entities owning a component, in storage order
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// The packed component array, in the same order as [`entities`](Self::entities)
    pub fn components(&self) -> &[T] {
        &self.components
    }

    /// Mutable packed component array
    pub fn components_mut(&mut self) -> &mut [T] {
        &mut self.components
    }

    /// Entities alongside their mutable components
    ///
    /// Both slices share one order, so they can be chunked in lockstep to
    /// hand disjoint shards to parallel workers.
    pub fn split_mut(&mut self) -> (&[Entity], &mut [T]) {
        (&self.entities, &mut self.components)
    }

    /// Iterate `(entity, component)` pairs in storage order
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> + '_ {
        self.entities.iter().copied().zip(self.components.iter())
    }

    /// Iterate `(entity, component)` pairs mutably in storage order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Entity, &mut T)> + '_ {
        self.entities.iter().copied().zip(self.components.iter_mut())
    }

    /// Get the packed index for an entity, if it has a component here
    pub fn get_index(&self, entity: Entity) -> Option<usize> {
        let index = *self.sparse.get(entity.index())?;
        if index == EMPTY {
            return None;
        }
        let index = index as usize;
        (self.entities[index] == entity).then_some(index)
    }

    fn slot(&self, entity: Entity) -> Option<usize> {
        match self.sparse.get(entity.index()) {
            Some(&index) if index != EMPTY => Some(index as usize),
            _ => None,
        }
    }
}

impl<T: Component> Default for DenseStorage<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Component> ComponentStorage for DenseStorage<T> {
    type Component = T;

    fn insert(&mut self, entity: Entity, component: T) {
        if let Some(index) = self.slot(entity) {
            // Same slot: either an update or a newer generation replacing a stale one
            self.entities[index] = entity;
            self.components[index] = component;
            return;
        }

        let slot = entity.index();
        if slot >= self.sparse.len() {
            self.sparse.resize(slot + 1, EMPTY);
        }
        self.sparse[slot] = self.components.len() as u32;
        self.entities.push(entity);
        self.components.push(component);

        debug_assert_eq!(self.entities.len(), self.components.len());
    }

    fn remove(&mut self, entity: Entity) -> Option<T> {
        let index = self.get_index(entity)?;
        let last = self.components.len() - 1;

        if index != last {
            let moved = self.entities[last];
            self.sparse[moved.index()] = index as u32;
        }
        self.sparse[entity.index()] = EMPTY;
        self.entities.swap_remove(index);
        let component = self.components.swap_remove(index);

        debug_assert_eq!(self.entities.len(), self.components.len());
        Some(component)
    }

    fn get(&self, entity: Entity) -> Option<&T> {
        let index = self.get_index(entity)?;
        Some(&self.components[index])
    }

    fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        let index = self.get_index(entity)?;
        Some(&mut self.components[index])
    }

    fn contains(&self, entity: Entity) -> bool {
        self.get_index(entity).is_some()
    }

    fn clear(&mut self) {
        self.sparse.clear();
        self.entities.clear();
        self.components.clear();
    }
}
