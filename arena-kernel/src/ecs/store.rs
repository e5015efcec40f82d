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
//! Component store
//!
//! One [`DenseStorage`] per component kind, resolved statically through the
//! [`Component`] trait. The store only owns component memory; which entities
//! are alive is the [`EntityRegistry`](crate::ecs::EntityRegistry)'s business,
//! and [`World`](crate::ecs::World) keeps the two in sync.
//!
//! Multi-component iteration goes through the [`Query`] trait, implemented for
//! tuples of component types:
//!
//! ```
//! use arena_kernel::ecs::{ComponentStore, Entity};
//! use arena_kernel::ecs::components::{Position, ScoreBox};
//!
//! let mut store = ComponentStore::new();
//! let reward = Entity::new(0, 0);
//! store.set(reward, Position::new(1.0, 0.5, 0.0));
//! store.set(reward, ScoreBox::new(2));
//!
//! let total: u32 = store
//!     .iter::<(Position, ScoreBox)>()
//!     .map(|(_, (_, score_box))| score_box.points())
//!     .sum();
//! assert_eq!(total, 2);
//! ```

use crate::ecs::commands::ComponentValue;
use crate::ecs::components::{
    Mass, MoveSpeed, MovementForce, Player, Position, Rotation, RotationSpeed, ScoreBox, Velocity,
};
use crate::ecs::{Component, ComponentKind, ComponentSet, ComponentStorage, DenseStorage, Entity};
use crate::error::KernelError;

/// Dense storage for every component of the game's data model
#[derive(Debug, Clone, Default)]
pub struct ComponentStore {
    pub(crate) positions: DenseStorage<Position>,
    pub(crate) rotations: DenseStorage<Rotation>,
    pub(crate) move_speeds: DenseStorage<MoveSpeed>,
    pub(crate) rotation_speeds: DenseStorage<RotationSpeed>,
    pub(crate) players: DenseStorage<Player>,
    pub(crate) score_boxes: DenseStorage<ScoreBox>,
    pub(crate) velocities: DenseStorage<Velocity>,
    pub(crate) masses: DenseStorage<Mass>,
    pub(crate) movement_forces: DenseStorage<MovementForce>,
}

macro_rules! impl_component {
    ($ty:ident, $field:ident) => {
        impl Component for $ty {
            const KIND: ComponentKind = ComponentKind::$ty;

            fn storage(store: &ComponentStore) -> &DenseStorage<Self> {
                &store.$field
            }

            fn storage_mut(store: &mut ComponentStore) -> &mut DenseStorage<Self> {
                &mut store.$field
            }

            fn into_value(self) -> ComponentValue {
                ComponentValue::$ty(self)
            }
        }
    };
    ($ty:ident, $field:ident, owned) => {
        impl Component for $ty {
            const KIND: ComponentKind = ComponentKind::$ty;

            fn storage(store: &ComponentStore) -> &DenseStorage<Self> {
                &store.$field
            }

            fn storage_mut(store: &mut ComponentStore) -> &mut DenseStorage<Self> {
                &mut store.$field
            }

            fn into_value(self) -> ComponentValue {
                ComponentValue::$ty(self)
            }

            fn bind(&mut self, owner: Entity) {
                self.bind_owner(owner);
            }
        }
    };
}

impl_component!(Position, positions);
impl_component!(Rotation, rotations);
impl_component!(MoveSpeed, move_speeds);
impl_component!(RotationSpeed, rotation_speeds);
impl_component!(Player, players, owned);
impl_component!(ScoreBox, score_boxes, owned);
impl_component!(Velocity, velocities);
impl_component!(Mass, masses);
impl_component!(MovementForce, movement_forces);

impl ComponentStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach or overwrite a component
    pub fn set<T: Component>(&mut self, entity: Entity, mut value: T) {
        value.bind(entity);
        T::storage_mut(self).insert(entity, value);
    }

    /// Read a component, failing with `MissingComponent` if absent
    pub fn get<T: Component>(&self, entity: Entity) -> Result<&T, KernelError> {
        self.try_get(entity).ok_or(KernelError::MissingComponent {
            entity,
            component: T::KIND,
        })
    }

    /// Read a component if present
    pub fn try_get<T: Component>(&self, entity: Entity) -> Option<&T> {
        T::storage(self).get(entity)
    }

    /// Mutable access to a component if present
    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        T::storage_mut(self).get_mut(entity)
    }

    /// Check if an entity carries a component
    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        T::storage(self).contains(entity)
    }

    /// Detach a component, returning it if it was present
    pub fn remove<T: Component>(&mut self, entity: Entity) -> Option<T> {
        T::storage_mut(self).remove(entity)
    }

    /// Detach a component by kind
    pub fn remove_kind(&mut self, entity: Entity, kind: ComponentKind) -> bool {
        match kind {
            ComponentKind::Position => self.positions.remove(entity).is_some(),
            ComponentKind::Rotation => self.rotations.remove(entity).is_some(),
            ComponentKind::MoveSpeed => self.move_speeds.remove(entity).is_some(),
            ComponentKind::RotationSpeed => self.rotation_speeds.remove(entity).is_some(),
            ComponentKind::Player => self.players.remove(entity).is_some(),
            ComponentKind::ScoreBox => self.score_boxes.remove(entity).is_some(),
            ComponentKind::Velocity => self.velocities.remove(entity).is_some(),
            ComponentKind::Mass => self.masses.remove(entity).is_some(),
            ComponentKind::MovementForce => self.movement_forces.remove(entity).is_some(),
        }
    }

    /// Detach every component in `kinds`
    pub fn remove_all(&mut self, entity: Entity, kinds: ComponentSet) {
        for kind in kinds.kinds() {
            self.remove_kind(entity, kind);
        }
    }

    /// Storage for one component type
    pub fn storage<T: Component>(&self) -> &DenseStorage<T> {
        T::storage(self)
    }

    /// Number of stored components of one type
    pub fn len<T: Component>(&self) -> usize {
        T::storage(self).len()
    }

    /// Lazily iterate entities carrying every component of `Q`
    ///
    /// Iteration walks the smallest participating storage and looks the
    /// others up, so the order is storage order of that driver and carries
    /// no meaning. Each call starts a fresh pass.
    pub fn iter<Q: Query>(&self) -> impl Iterator<Item = (Entity, Q::Item<'_>)> + '_ {
        Q::driver(self)
            .iter()
            .filter_map(move |&entity| Q::fetch(self, entity).map(|item| (entity, item)))
    }

    /// Run `f` for every entity matching `Q`
    pub fn for_each<Q: Query>(&self, mut f: impl FnMut(Entity, Q::Item<'_>)) {
        for (entity, item) in self.iter::<Q>() {
            f(entity, item);
        }
    }

    /// Drop every component
    pub fn clear(&mut self) {
        self.positions.clear();
        self.rotations.clear();
        self.move_speeds.clear();
        self.rotation_speeds.clear();
        self.players.clear();
        self.score_boxes.clear();
        self.velocities.clear();
        self.masses.clear();
        self.movement_forces.clear();
    }
}

/// A set of component types fetched together
///
/// Implemented for tuples of one to four [`Component`] types. `Item` is the
/// matching tuple of shared references.
pub trait Query: 'static {
    /// References yielded per matching entity
    type Item<'a>;

    /// Kinds an entity must carry to match
    fn required() -> ComponentSet;

    /// Entity list driving iteration (the smallest participating storage)
    fn driver(store: &ComponentStore) -> &[Entity];

    /// Fetch all components for one entity, `None` if any is missing
    fn fetch(store: &ComponentStore, entity: Entity) -> Option<Self::Item<'_>>;
}

macro_rules! impl_query {
    ($($name:ident),+) => {
        impl<$($name: Component),+> Query for ($($name,)+) {
            type Item<'a> = ($(&'a $name,)+);

            fn required() -> ComponentSet {
                ComponentSet::empty() $(| $name::KIND.as_set())+
            }

            fn driver(store: &ComponentStore) -> &[Entity] {
                let mut best: Option<&[Entity]> = None;
                $(
                    let candidate = $name::storage(store).entities();
                    best = match best {
                        Some(current) if current.len() <= candidate.len() => Some(current),
                        _ => Some(candidate),
                    };
                )+
                best.unwrap_or(&[])
            }

            fn fetch(store: &ComponentStore, entity: Entity) -> Option<Self::Item<'_>> {
                Some(($($name::storage(store).get(entity)?,)+))
            }
        }
    };
}

impl_query!(A);
impl_query!(A, B);
impl_query!(A, B, C);
impl_query!(A, B, C, D);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_has_remove() {
        let mut store = ComponentStore::new();
        let entity = Entity::new(0, 0);

        assert!(!store.has::<Position>(entity));
        store.set(entity, Position::new(1.0, 2.0, 3.0));
        assert!(store.has::<Position>(entity));
        assert_eq!(store.get::<Position>(entity).unwrap().y(), 2.0);

        assert_eq!(store.remove::<Position>(entity), Some(Position::new(1.0, 2.0, 3.0)));
        assert!(!store.has::<Position>(entity));
    }

    #[test]
    fn test_get_missing_component() {
        let store = ComponentStore::new();
        let entity = Entity::new(5, 0);
        let err = store.get::<MoveSpeed>(entity).unwrap_err();
        assert_eq!(
            err,
            KernelError::MissingComponent {
                entity,
                component: ComponentKind::MoveSpeed
            }
        );
    }

    #[test]
    fn test_set_binds_owner() {
        let mut store = ComponentStore::new();
        let player = Entity::new(0, 0);
        let reward = Entity::new(1, 0);
        store.set(player, Player::new());
        store.set(reward, ScoreBox::new(3));

        assert_eq!(store.get::<Player>(player).unwrap().owner(), Some(player));
        assert_eq!(store.get::<ScoreBox>(reward).unwrap().owner(), Some(reward));
    }

    #[test]
    fn test_query_filters_on_all_components() {
        let mut store = ComponentStore::new();
        let spinning = Entity::new(0, 0);
        let still = Entity::new(1, 0);

        store.set(spinning, Rotation::identity());
        store.set(spinning, RotationSpeed::new(50.0));
        store.set(still, Rotation::identity());

        let matched: Vec<Entity> = store
            .iter::<(Rotation, RotationSpeed)>()
            .map(|(entity, _)| entity)
            .collect();
        assert_eq!(matched, vec![spinning]);
        assert_eq!(store.iter::<(Rotation,)>().count(), 2);
    }

    #[test]
    fn test_query_is_restartable() {
        let mut store = ComponentStore::new();
        for i in 0..3 {
            store.set(Entity::new(i, 0), Position::zero());
        }
        assert_eq!(store.iter::<(Position,)>().count(), 3);
        assert_eq!(store.iter::<(Position,)>().count(), 3);
    }

    #[test]
    fn test_query_required_mask() {
        assert_eq!(
            <(Position, ScoreBox)>::required(),
            ComponentSet::POSITION | ComponentSet::SCORE_BOX
        );
    }

    #[test]
    fn test_for_each_sums_points() {
        let mut store = ComponentStore::new();
        for i in 0..4u32 {
            let entity = Entity::new(i, 0);
            store.set(entity, Position::zero());
            store.set(entity, ScoreBox::new(i + 1));
        }
        let mut total = 0;
        store.for_each::<(Position, ScoreBox)>(|_, (_, score_box)| total += score_box.points());
        assert_eq!(total, 10);
    }

    #[test]
    fn test_remove_all() {
        let mut store = ComponentStore::new();
        let entity = Entity::new(0, 0);
        store.set(entity, Position::zero());
        store.set(entity, Rotation::identity());
        store.remove_all(entity, ComponentSet::POSITION | ComponentSet::ROTATION);
        assert_eq!(store.len::<Position>(), 0);
        assert_eq!(store.len::<Rotation>(), 0);
    }
}
