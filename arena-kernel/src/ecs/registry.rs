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
//! Entity registry
//!
//! Allocates entity handles, recycles freed slots and records which
//! component kinds each live entity carries. Destroying an entity bumps its
//! slot's generation, so handles issued before the destruction stop matching.

use crate::ecs::{ComponentKind, ComponentSet, Entity};

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    alive: bool,
    components: ComponentSet,
}

/// Existence and generation bookkeeping for every entity
#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    slots: Vec<Slot>,
    free: Vec<u32>,
    alive: usize,
}

impl EntityRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a handle, reusing a freed slot when one is available
    pub fn create(&mut self) -> Entity {
        self.alive += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.alive = true;
            slot.components = ComponentSet::empty();
            return Entity::new(index, slot.generation);
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            alive: true,
            components: ComponentSet::empty(),
        });
        Entity::new(index, 0)
    }

    /// Destroy an entity
    ///
    /// Returns the component kinds it carried so the caller can drop their
    /// storage, or `None` if the handle was already dead (a no-op). A slot
    /// whose generation counter is exhausted is retired instead of recycled.
    pub fn destroy(&mut self, entity: Entity) -> Option<ComponentSet> {
        if !self.is_alive(entity) {
            return None;
        }

        let slot = &mut self.slots[entity.index()];
        slot.alive = false;
        let components = std::mem::take(&mut slot.components);
        self.alive -= 1;

        if slot.generation == u32::MAX {
            log::debug!("retiring slot {} after generation exhaustion", entity.id());
        } else {
            slot.generation += 1;
            self.free.push(entity.id().raw());
        }

        Some(components)
    }

    /// Check if an entity is alive
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.slots
            .get(entity.index())
            .map_or(false, |slot| slot.alive && slot.generation == entity.generation())
    }

    /// Component kinds currently attached to a live entity
    pub fn components(&self, entity: Entity) -> Option<ComponentSet> {
        self.is_alive(entity)
            .then(|| self.slots[entity.index()].components)
    }

    /// Record that a live entity gained a component; false if the handle is dead
    pub fn mark(&mut self, entity: Entity, kind: ComponentKind) -> bool {
        if !self.is_alive(entity) {
            return false;
        }
        self.slots[entity.index()].components.insert(kind.as_set());
        true
    }

    /// Record that a live entity lost a component; false if the handle is dead
    pub fn unmark(&mut self, entity: Entity, kind: ComponentKind) -> bool {
        if !self.is_alive(entity) {
            return false;
        }
        self.slots[entity.index()].components.remove(kind.as_set());
        true
    }

    /// Live entities carrying every kind in `required`, in slot order
    pub fn query(&self, required: ComponentSet) -> impl Iterator<Item = Entity> + '_ {
        self.slots.iter().enumerate().filter_map(move |(index, slot)| {
            (slot.alive && slot.components.contains(required))
                .then(|| Entity::new(index as u32, slot.generation))
        })
    }

    /// All live entities, in slot order
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.query(ComponentSet::empty())
    }

    /// Get the number of live entities
    pub fn len(&self) -> usize {
        self.alive
    }

    /// Check if no entity is alive
    pub fn is_empty(&self) -> bool {
        self.alive == 0
    }

    /// Number of slots ever allocated, live or free
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Destroy everything and forget all slots
    ///
    /// Handles issued before the clear may alias entities created after it.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.alive = 0;
    }
}
