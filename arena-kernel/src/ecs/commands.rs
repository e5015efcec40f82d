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
//! Deferred command buffer
//!
//! Structural changes (destroying entities, attaching components) are unsafe
//! while workers iterate component storage in parallel. Workers instead
//! record [`Command`]s into their own [`CommandShard`], and a single
//! [`CommandBuffer::playback`] applies them once every worker has joined.
//!
//! Each worker owns its shard exclusively (`&mut CommandShard`), so recording
//! never takes a lock. Playback walks shards in index order and each shard in
//! recording order, which makes the outcome independent of thread timing.

use crate::ecs::components::{
    Mass, MoveSpeed, MovementForce, Player, Position, Rotation, RotationSpeed, ScoreBox, Velocity,
};
use crate::ecs::{Component, ComponentKind, Entity, World};
use crate::error::KernelError;

/// A component value of any kind, boxed for deferred application
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ComponentValue {
    /// [`Position`]
    Position(Position),
    /// [`Rotation`]
    Rotation(Rotation),
    /// [`MoveSpeed`]
    MoveSpeed(MoveSpeed),
    /// [`RotationSpeed`]
    RotationSpeed(RotationSpeed),
    /// [`Player`]
    Player(Player),
    /// [`ScoreBox`]
    ScoreBox(ScoreBox),
    /// [`Velocity`]
    Velocity(Velocity),
    /// [`Mass`]
    Mass(Mass),
    /// [`MovementForce`]
    MovementForce(MovementForce),
}

impl ComponentValue {
    /// Kind of the wrapped value
    pub fn kind(&self) -> ComponentKind {
        match self {
            ComponentValue::Position(_) => ComponentKind::Position,
            ComponentValue::Rotation(_) => ComponentKind::Rotation,
            ComponentValue::MoveSpeed(_) => ComponentKind::MoveSpeed,
            ComponentValue::RotationSpeed(_) => ComponentKind::RotationSpeed,
            ComponentValue::Player(_) => ComponentKind::Player,
            ComponentValue::ScoreBox(_) => ComponentKind::ScoreBox,
            ComponentValue::Velocity(_) => ComponentKind::Velocity,
            ComponentValue::Mass(_) => ComponentKind::Mass,
            ComponentValue::MovementForce(_) => ComponentKind::MovementForce,
        }
    }

    fn insert_into(self, world: &mut World, entity: Entity) -> Result<(), KernelError> {
        match self {
            ComponentValue::Position(v) => world.insert(entity, v),
            ComponentValue::Rotation(v) => world.insert(entity, v),
            ComponentValue::MoveSpeed(v) => world.insert(entity, v),
            ComponentValue::RotationSpeed(v) => world.insert(entity, v),
            ComponentValue::Player(v) => world.insert(entity, v),
            ComponentValue::ScoreBox(v) => world.insert(entity, v),
            ComponentValue::Velocity(v) => world.insert(entity, v),
            ComponentValue::Mass(v) => world.insert(entity, v),
            ComponentValue::MovementForce(v) => world.insert(entity, v),
        }
    }
}

/// A deferred world mutation
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Destroy an entity; a dead or unknown handle is a no-op
    DestroyEntity(Entity),

    /// Overwrite a component the entity already carries
    ///
    /// Skipped with a warning if the component is absent at playback.
    SetComponent(Entity, ComponentValue),

    /// Attach a component, overwriting any existing value
    AddComponent(Entity, ComponentValue),

    /// Add a worker's partial score sum to the player
    AddScore {
        /// Player entity receiving the points
        player: Entity,
        /// Points to add
        points: u64,
        /// Score boxes collected to earn the points, 0 for plain bonuses
        pickups: usize,
    },
}

/// One worker's segment of a [`CommandBuffer`]
#[derive(Debug, Clone, Default)]
pub struct CommandShard {
    commands: Vec<Command>,
}

impl CommandShard {
    /// Create an empty shard
    pub fn new() -> Self {
        Self::default()
    }

    /// Record any command
    pub fn record(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// Record a destruction
    pub fn destroy(&mut self, entity: Entity) {
        self.record(Command::DestroyEntity(entity));
    }

    /// Record an overwrite of an existing component
    pub fn set_component<T: Component>(&mut self, entity: Entity, value: T) {
        self.record(Command::SetComponent(entity, value.into_value()));
    }

    /// Record a component attachment
    pub fn add_component<T: Component>(&mut self, entity: Entity, value: T) {
        self.record(Command::AddComponent(entity, value.into_value()));
    }

    /// Record a score increment not tied to any pickup
    pub fn add_score(&mut self, player: Entity, points: u64) {
        self.record(Command::AddScore {
            player,
            points,
            pickups: 0,
        });
    }

    /// Record the points earned by `pickups` collected score boxes
    pub fn record_pickups(&mut self, player: Entity, pickups: usize, points: u64) {
        self.record(Command::AddScore {
            player,
            points,
            pickups,
        });
    }

    /// Recorded commands, in order
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Number of recorded commands
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Check if nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Outcome of one [`CommandBuffer::playback`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybackStats {
    /// Entities destroyed, in application order
    pub destroyed: Vec<Entity>,
    /// Commands skipped because their entity was already dead
    pub stale_skipped: usize,
    /// `SetComponent` commands skipped because the component was absent
    pub missing_skipped: usize,
    /// `AddComponent` commands refused by the world (e.g. Player/ScoreBox clash)
    pub rejected: usize,
    /// Components overwritten
    pub components_set: usize,
    /// Components attached
    pub components_added: usize,
    /// `AddScore` commands applied
    pub scores_added: usize,
    /// Total points added to players
    pub score_applied: u64,
    /// Score boxes credited by applied `AddScore` commands
    pub pickups: usize,
}

impl PlaybackStats {
    /// Number of commands that changed the world
    pub fn applied(&self) -> usize {
        self.destroyed.len() + self.components_set + self.components_added + self.scores_added
    }
}

/// Deferred mutation queue made of per-worker shards
#[derive(Debug, Clone)]
pub struct CommandBuffer {
    shards: Vec<CommandShard>,
}

impl CommandBuffer {
    /// Create a buffer with a single shard
    pub fn new() -> Self {
        CommandBuffer {
            shards: vec![CommandShard::new()],
        }
    }

    /// Create a buffer pre-sized for `count` shards
    pub fn with_shards(count: usize) -> Self {
        CommandBuffer {
            shards: vec![CommandShard::new(); count.max(1)],
        }
    }

    /// Record into the first shard, for serial callers
    pub fn record(&mut self, command: Command) {
        self.shards[0].record(command);
    }

    /// Shard `index`, growing the buffer if needed
    pub fn shard_mut(&mut self, index: usize) -> &mut CommandShard {
        if index >= self.shards.len() {
            self.shards.resize_with(index + 1, CommandShard::new);
        }
        &mut self.shards[index]
    }

    /// The first `count` shards, growing the buffer if needed
    ///
    /// Zip the result with the work partition so each worker gets exactly one
    /// exclusive segment.
    pub fn shards_mut(&mut self, count: usize) -> &mut [CommandShard] {
        if count > self.shards.len() {
            self.shards.resize_with(count, CommandShard::new);
        }
        &mut self.shards[..count]
    }

    /// Number of shards allocated
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Total commands waiting for playback
    pub fn len(&self) -> usize {
        self.shards.iter().map(CommandShard::len).sum()
    }

    /// Check if nothing is waiting
    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(CommandShard::is_empty)
    }

    /// Every pending command in playback order
    pub fn iter(&self) -> impl Iterator<Item = &Command> + '_ {
        self.shards.iter().flat_map(|shard| shard.commands.iter())
    }

    /// Drop pending commands without applying them
    pub fn clear(&mut self) {
        for shard in &mut self.shards {
            shard.commands.clear();
        }
    }

    /// Apply every recorded command to the world, then empty the buffer
    ///
    /// Must run only after every worker that recorded into this buffer has
    /// joined. Shard allocations are kept for the next frame.
    pub fn playback(&mut self, world: &mut World) -> PlaybackStats {
        let mut stats = PlaybackStats::default();

        for (index, shard) in self.shards.iter_mut().enumerate() {
            for command in shard.commands.drain(..) {
                log::trace!("shard {} applying {:?}", index, command);
                apply(world, command, &mut stats);
            }
        }

        stats
    }
}

impl Default for CommandBuffer {
    fn default() -> Self {
        Self::new()
    }
}

fn apply(world: &mut World, command: Command, stats: &mut PlaybackStats) {
    match command {
        Command::DestroyEntity(entity) => {
            if world.despawn(entity) {
                stats.destroyed.push(entity);
            } else {
                stats.stale_skipped += 1;
            }
        }
        Command::SetComponent(entity, value) => {
            let Some(present) = world.registry().components(entity) else {
                stats.stale_skipped += 1;
                return;
            };
            if !present.contains(value.kind().as_set()) {
                log::warn!("skipping set of absent {} on {}", value.kind(), entity);
                stats.missing_skipped += 1;
                return;
            }
            match value.insert_into(world, entity) {
                Ok(()) => stats.components_set += 1,
                Err(err) => {
                    log::warn!("set of {} on {} refused: {}", value.kind(), entity, err);
                    stats.rejected += 1;
                }
            }
        }
        Command::AddComponent(entity, value) => {
            if !world.is_alive(entity) {
                stats.stale_skipped += 1;
                return;
            }
            match value.insert_into(world, entity) {
                Ok(()) => stats.components_added += 1,
                Err(err) => {
                    log::warn!("add of {} on {} refused: {}", value.kind(), entity, err);
                    stats.rejected += 1;
                }
            }
        }
        Command::AddScore {
            player,
            points,
            pickups,
        } => match world.get_mut::<Player>(player) {
            Ok(component) => {
                component.add_score(points);
                stats.scores_added += 1;
                stats.score_applied = stats.score_applied.saturating_add(points);
                stats.pickups += pickups;
            }
            Err(_) => stats.stale_skipped += 1,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world_with_boxes(count: u32) -> (World, Entity, Vec<Entity>) {
        let mut world = World::new();
        let player = world.spawn_player(Position::zero(), 15.0).unwrap();
        let boxes = (0..count)
            .map(|i| {
                world
                    .spawn_score_box(Position::new(i as f64, 0.0, 0.0), 1, None)
                    .unwrap()
            })
            .collect();
        (world, player, boxes)
    }

    #[test]
    fn test_playback_destroys_and_clears() {
        let (mut world, _, boxes) = world_with_boxes(2);
        let mut buffer = CommandBuffer::new();
        buffer.shard_mut(0).destroy(boxes[0]);
        assert_eq!(buffer.len(), 1);

        let stats = buffer.playback(&mut world);
        assert_eq!(stats.destroyed, vec![boxes[0]]);
        assert!(!world.is_alive(boxes[0]));
        assert!(world.is_alive(boxes[1]));
        assert!(buffer.is_empty());

        // A second playback has nothing left to apply
        assert_eq!(buffer.playback(&mut world), PlaybackStats::default());
    }

    #[test]
    fn test_duplicate_destroy_is_idempotent() {
        let (mut world, _, boxes) = world_with_boxes(1);
        let mut buffer = CommandBuffer::new();
        buffer.shard_mut(0).destroy(boxes[0]);
        buffer.shard_mut(1).destroy(boxes[0]);
        buffer.shard_mut(1).destroy(boxes[0]);

        let stats = buffer.playback(&mut world);
        assert_eq!(stats.destroyed, vec![boxes[0]]);
        assert_eq!(stats.stale_skipped, 2);
        assert_eq!(world.score_box_count(), 0);
    }

    #[test]
    fn test_destroy_unknown_entity_is_noop() {
        let (mut world, _, _) = world_with_boxes(1);
        let mut buffer = CommandBuffer::new();
        buffer.record(Command::DestroyEntity(Entity::new(500, 3)));

        let stats = buffer.playback(&mut world);
        assert!(stats.destroyed.is_empty());
        assert_eq!(stats.stale_skipped, 1);
        assert_eq!(world.entity_count(), 2);
    }

    #[test]
    fn test_destroy_recycled_handle_spares_new_occupant() {
        let mut world = World::new();
        let old = world.spawn();
        world.despawn(old);
        let new = world.spawn();

        let mut buffer = CommandBuffer::new();
        buffer.record(Command::DestroyEntity(old));
        buffer.playback(&mut world);
        assert!(world.is_alive(new));
    }

    #[test]
    fn test_shard_order_is_deterministic() {
        let (mut world, player, boxes) = world_with_boxes(1);
        let mut buffer = CommandBuffer::new();
        // Shard 1 writes last even though it is recorded first
        buffer.shard_mut(1).set_component(boxes[0], Position::new(9.0, 0.0, 0.0));
        buffer.shard_mut(0).set_component(boxes[0], Position::new(1.0, 0.0, 0.0));
        buffer.shard_mut(0).add_score(player, 3);
        buffer.shard_mut(1).add_score(player, 4);

        let order: Vec<&Command> = buffer.iter().collect();
        assert_eq!(order[0], &Command::SetComponent(boxes[0], ComponentValue::Position(Position::new(1.0, 0.0, 0.0))));

        let stats = buffer.playback(&mut world);
        assert_eq!(stats.components_set, 2);
        assert_eq!(stats.score_applied, 7);
        assert_eq!(stats.scores_added, 2);
        assert_eq!(stats.applied(), 4);
        assert_eq!(world.get::<Position>(boxes[0]).unwrap().x(), 9.0);
        assert_eq!(world.player_score(), Some(7));
    }

    #[test]
    fn test_set_component_requires_presence() {
        let (mut world, player, _) = world_with_boxes(0);
        let mut buffer = CommandBuffer::new();
        buffer.shard_mut(0).set_component(player, Rotation::identity());

        let stats = buffer.playback(&mut world);
        assert_eq!(stats.missing_skipped, 1);
        assert!(!world.has::<Rotation>(player));
    }

    #[test]
    fn test_add_component_attaches_and_marks() {
        let (mut world, _, boxes) = world_with_boxes(1);
        let mut buffer = CommandBuffer::new();
        buffer.shard_mut(0).add_component(boxes[0], RotationSpeed::new(50.0));

        let stats = buffer.playback(&mut world);
        assert_eq!(stats.components_added, 1);
        assert!(world.has::<RotationSpeed>(boxes[0]));
    }

    #[test]
    fn test_add_component_rejects_exclusive_clash() {
        let (mut world, player, _) = world_with_boxes(0);
        let mut buffer = CommandBuffer::new();
        buffer.shard_mut(0).add_component(player, ScoreBox::new(1));

        let stats = buffer.playback(&mut world);
        assert_eq!(stats.rejected, 1);
        assert!(!world.has::<ScoreBox>(player));
    }

    #[test]
    fn test_commands_after_destroy_in_same_frame_are_skipped() {
        let (mut world, _, boxes) = world_with_boxes(1);
        let mut buffer = CommandBuffer::new();
        buffer.shard_mut(0).destroy(boxes[0]);
        buffer.shard_mut(1).add_component(boxes[0], Mass::new(1.0));
        buffer.shard_mut(1).set_component(boxes[0], Position::zero());

        let stats = buffer.playback(&mut world);
        assert_eq!(stats.destroyed.len(), 1);
        assert_eq!(stats.stale_skipped, 2);
    }

    #[test]
    fn test_shards_mut_grows_and_keeps_existing() {
        let mut buffer = CommandBuffer::new();
        buffer.record(Command::DestroyEntity(Entity::new(0, 0)));
        let shards = buffer.shards_mut(4);
        assert_eq!(shards.len(), 4);
        assert_eq!(shards[0].len(), 1);
        assert_eq!(buffer.shard_count(), 4);
        assert_eq!(buffer.len(), 1);

        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.shard_count(), 4);
    }

    #[test]
    fn test_component_value_kind() {
        assert_eq!(MoveSpeed::new(1.0).into_value().kind(), ComponentKind::MoveSpeed);
        assert_eq!(MovementForce::new(1.0).into_value().kind(), ComponentKind::MovementForce);
        assert_eq!(Velocity::zero().into_value().kind(), ComponentKind::Velocity);
    }

    #[test]
    fn test_pickups_are_credited_with_their_score() {
        let (mut world, player, boxes) = world_with_boxes(3);
        let mut buffer = CommandBuffer::new();
        buffer.shard_mut(0).destroy(boxes[0]);
        buffer.shard_mut(0).destroy(boxes[1]);
        buffer.shard_mut(0).record_pickups(player, 2, 2);
        buffer.shard_mut(1).destroy(boxes[2]);
        buffer.shard_mut(1).record_pickups(player, 1, 1);
        // A bonus with no pickup behind it
        buffer.shard_mut(1).add_score(player, 10);

        let stats = buffer.playback(&mut world);
        assert_eq!(stats.pickups, 3);
        assert_eq!(stats.scores_added, 3);
        assert_eq!(stats.score_applied, 13);
        assert_eq!(stats.applied(), 6);
    }
}
