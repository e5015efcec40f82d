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
//! Staged system scheduler
//!
//! Systems are grouped into stages that execute strictly in order. A stage
//! finishes, including every parallel shard its systems fan out to, before
//! the next stage starts; after the last stage the frame's command buffer is
//! played back on the calling thread. Within a stage, systems run in
//! registration order.

use crate::ecs::{CommandBuffer, FrameInput, PlaybackStats, System, World};

/// Stage identifier for grouping systems
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StageId(pub usize);

impl StageId {
    /// Create a new stage ID
    pub fn new(id: usize) -> Self {
        StageId(id)
    }
}

/// Pre-defined stages of a gameplay frame
pub mod stages {
    use super::StageId;

    /// Movement and rotation: in-place writes to disjoint component sets
    pub const MOTION: StageId = StageId(0);

    /// Collision scan: reads positions written by `MOTION`, records commands
    pub const COLLISION: StageId = StageId(1);

    /// Anything that wants to observe the frame after collision
    pub const POST_PROCESS: StageId = StageId(2);
}

struct ScheduledSystem {
    system: Box<dyn System>,
    stage: StageId,
}

/// System scheduler with staged execution and end-of-frame playback
///
/// # Examples
///
/// ```
/// use arena_kernel::ecs::scheduler::{Scheduler, stages};
/// use arena_kernel::ecs::{CommandBuffer, FrameInput, System, World};
///
/// struct Idle;
/// impl System for Idle {
///     fn run(&mut self, _: &FrameInput, _: &mut World, _: &mut CommandBuffer) {}
/// }
///
/// let mut scheduler = Scheduler::new();
/// scheduler.add_system(Idle, stages::MOTION);
///
/// let mut world = World::new();
/// let mut commands = CommandBuffer::new();
/// let frame = FrameInput::idle(0.016).unwrap();
/// scheduler.run_frame(&frame, &mut world, &mut commands);
/// ```
pub struct Scheduler {
    systems: Vec<ScheduledSystem>,
    sorted: bool,
}

impl Scheduler {
    /// Create a new scheduler
    pub fn new() -> Self {
        Scheduler {
            systems: Vec::new(),
            sorted: true,
        }
    }

    /// Add a system to a stage
    pub fn add_system<S: System + 'static>(&mut self, system: S, stage: StageId) {
        self.systems.push(ScheduledSystem {
            system: Box::new(system),
            stage,
        });
        self.sorted = false;
    }

    /// Get the number of registered systems
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    /// Get the number of stages in use (highest stage index + 1)
    pub fn stage_count(&self) -> usize {
        self.systems
            .iter()
            .map(|s| s.stage.0 + 1)
            .max()
            .unwrap_or(0)
    }

    /// System names in execution order
    pub fn system_names(&mut self) -> Vec<String> {
        self.sort();
        self.systems
            .iter()
            .map(|s| s.system.name().to_string())
            .collect()
    }

    /// Run every stage in order, then play the command buffer back
    pub fn run_frame(
        &mut self,
        frame: &FrameInput,
        world: &mut World,
        commands: &mut CommandBuffer,
    ) -> PlaybackStats {
        self.sort();

        for scheduled in &mut self.systems {
            log::trace!("stage {} running {}", scheduled.stage.0, scheduled.system.name());
            scheduled.system.run(frame, world, commands);
        }

        commands.playback(world)
    }

    /// Clear all systems from the scheduler
    pub fn clear(&mut self) {
        self.systems.clear();
        self.sorted = true;
    }

    fn sort(&mut self) {
        if !self.sorted {
            // Stable, so registration order survives within a stage
            self.systems.sort_by_key(|s| s.stage);
            self.sorted = true;
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
