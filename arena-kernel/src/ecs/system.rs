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
//! System execution framework
//!
//! Systems are per-frame procedures over the entities matching a component
//! filter. Every system receives the same three things: the frame's input,
//! the world, and the command buffer for structural changes it must defer.

use crate::ecs::{CommandBuffer, World};
use crate::error::KernelError;

/// Input supplied by the embedding layer for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInput {
    delta_time: f64,
    horizontal: f64,
    vertical: f64,
}

impl FrameInput {
    /// Validate and build a frame input
    ///
    /// `delta_time` must be finite and non-negative. Axes must be finite and
    /// are clamped to [-1, 1].
    pub fn new(delta_time: f64, horizontal: f64, vertical: f64) -> Result<Self, KernelError> {
        if !delta_time.is_finite() || delta_time < 0.0 {
            return Err(KernelError::InvalidFrameInput(format!(
                "delta time must be finite and non-negative, got {}",
                delta_time
            )));
        }
        if !horizontal.is_finite() || !vertical.is_finite() {
            return Err(KernelError::InvalidFrameInput(format!(
                "input axes must be finite, got ({}, {})",
                horizontal, vertical
            )));
        }
        Ok(FrameInput {
            delta_time,
            horizontal: horizontal.clamp(-1.0, 1.0),
            vertical: vertical.clamp(-1.0, 1.0),
        })
    }

    /// A frame with elapsed time but no player input
    pub fn idle(delta_time: f64) -> Result<Self, KernelError> {
        Self::new(delta_time, 0.0, 0.0)
    }

    /// Seconds since the previous frame
    pub fn delta_time(&self) -> f64 {
        self.delta_time
    }

    /// Horizontal axis in [-1, 1], mapped to world +x
    pub fn horizontal(&self) -> f64 {
        self.horizontal
    }

    /// Vertical axis in [-1, 1], mapped to world +z
    pub fn vertical(&self) -> f64 {
        self.vertical
    }

    /// Input as a world-space direction `(x, y, z)`; y is always 0
    pub fn direction(&self) -> [f64; 3] {
        [self.horizontal, 0.0, self.vertical]
    }
}

/// Trait for systems that operate on the ECS world
///
/// Systems may mutate component values of entities they own outright, but
/// must route entity destruction and component attachment through the
/// command buffer: playback happens once, after every system of the frame.
pub trait System: Send + Sync {
    /// Execute the system for one frame
    fn run(&mut self, frame: &FrameInput, world: &mut World, commands: &mut CommandBuffer);

    /// Get the name of this system for debugging
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_input_clamps_axes() {
        let input = FrameInput::new(0.1, 2.5, -3.0).unwrap();
        assert_eq!(input.horizontal(), 1.0);
        assert_eq!(input.vertical(), -1.0);
        assert_eq!(input.direction(), [1.0, 0.0, -1.0]);
    }

    #[test]
    fn test_frame_input_rejects_negative_delta() {
        assert!(matches!(
            FrameInput::new(-0.01, 0.0, 0.0),
            Err(KernelError::InvalidFrameInput(_))
        ));
    }

    #[test]
    fn test_frame_input_rejects_non_finite() {
        assert!(FrameInput::new(f64::NAN, 0.0, 0.0).is_err());
        assert!(FrameInput::new(f64::INFINITY, 0.0, 0.0).is_err());
        assert!(FrameInput::new(0.1, f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_zero_delta_is_allowed() {
        let input = FrameInput::idle(0.0).unwrap();
        assert_eq!(input.delta_time(), 0.0);
        assert_eq!(input.direction(), [0.0, 0.0, 0.0]);
    }

    struct CountingSystem {
        runs: usize,
    }

    impl System for CountingSystem {
        fn run(&mut self, _frame: &FrameInput, _world: &mut World, _commands: &mut CommandBuffer) {
            self.runs += 1;
        }
    }

    #[test]
    fn test_system_default_name() {
        let mut system = CountingSystem { runs: 0 };
        let mut world = World::new();
        let mut commands = CommandBuffer::new();
        system.run(&FrameInput::idle(0.016).unwrap(), &mut world, &mut commands);
        assert_eq!(system.runs, 1);
        assert!(system.name().ends_with("CountingSystem"));
    }
}
