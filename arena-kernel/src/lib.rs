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
//! # Arena Kernel
//!
//! The entity-component core of a real-time arena collection game: a player
//! steers around a bounded floor and collects spinning score boxes.
//!
//! ## Features
//!
//! - **ECS Architecture**: generational entities, dense per-type component storage
//! - **Deferred Commands**: structural changes recorded per worker, applied once per frame
//! - **Gameplay Systems**: kinematic or force-driven movement, spin, pickup scan
//! - **Parallelization**: optional Rayon integration for sharded rotation and collision
//! - **Configuration**: serde/TOML [`KernelConfig`] with validation
//!
//! ## Example
//!
//! ```rust
//! use arena_kernel::{KernelConfig, Simulation};
//! use arena_kernel::ecs::components::Position;
//!
//! let mut sim = Simulation::new(KernelConfig::default()).unwrap();
//! sim.world_mut().spawn_player(Position::new(0.0, 0.5, 0.0), 15.0).unwrap();
//! sim.world_mut()
//!     .spawn_score_box(Position::new(1.0, 0.5, 0.0), 2, Some(50.0))
//!     .unwrap();
//!
//! let report = sim.step_with(0.016, 0.0, 0.0).unwrap();
//! assert_eq!(report.score, 2);
//! assert_eq!(sim.world().score_box_count(), 0);
//! ```

#![warn(missing_docs)]

/// Entity Component System implementation
pub mod ecs;

/// Kernel configuration
pub mod config;

/// Error types
pub mod error;

/// Per-frame driver
pub mod simulation;

pub use config::KernelConfig;
pub use ecs::{Entity, FrameInput, World};
pub use error::{ConfigError, KernelError};
pub use simulation::{FrameReport, Simulation};
