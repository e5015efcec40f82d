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
//! Gameplay systems
//!
//! The three per-frame systems of the collection game. Movement and rotation
//! write disjoint component sets in place; collision only reads and routes
//! every structural change through the command buffer.

pub mod collision;
pub mod movement;
pub mod rotation;

pub use collision::{CollisionSystem, ScanSummary};
pub use movement::MovementSystem;
pub use rotation::RotationSystem;
