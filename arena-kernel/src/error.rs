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
//! Error types
//!
//! Only [`KernelError::InvalidConfiguration`] and
//! [`KernelError::InvalidFrameInput`] are meant to reach the embedding layer;
//! they mean the setup contract was broken. Missing components and stale
//! handles are expected during normal frames and are handled where they occur
//! (existence checks in systems, silent skips in command playback).

use crate::ecs::{ComponentKind, Entity};
use thiserror::Error;

/// Errors produced by the kernel
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KernelError {
    /// An entity does not carry the requested component
    #[error("{entity} has no {component} component")]
    MissingComponent {
        /// Entity that was queried
        entity: Entity,
        /// Component kind that was requested
        component: ComponentKind,
    },

    /// The handle refers to a destroyed or recycled entity
    #[error("stale entity handle: {0}")]
    StaleEntityHandle(Entity),

    /// The setup layer violated the kernel's contract
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Per-frame input outside its documented domain
    #[error("invalid frame input: {0}")]
    InvalidFrameInput(String),
}

/// Errors raised while loading a [`KernelConfig`](crate::config::KernelConfig)
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Values parsed but failed validation
    #[error("{0}")]
    Invalid(#[from] KernelError),
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, KernelError>;
