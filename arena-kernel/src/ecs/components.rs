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
//! Gameplay components
//!
//! The data model of the collection game: spatial components shared by every
//! renderable entity, the player/reward tags, and the small set of scalars the
//! movement and rotation systems read. Vector-like components use
//! double-precision floats.

use crate::ecs::Entity;

/// 3D position component
///
/// # Examples
///
/// ```
/// use arena_kernel::ecs::components::Position;
///
/// let pos = Position::new(1.0, 0.5, 3.0);
/// assert_eq!(pos.x(), 1.0);
/// assert!(pos.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    x: f64,
    y: f64,
    z: f64,
}

impl Position {
    /// Create a new position with the given coordinates
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Position { x, y, z }
    }

    /// Create a position at the origin (0, 0, 0)
    pub fn zero() -> Self {
        Position::new(0.0, 0.0, 0.0)
    }

    /// Get the x coordinate
    pub fn x(&self) -> f64 {
        self.x
    }

    /// Get the y coordinate
    pub fn y(&self) -> f64 {
        self.y
    }

    /// Get the z coordinate
    pub fn z(&self) -> f64 {
        self.z
    }

    /// Set the x coordinate
    pub fn set_x(&mut self, x: f64) {
        self.x = x;
    }

    /// Set the y coordinate
    pub fn set_y(&mut self, y: f64) {
        self.y = y;
    }

    /// Set the z coordinate
    pub fn set_z(&mut self, z: f64) {
        self.z = z;
    }

    /// Move by the given offset
    pub fn translate(&mut self, dx: f64, dy: f64, dz: f64) {
        self.x += dx;
        self.y += dy;
        self.z += dz;
    }

    /// Squared Euclidean distance to another position
    ///
    /// Pickup tests compare this against a squared radius, so no square
    /// root is ever taken on the hot path.
    pub fn distance_squared(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    /// Check if all coordinates are finite (not NaN or infinite)
    pub fn is_valid(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Get the position as an array
    pub fn as_array(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Create a position from an array
    pub fn from_array(arr: [f64; 3]) -> Self {
        Position::new(arr[0], arr[1], arr[2])
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::zero()
    }
}

/// Orientation stored as a unit quaternion
///
/// Every update re-normalizes, so the magnitude stays at 1 within floating
/// tolerance no matter how many increments are composed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation {
    x: f64,
    y: f64,
    z: f64,
    w: f64,
}

impl Rotation {
    /// The identity orientation
    pub fn identity() -> Self {
        Rotation { x: 0.0, y: 0.0, z: 0.0, w: 1.0 }
    }

    /// Build a quaternion from raw components, normalizing it
    pub fn from_xyzw(x: f64, y: f64, z: f64, w: f64) -> Self {
        Rotation { x, y, z, w }.normalized()
    }

    /// Rotation of `radians` about the vertical (+y) axis
    pub fn from_rotation_y(radians: f64) -> Self {
        let half = radians * 0.5;
        Rotation { x: 0.0, y: half.sin(), z: 0.0, w: half.cos() }
    }

    /// Rotation of `degrees` about the vertical (+y) axis
    pub fn from_yaw_degrees(degrees: f64) -> Self {
        Self::from_rotation_y(degrees.to_radians())
    }

    /// Components as `[x, y, z, w]`
    pub fn as_array(&self) -> [f64; 4] {
        [self.x, self.y, self.z, self.w]
    }

    /// Quaternion norm
    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w).sqrt()
    }

    /// Hamilton product `self * rhs`
    pub fn mul(&self, rhs: &Rotation) -> Rotation {
        Rotation {
            w: self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
            x: self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            y: self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            z: self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
        }
    }

    /// Unit-length copy; a degenerate (zero or non-finite) quaternion resets to identity
    pub fn normalized(&self) -> Rotation {
        let mag = self.magnitude();
        if mag == 0.0 || !mag.is_finite() {
            return Rotation::identity();
        }
        Rotation {
            x: self.x / mag,
            y: self.y / mag,
            z: self.z / mag,
            w: self.w / mag,
        }
    }

    /// Compose with an extra turn of `radians` about +y, then re-normalize
    pub fn rotate_y(&mut self, radians: f64) {
        *self = self.mul(&Rotation::from_rotation_y(radians)).normalized();
    }

    /// Heading about the vertical axis, in degrees within (-180, 180]
    pub fn yaw_degrees(&self) -> f64 {
        let siny = 2.0 * (self.w * self.y + self.x * self.z);
        let cosy = 1.0 - 2.0 * (self.x * self.x + self.y * self.y);
        siny.atan2(cosy).to_degrees()
    }

    /// Check if all components are finite
    pub fn is_valid(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite() && self.w.is_finite()
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Rotation::identity()
    }
}

/// Player locomotion multiplier (world units per second at full input)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveSpeed(pub f64);

impl MoveSpeed {
    /// Create a new move speed
    pub fn new(value: f64) -> Self {
        MoveSpeed(value)
    }

    /// Get the speed value
    pub fn value(&self) -> f64 {
        self.0
    }
}

/// Spin rate of a decoration, in degrees per second about +y
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationSpeed(pub f64);

impl RotationSpeed {
    /// Create a new rotation speed in degrees per second
    pub fn new(degrees_per_second: f64) -> Self {
        RotationSpeed(degrees_per_second)
    }

    /// Rate in degrees per second
    pub fn degrees_per_second(&self) -> f64 {
        self.0
    }

    /// Rate in radians per second
    pub fn radians_per_second(&self) -> f64 {
        self.0.to_radians()
    }
}

/// Player tag
///
/// Exactly one live entity holds this component during gameplay. The score
/// never decreases; increments saturate instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Player {
    score: u64,
    owner: Option<Entity>,
}

impl Player {
    /// Create a player with a zero score
    pub fn new() -> Self {
        Player { score: 0, owner: None }
    }

    /// Create a player with an initial score
    pub fn with_score(score: u64) -> Self {
        Player { score, owner: None }
    }

    /// Current score
    pub fn score(&self) -> u64 {
        self.score
    }

    /// Add points to the score
    pub fn add_score(&mut self, points: u64) {
        self.score = self.score.saturating_add(points);
    }

    /// Entity this component is attached to, once stored
    pub fn owner(&self) -> Option<Entity> {
        self.owner
    }

    pub(crate) fn bind_owner(&mut self, owner: Entity) {
        self.owner = Some(owner);
    }
}

/// Reward marker, destroyed when the player picks it up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreBox {
    points: u32,
    owner: Option<Entity>,
}

impl ScoreBox {
    /// Create a score box worth `points`
    ///
    /// # Panics
    ///
    /// Panics if `points` is zero. Use `try_new` for fallible construction.
    pub fn new(points: u32) -> Self {
        assert!(points > 0, "ScoreBox points must be positive");
        ScoreBox { points, owner: None }
    }

    /// Create a score box, returning `None` when `points` is zero
    pub fn try_new(points: u32) -> Option<Self> {
        (points > 0).then_some(ScoreBox { points, owner: None })
    }

    /// Points awarded on pickup
    pub fn points(&self) -> u32 {
        self.points
    }

    /// Entity this component is attached to, once stored
    pub fn owner(&self) -> Option<Entity> {
        self.owner
    }

    pub(crate) fn bind_owner(&mut self, owner: Entity) {
        self.owner = Some(owner);
    }
}

/// 3D velocity, used by the force-driven movement variant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Velocity {
    dx: f64,
    dy: f64,
    dz: f64,
}

impl Velocity {
    /// Create a new velocity with the given components
    pub fn new(dx: f64, dy: f64, dz: f64) -> Self {
        Velocity { dx, dy, dz }
    }

    /// Create a zero velocity (at rest)
    pub fn zero() -> Self {
        Velocity::new(0.0, 0.0, 0.0)
    }

    /// Get the x component
    pub fn dx(&self) -> f64 {
        self.dx
    }

    /// Get the y component
    pub fn dy(&self) -> f64 {
        self.dy
    }

    /// Get the z component
    pub fn dz(&self) -> f64 {
        self.dz
    }

    /// Add a velocity change
    pub fn apply_delta(&mut self, dx: f64, dy: f64, dz: f64) {
        self.dx += dx;
        self.dy += dy;
        self.dz += dz;
    }

    /// Check if all components are finite
    pub fn is_valid(&self) -> bool {
        self.dx.is_finite() && self.dy.is_finite() && self.dz.is_finite()
    }
}

impl Default for Velocity {
    fn default() -> Self {
        Velocity::zero()
    }
}

/// Mass component
///
/// Zero or near-zero mass marks an immovable body; its inverse is 0 so
/// impulses leave it at rest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mass {
    value: f64,
}

impl Mass {
    /// Threshold below which mass is considered effectively zero (immovable)
    pub const IMMOVABLE_THRESHOLD: f64 = 1e-10;

    /// Create a new mass
    ///
    /// # Panics
    ///
    /// Panics if the mass is negative or NaN. Use `try_new` for fallible construction.
    pub fn new(value: f64) -> Self {
        assert!(value >= 0.0 && value.is_finite(), "Mass must be non-negative and finite");
        Mass { value }
    }

    /// Try to create a new mass, returning `None` if negative or not finite
    pub fn try_new(value: f64) -> Option<Self> {
        (value >= 0.0 && value.is_finite()).then_some(Mass { value })
    }

    /// Create an immovable mass
    pub fn immovable() -> Self {
        Mass { value: 0.0 }
    }

    /// Get the mass value
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Check if this is an immovable body
    pub fn is_immovable(&self) -> bool {
        self.value < Self::IMMOVABLE_THRESHOLD
    }

    /// Inverse mass, 0.0 for immovable bodies
    pub fn inverse(&self) -> f64 {
        if self.is_immovable() {
            0.0
        } else {
            1.0 / self.value
        }
    }
}

impl Default for Mass {
    fn default() -> Self {
        Mass::new(1.0)
    }
}

/// Impulse applied per frame at full input, for the force-driven variant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementForce(pub f64);

impl MovementForce {
    /// Create a new movement force
    pub fn new(force: f64) -> Self {
        MovementForce(force)
    }

    /// Get the force value
    pub fn value(&self) -> f64 {
        self.0
    }
}
