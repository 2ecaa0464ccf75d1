use serde::{Deserialize, Serialize};

/// Scene length units are centimetres: 1 unit = 1 cm.
pub const UNITS_PER_CM: f32 = 1.0;

/// Edge length of the engine's basic shapes (cube, plane, cylinder) in scene units.
pub const BASIC_SHAPE_SIZE: f32 = 100.0;

/// Position or scale in scene space (X forward, Y right, Z up).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub const fn splat(v: f32) -> Self {
        Self { x: v, y: v, z: v }
    }

    pub fn offset(self, dx: f32, dy: f32, dz: f32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    pub fn all_positive(&self) -> bool {
        self.x > 0.0 && self.y > 0.0 && self.z > 0.0
    }
}

/// Euler rotation in degrees, engine order (pitch, yaw, roll).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Rotator {
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
}

impl Rotator {
    pub const fn new(pitch: f32, yaw: f32, roll: f32) -> Self {
        Self { pitch, yaw, roll }
    }
}

/// Linear-space RGBA color.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LinearColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    #[serde(default = "default_alpha")]
    pub a: f32,
}

fn default_alpha() -> f32 {
    1.0
}

impl LinearColor {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }
}

/// Converts real-world centimetre dimensions into a scale for a basic shape.
pub fn shape_scale(width_cm: f32, depth_cm: f32, height_cm: f32) -> Vec3 {
    let to_scale = |cm: f32| cm * UNITS_PER_CM / BASIC_SHAPE_SIZE;
    Vec3::new(to_scale(width_cm), to_scale(depth_cm), to_scale(height_cm))
}

/// Horizontal aim angle (degrees, around Z) from `from` towards `to`.
pub fn yaw_towards(from: Vec3, to: Vec3) -> f32 {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    dy.atan2(dx).to_degrees()
}
