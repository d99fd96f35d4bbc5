//! Synthetic entity records.
//!
//! Plain data, no behaviour beyond accessors. Variant payloads are flattened
//! into their parent with a `type` tag so the JSON shape matches what a scene
//! description loaded by a rendering library looks like.

use crate::error::DataError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Declares a fieldless selector enum with stable lowercase names used by
/// serde, `Display` and `FromStr`.
macro_rules! variant_enum {
    ($(#[$meta:meta])* $name:ident, $label:literal { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = DataError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(DataError::UnknownVariant {
                        kind: $label,
                        variant: other.to_string(),
                    }),
                }
            }
        }
    };
}

variant_enum!(
    /// Scene size class.
    Complexity, "complexity" {
        Simple => "simple",
        Medium => "medium",
        Complex => "complex",
    }
);

impl Default for Complexity {
    fn default() -> Self {
        Complexity::Medium
    }
}

impl Complexity {
    /// Inclusive bounds on the number of meshes in a scene.
    pub fn object_range(&self) -> (i64, i64) {
        match self {
            Complexity::Simple => (1, 3),
            Complexity::Medium => (5, 15),
            Complexity::Complex => (20, 50),
        }
    }

    /// Inclusive bounds on the number of lights in a scene.
    pub fn light_range(&self) -> (i64, i64) {
        match self {
            Complexity::Simple => (1, 2),
            Complexity::Medium => (2, 4),
            Complexity::Complex => (3, 8),
        }
    }
}

variant_enum!(MaterialType, "material" {
    Basic => "basic",
    Standard => "standard",
    Physical => "physical",
    Lambert => "lambert",
});

variant_enum!(GeometryType, "geometry" {
    Box => "box",
    Sphere => "sphere",
    Plane => "plane",
    Cylinder => "cylinder",
});

variant_enum!(LightType, "light" {
    Directional => "directional",
    Point => "point",
    Spot => "spot",
    Hemisphere => "hemisphere",
});

variant_enum!(CameraType, "camera" {
    Perspective => "perspective",
    Orthographic => "orthographic",
});

variant_enum!(TextureFormat, "texture format" {
    Rgba => "rgba",
    Rgb => "rgb",
});

impl TextureFormat {
    pub fn channels(&self) -> usize {
        match self {
            TextureFormat::Rgba => 4,
            TextureFormat::Rgb => 3,
        }
    }
}

variant_enum!(TexturePattern, "texture pattern" {
    Solid => "solid",
    Checkerboard => "checkerboard",
    Gradient => "gradient",
    Noise => "noise",
});

variant_enum!(PerformanceKind, "performance" {
    Rendering => "rendering",
    Memory => "memory",
    Animation => "animation",
    Interaction => "interaction",
});

variant_enum!(ErrorKind, "error" {
    ShaderCompile => "shader-compile",
    ContextLost => "context-lost",
    OutOfMemory => "out-of-memory",
    InvalidGeometry => "invalid-geometry",
    NetworkTimeout => "network-timeout",
});

// ==================== Primitives ====================

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const ZERO: Vector3 = Vector3::new(0.0, 0.0, 0.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub const fn splat(v: f64) -> Self {
        Self::new(v, v, v)
    }
}

/// RGB color with channels in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// `#rrggbb`.
    pub fn to_hex(&self) -> String {
        let channel = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "#{:02x}{:02x}{:02x}",
            channel(self.r),
            channel(self.g),
            channel(self.b)
        )
    }

    pub fn to_rgb8(&self) -> [u8; 3] {
        let channel = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [channel(self.r), channel(self.g), channel(self.b)]
    }
}

// ==================== Materials ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MaterialKind {
    Basic {
        wireframe: bool,
    },
    Standard {
        roughness: f64,
        metalness: f64,
        emissive: Color,
    },
    Physical {
        roughness: f64,
        metalness: f64,
        clearcoat: f64,
        clearcoat_roughness: f64,
        transmission: f64,
    },
    Lambert {
        emissive: Color,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub id: String,
    pub color: Color,
    pub opacity: f64,
    pub transparent: bool,
    #[serde(flatten)]
    pub kind: MaterialKind,
}

impl Material {
    pub fn material_type(&self) -> MaterialType {
        match self.kind {
            MaterialKind::Basic { .. } => MaterialType::Basic,
            MaterialKind::Standard { .. } => MaterialType::Standard,
            MaterialKind::Physical { .. } => MaterialType::Physical,
            MaterialKind::Lambert { .. } => MaterialType::Lambert,
        }
    }
}

// ==================== Geometry ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GeometryKind {
    Box {
        width: f64,
        height: f64,
        depth: f64,
    },
    Sphere {
        radius: f64,
        width_segments: u32,
        height_segments: u32,
    },
    Plane {
        width: f64,
        height: f64,
    },
    Cylinder {
        radius_top: f64,
        radius_bottom: f64,
        height: f64,
        radial_segments: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub id: String,
    #[serde(flatten)]
    pub kind: GeometryKind,
}

impl Geometry {
    pub fn geometry_type(&self) -> GeometryType {
        match self.kind {
            GeometryKind::Box { .. } => GeometryType::Box,
            GeometryKind::Sphere { .. } => GeometryType::Sphere,
            GeometryKind::Plane { .. } => GeometryType::Plane,
            GeometryKind::Cylinder { .. } => GeometryType::Cylinder,
        }
    }
}

// ==================== Lights ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LightKind {
    Directional {
        position: Vector3,
        target: Vector3,
    },
    Point {
        position: Vector3,
        distance: f64,
        decay: f64,
    },
    Spot {
        position: Vector3,
        angle: f64,
        penumbra: f64,
        distance: f64,
    },
    Hemisphere {
        sky_color: Color,
        ground_color: Color,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub id: String,
    pub color: Color,
    pub intensity: f64,
    #[serde(flatten)]
    pub kind: LightKind,
}

impl Light {
    pub fn light_type(&self) -> LightType {
        match self.kind {
            LightKind::Directional { .. } => LightType::Directional,
            LightKind::Point { .. } => LightType::Point,
            LightKind::Spot { .. } => LightType::Spot,
            LightKind::Hemisphere { .. } => LightType::Hemisphere,
        }
    }
}

// ==================== Cameras ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CameraKind {
    Perspective {
        fov: f64,
        aspect: f64,
        near: f64,
        far: f64,
    },
    Orthographic {
        left: f64,
        right: f64,
        top: f64,
        bottom: f64,
        near: f64,
        far: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub id: String,
    pub position: Vector3,
    pub look_at: Vector3,
    #[serde(flatten)]
    pub kind: CameraKind,
}

impl Camera {
    pub fn camera_type(&self) -> CameraType {
        match self.kind {
            CameraKind::Perspective { .. } => CameraType::Perspective,
            CameraKind::Orthographic { .. } => CameraType::Orthographic,
        }
    }
}

// ==================== Meshes & Scenes ====================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vector3,
    pub rotation: Vector3,
    pub scale: Vector3,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub id: String,
    pub geometry: Geometry,
    pub material: Material,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<Transform>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fog {
    pub color: Color,
    pub near: f64,
    pub far: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneData {
    pub complexity: Complexity,
    pub background: Color,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fog: Option<Fog>,
    pub objects: Vec<Mesh>,
    pub lights: Vec<Light>,
    pub cameras: Vec<Camera>,
}

// ==================== Fixtures ====================

/// Frame budget for a performance test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceFixture {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: PerformanceKind,
    pub target_fps: u32,
    pub max_frame_time_ms: f64,
    pub max_memory_mb: u32,
    pub duration_ms: u64,
    pub object_count: u32,
}

/// Raw pixel data with a recognisable pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextureFixture {
    pub id: String,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub pattern: TexturePattern,
    pub data: Vec<u8>,
}

/// A failure scenario injected into a test run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorFixture {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    pub message: String,
    pub recoverable: bool,
    pub trigger_after_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteConfig {
    pub id: String,
    pub name: String,
    pub seed: u32,
    pub complexity: Complexity,
    pub viewport: Viewport,
    pub timeout_ms: u64,
    pub retries: u32,
    pub parallel: bool,
}
