//! Synthetic scene data generator.
//!
//! Every method allocates its id first, then draws its randomized fields from
//! the shared [`SeededGenerator`] in the order listed in its docs. The order
//! is fixed: changing it changes every scene reproduced from a given seed.

use crate::entities::*;
use crate::generator::SeededGenerator;
use std::f64::consts::PI;
use tracing::debug;

/// Texture sides, in pixels.
pub const TEXTURE_SIDES: [u32; 4] = [16, 32, 64, 128];

const CHECKER_CELL: u32 = 8;

/// Builds synthetic entities from one seeded generator.
#[derive(Debug, Clone, Default)]
pub struct SceneDataGenerator {
    rng: SeededGenerator,
}

impl SceneDataGenerator {
    pub fn new(seed: u32) -> Self {
        Self::with_generator(SeededGenerator::new(seed))
    }

    pub fn with_generator(rng: SeededGenerator) -> Self {
        Self { rng }
    }

    pub fn generator(&self) -> &SeededGenerator {
        &self.rng
    }

    pub fn generator_mut(&mut self) -> &mut SeededGenerator {
        &mut self.rng
    }

    pub fn into_generator(self) -> SeededGenerator {
        self.rng
    }

    fn pick<T: Copy>(&mut self, options: &[T]) -> T {
        let index = self.rng.random_int(0, options.len() as i64 - 1) as usize;
        options[index]
    }

    /// Three draws: r, g, b.
    fn random_color(&mut self) -> Color {
        Color::new(self.rng.random(), self.rng.random(), self.rng.random())
    }

    /// Three draws: x, y, z.
    fn random_vector(&mut self, min: f64, max: f64) -> Vector3 {
        Vector3::new(
            self.rng.random_float(min, max),
            self.rng.random_float(min, max),
            self.rng.random_float(min, max),
        )
    }

    /// Draws: color, opacity, then per variant
    /// basic: wireframe; standard: roughness, metalness, emissive;
    /// physical: roughness, metalness, clearcoat, clearcoat roughness,
    /// transmission; lambert: emissive.
    pub fn generate_material(&mut self, material_type: MaterialType) -> Material {
        let id = self.rng.generate_unique_id("material");
        let color = self.random_color();
        let opacity = self.rng.random_float(0.5, 1.0);
        let kind = match material_type {
            MaterialType::Basic => MaterialKind::Basic {
                wireframe: self.rng.random_bool(0.1),
            },
            MaterialType::Standard => MaterialKind::Standard {
                roughness: self.rng.random(),
                metalness: self.rng.random(),
                emissive: self.random_color(),
            },
            MaterialType::Physical => MaterialKind::Physical {
                roughness: self.rng.random(),
                metalness: self.rng.random(),
                clearcoat: self.rng.random(),
                clearcoat_roughness: self.rng.random(),
                transmission: self.rng.random(),
            },
            MaterialType::Lambert => MaterialKind::Lambert {
                emissive: self.random_color(),
            },
        };
        Material {
            id,
            color,
            opacity,
            transparent: opacity < 0.95,
            kind,
        }
    }

    /// Draws per variant
    /// box: width, height, depth; sphere: radius, width segments, height
    /// segments; plane: width, height; cylinder: top radius, bottom radius,
    /// height, radial segments.
    pub fn generate_geometry(&mut self, geometry_type: GeometryType) -> Geometry {
        let id = self.rng.generate_unique_id("geometry");
        let kind = match geometry_type {
            GeometryType::Box => GeometryKind::Box {
                width: self.rng.random_float(0.5, 5.0),
                height: self.rng.random_float(0.5, 5.0),
                depth: self.rng.random_float(0.5, 5.0),
            },
            GeometryType::Sphere => GeometryKind::Sphere {
                radius: self.rng.random_float(0.5, 3.0),
                width_segments: self.rng.random_int(8, 64) as u32,
                height_segments: self.rng.random_int(6, 32) as u32,
            },
            GeometryType::Plane => GeometryKind::Plane {
                width: self.rng.random_float(1.0, 20.0),
                height: self.rng.random_float(1.0, 20.0),
            },
            GeometryType::Cylinder => GeometryKind::Cylinder {
                radius_top: self.rng.random_float(0.1, 2.0),
                radius_bottom: self.rng.random_float(0.1, 2.0),
                height: self.rng.random_float(0.5, 5.0),
                radial_segments: self.rng.random_int(8, 32) as u32,
            },
        };
        Geometry { id, kind }
    }

    /// Draws: position, rotation, uniform scale.
    pub fn generate_transform(&mut self) -> Transform {
        Transform {
            position: self.random_vector(-10.0, 10.0),
            rotation: self.random_vector(0.0, 2.0 * PI),
            scale: Vector3::splat(self.rng.random_float(0.5, 2.0)),
        }
    }

    /// Allocates the mesh id, then generates geometry, material and
    /// (optionally) transform in that order.
    pub fn generate_mesh(
        &mut self,
        geometry_type: GeometryType,
        material_type: MaterialType,
        with_transform: bool,
    ) -> Mesh {
        let id = self.rng.generate_unique_id("mesh");
        let geometry = self.generate_geometry(geometry_type);
        let material = self.generate_material(material_type);
        let transform = with_transform.then(|| self.generate_transform());
        Mesh {
            id,
            geometry,
            material,
            transform,
        }
    }

    /// Draws: color, intensity, then per variant
    /// directional: position; point: position, distance, decay;
    /// spot: position, angle, penumbra, distance; hemisphere: sky color,
    /// ground color.
    pub fn generate_light(&mut self, light_type: LightType) -> Light {
        let id = self.rng.generate_unique_id("light");
        let color = self.random_color();
        let intensity = self.rng.random_float(0.1, 2.0);
        let kind = match light_type {
            LightType::Directional => LightKind::Directional {
                position: self.random_vector(-10.0, 10.0),
                target: Vector3::ZERO,
            },
            LightType::Point => LightKind::Point {
                position: self.random_vector(-10.0, 10.0),
                distance: self.rng.random_float(0.0, 100.0),
                decay: self.rng.random_float(1.0, 2.0),
            },
            LightType::Spot => LightKind::Spot {
                position: self.random_vector(-10.0, 10.0),
                angle: self.rng.random_float(PI / 12.0, PI / 3.0),
                penumbra: self.rng.random(),
                distance: self.rng.random_float(0.0, 100.0),
            },
            LightType::Hemisphere => LightKind::Hemisphere {
                sky_color: self.random_color(),
                ground_color: self.random_color(),
            },
        };
        Light {
            id,
            color,
            intensity,
            kind,
        }
    }

    /// Draws: position, then perspective: field of view; orthographic:
    /// half-height.
    pub fn generate_camera(&mut self, camera_type: CameraType, aspect: f64) -> Camera {
        let id = self.rng.generate_unique_id("camera");
        let position = self.random_vector(-20.0, 20.0);
        let kind = match camera_type {
            CameraType::Perspective => CameraKind::Perspective {
                fov: self.rng.random_float(45.0, 75.0),
                aspect,
                near: 0.1,
                far: 1000.0,
            },
            CameraType::Orthographic => {
                let half = self.rng.random_float(5.0, 20.0);
                CameraKind::Orthographic {
                    left: -half * aspect,
                    right: half * aspect,
                    top: half,
                    bottom: -half,
                    near: 0.1,
                    far: 1000.0,
                }
            }
        };
        Camera {
            id,
            position,
            look_at: Vector3::ZERO,
            kind,
        }
    }

    /// Draws: object count, light count, background, fog flag (and fog color,
    /// near, far when set), then per object: geometry type, material type,
    /// mesh; per light: light type, light; finally one perspective camera.
    pub fn generate_scene_data(&mut self, complexity: Complexity) -> SceneData {
        let (min_objects, max_objects) = complexity.object_range();
        let (min_lights, max_lights) = complexity.light_range();
        let object_count = self.rng.random_int(min_objects, max_objects) as usize;
        let light_count = self.rng.random_int(min_lights, max_lights) as usize;

        let background = self.random_color();
        let fog = if self.rng.random_bool(0.3) {
            Some(Fog {
                color: self.random_color(),
                near: self.rng.random_float(1.0, 10.0),
                far: self.rng.random_float(50.0, 200.0),
            })
        } else {
            None
        };

        let objects = (0..object_count)
            .map(|_| {
                let geometry_type = self.pick(GeometryType::ALL);
                let material_type = self.pick(MaterialType::ALL);
                self.generate_mesh(geometry_type, material_type, true)
            })
            .collect();

        let lights = (0..light_count)
            .map(|_| {
                let light_type = self.pick(LightType::ALL);
                self.generate_light(light_type)
            })
            .collect();

        let cameras = vec![self.generate_camera(CameraType::Perspective, 16.0 / 9.0)];

        debug!(%complexity, object_count, light_count, "Generated scene data");

        SceneData {
            complexity,
            background,
            fog,
            objects,
            lights,
            cameras,
        }
    }

    /// Draws: width, height, then the pattern's colors (solid: one;
    /// checkerboard: two; gradient: none; noise: one per channel per pixel).
    pub fn generate_texture(
        &mut self,
        pattern: TexturePattern,
        format: TextureFormat,
    ) -> TextureFixture {
        let id = self.rng.generate_unique_id("texture");
        let width = self.pick(&TEXTURE_SIDES);
        let height = self.pick(&TEXTURE_SIDES);
        let channels = format.channels();
        let pixel_count = (width * height) as usize;
        let mut data = Vec::with_capacity(pixel_count * channels);

        let push_pixel = |data: &mut Vec<u8>, rgb: [u8; 3]| {
            data.extend_from_slice(&rgb);
            if channels == 4 {
                data.push(u8::MAX);
            }
        };

        match pattern {
            TexturePattern::Solid => {
                let rgb = self.random_color().to_rgb8();
                for _ in 0..pixel_count {
                    push_pixel(&mut data, rgb);
                }
            }
            TexturePattern::Checkerboard => {
                let even = self.random_color().to_rgb8();
                let odd = self.random_color().to_rgb8();
                for y in 0..height {
                    for x in 0..width {
                        let cell = (x / CHECKER_CELL + y / CHECKER_CELL) % 2;
                        push_pixel(&mut data, if cell == 0 { even } else { odd });
                    }
                }
            }
            TexturePattern::Gradient => {
                for y in 0..height {
                    for x in 0..width {
                        let r = (x * 255 / (width - 1).max(1)) as u8;
                        let g = (y * 255 / (height - 1).max(1)) as u8;
                        push_pixel(&mut data, [r, g, 128]);
                    }
                }
            }
            TexturePattern::Noise => {
                for _ in 0..pixel_count {
                    for _ in 0..channels {
                        data.push(self.rng.random_int(0, 255) as u8);
                    }
                }
            }
        }

        TextureFixture {
            id,
            width,
            height,
            format,
            pattern,
            data,
        }
    }

    /// Draws: target fps, memory budget, duration, object count.
    pub fn generate_performance_fixture(&mut self, kind: PerformanceKind) -> PerformanceFixture {
        let id = self.rng.generate_unique_id("perf-test");
        let target_fps = self.pick(&[30u32, 60, 120]);
        let max_memory_mb = self.rng.random_int(256, 1024) as u32;
        let duration_ms = self.rng.random_int(1_000, 10_000) as u64;
        let object_count = match kind {
            PerformanceKind::Memory => self.rng.random_int(500, 5_000),
            _ => self.rng.random_int(10, 1_000),
        } as u32;
        PerformanceFixture {
            id,
            kind,
            target_fps,
            max_frame_time_ms: 1000.0 / target_fps as f64,
            max_memory_mb,
            duration_ms,
            object_count,
        }
    }

    /// Draws: trigger delay.
    pub fn generate_error_fixture(&mut self, kind: ErrorKind) -> ErrorFixture {
        let id = self.rng.generate_unique_id("error-test");
        let (message, recoverable) = match kind {
            ErrorKind::ShaderCompile => ("Shader compilation failed: syntax error", false),
            ErrorKind::ContextLost => ("WebGL context lost", true),
            ErrorKind::OutOfMemory => ("Out of GPU memory", false),
            ErrorKind::InvalidGeometry => ("Geometry contains invalid vertex data", true),
            ErrorKind::NetworkTimeout => ("Asset request timed out", true),
        };
        ErrorFixture {
            id,
            kind,
            message: message.to_string(),
            recoverable,
            trigger_after_ms: self.rng.random_int(0, 5_000) as u64,
        }
    }

    /// Draws: seed, complexity, viewport, timeout, retries, parallel flag.
    pub fn generate_suite_config(&mut self) -> SuiteConfig {
        const VIEWPORTS: [Viewport; 3] = [
            Viewport {
                width: 800,
                height: 600,
            },
            Viewport {
                width: 1280,
                height: 720,
            },
            Viewport {
                width: 1920,
                height: 1080,
            },
        ];

        let id = self.rng.generate_unique_id("test-suite");
        let name = format!("Suite {id}");
        SuiteConfig {
            seed: self.rng.random_int(1, 1_000_000) as u32,
            complexity: self.pick(Complexity::ALL),
            viewport: self.pick(&VIEWPORTS),
            timeout_ms: self.rng.random_int(5_000, 30_000) as u64,
            retries: self.rng.random_int(0, 3) as u32,
            parallel: self.rng.random_bool(0.5),
            id,
            name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate_entities;

    #[test]
    fn test_scene_counts_within_bounds() {
        let mut generator = SceneDataGenerator::new(12345);
        for complexity in Complexity::ALL {
            let (min_objects, max_objects) = complexity.object_range();
            let (min_lights, max_lights) = complexity.light_range();
            for _ in 0..20 {
                let scene = generator.generate_scene_data(*complexity);
                let objects = scene.objects.len() as i64;
                let lights = scene.lights.len() as i64;
                assert!((min_objects..=max_objects).contains(&objects));
                assert!((min_lights..=max_lights).contains(&lights));
                assert_eq!(scene.cameras.len(), 1);
                assert_eq!(scene.complexity, *complexity);
            }
        }
    }

    #[test]
    fn test_scene_is_reproducible() {
        let a = SceneDataGenerator::new(42).generate_scene_data(Complexity::Complex);
        let b = SceneDataGenerator::new(42).generate_scene_data(Complexity::Complex);
        assert_eq!(a, b);

        let c = SceneDataGenerator::new(43).generate_scene_data(Complexity::Complex);
        assert_ne!(a, c);
    }

    #[test]
    fn test_generated_scene_has_unique_ids() {
        let mut generator = SceneDataGenerator::new(7);
        let scenes: Vec<SceneData> = (0..5)
            .map(|_| generator.generate_scene_data(Complexity::Medium))
            .collect();
        assert!(validate_entities(&scenes).unwrap().is_empty());
    }

    #[test]
    fn test_mesh_sub_generation_order() {
        let mut generator = SceneDataGenerator::new(1);
        let mesh = generator.generate_mesh(GeometryType::Box, MaterialType::Standard, false);
        assert_eq!(mesh.id, "mesh-1");
        assert_eq!(mesh.geometry.id, "geometry-1");
        assert_eq!(mesh.material.id, "material-1");
        assert!(mesh.transform.is_none());
        assert_eq!(mesh.geometry.geometry_type(), GeometryType::Box);
        assert_eq!(mesh.material.material_type(), MaterialType::Standard);
    }

    #[test]
    fn test_texture_data_length() {
        let mut generator = SceneDataGenerator::new(9);
        for pattern in TexturePattern::ALL {
            for format in TextureFormat::ALL {
                let texture = generator.generate_texture(*pattern, *format);
                assert!(TEXTURE_SIDES.contains(&texture.width));
                assert!(TEXTURE_SIDES.contains(&texture.height));
                assert_eq!(
                    texture.data.len(),
                    (texture.width * texture.height) as usize * format.channels()
                );
            }
        }
    }

    #[test]
    fn test_fixture_ids_use_prefixes() {
        let mut generator = SceneDataGenerator::new(9);
        let perf = generator.generate_performance_fixture(PerformanceKind::Rendering);
        let error = generator.generate_error_fixture(ErrorKind::ContextLost);
        let suite = generator.generate_suite_config();
        assert_eq!(perf.id, "perf-test-1");
        assert_eq!(error.id, "error-test-1");
        assert_eq!(suite.id, "test-suite-1");
        assert!(error.recoverable);
        assert!((perf.max_frame_time_ms - 1000.0 / perf.target_fps as f64).abs() < f64::EPSILON);
    }

    #[test]
    fn test_light_variants() {
        let mut generator = SceneDataGenerator::new(11);
        for light_type in LightType::ALL {
            let light = generator.generate_light(*light_type);
            assert_eq!(light.light_type(), *light_type);
            assert!((0.1..2.0).contains(&light.intensity));
        }
    }
}
