//! # SceneSim Data
//!
//! Reproducible synthetic scene content for rendering tests.
//!
//! ## Features
//!
//! - **Seeded generator**: LCG random source plus per-prefix id allocation,
//!   with save/restore snapshots
//! - **Scene data**: meshes, materials, geometries, lights, cameras, textures
//!   and test fixtures drawn in a fixed order
//! - **Suite presets**: named seeds and fixture sets for whole suites
//! - **Validation**: duplicate-id detection over any serializable dataset
//!
//! ## Example
//!
//! ```
//! use scenesim_data::{Complexity, SceneDataGenerator, validate_entities};
//!
//! let mut generator = SceneDataGenerator::new(42);
//! let scene = generator.generate_scene_data(Complexity::Simple);
//! assert!(scene.objects.len() <= 3);
//! assert!(validate_entities(&scene).unwrap().is_empty());
//! ```

pub mod entities;
pub mod error;
pub mod generator;
pub mod scene;
pub mod suite;
pub mod validate;

pub use entities::*;
pub use error::{DataError, DataResult};
pub use generator::{GeneratorState, SeededGenerator};
pub use scene::SceneDataGenerator;
pub use suite::{find_preset, generate_test_suite, SuitePreset, TestCase, TestSuite, PRESETS};
pub use validate::{ensure_valid, validate_dataset, validate_entities};
