//! Named suite presets and whole-suite generation.

use crate::entities::*;
use crate::error::{DataError, DataResult};
use crate::scene::SceneDataGenerator;
use serde::{Deserialize, Serialize};
use tracing::info;

/// A named bundle of seed, complexity and auxiliary fixture kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SuitePreset {
    pub name: &'static str,
    pub seed: u32,
    pub complexity: Complexity,
    pub performance: Option<PerformanceKind>,
    pub error: Option<ErrorKind>,
}

pub const PRESETS: &[SuitePreset] = &[
    SuitePreset {
        name: "smoke",
        seed: 12345,
        complexity: Complexity::Simple,
        performance: None,
        error: None,
    },
    SuitePreset {
        name: "regression",
        seed: 42,
        complexity: Complexity::Medium,
        performance: Some(PerformanceKind::Rendering),
        error: None,
    },
    SuitePreset {
        name: "performance",
        seed: 1337,
        complexity: Complexity::Complex,
        performance: Some(PerformanceKind::Rendering),
        error: None,
    },
    SuitePreset {
        name: "stress",
        seed: 9001,
        complexity: Complexity::Complex,
        performance: Some(PerformanceKind::Memory),
        error: Some(ErrorKind::ContextLost),
    },
    SuitePreset {
        name: "error-handling",
        seed: 999,
        complexity: Complexity::Simple,
        performance: None,
        error: Some(ErrorKind::ShaderCompile),
    },
];

/// Look up a preset by name.
pub fn find_preset(name: &str) -> DataResult<&'static SuitePreset> {
    PRESETS
        .iter()
        .find(|preset| preset.name == name)
        .ok_or_else(|| DataError::UnknownPreset(name.to_string()))
}

/// One generated test case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub id: String,
    pub scene: SceneData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance: Option<PerformanceFixture>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorFixture>,
}

/// A generated suite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestSuite {
    pub preset: String,
    pub config: SuiteConfig,
    pub tests: Vec<TestCase>,
}

/// Generate `test_count` cases for a preset.
///
/// A fresh generator seeded from the preset is shared across every case, so
/// ids are unique across the whole suite and the result depends only on the
/// arguments.
pub fn generate_test_suite(preset_name: &str, test_count: usize) -> DataResult<TestSuite> {
    let preset = find_preset(preset_name)?;
    let mut generator = SceneDataGenerator::new(preset.seed);

    let mut config = generator.generate_suite_config();
    config.name = preset.name.to_string();
    config.seed = preset.seed;
    config.complexity = preset.complexity;

    let tests = (0..test_count)
        .map(|_| {
            let id = generator.generator_mut().generate_unique_id("test-case");
            let scene = generator.generate_scene_data(preset.complexity);
            let performance = preset
                .performance
                .map(|kind| generator.generate_performance_fixture(kind));
            let error = preset
                .error
                .map(|kind| generator.generate_error_fixture(kind));
            TestCase {
                id,
                scene,
                performance,
                error,
            }
        })
        .collect();

    info!(preset = preset.name, test_count, "Generated test suite");

    Ok(TestSuite {
        preset: preset.name.to_string(),
        config,
        tests,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate_entities;

    #[test]
    fn test_unknown_preset() {
        assert!(matches!(
            generate_test_suite("nightly", 3),
            Err(DataError::UnknownPreset(name)) if name == "nightly"
        ));
    }

    #[test]
    fn test_preset_fixtures() {
        let suite = generate_test_suite("stress", 2).unwrap();
        assert_eq!(suite.tests.len(), 2);
        assert_eq!(suite.config.seed, 9001);
        for case in &suite.tests {
            assert_eq!(case.scene.complexity, Complexity::Complex);
            assert_eq!(
                case.performance.as_ref().map(|p| p.kind),
                Some(PerformanceKind::Memory)
            );
            assert_eq!(case.error.as_ref().map(|e| e.kind), Some(ErrorKind::ContextLost));
        }

        let smoke = generate_test_suite("smoke", 1).unwrap();
        assert!(smoke.tests[0].performance.is_none());
        assert!(smoke.tests[0].error.is_none());
    }

    #[test]
    fn test_suite_is_deterministic() {
        let a = generate_test_suite("regression", 4).unwrap();
        let b = generate_test_suite("regression", 4).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_suite_ids_unique() {
        for preset in PRESETS {
            let suite = generate_test_suite(preset.name, 5).unwrap();
            assert!(validate_entities(&suite).unwrap().is_empty(), "{}", preset.name);
        }
    }

    #[test]
    fn test_empty_suite() {
        let suite = generate_test_suite("smoke", 0).unwrap();
        assert!(suite.tests.is_empty());
    }
}
