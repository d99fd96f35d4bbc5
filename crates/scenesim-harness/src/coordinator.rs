//! Test isolation coordinator.
//!
//! One coordinator owns one generator, one simulated driver and one pair of
//! trackers. Two coordinators never share mutable state apart from an
//! explicitly shared [`InstanceRegistry`].

use crate::config::CoordinatorConfig;
use crate::error::{HarnessError, HarnessResult};
use crate::results::{TestExpectations, TestResult, TestRunRecord, TestSummary};
use crate::template::{generate_three_js_test_html, HtmlOptions};
use crate::tracker::{PerformanceTracker, ResourceTracker};
use crate::validators::{
    self, GraphicsContextExpectations, RendererExpectations, SceneExpectations,
};
use scenesim_data::*;
use scenesim_driver::{
    DriverConfig, GraphicsContextSnapshot, InstanceRegistry, RendererSnapshot, SceneSnapshot,
    ScriptIntent, SimulatedDriver, SimulatedPage,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Window property the test script publishes its outcome under.
pub const TEST_RESULTS_PROPERTY: &str = "testResults";

/// Kinds accepted by [`IsolationCoordinator::generate_test_data`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataKind {
    Scene,
    Mesh,
    Material,
    Geometry,
    Light,
    Camera,
    Texture,
    Performance,
    Error,
    SuiteConfig,
}

impl DataKind {
    pub const ALL: &'static [DataKind] = &[
        DataKind::Scene,
        DataKind::Mesh,
        DataKind::Material,
        DataKind::Geometry,
        DataKind::Light,
        DataKind::Camera,
        DataKind::Texture,
        DataKind::Performance,
        DataKind::Error,
        DataKind::SuiteConfig,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DataKind::Scene => "scene",
            DataKind::Mesh => "mesh",
            DataKind::Material => "material",
            DataKind::Geometry => "geometry",
            DataKind::Light => "light",
            DataKind::Camera => "camera",
            DataKind::Texture => "texture",
            DataKind::Performance => "performance",
            DataKind::Error => "error",
            DataKind::SuiteConfig => "suite-config",
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataKind {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataKind::ALL
            .iter()
            .find(|kind| kind.as_str() == s)
            .copied()
            .ok_or_else(|| HarnessError::UnknownDataKind(s.to_string()))
    }
}

/// Output of [`IsolationCoordinator::generate_test_data`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TestData {
    Scene(SceneData),
    Mesh(Mesh),
    Material(Material),
    Geometry(Geometry),
    Light(Light),
    Camera(Camera),
    Texture(TextureFixture),
    Performance(PerformanceFixture),
    Error(ErrorFixture),
    SuiteConfig(SuiteConfig),
}

impl TestData {
    pub fn as_scene(&self) -> Option<&SceneData> {
        match self {
            TestData::Scene(scene) => Some(scene),
            _ => None,
        }
    }

    pub fn to_json(&self) -> HarnessResult<Value> {
        serde_json::to_value(self).map_err(|e| HarnessError::Data(e.into()))
    }
}

fn parse_variant<T: FromStr<Err = DataError>>(variant: Option<&str>, default: T) -> HarnessResult<T> {
    match variant {
        Some(name) => Ok(name.parse()?),
        None => Ok(default),
    }
}

/// Composes a generator, a simulated driver and trackers into one isolated
/// test context.
#[derive(Debug)]
pub struct IsolationCoordinator {
    config: CoordinatorConfig,
    registry: InstanceRegistry,
    data: SceneDataGenerator,
    driver: Option<SimulatedDriver>,
    suite_config: Option<SuiteConfig>,
    resource_tracker: ResourceTracker,
    performance_tracker: PerformanceTracker,
    summary: TestSummary,
    is_setup: bool,
}

impl IsolationCoordinator {
    /// A coordinator with its own registry.
    pub fn new(config: CoordinatorConfig) -> Self {
        Self::with_registry(config, InstanceRegistry::new())
    }

    /// A coordinator counting its driver in a shared registry.
    pub fn with_registry(config: CoordinatorConfig, registry: InstanceRegistry) -> Self {
        let interval = Duration::from_millis(config.performance_interval_ms);
        Self {
            data: SceneDataGenerator::new(config.seed),
            resource_tracker: ResourceTracker::new(registry.clone()),
            performance_tracker: PerformanceTracker::with_interval(
                registry.clone(),
                config.seed,
                interval,
            ),
            registry,
            driver: None,
            suite_config: None,
            summary: TestSummary::new(),
            is_setup: false,
            config,
        }
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    pub fn registry(&self) -> &InstanceRegistry {
        &self.registry
    }

    pub fn is_setup(&self) -> bool {
        self.is_setup
    }

    /// Suite config generated by the last setup.
    pub fn suite_config(&self) -> Option<&SuiteConfig> {
        self.suite_config.as_ref()
    }

    pub fn generator(&self) -> &SeededGenerator {
        self.data.generator()
    }

    pub fn resource_tracker(&self) -> &ResourceTracker {
        &self.resource_tracker
    }

    pub fn performance_tracker(&self) -> &PerformanceTracker {
        &self.performance_tracker
    }

    pub fn summary(&self) -> &TestSummary {
        &self.summary
    }

    /// Bring the test context up.
    ///
    /// Installs the graphics globals, initializes a driver sized from a
    /// generated suite config, then starts the enabled trackers.
    pub async fn setup(&mut self) -> HarnessResult<()> {
        if self.is_setup {
            return Err(HarnessError::AlreadySetup);
        }

        let suite = self.data.generate_suite_config();
        let driver_config = DriverConfig {
            install_graphics_globals: true,
            ..DriverConfig::default().with_viewport(suite.viewport)
        };
        let mut driver = SimulatedDriver::new(driver_config, self.registry.clone());
        driver.initialize().await?;

        if self.config.track_resources {
            self.resource_tracker.start_tracking();
        }
        if self.config.track_performance {
            self.performance_tracker.start_tracking();
        }

        info!(
            coordinator = %self.config.name,
            suite = %suite.id,
            width = suite.viewport.width,
            height = suite.viewport.height,
            "Test context set up"
        );
        self.driver = Some(driver);
        self.suite_config = Some(suite);
        self.is_setup = true;
        Ok(())
    }

    /// Tear the test context down in reverse order. A no-op when not set up.
    pub async fn cleanup(&mut self) {
        if !self.is_setup {
            debug!(coordinator = %self.config.name, "Cleanup without setup");
            return;
        }

        self.performance_tracker.stop_tracking().await;
        self.resource_tracker.stop_tracking();
        if let Some(mut driver) = self.driver.take() {
            driver.cleanup().await;
        }
        self.data.generator_mut().reset_counters();
        self.is_setup = false;
        info!(coordinator = %self.config.name, "Test context cleaned up");
    }

    /// Generate one entity of `kind`, with an optional variant name
    /// (`"simple"`, `"sphere"`, `"checkerboard"`, …).
    pub fn generate_test_data(&mut self, kind: &str, variant: Option<&str>) -> HarnessResult<TestData> {
        let kind: DataKind = kind.parse()?;
        let data = &mut self.data;
        let generated = match kind {
            DataKind::Scene => TestData::Scene(
                data.generate_scene_data(parse_variant(variant, self.config.default_complexity)?),
            ),
            DataKind::Mesh => TestData::Mesh(data.generate_mesh(
                parse_variant(variant, GeometryType::Box)?,
                MaterialType::Standard,
                true,
            )),
            DataKind::Material => {
                TestData::Material(data.generate_material(parse_variant(variant, MaterialType::Standard)?))
            }
            DataKind::Geometry => {
                TestData::Geometry(data.generate_geometry(parse_variant(variant, GeometryType::Box)?))
            }
            DataKind::Light => {
                TestData::Light(data.generate_light(parse_variant(variant, LightType::Directional)?))
            }
            DataKind::Camera => TestData::Camera(
                data.generate_camera(parse_variant(variant, CameraType::Perspective)?, 16.0 / 9.0),
            ),
            DataKind::Texture => TestData::Texture(data.generate_texture(
                parse_variant(variant, TexturePattern::Checkerboard)?,
                TextureFormat::Rgba,
            )),
            DataKind::Performance => TestData::Performance(
                data.generate_performance_fixture(parse_variant(variant, PerformanceKind::Rendering)?),
            ),
            DataKind::Error => TestData::Error(
                data.generate_error_fixture(parse_variant(variant, ErrorKind::ShaderCompile)?),
            ),
            DataKind::SuiteConfig => TestData::SuiteConfig(data.generate_suite_config()),
        };
        debug!(%kind, variant, "Generated test data");
        Ok(generated)
    }

    /// The live page.
    pub fn page(&mut self) -> HarnessResult<&mut SimulatedPage> {
        let driver = self.driver.as_mut().ok_or(HarnessError::NotInitialized)?;
        Ok(driver.page()?)
    }

    /// Evaluate a script on the page.
    pub async fn execute_script(&mut self, script: &ScriptIntent) -> HarnessResult<Value> {
        Ok(self.page()?.evaluate(script).await?)
    }

    /// Load a generated test page into the driver.
    pub async fn load_test_page(&mut self, script: &str, options: &HtmlOptions) -> HarnessResult<()> {
        let html = generate_three_js_test_html(script, options);
        Ok(self.page()?.set_content(&html).await?)
    }

    /// Build a test page around `script`.
    pub fn generate_three_js_test_html(&self, script: &str, options: &HtmlOptions) -> String {
        generate_three_js_test_html(script, options)
    }

    /// Check the outcome the test script published under `window.testResults`.
    ///
    /// Every outcome is recorded in the summary.
    pub async fn assert_test_state(
        &mut self,
        expectations: &TestExpectations,
    ) -> HarnessResult<TestResult> {
        let value = self
            .execute_script(&ScriptIntent::read(TEST_RESULTS_PROPERTY))
            .await?;

        if value.is_null() {
            let reason = "No test results found on window.testResults".to_string();
            self.summary
                .add(TestResult::error(&expectations.name, &reason));
            return Err(HarnessError::validation(reason));
        }

        let record: TestRunRecord = match serde_json::from_value(value) {
            Ok(record) => record,
            Err(e) => {
                let reason = format!("Malformed test results: {e}");
                self.summary
                    .add(TestResult::error(&expectations.name, &reason));
                return Err(HarnessError::validation(reason));
            }
        };

        let violations = expectations.violations(&record);
        if violations.is_empty() {
            let result = TestResult::pass(&expectations.name, record.duration);
            self.summary.add(result.clone());
            return Ok(result);
        }

        warn!(test = %expectations.name, ?violations, "Test state assertion failed");
        let reason = violations.join("; ");
        self.summary
            .add(TestResult::fail(&expectations.name, record.duration, &reason));
        Err(HarnessError::ValidationFailure { reason, violations })
    }

    async fn snapshot<T: DeserializeOwned>(&mut self, script: ScriptIntent) -> HarnessResult<Option<T>> {
        let value = self.execute_script(&script).await?;
        serde_json::from_value(value).map_err(|e| HarnessError::validation(format!("Malformed snapshot: {e}")))
    }

    pub async fn validate_scene(&mut self, expectations: &SceneExpectations) -> HarnessResult<SceneSnapshot> {
        let snapshot: Option<SceneSnapshot> = self.snapshot(ScriptIntent::SceneSnapshot).await?;
        validators::validate_scene(snapshot.as_ref(), expectations)?;
        snapshot.ok_or_else(|| HarnessError::validation("Scene not found"))
    }

    pub async fn validate_renderer(
        &mut self,
        expectations: &RendererExpectations,
    ) -> HarnessResult<RendererSnapshot> {
        let snapshot: Option<RendererSnapshot> = self.snapshot(ScriptIntent::RendererSnapshot).await?;
        validators::validate_renderer(snapshot.as_ref(), expectations)?;
        snapshot.ok_or_else(|| HarnessError::validation("Renderer not found"))
    }

    pub async fn validate_graphics_context(
        &mut self,
        expectations: &GraphicsContextExpectations,
    ) -> HarnessResult<GraphicsContextSnapshot> {
        let snapshot: Option<GraphicsContextSnapshot> = self
            .snapshot(ScriptIntent::GraphicsContextProbe { webgl2: false })
            .await?;
        validators::validate_graphics_context(snapshot.as_ref(), expectations)?;
        snapshot.ok_or_else(|| HarnessError::validation("WebGL context not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn quiet() -> CoordinatorConfig {
        CoordinatorConfig::named("unit").with_tracking(true, false)
    }

    #[tokio::test]
    async fn test_setup_twice_fails() {
        let mut coordinator = IsolationCoordinator::new(quiet());
        coordinator.setup().await.unwrap();
        assert!(matches!(
            coordinator.setup().await,
            Err(HarnessError::AlreadySetup)
        ));
        coordinator.cleanup().await;
        coordinator.setup().await.unwrap();
        coordinator.cleanup().await;
    }

    #[tokio::test]
    async fn test_cleanup_without_setup() {
        let mut coordinator = IsolationCoordinator::new(quiet());
        coordinator.cleanup().await;
        assert!(!coordinator.is_setup());
    }

    #[tokio::test]
    async fn test_execute_script_requires_setup() {
        let mut coordinator = IsolationCoordinator::new(quiet());
        let err = coordinator
            .execute_script(&ScriptIntent::ContentQuery)
            .await
            .unwrap_err();
        assert!(matches!(err, HarnessError::NotInitialized));
    }

    #[tokio::test]
    async fn test_setup_sizes_driver_from_suite_config() {
        let mut coordinator = IsolationCoordinator::new(quiet());
        coordinator.setup().await.unwrap();
        let viewport = coordinator.suite_config().unwrap().viewport;
        assert_eq!(coordinator.page().unwrap().viewport(), viewport);
        assert!(coordinator.page().unwrap().has_graphics_globals());
        assert_eq!(coordinator.registry().count(), 1);

        coordinator.cleanup().await;
        assert_eq!(coordinator.registry().count(), 0);
        assert!(matches!(coordinator.page(), Err(HarnessError::NotInitialized)));
    }

    #[tokio::test]
    async fn test_generate_test_data_dispatch() {
        let mut coordinator = IsolationCoordinator::new(quiet());
        for kind in DataKind::ALL {
            let data = coordinator.generate_test_data(kind.as_str(), None).unwrap();
            assert!(data.to_json().unwrap().is_object(), "{kind}");
        }

        let light = coordinator.generate_test_data("light", Some("spot")).unwrap();
        assert!(matches!(light, TestData::Light(ref l) if l.light_type() == LightType::Spot));

        assert!(matches!(
            coordinator.generate_test_data("shader", None),
            Err(HarnessError::UnknownDataKind(kind)) if kind == "shader"
        ));
        assert!(matches!(
            coordinator.generate_test_data("geometry", Some("torus")),
            Err(HarnessError::Data(DataError::UnknownVariant { .. }))
        ));
    }

    #[tokio::test]
    async fn test_cleanup_resets_generator_counters() {
        let mut coordinator = IsolationCoordinator::new(quiet());
        coordinator.setup().await.unwrap();
        let first = coordinator.generate_test_data("material", None).unwrap();
        coordinator.cleanup().await;

        coordinator.setup().await.unwrap();
        let again = coordinator.generate_test_data("material", None).unwrap();
        assert_eq!(first, again);
        coordinator.cleanup().await;
    }

    #[tokio::test]
    async fn test_assert_test_state() {
        let mut coordinator = IsolationCoordinator::new(quiet());
        coordinator.setup().await.unwrap();

        let missing = coordinator
            .assert_test_state(&TestExpectations::named("missing"))
            .await
            .unwrap_err();
        assert_eq!(missing.category(), "validation");

        coordinator
            .execute_script(&ScriptIntent::write(
                TEST_RESULTS_PROPERTY,
                json!({ "success": true, "duration": 40.0 }),
            ))
            .await
            .unwrap();
        let result = coordinator
            .assert_test_state(&TestExpectations::named("fast").max_duration(100.0))
            .await
            .unwrap();
        assert!(result.is_pass());

        let err = coordinator
            .assert_test_state(&TestExpectations::named("slow").min_duration(50.0))
            .await
            .unwrap_err();
        assert_eq!(err.violations().len(), 1);

        coordinator
            .execute_script(&ScriptIntent::write(
                TEST_RESULTS_PROPERTY,
                json!({ "success": false, "duration": 5.0, "error": "context lost" }),
            ))
            .await
            .unwrap();
        let err = coordinator
            .assert_test_state(&TestExpectations::named("broken"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("context lost"));
        assert!(coordinator
            .assert_test_state(&TestExpectations::named("expected-failure").allow_failure())
            .await
            .is_ok());

        let summary = coordinator.summary();
        assert_eq!(summary.total, 5);
        assert_eq!(summary.passed, 2);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.errors, 1);
        coordinator.cleanup().await;
    }

    #[tokio::test]
    async fn test_validate_wrappers() {
        let mut coordinator = IsolationCoordinator::new(quiet());
        coordinator.setup().await.unwrap();

        let missing = coordinator
            .validate_scene(&SceneExpectations::default())
            .await
            .unwrap_err();
        assert!(missing.to_string().contains("Scene not found"));

        coordinator
            .load_test_page("const scene = new THREE.Scene();", &HtmlOptions::default())
            .await
            .unwrap();
        let scene = coordinator.generate_test_data("scene", Some("simple")).unwrap();
        if let TestData::Scene(scene) = scene {
            coordinator
                .execute_script(&ScriptIntent::SceneConstruction(scene))
                .await
                .unwrap();
        }
        let snapshot = coordinator
            .validate_scene(&SceneExpectations {
                min_objects: Some(1),
                max_objects: Some(3),
                min_lights: None,
            })
            .await
            .unwrap();
        assert!(snapshot.object_count <= 3);

        coordinator
            .execute_script(&ScriptIntent::RendererConstruction {
                width: 320,
                height: 240,
                antialias: true,
            })
            .await
            .unwrap();
        let err = coordinator
            .validate_renderer(&RendererExpectations {
                min_width: 640,
                min_height: 480,
            })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("320x240"));

        let context = coordinator
            .validate_graphics_context(&GraphicsContextExpectations {
                min_max_texture_size: Some(4096),
                required_extensions: vec!["WEBGL_debug_renderer_info".to_string()],
            })
            .await
            .unwrap();
        assert_eq!(context.vendor, "SceneSim");
        coordinator.cleanup().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_performance_interval_still_samples() {
        let config = CoordinatorConfig {
            performance_interval_ms: 0,
            ..CoordinatorConfig::named("zero-interval")
        };
        let mut coordinator = IsolationCoordinator::new(config);
        coordinator.setup().await.unwrap();
        tokio::time::sleep(Duration::from_millis(3)).await;
        coordinator.cleanup().await;

        let info = coordinator.performance_tracker().get_info();
        assert!(!info.samples.is_empty());
    }

    #[tokio::test]
    async fn test_resource_tracking_over_setup() {
        let registry = InstanceRegistry::new();
        let mut coordinator = IsolationCoordinator::with_registry(quiet(), registry.clone());
        coordinator.setup().await.unwrap();
        assert!(coordinator.resource_tracker().is_tracking());
        coordinator.cleanup().await;
        let usage = coordinator.resource_tracker().get_usage().unwrap();
        assert_eq!(usage.browser_instances, 0);
    }
}
