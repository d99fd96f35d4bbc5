//! # SceneSim Harness
//!
//! Test isolation for rendering code running against a simulated browser.
//!
//! An [`IsolationCoordinator`] composes:
//!
//! - a seeded [`SceneDataGenerator`](scenesim_data::SceneDataGenerator) for fixtures
//! - a [`SimulatedDriver`](scenesim_driver::SimulatedDriver) with graphics globals installed
//! - optional resource and performance trackers
//!
//! ## Example
//!
//! ```no_run
//! use scenesim_harness::{CoordinatorConfig, IsolationCoordinator, SceneExpectations};
//! use scenesim_driver::ScriptIntent;
//!
//! # async fn run() -> scenesim_harness::HarnessResult<()> {
//! let mut coordinator = IsolationCoordinator::new(CoordinatorConfig::named("lighting"));
//! coordinator.setup().await?;
//!
//! let scene = coordinator.generate_test_data("scene", Some("simple"))?;
//! if let Some(scene) = scene.as_scene() {
//!     coordinator.load_test_page("", &Default::default()).await?;
//!     coordinator
//!         .execute_script(&ScriptIntent::SceneConstruction(scene.clone()))
//!         .await?;
//! }
//! coordinator.validate_scene(&SceneExpectations::default()).await?;
//!
//! coordinator.cleanup().await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod coordinator;
pub mod error;
pub mod results;
pub mod template;
pub mod tracker;
pub mod validators;

pub use config::CoordinatorConfig;
pub use coordinator::{DataKind, IsolationCoordinator, TestData, TEST_RESULTS_PROPERTY};
pub use error::{HarnessError, HarnessResult};
pub use results::{TestExpectations, TestResult, TestRunRecord, TestStatus, TestSummary};
pub use template::{generate_three_js_test_html, HtmlOptions};
pub use tracker::{
    PerformanceInfo, PerformanceSample, PerformanceTracker, ResourceSnapshot, ResourceTracker,
    ResourceUsage,
};
pub use validators::{
    validate_graphics_context, validate_renderer, validate_scene, GraphicsContextExpectations,
    RendererExpectations, SceneExpectations, ValidationIssue,
};
