//! # SceneSim Driver
//!
//! An in-process replacement for a browser automation driver.
//!
//! The driver exposes the familiar `initialize` / `cleanup` / `page` surface.
//! Its page evaluates [`ScriptIntent`]s against a simulated WebGL context
//! and a window property map instead of a JavaScript engine.
//!
//! ## Example
//!
//! ```rust,ignore
//! let registry = InstanceRegistry::new();
//! let mut driver = SimulatedDriver::new(DriverConfig::default(), registry.clone());
//! driver.initialize().await?;
//!
//! let page = driver.page()?;
//! page.set_content("<script src=\"three.js\"></script>").await?;
//! page.wait_for_function(&ScriptIntent::read("threeJSLoaded"), page.default_wait_options()).await?;
//!
//! driver.cleanup().await;
//! ```

pub mod config;
pub mod driver;
pub mod error;
pub mod page;
pub mod registry;
pub mod script;

pub use config::{DriverConfig, WaitOptions};
pub use driver::SimulatedDriver;
pub use error::{DriverError, DriverResult};
pub use page::{EventHandler, PageEvent, SimulatedPage, THREE_REVISION};
pub use registry::{InstanceLease, InstanceRegistry};
pub use script::{
    is_truthy, GraphicsContextSnapshot, RendererSnapshot, SceneSnapshot, ScriptEnv, ScriptFn,
    ScriptIntent,
};
