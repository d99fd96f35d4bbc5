//! Simulated page.

use crate::config::{DriverConfig, WaitOptions};
use crate::error::{DriverError, DriverResult};
use crate::script::{
    is_truthy, read_path, write_path, GraphicsContextSnapshot, RendererSnapshot, SceneSnapshot,
    ScriptEnv, ScriptIntent,
};
use scenesim_common::{PollError, PollSchedule};
use scenesim_data::{Mesh, SceneData, Viewport};
use scenesim_webgl::{constants, WebGLRenderingContext};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, trace, warn};

/// Revision reported by the simulated rendering library.
pub const THREE_REVISION: &str = "160";

/// Constructors exposed on the simulated `THREE` global.
const THREE_SYMBOLS: &[&str] = &[
    "Scene",
    "PerspectiveCamera",
    "OrthographicCamera",
    "WebGLRenderer",
    "Mesh",
    "Group",
    "BoxGeometry",
    "SphereGeometry",
    "PlaneGeometry",
    "CylinderGeometry",
    "MeshBasicMaterial",
    "MeshStandardMaterial",
    "MeshPhysicalMaterial",
    "MeshLambertMaterial",
    "DirectionalLight",
    "PointLight",
    "SpotLight",
    "HemisphereLight",
    "Color",
    "Vector3",
    "Fog",
];

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1A, b'\n'];

/// Page events a listener can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageEvent {
    Console,
    Load,
    PageError,
}

impl PageEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageEvent::Console => "console",
            PageEvent::Load => "load",
            PageEvent::PageError => "pageerror",
        }
    }
}

impl fmt::Display for PageEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PageEvent {
    type Err = DriverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "console" => Ok(PageEvent::Console),
            "load" => Ok(PageEvent::Load),
            "pageerror" => Ok(PageEvent::PageError),
            other => Err(DriverError::evaluation(format!("unsupported page event: {other}"))),
        }
    }
}

/// Event listener. Receives the console text, the loaded URL, or the error
/// message.
pub type EventHandler = Box<dyn Fn(&str) + Send + Sync>;

/// The page half of a simulated browser session.
pub struct SimulatedPage {
    viewport: Viewport,
    content: String,
    url: String,
    window: Map<String, Value>,
    gl: WebGLRenderingContext,
    graphics_globals: bool,
    three_loaded: bool,
    scene: Option<SceneData>,
    renderer: Option<RendererSnapshot>,
    listeners: HashMap<PageEvent, Vec<EventHandler>>,
    wait_options: WaitOptions,
}

impl fmt::Debug for SimulatedPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulatedPage")
            .field("viewport", &self.viewport)
            .field("url", &self.url)
            .field("three_loaded", &self.three_loaded)
            .field("graphics_globals", &self.graphics_globals)
            .finish_non_exhaustive()
    }
}

impl SimulatedPage {
    pub fn new(config: &DriverConfig) -> Self {
        let viewport = config.viewport;
        let mut page = Self {
            viewport,
            content: String::new(),
            url: "about:blank".to_string(),
            window: Map::new(),
            gl: WebGLRenderingContext::new(viewport.width, viewport.height),
            graphics_globals: false,
            three_loaded: false,
            scene: None,
            renderer: None,
            listeners: HashMap::new(),
            wait_options: config.wait_options(),
        };
        if config.install_graphics_globals {
            page.install_graphics_globals();
        }
        page
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_three_loaded(&self) -> bool {
        self.three_loaded
    }

    pub fn has_graphics_globals(&self) -> bool {
        self.graphics_globals
    }

    pub fn graphics_context(&self) -> &WebGLRenderingContext {
        &self.gl
    }

    pub fn graphics_context_mut(&mut self) -> &mut WebGLRenderingContext {
        &mut self.gl
    }

    pub fn default_wait_options(&self) -> WaitOptions {
        self.wait_options
    }

    /// Expose the simulated graphics context to scripts.
    pub fn install_graphics_globals(&mut self) {
        if self.graphics_globals {
            return;
        }
        self.graphics_globals = true;
        self.window
            .insert("WebGLRenderingContext".to_string(), json!("function"));
        self.window
            .insert("HTMLCanvasElement".to_string(), json!("function"));
        debug!("Installed graphics context globals");
    }

    fn install_three(&mut self) {
        let mut three = Map::new();
        three.insert("REVISION".to_string(), json!(THREE_REVISION));
        for symbol in THREE_SYMBOLS {
            three.insert(symbol.to_string(), json!("function"));
        }
        self.window.insert("THREE".to_string(), Value::Object(three));
        self.window.insert("threeJSLoaded".to_string(), json!(true));
        self.three_loaded = true;
        debug!(revision = THREE_REVISION, "Installed rendering library globals");
    }

    /// Register a listener.
    pub fn on(&mut self, event: PageEvent, handler: EventHandler) {
        self.listeners.entry(event).or_default().push(handler);
    }

    fn emit(&self, event: PageEvent, payload: &str) {
        if let Some(handlers) = self.listeners.get(&event) {
            for handler in handlers {
                handler(payload);
            }
        }
    }

    /// Replace the page content.
    ///
    /// Content mentioning `three` gets the rendering library globals.
    pub async fn set_content(&mut self, html: &str) -> DriverResult<()> {
        self.content = html.to_string();
        if !self.three_loaded && html.to_ascii_lowercase().contains("three") {
            self.install_three();
        }
        trace!(bytes = html.len(), "Content set");
        self.emit(PageEvent::Load, &self.url);
        Ok(())
    }

    /// Record a navigation. Nothing is fetched.
    pub async fn goto(&mut self, url: &str) -> DriverResult<()> {
        self.url = url.to_string();
        self.content.clear();
        debug!(url, "Navigated");
        self.emit(PageEvent::Load, url);
        Ok(())
    }

    /// Placeholder image: the PNG signature followed by the viewport size.
    pub async fn screenshot(&self) -> DriverResult<Vec<u8>> {
        let mut bytes = PNG_SIGNATURE.to_vec();
        bytes.extend_from_slice(&self.viewport.width.to_be_bytes());
        bytes.extend_from_slice(&self.viewport.height.to_be_bytes());
        Ok(bytes)
    }

    /// Resize the page and its graphics context.
    pub async fn set_viewport(&mut self, viewport: Viewport) -> DriverResult<()> {
        self.viewport = viewport;
        self.gl.resize(viewport.width, viewport.height);
        Ok(())
    }

    /// Evaluate a script.
    ///
    /// Failures are also reported to `pageerror` listeners.
    pub async fn evaluate(&mut self, script: &ScriptIntent) -> DriverResult<Value> {
        self.evaluate_now(script)
    }

    fn evaluate_now(&mut self, script: &ScriptIntent) -> DriverResult<Value> {
        trace!(?script, "Evaluating");
        let result = self.dispatch(script);
        if let Err(DriverError::Evaluation(message)) = &result {
            self.emit(PageEvent::PageError, message);
        }
        result
    }

    fn dispatch(&mut self, script: &ScriptIntent) -> DriverResult<Value> {
        if script.requires_three() && !self.three_loaded {
            return Err(DriverError::evaluation("THREE is not defined"));
        }

        let value = match script {
            ScriptIntent::SceneConstruction(scene) => {
                let snapshot = SceneSnapshot::of(scene);
                self.scene = Some(scene.clone());
                scene_echo(&snapshot)
            }
            ScriptIntent::MeshConstruction(mesh) => {
                if let Some(scene) = self.scene.as_mut() {
                    scene.objects.push(mesh.clone());
                }
                mesh_echo(mesh)
            }
            ScriptIntent::RendererConstruction {
                width,
                height,
                antialias,
            } => {
                let renderer = RendererSnapshot {
                    width: *width,
                    height: *height,
                    antialias: *antialias,
                };
                self.renderer = Some(renderer);
                json!({
                    "type": "WebGLRenderer",
                    "domElement": { "width": width, "height": height },
                    "antialias": antialias,
                })
            }
            ScriptIntent::SceneSnapshot => match &self.scene {
                Some(scene) => serde_json::to_value(SceneSnapshot::of(scene))
                    .map_err(|e| DriverError::evaluation(e.to_string()))?,
                None => Value::Null,
            },
            ScriptIntent::RendererSnapshot => match &self.renderer {
                Some(renderer) => serde_json::to_value(renderer)
                    .map_err(|e| DriverError::evaluation(e.to_string()))?,
                None => Value::Null,
            },
            ScriptIntent::GraphicsContextProbe { webgl2 } => {
                match self.snapshot_graphics_context(*webgl2) {
                    Some(snapshot) => serde_json::to_value(snapshot)
                        .map_err(|e| DriverError::evaluation(e.to_string()))?,
                    None => Value::Null,
                }
            }
            ScriptIntent::WindowPropertyRead(path) => read_path(&self.window, path),
            ScriptIntent::WindowPropertyWrite { path, value } => {
                write_path(&mut self.window, path, value.clone());
                value.clone()
            }
            ScriptIntent::ContentQuery => Value::String(self.content.clone()),
            ScriptIntent::Closure(f) => {
                let mut env = ScriptEnv::new(&mut self.window, &mut self.gl, &self.content);
                let value = f(&mut env);
                let console = std::mem::take(&mut env.console);
                for line in &console {
                    self.emit(PageEvent::Console, line);
                }
                value
            }
            ScriptIntent::Opaque(source) => self.evaluate_opaque(source),
        };
        Ok(value)
    }

    fn evaluate_opaque(&self, source: &str) -> Value {
        let source = source.trim();
        if let Ok(value) = serde_json::from_str(source) {
            return value;
        }
        if source.starts_with("window.") {
            return read_path(&self.window, source);
        }
        trace!(source, "Unrecognized script evaluates to null");
        Value::Null
    }

    fn snapshot_graphics_context(&self, webgl2: bool) -> Option<GraphicsContextSnapshot> {
        if webgl2 || !self.graphics_globals {
            return None;
        }
        let text = |pname| {
            self.gl
                .get_parameter(pname)
                .and_then(|v| v.as_str().map(String::from))
                .unwrap_or_default()
        };
        Some(GraphicsContextSnapshot {
            vendor: text(constants::VENDOR),
            renderer: text(constants::RENDERER),
            version: text(constants::VERSION),
            max_texture_size: self
                .gl
                .get_parameter(constants::MAX_TEXTURE_SIZE)
                .and_then(|v| v.as_int())
                .unwrap_or_default(),
            extensions: self
                .gl
                .get_supported_extensions()
                .into_iter()
                .map(String::from)
                .collect(),
        })
    }

    /// Evaluate `predicate` until it returns a truthy value.
    ///
    /// On timeout the page is left as the last evaluation left it.
    pub async fn wait_for_function(
        &mut self,
        predicate: &ScriptIntent,
        options: WaitOptions,
    ) -> DriverResult<Value> {
        let mut schedule = PollSchedule::start(options.polling, options.timeout);
        loop {
            let value = self.evaluate_now(predicate)?;
            if is_truthy(&value) {
                trace!(attempts = schedule.attempts(), "waitForFunction satisfied");
                return Ok(value);
            }
            if let Err(PollError::Timeout { elapsed, timeout }) = schedule.wait_next().await {
                warn!(?elapsed, ?timeout, "waitForFunction timed out");
                return Err(DriverError::WaitTimeout { elapsed, timeout });
            }
        }
    }

    /// Drop page state and release the graphics context's resources.
    pub(crate) fn close(&mut self) {
        self.gl.cleanup();
        self.window.clear();
        self.scene = None;
        self.renderer = None;
        self.listeners.clear();
    }
}

fn scene_echo(snapshot: &SceneSnapshot) -> Value {
    json!({
        "type": "Scene",
        "children": snapshot.child_count(),
        "objectCount": snapshot.object_count,
        "lightCount": snapshot.light_count,
        "background": snapshot.background,
    })
}

fn mesh_echo(mesh: &Mesh) -> Value {
    let geometry = match mesh.geometry.geometry_type() {
        scenesim_data::GeometryType::Box => "BoxGeometry",
        scenesim_data::GeometryType::Sphere => "SphereGeometry",
        scenesim_data::GeometryType::Plane => "PlaneGeometry",
        scenesim_data::GeometryType::Cylinder => "CylinderGeometry",
    };
    let material = match mesh.material.material_type() {
        scenesim_data::MaterialType::Basic => "MeshBasicMaterial",
        scenesim_data::MaterialType::Standard => "MeshStandardMaterial",
        scenesim_data::MaterialType::Physical => "MeshPhysicalMaterial",
        scenesim_data::MaterialType::Lambert => "MeshLambertMaterial",
    };
    json!({
        "type": "Mesh",
        "id": mesh.id,
        "geometry": { "type": geometry, "id": mesh.geometry.id },
        "material": { "type": material, "id": mesh.material.id },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenesim_data::{Complexity, SceneDataGenerator};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn page() -> SimulatedPage {
        SimulatedPage::new(&DriverConfig::default())
    }

    #[tokio::test]
    async fn test_three_required_for_construction() {
        let mut page = page();
        let scene = SceneDataGenerator::new(1).generate_scene_data(Complexity::Simple);
        let script = ScriptIntent::SceneConstruction(scene);

        let err = page.evaluate(&script).await.unwrap_err();
        assert_eq!(err, DriverError::evaluation("THREE is not defined"));

        page.set_content("<script src=\"three.min.js\"></script>")
            .await
            .unwrap();
        assert!(page.is_three_loaded());
        assert_eq!(
            page.evaluate(&ScriptIntent::read("threeJSLoaded")).await.unwrap(),
            json!(true)
        );

        let echo = page.evaluate(&script).await.unwrap();
        assert_eq!(echo["type"], "Scene");
    }

    #[tokio::test]
    async fn test_set_content_is_case_insensitive() {
        let mut page = page();
        page.set_content("<h1>Using THREE.js</h1>").await.unwrap();
        assert!(page.is_three_loaded());

        let mut plain = self::page();
        plain.set_content("<h1>Hello</h1>").await.unwrap();
        assert!(!plain.is_three_loaded());
        assert_eq!(
            plain.evaluate(&ScriptIntent::ContentQuery).await.unwrap(),
            json!("<h1>Hello</h1>")
        );
    }

    #[tokio::test]
    async fn test_scene_and_mesh_snapshot() {
        let mut page = page();
        page.set_content("three").await.unwrap();
        assert_eq!(
            page.evaluate(&ScriptIntent::SceneSnapshot).await.unwrap(),
            Value::Null
        );

        let mut generator = SceneDataGenerator::new(5);
        let scene = generator.generate_scene_data(Complexity::Simple);
        let objects = scene.objects.len();
        page.evaluate(&ScriptIntent::SceneConstruction(scene))
            .await
            .unwrap();

        let mesh = generator.generate_mesh(
            scenesim_data::GeometryType::Sphere,
            scenesim_data::MaterialType::Lambert,
            false,
        );
        let echo = page
            .evaluate(&ScriptIntent::MeshConstruction(mesh))
            .await
            .unwrap();
        assert_eq!(echo["geometry"]["type"], "SphereGeometry");
        assert_eq!(echo["material"]["type"], "MeshLambertMaterial");

        let snapshot: SceneSnapshot =
            serde_json::from_value(page.evaluate(&ScriptIntent::SceneSnapshot).await.unwrap())
                .unwrap();
        assert_eq!(snapshot.object_count, objects + 1);
        assert_eq!(snapshot.camera_count, 1);
    }

    #[tokio::test]
    async fn test_graphics_context_snapshot() {
        let mut page = page();
        let value = page
            .evaluate(&ScriptIntent::GraphicsContextProbe { webgl2: false })
            .await
            .unwrap();
        let snapshot: GraphicsContextSnapshot = serde_json::from_value(value).unwrap();
        assert_eq!(snapshot.vendor, "SceneSim");
        assert_eq!(snapshot.max_texture_size, 4096);
        assert_eq!(snapshot.extensions.len(), 7);

        let webgl2 = page
            .evaluate(&ScriptIntent::GraphicsContextProbe { webgl2: true })
            .await
            .unwrap();
        assert_eq!(webgl2, Value::Null);

        let bare = SimulatedPage::new(&DriverConfig {
            install_graphics_globals: false,
            ..DriverConfig::default()
        });
        assert!(bare.snapshot_graphics_context(false).is_none());
    }

    #[tokio::test]
    async fn test_closure_and_console() {
        let mut page = page();
        let lines = Arc::new(Mutex::new(Vec::new()));
        let sink = lines.clone();
        page.on(
            PageEvent::Console,
            Box::new(move |line| sink.lock().unwrap().push(line.to_string())),
        );

        let script = ScriptIntent::closure(|env| {
            let buffer = env.gl.create_buffer();
            env.log(format!("buffer {}", buffer.id()));
            env.set("lastBuffer", json!(buffer.id()));
            json!(buffer.id())
        });
        assert_eq!(page.evaluate(&script).await.unwrap(), json!(1));
        assert_eq!(page.evaluate(&script).await.unwrap(), json!(2));
        assert_eq!(
            page.evaluate(&ScriptIntent::read("window.lastBuffer"))
                .await
                .unwrap(),
            json!(2)
        );
        assert_eq!(*lines.lock().unwrap(), vec!["buffer 1", "buffer 2"]);
    }

    #[tokio::test]
    async fn test_page_error_event() {
        let mut page = page();
        let errors = Arc::new(Mutex::new(Vec::new()));
        let sink = errors.clone();
        page.on(
            PageEvent::PageError,
            Box::new(move |message| sink.lock().unwrap().push(message.to_string())),
        );
        let script = ScriptIntent::RendererConstruction {
            width: 10,
            height: 10,
            antialias: true,
        };
        assert!(page.evaluate(&script).await.is_err());
        assert_eq!(*errors.lock().unwrap(), vec!["THREE is not defined"]);
    }

    #[tokio::test]
    async fn test_opaque_scripts() {
        let mut page = page();
        page.evaluate(&ScriptIntent::write("answer", 42))
            .await
            .unwrap();
        assert_eq!(page.evaluate(&"[1, 2]".into()).await.unwrap(), json!([1, 2]));
        assert_eq!(
            page.evaluate(&"window.answer".into()).await.unwrap(),
            json!(42)
        );
        assert_eq!(
            page.evaluate(&"document.title".into()).await.unwrap(),
            Value::Null
        );
    }

    #[tokio::test]
    async fn test_navigation_and_viewport() {
        let mut page = page();
        let loads = Arc::new(Mutex::new(Vec::new()));
        let sink = loads.clone();
        page.on(
            PageEvent::Load,
            Box::new(move |url| sink.lock().unwrap().push(url.to_string())),
        );

        page.goto("http://localhost/test.html").await.unwrap();
        assert_eq!(page.url(), "http://localhost/test.html");
        assert_eq!(*loads.lock().unwrap(), vec!["http://localhost/test.html"]);

        page.set_viewport(Viewport {
            width: 1024,
            height: 768,
        })
        .await
        .unwrap();
        assert_eq!(page.graphics_context().state().viewport, [0, 0, 1024, 768]);

        let png = page.screenshot().await.unwrap();
        assert_eq!(&png[..8], &PNG_SIGNATURE);
        assert_eq!(png.len(), 16);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_function_resolves() {
        let mut page = page();
        let script = ScriptIntent::closure(|env| {
            let polls = env.get("polls").as_i64().unwrap_or(0) + 1;
            env.set("polls", json!(polls));
            json!(polls >= 3)
        });
        let value = page
            .wait_for_function(&script, WaitOptions::default())
            .await
            .unwrap();
        assert_eq!(value, json!(true));
        assert_eq!(
            page.evaluate(&ScriptIntent::read("polls")).await.unwrap(),
            json!(3)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_function_timeout() {
        let mut page = page();
        page.evaluate(&ScriptIntent::write("ready", false))
            .await
            .unwrap();
        let before = page.graphics_context().resource_counters();

        let options = WaitOptions::default()
            .with_timeout(Duration::from_millis(200))
            .with_polling(Duration::from_millis(50));
        let err = page
            .wait_for_function(&ScriptIntent::read("ready"), options)
            .await
            .unwrap_err();

        match err {
            DriverError::WaitTimeout { elapsed, timeout } => {
                assert_eq!(timeout, Duration::from_millis(200));
                assert!(elapsed >= timeout);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(
            page.evaluate(&ScriptIntent::read("ready")).await.unwrap(),
            json!(false)
        );
        assert_eq!(page.graphics_context().resource_counters(), before);
    }

    #[test]
    fn test_page_event_names() {
        assert_eq!("pageerror".parse::<PageEvent>().unwrap(), PageEvent::PageError);
        assert!("click".parse::<PageEvent>().is_err());
        assert_eq!(PageEvent::Load.to_string(), "load");
    }
}
