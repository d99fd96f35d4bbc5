//! Scripts understood by the simulated page.
//!
//! A real driver ships source text to a JavaScript engine. Here the caller
//! states what the script does: build a scene, read a window property, inspect
//! the graphics context, or run a Rust closure against the page environment.

use scenesim_data::{Mesh, SceneData};
use scenesim_webgl::WebGLRenderingContext;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Closure body for [`ScriptIntent::Closure`].
pub type ScriptFn = Arc<dyn Fn(&mut ScriptEnv<'_>) -> Value + Send + Sync>;

/// What a script evaluation should do.
#[derive(Clone)]
pub enum ScriptIntent {
    /// `new THREE.Scene()` populated with the given data. Requires the
    /// rendering library.
    SceneConstruction(SceneData),
    /// `new THREE.Mesh(geometry, material)`, added to the current scene if
    /// there is one. Requires the rendering library.
    MeshConstruction(Mesh),
    /// `new THREE.WebGLRenderer({ antialias })` sized to `width`×`height`.
    /// Requires the rendering library.
    RendererConstruction {
        width: u32,
        height: u32,
        antialias: bool,
    },
    /// Read back the current scene as a [`SceneSnapshot`], or null.
    SceneSnapshot,
    /// Read back the current renderer as a [`RendererSnapshot`], or null.
    RendererSnapshot,
    /// `canvas.getContext("webgl" | "webgl2")` summarised as a
    /// [`GraphicsContextSnapshot`], or null when unavailable.
    GraphicsContextProbe { webgl2: bool },
    /// Read a dotted path under `window`.
    WindowPropertyRead(String),
    /// Write a dotted path under `window`, creating intermediate objects.
    WindowPropertyWrite { path: String, value: Value },
    /// Current page content.
    ContentQuery,
    /// Arbitrary behaviour with access to the page environment.
    Closure(ScriptFn),
    /// Unrecognised source text. JSON literals and `window.` paths are
    /// answered, everything else evaluates to null.
    Opaque(String),
}

impl ScriptIntent {
    pub fn closure<F>(f: F) -> Self
    where
        F: Fn(&mut ScriptEnv<'_>) -> Value + Send + Sync + 'static,
    {
        ScriptIntent::Closure(Arc::new(f))
    }

    pub fn read(path: impl Into<String>) -> Self {
        ScriptIntent::WindowPropertyRead(path.into())
    }

    pub fn write(path: impl Into<String>, value: impl Into<Value>) -> Self {
        ScriptIntent::WindowPropertyWrite {
            path: path.into(),
            value: value.into(),
        }
    }

    /// Whether evaluation needs the rendering library globals.
    pub fn requires_three(&self) -> bool {
        matches!(
            self,
            ScriptIntent::SceneConstruction(_)
                | ScriptIntent::MeshConstruction(_)
                | ScriptIntent::RendererConstruction { .. }
        )
    }

    fn name(&self) -> &'static str {
        match self {
            ScriptIntent::SceneConstruction(_) => "SceneConstruction",
            ScriptIntent::MeshConstruction(_) => "MeshConstruction",
            ScriptIntent::RendererConstruction { .. } => "RendererConstruction",
            ScriptIntent::SceneSnapshot => "SceneSnapshot",
            ScriptIntent::RendererSnapshot => "RendererSnapshot",
            ScriptIntent::GraphicsContextProbe { .. } => "GraphicsContextProbe",
            ScriptIntent::WindowPropertyRead(_) => "WindowPropertyRead",
            ScriptIntent::WindowPropertyWrite { .. } => "WindowPropertyWrite",
            ScriptIntent::ContentQuery => "ContentQuery",
            ScriptIntent::Closure(_) => "Closure",
            ScriptIntent::Opaque(_) => "Opaque",
        }
    }
}

impl fmt::Debug for ScriptIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptIntent::WindowPropertyRead(path) => {
                f.debug_tuple("WindowPropertyRead").field(path).finish()
            }
            ScriptIntent::WindowPropertyWrite { path, value } => f
                .debug_struct("WindowPropertyWrite")
                .field("path", path)
                .field("value", value)
                .finish(),
            ScriptIntent::GraphicsContextProbe { webgl2 } => f
                .debug_struct("GraphicsContextProbe")
                .field("webgl2", webgl2)
                .finish(),
            ScriptIntent::Opaque(source) => f.debug_tuple("Opaque").field(source).finish(),
            other => f.write_str(other.name()),
        }
    }
}

impl From<&str> for ScriptIntent {
    fn from(source: &str) -> Self {
        ScriptIntent::Opaque(source.to_string())
    }
}

/// What a closure script can see and touch.
pub struct ScriptEnv<'a> {
    pub window: &'a mut Map<String, Value>,
    pub gl: &'a mut WebGLRenderingContext,
    pub content: &'a str,
    pub(crate) console: Vec<String>,
}

impl<'a> ScriptEnv<'a> {
    pub(crate) fn new(
        window: &'a mut Map<String, Value>,
        gl: &'a mut WebGLRenderingContext,
        content: &'a str,
    ) -> Self {
        Self {
            window,
            gl,
            content,
            console: Vec::new(),
        }
    }

    /// `console.log`. Messages reach `console` listeners after evaluation.
    pub fn log(&mut self, message: impl Into<String>) {
        self.console.push(message.into());
    }

    pub fn get(&self, path: &str) -> Value {
        read_path(self.window, path)
    }

    pub fn set(&mut self, path: &str, value: Value) {
        write_path(self.window, path, value);
    }
}

/// JavaScript truthiness for an evaluation result.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn path_segments(path: &str) -> impl Iterator<Item = &str> {
    path.strip_prefix("window.")
        .unwrap_or(path)
        .split('.')
        .filter(|segment| !segment.is_empty())
}

/// Resolve a dotted path. Missing segments read as null.
pub(crate) fn read_path(window: &Map<String, Value>, path: &str) -> Value {
    let mut segments = path_segments(path);
    let Some(first) = segments.next() else {
        return Value::Object(window.clone());
    };
    let mut current = match window.get(first) {
        Some(value) => value,
        None => return Value::Null,
    };
    for segment in segments {
        current = match current.get(segment) {
            Some(value) => value,
            None => return Value::Null,
        };
    }
    current.clone()
}

/// Assign a dotted path, replacing non-object intermediates with objects.
pub(crate) fn write_path(window: &mut Map<String, Value>, path: &str, value: Value) {
    let segments: Vec<&str> = path_segments(path).collect();
    let Some((last, parents)) = segments.split_last() else {
        return;
    };
    let mut current = window;
    for segment in parents {
        let entry = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        current = match entry {
            Value::Object(map) => map,
            _ => return,
        };
    }
    current.insert(last.to_string(), value);
}

// ==================== Snapshots ====================

/// Scene summary returned by [`ScriptIntent::SceneSnapshot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneSnapshot {
    pub object_count: usize,
    pub light_count: usize,
    pub camera_count: usize,
    pub background: String,
    pub has_fog: bool,
}

impl SceneSnapshot {
    pub fn of(scene: &SceneData) -> Self {
        Self {
            object_count: scene.objects.len(),
            light_count: scene.lights.len(),
            camera_count: scene.cameras.len(),
            background: scene.background.to_hex(),
            has_fog: scene.fog.is_some(),
        }
    }

    /// Every child the scene graph holds.
    pub fn child_count(&self) -> usize {
        self.object_count + self.light_count + self.camera_count
    }
}

/// Renderer summary returned by [`ScriptIntent::RendererSnapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RendererSnapshot {
    pub width: u32,
    pub height: u32,
    pub antialias: bool,
}

/// Graphics context summary returned by [`ScriptIntent::GraphicsContextProbe`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphicsContextSnapshot {
    pub vendor: String,
    pub renderer: String,
    pub version: String,
    pub max_texture_size: i64,
    pub extensions: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_truthy() {
        assert!(!is_truthy(&Value::Null));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!(1.5)));
        assert!(is_truthy(&json!("ready")));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!({})));
    }

    #[test]
    fn test_window_paths() {
        let mut window = Map::new();
        write_path(&mut window, "window.testResults.success", json!(true));
        write_path(&mut window, "testResults.duration", json!(12));
        assert_eq!(read_path(&window, "testResults.success"), json!(true));
        assert_eq!(read_path(&window, "window.testResults.duration"), json!(12));
        assert_eq!(read_path(&window, "testResults.missing.deeper"), Value::Null);
        assert_eq!(read_path(&window, "nothing"), Value::Null);

        write_path(&mut window, "testResults.success.nested", json!(1));
        assert_eq!(read_path(&window, "testResults.success.nested"), json!(1));
    }

    #[test]
    fn test_requires_three() {
        assert!(ScriptIntent::RendererConstruction {
            width: 1,
            height: 1,
            antialias: false
        }
        .requires_three());
        assert!(!ScriptIntent::SceneSnapshot.requires_three());
        assert!(!ScriptIntent::from("1 + 1").requires_three());
    }

    #[test]
    fn test_debug_hides_closure() {
        let script = ScriptIntent::closure(|_| Value::Null);
        assert_eq!(format!("{script:?}"), "Closure");
    }
}
