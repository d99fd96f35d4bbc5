//! Validators over snapshots read back from the page.
//!
//! `None` means the page had nothing to report, which is a different failure
//! from a snapshot that exists but misses its bounds.

use crate::error::HarnessError;
use scenesim_driver::{GraphicsContextSnapshot, RendererSnapshot, SceneSnapshot};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A violated expectation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationIssue {
    #[error("{resource} not found")]
    Missing { resource: &'static str },

    #[error("{resource} {expectation}: expected {expected}, got {actual}")]
    OutOfBounds {
        resource: &'static str,
        expectation: &'static str,
        expected: String,
        actual: String,
    },
}

impl ValidationIssue {
    pub fn is_missing(&self) -> bool {
        matches!(self, ValidationIssue::Missing { .. })
    }
}

impl From<ValidationIssue> for HarnessError {
    fn from(issue: ValidationIssue) -> Self {
        HarnessError::validation(issue.to_string())
    }
}

/// Bounds on scene contents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneExpectations {
    pub min_objects: Option<usize>,
    pub max_objects: Option<usize>,
    pub min_lights: Option<usize>,
}

/// Minimum canvas size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RendererExpectations {
    pub min_width: u32,
    pub min_height: u32,
}

impl Default for RendererExpectations {
    fn default() -> Self {
        Self {
            min_width: 1,
            min_height: 1,
        }
    }
}

/// Requirements on the graphics context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphicsContextExpectations {
    pub min_max_texture_size: Option<i64>,
    pub required_extensions: Vec<String>,
}

pub fn validate_scene(
    snapshot: Option<&SceneSnapshot>,
    expectations: &SceneExpectations,
) -> Result<(), ValidationIssue> {
    let scene = snapshot.ok_or(ValidationIssue::Missing { resource: "Scene" })?;

    if let Some(min) = expectations.min_objects {
        if scene.object_count < min {
            return Err(ValidationIssue::OutOfBounds {
                resource: "Scene",
                expectation: "object count",
                expected: format!("at least {min}"),
                actual: scene.object_count.to_string(),
            });
        }
    }
    if let Some(max) = expectations.max_objects {
        if scene.object_count > max {
            return Err(ValidationIssue::OutOfBounds {
                resource: "Scene",
                expectation: "object count",
                expected: format!("at most {max}"),
                actual: scene.object_count.to_string(),
            });
        }
    }
    if let Some(min) = expectations.min_lights {
        if scene.light_count < min {
            return Err(ValidationIssue::OutOfBounds {
                resource: "Scene",
                expectation: "light count",
                expected: format!("at least {min}"),
                actual: scene.light_count.to_string(),
            });
        }
    }
    Ok(())
}

pub fn validate_renderer(
    snapshot: Option<&RendererSnapshot>,
    expectations: &RendererExpectations,
) -> Result<(), ValidationIssue> {
    let renderer = snapshot.ok_or(ValidationIssue::Missing {
        resource: "Renderer",
    })?;

    if renderer.width < expectations.min_width || renderer.height < expectations.min_height {
        return Err(ValidationIssue::OutOfBounds {
            resource: "Renderer",
            expectation: "canvas size",
            expected: format!(
                "at least {}x{}",
                expectations.min_width, expectations.min_height
            ),
            actual: format!("{}x{}", renderer.width, renderer.height),
        });
    }
    Ok(())
}

pub fn validate_graphics_context(
    snapshot: Option<&GraphicsContextSnapshot>,
    expectations: &GraphicsContextExpectations,
) -> Result<(), ValidationIssue> {
    let context = snapshot.ok_or(ValidationIssue::Missing {
        resource: "WebGL context",
    })?;

    if let Some(min) = expectations.min_max_texture_size {
        if context.max_texture_size < min {
            return Err(ValidationIssue::OutOfBounds {
                resource: "WebGL context",
                expectation: "max texture size",
                expected: format!("at least {min}"),
                actual: context.max_texture_size.to_string(),
            });
        }
    }

    let missing: Vec<&str> = expectations
        .required_extensions
        .iter()
        .filter(|name| !context.extensions.contains(*name))
        .map(String::as_str)
        .collect();
    if !missing.is_empty() {
        return Err(ValidationIssue::OutOfBounds {
            resource: "WebGL context",
            expectation: "extensions",
            expected: format!("support for {}", missing.join(", ")),
            actual: format!("{} supported", context.extensions.len()),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene(objects: usize, lights: usize) -> SceneSnapshot {
        SceneSnapshot {
            object_count: objects,
            light_count: lights,
            camera_count: 1,
            background: "#000000".to_string(),
            has_fog: false,
        }
    }

    #[test]
    fn test_scene_absent_vs_out_of_bounds() {
        let bounds = SceneExpectations {
            min_objects: Some(1),
            max_objects: Some(3),
            min_lights: None,
        };
        let absent = validate_scene(None, &bounds).unwrap_err();
        assert!(absent.is_missing());
        assert_eq!(absent.to_string(), "Scene not found");

        let too_many = validate_scene(Some(&scene(5, 1)), &bounds).unwrap_err();
        assert!(!too_many.is_missing());
        assert!(too_many.to_string().contains("at most 3"));

        let too_few = validate_scene(Some(&scene(0, 1)), &bounds).unwrap_err();
        assert!(too_few.to_string().contains("at least 1"));

        assert!(validate_scene(Some(&scene(2, 1)), &bounds).is_ok());
    }

    #[test]
    fn test_renderer_minimum_size() {
        let expectations = RendererExpectations {
            min_width: 640,
            min_height: 480,
        };
        assert!(validate_renderer(None, &expectations).unwrap_err().is_missing());

        let small = RendererSnapshot {
            width: 320,
            height: 480,
            antialias: false,
        };
        let err = validate_renderer(Some(&small), &expectations).unwrap_err();
        assert!(err.to_string().contains("320x480"));

        let ok = RendererSnapshot {
            width: 800,
            height: 600,
            antialias: true,
        };
        assert!(validate_renderer(Some(&ok), &expectations).is_ok());
    }

    #[test]
    fn test_graphics_context_requirements() {
        let context = GraphicsContextSnapshot {
            vendor: "SceneSim".to_string(),
            renderer: "SceneSim Software Rasterizer".to_string(),
            version: "WebGL 1.0 (SceneSim)".to_string(),
            max_texture_size: 4096,
            extensions: vec!["OES_texture_float".to_string()],
        };
        let expectations = GraphicsContextExpectations {
            min_max_texture_size: Some(2048),
            required_extensions: vec!["OES_texture_float".to_string()],
        };
        assert!(validate_graphics_context(Some(&context), &expectations).is_ok());
        assert!(validate_graphics_context(None, &expectations)
            .unwrap_err()
            .is_missing());

        let needs_more = GraphicsContextExpectations {
            min_max_texture_size: None,
            required_extensions: vec!["WEBGL_draw_buffers".to_string()],
        };
        let err = validate_graphics_context(Some(&context), &needs_more).unwrap_err();
        assert!(err.to_string().contains("WEBGL_draw_buffers"));
    }

    #[test]
    fn test_issue_converts_to_validation_failure() {
        let err: HarnessError = ValidationIssue::Missing { resource: "Scene" }.into();
        assert_eq!(err.category(), "validation");
        assert_eq!(err.violations(), ["Scene not found".to_string()]);
    }
}
