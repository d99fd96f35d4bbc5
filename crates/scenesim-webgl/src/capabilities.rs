//! Fixed capability and extension tables.
//!
//! Every lookup is a table scan; a miss is `None`, never an error.

use crate::constants::*;
use serde::Serialize;

/// A value returned from a parameter query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    IntArray(Vec<i64>),
    FloatArray(Vec<f64>),
}

impl ParameterValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParameterValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParameterValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParameterValue::String(s) => Some(s),
            _ => None,
        }
    }
}

/// A logical implementation parameter. Several GL enums may alias one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Vendor,
    Renderer,
    Version,
    ShadingLanguageVersion,
    MaxTextureSize,
    MaxCubeMapTextureSize,
    MaxRenderbufferSize,
    MaxVertexAttribs,
    MaxTextureImageUnits,
    MaxCombinedTextureImageUnits,
    MaxVertexUniformVectors,
    MaxFragmentUniformVectors,
    MaxVaryingVectors,
    MaxViewportDims,
    AliasedLineWidthRange,
    AliasedPointSizeRange,
}

/// GL enum → capability.
const PARAMETER_KEYS: &[(u32, Capability)] = &[
    (VENDOR, Capability::Vendor),
    (UNMASKED_VENDOR_WEBGL, Capability::Vendor),
    (RENDERER, Capability::Renderer),
    (UNMASKED_RENDERER_WEBGL, Capability::Renderer),
    (VERSION, Capability::Version),
    (SHADING_LANGUAGE_VERSION, Capability::ShadingLanguageVersion),
    (MAX_TEXTURE_SIZE, Capability::MaxTextureSize),
    (MAX_CUBE_MAP_TEXTURE_SIZE, Capability::MaxCubeMapTextureSize),
    (MAX_RENDERBUFFER_SIZE, Capability::MaxRenderbufferSize),
    (MAX_VERTEX_ATTRIBS, Capability::MaxVertexAttribs),
    (MAX_TEXTURE_IMAGE_UNITS, Capability::MaxTextureImageUnits),
    (MAX_COMBINED_TEXTURE_IMAGE_UNITS, Capability::MaxCombinedTextureImageUnits),
    (MAX_VERTEX_UNIFORM_VECTORS, Capability::MaxVertexUniformVectors),
    (MAX_FRAGMENT_UNIFORM_VECTORS, Capability::MaxFragmentUniformVectors),
    (MAX_VARYING_VECTORS, Capability::MaxVaryingVectors),
    (MAX_VIEWPORT_DIMS, Capability::MaxViewportDims),
    (ALIASED_LINE_WIDTH_RANGE, Capability::AliasedLineWidthRange),
    (ALIASED_POINT_SIZE_RANGE, Capability::AliasedPointSizeRange),
];

/// Symbolic name → capability, for callers holding `gl.MAX_TEXTURE_SIZE`
/// style names rather than numbers.
const PARAMETER_NAMES: &[(&str, Capability)] = &[
    ("VENDOR", Capability::Vendor),
    ("UNMASKED_VENDOR_WEBGL", Capability::Vendor),
    ("RENDERER", Capability::Renderer),
    ("UNMASKED_RENDERER_WEBGL", Capability::Renderer),
    ("VERSION", Capability::Version),
    ("SHADING_LANGUAGE_VERSION", Capability::ShadingLanguageVersion),
    ("MAX_TEXTURE_SIZE", Capability::MaxTextureSize),
    ("MAX_CUBE_MAP_TEXTURE_SIZE", Capability::MaxCubeMapTextureSize),
    ("MAX_RENDERBUFFER_SIZE", Capability::MaxRenderbufferSize),
    ("MAX_VERTEX_ATTRIBS", Capability::MaxVertexAttribs),
    ("MAX_TEXTURE_IMAGE_UNITS", Capability::MaxTextureImageUnits),
    ("MAX_COMBINED_TEXTURE_IMAGE_UNITS", Capability::MaxCombinedTextureImageUnits),
    ("MAX_VERTEX_UNIFORM_VECTORS", Capability::MaxVertexUniformVectors),
    ("MAX_FRAGMENT_UNIFORM_VECTORS", Capability::MaxFragmentUniformVectors),
    ("MAX_VARYING_VECTORS", Capability::MaxVaryingVectors),
    ("MAX_VIEWPORT_DIMS", Capability::MaxViewportDims),
    ("ALIASED_LINE_WIDTH_RANGE", Capability::AliasedLineWidthRange),
    ("ALIASED_POINT_SIZE_RANGE", Capability::AliasedPointSizeRange),
];

pub const SIMULATED_VENDOR: &str = "SceneSim";
pub const SIMULATED_RENDERER: &str = "SceneSim Software Rasterizer";
pub const SIMULATED_VERSION: &str = "WebGL 1.0 (SceneSim)";
pub const SIMULATED_GLSL_VERSION: &str = "WebGL GLSL ES 1.0 (SceneSim)";
pub const SIMULATED_MAX_TEXTURE_SIZE: i64 = 4096;

impl Capability {
    /// Resolve a GL enum.
    pub fn from_enum(pname: u32) -> Option<Self> {
        PARAMETER_KEYS
            .iter()
            .find(|(key, _)| *key == pname)
            .map(|(_, cap)| *cap)
    }

    /// Resolve a symbolic parameter name.
    pub fn from_name(name: &str) -> Option<Self> {
        PARAMETER_NAMES
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, cap)| *cap)
    }

    /// The synthetic value reported for this capability.
    pub fn value(self) -> ParameterValue {
        match self {
            Capability::Vendor => ParameterValue::String(SIMULATED_VENDOR.into()),
            Capability::Renderer => ParameterValue::String(SIMULATED_RENDERER.into()),
            Capability::Version => ParameterValue::String(SIMULATED_VERSION.into()),
            Capability::ShadingLanguageVersion => {
                ParameterValue::String(SIMULATED_GLSL_VERSION.into())
            }
            Capability::MaxTextureSize
            | Capability::MaxCubeMapTextureSize
            | Capability::MaxRenderbufferSize => ParameterValue::Int(SIMULATED_MAX_TEXTURE_SIZE),
            Capability::MaxVertexAttribs
            | Capability::MaxTextureImageUnits
            | Capability::MaxCombinedTextureImageUnits => ParameterValue::Int(16),
            Capability::MaxVertexUniformVectors => ParameterValue::Int(256),
            Capability::MaxFragmentUniformVectors => ParameterValue::Int(224),
            Capability::MaxVaryingVectors => ParameterValue::Int(15),
            Capability::MaxViewportDims => ParameterValue::IntArray(vec![
                SIMULATED_MAX_TEXTURE_SIZE,
                SIMULATED_MAX_TEXTURE_SIZE,
            ]),
            Capability::AliasedLineWidthRange => ParameterValue::FloatArray(vec![1.0, 1.0]),
            Capability::AliasedPointSizeRange => ParameterValue::FloatArray(vec![1.0, 1024.0]),
        }
    }
}

/// A named extension and the constants it exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExtensionDescriptor {
    pub name: &'static str,
    pub constants: &'static [(&'static str, u32)],
}

impl ExtensionDescriptor {
    /// Look up one of the extension's constants.
    pub fn constant(&self, name: &str) -> Option<u32> {
        self.constants
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
    }
}

pub const EXTENSIONS: &[ExtensionDescriptor] = &[
    ExtensionDescriptor {
        name: "WEBGL_debug_renderer_info",
        constants: &[
            ("UNMASKED_VENDOR_WEBGL", UNMASKED_VENDOR_WEBGL),
            ("UNMASKED_RENDERER_WEBGL", UNMASKED_RENDERER_WEBGL),
        ],
    },
    ExtensionDescriptor {
        name: "OES_texture_float",
        constants: &[],
    },
    ExtensionDescriptor {
        name: "OES_standard_derivatives",
        constants: &[("FRAGMENT_SHADER_DERIVATIVE_HINT_OES", 0x8B8B)],
    },
    ExtensionDescriptor {
        name: "OES_element_index_uint",
        constants: &[],
    },
    ExtensionDescriptor {
        name: "ANGLE_instanced_arrays",
        constants: &[("VERTEX_ATTRIB_ARRAY_DIVISOR_ANGLE", 0x88FE)],
    },
    ExtensionDescriptor {
        name: "EXT_texture_filter_anisotropic",
        constants: &[
            ("TEXTURE_MAX_ANISOTROPY_EXT", 0x84FE),
            ("MAX_TEXTURE_MAX_ANISOTROPY_EXT", 0x84FF),
        ],
    },
    ExtensionDescriptor {
        name: "WEBGL_lose_context",
        constants: &[],
    },
];

/// Look up an extension by name.
pub fn find_extension(name: &str) -> Option<&'static ExtensionDescriptor> {
    EXTENSIONS.iter().find(|ext| ext.name == name)
}

/// Names of every extension in the table, in table order.
pub fn supported_extensions() -> Vec<&'static str> {
    EXTENSIONS.iter().map(|ext| ext.name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases_resolve_to_same_capability() {
        assert_eq!(Capability::from_enum(VENDOR), Capability::from_enum(UNMASKED_VENDOR_WEBGL));
        assert_eq!(
            Capability::from_enum(MAX_TEXTURE_SIZE),
            Capability::from_name("MAX_TEXTURE_SIZE")
        );
        assert_eq!(Capability::from_enum(0xFFFF), None);
        assert_eq!(Capability::from_name("NOT_A_PARAMETER"), None);
    }

    #[test]
    fn test_extension_lookup() {
        let ext = find_extension("WEBGL_debug_renderer_info").unwrap();
        assert_eq!(ext.constant("UNMASKED_RENDERER_WEBGL"), Some(UNMASKED_RENDERER_WEBGL));
        assert_eq!(ext.constant("MISSING"), None);
        assert!(find_extension("WEBGL_draw_buffers").is_none());
        assert_eq!(supported_extensions().len(), EXTENSIONS.len());
    }

    #[test]
    fn test_parameter_value_serializes_untagged() {
        let json = serde_json::to_string(&ParameterValue::IntArray(vec![1, 2])).unwrap();
        assert_eq!(json, "[1,2]");
    }
}
