//! Resource handles and the records the context keeps for them.

use crate::constants;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ==================== Handles ====================

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Wrap a raw id, e.g. one echoed back from script evaluation.
            pub fn from_raw(id: u32) -> Self {
                Self(id)
            }

            pub fn id(&self) -> u32 {
                self.0
            }
        }
    };
}

handle!(
    /// Buffer handle.
    WebGLBuffer
);
handle!(
    /// Shader handle.
    WebGLShader
);
handle!(
    /// Program handle.
    WebGLProgram
);
handle!(
    /// Texture handle.
    WebGLTexture
);
handle!(
    /// Framebuffer handle.
    WebGLFramebuffer
);
handle!(
    /// Renderbuffer handle.
    WebGLRenderbuffer
);
handle!(
    /// Uniform location handle.
    WebGLUniformLocation
);

// ==================== Records ====================

/// Buffer data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Buffer {
    pub id: u32,
    /// Target of the first bind, `None` until bound.
    pub target: Option<u32>,
    pub data: Vec<u8>,
    pub usage: u32,
}

impl Buffer {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            target: None,
            data: Vec::new(),
            usage: constants::STATIC_DRAW,
        }
    }
}

/// Shader data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Shader {
    pub id: u32,
    pub shader_type: u32,
    pub source: String,
    pub compiled: bool,
}

impl Shader {
    pub fn new(id: u32, shader_type: u32) -> Self {
        Self {
            id,
            shader_type,
            source: String::new(),
            compiled: false,
        }
    }
}

/// Program data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Program {
    pub id: u32,
    pub vertex_shader: Option<WebGLShader>,
    pub fragment_shader: Option<WebGLShader>,
    pub linked: bool,
    pub attributes: HashMap<String, i32>,
    pub uniforms: HashMap<String, WebGLUniformLocation>,
}

impl Program {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            vertex_shader: None,
            fragment_shader: None,
            linked: false,
            attributes: HashMap::new(),
            uniforms: HashMap::new(),
        }
    }

    pub fn attached_shader_count(&self) -> usize {
        self.vertex_shader.iter().count() + self.fragment_shader.iter().count()
    }
}

/// Texture data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Texture {
    pub id: u32,
    pub target: Option<u32>,
    pub width: u32,
    pub height: u32,
    pub internal_format: u32,
    pub format: u32,
    pub mag_filter: u32,
    pub min_filter: u32,
    pub wrap_s: u32,
    pub wrap_t: u32,
    pub has_mipmaps: bool,
}

impl Texture {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            target: None,
            width: 0,
            height: 0,
            internal_format: constants::RGBA,
            format: constants::RGBA,
            mag_filter: constants::LINEAR,
            min_filter: constants::NEAREST_MIPMAP_LINEAR,
            wrap_s: constants::REPEAT,
            wrap_t: constants::REPEAT,
            has_mipmaps: false,
        }
    }
}

/// What a framebuffer attachment point refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Attachment {
    Texture(WebGLTexture),
    Renderbuffer(WebGLRenderbuffer),
}

/// Framebuffer data.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Framebuffer {
    pub id: u32,
    pub color_attachment: Option<Attachment>,
    pub depth_attachment: Option<Attachment>,
    pub stencil_attachment: Option<Attachment>,
}

impl Framebuffer {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    pub(crate) fn attach(&mut self, attachment_point: u32, attachment: Option<Attachment>) {
        match attachment_point {
            constants::COLOR_ATTACHMENT0 => self.color_attachment = attachment,
            constants::DEPTH_ATTACHMENT => self.depth_attachment = attachment,
            constants::STENCIL_ATTACHMENT => self.stencil_attachment = attachment,
            constants::DEPTH_STENCIL_ATTACHMENT => {
                self.depth_attachment = attachment;
                self.stencil_attachment = attachment;
            }
            _ => {}
        }
    }
}

/// Renderbuffer data.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Renderbuffer {
    pub id: u32,
    pub internal_format: u32,
    pub width: u32,
    pub height: u32,
}

impl Renderbuffer {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }
}

/// Number of resources allocated per kind since construction or the last
/// cleanup. Each counter doubles as the last id handed out for its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResourceCounters {
    pub buffers: u32,
    pub shaders: u32,
    pub programs: u32,
    pub textures: u32,
    pub framebuffers: u32,
    pub renderbuffers: u32,
}

impl ResourceCounters {
    pub fn total(&self) -> u32 {
        self.buffers
            + self.shaders
            + self.programs
            + self.textures
            + self.framebuffers
            + self.renderbuffers
    }
}

// ==================== Vertex Attribute ====================

/// Vertex attribute pointer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VertexAttribPointer {
    pub enabled: bool,
    pub size: i32,
    pub type_: u32,
    pub normalized: bool,
    pub stride: i32,
    pub offset: i32,
    pub buffer: Option<WebGLBuffer>,
}

// ==================== Draw Call ====================

/// Uniform value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum UniformValue {
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Int(i32),
    Mat4([f32; 16]),
}

/// State captured for a draw call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawState {
    pub viewport: [i32; 4],
    pub blend_enabled: bool,
    pub blend_func: (u32, u32),
    pub depth_test_enabled: bool,
    pub depth_func: u32,
    pub cull_face_enabled: bool,
    pub cull_face_mode: u32,
    pub framebuffer: Option<WebGLFramebuffer>,
    pub vertex_attribs: Vec<VertexAttribPointer>,
}

/// A recorded draw call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DrawCall {
    Clear {
        mask: u32,
        color: [f32; 4],
    },
    DrawArrays {
        mode: u32,
        first: i32,
        count: i32,
        program: WebGLProgram,
        state: Box<DrawState>,
    },
    DrawElements {
        mode: u32,
        count: i32,
        type_: u32,
        offset: i32,
        program: WebGLProgram,
        state: Box<DrawState>,
    },
}
