//! # SceneSim WebGL
//!
//! An in-memory stand-in for a WebGL 1.0 rendering context.
//!
//! ## Features
//!
//! - **Resources**: buffers, shaders, programs, textures, framebuffers and
//!   renderbuffers with per-kind ids starting at 1
//! - **Pipeline state**: viewport, clear color, blend/depth/cull toggles
//! - **Queries**: parameter and extension tables with synthetic values
//! - **Draw log**: `clear`/`drawArrays`/`drawElements` are recorded, not executed
//!
//! ## Handle policy
//!
//! Nothing here validates handles. Binding or deleting a missing handle is a
//! no-op, shader compilation and program linking always succeed, and unknown
//! query parameters answer `None`. Code that deletes defensively during
//! teardown never needs to guard its calls.

use std::collections::HashMap;
use tracing::{debug, trace};

pub mod capabilities;
pub mod constants;
pub mod resources;

pub use capabilities::{Capability, ExtensionDescriptor, ParameterValue};
pub use resources::*;

// ==================== Context State ====================

/// Global pipeline state.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct WebGLState {
    pub viewport: [i32; 4],
    pub clear_color: [f32; 4],
    /// Active texture unit as a GL enum (`TEXTURE0 + n`).
    pub active_texture: u32,
    pub current_program: Option<WebGLProgram>,
    pub blend: bool,
    pub depth_test: bool,
    pub cull_face: bool,
    pub dither: bool,
    pub scissor_test: bool,
    pub stencil_test: bool,
    pub polygon_offset_fill: bool,
    pub blend_func: (u32, u32),
    pub depth_func: u32,
    pub depth_mask: bool,
    pub cull_face_mode: u32,
    pub front_face: u32,
    pub line_width: f32,
    pub array_buffer: Option<WebGLBuffer>,
    pub element_array_buffer: Option<WebGLBuffer>,
    pub framebuffer: Option<WebGLFramebuffer>,
    pub renderbuffer: Option<WebGLRenderbuffer>,
    pub texture_units: Vec<Option<WebGLTexture>>,
    pub vertex_attribs: Vec<VertexAttribPointer>,
}

impl WebGLState {
    /// Defaults for a canvas of the given size.
    pub fn initial(width: u32, height: u32) -> Self {
        Self {
            viewport: [0, 0, width as i32, height as i32],
            clear_color: [0.0, 0.0, 0.0, 0.0],
            active_texture: constants::TEXTURE0,
            current_program: None,
            blend: false,
            depth_test: false,
            cull_face: false,
            dither: true,
            scissor_test: false,
            stencil_test: false,
            polygon_offset_fill: false,
            blend_func: (constants::ONE, constants::ZERO),
            depth_func: constants::LESS,
            depth_mask: true,
            cull_face_mode: constants::BACK,
            front_face: constants::CCW,
            line_width: 1.0,
            array_buffer: None,
            element_array_buffer: None,
            framebuffer: None,
            renderbuffer: None,
            texture_units: vec![None; constants::MAX_TEXTURE_UNITS as usize],
            vertex_attribs: (0..16).map(|_| VertexAttribPointer::default()).collect(),
        }
    }

    fn active_unit(&self) -> usize {
        (self.active_texture - constants::TEXTURE0) as usize
    }
}

// ==================== WebGL Context ====================

/// The simulated rendering context.
#[derive(Debug)]
pub struct WebGLRenderingContext {
    pub width: u32,
    pub height: u32,
    state: WebGLState,
    counters: ResourceCounters,
    buffers: HashMap<WebGLBuffer, Buffer>,
    shaders: HashMap<WebGLShader, Shader>,
    programs: HashMap<WebGLProgram, Program>,
    textures: HashMap<WebGLTexture, Texture>,
    framebuffers: HashMap<WebGLFramebuffer, Framebuffer>,
    renderbuffers: HashMap<WebGLRenderbuffer, Renderbuffer>,
    next_uniform_location: u32,
    uniform_values: HashMap<WebGLUniformLocation, UniformValue>,
    draw_calls: Vec<DrawCall>,
    last_error: u32,
}

fn next_id(counter: &mut u32) -> u32 {
    *counter += 1;
    *counter
}

impl WebGLRenderingContext {
    /// Create a new context for a canvas of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            state: WebGLState::initial(width, height),
            counters: ResourceCounters::default(),
            buffers: HashMap::new(),
            shaders: HashMap::new(),
            programs: HashMap::new(),
            textures: HashMap::new(),
            framebuffers: HashMap::new(),
            renderbuffers: HashMap::new(),
            next_uniform_location: 0,
            uniform_values: HashMap::new(),
            draw_calls: Vec::new(),
            last_error: constants::NO_ERROR,
        }
    }

    /// Resize the canvas. The viewport follows.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.state.viewport = [0, 0, width as i32, height as i32];
    }

    /// Drop every resource and restore the constructor defaults.
    ///
    /// Canvas dimensions are kept. Safe to call any number of times.
    pub fn cleanup(&mut self) {
        debug!(
            live = self.live_counts().total(),
            allocated = self.counters.total(),
            "Cleaning up WebGL context"
        );
        self.buffers.clear();
        self.shaders.clear();
        self.programs.clear();
        self.textures.clear();
        self.framebuffers.clear();
        self.renderbuffers.clear();
        self.uniform_values.clear();
        self.draw_calls.clear();
        self.counters = ResourceCounters::default();
        self.next_uniform_location = 0;
        self.last_error = constants::NO_ERROR;
        self.state = WebGLState::initial(self.width, self.height);
    }

    pub fn state(&self) -> &WebGLState {
        &self.state
    }

    /// Allocation counters since construction or the last cleanup.
    pub fn resource_counters(&self) -> ResourceCounters {
        self.counters
    }

    /// Number of resources currently alive, per kind.
    pub fn live_counts(&self) -> ResourceCounters {
        ResourceCounters {
            buffers: self.buffers.len() as u32,
            shaders: self.shaders.len() as u32,
            programs: self.programs.len() as u32,
            textures: self.textures.len() as u32,
            framebuffers: self.framebuffers.len() as u32,
            renderbuffers: self.renderbuffers.len() as u32,
        }
    }

    /// Get and clear the error.
    pub fn get_error(&mut self) -> u32 {
        std::mem::replace(&mut self.last_error, constants::NO_ERROR)
    }

    /// Always false; the simulated context cannot be lost.
    pub fn is_context_lost(&self) -> bool {
        false
    }

    // ==================== Queries ====================

    /// Query a parameter by GL enum.
    ///
    /// Implementation strings and limits come from the capability table;
    /// a handful of pipeline-state enums read the live state. Anything else
    /// is `None`.
    pub fn get_parameter(&self, pname: u32) -> Option<ParameterValue> {
        if let Some(capability) = Capability::from_enum(pname) {
            return Some(capability.value());
        }

        let state = &self.state;
        let value = match pname {
            constants::VIEWPORT => {
                ParameterValue::IntArray(state.viewport.iter().map(|v| *v as i64).collect())
            }
            constants::COLOR_CLEAR_VALUE => {
                ParameterValue::FloatArray(state.clear_color.iter().map(|v| *v as f64).collect())
            }
            constants::ACTIVE_TEXTURE => ParameterValue::Int(state.active_texture as i64),
            constants::CURRENT_PROGRAM => match state.current_program {
                Some(program) => ParameterValue::Int(program.id() as i64),
                None => return None,
            },
            constants::DEPTH_FUNC => ParameterValue::Int(state.depth_func as i64),
            constants::CULL_FACE_MODE => ParameterValue::Int(state.cull_face_mode as i64),
            constants::BLEND_SRC_RGB => ParameterValue::Int(state.blend_func.0 as i64),
            constants::BLEND_DST_RGB => ParameterValue::Int(state.blend_func.1 as i64),
            constants::BLEND
            | constants::DEPTH_TEST
            | constants::CULL_FACE
            | constants::DITHER
            | constants::SCISSOR_TEST
            | constants::STENCIL_TEST
            | constants::POLYGON_OFFSET_FILL => ParameterValue::Bool(self.is_enabled(pname)),
            _ => return None,
        };
        Some(value)
    }

    /// Query a capability by its symbolic name (`"MAX_TEXTURE_SIZE"`).
    pub fn get_parameter_by_name(&self, name: &str) -> Option<ParameterValue> {
        Capability::from_name(name).map(Capability::value)
    }

    /// Look up an extension. Unknown names answer `None`.
    pub fn get_extension(&self, name: &str) -> Option<&'static ExtensionDescriptor> {
        capabilities::find_extension(name)
    }

    pub fn get_supported_extensions(&self) -> Vec<&'static str> {
        capabilities::supported_extensions()
    }

    // ==================== State ====================

    /// Clear buffers.
    pub fn clear(&mut self, mask: u32) {
        self.draw_calls.push(DrawCall::Clear {
            mask,
            color: self.state.clear_color,
        });
    }

    /// Set clear color.
    pub fn clear_color(&mut self, r: f32, g: f32, b: f32, a: f32) {
        self.state.clear_color = [r, g, b, a];
    }

    /// Set viewport.
    pub fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.state.viewport = [x, y, width, height];
    }

    fn toggle(&mut self, cap: u32) -> Option<&mut bool> {
        let state = &mut self.state;
        match cap {
            constants::BLEND => Some(&mut state.blend),
            constants::CULL_FACE => Some(&mut state.cull_face),
            constants::DEPTH_TEST => Some(&mut state.depth_test),
            constants::DITHER => Some(&mut state.dither),
            constants::SCISSOR_TEST => Some(&mut state.scissor_test),
            constants::STENCIL_TEST => Some(&mut state.stencil_test),
            constants::POLYGON_OFFSET_FILL => Some(&mut state.polygon_offset_fill),
            _ => None,
        }
    }

    /// Enable a capability.
    pub fn enable(&mut self, cap: u32) {
        match self.toggle(cap) {
            Some(flag) => *flag = true,
            None => self.last_error = constants::INVALID_ENUM,
        }
    }

    /// Disable a capability.
    pub fn disable(&mut self, cap: u32) {
        match self.toggle(cap) {
            Some(flag) => *flag = false,
            None => self.last_error = constants::INVALID_ENUM,
        }
    }

    /// Check if capability is enabled.
    pub fn is_enabled(&self, cap: u32) -> bool {
        let state = &self.state;
        match cap {
            constants::BLEND => state.blend,
            constants::CULL_FACE => state.cull_face,
            constants::DEPTH_TEST => state.depth_test,
            constants::DITHER => state.dither,
            constants::SCISSOR_TEST => state.scissor_test,
            constants::STENCIL_TEST => state.stencil_test,
            constants::POLYGON_OFFSET_FILL => state.polygon_offset_fill,
            _ => false,
        }
    }

    /// Set blend function.
    pub fn blend_func(&mut self, src: u32, dst: u32) {
        self.state.blend_func = (src, dst);
    }

    /// Set depth function.
    pub fn depth_func(&mut self, func: u32) {
        self.state.depth_func = func;
    }

    /// Set depth mask.
    pub fn depth_mask(&mut self, flag: bool) {
        self.state.depth_mask = flag;
    }

    /// Set cull face.
    pub fn cull_face(&mut self, mode: u32) {
        self.state.cull_face_mode = mode;
    }

    /// Set front face.
    pub fn front_face(&mut self, mode: u32) {
        self.state.front_face = mode;
    }

    /// Set line width.
    pub fn line_width(&mut self, width: f32) {
        self.state.line_width = width;
    }

    // ==================== Shaders ====================

    /// Create a shader.
    pub fn create_shader(&mut self, shader_type: u32) -> WebGLShader {
        let id = next_id(&mut self.counters.shaders);
        let shader = WebGLShader::from_raw(id);
        self.shaders.insert(shader, Shader::new(id, shader_type));
        trace!(id, shader_type, "Created shader");
        shader
    }

    /// Set shader source.
    pub fn shader_source(&mut self, shader: Option<WebGLShader>, source: &str) {
        if let Some(data) = shader.and_then(|s| self.shaders.get_mut(&s)) {
            data.source = source.to_string();
        }
    }

    /// Compile shader. Always succeeds.
    pub fn compile_shader(&mut self, shader: Option<WebGLShader>) {
        if let Some(data) = shader.and_then(|s| self.shaders.get_mut(&s)) {
            data.compiled = true;
        }
    }

    /// Get shader parameter.
    ///
    /// `COMPILE_STATUS` is `true` for any handle, including null or deleted
    /// ones. Unrecognized parameters answer `None`.
    pub fn get_shader_parameter(
        &self,
        shader: Option<WebGLShader>,
        pname: u32,
    ) -> Option<ParameterValue> {
        let data = shader.and_then(|s| self.shaders.get(&s));
        match pname {
            constants::COMPILE_STATUS => Some(ParameterValue::Bool(true)),
            constants::DELETE_STATUS => Some(ParameterValue::Bool(data.is_none())),
            constants::SHADER_TYPE => data.map(|d| ParameterValue::Int(d.shader_type as i64)),
            _ => None,
        }
    }

    /// Get shader info log. Always empty.
    pub fn get_shader_info_log(&self, _shader: Option<WebGLShader>) -> String {
        String::new()
    }

    /// Get shader source.
    pub fn get_shader_source(&self, shader: Option<WebGLShader>) -> Option<String> {
        shader
            .and_then(|s| self.shaders.get(&s))
            .map(|d| d.source.clone())
    }

    /// Delete shader.
    pub fn delete_shader(&mut self, shader: Option<WebGLShader>) {
        if let Some(shader) = shader {
            if self.shaders.remove(&shader).is_some() {
                trace!(id = shader.id(), "Deleted shader");
            }
        }
    }

    pub fn is_shader(&self, shader: Option<WebGLShader>) -> bool {
        shader.is_some_and(|s| self.shaders.contains_key(&s))
    }

    // ==================== Programs ====================

    /// Create a program.
    pub fn create_program(&mut self) -> WebGLProgram {
        let id = next_id(&mut self.counters.programs);
        let program = WebGLProgram::from_raw(id);
        self.programs.insert(program, Program::new(id));
        trace!(id, "Created program");
        program
    }

    /// Attach shader to program.
    pub fn attach_shader(&mut self, program: Option<WebGLProgram>, shader: Option<WebGLShader>) {
        let (Some(program), Some(shader)) = (program, shader) else {
            return;
        };
        let Some(shader_type) = self.shaders.get(&shader).map(|s| s.shader_type) else {
            return;
        };
        if let Some(program_data) = self.programs.get_mut(&program) {
            match shader_type {
                constants::VERTEX_SHADER => program_data.vertex_shader = Some(shader),
                constants::FRAGMENT_SHADER => program_data.fragment_shader = Some(shader),
                _ => {}
            }
        }
    }

    /// Detach shader from program.
    pub fn detach_shader(&mut self, program: Option<WebGLProgram>, shader: Option<WebGLShader>) {
        let (Some(program), Some(shader)) = (program, shader) else {
            return;
        };
        if let Some(data) = self.programs.get_mut(&program) {
            if data.vertex_shader == Some(shader) {
                data.vertex_shader = None;
            }
            if data.fragment_shader == Some(shader) {
                data.fragment_shader = None;
            }
        }
    }

    /// Link program. Always succeeds, attached shaders or not.
    pub fn link_program(&mut self, program: Option<WebGLProgram>) {
        if let Some(data) = program.and_then(|p| self.programs.get_mut(&p)) {
            data.linked = true;
        }
    }

    /// Validate program. Nothing to check.
    pub fn validate_program(&mut self, _program: Option<WebGLProgram>) {}

    /// Get program parameter.
    ///
    /// `LINK_STATUS` and `VALIDATE_STATUS` are `true` for any handle.
    /// Unrecognized parameters answer `None`.
    pub fn get_program_parameter(
        &self,
        program: Option<WebGLProgram>,
        pname: u32,
    ) -> Option<ParameterValue> {
        let data = program.and_then(|p| self.programs.get(&p));
        match pname {
            constants::LINK_STATUS | constants::VALIDATE_STATUS => Some(ParameterValue::Bool(true)),
            constants::DELETE_STATUS => Some(ParameterValue::Bool(data.is_none())),
            constants::ATTACHED_SHADERS => {
                Some(ParameterValue::Int(data.map_or(0, |d| d.attached_shader_count()) as i64))
            }
            constants::ACTIVE_ATTRIBUTES => {
                Some(ParameterValue::Int(data.map_or(0, |d| d.attributes.len()) as i64))
            }
            constants::ACTIVE_UNIFORMS => {
                Some(ParameterValue::Int(data.map_or(0, |d| d.uniforms.len()) as i64))
            }
            _ => None,
        }
    }

    /// Get program info log. Always empty.
    pub fn get_program_info_log(&self, _program: Option<WebGLProgram>) -> String {
        String::new()
    }

    /// Use program. `None` unbinds.
    pub fn use_program(&mut self, program: Option<WebGLProgram>) {
        match program {
            Some(p) if !self.programs.contains_key(&p) => {}
            _ => self.state.current_program = program,
        }
    }

    /// Delete program.
    pub fn delete_program(&mut self, program: Option<WebGLProgram>) {
        let Some(program) = program else {
            return;
        };
        if self.programs.remove(&program).is_some() {
            if self.state.current_program == Some(program) {
                self.state.current_program = None;
            }
            trace!(id = program.id(), "Deleted program");
        }
    }

    pub fn is_program(&self, program: Option<WebGLProgram>) -> bool {
        program.is_some_and(|p| self.programs.contains_key(&p))
    }

    /// Get uniform location. Locations are handed out on first request.
    pub fn get_uniform_location(
        &mut self,
        program: Option<WebGLProgram>,
        name: &str,
    ) -> Option<WebGLUniformLocation> {
        let data = program.and_then(|p| self.programs.get_mut(&p))?;
        if let Some(location) = data.uniforms.get(name) {
            return Some(*location);
        }
        let location = WebGLUniformLocation::from_raw(next_id(&mut self.next_uniform_location));
        data.uniforms.insert(name.to_string(), location);
        Some(location)
    }

    /// Get attribute location, or -1 for a missing program.
    pub fn get_attrib_location(&mut self, program: Option<WebGLProgram>, name: &str) -> i32 {
        let Some(data) = program.and_then(|p| self.programs.get_mut(&p)) else {
            return -1;
        };
        if let Some(location) = data.attributes.get(name) {
            return *location;
        }
        let location = data.attributes.len() as i32;
        data.attributes.insert(name.to_string(), location);
        location
    }

    // ==================== Uniforms ====================

    fn set_uniform(&mut self, location: Option<WebGLUniformLocation>, value: UniformValue) {
        if let Some(location) = location {
            self.uniform_values.insert(location, value);
        }
    }

    /// Set uniform float.
    pub fn uniform1f(&mut self, location: Option<WebGLUniformLocation>, x: f32) {
        self.set_uniform(location, UniformValue::Float(x));
    }

    /// Set uniform vec2.
    pub fn uniform2f(&mut self, location: Option<WebGLUniformLocation>, x: f32, y: f32) {
        self.set_uniform(location, UniformValue::Vec2([x, y]));
    }

    /// Set uniform vec3.
    pub fn uniform3f(&mut self, location: Option<WebGLUniformLocation>, x: f32, y: f32, z: f32) {
        self.set_uniform(location, UniformValue::Vec3([x, y, z]));
    }

    /// Set uniform vec4.
    pub fn uniform4f(
        &mut self,
        location: Option<WebGLUniformLocation>,
        x: f32,
        y: f32,
        z: f32,
        w: f32,
    ) {
        self.set_uniform(location, UniformValue::Vec4([x, y, z, w]));
    }

    /// Set uniform int.
    pub fn uniform1i(&mut self, location: Option<WebGLUniformLocation>, x: i32) {
        self.set_uniform(location, UniformValue::Int(x));
    }

    /// Set uniform mat4.
    pub fn uniform_matrix4fv(
        &mut self,
        location: Option<WebGLUniformLocation>,
        _transpose: bool,
        value: &[f32; 16],
    ) {
        self.set_uniform(location, UniformValue::Mat4(*value));
    }

    pub fn get_uniform(&self, location: Option<WebGLUniformLocation>) -> Option<&UniformValue> {
        location.and_then(|l| self.uniform_values.get(&l))
    }

    // ==================== Buffers ====================

    /// Create a buffer.
    pub fn create_buffer(&mut self) -> WebGLBuffer {
        let id = next_id(&mut self.counters.buffers);
        let buffer = WebGLBuffer::from_raw(id);
        self.buffers.insert(buffer, Buffer::new(id));
        trace!(id, "Created buffer");
        buffer
    }

    /// Bind a buffer. Null and deleted handles leave the binding untouched.
    pub fn bind_buffer(&mut self, target: u32, buffer: Option<WebGLBuffer>) {
        let slot = match target {
            constants::ARRAY_BUFFER => &mut self.state.array_buffer,
            constants::ELEMENT_ARRAY_BUFFER => &mut self.state.element_array_buffer,
            _ => {
                self.last_error = constants::INVALID_ENUM;
                return;
            }
        };
        let Some(buffer) = buffer else {
            return;
        };
        if let Some(data) = self.buffers.get_mut(&buffer) {
            data.target = Some(target);
            *slot = Some(buffer);
        }
    }

    fn bound_buffer(&mut self, target: u32) -> Option<&mut Buffer> {
        let bound = match target {
            constants::ARRAY_BUFFER => self.state.array_buffer,
            constants::ELEMENT_ARRAY_BUFFER => self.state.element_array_buffer,
            _ => None,
        }?;
        self.buffers.get_mut(&bound)
    }

    /// Upload buffer data to the buffer bound at `target`.
    pub fn buffer_data(&mut self, target: u32, data: &[u8], usage: u32) {
        if let Some(buffer) = self.bound_buffer(target) {
            buffer.usage = usage;
            buffer.data = data.to_vec();
        }
    }

    /// Overwrite part of the bound buffer's data.
    pub fn buffer_sub_data(&mut self, target: u32, offset: usize, data: &[u8]) {
        let Some(buffer) = self.bound_buffer(target) else {
            return;
        };
        let end = offset.checked_add(data.len());
        match end.and_then(|end| buffer.data.get_mut(offset..end)) {
            Some(range) => range.copy_from_slice(data),
            None => self.last_error = constants::INVALID_VALUE,
        }
    }

    /// Delete a buffer.
    pub fn delete_buffer(&mut self, buffer: Option<WebGLBuffer>) {
        let Some(buffer) = buffer else {
            return;
        };
        if self.buffers.remove(&buffer).is_none() {
            return;
        }
        let state = &mut self.state;
        if state.array_buffer == Some(buffer) {
            state.array_buffer = None;
        }
        if state.element_array_buffer == Some(buffer) {
            state.element_array_buffer = None;
        }
        trace!(id = buffer.id(), "Deleted buffer");
    }

    pub fn is_buffer(&self, buffer: Option<WebGLBuffer>) -> bool {
        buffer.is_some_and(|b| self.buffers.contains_key(&b))
    }

    // ==================== Vertex Attributes ====================

    /// Set vertex attribute pointer.
    pub fn vertex_attrib_pointer(
        &mut self,
        index: u32,
        size: i32,
        type_: u32,
        normalized: bool,
        stride: i32,
        offset: i32,
    ) {
        let buffer = self.state.array_buffer;
        match self.state.vertex_attribs.get_mut(index as usize) {
            Some(attrib) => {
                *attrib = VertexAttribPointer {
                    enabled: attrib.enabled,
                    size,
                    type_,
                    normalized,
                    stride,
                    offset,
                    buffer,
                }
            }
            None => self.last_error = constants::INVALID_VALUE,
        }
    }

    /// Enable vertex attribute array.
    pub fn enable_vertex_attrib_array(&mut self, index: u32) {
        if let Some(attrib) = self.state.vertex_attribs.get_mut(index as usize) {
            attrib.enabled = true;
        }
    }

    /// Disable vertex attribute array.
    pub fn disable_vertex_attrib_array(&mut self, index: u32) {
        if let Some(attrib) = self.state.vertex_attribs.get_mut(index as usize) {
            attrib.enabled = false;
        }
    }

    // ==================== Textures ====================

    /// Create a texture.
    pub fn create_texture(&mut self) -> WebGLTexture {
        let id = next_id(&mut self.counters.textures);
        let texture = WebGLTexture::from_raw(id);
        self.textures.insert(texture, Texture::new(id));
        trace!(id, "Created texture");
        texture
    }

    /// Bind a texture to the active unit.
    pub fn bind_texture(&mut self, target: u32, texture: Option<WebGLTexture>) {
        if target != constants::TEXTURE_2D && target != constants::TEXTURE_CUBE_MAP {
            self.last_error = constants::INVALID_ENUM;
            return;
        }
        let Some(texture) = texture else {
            return;
        };
        let Some(data) = self.textures.get_mut(&texture) else {
            return;
        };
        data.target.get_or_insert(target);
        let unit = self.state.active_unit();
        if let Some(slot) = self.state.texture_units.get_mut(unit) {
            *slot = Some(texture);
        }
    }

    /// Set active texture unit (`TEXTURE0 + n`).
    pub fn active_texture(&mut self, texture: u32) {
        let unit = texture.checked_sub(constants::TEXTURE0);
        match unit {
            Some(unit) if unit < constants::MAX_TEXTURE_UNITS => self.state.active_texture = texture,
            _ => self.last_error = constants::INVALID_ENUM,
        }
    }

    fn bound_texture(&mut self) -> Option<&mut Texture> {
        let unit = self.state.active_unit();
        let texture = (*self.state.texture_units.get(unit)?)?;
        self.textures.get_mut(&texture)
    }

    /// Set texture parameter on the texture bound to the active unit.
    pub fn tex_parameteri(&mut self, _target: u32, pname: u32, param: i32) {
        if let Some(texture) = self.bound_texture() {
            match pname {
                constants::TEXTURE_MAG_FILTER => texture.mag_filter = param as u32,
                constants::TEXTURE_MIN_FILTER => texture.min_filter = param as u32,
                constants::TEXTURE_WRAP_S => texture.wrap_s = param as u32,
                constants::TEXTURE_WRAP_T => texture.wrap_t = param as u32,
                _ => {}
            }
        }
    }

    /// Upload texture image. Only dimensions and formats are kept.
    #[allow(clippy::too_many_arguments)]
    pub fn tex_image_2d(
        &mut self,
        target: u32,
        _level: i32,
        internal_format: u32,
        width: u32,
        height: u32,
        _border: i32,
        format: u32,
        _type_: u32,
        _pixels: Option<&[u8]>,
    ) {
        if let Some(texture) = self.bound_texture() {
            texture.target = Some(target);
            texture.width = width;
            texture.height = height;
            texture.internal_format = internal_format;
            texture.format = format;
        }
    }

    /// Mark the bound texture as mipmapped.
    pub fn generate_mipmap(&mut self, _target: u32) {
        if let Some(texture) = self.bound_texture() {
            texture.has_mipmaps = true;
        }
    }

    /// Delete a texture.
    pub fn delete_texture(&mut self, texture: Option<WebGLTexture>) {
        let Some(texture) = texture else {
            return;
        };
        if self.textures.remove(&texture).is_none() {
            return;
        }
        for slot in self.state.texture_units.iter_mut() {
            if *slot == Some(texture) {
                *slot = None;
            }
        }
        trace!(id = texture.id(), "Deleted texture");
    }

    pub fn is_texture(&self, texture: Option<WebGLTexture>) -> bool {
        texture.is_some_and(|t| self.textures.contains_key(&t))
    }

    // ==================== Drawing ====================

    fn draw_state(&self) -> Box<DrawState> {
        Box::new(DrawState {
            viewport: self.state.viewport,
            blend_enabled: self.state.blend,
            blend_func: self.state.blend_func,
            depth_test_enabled: self.state.depth_test,
            depth_func: self.state.depth_func,
            cull_face_enabled: self.state.cull_face,
            cull_face_mode: self.state.cull_face_mode,
            framebuffer: self.state.framebuffer,
            vertex_attribs: self.state.vertex_attribs.clone(),
        })
    }

    /// Draw arrays. Recorded only while a program is in use.
    pub fn draw_arrays(&mut self, mode: u32, first: i32, count: i32) {
        if let Some(program) = self.state.current_program {
            let state = self.draw_state();
            self.draw_calls.push(DrawCall::DrawArrays {
                mode,
                first,
                count,
                program,
                state,
            });
        }
    }

    /// Draw elements. Recorded only while a program is in use.
    pub fn draw_elements(&mut self, mode: u32, count: i32, type_: u32, offset: i32) {
        if let Some(program) = self.state.current_program {
            let state = self.draw_state();
            self.draw_calls.push(DrawCall::DrawElements {
                mode,
                count,
                type_,
                offset,
                program,
                state,
            });
        }
    }

    // ==================== Framebuffers ====================

    /// Create framebuffer.
    pub fn create_framebuffer(&mut self) -> WebGLFramebuffer {
        let id = next_id(&mut self.counters.framebuffers);
        let framebuffer = WebGLFramebuffer::from_raw(id);
        self.framebuffers.insert(framebuffer, Framebuffer::new(id));
        trace!(id, "Created framebuffer");
        framebuffer
    }

    /// Bind framebuffer.
    pub fn bind_framebuffer(&mut self, _target: u32, framebuffer: Option<WebGLFramebuffer>) {
        if let Some(framebuffer) = framebuffer {
            if self.framebuffers.contains_key(&framebuffer) {
                self.state.framebuffer = Some(framebuffer);
            }
        }
    }

    fn bound_framebuffer(&mut self) -> Option<&mut Framebuffer> {
        let bound = self.state.framebuffer?;
        self.framebuffers.get_mut(&bound)
    }

    /// Attach a texture to the bound framebuffer.
    pub fn framebuffer_texture_2d(
        &mut self,
        _target: u32,
        attachment: u32,
        _textarget: u32,
        texture: Option<WebGLTexture>,
        _level: i32,
    ) {
        let texture = texture.filter(|t| self.textures.contains_key(t));
        if let Some(framebuffer) = self.bound_framebuffer() {
            framebuffer.attach(attachment, texture.map(Attachment::Texture));
        }
    }

    /// Attach a renderbuffer to the bound framebuffer.
    pub fn framebuffer_renderbuffer(
        &mut self,
        _target: u32,
        attachment: u32,
        _renderbuffer_target: u32,
        renderbuffer: Option<WebGLRenderbuffer>,
    ) {
        let renderbuffer = renderbuffer.filter(|r| self.renderbuffers.contains_key(r));
        if let Some(framebuffer) = self.bound_framebuffer() {
            framebuffer.attach(attachment, renderbuffer.map(Attachment::Renderbuffer));
        }
    }

    /// Always complete.
    pub fn check_framebuffer_status(&self, _target: u32) -> u32 {
        constants::FRAMEBUFFER_COMPLETE
    }

    /// Delete framebuffer.
    pub fn delete_framebuffer(&mut self, framebuffer: Option<WebGLFramebuffer>) {
        let Some(framebuffer) = framebuffer else {
            return;
        };
        if self.framebuffers.remove(&framebuffer).is_some() {
            if self.state.framebuffer == Some(framebuffer) {
                self.state.framebuffer = None;
            }
            trace!(id = framebuffer.id(), "Deleted framebuffer");
        }
    }

    pub fn is_framebuffer(&self, framebuffer: Option<WebGLFramebuffer>) -> bool {
        framebuffer.is_some_and(|f| self.framebuffers.contains_key(&f))
    }

    // ==================== Renderbuffers ====================

    /// Create renderbuffer.
    pub fn create_renderbuffer(&mut self) -> WebGLRenderbuffer {
        let id = next_id(&mut self.counters.renderbuffers);
        let renderbuffer = WebGLRenderbuffer::from_raw(id);
        self.renderbuffers.insert(renderbuffer, Renderbuffer::new(id));
        trace!(id, "Created renderbuffer");
        renderbuffer
    }

    /// Bind renderbuffer.
    pub fn bind_renderbuffer(&mut self, _target: u32, renderbuffer: Option<WebGLRenderbuffer>) {
        if let Some(renderbuffer) = renderbuffer {
            if self.renderbuffers.contains_key(&renderbuffer) {
                self.state.renderbuffer = Some(renderbuffer);
            }
        }
    }

    /// Allocate storage for the bound renderbuffer.
    pub fn renderbuffer_storage(
        &mut self,
        _target: u32,
        internal_format: u32,
        width: u32,
        height: u32,
    ) {
        let Some(bound) = self.state.renderbuffer else {
            return;
        };
        if let Some(renderbuffer) = self.renderbuffers.get_mut(&bound) {
            renderbuffer.internal_format = internal_format;
            renderbuffer.width = width;
            renderbuffer.height = height;
        }
    }

    /// Delete renderbuffer.
    pub fn delete_renderbuffer(&mut self, renderbuffer: Option<WebGLRenderbuffer>) {
        let Some(renderbuffer) = renderbuffer else {
            return;
        };
        if self.renderbuffers.remove(&renderbuffer).is_some() {
            if self.state.renderbuffer == Some(renderbuffer) {
                self.state.renderbuffer = None;
            }
            trace!(id = renderbuffer.id(), "Deleted renderbuffer");
        }
    }

    pub fn is_renderbuffer(&self, renderbuffer: Option<WebGLRenderbuffer>) -> bool {
        renderbuffer.is_some_and(|r| self.renderbuffers.contains_key(&r))
    }

    // ==================== Output ====================

    /// Get draw calls and clear them.
    pub fn take_draw_calls(&mut self) -> Vec<DrawCall> {
        std::mem::take(&mut self.draw_calls)
    }

    pub fn draw_call_count(&self) -> usize {
        self.draw_calls.len()
    }

    pub fn get_buffer(&self, buffer: WebGLBuffer) -> Option<&Buffer> {
        self.buffers.get(&buffer)
    }

    pub fn get_shader(&self, shader: WebGLShader) -> Option<&Shader> {
        self.shaders.get(&shader)
    }

    pub fn get_program(&self, program: WebGLProgram) -> Option<&Program> {
        self.programs.get(&program)
    }

    pub fn get_texture(&self, texture: WebGLTexture) -> Option<&Texture> {
        self.textures.get(&texture)
    }

    pub fn get_framebuffer(&self, framebuffer: WebGLFramebuffer) -> Option<&Framebuffer> {
        self.framebuffers.get(&framebuffer)
    }

    pub fn get_renderbuffer(&self, renderbuffer: WebGLRenderbuffer) -> Option<&Renderbuffer> {
        self.renderbuffers.get(&renderbuffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use constants::*;

    #[test]
    fn test_context_creation() {
        let ctx = WebGLRenderingContext::new(800, 600);
        assert_eq!(ctx.width, 800);
        assert_eq!(ctx.height, 600);
        assert_eq!(ctx.state().viewport, [0, 0, 800, 600]);
        assert!(!ctx.is_context_lost());
    }

    #[test]
    fn test_initial_state() {
        let ctx = WebGLRenderingContext::new(100, 100);
        let state = ctx.state();
        assert!(state.dither);
        assert!(!state.blend);
        assert!(!state.depth_test);
        assert!(!state.cull_face);
        assert_eq!(state.active_texture, TEXTURE0);
        assert_eq!(state.blend_func, (ONE, ZERO));
        assert_eq!(state.depth_func, LESS);
        assert_eq!(state.cull_face_mode, BACK);
        assert!(state.current_program.is_none());
    }

    #[test]
    fn test_buffer_ids_are_sequential() {
        let mut ctx = WebGLRenderingContext::new(100, 100);
        let ids: Vec<u32> = (0..5).map(|_| ctx.create_buffer().id()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(ctx.resource_counters().buffers, 5);
    }

    #[test]
    fn test_ids_are_per_kind() {
        let mut ctx = WebGLRenderingContext::new(100, 100);
        ctx.create_buffer();
        ctx.create_buffer();
        assert_eq!(ctx.create_texture().id(), 1);
        assert_eq!(ctx.create_program().id(), 1);
        assert_eq!(ctx.create_shader(VERTEX_SHADER).id(), 1);
    }

    #[test]
    fn test_buffer_operations() {
        let mut ctx = WebGLRenderingContext::new(100, 100);
        let buffer = ctx.create_buffer();
        ctx.bind_buffer(ARRAY_BUFFER, Some(buffer));
        assert_eq!(ctx.state().array_buffer, Some(buffer));

        let data = [1u8, 2, 3, 4, 5, 6, 7, 8];
        ctx.buffer_data(ARRAY_BUFFER, &data, STATIC_DRAW);
        ctx.buffer_sub_data(ARRAY_BUFFER, 2, &[9, 9]);

        let stored = ctx.get_buffer(buffer).unwrap();
        assert_eq!(stored.data, vec![1, 2, 9, 9, 5, 6, 7, 8]);
        assert_eq!(stored.target, Some(ARRAY_BUFFER));

        ctx.buffer_sub_data(ARRAY_BUFFER, 7, &[1, 1]);
        assert_eq!(ctx.get_error(), INVALID_VALUE);
        assert_eq!(ctx.get_error(), NO_ERROR);
    }

    #[test]
    fn test_buffer_sub_data_offset_overflow() {
        let mut ctx = WebGLRenderingContext::new(100, 100);
        let buffer = ctx.create_buffer();
        ctx.bind_buffer(ARRAY_BUFFER, Some(buffer));
        ctx.buffer_data(ARRAY_BUFFER, &[0u8; 4], STATIC_DRAW);

        ctx.buffer_sub_data(ARRAY_BUFFER, usize::MAX, &[1]);
        assert_eq!(ctx.get_error(), INVALID_VALUE);
        assert_eq!(ctx.get_buffer(buffer).unwrap().data, vec![0; 4]);
    }

    #[test]
    fn test_bind_none_keeps_binding() {
        let mut ctx = WebGLRenderingContext::new(100, 100);
        let buffer = ctx.create_buffer();
        ctx.bind_buffer(ARRAY_BUFFER, Some(buffer));
        ctx.bind_buffer(ARRAY_BUFFER, None);
        assert_eq!(ctx.state().array_buffer, Some(buffer));

        ctx.bind_buffer(ARRAY_BUFFER, Some(WebGLBuffer::from_raw(42)));
        assert_eq!(ctx.state().array_buffer, Some(buffer));
    }

    #[test]
    fn test_delete_missing_is_noop() {
        let mut ctx = WebGLRenderingContext::new(100, 100);
        let buffer = ctx.create_buffer();
        ctx.delete_buffer(Some(WebGLBuffer::from_raw(99)));
        ctx.delete_buffer(None);
        ctx.delete_texture(Some(WebGLTexture::from_raw(7)));
        ctx.delete_program(None);
        assert!(ctx.is_buffer(Some(buffer)));

        ctx.delete_buffer(Some(buffer));
        ctx.delete_buffer(Some(buffer));
        assert!(!ctx.is_buffer(Some(buffer)));
        assert_eq!(ctx.get_error(), NO_ERROR);
    }

    #[test]
    fn test_delete_clears_bindings() {
        let mut ctx = WebGLRenderingContext::new(100, 100);
        let buffer = ctx.create_buffer();
        let texture = ctx.create_texture();
        let program = ctx.create_program();
        ctx.bind_buffer(ARRAY_BUFFER, Some(buffer));
        ctx.bind_texture(TEXTURE_2D, Some(texture));
        ctx.use_program(Some(program));

        ctx.delete_buffer(Some(buffer));
        ctx.delete_texture(Some(texture));
        ctx.delete_program(Some(program));

        let state = ctx.state();
        assert!(state.array_buffer.is_none());
        assert!(state.texture_units.iter().all(Option::is_none));
        assert!(state.current_program.is_none());
    }

    #[test]
    fn test_shader_compilation_always_succeeds() {
        let mut ctx = WebGLRenderingContext::new(100, 100);
        let shader = ctx.create_shader(VERTEX_SHADER);
        ctx.shader_source(Some(shader), "this is not glsl");
        ctx.compile_shader(Some(shader));

        assert!(ctx.get_shader(shader).unwrap().compiled);
        assert_eq!(
            ctx.get_shader_parameter(Some(shader), COMPILE_STATUS),
            Some(ParameterValue::Bool(true))
        );
        assert_eq!(
            ctx.get_shader_parameter(None, COMPILE_STATUS),
            Some(ParameterValue::Bool(true))
        );
        assert_eq!(
            ctx.get_shader_parameter(Some(shader), SHADER_TYPE),
            Some(ParameterValue::Int(VERTEX_SHADER as i64))
        );
        assert_eq!(ctx.get_shader_parameter(Some(shader), 9999), None);
        assert!(ctx.get_shader_info_log(Some(shader)).is_empty());
        assert_eq!(
            ctx.get_shader_source(Some(shader)).as_deref(),
            Some("this is not glsl")
        );
    }

    #[test]
    fn test_program_linking() {
        let mut ctx = WebGLRenderingContext::new(100, 100);
        let vs = ctx.create_shader(VERTEX_SHADER);
        let fs = ctx.create_shader(FRAGMENT_SHADER);
        let program = ctx.create_program();

        ctx.attach_shader(Some(program), Some(vs));
        ctx.attach_shader(Some(program), Some(fs));
        ctx.link_program(Some(program));

        assert!(ctx.get_program(program).unwrap().linked);
        assert_eq!(
            ctx.get_program_parameter(Some(program), LINK_STATUS),
            Some(ParameterValue::Bool(true))
        );
        assert_eq!(
            ctx.get_program_parameter(Some(program), ATTACHED_SHADERS),
            Some(ParameterValue::Int(2))
        );
        assert_eq!(ctx.get_program_parameter(Some(program), 9999), None);

        ctx.detach_shader(Some(program), Some(vs));
        assert_eq!(
            ctx.get_program_parameter(Some(program), ATTACHED_SHADERS),
            Some(ParameterValue::Int(1))
        );
    }

    #[test]
    fn test_link_without_shaders() {
        let mut ctx = WebGLRenderingContext::new(100, 100);
        let program = ctx.create_program();
        ctx.link_program(Some(program));
        assert!(ctx.get_program(program).unwrap().linked);
    }

    #[test]
    fn test_uniform_and_attrib_locations() {
        let mut ctx = WebGLRenderingContext::new(100, 100);
        let program = ctx.create_program();

        let color = ctx.get_uniform_location(Some(program), "uColor");
        assert!(color.is_some());
        assert_eq!(ctx.get_uniform_location(Some(program), "uColor"), color);
        assert_eq!(ctx.get_uniform_location(None, "uColor"), None);

        ctx.uniform4f(color, 1.0, 0.5, 0.25, 1.0);
        assert_eq!(
            ctx.get_uniform(color),
            Some(&UniformValue::Vec4([1.0, 0.5, 0.25, 1.0]))
        );

        assert_eq!(ctx.get_attrib_location(Some(program), "aPosition"), 0);
        assert_eq!(ctx.get_attrib_location(Some(program), "aNormal"), 1);
        assert_eq!(ctx.get_attrib_location(Some(program), "aPosition"), 0);
        assert_eq!(ctx.get_attrib_location(None, "aPosition"), -1);
    }

    #[test]
    fn test_texture_operations() {
        let mut ctx = WebGLRenderingContext::new(100, 100);
        let texture = ctx.create_texture();
        ctx.active_texture(TEXTURE0 + 1);
        ctx.bind_texture(TEXTURE_2D, Some(texture));
        ctx.tex_image_2d(TEXTURE_2D, 0, RGBA, 256, 128, 0, RGBA, UNSIGNED_BYTE, None);
        ctx.tex_parameteri(TEXTURE_2D, TEXTURE_MIN_FILTER, NEAREST as i32);
        ctx.generate_mipmap(TEXTURE_2D);

        let stored = ctx.get_texture(texture).unwrap();
        assert_eq!((stored.width, stored.height), (256, 128));
        assert_eq!(stored.min_filter, NEAREST);
        assert!(stored.has_mipmaps);
        assert_eq!(ctx.state().texture_units[1], Some(texture));

        ctx.active_texture(TEXTURE0 + 99);
        assert_eq!(ctx.get_error(), INVALID_ENUM);
    }

    #[test]
    fn test_framebuffer_attachments() {
        let mut ctx = WebGLRenderingContext::new(100, 100);
        let framebuffer = ctx.create_framebuffer();
        let texture = ctx.create_texture();
        let renderbuffer = ctx.create_renderbuffer();

        ctx.bind_framebuffer(FRAMEBUFFER, Some(framebuffer));
        ctx.framebuffer_texture_2d(FRAMEBUFFER, COLOR_ATTACHMENT0, TEXTURE_2D, Some(texture), 0);
        ctx.bind_renderbuffer(RENDERBUFFER, Some(renderbuffer));
        ctx.renderbuffer_storage(RENDERBUFFER, DEPTH_COMPONENT16, 100, 100);
        ctx.framebuffer_renderbuffer(
            FRAMEBUFFER,
            DEPTH_ATTACHMENT,
            RENDERBUFFER,
            Some(renderbuffer),
        );

        let stored = ctx.get_framebuffer(framebuffer).unwrap();
        assert_eq!(stored.color_attachment, Some(Attachment::Texture(texture)));
        assert_eq!(
            stored.depth_attachment,
            Some(Attachment::Renderbuffer(renderbuffer))
        );
        assert_eq!(ctx.get_renderbuffer(renderbuffer).unwrap().width, 100);
        assert_eq!(ctx.check_framebuffer_status(FRAMEBUFFER), FRAMEBUFFER_COMPLETE);
    }

    #[test]
    fn test_enable_disable() {
        let mut ctx = WebGLRenderingContext::new(100, 100);
        ctx.enable(BLEND);
        ctx.enable(DEPTH_TEST);
        ctx.disable(DITHER);
        assert!(ctx.is_enabled(BLEND));
        assert!(ctx.is_enabled(DEPTH_TEST));
        assert!(!ctx.is_enabled(DITHER));

        ctx.enable(0x1234);
        assert_eq!(ctx.get_error(), INVALID_ENUM);
    }

    #[test]
    fn test_draw_calls() {
        let mut ctx = WebGLRenderingContext::new(100, 100);
        ctx.clear_color(0.1, 0.2, 0.3, 1.0);
        ctx.clear(COLOR_BUFFER_BIT | DEPTH_BUFFER_BIT);

        ctx.draw_arrays(TRIANGLES, 0, 3);
        assert_eq!(ctx.draw_call_count(), 1);

        let program = ctx.create_program();
        ctx.use_program(Some(program));
        ctx.enable(BLEND);
        ctx.draw_arrays(TRIANGLES, 0, 3);
        ctx.draw_elements(TRIANGLES, 6, UNSIGNED_SHORT, 0);

        let calls = ctx.take_draw_calls();
        assert_eq!(calls.len(), 3);
        assert!(matches!(calls[0], DrawCall::Clear { color, .. } if color == [0.1, 0.2, 0.3, 1.0]));
        match &calls[1] {
            DrawCall::DrawArrays { count, state, .. } => {
                assert_eq!(*count, 3);
                assert!(state.blend_enabled);
            }
            other => panic!("unexpected draw call: {other:?}"),
        }
        assert_eq!(ctx.draw_call_count(), 0);
    }

    #[test]
    fn test_parameter_table() {
        let ctx = WebGLRenderingContext::new(100, 100);
        assert_eq!(
            ctx.get_parameter(VENDOR).and_then(|v| v.as_str().map(String::from)),
            Some("SceneSim".to_string())
        );
        assert_eq!(ctx.get_parameter(UNMASKED_VENDOR_WEBGL), ctx.get_parameter(VENDOR));
        assert_eq!(
            ctx.get_parameter(UNMASKED_RENDERER_WEBGL),
            ctx.get_parameter(RENDERER)
        );
        assert_eq!(
            ctx.get_parameter(MAX_TEXTURE_SIZE),
            Some(ParameterValue::Int(4096))
        );
        assert_eq!(
            ctx.get_parameter_by_name("MAX_TEXTURE_SIZE"),
            ctx.get_parameter(MAX_TEXTURE_SIZE)
        );
        assert_eq!(ctx.get_parameter(9999), None);
        assert_eq!(ctx.get_parameter_by_name("NOT_A_PARAMETER"), None);
    }

    #[test]
    fn test_state_parameters() {
        let mut ctx = WebGLRenderingContext::new(320, 240);
        assert_eq!(
            ctx.get_parameter(VIEWPORT),
            Some(ParameterValue::IntArray(vec![0, 0, 320, 240]))
        );
        assert_eq!(ctx.get_parameter(DITHER), Some(ParameterValue::Bool(true)));
        assert_eq!(ctx.get_parameter(CURRENT_PROGRAM), None);

        let program = ctx.create_program();
        ctx.use_program(Some(program));
        assert_eq!(ctx.get_parameter(CURRENT_PROGRAM), Some(ParameterValue::Int(1)));
    }

    #[test]
    fn test_extensions() {
        let ctx = WebGLRenderingContext::new(100, 100);
        let extensions = ctx.get_supported_extensions();
        assert_eq!(extensions.len(), 7);
        for name in &extensions {
            assert!(ctx.get_extension(name).is_some());
        }
        assert!(ctx.get_extension("WEBGL_imaginary_extension").is_none());
    }

    #[test]
    fn test_cleanup_resets_everything() {
        let mut ctx = WebGLRenderingContext::new(100, 100);
        let buffer = ctx.create_buffer();
        ctx.create_texture();
        let program = ctx.create_program();
        ctx.bind_buffer(ARRAY_BUFFER, Some(buffer));
        ctx.use_program(Some(program));
        ctx.enable(BLEND);
        ctx.clear(COLOR_BUFFER_BIT);

        ctx.cleanup();

        assert_eq!(ctx.resource_counters(), ResourceCounters::default());
        assert_eq!(ctx.live_counts().total(), 0);
        assert_eq!(ctx.state(), &WebGLState::initial(100, 100));
        assert_eq!(ctx.draw_call_count(), 0);
        assert_eq!(ctx.create_buffer().id(), 1);

        ctx.cleanup();
        ctx.cleanup();
        assert_eq!(ctx.resource_counters().total(), 0);
    }

    #[test]
    fn test_resize_updates_viewport() {
        let mut ctx = WebGLRenderingContext::new(100, 100);
        ctx.resize(640, 480);
        assert_eq!(ctx.state().viewport, [0, 0, 640, 480]);

        ctx.cleanup();
        assert_eq!(ctx.state().viewport, [0, 0, 640, 480]);
    }

    #[test]
    fn test_state_serializes() {
        let ctx = WebGLRenderingContext::new(10, 10);
        let json = serde_json::to_value(ctx.state()).unwrap();
        assert_eq!(json["dither"], serde_json::json!(true));
        assert_eq!(json["viewport"], serde_json::json!([0, 0, 10, 10]));
    }
}
