use std::ffi::c_void;
use std::num::NonZeroU32;

use glow::HasContext;

use crate::error::RenderError;

/// `GL_TEXTURE_EXTERNAL_OES` from `OES_EGL_image_external`.
pub const TEXTURE_EXTERNAL_OES: u32 = 0x8D65;

/// The GLES 2 subset used by the session and the default renderer.
///
/// Object names are plain `u32` GL names (0 = none). Every call requires the session's context to
/// be current on the calling thread, which holds by construction on the render thread.
pub trait GlesApi {
    fn create_shader(&self, kind: u32) -> Result<u32, String>;
    fn shader_source(&self, shader: u32, source: &str);
    fn compile_shader(&self, shader: u32);
    fn shader_compile_status(&self, shader: u32) -> bool;
    fn shader_info_log(&self, shader: u32) -> String;
    fn delete_shader(&self, shader: u32);

    fn create_program(&self) -> Result<u32, String>;
    fn attach_shader(&self, program: u32, shader: u32);
    fn link_program(&self, program: u32);
    fn program_link_status(&self, program: u32) -> bool;
    fn program_info_log(&self, program: u32) -> String;
    fn use_program(&self, program: Option<u32>);
    fn delete_program(&self, program: u32);
    fn uniform_location(&self, program: u32, name: &str) -> Option<u32>;
    fn attrib_location(&self, program: u32, name: &str) -> Option<u32>;
    fn uniform_matrix_4(&self, location: u32, matrix: &[f32; 16]);

    fn create_buffer(&self) -> Result<u32, String>;
    fn bind_buffer(&self, target: u32, buffer: Option<u32>);
    fn buffer_data(&self, target: u32, data: &[u8], usage: u32);
    fn delete_buffer(&self, buffer: u32);
    fn enable_vertex_attrib_array(&self, index: u32);
    fn vertex_attrib_pointer_f32(&self, index: u32, size: i32, stride: i32, offset: i32);

    fn create_texture(&self) -> Result<u32, String>;
    fn bind_texture(&self, target: u32, texture: Option<u32>);
    fn tex_parameter_i32(&self, target: u32, parameter: u32, value: i32);
    fn delete_texture(&self, texture: u32);
    fn active_texture(&self, unit: u32);

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);
    fn clear_color(&self, red: f32, green: f32, blue: f32, alpha: f32);
    fn clear(&self, mask: u32);
    fn draw_elements(&self, mode: u32, count: i32, element_type: u32, offset: i32);
    fn get_error(&self) -> u32;
}

/// [`GlesApi`] over a `glow` context resolved through `eglGetProcAddress`.
pub struct GlowGles {
    gl: glow::Context,
}

impl GlowGles {
    /// # Safety
    /// A GLES context must be current on the calling thread, and every later call must happen on
    /// a thread where that same context is current.
    pub unsafe fn from_loader_function<F>(loader: F) -> Self
    where
        F: FnMut(&str) -> *const c_void,
    {
        // SAFETY: forwarded to the caller.
        let gl = unsafe { glow::Context::from_loader_function(loader) };
        Self { gl }
    }
}

fn name(id: u32) -> Option<NonZeroU32> {
    NonZeroU32::new(id)
}

// SAFETY (all blocks below): the context is current on this thread per the trait contract, and
// object names originate from the matching `create_*` call on the same context.
impl GlesApi for GlowGles {
    fn create_shader(&self, kind: u32) -> Result<u32, String> {
        unsafe { self.gl.create_shader(kind) }.map(|s| s.0.get())
    }

    fn shader_source(&self, shader: u32, source: &str) {
        if let Some(s) = name(shader) {
            unsafe { self.gl.shader_source(glow::NativeShader(s), source) };
        }
    }

    fn compile_shader(&self, shader: u32) {
        if let Some(s) = name(shader) {
            unsafe { self.gl.compile_shader(glow::NativeShader(s)) };
        }
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        name(shader)
            .map(|s| unsafe { self.gl.get_shader_compile_status(glow::NativeShader(s)) })
            .unwrap_or(false)
    }

    fn shader_info_log(&self, shader: u32) -> String {
        name(shader)
            .map(|s| unsafe { self.gl.get_shader_info_log(glow::NativeShader(s)) })
            .unwrap_or_default()
    }

    fn delete_shader(&self, shader: u32) {
        if let Some(s) = name(shader) {
            unsafe { self.gl.delete_shader(glow::NativeShader(s)) };
        }
    }

    fn create_program(&self) -> Result<u32, String> {
        unsafe { self.gl.create_program() }.map(|p| p.0.get())
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        if let (Some(p), Some(s)) = (name(program), name(shader)) {
            unsafe {
                self.gl
                    .attach_shader(glow::NativeProgram(p), glow::NativeShader(s))
            };
        }
    }

    fn link_program(&self, program: u32) {
        if let Some(p) = name(program) {
            unsafe { self.gl.link_program(glow::NativeProgram(p)) };
        }
    }

    fn program_link_status(&self, program: u32) -> bool {
        name(program)
            .map(|p| unsafe { self.gl.get_program_link_status(glow::NativeProgram(p)) })
            .unwrap_or(false)
    }

    fn program_info_log(&self, program: u32) -> String {
        name(program)
            .map(|p| unsafe { self.gl.get_program_info_log(glow::NativeProgram(p)) })
            .unwrap_or_default()
    }

    fn use_program(&self, program: Option<u32>) {
        let program = program.and_then(name).map(glow::NativeProgram);
        unsafe { self.gl.use_program(program) };
    }

    fn delete_program(&self, program: u32) {
        if let Some(p) = name(program) {
            unsafe { self.gl.delete_program(glow::NativeProgram(p)) };
        }
    }

    fn uniform_location(&self, program: u32, uniform: &str) -> Option<u32> {
        let p = name(program)?;
        unsafe { self.gl.get_uniform_location(glow::NativeProgram(p), uniform) }.map(|l| l.0)
    }

    fn attrib_location(&self, program: u32, attribute: &str) -> Option<u32> {
        let p = name(program)?;
        unsafe { self.gl.get_attrib_location(glow::NativeProgram(p), attribute) }
    }

    fn uniform_matrix_4(&self, location: u32, matrix: &[f32; 16]) {
        let location = glow::NativeUniformLocation(location);
        unsafe {
            self.gl
                .uniform_matrix_4_f32_slice(Some(&location), false, matrix)
        };
    }

    fn create_buffer(&self) -> Result<u32, String> {
        unsafe { self.gl.create_buffer() }.map(|b| b.0.get())
    }

    fn bind_buffer(&self, target: u32, buffer: Option<u32>) {
        let buffer = buffer.and_then(name).map(glow::NativeBuffer);
        unsafe { self.gl.bind_buffer(target, buffer) };
    }

    fn buffer_data(&self, target: u32, data: &[u8], usage: u32) {
        unsafe { self.gl.buffer_data_u8_slice(target, data, usage) };
    }

    fn delete_buffer(&self, buffer: u32) {
        if let Some(b) = name(buffer) {
            unsafe { self.gl.delete_buffer(glow::NativeBuffer(b)) };
        }
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        unsafe { self.gl.enable_vertex_attrib_array(index) };
    }

    fn vertex_attrib_pointer_f32(&self, index: u32, size: i32, stride: i32, offset: i32) {
        unsafe {
            self.gl
                .vertex_attrib_pointer_f32(index, size, glow::FLOAT, false, stride, offset)
        };
    }

    fn create_texture(&self) -> Result<u32, String> {
        unsafe { self.gl.create_texture() }.map(|t| t.0.get())
    }

    fn bind_texture(&self, target: u32, texture: Option<u32>) {
        let texture = texture.and_then(name).map(glow::NativeTexture);
        unsafe { self.gl.bind_texture(target, texture) };
    }

    fn tex_parameter_i32(&self, target: u32, parameter: u32, value: i32) {
        unsafe { self.gl.tex_parameter_i32(target, parameter, value) };
    }

    fn delete_texture(&self, texture: u32) {
        if let Some(t) = name(texture) {
            unsafe { self.gl.delete_texture(glow::NativeTexture(t)) };
        }
    }

    fn active_texture(&self, unit: u32) {
        unsafe { self.gl.active_texture(unit) };
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { self.gl.viewport(x, y, width, height) };
    }

    fn clear_color(&self, red: f32, green: f32, blue: f32, alpha: f32) {
        unsafe { self.gl.clear_color(red, green, blue, alpha) };
    }

    fn clear(&self, mask: u32) {
        unsafe { self.gl.clear(mask) };
    }

    fn draw_elements(&self, mode: u32, count: i32, element_type: u32, offset: i32) {
        unsafe { self.gl.draw_elements(mode, count, element_type, offset) };
    }

    fn get_error(&self) -> u32 {
        unsafe { self.gl.get_error() }
    }
}

fn compile_shader(
    gl: &dyn GlesApi,
    kind: u32,
    stage: &'static str,
    source: &str,
) -> Result<u32, RenderError> {
    let shader = gl.create_shader(kind).map_err(RenderError::Gl)?;
    gl.shader_source(shader, source);
    gl.compile_shader(shader);
    if !gl.shader_compile_status(shader) {
        let log = gl.shader_info_log(shader);
        gl.delete_shader(shader);
        tracing::error!(stage, %log, "shader compile failed");
        return Err(RenderError::ShaderCompile { stage, log });
    }
    Ok(shader)
}

/// Compiles both stages and links them into a program.
///
/// The shader objects are always released; on failure nothing is left allocated.
pub fn compile_program(
    gl: &dyn GlesApi,
    vertex_source: &str,
    fragment_source: &str,
) -> Result<u32, RenderError> {
    let vs = compile_shader(gl, glow::VERTEX_SHADER, "vertex", vertex_source)?;
    let fs = match compile_shader(gl, glow::FRAGMENT_SHADER, "fragment", fragment_source) {
        Ok(fs) => fs,
        Err(e) => {
            gl.delete_shader(vs);
            return Err(e);
        }
    };

    let program = match gl.create_program() {
        Ok(p) => p,
        Err(e) => {
            gl.delete_shader(vs);
            gl.delete_shader(fs);
            return Err(RenderError::Gl(e));
        }
    };
    gl.attach_shader(program, vs);
    gl.attach_shader(program, fs);
    gl.link_program(program);
    let linked = gl.program_link_status(program);
    gl.delete_shader(vs);
    gl.delete_shader(fs);

    if !linked {
        let log = gl.program_info_log(program);
        gl.delete_program(program);
        tracing::error!(%log, "program link failed");
        return Err(RenderError::ProgramLink { log });
    }
    Ok(program)
}
