//! Default renderer: the camera texture stretched over a full-screen quad.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::RenderError;
use crate::gles::{GlesApi, TEXTURE_EXTERNAL_OES, compile_program};
use crate::renderer::{Renderer, SurfaceSize};
use crate::texture::ExternalTexture;

/// Quad corners in normalized device coordinates, two floats each.
pub const QUAD_VERTICES: [f32; 8] = [-1.0, 1.0, 1.0, 1.0, -1.0, -1.0, 1.0, -1.0];
/// Texture coordinates per corner, flipped vertically against `QUAD_VERTICES`.
pub const QUAD_TEX_COORDS: [f32; 8] = [0.0, 1.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0];
/// Two triangles sharing the 1-2 edge.
pub const QUAD_INDICES: [u16; 6] = [0, 1, 2, 1, 3, 2];

#[rustfmt::skip]
pub const IDENTITY_MATRIX: [f32; 16] = [
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 1.0, 0.0,
    0.0, 0.0, 0.0, 1.0,
];

const CAM_TEX_MATRIX: &str = "camTexMatrix";
const MVP_MATRIX: &str = "mvpMatrix";
const POSITION: &str = "position";
const TEXTURE_POSITION: &str = "texturePosition";

/// Named lookup for shader source text.
pub trait ShaderAssets: Send + Sync {
    fn load(&self, name: &str) -> Result<String, RenderError>;
}

/// The stock camera shaders compiled into the crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinShaders;

impl ShaderAssets for BuiltinShaders {
    fn load(&self, name: &str) -> Result<String, RenderError> {
        match name {
            "vert.glsl" => Ok(include_str!("../shaders/vert.glsl").to_string()),
            "frag.glsl" => Ok(include_str!("../shaders/frag.glsl").to_string()),
            _ => Err(RenderError::ShaderAsset {
                name: name.to_string(),
                reason: "no builtin shader with this name".to_string(),
            }),
        }
    }
}

/// Shader files read from a directory at session start.
#[derive(Debug, Clone)]
pub struct DirectoryShaders {
    root: PathBuf,
}

impl DirectoryShaders {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ShaderAssets for DirectoryShaders {
    fn load(&self, name: &str) -> Result<String, RenderError> {
        let path = self.root.join(name);
        fs::read_to_string(&path).map_err(|e| RenderError::ShaderAsset {
            name: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuadRendererConfig {
    pub vertex_asset: String,
    pub fragment_asset: String,
    pub clear_color: [f32; 4],
    pub mvp: [f32; 16],
}

impl Default for QuadRendererConfig {
    fn default() -> Self {
        Self {
            vertex_asset: "vert.glsl".to_string(),
            fragment_asset: "frag.glsl".to_string(),
            clear_color: [0.0, 0.0, 0.0, 0.0],
            mvp: IDENTITY_MATRIX,
        }
    }
}

struct QuadGpu {
    program: u32,
    position_vbo: u32,
    tex_coord_vbo: u32,
    index_buffer: u32,
    cam_tex_matrix: u32,
    mvp_matrix: u32,
    position: u32,
    texture_position: u32,
}

impl QuadGpu {
    fn release(self, gl: &dyn GlesApi) {
        gl.delete_buffer(self.position_vbo);
        gl.delete_buffer(self.tex_coord_vbo);
        gl.delete_buffer(self.index_buffer);
        gl.delete_program(self.program);
    }
}

/// Draws every camera frame across the whole surface with the producer's texture transform.
pub struct DefaultQuadRenderer {
    assets: Arc<dyn ShaderAssets>,
    config: QuadRendererConfig,
    size: SurfaceSize,
    gpu: Option<QuadGpu>,
}

impl DefaultQuadRenderer {
    pub fn new(assets: Arc<dyn ShaderAssets>, config: QuadRendererConfig) -> Self {
        Self {
            assets,
            config,
            size: SurfaceSize::default(),
            gpu: None,
        }
    }

    /// Renderer over the builtin shaders and default config.
    pub fn builtin() -> Self {
        Self::new(Arc::new(BuiltinShaders), QuadRendererConfig::default())
    }

    pub fn surface_size(&self) -> SurfaceSize {
        self.size
    }

    fn build(&self, gl: &dyn GlesApi) -> Result<QuadGpu, RenderError> {
        let vertex = self.assets.load(&self.config.vertex_asset)?;
        let fragment = self.assets.load(&self.config.fragment_asset)?;
        let program = compile_program(gl, &vertex, &fragment)?;

        let mut buffers = Vec::with_capacity(3);
        let res = upload_quad(gl, program, &mut buffers);
        if res.is_err() {
            for buffer in buffers {
                gl.delete_buffer(buffer);
            }
            gl.use_program(None);
            gl.delete_program(program);
        }
        res
    }
}

/// Uploads the static geometry and resolves locations. Every buffer created is pushed onto
/// `buffers` so the caller can release them on failure.
fn upload_quad(
    gl: &dyn GlesApi,
    program: u32,
    buffers: &mut Vec<u32>,
) -> Result<QuadGpu, RenderError> {
    let position_vbo = static_buffer(gl, glow::ARRAY_BUFFER, &f32_bytes(&QUAD_VERTICES))?;
    buffers.push(position_vbo);
    let tex_coord_vbo = static_buffer(gl, glow::ARRAY_BUFFER, &f32_bytes(&QUAD_TEX_COORDS))?;
    buffers.push(tex_coord_vbo);
    let index_buffer = static_buffer(gl, glow::ELEMENT_ARRAY_BUFFER, &u16_bytes(&QUAD_INDICES))?;
    buffers.push(index_buffer);
    gl.bind_buffer(glow::ARRAY_BUFFER, None);
    gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, None);

    gl.use_program(Some(program));
    let gpu = QuadGpu {
        program,
        position_vbo,
        tex_coord_vbo,
        index_buffer,
        cam_tex_matrix: uniform(gl, program, CAM_TEX_MATRIX)?,
        mvp_matrix: uniform(gl, program, MVP_MATRIX)?,
        position: attrib(gl, program, POSITION)?,
        texture_position: attrib(gl, program, TEXTURE_POSITION)?,
    };
    let code = gl.get_error();
    if code != glow::NO_ERROR {
        return Err(RenderError::Gl(format!("location lookup: 0x{code:x}")));
    }
    Ok(gpu)
}

impl Renderer for DefaultQuadRenderer {
    fn on_surface_created(
        &mut self,
        gl: &dyn GlesApi,
        _texture: &mut ExternalTexture,
        size: SurfaceSize,
    ) -> Result<(), RenderError> {
        self.size = size;
        if let Some(stale) = self.gpu.take() {
            stale.release(gl);
        }
        self.gpu = Some(self.build(gl)?);
        tracing::debug!(width = size.width, height = size.height, "quad renderer ready");
        Ok(())
    }

    fn on_surface_changed(&mut self, _texture: &mut ExternalTexture, size: SurfaceSize) {
        self.size = size;
    }

    fn on_frame_available(
        &mut self,
        gl: &dyn GlesApi,
        texture: &mut ExternalTexture,
    ) -> Result<(), RenderError> {
        let gpu = self.gpu.as_ref().ok_or(RenderError::NotInitialized)?;

        gl.use_program(Some(gpu.program));
        gl.viewport(0, 0, gl_size(self.size.width), gl_size(self.size.height));
        let [r, g, b, a] = self.config.clear_color;
        gl.clear_color(r, g, b, a);
        gl.clear(glow::COLOR_BUFFER_BIT);

        gl.active_texture(glow::TEXTURE0);
        gl.bind_texture(TEXTURE_EXTERNAL_OES, Some(texture.name()));
        texture
            .update_tex_image()
            .map_err(RenderError::TextureUpdate)?;
        gl.uniform_matrix_4(gpu.cam_tex_matrix, &texture.transform_matrix());

        gl.bind_buffer(glow::ARRAY_BUFFER, Some(gpu.position_vbo));
        gl.enable_vertex_attrib_array(gpu.position);
        gl.vertex_attrib_pointer_f32(gpu.position, 2, 0, 0);
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(gpu.tex_coord_vbo));
        gl.enable_vertex_attrib_array(gpu.texture_position);
        gl.vertex_attrib_pointer_f32(gpu.texture_position, 2, 0, 0);
        gl.bind_buffer(glow::ARRAY_BUFFER, None);

        gl.uniform_matrix_4(gpu.mvp_matrix, &self.config.mvp);

        gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(gpu.index_buffer));
        gl.draw_elements(
            glow::TRIANGLES,
            QUAD_INDICES.len() as i32,
            glow::UNSIGNED_SHORT,
            0,
        );
        gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, None);
        Ok(())
    }

    fn on_surface_destroyed(&mut self, gl: &dyn GlesApi, _texture: &mut ExternalTexture) {
        if let Some(gpu) = self.gpu.take() {
            gl.use_program(None);
            gpu.release(gl);
        }
    }
}

fn static_buffer(gl: &dyn GlesApi, target: u32, data: &[u8]) -> Result<u32, RenderError> {
    let buffer = gl.create_buffer().map_err(RenderError::Gl)?;
    gl.bind_buffer(target, Some(buffer));
    gl.buffer_data(target, data, glow::STATIC_DRAW);
    Ok(buffer)
}

fn uniform(gl: &dyn GlesApi, program: u32, name: &'static str) -> Result<u32, RenderError> {
    gl.uniform_location(program, name)
        .ok_or(RenderError::MissingLocation {
            kind: "uniform",
            name,
        })
}

fn attrib(gl: &dyn GlesApi, program: u32, name: &'static str) -> Result<u32, RenderError> {
    gl.attrib_location(program, name)
        .ok_or(RenderError::MissingLocation {
            kind: "attribute",
            name,
        })
}

fn gl_size(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}

fn f32_bytes(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_ne_bytes()).collect()
}

fn u16_bytes(values: &[u16]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_ne_bytes()).collect()
}
