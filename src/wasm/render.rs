use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use log::warn;
use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{
    window, HtmlCanvasElement, HtmlElement, HtmlImageElement, WebGl2RenderingContext as GL,
    WebGlBuffer, WebGlContextAttributes, WebGlProgram, WebGlShader, WebGlTexture,
    WebGlUniformLocation, WebGlVertexArrayObject, WebglLoseContext,
};

use crate::error::{FxError, Result};
use crate::surface::{aspect_ratio, aspect_ratio_css, ProgramSource, RenderSurface, SurfaceSize, DEFAULT_ASPECT};
use crate::uniforms::{UniformBatch, UniformValue};

/// Two triangles covering clip space.
const QUAD: [f32; 12] = [-1.0, -1.0, 1.0, -1.0, -1.0, 1.0, -1.0, 1.0, 1.0, -1.0, 1.0, 1.0];

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Image being streamed into a texture. `alive` is cleared on release so a
/// late `onload` never touches a deleted texture.
struct ImageTexture {
    texture: WebGlTexture,
    image: HtmlImageElement,
    alive: Rc<Cell<bool>>,
    _onload: Closure<dyn FnMut()>,
    _onerror: Closure<dyn FnMut()>,
}

/// WebGL2 canvas appended to the effect container.
///
/// Everything after the program is optional so a half-built surface can be
/// released through the same path as a finished one.
pub struct GlSurface {
    id: u64,
    canvas: HtmlCanvasElement,
    gl: GL,
    program: WebGlProgram,
    buffer: Option<WebGlBuffer>,
    vao: Option<WebGlVertexArrayObject>,
    texture: Option<ImageTexture>,
    locations: HashMap<&'static str, Option<WebGlUniformLocation>>,
    size: SurfaceSize,
    pixel_ratio: f32,
}

impl GlSurface {
    pub fn create(
        container: &HtmlElement,
        size: SurfaceSize,
        pixel_ratio: f32,
        source: &ProgramSource,
    ) -> Result<Self> {
        let document = window()
            .and_then(|w| w.document())
            .ok_or_else(|| FxError::ResourceUnavailable("no document".into()))?;
        let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into().map_err(|_| {
            FxError::ResourceUnavailable("could not create a canvas".into())
        })?;

        let attrs = WebGlContextAttributes::new();
        attrs.set_alpha(true);
        attrs.set_antialias(true);
        attrs.set_premultiplied_alpha(false);
        let gl: GL = canvas
            .get_context_with_context_options("webgl2", &attrs)
            .ok()
            .flatten()
            .ok_or_else(|| FxError::ResourceUnavailable("WebGL2 not supported".into()))?
            .dyn_into()
            .map_err(|_| FxError::ResourceUnavailable("unexpected context type".into()))?;

        let program = match link_program(&gl, source.vertex, source.fragment) {
            Ok(program) => program,
            Err(err) => {
                lose_context(&gl);
                return Err(err);
            }
        };

        let mut surface = Self {
            id: NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed),
            canvas,
            gl,
            program,
            buffer: None,
            vao: None,
            texture: None,
            locations: HashMap::new(),
            size,
            pixel_ratio,
        };
        match surface.build(container, source) {
            Ok(()) => {
                surface.resize(size);
                Ok(surface)
            }
            Err(err) => {
                surface.release();
                Err(err)
            }
        }
    }

    /// Geometry, texture and DOM placement. Whatever was acquired before an
    /// error is left in `self` for `release`.
    fn build(&mut self, container: &HtmlElement, source: &ProgramSource) -> Result<()> {
        let gl = &self.gl;
        let buffer = gl
            .create_buffer()
            .ok_or_else(|| FxError::ResourceUnavailable("create_buffer failed".into()))?;
        let buffer: &WebGlBuffer = self.buffer.insert(buffer);
        let vao = gl
            .create_vertex_array()
            .ok_or_else(|| FxError::ResourceUnavailable("create_vertex_array failed".into()))?;
        let vao: &WebGlVertexArrayObject = self.vao.insert(vao);

        gl.bind_vertex_array(Some(vao));
        gl.bind_buffer(GL::ARRAY_BUFFER, Some(buffer));
        let verts = js_sys::Float32Array::from(&QUAD[..]);
        gl.buffer_data_with_array_buffer_view(GL::ARRAY_BUFFER, &verts, GL::STATIC_DRAW);
        let position = gl.get_attrib_location(&self.program, "a_position");
        if position >= 0 {
            gl.enable_vertex_attrib_array(position as u32);
            gl.vertex_attrib_pointer_with_i32(position as u32, 2, GL::FLOAT, false, 0, 0);
        }
        gl.bind_vertex_array(None);

        let style = self.canvas.style();
        style.set_property("display", "block")?;
        style.set_property("width", "100%")?;
        style.set_property("height", "100%")?;
        style.set_property("background", "none")?;

        if let Some(src) = &source.texture {
            self.texture = Some(load_texture(gl, container, src, source.match_image_aspect)?);
        }
        if source.match_image_aspect {
            container
                .style()
                .set_property("aspect-ratio", &aspect_ratio_css(DEFAULT_ASPECT))?;
        }

        container.append_child(&self.canvas)?;
        Ok(())
    }

    fn location(&mut self, name: &'static str) -> Option<&WebGlUniformLocation> {
        let gl = &self.gl;
        let program = &self.program;
        self.locations
            .entry(name)
            .or_insert_with(|| gl.get_uniform_location(program, name))
            .as_ref()
    }
}

fn lose_context(gl: &GL) {
    if let Ok(Some(ext)) = gl.get_extension("WEBGL_lose_context") {
        ext.unchecked_into::<WebglLoseContext>().lose_context();
    }
}

impl RenderSurface for GlSurface {
    fn context_id(&self) -> u64 {
        self.id
    }

    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn resize(&mut self, size: SurfaceSize) {
        let (w, h) = size.scaled(self.pixel_ratio);
        self.canvas.set_width(w);
        self.canvas.set_height(h);
        self.gl.viewport(0, 0, w as i32, h as i32);
        self.size = size;
    }

    fn apply(&mut self, batch: &UniformBatch) {
        self.gl.use_program(Some(&self.program));
        for (name, value) in batch.iter() {
            let gl = self.gl.clone();
            // names optimised out of the program resolve to None
            let Some(loc) = self.location(*name) else { continue };
            match *value {
                UniformValue::F32(v) => gl.uniform1f(Some(loc), v),
                UniformValue::I32(v) => gl.uniform1i(Some(loc), v),
                UniformValue::Vec2([x, y]) => gl.uniform2f(Some(loc), x, y),
                UniformValue::Vec3([x, y, z]) => gl.uniform3f(Some(loc), x, y, z),
            }
        }
    }

    fn draw(&mut self) {
        let gl = &self.gl;
        gl.clear_color(0.0, 0.0, 0.0, 0.0);
        gl.clear(GL::COLOR_BUFFER_BIT);
        gl.use_program(Some(&self.program));
        if let Some(tex) = &self.texture {
            gl.active_texture(GL::TEXTURE0);
            gl.bind_texture(GL::TEXTURE_2D, Some(&tex.texture));
        }
        let Some(vao) = &self.vao else { return };
        gl.bind_vertex_array(Some(vao));
        gl.draw_arrays(GL::TRIANGLES, 0, 6);
        gl.bind_vertex_array(None);
    }

    fn release(self) {
        let gl = &self.gl;
        if let Some(tex) = &self.texture {
            tex.alive.set(false);
            tex.image.set_onload(None);
            tex.image.set_onerror(None);
            gl.delete_texture(Some(&tex.texture));
        }
        gl.delete_buffer(self.buffer.as_ref());
        gl.delete_vertex_array(self.vao.as_ref());
        gl.delete_program(Some(&self.program));
        lose_context(gl);
        // no-op when the canvas never made it into the container
        self.canvas.remove();
    }
}

fn compile_shader(gl: &GL, kind: u32, source: &str) -> Result<WebGlShader> {
    let shader = gl
        .create_shader(kind)
        .ok_or_else(|| FxError::Shader("create_shader failed".into()))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);
    if gl
        .get_shader_parameter(&shader, GL::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(shader)
    } else {
        let info = gl.get_shader_info_log(&shader).unwrap_or_default();
        gl.delete_shader(Some(&shader));
        Err(FxError::Shader(info))
    }
}

fn link_program(gl: &GL, vertex: &str, fragment: &str) -> Result<WebGlProgram> {
    let vs = compile_shader(gl, GL::VERTEX_SHADER, vertex)?;
    let fs = compile_shader(gl, GL::FRAGMENT_SHADER, fragment)?;
    let program = gl
        .create_program()
        .ok_or_else(|| FxError::Shader("create_program failed".into()))?;
    gl.attach_shader(&program, &vs);
    gl.attach_shader(&program, &fs);
    gl.link_program(&program);
    // shaders are owned by the program once linked
    gl.delete_shader(Some(&vs));
    gl.delete_shader(Some(&fs));
    if gl
        .get_program_parameter(&program, GL::LINK_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(program)
    } else {
        let info = gl.get_program_info_log(&program).unwrap_or_default();
        gl.delete_program(Some(&program));
        Err(FxError::Shader(info))
    }
}

/// Start with a 1x1 transparent texel and swap in the image once it loads.
/// A failed load keeps the blank texel.
fn load_texture(gl: &GL, container: &HtmlElement, src: &str, match_aspect: bool) -> Result<ImageTexture> {
    let image = HtmlImageElement::new()?;
    let texture = gl
        .create_texture()
        .ok_or_else(|| FxError::ResourceUnavailable("create_texture failed".into()))?;
    gl.bind_texture(GL::TEXTURE_2D, Some(&texture));
    if let Err(err) = gl.tex_image_2d_with_i32_and_i32_and_i32_and_format_and_type_and_opt_u8_array(
        GL::TEXTURE_2D,
        0,
        GL::RGBA as i32,
        1,
        1,
        0,
        GL::RGBA,
        GL::UNSIGNED_BYTE,
        Some(&[0u8; 4][..]),
    ) {
        gl.delete_texture(Some(&texture));
        return Err(err.into());
    }
    gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_WRAP_S, GL::CLAMP_TO_EDGE as i32);
    gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_WRAP_T, GL::CLAMP_TO_EDGE as i32);
    gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_MIN_FILTER, GL::LINEAR as i32);
    gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_MAG_FILTER, GL::LINEAR as i32);

    image.set_cross_origin(Some("anonymous"));
    let alive = Rc::new(Cell::new(true));

    let onload = {
        let gl = gl.clone();
        let texture = texture.clone();
        let image = image.clone();
        let container = container.clone();
        let alive = alive.clone();
        Closure::wrap(Box::new(move || {
            if !alive.get() {
                return;
            }
            gl.bind_texture(GL::TEXTURE_2D, Some(&texture));
            gl.pixel_storei(GL::UNPACK_FLIP_Y_WEBGL, 1);
            if let Err(err) = gl.tex_image_2d_with_u32_and_u32_and_html_image_element(
                GL::TEXTURE_2D,
                0,
                GL::RGBA as i32,
                GL::RGBA,
                GL::UNSIGNED_BYTE,
                &image,
            ) {
                warn!("texture upload failed: {:?}", err);
                return;
            }
            if match_aspect {
                let ratio = aspect_ratio(image.natural_width(), image.natural_height());
                container
                    .style()
                    .set_property("aspect-ratio", &aspect_ratio_css(ratio))
                    .ok();
            }
        }) as Box<dyn FnMut()>)
    };
    let onerror = {
        let src = src.to_string();
        Closure::wrap(Box::new(move || {
            warn!("{}", FxError::ImageLoad(src.clone()));
        }) as Box<dyn FnMut()>)
    };
    image.set_onload(Some(onload.as_ref().unchecked_ref()));
    image.set_onerror(Some(onerror.as_ref().unchecked_ref()));
    image.set_src(src);

    Ok(ImageTexture {
        texture,
        image,
        alive,
        _onload: onload,
        _onerror: onerror,
    })
}
