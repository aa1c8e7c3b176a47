use std::cell::{Cell, RefCell};
use std::f64::consts::TAU;
use std::rc::Rc;

use js_sys::Float32Array;
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{
    CanvasRenderingContext2d, HtmlCanvasElement, WebGlBuffer, WebGlProgram, WebGlRenderingContext as GL,
    WebGlShader, WebGlUniformLocation, Window,
};

use super::platform::describe;
use crate::error::EffectError;
use crate::events::Event;
use crate::particles::{Rgba, Surface};
use crate::App;

const VERTEX_SHADER: &str = r#"
attribute vec2 a_position;
attribute float a_radius;
attribute vec4 a_color;
uniform vec2 u_resolution;
varying vec4 v_color;

void main() {
    vec2 clip = a_position / u_resolution * 2.0 - 1.0;
    gl_Position = vec4(clip.x, -clip.y, 0.0, 1.0);
    gl_PointSize = max(a_radius * 2.0, 1.0);
    v_color = a_color;
}
"#;

const FRAGMENT_SHADER: &str = r#"
precision mediump float;
varying vec4 v_color;

void main() {
    float d = length(gl_PointCoord - vec2(0.5));
    if (d > 0.5) discard;
    gl_FragColor = vec4(v_color.rgb, v_color.a * smoothstep(0.5, 0.3, d));
}
"#;

/// x, y, radius, r, g, b, a
const FLOATS_PER_POINT: i32 = 7;
const STRIDE: i32 = FLOATS_PER_POINT * 4;

fn graphics(err: JsValue) -> EffectError {
    EffectError::GraphicsUnavailable(describe(&err))
}

/// Filled circles on a 2D canvas.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, EffectError> {
        let ctx = canvas
            .get_context("2d")
            .map_err(graphics)?
            .ok_or_else(|| EffectError::GraphicsUnavailable("2d context".into()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| EffectError::GraphicsUnavailable("2d context has the wrong type".into()))?;
        Ok(Self { canvas, ctx })
    }
}

impl Surface for CanvasSurface {
    fn resize(&mut self, width: f64, height: f64) {
        self.canvas.set_width(width as u32);
        self.canvas.set_height(height as u32);
    }

    fn begin_frame(&mut self, width: f64, height: f64) {
        self.ctx.clear_rect(0.0, 0.0, width, height);
    }

    fn draw_point(&mut self, x: f64, y: f64, radius: f64, color: Rgba) {
        self.ctx.begin_path();
        if self.ctx.arc(x, y, radius, 0.0, TAU).is_err() {
            return;
        }
        self.ctx.set_fill_style_str(&color.css());
        self.ctx.fill();
    }
}

/// Alpha-blended round points on a WebGL canvas, one draw call per frame.
pub struct GlSurface {
    gl: GL,
    canvas: HtmlCanvasElement,
    buffer: WebGlBuffer,
    resolution: Option<WebGlUniformLocation>,
    attribs: [(u32, i32); 3],
    backdrop: Rc<Cell<Rgba>>,
    vertices: Vec<f32>,
}

impl GlSurface {
    /// `backdrop` is the clear colour, updated by the theme.
    pub fn new(canvas: HtmlCanvasElement, backdrop: Rc<Cell<Rgba>>) -> Result<Self, EffectError> {
        let gl: GL = canvas
            .get_context("webgl")
            .map_err(graphics)?
            .ok_or_else(|| EffectError::GraphicsUnavailable("WebGL is not supported".into()))?
            .dyn_into()
            .map_err(|_| EffectError::GraphicsUnavailable("webgl context has the wrong type".into()))?;

        gl.enable(GL::BLEND);
        gl.blend_func(GL::SRC_ALPHA, GL::ONE_MINUS_SRC_ALPHA);

        let program = create_program(&gl)?;
        gl.use_program(Some(&program));

        let buffer = gl
            .create_buffer()
            .ok_or_else(|| EffectError::GraphicsUnavailable("vertex buffer".into()))?;
        let locate = |name: &str| -> Result<u32, EffectError> {
            let loc = gl.get_attrib_location(&program, name);
            u32::try_from(loc).map_err(|_| EffectError::GraphicsUnavailable(format!("attribute {name}")))
        };
        let attribs = [(locate("a_position")?, 2), (locate("a_radius")?, 1), (locate("a_color")?, 4)];
        let resolution = gl.get_uniform_location(&program, "u_resolution");

        Ok(Self { gl, canvas, buffer, resolution, attribs, backdrop, vertices: Vec::new() })
    }
}

impl Surface for GlSurface {
    fn resize(&mut self, width: f64, height: f64) {
        self.canvas.set_width(width as u32);
        self.canvas.set_height(height as u32);
        self.gl.viewport(0, 0, width as i32, height as i32);
        self.gl.uniform2f(self.resolution.as_ref(), width as f32, height as f32);
    }

    fn begin_frame(&mut self, _width: f64, _height: f64) {
        let c = self.backdrop.get();
        self.gl.clear_color(c.r as f32, c.g as f32, c.b as f32, c.a as f32);
        self.gl.clear(GL::COLOR_BUFFER_BIT);
        self.vertices.clear();
    }

    fn draw_point(&mut self, x: f64, y: f64, radius: f64, color: Rgba) {
        self.vertices.extend(
            [x, y, radius, color.r, color.g, color.b, color.a].map(|v| v as f32),
        );
    }

    fn end_frame(&mut self) {
        let count = self.vertices.len() as i32 / FLOATS_PER_POINT;
        if count == 0 {
            return;
        }
        let gl = &self.gl;
        gl.bind_buffer(GL::ARRAY_BUFFER, Some(&self.buffer));
        let data = Float32Array::from(self.vertices.as_slice());
        gl.buffer_data_with_array_buffer_view(GL::ARRAY_BUFFER, &data, GL::STREAM_DRAW);

        let mut offset = 0;
        for (location, size) in self.attribs {
            gl.enable_vertex_attrib_array(location);
            gl.vertex_attrib_pointer_with_i32(location, size, GL::FLOAT, false, STRIDE, offset * 4);
            offset += size;
        }
        gl.draw_arrays(GL::POINTS, 0, count);
    }
}

fn create_program(gl: &GL) -> Result<WebGlProgram, EffectError> {
    let vs = compile_shader(gl, GL::VERTEX_SHADER, VERTEX_SHADER)?;
    let fs = compile_shader(gl, GL::FRAGMENT_SHADER, FRAGMENT_SHADER)?;

    let program = gl
        .create_program()
        .ok_or_else(|| EffectError::GraphicsUnavailable("create program".into()))?;
    gl.attach_shader(&program, &vs);
    gl.attach_shader(&program, &fs);
    gl.link_program(&program);

    if !gl
        .get_program_parameter(&program, GL::LINK_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        let info = gl.get_program_info_log(&program).unwrap_or_default();
        return Err(EffectError::GraphicsUnavailable(format!("link: {info}")));
    }
    Ok(program)
}

fn compile_shader(gl: &GL, kind: u32, source: &str) -> Result<WebGlShader, EffectError> {
    let shader = gl
        .create_shader(kind)
        .ok_or_else(|| EffectError::GraphicsUnavailable("create shader".into()))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);

    if !gl
        .get_shader_parameter(&shader, GL::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        let info = gl.get_shader_info_log(&shader).unwrap_or_default();
        return Err(EffectError::GraphicsUnavailable(format!("compile: {info}")));
    }
    Ok(shader)
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Drive the app with `requestAnimationFrame` until its loop stops.
pub fn run(window: Window, app: Rc<RefCell<App>>) -> Result<(), JsValue> {
    if !app.borrow().animation().is_running() {
        return Ok(());
    }

    // `f` holds the frame closure so it can request itself again. Taking it
    // out of the cell drops the closure and ends the loop.
    let f: FrameCallback = Rc::new(RefCell::new(None));
    let g = f.clone();
    let win = window.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |now: f64| {
        let running = match app.try_borrow_mut() {
            Ok(mut app) => {
                app.handle(Event::Frame { now_ms: now });
                app.pump();
                app.animation().is_running()
            }
            Err(_) => true,
        };
        if !running {
            drop(f.borrow_mut().take());
            return;
        }
        if let Some(cb) = f.borrow().as_ref() {
            if let Err(err) = win.request_animation_frame(cb.as_ref().unchecked_ref()) {
                log::warn!("requestAnimationFrame failed: {}", describe(&err));
            }
        }
    }) as Box<dyn FnMut(f64)>));

    if let Some(cb) = g.borrow().as_ref() {
        window.request_animation_frame(cb.as_ref().unchecked_ref())?;
    }
    Ok(())
}
