use std::path::PathBuf;

use parallax_engine::coords::ColorRgba;
use parallax_engine::core::{App, AppControl, FrameCtx};
use parallax_engine::input::Key;
use parallax_engine::render::{FullscreenQuad, QuadVertex, RenderCtx};
use parallax_engine::shader::{ShaderProgram, UniformLocation};
use winit::event::WindowEvent;

use crate::state::FrameState;

const CLEAR: ColorRgba = ColorRgba::new(0.02, 0.01, 0.03, 1.0);

/// Vertex/fragment GLSL files the sky program is built from.
#[derive(Debug, Clone)]
pub struct ShaderPaths {
    pub vertex: PathBuf,
    pub fragment: PathBuf,
}

/// GPU resources, created on the first frame once a device exists.
struct Scene {
    quad: FullscreenQuad,
    program: ShaderProgram,
    uniforms: FrameUniforms,
}

/// Locations resolved once after linking; `None` writes are dropped.
struct FrameUniforms {
    time: Option<UniformLocation>,
    resolution: Option<UniformLocation>,
    mouse: Option<UniformLocation>,
    sky_mode: Option<UniformLocation>,
}

impl Scene {
    fn new(ctx: &RenderCtx<'_>, paths: &ShaderPaths) -> Self {
        let quad = FullscreenQuad::new(ctx);
        let program =
            ShaderProgram::from_files(ctx, QuadVertex::layout(), &paths.vertex, &paths.fragment);

        let uniforms = FrameUniforms {
            time: program.uniform_location("u_time"),
            resolution: program.uniform_location("u_resolution"),
            mouse: program.uniform_location("u_mouse"),
            sky_mode: program.uniform_location("u_skyMode"),
        };

        Self {
            quad,
            program,
            uniforms,
        }
    }
}

/// The Parallax City demo: one fullscreen quad shaded by time, cursor and sky mode.
pub struct ParallaxApp {
    paths: ShaderPaths,
    state: FrameState,
    scene: Option<Scene>,
}

impl ParallaxApp {
    pub fn new(paths: ShaderPaths, width: u32, height: u32) -> Self {
        Self {
            paths,
            state: FrameState::new(width, height),
            scene: None,
        }
    }
}

impl App for ParallaxApp {
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        match event {
            WindowEvent::Resized(size) => self.state.resize(size.width, size.height),
            WindowEvent::CursorMoved { position, .. } => {
                self.state.cursor_moved(position.x, position.y)
            }
            _ => {}
        }
        AppControl::Continue
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if ctx.input.key_down(Key::Escape) {
            log::info!("escape pressed, closing");
            return AppControl::Exit;
        }

        if self.state.update_toggle(ctx.input.key_down(Key::W)) {
            log::debug!("sky mode: {}", self.state.sky_mode());
        }

        let paths = &self.paths;
        let scene = self
            .scene
            .get_or_insert_with(|| Scene::new(&ctx.render_ctx(), paths));

        let Scene {
            quad,
            program,
            uniforms,
        } = scene;

        program.set_f32(uniforms.time, ctx.time.elapsed);
        program.set_vec2(uniforms.resolution, self.state.resolution());
        program.set_vec2(uniforms.mouse, self.state.normalized_mouse());
        program.set_i32(uniforms.sky_mode, self.state.sky_mode().index());
        program.upload(ctx.gpu.queue());

        ctx.render(CLEAR, |_, target| {
            let mut pass = target.begin_pass("parallax sky");
            if program.activate(&mut pass) {
                quad.draw(&mut pass);
            }
        })
    }
}
