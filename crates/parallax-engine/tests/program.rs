//! GPU-backed shader program behavior.
//!
//! Every test needs a wgpu adapter; without one (headless CI) it logs and returns.

use std::fs;
use std::path::{Path, PathBuf};

use parallax_engine::coords::Viewport;
use parallax_engine::render::{FullscreenQuad, QuadVertex, RenderCtx};
use parallax_engine::shader::{ShaderError, ShaderProgram};

const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

const VERT: &str = r#"#version 450
layout(location = 0) in vec3 a_position;
layout(location = 1) in vec2 a_uv;
layout(location = 0) out vec2 v_uv;
void main() {
    v_uv = a_uv;
    gl_Position = vec4(a_position, 1.0);
}
"#;

const FRAG: &str = r#"#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 o_color;
layout(set = 0, binding = 0) uniform FrameUniforms {
    float u_time;
    vec2 u_resolution;
    vec2 u_mouse;
    int u_skyMode;
};
void main() {
    float mode = float(u_skyMode) / 2.0;
    o_color = vec4(v_uv * u_mouse, mode, fract(u_time) + u_resolution.x * 0.0);
}
"#;

struct Headless {
    device: wgpu::Device,
    queue: wgpu::Queue,
}

impl Headless {
    fn new() -> Option<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .ok()?;

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("program test device"),
            ..Default::default()
        }))
        .ok()?;

        Some(Self { device, queue })
    }

    fn ctx(&self) -> RenderCtx<'_> {
        RenderCtx::new(&self.device, &self.queue, FORMAT, Viewport::new(4.0, 4.0))
    }

    /// Opens a pass on a small offscreen target and hands it to `f`.
    fn with_pass<R>(&self, f: impl FnOnce(&mut wgpu::RenderPass<'_>) -> R) -> R {
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("program test target"),
            size: wgpu::Extent3d {
                width: 4,
                height: 4,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });

        let out = {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("program test pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
            f(&mut pass)
        };

        self.queue.submit(std::iter::once(encoder.finish()));
        out
    }
}

macro_rules! headless_or_skip {
    () => {
        match Headless::new() {
            Some(gpu) => gpu,
            None => {
                eprintln!("no wgpu adapter available; skipping");
                return;
            }
        }
    };
}

fn write(dir: &Path, name: &str, src: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, src).expect("write shader");
    path
}

fn build(gpu: &Headless, vs: &Path, fs: &Path) -> ShaderProgram {
    ShaderProgram::from_files(&gpu.ctx(), QuadVertex::layout(), vs, fs)
}

// ── success ───────────────────────────────────────────────────────────────

#[test]
fn valid_pair_links_and_draws() {
    let gpu = headless_or_skip!();
    let dir = tempfile::tempdir().expect("tempdir");
    let vs = write(dir.path(), "quad.vert", VERT);
    let fs = write(dir.path(), "sky.frag", FRAG);

    let mut program = build(&gpu, &vs, &fs);
    assert_ne!(program.id(), 0);
    assert!(program.is_linked());
    assert!(program.diagnostics().is_empty());

    let time = program.uniform_location("u_time");
    let resolution = program.uniform_location("u_resolution");
    let mouse = program.uniform_location("u_mouse");
    let mode = program.uniform_location("u_skyMode");
    assert!(time.is_some() && resolution.is_some() && mouse.is_some() && mode.is_some());

    program.set_f32(time, 1.5);
    program.set_vec2(resolution, [800.0, 600.0]);
    program.set_vec2(mouse, [0.5, 0.5]);
    program.set_i32(mode, 2);
    program.upload(&gpu.queue);

    let quad = FullscreenQuad::new(&gpu.ctx());
    let drew = gpu.with_pass(|pass| {
        let bound = program.activate(pass);
        if bound {
            quad.draw(pass);
        }
        bound
    });
    assert!(drew);
}

#[test]
fn program_ids_are_unique() {
    let gpu = headless_or_skip!();
    let dir = tempfile::tempdir().expect("tempdir");
    let vs = write(dir.path(), "quad.vert", VERT);
    let fs = write(dir.path(), "sky.frag", FRAG);

    let a = build(&gpu, &vs, &fs);
    let b = build(&gpu, &vs, &fs);
    assert_ne!(a.id(), 0);
    assert_ne!(b.id(), 0);
    assert_ne!(a.id(), b.id());
}

#[test]
fn undeclared_uniform_has_no_location() {
    let gpu = headless_or_skip!();
    let dir = tempfile::tempdir().expect("tempdir");
    let vs = write(dir.path(), "quad.vert", VERT);
    let fs = write(dir.path(), "sky.frag", FRAG);

    let mut program = build(&gpu, &vs, &fs);
    let missing = program.uniform_location("u_fog");
    assert!(missing.is_none());

    // Writes through an absent location are ignored.
    program.set_f32(missing, 3.0);
    program.upload(&gpu.queue);
}

// ── failures ──────────────────────────────────────────────────────────────

#[test]
fn missing_file_yields_inert_program() {
    let gpu = headless_or_skip!();
    let dir = tempfile::tempdir().expect("tempdir");
    let vs = write(dir.path(), "quad.vert", VERT);
    let fs = dir.path().join("does-not-exist.frag");

    let mut program = build(&gpu, &vs, &fs);
    assert_eq!(program.id(), 0);
    assert!(!program.is_linked());
    assert!(matches!(
        program.diagnostics(),
        [ShaderError::Read { path, .. }] if *path == fs
    ));
    assert!(program.uniform_location("u_time").is_none());

    // Setting uniforms and activating an inert program must not touch the GPU.
    program.set_f32(None, 1.0);
    program.upload(&gpu.queue);
    assert!(!gpu.with_pass(|pass| program.activate(pass)));
}

#[test]
fn empty_file_yields_inert_program() {
    let gpu = headless_or_skip!();
    let dir = tempfile::tempdir().expect("tempdir");
    let vs = write(dir.path(), "quad.vert", " \n\t\n");
    let fs = write(dir.path(), "sky.frag", FRAG);

    let program = build(&gpu, &vs, &fs);
    assert_eq!(program.id(), 0);
    assert!(matches!(program.diagnostics(), [ShaderError::Empty { .. }]));
}

#[test]
fn compile_error_reports_stage_then_link() {
    let gpu = headless_or_skip!();
    let dir = tempfile::tempdir().expect("tempdir");
    let vs = write(dir.path(), "quad.vert", VERT);
    let fs = write(dir.path(), "broken.frag", "#version 450\nvoid main() { float x = ; }\n");

    let program = build(&gpu, &vs, &fs);
    assert_eq!(program.id(), 0);
    assert!(!program.is_linked());

    match program.diagnostics() {
        [ShaderError::Compile { stage, .. }, ShaderError::Link { log }] => {
            assert_eq!(stage.to_string(), "fragment");
            assert!(log.contains("not successfully compiled"));
        }
        other => panic!("unexpected diagnostics: {other:?}"),
    }
}

#[test]
fn mismatched_varyings_fail_link() {
    let gpu = headless_or_skip!();
    let dir = tempfile::tempdir().expect("tempdir");
    let vs = write(dir.path(), "quad.vert", VERT);
    let fs = write(
        dir.path(),
        "other.frag",
        r#"#version 450
layout(location = 2) in vec4 v_color;
layout(location = 0) out vec4 o_color;
void main() { o_color = v_color; }
"#,
    );

    let program = build(&gpu, &vs, &fs);
    assert_eq!(program.id(), 0);
    assert!(matches!(program.diagnostics(), [ShaderError::Link { .. }]));
}
