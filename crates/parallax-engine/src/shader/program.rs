use std::borrow::Cow;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::render::RenderCtx;

use super::link::{link, LinkedStages};
use super::source::read_source;
use super::stage::{compile, Stage};
use super::uniform::{UniformBlock, UniformLayout, UniformLocation};
use super::ShaderError;

/// Program ids are never reused within a process; `0` means "no program".
static NEXT_PROGRAM_ID: AtomicU32 = AtomicU32::new(1);

/// A vertex + fragment GLSL pair built into a render pipeline.
///
/// Construction never fails outright. Any problem (unreadable file, compile or
/// link error, pipeline rejection) is logged and the program is left inert:
/// `id()` returns `0`, [`activate`](Self::activate) binds nothing and uniform
/// writes are dropped.
///
/// GPU objects are released when the program is dropped.
pub struct ShaderProgram {
    id: u32,
    pipeline: Option<wgpu::RenderPipeline>,
    uniforms: Option<ProgramUniforms>,
    diagnostics: Vec<ShaderError>,
}

struct ProgramUniforms {
    layout: UniformLayout,
    block: UniformBlock,
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl ShaderProgram {
    /// Loads, compiles and links the two stages, then builds a pipeline that
    /// draws `vertex_layout` buffers into `ctx.surface_format` targets.
    pub fn from_files(
        ctx: &RenderCtx<'_>,
        vertex_layout: wgpu::VertexBufferLayout<'_>,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> Self {
        let vertex_path = vertex_path.as_ref();
        let fragment_path = fragment_path.as_ref();
        let mut program = Self::inert();

        let sources = (read_source(vertex_path), read_source(fragment_path));
        let (vs_src, fs_src) = match sources {
            (Ok(vs), Ok(fs)) => (vs, fs),
            (vs, fs) => {
                for err in [vs.err(), fs.err()].into_iter().flatten() {
                    program.report(err);
                }
                return program;
            }
        };

        let (vs, vs_err) = compile(Stage::Vertex, vertex_path, &vs_src);
        let (fs, fs_err) = compile(Stage::Fragment, fragment_path, &fs_src);
        for err in [vs_err, fs_err].into_iter().flatten() {
            program.report(err);
        }

        // Stage modules are consumed by the link attempt either way.
        let linked = match link(vs, fs, vertex_layout.attributes) {
            Ok(linked) => linked,
            Err(err) => {
                program.report(err);
                return program;
            }
        };

        match build_pipeline(ctx, vertex_layout, linked) {
            Ok((pipeline, uniforms)) => {
                program.id = NEXT_PROGRAM_ID.fetch_add(1, Ordering::Relaxed);
                program.pipeline = Some(pipeline);
                program.uniforms = uniforms;
                log::info!(
                    "shader program {} linked ({} + {})",
                    program.id,
                    vertex_path.display(),
                    fragment_path.display()
                );
            }
            Err(err) => program.report(err),
        }

        program
    }

    fn inert() -> Self {
        Self {
            id: 0,
            pipeline: None,
            uniforms: None,
            diagnostics: Vec::new(),
        }
    }

    fn report(&mut self, err: ShaderError) {
        log::error!("{err}");
        self.diagnostics.push(err);
    }

    /// Opaque program handle; `0` if construction failed.
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn is_linked(&self) -> bool {
        self.pipeline.is_some()
    }

    /// Diagnostics collected during construction, in the order they were emitted.
    ///
    /// Compile errors may be present on a linked program only if they did not
    /// prevent linking, which in practice means never.
    pub fn diagnostics(&self) -> &[ShaderError] {
        &self.diagnostics
    }

    /// Resolves a uniform block member by name.
    ///
    /// Returns `None` for inert programs and for names the shader does not declare.
    pub fn uniform_location(&self, name: &str) -> Option<UniformLocation> {
        let uniforms = self.uniforms.as_ref()?;
        let loc = uniforms.layout.location(name);
        if loc.is_none() {
            log::warn!("uniform `{name}` is not declared by shader program {}", self.id);
        }
        loc
    }

    pub fn set_f32(&mut self, loc: Option<UniformLocation>, value: f32) {
        if let Some(u) = self.uniforms.as_mut() {
            u.block.set_f32(loc, value);
        }
    }

    pub fn set_vec2(&mut self, loc: Option<UniformLocation>, value: [f32; 2]) {
        if let Some(u) = self.uniforms.as_mut() {
            u.block.set_vec2(loc, value);
        }
    }

    pub fn set_i32(&mut self, loc: Option<UniformLocation>, value: i32) {
        if let Some(u) = self.uniforms.as_mut() {
            u.block.set_i32(loc, value);
        }
    }

    /// Copies pending uniform writes to the GPU buffer.
    pub fn upload(&mut self, queue: &wgpu::Queue) {
        let Some(u) = self.uniforms.as_mut() else { return };
        if !u.block.is_dirty() {
            return;
        }
        queue.write_buffer(&u.buffer, 0, u.block.as_bytes());
        u.block.mark_clean();
    }

    /// Binds the pipeline (and uniform block) on `rpass`.
    ///
    /// Returns `false` without touching the pass when the program is inert; the
    /// caller should skip its draw in that case.
    pub fn activate(&self, rpass: &mut wgpu::RenderPass<'_>) -> bool {
        let Some(pipeline) = self.pipeline.as_ref() else {
            return false;
        };

        rpass.set_pipeline(pipeline);
        if let Some(u) = self.uniforms.as_ref() {
            rpass.set_bind_group(u.layout.group, &u.bind_group, &[]);
        }
        true
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        if self.id != 0 {
            log::debug!("releasing shader program {}", self.id);
        }
    }
}

fn build_pipeline(
    ctx: &RenderCtx<'_>,
    vertex_layout: wgpu::VertexBufferLayout<'_>,
    linked: LinkedStages,
) -> Result<(wgpu::RenderPipeline, Option<ProgramUniforms>), ShaderError> {
    let LinkedStages {
        vertex,
        fragment,
        uniforms,
    } = linked;

    let scope = ctx.device.push_error_scope(wgpu::ErrorFilter::Validation);

    let vs_module = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("parallax vertex stage"),
        source: wgpu::ShaderSource::Naga(Cow::Owned(vertex)),
    });
    let fs_module = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("parallax fragment stage"),
        source: wgpu::ShaderSource::Naga(Cow::Owned(fragment)),
    });

    let bind_group_layout = uniforms.as_ref().map(|u| {
        ctx.device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("parallax uniforms bgl"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: u.layout.binding,
                    visibility: u.visibility,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: std::num::NonZeroU64::new(u64::from(u.layout.size)),
                    },
                    count: None,
                }],
            })
    });

    let bind_group_layouts: Vec<&wgpu::BindGroupLayout> = bind_group_layout.iter().collect();
    let pipeline_layout = ctx
        .device
        .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("parallax pipeline layout"),
            bind_group_layouts: &bind_group_layouts,
            immediate_size: 0,
        });

    let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("parallax program pipeline"),
        layout: Some(&pipeline_layout),

        vertex: wgpu::VertexState {
            module: &vs_module,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            buffers: &[vertex_layout],
        },

        fragment: Some(wgpu::FragmentState {
            module: &fs_module,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: ctx.surface_format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),

        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },

        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    });

    let uniforms = match (uniforms, bind_group_layout.as_ref()) {
        (Some(u), Some(bgl)) => {
            let buffer = ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("parallax uniforms ubo"),
                size: u64::from(u.layout.size),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });

            let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("parallax uniforms bind group"),
                layout: bgl,
                entries: &[wgpu::BindGroupEntry {
                    binding: u.layout.binding,
                    resource: buffer.as_entire_binding(),
                }],
            });

            Some(ProgramUniforms {
                block: UniformBlock::new(u.layout.size),
                layout: u.layout,
                buffer,
                bind_group,
            })
        }
        _ => None,
    };

    if let Some(err) = pollster::block_on(scope.pop()) {
        return Err(ShaderError::Pipeline {
            log: err.to_string(),
        });
    }

    Ok((pipeline, uniforms))
}
