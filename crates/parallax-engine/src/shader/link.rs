//! Stage linking.
//!
//! Checks that a vertex and a fragment stage fit together and reflects what the
//! program needs from the host: vertex inputs and the uniform block layout.

use std::collections::HashMap;

use super::stage::{CompiledStage, Stage};
use super::uniform::{UniformKind, UniformLayout, UniformLocation};
use super::ShaderError;

/// Both stage modules plus the reflected host-facing interface.
#[derive(Debug)]
pub struct LinkedStages {
    pub vertex: naga::Module,
    pub fragment: naga::Module,
    pub uniforms: Option<LinkedUniforms>,
}

#[derive(Debug, Clone)]
pub struct LinkedUniforms {
    pub layout: UniformLayout,
    pub visibility: wgpu::ShaderStages,
}

/// Links `vertex` and `fragment`.
///
/// Both stages are consumed; on failure they are dropped here. `attributes` is
/// the vertex buffer layout the program will be drawn with. All problems found are
/// reported together in one log, one per line.
pub fn link(
    vertex: CompiledStage,
    fragment: CompiledStage,
    attributes: &[wgpu::VertexAttribute],
) -> Result<LinkedStages, ShaderError> {
    let mut log = Vec::new();

    for stage in [&vertex, &fragment] {
        if !stage.is_compiled() {
            log.push(format!(
                "{} stage ({}) was not successfully compiled",
                stage.stage,
                stage.path.display()
            ));
        }
    }

    let (Some(vs), Some(fs)) = (vertex.module, fragment.module) else {
        return Err(ShaderError::Link { log: log.join("\n") });
    };

    let vs_entry = entry_point(&vs, Stage::Vertex);
    let fs_entry = entry_point(&fs, Stage::Fragment);

    if vs_entry.is_none() {
        log.push("vertex stage has no `main` entry point".to_string());
    }
    if fs_entry.is_none() {
        log.push("fragment stage has no `main` entry point".to_string());
    }

    if let (Some(vs_entry), Some(fs_entry)) = (vs_entry, fs_entry) {
        check_vertex_inputs(&vs, vs_entry, attributes, &mut log);
        check_varyings(&vs, vs_entry, &fs, fs_entry, &mut log);
    }

    let uniforms = merge_uniforms(
        [(Stage::Vertex, &vs), (Stage::Fragment, &fs)],
        &mut log,
    );

    if !log.is_empty() {
        return Err(ShaderError::Link { log: log.join("\n") });
    }

    Ok(LinkedStages {
        vertex: vs,
        fragment: fs,
        uniforms,
    })
}

fn entry_point(module: &naga::Module, stage: Stage) -> Option<&naga::EntryPoint> {
    module
        .entry_points
        .iter()
        .find(|ep| ep.name == "main" && ep.stage == stage.to_naga())
}

fn inputs(module: &naga::Module, ep: &naga::EntryPoint) -> Vec<(u32, naga::TypeInner)> {
    ep.function
        .arguments
        .iter()
        .filter_map(|arg| match arg.binding {
            Some(naga::Binding::Location { location, .. }) => {
                Some((location, module.types[arg.ty].inner.clone()))
            }
            _ => None,
        })
        .collect()
}

fn outputs(module: &naga::Module, ep: &naga::EntryPoint) -> HashMap<u32, naga::TypeInner> {
    let mut out = HashMap::new();
    let Some(result) = ep.function.result.as_ref() else {
        return out;
    };

    if let Some(naga::Binding::Location { location, .. }) = result.binding {
        out.insert(location, module.types[result.ty].inner.clone());
        return out;
    }

    if let naga::TypeInner::Struct { members, .. } = &module.types[result.ty].inner {
        for member in members {
            if let Some(naga::Binding::Location { location, .. }) = member.binding {
                out.insert(location, module.types[member.ty].inner.clone());
            }
        }
    }

    out
}

fn check_vertex_inputs(
    vs: &naga::Module,
    ep: &naga::EntryPoint,
    attributes: &[wgpu::VertexAttribute],
    log: &mut Vec<String>,
) {
    for (location, _) in inputs(vs, ep) {
        if !attributes.iter().any(|a| a.shader_location == location) {
            log.push(format!(
                "vertex input at location {location} is not provided by the vertex buffer layout"
            ));
        }
    }
}

fn check_varyings(
    vs: &naga::Module,
    vs_entry: &naga::EntryPoint,
    fs: &naga::Module,
    fs_entry: &naga::EntryPoint,
    log: &mut Vec<String>,
) {
    let produced = outputs(vs, vs_entry);

    for (location, ty) in inputs(fs, fs_entry) {
        match produced.get(&location) {
            None => log.push(format!(
                "fragment input at location {location} is not written by the vertex stage"
            )),
            Some(out_ty) if *out_ty != ty => log.push(format!(
                "type mismatch at location {location}: vertex writes {out_ty:?}, fragment reads {ty:?}"
            )),
            Some(_) => {}
        }
    }
}

fn uniform_blocks(module: &naga::Module, log: &mut Vec<String>) -> Vec<UniformLayout> {
    let mut blocks = Vec::new();

    for (_, var) in module.global_variables.iter() {
        match var.space {
            naga::AddressSpace::Uniform => {}
            naga::AddressSpace::Handle | naga::AddressSpace::Storage { .. } => {
                log.push(format!(
                    "resource `{}` is not supported: only one uniform block can be bound",
                    var.name.as_deref().unwrap_or("<unnamed>")
                ));
                continue;
            }
            _ => continue,
        }

        let Some(binding) = var.binding.as_ref() else { continue };

        let naga::TypeInner::Struct { members, span } = &module.types[var.ty].inner else {
            log.push(format!(
                "uniform `{}` must be declared inside a uniform block",
                var.name.as_deref().unwrap_or("<unnamed>")
            ));
            continue;
        };

        let members = members
            .iter()
            .filter_map(|m| {
                let name = m.name.clone()?;
                let kind = UniformKind::from_naga(&module.types[m.ty].inner);
                Some((name, UniformLocation { offset: m.offset, kind }))
            })
            .collect();

        blocks.push(UniformLayout {
            group: binding.group,
            binding: binding.binding,
            size: span.div_ceil(16) * 16,
            members,
        });
    }

    blocks
}

fn merge_uniforms(
    stages: [(Stage, &naga::Module); 2],
    log: &mut Vec<String>,
) -> Option<LinkedUniforms> {
    let mut merged: Option<LinkedUniforms> = None;

    for (stage, module) in stages {
        for block in uniform_blocks(module, log) {
            if block.group != 0 {
                log.push(format!(
                    "{stage} uniform block uses set {}; only set 0 is bound",
                    block.group
                ));
                continue;
            }

            match merged.as_mut() {
                None => {
                    merged = Some(LinkedUniforms {
                        layout: block,
                        visibility: stage.visibility(),
                    });
                }
                Some(existing) if existing.layout.binding != block.binding => {
                    log.push(format!(
                        "{stage} stage declares a second uniform block (binding {}); only one is supported",
                        block.binding
                    ));
                }
                Some(existing) if existing.layout != block => {
                    log.push(format!(
                        "uniform block at binding {} differs between stages",
                        block.binding
                    ));
                }
                Some(existing) => {
                    existing.visibility |= stage.visibility();
                }
            }
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::shader::stage::compile;

    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x2
    ];

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
    float m = float(u_skyMode) / 2.0;
    o_color = vec4(v_uv * u_mouse, m + 0.0 * u_time + 0.0 * u_resolution.x, 1.0);
}
"#;

    fn stage(stage: Stage, src: &str) -> CompiledStage {
        compile(stage, Path::new("test.glsl"), src).0
    }

    fn link_err(vs: &str, fs: &str) -> String {
        match link(stage(Stage::Vertex, vs), stage(Stage::Fragment, fs), &ATTRS) {
            Err(ShaderError::Link { log }) => log,
            other => panic!("expected link error, got {other:?}"),
        }
    }

    // ── success ───────────────────────────────────────────────────────────

    #[test]
    fn matching_pair_links() {
        let linked = link(stage(Stage::Vertex, VERT), stage(Stage::Fragment, FRAG), &ATTRS)
            .expect("link");
        let uniforms = linked.uniforms.expect("uniform block");

        assert_eq!(uniforms.layout.group, 0);
        assert_eq!(uniforms.layout.binding, 0);
        assert_eq!(uniforms.visibility, wgpu::ShaderStages::FRAGMENT);
    }

    #[test]
    fn uniform_block_follows_std140() {
        let linked = link(stage(Stage::Vertex, VERT), stage(Stage::Fragment, FRAG), &ATTRS)
            .expect("link");
        let layout = linked.uniforms.expect("uniform block").layout;

        let at = |name: &str| layout.location(name).expect(name);
        assert_eq!(at("u_time"), UniformLocation { offset: 0, kind: UniformKind::Float });
        assert_eq!(at("u_resolution"), UniformLocation { offset: 8, kind: UniformKind::Vec2 });
        assert_eq!(at("u_mouse"), UniformLocation { offset: 16, kind: UniformKind::Vec2 });
        assert_eq!(at("u_skyMode"), UniformLocation { offset: 24, kind: UniformKind::Int });
        assert_eq!(layout.size, 32);
        assert!(layout.location("u_missing").is_none());
    }

    #[test]
    fn program_without_uniforms_links() {
        let fs = r#"#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 o_color;
void main() { o_color = vec4(v_uv, 0.0, 1.0); }
"#;
        let linked = link(stage(Stage::Vertex, VERT), stage(Stage::Fragment, fs), &ATTRS)
            .expect("link");
        assert!(linked.uniforms.is_none());
    }

    // ── failures ──────────────────────────────────────────────────────────

    #[test]
    fn uncompiled_stage_fails_link() {
        let log = link_err(VERT, "#version 450\nvoid main() { oops }\n");
        assert!(log.contains("fragment stage"));
        assert!(log.contains("not successfully compiled"));
    }

    #[test]
    fn unwritten_varying_fails_link() {
        let fs = r#"#version 450
layout(location = 3) in vec2 v_other;
layout(location = 0) out vec4 o_color;
void main() { o_color = vec4(v_other, 0.0, 1.0); }
"#;
        let log = link_err(VERT, fs);
        assert!(log.contains("location 3"));
    }

    #[test]
    fn varying_type_mismatch_fails_link() {
        let fs = r#"#version 450
layout(location = 0) in vec3 v_uv;
layout(location = 0) out vec4 o_color;
void main() { o_color = vec4(v_uv, 1.0); }
"#;
        let log = link_err(VERT, fs);
        assert!(log.contains("type mismatch"));
    }

    #[test]
    fn vertex_input_outside_layout_fails_link() {
        let vs = r#"#version 450
layout(location = 0) in vec3 a_position;
layout(location = 4) in vec4 a_color;
layout(location = 0) out vec2 v_uv;
void main() {
    v_uv = a_color.xy;
    gl_Position = vec4(a_position, 1.0);
}
"#;
        let fs = r#"#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 o_color;
void main() { o_color = vec4(v_uv, 0.0, 1.0); }
"#;
        let log = link_err(vs, fs);
        assert!(log.contains("vertex input at location 4"));
    }
}
