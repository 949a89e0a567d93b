use std::fmt;
use std::path::{Path, PathBuf};

use naga::front::glsl;
use naga::valid::{Capabilities, ValidationFlags, Validator};

use super::ShaderError;

/// Programmable pipeline stage a GLSL file is compiled for.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Stage {
    Vertex,
    Fragment,
}

impl Stage {
    pub(crate) fn to_naga(self) -> naga::ShaderStage {
        match self {
            Stage::Vertex => naga::ShaderStage::Vertex,
            Stage::Fragment => naga::ShaderStage::Fragment,
        }
    }

    pub(crate) fn visibility(self) -> wgpu::ShaderStages {
        match self {
            Stage::Vertex => wgpu::ShaderStages::VERTEX,
            Stage::Fragment => wgpu::ShaderStages::FRAGMENT,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Vertex => f.write_str("vertex"),
            Stage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Result of compiling one stage.
///
/// A failed compile still produces a `CompiledStage` (with no module) so the
/// program build can carry on to the link step and report there too.
#[derive(Debug)]
pub struct CompiledStage {
    pub stage: Stage,
    pub path: PathBuf,
    pub module: Option<naga::Module>,
}

impl CompiledStage {
    pub fn is_compiled(&self) -> bool {
        self.module.is_some()
    }
}

/// Compiles GLSL `source` for `stage`.
///
/// Front-end errors and IR validation errors are rendered against the source
/// text and returned alongside the (empty) stage.
pub fn compile(stage: Stage, path: &Path, source: &str) -> (CompiledStage, Option<ShaderError>) {
    let failed = |log: String| {
        (
            CompiledStage {
                stage,
                path: path.to_path_buf(),
                module: None,
            },
            Some(ShaderError::Compile {
                stage,
                path: path.to_path_buf(),
                log,
            }),
        )
    };

    let mut frontend = glsl::Frontend::default();
    let module = match frontend.parse(&glsl::Options::from(stage.to_naga()), source) {
        Ok(module) => module,
        Err(errors) => return failed(errors.emit_to_string(source)),
    };

    let mut validator = Validator::new(ValidationFlags::all(), Capabilities::default());
    if let Err(err) = validator.validate(&module) {
        return failed(err.emit_to_string(source));
    }

    log::debug!("compiled {stage} stage from {}", path.display());

    (
        CompiledStage {
            stage,
            path: path.to_path_buf(),
            module: Some(module),
        },
        None,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERT: &str = r#"#version 450
layout(location = 0) in vec3 a_position;
layout(location = 1) in vec2 a_uv;
layout(location = 0) out vec2 v_uv;
void main() {
    v_uv = a_uv;
    gl_Position = vec4(a_position, 1.0);
}
"#;

    #[test]
    fn valid_vertex_stage_compiles() {
        let (stage, err) = compile(Stage::Vertex, Path::new("quad.vert"), VERT);
        assert!(err.is_none());
        assert!(stage.is_compiled());

        let module = stage.module.as_ref().unwrap();
        assert_eq!(module.entry_points.len(), 1);
        assert_eq!(module.entry_points[0].stage, naga::ShaderStage::Vertex);
    }

    #[test]
    fn syntax_error_carries_compiler_log() {
        let src = "#version 450\nvoid main() { float x = ; }\n";
        let (stage, err) = compile(Stage::Fragment, Path::new("broken.frag"), src);
        assert!(!stage.is_compiled());

        let Some(ShaderError::Compile { stage: s, log, .. }) = err else {
            panic!("expected compile error");
        };
        assert_eq!(s, Stage::Fragment);
        assert!(!log.is_empty());
    }

    #[test]
    fn compile_error_message_names_stage_and_file() {
        let (_, err) = compile(Stage::Vertex, Path::new("bad.vert"), "not glsl at all");
        let msg = err.expect("compile error").to_string();
        assert!(msg.contains("vertex"));
        assert!(msg.contains("bad.vert"));
    }
}
