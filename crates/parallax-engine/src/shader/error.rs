use std::fmt;
use std::path::PathBuf;

use super::stage::Stage;

/// Diagnostic produced while building a [`ShaderProgram`](super::ShaderProgram).
///
/// None of these abort the process. They are logged at `error` level and kept on
/// the program for later inspection.
#[derive(Debug)]
pub enum ShaderError {
    /// The source file could not be read.
    Read { path: PathBuf, source: std::io::Error },

    /// The source file was read but holds no text.
    Empty { path: PathBuf },

    /// The GLSL front end or IR validation rejected a stage.
    Compile { stage: Stage, path: PathBuf, log: String },

    /// The stages do not form a usable program.
    Link { log: String },

    /// The device refused the render pipeline built from a linked program.
    Pipeline { log: String },
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderError::Read { path, source } => {
                write!(f, "failed to open shader file {}: {source}", path.display())
            }
            ShaderError::Empty { path } => {
                write!(f, "shader file {} is empty", path.display())
            }
            ShaderError::Compile { stage, path, log } => {
                write!(f, "{stage} shader compile error ({}):\n{log}", path.display())
            }
            ShaderError::Link { log } => write!(f, "program link error:\n{log}"),
            ShaderError::Pipeline { log } => write!(f, "render pipeline error:\n{log}"),
        }
    }
}

impl std::error::Error for ShaderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ShaderError::Read { source, .. } => Some(source),
            _ => None,
        }
    }
}
