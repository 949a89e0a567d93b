//! GLSL shader programs.
//!
//! A program is built from two files in four steps, each reporting through the
//! error log rather than aborting:
//! - `source`: read the text of both stages
//! - `stage`: compile each stage to IR with naga's GLSL front end and validate it
//! - `link`: check the stages against each other and the vertex layout, reflect
//!   the uniform block
//! - `program`: build the wgpu pipeline under a validation error scope
//!
//! Uniforms are std140 block members addressed by name, so host code keeps the
//! `glGetUniformLocation` / `glUniform*` shape it would have against GL.

mod error;
mod link;
mod program;
mod source;
mod stage;
mod uniform;

pub use error::ShaderError;
pub use link::{link, LinkedStages, LinkedUniforms};
pub use program::ShaderProgram;
pub use source::read_source;
pub use stage::{compile, CompiledStage, Stage};
pub use uniform::{UniformBlock, UniformKind, UniformLayout, UniformLocation};
