//! Parallax engine crate.
//!
//! Platform + GPU runtime for single-window shader demos: window and event loop,
//! wgpu device bring-up, GLSL program building and a fullscreen quad.

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;
pub mod coords;
pub mod render;
pub mod shader;
