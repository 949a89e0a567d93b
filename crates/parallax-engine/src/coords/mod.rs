//! Pixel-space types shared by the runtime and renderers.
//!
//! Sizes are physical (framebuffer) pixels. Pointer positions use the window
//! system's convention: origin top-left, +Y down.

mod color;
mod viewport;

pub use color::ColorRgba;
pub use viewport::Viewport;
