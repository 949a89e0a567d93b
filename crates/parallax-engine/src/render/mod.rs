//! GPU rendering subsystem.
//!
//! Renderers own their GPU resources (buffers) and draw into a `RenderTarget`
//! with whatever program the caller has activated on the pass.
//!
//! Convention:
//! - Viewport sizes are physical pixels.
//! - Geometry is submitted directly in NDC.

mod ctx;
mod quad;

pub use ctx::{RenderCtx, RenderTarget};
pub use quad::{FullscreenQuad, QuadVertex, QUAD_INDICES, QUAD_VERTICES};
