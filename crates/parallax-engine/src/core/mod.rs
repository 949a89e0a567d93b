//! Core engine-facing contracts.
//!
//! This module defines the interface between the runtime (platform loop) and the
//! application, and the per-frame context handed to it.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::FrameCtx;
