//! Parallax City: a fullscreen GLSL sky driven by time, the cursor and a
//! `W`-key mode toggle.
//!
//! Exits with `0` when the window is closed and `-1` when the window or GPU
//! cannot be brought up.

mod app;
mod state;

use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::Parser;
use parallax_engine::device::GpuInit;
use parallax_engine::logging::{init_logging, LoggingConfig};
use parallax_engine::window::{Runtime, RuntimeConfig};
use winit::dpi::PhysicalSize;

use app::{ParallaxApp, ShaderPaths};

#[derive(Debug, Parser)]
#[command(name = "parallax-city", about = "Fullscreen-quad GLSL sky demo")]
struct Cli {
    /// Vertex stage GLSL file.
    #[arg(long, default_value = concat!(env!("CARGO_MANIFEST_DIR"), "/assets/shaders/parallax.vert"))]
    vertex: PathBuf,

    /// Fragment stage GLSL file.
    #[arg(long, default_value = concat!(env!("CARGO_MANIFEST_DIR"), "/assets/shaders/parallax.frag"))]
    fragment: PathBuf,

    /// Initial framebuffer width in pixels.
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Initial framebuffer height in pixels.
    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Log filter in `RUST_LOG` syntax (e.g. "info,parallax_engine=debug").
    #[arg(long)]
    log: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    init_logging(LoggingConfig {
        env_filter: cli.log.clone(),
        ..Default::default()
    });

    if let Err(e) = run(cli) {
        log::error!("{e:#}");
        process::exit(-1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let width = cli.width.max(1);
    let height = cli.height.max(1);

    let config = RuntimeConfig {
        title: "Parallax City".to_string(),
        initial_size: PhysicalSize::new(width, height),
    };

    // Shader output is written as-is, the way a plain GL framebuffer shows it.
    let gpu_init = GpuInit {
        prefer_srgb: false,
        ..Default::default()
    };

    let paths = ShaderPaths {
        vertex: cli.vertex,
        fragment: cli.fragment,
    };

    Runtime::run(config, gpu_init, ParallaxApp::new(paths, width, height))
}
