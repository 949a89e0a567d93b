/// Settings for bringing up the device and configuring the window surface.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Pick an sRGB surface format if one is offered.
    ///
    /// Leave this off for shaders that write display-ready color, as they would
    /// into a GL default framebuffer.
    pub prefer_srgb: bool,

    /// `Fifo` blocks presentation on vsync, which paces the frame loop.
    pub present_mode: wgpu::PresentMode,

    /// Falls back to the first supported mode when unset or unsupported.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    pub required_features: wgpu::Features,
    pub required_limits: wgpu::Limits,

    /// Frame latency hint passed to the surface.
    pub desired_maximum_frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            desired_maximum_frame_latency: 2,
        }
    }
}
