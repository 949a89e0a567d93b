//! Per-frame demo state: window size, cursor, and the sky mode toggle.

use std::fmt;

/// Sky palette selected by the fragment shader through `u_skyMode`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SkyMode {
    Night = 0,
    Day = 1,
    Purple = 2,
}

impl SkyMode {
    /// Cycles night -> day -> purple -> night.
    pub fn next(self) -> Self {
        match self {
            SkyMode::Night => SkyMode::Day,
            SkyMode::Day => SkyMode::Purple,
            SkyMode::Purple => SkyMode::Night,
        }
    }

    /// Value uploaded to `u_skyMode`.
    pub fn index(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for SkyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkyMode::Night => f.write_str("night"),
            SkyMode::Day => f.write_str("day"),
            SkyMode::Purple => f.write_str("purple"),
        }
    }
}

/// State the render loop feeds into the shader each frame.
///
/// Sizes and cursor coordinates are physical pixels, cursor origin top-left.
#[derive(Debug, Clone)]
pub struct FrameState {
    width: u32,
    height: u32,
    cursor: (f64, f64),
    sky_mode: SkyMode,
    toggle_held: bool,
}

impl FrameState {
    /// Starts with the cursor at the window center and the purple sky.
    pub fn new(width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            cursor: (f64::from(width) * 0.5, f64::from(height) * 0.5),
            sky_mode: SkyMode::Purple,
            toggle_held: false,
        }
    }

    /// Records a new framebuffer size; each axis is clamped to at least 1.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
    }

    pub fn cursor_moved(&mut self, x: f64, y: f64) {
        self.cursor = (x, y);
    }

    /// Feeds the current level of the toggle key.
    ///
    /// Only a released-to-held transition advances the sky mode. Returns `true`
    /// when the mode changed.
    pub fn update_toggle(&mut self, held: bool) -> bool {
        let rising = held && !self.toggle_held;
        self.toggle_held = held;
        if rising {
            self.sky_mode = self.sky_mode.next();
        }
        rising
    }

    pub fn sky_mode(&self) -> SkyMode {
        self.sky_mode
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// `u_resolution`: width and height in pixels.
    pub fn resolution(&self) -> [f32; 2] {
        [self.width as f32, self.height as f32]
    }

    /// `u_mouse`: cursor divided by the window size with Y flipped to a
    /// bottom-left origin. Not clipped; a cursor outside the window lands
    /// outside `[0, 1]`.
    pub fn normalized_mouse(&self) -> [f32; 2] {
        let w = f64::from(self.width.max(1));
        let h = f64::from(self.height.max(1));
        let (x, y) = self.cursor;
        [(x / w) as f32, ((h - y) / h) as f32]
    }
}
