use std::collections::HashMap;

/// Value shape of a uniform block member, as declared by the shader.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum UniformKind {
    Float,
    Vec2,
    Int,
    /// Any member shape this engine does not write (matrices, arrays, ...).
    Other,
}

impl UniformKind {
    pub(crate) fn from_naga(inner: &naga::TypeInner) -> Self {
        match *inner {
            naga::TypeInner::Scalar(naga::Scalar::F32) => Self::Float,
            naga::TypeInner::Scalar(naga::Scalar::I32) => Self::Int,
            naga::TypeInner::Vector {
                size: naga::VectorSize::Bi,
                scalar: naga::Scalar::F32,
            } => Self::Vec2,
            _ => Self::Other,
        }
    }
}

/// Byte location of a named member inside the program's uniform block.
///
/// Obtained from [`ShaderProgram::uniform_location`](super::ShaderProgram::uniform_location).
/// An absent location (`None`) plays the role of GL's `-1`: writes are dropped.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct UniformLocation {
    pub offset: u32,
    pub kind: UniformKind,
}

/// Reflected layout of a std140 uniform block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniformLayout {
    pub group: u32,
    pub binding: u32,
    /// Block size in bytes, padded to 16.
    pub size: u32,
    pub members: HashMap<String, UniformLocation>,
}

impl UniformLayout {
    pub fn location(&self, name: &str) -> Option<UniformLocation> {
        self.members.get(name).copied()
    }
}

/// CPU staging copy of a uniform block.
///
/// Setters write into a byte image of the block; the program uploads it before
/// drawing. Mismatched writes are dropped with a one-time warning per offset.
#[derive(Debug, Clone, Default)]
pub struct UniformBlock {
    bytes: Vec<u8>,
    dirty: bool,
    warned: Vec<u32>,
}

impl UniformBlock {
    pub fn new(size: u32) -> Self {
        Self {
            bytes: vec![0; size as usize],
            dirty: true,
            warned: Vec::new(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub fn set_f32(&mut self, loc: Option<UniformLocation>, value: f32) {
        self.write(loc, UniformKind::Float, bytemuck::bytes_of(&value));
    }

    pub fn set_vec2(&mut self, loc: Option<UniformLocation>, value: [f32; 2]) {
        self.write(loc, UniformKind::Vec2, bytemuck::cast_slice(&value));
    }

    pub fn set_i32(&mut self, loc: Option<UniformLocation>, value: i32) {
        self.write(loc, UniformKind::Int, bytemuck::bytes_of(&value));
    }

    fn write(&mut self, loc: Option<UniformLocation>, kind: UniformKind, data: &[u8]) {
        let Some(loc) = loc else { return };

        if loc.kind != kind {
            if !self.warned.contains(&loc.offset) {
                log::warn!(
                    "uniform at offset {} is {:?}, ignoring {:?} write",
                    loc.offset,
                    loc.kind,
                    kind
                );
                self.warned.push(loc.offset);
            }
            return;
        }

        let start = loc.offset as usize;
        let Some(dst) = self.bytes.get_mut(start..start + data.len()) else {
            return;
        };

        if dst != data {
            dst.copy_from_slice(data);
            self.dirty = true;
        }
    }
}
