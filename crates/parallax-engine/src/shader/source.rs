use std::path::Path;

use super::ShaderError;

/// Reads a whole shader source file.
///
/// Empty files are rejected: there is nothing to compile.
pub fn read_source(path: &Path) -> Result<String, ShaderError> {
    let text = std::fs::read_to_string(path).map_err(|source| ShaderError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    if text.trim().is_empty() {
        return Err(ShaderError::Empty {
            path: path.to_path_buf(),
        });
    }

    Ok(text)
}
