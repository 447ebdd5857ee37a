//! Input discovery
//!
//! Lists the container files in a directory: regular files with the
//! configured extension, sorted by path so runs are reproducible.

use std::fs;
use std::path::{Path, PathBuf};

use crate::container::{ContainerError, ContainerResult};

pub fn discover_inputs(dir: &Path, extension: &str) -> ContainerResult<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .map_err(|e| ContainerError::read_io(dir, "Failed to read input directory", e))?;

    let mut inputs = Vec::new();
    for entry in entries {
        let entry =
            entry.map_err(|e| ContainerError::read_io(dir, "Failed to read directory entry", e))?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }
        if path.extension().map_or(false, |ext| ext == extension) {
            inputs.push(path);
        }
    }

    inputs.sort();
    Ok(inputs)
}
