// SPDX-FileCopyrightText: 2026 Quirl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! RAII handle over a rendered artifact's transient storage.

use std::path::Path;

use tempfile::TempPath;

/// Handle to a rendered artifact on disk.
///
/// The backing temp file is removed when the handle drops, so cleanup is
/// guaranteed on success, delivery failure, and generation failure alike.
#[derive(Debug)]
pub struct ArtifactHandle {
    path: TempPath,
}

impl ArtifactHandle {
    /// Wraps a temp path whose lifetime is now tied to this handle.
    pub fn new(path: TempPath) -> Self {
        Self { path }
    }

    /// Filesystem location of the rendered artifact.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn backing_file_removed_on_drop() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"artifact").unwrap();
        let handle = ArtifactHandle::new(file.into_temp_path());
        let path = handle.path().to_path_buf();
        assert!(path.exists());
        drop(handle);
        assert!(!path.exists());
    }
}
