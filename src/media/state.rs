use std::io;
use std::path::{Path, PathBuf};

/// Plain-text side file remembering the last screen video that was applied.
#[derive(Debug, Clone, PartialEq)]
pub struct LastVideoStore {
    path: PathBuf,
}

impl LastVideoStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Last saved video path; `None` when the file is missing, unreadable or blank.
    pub fn load(&self) -> Option<PathBuf> {
        let content = std::fs::read_to_string(&self.path).ok()?;
        let line = content.lines().next()?.trim();
        if line.is_empty() {
            None
        } else {
            Some(PathBuf::from(line))
        }
    }

    /// Writes `video` as one UTF-8 line. Paths that are not valid UTF-8 are
    /// rejected rather than stored lossily.
    pub fn save(&self, video: &Path) -> io::Result<()> {
        let Some(line) = video.to_str() else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("video path is not valid UTF-8: {}", video.display()),
            ));
        };
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, format!("{line}\n"))
    }
}
