use std::path::{Path, PathBuf};

use anyhow::{Context, Error};

/// Something that can produce the text of a test when it is needed.
///
/// The content is materialized at most once per upload attempt and never cached here: providers
/// that are expensive to call should cache on their own.
pub trait TestContent {
    /// Produce the text of the test.
    fn content(&self) -> Result<String, Error>;
}

/// The content of a file on disk, read when needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContent {
    path: PathBuf,
}

/// Content already available in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryContent {
    content: String,
}

impl FileContent {
    /// Read the content from the file at `path`.
    pub fn new<P: Into<PathBuf>>(path: P) -> FileContent {
        FileContent { path: path.into() }
    }

    /// The path of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MemoryContent {
    /// Serve `content` as it is.
    pub fn new<S: Into<String>>(content: S) -> MemoryContent {
        MemoryContent {
            content: content.into(),
        }
    }
}

impl TestContent for FileContent {
    fn content(&self) -> Result<String, Error> {
        std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read test file {}", self.path.display()))
    }
}

impl TestContent for MemoryContent {
    fn content(&self) -> Result<String, Error> {
        Ok(self.content.clone())
    }
}

impl<F> TestContent for F
where
    F: Fn() -> Result<String, Error>,
{
    fn content(&self) -> Result<String, Error> {
        self()
    }
}
