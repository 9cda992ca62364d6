use std::path::{Path, PathBuf};
use std::sync::Mutex;
#[cfg(not(test))]
use std::sync::Once;

use anyhow::{Context, Error};
use tempfile::TempDir;

lazy_static! {
    /// The scratch directories currently alive, removed by the ^C handler.
    static ref ALIVE: Mutex<Vec<PathBuf>> = Mutex::new(Vec::new());
}

/// Exit status after an interruption, as the shells do for SIGINT.
#[cfg(not(test))]
const INTERRUPTED: i32 = 130;

/// A temporary directory for the downloaded data of an importer. It is removed when dropped and
/// when the process is interrupted with ^C.
#[derive(Debug)]
pub struct ScratchDir {
    dir: TempDir,
}

impl ScratchDir {
    /// Make a new scratch directory whose name starts with `prefix`, e.g. `_loj_3208`.
    pub fn new(prefix: &str) -> Result<ScratchDir, Error> {
        let dir = tempfile::Builder::new()
            .prefix(prefix)
            .tempdir()
            .context("Failed to create a temporary directory")?;
        debug!("Scratch directory at {}", dir.path().display());
        install_ctrlc_handler();
        if let Ok(mut alive) = ALIVE.lock() {
            alive.push(dir.path().to_owned());
        }
        Ok(ScratchDir { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Make a subdirectory of the scratch directory.
    pub fn subdir(&self, name: &str) -> Result<PathBuf, Error> {
        let path = self.path().join(name);
        std::fs::create_dir_all(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        Ok(path)
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if let Ok(mut alive) = ALIVE.lock() {
            alive.retain(|path| path != self.dir.path());
        }
    }
}

// `ctrlc` allows a single handler per process, and the unit tests would fight over it.
#[cfg(not(test))]
fn install_ctrlc_handler() {
    static HANDLER: Once = Once::new();
    HANDLER.call_once(|| {
        if let Err(e) = ctrlc::set_handler(|| {
            if let Ok(alive) = ALIVE.lock() {
                for path in alive.iter() {
                    if let Err(e) = std::fs::remove_dir_all(path) {
                        error!("Cannot remove {}: {}", path.display(), e);
                    }
                }
            }
            std::process::exit(INTERRUPTED);
        }) {
            warn!("Cannot bind control-C handler: {:?}", e);
        }
    });
}

#[cfg(test)]
fn install_ctrlc_handler() {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removed_on_drop() {
        let scratch = ScratchDir::new("_test_scratch").unwrap();
        let path = scratch.path().to_owned();
        let tests = scratch.subdir("tests").unwrap();
        std::fs::write(tests.join("1.in"), "1\n").unwrap();
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("_test_scratch"));
        assert!(ALIVE.lock().unwrap().contains(&path));
        drop(scratch);
        assert!(!path.exists());
        assert!(!ALIVE.lock().unwrap().contains(&path));
    }
}
