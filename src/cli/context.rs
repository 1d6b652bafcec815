use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use entity_changelog::core::errors::{ChangelogError, Result};

const DEFAULT_DIR: &str = ".changelog";
const CONFIG_FILE: &str = "config.toml";

static PROJECT_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Fix the project directory for this run. `--dir` / `CHANGELOG_DIR` win
/// over the default; blank values are ignored.
pub fn init(custom: Option<&str>) {
    let _ = PROJECT_DIR.set(resolve(custom));
}

fn resolve(custom: Option<&str>) -> PathBuf {
    custom
        .map(str::trim)
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DIR))
}

pub fn changelog_dir() -> &'static Path {
    PROJECT_DIR
        .get()
        .map(PathBuf::as_path)
        .unwrap_or(Path::new(DEFAULT_DIR))
}

pub fn config_path() -> PathBuf {
    changelog_dir().join(CONFIG_FILE)
}

/// The project directory, or an error pointing at `changelog init`.
pub fn initialized_dir() -> Result<&'static Path> {
    let dir = changelog_dir();
    if !dir.exists() {
        return Err(ChangelogError::InvalidConfig {
            detail: "Change log not initialized. Run 'changelog init' first.".into(),
        });
    }
    Ok(dir)
}
