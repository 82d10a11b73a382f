//! CLI execution context.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use handoff_core::HandoffConfig;

use crate::output::Output;

/// Config file names searched for, in order, in each directory.
pub const CONFIG_NAMES: [&str; 3] = ["handoff.toml", ".handoff.toml", "handoff.json"];

/// Execution context for CLI commands.
pub struct Context {
    /// Handoff configuration.
    pub config: HandoffConfig,
    /// Where the configuration was loaded from, if anywhere.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (config, config_path) = if let Some(path) = config_path {
            let path = resolve_path(&cwd, path);
            let config = HandoffConfig::load(&path)
                .with_context(|| format!("Failed to load config: {}", path.display()))?;
            (config, Some(path))
        } else {
            match find_config(&cwd) {
                Some((config, path)) => (config, Some(path)),
                None => (HandoffConfig::default(), None),
            }
        };

        if let Some(path) = &config_path {
            tracing::debug!(path = %path.display(), "loaded config");
        }

        Ok(Self {
            config,
            config_path,
            output,
            cwd,
        })
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        resolve_path(&self.cwd, path)
    }
}

/// Find the nearest config file walking up from `start`.
///
/// Unreadable or invalid files are skipped.
pub fn find_config(start: &Path) -> Option<(HandoffConfig, PathBuf)> {
    let mut current = start.to_path_buf();
    loop {
        for name in &CONFIG_NAMES {
            let config_path = current.join(name);
            if config_path.exists() {
                match HandoffConfig::load(&config_path) {
                    Ok(config) => return Some((config, config_path)),
                    Err(e) => tracing::warn!(error = %e, "skipping config"),
                }
            }
        }

        if !current.pop() {
            return None;
        }
    }
}

fn resolve_path(cwd: &Path, path: &str) -> PathBuf {
    if Path::new(path).is_absolute() {
        PathBuf::from(path)
    } else {
        cwd.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_config_in_parent() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("handoff.toml"), r#"namespace = "shop""#).unwrap();
        let nested = dir.path().join("app").join("src");
        std::fs::create_dir_all(&nested).unwrap();

        let (config, path) = find_config(&nested).unwrap();
        assert_eq!(config.namespace, "shop");
        assert_eq!(path, dir.path().join("handoff.toml"));
    }

    #[test]
    fn test_find_config_prefers_toml_over_json() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("handoff.toml"), r#"namespace = "toml""#).unwrap();
        std::fs::write(dir.path().join("handoff.json"), r#"{"namespace": "json"}"#).unwrap();

        let (config, _) = find_config(dir.path()).unwrap();
        assert_eq!(config.namespace, "toml");
    }

    #[test]
    fn test_find_config_skips_invalid() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("handoff.toml"), "namespace = [").unwrap();
        std::fs::write(dir.path().join("handoff.json"), r#"{"namespace": "json"}"#).unwrap();

        let (config, _) = find_config(dir.path()).unwrap();
        assert_eq!(config.namespace, "json");
    }

    #[test]
    fn test_resolve_path() {
        let cwd = Path::new("/work");
        assert_eq!(resolve_path(cwd, "a.json"), PathBuf::from("/work/a.json"));
        assert_eq!(resolve_path(cwd, "/tmp/a.json"), PathBuf::from("/tmp/a.json"));
    }
}
