//! Configuration file discovery and loading.

use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::Value;

use crate::config::merger::merge_layers;
use crate::config::schema::DevplanConfig;
use crate::error::{DevplanError, Result};

/// Directory holding devplan configuration, in home and project roots.
pub const CONFIG_DIR: &str = ".devplan";

/// Configuration file name inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "config.yml";

/// Overrides `probe.timeout_secs`.
pub const ENV_PROBE_TIMEOUT: &str = "DEVPLAN_PROBE_TIMEOUT";

/// Overrides `install_root`.
pub const ENV_INSTALL_ROOT: &str = "DEVPLAN_INSTALL_ROOT";

/// Configuration files in merge order (later overrides earlier).
///
/// 1. User global config (`~/.devplan/config.yml`)
/// 2. Project config (`.devplan/config.yml`)
/// 3. File passed with `--config`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigPaths {
    pub user_global: Option<PathBuf>,
    pub project: Option<PathBuf>,
    pub explicit: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover config files for `project_root` under the real home directory.
    pub fn discover(project_root: &Path, explicit: Option<&Path>) -> Self {
        Self::discover_in(dirs::home_dir().as_deref(), project_root, explicit)
    }

    /// Discover config files with an explicit home directory.
    pub fn discover_in(home: Option<&Path>, project_root: &Path, explicit: Option<&Path>) -> Self {
        let existing = |root: &Path| {
            let path = root.join(CONFIG_DIR).join(CONFIG_FILE);
            path.is_file().then_some(path)
        };

        let user_global = home.and_then(existing);
        let project = existing(project_root).filter(|p| Some(p) != user_global.as_ref());

        Self {
            user_global,
            project,
            explicit: explicit.map(Path::to_path_buf),
        }
    }

    /// Paths to load, in merge order.
    pub fn all(&self) -> Vec<&PathBuf> {
        [&self.user_global, &self.project, &self.explicit]
            .into_iter()
            .flatten()
            .collect()
    }
}

/// Walk up from `start` to the nearest directory containing `.devplan/`.
///
/// Falls back to `start` itself when no ancestor has one.
pub fn find_project_root(start: &Path) -> PathBuf {
    start
        .ancestors()
        .find(|dir| dir.join(CONFIG_DIR).is_dir())
        .unwrap_or(start)
        .to_path_buf()
}

/// Load one config file as a raw YAML value.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist and
/// `ConfigParseError` if it isn't valid YAML.
pub fn load_config_value(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            DevplanError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            DevplanError::Io(e)
        }
    })?;

    serde_yaml::from_str(&content).map_err(|e| DevplanError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Deserialize and check one config value.
pub fn parse_config(value: Value, source_path: &Path) -> Result<DevplanConfig> {
    let parse_error = |message: String| DevplanError::ConfigParseError {
        path: source_path.to_path_buf(),
        message,
    };

    let config: DevplanConfig = if value.is_null() {
        DevplanConfig::default()
    } else {
        serde_yaml::from_value(value).map_err(|e| parse_error(e.to_string()))?
    };

    if config.probe.timeout_secs == 0 {
        return Err(parse_error("probe.timeout_secs must be at least 1".to_string()));
    }
    Ok(config)
}

/// Load and merge the discovered files, without environment overrides.
pub fn load_config_files(paths: &ConfigPaths) -> Result<DevplanConfig> {
    let mut layers = Vec::new();
    let mut last_path = None;

    for path in paths.all() {
        let value = load_config_value(path)?;
        // Check each layer on its own so errors point at the right file
        parse_config(value.clone(), path)?;
        tracing::debug!("Loaded config layer {}", path.display());
        layers.push(value);
        last_path = Some(path);
    }

    let source = last_path
        .cloned()
        .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join(CONFIG_FILE));
    parse_config(merge_layers(&layers), &source)
}

/// Load the full configuration: discovered files, `--config`, then environment.
///
/// A missing file is fine unless it was passed explicitly.
pub fn load_config(project_root: &Path, explicit: Option<&Path>) -> Result<DevplanConfig> {
    let paths = ConfigPaths::discover(project_root, explicit);
    let config = load_config_files(&paths)?;
    let config = apply_env_overrides(config, |key| std::env::var(key).ok())?;
    Ok(resolve_paths(config, project_root, dirs::home_dir().as_deref()))
}

/// Make configured paths absolute.
///
/// A leading `~` expands to `home`; other relative paths are taken from the
/// project root.
pub fn resolve_paths(mut config: DevplanConfig, project_root: &Path, home: Option<&Path>) -> DevplanConfig {
    let resolve = |path: &Path| -> PathBuf {
        if let (Ok(rest), Some(home)) = (path.strip_prefix("~"), home) {
            return home.join(rest);
        }
        if path.is_relative() {
            project_root.join(path)
        } else {
            path.to_path_buf()
        }
    };

    config.profile_dirs = config.profile_dirs.iter().map(|dir| resolve(dir)).collect();
    config.install_root = config.install_root.as_deref().map(resolve);
    config
}

/// Apply `DEVPLAN_*` overrides read through `lookup`.
pub fn apply_env_overrides<F>(mut config: DevplanConfig, lookup: F) -> Result<DevplanConfig>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = lookup(ENV_PROBE_TIMEOUT) {
        let secs = raw
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .ok_or_else(|| DevplanError::ConfigParseError {
                path: PathBuf::from(format!("${}", ENV_PROBE_TIMEOUT)),
                message: format!("expected a positive number of seconds, got '{}'", raw),
            })?;
        config.probe.timeout_secs = secs;
    }

    if let Some(root) = lookup(ENV_INSTALL_ROOT).filter(|r| !r.trim().is_empty()) {
        config.install_root = Some(PathBuf::from(root));
    }

    Ok(config)
}
