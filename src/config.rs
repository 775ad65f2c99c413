use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{PkglogError, Result};

/// Environment variable that overrides `general.log_dir` after the files
/// have been merged.
pub const LOG_DIR_ENV: &str = "PKGLOG_LOG_DIR";

#[derive(Debug, Deserialize, Clone)]
pub struct GlobalConfig {
    #[serde(default)]
    pub general: GeneralConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeneralConfig {
    /// Directory holding one log file per package.
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("/var/lib/porg")
}

fn get_xdg_config() -> Option<PathBuf> {
    let uid = unsafe { libc::getuid() };
    if uid == 0 { return None; }

    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .ok()
        .or_else(|| {
            std::env::var("HOME")
                .map(|h| PathBuf::from(h).join(".config"))
                .ok()
        })
        .map(|p| p.join("pkglog/pkglog.toml"))
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
        }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
        }
    }
}

/// Recursively merge two TOML values. For tables, overlay keys win;
/// missing keys are inherited from base. Scalars and arrays are replaced
/// wholesale.
fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    use toml::Value;
    match (base, overlay) {
        (Value::Table(mut base_map), Value::Table(overlay_map)) => {
            for (k, v) in overlay_map {
                let merged = if let Some(base_v) = base_map.remove(&k) {
                    merge_toml(base_v, v)
                } else {
                    v
                };
                base_map.insert(k, merged);
            }
            Value::Table(base_map)
        }
        (_, overlay) => overlay,
    }
}

fn load_toml_file(path: &Path) -> Result<toml::Value> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        PkglogError::ConfigError(format!("failed to read {}: {}", path.display(), e))
    })?;
    Ok(toml::from_str(&content)?)
}

impl GlobalConfig {
    /// Load configuration with layered merging.
    ///
    /// An explicit `path` is loaded on its own. Otherwise these layers are
    /// merged in ascending priority, each only overriding the keys it sets:
    ///
    ///   1. `/etc/pkglog/pkglog.toml`
    ///   2. `$XDG_CONFIG_HOME/pkglog/pkglog.toml` (non-root only)
    ///   3. `./pkglog.toml`
    ///
    /// `PKGLOG_LOG_DIR`, when set, replaces the resulting log directory.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut layers: Vec<PathBuf> = Vec::new();
        match path {
            Some(p) => layers.push(p.to_path_buf()),
            None => {
                layers.push(PathBuf::from("/etc/pkglog/pkglog.toml"));
                if let Some(xdg) = get_xdg_config() {
                    layers.push(xdg);
                }
                layers.push(PathBuf::from("./pkglog.toml"));
            }
        }

        let mut config = Self::load_layers(&layers)?;
        if let Some(dir) = std::env::var_os(LOG_DIR_ENV) {
            if !dir.is_empty() {
                config.general.log_dir = PathBuf::from(dir);
            }
        }
        Ok(config)
    }

    /// Merge the given files from lowest to highest priority. Files that do
    /// not exist are skipped; no file at all yields the defaults.
    pub fn load_layers(layers: &[PathBuf]) -> Result<Self> {
        let mut merged: Option<toml::Value> = None;
        for layer_path in layers {
            if layer_path.exists() {
                let val = load_toml_file(layer_path)?;
                merged = Some(match merged {
                    Some(base) => merge_toml(base, val),
                    None => val,
                });
            }
        }

        match merged {
            None => Ok(Self::default()),
            Some(val) => Ok(GlobalConfig::deserialize(val)?),
        }
    }

    /// Fail unless the configured log directory exists and is a directory.
    pub fn check_log_dir(&self) -> Result<()> {
        let dir = &self.general.log_dir;
        match std::fs::metadata(dir) {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(PkglogError::ConfigError(format!(
                "{}: not a directory",
                dir.display()
            ))),
            Err(e) => Err(PkglogError::ConfigError(format!(
                "{}: {}",
                dir.display(),
                e
            ))),
        }
    }
}
