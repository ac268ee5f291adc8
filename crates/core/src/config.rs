//! Configuration file discovery and loading
//!
//! Both binaries merge settings in the same priority order:
//! 1. CLI arguments and their environment variables (handled by clap)
//! 2. A TOML config file, searched in the locations below
//! 3. Built-in defaults

use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use serde::de::DeserializeOwned;

use crate::APP_NAME;

/// Where a configuration file was found
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// Path given on the command line or through the service's env var
    Explicit(PathBuf),
    /// `./<filename>`
    CurrentDir(PathBuf),
    /// `$XDG_CONFIG_HOME/darkest-hour/<filename>` (or `~/.config/...`)
    XdgConfig(PathBuf),
    /// `/etc/darkest-hour/<filename>`
    System(PathBuf),
    /// Nothing on disk, every setting falls back to its default
    Defaults,
}

impl ConfigSource {
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            ConfigSource::Explicit(p)
            | ConfigSource::CurrentDir(p)
            | ConfigSource::XdgConfig(p)
            | ConfigSource::System(p) => Some(p),
            ConfigSource::Defaults => None,
        }
    }
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.path() {
            Some(p) => write!(f, "{}", p.display()),
            None => write!(f, "(defaults)"),
        }
    }
}

/// Find a configuration file for one of the services
///
/// Search order:
/// 1. `env_var` (e.g. `DARKEST_HOUR_OBSERVER_CONFIG`)
/// 2. `./<filename>`
/// 3. XDG config home
/// 4. `/etc/darkest-hour/<filename>`
pub fn find_config_file(env_var: &str, filename: &str) -> ConfigSource {
    if let Ok(path) = env::var(env_var) {
        let p = PathBuf::from(path);
        if p.exists() {
            return ConfigSource::Explicit(p);
        }
    }

    let candidates = [
        ConfigSource::CurrentDir(PathBuf::from(filename)),
        ConfigSource::XdgConfig(xdg_config_path(filename)),
        ConfigSource::System(PathBuf::from(format!("/etc/{}/{}", APP_NAME, filename))),
    ];

    candidates
        .into_iter()
        .find(|source| source.path().is_some_and(|p| p.exists()))
        .unwrap_or(ConfigSource::Defaults)
}

fn xdg_config_path(filename: &str) -> PathBuf {
    let base = match (env::var("XDG_CONFIG_HOME"), env::var("HOME")) {
        (Ok(xdg), _) => PathBuf::from(xdg),
        (Err(_), Ok(home)) => PathBuf::from(home).join(".config"),
        // Relative fallback, will simply not exist
        _ => PathBuf::from(".config"),
    };
    base.join(APP_NAME).join(filename)
}

/// Read and parse a TOML config file, or produce `T::default()` when the
/// source is [`ConfigSource::Defaults`]
pub fn load_config<T: DeserializeOwned + Default>(source: &ConfigSource) -> anyhow::Result<T> {
    let Some(path) = source.path() else {
        return Ok(T::default());
    };
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    parse_config(&content).with_context(|| format!("parsing config file {}", path.display()))
}

/// Parse TOML config text
pub fn parse_config<T: DeserializeOwned>(content: &str) -> anyhow::Result<T> {
    Ok(toml::from_str(content)?)
}
