//! Configuration file support.
//!
//! Two optional locations are read:
//! - Global: `~/.buildtools/config.toml` - User-wide defaults
//! - Project: `.buildtools/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config, and command-line
//! flags take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default base URL test data archives are fetched from.
pub const DEFAULT_REMOTE_URL: &str = "https://public.esss.dk/groups/scipp";

/// Buildtools configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Native (CMake) build settings
    pub cpp: CppConfig,

    /// Documentation build settings
    pub docs: DocsConfig,
}

/// Settings for `buildtools cpp`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CppConfig {
    /// Install prefix
    pub prefix: Option<PathBuf>,

    /// CMake source directory
    pub source_dir: Option<PathBuf>,

    /// Build directory
    pub build_dir: Option<PathBuf>,

    /// Enable compiler caching (Windows clcache)
    pub caching: Option<bool>,

    /// Targets to build, in order
    pub targets: Vec<String>,

    /// Test executables to run after building
    pub tests: Vec<String>,

    /// Directory holding test executables, relative to the build directory
    pub test_dir: Option<PathBuf>,
}

/// Settings for `buildtools docs`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocsConfig {
    /// Output directory for generated pages
    pub prefix: Option<PathBuf>,

    /// Sphinx doctree cache directory
    pub work_dir: Option<PathBuf>,

    /// Directory test data is downloaded into
    pub data_dir: Option<PathBuf>,

    /// Sphinx builder name (html, latex, ...)
    pub builder: Option<String>,

    /// Base URL for test data archives
    pub remote_url: Option<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        let cpp = other.cpp;
        if cpp.prefix.is_some() {
            self.cpp.prefix = cpp.prefix;
        }
        if cpp.source_dir.is_some() {
            self.cpp.source_dir = cpp.source_dir;
        }
        if cpp.build_dir.is_some() {
            self.cpp.build_dir = cpp.build_dir;
        }
        if cpp.caching.is_some() {
            self.cpp.caching = cpp.caching;
        }
        if !cpp.targets.is_empty() {
            self.cpp.targets = cpp.targets;
        }
        if !cpp.tests.is_empty() {
            self.cpp.tests = cpp.tests;
        }
        if cpp.test_dir.is_some() {
            self.cpp.test_dir = cpp.test_dir;
        }

        let docs = other.docs;
        if docs.prefix.is_some() {
            self.docs.prefix = docs.prefix;
        }
        if docs.work_dir.is_some() {
            self.docs.work_dir = docs.work_dir;
        }
        if docs.data_dir.is_some() {
            self.docs.data_dir = docs.data_dir;
        }
        if docs.builder.is_some() {
            self.docs.builder = docs.builder;
        }
        if docs.remote_url.is_some() {
            self.docs.remote_url = docs.remote_url;
        }
    }
}

/// Get the global buildtools config directory (~/.buildtools).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".buildtools"))
}

/// Get the global config path (~/.buildtools/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.buildtools/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".buildtools").join("config.toml")
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.buildtools/config.toml)
/// 2. Global config (~/.buildtools/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        if global_path.exists() {
            config.merge(Config::load_or_default(global_path));
        }
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}
