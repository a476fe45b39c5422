//! Configuration management with layered hierarchy

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::core::identity::ProjectType;
use crate::core::provision::TemplateSet;

/// Name of the per-directory config file
pub const LOCAL_CONFIG_FILE: &str = ".pft.yaml";

/// Folder under the projects root holding the default templates
pub const DEFAULT_TEMPLATE_DIR: &str = "_Templates";

pub const ENV_ROOT: &str = "PFT_ROOT";
pub const ENV_TEMPLATE_CAD: &str = "PFT_TEMPLATE_CAD";
pub const ENV_TEMPLATE_REVIT: &str = "PFT_TEMPLATE_REVIT";
pub const ENV_TEMPLATE_GENERIC: &str = "PFT_TEMPLATE_GENERIC";

/// PFT configuration with layered hierarchy
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding all project folders
    pub root: Option<PathBuf>,

    /// Template tree for each project type
    pub templates: TemplatesConfig,

    /// Type used when a request leaves the type empty
    pub default_type: Option<ProjectType>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TemplatesConfig {
    pub cad: Option<PathBuf>,
    pub revit: Option<PathBuf>,
    pub generic: Option<PathBuf>,
}

/// Resolved, immutable settings handed to each operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub root: PathBuf,
    pub templates: TemplateSet,
    pub default_type: ProjectType,
}

impl Settings {
    /// Settings with conventional templates under `<root>/_Templates`
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        let root: PathBuf = root.into();
        Config::default().resolve(Some(&root))
    }
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::load_with(&cwd, Self::global_config_path(), |key| std::env::var(key).ok())
    }

    /// Load from explicit sources: a working directory, an optional global
    /// config file and an environment lookup
    pub fn load_with(
        dir: &Path,
        global_path: Option<PathBuf>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        // 1. Built-in defaults (already in Default impl)
        let mut config = Config::default();

        // 2. Global user config (~/.config/pft/config.yaml)
        if let Some(global) = global_path.as_deref().and_then(Self::from_file) {
            config.merge(global);
        }

        // 3. Local config (.pft.yaml in the working directory)
        if let Some(local) = Self::from_file(&Self::local_config_path(dir)) {
            config.merge(local);
        }

        // 4. Environment variables
        config.apply_env(env);

        debug!(?config, "loaded configuration");
        config
    }

    /// Read a single config file, ignoring it with a warning if unreadable
    pub fn from_file(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot read config file");
                return None;
            }
        };
        // A file of only comments is an empty document
        let parsed = serde_yml::from_str::<serde_yml::Value>(&contents).and_then(|value| {
            if value.is_null() {
                Ok(Config::default())
            } else {
                serde_yml::from_value::<Config>(value)
            }
        });
        match parsed {
            Ok(config) => Some(config),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring invalid config file");
                None
            }
        }
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "pft")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Get the path to the local config file in `dir`
    pub fn local_config_path(dir: &Path) -> PathBuf {
        dir.join(LOCAL_CONFIG_FILE)
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.root.is_some() {
            self.root = other.root;
        }
        if other.templates.cad.is_some() {
            self.templates.cad = other.templates.cad;
        }
        if other.templates.revit.is_some() {
            self.templates.revit = other.templates.revit;
        }
        if other.templates.generic.is_some() {
            self.templates.generic = other.templates.generic;
        }
        if other.default_type.is_some() {
            self.default_type = other.default_type;
        }
    }

    fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) {
        let path = |key: &str| env(key).filter(|v| !v.is_empty()).map(PathBuf::from);

        if let Some(root) = path(ENV_ROOT) {
            self.root = Some(root);
        }
        if let Some(cad) = path(ENV_TEMPLATE_CAD) {
            self.templates.cad = Some(cad);
        }
        if let Some(revit) = path(ENV_TEMPLATE_REVIT) {
            self.templates.revit = Some(revit);
        }
        if let Some(generic) = path(ENV_TEMPLATE_GENERIC) {
            self.templates.generic = Some(generic);
        }
    }

    /// Resolve into settings; a command-line root beats every other layer
    pub fn resolve(&self, root_override: Option<&Path>) -> Settings {
        let root = root_override
            .map(Path::to_path_buf)
            .or_else(|| self.root.clone())
            .unwrap_or_else(|| PathBuf::from("."));

        // Relative template paths are relative to the projects root
        let pick = |configured: &Option<PathBuf>, default: PathBuf| match configured {
            Some(p) if p.is_relative() => root.join(p),
            Some(p) => p.clone(),
            None => default,
        };
        let defaults = TemplateSet::under(&root.join(DEFAULT_TEMPLATE_DIR));
        let templates = TemplateSet {
            cad: pick(&self.templates.cad, defaults.cad),
            revit: pick(&self.templates.revit, defaults.revit),
            generic: pick(&self.templates.generic, defaults.generic),
        };

        Settings {
            root,
            templates,
            default_type: self.default_type.unwrap_or_default(),
        }
    }
}
