//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by reference.
//! The CLI layer owns config; the core crate only sees the values derived
//! from it ([`DiscoveryOptions`], variables, [`CancelPolicy`]).
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. Environment variables `STENCIL_<SECTION>__<KEY>`
//! 3. Workspace file `<workspace>/.stencil/config.toml`
//! 4. Global file (`--config FILE`, or the user config directory)
//! 5. Built-in defaults (always present)

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use stencil_core::application::CancelPolicy;
use stencil_core::domain::{
    DEFAULT_CATALOG_DIR, DEFAULT_EXCLUDED_DIRS, DEFAULT_TEMPLATE_EXTENSION, DiscoveryMode,
    DiscoveryOptions,
};

/// Workspace-level configuration file, relative to the workspace root.
pub const WORKSPACE_CONFIG: &str = ".stencil/config.toml";

const ENV_PREFIX: &str = "STENCIL";

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Template discovery.
    pub catalog: CatalogConfig,
    /// Custom variables merged into every render.
    pub variables: BTreeMap<String, String>,
    /// Question handling.
    pub interaction: InteractionConfig,
    /// Output settings.
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Whether `list` and `watch` print the tree.
    pub show: bool,
    pub mode: DiscoveryMode,
    /// Catalog directory, relative to the workspace root.
    pub dir: PathBuf,
    /// Template extension without the dot.
    pub extension: String,
    /// Directory names skipped in workspace mode.
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// What a dismissed question does to the render.
    pub on_cancel: CancelPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
    /// `auto`, `human`, `plain` or `json`; `--output-format` wins.
    pub format: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            show: true,
            mode: DiscoveryMode::CatalogDir,
            dir: PathBuf::from(DEFAULT_CATALOG_DIR),
            extension: DEFAULT_TEMPLATE_EXTENSION.into(),
            exclude: DEFAULT_EXCLUDED_DIRS.iter().map(|d| d.to_string()).collect(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            no_color: false,
            format: "auto".into(),
        }
    }
}

impl CatalogConfig {
    /// Discovery rules handed to the catalog.
    pub fn discovery_options(&self) -> DiscoveryOptions {
        DiscoveryOptions {
            mode: self.mode.clone(),
            catalog_dir: self.dir.clone(),
            extension: self.extension.trim_start_matches('.').to_string(),
            exclude_dirs: self.exclude.clone(),
        }
    }

    /// Directory new templates are created in.
    pub fn template_dir(&self, workspace: &Path) -> PathBuf {
        self.discovery_options().scan_root(workspace)
    }
}

impl AppConfig {
    /// Load and merge every configuration layer.
    ///
    /// `config_file` is the path the user passed via `--config`; it must
    /// exist. Without it the global file is optional.
    pub fn load(config_file: Option<&Path>, workspace: &Path) -> anyhow::Result<Self> {
        let defaults = Config::try_from(&Self::default())
            .context("Failed to serialise built-in defaults")?;

        let global = match config_file {
            Some(path) => File::from(path).required(true),
            None => File::from(Self::config_path()).required(false),
        };

        Config::builder()
            .add_source(defaults)
            .add_source(global)
            .add_source(File::from(workspace.join(WORKSPACE_CONFIG)).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("catalog.exclude")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }

    /// Path to the global configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.stencil.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("dev", "stencil", "stencil")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".stencil.toml"))
    }

    /// Look up a dotted key (`catalog.extension`, `variables.author`).
    pub fn get(&self, key: &str) -> Option<serde_json::Value> {
        let root = serde_json::to_value(self).ok()?;
        key.split('.')
            .try_fold(root, |value, part| value.get(part).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_match_catalog_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.catalog.discovery_options(), DiscoveryOptions::default());
        assert_eq!(cfg.interaction.on_cancel, CancelPolicy::Abort);
        assert!(cfg.catalog.show);
    }

    #[test]
    fn dotted_lookup() {
        let mut cfg = AppConfig::default();
        cfg.variables.insert("author".into(), "ada".into());
        assert_eq!(cfg.get("catalog.extension"), Some(json!("hbs")));
        assert_eq!(cfg.get("catalog.mode"), Some(json!("catalog-dir")));
        assert_eq!(cfg.get("variables.author"), Some(json!("ada")));
        assert_eq!(cfg.get("interaction.on_cancel"), Some(json!("abort")));
        assert!(cfg.get("does.not.exist").is_none());
    }

    #[test]
    fn workspace_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let ws = dir.path();
        std::fs::create_dir_all(ws.join(".stencil")).unwrap();
        std::fs::write(
            ws.join(WORKSPACE_CONFIG),
            "[catalog]\nmode = \"workspace\"\nextension = \"tpl\"\n\n[interaction]\non_cancel = \"bind-null\"\n\n[variables]\nauthor = \"ada\"\n",
        )
        .unwrap();
        let empty_global = ws.join("global.toml");
        std::fs::write(&empty_global, "").unwrap();

        let cfg = AppConfig::load(Some(&empty_global), ws).unwrap();

        assert_eq!(cfg.catalog.mode, DiscoveryMode::Workspace);
        assert_eq!(cfg.catalog.extension, "tpl");
        assert_eq!(cfg.catalog.dir, PathBuf::from(DEFAULT_CATALOG_DIR));
        assert_eq!(cfg.interaction.on_cancel, CancelPolicy::BindNull);
        assert_eq!(cfg.variables.get("author").map(String::as_str), Some("ada"));
    }

    #[test]
    fn explicit_config_file_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(AppConfig::load(Some(&missing), dir.path()).is_err());
    }

    #[test]
    fn template_dir_follows_mode() {
        let mut catalog = CatalogConfig::default();
        assert_eq!(
            catalog.template_dir(Path::new("/ws")),
            PathBuf::from("/ws/.stencil/templates")
        );
        catalog.mode = DiscoveryMode::Workspace;
        assert_eq!(catalog.template_dir(Path::new("/ws")), PathBuf::from("/ws"));
    }
}
