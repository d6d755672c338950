//! `stencil config`: inspect configuration values.

use serde_json::Value;

use crate::{
    cli::{ConfigCommands, GlobalArgs},
    config::{AppConfig, WORKSPACE_CONFIG},
    error::{CliError, CliResult, IntoCli},
    output::OutputManager,
};

/// Dispatch to the correct config subcommand.
pub fn execute(
    cmd: ConfigCommands,
    global: &GlobalArgs,
    config: &AppConfig,
    output: &OutputManager,
) -> CliResult<()> {
    match cmd {
        ConfigCommands::Get { key } => {
            let value = get_config_value(config, &key)?;
            output.data(&value)?;
        }

        ConfigCommands::List => {
            output.header("Current Configuration:")?;
            let serialised = toml::to_string_pretty(config).map_err(|e| CliError::ConfigError {
                message: format!("Failed to serialise config: {e}"),
                source: Some(Box::new(e)),
            })?;
            output.data(&serialised)?;
        }

        ConfigCommands::Path => {
            let global_path = match &global.config {
                Some(path) => path.clone(),
                None => AppConfig::config_path(),
            };
            let workspace = global
                .primary_workspace()
                .with_cli_context(|| "Failed to read the current directory")?;
            output.data(&format!("global:    {}", global_path.display()))?;
            output.data(&format!(
                "workspace: {}",
                workspace.join(WORKSPACE_CONFIG).display()
            ))?;
        }
    }

    Ok(())
}

// ── helpers ───────────────────────────────────────────────────────────────────

/// Scalars print bare; tables and lists print as JSON.
fn get_config_value(config: &AppConfig, key: &str) -> CliResult<String> {
    match config.get(key) {
        Some(Value::String(s)) => Ok(s),
        Some(Value::Null) => Ok(String::new()),
        Some(other) => Ok(other.to_string()),
        None => Err(CliError::ConfigError {
            message: format!("Unknown config key: '{key}'"),
            source: None,
        }),
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn get_known_key() {
        let cfg = AppConfig::default();
        assert_eq!(get_config_value(&cfg, "catalog.extension").unwrap(), "hbs");
        assert_eq!(get_config_value(&cfg, "interaction.on_cancel").unwrap(), "abort");
    }

    #[test]
    fn get_unknown_key_is_error() {
        let cfg = AppConfig::default();
        assert!(matches!(
            get_config_value(&cfg, "does.not.exist"),
            Err(CliError::ConfigError { .. })
        ));
    }

    #[test]
    fn get_no_color_default() {
        let cfg = AppConfig::default();
        assert_eq!(get_config_value(&cfg, "output.no_color").unwrap(), "false");
    }

    #[test]
    fn lists_print_as_json() {
        let cfg = AppConfig::default();
        let exclude = get_config_value(&cfg, "catalog.exclude").unwrap();
        assert!(exclude.starts_with('['));
        assert!(exclude.contains("\"node_modules\""));
    }
}
