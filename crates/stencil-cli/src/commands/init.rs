//! `stencil init`: create a configuration file and a sample template.

use std::path::Path;

use tracing::{debug, instrument};

use crate::{
    cli::{GlobalArgs, InitArgs},
    config::{AppConfig, WORKSPACE_CONFIG},
    error::{CliError, CliResult, IntoCli},
    output::OutputManager,
};

/// File name of the sample template, inside the catalog directory.
const SAMPLE_NAME: &str = "example.md";

const SAMPLE_TEMPLATE: &str = r#"{{prompt "title" "Document title?" default=fileName}}
{{~confirm "withToc" "Add a table of contents?"}}
{{~select "status" "Status?" "draft" "review" "final"~}}
# {{title}}

Created by {{user}} on {{date}} in `{{dirName}}`.
Status: {{status}}
{{#if withToc}}

## Contents

- [Overview](#overview)
{{/if}}

## Overview
"#;

/// Create the configuration (and, for a workspace, the sample template).
#[instrument(skip_all, fields(global = args.global))]
pub fn execute(
    args: InitArgs,
    global: &GlobalArgs,
    config: &AppConfig,
    output: &OutputManager,
) -> CliResult<()> {
    output.info("Initialising configuration...")?;

    if args.global {
        let config_path = global.config.clone().unwrap_or_else(AppConfig::config_path);
        write_config(&config_path, args.force, output)?;
        return Ok(());
    }

    let workspace = global
        .primary_workspace()
        .with_cli_context(|| "Failed to read the current directory")?;
    write_config(&workspace.join(WORKSPACE_CONFIG), args.force, output)?;

    if !args.no_sample {
        let extension = config.catalog.extension.trim_start_matches('.');
        let sample = config
            .catalog
            .template_dir(&workspace)
            .join(format!("{SAMPLE_NAME}.{extension}"));
        if write_file(&sample, SAMPLE_TEMPLATE, args.force, output)? {
            output.success(&format!(
                "Sample template '{SAMPLE_NAME}' created. Try: stencil new NOTES.md -t {SAMPLE_NAME}"
            ))?;
        }
    }

    Ok(())
}

fn write_config(path: &Path, force: bool, output: &OutputManager) -> CliResult<()> {
    let toml =
        toml::to_string_pretty(&AppConfig::default()).map_err(|e| CliError::ConfigError {
            message: format!("Failed to serialise default config: {e}"),
            source: Some(Box::new(e)),
        })?;

    if write_file(path, &toml, force, output)? {
        output.success(&format!("Configuration created at {}", path.display()))?;
    }
    Ok(())
}

/// Write `content` to `path`, creating parents. Returns `false` (after a
/// warning) when the file exists and `force` is off.
fn write_file(path: &Path, content: &str, force: bool, output: &OutputManager) -> CliResult<bool> {
    if path.exists() && !force {
        output.warning(&format!(
            "{} already exists  (use --force to overwrite)",
            path.display(),
        ))?;
        return Ok(false);
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_cli_context(|| format!("Failed to create directory '{}'", parent.display()))?;
    }
    std::fs::write(path, content)
        .with_cli_context(|| format!("Failed to write '{}'", path.display()))?;

    debug!(path = %path.display(), bytes = content.len(), "File written");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;

    fn quiet_output() -> OutputManager {
        let args = GlobalArgs {
            verbose: 0,
            quiet: true,
            no_color: true,
            config: None,
            workspace: Vec::new(),
            output_format: OutputFormat::Plain,
        };
        OutputManager::new(&args, &AppConfig::default())
    }

    #[test]
    fn existing_file_is_kept_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a/b.toml");
        let out = quiet_output();

        assert!(write_file(&path, "one", false, &out).unwrap());
        assert!(!write_file(&path, "two", false, &out).unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "one");

        assert!(write_file(&path, "three", true, &out).unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "three");
    }

    #[test]
    fn default_config_round_trips_through_toml() {
        let text = toml::to_string_pretty(&AppConfig::default()).unwrap();
        let parsed: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, AppConfig::default());
    }
}
