//! `stencil template`: manage template files.
//!
//! New templates go to the catalog directory of the first workspace.
//! Other subcommands find the template across every open workspace.

use std::path::Path;
use std::sync::Arc;

use tracing::instrument;

use stencil_adapters::LocalFilesystem;
use stencil_core::application::{Filesystem, TemplateService};

use crate::{
    cli::{GlobalArgs, TemplateCommands},
    commands::{find_template, load_all, open_catalog},
    config::AppConfig,
    error::{CliResult, IntoCli},
    output::OutputManager,
};

/// Dispatch to the correct template subcommand.
#[instrument(skip_all)]
pub async fn execute(
    cmd: TemplateCommands,
    global: &GlobalArgs,
    config: &AppConfig,
    output: &OutputManager,
) -> CliResult<()> {
    let filesystem: Arc<dyn Filesystem> = Arc::new(LocalFilesystem::new());
    let service = TemplateService::new(filesystem)
        .with_extension(config.catalog.extension.trim_start_matches('.'));

    match cmd {
        TemplateCommands::Create { name, content } => {
            let workspace = global
                .primary_workspace()
                .with_cli_context(|| "Failed to read the current directory")?;
            let dir = config.catalog.template_dir(&workspace);
            let template = service.create_template(&dir, &name, &content)?;
            output.success(&format!(
                "Created template '{}' at {}",
                template.name,
                relative(&workspace, &template.path)
            ))?;
        }

        TemplateCommands::Rename { name, new_name } => {
            let workspaces = open_catalog(global, config, None)?;
            let (_, template) = find_template(&load_all(&workspaces, output).await?, &name)?;
            let renamed = service.rename_template(&template, &new_name)?;
            output.success(&format!("Renamed '{}' to '{}'", template.name, renamed.name))?;
        }

        TemplateCommands::Delete { name } => {
            let workspaces = open_catalog(global, config, None)?;
            let (_, template) = find_template(&load_all(&workspaces, output).await?, &name)?;
            service.delete_template(&template)?;
            output.success(&format!("Deleted template '{}'", template.name))?;
        }

        TemplateCommands::Show { name } => {
            let workspaces = open_catalog(global, config, None)?;
            let (_, template) = find_template(&load_all(&workspaces, output).await?, &name)?;
            // Read again: the catalog snapshot may predate an edit.
            let fresh = service.read_template(&template.path)?;
            output.data(&fresh.code)?;
        }
    }

    Ok(())
}

fn relative(base: &Path, path: &Path) -> String {
    path.strip_prefix(base).unwrap_or(path).display().to_string()
}
