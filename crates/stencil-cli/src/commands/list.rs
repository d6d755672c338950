//! `stencil list`: print the template catalog.

use serde_json::json;
use tracing::instrument;

use stencil_core::application::TemplateCatalog;
use stencil_core::domain::{Template, TreeNode};

use crate::{
    cli::{GlobalArgs, ListArgs, ListFormat, OutputFormat},
    commands::{load_all, open_catalog},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

/// List the templates of every workspace.
///
/// `--output-format json` forces the JSON listing whatever `--format` says.
#[instrument(skip_all)]
pub async fn execute(
    args: ListArgs,
    global: &GlobalArgs,
    config: &AppConfig,
    output: &OutputManager,
) -> CliResult<()> {
    let workspaces = open_catalog(global, config, None)?;
    let all = load_all(&workspaces, output).await?;

    let format = if output.format() == OutputFormat::Json {
        ListFormat::Json
    } else {
        args.format
    };

    match format {
        ListFormat::Tree => {
            if !config.catalog.show {
                output.info("The catalog view is turned off (catalog.show = false)")?;
                return Ok(());
            }
            print_tree(&workspaces.catalog, output)?;
            if all.is_empty() {
                output.info(&format!(
                    "No templates in {}. Run 'stencil init' to add one.",
                    workspaces.searched()
                ))?;
            }
        }
        ListFormat::List => {
            for (_, template) in &all {
                output.data(&template.name)?;
            }
        }
        ListFormat::Json => output.json(&to_json(&all))?,
    }

    Ok(())
}

/// Print the workspace → template tree as the catalog reports it.
pub fn print_tree(catalog: &TemplateCatalog, output: &OutputManager) -> CliResult<()> {
    for node in catalog.children(None)? {
        output.data(&tree_line(catalog, &node, output))?;

        let children = catalog.children(Some(&node))?;
        let last = children.len().saturating_sub(1);
        for (i, child) in children.iter().enumerate() {
            let branch = if i == last { "└── " } else { "├── " };
            output.data(&format!("{branch}{}", tree_line(catalog, child, output)))?;
        }
    }
    Ok(())
}

fn tree_line(catalog: &TemplateCatalog, node: &TreeNode, output: &OutputManager) -> String {
    let item = catalog.tree_item(node);
    match item.description {
        Some(description) => format!("{} {}", item.label, output.dim(&description)),
        None => item.label,
    }
}

fn to_json(all: &[(String, Template)]) -> serde_json::Value {
    json!(
        all.iter()
            .map(|(workspace, template)| json!({
                "workspace": workspace,
                "name": template.name,
                "label": template.label,
                "path": template.path,
            }))
            .collect::<Vec<_>>()
    )
}
