//! Implementation of the `stencil new` command.
//!
//! Responsibility: pick the template, guard the target, hand both to the
//! core pipeline and report the result. Questions the template asks are
//! answered from `--set` first and from the terminal after that.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, instrument};

use stencil_adapters::{HandlebarsRenderer, LocalFilesystem};
use stencil_core::{
    application::{Filesystem, InteractionProvider, TemplatePipeline},
    domain::{Interaction, InteractiveDirective, Template},
};

use crate::{
    cli::{GlobalArgs, NewArgs},
    commands::{Workspaces, find_template, load_all, open_catalog},
    config::AppConfig,
    error::{CliError, CliResult, IntoCli},
    interaction,
    output::OutputManager,
};

/// Execute the `stencil new` command.
///
/// Dispatch sequence:
/// 1. Resolve the target path against the current directory
/// 2. Load the catalog and pick the template (`--template` or a question)
/// 3. Refuse to overwrite unless `--force` or the operator agrees
/// 4. Render; print with `--dry-run`, write otherwise
#[instrument(skip_all, fields(target = %args.target.display()))]
pub async fn execute(
    args: NewArgs,
    global: &GlobalArgs,
    config: &AppConfig,
    output: &OutputManager,
) -> CliResult<()> {
    // 1. Target
    let cwd = std::env::current_dir().with_cli_context(|| "Failed to read the current directory")?;
    let target = resolve_target(&cwd, &args.target);

    // 2. Template
    let workspaces = open_catalog(global, config, None)?;
    let all = load_all(&workspaces, output).await?;
    if all.is_empty() {
        return Err(CliError::NoTemplates {
            searched: workspaces.searched(),
        });
    }
    let template = match &args.template {
        Some(name) => find_template(&all, name)?.1,
        None => choose_template(&workspaces, &all, args.yes).await?,
    };
    debug!(template = %template.name, path = %template.path.display(), "Template selected");

    // 3. Existing target
    if target.exists() && !args.force && !args.dry_run {
        confirm_overwrite(&target, args.yes).await?;
    }

    // 4. Render
    let filesystem: Arc<dyn Filesystem> = Arc::new(LocalFilesystem::new());
    let pipeline = TemplatePipeline::new(
        Arc::new(HandlebarsRenderer::new()),
        filesystem,
        interaction::provider(args.set, args.yes)?,
    )
    .with_variables(config.variables.clone())
    .with_cancel_policy(config.interaction.on_cancel);

    if args.dry_run {
        let rendered = pipeline.render(&template, &target).await?;
        output.info(&format!(
            "Dry run: would write {} from '{}'",
            target.display(),
            template.name
        ))?;
        output.data(&rendered.content)?;
        return Ok(());
    }

    info!(template = %template.name, target = %target.display(), "Generating");
    let rendered = pipeline.generate(&template, &target).await?;
    debug!(answered = rendered.answers.len(), "Generation finished");

    output.success(&format!(
        "Created {} from '{}'",
        display_relative(&cwd, &target),
        template.name
    ))?;
    Ok(())
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn resolve_target(cwd: &Path, target: &Path) -> PathBuf {
    if target.is_absolute() {
        target.to_path_buf()
    } else {
        cwd.join(target)
    }
}

fn display_relative(cwd: &Path, path: &Path) -> String {
    path.strip_prefix(cwd).unwrap_or(path).display().to_string()
}

/// Choice labels for the template picker; prefixed by the workspace when
/// more than one is open.
fn choice_labels(workspaces: &Workspaces, all: &[(String, Template)]) -> Vec<String> {
    let prefixed = workspaces.entries.len() > 1;
    all.iter()
        .map(|(workspace, template)| {
            if prefixed {
                format!("{workspace}/{}", template.name)
            } else {
                template.name.clone()
            }
        })
        .collect()
}

async fn choose_template(
    workspaces: &Workspaces,
    all: &[(String, Template)],
    no_input: bool,
) -> CliResult<Template> {
    if !interaction::can_ask(no_input) {
        return Err(CliError::InvalidInput {
            message: "no template given; pass --template NAME".into(),
            source: None,
        });
    }

    let choices = choice_labels(workspaces, all);
    let directive = InteractiveDirective::new(
        "template",
        Interaction::Select {
            message: "Template".into(),
            choices: choices.clone(),
        },
    );
    let answer = interaction::answered(interaction::terminal()?.ask(&directive).await?)?;

    choices
        .iter()
        .position(|choice| answer.as_str() == Some(choice.as_str()))
        .and_then(|i| all.get(i))
        .map(|(_, template)| template.clone())
        .ok_or(CliError::Cancelled)
}

async fn confirm_overwrite(target: &Path, no_input: bool) -> CliResult<()> {
    if !interaction::can_ask(no_input) {
        return Err(CliError::TargetExists {
            path: target.to_path_buf(),
        });
    }

    let directive = InteractiveDirective::new(
        "overwrite",
        Interaction::Confirm {
            message: format!("{} exists. Overwrite?", target.display()),
        },
    );
    let provider: Arc<dyn InteractionProvider> = interaction::terminal()?;
    match interaction::answered(provider.ask(&directive).await?)? {
        Value::Bool(true) => Ok(()),
        _ => Err(CliError::Cancelled),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
