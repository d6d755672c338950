//! Command handlers, one module per subcommand.
//!
//! Handlers translate arguments into calls on `stencil-core` services and
//! print the results. The helpers below open the catalog over the
//! workspaces given with `--workspace` and resolve template names.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use stencil_adapters::LocalFilesystem;
use stencil_core::application::{FileWatcher, Filesystem, TemplateCatalog};
use stencil_core::domain::{Template, TreeNode};

use crate::{
    cli::GlobalArgs,
    config::AppConfig,
    error::{CliError, CliResult, IntoCli},
    output::OutputManager,
};

pub mod completions;
pub mod config;
pub mod init;
pub mod list;
pub mod new;
pub mod template;
pub mod watch;

/// A catalog together with the workspaces registered in it.
pub struct Workspaces {
    pub catalog: TemplateCatalog,
    /// `(name, root)` in command-line order.
    pub entries: Vec<(String, PathBuf)>,
}

impl Workspaces {
    /// Roots joined for messages.
    pub fn searched(&self) -> String {
        self.entries
            .iter()
            .map(|(_, root)| root.display().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Register every workspace from the command line in a new catalog.
///
/// A workspace is named after its directory; when two share a directory
/// name the later one is named by its full path. A root given twice is
/// registered once.
pub fn open_catalog(
    global: &GlobalArgs,
    config: &AppConfig,
    watcher: Option<Arc<dyn FileWatcher>>,
) -> CliResult<Workspaces> {
    let filesystem: Arc<dyn Filesystem> = Arc::new(LocalFilesystem::new());
    let catalog = TemplateCatalog::new(filesystem, watcher, config.catalog.discovery_options());

    let roots = global
        .workspaces()
        .with_cli_context(|| "Failed to read the current directory")?;

    let mut entries: Vec<(String, PathBuf)> = Vec::with_capacity(roots.len());
    for root in roots {
        if entries.iter().any(|(_, known)| *known == root) {
            debug!(root = %root.display(), "Workspace given twice");
            continue;
        }
        let short = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| root.display().to_string());
        let name = if catalog.add_workspace(&short, root.clone())? {
            short
        } else {
            let long = root.display().to_string();
            catalog.add_workspace(&long, root.clone())?;
            long
        };
        debug!(workspace = %name, root = %root.display(), "Workspace registered");
        entries.push((name, root));
    }

    Ok(Workspaces { catalog, entries })
}

/// Every template of every workspace as `(workspace, template)`.
///
/// All scans are started before the first one is awaited so they run side
/// by side.
pub async fn load_all(
    workspaces: &Workspaces,
    output: &OutputManager,
) -> CliResult<Vec<(String, Template)>> {
    let spinner = output.spinner("Scanning templates…");
    for (name, _) in &workspaces.entries {
        workspaces.catalog.children(Some(&TreeNode::Workspace {
            name: name.clone(),
            loading: true,
        }))?;
    }

    let mut all = Vec::new();
    for (name, _) in &workspaces.entries {
        let templates = workspaces.catalog.templates(name).await;
        let templates = match templates {
            Ok(templates) => templates,
            Err(e) => {
                spinner.finish_and_clear();
                return Err(e.into());
            }
        };
        all.extend(templates.into_iter().map(|t| (name.clone(), t)));
    }
    spinner.finish_and_clear();

    debug!(count = all.len(), "Templates loaded");
    Ok(all)
}

/// Find a template by name (`component.tsx`) or file name
/// (`component.tsx.hbs`).
///
/// A name match wins over a file-name match; a name found in several
/// workspaces is ambiguous.
pub fn find_template(all: &[(String, Template)], name: &str) -> CliResult<(String, Template)> {
    let by_name: Vec<_> = all.iter().filter(|(_, t)| t.name == name).collect();
    let matches = if by_name.is_empty() {
        all.iter().filter(|(_, t)| t.label == name).collect()
    } else {
        by_name
    };

    match matches.as_slice() {
        [] => Err(CliError::TemplateNotFound {
            name: name.to_string(),
            available: all.iter().map(|(_, t)| t.name.clone()).collect(),
        }),
        [(workspace, template)] => Ok((workspace.clone(), template.clone())),
        several => Err(CliError::AmbiguousTemplate {
            name: name.to_string(),
            workspaces: several
                .iter()
                .map(|(workspace, _)| workspace.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        }),
    }
}
