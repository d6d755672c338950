//! `stencil watch`: keep the catalog live and print it as it changes.

use std::sync::Arc;

use chrono::Local;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, instrument, warn};

use stencil_adapters::NotifyWatcher;
use stencil_core::application::{CatalogChange, FileWatcher, TemplateCatalog};
use stencil_core::domain::TreeNode;

use crate::{
    cli::{GlobalArgs, WatchArgs},
    commands::{list::print_tree, open_catalog},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Watch every workspace until interrupted.
#[instrument(skip_all)]
pub async fn execute(
    args: WatchArgs,
    global: &GlobalArgs,
    config: &AppConfig,
    output: &OutputManager,
) -> CliResult<()> {
    let watcher: Arc<dyn FileWatcher> = Arc::new(NotifyWatcher::new());
    let workspaces = open_catalog(global, config, Some(watcher))?;
    let catalog = &workspaces.catalog;
    let mut changes = catalog.subscribe();

    output.header(&format!("Watching {}", workspaces.searched()))?;
    output.print("Press Ctrl-C to stop.")?;
    // Asking for the children starts every scan; the tree is printed as
    // each one reports back.
    redraw(catalog, None, config, output)?;

    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal.map_err(|e| CliError::IoError {
                    message: "Failed to listen for Ctrl-C".into(),
                    source: e,
                })?;
                info!("Watch interrupted");
                break;
            }
            change = changes.recv() => match change {
                Ok(CatalogChange::ScanFailed { name, reason }) => {
                    warn!(workspace = %name, %reason, "Scan failed");
                    output.warning(&format!("{name}: scan failed: {reason}"))?;
                }
                Ok(CatalogChange::Workspace { name }) => {
                    debug!(workspace = %name, "Catalog changed");
                    let only = args.changes_only.then_some(name.as_str());
                    redraw(catalog, only, config, output)?;
                }
                Ok(CatalogChange::WorkspacesChanged) => redraw(catalog, None, config, output)?,
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "Change notifications coalesced");
                    redraw(catalog, None, config, output)?;
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    output.success("Stopped watching")?;
    Ok(())
}

/// Print the tree (or one workspace of it) under a timestamp.
fn redraw(
    catalog: &TemplateCatalog,
    only: Option<&str>,
    config: &AppConfig,
    output: &OutputManager,
) -> CliResult<()> {
    let stamp = Local::now().format("%H:%M:%S");
    if !config.catalog.show {
        // The view is off but scans still have to run for the watch to start.
        for node in catalog.children(None)? {
            catalog.children(Some(&node))?;
        }
        output.print(&output.dim(&format!("[{stamp}] catalog updated")))?;
        return Ok(());
    }

    output.print(&output.dim(&format!("[{stamp}]")))?;
    match only {
        None => print_tree(catalog, output),
        Some(name) => {
            let node = TreeNode::Workspace {
                name: name.to_string(),
                loading: !catalog.state(name)?.is_loaded(),
            };
            output.data(&catalog.tree_item(&node).label)?;
            for child in catalog.children(Some(&node))? {
                output.data(&format!("  {}", catalog.tree_item(&child).label))?;
            }
            Ok(())
        }
    }
}
