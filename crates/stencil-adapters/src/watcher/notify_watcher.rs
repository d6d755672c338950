//! Native filesystem watcher using the `notify` crate.

use std::path::{Path, PathBuf};

use notify::{
    Event, EventKind, RecursiveMode, Watcher,
    event::{ModifyKind, RenameMode},
};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use stencil_core::{
    application::{
        ApplicationError,
        ports::{FileWatcher, WatchStream},
    },
    domain::WatchEvent,
    error::StencilResult,
};

/// Watches directories recursively with the platform's native backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotifyWatcher;

impl NotifyWatcher {
    pub fn new() -> Self {
        Self
    }
}

impl FileWatcher for NotifyWatcher {
    fn watch(&self, root: &Path) -> StencilResult<WatchStream> {
        let (tx, rx) = mpsc::unbounded_channel();

        let mut watcher =
            notify::recommended_watcher(move |result: notify::Result<Event>| match result {
                Ok(event) => {
                    for change in translate(&event) {
                        // Receiver gone means the subscription was dropped.
                        if tx.send(change).is_err() {
                            return;
                        }
                    }
                }
                Err(e) => warn!(error = %e, "Watcher error"),
            })
            .map_err(|e| watch_failed(root, e))?;

        watcher
            .watch(root, RecursiveMode::Recursive)
            .map_err(|e| watch_failed(root, e))?;
        debug!(root = %root.display(), "Native watch started");

        // The stream owns the watcher; dropping it stops the native watch.
        Ok(WatchStream::new(rx, watcher))
    }
}

fn watch_failed(root: &Path, e: notify::Error) -> stencil_core::error::StencilError {
    ApplicationError::WatchFailed {
        path: root.to_path_buf(),
        reason: e.to_string(),
    }
    .into()
}

/// Map a native event to catalog events.
///
/// Renames become delete + create. Access and metadata-only events are
/// dropped.
pub(crate) fn translate(event: &Event) -> Vec<WatchEvent> {
    let paths = || event.paths.iter().cloned();
    match &event.kind {
        EventKind::Create(_) => paths().map(WatchEvent::Created).collect(),
        EventKind::Remove(_) => paths().map(WatchEvent::Deleted).collect(),
        EventKind::Modify(ModifyKind::Name(mode)) => match mode {
            RenameMode::From => paths().map(WatchEvent::Deleted).collect(),
            RenameMode::To => paths().map(WatchEvent::Created).collect(),
            RenameMode::Both => match event.paths.as_slice() {
                [from, to] => vec![
                    WatchEvent::Deleted(from.clone()),
                    WatchEvent::Created(to.clone()),
                ],
                _ => Vec::new(),
            },
            // Backend could not tell which side of the rename this is.
            _ => paths().map(by_existence).collect(),
        },
        EventKind::Modify(ModifyKind::Metadata(_)) | EventKind::Access(_) => Vec::new(),
        EventKind::Modify(_) => paths().map(WatchEvent::Changed).collect(),
        EventKind::Any | EventKind::Other => Vec::new(),
    }
}

fn by_existence(path: PathBuf) -> WatchEvent {
    if path.exists() {
        WatchEvent::Created(path)
    } else {
        WatchEvent::Deleted(path)
    }
}
