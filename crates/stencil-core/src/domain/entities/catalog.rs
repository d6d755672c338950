//! Per-workspace catalog lifecycle.
//!
//! ```text
//!             query                 scan ok
//!  Unloaded ─────────▶ Loading ─────────────▶ Loaded(templates)
//!     ▲                  │  ▲                    │   │
//!     │   refresh /      │  │      change        │   │ create / delete
//!     └── root deleted ──┴──┴────────────────────┘   └──▶ Loaded (±1)
//! ```
//!
//! The state machine is pure: [`CatalogState::plan`] maps a watcher event to
//! a [`CatalogAction`] and the application layer performs whatever I/O the
//! action requires before calling back into the state (`insert`, `remove`,
//! `invalidate`, ...).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::entities::template::{
    DEFAULT_TEMPLATE_EXTENSION, Template, has_template_extension,
};

/// Directory names skipped during a workspace-wide scan.
pub const DEFAULT_EXCLUDED_DIRS: [&str; 3] = ["node_modules", "dist", "build"];

/// Default catalog directory, relative to the workspace root.
pub const DEFAULT_CATALOG_DIR: &str = ".stencil/templates";

/// Where templates are discovered inside a workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiscoveryMode {
    /// Only a fixed catalog directory; names starting with `_` are skipped.
    CatalogDir,
    /// Anywhere under the workspace, minus excluded directories.
    Workspace,
}

/// Discovery rules shared by scans and watcher filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryOptions {
    pub mode: DiscoveryMode,
    /// Catalog directory relative to the workspace root.
    pub catalog_dir: PathBuf,
    /// Template extension without the dot.
    pub extension: String,
    pub exclude_dirs: Vec<String>,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            mode: DiscoveryMode::CatalogDir,
            catalog_dir: PathBuf::from(DEFAULT_CATALOG_DIR),
            extension: DEFAULT_TEMPLATE_EXTENSION.to_string(),
            exclude_dirs: DEFAULT_EXCLUDED_DIRS.iter().map(|d| d.to_string()).collect(),
        }
    }
}

impl DiscoveryOptions {
    /// Directory that is listed and watched for a workspace.
    pub fn scan_root(&self, workspace_root: &Path) -> PathBuf {
        match self.mode {
            DiscoveryMode::CatalogDir => workspace_root.join(&self.catalog_dir),
            DiscoveryMode::Workspace => workspace_root.to_path_buf(),
        }
    }

    /// Prefix of file names to ignore, if any.
    pub fn ignore_prefix(&self) -> Option<char> {
        match self.mode {
            DiscoveryMode::CatalogDir => Some('_'),
            DiscoveryMode::Workspace => None,
        }
    }

    /// `true` if `path` would be picked up by a scan of `scan_root`.
    pub fn matches(&self, scan_root: &Path, path: &Path) -> bool {
        let Ok(relative) = path.strip_prefix(scan_root) else {
            return false;
        };
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        if !has_template_extension(file_name, &self.extension) {
            return false;
        }
        if self.ignore_prefix().is_some_and(|p| file_name.starts_with(p)) {
            return false;
        }
        // Any excluded directory between the root and the file disqualifies it.
        let parents = relative.parent().into_iter().flat_map(|p| p.components());
        !parents
            .filter_map(|c| c.as_os_str().to_str())
            .any(|c| self.exclude_dirs.iter().any(|d| d == c))
    }
}

/// Filesystem change reported by a watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    Created(PathBuf),
    Deleted(PathBuf),
    Changed(PathBuf),
}

impl WatchEvent {
    pub fn path(&self) -> &Path {
        match self {
            Self::Created(p) | Self::Deleted(p) | Self::Changed(p) => p,
        }
    }
}

/// What the application layer must do in response to an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogAction {
    Ignore,
    /// Read the file and [`CatalogState::insert`] it.
    ReadAndInsert(PathBuf),
    /// [`CatalogState::remove_path`] was applied; carries the removed count.
    Removed(usize),
    /// Start a full rescan.
    Rescan,
    /// An event arrived mid-scan; the running scan will be followed by another.
    MarkedStale,
    /// The watched directory disappeared; state was reset to `Unloaded`.
    Invalidated,
}

/// Explicit per-workspace lifecycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CatalogState {
    /// No scan has completed, or the catalog was invalidated.
    #[default]
    Unloaded,
    /// A scan is in flight.
    Loading {
        /// Events arrived while scanning; rescan once this scan completes.
        stale: bool,
    },
    /// Scan completed; an empty vector is the Loaded-Empty state.
    Loaded(Vec<Template>),
}

impl CatalogState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    /// Loaded-Populated.
    pub fn is_populated(&self) -> bool {
        matches!(self, Self::Loaded(t) if !t.is_empty())
    }

    /// Snapshot of the loaded templates; empty unless loaded.
    pub fn templates(&self) -> &[Template] {
        match self {
            Self::Loaded(templates) => templates,
            _ => &[],
        }
    }

    /// Enter `Loading` unless a scan is already running.
    ///
    /// Returns `true` if the caller should start a scan.
    pub fn begin_scan(&mut self) -> bool {
        if self.is_loading() {
            return false;
        }
        *self = Self::Loading { stale: false };
        true
    }

    /// Complete a scan. Returns `true` if a follow-up scan is required
    /// because events arrived while this one ran; the state then stays
    /// `Loading` and the new templates are not published.
    ///
    /// Records are keyed by name. When files in different directories share
    /// a name, the one with the smallest path is kept.
    pub fn finish_scan(&mut self, mut templates: Vec<Template>) -> bool {
        if let Self::Loading { stale: true } = self {
            *self = Self::Loading { stale: false };
            return true;
        }
        templates.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.path.cmp(&b.path)));
        templates.dedup_by(|later, kept| later.name == kept.name);
        *self = Self::Loaded(templates);
        false
    }

    /// Reset to `Unloaded`.
    pub fn invalidate(&mut self) {
        *self = Self::Unloaded;
    }

    /// Insert or replace (by name) a template in a loaded catalog.
    ///
    /// The inserted file wins over a same-named record from another
    /// directory until the next scan applies the smallest-path rule again.
    ///
    /// No-op outside `Loaded`; an unloaded catalog picks the file up on its
    /// next scan.
    pub fn insert(&mut self, template: Template) {
        let Self::Loaded(templates) = self else {
            return;
        };
        match templates.iter_mut().find(|t| t.name == template.name) {
            Some(existing) => *existing = template,
            None => {
                let at = templates.partition_point(|t| t.name < template.name);
                templates.insert(at, template);
            }
        }
    }

    /// Remove the record whose path equals `path`; if none does, remove every
    /// record below `path` (a deleted directory). Returns the removed count.
    pub fn remove_path(&mut self, path: &Path) -> usize {
        let Self::Loaded(templates) = self else {
            return 0;
        };
        let before = templates.len();
        if templates.iter().any(|t| t.path == path) {
            templates.retain(|t| t.path != path);
        } else {
            templates.retain(|t| !t.path.starts_with(path));
        }
        before - templates.len()
    }

    /// Decide how to react to a watcher event for a workspace whose watched
    /// directory is `scan_root`. Applies removal and invalidation directly;
    /// reads and rescans are left to the caller.
    pub fn plan(
        &mut self,
        event: &WatchEvent,
        scan_root: &Path,
        options: &DiscoveryOptions,
    ) -> CatalogAction {
        let path = event.path();

        // The watched directory itself (or an ancestor) went away.
        if matches!(event, WatchEvent::Deleted(_)) && scan_root.starts_with(path) {
            return match self {
                Self::Unloaded => CatalogAction::Ignore,
                _ => {
                    self.invalidate();
                    CatalogAction::Invalidated
                }
            };
        }

        if !path.starts_with(scan_root) {
            return CatalogAction::Ignore;
        }

        let relevant = match event {
            // A deleted directory has no extension; still relevant.
            WatchEvent::Deleted(_) => true,
            WatchEvent::Created(p) | WatchEvent::Changed(p) => options.matches(scan_root, p),
        };
        if !relevant {
            return CatalogAction::Ignore;
        }

        if let Self::Loading { stale } = self {
            *stale = true;
            return CatalogAction::MarkedStale;
        }
        if !self.is_loaded() {
            return CatalogAction::Ignore;
        }

        match event {
            WatchEvent::Created(p) => CatalogAction::ReadAndInsert(p.clone()),
            WatchEvent::Deleted(p) => CatalogAction::Removed(self.remove_path(p)),
            WatchEvent::Changed(_) => CatalogAction::Rescan,
        }
    }
}
