//! Workspace Template Catalog - lazily scanned, watcher-synchronized.
//!
//! Each registered workspace carries a [`CatalogState`]. Querying an
//! unloaded workspace starts a scan on a blocking task; watcher events are
//! fed through [`CatalogState::plan`] and the resulting [`CatalogAction`] is
//! carried out here. Every visible change is published as a
//! [`CatalogChange`] so views can redraw.
//!
//! ## Concurrency
//!
//! - State sits behind a `std::sync::Mutex` that is never held across an await
//! - At most one scan per workspace is in flight (guarded by `Loading`)
//! - A per-workspace generation counter discards results of scans that were
//!   overtaken by a refresh, a root deletion or a removal
//! - Watch subscriptions live in [`Subscriptions`], one task per workspace,
//!   holding only a weak reference to the catalog

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        ports::{FileWatcher, Filesystem, ListOptions, WatchStream},
    },
    domain::{
        CatalogAction, CatalogState, DiscoveryOptions, Template, TreeItem, TreeNode, WatchEvent,
    },
    error::{Context as _, StencilError, StencilResult},
};

const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Notification published after the catalog changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogChange {
    /// A workspace was added or removed.
    WorkspacesChanged,
    /// The templates (or loading state) of one workspace changed.
    Workspace { name: String },
    /// A scan failed; the workspace stays loading until refreshed.
    ScanFailed { name: String, reason: String },
}

#[derive(Debug)]
struct WorkspaceEntry {
    name: String,
    root: PathBuf,
    state: CatalogState,
    generation: u64,
    failure: Option<String>,
}

/// Registry of live watch subscriptions, keyed by workspace name.
///
/// Aborting a task drops its [`WatchStream`] and with it the native watcher.
#[derive(Debug, Default)]
struct Subscriptions {
    tasks: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl Subscriptions {
    fn contains(&self, name: &str) -> bool {
        self.tasks
            .lock()
            .map(|tasks| tasks.contains_key(name))
            .unwrap_or(false)
    }

    fn insert(&self, name: &str, task: JoinHandle<()>) {
        match self.tasks.lock() {
            Ok(mut tasks) => {
                if let Some(previous) = tasks.insert(name.to_string(), task) {
                    previous.abort();
                }
            }
            Err(_) => task.abort(),
        }
    }

    fn remove(&self, name: &str) -> bool {
        let removed = self
            .tasks
            .lock()
            .ok()
            .and_then(|mut tasks| tasks.remove(name));
        match removed {
            Some(task) => {
                task.abort();
                true
            }
            None => false,
        }
    }

    fn len(&self) -> usize {
        self.tasks.lock().map(|tasks| tasks.len()).unwrap_or(0)
    }
}

impl Drop for Subscriptions {
    fn drop(&mut self) {
        if let Ok(tasks) = self.tasks.get_mut() {
            for (_, task) in tasks.drain() {
                task.abort();
            }
        }
    }
}

struct Inner {
    filesystem: Arc<dyn Filesystem>,
    watcher: Option<Arc<dyn FileWatcher>>,
    options: DiscoveryOptions,
    workspaces: Mutex<Vec<WorkspaceEntry>>,
    subscriptions: Subscriptions,
    changes: broadcast::Sender<CatalogChange>,
}

/// Per-workspace template catalog and tree data source.
///
/// Cheap to clone. Scans and subscriptions are spawned on the ambient Tokio
/// runtime, so queries must be made from within one.
#[derive(Clone)]
pub struct TemplateCatalog {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for TemplateCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateCatalog")
            .field("options", &self.inner.options)
            .field("workspaces", &self.workspace_names())
            .finish_non_exhaustive()
    }
}

impl TemplateCatalog {
    /// Create a catalog. Without a watcher the catalog only changes on
    /// scans and explicitly delivered events.
    pub fn new(
        filesystem: Arc<dyn Filesystem>,
        watcher: Option<Arc<dyn FileWatcher>>,
        options: DiscoveryOptions,
    ) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                filesystem,
                watcher,
                options,
                workspaces: Mutex::new(Vec::new()),
                subscriptions: Subscriptions::default(),
                changes,
            }),
        }
    }

    pub fn options(&self) -> &DiscoveryOptions {
        &self.inner.options
    }

    /// Receive every change published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<CatalogChange> {
        self.inner.changes.subscribe()
    }

    // -------------------------------------------------------------------------
    // Workspace registry
    // -------------------------------------------------------------------------

    /// Register a workspace folder. Returns `false` if the name is taken.
    pub fn add_workspace(&self, name: &str, root: impl Into<PathBuf>) -> StencilResult<bool> {
        let root = root.into();
        {
            let mut workspaces = self.lock()?;
            if workspaces.iter().any(|w| w.name == name) {
                return Ok(false);
            }
            debug!(workspace = name, root = %root.display(), "Workspace added");
            workspaces.push(WorkspaceEntry {
                name: name.to_string(),
                root,
                state: CatalogState::Unloaded,
                generation: 0,
                failure: None,
            });
        }
        self.publish(CatalogChange::WorkspacesChanged);
        Ok(true)
    }

    /// Forget a workspace and tear down its watch subscription.
    pub fn remove_workspace(&self, name: &str) -> StencilResult<bool> {
        let removed = {
            let mut workspaces = self.lock()?;
            let before = workspaces.len();
            workspaces.retain(|w| w.name != name);
            before != workspaces.len()
        };
        if !removed {
            return Ok(false);
        }
        if self.inner.subscriptions.remove(name) {
            debug!(workspace = name, "Watch subscription dropped");
        }
        self.publish(CatalogChange::WorkspacesChanged);
        Ok(true)
    }

    /// Registered workspace names, in registration order.
    pub fn workspace_names(&self) -> Vec<String> {
        self.lock()
            .map(|ws| ws.iter().map(|w| w.name.clone()).collect())
            .unwrap_or_default()
    }

    /// Root folder of a workspace.
    pub fn workspace_root(&self, name: &str) -> StencilResult<PathBuf> {
        let workspaces = self.lock()?;
        Ok(find(&workspaces, name)?.root.clone())
    }

    /// Current lifecycle state of a workspace.
    pub fn state(&self, name: &str) -> StencilResult<CatalogState> {
        let workspaces = self.lock()?;
        Ok(find(&workspaces, name)?.state.clone())
    }

    /// `true` while a watch subscription exists for `name`.
    pub fn is_watching(&self, name: &str) -> bool {
        self.inner.subscriptions.contains(name)
    }

    /// Number of live watch subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.inner.subscriptions.len()
    }

    // -------------------------------------------------------------------------
    // Tree data source
    // -------------------------------------------------------------------------

    /// Children of `node`; `None` is the invisible root.
    ///
    /// Asking for the children of an unloaded workspace starts its scan and
    /// returns an empty list; the change is published once the scan is done.
    pub fn children(&self, node: Option<&TreeNode>) -> StencilResult<Vec<TreeNode>> {
        match node {
            None => {
                let workspaces = self.lock()?;
                Ok(workspaces
                    .iter()
                    .map(|w| TreeNode::Workspace {
                        name: w.name.clone(),
                        loading: !w.state.is_loaded(),
                    })
                    .collect())
            }
            Some(TreeNode::Workspace { name, .. }) => {
                let mut workspaces = self.lock()?;
                let entry = find_mut(&mut workspaces, name)?;
                if entry.state == CatalogState::Unloaded {
                    self.start_scan(entry);
                }
                Ok(entry
                    .state
                    .templates()
                    .iter()
                    .map(|t| TreeNode::Template {
                        workspace: name.clone(),
                        template: t.clone(),
                    })
                    .collect())
            }
            Some(TreeNode::Template { .. }) => Ok(Vec::new()),
        }
    }

    /// Display record for `node`.
    pub fn tree_item(&self, node: &TreeNode) -> TreeItem {
        node.item()
    }

    // -------------------------------------------------------------------------
    // Queries and commands
    // -------------------------------------------------------------------------

    /// Reset workspaces (one, or all with `None`) to `Unloaded`.
    ///
    /// Running scans are discarded; the next query scans again.
    pub fn refresh(&self, name: Option<&str>) -> StencilResult<()> {
        let refreshed: Vec<String> = {
            let mut workspaces = self.lock()?;
            if let Some(name) = name {
                find(&workspaces, name)?;
            }
            workspaces
                .iter_mut()
                .filter(|w| name.is_none_or(|n| n == w.name))
                .map(|w| {
                    w.generation += 1;
                    w.failure = None;
                    w.state.invalidate();
                    w.name.clone()
                })
                .collect()
        };
        for name in refreshed {
            debug!(workspace = %name, "Catalog refreshed");
            self.publish(CatalogChange::Workspace { name });
        }
        Ok(())
    }

    /// Templates of a workspace, scanning first if needed.
    ///
    /// Fails with `ScanFailed` if the scan failed (until refreshed).
    pub async fn templates(&self, name: &str) -> StencilResult<Vec<Template>> {
        let mut changes = self.subscribe();
        loop {
            {
                let mut workspaces = self.lock()?;
                let entry = find_mut(&mut workspaces, name)?;
                if let Some(reason) = &entry.failure {
                    return Err(ApplicationError::ScanFailed {
                        workspace: name.to_string(),
                        reason: reason.clone(),
                    }
                    .into());
                }
                if entry.state.is_loaded() {
                    return Ok(entry.state.templates().to_vec());
                }
                if entry.state == CatalogState::Unloaded {
                    self.start_scan(entry);
                }
            }

            match changes.recv().await {
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => {
                    return Err(StencilError::Internal {
                        message: "catalog change channel closed".into(),
                    });
                }
            }
        }
    }

    /// Apply a watcher event to a workspace.
    #[instrument(skip(self), fields(workspace = name))]
    pub async fn handle_event(&self, name: &str, event: WatchEvent) -> StencilResult<()> {
        let options = &self.inner.options;
        let action = {
            let mut workspaces = self.lock()?;
            let entry = find_mut(&mut workspaces, name)?;
            let scan_root = options.scan_root(&entry.root);
            let action = entry.state.plan(&event, &scan_root, options);
            match &action {
                CatalogAction::Invalidated => {
                    entry.generation += 1;
                    entry.failure = None;
                }
                CatalogAction::Rescan => self.start_scan(entry),
                _ => {}
            }
            action
        };
        debug!(?event, ?action, "Watch event");

        match action {
            CatalogAction::Ignore | CatalogAction::MarkedStale | CatalogAction::Removed(0) => {}
            CatalogAction::Removed(_) | CatalogAction::Invalidated | CatalogAction::Rescan => {
                self.publish(CatalogChange::Workspace {
                    name: name.to_string(),
                });
            }
            CatalogAction::ReadAndInsert(path) => {
                let Some(template) = self.read_template(path).await else {
                    return Ok(());
                };
                {
                    let mut workspaces = self.lock()?;
                    find_mut(&mut workspaces, name)?.state.insert(template);
                }
                self.publish(CatalogChange::Workspace {
                    name: name.to_string(),
                });
            }
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Internal Helpers
    // -------------------------------------------------------------------------

    fn lock(&self) -> StencilResult<MutexGuard<'_, Vec<WorkspaceEntry>>> {
        self.inner
            .workspaces
            .lock()
            .map_err(|_| ApplicationError::StoreLockError.into())
    }

    fn publish(&self, change: CatalogChange) {
        // No receivers is fine.
        let _ = self.inner.changes.send(change);
    }

    /// Enter `Loading` and spawn a scan unless one is already running.
    fn start_scan(&self, entry: &mut WorkspaceEntry) {
        if !entry.state.begin_scan() {
            return;
        }
        entry.failure = None;
        self.ensure_subscription(&entry.name, &entry.root);
        self.spawn_scan(entry.name.clone(), entry.root.clone(), entry.generation);
    }

    fn spawn_scan(&self, name: String, root: PathBuf, generation: u64) {
        let catalog = self.clone();
        tokio::spawn(async move {
            let filesystem = catalog.inner.filesystem.clone();
            let options = catalog.inner.options.clone();
            let workspace = name.clone();
            let result = tokio::task::spawn_blocking(move || {
                scan_workspace(filesystem.as_ref(), &workspace, &root, &options)
            })
            .await
            .context("scan task failed")
            .and_then(|scan| scan);
            catalog.complete_scan(&name, generation, result);
        });
    }

    fn complete_scan(&self, name: &str, generation: u64, result: StencilResult<Vec<Template>>) {
        let change = {
            let Ok(mut workspaces) = self.lock() else {
                return;
            };
            let Some(entry) = workspaces.iter_mut().find(|w| w.name == name) else {
                debug!(workspace = name, "Scan finished for removed workspace");
                return;
            };
            if entry.generation != generation {
                debug!(workspace = name, "Discarding superseded scan");
                return;
            }

            match result {
                Ok(templates) => {
                    let count = templates.len();
                    if entry.state.finish_scan(templates) {
                        debug!(workspace = name, "Changes during scan; rescanning");
                        self.spawn_scan(entry.name.clone(), entry.root.clone(), generation);
                        return;
                    }
                    info!(workspace = name, templates = count, "Scan complete");
                    CatalogChange::Workspace {
                        name: name.to_string(),
                    }
                }
                Err(e) => {
                    let reason = e.to_string();
                    warn!(workspace = name, error = %reason, "Scan failed");
                    entry.failure = Some(reason.clone());
                    CatalogChange::ScanFailed {
                        name: name.to_string(),
                        reason,
                    }
                }
            }
        };
        self.publish(change);
    }

    /// Subscribe to changes below `root` once per workspace.
    ///
    /// A failed subscription is logged and retried on the next scan.
    fn ensure_subscription(&self, name: &str, root: &Path) {
        let Some(watcher) = &self.inner.watcher else {
            return;
        };
        if self.inner.subscriptions.contains(name) {
            return;
        }

        let stream = match watcher.watch(root) {
            Ok(stream) => stream,
            Err(e) => {
                warn!(workspace = name, error = %e, "Cannot watch workspace");
                return;
            }
        };

        let weak = Arc::downgrade(&self.inner);
        let task = tokio::spawn(forward_events(weak, name.to_string(), stream));
        self.inner.subscriptions.insert(name, task);
        debug!(workspace = name, root = %root.display(), "Watching workspace");
    }

    async fn read_template(&self, path: PathBuf) -> Option<Template> {
        let filesystem = self.inner.filesystem.clone();
        let extension = self.inner.options.extension.clone();
        let result = tokio::task::spawn_blocking(move || {
            read_template(filesystem.as_ref(), &path, &extension)
        })
        .await;
        match result {
            Ok(template) => template,
            Err(e) => {
                warn!(error = %e, "Template read task failed");
                None
            }
        }
    }
}

async fn forward_events(catalog: Weak<Inner>, name: String, mut stream: WatchStream) {
    while let Some(event) = stream.next().await {
        let Some(inner) = catalog.upgrade() else {
            break;
        };
        let catalog = TemplateCatalog { inner };
        if let Err(e) = catalog.handle_event(&name, event).await {
            debug!(workspace = %name, error = %e, "Watch event not applied");
        }
    }
}

fn find<'a>(workspaces: &'a [WorkspaceEntry], name: &str) -> StencilResult<&'a WorkspaceEntry> {
    workspaces
        .iter()
        .find(|w| w.name == name)
        .ok_or_else(|| workspace_not_found(name))
}

fn find_mut<'a>(
    workspaces: &'a mut [WorkspaceEntry],
    name: &str,
) -> StencilResult<&'a mut WorkspaceEntry> {
    workspaces
        .iter_mut()
        .find(|w| w.name == name)
        .ok_or_else(|| workspace_not_found(name))
}

fn workspace_not_found(name: &str) -> StencilError {
    ApplicationError::WorkspaceNotFound {
        name: name.to_string(),
    }
    .into()
}

/// Read one file into a template; unreadable files are skipped.
fn read_template(filesystem: &dyn Filesystem, path: &Path, extension: &str) -> Option<Template> {
    let code = match filesystem.read_text(path) {
        Ok(code) => code,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Skipping unreadable template");
            return None;
        }
    };
    match Template::from_file(path, code, extension) {
        Ok(template) => Some(template),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Skipping template");
            None
        }
    }
}

/// List and read every template of a workspace.
///
/// A missing scan root yields an empty catalog. Listing failures fail the
/// scan; individual unreadable files are skipped.
#[instrument(skip(filesystem, root, options), fields(root = %root.display()))]
pub fn scan_workspace(
    filesystem: &dyn Filesystem,
    workspace: &str,
    root: &Path,
    options: &DiscoveryOptions,
) -> StencilResult<Vec<Template>> {
    let scan_root = options.scan_root(root);
    let list_options = ListOptions {
        exclude_dirs: options.exclude_dirs.clone(),
        include_suffix: Some(format!(".{}", options.extension)),
    };

    let entries = filesystem
        .list_files(&scan_root, &list_options)
        .map_err(|e| ApplicationError::ScanFailed {
            workspace: workspace.to_string(),
            reason: e.to_string(),
        })?;

    let templates = entries
        .iter()
        .filter(|entry| options.matches(&scan_root, &entry.path))
        .filter_map(|entry| read_template(filesystem, &entry.path, &options.extension))
        .collect();
    Ok(templates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{FileEntry, MockFilesystem};
    use crate::domain::DiscoveryMode;
    use std::time::Duration;

    fn entry(path: &str) -> FileEntry {
        let path = PathBuf::from(path);
        FileEntry {
            name: path.file_name().unwrap().to_string_lossy().into_owned(),
            path,
        }
    }

    fn listing(paths: &'static [&'static str]) -> MockFilesystem {
        let mut fs = MockFilesystem::new();
        fs.expect_list_files()
            .returning(move |_, _| Ok(paths.iter().map(|p| entry(p)).collect()));
        fs.expect_read_text()
            .returning(|p| Ok(format!("code of {}", p.display())));
        fs
    }

    fn workspace_options() -> DiscoveryOptions {
        DiscoveryOptions {
            mode: DiscoveryMode::Workspace,
            ..DiscoveryOptions::default()
        }
    }

    #[test]
    fn scan_filters_and_reads() {
        let fs = listing(&[
            "/ws/a.txt.hbs",
            "/ws/node_modules/pkg/x.hbs",
            "/ws/readme.md",
            "/ws/src/b.rs.hbs",
        ]);
        let templates = scan_workspace(&fs, "ws", Path::new("/ws"), &workspace_options()).unwrap();
        let names: Vec<_> = templates.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["a.txt", "b.rs"]);
        assert_eq!(templates[0].code, "code of /ws/a.txt.hbs");
    }

    #[test]
    fn catalog_dir_scan_ignores_underscore_names() {
        let fs = listing(&[
            "/ws/.stencil/templates/a.hbs",
            "/ws/.stencil/templates/_partial.hbs",
        ]);
        let templates =
            scan_workspace(&fs, "ws", Path::new("/ws"), &DiscoveryOptions::default()).unwrap();
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].name, "a");
    }

    #[test]
    fn unreadable_file_is_skipped() {
        let mut fs = MockFilesystem::new();
        fs.expect_list_files()
            .returning(|_, _| Ok(vec![entry("/ws/a.hbs"), entry("/ws/b.hbs")]));
        fs.expect_read_text().returning(|p| {
            if p.ends_with("a.hbs") {
                Err(ApplicationError::FilesystemError {
                    path: p.to_path_buf(),
                    reason: "denied".into(),
                }
                .into())
            } else {
                Ok("b".into())
            }
        });
        let templates = scan_workspace(&fs, "ws", Path::new("/ws"), &workspace_options()).unwrap();
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].name, "b");
    }

    #[test]
    fn listing_failure_is_scan_failure() {
        let mut fs = MockFilesystem::new();
        fs.expect_list_files().returning(|root, _| {
            Err(ApplicationError::FilesystemError {
                path: root.to_path_buf(),
                reason: "denied".into(),
            }
            .into())
        });
        let err = scan_workspace(&fs, "ws", Path::new("/ws"), &workspace_options()).unwrap_err();
        assert!(matches!(
            err,
            StencilError::Application(ApplicationError::ScanFailed { .. })
        ));
    }

    #[tokio::test]
    async fn first_query_scans_once_and_loads() {
        let mut fs = MockFilesystem::new();
        fs.expect_list_files()
            .times(1)
            .returning(|_, _| Ok(vec![entry("/ws/a.hbs")]));
        fs.expect_read_text().returning(|_| Ok("a".into()));
        let catalog = TemplateCatalog::new(Arc::new(fs), None, workspace_options());
        catalog.add_workspace("ws", "/ws").unwrap();

        let node = TreeNode::Workspace {
            name: "ws".into(),
            loading: true,
        };
        assert!(catalog.children(Some(&node)).unwrap().is_empty());
        assert!(catalog.state("ws").unwrap().is_loading());
        // A second query while loading must not start another scan.
        assert!(catalog.children(Some(&node)).unwrap().is_empty());

        let templates = catalog.templates("ws").await.unwrap();
        assert_eq!(templates.len(), 1);
        assert!(catalog.state("ws").unwrap().is_populated());
        assert_eq!(catalog.children(Some(&node)).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn root_lists_workspaces_in_order() {
        let catalog = TemplateCatalog::new(
            Arc::new(MockFilesystem::new()),
            None,
            DiscoveryOptions::default(),
        );
        catalog.add_workspace("b", "/b").unwrap();
        catalog.add_workspace("a", "/a").unwrap();
        assert!(!catalog.add_workspace("a", "/elsewhere").unwrap());

        let roots = catalog.children(None).unwrap();
        let names: Vec<_> = roots.iter().map(|n| catalog.tree_item(n).label).collect();
        assert_eq!(names, ["b", "a"]);
        assert!(matches!(roots[0], TreeNode::Workspace { loading: true, .. }));
    }

    #[tokio::test]
    async fn failed_scan_stays_loading_until_refresh() {
        let mut fs = MockFilesystem::new();
        let mut calls = 0;
        fs.expect_list_files().times(2).returning(move |root, _| {
            calls += 1;
            if calls == 1 {
                Err(ApplicationError::FilesystemError {
                    path: root.to_path_buf(),
                    reason: "denied".into(),
                }
                .into())
            } else {
                Ok(Vec::new())
            }
        });
        let catalog = TemplateCatalog::new(Arc::new(fs), None, workspace_options());
        catalog.add_workspace("ws", "/ws").unwrap();

        let err = catalog.templates("ws").await.unwrap_err();
        assert!(err.is_retryable());
        assert!(catalog.state("ws").unwrap().is_loading());

        catalog.refresh(Some("ws")).unwrap();
        assert_eq!(catalog.state("ws").unwrap(), CatalogState::Unloaded);
        assert!(catalog.templates("ws").await.unwrap().is_empty());
        assert_eq!(catalog.state("ws").unwrap(), CatalogState::Loaded(Vec::new()));
    }

    #[tokio::test]
    async fn created_file_is_inserted_without_rescan() {
        let mut fs = MockFilesystem::new();
        fs.expect_list_files()
            .times(1)
            .returning(|_, _| Ok(vec![entry("/ws/a.hbs")]));
        fs.expect_read_text().returning(|p| Ok(p.display().to_string()));
        let catalog = TemplateCatalog::new(Arc::new(fs), None, workspace_options());
        catalog.add_workspace("ws", "/ws").unwrap();
        catalog.templates("ws").await.unwrap();

        catalog
            .handle_event("ws", WatchEvent::Created("/ws/b.hbs".into()))
            .await
            .unwrap();
        let names: Vec<_> = catalog
            .templates("ws")
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[tokio::test]
    async fn deleted_root_resets_to_unloaded() {
        let mut fs = MockFilesystem::new();
        fs.expect_list_files()
            .returning(|_, _| Ok(vec![entry("/ws/.stencil/templates/a.hbs")]));
        fs.expect_read_text().returning(|_| Ok("a".into()));
        let catalog = TemplateCatalog::new(Arc::new(fs), None, DiscoveryOptions::default());
        catalog.add_workspace("ws", "/ws").unwrap();
        catalog.templates("ws").await.unwrap();

        let mut changes = catalog.subscribe();
        catalog
            .handle_event("ws", WatchEvent::Deleted("/ws/.stencil".into()))
            .await
            .unwrap();
        assert_eq!(catalog.state("ws").unwrap(), CatalogState::Unloaded);
        let change = tokio::time::timeout(Duration::from_secs(1), changes.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(change, CatalogChange::Workspace { name: "ws".into() });
    }

    #[tokio::test]
    async fn unknown_workspace_is_not_found() {
        let catalog = TemplateCatalog::new(
            Arc::new(MockFilesystem::new()),
            None,
            DiscoveryOptions::default(),
        );
        let err = catalog.templates("nope").await.unwrap_err();
        assert!(matches!(
            err,
            StencilError::Application(ApplicationError::WorkspaceNotFound { .. })
        ));
        assert!(!catalog.remove_workspace("nope").unwrap());
    }
}
