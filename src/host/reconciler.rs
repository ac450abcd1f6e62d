//! The maintenance loop and the public host surface.

use std::any::Any;
use std::cell::RefCell;
use std::error::Error;
use std::fs;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use indexmap::IndexMap;
use parking_lot::{Mutex, ReentrantMutex, RwLock};
use tokio::runtime::Handle;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::config::HostConfig;
use crate::filter::HostingFilters;
use crate::name::{LogicalName, codec};
use crate::node::{DynamicNodeFactory, Node, NodeError, NodeFactory};
use crate::watcher::RootWatcher;

use super::diff::FolderDiff;
use super::error::{HostError, HostResult};
use super::recipes::Recipes;
use super::scan::{self, is_reserved_folder_name};
use super::{AddressingLayer, NoopAddressing};

/// Outcome of one maintenance tick.
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    /// Eligible folders found by the scan.
    pub scanned: usize,
    pub admitted: Vec<LogicalName>,
    pub retired: Vec<LogicalName>,
    /// Folders whose node could not be built, with the reason. Retried next tick.
    pub failed: Vec<(LogicalName, String)>,
}

impl TickReport {
    /// True when the tick changed nothing.
    pub fn is_quiet(&self) -> bool {
        self.admitted.is_empty() && self.retired.is_empty() && self.failed.is_empty()
    }
}

/// Everything guarded by the coarse lock.
///
/// The lock is reentrant so nodes and the addressing layer may call back into
/// the host while it constructs or closes them. No `RefCell` borrow is held
/// across such a call.
#[derive(Default)]
struct LiveRegistry {
    folders: IndexMap<LogicalName, PathBuf>,
    nodes: IndexMap<LogicalName, Arc<dyn Node>>,
    /// Set while the lock holder is applying a diff.
    ticking: bool,
}

struct HostInner {
    root: PathBuf,
    other_roots: RwLock<Vec<PathBuf>>,
    recipes: Recipes,
    filters: RwLock<Arc<HostingFilters>>,
    live: ReentrantMutex<RefCell<LiveRegistry>>,
    closed: AtomicBool,
    node_count: AtomicUsize,
    factory: Arc<dyn NodeFactory>,
    addressing: Arc<dyn AddressingLayer>,
    interval: Duration,
    wake: Arc<Notify>,
    watch_roots: bool,
    debounce: Duration,
    task: Mutex<Option<JoinHandle<()>>>,
    watcher: Mutex<Option<JoinHandle<()>>>,
    /// Runtime the loop was started on; the watcher is respawned there.
    runtime: Mutex<Option<Handle>>,
}

/// Hosts one node per eligible folder under its roots.
///
/// Cheap to clone; clones share the same registry.
#[derive(Clone)]
pub struct NodeHost {
    inner: Arc<HostInner>,
}

impl NodeHost {
    /// Create a builder for configuring the host.
    pub fn builder() -> NodeHostBuilder {
        NodeHostBuilder::new()
    }

    /// Spawn the maintenance loop. The first tick starts right away.
    ///
    /// Must be called from within a Tokio runtime. Calling it again while the
    /// loop is running does nothing.
    pub fn start(&self) -> HostResult<()> {
        self.ensure_open()?;

        let mut task = self.inner.task.lock();
        if task.is_some() {
            return Ok(());
        }

        *self.inner.runtime.lock() = Some(Handle::current());
        self.restart_watcher();

        let host = self.clone();
        *task = Some(tokio::spawn(async move { host.maintenance_loop().await }));

        crate::log_event!(
            "host",
            "started",
            "{} root(s), every {:?}",
            self.roots().len(),
            self.inner.interval
        );
        Ok(())
    }

    /// Watch the current roots, replacing any previous watcher.
    ///
    /// Does nothing before [`start`](Self::start) or when watching is off. A
    /// root that does not exist yet is only noticed by interval ticks until
    /// the roots change again.
    fn restart_watcher(&self) {
        if !self.inner.watch_roots || self.is_closed() {
            return;
        }
        let Some(runtime) = self.inner.runtime.lock().clone() else {
            return;
        };

        let mut slot = self.inner.watcher.lock();
        if let Some(previous) = slot.take() {
            previous.abort();
        }
        match RootWatcher::new(&self.roots(), self.inner.debounce, self.inner.wake.clone()) {
            Ok(watcher) => *slot = Some(runtime.spawn(watcher.run())),
            Err(e) => tracing::error!("[host] root watcher unavailable: {e}"),
        }
    }

    /// Wait until the maintenance loop has exited (after [`shutdown`](Self::shutdown)).
    pub async fn stopped(&self) {
        let handle = self.inner.task.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                tracing::error!("[host] maintenance loop failed: {e}");
            }
        }
    }

    async fn maintenance_loop(self) {
        loop {
            if self.is_closed() {
                break;
            }

            let host = self.clone();
            match tokio::task::spawn_blocking(move || host.run_maintenance()).await {
                Ok(report) if !report.is_quiet() => crate::debug_event!(
                    "host",
                    "tick",
                    "{} scanned, {} admitted, {} retired, {} failed",
                    report.scanned,
                    report.admitted.len(),
                    report.retired.len(),
                    report.failed.len()
                ),
                Ok(_) => {}
                Err(e) => tracing::error!("[host] maintenance tick aborted: {e}"),
            }

            if self.is_closed() {
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep(self.inner.interval) => {}
                _ = self.inner.wake.notified() => {}
            }
        }
        crate::debug_event!("host", "maintenance stopped");
    }

    /// Run one scan-diff-apply cycle on the calling thread.
    ///
    /// Node construction and close failures are logged and reported, never
    /// returned. A tick that starts after shutdown applies nothing.
    pub fn run_maintenance(&self) -> TickReport {
        if self.is_closed() {
            return TickReport::default();
        }

        let roots = self.roots();
        let filters = self.filters();
        let current = scan::scan_roots(&roots, &filters);

        let mut report = TickReport {
            scanned: current.len(),
            ..TickReport::default()
        };

        let guard = self.inner.live.lock();
        if self.is_closed() {
            return report;
        }

        let diff = {
            let mut live = guard.borrow_mut();
            if live.ticking {
                // Called from a node callback inside this thread's own tick
                self.inner.wake.notify_one();
                return report;
            }
            let diff = FolderDiff::compute(&current, &live.folders);
            live.ticking = !diff.is_empty();
            diff
        };
        if diff.is_empty() {
            return report;
        }

        self.apply(&guard, diff, &mut report);
        guard.borrow_mut().ticking = false;
        report
    }

    /// Retire removed names, then admit added folders. Caller holds the lock.
    fn apply(&self, live: &RefCell<LiveRegistry>, diff: FolderDiff, report: &mut TickReport) {
        for name in diff.removed {
            self.retire(live, &name);
            report.retired.push(name);
        }

        for (name, folder) in diff.added {
            if self.is_closed() {
                break;
            }
            if live.borrow().nodes.contains_key(&name) {
                tracing::warn!(
                    "[host] {} skipped: '{name}' is still live at another folder",
                    folder.display()
                );
                continue;
            }
            match self.construct(&name, &folder) {
                Ok(node) if self.is_closed() => {
                    // Shut down from inside the constructor
                    if let Err(e) = close_node(node.as_ref()) {
                        tracing::warn!("[host] error closing '{name}' during shutdown: {e}");
                    }
                }
                Ok(node) => {
                    crate::log_event!("host", "admitted", "'{name}' from {}", folder.display());
                    let mut registry = live.borrow_mut();
                    registry.folders.insert(name.clone(), folder);
                    registry.nodes.insert(name.clone(), node);
                    self.inner.node_count.fetch_add(1, Ordering::SeqCst);
                    report.admitted.push(name);
                }
                Err(e) => {
                    tracing::warn!("[host] could not start node for {}: {e}", folder.display());
                    report.failed.push((name, e.to_string()));
                }
            }
        }
    }

    fn construct(&self, name: &LogicalName, folder: &Path) -> Result<Arc<dyn Node>, NodeError> {
        let factory = &self.inner.factory;
        panic::catch_unwind(AssertUnwindSafe(|| factory.create(name.clone(), folder))).unwrap_or_else(
            |payload| {
                Err(NodeError::Panicked {
                    name: name.to_string(),
                    operation: "construction",
                    message: panic_message(payload.as_ref()),
                })
            },
        )
    }

    /// Remove `name` from both maps and close its node. Caller holds the lock.
    fn retire(&self, live: &RefCell<LiveRegistry>, name: &LogicalName) {
        let removed = {
            let mut registry = live.borrow_mut();
            registry.folders.shift_remove(name);
            registry.nodes.shift_remove(name)
        };
        let Some(node) = removed else {
            return;
        };
        self.inner.node_count.fetch_sub(1, Ordering::SeqCst);

        match close_node(node.as_ref()) {
            Ok(()) => crate::log_event!("host", "retired", "'{name}'"),
            Err(e) => tracing::warn!("[host] retired '{name}' with close error: {e}"),
        }
    }

    /// Create a new node folder in the primary root, empty or copied from `recipe`.
    ///
    /// The node itself appears on the next tick.
    pub fn new_node(&self, recipe: Option<&str>, name: &str) -> HostResult<PathBuf> {
        self.ensure_open()?;

        let logical = self.validate_name(name)?;
        let folder = self.inner.root.join(codec::encode(&logical));

        if self.is_live(&logical) || folder.exists() {
            return Err(HostError::NameConflict {
                name: logical.to_string(),
            });
        }

        match recipe {
            None => {
                fs::create_dir_all(&self.inner.root)
                    .map_err(|e| HostError::fs("create root", &self.inner.root, e))?;
                fs::create_dir(&folder).map_err(|e| match e.kind() {
                    io::ErrorKind::AlreadyExists => HostError::NameConflict {
                        name: logical.to_string(),
                    },
                    _ => HostError::fs("create node folder", &folder, e),
                })?;
            }
            Some(recipe) => {
                let template = self
                    .inner
                    .recipes
                    .resolve(recipe)
                    .ok_or_else(|| HostError::RecipeNotFound {
                        recipe: recipe.to_string(),
                    })?;
                fs::create_dir_all(&self.inner.root)
                    .map_err(|e| HostError::fs("create root", &self.inner.root, e))?;
                super::fs::copy_dir_staged(&template, &folder)?;
            }
        }

        crate::log_event!("host", "node folder created", "'{logical}' at {}", folder.display());
        self.inner.wake.notify_one();
        Ok(folder)
    }

    /// Rename a node folder in place. The registry follows on the next tick.
    pub fn rename_node(&self, folder: &Path, new_name: &str) -> HostResult<PathBuf> {
        self.ensure_open()?;

        let logical = self.validate_name(new_name)?;
        let Some(parent) = folder.parent() else {
            return Err(HostError::InvalidName {
                reason: format!("{} has no parent folder", folder.display()),
            });
        };
        let target = parent.join(codec::encode(&logical));
        if target == folder {
            return Ok(target);
        }

        let same_node = folder
            .file_name()
            .map(|current| codec::decode(&current.to_string_lossy()) == logical)
            .unwrap_or(false);

        if !same_node && self.is_live(&logical) {
            return Err(HostError::NameConflict {
                name: logical.to_string(),
            });
        }
        if target.exists() {
            return Err(HostError::NameConflict {
                name: logical.to_string(),
            });
        }

        fs::rename(folder, &target).map_err(|e| HostError::fs("rename node folder", folder, e))?;

        crate::log_event!(
            "host",
            "node folder renamed",
            "{} -> {}",
            folder.display(),
            target.display()
        );
        self.inner.wake.notify_one();
        Ok(target)
    }

    fn validate_name(&self, name: &str) -> HostResult<LogicalName> {
        let logical = LogicalName::new(name.trim());
        if logical.is_empty() {
            return Err(HostError::InvalidName {
                reason: format!("'{name}' contains no letters or digits"),
            });
        }
        let filename = codec::encode(&logical);
        if is_reserved_folder_name(&filename) {
            return Err(HostError::InvalidName {
                reason: format!("'{name}' would be stored as a folder that is never hosted"),
            });
        }
        self.filters().check(&logical)?;
        Ok(logical)
    }

    /// Forward a naming fault from the addressing layer to the live node.
    ///
    /// Faults for nodes that are no longer live are dropped.
    pub fn handle_name_registration_fault(&self, name: &LogicalName, error: &(dyn Error + Send + Sync + 'static)) {
        let guard = self.inner.live.lock();
        let node = guard.borrow().nodes.get(name).cloned();
        match node {
            Some(node) => node.notify_of_error(error),
            None => crate::debug_event!("host", "fault dropped", "'{name}' is not live: {error}"),
        }
    }

    /// Stop maintenance and close every node. Safe to call more than once.
    pub fn shutdown(&self) {
        if self.inner.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.inner.wake.notify_one();

        {
            let guard = self.inner.live.lock();
            let drained: Vec<_> = {
                let mut live = guard.borrow_mut();
                live.folders.clear();
                live.nodes.drain(..).collect()
            };
            for (name, node) in drained {
                self.inner.node_count.fetch_sub(1, Ordering::SeqCst);
                if let Err(e) = close_node(node.as_ref()) {
                    tracing::warn!("[host] error closing '{name}' during shutdown: {e}");
                }
            }
        }

        if let Some(watcher) = self.inner.watcher.lock().take() {
            watcher.abort();
        }
        self.inner.addressing.shutdown();
        crate::log_event!("host", "shutdown");
    }

    /// Replace the hosting filters. Takes effect on the next tick.
    pub fn set_hosting_filters(&self, includes: Vec<String>, excludes: Vec<String>) {
        let filters = Arc::new(HostingFilters::new(includes, excludes));
        let rule = filters.describe();
        *self.inner.filters.write() = filters;

        crate::log_event!("host", "hosting rule", "{rule}");
        self.inner.addressing.hosting_rule_changed(&rule);
        self.inner.wake.notify_one();
    }

    /// The raw include and exclude patterns as last set.
    pub fn hosting_filters(&self) -> (Vec<String>, Vec<String>) {
        let filters = self.filters();
        (filters.raw_includes().to_vec(), filters.raw_excludes().to_vec())
    }

    /// Human-readable description of the active filters.
    pub fn hosting_rule(&self) -> String {
        self.filters().describe()
    }

    pub fn should_be_included(&self, name: &LogicalName) -> bool {
        self.filters().should_include(name)
    }

    /// Like [`should_be_included`](Self::should_be_included) but explains a rejection.
    pub fn test_name_filters(&self, name: &LogicalName) -> HostResult<()> {
        self.filters().check(name)
    }

    fn filters(&self) -> Arc<HostingFilters> {
        self.inner.filters.read().clone()
    }

    /// Replace the secondary roots. A running watcher is rebuilt over the new set.
    pub fn set_other_roots(&self, roots: Vec<PathBuf>) {
        *self.inner.other_roots.write() = roots;
        self.restart_watcher();
        self.inner.wake.notify_one();
    }

    pub fn other_roots(&self) -> Vec<PathBuf> {
        self.inner.other_roots.read().clone()
    }

    /// The primary root, where new nodes are created.
    pub fn root(&self) -> &Path {
        &self.inner.root
    }

    /// All roots in scan order.
    pub fn roots(&self) -> Vec<PathBuf> {
        let mut roots = vec![self.inner.root.clone()];
        roots.extend(self.inner.other_roots.read().iter().cloned());
        roots
    }

    pub fn recipes(&self) -> &Recipes {
        &self.inner.recipes
    }

    pub fn node(&self, name: &LogicalName) -> Option<Arc<dyn Node>> {
        self.read_live(|live| live.nodes.get(name).cloned())
    }

    /// Live node names in admission order.
    pub fn node_names(&self) -> Vec<LogicalName> {
        self.read_live(|live| live.nodes.keys().cloned().collect())
    }

    pub fn nodes(&self) -> Vec<Arc<dyn Node>> {
        self.read_live(|live| live.nodes.values().cloned().collect())
    }

    pub fn live_folders(&self) -> IndexMap<LogicalName, PathBuf> {
        self.read_live(|live| live.folders.clone())
    }

    fn is_live(&self, name: &LogicalName) -> bool {
        self.read_live(|live| live.nodes.contains_key(name))
    }

    fn read_live<R>(&self, read: impl FnOnce(&LiveRegistry) -> R) -> R {
        let guard = self.inner.live.lock();
        let live = guard.borrow();
        read(&live)
    }

    pub fn node_count(&self) -> usize {
        self.inner.node_count.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> HostResult<()> {
        if self.is_closed() {
            Err(HostError::Closed)
        } else {
            Ok(())
        }
    }
}

fn close_node(node: &dyn Node) -> Result<(), NodeError> {
    panic::catch_unwind(AssertUnwindSafe(|| node.close())).unwrap_or_else(|payload| {
        Err(NodeError::Panicked {
            name: node.name().to_string(),
            operation: "close",
            message: panic_message(payload.as_ref()),
        })
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Builder for [`NodeHost`].
pub struct NodeHostBuilder {
    root: PathBuf,
    other_roots: Vec<PathBuf>,
    recipes_root: PathBuf,
    includes: Vec<String>,
    excludes: Vec<String>,
    interval: Duration,
    watch_roots: bool,
    debounce: Duration,
    factory: Arc<dyn NodeFactory>,
    addressing: Arc<dyn AddressingLayer>,
}

impl NodeHostBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self::from_config(&HostConfig::default())
    }

    /// Start from the `[host]` section of the settings.
    pub fn from_config(config: &HostConfig) -> Self {
        Self {
            root: config.root.clone(),
            other_roots: config.other_roots.clone(),
            recipes_root: config.recipes_root.clone(),
            includes: config.include.clone(),
            excludes: config.exclude.clone(),
            interval: config.maintenance_interval(),
            watch_roots: config.watch_roots,
            debounce: config.debounce(),
            factory: Arc::new(DynamicNodeFactory),
            addressing: Arc::new(NoopAddressing),
        }
    }

    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn other_roots(mut self, roots: Vec<PathBuf>) -> Self {
        self.other_roots = roots;
        self
    }

    pub fn recipes_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.recipes_root = root.into();
        self
    }

    pub fn filters(mut self, includes: Vec<String>, excludes: Vec<String>) -> Self {
        self.includes = includes;
        self.excludes = excludes;
        self
    }

    pub fn maintenance_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Watch the roots and tick early after changes settle.
    pub fn watch_roots(mut self, enabled: bool, debounce: Duration) -> Self {
        self.watch_roots = enabled;
        self.debounce = debounce;
        self
    }

    pub fn factory(mut self, factory: impl NodeFactory + 'static) -> Self {
        self.factory = Arc::new(factory);
        self
    }

    pub fn addressing(mut self, addressing: Arc<dyn AddressingLayer>) -> Self {
        self.addressing = addressing;
        self
    }

    /// Build the host. No directory is touched until the first tick.
    pub fn build(self) -> NodeHost {
        let root = std::path::absolute(&self.root).unwrap_or(self.root);
        let filters = HostingFilters::new(self.includes, self.excludes);

        NodeHost {
            inner: Arc::new(HostInner {
                root,
                other_roots: RwLock::new(self.other_roots),
                recipes: Recipes::new(self.recipes_root),
                filters: RwLock::new(Arc::new(filters)),
                live: ReentrantMutex::new(RefCell::new(LiveRegistry::default())),
                closed: AtomicBool::new(false),
                node_count: AtomicUsize::new(0),
                factory: self.factory,
                addressing: self.addressing,
                interval: self.interval,
                wake: Arc::new(Notify::new()),
                watch_roots: self.watch_roots,
                debounce: self.debounce,
                task: Mutex::new(None),
                watcher: Mutex::new(None),
                runtime: Mutex::new(None),
            }),
        }
    }
}

impl Default for NodeHostBuilder {
    fn default() -> Self {
        Self::new()
    }
}
