//! Maintenance tick, create/rename and shutdown scenarios against real folders.

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock, mpsc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use tempfile::TempDir;

use nodehost::capability::{Capabilities, CapabilityRegistry};
use nodehost::host::{AddressingLayer, HostError, NodeHost};
use nodehost::node::{Node, NodeError, NodeResult, NodeState};
use nodehost::LogicalName;

/// Node that records what the host did to it.
struct TestNode {
    name: LogicalName,
    folder: PathBuf,
    registry: CapabilityRegistry,
    closes: AtomicUsize,
    faults: Mutex<Vec<String>>,
    fail_close: bool,
}

impl Capabilities for TestNode {
    fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }
}

impl Node for TestNode {
    fn name(&self) -> &LogicalName {
        &self.name
    }

    fn folder(&self) -> &Path {
        &self.folder
    }

    fn state(&self) -> NodeState {
        if self.closes.load(Ordering::SeqCst) > 0 {
            NodeState::Closed
        } else {
            NodeState::Running
        }
    }

    fn close(&self) -> NodeResult<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        if self.fail_close {
            return Err(NodeError::Close {
                name: self.name.to_string(),
                reason: "device unreachable".to_string(),
            });
        }
        Ok(())
    }

    fn notify_of_error(&self, error: &(dyn Error + Send + Sync + 'static)) {
        self.faults.lock().push(error.to_string());
    }
}

type Created = Arc<Mutex<Vec<Arc<TestNode>>>>;

/// Host over `<temp>/nodes` whose factory keeps every node it builds.
fn recording_host(temp: &TempDir, fail_close: bool) -> (NodeHost, Created) {
    let created: Created = Arc::new(Mutex::new(Vec::new()));
    let sink = created.clone();

    let host = NodeHost::builder()
        .root(temp.path().join("nodes"))
        .recipes_root(temp.path().join("recipes"))
        .factory(move |name: LogicalName, folder: &Path| -> NodeResult<Arc<dyn Node>> {
            let node = Arc::new(TestNode {
                registry: CapabilityRegistry::new(name.clone()),
                name,
                folder: folder.to_path_buf(),
                closes: AtomicUsize::new(0),
                faults: Mutex::new(Vec::new()),
                fail_close,
            });
            sink.lock().push(node.clone());
            Ok(node)
        })
        .build();

    (host, created)
}

fn mkdirs(root: &Path, names: &[&str]) {
    for name in names {
        fs::create_dir_all(root.join(name)).unwrap();
    }
}

fn names(host: &NodeHost) -> Vec<String> {
    host.node_names().iter().map(|n| n.original().to_string()).collect()
}

#[test]
fn test_second_tick_without_changes_is_quiet() {
    let temp = TempDir::new().unwrap();
    let (host, _) = recording_host(&temp, false);
    mkdirs(&temp.path().join("nodes"), &["Lobby", "Kitchen", "Office %231"]);

    let first = host.run_maintenance();
    assert_eq!(first.admitted.len(), 3);

    let second = host.run_maintenance();
    assert!(second.is_quiet(), "unexpected changes: {second:?}");
    assert_eq!(host.node_count(), 3);
}

#[test]
fn test_nodes_are_admitted_in_scan_order() {
    let temp = TempDir::new().unwrap();
    let (host, _) = recording_host(&temp, false);
    mkdirs(&temp.path().join("nodes"), &["Zeta", "Alpha", "Mid"]);

    host.run_maintenance();
    assert_eq!(names(&host), vec!["Alpha", "Mid", "Zeta"]);
}

#[test]
fn test_first_match_wins_within_root() {
    let temp = TempDir::new().unwrap();
    let (host, _) = recording_host(&temp, false);
    let root = temp.path().join("nodes");
    mkdirs(&root, &["Front Door", "front-door"]);

    host.run_maintenance();

    assert_eq!(host.node_count(), 1);
    let node = host.node(&LogicalName::new("frontdoor")).unwrap();
    assert_eq!(node.folder(), root.join("Front Door"));

    // The loser takes over once the winner disappears
    fs::remove_dir(root.join("Front Door")).unwrap();
    let report = host.run_maintenance();
    assert_eq!(report.retired.len(), 1);
    assert_eq!(report.admitted.len(), 1);
    let node = host.node(&LogicalName::new("Front Door")).unwrap();
    assert_eq!(node.folder(), root.join("front-door"));
}

#[test]
fn test_case_variants_resolve_to_uppercase_first() {
    let temp = TempDir::new().unwrap();
    let (host, _) = recording_host(&temp, false);
    let root = temp.path().join("nodes");
    mkdirs(&root, &["A", "a"]);

    // Case-insensitive filesystems hold only one of them
    let distinct = fs::read_dir(&root).unwrap().count() == 2;

    host.run_maintenance();
    assert_eq!(host.node_count(), 1);
    if distinct {
        let node = host.node(&LogicalName::new("a")).unwrap();
        assert_eq!(node.folder(), root.join("A"));
    }
}

#[test]
fn test_primary_root_beats_secondary() {
    let temp = TempDir::new().unwrap();
    let (host, _) = recording_host(&temp, false);
    let primary = temp.path().join("nodes");
    let shared = temp.path().join("shared");
    mkdirs(&primary, &["Lobby"]);
    mkdirs(&shared, &["lobby!", "Projector"]);

    host.set_other_roots(vec![shared.clone()]);
    host.run_maintenance();

    assert_eq!(names(&host), vec!["Lobby", "Projector"]);
    assert_eq!(host.node(&LogicalName::new("lobby")).unwrap().folder(), primary.join("Lobby"));
    assert_eq!(host.roots(), vec![host.root().to_path_buf(), shared]);
}

#[test]
fn test_reserved_and_filtered_folders_are_ignored() {
    let temp = TempDir::new().unwrap();
    let (host, _) = recording_host(&temp, false);
    mkdirs(
        &temp.path().join("nodes"),
        &[".git", "_trash", "New folder", "---", "KitchenTest", "Kitchen1", "Bedroom"],
    );

    host.set_hosting_filters(vec!["Kitchen*".into()], vec!["*Test".into()]);
    host.run_maintenance();

    assert_eq!(names(&host), vec!["Kitchen1"]);
}

#[test]
fn test_filter_change_retires_excluded_nodes() {
    let temp = TempDir::new().unwrap();
    let (host, created) = recording_host(&temp, false);
    mkdirs(&temp.path().join("nodes"), &["Lobby", "Kitchen"]);
    host.run_maintenance();

    host.set_hosting_filters(vec![], vec!["lob*".into()]);
    let report = host.run_maintenance();

    assert_eq!(report.retired, vec![LogicalName::new("Lobby")]);
    assert_eq!(names(&host), vec!["Kitchen"]);
    let lobby = created.lock().iter().find(|n| n.name.original() == "Lobby").cloned().unwrap();
    assert_eq!(lobby.state(), NodeState::Closed);
}

#[test]
fn test_failing_factory_is_retried_next_tick() {
    let temp = TempDir::new().unwrap();
    mkdirs(&temp.path().join("nodes"), &["Flaky", "Steady"]);

    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = attempts.clone();
    let host = NodeHost::builder()
        .root(temp.path().join("nodes"))
        .factory(move |name: LogicalName, folder: &Path| -> NodeResult<Arc<dyn Node>> {
            if name.reduced() == "flaky" && counter.fetch_add(1, Ordering::SeqCst) == 0 {
                return Err(NodeError::Startup {
                    name: name.to_string(),
                    reason: "script failed to load".to_string(),
                });
            }
            Ok(Arc::new(nodehost::DynamicNode::open(name, folder)?))
        })
        .build();

    let first = host.run_maintenance();
    assert_eq!(first.admitted, vec![LogicalName::new("Steady")]);
    assert_eq!(first.failed.len(), 1);
    assert!(first.failed[0].1.contains("script failed to load"));
    assert_eq!(host.node_count(), 1);

    let second = host.run_maintenance();
    assert_eq!(second.admitted, vec![LogicalName::new("Flaky")]);
    assert_eq!(host.node_count(), 2);
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[test]
fn test_panicking_factory_does_not_stop_the_tick() {
    let temp = TempDir::new().unwrap();
    mkdirs(&temp.path().join("nodes"), &["Boom", "Calm"]);

    let host = NodeHost::builder()
        .root(temp.path().join("nodes"))
        .factory(|name: LogicalName, folder: &Path| -> NodeResult<Arc<dyn Node>> {
            if name.reduced() == "boom" {
                panic!("constructor exploded");
            }
            Ok(Arc::new(nodehost::DynamicNode::open(name, folder)?))
        })
        .build();

    let report = host.run_maintenance();
    assert_eq!(report.admitted, vec![LogicalName::new("Calm")]);
    assert_eq!(report.failed.len(), 1);
    assert!(report.failed[0].1.contains("constructor exploded"));

    // Still retried, still contained
    let report = host.run_maintenance();
    assert_eq!(report.failed.len(), 1);
    assert_eq!(host.node_count(), 1);
}

#[test]
fn test_close_failure_still_removes_node() {
    let temp = TempDir::new().unwrap();
    let (host, created) = recording_host(&temp, true);
    let root = temp.path().join("nodes");
    mkdirs(&root, &["Lobby", "Kitchen"]);
    host.run_maintenance();

    fs::remove_dir(root.join("Lobby")).unwrap();
    fs::remove_dir(root.join("Kitchen")).unwrap();
    let report = host.run_maintenance();

    assert_eq!(report.retired.len(), 2);
    assert_eq!(host.node_count(), 0);
    assert!(host.live_folders().is_empty());
    assert!(created.lock().iter().all(|n| n.closes.load(Ordering::SeqCst) == 1));
}

#[test]
fn test_new_node_appears_on_next_tick() {
    let temp = TempDir::new().unwrap();
    let (host, _) = recording_host(&temp, false);

    let folder = host.new_node(None, "Office #1/2").unwrap();
    assert_eq!(folder, host.root().join("Office #1%2F2"));
    assert!(folder.is_dir());
    assert_eq!(host.node_count(), 0, "no direct registry insertion");

    host.run_maintenance();
    let node = host.node(&LogicalName::new("Office #1/2")).unwrap();
    assert_eq!(node.name().original(), "Office #1/2");
}

#[test]
fn test_new_node_conflicts() {
    let temp = TempDir::new().unwrap();
    let (host, _) = recording_host(&temp, false);
    let shared = temp.path().join("shared");
    mkdirs(&shared, &["Projector"]);
    host.set_other_roots(vec![shared]);
    host.run_maintenance();

    // Live in another root
    let err = host.new_node(None, "PROJECTOR").unwrap_err();
    assert!(matches!(err, HostError::NameConflict { .. }));

    // Folder exists but is not live yet
    host.new_node(None, "Lobby").unwrap();
    let err = host.new_node(None, "Lobby").unwrap_err();
    assert!(matches!(err, HostError::NameConflict { .. }));
}

#[test]
fn test_new_node_filter_rejection_names_the_rule() {
    let temp = TempDir::new().unwrap();
    let (host, _) = recording_host(&temp, false);
    host.set_hosting_filters(vec!["Kitchen*".into()], vec!["*Test".into()]);

    let err = host.new_node(None, "KitchenTest").unwrap_err();
    let message = err.to_string();
    assert!(matches!(err, HostError::FilterRejection { .. }));
    assert!(message.contains(r#"["Kitchen*"]"#), "{message}");
    assert!(message.contains(r#"["*Test"]"#), "{message}");
    assert!(!host.root().join("KitchenTest").exists());

    assert!(host.new_node(None, "Kitchen1").is_ok());
}

#[test]
fn test_new_node_from_recipe() {
    let temp = TempDir::new().unwrap();
    let (host, _) = recording_host(&temp, false);
    let recipe = temp.path().join("recipes/Projector");
    fs::create_dir_all(recipe.join("content")).unwrap();
    fs::write(recipe.join("script.py"), "# projector").unwrap();
    fs::write(recipe.join("content/index.htm"), "<html/>").unwrap();

    let folder = host.new_node(Some("Projector"), "Hall Projector").unwrap();
    assert_eq!(fs::read_to_string(folder.join("script.py")).unwrap(), "# projector");
    assert!(folder.join("content/index.htm").is_file());

    let err = host.new_node(Some("Missing"), "Hall Display").unwrap_err();
    assert!(matches!(err, HostError::RecipeNotFound { ref recipe } if recipe == "Missing"));
    assert!(!host.root().join("Hall Display").exists());
}

#[test]
fn test_rename_node_moves_registry_on_next_tick() {
    let temp = TempDir::new().unwrap();
    let (host, created) = recording_host(&temp, false);
    let root = temp.path().join("nodes");
    mkdirs(&root, &["Lobby", "Kitchen"]);
    host.run_maintenance();

    let old = host.node(&LogicalName::new("Lobby")).unwrap().folder().to_path_buf();
    let target = host.rename_node(&old, "Foyer").unwrap();
    assert_eq!(target, old.with_file_name("Foyer"));

    let report = host.run_maintenance();
    assert_eq!(report.retired, vec![LogicalName::new("Lobby")]);
    assert_eq!(report.admitted, vec![LogicalName::new("Foyer")]);
    let lobby = created.lock().iter().find(|n| n.name.original() == "Lobby").cloned().unwrap();
    assert_eq!(lobby.state(), NodeState::Closed);

    // Renaming onto a live name is refused
    let err = host.rename_node(&target, "kitchen").unwrap_err();
    assert!(matches!(err, HostError::NameConflict { .. }));
}

#[test]
fn test_rename_to_new_spelling_of_same_name() {
    let temp = TempDir::new().unwrap();
    let (host, _) = recording_host(&temp, false);
    let root = temp.path().join("nodes");
    mkdirs(&root, &["front door"]);
    host.run_maintenance();

    let target = host.rename_node(&host.root().join("front door"), "Front-Door").unwrap();
    assert!(target.is_dir());

    host.run_maintenance();
    let node = host.node(&LogicalName::new("frontdoor")).unwrap();
    assert_eq!(node.name().original(), "Front-Door");
}

#[test]
fn test_name_registration_fault_delivery() {
    let temp = TempDir::new().unwrap();
    let (host, created) = recording_host(&temp, false);
    mkdirs(&temp.path().join("nodes"), &["Lobby"]);
    host.run_maintenance();

    let clash = std::io::Error::other("name 'Lobby' already advertised by 10.0.0.7");
    host.handle_name_registration_fault(&LogicalName::new("lobby"), &clash);
    // Not live: dropped
    host.handle_name_registration_fault(&LogicalName::new("Gone"), &clash);

    let faults = created.lock()[0].faults.lock().clone();
    assert_eq!(faults, vec!["name 'Lobby' already advertised by 10.0.0.7"]);
}

#[test]
fn test_nodes_may_call_back_into_the_host() {
    let temp = TempDir::new().unwrap();
    mkdirs(&temp.path().join("nodes"), &["Alpha", "Beta"]);

    let slot: Arc<OnceLock<NodeHost>> = Arc::new(OnceLock::new());
    let seen: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));
    let created: Created = Arc::new(Mutex::new(Vec::new()));

    let (host_slot, live_counts, sink) = (slot.clone(), seen.clone(), created.clone());
    let host = NodeHost::builder()
        .root(temp.path().join("nodes"))
        .factory(move |name: LogicalName, folder: &Path| -> NodeResult<Arc<dyn Node>> {
            // Registering the name clashes with the node admitted before it
            if let Some(host) = host_slot.get() {
                live_counts.lock().push(host.node_names().len());
                let clash = std::io::Error::other(format!("'{name}' clashes with Alpha"));
                host.handle_name_registration_fault(&LogicalName::new("Alpha"), &clash);
            }
            let node = Arc::new(TestNode {
                registry: CapabilityRegistry::new(name.clone()),
                name,
                folder: folder.to_path_buf(),
                closes: AtomicUsize::new(0),
                faults: Mutex::new(Vec::new()),
                fail_close: false,
            });
            sink.lock().push(node.clone());
            Ok(node)
        })
        .build();
    assert!(slot.set(host.clone()).is_ok());

    let (done_tx, done_rx) = mpsc::channel();
    let ticking = host.clone();
    thread::spawn(move || {
        let report = ticking.run_maintenance();
        let _ = done_tx.send(report.admitted.len());
    });

    let admitted = done_rx
        .recv_timeout(Duration::from_secs(5))
        .expect("tick finishes while nodes call back into the host");
    assert_eq!(admitted, 2);
    assert_eq!(*seen.lock(), vec![0, 1]);

    let created = created.lock();
    assert_eq!(*created[0].faults.lock(), vec!["'Beta' clashes with Alpha"]);
    assert!(created[1].faults.lock().is_empty());
}

/// Node whose close shuts the whole host down from inside the tick.
struct ShutdownOnClose {
    inner: TestNode,
    host: Arc<OnceLock<NodeHost>>,
}

impl Capabilities for ShutdownOnClose {
    fn registry(&self) -> &CapabilityRegistry {
        &self.inner.registry
    }
}

impl Node for ShutdownOnClose {
    fn name(&self) -> &LogicalName {
        &self.inner.name
    }

    fn folder(&self) -> &Path {
        &self.inner.folder
    }

    fn state(&self) -> NodeState {
        self.inner.state()
    }

    fn close(&self) -> NodeResult<()> {
        if let Some(host) = self.host.get() {
            host.shutdown();
        }
        self.inner.close()
    }

    fn notify_of_error(&self, error: &(dyn Error + Send + Sync + 'static)) {
        self.inner.notify_of_error(error)
    }
}

#[test]
fn test_shutdown_from_a_closing_node() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("nodes");
    mkdirs(&root, &["Lobby", "Kitchen"]);

    let slot: Arc<OnceLock<NodeHost>> = Arc::new(OnceLock::new());
    let host_slot = slot.clone();
    let host = NodeHost::builder()
        .root(&root)
        .factory(move |name: LogicalName, folder: &Path| -> NodeResult<Arc<dyn Node>> {
            Ok(Arc::new(ShutdownOnClose {
                inner: TestNode {
                    registry: CapabilityRegistry::new(name.clone()),
                    name,
                    folder: folder.to_path_buf(),
                    closes: AtomicUsize::new(0),
                    faults: Mutex::new(Vec::new()),
                    fail_close: false,
                },
                host: host_slot.clone(),
            }))
        })
        .build();
    assert!(slot.set(host.clone()).is_ok());
    host.run_maintenance();
    let kitchen = host.node(&LogicalName::new("Kitchen")).unwrap();

    // Retiring Lobby shuts the host down, which closes Kitchen too
    fs::remove_dir(root.join("Lobby")).unwrap();
    fs::create_dir(root.join("Foyer")).unwrap();
    let report = host.run_maintenance();

    assert_eq!(report.retired, vec![LogicalName::new("Lobby")]);
    assert!(report.admitted.is_empty());
    assert!(host.is_closed());
    assert_eq!(host.node_count(), 0);
    assert_eq!(kitchen.state(), NodeState::Closed);
}

#[derive(Default)]
struct RecordingAddressing {
    rules: Mutex<Vec<String>>,
    shutdowns: AtomicUsize,
}

impl AddressingLayer for RecordingAddressing {
    fn hosting_rule_changed(&self, rule: &str) {
        self.rules.lock().push(rule.to_string());
    }

    fn shutdown(&self) {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn test_shutdown_closes_everything_once() {
    let temp = TempDir::new().unwrap();
    let addressing = Arc::new(RecordingAddressing::default());
    let created: Created = Arc::new(Mutex::new(Vec::new()));
    let sink = created.clone();
    let host = NodeHost::builder()
        .root(temp.path().join("nodes"))
        .addressing(addressing.clone())
        .factory(move |name: LogicalName, folder: &Path| -> NodeResult<Arc<dyn Node>> {
            let node = Arc::new(TestNode {
                registry: CapabilityRegistry::new(name.clone()),
                name,
                folder: folder.to_path_buf(),
                closes: AtomicUsize::new(0),
                faults: Mutex::new(Vec::new()),
                fail_close: false,
            });
            sink.lock().push(node.clone());
            Ok(node)
        })
        .build();
    mkdirs(&temp.path().join("nodes"), &["Lobby", "Kitchen"]);
    host.run_maintenance();

    host.set_hosting_filters(vec!["*".into()], vec![]);
    assert_eq!(*addressing.rules.lock(), vec![r#"Include ["*"], exclude nothing"#]);

    host.shutdown();
    host.shutdown();

    assert!(host.is_closed());
    assert_eq!(host.node_count(), 0);
    assert!(host.node_names().is_empty());
    assert!(created.lock().iter().all(|n| n.closes.load(Ordering::SeqCst) == 1));
    assert_eq!(addressing.shutdowns.load(Ordering::SeqCst), 1);

    // Nothing happens after shutdown
    assert!(host.run_maintenance().is_quiet());
    assert!(matches!(host.new_node(None, "Foyer"), Err(HostError::Closed)));
    assert!(matches!(host.start(), Err(HostError::Closed)));
}

async fn wait_for(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    false
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_maintenance_loop_follows_the_filesystem() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("nodes");
    mkdirs(&root, &["Lobby"]);

    let host = NodeHost::builder()
        .root(&root)
        .maintenance_interval(Duration::from_millis(50))
        .build();
    host.start().unwrap();
    host.start().unwrap();

    assert!(wait_for(|| host.node_count() == 1).await, "initial tick");

    host.new_node(None, "Kitchen").unwrap();
    assert!(wait_for(|| host.node_count() == 2).await, "created folder picked up");

    fs::remove_dir(root.join("Lobby")).unwrap();
    assert!(wait_for(|| host.node_names() == vec![LogicalName::new("Kitchen")]).await);

    host.shutdown();
    tokio::time::timeout(Duration::from_secs(5), host.stopped())
        .await
        .expect("maintenance loop exits after shutdown");
    assert_eq!(host.node_count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_wake_shortcuts_long_interval() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("nodes");
    fs::create_dir_all(&root).unwrap();

    let host = NodeHost::builder()
        .root(&root)
        .maintenance_interval(Duration::from_secs(3600))
        .build();
    host.start().unwrap();

    // new_node wakes the loop, so the hour-long interval never elapses
    host.new_node(None, "Lobby").unwrap();
    assert!(wait_for(|| host.node_count() == 1).await);

    host.shutdown();
    host.stopped().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_failing_factory_never_stops_the_loop() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("nodes");
    mkdirs(&root, &["Broken"]);

    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = attempts.clone();
    let host = NodeHost::builder()
        .root(&root)
        .maintenance_interval(Duration::from_millis(20))
        .factory(move |name: LogicalName, _: &Path| -> NodeResult<Arc<dyn Node>> {
            if counter.fetch_add(1, Ordering::SeqCst) % 2 == 0 {
                return Err(NodeError::Startup {
                    name: name.to_string(),
                    reason: "driver missing".to_string(),
                });
            }
            panic!("driver crashed")
        })
        .build();
    host.start().unwrap();

    assert!(
        wait_for(|| attempts.load(Ordering::SeqCst) >= 4).await,
        "ticks keep firing after failed constructions"
    );
    assert_eq!(host.node_count(), 0);

    host.shutdown();
    tokio::time::timeout(Duration::from_secs(5), host.stopped())
        .await
        .expect("maintenance loop exits after shutdown");

    let settled = attempts.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(attempts.load(Ordering::SeqCst), settled);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_watcher_follows_added_roots() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("nodes");
    let shared = temp.path().join("shared");
    fs::create_dir_all(&root).unwrap();
    fs::create_dir_all(&shared).unwrap();

    let host = NodeHost::builder()
        .root(&root)
        .maintenance_interval(Duration::from_secs(3600))
        .watch_roots(true, Duration::from_millis(50))
        .build();
    host.start().unwrap();

    host.set_other_roots(vec![shared.clone()]);
    // Let the tick triggered by the root change pass
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(host.node_count(), 0);

    fs::create_dir(shared.join("Projector")).unwrap();
    assert!(
        wait_for(|| host.node_count() == 1).await,
        "folder in the added root is picked up before the interval"
    );

    host.shutdown();
    host.stopped().await;
}
