//! Full workspace wiring with an in-process label service.

mod common;

use common::next_of;
use parking_lot::Mutex;
use relabel_event::{LineageEntry, Message, MessageKind, Project, ProjectDelta};
use relabel_runtime::api::{ApiError, LabelService};
use relabel_runtime::persistence::MemoryStore;
use relabel_runtime::{Workspace, WorkspaceOptions};
use relabel_types::{CellId, ProjectId};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Default)]
struct FakeService {
    project: Project,
    calls: Mutex<Vec<String>>,
    fail_edits: AtomicBool,
    load_delay: Duration,
    display_delay: Duration,
}

impl FakeService {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().push(call);
    }
}

impl LabelService for FakeService {
    async fn load_project(&self, _project: &ProjectId) -> Result<Project, ApiError> {
        self.record("load".into());
        tokio::time::sleep(self.load_delay).await;
        Ok(self.project.clone())
    }

    async fn edit(
        &self,
        _project: &ProjectId,
        action: &str,
        args: &BTreeMap<String, String>,
    ) -> Result<ProjectDelta, ApiError> {
        let args: Vec<_> = args.iter().map(|(k, v)| format!("{k}={v}")).collect();
        self.record(format!("edit:{action}:{}", args.join(",")));
        if self.fail_edits.load(Ordering::SeqCst) {
            return Err(ApiError::rejected(500, r#"{"error":"bad arg"}"#));
        }
        Ok(ProjectDelta::default())
    }

    async fn undo(&self, _project: &ProjectId) -> Result<ProjectDelta, ApiError> {
        self.record("undo".into());
        Ok(ProjectDelta::default())
    }

    async fn redo(&self, _project: &ProjectId) -> Result<ProjectDelta, ApiError> {
        self.record("redo".into());
        Ok(ProjectDelta::default())
    }

    async fn change_display(
        &self,
        _project: &ProjectId,
        dimension: &str,
        value: usize,
    ) -> Result<ProjectDelta, ApiError> {
        self.record(format!("display:{dimension}:{value}"));
        tokio::time::sleep(self.display_delay).await;
        Ok(ProjectDelta::default())
    }

    async fn toggle_rgb(&self, _project: &ProjectId, rgb: bool) -> Result<ProjectDelta, ApiError> {
        self.record(format!("rgb:{rgb}"));
        Ok(ProjectDelta::default())
    }
}

fn pid() -> ProjectId {
    "embryo-3".parse().unwrap()
}

fn lineage_project() -> Project {
    let mut lineage = BTreeMap::new();
    lineage.insert(
        CellId(1),
        LineageEntry {
            daughters: vec![CellId(2), CellId(3)],
            frames: vec![0, 1],
            ..LineageEntry::default()
        },
    );
    lineage.insert(CellId(2), LineageEntry::default());
    lineage.insert(CellId(3), LineageEntry::default());
    Project {
        lineage,
        ..Project::default()
    }
}

struct Rig {
    ws: Workspace,
    service: Arc<FakeService>,
    store: Arc<MemoryStore>,
}

/// Starts a workspace without waiting for anything.
fn start(service: FakeService, store: MemoryStore) -> Rig {
    let service = Arc::new(service);
    let store = Arc::new(store);
    let ws = Workspace::start(
        pid(),
        Arc::clone(&service),
        Arc::clone(&store),
        WorkspaceOptions::default(),
    )
    .unwrap();
    Rig { ws, service, store }
}

/// Starts a workspace and waits for the first load.
async fn rig(service: FakeService) -> (Rig, relabel_actor::Mailbox) {
    let r = start(service, MemoryStore::new());
    let mut api = r.ws.observe(&r.ws.buses().api, &[]);
    next_of(&mut api, MessageKind::ProjectLoaded).await;
    (r, api)
}

/// Lets acknowledgments between actors land before the next intent.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

async fn select(ws: &Workspace, selection: &mut relabel_actor::Mailbox, cell: u32) {
    ws.publish(&ws.buses().canvas, Message::SetCell { cell: CellId(cell) });
    assert_eq!(
        next_of(selection, MessageKind::Selected).await,
        Message::Selected {
            selected: Some(CellId(cell))
        }
    );
}

#[tokio::test]
async fn undo_and_redo_restore_selection() {
    let (r, mut api) = rig(FakeService {
        project: lineage_project(),
        ..FakeService::default()
    })
    .await;
    let mut selection = r.ws.observe(&r.ws.buses().selection, &[MessageKind::Selected]);

    select(&r.ws, &mut selection, 1).await;
    r.ws.edit("swap", BTreeMap::new());
    next_of(&mut api, MessageKind::Loaded).await;

    select(&r.ws, &mut selection, 2).await;
    r.ws.edit("swap", BTreeMap::new());
    next_of(&mut api, MessageKind::Loaded).await;

    r.ws.undo();
    next_of(&mut api, MessageKind::Loaded).await;
    assert_eq!(
        next_of(&mut selection, MessageKind::Selected).await,
        Message::Selected {
            selected: Some(CellId(1))
        }
    );
    settle().await;

    r.ws.redo();
    next_of(&mut api, MessageKind::Loaded).await;
    assert_eq!(
        next_of(&mut selection, MessageKind::Selected).await,
        Message::Selected {
            selected: Some(CellId(2))
        }
    );

    assert_eq!(
        r.service.calls(),
        vec!["load", "edit:swap:", "edit:swap:", "undo", "redo"]
    );
    r.ws.shutdown().await;
}

#[tokio::test]
async fn failed_edit_reports_service_message() {
    let (r, mut api) = rig(FakeService::default()).await;
    r.service.fail_edits.store(true, Ordering::SeqCst);

    r.ws.edit("swap", BTreeMap::new());
    assert_eq!(
        next_of(&mut api, MessageKind::Error).await,
        Message::Error {
            message: "bad arg".into()
        }
    );

    // Nothing was applied, so there is nothing to undo.
    r.service.fail_edits.store(false, Ordering::SeqCst);
    r.ws.undo();
    r.ws.edit("fill", BTreeMap::new());
    next_of(&mut api, MessageKind::Loaded).await;
    assert_eq!(r.service.calls(), vec!["load", "edit:swap:", "edit:fill:"]);
    r.ws.shutdown().await;
}

#[tokio::test]
async fn add_daughter_flows_into_an_edit() {
    let (r, mut api) = rig(FakeService {
        project: lineage_project(),
        ..FakeService::default()
    })
    .await;
    let canvas = r.ws.buses().canvas.clone();
    let mut hover = r.ws.observe(&r.ws.buses().hover, &[]);

    r.ws.publish(&canvas, Message::SetFrame { t: 2 });
    r.ws.publish(
        &canvas,
        Message::AddDaughterMode {
            parent: CellId(1),
        },
    );
    r.ws.publish(
        &r.ws.buses().hover,
        Message::Hovering {
            hovering: [CellId(4)].into(),
        },
    );
    next_of(&mut hover, MessageKind::Hovering).await;
    r.ws.publish(&canvas, Message::Click { modified: false });
    r.ws.publish(&canvas, Message::Click { modified: false });

    next_of(&mut api, MessageKind::Loaded).await;
    assert_eq!(
        r.service.calls(),
        vec!["load", "edit:add_daughter:daughter=4,parent=1,t=2"]
    );
    r.ws.shutdown().await;
}

#[tokio::test]
async fn display_and_rgb_pass_through_the_coordinator() {
    let (r, mut api) = rig(FakeService::default()).await;

    r.ws.set_display("frame", 3);
    next_of(&mut api, MessageKind::Loaded).await;
    r.ws.toggle_rgb();
    next_of(&mut api, MessageKind::Loaded).await;
    r.ws.toggle_rgb();
    next_of(&mut api, MessageKind::Loaded).await;

    assert_eq!(
        r.service.calls(),
        vec!["load", "display:frame:3", "rgb:true", "rgb:false"]
    );
    r.ws.shutdown().await;
}

#[tokio::test]
async fn loaded_project_is_cached() {
    let (r, _api) = rig(FakeService {
        project: lineage_project(),
        ..FakeService::default()
    })
    .await;

    tokio::time::timeout(Duration::from_secs(5), async {
        while r.store.project(&pid()).is_none() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("project written to the store");
    assert_eq!(r.store.project(&pid()), Some(lineage_project()));
    r.ws.shutdown().await;
}

#[tokio::test]
async fn edit_during_display_call_is_not_counted() {
    let (r, mut api) = rig(FakeService {
        display_delay: Duration::from_millis(200),
        ..FakeService::default()
    })
    .await;

    r.ws.set_display("frame", 3);
    r.ws.edit("swap", BTreeMap::new());
    next_of(&mut api, MessageKind::Loaded).await;
    settle().await;

    // The display call was the only request, so there is nothing to undo.
    r.ws.undo();
    settle().await;
    assert_eq!(r.service.calls(), vec!["load", "display:frame:3"]);

    r.ws.edit("swap", BTreeMap::new());
    next_of(&mut api, MessageKind::Loaded).await;
    settle().await;
    r.ws.undo();
    next_of(&mut api, MessageKind::Loaded).await;
    assert_eq!(
        r.service.calls(),
        vec!["load", "display:frame:3", "edit:swap:", "undo"]
    );
    r.ws.shutdown().await;
}

#[tokio::test]
async fn edit_before_first_load_is_sent_after_it() {
    let r = start(
        FakeService {
            load_delay: Duration::from_millis(100),
            ..FakeService::default()
        },
        MemoryStore::new(),
    );
    let mut api = r.ws.observe(&r.ws.buses().api, &[]);

    r.ws.edit("early", BTreeMap::new());
    next_of(&mut api, MessageKind::ProjectLoaded).await;
    next_of(&mut api, MessageKind::Loaded).await;
    settle().await;

    r.ws.edit("fill", BTreeMap::new());
    next_of(&mut api, MessageKind::Loaded).await;
    assert_eq!(
        r.service.calls(),
        vec!["load", "edit:early:", "edit:fill:"]
    );
    r.ws.shutdown().await;
}

#[tokio::test]
async fn cached_copy_resumes_state_before_network_load() {
    let cached = lineage_project();
    let r = start(
        FakeService {
            load_delay: Duration::from_millis(300),
            ..FakeService::default()
        },
        MemoryStore::with_project(pid(), cached.clone()),
    );
    let mut api = r.ws.observe(&r.ws.buses().api, &[]);
    let mut cache = r.ws.observe(&r.ws.buses().persistence, &[]);
    let mut selection = r.ws.observe(&r.ws.buses().selection, &[MessageKind::Selected]);

    let hit = Message::Loaded {
        delta: ProjectDelta::from(cached),
    };
    assert_eq!(next_of(&mut cache, MessageKind::Loaded).await, hit);
    assert_eq!(next_of(&mut api, MessageKind::Loaded).await, hit);

    // Navigation works on the cached lineage while the service is still loading.
    r.ws.publish(&r.ws.buses().canvas, Message::NextCell);
    assert_eq!(
        next_of(&mut selection, MessageKind::Selected).await,
        Message::Selected {
            selected: Some(CellId(1))
        }
    );
    assert!(api.try_recv().is_none());

    next_of(&mut api, MessageKind::ProjectLoaded).await;
    r.ws.shutdown().await;
}
