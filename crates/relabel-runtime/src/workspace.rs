//! Workspace: the buses and actors of one open project.
//!
//! ```text
//!  undo ── EDIT/UNDO/REDO/SET_DISPLAY_DIM/TOGGLE_RGB ──► UndoCoordinator ──SAVE/UNDO/REDO──► HistoryActor ──► SelectionActor
//!                                                         │  ▲
//!                                              requests   │  │ PROJECT_LOADED/LOADED/ERROR
//!                                                         ▼  │
//!  persistence ── cached LOADED ──────────────────────► ApiActor ──► api ──┬──► OverlapsActor ──► overlaps
//!       ▲                                                                   ├──► HoveringActor ──► hover ──► DivisionEditor
//!       │                                                                   ├──► DivisionsActor ──► undo          │
//!       │                                                                   ├──► SelectionActor ──► selection     │ SELECT
//!       └──────────────────────── PersistenceActor ◄────────────────────────┘                                     ▼
//!  canvas ── COORDINATES, SET_FRAME, CLICK, SET_CELL, .. ──► domain actors
//! ```
//!
//! Every mailbox is created and every subscription registered before any
//! actor starts, so no actor misses an early publication. Requests reach
//! the API actor only through the undo coordinator, which keeps one in
//! flight at a time.
//!
//! The edit-keyed [`LabelHistoryActor`](crate::LabelHistoryActor) is not
//! part of this wiring: the label service keeps its own edit history, and
//! selection is the only local state checkpointed here.

use crate::api::{ApiActor, LabelService};
use crate::domain::{DivisionEditor, DivisionsActor, HoveringActor, OverlapsActor, SelectionActor};
use crate::history::{HistoryActor, DEFAULT_RESTORE_TIMEOUT};
use crate::persistence::{PersistenceActor, ProjectStore};
use crate::runner::{spawn_actor, ActorHandle};
use crate::undo::UndoCoordinator;
use crate::EventBus;
use relabel_actor::{mailbox, ActorError, ActorRef, Mailbox};
use relabel_event::{Message, MessageKind};
use relabel_types::{ActorId, BusId, ProjectId};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Bus names used by a workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buses {
    /// Requests to the API actor.
    pub requests: BusId,
    /// API outcomes: `LOADING`, `LOADED`, `PROJECT_LOADED`, `EDITED`, `ERROR`.
    pub api: BusId,
    /// User intents: `EDIT`, `UNDO`, `REDO`, `SET_DISPLAY_DIM`, `TOGGLE_RGB`.
    pub undo: BusId,
    /// Cursor, frame, click and selection commands.
    pub canvas: BusId,
    /// `HOVERING`.
    pub hover: BusId,
    /// `OVERLAPS`.
    pub overlaps: BusId,
    /// `SELECTED`.
    pub selection: BusId,
    /// Cache events: `LOADED` (cache hit), `PROJECT_NOT_IN_DB`, `ERROR`.
    pub persistence: BusId,
}

impl Default for Buses {
    fn default() -> Self {
        Self {
            requests: BusId::new("requests"),
            api: BusId::new("api"),
            undo: BusId::new("undo"),
            canvas: BusId::new("canvas"),
            hover: BusId::new("hover"),
            overlaps: BusId::new("overlaps"),
            selection: BusId::new("selection"),
            persistence: BusId::new("persistence"),
        }
    }
}

/// Workspace settings.
#[derive(Debug, Clone)]
pub struct WorkspaceOptions {
    /// Restore acknowledgment window of the history actors.
    pub restore_timeout: Duration,
    /// Bus names.
    pub buses: Buses,
}

impl Default for WorkspaceOptions {
    fn default() -> Self {
        Self {
            restore_timeout: DEFAULT_RESTORE_TIMEOUT,
            buses: Buses::default(),
        }
    }
}

/// Running actors for one project.
#[derive(Debug)]
pub struct Workspace {
    project: ProjectId,
    bus: Arc<EventBus>,
    buses: Buses,
    handles: Vec<ActorHandle>,
}

struct Slot {
    actor: ActorRef,
    inbox: Mailbox,
}

impl Slot {
    fn new(name: &str) -> Self {
        let (actor, inbox) = mailbox(ActorId::named(name));
        Self { actor, inbox }
    }
}

impl Workspace {
    /// Wires and starts every actor for `project`.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::NoRuntime`] outside a tokio runtime.
    pub fn start<S, P>(
        project: ProjectId,
        service: Arc<S>,
        store: Arc<P>,
        options: WorkspaceOptions,
    ) -> Result<Self, ActorError>
    where
        S: LabelService,
        P: ProjectStore,
    {
        let bus = Arc::new(EventBus::new());
        let b = options.buses;
        use MessageKind as K;

        let api = Slot::new("api");
        let coordinator = Slot::new("undo-coordinator");
        let history = Slot::new("selection-history");
        let selection = Slot::new("selection");
        let hovering = Slot::new("hovering");
        let overlaps = Slot::new("overlaps");
        let editor = Slot::new("division-editor");
        let divisions = Slot::new("divisions");
        let persistence = Slot::new("persistence");

        bus.subscribe(&b.requests, &api.actor);
        bus.subscribe_filtered(&b.persistence, &api.actor, &[K::Loaded]);

        bus.subscribe_filtered(
            &b.undo,
            &coordinator.actor,
            &[K::Edit, K::Undo, K::Redo, K::SetDisplayDim, K::ToggleRgb],
        );
        bus.subscribe_filtered(
            &b.api,
            &coordinator.actor,
            &[K::ProjectLoaded, K::Loaded, K::Error],
        );

        bus.subscribe_filtered(&b.api, &selection.actor, &[K::ProjectLoaded, K::Loaded]);
        bus.subscribe_filtered(&b.hover, &selection.actor, &[K::Hovering]);
        bus.subscribe_filtered(
            &b.canvas,
            &selection.actor,
            &[K::SetCell, K::Select, K::ResetCell, K::NextCell, K::PrevCell],
        );

        bus.subscribe_filtered(
            &b.canvas,
            &hovering.actor,
            &[K::Coordinates, K::SetFrame, K::LabeledArray],
        );
        bus.subscribe_filtered(&b.overlaps, &hovering.actor, &[K::Overlaps]);
        bus.subscribe_filtered(
            &b.api,
            &hovering.actor,
            &[K::ProjectLoaded, K::Loaded, K::Edited],
        );

        bus.subscribe_filtered(&b.api, &overlaps.actor, &[K::ProjectLoaded, K::Loaded, K::Edited]);
        bus.subscribe_filtered(&b.canvas, &overlaps.actor, &[K::Refresh]);

        bus.subscribe_filtered(&b.hover, &editor.actor, &[K::Hovering]);
        bus.subscribe_filtered(
            &b.canvas,
            &editor.actor,
            &[K::Click, K::SetFrame, K::AddDaughterMode, K::Reset],
        );

        bus.subscribe_filtered(&b.api, &divisions.actor, &[K::ProjectLoaded, K::Loaded]);

        bus.subscribe_filtered(&b.api, &persistence.actor, &[K::ProjectLoaded, K::Edited]);

        let mut handles = Vec::with_capacity(9);
        handles.push(spawn_actor(
            HistoryActor::new(selection.actor.clone(), coordinator.actor.clone())
                .with_restore_timeout(options.restore_timeout),
            history.actor.clone(),
            history.inbox,
            Arc::clone(&bus),
        )?);
        handles.push(spawn_actor(
            UndoCoordinator::new(vec![history.actor], b.requests.clone()),
            coordinator.actor,
            coordinator.inbox,
            Arc::clone(&bus),
        )?);
        handles.push(spawn_actor(
            SelectionActor::new(b.selection.clone()),
            selection.actor.clone(),
            selection.inbox,
            Arc::clone(&bus),
        )?);
        handles.push(spawn_actor(
            HoveringActor::new(b.hover.clone()),
            hovering.actor,
            hovering.inbox,
            Arc::clone(&bus),
        )?);
        handles.push(spawn_actor(
            OverlapsActor::new(b.overlaps.clone()),
            overlaps.actor,
            overlaps.inbox,
            Arc::clone(&bus),
        )?);
        handles.push(spawn_actor(
            DivisionEditor::new(selection.actor, divisions.actor.clone()),
            editor.actor,
            editor.inbox,
            Arc::clone(&bus),
        )?);
        handles.push(spawn_actor(
            DivisionsActor::new(b.undo.clone()),
            divisions.actor,
            divisions.inbox,
            Arc::clone(&bus),
        )?);
        handles.push(spawn_actor(
            PersistenceActor::new(project.clone(), store, b.persistence.clone()),
            persistence.actor,
            persistence.inbox,
            Arc::clone(&bus),
        )?);
        handles.push(spawn_actor(
            ApiActor::new(project.clone(), service, b.api.clone()),
            api.actor,
            api.inbox,
            Arc::clone(&bus),
        )?);

        info!(%project, actors = handles.len(), "workspace started");
        Ok(Self {
            project,
            bus,
            buses: b,
            handles,
        })
    }

    /// Project this workspace edits.
    #[must_use]
    pub fn project(&self) -> &ProjectId {
        &self.project
    }

    /// Bus names.
    #[must_use]
    pub fn buses(&self) -> &Buses {
        &self.buses
    }

    /// Shared event bus.
    #[must_use]
    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// Subscribes a fresh mailbox to `kinds` on `bus` (all kinds if empty).
    ///
    /// The subscription ends when the mailbox is dropped. To see the first
    /// `PROJECT_LOADED`, observe before the runtime gets a chance to run
    /// the API actor (on a current-thread runtime: before the next await).
    #[must_use]
    pub fn observe(&self, bus: &BusId, kinds: &[MessageKind]) -> Mailbox {
        let (observer, inbox) = mailbox(ActorId::new("observer"));
        if kinds.is_empty() {
            self.bus.subscribe(bus, &observer);
        } else {
            self.bus.subscribe_filtered(bus, &observer, kinds);
        }
        inbox
    }

    /// Publishes `message` on `bus`.
    pub fn publish(&self, bus: &BusId, message: Message) -> usize {
        self.bus.publish(bus, message)
    }

    /// Requests an edit through the undo coordinator.
    pub fn edit(&self, action: impl Into<String>, args: BTreeMap<String, String>) {
        self.publish(
            &self.buses.undo,
            Message::Edit {
                action: action.into(),
                args,
            },
        );
    }

    /// Requests an undo through the undo coordinator.
    pub fn undo(&self) {
        self.publish(&self.buses.undo, Message::Undo);
    }

    /// Requests a redo through the undo coordinator.
    pub fn redo(&self) {
        self.publish(&self.buses.undo, Message::Redo);
    }

    /// Asks the API actor, through the undo coordinator, to change a
    /// display dimension.
    pub fn set_display(&self, dimension: impl Into<String>, value: usize) {
        self.publish(
            &self.buses.undo,
            Message::SetDisplayDim {
                dimension: dimension.into(),
                value,
            },
        );
    }

    /// Asks the API actor, through the undo coordinator, to toggle RGB mode.
    pub fn toggle_rgb(&self) {
        self.publish(&self.buses.undo, Message::ToggleRgb);
    }

    /// Stops every actor.
    pub async fn shutdown(self) {
        for handle in self.handles {
            handle.stop().await;
        }
        info!(project = %self.project, "workspace stopped");
    }
}
