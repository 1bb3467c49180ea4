//! Persistence actor: mirrors the authoritative project into the store.
//!
//! # State Machine
//!
//! ```text
//!  started ──► OpenStore ──► GetProject ──┬─ hit ──► Idle            (LOADED)
//!                  │ error (as miss)      └─ miss ─► LoadFromNetwork (PROJECT_NOT_IN_DB)
//!                  └──────────────────────────────────────┘ │
//!                                       PROJECT_LOADED      ▼
//!                         Idle ◄── write done ──── PutProject ◄── EDITED / PROJECT_LOADED in Idle
//! ```
//!
//! A `PROJECT_LOADED` that arrives before the lookup finishes is held and
//! applied once it does. Changes that arrive during a write are applied
//! in memory and flushed by one follow-up write.

use super::{ProjectStore, StorageError};
use relabel_actor::{Actor, Context, Input};
use relabel_event::{Message, Project, ProjectDelta};
use relabel_types::{BusId, ErrorCode, ProjectId};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Persistence actor state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistenceState {
    /// Opening the store.
    OpenStore,
    /// Looking up the project.
    GetProject,
    /// Cache miss; waiting for the network copy.
    LoadFromNetwork,
    /// Writing the project.
    PutProject,
    /// Mirrored and settled.
    Idle,
}

/// Completion of a store call.
#[derive(Debug)]
pub enum StoreOutcome {
    /// `open` finished.
    Opened(Result<(), StorageError>),
    /// `get` finished.
    Got(Result<Option<Project>, StorageError>),
    /// `put` finished.
    Put(Result<(), StorageError>),
}

/// Single writer of one project's stored copy.
pub struct PersistenceActor<S: ProjectStore> {
    id: ProjectId,
    store: Arc<S>,
    out: BusId,
    state: PersistenceState,
    project: Option<Arc<Project>>,
    pending: Option<Arc<Project>>,
    dirty: bool,
}

impl<S: ProjectStore> PersistenceActor<S> {
    /// Creates the actor for project `id`, publishing on `out`.
    #[must_use]
    pub fn new(id: ProjectId, store: Arc<S>, out: BusId) -> Self {
        Self {
            id,
            store,
            out,
            state: PersistenceState::OpenStore,
            project: None,
            pending: None,
            dirty: false,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> PersistenceState {
        self.state
    }

    /// Mirrored project, once known.
    #[must_use]
    pub fn project(&self) -> Option<&Project> {
        self.project.as_deref()
    }

    fn get(&mut self, ctx: &mut Context<StoreOutcome>) {
        self.state = PersistenceState::GetProject;
        let (store, id) = (Arc::clone(&self.store), self.id.clone());
        ctx.spawn(async move { StoreOutcome::Got(store.get(&id).await) });
    }

    fn put(&mut self, ctx: &mut Context<StoreOutcome>) {
        let Some(project) = self.project.clone() else {
            return;
        };
        self.state = PersistenceState::PutProject;
        self.dirty = false;
        let (store, id) = (Arc::clone(&self.store), self.id.clone());
        ctx.spawn(async move { StoreOutcome::Put(store.put(&id, &project).await) });
    }

    /// Adopts the network copy and writes it, now or after the current write.
    fn adopt(&mut self, project: Arc<Project>, ctx: &mut Context<StoreOutcome>) {
        self.project = Some(project);
        if self.state == PersistenceState::PutProject {
            self.dirty = true;
        } else {
            self.put(ctx);
        }
    }

    fn on_lookup(&mut self, result: Result<Option<Project>, StorageError>, ctx: &mut Context<StoreOutcome>) {
        match result {
            Ok(Some(project)) => {
                info!(project = %self.id, "cache hit");
                ctx.publish(
                    &self.out,
                    Message::Loaded {
                        delta: ProjectDelta::from(project.clone()),
                    },
                );
                self.project = Some(Arc::new(project));
                self.state = PersistenceState::Idle;
            }
            Ok(None) => self.miss(ctx),
            Err(e) => {
                warn!(project = %self.id, code = e.code(), "cache read failed, treating as miss: {e}");
                self.miss(ctx);
            }
        }
        if let Some(project) = self.pending.take() {
            debug!(project = %self.id, "applying network copy received during lookup");
            self.adopt(project, ctx);
        }
    }

    fn miss(&mut self, ctx: &mut Context<StoreOutcome>) {
        info!(project = %self.id, "project not in local store");
        ctx.publish(&self.out, Message::ProjectNotInDb);
        self.state = PersistenceState::LoadFromNetwork;
    }

    fn on_message(&mut self, message: Message, ctx: &mut Context<StoreOutcome>) {
        match message {
            Message::ProjectLoaded { project } => match self.state {
                PersistenceState::OpenStore | PersistenceState::GetProject => {
                    self.pending = Some(project);
                }
                _ => self.adopt(project, ctx),
            },
            Message::Edited {
                frame,
                feature,
                labeled,
                overlaps,
            } => {
                let target = self.project.as_mut().or(self.pending.as_mut());
                let Some(target) = target else {
                    debug!(project = %self.id, "EDITED before any project ignored");
                    return;
                };
                if let Err(e) = Arc::make_mut(target).patch_slice(frame, feature, labeled, overlaps) {
                    warn!(project = %self.id, "cannot mirror edit: {e}");
                    return;
                }
                match self.state {
                    PersistenceState::Idle => self.put(ctx),
                    PersistenceState::PutProject => self.dirty = true,
                    _ => {}
                }
            }
            _ => {}
        }
    }

    fn on_written(&mut self, result: Result<(), StorageError>, ctx: &mut Context<StoreOutcome>) {
        match result {
            Ok(()) => debug!(project = %self.id, "project written"),
            Err(e) => {
                warn!(project = %self.id, code = e.code(), "write failed: {e}");
                ctx.publish(
                    &self.out,
                    Message::Error {
                        message: e.to_string(),
                    },
                );
            }
        }
        if self.dirty {
            self.put(ctx);
        } else {
            self.state = PersistenceState::Idle;
        }
    }
}

impl<S: ProjectStore> Actor for PersistenceActor<S> {
    type Output = StoreOutcome;

    fn started(&mut self, ctx: &mut Context<StoreOutcome>) {
        let store = Arc::clone(&self.store);
        ctx.spawn(async move { StoreOutcome::Opened(store.open().await) });
    }

    fn handle(&mut self, input: Input<StoreOutcome>, ctx: &mut Context<StoreOutcome>) {
        match input {
            Input::Message(delivery) => self.on_message(delivery.message, ctx),
            Input::Completed(StoreOutcome::Opened(Ok(()))) => self.get(ctx),
            Input::Completed(StoreOutcome::Opened(Err(e))) => {
                warn!(project = %self.id, code = e.code(), "store unavailable, treating as miss: {e}");
                self.on_lookup(Ok(None), ctx);
            }
            Input::Completed(StoreOutcome::Got(result)) => self.on_lookup(result, ctx),
            Input::Completed(StoreOutcome::Put(result)) => self.on_written(result, ctx),
            Input::Timer(_) => {}
        }
    }
}
