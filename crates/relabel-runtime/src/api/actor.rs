//! API actor: the only caller of the label service.
//!
//! # State Machine
//!
//! ```text
//!   started
//!      │ load_project
//!      ▼
//! ┌───────────┐  ok: PROJECT_LOADED
//! │ FirstLoad │──────────────────────┐
//! └───────────┘  err: ERROR          │
//!                                    ▼
//!                              ┌──────────┐  EDIT | UNDO | REDO |
//!                 ┌───────────►│   Idle   │  SET_DISPLAY_DIM | TOGGLE_RGB
//!                 │            └──────────┘──────────┐  publish LOADING
//!   ok: LOADED (+ EDITED)                            ▼
//!   err: ERROR                               ┌──────────┐
//!                 └──────────────────────────│ Loading  │ intents absorbed
//!                                            └──────────┘
//! ```
//!
//! At most one call is in flight. The project mirror changes only when a
//! call succeeds and its delta merges cleanly.
//!
//! A cached copy (`LOADED` from the persistence actor) that arrives during
//! `FirstLoad` is relayed as `LOADED` on the output bus, so derived state
//! resumes before the network copy lands. It never touches the mirror, and
//! it is dropped once the network copy has been published.

use super::{ApiError, LabelService};
use relabel_actor::{Actor, Context, Delivery, Input};
use relabel_event::{Message, Project, ProjectDelta};
use relabel_types::{BusId, ProjectId};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// API actor state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiState {
    /// Initial project fetch in flight.
    FirstLoad,
    /// Ready for one request.
    Idle,
    /// A request is in flight.
    Loading,
}

/// A request admitted in `Idle`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiRequest {
    /// `EDIT`
    Edit {
        /// Service action.
        action: String,
        /// Form arguments.
        args: BTreeMap<String, String>,
    },
    /// `UNDO`
    Undo,
    /// `REDO`
    Redo,
    /// `SET_DISPLAY_DIM`
    SetDisplay {
        /// Dimension name.
        dimension: String,
        /// New index.
        value: usize,
    },
    /// `TOGGLE_RGB`, carrying the requested new value.
    ToggleRgb {
        /// RGB flag to set.
        rgb: bool,
    },
}

/// Completion of a service call.
#[derive(Debug)]
pub enum ApiOutcome {
    /// The initial fetch finished.
    FirstLoad(Result<Project, ApiError>),
    /// An admitted request finished.
    Request {
        /// What was asked.
        request: ApiRequest,
        /// What came back.
        result: Result<ProjectDelta, ApiError>,
    },
}

/// Serializes label service calls and reports their outcome on a bus.
pub struct ApiActor<S: LabelService> {
    project_id: ProjectId,
    service: Arc<S>,
    out: BusId,
    state: ApiState,
    project: Arc<Project>,
    rgb: bool,
    display: BTreeMap<String, usize>,
}

impl<S: LabelService> ApiActor<S> {
    /// Creates an actor for `project_id` publishing on `out`.
    #[must_use]
    pub fn new(project_id: ProjectId, service: Arc<S>, out: BusId) -> Self {
        Self {
            project_id,
            service,
            out,
            state: ApiState::FirstLoad,
            project: Arc::new(Project::default()),
            rgb: false,
            display: BTreeMap::new(),
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> ApiState {
        self.state
    }

    /// Local mirror of the authoritative project.
    #[must_use]
    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Whether RGB display mode is on.
    #[must_use]
    pub fn rgb(&self) -> bool {
        self.rgb
    }

    /// Last confirmed index per display dimension.
    #[must_use]
    pub fn display(&self) -> &BTreeMap<String, usize> {
        &self.display
    }

    fn admit(&self, message: &Message) -> Option<ApiRequest> {
        match message {
            Message::Edit { action, args } => Some(ApiRequest::Edit {
                action: action.clone(),
                args: args.clone(),
            }),
            Message::Undo => Some(ApiRequest::Undo),
            Message::Redo => Some(ApiRequest::Redo),
            Message::SetDisplayDim { dimension, value } => Some(ApiRequest::SetDisplay {
                dimension: dimension.clone(),
                value: *value,
            }),
            Message::ToggleRgb => Some(ApiRequest::ToggleRgb { rgb: !self.rgb }),
            _ => None,
        }
    }

    fn on_cached(&mut self, delta: ProjectDelta, ctx: &mut Context<ApiOutcome>) {
        if self.state != ApiState::FirstLoad {
            debug!(project = %self.project_id, "cached copy ignored, network copy already loaded");
            return;
        }
        info!(project = %self.project_id, "resuming from cached copy");
        ctx.publish(&self.out, Message::Loaded { delta });
    }

    fn on_message(&mut self, delivery: Delivery, ctx: &mut Context<ApiOutcome>) {
        if let Message::Loaded { delta } = delivery.message {
            return self.on_cached(delta, ctx);
        }
        let Some(request) = self.admit(&delivery.message) else {
            return;
        };
        if self.state != ApiState::Idle {
            debug!(
                project = %self.project_id,
                state = ?self.state,
                kind = %delivery.message.kind(),
                "request not admitted"
            );
            return;
        }

        debug!(project = %self.project_id, ?request, "calling label service");
        ctx.publish(&self.out, Message::Loading);
        self.state = ApiState::Loading;

        let service = Arc::clone(&self.service);
        let project = self.project_id.clone();
        ctx.spawn(async move {
            let result = match &request {
                ApiRequest::Edit { action, args } => service.edit(&project, action, args).await,
                ApiRequest::Undo => service.undo(&project).await,
                ApiRequest::Redo => service.redo(&project).await,
                ApiRequest::SetDisplay { dimension, value } => {
                    service.change_display(&project, dimension, *value).await
                }
                ApiRequest::ToggleRgb { rgb } => service.toggle_rgb(&project, *rgb).await,
            };
            ApiOutcome::Request { request, result }
        });
    }

    fn on_first_load(&mut self, result: Result<Project, ApiError>, ctx: &mut Context<ApiOutcome>) {
        self.state = ApiState::Idle;
        match result {
            Ok(project) => {
                info!(project = %self.project_id, frames = project.frames(), "project loaded");
                self.project = Arc::new(project);
                ctx.publish(
                    &self.out,
                    Message::ProjectLoaded {
                        project: Arc::clone(&self.project),
                    },
                );
            }
            Err(e) => self.publish_error(&e, ctx),
        }
    }

    fn on_request_done(
        &mut self,
        request: ApiRequest,
        result: Result<ProjectDelta, ApiError>,
        ctx: &mut Context<ApiOutcome>,
    ) {
        self.state = ApiState::Idle;

        let delta = match result {
            Ok(delta) => delta,
            Err(e) => return self.publish_error(&e, ctx),
        };

        if let Err(e) = Arc::make_mut(&mut self.project).apply(&delta) {
            warn!(project = %self.project_id, "delta rejected: {e}");
            ctx.publish(
                &self.out,
                Message::Error {
                    message: e.to_string(),
                },
            );
            return;
        }

        match request {
            ApiRequest::ToggleRgb { rgb } => self.rgb = rgb,
            ApiRequest::SetDisplay { dimension, value } => {
                self.display.insert(dimension, value);
            }
            ApiRequest::Edit { .. } | ApiRequest::Undo | ApiRequest::Redo => {}
        }

        let edited = delta.edited(&self.project.overlaps);
        ctx.publish(&self.out, Message::Loaded { delta });
        if let Some(edited) = edited {
            ctx.publish(&self.out, edited);
        }
    }

    fn publish_error(&self, err: &ApiError, ctx: &mut Context<ApiOutcome>) {
        warn!(project = %self.project_id, code = relabel_types::ErrorCode::code(err), "{err}");
        ctx.publish(
            &self.out,
            Message::Error {
                message: err.message(),
            },
        );
    }
}

impl<S: LabelService> Actor for ApiActor<S> {
    type Output = ApiOutcome;

    fn started(&mut self, ctx: &mut Context<ApiOutcome>) {
        let service = Arc::clone(&self.service);
        let project = self.project_id.clone();
        ctx.spawn(async move { ApiOutcome::FirstLoad(service.load_project(&project).await) });
    }

    fn handle(&mut self, input: Input<ApiOutcome>, ctx: &mut Context<ApiOutcome>) {
        match input {
            Input::Message(delivery) => self.on_message(delivery, ctx),
            Input::Completed(ApiOutcome::FirstLoad(result)) => self.on_first_load(result, ctx),
            Input::Completed(ApiOutcome::Request { request, result }) => {
                self.on_request_done(request, result, ctx);
            }
            Input::Timer(_) => {}
        }
    }
}
