//! Label service abstraction.
//!
//! The [`LabelService`] trait is the HTTP boundary of relabel. The API
//! actor is its only caller.
//!
//! | Operation | Method & Path | Body |
//! |-----------|---------------|------|
//! | [`load_project`](LabelService::load_project) | GET `/api/project/{id}` | none |
//! | [`edit`](LabelService::edit) | POST `/api/edit/{id}/{action}` | form-encoded args |
//! | [`undo`](LabelService::undo) | POST `/api/undo/{id}` | none |
//! | [`redo`](LabelService::redo) | POST `/api/redo/{id}` | none |
//! | [`change_display`](LabelService::change_display) | POST `/api/changedisplay/{id}/{dim}/{value}` | none |
//! | [`toggle_rgb`](LabelService::toggle_rgb) | POST `/api/rgb/{id}/{bool}` | none |

use super::ApiError;
use relabel_event::{Project, ProjectDelta};
use relabel_types::ProjectId;
use std::collections::BTreeMap;
use std::future::Future;

/// Remote label-editing service.
///
/// Implementations must be thread-safe: calls run on spawned tasks.
pub trait LabelService: Send + Sync + 'static {
    /// Fetches the full project.
    fn load_project(
        &self,
        project: &ProjectId,
    ) -> impl Future<Output = Result<Project, ApiError>> + Send;

    /// Applies a label edit.
    fn edit(
        &self,
        project: &ProjectId,
        action: &str,
        args: &BTreeMap<String, String>,
    ) -> impl Future<Output = Result<ProjectDelta, ApiError>> + Send;

    /// Undoes the latest action on the service.
    fn undo(&self, project: &ProjectId)
        -> impl Future<Output = Result<ProjectDelta, ApiError>> + Send;

    /// Redoes the latest undone action on the service.
    fn redo(&self, project: &ProjectId)
        -> impl Future<Output = Result<ProjectDelta, ApiError>> + Send;

    /// Changes a display dimension.
    fn change_display(
        &self,
        project: &ProjectId,
        dimension: &str,
        value: usize,
    ) -> impl Future<Output = Result<ProjectDelta, ApiError>> + Send;

    /// Switches RGB display mode to `rgb`.
    fn toggle_rgb(
        &self,
        project: &ProjectId,
        rgb: bool,
    ) -> impl Future<Output = Result<ProjectDelta, ApiError>> + Send;
}
