//! Subcommand execution.
//!
//! Project commands wire a [`Workspace`], wait for the first load, send
//! one intent and report the API outcome. Cache commands use the local
//! store only.
//!
//! The first load's summary ends with the local cache state:
//! `cache=hit` when a stored copy existed, `cache=miss` otherwise.

use anyhow::{Context as _, Result};
use relabel_actor::Mailbox;
use relabel_event::{Message, MessageKind, Project, ProjectDelta};
use relabel_runtime::api::HttpLabelService;
use relabel_runtime::persistence::{LocalFileStore, ProjectStore, StorageError};
use relabel_runtime::{RelabelConfig, Workspace, WorkspaceOptions};
use relabel_types::ProjectId;
use std::collections::BTreeMap;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Extra time allowed on top of the HTTP timeout for one outcome.
const OUTCOME_GRACE: Duration = Duration::from_secs(5);

/// What to do once the project is loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Print a summary only.
    Show,
    /// Apply a service action.
    Edit {
        action: String,
        args: BTreeMap<String, String>,
    },
    /// Undo on the service.
    Undo,
    /// Redo on the service.
    Redo,
    /// Change a display dimension.
    Display { dimension: String, value: usize },
    /// Toggle RGB mode.
    Rgb,
}

/// Local cache operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheOp {
    List,
    Delete(ProjectId),
}

fn store(config: &RelabelConfig) -> LocalFileStore {
    LocalFileStore::new(config.store.dir_or_default(), &config.store.database)
}

/// Runs `intent` against `project`.
pub async fn run_project(
    config: &RelabelConfig,
    project: ProjectId,
    intent: Intent,
) -> Result<ExitCode> {
    let service = HttpLabelService::new(&config.api.base_url, config.api.timeout())
        .context("cannot create label service client")?;
    let options = WorkspaceOptions {
        restore_timeout: config.history.restore_timeout(),
        ..WorkspaceOptions::default()
    };
    let wait = config.api.timeout() + OUTCOME_GRACE;

    let ws = Workspace::start(project, Arc::new(service), Arc::new(store(config)), options)?;
    let mut api = ws.observe(
        &ws.buses().api,
        &[MessageKind::ProjectLoaded, MessageKind::Loaded, MessageKind::Error],
    );
    let mut cache = ws.observe(
        &ws.buses().persistence,
        &[MessageKind::Loaded, MessageKind::ProjectNotInDb],
    );

    let ok = match next_outcome(&mut api, wait, is_first_load).await? {
        Message::ProjectLoaded { project } => {
            let cached = cache_state(&mut cache, wait).await;
            println!("{} cache={cached}", summarize(ws.project(), &project));
            send(&ws, &intent);
            match intent {
                Intent::Show => true,
                _ => report(next_outcome(&mut api, wait, Message::is_api_outcome).await?),
            }
        }
        other => report(other),
    };

    ws.shutdown().await;
    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn send(ws: &Workspace, intent: &Intent) {
    debug!(?intent, "sending");
    match intent {
        Intent::Show => {}
        Intent::Edit { action, args } => ws.edit(action.clone(), args.clone()),
        // A fresh process holds no checkpoints, so these go to the service
        // directly. The coordinator is idle, so nothing else is in flight.
        Intent::Undo => {
            ws.publish(&ws.buses().requests, Message::Undo);
        }
        Intent::Redo => {
            ws.publish(&ws.buses().requests, Message::Redo);
        }
        Intent::Display { dimension, value } => ws.set_display(dimension.clone(), *value),
        Intent::Rgb => ws.toggle_rgb(),
    }
}

fn is_first_load(message: &Message) -> bool {
    matches!(message, Message::ProjectLoaded { .. } | Message::Error { .. })
}

/// Waits for the next message on `api` that `wanted` accepts.
///
/// A cached copy relayed as `LOADED` before the first load is skipped by
/// [`is_first_load`].
async fn next_outcome(
    api: &mut Mailbox,
    wait: Duration,
    wanted: fn(&Message) -> bool,
) -> Result<Message> {
    let recv = async {
        while let Some(delivery) = api.recv().await {
            if wanted(&delivery.message) {
                return Some(delivery.message);
            }
        }
        None
    };
    tokio::time::timeout(wait, recv)
        .await
        .with_context(|| format!("no answer from the label service within {wait:?}"))?
        .context("workspace stopped before answering")
}

/// Reads the persistence actor's lookup result.
async fn cache_state(cache: &mut Mailbox, wait: Duration) -> &'static str {
    match tokio::time::timeout(wait, cache.recv()).await {
        Ok(Some(delivery)) if matches!(delivery.message, Message::Loaded { .. }) => "hit",
        Ok(Some(_)) => "miss",
        Ok(None) | Err(_) => "unknown",
    }
}

/// Prints an outcome. Returns `true` for success.
fn report(message: Message) -> bool {
    match message {
        Message::Loaded { delta } => {
            println!("ok: {}", describe(&delta));
            true
        }
        Message::Error { message } => {
            eprintln!("error: {message}");
            false
        }
        other => {
            eprintln!("error: unexpected {}", other.kind());
            false
        }
    }
}

/// One-line project summary.
pub fn summarize(id: &ProjectId, project: &Project) -> String {
    let labels = if project.labels.is_empty() {
        "-".to_string()
    } else {
        project.labels.join(", ")
    };
    format!(
        "{id}: frames={} cells={} labels={labels}",
        project.frames(),
        project.lineage.len()
    )
}

/// Names the parts of the project a delta replaces.
pub fn describe(delta: &ProjectDelta) -> String {
    let mut parts = Vec::new();
    if let Some((frame, feature, _)) = delta.slice() {
        parts.push(format!("labeled[{feature}][{frame}]"));
    }
    if delta.raw.is_some() {
        parts.push("raw".into());
    }
    if delta.labeled.is_some() {
        parts.push("labeled".into());
    }
    if delta.overlaps.is_some() {
        parts.push("overlaps".into());
    }
    if delta.lineage.is_some() {
        parts.push("lineage".into());
    }
    if delta.labels.is_some() {
        parts.push("labels".into());
    }
    if delta.spots.is_some() {
        parts.push("spots".into());
    }
    if parts.is_empty() {
        "no changes".into()
    } else {
        format!("updated {}", parts.join(", "))
    }
}

/// Runs a cache operation.
pub async fn run_cache(config: &RelabelConfig, op: CacheOp) -> Result<ExitCode> {
    let store = store(config);
    info!(dir = %store.dir().display(), "using project cache");
    match op {
        CacheOp::List => {
            let projects = store.list().await?;
            if projects.is_empty() {
                println!("no cached projects");
            }
            for meta in projects {
                println!(
                    "{}\tframes={}\tcells={}\t{} bytes\t{}",
                    meta.id,
                    meta.frames,
                    meta.cells,
                    meta.size_bytes,
                    meta.saved_at.format("%Y-%m-%d %H:%M:%S")
                );
            }
            Ok(ExitCode::SUCCESS)
        }
        CacheOp::Delete(id) => match store.delete(&id).await {
            Ok(()) => {
                println!("deleted {id}");
                Ok(ExitCode::SUCCESS)
            }
            Err(StorageError::NotFound(_)) => {
                eprintln!("error: {id} is not cached");
                Ok(ExitCode::FAILURE)
            }
            Err(e) => Err(e.into()),
        },
    }
}
