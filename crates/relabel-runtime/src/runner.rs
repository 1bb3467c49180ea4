//! Runs actors on tokio tasks.
//!
//! Each actor gets one task that owns it exclusively:
//!
//! ```text
//!             ┌──────────── tokio::select! (biased) ───────────┐
//!  stop ────► │ 1. stop signal                                 │
//!  tasks ───► │ 2. completed futures / fired timers            │ ──► Actor::handle
//!  mailbox ─► │ 3. mailbox deliveries                          │
//!             └────────────────────────────────────────────────┘
//!                                   │
//!                          Context::drain_jobs
//!                     spawn tasks / arm or abort timers
//! ```
//!
//! Handlers never await, so an actor keeps taking messages while its own
//! futures are in flight. On stop the actor leaves the bus, then still
//! handles the messages already queued and the outputs of futures it has
//! spawned. Timers no longer fire.

use crate::EventBus;
use relabel_actor::{Actor, ActorError, ActorRef, Context, Input, Job, Mailbox, TimerId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, info};

/// Handle to a running actor.
///
/// Dropping the handle stops the actor, as does [`ActorHandle::stop`].
#[derive(Debug)]
pub struct ActorHandle {
    actor: ActorRef,
    stop_tx: Option<oneshot::Sender<()>>,
    join: JoinHandle<()>,
}

impl ActorHandle {
    /// The running actor's ref.
    #[must_use]
    pub fn actor_ref(&self) -> &ActorRef {
        &self.actor
    }

    /// Returns `true` once the actor's task has ended.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Stops the actor and waits for its task to end.
    pub async fn stop(mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        let join = &mut self.join;
        if let Err(e) = join.await {
            debug!(actor = %self.actor.id(), "actor task ended abnormally: {e}");
        }
    }
}

/// Starts `actor` on a new task, reading from `inbox`.
///
/// `me` must be the ref paired with `inbox`. The actor's publications go
/// through `bus`; its subscriptions are removed when it stops.
///
/// # Errors
///
/// Returns [`ActorError::NoRuntime`] when called outside a tokio runtime.
pub fn spawn_actor<A: Actor>(
    actor: A,
    me: ActorRef,
    inbox: Mailbox,
    bus: Arc<EventBus>,
) -> Result<ActorHandle, ActorError> {
    let runtime = tokio::runtime::Handle::try_current()
        .map_err(|_| ActorError::NoRuntime(me.id().clone()))?;

    let (stop_tx, stop_rx) = oneshot::channel();
    let ctx = Context::new(me.clone(), bus.clone());
    let join = runtime.spawn(run(actor, ctx, inbox, bus, stop_rx));

    Ok(ActorHandle {
        actor: me,
        stop_tx: Some(stop_tx),
        join,
    })
}

async fn run<A: Actor>(
    mut actor: A,
    mut ctx: Context<A::Output>,
    mut inbox: Mailbox,
    bus: Arc<EventBus>,
    mut stop_rx: oneshot::Receiver<()>,
) {
    let id = ctx.me().id().clone();
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Input<A::Output>>();
    let mut timers: HashMap<TimerId, AbortHandle> = HashMap::new();
    let mut in_flight = 0usize;

    info!(actor = %id, "actor started");
    actor.started(&mut ctx);
    in_flight += dispatch(&mut ctx, &done_tx, &mut timers);

    loop {
        let input = tokio::select! {
            biased;

            _ = &mut stop_rx => break,

            Some(input) = done_rx.recv() => input,

            delivery = inbox.recv() => match delivery {
                Some(d) => Input::Message(d),
                None => break,
            },
        };

        match &input {
            Input::Timer(timer) if timers.remove(timer).is_none() => {
                debug!(actor = %id, %timer, "stale timer dropped");
                continue;
            }
            Input::Completed(_) => in_flight -= 1,
            _ => {}
        }

        actor.handle(input, &mut ctx);
        in_flight += dispatch(&mut ctx, &done_tx, &mut timers);
    }

    bus.unsubscribe(&id);
    for (_, timer) in timers.drain() {
        timer.abort();
    }

    loop {
        let input = if let Some(delivery) = inbox.try_recv() {
            Input::Message(delivery)
        } else if in_flight > 0 {
            match done_rx.recv().await {
                Some(input @ Input::Completed(_)) => {
                    in_flight -= 1;
                    input
                }
                Some(_) => continue,
                None => break,
            }
        } else {
            break;
        };
        actor.handle(input, &mut ctx);
        in_flight += dispatch(&mut ctx, &done_tx, &mut timers);
        for (_, timer) in timers.drain() {
            timer.abort();
        }
    }

    actor.stopped();
    info!(actor = %id, "actor stopped");
}

/// Starts the actor's queued jobs. Returns how many futures were spawned.
fn dispatch<T: Send + 'static>(
    ctx: &mut Context<T>,
    done: &mpsc::UnboundedSender<Input<T>>,
    timers: &mut HashMap<TimerId, AbortHandle>,
) -> usize {
    let mut spawned = 0;
    for job in ctx.drain_jobs() {
        match job {
            Job::Spawn(future) => {
                let done = done.clone();
                tokio::spawn(async move {
                    let _ = done.send(Input::Completed(future.await));
                });
                spawned += 1;
            }
            Job::StartTimer(timer, after) => {
                let done = done.clone();
                let task = tokio::spawn(async move {
                    tokio::time::sleep(after).await;
                    let _ = done.send(Input::Timer(timer));
                });
                timers.insert(timer, task.abort_handle());
            }
            Job::CancelTimer(timer) => {
                if let Some(task) = timers.remove(&timer) {
                    task.abort();
                }
            }
        }
    }
    spawned
}
