//! Effects an actor may request while handling an input.
//!
//! Handlers are synchronous. Everything an actor wants to happen goes
//! through its [`Context`]:
//!
//! | Effect | Method | Happens |
//! |--------|--------|---------|
//! | Publish on a bus | [`Context::publish`] | immediately |
//! | Direct send | [`Context::send`] | immediately |
//! | Async work | [`Context::spawn`] | queued as a [`Job`], output returns as `Input::Completed` |
//! | Timer | [`Context::start_timer`] | queued as a [`Job`], expiry returns as `Input::Timer` |
//! | Cancel timer | [`Context::cancel_timer`] | queued as a [`Job`] |
//!
//! Queued jobs are executed by whoever drives the actor: the tokio runner
//! in production, `ActorTestHarness` in tests.

use crate::ActorRef;
use relabel_event::Message;
use relabel_types::BusId;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tracing::{trace, warn};

/// Boxed future produced by [`Context::spawn`].
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// Destination for bus publications.
///
/// Implemented by the runtime's event bus and by the test harness's
/// recorder.
pub trait Publisher: Send + Sync {
    /// Delivers `message` to every subscriber of `bus`.
    ///
    /// Returns the number of subscribers reached.
    fn publish(&self, bus: &BusId, message: Message) -> usize;
}

/// Identifier of a timer started by one actor.
///
/// Ids are unique per actor and never reused, so an expiry for a timer
/// the actor no longer cares about can be recognized and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer-{}", self.0)
    }
}

/// Deferred effect queued by a handler.
pub enum Job<T> {
    /// Run a future; feed its output back as `Input::Completed`.
    Spawn(BoxFuture<T>),
    /// Deliver `Input::Timer(id)` after the duration.
    StartTimer(TimerId, Duration),
    /// Forget a running timer.
    CancelTimer(TimerId),
}

impl<T> fmt::Debug for Job<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spawn(_) => f.write_str("Spawn(..)"),
            Self::StartTimer(id, after) => write!(f, "StartTimer({id}, {after:?})"),
            Self::CancelTimer(id) => write!(f, "CancelTimer({id})"),
        }
    }
}

/// Per-actor effect context.
///
/// One context lives as long as its actor; timer ids keep counting across
/// handler calls.
pub struct Context<T> {
    me: ActorRef,
    publisher: Arc<dyn Publisher>,
    jobs: Vec<Job<T>>,
    next_timer: u64,
}

impl<T> Context<T> {
    /// Creates a context for the actor reachable at `me`.
    #[must_use]
    pub fn new(me: ActorRef, publisher: Arc<dyn Publisher>) -> Self {
        Self {
            me,
            publisher,
            jobs: Vec::new(),
            next_timer: 0,
        }
    }

    /// Returns this actor's own ref.
    #[must_use]
    pub fn me(&self) -> &ActorRef {
        &self.me
    }

    /// Publishes `message` on `bus`. Returns the number of receivers.
    pub fn publish(&self, bus: &BusId, message: Message) -> usize {
        let kind = message.kind();
        let n = self.publisher.publish(bus, message);
        trace!(actor = %self.me.id(), bus = %bus, %kind, receivers = n, "published");
        n
    }

    /// Sends `message` directly to `to`, with this actor as sender.
    ///
    /// A stopped receiver is logged and otherwise ignored.
    pub fn send(&self, to: &ActorRef, message: Message) {
        let kind = message.kind();
        if let Err(e) = to.tell_from(&self.me, message) {
            warn!(actor = %self.me.id(), %kind, "send failed: {e}");
        }
    }

    /// Runs `future` off the actor; its output arrives as `Input::Completed`.
    pub fn spawn<F>(&mut self, future: F)
    where
        F: Future<Output = T> + Send + 'static,
    {
        self.jobs.push(Job::Spawn(Box::pin(future)));
    }

    /// Starts a one-shot timer.
    pub fn start_timer(&mut self, after: Duration) -> TimerId {
        let id = TimerId(self.next_timer);
        self.next_timer += 1;
        self.jobs.push(Job::StartTimer(id, after));
        id
    }

    /// Cancels a timer. Cancelling an expired timer is a no-op.
    pub fn cancel_timer(&mut self, id: TimerId) {
        self.jobs.push(Job::CancelTimer(id));
    }

    /// Takes the jobs queued since the last call.
    pub fn drain_jobs(&mut self) -> Vec<Job<T>> {
        std::mem::take(&mut self.jobs)
    }
}

impl<T> fmt::Debug for Context<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("me", &self.me)
            .field("pending_jobs", &self.jobs.len())
            .finish()
    }
}
