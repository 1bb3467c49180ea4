//! Test harness for actors.
//!
//! [`ActorTestHarness`] drives an actor synchronously without a runtime
//! task, so tests control exactly when async work finishes and when
//! timers fire.
//!
//! # Features
//!
//! - Bus publications are recorded instead of delivered
//! - Spawned futures are parked until the test resolves them
//! - Timers are parked until the test fires them
//! - Cancelled timers can no longer be fired
//!
//! # Example
//!
//! ```
//! use relabel_actor::{Actor, ActorTestHarness, Context, Input};
//! use relabel_event::Message;
//! use relabel_types::BusId;
//! use std::time::Duration;
//!
//! struct Blinker {
//!     out: BusId,
//! }
//!
//! impl Actor for Blinker {
//!     type Output = ();
//!
//!     fn handle(&mut self, input: Input<()>, ctx: &mut Context<()>) {
//!         match input {
//!             Input::Message(_) => {
//!                 ctx.start_timer(Duration::from_millis(500));
//!             }
//!             Input::Timer(_) => {
//!                 ctx.publish(&self.out, Message::Refresh);
//!             }
//!             Input::Completed(()) => {}
//!         }
//!     }
//! }
//!
//! let mut h = ActorTestHarness::new(Blinker { out: BusId::new("out") });
//! h.tell(Message::Reset);
//! assert_eq!(h.active_timers().len(), 1);
//! assert!(h.take_published().is_empty());
//!
//! h.fire_all_timers();
//! assert_eq!(h.take_published(), vec![(BusId::new("out"), Message::Refresh)]);
//! ```

use crate::{
    mailbox, Actor, ActorRef, BoxFuture, Context, Delivery, Input, Job, Mailbox, Publisher,
    TimerId,
};
use parking_lot::Mutex;
use relabel_event::Message;
use relabel_types::{ActorId, BusId};
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

/// Publisher that records every publication.
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    published: Mutex<Vec<(BusId, Message)>>,
}

impl RecordingPublisher {
    /// Returns and clears the recorded publications.
    pub fn take(&self) -> Vec<(BusId, Message)> {
        std::mem::take(&mut *self.published.lock())
    }
}

impl Publisher for RecordingPublisher {
    fn publish(&self, bus: &BusId, message: Message) -> usize {
        self.published.lock().push((bus.clone(), message));
        1
    }
}

/// Synchronous driver for one actor.
pub struct ActorTestHarness<A: Actor> {
    actor: A,
    ctx: Context<A::Output>,
    inbox: Mailbox,
    publisher: Arc<RecordingPublisher>,
    tasks: VecDeque<BoxFuture<A::Output>>,
    timers: BTreeMap<TimerId, Duration>,
}

impl<A: Actor> ActorTestHarness<A> {
    /// Wraps `actor` under a fresh random id. `started` is not called.
    #[must_use]
    pub fn new(actor: A) -> Self {
        let (me, inbox) = mailbox(ActorId::new("under-test"));
        Self::with_mailbox(actor, me, inbox)
    }

    /// Wraps `actor` using a pre-made ref/mailbox pair.
    ///
    /// Use this when other test actors must hold the actor's ref before
    /// the actor exists.
    #[must_use]
    pub fn with_mailbox(actor: A, me: ActorRef, inbox: Mailbox) -> Self {
        let publisher = Arc::new(RecordingPublisher::default());
        let ctx = Context::new(me, publisher.clone());
        Self {
            actor,
            ctx,
            inbox,
            publisher,
            tasks: VecDeque::new(),
            timers: BTreeMap::new(),
        }
    }

    /// Calls [`Actor::started`].
    pub fn start(&mut self) {
        self.actor.started(&mut self.ctx);
        self.collect_jobs();
    }

    /// Returns the actor under test.
    #[must_use]
    pub fn actor(&self) -> &A {
        &self.actor
    }

    /// Returns the actor under test mutably.
    pub fn actor_mut(&mut self) -> &mut A {
        &mut self.actor
    }

    /// Returns the actor's own ref.
    #[must_use]
    pub fn me(&self) -> &ActorRef {
        self.ctx.me()
    }

    /// Feeds any input.
    pub fn input(&mut self, input: Input<A::Output>) {
        self.actor.handle(input, &mut self.ctx);
        self.collect_jobs();
    }

    /// Sends a direct message with no sender.
    pub fn tell(&mut self, message: Message) {
        self.input(Input::Message(Delivery::direct(message)));
    }

    /// Sends a direct message from `from`.
    pub fn tell_from(&mut self, from: &ActorRef, message: Message) {
        self.input(Input::Message(Delivery {
            bus: None,
            from: Some(from.clone()),
            message,
        }));
    }

    /// Delivers `message` as if published on `bus`.
    pub fn publish_on(&mut self, bus: &BusId, message: Message) {
        self.input(Input::Message(Delivery {
            bus: Some(bus.clone()),
            from: None,
            message,
        }));
    }

    /// Feeds every message that arrived in the actor's own mailbox.
    ///
    /// Returns the number of deliveries handled.
    pub fn deliver_inbox(&mut self) -> usize {
        let mut n = 0;
        while let Some(delivery) = self.inbox.try_recv() {
            self.input(Input::Message(delivery));
            n += 1;
        }
        n
    }

    /// Returns and clears the recorded bus publications.
    pub fn take_published(&mut self) -> Vec<(BusId, Message)> {
        self.publisher.take()
    }

    /// Returns and clears recorded publications on `bus` only.
    ///
    /// Publications on other buses are discarded.
    pub fn take_published_on(&mut self, bus: &BusId) -> Vec<Message> {
        self.publisher
            .take()
            .into_iter()
            .filter(|(b, _)| b == bus)
            .map(|(_, m)| m)
            .collect()
    }

    /// Number of spawned futures not yet resolved.
    #[must_use]
    pub fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }

    /// Awaits the oldest spawned future and feeds its output back.
    ///
    /// Returns `false` if nothing was pending.
    pub async fn complete_next(&mut self) -> bool {
        match self.tasks.pop_front() {
            Some(task) => {
                let output = task.await;
                self.input(Input::Completed(output));
                true
            }
            None => false,
        }
    }

    /// Drops the oldest spawned future and feeds `output` instead.
    ///
    /// Returns `false` if nothing was pending.
    pub fn resolve_next(&mut self, output: A::Output) -> bool {
        if self.tasks.pop_front().is_none() {
            return false;
        }
        self.input(Input::Completed(output));
        true
    }

    /// Timers started and neither fired nor cancelled, with their durations.
    #[must_use]
    pub fn active_timers(&self) -> Vec<(TimerId, Duration)> {
        self.timers.iter().map(|(id, d)| (*id, *d)).collect()
    }

    /// Fires timer `id`. Returns `false` if it is not active.
    pub fn fire_timer(&mut self, id: TimerId) -> bool {
        if self.timers.remove(&id).is_none() {
            return false;
        }
        self.input(Input::Timer(id));
        true
    }

    /// Fires every active timer in start order.
    pub fn fire_all_timers(&mut self) {
        let ids: Vec<_> = self.timers.keys().copied().collect();
        for id in ids {
            self.fire_timer(id);
        }
    }

    fn collect_jobs(&mut self) {
        for job in self.ctx.drain_jobs() {
            match job {
                Job::Spawn(task) => self.tasks.push_back(task),
                Job::StartTimer(id, after) => {
                    self.timers.insert(id, after);
                }
                Job::CancelTimer(id) => {
                    self.timers.remove(&id);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fetcher {
        out: BusId,
        timer: Option<TimerId>,
    }

    impl Actor for Fetcher {
        type Output = u32;

        fn started(&mut self, ctx: &mut Context<u32>) {
            ctx.spawn(async { 7 });
        }

        fn handle(&mut self, input: Input<u32>, ctx: &mut Context<u32>) {
            match input {
                Input::Completed(n) => {
                    ctx.publish(
                        &self.out,
                        Message::SetFrame {
                            t: usize::try_from(n).unwrap_or_default(),
                        },
                    );
                }
                Input::Message(d) if d.message == Message::Save => {
                    self.timer = Some(ctx.start_timer(Duration::from_millis(10)));
                }
                Input::Message(_) => {
                    if let Some(id) = self.timer.take() {
                        ctx.cancel_timer(id);
                    }
                }
                Input::Timer(_) => {
                    ctx.publish(&self.out, Message::Refresh);
                }
            }
        }
    }

    fn harness() -> ActorTestHarness<Fetcher> {
        ActorTestHarness::new(Fetcher {
            out: BusId::new("out"),
            timer: None,
        })
    }

    #[tokio::test]
    async fn complete_next_runs_future() {
        let mut h = harness();
        h.start();
        assert_eq!(h.pending_tasks(), 1);
        assert!(h.complete_next().await);
        assert_eq!(
            h.take_published(),
            vec![(BusId::new("out"), Message::SetFrame { t: 7 })]
        );
        assert!(!h.complete_next().await);
    }

    #[test]
    fn resolve_next_substitutes_output() {
        let mut h = harness();
        h.start();
        assert!(h.resolve_next(3));
        assert_eq!(
            h.take_published_on(&BusId::new("out")),
            vec![Message::SetFrame { t: 3 }]
        );
        assert!(!h.resolve_next(3));
    }

    #[test]
    fn cancelled_timer_cannot_fire() {
        let mut h = harness();
        h.tell(Message::Save);
        let (id, after) = h.active_timers()[0];
        assert_eq!(after, Duration::from_millis(10));
        h.tell(Message::Reset);
        assert!(h.active_timers().is_empty());
        assert!(!h.fire_timer(id));
        assert!(h.take_published().is_empty());
    }

    #[test]
    fn deliver_inbox_feeds_own_mailbox() {
        let mut h = harness();
        h.me().tell(Message::Save).unwrap();
        assert_eq!(h.deliver_inbox(), 1);
        assert_eq!(h.active_timers().len(), 1);
    }
}
