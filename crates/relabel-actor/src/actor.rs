//! The actor trait.
//!
//! An actor is a state machine driven by [`Input`]s, one at a time, to
//! completion. It never awaits: long-running work is handed to the
//! [`Context`] and its result comes back later as another input.
//!
//! ```text
//!            ┌───────────────── Input ──────────────────┐
//!            │ Message(Delivery) │ Completed(T) │ Timer │
//!            └─────────────────────────┬────────────────┘
//!                                      ▼
//!                         Actor::handle(&mut self, ..)
//!                                      │
//!            ┌──────────────┬──────────┴───┬──────────────┐
//!            ▼              ▼              ▼              ▼
//!         publish         send          spawn       start_timer
//!       (immediate)    (immediate)     (queued)       (queued)
//! ```
//!
//! # Example
//!
//! ```
//! use relabel_actor::{Actor, ActorTestHarness, Context, Input};
//! use relabel_event::Message;
//! use relabel_types::BusId;
//!
//! struct Counter {
//!     out: BusId,
//!     n: u32,
//! }
//!
//! impl Actor for Counter {
//!     type Output = ();
//!
//!     fn handle(&mut self, input: Input<()>, ctx: &mut Context<()>) {
//!         if let Input::Message(d) = input {
//!             if d.message == Message::NextCell {
//!                 self.n += 1;
//!                 ctx.publish(&self.out, Message::Refresh);
//!             }
//!         }
//!     }
//! }
//!
//! let mut h = ActorTestHarness::new(Counter { out: BusId::new("out"), n: 0 });
//! h.tell(Message::NextCell);
//! h.tell(Message::Reset);
//! assert_eq!(h.actor().n, 1);
//! assert_eq!(h.take_published().len(), 1);
//! ```

use crate::{Context, Delivery, TimerId};

/// Input delivered to an actor.
#[derive(Debug)]
pub enum Input<T> {
    /// A message from a bus or another actor.
    Message(Delivery),
    /// Output of a future started with [`Context::spawn`].
    Completed(T),
    /// A timer started with [`Context::start_timer`] expired.
    Timer(TimerId),
}

/// A message-driven state machine.
pub trait Actor: Send + 'static {
    /// Output type of the futures this actor spawns.
    type Output: Send + 'static;

    /// Called once before the first input.
    fn started(&mut self, _ctx: &mut Context<Self::Output>) {}

    /// Handles one input to completion.
    fn handle(&mut self, input: Input<Self::Output>, ctx: &mut Context<Self::Output>);

    /// Called once after the last input.
    fn stopped(&mut self) {}
}
