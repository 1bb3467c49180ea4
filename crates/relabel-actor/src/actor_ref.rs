//! Actor addresses and mailboxes.
//!
//! An [`ActorRef`] is the only way to reach an actor. Refs are created
//! together with the actor's [`Mailbox`] *before* the actor itself, so
//! actors that need to know each other (a history actor and its owner)
//! can be wired without a registry.
//!
//! ```
//! use relabel_actor::mailbox;
//! use relabel_event::Message;
//! use relabel_types::ActorId;
//!
//! let (actor, mut inbox) = mailbox(ActorId::named("selection"));
//! actor.tell(Message::NextCell).unwrap();
//!
//! let delivery = inbox.try_recv().unwrap();
//! assert_eq!(delivery.message, Message::NextCell);
//! assert!(delivery.bus.is_none());
//! ```
//!
//! Mailboxes are unbounded: sending never blocks and never drops a
//! message while the receiving actor is alive.

use crate::ActorError;
use relabel_event::Message;
use relabel_types::{ActorId, BusId};
use std::fmt;
use tokio::sync::mpsc;

/// One message as received by an actor.
#[derive(Debug, Clone)]
pub struct Delivery {
    /// Bus the message was published on, `None` for direct sends.
    pub bus: Option<BusId>,
    /// Sending actor for direct sends, used for replies.
    pub from: Option<ActorRef>,
    /// The message.
    pub message: Message,
}

impl Delivery {
    /// A direct message with no known sender.
    #[must_use]
    pub fn direct(message: Message) -> Self {
        Self {
            bus: None,
            from: None,
            message,
        }
    }
}

/// Address of a running (or about to run) actor.
#[derive(Clone)]
pub struct ActorRef {
    id: ActorId,
    tx: mpsc::UnboundedSender<Delivery>,
}

impl ActorRef {
    /// Returns the actor's id.
    #[must_use]
    pub fn id(&self) -> &ActorId {
        &self.id
    }

    /// Sends `message` with no sender.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::MailboxClosed`] if the actor has stopped.
    pub fn tell(&self, message: Message) -> Result<(), ActorError> {
        self.deliver(Delivery::direct(message))
    }

    /// Sends `message` on behalf of `from`, so the receiver can reply.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::MailboxClosed`] if the actor has stopped.
    pub fn tell_from(&self, from: &ActorRef, message: Message) -> Result<(), ActorError> {
        self.deliver(Delivery {
            bus: None,
            from: Some(from.clone()),
            message,
        })
    }

    /// Hands a prepared delivery to the mailbox.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::MailboxClosed`] if the actor has stopped.
    pub fn deliver(&self, delivery: Delivery) -> Result<(), ActorError> {
        self.tx
            .send(delivery)
            .map_err(|_| ActorError::MailboxClosed(self.id.clone()))
    }

    /// Returns `true` if the mailbox has been dropped.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl PartialEq for ActorRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ActorRef {}

impl fmt::Debug for ActorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorRef").field("id", &self.id).finish()
    }
}

/// Receiving end of an actor's messages.
#[derive(Debug)]
pub struct Mailbox {
    id: ActorId,
    rx: mpsc::UnboundedReceiver<Delivery>,
}

impl Mailbox {
    /// Returns the owning actor's id.
    #[must_use]
    pub fn id(&self) -> &ActorId {
        &self.id
    }

    /// Waits for the next delivery. `None` once every ref is dropped.
    pub async fn recv(&mut self) -> Option<Delivery> {
        self.rx.recv().await
    }

    /// Returns the next queued delivery without waiting.
    pub fn try_recv(&mut self) -> Option<Delivery> {
        self.rx.try_recv().ok()
    }

    /// Returns every queued message, in arrival order.
    pub fn drain(&mut self) -> Vec<Message> {
        std::iter::from_fn(|| self.try_recv())
            .map(|d| d.message)
            .collect()
    }
}

/// Creates a connected ref/mailbox pair for actor `id`.
#[must_use]
pub fn mailbox(id: ActorId) -> (ActorRef, Mailbox) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        ActorRef {
            id: id.clone(),
            tx,
        },
        Mailbox { id, rx },
    )
}
