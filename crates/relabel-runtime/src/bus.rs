//! EventBus: named in-process publish/subscribe.
//!
//! ```text
//!               publish(bus:api, LOADED)
//!                         │
//!                         ▼
//! ┌─────────────────────────────────────────────┐
//! │ EventBus                                    │
//! │   bus:api     → [undo, overlaps, persist]   │
//! │   bus:hover   → [division, selection]       │
//! └─────────────────────────────────────────────┘
//!          │             │              │
//!          ▼             ▼              ▼
//!       mailbox       mailbox        mailbox
//! ```
//!
//! Delivery is synchronous into unbounded mailboxes, in subscription
//! order. Each subscriber sees the messages of one bus in publish order,
//! exactly once. Nothing is promised about ordering across buses.
//!
//! The bus holds no business state.

use parking_lot::RwLock;
use relabel_actor::{ActorRef, Delivery, Publisher};
use relabel_event::{Message, MessageKind};
use relabel_types::{ActorId, BusId};
use std::collections::HashMap;
use tracing::{debug, trace};

#[derive(Debug, Clone)]
struct Subscription {
    actor: ActorRef,
    filter: Option<Vec<MessageKind>>,
}

impl Subscription {
    fn accepts(&self, kind: MessageKind) -> bool {
        self.filter.as_ref().map_or(true, |kinds| kinds.contains(&kind))
    }
}

/// Routes bus publications to subscribed actors.
///
/// Shared between runners as `Arc<EventBus>`.
///
/// # Example
///
/// ```
/// use relabel_actor::mailbox;
/// use relabel_event::Message;
/// use relabel_runtime::EventBus;
/// use relabel_types::{ActorId, BusId};
///
/// let bus = EventBus::new();
/// let api = BusId::new("api");
/// let (a, mut inbox) = mailbox(ActorId::named("overlaps"));
///
/// bus.subscribe(&api, &a);
/// assert_eq!(bus.publish(&api, Message::Loading), 1);
/// assert_eq!(inbox.drain(), vec![Message::Loading]);
/// ```
#[derive(Debug, Default)]
pub struct EventBus {
    subscriptions: RwLock<HashMap<BusId, Vec<Subscription>>>,
}

impl EventBus {
    /// Creates a bus with no subscriptions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes `actor` to every message on `bus`.
    pub fn subscribe(&self, bus: &BusId, actor: &ActorRef) {
        self.add(bus, actor, None);
    }

    /// Subscribes `actor` to messages of the given kinds on `bus`.
    pub fn subscribe_filtered(&self, bus: &BusId, actor: &ActorRef, kinds: &[MessageKind]) {
        self.add(bus, actor, Some(kinds.to_vec()));
    }

    fn add(&self, bus: &BusId, actor: &ActorRef, filter: Option<Vec<MessageKind>>) {
        debug!(%bus, actor = %actor.id(), ?filter, "subscribe");
        self.subscriptions
            .write()
            .entry(bus.clone())
            .or_default()
            .push(Subscription {
                actor: actor.clone(),
                filter,
            });
    }

    /// Removes every subscription held by `actor`.
    pub fn unsubscribe(&self, actor: &ActorId) {
        let mut subs = self.subscriptions.write();
        for list in subs.values_mut() {
            list.retain(|s| s.actor.id() != actor);
        }
        subs.retain(|_, list| !list.is_empty());
        debug!(%actor, "unsubscribed");
    }

    /// Ids of the actors subscribed to `bus`, in subscription order.
    #[must_use]
    pub fn subscribers(&self, bus: &BusId) -> Vec<ActorId> {
        self.subscriptions
            .read()
            .get(bus)
            .map(|list| list.iter().map(|s| s.actor.id().clone()).collect())
            .unwrap_or_default()
    }

    /// Delivers `message` to every matching subscriber of `bus`.
    ///
    /// Returns the number of deliveries. Subscribers whose mailbox has
    /// closed are dropped.
    pub fn publish(&self, bus: &BusId, message: Message) -> usize {
        let kind = message.kind();
        let mut delivered = 0;
        let mut closed = false;
        {
            let subs = self.subscriptions.read();
            let Some(list) = subs.get(bus) else {
                trace!(%bus, %kind, "no subscribers");
                return 0;
            };
            for sub in list.iter().filter(|s| s.accepts(kind)) {
                let delivery = Delivery {
                    bus: Some(bus.clone()),
                    from: None,
                    message: message.clone(),
                };
                if sub.actor.deliver(delivery).is_ok() {
                    delivered += 1;
                } else {
                    closed = true;
                }
            }
        }
        if closed {
            self.prune(bus);
        }
        trace!(%bus, %kind, delivered, "publish");
        delivered
    }

    fn prune(&self, bus: &BusId) {
        if let Some(list) = self.subscriptions.write().get_mut(bus) {
            list.retain(|s| {
                let open = !s.actor.is_closed();
                if !open {
                    debug!(%bus, actor = %s.actor.id(), "pruned closed subscriber");
                }
                open
            });
        }
    }
}

impl Publisher for EventBus {
    fn publish(&self, bus: &BusId, message: Message) -> usize {
        EventBus::publish(self, bus, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relabel_actor::mailbox;

    #[test]
    fn fan_out_in_publish_order() {
        let bus = EventBus::new();
        let api = BusId::new("api");
        let (a, mut a_in) = mailbox(ActorId::named("a"));
        let (b, mut b_in) = mailbox(ActorId::named("b"));
        bus.subscribe(&api, &a);
        bus.subscribe(&api, &b);

        assert_eq!(bus.publish(&api, Message::Loading), 2);
        assert_eq!(bus.publish(&api, Message::Refresh), 2);

        let expected = vec![Message::Loading, Message::Refresh];
        assert_eq!(a_in.drain(), expected);
        assert_eq!(b_in.drain(), expected);
    }

    #[test]
    fn deliveries_carry_bus() {
        let bus = EventBus::new();
        let hover = BusId::new("hover");
        let (a, mut inbox) = mailbox(ActorId::named("a"));
        bus.subscribe(&hover, &a);
        bus.publish(&hover, Message::Reset);

        let d = inbox.try_recv().unwrap();
        assert_eq!(d.bus, Some(hover));
        assert!(d.from.is_none());
    }

    #[test]
    fn buses_are_isolated() {
        let bus = EventBus::new();
        let (a, mut inbox) = mailbox(ActorId::named("a"));
        bus.subscribe(&BusId::new("api"), &a);

        assert_eq!(bus.publish(&BusId::new("hover"), Message::Reset), 0);
        assert!(inbox.drain().is_empty());
    }

    #[test]
    fn filter_by_kind() {
        let bus = EventBus::new();
        let api = BusId::new("api");
        let (a, mut inbox) = mailbox(ActorId::named("a"));
        bus.subscribe_filtered(&api, &a, &[MessageKind::Error]);

        assert_eq!(bus.publish(&api, Message::Loading), 0);
        bus.publish(
            &api,
            Message::Error {
                message: "x".into(),
            },
        );
        assert_eq!(
            inbox.drain(),
            vec![Message::Error {
                message: "x".into()
            }]
        );
    }

    #[test]
    fn unsubscribe_removes_all() {
        let bus = EventBus::new();
        let (a, mut inbox) = mailbox(ActorId::named("a"));
        let (b, _b_in) = mailbox(ActorId::named("b"));
        bus.subscribe(&BusId::new("api"), &a);
        bus.subscribe(&BusId::new("hover"), &a);
        bus.subscribe(&BusId::new("api"), &b);

        bus.unsubscribe(a.id());
        assert_eq!(bus.subscribers(&BusId::new("api")), vec![b.id().clone()]);
        assert!(bus.subscribers(&BusId::new("hover")).is_empty());
        bus.publish(&BusId::new("api"), Message::Loading);
        assert!(inbox.drain().is_empty());
    }

    #[test]
    fn closed_subscriber_pruned() {
        let bus = EventBus::new();
        let api = BusId::new("api");
        let (a, inbox) = mailbox(ActorId::named("a"));
        let (b, _b_in) = mailbox(ActorId::named("b"));
        bus.subscribe(&api, &a);
        bus.subscribe(&api, &b);
        drop(inbox);

        assert_eq!(bus.publish(&api, Message::Loading), 1);
        assert_eq!(bus.subscribers(&api), vec![b.id().clone()]);
    }
}
