//! Property tests for both history actors against simple models.

use proptest::prelude::*;
use relabel_actor::{
    answer_history, mailbox, Actor, ActorTestHarness, Context, Input, Mailbox, Snapshottable,
};
use relabel_event::{EventError, Message, Snapshot};
use relabel_runtime::{HistoryActor, HistoryState, LabelHistoryActor, LabelHistoryState};
use relabel_types::{ActorId, EditId};
use std::collections::BTreeSet;

/// Target holding one integer.
#[derive(Debug, Default)]
struct Counter {
    value: i64,
}

impl Snapshottable for Counter {
    fn snapshot(&self) -> Result<Snapshot, EventError> {
        Snapshot::new().with_field("value", &self.value)
    }

    fn restore(&mut self, snapshot: &Snapshot) -> Result<(), EventError> {
        self.value = snapshot.field("value")?;
        Ok(())
    }
}

impl Actor for Counter {
    type Output = ();

    fn handle(&mut self, input: Input<()>, ctx: &mut Context<()>) {
        if let Input::Message(d) = input {
            if !answer_history(self, &d, ctx) {
                if let Message::SetFrame { t } = d.message {
                    self.value = t as i64;
                }
            }
        }
    }
}

fn snap(value: i64) -> Snapshot {
    Counter { value }.snapshot().unwrap()
}

struct Pair<H: Actor<Output = ()>> {
    history: ActorTestHarness<H>,
    target: ActorTestHarness<Counter>,
    _owner: Mailbox,
}

impl<H: Actor<Output = ()>> Pair<H> {
    fn new(make: impl FnOnce(relabel_actor::ActorRef, relabel_actor::ActorRef) -> H) -> Self {
        let (target_ref, target_inbox) = mailbox(ActorId::new("counter"));
        let (owner_ref, owner) = mailbox(ActorId::new("owner"));
        Self {
            history: ActorTestHarness::new(make(target_ref.clone(), owner_ref)),
            target: ActorTestHarness::with_mailbox(Counter::default(), target_ref, target_inbox),
            _owner: owner,
        }
    }

    fn command(&mut self, message: Message) {
        self.history.tell(message);
        while self.target.deliver_inbox() + self.history.deliver_inbox() > 0 {}
    }

    fn value(&self) -> i64 {
        self.target.actor().value
    }
}

#[derive(Debug, Clone)]
enum StackOp {
    Save(u8),
    Undo,
    Redo,
}

fn stack_op() -> impl Strategy<Value = StackOp> {
    prop_oneof![
        any::<u8>().prop_map(StackOp::Save),
        Just(StackOp::Undo),
        Just(StackOp::Redo),
    ]
}

#[derive(Debug, Clone)]
enum EditOp {
    Record(u8),
    Undo(u8),
    Redo(u8),
}

fn edit_op() -> impl Strategy<Value = EditOp> {
    let id = 0u8..6;
    prop_oneof![
        id.clone().prop_map(EditOp::Record),
        id.clone().prop_map(EditOp::Undo),
        id.prop_map(EditOp::Redo),
    ]
}

proptest! {
    #[test]
    fn stack_history_matches_model(ops in proptest::collection::vec(stack_op(), 1..40)) {
        let mut pair = Pair::new(HistoryActor::new);
        let mut past: Vec<i64> = Vec::new();
        let mut future: Vec<i64> = Vec::new();
        let mut current = 0i64;

        for op in ops {
            match op {
                StackOp::Save(v) => {
                    pair.target.tell(Message::SetFrame { t: usize::from(v) });
                    current = i64::from(v);
                    pair.command(Message::Save);
                    past.push(current);
                    future.clear();
                }
                StackOp::Undo if !past.is_empty() => {
                    pair.command(Message::Undo);
                    if let Some(top) = past.pop() {
                        future.push(top);
                    }
                    if let Some(&below) = past.last() {
                        current = below;
                    }
                }
                StackOp::Redo if !future.is_empty() => {
                    pair.command(Message::Redo);
                    if let Some(top) = future.pop() {
                        past.push(top);
                        current = top;
                    }
                }
                StackOp::Undo | StackOp::Redo => continue,
            }

            let h = pair.history.actor();
            prop_assert_eq!(h.state(), HistoryState::Idle);
            let expected_past = past.iter().map(|v| snap(*v)).collect::<Vec<_>>();
            let expected_future = future.iter().map(|v| snap(*v)).collect::<Vec<_>>();
            prop_assert_eq!(h.past(), expected_past.as_slice());
            prop_assert_eq!(h.future(), expected_future.as_slice());
            prop_assert_eq!(pair.value(), current);
        }
    }

    #[test]
    fn edit_history_keeps_past_and_future_disjoint(
        ops in proptest::collection::vec(edit_op(), 1..60)
    ) {
        let mut pair = Pair::new(LabelHistoryActor::new);
        let mut past: BTreeSet<u8> = BTreeSet::new();
        let mut future: BTreeSet<u8> = BTreeSet::new();
        let id = |n: u8| EditId::new(format!("e{n}"));

        for op in ops {
            match op {
                EditOp::Record(n) => {
                    pair.command(Message::Snapshot {
                        edit: id(n),
                        before: snap(-i64::from(n)),
                        after: snap(i64::from(n)),
                    });
                    future.clear();
                    past.insert(n);
                }
                EditOp::Undo(n) => {
                    pair.command(Message::UndoEdit { edit: id(n) });
                    if past.remove(&n) {
                        future.insert(n);
                        prop_assert_eq!(pair.value(), -i64::from(n));
                    }
                }
                EditOp::Redo(n) => {
                    pair.command(Message::RedoEdit { edit: id(n) });
                    if future.remove(&n) {
                        past.insert(n);
                        prop_assert_eq!(pair.value(), i64::from(n));
                    }
                }
            }

            let live: BTreeSet<u8> = past.union(&future).copied().collect();
            let h = pair.history.actor();
            prop_assert_eq!(h.state(), &LabelHistoryState::Idle);
            let in_past: BTreeSet<EditId> = h.past().keys().cloned().collect();
            let in_future: BTreeSet<EditId> = h.future().keys().cloned().collect();
            prop_assert!(in_past.is_disjoint(&in_future));
            prop_assert_eq!(
                in_past.union(&in_future).cloned().collect::<BTreeSet<_>>(),
                live.iter().map(|n| id(*n)).collect::<BTreeSet<_>>()
            );
            prop_assert_eq!(in_past, past.iter().map(|n| id(*n)).collect::<BTreeSet<_>>());
        }
    }
}
