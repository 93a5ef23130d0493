//! Property tests for replay order over mixed events and tombstones.

use std::collections::BTreeSet;

use eventvault::model::{
    Event, EventHistory, HistoryEntry, Secret, Subject, sort_for_replay,
};
use proptest::prelude::*;

fn entry(index: usize, sequence: u8, deleted: bool, secret: Option<u8>) -> HistoryEntry {
    let event = Event {
        event_id: format!("e{index:04}").into(),
        sequence: format!("{sequence:04}").into(),
        account_id: "A1".into(),
        subject: match secret {
            Some(s) => Subject::Pseudonymous(Secret::new(format!("s{s}").into(), "sealed")),
            None => Subject::Anonymous,
        },
        payload: "p".to_string(),
    };
    if deleted {
        event.tombstone().into()
    } else {
        event.into()
    }
}

fn entries() -> impl Strategy<Value = Vec<HistoryEntry>> {
    prop::collection::vec((0u8..16, any::<bool>(), prop::option::of(0u8..4)), 0..40).prop_map(
        |specs| {
            specs
                .into_iter()
                .enumerate()
                .map(|(i, (seq, deleted, secret))| entry(i, seq, deleted, secret))
                .collect()
        },
    )
}

proptest! {
    #[test]
    fn replay_order_is_sequence_then_event_id(mut list in entries()) {
        let before: BTreeSet<String> = list.iter().map(|e| e.event_id().to_string()).collect();
        sort_for_replay(&mut list);

        for pair in list.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            prop_assert!(
                (a.sequence(), a.event_id()) < (b.sequence(), b.event_id()),
                "{:?} before {:?}", a.event_id(), b.event_id()
            );
        }
        let after: BTreeSet<String> = list.iter().map(|e| e.event_id().to_string()).collect();
        prop_assert_eq!(before, after);
    }

    #[test]
    fn history_order_matches_sorted_entries(list in entries()) {
        let mut history = EventHistory::new("A1".into());
        for e in list.iter().rev() {
            history.insert(e.clone()).unwrap();
        }

        let mut expected = list.clone();
        sort_for_replay(&mut expected);
        let ordered: Vec<HistoryEntry> = history.ordered().into_iter().cloned().collect();
        prop_assert_eq!(ordered, expected);
    }

    #[test]
    fn deletion_keeps_position(list in entries(), pick in any::<prop::sample::Index>()) {
        let mut history = EventHistory::new("A1".into());
        for e in &list {
            history.insert(e.clone()).unwrap();
        }
        let active: Vec<_> = history.events().into_iter().map(|e| e.event_id.clone()).collect();
        prop_assume!(!active.is_empty());
        let target = pick.get(&active).clone();

        let before: Vec<String> = history.ordered().iter().map(|e| e.event_id().to_string()).collect();
        history.delete(&target).unwrap();
        let after: Vec<String> = history.ordered().iter().map(|e| e.event_id().to_string()).collect();

        prop_assert_eq!(before, after);
        prop_assert!(history.get(&target).unwrap().is_deleted());
    }
}
