//! Property-based tests for download bookkeeping.
//!
//! Whatever order the engine reports things in, the received byte count
//! never goes down, the destination never changes once set, and a finished
//! or failed download stays that way.

use std::path::PathBuf;

use lupine::managers::download_manager::{DownloadManager, DownloadManagerTrait};
use lupine::types::download::DownloadState;
use lupine::types::event::DownloadEvent;
use proptest::prelude::*;

fn arb_event() -> impl Strategy<Value = DownloadEvent> {
    prop_oneof![
        1 => proptest::option::of("[a-z]{1,8}\\.bin")
            .prop_map(|suggested_filename| DownloadEvent::DecideDestination { suggested_filename }),
        1 => "[a-z]{1,8}".prop_map(|name| DownloadEvent::CreatedDestination(PathBuf::from("/dl").join(name))),
        4 => (0u64..10_000, proptest::option::of(0u64..10_000))
            .prop_map(|(received, expected)| DownloadEvent::ReceivedData { received, expected }),
        1 => Just(DownloadEvent::Finished),
        1 => Just(DownloadEvent::Failed("network".to_string())),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn download_state_only_moves_forward(events in proptest::collection::vec(arb_event(), 1..40)) {
        let mut mgr = DownloadManager::new();
        let id = mgr.start("https://files.example/blob", None);

        let mut last_received = 0u64;
        let mut destination: Option<PathBuf> = None;
        let mut terminal: Option<DownloadState> = None;

        for event in events {
            mgr.handle_event(&id, event);
            let d = mgr.get(&id).unwrap();

            prop_assert!(d.received_bytes >= last_received);
            last_received = d.received_bytes;

            if let Some(before) = &destination {
                prop_assert_eq!(Some(before), d.destination.as_ref());
            } else {
                destination = d.destination.clone();
            }

            if let Some(state) = &terminal {
                prop_assert_eq!(state, &d.state);
            } else if d.state.is_terminal() {
                terminal = Some(d.state.clone());
            }

            if matches!(d.state, DownloadState::Receiving | DownloadState::Finished) {
                prop_assert!(d.destination.is_some());
            }
            if let Some(progress) = d.progress() {
                prop_assert!((0.0..=1.0).contains(&progress));
            }
        }

        prop_assert_eq!(mgr.active_count(), usize::from(terminal.is_none()));
    }

    #[test]
    fn list_keeps_newest_first(count in 1usize..20) {
        let mut mgr = DownloadManager::new();
        let ids: Vec<String> = (0..count)
            .map(|i| mgr.start(&format!("https://files.example/{}", i), None))
            .collect();
        let listed: Vec<String> = mgr.list().iter().map(|d| d.id.clone()).collect();
        let mut expected = ids;
        expected.reverse();
        prop_assert_eq!(listed, expected);
    }
}
