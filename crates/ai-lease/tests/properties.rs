use std::sync::Arc;

use ai_core::ManualClock;
use ai_lease::{LeaseGuard, LeaseManager, LeasePriority};
use proptest::prelude::*;

fn priority() -> impl Strategy<Value = LeasePriority> {
    prop_oneof![
        Just(LeasePriority::Normal),
        Just(LeasePriority::High),
        Just(LeasePriority::Emergency),
    ]
}

proptest! {
    /// `true` acquires, `false` releases the most recent guard.
    #[test]
    fn ref_count_tracks_net_acquisitions(ops in proptest::collection::vec(any::<bool>(), 1..64)) {
        let leases = LeaseManager::new(Arc::new(ManualClock::new(0)));
        let mut guards: Vec<LeaseGuard> = Vec::new();

        for acquire in ops {
            if acquire {
                let guard = leases.acquire("nav", LeasePriority::Normal, None);
                prop_assert!(guard.is_some());
                guards.extend(guard);
            } else if let Some(mut guard) = guards.pop() {
                prop_assert!(guard.release());
            }

            prop_assert_eq!(leases.ref_count() as usize, guards.len());
            if guards.is_empty() {
                prop_assert_eq!(leases.holder(), None);
            } else {
                let holder = leases.holder();
                prop_assert_eq!(holder.as_deref(), Some("nav"));
            }
        }
    }

    #[test]
    fn effective_priority_is_running_max(requests in proptest::collection::vec(priority(), 1..16)) {
        let leases = LeaseManager::new(Arc::new(ManualClock::new(0)));
        let mut guards = Vec::new();
        let mut expected = LeasePriority::Normal;

        for requested in requests {
            guards.push(leases.acquire("nav", requested, None));
            expected = expected.max(requested);
            prop_assert_eq!(leases.priority(), Some(expected));
        }
        prop_assert!(guards.iter().all(Option::is_some));
    }

    #[test]
    fn foreign_release_never_changes_state(
        refs in 1usize..8,
        other in "[a-z]{1,8}",
    ) {
        prop_assume!(other != "nav");
        let leases = LeaseManager::new(Arc::new(ManualClock::new(0)));
        let _guards: Vec<_> = (0..refs)
            .map(|_| leases.acquire("nav", LeasePriority::High, None))
            .collect();
        let before = leases.snapshot();

        leases.release(&other);

        prop_assert_eq!(leases.snapshot(), before);
    }
}
