use crewbot_core::appointments::{Appointment, AppointmentStore, InMemoryBackend};
use proptest::prelude::*;

fn appointments() -> impl Strategy<Value = Vec<Appointment>> {
    prop::collection::vec(
        ("2025-01-0[1-4] 1[0-2]:00", "[a-zA-Z ]{1,12}")
            .prop_map(|(time, description)| Appointment::new(time, description)),
        0..12,
    )
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime")
}

proptest! {
    /// Cancelling removes exactly the appointments at that time.
    #[test]
    fn cancel_removes_only_exact_matches(
        seed in appointments(),
        target in "2025-01-0[1-4] 1[0-2]:00"
    ) {
        let expected_left: Vec<_> = seed.iter().filter(|a| a.time != target).cloned().collect();
        let matching = seed.len() - expected_left.len();

        let (result, left) = runtime().block_on(async {
            let store = AppointmentStore::open(InMemoryBackend::with_appointments(seed.clone()))
                .await
                .expect("open");
            let result = store.cancel(&target).await;
            (result, store.list().await)
        });

        if matching == 0 {
            prop_assert!(result.is_err());
        } else {
            prop_assert_eq!(result.ok(), Some(matching));
        }

        let mut expected_sorted = expected_left;
        expected_sorted.sort_by(|a, b| a.time.cmp(&b.time));
        prop_assert_eq!(left, expected_sorted);
    }

    /// Rescheduling an unknown time leaves the store unchanged.
    #[test]
    fn reschedule_unknown_time_changes_nothing(seed in appointments()) {
        let (before, result, after) = runtime().block_on(async {
            let store = AppointmentStore::open(InMemoryBackend::with_appointments(seed))
                .await
                .expect("open");
            let before = store.list().await;
            let result = store.reschedule("1999-12-31 23:59", "2000-01-01 00:00").await;
            (before, result, store.list().await)
        });

        prop_assert!(result.is_err());
        prop_assert_eq!(before, after);
    }

    /// Listing is always sorted by time and keeps every record.
    #[test]
    fn list_is_sorted(seed in appointments()) {
        let list = runtime().block_on(async {
            AppointmentStore::open(InMemoryBackend::with_appointments(seed.clone()))
                .await
                .expect("open")
                .list()
                .await
        });

        prop_assert_eq!(list.len(), seed.len());
        prop_assert!(list.windows(2).all(|w| w[0].time <= w[1].time));
    }
}
