//! Unique identifier generation.

use uuid::Uuid;

/// Source of globally unique identifiers for messages and conversations.
///
/// Implementations must be callable concurrently from any task; no
/// coordination between calls is expected.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> Uuid;
}

/// Time-ordered 128-bit identifiers backed by ULIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NewIdGenerator;

impl IdGenerator for NewIdGenerator {
    fn next_id(&self) -> Uuid {
        Uuid::from_u128(ulid::Ulid::new().0)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Deterministic generator: 1, 2, 3, ...
    #[derive(Debug, Default)]
    pub struct SequentialIds {
        next: AtomicU64,
    }

    impl IdGenerator for SequentialIds {
        fn next_id(&self) -> Uuid {
            Uuid::from_u128(u128::from(self.next.fetch_add(1, Ordering::SeqCst) + 1))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_ids_are_unique() {
        let ids = NewIdGenerator;
        let seen: HashSet<Uuid> = (0..1000).map(|_| ids.next_id()).collect();
        assert_eq!(seen.len(), 1000);
    }

    #[test]
    fn test_ids_unique_across_threads() {
        let ids = Arc::new(NewIdGenerator);
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let ids = Arc::clone(&ids);
                std::thread::spawn(move || (0..250).map(|_| ids.next_id()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            seen.extend(handle.join().unwrap());
        }
        assert_eq!(seen.len(), 1000);
    }

    #[test]
    fn test_sequential_fixture() {
        let ids = fixtures::SequentialIds::default();
        assert_eq!(ids.next_id(), Uuid::from_u128(1));
        assert_eq!(ids.next_id(), Uuid::from_u128(2));
    }
}
