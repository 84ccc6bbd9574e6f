//! Unique identifiers for attachment file names.

use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Source of per-attachment identifiers. Must never repeat within a process.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// Random UUID v4 in simple (hyphen-less) form.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}

/// Monotonic counter, for deterministic runs.
#[derive(Debug, Default)]
pub struct SequentialIds {
    next: AtomicU64,
}

impl SequentialIds {
    pub fn starting_at(start: u64) -> Self {
        Self {
            next: AtomicU64::new(start),
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> String {
        self.next.fetch_add(1, Ordering::Relaxed).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_sequential_ids_increment() {
        let ids = SequentialIds::starting_at(5);
        assert_eq!(ids.next_id(), "5");
        assert_eq!(ids.next_id(), "6");
    }

    #[test]
    fn test_uuid_ids_do_not_repeat() {
        let ids = UuidIds;
        let seen: HashSet<String> = (0..1000).map(|_| ids.next_id()).collect();
        assert_eq!(seen.len(), 1000);
        assert!(seen.iter().all(|id| id.len() == 32 && !id.contains('-')));
    }
}
