use super::cache::KeyType;
use std::collections::{BTreeMap, HashMap};

/// Keys that carry a deadline, kept in insertion order.
///
/// Refreshing the deadline of a key that is already present keeps its
/// position, only removal gives a key a new slot.
#[derive(Default)]
pub struct ExpirationTable {
    deadlines: HashMap<KeyType, Deadline>,
    order: BTreeMap<u64, KeyType>,
    next_slot: u64,
    cursor: u64,
}

#[derive(Clone, Copy)]
struct Deadline {
    slot: u64,
    expires_at: u64,
}

/// Result of one bounded scan of the table
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ExpiredScan {
    pub checked: usize,
    pub expired: Vec<KeyType>,
}

impl ExpirationTable {
    pub fn new() -> ExpirationTable {
        Default::default()
    }

    pub fn insert(&mut self, key: KeyType, expires_at: u64) {
        match self.deadlines.get_mut(&key) {
            Some(deadline) => deadline.expires_at = expires_at,
            None => {
                let slot = self.next_slot;
                self.next_slot += 1;
                self.order.insert(slot, key.clone());
                self.deadlines.insert(key, Deadline { slot, expires_at });
            }
        }
    }

    pub fn remove(&mut self, key: &KeyType) -> Option<u64> {
        let deadline = self.deadlines.remove(key)?;
        self.order.remove(&deadline.slot);
        Some(deadline.expires_at)
    }

    pub fn expires_at(&self, key: &KeyType) -> Option<u64> {
        self.deadlines.get(key).map(|deadline| deadline.expires_at)
    }

    /// A key is expired once the clock reaches its deadline.
    pub fn is_expired(&self, key: &KeyType, now: u64) -> bool {
        match self.expires_at(key) {
            Some(expires_at) => expires_at <= now,
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }

    /// Looks at no more than `max_checks` keys, starting where the previous
    /// scan stopped and wrapping around to the oldest key.
    ///
    /// Nothing is removed here, the caller owns the values that go with
    /// the returned keys.
    pub fn scan_expired(&mut self, now: u64, max_checks: usize) -> ExpiredScan {
        let mut scan = ExpiredScan::default();
        let mut last_slot = None;
        for (slot, key) in self
            .order
            .range(self.cursor..)
            .chain(self.order.range(..self.cursor))
            .take(max_checks)
        {
            scan.checked += 1;
            last_slot = Some(*slot);
            if self.is_expired(key, now) {
                scan.expired.push(key.clone());
            }
        }
        if let Some(slot) = last_slot {
            self.cursor = slot + 1;
        }
        scan
    }
}
