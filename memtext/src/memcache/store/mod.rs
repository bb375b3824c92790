use crate::cache::cache::{
    Expiration, FlagsType, KeyType as CacheKeyType, Record as CacheRecord,
    SetStatus as CacheSetStatus, ValueType,
};
use crate::cache::error::{CacheError, Result};
use crate::cache::expiration::ExpirationTable;
use crate::server::timer;
use bytes::BytesMut;
use std::collections::HashMap;
use std::sync::Arc;

pub type Record = CacheRecord;
pub type SetStatus = CacheSetStatus;
pub type KeyType = CacheKeyType;

/// Counters of one active expiration pass
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SweepStats {
    pub checked: usize,
    pub evicted: usize,
}

/**
 * Implements Memcache text commands on top of
 * an in-memory key value table
 */
pub struct MemcStore {
    memory: HashMap<KeyType, Record>,
    expiration: ExpirationTable,
    cas_id: u64,
    timer: Arc<dyn timer::Timer + Send + Sync>,
}

impl MemcStore {
    pub fn new(timer: Arc<dyn timer::Timer + Send + Sync>) -> MemcStore {
        MemcStore {
            memory: HashMap::new(),
            expiration: ExpirationTable::new(),
            cas_id: 1,
            timer,
        }
    }

    /// Returns a value associated with a key, expired keys are purged first.
    pub fn get(&mut self, key: &KeyType) -> Result<Record> {
        self.lookup(key).cloned().ok_or(CacheError::NotFound)
    }

    /// Always stores, overwriting any previous record.
    pub fn set(&mut self, key: KeyType, record: Record, time_to_live: i64) -> Result<SetStatus> {
        let expiration = Expiration::from_time_to_live(time_to_live, self.timer.timestamp());
        match expiration {
            Expiration::Never => {
                self.expiration.remove(&key);
            }
            Expiration::At(expires_at) => self.expiration.insert(key.clone(), expires_at),
        }
        Ok(self.store_record(key, record))
    }

    /// Stores only if the key is not present.
    pub fn add(&mut self, key: KeyType, record: Record, time_to_live: i64) -> Result<SetStatus> {
        if self.lookup(&key).is_some() {
            return Err(CacheError::NotStored);
        }
        self.set(key, record, time_to_live)
    }

    /// Stores only if the key is present.
    pub fn replace(
        &mut self,
        key: KeyType,
        record: Record,
        time_to_live: i64,
    ) -> Result<SetStatus> {
        if self.lookup(&key).is_none() {
            return Err(CacheError::NotStored);
        }
        self.set(key, record, time_to_live)
    }

    /// Adds data after the existing value. Flags and deadline of the
    /// stored record are kept, the ones of `new_record` are ignored.
    pub fn append(&mut self, key: KeyType, new_record: Record) -> Result<SetStatus> {
        self.append_prepend_common(key, new_record, true)
    }

    /// Adds data before the existing value, see [`MemcStore::append`].
    pub fn prepend(&mut self, key: KeyType, new_record: Record) -> Result<SetStatus> {
        self.append_prepend_common(key, new_record, false)
    }

    /// Stores only if the record was not modified since `cas` was handed
    /// out to the client.
    pub fn cas(
        &mut self,
        key: KeyType,
        record: Record,
        time_to_live: i64,
        cas: u64,
    ) -> Result<SetStatus> {
        let stored_cas = match self.lookup(&key) {
            Some(stored) => stored.header.cas,
            None => return Err(CacheError::NotFound),
        };
        if stored_cas != cas {
            return Err(CacheError::KeyExists);
        }
        self.set(key, record, time_to_live)
    }

    /// Active expiration: examines at most `max_checks` keys that carry a
    /// deadline and evicts the expired ones.
    pub fn remove_expired(&mut self, max_checks: usize) -> SweepStats {
        let now = self.timer.timestamp();
        let scan = self.expiration.scan_expired(now, max_checks);
        for key in scan.expired.iter() {
            trace!("Evicting {:?}", key);
            self.remove(key);
        }
        SweepStats {
            checked: scan.checked,
            evicted: scan.expired.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.memory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memory.is_empty()
    }

    /// Deadline of a key in timer milliseconds, if it has one
    pub fn expires_at(&self, key: &KeyType) -> Option<u64> {
        self.expiration.expires_at(key)
    }

    fn lookup(&mut self, key: &KeyType) -> Option<&Record> {
        if self.expiration.is_expired(key, self.timer.timestamp()) {
            trace!("Purging {:?}", key);
            self.remove(key);
            return None;
        }
        self.memory.get(key)
    }

    fn remove(&mut self, key: &KeyType) {
        self.memory.remove(key);
        self.expiration.remove(key);
    }

    fn store_record(&mut self, key: KeyType, mut record: Record) -> SetStatus {
        let cas = self.get_cas_id();
        record.header.cas = cas;
        self.memory.insert(key, record);
        SetStatus { cas }
    }

    fn get_cas_id(&mut self) -> u64 {
        let cas = self.cas_id;
        self.cas_id += 1;
        cas
    }

    fn append_prepend_common(
        &mut self,
        key: KeyType,
        new_record: Record,
        is_append: bool,
    ) -> Result<SetStatus> {
        let prev_record = match self.lookup(&key) {
            Some(record) => record,
            None => return Err(CacheError::NotStored),
        };
        let flags: FlagsType = prev_record.header.flags.clone();
        let mut new_value = BytesMut::with_capacity(prev_record.len() + new_record.len());
        if is_append {
            new_value.extend_from_slice(&prev_record.value);
            new_value.extend_from_slice(&new_record.value);
        } else {
            new_value.extend_from_slice(&new_record.value);
            new_value.extend_from_slice(&prev_record.value);
        }
        let value: ValueType = new_value.freeze();
        Ok(self.store_record(key, Record::new(value, flags)))
    }
}


#[cfg(test)]
mod test_utils {
    pub use super::*;
    pub use crate::cache::error::CacheError;
    pub use crate::mock::mock_server::{create_server, SetableTimer};
    pub use bytes::Bytes;

    pub fn record(value: &str, flags: &str) -> Record {
        Record::new(
            Bytes::copy_from_slice(value.as_bytes()),
            Bytes::copy_from_slice(flags.as_bytes()),
        )
    }
}
