use bytes::Bytes;

/// Cache key type
pub type KeyType = Bytes;

/// Cache value associated with a key
pub type ValueType = Bytes;

/// Flags are kept exactly as the client sent them
pub type FlagsType = Bytes;

/// Meta data stored with cache value
#[derive(Clone, Debug)]
pub struct CacheMetaData {
    pub(crate) cas: u64,
    pub(crate) flags: FlagsType,
}

impl CacheMetaData {
    pub fn new(cas: u64, flags: FlagsType) -> CacheMetaData {
        CacheMetaData { cas, flags }
    }

    pub fn cas(&self) -> u64 {
        self.cas
    }

    pub fn flags(&self) -> &FlagsType {
        &self.flags
    }
}

/// Value and meta data stored in cache
#[derive(Clone, Debug)]
pub struct Record {
    pub(crate) header: CacheMetaData,
    pub(crate) value: ValueType,
}

impl Record {
    /// Creates a record that has not been stored yet, cas is assigned by the store.
    pub fn new(value: ValueType, flags: FlagsType) -> Record {
        let header = CacheMetaData::new(0, flags);
        Record { header, value }
    }

    pub fn header(&self) -> &CacheMetaData {
        &self.header
    }

    pub fn value(&self) -> &ValueType {
        &self.value
    }

    /// Byte length of the value, always equal to the length declared by the
    /// storage command that produced it.
    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && self.header.flags == other.header.flags
    }
}

/// Result of set operation on cache
/// cas indicates version stored in cache
#[derive(Debug, PartialEq, Eq)]
pub struct SetStatus {
    pub cas: u64,
}

/// What a store does with the expiration table entry of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiration {
    /// Remove any deadline, the key never expires
    Never,
    /// Absolute deadline in timer milliseconds
    At(u64),
}

impl Expiration {
    /// Translates a protocol time to live (seconds) into a deadline.
    ///
    /// A negative ttl expires the key right away, zero keeps it forever.
    pub fn from_time_to_live(time_to_live: i64, now: u64) -> Expiration {
        match time_to_live {
            0 => Expiration::Never,
            ttl if ttl < 0 => Expiration::At(now),
            ttl => Expiration::At(now.saturating_add((ttl as u64).saturating_mul(1000))),
        }
    }
}
