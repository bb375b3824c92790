use crate::memcache::store::MemcStore;
use crate::server::timer;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub struct MockSystemTimer {
    pub current_time: AtomicU64,
}

pub trait SetableTimer: timer::Timer {
    fn set(&self, time: u64);
    fn add_seconds(&self, seconds: u64);
    fn add_millis(&self, millis: u64);
}

impl MockSystemTimer {
    pub fn new() -> Self {
        MockSystemTimer {
            current_time: AtomicU64::new(0),
        }
    }
}

impl Default for MockSystemTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl timer::Timer for MockSystemTimer {
    fn timestamp(&self) -> u64 {
        self.current_time.load(Ordering::Relaxed)
    }
}

impl SetableTimer for MockSystemTimer {
    fn set(&self, time: u64) {
        self.current_time.store(time, Ordering::Relaxed)
    }

    fn add_seconds(&self, seconds: u64) {
        self.add_millis(seconds * 1000);
    }

    fn add_millis(&self, millis: u64) {
        self.current_time.fetch_add(millis, Ordering::Release);
    }
}

pub struct MockServer {
    pub timer: Arc<MockSystemTimer>,
    pub storage: MemcStore,
}

impl MockServer {
    pub fn new(timer: Arc<MockSystemTimer>) -> Self {
        MockServer {
            storage: MemcStore::new(timer.clone()),
            timer,
        }
    }
}

pub fn create_server() -> MockServer {
    MockServer::new(Arc::new(MockSystemTimer::new()))
}
