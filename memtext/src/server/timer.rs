use std::time::Instant;

/// Clock read by the store to stamp and check deadlines.
pub trait Timer {
    /// Milliseconds elapsed since the timer was created.
    fn timestamp(&self) -> u64;
}

pub struct SystemTimer {
    start: Instant,
}

impl SystemTimer {
    pub fn new() -> Self {
        debug!("Creating system timer");
        SystemTimer {
            start: Instant::now(),
        }
    }
}

impl Default for SystemTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer for SystemTimer {
    fn timestamp(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}
