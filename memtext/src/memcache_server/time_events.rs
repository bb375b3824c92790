use std::time::Duration;
use tokio::time::Instant;

/// Work the reactor runs when a timer is due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    ExpirationSweep,
}

/// What happens to a timer after its action ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerOutcome {
    Done,
    Reschedule(Duration),
}

#[derive(Debug)]
pub struct TimeEvent {
    pub process_at: Instant,
    pub action: TimerAction,
}

/// Timers owned by the reactor, checked once per loop iteration.
#[derive(Debug, Default)]
pub struct TimeEvents {
    events: Vec<TimeEvent>,
}

impl TimeEvents {
    pub fn new() -> TimeEvents {
        Default::default()
    }

    pub fn schedule_at(&mut self, process_at: Instant, action: TimerAction) {
        self.events.push(TimeEvent { process_at, action });
    }

    pub fn schedule(&mut self, delay: Duration, action: TimerAction) {
        self.schedule_at(Instant::now() + delay, action);
    }

    /// Time left until the nearest timer, zero if one is overdue and `None`
    /// when nothing is scheduled.
    pub fn time_to_nearest(&self, now: Instant) -> Option<Duration> {
        self.events
            .iter()
            .map(|event| event.process_at.saturating_duration_since(now))
            .min()
    }

    /// Runs the action of every due timer. A rescheduled timer becomes due
    /// again the returned interval after `now`.
    pub fn process<F>(&mut self, now: Instant, mut run: F) -> usize
    where
        F: FnMut(TimerAction) -> TimerOutcome,
    {
        let mut processed = 0;
        self.events.retain_mut(|event| {
            if event.process_at > now {
                return true;
            }
            processed += 1;
            match run(event.action) {
                TimerOutcome::Done => false,
                TimerOutcome::Reschedule(interval) => {
                    event.process_at = now + interval;
                    true
                }
            }
        });
        processed
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
