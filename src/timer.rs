use std::time::Duration;

/// What a timer delivers when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Periodic cursor poll.
    SamplePointer,
    /// Walk cycle frame tick.
    AdvanceFrame,
    /// One-shot end of a walking episode.
    StopEpisode,
}

/// Cancellable handle to a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// A timer that came due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired {
    pub id: TimerId,
    pub event: TimerEvent,
    pub at: Duration,
}

/// Ability to arm and cancel timers. Time is measured from an arbitrary
/// origin and only ever moves forward.
pub trait Scheduler {
    fn now(&self) -> Duration;
    fn schedule_once(&mut self, delay: Duration, event: TimerEvent) -> TimerId;
    fn schedule_repeating(&mut self, period: Duration, event: TimerEvent) -> TimerId;
    /// Returns false if the timer already fired (one-shot) or was cancelled.
    fn cancel(&mut self, id: TimerId) -> bool;
}

struct Entry {
    id: TimerId,
    due: Duration,
    period: Option<Duration>,
    event: TimerEvent,
    /// Arm order, used to break ties between equal due times.
    seq: u64,
}

/// Single-threaded timer queue on a virtual clock.
///
/// Nothing fires on its own: the owner calls [`TimerQueue::pop_due`] with
/// the current time and handles each event before asking for the next.
/// Timers due at the same instant fire in arm order, and a repeating
/// timer counts as re-armed when it fires.
#[derive(Default)]
pub struct TimerQueue {
    now: Duration,
    entries: Vec<Entry>,
    next_id: u64,
    next_seq: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self {
            // poll + frame tick + stop timeout
            entries: Vec::with_capacity(4),
            ..Self::default()
        }
    }

    fn arm(&mut self, due: Duration, period: Option<Duration>, event: TimerEvent) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let seq = self.bump_seq();
        self.entries.push(Entry {
            id,
            due,
            period,
            event,
            seq,
        });
        id
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    /// Earliest pending deadline, if any timer is armed.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.entries.iter().map(|e| e.due).min()
    }

    /// Fire the earliest timer due at or before `until`.
    ///
    /// The clock advances to the fired timer's due time. Once nothing is
    /// due, the clock advances to `until` and `None` is returned.
    pub fn pop_due(&mut self, until: Duration) -> Option<Fired> {
        let idx = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due <= until)
            .min_by_key(|(_, e)| (e.due, e.seq))
            .map(|(i, _)| i);

        let Some(idx) = idx else {
            if until > self.now {
                self.now = until;
            }
            return None;
        };

        let due = self.entries[idx].due;
        if due > self.now {
            self.now = due;
        }

        let fired = match self.entries[idx].period {
            Some(period) => {
                let seq = self.bump_seq();
                let entry = &mut self.entries[idx];
                entry.due = due + period;
                entry.seq = seq;
                Fired {
                    id: entry.id,
                    event: entry.event,
                    at: due,
                }
            }
            None => {
                let entry = self.entries.swap_remove(idx);
                Fired {
                    id: entry.id,
                    event: entry.event,
                    at: due,
                }
            }
        };
        Some(fired)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Scheduler for TimerQueue {
    fn now(&self) -> Duration {
        self.now
    }

    fn schedule_once(&mut self, delay: Duration, event: TimerEvent) -> TimerId {
        debug_assert!(!delay.is_zero(), "zero-delay timer for {event:?}");
        self.arm(self.now + delay, None, event)
    }

    fn schedule_repeating(&mut self, period: Duration, event: TimerEvent) -> TimerId {
        debug_assert!(!period.is_zero(), "zero-period timer for {event:?}");
        // A zero period would re-fire at the same instant forever.
        let period = period.max(Duration::from_millis(1));
        self.arm(self.now + period, Some(period), event)
    }

    fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }
}
