//! Timer scheduling for the game loop
//!
//! The engine never sleeps or reads a clock itself. It asks a [`Scheduler`]
//! for timers and the host pumps due timer ids back into the game. Tests use
//! [`ManualScheduler`] to step virtual time; real hosts use
//! [`RealtimeScheduler`].

use std::ops::Add;
use std::time::{Duration, Instant};

/// Shortest period a repeating timer may have
const MIN_PERIOD: Duration = Duration::from_nanos(1);

/// Handle for a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Timer service the game loop depends on
pub trait Scheduler {
    /// Fire every `interval`, first after one interval
    fn schedule_repeating(&mut self, interval: Duration) -> TimerId;

    /// Fire once after `delay`
    fn schedule_once(&mut self, delay: Duration) -> TimerId;

    /// Stop a timer. Returns false if it was not pending.
    fn cancel(&mut self, id: TimerId) -> bool;

    /// The earliest timer that is due now, if any. Repeating timers are
    /// re-armed, one-shot timers are consumed.
    fn poll_due(&mut self) -> Option<TimerId>;

    /// Number of live timers
    fn pending(&self) -> usize;
}

impl<S: Scheduler + ?Sized> Scheduler for &mut S {
    fn schedule_repeating(&mut self, interval: Duration) -> TimerId {
        (**self).schedule_repeating(interval)
    }

    fn schedule_once(&mut self, delay: Duration) -> TimerId {
        (**self).schedule_once(delay)
    }

    fn cancel(&mut self, id: TimerId) -> bool {
        (**self).cancel(id)
    }

    fn poll_due(&mut self) -> Option<TimerId> {
        (**self).poll_due()
    }

    fn pending(&self) -> usize {
        (**self).pending()
    }
}

#[derive(Debug, Clone)]
struct Entry<T> {
    id: TimerId,
    deadline: T,
    period: Option<Duration>,
}

/// Timer table shared by both schedulers, generic over the clock type
#[derive(Debug, Clone)]
struct TimerQueue<T> {
    entries: Vec<Entry<T>>,
    next_id: u64,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }
}

impl<T> TimerQueue<T>
where
    T: Copy + Ord + Add<Duration, Output = T>,
{
    /// Add a timer. A zero period is raised to [`MIN_PERIOD`] so a drain
    /// always terminates.
    fn insert(&mut self, now: T, delay: Duration, period: Option<Duration>) -> TimerId {
        let period = period.map(|period| period.max(MIN_PERIOD));
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            deadline: now + delay,
            period,
        });
        id
    }

    fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }

    fn contains(&self, id: TimerId) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    fn next_deadline(&self) -> Option<T> {
        self.entries.iter().map(|entry| entry.deadline).min()
    }

    /// Pop the earliest entry due at `now`, ties going to the older timer.
    /// Returns the id and the deadline it fired for.
    fn pop_due(&mut self, now: T) -> Option<(TimerId, T)> {
        let index = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.deadline <= now)
            .min_by_key(|(_, entry)| (entry.deadline, entry.id))
            .map(|(index, _)| index)?;

        let entry = &mut self.entries[index];
        let fired = (entry.id, entry.deadline);
        let period = entry.period;
        match period {
            Some(period) => entry.deadline = entry.deadline + period,
            None => {
                self.entries.swap_remove(index);
            }
        }
        Some(fired)
    }
}

/// Virtual clock scheduler. Time only moves when [`ManualScheduler::advance`]
/// is called.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    queue: TimerQueue<Duration>,
    /// Time of the most recently fired timer, or the target once drained
    now: Duration,
    /// How far time may run
    target: Duration,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Let `by` more time pass. Timers fire as they are polled; with none
    /// due the clock moves straight to the new target.
    pub fn advance(&mut self, by: Duration) {
        self.target += by;
        if self
            .queue
            .next_deadline()
            .is_none_or(|deadline| deadline > self.target)
        {
            self.now = self.target;
        }
    }

    /// Virtual time since creation
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn is_scheduled(&self, id: TimerId) -> bool {
        self.queue.contains(id)
    }

    /// Time left until the next timer fires
    pub fn until_next(&self) -> Option<Duration> {
        self.queue
            .next_deadline()
            .map(|deadline| deadline.saturating_sub(self.now))
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_repeating(&mut self, interval: Duration) -> TimerId {
        self.queue.insert(self.now, interval, Some(interval))
    }

    fn schedule_once(&mut self, delay: Duration) -> TimerId {
        self.queue.insert(self.now, delay, None)
    }

    fn cancel(&mut self, id: TimerId) -> bool {
        self.queue.cancel(id)
    }

    fn poll_due(&mut self) -> Option<TimerId> {
        match self.queue.pop_due(self.target) {
            Some((id, deadline)) => {
                self.now = deadline;
                Some(id)
            }
            None => {
                self.now = self.target;
                None
            }
        }
    }

    fn pending(&self) -> usize {
        self.queue.entries.len()
    }
}

/// Wall clock scheduler
#[derive(Debug, Clone, Default)]
pub struct RealtimeScheduler {
    queue: TimerQueue<Instant>,
}

impl RealtimeScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// When the next timer is due, so a host can sleep until then
    pub fn next_deadline(&self) -> Option<Instant> {
        self.queue.next_deadline()
    }
}

impl Scheduler for RealtimeScheduler {
    fn schedule_repeating(&mut self, interval: Duration) -> TimerId {
        self.queue.insert(Instant::now(), interval, Some(interval))
    }

    fn schedule_once(&mut self, delay: Duration) -> TimerId {
        self.queue.insert(Instant::now(), delay, None)
    }

    fn cancel(&mut self, id: TimerId) -> bool {
        self.queue.cancel(id)
    }

    fn poll_due(&mut self) -> Option<TimerId> {
        self.queue.pop_due(Instant::now()).map(|(id, _)| id)
    }

    fn pending(&self) -> usize {
        self.queue.entries.len()
    }
}
