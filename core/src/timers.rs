//! Cancellable one-shot and repeating timers driven by frame deltas.

use std::time::Duration;

/// Smallest interval a repeating timer may use.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Handle identifying a scheduled timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

#[derive(Clone, Debug)]
struct Entry<K> {
    handle: TimerHandle,
    due: Duration,
    interval: Option<Duration>,
    key: K,
}

/// Pending timers keyed by an owner-defined tag.
///
/// The wheel keeps its own clock that only moves through [`TimerWheel::advance`]
/// and [`TimerWheel::pop_due`].
/// Cancelled timers never fire and cancelling is always safe to repeat.
#[derive(Clone, Debug)]
pub struct TimerWheel<K> {
    now: Duration,
    next_handle: u64,
    entries: Vec<Entry<K>>,
}

impl<K> Default for TimerWheel<K> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            next_handle: 0,
            entries: Vec::new(),
        }
    }
}

impl<K: Copy> TimerWheel<K> {
    /// Creates an empty wheel whose clock starts at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current reading of the wheel clock.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Schedules `key` to fire once after `delay`.
    pub fn schedule(&mut self, delay: Duration, key: K) -> TimerHandle {
        self.insert(delay, None, key)
    }

    /// Schedules `key` to fire after `delay` and then every `interval`.
    pub fn schedule_repeating(&mut self, delay: Duration, interval: Duration, key: K) -> TimerHandle {
        self.insert(delay, Some(interval.max(MIN_INTERVAL)), key)
    }

    fn insert(&mut self, delay: Duration, interval: Option<Duration>, key: K) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        self.entries.push(Entry {
            handle,
            due: self.now.saturating_add(delay),
            interval,
            key,
        });
        handle
    }

    /// Cancels the timer behind `handle`.
    ///
    /// Returns `false` when the timer already fired, was already cancelled, or
    /// never existed.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.handle != handle);
        self.entries.len() != before
    }

    /// Reports whether the timer behind `handle` is still waiting to fire.
    #[must_use]
    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.entries.iter().any(|entry| entry.handle == handle)
    }

    /// Number of timers still waiting to fire.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    /// Cancels every pending timer.
    pub fn cancel_all(&mut self) {
        self.entries.clear();
    }

    /// Moves the clock forward by `dt`, appending every key that falls due.
    ///
    /// Keys are appended in due order with ties broken by scheduling order. A
    /// repeating timer appears once for every interval that elapsed.
    pub fn advance(&mut self, dt: Duration, out: &mut Vec<K>) {
        let deadline = self.now.saturating_add(dt);
        while let Some(key) = self.pop_due(deadline) {
            out.push(key);
        }
    }

    /// Fires the earliest timer due at or before `deadline`.
    ///
    /// The clock stops at the fired timer's due time, so anything scheduled
    /// while handling the key is measured from that instant and may fire
    /// before `deadline` too. Once nothing is due the clock moves to
    /// `deadline` and `None` is returned.
    pub fn pop_due(&mut self, deadline: Duration) -> Option<K> {
        let Some(index) = self.next_due(deadline) else {
            self.now = self.now.max(deadline);
            return None;
        };

        let Entry {
            key, interval, due, ..
        } = self.entries[index];
        self.now = self.now.max(due);
        match interval {
            Some(interval) => self.entries[index].due = due.saturating_add(interval),
            None => {
                let _ = self.entries.remove(index);
            }
        }
        Some(key)
    }

    fn next_due(&self, target: Duration) -> Option<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.due <= target)
            .min_by_key(|(_, entry)| (entry.due, entry.handle))
            .map(|(index, _)| index)
    }
}
