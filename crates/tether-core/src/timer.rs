//! One-shot timers on a virtual clock.
//!
//! [`TimerManager`] never reads the wall clock. Its owner advances time
//! explicitly, which makes delay-driven behaviour (hover delays, debouncing)
//! deterministic: a host application advances it by the real elapsed time on
//! every frame, a test advances it by exactly the amount under test.
//!
//! The manager is generic over the payload stored with each timer. The
//! document stores boxed callbacks; the manager itself never invokes anything,
//! so callers can release their locks before running a payload.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Duration;

use slotmap::{SlotMap, new_key_type};

use crate::error::{CoreError, Result};
use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a timer.
    pub struct TimerId;
}

#[derive(Debug)]
struct TimerData<T> {
    fire_at: Duration,
    payload: T,
}

/// An entry in the timer queue (min-heap by fire time, then insertion order).
#[derive(Debug, Clone, Copy)]
struct TimerQueueEntry {
    id: TimerId,
    fire_at: Duration,
    sequence: u64,
}

impl PartialEq for TimerQueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.fire_at == other.fire_at && self.sequence == other.sequence
    }
}

impl Eq for TimerQueueEntry {}

impl PartialOrd for TimerQueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimerQueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap.
        other
            .fire_at
            .cmp(&self.fire_at)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Manages pending one-shot timers against a virtual clock.
#[derive(Debug)]
pub struct TimerManager<T> {
    now: Duration,
    timers: SlotMap<TimerId, TimerData<T>>,
    queue: BinaryHeap<TimerQueueEntry>,
    next_sequence: u64,
}

impl<T> TimerManager<T> {
    /// Create a new timer manager with the clock at zero.
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            timers: SlotMap::with_key(),
            queue: BinaryHeap::new(),
            next_sequence: 0,
        }
    }

    /// The current virtual time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Start a one-shot timer that becomes due after `delay`.
    ///
    /// Timers that become due at the same instant fire in the order they were
    /// started.
    pub fn start_one_shot(&mut self, delay: Duration, payload: T) -> TimerId {
        let fire_at = self.now + delay;
        let id = self.timers.insert(TimerData { fire_at, payload });
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.queue.push(TimerQueueEntry {
            id,
            fire_at,
            sequence,
        });
        tracing::trace!(target: targets::TIMER, ?id, ?delay, "timer started");
        id
    }

    /// Stop a pending timer, returning its payload.
    pub fn stop(&mut self, id: TimerId) -> Result<T> {
        let Some(data) = self.timers.remove(id) else {
            crate::tether_debug!(?id, "stop requested for unknown timer");
            return Err(CoreError::InvalidTimerId);
        };
        Ok(data.payload)
    }

    /// Check if a timer is still pending.
    pub fn is_active(&self, id: TimerId) -> bool {
        self.timers.contains_key(id)
    }

    /// Get the duration until the next timer is due, if any.
    pub fn time_until_next(&mut self) -> Option<Duration> {
        self.discard_stale();
        self.queue
            .peek()
            .map(|entry| entry.fire_at.saturating_sub(self.now))
    }

    /// Pop the earliest timer due at or before `deadline`.
    ///
    /// The clock moves forward to the popped timer's due time. Returns `None`
    /// when nothing is due by `deadline`; the clock is left untouched in that
    /// case so the caller can decide when to settle it with [`advance_to`].
    ///
    /// [`advance_to`]: Self::advance_to
    pub fn pop_due(&mut self, deadline: Duration) -> Option<(TimerId, T)> {
        self.discard_stale();
        let entry = *self.queue.peek()?;
        if entry.fire_at > deadline {
            return None;
        }
        self.queue.pop();
        let data = self.timers.remove(entry.id)?;
        if data.fire_at > self.now {
            self.now = data.fire_at;
        }
        tracing::trace!(target: targets::TIMER, id = ?entry.id, "timer fired");
        Some((entry.id, data.payload))
    }

    /// Move the clock forward to `time`. The clock never moves backwards.
    pub fn advance_to(&mut self, time: Duration) {
        if time < self.now {
            crate::tether_warn!(?time, now = ?self.now, "ignoring request to move the clock backwards");
            return;
        }
        self.now = time;
    }

    /// Get the number of pending timers.
    pub fn active_count(&self) -> usize {
        self.timers.len()
    }

    /// Drop queue entries whose timers were stopped.
    fn discard_stale(&mut self) {
        while let Some(entry) = self.queue.peek() {
            if self.timers.contains_key(entry.id) {
                break;
            }
            self.queue.pop();
        }
    }
}

impl<T> Default for TimerManager<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_shot_fires_once() {
        let mut timers = TimerManager::new();
        let id = timers.start_one_shot(Duration::from_millis(100), "a");

        assert!(timers.pop_due(Duration::from_millis(99)).is_none());
        assert_eq!(timers.pop_due(Duration::from_millis(100)), Some((id, "a")));
        assert!(timers.pop_due(Duration::from_millis(1000)).is_none());
        assert_eq!(timers.now(), Duration::from_millis(100));
    }

    #[test]
    fn test_stop_prevents_fire() {
        let mut timers = TimerManager::new();
        let id = timers.start_one_shot(Duration::from_millis(10), 1);
        assert_eq!(timers.stop(id), Ok(1));
        assert_eq!(timers.stop(id), Err(CoreError::InvalidTimerId));
        assert!(timers.pop_due(Duration::from_secs(1)).is_none());
        assert_eq!(timers.active_count(), 0);
    }

    #[test]
    fn test_fire_order_is_time_then_insertion() {
        let mut timers = TimerManager::new();
        timers.start_one_shot(Duration::from_millis(20), "late");
        timers.start_one_shot(Duration::from_millis(10), "first");
        timers.start_one_shot(Duration::from_millis(10), "second");

        let deadline = Duration::from_millis(50);
        let order: Vec<_> = std::iter::from_fn(|| timers.pop_due(deadline))
            .map(|(_, p)| p)
            .collect();
        assert_eq!(order, vec!["first", "second", "late"]);
    }

    #[test]
    fn test_delay_is_relative_to_virtual_now() {
        let mut timers = TimerManager::new();
        timers.advance_to(Duration::from_millis(500));
        timers.start_one_shot(Duration::from_millis(100), ());
        assert_eq!(timers.time_until_next(), Some(Duration::from_millis(100)));
        timers.advance_to(Duration::from_millis(400));
        assert_eq!(timers.now(), Duration::from_millis(500));
    }
}
