//! Cancelable timers.
//!
//! Every delayed or repeating effect (typewriter, counters, splash, confetti
//! cleanup) asks a [`Scheduler`] for a [`TimerHandle`]. Dropping or cancelling
//! the handle guarantees the timer never fires again.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::events::TimerEvent;

pub trait Scheduler {
    /// Deliver `event` once after `delay_ms`.
    fn after(&self, delay_ms: u32, event: TimerEvent) -> TimerHandle;
    /// Deliver `event` every `period_ms` until the handle is dropped.
    fn every(&self, period_ms: u32, event: TimerEvent) -> TimerHandle;
}

/// Owning handle to a pending timer. Cancels on drop.
pub struct TimerHandle {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl TimerHandle {
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self { cancel: Some(Box::new(cancel)) }
    }

    pub fn cancel(mut self) {
        self.fire_cancel();
    }

    fn fire_cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.fire_cancel();
    }
}

impl std::fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerHandle").field("armed", &self.cancel.is_some()).finish()
    }
}

struct Entry {
    id: u64,
    due_ms: f64,
    period_ms: Option<f64>,
    event: TimerEvent,
}

#[derive(Default)]
struct Clock {
    now_ms: f64,
    next_id: u64,
    entries: Vec<Entry>,
}

/// Virtual-time scheduler: nothing fires until [`ManualScheduler::advance`].
#[derive(Clone, Default)]
pub struct ManualScheduler {
    clock: Rc<RefCell<Clock>>,
}

impl ManualScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> f64 {
        self.clock.borrow().now_ms
    }

    /// Number of armed timers.
    pub fn pending(&self) -> usize {
        self.clock.borrow().entries.len()
    }

    /// Move virtual time forward, returning every delivery in firing order.
    pub fn advance(&self, ms: f64) -> Vec<TimerEvent> {
        let mut clock = self.clock.borrow_mut();
        let target = clock.now_ms + ms;
        let mut fired = Vec::new();

        loop {
            let next = clock
                .entries
                .iter()
                .enumerate()
                .filter(|(_, e)| e.due_ms <= target)
                .min_by(|(_, a), (_, b)| a.due_ms.total_cmp(&b.due_ms).then(a.id.cmp(&b.id)))
                .map(|(idx, _)| idx);
            let Some(idx) = next else { break };

            let entry = &clock.entries[idx];
            let (due, event, period) = (entry.due_ms, entry.event, entry.period_ms);
            match period {
                Some(period) => clock.entries[idx].due_ms += period,
                None => {
                    clock.entries.swap_remove(idx);
                }
            }
            clock.now_ms = due;
            fired.push(event);
        }

        clock.now_ms = target;
        fired
    }

    fn arm(&self, delay_ms: u32, period_ms: Option<f64>, event: TimerEvent) -> TimerHandle {
        let id = {
            let mut clock = self.clock.borrow_mut();
            let id = clock.next_id;
            clock.next_id += 1;
            let due_ms = clock.now_ms + f64::from(delay_ms);
            clock.entries.push(Entry { id, due_ms, period_ms, event });
            id
        };
        let weak: Weak<RefCell<Clock>> = Rc::downgrade(&self.clock);
        TimerHandle::new(move || {
            if let Some(clock) = weak.upgrade() {
                if let Ok(mut clock) = clock.try_borrow_mut() {
                    clock.entries.retain(|e| e.id != id);
                }
            }
        })
    }
}

impl Scheduler for ManualScheduler {
    fn after(&self, delay_ms: u32, event: TimerEvent) -> TimerHandle {
        self.arm(delay_ms, None, event)
    }

    fn every(&self, period_ms: u32, event: TimerEvent) -> TimerHandle {
        let period = f64::from(period_ms.max(1));
        self.arm(period_ms.max(1), Some(period), event)
    }
}
