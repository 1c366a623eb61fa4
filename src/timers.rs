//! Cancellable one-shot timers on a caller-supplied millisecond clock.
//!
//! Nothing here touches the browser: the owner feeds `performance.now()` (or a
//! test clock) into [`Scheduler::pop_due`]. Every handle is stamped with the
//! epoch that was current when it was scheduled. [`Scheduler::cancel_all`]
//! bumps the epoch, so a timer from an earlier state can never fire later.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerHandle {
    id: u64,
    epoch: u64,
}

impl TimerHandle {
    #[cfg(test)]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

#[derive(Debug)]
struct Pending<K> {
    handle: TimerHandle,
    due_ms: f64,
    kind: K,
}

/// A timer that came due, with the time it was scheduled for.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fired<K> {
    pub handle: TimerHandle,
    pub due_ms: f64,
    pub kind: K,
}

#[derive(Debug)]
pub struct Scheduler<K> {
    next_id: u64,
    epoch: u64,
    pending: Vec<Pending<K>>,
}

impl<K> Default for Scheduler<K> {
    fn default() -> Self {
        Self {
            next_id: 0,
            epoch: 0,
            pending: Vec::new(),
        }
    }
}

impl<K: Copy> Scheduler<K> {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn schedule(&mut self, due_ms: f64, kind: K) -> TimerHandle {
        let handle = TimerHandle {
            id: self.next_id,
            epoch: self.epoch,
        };
        self.next_id += 1;
        self.pending.push(Pending {
            handle,
            due_ms,
            kind,
        });
        handle
    }

    /// Returns false when the timer already fired or was cancelled.
    #[cfg(test)]
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.handle != handle);
        self.pending.len() != before
    }

    /// Drops every pending timer and starts a new epoch.
    pub fn cancel_all(&mut self) {
        self.pending.clear();
        self.epoch += 1;
    }

    #[cfg(test)]
    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.pending.iter().any(|p| p.handle == handle)
    }

    /// Removes and returns the earliest timer due at or before `now_ms`.
    /// Ties fire in scheduling order.
    pub fn pop_due(&mut self, now_ms: f64) -> Option<Fired<K>> {
        let epoch = self.epoch;
        let idx = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.handle.epoch == epoch && p.due_ms <= now_ms)
            .min_by(|(_, a), (_, b)| {
                a.due_ms
                    .total_cmp(&b.due_ms)
                    .then(a.handle.id.cmp(&b.handle.id))
            })
            .map(|(i, _)| i)?;
        let p = self.pending.remove(idx);
        Some(Fired {
            handle: p.handle,
            due_ms: p.due_ms,
            kind: p.kind,
        })
    }

    /// Next due time, if any; lets a host sleep until something can happen.
    pub fn next_due(&self) -> Option<f64> {
        self.pending
            .iter()
            .map(|p| p.due_ms)
            .min_by(|a, b| a.total_cmp(b))
    }
}
