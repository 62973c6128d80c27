//! Timer identities, generation-guarded handles and the scheduler seam.
//!
//! The engine never waits. It asks a [`Scheduler`] to arm a timer and gets
//! called back through [`crate::GameEngine::fire`] with the same [`TimerId`].
//! Every arm uses a fresh generation, so a callback that outlives its timer
//! (cleared too late, queued behind a reset) no longer matches the engine's
//! handle and is dropped.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// One tick per second of round time.
    Countdown,
    /// One-shot trigger that turns the water contaminated.
    Contamination,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerMode {
    Repeating,
    Once,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerId {
    pub kind: TimerKind,
    pub generation: u64,
}

/// The engine's record of one timer slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TimerHandle {
    generation: u64,
    armed: bool,
}

impl TimerHandle {
    pub fn armed(generation: u64) -> Self {
        Self { generation, armed: true }
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True when `id` belongs to the currently armed timer.
    pub fn matches(&self, id: TimerId) -> bool {
        self.armed && self.generation == id.generation
    }

    pub fn disarm(&mut self) {
        self.armed = false;
    }
}

/// Something that can call the engine back later.
pub trait Scheduler {
    fn arm(&mut self, id: TimerId, delay_ms: u32, mode: TimerMode);
    fn disarm(&mut self, id: TimerId);
}

#[derive(Clone, Debug)]
struct Pending {
    id: TimerId,
    due_ms: u64,
    period_ms: Option<u64>,
    seq: u64,
}

/// Virtual-clock scheduler for headless runs and tests.
///
/// Nothing fires on its own; [`ManualScheduler::pop_due`] hands out the next
/// due timer in due-time order, ties broken by arm order.
#[derive(Clone, Debug, Default)]
pub struct ManualScheduler {
    now_ms: u64,
    next_seq: u64,
    pending: Vec<Pending>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Move the clock forward without firing anything. Never goes backwards.
    pub fn set_now(&mut self, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);
    }

    pub fn is_armed(&self, kind: TimerKind) -> bool {
        self.pending.iter().any(|p| p.id.kind == kind)
    }

    /// Due time of the pending timer of `kind`, if any.
    pub fn due_ms(&self, kind: TimerKind) -> Option<u64> {
        self.pending.iter().find(|p| p.id.kind == kind).map(|p| p.due_ms)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Pop the earliest timer due at or before `until_ms`, advancing the
    /// clock to its due time. Repeating timers are re-queued one period later.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<TimerId> {
        let idx = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due_ms <= until_ms)
            .min_by_key(|(_, p)| (p.due_ms, p.seq))
            .map(|(i, _)| i)?;
        let due = self.pending[idx].due_ms;
        self.set_now(due);
        let id = self.pending[idx].id;
        match self.pending[idx].period_ms {
            Some(period) => {
                let seq = self.bump_seq();
                let p = &mut self.pending[idx];
                p.due_ms = due + period;
                p.seq = seq;
            }
            None => {
                self.pending.remove(idx);
            }
        }
        Some(id)
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}

impl Scheduler for ManualScheduler {
    fn arm(&mut self, id: TimerId, delay_ms: u32, mode: TimerMode) {
        // One slot per kind, like a cleared-then-set browser timer.
        self.pending.retain(|p| p.id.kind != id.kind);
        let delay = u64::from(delay_ms);
        let seq = self.bump_seq();
        self.pending.push(Pending {
            id,
            due_ms: self.now_ms + delay,
            period_ms: match mode {
                TimerMode::Repeating => Some(delay.max(1)),
                TimerMode::Once => None,
            },
            seq,
        });
    }

    fn disarm(&mut self, id: TimerId) {
        self.pending.retain(|p| p.id != id);
    }
}
