// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame scheduling: the injectable [`Scheduler`] capability and a deterministic [`FrameClock`].
//!
//! ## Overview
//!
//! Transitions suspend at exactly two points: between applying the initial
//! and the active classes (a double-frame deferral, so the initial state is
//! painted for at least one full frame), and while waiting for completion.
//! Both suspensions are expressed as scheduled tasks identified by a
//! [`TaskId`]. When a task becomes due, the host hands the id back to the
//! controller that owns it.
//!
//! ## Driving a clock
//!
//! ```
//! use understory_transition::frame::{FrameClock, Scheduler, Wake};
//!
//! let mut clock = FrameClock::new();
//! let frame_task = clock.schedule(Wake::Frames(2));
//! let timer = clock.schedule(Wake::Millis(50));
//!
//! clock.tick_frame();
//! assert_eq!(clock.pop_due(), None);
//! clock.tick_frame();
//! assert_eq!(clock.pop_due(), Some(frame_task));
//!
//! clock.advance(49);
//! assert_eq!(clock.pop_due(), None);
//! clock.advance(1);
//! assert_eq!(clock.pop_due(), Some(timer));
//! assert_eq!(clock.now(), 50);
//! ```

use alloc::vec::Vec;

/// Frames to wait between applying initial and active classes.
///
/// Waiting a single frame is not enough: the callback of the first frame runs
/// before that frame paints, so the initial classes would never be observed.
pub const DEFERRAL_FRAMES: u32 = 2;

/// Identifier of a scheduled task.
///
/// Ids are allocated by the [`Scheduler`]. [`FrameClock`] never reuses one;
/// other implementations must not reuse ids that may still be held.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct TaskId(u64);

impl TaskId {
    /// Wrap a raw id allocated by a custom [`Scheduler`].
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw id.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// When a scheduled task becomes due.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Wake {
    /// After the given number of rendering frames.
    Frames(u32),
    /// After the given number of milliseconds.
    Millis(u64),
    /// Never fired by the scheduler; completed explicitly by the caller.
    ///
    /// Used for explicit-callback completion tokens so they share the id
    /// space (and cancellation) of every other pending task.
    Manual,
}

/// Scheduling capability injected into transition controllers.
///
/// Implementations only record requests. Firing is driven by the host, which
/// passes due [`TaskId`]s back to whichever controller owns them.
pub trait Scheduler {
    /// Schedule a task and return its id.
    fn schedule(&mut self, wake: Wake) -> TaskId;

    /// Cancel a pending task. Unknown or already fired ids are ignored.
    fn cancel(&mut self, task: TaskId);
}

impl<S: Scheduler + ?Sized> Scheduler for &mut S {
    fn schedule(&mut self, wake: Wake) -> TaskId {
        (**self).schedule(wake)
    }

    fn cancel(&mut self, task: TaskId) {
        (**self).cancel(task);
    }
}

/// How [`FrameClock`] produces rendering frames.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum FrameCadence {
    /// Frames advance only when the host calls [`FrameClock::tick_frame`].
    #[default]
    Host,
    /// No native frame primitive: a frame request becomes a timer of the
    /// given interval per frame.
    Interval(u64),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Due {
    Frame(u64),
    Time(u64),
    Manual,
}

#[derive(Copy, Clone, Debug)]
struct Pending {
    id: TaskId,
    due: Due,
}

/// Deterministic [`Scheduler`] with a virtual millisecond clock and a frame counter.
///
/// Time moves only through [`FrameClock::advance`] and frames only through
/// [`FrameClock::tick_frame`] (or through time, under
/// [`FrameCadence::Interval`]). Due tasks are drained with
/// [`FrameClock::pop_due`]: frame tasks first in schedule order, then timers
/// by deadline. Popping a timer moves [`FrameClock::now`] to its deadline, so
/// tasks scheduled while handling it are relative to the moment it fired.
#[derive(Clone, Debug, Default)]
pub struct FrameClock {
    cadence: FrameCadence,
    now: u64,
    horizon: u64,
    frame: u64,
    next_id: u64,
    pending: Vec<Pending>,
}

impl FrameClock {
    /// Create a clock at time zero, frame zero, with [`FrameCadence::Host`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a clock with an explicit cadence.
    pub fn with_cadence(cadence: FrameCadence) -> Self {
        Self {
            cadence,
            ..Self::default()
        }
    }

    /// Current virtual time in milliseconds.
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Number of frames ticked so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Number of tasks not yet fired or canceled, including manual ones.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Returns true if `task` is still pending.
    pub fn is_pending(&self, task: TaskId) -> bool {
        self.pending.iter().any(|p| p.id == task)
    }

    /// Advance the frame counter by one.
    pub fn tick_frame(&mut self) {
        self.frame += 1;
    }

    /// Move the time horizon forward by `ms` milliseconds.
    pub fn advance(&mut self, ms: u64) {
        self.horizon = self.horizon.max(self.now).saturating_add(ms);
    }

    /// Pop the next due task, if any.
    ///
    /// Once nothing else is due, `now` catches up with the time horizon.
    pub fn pop_due(&mut self) -> Option<TaskId> {
        let frame = self.frame;
        if let Some(i) = self
            .pending
            .iter()
            .position(|p| matches!(p.due, Due::Frame(f) if f <= frame))
        {
            return Some(self.pending.remove(i).id);
        }

        let horizon = self.horizon;
        let mut best: Option<(usize, u64)> = None;
        for (i, p) in self.pending.iter().enumerate() {
            let Due::Time(t) = p.due else {
                continue;
            };
            if t > horizon {
                continue;
            }
            // Ties keep schedule order since ids only grow.
            if best.is_none_or(|(_, bt)| t < bt) {
                best = Some((i, t));
            }
        }
        match best {
            Some((i, t)) => {
                self.now = self.now.max(t);
                Some(self.pending.remove(i).id)
            }
            None => {
                self.now = self.now.max(horizon);
                None
            }
        }
    }
}

impl Scheduler for FrameClock {
    fn schedule(&mut self, wake: Wake) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        let due = match (wake, self.cadence) {
            (Wake::Frames(n), FrameCadence::Host) => Due::Frame(self.frame + u64::from(n)),
            (Wake::Frames(n), FrameCadence::Interval(ms)) => {
                Due::Time(self.now.saturating_add(ms.saturating_mul(u64::from(n))))
            }
            (Wake::Millis(ms), _) => Due::Time(self.now.saturating_add(ms)),
            (Wake::Manual, _) => Due::Manual,
        };
        self.pending.push(Pending { id, due });
        id
    }

    fn cancel(&mut self, task: TaskId) {
        self.pending.retain(|p| p.id != task);
    }
}
