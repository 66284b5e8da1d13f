// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Completion detection: end-event counting raced against a fallback timer.
//!
//! ## Overview
//!
//! A [`Completion`] is armed once the active classes of a phase are applied.
//! It finishes exactly once, on whichever comes first:
//!
//! - the expected number of end events fired with the element itself as
//!   target (events bubbling up from descendants are ignored), or
//! - the timer for the sniffed (or configured) total duration.
//!
//! The losing path is released at that moment: the timer is canceled or the
//! listener unregistered. [`Completion::cancel`] releases both without
//! finishing. It consumes the handle, so a completion cannot be canceled twice.
//!
//! With an explicit duration or in no-CSS mode there is nothing to listen
//! for and only the timer runs.

use crate::frame::{Scheduler, TaskId, Wake};
use crate::host::{Cx, EndEvent, Host};
use crate::options::TransitionOptions;
use crate::sniff::{Mechanism, sniff};

/// How a completion learns that its phase is over.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Wait {
    /// A plain timer of the given milliseconds.
    Timer(u64),
    /// Sniff computed style, optionally restricted to one mechanism, and
    /// listen for its end events.
    Sniff(Option<Mechanism>),
}

impl Wait {
    /// Strategy implied by a transition's options.
    ///
    /// Explicit duration beats no-CSS mode, which beats sniffing.
    pub fn for_options(options: &TransitionOptions) -> Self {
        match options.duration {
            Some(ms) => Self::Timer(ms),
            None if options.no_css => Self::Timer(0),
            None => Self::Sniff(options.mechanism),
        }
    }

    /// Resolve a sniffing wait to a plain timer of the sniffed total.
    ///
    /// Used for an element whose end events already belong to another
    /// completion, so that each forwarded event has a single consumer.
    pub fn timer_only<H: Host>(self, el: H::Element, host: &H) -> Self {
        match self {
            Self::Sniff(mechanism) => Self::Timer(sniff(&host.computed_timing(el), mechanism).total_ms),
            timer => timer,
        }
    }
}

/// A pending completion for one element.
#[derive(Debug)]
pub struct Completion<E> {
    element: E,
    listening: Option<Mechanism>,
    expected: usize,
    seen: usize,
    timer: Option<TaskId>,
}

impl<E: Copy + Eq + core::fmt::Debug> Completion<E> {
    /// Arm a completion for `el`.
    pub fn start<H, S>(wait: Wait, el: E, cx: &mut Cx<'_, H, S>) -> Self
    where
        H: Host<Element = E>,
        S: Scheduler,
    {
        let (ms, listening, expected) = match wait {
            Wait::Timer(ms) => (ms, None, 0),
            Wait::Sniff(mechanism) => {
                let sniffed = sniff(&cx.host.computed_timing(el), mechanism);
                cx.host.listen(el, sniffed.mechanism);
                (
                    sniffed.total_ms,
                    Some(sniffed.mechanism),
                    sniffed.entry_count,
                )
            }
        };
        let timer = cx.scheduler.schedule(Wake::Millis(ms));
        tracing::trace!(?el, ms, ?listening, expected, "completion armed");
        Self {
            element: el,
            listening,
            expected,
            seen: 0,
            timer: Some(timer),
        }
    }

    /// The element being watched.
    pub fn element(&self) -> E {
        self.element
    }

    /// Returns true once the completion has fired.
    pub fn is_finished(&self) -> bool {
        self.timer.is_none()
    }

    /// Returns true if `task` is this completion's pending fallback timer.
    pub fn owns(&self, task: TaskId) -> bool {
        self.timer == Some(task)
    }

    /// Feed a fired task. Returns true if this finished the completion.
    pub fn on_task<H: Host<Element = E>>(&mut self, task: TaskId, host: &mut H) -> bool {
        if !self.owns(task) {
            return false;
        }
        self.timer = None;
        self.release_listener(host);
        true
    }

    /// Feed a forwarded end event. Returns true if this finished the completion.
    pub fn on_event<H, S>(&mut self, event: &EndEvent<E>, cx: &mut Cx<'_, H, S>) -> bool
    where
        H: Host<Element = E>,
        S: Scheduler,
    {
        let Some(mechanism) = self.listening else {
            return false;
        };
        if event.mechanism != mechanism || event.target != self.element {
            return false;
        }
        self.seen += 1;
        tracing::trace!(el = ?self.element, seen = self.seen, expected = self.expected, "end event");
        if self.seen < self.expected {
            return false;
        }
        if let Some(timer) = self.timer.take() {
            cx.scheduler.cancel(timer);
        }
        self.release_listener(cx.host);
        true
    }

    /// Release the timer and listener without finishing.
    pub fn cancel<H, S>(mut self, cx: &mut Cx<'_, H, S>)
    where
        H: Host<Element = E>,
        S: Scheduler,
    {
        if let Some(timer) = self.timer.take() {
            cx.scheduler.cancel(timer);
        }
        self.release_listener(cx.host);
    }

    fn release_listener<H: Host<Element = E>>(&mut self, host: &mut H) {
        if let Some(mechanism) = self.listening.take() {
            host.unlisten(self.element, mechanism);
        }
    }
}
