// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lifecycle hooks and explicit completion tokens.
//!
//! ## Order
//!
//! For every phase that runs to completion the hooks fire as
//! [`before`](Hooks::before) → [`during`](Hooks::during) → [`after`](Hooks::after).
//! An interrupted phase fires [`cancel`](Hooks::cancel) instead of `after`,
//! exactly once.
//!
//! ## Explicit callbacks
//!
//! When a phase is configured with [`HookMode::ExplicitCallback`](crate::options::HookMode),
//! `during` receives `Some(Done)`. Timing is then the caller's business: the
//! phase completes only when the token is passed back to
//! [`Transition::complete`](crate::Transition::complete). A token whose phase
//! was canceled or already completed is ignored.

use crate::frame::TaskId;
use crate::options::Phase;

/// Completion token handed to explicit-callback hooks.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Done {
    pub(crate) task: TaskId,
    pub(crate) phase: Phase,
}

impl Done {
    /// The phase this token completes.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Scheduler task backing this token.
    pub fn task(&self) -> TaskId {
        self.task
    }
}

/// Caller-supplied lifecycle hooks.
///
/// All methods default to no-ops. Hooks run synchronously inside the
/// transition operation that triggered them; panics propagate to the caller.
pub trait Hooks<E> {
    /// Initial classes were just applied (`onBeforeAppear/Enter/Leave`).
    fn before(&mut self, phase: Phase, el: E) {
        let _ = (phase, el);
    }

    /// Active classes were just applied (`onAppear/Enter/Leave`).
    ///
    /// `done` is `Some` only for explicit-callback phases.
    fn during(&mut self, phase: Phase, el: E, done: Option<Done>) {
        let _ = (phase, el, done);
    }

    /// The phase completed and its classes were removed (`onAfterAppear/Enter/Leave`).
    fn after(&mut self, phase: Phase, el: E) {
        let _ = (phase, el);
    }

    /// The phase was interrupted before completing (`onCancelAppear/Enter/Leave`).
    fn cancel(&mut self, phase: Phase, el: E) {
        let _ = (phase, el);
    }
}

/// Hooks that do nothing.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoHooks;

impl<E> Hooks<E> for NoHooks {}
