// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_transition_group --heading-base-level=0

//! Understory Transition Group: keyed-list transitions with move animation.
//!
//! ## Overview
//!
//! A [`TransitionGroup`] tracks an ordered list of keyed children, each driven
//! by its own [`Transition`](understory_transition::Transition). On every
//! render it diffs the previous keys against the new ones:
//!
//! - new keys are inserted at their index and appear;
//! - removed keys keep rendering with cleared content while they leave, and
//!   are dropped once the leave completes;
//! - persisting keys keep their transition (and any phase in flight) and, if
//!   their element's position changed, animate to the new position.
//!
//! The diff itself is the pure [`diff::reconcile`], usable on its own.
//!
//! Position changes are animated FLIP-style: positions are captured before
//! layout in [`TransitionGroup::update`], compared after layout in
//! [`TransitionGroup::committed`], and the difference is played back through
//! an inverse transform and a move class (`{name}-move` by default).
//! Elements whose position did not change get no move class.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod diff;
pub mod group;

pub use diff::{Change, Diffed, reconcile};
pub use group::TransitionGroup;
