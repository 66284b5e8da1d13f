// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_transition --heading-base-level=0

//! Understory Transition: a deterministic, `no_std` enter/leave/appear state machine for UI hosts.
//!
//! ## Overview
//!
//! This crate sequences CSS-style transition classes on an element as content
//! enters, leaves, or appears for the first time. It does not render.
//! The host view framework renders what a [`Transition`] reports, tells it
//! when elements are mounted, forwards native end events, and drains due
//! tasks from a [`Scheduler`](frame::Scheduler).
//!
//! - [`frame`]: the injectable scheduler and the deterministic [`FrameClock`].
//! - [`sniff`]: total duration and end-event count from computed timing strings.
//! - [`completion`]: end-event counting raced against a fallback timer.
//! - [`transition`]: the single-element controller with `in-out`/`out-in` modes and cancellation.
//! - [`wrapper`]: one stable element handle per content slot.
//! - [`memory`]: an in-memory host for headless drivers and tests.
//!
//! ## Classes
//!
//! With the default name `t`, a phase moves an element through
//! `t-enter` + `t-entering` (first frame), `t-entering` + `t-enter-to`
//! (until completion), and finally back to its own classes. Leave uses the
//! `t-leave*` family. The initial class is always visible for at least one
//! full frame before the post class is applied, so style transitions see the
//! property change.
//!
//! ## Minimal example
//!
//! ```
//! use understory_transition::{
//!     Cx, FrameClock, KeyedChild, MemoryHost, NoHooks, Phases, Transition, TransitionOptions,
//! };
//!
//! let mut dom = MemoryHost::new();
//! let mut clock = FrameClock::new();
//! let a = dom.create_element("div");
//! let b = dom.create_element("div");
//! let resolve = |c: &KeyedChild<&str, ()>| vec![if c.key == "a" { a } else { b }];
//!
//! let options = TransitionOptions::named("fade").with_duration(100);
//! let mut t = Transition::new(options, NoHooks, Some(KeyedChild::new("a", ())));
//! t.mount(&mut Cx::new(&mut dom, &mut clock), resolve);
//!
//! // New key: `b` enters while `a` leaves.
//! t.update(Some(KeyedChild::new("b", ())), &mut Cx::new(&mut dom, &mut clock));
//! assert_eq!(t.rendered().len(), 2);
//! t.committed(&mut Cx::new(&mut dom, &mut clock), resolve);
//! assert!(dom.has_class(b, "fade-enter"));
//! assert!(dom.has_class(a, "fade-leave"));
//!
//! clock.tick_frame();
//! clock.tick_frame();
//! clock.advance(100);
//! let mut done = Phases::empty();
//! while let Some(task) = clock.pop_due() {
//!     done |= t.run(task, &mut Cx::new(&mut dom, &mut clock));
//! }
//! assert_eq!(done, Phases::ENTER | Phases::LEAVE);
//! assert_eq!(t.rendered().len(), 1);
//! ```
//!
//! Keyed lists with move animation live in the `understory_transition_group` crate.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod completion;
pub mod error;
pub mod frame;
pub mod hooks;
pub mod host;
pub mod memory;
pub mod options;
pub mod sniff;
pub mod transition;
pub mod types;
pub mod wrapper;

pub use completion::{Completion, Wait};
pub use error::ParseError;
pub use frame::{FrameCadence, FrameClock, Scheduler, TaskId, Wake};
pub use hooks::{Done, Hooks, NoHooks};
pub use host::{Cx, EndEvent, Host, LayoutHost};
pub use memory::{ElementId, MemoryHost};
pub use options::{
    ClassOverrides, HookMode, Mode, Phase, Phases, TeardownPolicy, TransitionClasses,
    TransitionOptions,
};
pub use sniff::{ComputedTiming, Mechanism, Sniffed, sniff};
pub use transition::{Rendered, State, Transition};
pub use types::{Keyed, KeyedChild};
pub use wrapper::{SlotHandle, wrap};
