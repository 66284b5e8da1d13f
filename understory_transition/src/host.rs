// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host capabilities consumed by transitions.
//!
//! ## Overview
//!
//! The transition core never renders and never touches a real DOM. It talks
//! to the host framework through [`Host`] (class lists, computed timing, end
//! event listeners, wrapper containers) and, for list move animations,
//! [`LayoutHost`] (bounding rectangles and transforms). Timing goes through
//! the injectable [`Scheduler`](crate::frame::Scheduler).
//!
//! Every effectful operation borrows both through a [`Cx`].
//!
//! Element handles are small copyable ids; the host decides what they map to.
//! Acting on an element that has since been detached is expected to be a
//! harmless no-op on the host side.

use kurbo::{Affine, Rect};

use crate::frame::Scheduler;
use crate::sniff::{ComputedTiming, Mechanism};

/// Element-level operations a host framework provides.
pub trait Host {
    /// Handle to a mounted element.
    type Element: Copy + Eq + core::fmt::Debug;

    /// Add `class` to the element's class list.
    fn add_class(&mut self, el: Self::Element, class: &str);

    /// Remove `class` from the element's class list.
    fn remove_class(&mut self, el: Self::Element, class: &str);

    /// Read the element's computed animation and transition timing.
    fn computed_timing(&self, el: Self::Element) -> ComputedTiming;

    /// Start forwarding `mechanism` end events fired on `el`.
    ///
    /// Calls are paired with [`Host::unlisten`], and the same element and
    /// mechanism may be registered more than once at a time, so hosts must
    /// count registrations and keep forwarding until the last one is
    /// released. Hosts that forward every end event unconditionally can
    /// ignore this.
    fn listen(&mut self, el: Self::Element, mechanism: Mechanism) {
        let _ = (el, mechanism);
    }

    /// Release one registration made with [`Host::listen`].
    fn unlisten(&mut self, el: Self::Element, mechanism: Mechanism) {
        let _ = (el, mechanism);
    }

    /// Whether the host renders several sibling roots without a container.
    fn supports_fragments(&self) -> bool {
        true
    }

    /// Create a container element of type `tag` holding `children`.
    ///
    /// Only called when [`Host::supports_fragments`] is false and a slot
    /// renders more than one element.
    fn create_container(&mut self, tag: &str, children: &[Self::Element]) -> Self::Element;
}

/// Layout access needed for move animations.
pub trait LayoutHost: Host {
    /// Border-box rectangle of the element in viewport space, including its current transform.
    fn bounding_rect(&self, el: Self::Element) -> Rect;

    /// Set the element's inline transform.
    ///
    /// With `instant` set, the write must not itself be animated (transitions
    /// suppressed for this write). Writing [`Affine::IDENTITY`] clears the transform.
    fn set_transform(&mut self, el: Self::Element, transform: Affine, instant: bool);
}

/// A native `animationend` or `transitionend` event forwarded by the host.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct EndEvent<E> {
    /// Which kind of end event fired.
    pub mechanism: Mechanism,
    /// The element the event originated on (before bubbling).
    pub target: E,
}

/// Borrowed capabilities passed to every effectful transition operation.
#[derive(Debug)]
pub struct Cx<'a, H, S> {
    /// Host element operations.
    pub host: &'a mut H,
    /// Frame and timer scheduling.
    pub scheduler: &'a mut S,
}

impl<'a, H: Host, S: Scheduler> Cx<'a, H, S> {
    /// Bundle a host and a scheduler.
    pub fn new(host: &'a mut H, scheduler: &'a mut S) -> Self {
        Self { host, scheduler }
    }

    /// Reborrow for a nested call.
    pub fn reborrow(&mut self) -> Cx<'_, H, S> {
        Cx {
            host: &mut *self.host,
            scheduler: &mut *self.scheduler,
        }
    }
}
