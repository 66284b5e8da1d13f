// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Content wrapper: one stable element handle per logical child slot.
//!
//! A slot may render zero, one or several elements. One element passes
//! through untouched. Several elements stay siblings when the host supports
//! fragments, in which case the first one stands for the slot, and are
//! otherwise gathered under a generated container element.

use alloc::vec::Vec;

use crate::host::Host;

/// Resolved elements of one content slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SlotHandle<E> {
    /// The slot rendered nothing.
    Empty,
    /// Exactly one element, passed through.
    Single(E),
    /// Several sibling roots rendered without a container.
    Fragment(Vec<E>),
    /// Several roots gathered under a generated container.
    Container {
        /// The generated container.
        container: E,
        /// The wrapped roots, in order.
        children: Vec<E>,
    },
}

impl<E: Copy> SlotHandle<E> {
    /// The element transition classes are applied to, if any.
    pub fn element(&self) -> Option<E> {
        match self {
            Self::Empty => None,
            Self::Single(el) => Some(*el),
            Self::Fragment(els) => els.first().copied(),
            Self::Container { container, .. } => Some(*container),
        }
    }
}

/// Collapse the mounted roots of a slot to a [`SlotHandle`].
///
/// `component` is the container tag used when the host lacks fragment support.
pub fn wrap<H: Host>(host: &mut H, mut elements: Vec<H::Element>, component: &str) -> SlotHandle<H::Element> {
    match elements.len() {
        0 => SlotHandle::Empty,
        1 => SlotHandle::Single(elements.remove(0)),
        _ if host.supports_fragments() => SlotHandle::Fragment(elements),
        _ => {
            let container = host.create_container(component, &elements);
            SlotHandle::Container {
                container,
                children: elements,
            }
        }
    }
}
