// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! An in-memory [`Host`] for headless drivers, demos and tests.
//!
//! [`MemoryHost`] keeps class lists, computed timing, layout rectangles and
//! transforms per element, tracks which end-event listeners are registered,
//! and records every class and transform write in a mutation log so callers
//! can assert on exact ordering.
//!
//! Operations on unknown element ids are ignored, mirroring writes to a
//! detached element.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use kurbo::{Affine, Rect};

use crate::host::{Host, LayoutHost};
use crate::sniff::{ComputedTiming, Mechanism};

/// Handle of an element owned by a [`MemoryHost`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ElementId(u32);

/// One recorded write to a [`MemoryHost`] element.
#[derive(Clone, Debug, PartialEq)]
pub enum Mutation {
    /// A class was added (only recorded if it was absent).
    AddClass(ElementId, String),
    /// A class was removed (only recorded if it was present).
    RemoveClass(ElementId, String),
    /// The inline transform was written.
    Transform {
        /// Target element.
        el: ElementId,
        /// Written transform.
        transform: Affine,
        /// Whether transitions were suppressed for the write.
        instant: bool,
    },
}

#[derive(Clone, Debug)]
struct ElementData {
    tag: String,
    classes: Vec<String>,
    timing: ComputedTiming,
    rect: Rect,
    transform: Affine,
    children: Vec<ElementId>,
}

/// In-memory element store implementing [`Host`] and [`LayoutHost`].
#[derive(Clone, Debug)]
pub struct MemoryHost {
    elements: Vec<ElementData>,
    listeners: Vec<(ElementId, Mechanism)>,
    log: Vec<Mutation>,
    fragments: bool,
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryHost {
    /// Create an empty host that supports fragments.
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
            listeners: Vec::new(),
            log: Vec::new(),
            fragments: true,
        }
    }

    /// Create an empty host without fragment support, so multi-element
    /// slots get a container.
    pub fn without_fragments() -> Self {
        Self {
            fragments: false,
            ..Self::new()
        }
    }

    /// Create a detached element with no classes, zero timing and an empty rectangle.
    pub fn create_element(&mut self, tag: &str) -> ElementId {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "ElementId uses 32-bit indices."
        )]
        let id = ElementId(self.elements.len() as u32);
        self.elements.push(ElementData {
            tag: tag.to_string(),
            classes: Vec::new(),
            timing: ComputedTiming::default(),
            rect: Rect::ZERO,
            transform: Affine::IDENTITY,
            children: Vec::new(),
        });
        id
    }

    fn data(&self, el: ElementId) -> Option<&ElementData> {
        self.elements.get(el.0 as usize)
    }

    fn data_mut(&mut self, el: ElementId) -> Option<&mut ElementData> {
        self.elements.get_mut(el.0 as usize)
    }

    /// Tag the element was created with.
    pub fn tag(&self, el: ElementId) -> Option<&str> {
        self.data(el).map(|d| d.tag.as_str())
    }

    /// Children of a container created through [`Host::create_container`].
    pub fn children(&self, el: ElementId) -> &[ElementId] {
        self.data(el).map_or(&[], |d| d.children.as_slice())
    }

    /// Current class list, in insertion order.
    pub fn classes(&self, el: ElementId) -> &[String] {
        self.data(el).map_or(&[], |d| d.classes.as_slice())
    }

    /// Returns true if the element currently has `class`.
    pub fn has_class(&self, el: ElementId, class: &str) -> bool {
        self.classes(el).iter().any(|c| c == class)
    }

    /// Set the computed timing reported for the element.
    pub fn set_timing(&mut self, el: ElementId, timing: ComputedTiming) {
        if let Some(d) = self.data_mut(el) {
            d.timing = timing;
        }
    }

    /// Set the element's untransformed layout rectangle.
    pub fn set_rect(&mut self, el: ElementId, rect: Rect) {
        if let Some(d) = self.data_mut(el) {
            d.rect = rect;
        }
    }

    /// Current inline transform.
    pub fn transform(&self, el: ElementId) -> Affine {
        self.data(el).map_or(Affine::IDENTITY, |d| d.transform)
    }

    /// Returns true if a listener for `mechanism` end events is registered on `el`.
    pub fn is_listening(&self, el: ElementId, mechanism: Mechanism) -> bool {
        self.listeners.contains(&(el, mechanism))
    }

    /// Number of outstanding end-event listener registrations.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Every recorded write, oldest first.
    pub fn log(&self) -> &[Mutation] {
        &self.log
    }

    /// Forget recorded writes.
    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    /// Number of times `class` was added to `el` according to the log.
    pub fn times_added(&self, el: ElementId, class: &str) -> usize {
        self.log
            .iter()
            .filter(|m| matches!(m, Mutation::AddClass(e, c) if *e == el && c == class))
            .count()
    }
}

impl Host for MemoryHost {
    type Element = ElementId;

    fn add_class(&mut self, el: ElementId, class: &str) {
        let Some(d) = self.data_mut(el) else {
            return;
        };
        if d.classes.iter().any(|c| c == class) {
            return;
        }
        d.classes.push(class.to_string());
        self.log.push(Mutation::AddClass(el, class.to_string()));
    }

    fn remove_class(&mut self, el: ElementId, class: &str) {
        let Some(d) = self.data_mut(el) else {
            return;
        };
        let before = d.classes.len();
        d.classes.retain(|c| c != class);
        if d.classes.len() != before {
            self.log.push(Mutation::RemoveClass(el, class.to_string()));
        }
    }

    fn computed_timing(&self, el: ElementId) -> ComputedTiming {
        self.data(el).map(|d| d.timing.clone()).unwrap_or_default()
    }

    fn listen(&mut self, el: ElementId, mechanism: Mechanism) {
        self.listeners.push((el, mechanism));
    }

    fn unlisten(&mut self, el: ElementId, mechanism: Mechanism) {
        if let Some(i) = self.listeners.iter().position(|l| *l == (el, mechanism)) {
            self.listeners.swap_remove(i);
        }
    }

    fn supports_fragments(&self) -> bool {
        self.fragments
    }

    fn create_container(&mut self, tag: &str, children: &[ElementId]) -> ElementId {
        let id = self.create_element(tag);
        if let Some(d) = self.data_mut(id) {
            d.children.extend_from_slice(children);
        }
        id
    }
}

impl LayoutHost for MemoryHost {
    fn bounding_rect(&self, el: ElementId) -> Rect {
        self.data(el)
            .map_or(Rect::ZERO, |d| d.transform.transform_rect_bbox(d.rect))
    }

    fn set_transform(&mut self, el: ElementId, transform: Affine, instant: bool) {
        let Some(d) = self.data_mut(el) else {
            return;
        };
        d.transform = transform;
        self.log.push(Mutation::Transform {
            el,
            transform,
            instant,
        });
    }
}
