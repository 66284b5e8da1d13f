// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The keyed-list transition driver.
//!
//! ## Render cycle
//!
//! 1. [`TransitionGroup::update`] with the newly rendered keyed children,
//!    before the host lays them out. Positions of persisting elements are
//!    captured here.
//! 2. The host renders [`TransitionGroup::rendered`] and lays it out.
//! 3. [`TransitionGroup::committed`] mounts new children, starts queued
//!    phases, and starts move animations for elements whose position changed.
//!
//! Due tasks, end events and explicit completion tokens are routed with
//! [`TransitionGroup::run`], [`TransitionGroup::handle_end_event`] and
//! [`TransitionGroup::complete`]. Each returns the keys whose leave completed
//! and which were dropped from the list during the call; re-render when it is
//! non-empty.
//!
//! ## Moves
//!
//! A persisting element is measured with any running move transform cleared.
//! After layout, a nonzero position delta is applied as an instant inverse
//! translation, and on the next frame the transform is cleared with the move
//! class present so the element animates into place. The move class is
//! removed once the completion fires. No-CSS groups never animate moves.
//!
//! A child that still has an appear, enter or leave phase running when its
//! move starts keeps its element's end events for that phase; the move then
//! waits on a timer for the sniffed move duration instead.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Debug;

use kurbo::{Affine, Rect, Vec2};
use understory_transition::completion::{Completion, Wait};
use understory_transition::frame::{Scheduler, TaskId, Wake};
use understory_transition::hooks::{Done, Hooks, NoHooks};
use understory_transition::host::{Cx, EndEvent, LayoutHost};
use understory_transition::options::{Phases, TeardownPolicy, TransitionOptions};
use understory_transition::transition::{Rendered, Transition};
use understory_transition::types::KeyedChild;

use crate::diff::{Change, reconcile};

type ChildTransition<K, C, E, Hk> = Transition<KeyedChild<K, C>, E, Hk>;

#[derive(Debug)]
enum Motion<E> {
    /// Inverse transform applied; waiting one frame to release it.
    Settling { el: E, task: TaskId },
    /// Move class applied; waiting for completion.
    Animating(Completion<E>),
}

#[derive(Debug)]
struct Entry<K, C, E, Hk> {
    key: K,
    transition: ChildTransition<K, C, E, Hk>,
    leaving: bool,
    first: Option<Rect>,
    motion: Option<Motion<E>>,
}

impl<K, C, E, Hk> Entry<K, C, E, Hk>
where
    K: Eq + Clone + Debug,
    C: Clone,
    E: Copy + Eq + Debug,
    Hk: Hooks<E>,
{
    /// Stop a running move, leaving the transform for the caller to reset.
    fn stop_motion<H, S>(&mut self, move_class: &str, cx: &mut Cx<'_, H, S>, notify: bool)
    where
        H: LayoutHost<Element = E>,
        S: Scheduler,
    {
        match self.motion.take() {
            Some(Motion::Settling { task, .. }) => cx.scheduler.cancel(task),
            Some(Motion::Animating(completion)) => {
                let el = completion.element();
                completion.cancel(cx);
                if notify {
                    cx.host.remove_class(el, move_class);
                }
            }
            None => {}
        }
    }
}

/// Transitions for an ordered list of keyed children.
///
/// Each child is driven by its own [`Transition`] with appear forced on,
/// using the child's own options if it has any and the group's otherwise.
/// Every child gets a clone of the group's hooks.
///
/// ```
/// use understory_transition::{Cx, FrameClock, KeyedChild, MemoryHost, NoHooks, TransitionOptions};
/// use understory_transition_group::TransitionGroup;
///
/// let mut dom = MemoryHost::new();
/// let mut clock = FrameClock::new();
/// let items: Vec<_> = ["a", "b", "c"]
///     .into_iter()
///     .map(|key| KeyedChild::new(key, dom.create_element("li")))
///     .collect();
///
/// let options = TransitionOptions::named("list").with_duration(10);
/// let mut group = TransitionGroup::new(options, NoHooks, items.clone());
/// group.committed(&mut Cx::new(&mut dom, &mut clock), |_, el| vec![*el]);
///
/// group.update(vec![items[0].clone(), items[2].clone()], &mut Cx::new(&mut dom, &mut clock));
/// group.committed(&mut Cx::new(&mut dom, &mut clock), |_, el| vec![*el]);
/// assert_eq!(group.len(), 3, "b is still leaving");
///
/// clock.tick_frame();
/// clock.tick_frame();
/// clock.advance(10);
/// let mut removed = Vec::new();
/// while let Some(task) = clock.pop_due() {
///     removed.extend(group.run(task, &mut Cx::new(&mut dom, &mut clock)));
/// }
/// assert_eq!(removed, vec!["b"]);
/// assert_eq!(group.keys().collect::<Vec<_>>(), vec![&"a", &"c"]);
/// ```
#[derive(Debug)]
pub struct TransitionGroup<K, C, E, Hk = NoHooks> {
    options: TransitionOptions,
    move_class: String,
    hooks: Hk,
    entries: Vec<Entry<K, C, E, Hk>>,
    dirty: bool,
    unmounted: bool,
}

impl<K, C, E, Hk> TransitionGroup<K, C, E, Hk>
where
    K: Eq + Clone + Debug,
    C: Clone,
    E: Copy + Eq + Debug,
    Hk: Hooks<E> + Clone,
{
    /// Create a group showing `children`, which appear once committed.
    pub fn new(options: TransitionOptions, hooks: Hk, children: Vec<KeyedChild<K, C>>) -> Self {
        let move_class = options.classes().move_class;
        let mut group = Self {
            options,
            move_class,
            hooks,
            entries: Vec::new(),
            dirty: true,
            unmounted: false,
        };
        group.entries = dedupe(children)
            .into_iter()
            .map(|child| group.spawn(child))
            .collect();
        group
    }

    fn spawn(&self, child: KeyedChild<K, C>) -> Entry<K, C, E, Hk> {
        let options = child
            .options
            .clone()
            .unwrap_or_else(|| self.options.clone())
            .with_appear(true);
        Entry {
            key: child.key.clone(),
            transition: Transition::new(options, self.hooks.clone(), Some(child)),
            leaving: false,
            first: None,
            motion: None,
        }
    }

    fn moves_enabled(&self) -> bool {
        !self.options.no_css
    }

    /// The group's options.
    pub fn options(&self) -> &TransitionOptions {
        &self.options
    }

    /// Tag of the container wrapping the list when the host lacks fragment support.
    pub fn component(&self) -> &str {
        self.options.component()
    }

    /// Number of tracked children, leaving ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no child is tracked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tracked keys in render order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|e| &e.key)
    }

    /// Returns true if `key` is tracked and leaving.
    pub fn is_leaving(&self, key: &K) -> bool {
        self.entry(key).is_some_and(|e| e.leaving)
    }

    /// Returns true if `key` is tracked and its element is animating to a new position.
    pub fn is_moving(&self, key: &K) -> bool {
        self.entry(key).is_some_and(|e| e.motion.is_some())
    }

    /// The transition driving `key`.
    pub fn transition(&self, key: &K) -> Option<&ChildTransition<K, C, E, Hk>> {
        self.entry(key).map(|e| &e.transition)
    }

    fn entry(&self, key: &K) -> Option<&Entry<K, C, E, Hk>> {
        self.entries.iter().find(|e| e.key == *key)
    }

    /// What the host should render, in order, one item per tracked child.
    pub fn rendered(&self) -> impl Iterator<Item = (&K, Rendered<'_, KeyedChild<K, C>>)> {
        self.entries.iter().map(|e| (&e.key, e.transition.rendered()))
    }

    /// Returns true if the rendered output changed since the last commit.
    pub fn needs_commit(&self) -> bool {
        !self.unmounted && (self.dirty || self.entries.iter().any(|e| e.transition.needs_commit()))
    }

    /// The host has a new list of children.
    ///
    /// Call before the host lays out the new list: persisting elements are
    /// measured here for move animations.
    pub fn update<H, S>(&mut self, children: Vec<KeyedChild<K, C>>, cx: &mut Cx<'_, H, S>)
    where
        H: LayoutHost<Element = E>,
        S: Scheduler,
    {
        if self.unmounted {
            return;
        }
        let children = dedupe(children);

        if self.moves_enabled() {
            for entry in &mut self.entries {
                entry.stop_motion(&self.move_class, cx, true);
                entry.first = None;
                if entry.leaving {
                    continue;
                }
                if let Some(el) = entry.transition.element() {
                    cx.host.set_transform(el, Affine::IDENTITY, true);
                    entry.first = Some(cx.host.bounding_rect(el));
                }
            }
        }

        let old_keys: Vec<K> = self.entries.iter().map(|e| e.key.clone()).collect();
        let new_keys: Vec<K> = children.iter().map(|c| c.key.clone()).collect();
        let mut old: Vec<Option<Entry<K, C, E, Hk>>> =
            core::mem::take(&mut self.entries).into_iter().map(Some).collect();
        let mut incoming: Vec<Option<KeyedChild<K, C>>> = children.into_iter().map(Some).collect();

        let mut entries = Vec::with_capacity(old.len().max(incoming.len()));
        for diffed in reconcile(&old_keys, &new_keys) {
            let entry = diffed.from.and_then(|i| old.get_mut(i)?.take());
            let child = diffed.to.and_then(|i| incoming.get_mut(i)?.take());
            match (diffed.change, entry, child) {
                (Change::Entering, _, Some(child)) => entries.push(self.spawn(child)),
                (Change::Leaving, Some(mut entry), _) => {
                    if !entry.leaving {
                        tracing::debug!(key = ?entry.key, "child leaving");
                    }
                    entry.leaving = true;
                    entry.first = None;
                    entry.transition.update(None, cx);
                    entries.push(entry);
                }
                (Change::Persisting | Change::Moving, Some(mut entry), Some(child)) => {
                    entry.leaving = false;
                    entry.transition.update(Some(child), cx);
                    entries.push(entry);
                }
                _ => {}
            }
        }
        self.entries = entries;
        self.dirty = true;
    }

    /// The host rendered [`TransitionGroup::rendered`] and laid it out.
    ///
    /// `resolve` yields the mounted elements of a child's content.
    pub fn committed<H, S>(&mut self, cx: &mut Cx<'_, H, S>, mut resolve: impl FnMut(&K, &C) -> Vec<E>) -> Vec<K>
    where
        H: LayoutHost<Element = E>,
        S: Scheduler,
    {
        if self.unmounted {
            return Vec::new();
        }
        self.dirty = false;
        let removed = sweep(&mut self.entries, |entry| {
            let by_child = |child: &KeyedChild<K, C>| resolve(&child.key, &child.content);
            if entry.transition.is_mounted() {
                entry.transition.committed(cx, by_child)
            } else {
                entry.transition.mount(cx, by_child)
            }
        });

        if self.moves_enabled() {
            for entry in &mut self.entries {
                let (Some(first), Some(el)) = (entry.first.take(), entry.transition.element()) else {
                    continue;
                };
                let last = cx.host.bounding_rect(el);
                let delta: Vec2 = first.origin() - last.origin();
                if delta == Vec2::ZERO {
                    continue;
                }
                cx.host.set_transform(el, Affine::translate(delta), true);
                let task = cx.scheduler.schedule(Wake::Frames(1));
                entry.motion = Some(Motion::Settling { el, task });
                tracing::debug!(key = ?entry.key, ?delta, "move started");
            }
        }
        self.note_removed(removed)
    }

    /// Handle a due scheduler task.
    pub fn run<H, S>(&mut self, task: TaskId, cx: &mut Cx<'_, H, S>) -> Vec<K>
    where
        H: LayoutHost<Element = E>,
        S: Scheduler,
    {
        if self.unmounted {
            return Vec::new();
        }
        let wait = Wait::for_options(&self.options);
        let move_class = &self.move_class;
        let mut handled = false;
        let removed = sweep(&mut self.entries, |entry| {
            if handled {
                return Phases::empty();
            }
            match entry.motion.take() {
                Some(Motion::Settling { el, task: t }) if t == task => {
                    handled = true;
                    cx.host.set_transform(el, Affine::IDENTITY, false);
                    cx.host.add_class(el, move_class);
                    // A running phase already consumes this element's end events.
                    let wait = if entry.transition.has_pending_phase() {
                        wait.timer_only(el, &*cx.host)
                    } else {
                        wait
                    };
                    entry.motion = Some(Motion::Animating(Completion::start(wait, el, cx)));
                    return Phases::empty();
                }
                Some(Motion::Animating(mut completion)) if completion.owns(task) => {
                    handled = true;
                    completion.on_task(task, cx.host);
                    cx.host.remove_class(completion.element(), move_class);
                    tracing::debug!(key = ?entry.key, "move finished");
                    return Phases::empty();
                }
                other => entry.motion = other,
            }
            if entry.transition.owns(task) {
                handled = true;
                return entry.transition.run(task, cx);
            }
            Phases::empty()
        });
        self.note_removed(removed)
    }

    /// Handle a native end event forwarded by the host.
    pub fn handle_end_event<H, S>(&mut self, event: &EndEvent<E>, cx: &mut Cx<'_, H, S>) -> Vec<K>
    where
        H: LayoutHost<Element = E>,
        S: Scheduler,
    {
        if self.unmounted {
            return Vec::new();
        }
        let move_class = &self.move_class;
        let removed = sweep(&mut self.entries, |entry| {
            let settled = match &mut entry.motion {
                Some(Motion::Animating(completion)) => {
                    completion.on_event(event, cx).then(|| completion.element())
                }
                _ => None,
            };
            if let Some(el) = settled {
                cx.host.remove_class(el, move_class);
                entry.motion = None;
                tracing::debug!(key = ?entry.key, "move finished");
            }
            entry.transition.handle_end_event(event, cx)
        });
        self.note_removed(removed)
    }

    /// Complete an explicit-callback phase of whichever child issued `done`.
    pub fn complete<H, S>(&mut self, done: Done, cx: &mut Cx<'_, H, S>) -> Vec<K>
    where
        H: LayoutHost<Element = E>,
        S: Scheduler,
    {
        if self.unmounted {
            return Vec::new();
        }
        let removed = sweep(&mut self.entries, |entry| entry.transition.complete(done, cx));
        self.note_removed(removed)
    }

    /// Tear down every child, releasing all timers and listeners.
    pub fn unmount<H, S>(&mut self, cx: &mut Cx<'_, H, S>)
    where
        H: LayoutHost<Element = E>,
        S: Scheduler,
    {
        if self.unmounted {
            return;
        }
        self.unmounted = true;
        let notify = self.options.teardown == TeardownPolicy::NotifyCancel;
        for mut entry in self.entries.drain(..) {
            entry.stop_motion(&self.move_class, cx, notify);
            entry.transition.unmount(cx);
        }
    }

    fn note_removed(&mut self, removed: Vec<K>) -> Vec<K> {
        if !removed.is_empty() {
            self.dirty = true;
        }
        removed
    }
}

/// Apply `f` to every entry and drop leaving entries whose leave completed.
fn sweep<K: Clone + Debug, C, E, Hk>(
    entries: &mut Vec<Entry<K, C, E, Hk>>,
    mut f: impl FnMut(&mut Entry<K, C, E, Hk>) -> Phases,
) -> Vec<K> {
    let mut removed = Vec::new();
    entries.retain_mut(|entry| {
        let done = f(entry);
        if entry.leaving && done.contains(Phases::LEAVE) {
            tracing::debug!(key = ?entry.key, "child removed");
            removed.push(entry.key.clone());
            return false;
        }
        true
    });
    removed
}

/// Keep the first child of each key.
fn dedupe<K: Eq + Debug, C>(children: Vec<KeyedChild<K, C>>) -> Vec<KeyedChild<K, C>> {
    let mut unique: Vec<KeyedChild<K, C>> = Vec::with_capacity(children.len());
    for child in children {
        if unique.iter().any(|c| c.key == child.key) {
            tracing::warn!(key = ?child.key, "duplicate key in transition group; keeping the first");
            continue;
        }
        unique.push(child);
    }
    unique
}
