// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The single-element transition controller.
//!
//! ## Lifecycle
//!
//! A [`Transition`] owns one logical child slot. The host feeds it the latest
//! content with [`Transition::update`], renders what [`Transition::rendered`]
//! reports, and then calls [`Transition::committed`] with a resolver from
//! content to mounted elements. Queued phases start on commit, never earlier,
//! because a phase needs the element it animates.
//!
//! Every phase follows the same class lifecycle on one element:
//!
//! 1. add the initial and active classes, call [`Hooks::before`], and
//!    schedule a double-frame deferral;
//! 2. on the deferral task, swap the initial class for the post class, call
//!    [`Hooks::during`], and arm a [`Completion`] (or hand out a [`Done`]
//!    token for explicit-callback phases);
//! 3. on completion, remove the active and post classes and call [`Hooks::after`].
//!
//! Content changes that arrive while phases are pending cancel them first:
//! their classes are removed and [`Hooks::cancel`] fires once per phase.
//!
//! ## Modes
//!
//! - No mode: the new content enters while the old content leaves.
//! - [`Mode::InOut`]: the old content starts leaving once entering finished.
//! - [`Mode::OutIn`]: only the old content is rendered until it has left;
//!   content changes during that leave do not interrupt it, and the newest
//!   content enters afterwards.
//!
//! ## Driving
//!
//! Due scheduler tasks go to [`Transition::run`], forwarded native end events
//! to [`Transition::handle_end_event`], and explicit completion tokens to
//! [`Transition::complete`]. Each of these returns the [`Phases`] that
//! completed during the call. A leave completing changes what is rendered, so
//! check [`Transition::needs_commit`] afterwards.

use alloc::vec::Vec;

use crate::completion::{Completion, Wait};
use crate::frame::{DEFERRAL_FRAMES, Scheduler, TaskId, Wake};
use crate::hooks::{Done, Hooks, NoHooks};
use crate::host::{Cx, EndEvent, Host};
use crate::options::{Mode, Phase, Phases, TeardownPolicy, TransitionClasses, TransitionOptions};
use crate::types::Keyed;
use crate::wrapper::{SlotHandle, wrap};

/// Coarse state of a [`Transition`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum State {
    /// Nothing is pending.
    Idle,
    /// The first-mount appear phase is queued or running.
    Appearing,
    /// New content is entering.
    Entering,
    /// Old content is leaving.
    Leaving,
    /// New content enters while old content leaves (no mode).
    EnteringAndLeaving,
    /// New content enters after the old content left ([`Mode::OutIn`]).
    EnteringAfterLeave,
}

/// Content shown in one of the two slots, with its resolved elements.
#[derive(Clone, Debug)]
struct Slot<C, E> {
    content: C,
    handle: Option<SlotHandle<E>>,
}

impl<C, E: Copy> Slot<C, E> {
    fn new(content: C) -> Self {
        Self {
            content,
            handle: None,
        }
    }

    fn element(&self) -> Option<E> {
        self.handle.as_ref().and_then(SlotHandle::element)
    }
}

#[derive(Debug)]
enum Stage<E> {
    /// Initial classes applied, waiting for the frame deferral.
    Deferred(TaskId),
    /// Active classes applied, waiting for the caller's [`Done`].
    Explicit(TaskId),
    /// Active classes applied, waiting for end events or the timer.
    Waiting(Completion<E>),
}

#[derive(Debug)]
struct PhaseRun<E> {
    element: E,
    stage: Stage<E>,
}

/// Which step of a run a fired task belongs to.
enum Hit {
    Deferral,
    Timer,
}

/// What the host should render for a [`Transition`], in order.
#[derive(Copy, Clone, Debug)]
pub struct Rendered<'a, C> {
    /// Content being phased out, rendered first.
    pub previous: Option<&'a C>,
    /// Content being shown.
    pub current: Option<&'a C>,
    /// Tag of the container to use when both slots render and the host
    /// lacks fragment support.
    pub component: &'a str,
}

impl<'a, C> Rendered<'a, C> {
    /// Number of slots to render.
    pub fn len(&self) -> usize {
        usize::from(self.previous.is_some()) + usize::from(self.current.is_some())
    }

    /// Returns true if nothing is rendered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if both slots render and so may need a shared container.
    pub fn is_pair(&self) -> bool {
        self.len() == 2
    }

    /// Slots in render order.
    pub fn iter(&self) -> impl Iterator<Item = &'a C> + use<'a, C> {
        self.previous.into_iter().chain(self.current)
    }
}

/// State machine for one child's appear, enter and leave phases.
///
/// `C` is the content type, `E` the host element handle and `Hk` the
/// caller's [`Hooks`].
///
/// ```
/// use understory_transition::{
///     Cx, FrameClock, KeyedChild, MemoryHost, NoHooks, Phases, Transition, TransitionOptions,
/// };
///
/// let mut dom = MemoryHost::new();
/// let mut clock = FrameClock::new();
/// let el = dom.create_element("div");
///
/// let options = TransitionOptions::named("fade").with_appear(true).with_duration(50);
/// let mut t = Transition::new(options, NoHooks, Some(KeyedChild::new("a", ())));
/// t.mount(&mut Cx::new(&mut dom, &mut clock), |_| vec![el]);
/// assert!(dom.has_class(el, "fade-enter"));
///
/// clock.tick_frame();
/// clock.tick_frame();
/// clock.advance(50);
/// let mut done = Phases::empty();
/// while let Some(task) = clock.pop_due() {
///     done |= t.run(task, &mut Cx::new(&mut dom, &mut clock));
/// }
/// assert_eq!(done, Phases::APPEAR);
/// assert!(dom.classes(el).is_empty());
/// ```
#[derive(Debug)]
pub struct Transition<C, E, Hk = NoHooks> {
    options: TransitionOptions,
    classes: TransitionClasses,
    hooks: Hk,
    latest: Option<C>,
    current: Option<Slot<C, E>>,
    previous: Option<Slot<C, E>>,
    is_entering: bool,
    is_leaving: bool,
    runs: [Option<PhaseRun<E>>; 3],
    queued: Phases,
    needs_commit: bool,
    mounted: bool,
    unmounted: bool,
}

impl<C, E, Hk> Transition<C, E, Hk>
where
    C: Keyed + Clone,
    E: Copy + Eq + core::fmt::Debug,
    Hk: Hooks<E>,
{
    /// Create an unmounted transition showing `child`.
    ///
    /// With [`TransitionOptions::appear`] the appear phase is queued for
    /// [`Transition::mount`].
    pub fn new(options: TransitionOptions, hooks: Hk, child: Option<C>) -> Self {
        let classes = options.classes();
        let appear = options.appear;
        Self {
            options,
            classes,
            hooks,
            current: child.clone().map(Slot::new),
            latest: child,
            previous: None,
            is_entering: appear,
            is_leaving: false,
            runs: [None, None, None],
            queued: if appear {
                Phases::APPEAR
            } else {
                Phases::empty()
            },
            needs_commit: true,
            mounted: false,
            unmounted: false,
        }
    }

    /// The options this transition was created with.
    pub fn options(&self) -> &TransitionOptions {
        &self.options
    }

    /// Resolved class names.
    pub fn classes(&self) -> &TransitionClasses {
        &self.classes
    }

    /// The caller's hooks.
    pub fn hooks(&self) -> &Hk {
        &self.hooks
    }

    /// Mutable access to the caller's hooks.
    pub fn hooks_mut(&mut self) -> &mut Hk {
        &mut self.hooks
    }

    /// Returns true while new content is entering or appearing.
    pub fn is_entering(&self) -> bool {
        self.is_entering
    }

    /// Returns true while old content is leaving.
    pub fn is_leaving(&self) -> bool {
        self.is_leaving
    }

    /// The latest content passed in by the host.
    pub fn child(&self) -> Option<&C> {
        self.latest.as_ref()
    }

    /// Content in the current slot.
    pub fn current(&self) -> Option<&C> {
        self.current.as_ref().map(|s| &s.content)
    }

    /// Content being phased out.
    pub fn previous(&self) -> Option<&C> {
        self.previous.as_ref().map(|s| &s.content)
    }

    /// Element of the current slot, once committed.
    pub fn element(&self) -> Option<E> {
        self.current.as_ref().and_then(Slot::element)
    }

    /// Element of the previous slot, once committed.
    pub fn previous_element(&self) -> Option<E> {
        self.previous.as_ref().and_then(Slot::element)
    }

    /// Returns true if what [`Transition::rendered`] reports changed since the last commit.
    pub fn needs_commit(&self) -> bool {
        self.needs_commit && !self.unmounted
    }

    /// Returns true once [`Transition::mount`] ran.
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Returns true once [`Transition::unmount`] ran.
    pub fn is_unmounted(&self) -> bool {
        self.unmounted
    }

    /// Coarse state.
    pub fn state(&self) -> State {
        match (self.is_entering, self.is_leaving) {
            (false, false) => State::Idle,
            (true, true) => State::EnteringAndLeaving,
            (false, true) => State::Leaving,
            (true, false) => {
                if self.queued.contains(Phases::APPEAR) || self.runs[Phase::Appear.index()].is_some() {
                    State::Appearing
                } else if self.options.mode == Some(Mode::OutIn) {
                    State::EnteringAfterLeave
                } else {
                    State::Entering
                }
            }
        }
    }

    /// What the host should render now.
    pub fn rendered(&self) -> Rendered<'_, C> {
        Rendered {
            previous: self.previous(),
            current: self.current(),
            component: self.options.component(),
        }
    }

    /// Returns true if `task` belongs to one of this transition's pending phases.
    pub fn owns(&self, task: TaskId) -> bool {
        self.runs.iter().flatten().any(|run| match &run.stage {
            Stage::Deferred(t) | Stage::Explicit(t) => *t == task,
            Stage::Waiting(c) => c.owns(task),
        })
    }

    /// Returns true while any phase is queued or running.
    pub fn has_pending_phase(&self) -> bool {
        !self.queued.is_empty() || self.runs.iter().any(Option::is_some)
    }

    /// First commit: resolve elements and start the appear phase if configured.
    ///
    /// Later calls do nothing; use [`Transition::committed`] for subsequent renders.
    pub fn mount<H, S>(&mut self, cx: &mut Cx<'_, H, S>, resolve: impl FnMut(&C) -> Vec<E>) -> Phases
    where
        H: Host<Element = E>,
        S: Scheduler,
    {
        if self.mounted || self.unmounted {
            return Phases::empty();
        }
        self.mounted = true;
        self.commit(cx, resolve)
    }

    /// The host rendered [`Transition::rendered`]; resolve new slots and start queued phases.
    pub fn committed<H, S>(&mut self, cx: &mut Cx<'_, H, S>, resolve: impl FnMut(&C) -> Vec<E>) -> Phases
    where
        H: Host<Element = E>,
        S: Scheduler,
    {
        if self.unmounted {
            return Phases::empty();
        }
        if !self.mounted {
            return self.mount(cx, resolve);
        }
        self.commit(cx, resolve)
    }

    fn commit<H, S>(&mut self, cx: &mut Cx<'_, H, S>, mut resolve: impl FnMut(&C) -> Vec<E>) -> Phases
    where
        H: Host<Element = E>,
        S: Scheduler,
    {
        let component = self.options.component();
        for slot in [&mut self.previous, &mut self.current].into_iter().flatten() {
            if slot.handle.is_none() {
                slot.handle = Some(wrap(cx.host, resolve(&slot.content), component));
            }
        }
        self.needs_commit = false;

        let queued = core::mem::take(&mut self.queued);
        let mut done = Phases::empty();
        for phase in Phase::ALL {
            if queued.contains(phase.flag()) {
                done |= self.start_phase(phase, cx);
            }
        }
        done
    }

    /// The host has new content for this slot.
    ///
    /// Content with the same key as the latest content only refreshes it.
    /// A different key cancels pending phases and starts enter and leave
    /// according to the mode; the phases begin at the next commit.
    pub fn update<H, S>(&mut self, child: Option<C>, cx: &mut Cx<'_, H, S>)
    where
        H: Host<Element = E>,
        S: Scheduler,
    {
        if self.unmounted {
            return;
        }
        let same = match (&self.latest, &child) {
            (None, None) => true,
            (Some(a), Some(b)) => a.key() == b.key(),
            _ => false,
        };
        if same {
            if let (Some(slot), Some(c)) = (self.current.as_mut(), child.as_ref())
                && slot.content.key() == c.key()
            {
                slot.content = c.clone();
            }
            self.latest = child;
            return;
        }

        if !self.mounted {
            self.current = child.clone().map(Slot::new);
            self.latest = child;
            return;
        }

        self.latest = child;
        if self.options.mode == Some(Mode::OutIn) && self.is_leaving {
            tracing::trace!("content change deferred until leave completes");
            return;
        }

        self.cancel_pending(cx, true);
        self.queued = Phases::empty();
        self.is_entering = false;
        self.is_leaving = false;
        self.previous = self.current.take();

        if self.options.mode != Some(Mode::OutIn) {
            self.current = self.latest.clone().map(Slot::new);
            self.is_entering = true;
            self.queued |= Phases::ENTER;
        }
        if self.options.mode != Some(Mode::InOut) {
            self.is_leaving = true;
            self.queued |= Phases::LEAVE;
        }
        self.needs_commit = true;
    }

    /// Handle a due scheduler task.
    pub fn run<H, S>(&mut self, task: TaskId, cx: &mut Cx<'_, H, S>) -> Phases
    where
        H: Host<Element = E>,
        S: Scheduler,
    {
        let Some((phase, hit)) = self.locate(task) else {
            return Phases::empty();
        };
        let Some(run) = self.runs[phase.index()].take() else {
            return Phases::empty();
        };
        match (hit, run.stage) {
            (Hit::Deferral, _) => {
                self.activate(phase, run.element, cx);
                Phases::empty()
            }
            (Hit::Timer, Stage::Waiting(mut completion)) => {
                completion.on_task(task, cx.host);
                self.finish(phase, Some(run.element), cx)
            }
            (Hit::Timer, stage) => {
                self.runs[phase.index()] = Some(PhaseRun {
                    element: run.element,
                    stage,
                });
                Phases::empty()
            }
        }
    }

    fn locate(&self, task: TaskId) -> Option<(Phase, Hit)> {
        Phase::ALL.into_iter().find_map(|phase| {
            let run = self.runs[phase.index()].as_ref()?;
            match &run.stage {
                Stage::Deferred(t) if *t == task => Some((phase, Hit::Deferral)),
                Stage::Waiting(c) if c.owns(task) => Some((phase, Hit::Timer)),
                _ => None,
            }
        })
    }

    /// Handle a native end event forwarded by the host.
    pub fn handle_end_event<H, S>(&mut self, event: &EndEvent<E>, cx: &mut Cx<'_, H, S>) -> Phases
    where
        H: Host<Element = E>,
        S: Scheduler,
    {
        let mut done = Phases::empty();
        for phase in Phase::ALL {
            let slot = &mut self.runs[phase.index()];
            let fired = match slot {
                Some(PhaseRun {
                    stage: Stage::Waiting(c),
                    ..
                }) => c.on_event(event, cx),
                _ => false,
            };
            if fired {
                let element = slot.take().map(|run| run.element);
                done |= self.finish(phase, element, cx);
            }
        }
        done
    }

    /// Complete an explicit-callback phase.
    ///
    /// Tokens of phases that were canceled or already completed are ignored.
    pub fn complete<H, S>(&mut self, done: Done, cx: &mut Cx<'_, H, S>) -> Phases
    where
        H: Host<Element = E>,
        S: Scheduler,
    {
        let slot = &mut self.runs[done.phase.index()];
        let matches = matches!(
            slot,
            Some(PhaseRun { stage: Stage::Explicit(t), .. }) if *t == done.task
        );
        if !matches {
            tracing::trace!(phase = %done.phase, "stale completion token ignored");
            return Phases::empty();
        }
        cx.scheduler.cancel(done.task);
        let element = slot.take().map(|run| run.element);
        self.finish(done.phase, element, cx)
    }

    /// Tear the transition down, releasing every timer and listener.
    ///
    /// With [`TeardownPolicy::NotifyCancel`], pending phases also have their
    /// classes removed and their cancel hooks called.
    pub fn unmount<H, S>(&mut self, cx: &mut Cx<'_, H, S>)
    where
        H: Host<Element = E>,
        S: Scheduler,
    {
        if self.unmounted {
            return;
        }
        self.unmounted = true;
        let notify = self.options.teardown == TeardownPolicy::NotifyCancel;
        self.cancel_pending(cx, notify);
        self.queued = Phases::empty();
        self.is_entering = false;
        self.is_leaving = false;
    }

    fn start_phase<H, S>(&mut self, phase: Phase, cx: &mut Cx<'_, H, S>) -> Phases
    where
        H: Host<Element = E>,
        S: Scheduler,
    {
        let element = match phase {
            Phase::Appear | Phase::Enter => self.element(),
            Phase::Leave => self.previous_element(),
        };
        let Some(el) = element else {
            tracing::debug!(%phase, "no element; phase completes immediately");
            return self.finish(phase, None, cx);
        };
        if let Some(stale) = self.runs[phase.index()].take() {
            self.release(phase, stale, cx, true);
        }

        let classes = self.classes.for_phase(phase);
        cx.host.add_class(el, &classes.initial);
        cx.host.add_class(el, &classes.active);
        self.hooks.before(phase, el);

        let task = cx.scheduler.schedule(Wake::Frames(DEFERRAL_FRAMES));
        self.runs[phase.index()] = Some(PhaseRun {
            element: el,
            stage: Stage::Deferred(task),
        });
        tracing::debug!(%phase, ?el, "phase started");
        Phases::empty()
    }

    fn activate<H, S>(&mut self, phase: Phase, el: E, cx: &mut Cx<'_, H, S>)
    where
        H: Host<Element = E>,
        S: Scheduler,
    {
        let classes = self.classes.for_phase(phase);
        cx.host.remove_class(el, &classes.initial);
        cx.host.add_class(el, &classes.post);

        let stage = if self.options.hook_mode(phase).is_explicit() {
            let task = cx.scheduler.schedule(Wake::Manual);
            self.hooks.during(phase, el, Some(Done { task, phase }));
            Stage::Explicit(task)
        } else {
            self.hooks.during(phase, el, None);
            Stage::Waiting(Completion::start(Wait::for_options(&self.options), el, cx))
        };
        self.runs[phase.index()] = Some(PhaseRun { element: el, stage });
    }

    fn finish<H, S>(&mut self, phase: Phase, el: Option<E>, cx: &mut Cx<'_, H, S>) -> Phases
    where
        H: Host<Element = E>,
        S: Scheduler,
    {
        let mut done = phase.flag();
        if let Some(el) = el {
            let classes = self.classes.for_phase(phase);
            cx.host.remove_class(el, &classes.active);
            cx.host.remove_class(el, &classes.post);
            self.hooks.after(phase, el);
            tracing::debug!(%phase, ?el, "phase finished");
        }

        match phase {
            Phase::Appear => self.is_entering = false,
            Phase::Enter => {
                self.is_entering = false;
                if self.options.mode == Some(Mode::InOut) {
                    self.is_leaving = true;
                    done |= self.start_phase(Phase::Leave, cx);
                }
            }
            Phase::Leave => {
                self.is_leaving = false;
                self.previous = None;
                self.needs_commit = true;
                if self.options.mode == Some(Mode::OutIn) {
                    self.current = self.latest.clone().map(Slot::new);
                    self.is_entering = true;
                    self.queued |= Phases::ENTER;
                }
            }
        }
        done
    }

    fn cancel_pending<H, S>(&mut self, cx: &mut Cx<'_, H, S>, notify: bool)
    where
        H: Host<Element = E>,
        S: Scheduler,
    {
        for phase in Phase::ALL {
            if let Some(run) = self.runs[phase.index()].take() {
                self.release(phase, run, cx, notify);
            }
        }
    }

    fn release<H, S>(&mut self, phase: Phase, run: PhaseRun<E>, cx: &mut Cx<'_, H, S>, notify: bool)
    where
        H: Host<Element = E>,
        S: Scheduler,
    {
        match run.stage {
            Stage::Deferred(task) | Stage::Explicit(task) => cx.scheduler.cancel(task),
            Stage::Waiting(completion) => completion.cancel(cx),
        }
        tracing::debug!(%phase, el = ?run.element, notify, "phase canceled");
        if notify {
            let classes = self.classes.for_phase(phase);
            cx.host.remove_class(run.element, &classes.initial);
            cx.host.remove_class(run.element, &classes.active);
            cx.host.remove_class(run.element, &classes.post);
            self.hooks.cancel(phase, run.element);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameClock;
    use crate::memory::{ElementId, MemoryHost};
    use crate::sniff::{ComputedTiming, Mechanism};
    use alloc::vec;

    #[derive(Clone, Debug, PartialEq)]
    struct Item {
        key: &'static str,
        el: ElementId,
        label: u32,
    }

    impl Keyed for Item {
        type Key = &'static str;

        fn key(&self) -> &&'static str {
            &self.key
        }
    }

    #[derive(Copy, Clone, Debug, Eq, PartialEq)]
    enum Call {
        Before(Phase, ElementId),
        During(Phase, ElementId),
        After(Phase, ElementId),
        Cancel(Phase, ElementId),
    }

    #[derive(Default, Debug)]
    struct Recorder {
        calls: Vec<Call>,
        tokens: Vec<Done>,
    }

    impl Hooks<ElementId> for Recorder {
        fn before(&mut self, phase: Phase, el: ElementId) {
            self.calls.push(Call::Before(phase, el));
        }

        fn during(&mut self, phase: Phase, el: ElementId, done: Option<Done>) {
            self.calls.push(Call::During(phase, el));
            self.tokens.extend(done);
        }

        fn after(&mut self, phase: Phase, el: ElementId) {
            self.calls.push(Call::After(phase, el));
        }

        fn cancel(&mut self, phase: Phase, el: ElementId) {
            self.calls.push(Call::Cancel(phase, el));
        }
    }

    type Subject = Transition<Item, ElementId, Recorder>;

    struct Rig {
        dom: MemoryHost,
        clock: FrameClock,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                dom: MemoryHost::new(),
                clock: FrameClock::new(),
            }
        }

        fn item(&mut self, key: &'static str) -> Item {
            Item {
                key,
                el: self.dom.create_element("div"),
                label: 0,
            }
        }

        fn mount(&mut self, t: &mut Subject) -> Phases {
            t.mount(&mut Cx::new(&mut self.dom, &mut self.clock), |c| vec![c.el])
        }

        fn commit(&mut self, t: &mut Subject) -> Phases {
            t.committed(&mut Cx::new(&mut self.dom, &mut self.clock), |c| vec![c.el])
        }

        fn update(&mut self, t: &mut Subject, child: Option<Item>) {
            t.update(child, &mut Cx::new(&mut self.dom, &mut self.clock));
        }

        /// Update, then commit like a host re-render would.
        fn replace(&mut self, t: &mut Subject, child: Option<Item>) -> Phases {
            self.update(t, child);
            self.commit(t)
        }

        /// Drain due tasks; commits whenever the transition asks for it.
        fn drain(&mut self, t: &mut Subject) -> Phases {
            let mut done = Phases::empty();
            loop {
                if t.needs_commit() {
                    done |= self.commit(t);
                }
                let Some(task) = self.clock.pop_due() else {
                    return done;
                };
                done |= t.run(task, &mut Cx::new(&mut self.dom, &mut self.clock));
            }
        }

        fn frames(&mut self, t: &mut Subject, n: u32) -> Phases {
            let mut done = Phases::empty();
            for _ in 0..n {
                self.clock.tick_frame();
                done |= self.drain(t);
            }
            done
        }

        fn advance(&mut self, t: &mut Subject, ms: u64) -> Phases {
            self.clock.advance(ms);
            self.drain(t)
        }

        fn end(&mut self, t: &mut Subject, el: ElementId) -> Phases {
            let event = EndEvent {
                mechanism: Mechanism::Transition,
                target: el,
            };
            let done = t.handle_end_event(&event, &mut Cx::new(&mut self.dom, &mut self.clock));
            if t.needs_commit() {
                return done | self.commit(t);
            }
            done
        }
    }

    fn timed(ms: u64) -> TransitionOptions {
        TransitionOptions::default().with_duration(ms)
    }

    #[test]
    fn appear_with_explicit_duration_fires_after_exactly_that_long() {
        let mut rig = Rig::new();
        let a = rig.item("a");
        let mut t = Subject::new(timed(50).with_appear(true), Recorder::default(), Some(a.clone()));
        assert_eq!(t.state(), State::Appearing);

        rig.mount(&mut t);
        assert_eq!(rig.dom.classes(a.el), &["t-enter", "t-entering"]);
        assert_eq!(t.hooks().calls, vec![Call::Before(Phase::Appear, a.el)]);

        assert!(rig.frames(&mut t, 1).is_empty());
        assert!(rig.dom.has_class(a.el, "t-enter"), "initial class visible for a full frame");
        rig.frames(&mut t, 1);
        assert_eq!(rig.dom.classes(a.el), &["t-entering", "t-enter-to"]);

        assert!(rig.advance(&mut t, 49).is_empty());
        assert!(!t.hooks().calls.contains(&Call::After(Phase::Appear, a.el)));
        assert_eq!(rig.advance(&mut t, 1), Phases::APPEAR);
        assert_eq!(
            t.hooks().calls,
            vec![
                Call::Before(Phase::Appear, a.el),
                Call::During(Phase::Appear, a.el),
                Call::After(Phase::Appear, a.el),
            ]
        );
        assert!(rig.dom.classes(a.el).is_empty());
        assert!(!t.is_entering());
        assert_eq!(t.state(), State::Idle);
    }

    #[test]
    fn mount_without_appear_does_nothing() {
        let mut rig = Rig::new();
        let a = rig.item("a");
        let mut t = Subject::new(TransitionOptions::default(), Recorder::default(), Some(a.clone()));
        assert!(rig.mount(&mut t).is_empty());
        assert!(rig.dom.log().is_empty());
        assert_eq!(rig.clock.pending_len(), 0);
        assert_eq!(t.element(), Some(a.el));
    }

    #[test]
    fn class_writes_are_ordered_initial_active_post() {
        let mut rig = Rig::new();
        let a = rig.item("a");
        let mut t = Subject::new(timed(10).with_appear(true), Recorder::default(), Some(a.clone()));
        rig.mount(&mut t);
        rig.frames(&mut t, 2);
        rig.advance(&mut t, 10);
        use crate::memory::Mutation::{AddClass, RemoveClass};
        assert_eq!(
            rig.dom.log(),
            &[
                AddClass(a.el, "t-enter".into()),
                AddClass(a.el, "t-entering".into()),
                RemoveClass(a.el, "t-enter".into()),
                AddClass(a.el, "t-enter-to".into()),
                RemoveClass(a.el, "t-entering".into()),
                RemoveClass(a.el, "t-enter-to".into()),
            ]
        );
    }

    #[test]
    fn same_key_refreshes_content_without_transitioning() {
        let mut rig = Rig::new();
        let a = rig.item("a");
        let mut t = Subject::new(timed(10), Recorder::default(), Some(a.clone()));
        rig.mount(&mut t);
        let refreshed = Item { label: 7, ..a.clone() };
        rig.update(&mut t, Some(refreshed.clone()));
        assert_eq!(t.current(), Some(&refreshed));
        assert!(!t.needs_commit());
        assert_eq!(t.state(), State::Idle);
        assert!(t.hooks().calls.is_empty());
    }

    #[test]
    fn default_mode_enters_and_leaves_simultaneously() {
        let mut rig = Rig::new();
        let a = rig.item("a");
        let b = rig.item("b");
        let mut t = Subject::new(timed(100), Recorder::default(), Some(a.clone()));
        rig.mount(&mut t);

        rig.update(&mut t, Some(b.clone()));
        assert_eq!(t.state(), State::EnteringAndLeaving);
        let rendered = t.rendered();
        assert_eq!(rendered.iter().map(|c| c.key).collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(rendered.is_pair());

        rig.commit(&mut t);
        assert!(rig.dom.has_class(b.el, "t-enter"));
        assert!(rig.dom.has_class(a.el, "t-leave"));

        rig.frames(&mut t, 2);
        assert_eq!(rig.advance(&mut t, 100), Phases::ENTER | Phases::LEAVE);
        assert_eq!(t.state(), State::Idle);
        assert_eq!(t.previous(), None);
        assert_eq!(t.rendered().len(), 1);
        assert!(rig.dom.classes(a.el).is_empty());
        assert!(rig.dom.classes(b.el).is_empty());
    }

    #[test]
    fn out_in_enters_only_after_the_leave_hook() {
        let mut rig = Rig::new();
        let a = rig.item("a");
        let b = rig.item("b");
        let options = timed(30).with_mode(Mode::OutIn);
        let mut t = Subject::new(options, Recorder::default(), Some(a.clone()));
        rig.mount(&mut t);

        rig.replace(&mut t, Some(b.clone()));
        assert_eq!(t.state(), State::Leaving);
        assert_eq!(t.rendered().iter().count(), 1, "only the outgoing content renders");
        assert_eq!(t.previous(), Some(&a));

        rig.frames(&mut t, 2);
        assert!(!rig.dom.has_class(b.el, "t-enter"));
        rig.advance(&mut t, 30);

        let calls = &t.hooks().calls;
        let after_leave = calls.iter().position(|c| *c == Call::After(Phase::Leave, a.el));
        let before_enter = calls.iter().position(|c| *c == Call::Before(Phase::Enter, b.el));
        assert!(after_leave.expect("leave finished") < before_enter.expect("enter started"));
        assert!(rig.dom.has_class(b.el, "t-enter"));
        assert_eq!(t.state(), State::EnteringAfterLeave);

        rig.frames(&mut t, 2);
        assert_eq!(rig.advance(&mut t, 30), Phases::ENTER);
        assert_eq!(t.state(), State::Idle);
    }

    #[test]
    fn out_in_leave_is_not_interrupted_and_newest_content_enters() {
        let mut rig = Rig::new();
        let a = rig.item("a");
        let b = rig.item("b");
        let c = rig.item("c");
        let mut t = Subject::new(timed(30).with_mode(Mode::OutIn), Recorder::default(), Some(a.clone()));
        rig.mount(&mut t);
        rig.replace(&mut t, Some(b));
        rig.update(&mut t, Some(c.clone()));
        assert!(!t.needs_commit());
        assert_eq!(t.child(), Some(&c));

        rig.frames(&mut t, 2);
        rig.advance(&mut t, 30);
        assert!(!t.hooks().calls.iter().any(|c| matches!(c, Call::Cancel(..))));
        assert_eq!(t.current(), Some(&c));
        assert!(rig.dom.has_class(c.el, "t-enter"));
    }

    #[test]
    fn in_out_leaves_only_after_the_enter_hook() {
        let mut rig = Rig::new();
        let a = rig.item("a");
        let b = rig.item("b");
        let mut t = Subject::new(timed(30).with_mode(Mode::InOut), Recorder::default(), Some(a.clone()));
        rig.mount(&mut t);

        rig.replace(&mut t, Some(b.clone()));
        assert_eq!(t.state(), State::Entering);
        assert!(!rig.dom.has_class(a.el, "t-leave"));
        assert_eq!(t.rendered().len(), 2);

        rig.frames(&mut t, 2);
        assert_eq!(rig.advance(&mut t, 30), Phases::ENTER);
        let calls = &t.hooks().calls;
        let after_enter = calls.iter().position(|c| *c == Call::After(Phase::Enter, b.el));
        let before_leave = calls.iter().position(|c| *c == Call::Before(Phase::Leave, a.el));
        assert!(after_enter.expect("enter finished") < before_leave.expect("leave started"));
        assert_eq!(t.state(), State::Leaving);

        rig.frames(&mut t, 2);
        assert_eq!(rig.advance(&mut t, 30), Phases::LEAVE);
        assert_eq!(t.rendered().len(), 1);
    }

    #[test]
    fn second_change_within_deferral_cancels_first_phase_once() {
        let mut rig = Rig::new();
        let a = rig.item("a");
        let b = rig.item("b");
        let c = rig.item("c");
        let mut t = Subject::new(timed(20), Recorder::default(), Some(a.clone()));
        rig.mount(&mut t);

        rig.replace(&mut t, Some(b.clone()));
        rig.frames(&mut t, 1);
        rig.replace(&mut t, Some(c.clone()));

        let calls = &t.hooks().calls;
        let cancels: Vec<_> = calls.iter().filter(|c| matches!(c, Call::Cancel(..))).collect();
        assert_eq!(
            cancels,
            vec![&Call::Cancel(Phase::Enter, b.el), &Call::Cancel(Phase::Leave, a.el)]
        );
        assert!(rig.dom.classes(a.el).is_empty(), "canceled classes removed");
        assert!(rig.dom.has_class(b.el, "t-leave"), "b now leaves");

        rig.frames(&mut t, 2);
        rig.advance(&mut t, 20);
        let calls = &t.hooks().calls;
        assert!(!calls.contains(&Call::After(Phase::Enter, b.el)));
        assert!(!calls.contains(&Call::After(Phase::Leave, a.el)));
        assert!(calls.contains(&Call::After(Phase::Enter, c.el)));
        assert_eq!(calls.iter().filter(|c| matches!(c, Call::Cancel(..))).count(), 2);
        assert_eq!(rig.clock.pending_len(), 0);
    }

    #[test]
    fn cancel_during_completion_wait_releases_listener() {
        let mut rig = Rig::new();
        let a = rig.item("a");
        let b = rig.item("b");
        let c = rig.item("c");
        rig.dom.set_timing(b.el, ComputedTiming::transition("1s", "0s"));
        let mut t = Subject::new(TransitionOptions::default(), Recorder::default(), Some(a));
        rig.mount(&mut t);
        rig.replace(&mut t, Some(b.clone()));
        rig.frames(&mut t, 2);
        assert!(rig.dom.is_listening(b.el, Mechanism::Transition));

        rig.replace(&mut t, Some(c));
        assert!(!rig.dom.is_listening(b.el, Mechanism::Transition));
        assert!(t.hooks().calls.contains(&Call::Cancel(Phase::Enter, b.el)));
    }

    #[test]
    fn end_events_complete_sniffed_phases() {
        let mut rig = Rig::new();
        let a = rig.item("a");
        rig.dom.set_timing(a.el, ComputedTiming::transition("1s, 2s", "0s"));
        let options = TransitionOptions::default().with_appear(true);
        let mut t = Subject::new(options, Recorder::default(), Some(a.clone()));
        rig.mount(&mut t);
        rig.frames(&mut t, 2);

        assert!(rig.end(&mut t, a.el).is_empty());
        assert_eq!(rig.end(&mut t, a.el), Phases::APPEAR);
        assert_eq!(rig.clock.pending_len(), 0, "fallback timer canceled");
        assert_eq!(rig.dom.listener_count(), 0);
    }

    #[test]
    fn explicit_callbacks_wait_for_the_caller() {
        let mut rig = Rig::new();
        let a = rig.item("a");
        let b = rig.item("b");
        let options = timed(10).with_explicit_callbacks(Phases::LEAVE);
        let mut t = Subject::new(options, Recorder::default(), Some(a.clone()));
        rig.mount(&mut t);
        rig.replace(&mut t, Some(b));
        rig.frames(&mut t, 2);
        assert_eq!(rig.advance(&mut t, 1_000), Phases::ENTER, "duration only applies to enter");
        assert!(t.is_leaving());
        assert!(rig.dom.has_class(a.el, "t-leave-to"));

        let done = t.hooks().tokens[0];
        assert_eq!(done.phase(), Phase::Leave);
        let finished = t.complete(done, &mut Cx::new(&mut rig.dom, &mut rig.clock));
        assert_eq!(finished, Phases::LEAVE);
        assert!(rig.dom.classes(a.el).is_empty());
        assert!(
            t.complete(done, &mut Cx::new(&mut rig.dom, &mut rig.clock)).is_empty(),
            "tokens are single-use"
        );
    }

    #[test]
    fn missing_element_completes_silently_and_continues_out_in() {
        let mut rig = Rig::new();
        let b = rig.item("b");
        let mut t = Subject::new(timed(10).with_mode(Mode::OutIn), Recorder::default(), None);
        rig.mount(&mut t);

        rig.update(&mut t, Some(b.clone()));
        assert_eq!(rig.commit(&mut t), Phases::LEAVE, "nothing to leave");
        assert!(t.needs_commit());
        rig.commit(&mut t);
        assert!(rig.dom.has_class(b.el, "t-enter"));
        assert_eq!(t.hooks().calls, vec![Call::Before(Phase::Enter, b.el)]);
    }

    #[test]
    fn removing_content_leaves_it() {
        let mut rig = Rig::new();
        let a = rig.item("a");
        let mut t = Subject::new(timed(10), Recorder::default(), Some(a.clone()));
        rig.mount(&mut t);
        rig.update(&mut t, None);
        assert_eq!(rig.commit(&mut t), Phases::ENTER, "nothing to enter");
        assert_eq!(t.state(), State::Leaving);
        rig.frames(&mut t, 2);
        assert_eq!(rig.advance(&mut t, 10), Phases::LEAVE);
        assert!(t.rendered().is_empty());
    }

    #[test]
    fn enter_leave_enter_round_trip_settles() {
        let mut rig = Rig::new();
        let a = rig.item("a");
        let mut t = Subject::new(timed(10).with_mode(Mode::OutIn), Recorder::default(), None);
        rig.mount(&mut t);
        for child in [Some(a.clone()), None, Some(a.clone())] {
            rig.replace(&mut t, child);
            rig.frames(&mut t, 2);
            rig.advance(&mut t, 10);
            rig.frames(&mut t, 2);
            rig.advance(&mut t, 10);
        }
        assert!(!t.is_entering());
        assert!(!t.is_leaving());
        assert_eq!(t.current(), Some(&a));
        assert!(rig.dom.classes(a.el).is_empty());
    }

    #[test]
    fn silent_unmount_releases_without_hooks() {
        let mut rig = Rig::new();
        let a = rig.item("a");
        rig.dom.set_timing(a.el, ComputedTiming::animation("1s", "0s"));
        let mut t = Subject::new(
            TransitionOptions::default().with_appear(true),
            Recorder::default(),
            Some(a.clone()),
        );
        rig.mount(&mut t);
        rig.frames(&mut t, 2);
        assert_eq!(rig.dom.listener_count(), 1);

        t.unmount(&mut Cx::new(&mut rig.dom, &mut rig.clock));
        assert_eq!(rig.clock.pending_len(), 0);
        assert_eq!(rig.dom.listener_count(), 0);
        assert!(!t.hooks().calls.iter().any(|c| matches!(c, Call::Cancel(..))));
        assert!(rig.advance(&mut t, 5_000).is_empty());
    }

    #[test]
    fn notify_cancel_unmount_calls_cancel_hooks() {
        let mut rig = Rig::new();
        let a = rig.item("a");
        let options = timed(10)
            .with_appear(true)
            .with_teardown(TeardownPolicy::NotifyCancel);
        let mut t = Subject::new(options, Recorder::default(), Some(a.clone()));
        rig.mount(&mut t);
        t.unmount(&mut Cx::new(&mut rig.dom, &mut rig.clock));
        assert_eq!(t.hooks().calls.last(), Some(&Call::Cancel(Phase::Appear, a.el)));
        assert!(rig.dom.classes(a.el).is_empty());
        assert!(t.is_unmounted());
    }

    #[test]
    fn no_css_completes_on_the_next_tick() {
        let mut rig = Rig::new();
        let a = rig.item("a");
        rig.dom.set_timing(a.el, ComputedTiming::transition("3s", "0s"));
        let options = TransitionOptions::default().with_appear(true).with_no_css(true);
        let mut t = Subject::new(options, Recorder::default(), Some(a.clone()));
        rig.mount(&mut t);
        assert_eq!(rig.frames(&mut t, 2), Phases::APPEAR);
        assert_eq!(rig.dom.listener_count(), 0);
    }
}
