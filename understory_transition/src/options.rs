// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transition configuration: phases, modes, class names and completion strategy.
//!
//! [`TransitionOptions`] is plain data, immutable for the lifetime of a
//! transition instance. With the `serde` feature it can be loaded from any
//! serde format; hooks are supplied separately (see [`crate::hooks`]).
//!
//! ```
//! use understory_transition::options::{Mode, Phase, Phases, TransitionOptions};
//!
//! let options = TransitionOptions::named("fade")
//!     .with_mode(Mode::OutIn)
//!     .with_duration(300)
//!     .with_explicit_callbacks(Phases::LEAVE);
//!
//! let classes = options.classes();
//! assert_eq!(classes.enter.initial, "fade-enter");
//! assert_eq!(classes.leave.post, "fade-leave-to");
//! assert_eq!(classes.move_class, "fade-move");
//! assert!(options.hook_mode(Phase::Leave).is_explicit());
//! assert!(!options.hook_mode(Phase::Enter).is_explicit());
//! ```

use alloc::string::{String, ToString};
use core::fmt;
use core::str::FromStr;

use crate::error::ParseError;
use crate::sniff::Mechanism;

/// Default class-name prefix.
pub const DEFAULT_NAME: &str = "t";

/// Default tag of the container created for multi-element slots.
pub const DEFAULT_COMPONENT: &str = "div";

/// One timed class-lifecycle sequence applied to one element.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Phase {
    /// First-mount entrance (only with [`TransitionOptions::appear`]).
    Appear,
    /// Entrance of new content.
    Enter,
    /// Exit of replaced or removed content.
    Leave,
}

impl Phase {
    /// All phases, in cancellation order.
    pub const ALL: [Self; 3] = [Self::Appear, Self::Enter, Self::Leave];

    /// The singleton [`Phases`] set for this phase.
    pub const fn flag(self) -> Phases {
        match self {
            Self::Appear => Phases::APPEAR,
            Self::Enter => Phases::ENTER,
            Self::Leave => Phases::LEAVE,
        }
    }

    pub(crate) const fn index(self) -> usize {
        match self {
            Self::Appear => 0,
            Self::Enter => 1,
            Self::Leave => 2,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Appear => "appear",
            Self::Enter => "enter",
            Self::Leave => "leave",
        })
    }
}

bitflags::bitflags! {
    /// A set of [`Phase`]s.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Phases: u8 {
        /// [`Phase::Appear`].
        const APPEAR = 0b0000_0001;
        /// [`Phase::Enter`].
        const ENTER  = 0b0000_0010;
        /// [`Phase::Leave`].
        const LEAVE  = 0b0000_0100;
    }
}

/// Ordering of overlapping enter and leave phases sharing one slot.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mode {
    /// New content enters first; old content leaves once entering finished.
    #[cfg_attr(feature = "serde", serde(rename = "in-out"))]
    InOut,
    /// Old content leaves first; new content enters once leaving finished.
    #[cfg_attr(feature = "serde", serde(rename = "out-in"))]
    OutIn,
}

impl FromStr for Mode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "in-out" => Ok(Self::InOut),
            "out-in" => Ok(Self::OutIn),
            other => Err(ParseError::InvalidMode(other.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::InOut => "in-out",
            Self::OutIn => "out-in",
        })
    }
}

/// How a phase's middle hook ([`Hooks::during`](crate::hooks::Hooks::during)) finishes.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum HookMode {
    /// The hook is called and completion is detected from timing.
    #[default]
    FireAndForget,
    /// The hook receives a [`Done`](crate::hooks::Done) token and the caller
    /// completes the phase; duration and sniffing are bypassed.
    ExplicitCallback,
}

impl HookMode {
    /// Returns true for [`HookMode::ExplicitCallback`].
    pub const fn is_explicit(self) -> bool {
        matches!(self, Self::ExplicitCallback)
    }
}

/// Whether unmounting a transition mid-phase calls cancel hooks.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum TeardownPolicy {
    /// Release timers and listeners only; no hooks run against elements that
    /// are being disposed.
    #[default]
    Silent,
    /// Also call [`Hooks::cancel`](crate::hooks::Hooks::cancel) for each pending phase.
    NotifyCancel,
}

/// Explicit class names replacing the `name`-derived defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct ClassOverrides {
    /// Replaces `{name}-enter`.
    pub enter_class: Option<String>,
    /// Replaces `{name}-entering`.
    pub entering_class: Option<String>,
    /// Replaces `{name}-enter-to`.
    pub enter_to_class: Option<String>,
    /// Replaces `{name}-leave`.
    pub leave_class: Option<String>,
    /// Replaces `{name}-leaving`.
    pub leaving_class: Option<String>,
    /// Replaces `{name}-leave-to`.
    pub leave_to_class: Option<String>,
    /// Replaces `{name}-move` (keyed lists only).
    pub move_class: Option<String>,
}

/// Caller-supplied configuration of a transition.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct TransitionOptions {
    /// Prefix of the default class names.
    pub name: String,
    /// Whether the very first mount transitions in.
    pub appear: bool,
    /// Explicit duration in milliseconds; bypasses style sniffing.
    pub duration: Option<u64>,
    /// Restricts sniffing and end-event listening to one mechanism.
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub mechanism: Option<Mechanism>,
    /// Ordering of overlapping enter and leave; `None` runs them simultaneously.
    pub mode: Option<Mode>,
    /// Disable style sniffing. Without a duration or explicit callbacks,
    /// completion fires on the next scheduling tick.
    pub no_css: bool,
    /// Class name overrides.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub classes: ClassOverrides,
    /// Phases whose middle hook completes through an explicit callback.
    pub explicit_callbacks: Phases,
    /// Tag of the container created when a slot renders several elements
    /// and the host lacks fragment support.
    pub component: Option<String>,
    /// Unmount behavior for pending phases.
    pub teardown: TeardownPolicy,
}

impl Default for TransitionOptions {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            appear: false,
            duration: None,
            mechanism: None,
            mode: None,
            no_css: false,
            classes: ClassOverrides::default(),
            explicit_callbacks: Phases::empty(),
            component: None,
            teardown: TeardownPolicy::default(),
        }
    }
}

impl TransitionOptions {
    /// Default options with the given class-name prefix.
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Set [`TransitionOptions::appear`].
    pub fn with_appear(mut self, appear: bool) -> Self {
        self.appear = appear;
        self
    }

    /// Set an explicit duration in milliseconds.
    pub fn with_duration(mut self, ms: u64) -> Self {
        self.duration = Some(ms);
        self
    }

    /// Restrict sniffing to one mechanism.
    pub fn with_mechanism(mut self, mechanism: Mechanism) -> Self {
        self.mechanism = Some(mechanism);
        self
    }

    /// Set the enter/leave ordering mode.
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Set [`TransitionOptions::no_css`].
    pub fn with_no_css(mut self, no_css: bool) -> Self {
        self.no_css = no_css;
        self
    }

    /// Replace the class overrides.
    pub fn with_classes(mut self, classes: ClassOverrides) -> Self {
        self.classes = classes;
        self
    }

    /// Select the phases whose hooks complete through an explicit callback.
    pub fn with_explicit_callbacks(mut self, phases: Phases) -> Self {
        self.explicit_callbacks = phases;
        self
    }

    /// Set the container tag for multi-element slots.
    pub fn with_component(mut self, tag: &str) -> Self {
        self.component = Some(tag.to_string());
        self
    }

    /// Set the unmount policy.
    pub fn with_teardown(mut self, teardown: TeardownPolicy) -> Self {
        self.teardown = teardown;
        self
    }

    /// How the middle hook of `phase` completes.
    pub fn hook_mode(&self, phase: Phase) -> HookMode {
        if self.explicit_callbacks.contains(phase.flag()) {
            HookMode::ExplicitCallback
        } else {
            HookMode::FireAndForget
        }
    }

    /// Tag used by the content wrapper.
    pub fn component(&self) -> &str {
        self.component.as_deref().unwrap_or(DEFAULT_COMPONENT)
    }

    /// Resolve the effective class names.
    pub fn classes(&self) -> TransitionClasses {
        let name = &self.name;
        let pick = |over: &Option<String>, suffix: &str| {
            over.clone()
                .unwrap_or_else(|| alloc::format!("{name}-{suffix}"))
        };
        let c = &self.classes;
        TransitionClasses {
            enter: PhaseClasses {
                initial: pick(&c.enter_class, "enter"),
                active: pick(&c.entering_class, "entering"),
                post: pick(&c.enter_to_class, "enter-to"),
            },
            leave: PhaseClasses {
                initial: pick(&c.leave_class, "leave"),
                active: pick(&c.leaving_class, "leaving"),
                post: pick(&c.leave_to_class, "leave-to"),
            },
            move_class: pick(&c.move_class, "move"),
        }
    }
}

/// The three classes of one phase, applied in order initial → active → post.
///
/// - On start: add `initial` and `active`.
/// - After the frame deferral: remove `initial`, add `post`.
/// - On completion: remove `active` and `post`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhaseClasses {
    /// Present for the first painted frame only.
    pub initial: String,
    /// Present for the whole phase.
    pub active: String,
    /// Target state, present from the second frame until completion.
    pub post: String,
}

/// Resolved class names of a transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransitionClasses {
    /// Classes of the appear and enter phases.
    pub enter: PhaseClasses,
    /// Classes of the leave phase.
    pub leave: PhaseClasses,
    /// Class applied while a list item animates to its new position.
    pub move_class: String,
}

impl TransitionClasses {
    /// Classes used by `phase`; appear shares the enter classes.
    pub fn for_phase(&self, phase: Phase) -> &PhaseClasses {
        match phase {
            Phase::Appear | Phase::Enter => &self.enter,
            Phase::Leave => &self.leave,
        }
    }
}
