// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Duration sniffing: infer how long a transition lasts from computed style.
//!
//! ## Overview
//!
//! Elements may run several CSS animations or transitions at once; the
//! computed `animation-duration`, `animation-delay`, `transition-duration`
//! and `transition-delay` values are comma-separated lists. For each
//! mechanism, the total wait is the largest `duration + delay` over its
//! entries, where the delay list is cycled when it is shorter than the
//! duration list. Without an explicit [`Mechanism`], the one with the larger
//! total wins and ties go to [`Mechanism::Transition`].
//!
//! The number of duration entries of the chosen mechanism is also reported:
//! every concurrent animation emits its own end event on the element, so the
//! [completion detector](crate::completion) needs to know how many to expect.
//!
//! ```
//! use understory_transition::sniff::{ComputedTiming, Mechanism, sniff};
//!
//! let timing = ComputedTiming {
//!     animation_duration: "1s, 1s".into(),
//!     animation_delay: "2s, 2s".into(),
//!     transition_duration: "3s, 3s".into(),
//!     transition_delay: "4s, 4s".into(),
//! };
//! let sniffed = sniff(&timing, None);
//! assert_eq!(sniffed.mechanism, Mechanism::Transition);
//! assert_eq!(sniffed.total_ms, 7_000);
//! assert_eq!(sniffed.entry_count, 2);
//!
//! let forced = sniff(&timing, Some(Mechanism::Animation));
//! assert_eq!(forced.total_ms, 3_000);
//! ```

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;

use crate::error::ParseError;

/// CSS mechanism driving a transition.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Mechanism {
    /// CSS animations (`@keyframes`).
    Animation,
    /// CSS transitions.
    Transition,
}

impl Mechanism {
    /// Name of the DOM event fired when one entry of this mechanism ends.
    pub const fn end_event(self) -> &'static str {
        match self {
            Self::Animation => "animationend",
            Self::Transition => "transitionend",
        }
    }

    /// Lowercase CSS name of the mechanism.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Animation => "animation",
            Self::Transition => "transition",
        }
    }
}

impl fmt::Display for Mechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mechanism {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "animation" => Ok(Self::Animation),
            "transition" => Ok(Self::Transition),
            other => Err(ParseError::InvalidMechanism(other.to_string())),
        }
    }
}

/// The four computed style values the sniffer reads, as the host reports them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComputedTiming {
    /// Computed `animation-duration`.
    pub animation_duration: String,
    /// Computed `animation-delay`.
    pub animation_delay: String,
    /// Computed `transition-duration`.
    pub transition_duration: String,
    /// Computed `transition-delay`.
    pub transition_delay: String,
}

impl Default for ComputedTiming {
    /// The computed values of an element without any animation or transition.
    fn default() -> Self {
        Self {
            animation_duration: "0s".into(),
            animation_delay: "0s".into(),
            transition_duration: "0s".into(),
            transition_delay: "0s".into(),
        }
    }
}

impl ComputedTiming {
    /// Timing with only transition values set.
    pub fn transition(duration: &str, delay: &str) -> Self {
        Self {
            transition_duration: duration.into(),
            transition_delay: delay.into(),
            ..Self::default()
        }
    }

    /// Timing with only animation values set.
    pub fn animation(duration: &str, delay: &str) -> Self {
        Self {
            animation_duration: duration.into(),
            animation_delay: delay.into(),
            ..Self::default()
        }
    }
}

/// Result of [`sniff`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Sniffed {
    /// Mechanism whose end events terminate the transition.
    pub mechanism: Mechanism,
    /// Longest `duration + delay` of that mechanism, rounded up to whole milliseconds.
    pub total_ms: u64,
    /// Number of comma-separated duration entries, i.e. end events to expect.
    pub entry_count: usize,
}

/// Parse a single CSS `<time>` value into milliseconds.
///
/// Accepts `s` and `ms` units and optional leading sign. A unitless `0` and
/// the empty string are zero.
pub fn parse_time(s: &str) -> Result<f64, ParseError> {
    parse_micros(s).map(micros_to_ms)
}

/// Largest `duration + delay` in milliseconds, cycling `delays` to cover `durations`.
///
/// Unparsable entries count as zero and are logged.
pub fn total_duration(durations: &str, delays: &str) -> f64 {
    micros_to_ms(total_micros(durations, delays))
}

/// Sniff the effective mechanism, total wait and end-event count from computed style.
pub fn sniff(timing: &ComputedTiming, mechanism: Option<Mechanism>) -> Sniffed {
    let animation = total_micros(&timing.animation_duration, &timing.animation_delay);
    let transition = total_micros(&timing.transition_duration, &timing.transition_delay);
    let mechanism = mechanism.unwrap_or(if transition >= animation {
        Mechanism::Transition
    } else {
        Mechanism::Animation
    });
    let (total, durations) = match mechanism {
        Mechanism::Animation => (animation, &timing.animation_duration),
        Mechanism::Transition => (transition, &timing.transition_duration),
    };
    let sniffed = Sniffed {
        mechanism,
        total_ms: micros_to_ms_ceil(total),
        entry_count: split_list(durations).count(),
    };
    tracing::trace!(?sniffed, "sniffed computed timing");
    sniffed
}

fn split_list(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(str::trim)
}

fn entry_micros(entry: &str) -> i64 {
    parse_micros(entry).unwrap_or_else(|err| {
        tracing::warn!(%err, "ignoring unparsable computed time, treating it as 0s");
        0
    })
}

fn total_micros(durations: &str, delays: &str) -> i64 {
    let delays: Vec<i64> = split_list(delays).map(entry_micros).collect();
    split_list(durations)
        .map(entry_micros)
        .enumerate()
        .map(|(i, d)| d.saturating_add(delays[i % delays.len()]))
        .max()
        .unwrap_or(0)
}

// Exact for any realistic duration: i64 microseconds below 2^53 convert losslessly.
fn micros_to_ms(us: i64) -> f64 {
    us as f64 / 1_000.0
}

fn micros_to_ms_ceil(us: i64) -> u64 {
    u64::try_from(us).map_or(0, |us| us.div_ceil(1_000))
}

/// Parse a CSS time value into whole microseconds, truncating finer digits.
fn parse_micros(raw: &str) -> Result<i64, ParseError> {
    let s = raw.trim();
    if s.is_empty() {
        return Ok(0);
    }
    let invalid = || ParseError::InvalidTime(raw.to_string());
    let (number, scale) = if let Some(n) = s.strip_suffix("ms") {
        (n, 3)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 6)
    } else {
        (s, 0)
    };
    let (negative, number) = match number.as_bytes().first() {
        Some(b'-') => (true, &number[1..]),
        Some(b'+') => (false, &number[1..]),
        _ => (false, number),
    };
    let (int, frac) = number.split_once('.').unwrap_or((number, ""));
    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if (int.is_empty() && frac.is_empty()) || !all_digits(int) || !all_digits(frac) {
        return Err(invalid());
    }
    // A unit is mandatory for anything but zero.
    if scale == 0 {
        return if int.bytes().chain(frac.bytes()).all(|b| b == b'0') {
            Ok(0)
        } else {
            Err(invalid())
        };
    }
    let mut value: i64 = 0;
    for b in int.bytes() {
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add(i64::from(b - b'0')))
            .ok_or_else(invalid)?;
    }
    let mut digits = frac.bytes();
    for _ in 0..scale {
        let digit = digits.next().map_or(0, |b| i64::from(b - b'0'));
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add(digit))
            .ok_or_else(invalid)?;
    }
    Ok(if negative { -value } else { value })
}
