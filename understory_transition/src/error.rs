// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors raised while parsing transition configuration strings.
//!
//! Transition operations themselves never fail; only the textual inputs
//! (mechanism names, mode names, CSS time values) can be rejected.

use alloc::string::String;

/// Error returned when a configuration string cannot be parsed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The string is neither `"animation"` nor `"transition"`.
    #[error("unknown transition mechanism `{0}`, expected `animation` or `transition`")]
    InvalidMechanism(String),
    /// The string is neither `"in-out"` nor `"out-in"`.
    #[error("unknown transition mode `{0}`, expected `in-out` or `out-in`")]
    InvalidMode(String),
    /// The string is not a CSS `<time>` value such as `1s`, `.3s` or `250ms`.
    #[error("invalid CSS time value `{0}`")]
    InvalidTime(String),
}
