// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Content identity.

use crate::options::TransitionOptions;

/// Content with a stable identity.
///
/// Two content values with equal keys are the same logical child: replacing
/// one with the other refreshes the content without transitioning. The key
/// should cover whatever the host treats as element identity (for a view
/// library, the element type as well as its key).
pub trait Keyed {
    /// Identity type.
    type Key: Eq;

    /// Identity of this content.
    fn key(&self) -> &Self::Key;
}

/// A content node paired with its identity, as extracted by the host.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyedChild<K, C> {
    /// Identity, stable across renders.
    pub key: K,
    /// Host-defined content.
    pub content: C,
    /// Options replacing the enclosing list's options for this child.
    pub options: Option<TransitionOptions>,
}

impl<K, C> KeyedChild<K, C> {
    /// Pair `content` with `key`.
    pub fn new(key: K, content: C) -> Self {
        Self {
            key,
            content,
            options: None,
        }
    }

    /// Give this child its own options.
    pub fn with_options(mut self, options: TransitionOptions) -> Self {
        self.options = Some(options);
        self
    }
}

impl<K: Eq, C> Keyed for KeyedChild<K, C> {
    type Key = K;

    fn key(&self) -> &K {
        &self.key
    }
}
