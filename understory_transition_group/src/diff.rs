// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Keyed diff of two ordered key lists.
//!
//! [`reconcile`] is pure: it classifies every key of the previous and the
//! next list and returns them in merged render order. Effects are applied
//! separately by [`TransitionGroup`](crate::TransitionGroup).
//!
//! ## Merge order
//!
//! Slots `0..max(old.len(), new.len())` are visited in order. At slot `i`:
//!
//! - the old key at `i`, if it is still present, is placed at its new index;
//!   otherwise it stays at `i` as leaving;
//! - the new key at `i`, if it was not in the old list, is placed at `i` as entering.
//!
//! Placing into an occupied index scans forward to the next free one, so
//! leaving keys keep roughly their old position among the survivors.
//!
//! The scan can also push a survivor past survivors that follow it in the
//! new list: from `[x, a, b]` to `[b, a]`, leaving `x` holds slot 0 and the
//! merged order is `[x, a, b]`. Survivors are back in new-list order on the
//! next reconcile after the leaving keys are gone.
//!
//! ```
//! use understory_transition_group::diff::{Change, reconcile};
//!
//! let diff = reconcile(&["a", "b", "c"], &["a", "x", "c"]);
//! let summary: Vec<_> = diff.iter().map(|d| (d.key, d.change)).collect();
//! assert_eq!(
//!     summary,
//!     vec![
//!         ("a", Change::Persisting),
//!         ("b", Change::Leaving),
//!         ("x", Change::Entering),
//!         ("c", Change::Persisting),
//!     ]
//! );
//! ```

use alloc::vec::Vec;

/// Classification of one key.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Change {
    /// Only in the new list.
    Entering,
    /// Only in the old list.
    Leaving,
    /// In both lists at the same index.
    Persisting,
    /// In both lists at different indices.
    Moving,
}

/// One classified key.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Diffed<K> {
    /// The key.
    pub key: K,
    /// What happened to it.
    pub change: Change,
    /// Index in the old list, if present there.
    pub from: Option<usize>,
    /// Index in the new list, if present there.
    pub to: Option<usize>,
}

/// Classify `old` and `new` keys and merge them into render order.
///
/// Keys are assumed unique within each list.
pub fn reconcile<K: Eq + Clone>(old: &[K], new: &[K]) -> Vec<Diffed<K>> {
    let mut merged: Vec<Option<Diffed<K>>> = Vec::with_capacity(old.len().max(new.len()));
    for i in 0..old.len().max(new.len()) {
        if let Some(key) = old.get(i) {
            match new.iter().position(|k| k == key) {
                Some(to) => {
                    let change = if to == i {
                        Change::Persisting
                    } else {
                        Change::Moving
                    };
                    place(
                        &mut merged,
                        to,
                        Diffed {
                            key: key.clone(),
                            change,
                            from: Some(i),
                            to: Some(to),
                        },
                    );
                }
                None => place(
                    &mut merged,
                    i,
                    Diffed {
                        key: key.clone(),
                        change: Change::Leaving,
                        from: Some(i),
                        to: None,
                    },
                ),
            }
        }
        if let Some(key) = new.get(i)
            && !old.contains(key)
        {
            place(
                &mut merged,
                i,
                Diffed {
                    key: key.clone(),
                    change: Change::Entering,
                    from: None,
                    to: Some(i),
                },
            );
        }
    }
    merged.into_iter().flatten().collect()
}

/// Store `item` at `index`, or at the first free index after it.
fn place<T>(slots: &mut Vec<Option<T>>, mut index: usize, item: T) {
    while slots.get(index).is_some_and(Option::is_some) {
        index += 1;
    }
    if slots.len() <= index {
        slots.resize_with(index + 1, || None);
    }
    slots[index] = Some(item);
}
