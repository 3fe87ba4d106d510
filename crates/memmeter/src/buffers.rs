//! Per-instance accounting of buffer-like views.
//!
//! Buffer views are the one case where classification depends on instance
//! state: a view may own its storage outright, slice a shared backing array,
//! or point at storage outside the walkable heap. Type-keyed caching never
//! applies here.

use crate::{BufferMode, BufferState, Contribution};

/// Contribution of one buffer view under the given mode.
///
/// `canary_shallow` is the fixed shallow size of a buffer view, probed at
/// oracle-bind time. Only called for modes other than [`BufferMode::Normal`].
pub(crate) fn buffer_contribution(
    mode: BufferMode,
    view: BufferState,
    canary_shallow: u64,
) -> Contribution {
    match mode {
        BufferMode::Normal => Contribution::Traverse,
        BufferMode::OmitShared => Contribution::Bytes(view.remaining + canary_shallow),
        BufferMode::ShallowOnly => Contribution::Bytes(canary_shallow),
        BufferMode::HeapOnlyNoSlice => {
            if view.off_heap {
                // The walker cannot see off-heap bytes; no traversal attempted.
                Contribution::ShallowOnly
            } else if view.capacity > view.remaining {
                // A slice: count the declared remaining bytes, not the full
                // backing array.
                Contribution::Bytes(view.remaining)
            } else {
                Contribution::Traverse
            }
        }
    }
}
