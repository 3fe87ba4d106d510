//! Type-keyed classification cache and the per-type classification rule.

use std::any::TypeId;

use crate::{Contribution, Measurable, RuntimeType, TraversalPolicy};

// ----------------------------------------------------------------------------

/// Lazily populated map from runtime type to classification.
///
/// Population is at-least-once compute-if-absent: a lost race recomputes the
/// same pure value, which is harmless. Never invalidated; the policy it is
/// derived from is immutable for the engine's lifetime.
#[derive(Default)]
pub(crate) struct ClassificationCache {
    by_type: parking_lot::RwLock<ahash::HashMap<TypeId, Contribution>>,
}

impl ClassificationCache {
    pub fn get_or_compute(
        &self,
        ty: TypeId,
        compute: impl FnOnce() -> Contribution,
    ) -> Contribution {
        if let Some(cached) = self.by_type.read().get(&ty) {
            return *cached;
        }
        let computed = compute();
        self.by_type.write().insert(ty, computed);
        computed
    }
}

// ----------------------------------------------------------------------------

/// Per-type classification rule; pure in (type, policy).
///
/// Two instances of the same non-buffer type always classify identically, so
/// the result is cached by [`ClassificationCache`]. `is_reference_wrapper` is
/// read off the first instance encountered, which is safe because it is
/// required to be invariant over a type's instances.
pub(crate) fn classify_type(
    policy: &TraversalPolicy,
    ty: &RuntimeType,
    obj: &dyn Measurable,
) -> Contribution {
    if policy.is_ignored(ty) {
        return Contribution::Skip;
    }

    if policy.is_skipped(ty.id)
        || (policy.ignores_non_strong_references() && obj.is_reference_wrapper())
    {
        return Contribution::ShallowOnly;
    }

    Contribution::Traverse
}

// ----------------------------------------------------------------------------
