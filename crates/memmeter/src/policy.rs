use std::any::TypeId;
use std::sync::Arc;

use crate::RuntimeType;

// ----------------------------------------------------------------------------

/// How buffer-like objects are accounted during a deep measurement.
///
/// Counting buffer views naively either misses off-heap storage (the walker
/// cannot see it) or re-attributes the same on-heap backing array to every
/// view that slices it. All modes except [`BufferMode::Normal`] undercount
/// slices on purpose: the backing-array overhead is assumed amortized over
/// all slices of the same slab allocation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BufferMode {
    /// Count the shallow size and traverse into the backing storage.
    /// Accepts the risk of double counting aliased backing arrays.
    #[default]
    Normal,

    /// Count only the view itself plus its remaining logical bytes, never the
    /// full backing array.
    OmitShared,

    /// Count only the view itself; none of the backing storage.
    ShallowOnly,

    /// Count off-heap views shallow-only, slices by their remaining bytes,
    /// and full on-heap views normally.
    HeapOnlyNoSlice,
}

// ----------------------------------------------------------------------------

type IgnorePredicate = dyn Fn(&RuntimeType) -> bool + Send + Sync;

/// Immutable traversal configuration, fixed at engine construction.
///
/// All classification decisions derived from a policy are deterministic given
/// the same type (and, for buffer views, instance state).
#[derive(Clone, Default)]
pub struct TraversalPolicy {
    ignore: Option<Arc<IgnorePredicate>>,
    skip_types: ahash::HashSet<TypeId>,
    ignore_non_strong_references: bool,
    buffer_mode: BufferMode,
    ignore_enclosing_instance: bool,
}

impl TraversalPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Objects whose type matches the predicate contribute zero bytes and are
    /// not traversed.
    pub fn ignore_types(
        mut self,
        predicate: impl Fn(&RuntimeType) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.ignore = Some(Arc::new(predicate));
        self
    }

    /// Count objects of type `T` shallow-only: their outgoing references are
    /// not followed.
    pub fn skip_type<T: 'static + ?Sized>(mut self) -> Self {
        self.skip_types.insert(TypeId::of::<T>());
        self
    }

    /// Treat weak/soft-style reference wrappers as opaque leaves.
    pub fn ignore_non_strong_references(mut self, ignore: bool) -> Self {
        self.ignore_non_strong_references = ignore;
        self
    }

    pub fn buffer_mode(mut self, mode: BufferMode) -> Self {
        self.buffer_mode = mode;
        self
    }

    /// Request that the implicit reference from a nested object to its
    /// enclosing environment is not counted.
    ///
    /// Carried for engine variants that can honor it by walking fields
    /// manually; [`RuntimeMeter::new`](crate::RuntimeMeter::new) rejects it.
    pub fn ignore_enclosing_instance(mut self, ignore: bool) -> Self {
        self.ignore_enclosing_instance = ignore;
        self
    }

    pub(crate) fn is_ignored(&self, ty: &RuntimeType) -> bool {
        self.ignore.as_ref().is_some_and(|predicate| predicate(ty))
    }

    pub(crate) fn is_skipped(&self, id: TypeId) -> bool {
        self.skip_types.contains(&id)
    }

    pub(crate) fn ignores_non_strong_references(&self) -> bool {
        self.ignore_non_strong_references
    }

    pub(crate) fn mode(&self) -> BufferMode {
        self.buffer_mode
    }

    pub(crate) fn ignores_enclosing_instance(&self) -> bool {
        self.ignore_enclosing_instance
    }
}

// ----------------------------------------------------------------------------
