use std::any::{Any, TypeId};

// ----------------------------------------------------------------------------

/// View state of a buffer-like object: a window over a block of backing
/// storage that may be shared with other views or live outside the heap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BufferState {
    /// Total capacity of the backing storage, in bytes.
    pub capacity: u64,

    /// Bytes of the backing storage this view currently addresses.
    pub remaining: u64,

    /// True if the storage is allocated outside the heap that the graph
    /// walker can see (a direct/off-heap allocation).
    pub off_heap: bool,
}

// ----------------------------------------------------------------------------

/// A live object the meter can size.
///
/// Implemented by the host runtime for its object representations. The meter
/// never mutates a measured object, and never retains it beyond the duration
/// of a measurement call.
///
/// `Vec<T>` and `[T; N]` are measurable out of the box for any `T: 'static`,
/// which covers primitive and object-reference arrays.
pub trait Measurable: Any {
    /// Buffer view state, for buffer-like objects. `None` for everything else.
    fn buffer_state(&self) -> Option<BufferState> {
        None
    }

    /// True for weak/soft-style wrappers that reference an object without
    /// keeping it alive. Must be invariant over all instances of a type.
    fn is_reference_wrapper(&self) -> bool {
        false
    }

    /// Name of the concrete type, for diagnostics.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl<T: 'static> Measurable for Vec<T> {}

impl<T: 'static, const N: usize> Measurable for [T; N] {}

// ----------------------------------------------------------------------------

/// The dynamic type of a measured object, as seen by policy predicates.
///
/// Stable for the process lifetime; `id` keys the classification cache.
#[derive(Clone, Copy, Debug)]
pub struct RuntimeType {
    pub id: TypeId,
    pub name: &'static str,
}

impl RuntimeType {
    pub fn of_val(obj: &dyn Measurable) -> Self {
        let any: &dyn Any = obj;
        Self {
            id: any.type_id(),
            name: obj.type_name(),
        }
    }
}
