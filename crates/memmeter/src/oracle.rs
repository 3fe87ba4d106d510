//! Binding to the host runtime's privileged size-of intrinsic.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::{BufferState, Measurable};

// ----------------------------------------------------------------------------

/// Per-object directive returned by the classification callback of
/// [`SizeOracle::deep_size_of`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Contribution {
    /// Contribute nothing; outgoing references are not followed.
    Skip,

    /// Contribute the object's shallow size; references are not followed.
    ShallowOnly,

    /// Contribute the shallow size and follow outgoing references.
    Traverse,

    /// Contribute exactly this many bytes; references are not followed.
    ///
    /// The buffer modes use this to re-attribute shared backing storage.
    Bytes(u64),
}

/// Classification callback handed to [`SizeOracle::deep_size_of`].
pub type ClassifyFn<'a> = dyn FnMut(&dyn Measurable) -> Contribution + 'a;

/// The privileged sizing primitive of the host runtime.
///
/// The oracle owns the object-graph walk: it knows the shallow layout of
/// every object and how to enumerate outgoing references. The meter never
/// walks fields itself.
pub trait SizeOracle: Send + Sync {
    /// Shallow byte size of one object.
    ///
    /// A negative value is the documented sentinel for "could not compute
    /// precisely" and is surfaced to callers as
    /// [`MeterError::ImpreciseResult`](crate::MeterError::ImpreciseResult).
    fn size_of(&self, obj: &dyn Measurable) -> i64;

    /// Deep byte size of everything reachable from `obj`.
    ///
    /// `classify` must be invoked exactly once per distinct visited object
    /// (object identity, not equality; the oracle breaks cycles with its own
    /// visited set). A negative result is the same "imprecise" sentinel as
    /// for [`Self::size_of`].
    fn deep_size_of(&self, obj: &dyn Measurable, classify: &mut ClassifyFn<'_>) -> i64;
}

// ----------------------------------------------------------------------------

/// Kill-switch: while this environment variable is set,
/// [`runtime_size_of_available`] reports `false` even with a healthy oracle
/// bound. Re-read on every query.
pub const NO_RUNTIME_SIZEOF_ENV: &str = "MEMMETER_NO_RUNTIME_SIZEOF";

struct OracleBinding {
    oracle: Arc<dyn SizeOracle>,

    /// Shallow size the oracle reported for the zero-capacity canary buffer.
    /// Non-positive means the intrinsic is unusable.
    canary_shallow_size: i64,
}

static BINDING: OnceCell<OracleBinding> = OnceCell::new();

/// Zero-capacity buffer used to probe the oracle once at bind time.
struct CanaryBuffer;

impl Measurable for CanaryBuffer {
    fn buffer_state(&self) -> Option<BufferState> {
        Some(BufferState {
            capacity: 0,
            remaining: 0,
            off_heap: false,
        })
    }
}

/// Install the process-wide size oracle and probe it.
///
/// The first call wins; repeated calls are ignored. Returns `true` if this
/// call installed the oracle.
///
/// The probe asks the oracle for the shallow size of a zero-capacity canary
/// buffer. Any probe failure is caught and recorded as "unsupported", never
/// propagated. The probed size doubles as the fixed buffer-view overhead used
/// by the buffer modes. A probe that returns zero is indistinguishable from a
/// missing intrinsic; both leave the capability unavailable.
pub fn bind_size_oracle(oracle: Arc<dyn SizeOracle>) -> bool {
    let mut installed = false;
    BINDING.get_or_init(|| {
        let canary_shallow_size = probe(oracle.as_ref());
        if canary_shallow_size > 0 {
            log::debug!("size oracle bound; canary shallow size is {canary_shallow_size} bytes");
        } else {
            log::warn!(
                "size oracle probe failed (canary size {canary_shallow_size}); \
                 runtime size-of is unavailable"
            );
        }
        installed = true;
        OracleBinding {
            oracle: oracle.clone(),
            canary_shallow_size,
        }
    });
    if !installed {
        log::warn!("size oracle already bound; ignoring repeated bind");
    }
    installed
}

fn probe(oracle: &dyn SizeOracle) -> i64 {
    std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        oracle.size_of(&CanaryBuffer)
    }))
    .unwrap_or(0)
}

/// Is the privileged sizing intrinsic available and not administratively
/// disabled?
///
/// Consulted by engine-selection logic before constructing a
/// [`RuntimeMeter`](crate::RuntimeMeter).
pub fn runtime_size_of_available() -> bool {
    canary_shallow_size() > 0 && std::env::var_os(NO_RUNTIME_SIZEOF_ENV).is_none()
}

/// Shallow size of the canary buffer, or 0 when no usable oracle is bound.
pub(crate) fn canary_shallow_size() -> i64 {
    BINDING.get().map_or(0, |b| b.canary_shallow_size)
}

pub(crate) fn bound_oracle() -> Option<Arc<dyn SizeOracle>> {
    BINDING.get().map(|b| b.oracle.clone())
}
