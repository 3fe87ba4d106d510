//! Shallow and deep memory measurement of live runtime objects.
//!
//! A host runtime binds its privileged sizing intrinsic once per process as a
//! [`SizeOracle`]. A [`RuntimeMeter`] then answers [`measure`](RuntimeMeter::measure)
//! (the shallow size of one object) and [`measure_deep`](RuntimeMeter::measure_deep)
//! (the transitive size of everything reachable from it) according to an
//! immutable [`TraversalPolicy`].
//!
//! The oracle owns the object-graph walk: it calls back once per distinct
//! visited object to obtain that object's [`Contribution`]. The meter caches
//! contributions per runtime type, except for buffer-like views, whose
//! accounting depends on instance state (capacity, remaining bytes, and
//! whether the storage is off-heap).
//!
//! ```
//! use std::sync::Arc;
//!
//! use memmeter::{
//!     bind_size_oracle, ClassifyFn, Contribution, Measurable, RuntimeMeter, SizeOracle,
//!     TraversalPolicy,
//! };
//!
//! // A toy host runtime in which every object is a 16-byte leaf.
//! struct HostOracle;
//!
//! impl SizeOracle for HostOracle {
//!     fn size_of(&self, _obj: &dyn Measurable) -> i64 {
//!         16
//!     }
//!
//!     fn deep_size_of(&self, obj: &dyn Measurable, classify: &mut ClassifyFn<'_>) -> i64 {
//!         match classify(obj) {
//!             Contribution::Skip => 0,
//!             Contribution::Bytes(n) => n as i64,
//!             // Leaves have no outgoing references, so `ShallowOnly` and
//!             // `Traverse` coincide.
//!             Contribution::ShallowOnly | Contribution::Traverse => self.size_of(obj),
//!         }
//!     }
//! }
//!
//! struct Leaf;
//! impl Measurable for Leaf {}
//!
//! bind_size_oracle(Arc::new(HostOracle));
//! let meter = RuntimeMeter::new(TraversalPolicy::new()).unwrap();
//! assert_eq!(meter.measure(&Leaf).unwrap(), 16);
//! assert_eq!(meter.measure_deep(&Leaf).unwrap(), 16);
//! ```

mod buffers;
mod classify;
mod error;
mod measurable;
mod meter;
mod oracle;
mod policy;

pub use self::{
    error::MeterError,
    measurable::{BufferState, Measurable, RuntimeType},
    meter::RuntimeMeter,
    oracle::{
        bind_size_oracle, runtime_size_of_available, ClassifyFn, Contribution, SizeOracle,
        NO_RUNTIME_SIZEOF_ENV,
    },
    policy::{BufferMode, TraversalPolicy},
};
