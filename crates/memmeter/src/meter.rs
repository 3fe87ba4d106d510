//! The measurement engine built on the runtime's size-of intrinsic.

use std::sync::Arc;

use crate::buffers::buffer_contribution;
use crate::classify::{classify_type, ClassificationCache};
use crate::oracle;
use crate::{
    BufferMode, Contribution, Measurable, MeterError, RuntimeType, SizeOracle, TraversalPolicy,
};

/// Measures the shallow and deep size of live objects through the host
/// runtime's privileged sizing intrinsic.
///
/// Stateless apart from the shared classification cache; safe to use from
/// multiple threads without external synchronization. A deep measurement runs
/// to completion or fails; callers needing bounded latency must impose their
/// own timeout around the call.
pub struct RuntimeMeter {
    policy: TraversalPolicy,
    cache: ClassificationCache,
    oracle: Arc<dyn SizeOracle>,
    canary_shallow_size: u64,
}

impl RuntimeMeter {
    /// Build a meter for the given policy.
    ///
    /// Fails with [`MeterError::UnsupportedConfiguration`] if the policy asks
    /// to ignore enclosing-instance references: honoring that would require
    /// manual field traversal, which this engine deliberately avoids. Fails
    /// with [`MeterError::UnsupportedCapability`] when no usable size oracle
    /// is bound or the kill-switch is set; see
    /// [`runtime_size_of_available`](crate::runtime_size_of_available).
    pub fn new(policy: TraversalPolicy) -> Result<Self, MeterError> {
        if policy.ignores_enclosing_instance() {
            return Err(MeterError::UnsupportedConfiguration(
                "the runtime size-of engine cannot ignore enclosing-instance references",
            ));
        }

        if !oracle::runtime_size_of_available() {
            return Err(MeterError::UnsupportedCapability);
        }
        let bound = oracle::bound_oracle().ok_or(MeterError::UnsupportedCapability)?;

        Ok(Self {
            policy,
            cache: ClassificationCache::default(),
            oracle: bound,
            canary_shallow_size: oracle::canary_shallow_size() as u64,
        })
    }

    /// Shallow size of one object, in bytes.
    pub fn measure(&self, obj: &dyn Measurable) -> Result<u64, MeterError> {
        let size = self.oracle.size_of(obj);
        check_size(size, obj)
    }

    /// Deep size of the object graph reachable from `obj`, in bytes.
    ///
    /// Every distinct reachable object is classified and counted exactly
    /// once, so cyclic graphs yield a finite result.
    pub fn measure_deep(&self, obj: &dyn Measurable) -> Result<u64, MeterError> {
        let size = self
            .oracle
            .deep_size_of(obj, &mut |visited| self.classify(visited));
        check_size(size, obj)
    }

    /// Size of a primitive or object-reference array.
    ///
    /// Identical to [`Self::measure`]; provided to match common array sizing
    /// call sites. `Vec<T>` and `[T; N]` are measurable for any `T: 'static`.
    pub fn size_of_array(&self, elements: &dyn Measurable) -> Result<u64, MeterError> {
        self.measure(elements)
    }

    fn classify(&self, obj: &dyn Measurable) -> Contribution {
        // Buffer views depend on instance state (capacity, remaining bytes,
        // storage location) and bypass the type cache.
        if self.policy.mode() != BufferMode::Normal {
            if let Some(view) = obj.buffer_state() {
                return buffer_contribution(self.policy.mode(), view, self.canary_shallow_size);
            }
        }

        let ty = RuntimeType::of_val(obj);
        self.cache
            .get_or_compute(ty.id, || classify_type(&self.policy, &ty, obj))
    }
}

fn check_size(size: i64, obj: &dyn Measurable) -> Result<u64, MeterError> {
    if size < 0 {
        return Err(MeterError::ImpreciseResult {
            type_name: obj.type_name(),
        });
    }
    Ok(size as u64)
}
