/// Failure modes of the runtime size-of engine.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum MeterError {
    /// The privileged sizing intrinsic is absent, unusable, or disabled.
    ///
    /// Raised at construction time only; selection logic should fall back to
    /// another measurement strategy.
    #[error("the runtime size-of intrinsic is unavailable or disabled")]
    UnsupportedCapability,

    /// The policy requests a feature this engine cannot honor.
    #[error("unsupported configuration: {0}")]
    UnsupportedConfiguration(&'static str),

    /// The intrinsic reported its negative sentinel: the measurement cannot
    /// be trusted for this object graph. Never coerced to a size.
    #[error("imprecise result for object graph of type {type_name}")]
    ImpreciseResult { type_name: &'static str },
}
