/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building a ring or evaluating its load.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// No shard partitioning strategy is registered under the given name.
    #[error("unknown sharding algorithm `{0}` (available: {available})", available = crate::ShardStrategy::names())]
    UnknownStrategy(String),

    /// Token lies outside of the `[0, 1)` token space.
    #[error("token {0} is outside of the [0, 1) token space")]
    TokenOutOfRange(f64),

    /// Number of ignored bits is too large to split the token space.
    #[error("cannot ignore {0} bits, at most {max} are supported", max = crate::MAX_IGNORE_BITS)]
    TooManyIgnoredBits(u32),

    /// Ring has no virtual nodes, so there is nothing to pad or walk.
    #[error("ring is empty: at least one node with at least one vnode is required")]
    EmptyRing,

    /// Load map has no entries, so neither maximum nor average is defined.
    #[error("load map is empty: at least one node and one shard are required")]
    EmptyLoadMap,
}
