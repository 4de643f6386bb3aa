use {
    crate::{Error, Interval, IntervalSet, Node, Result, Ring},
    std::{collections::BTreeMap, fmt, str::FromStr},
    tracing::debug,
};

/// Index of a shard within a node.
pub type ShardIndex = u32;

/// Mapping from a shard to the part of the token space routed to it,
/// regardless of which node owns that part.
pub type ShardPartition = BTreeMap<ShardIndex, IntervalSet>;

/// Mapping from a `(node, shard)` pair to the part of the token space it owns.
pub type ShardOwnership = BTreeMap<(Node, ShardIndex), IntervalSet>;

/// Function splitting the token space between `shards` shards, with
/// `ignore_bits` most significant token bits excluded from shard selection.
///
/// Any implementation must:
/// - depend on its two arguments only,
/// - cover the whole token space,
/// - assign every point of it to exactly one shard.
pub type PartitionFn = fn(shards: u32, ignore_bits: u32) -> Result<ShardPartition>;

/// Maximum supported number of ignored most significant bits.
///
/// Static partitioning materializes `shards * 2^ignore_bits` slices, so the
/// number of bits is capped to keep that count computable.
pub const MAX_IGNORE_BITS: u32 = 20;

/// Registered shard partitioning strategies.
///
/// Each strategy is available under a name (see [`ShardStrategy::name`] and
/// the `FromStr` implementation), and is backed by a [`PartitionFn`]. Adding a
/// strategy means adding a variant here, and wiring its name and function.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ShardStrategy {
    /// Uniform static partitioning, see [`static_partition`].
    #[default]
    Static,
}

impl ShardStrategy {
    /// All registered strategies.
    pub const ALL: &'static [Self] = &[Self::Static];

    /// Returns the name the strategy is registered under.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Static => "static",
        }
    }

    /// Returns comma separated names of all registered strategies.
    pub fn names() -> String {
        Self::ALL
            .iter()
            .map(|strategy| strategy.name())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Returns the function implementing the strategy.
    pub fn partition_fn(self) -> PartitionFn {
        match self {
            Self::Static => static_partition,
        }
    }

    /// Splits the token space between shards.
    pub fn partition(self, shards: u32, ignore_bits: u32) -> Result<ShardPartition> {
        (self.partition_fn())(shards, ignore_bits)
    }
}

impl FromStr for ShardStrategy {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|strategy| strategy.name() == name)
            .ok_or_else(|| Error::UnknownStrategy(name.to_owned()))
    }
}

impl fmt::Display for ShardStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Static shard partitioning.
///
/// The token space is cut into `shards * 2^ignore_bits` equal consecutive
/// slices, and slice `i` goes to shard `i % shards`. Every shard thus owns
/// `2^ignore_bits` slices spread uniformly over the ring. This models a token
/// whose top `ignore_bits` bits are dropped before the rest selects a shard:
/// those bits mostly pick the node, and shard selection should not correlate
/// with them.
///
/// With zero shards the partition is empty.
///
/// # Examples
///
/// ```
/// use overcommit::static_partition;
///
/// let partition = static_partition(3, 2).unwrap();
/// assert_eq!(partition.len(), 3);
/// // Every shard owns 4 slices, 1/12 each.
/// assert_eq!(partition[&0].len(), 4);
/// assert!((partition[&0].length() - 1.0 / 3.0).abs() < 1e-9);
/// ```
pub fn static_partition(shards: u32, ignore_bits: u32) -> Result<ShardPartition> {
    if ignore_bits > MAX_IGNORE_BITS {
        return Err(Error::TooManyIgnoredBits(ignore_bits));
    }

    let mut ret = ShardPartition::new();
    if shards == 0 {
        return Ok(ret);
    }

    let slices = u64::from(shards) << ignore_bits;
    let delta = 1.0 / slices as f64;
    for i in 0..slices {
        let lo = i as f64 * delta;
        // The last slice must end exactly at the end of the token space.
        let hi = if i + 1 == slices {
            1.0
        } else {
            (i + 1) as f64 * delta
        };
        let shard = (i % u64::from(shards)) as ShardIndex;
        ret.entry(shard).or_default().insert(Interval::new(lo, hi));
    }
    debug!(shards, ignore_bits, slices, "partitioned token space");
    Ok(ret)
}

impl Ring {
    /// Returns the part of the token space owned by every `(node, shard)`
    /// pair.
    ///
    /// Node ownership is intersected with the shard partition produced by the
    /// given strategy, so each node's range is split between its shards.
    pub fn shard_intervals(
        &self,
        shards: u32,
        ignore_bits: u32,
        strategy: ShardStrategy,
    ) -> Result<ShardOwnership> {
        let partition = strategy.partition(shards, ignore_bits)?;
        let node_intervals = self.node_intervals()?;

        let mut ret = ShardOwnership::new();
        for (node, node_ivals) in &node_intervals {
            for (shard, shard_ivals) in &partition {
                ret.insert((*node, *shard), node_ivals & shard_ivals);
            }
        }
        Ok(ret)
    }
}
