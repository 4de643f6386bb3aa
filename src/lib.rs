#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]

mod error;
mod interval;
mod iter;
mod load;
mod ring;
mod shard;
mod token;

use tracing::info;
pub use {error::*, interval::*, load::*, ring::*, shard::*, token::*};

/// Number of nodes in the simulated cluster.
pub const DEFAULT_NODES: u32 = 5;

/// Number of vnodes per node.
pub const DEFAULT_VNODES: u32 = 32;

/// Number of shards per node.
pub const DEFAULT_SHARDS: u32 = 12;

/// Number of token most significant bits ignored for sharding.
pub const DEFAULT_IGNORE_BITS: u32 = 8;

/// Parameters of a single simulation run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimulationConfig {
    /// Number of nodes in the cluster.
    pub nodes: u32,
    /// Number of vnodes per node.
    pub vnodes: u32,
    /// Number of shards per node.
    pub shards: u32,
    /// Number of token most significant bits ignored for sharding.
    pub ignore_bits: u32,
    /// Shard partitioning strategy.
    pub strategy: ShardStrategy,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            nodes: DEFAULT_NODES,
            vnodes: DEFAULT_VNODES,
            shards: DEFAULT_SHARDS,
            ignore_bits: DEFAULT_IGNORE_BITS,
            strategy: ShardStrategy::default(),
        }
    }
}

/// Overcommit figures of a ring.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Overcommit {
    /// Busiest node load relative to the average node load.
    pub node: f64,
    /// Busiest shard load relative to the average shard load.
    pub shard: f64,
}

impl Overcommit {
    /// Evaluates overcommit of an existing ring.
    ///
    /// # Examples
    ///
    /// ```
    /// use overcommit::{Node, Overcommit, Ring, ShardStrategy, Token};
    ///
    /// let mut ring = Ring::new();
    /// ring.insert(Token::new(0.25).unwrap(), Node(0));
    /// ring.insert(Token::new(0.75).unwrap(), Node(1));
    ///
    /// let overcommit = Overcommit::for_ring(&ring, 4, 0, ShardStrategy::Static).unwrap();
    /// assert_eq!(overcommit.node, 1.0);
    /// // Each node's range falls into only 2 of its 4 shards.
    /// assert_eq!(overcommit.shard, 2.0);
    /// ```
    pub fn for_ring(
        ring: &Ring,
        shards: u32,
        ignore_bits: u32,
        strategy: ShardStrategy,
    ) -> Result<Self> {
        let node = overcommit(&loads(&ring.node_intervals()?))?;
        let shard = overcommit(&loads(&ring.shard_intervals(
            shards,
            ignore_bits,
            strategy,
        )?))?;
        Ok(Self { node, shard })
    }
}

/// Builds a random ring, as described by the configuration, and evaluates its
/// overcommit.
///
/// Either both figures are returned, or the error preventing their
/// computation (no nodes, no vnodes, no shards, or too many ignored bits).
///
/// # Examples
///
/// ```
/// use overcommit::{simulate, RandomTokens, SimulationConfig};
///
/// let config = SimulationConfig::default();
/// let overcommit = simulate(&config, &mut RandomTokens::default()).unwrap();
/// assert!(overcommit.node >= 1.0);
/// assert!(overcommit.shard >= 1.0);
/// ```
pub fn simulate<S>(config: &SimulationConfig, tokens: &mut S) -> Result<Overcommit>
where
    S: TokenSource + ?Sized,
{
    let ring = Ring::build(config.nodes, config.vnodes, tokens);
    let overcommit =
        Overcommit::for_ring(&ring, config.shards, config.ignore_bits, config.strategy)?;
    info!(
        nodes = config.nodes,
        vnodes = config.vnodes,
        shards = config.shards,
        ignore_bits = config.ignore_bits,
        strategy = %config.strategy,
        node_overcommit = overcommit.node,
        shard_overcommit = overcommit.shard,
        "simulation complete"
    );
    Ok(overcommit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = SimulationConfig::default();
        assert_eq!(config.nodes, 5);
        assert_eq!(config.vnodes, 32);
        assert_eq!(config.shards, 12);
        assert_eq!(config.ignore_bits, 8);
        assert_eq!(config.strategy, ShardStrategy::Static);
    }

    #[test]
    fn degenerate_configs_fail() {
        let mut tokens = RandomTokens::default();

        let config = SimulationConfig {
            nodes: 0,
            ..Default::default()
        };
        assert_eq!(simulate(&config, &mut tokens), Err(Error::EmptyRing));

        let config = SimulationConfig {
            vnodes: 0,
            ..Default::default()
        };
        assert_eq!(simulate(&config, &mut tokens), Err(Error::EmptyRing));

        let config = SimulationConfig {
            shards: 0,
            ..Default::default()
        };
        assert_eq!(simulate(&config, &mut tokens), Err(Error::EmptyLoadMap));
    }

    #[test]
    fn pinned_ring_overcommit() {
        let mut ring = Ring::new();
        ring.insert(Token::new(0.25).unwrap(), Node(0));
        ring.insert(Token::new(0.75).unwrap(), Node(1));

        // Node 0 owns (0, 0.25] and (0.75, 1], i.e. shards 0 and 3 only; node 1
        // owns (0.25, 0.75], i.e. shards 1 and 2 only. Half of the 8 pairs
        // carry 0.25 each, the rest are idle.
        let overcommit = Overcommit::for_ring(&ring, 4, 0, ShardStrategy::Static).unwrap();
        assert_eq!(overcommit.node, 1.0);
        assert_eq!(overcommit.shard, 2.0);
    }

    #[test]
    fn seeded_simulation_is_reproducible() {
        let config = SimulationConfig::default();
        let a = simulate(&config, &mut RandomTokens::seeded(11)).unwrap();
        let b = simulate(&config, &mut RandomTokens::seeded(11)).unwrap();
        assert_eq!(a, b);
    }
}
