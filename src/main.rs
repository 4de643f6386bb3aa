//! `overcommit` — simulate cluster load imbalance.
//!
//! Builds a random vnode ring and reports how much more load the busiest node
//! and the busiest shard get compared to the average one.
//!
//! ```text
//! overcommit                          # 5 nodes, 32 vnodes, 12 shards
//! overcommit -n 10 -v 256 -s 8 -b 12  # custom cluster
//! overcommit --seed 42 --gaps         # reproducible run, with range stats
//! ```

use {
    anyhow::{Context, Result},
    clap::Parser,
    overcommit::{
        imbalance,
        loads,
        overcommit,
        GapStats,
        RandomTokens,
        Ring,
        ShardStrategy,
        SimulationConfig,
        TokenSource,
        DEFAULT_IGNORE_BITS,
        DEFAULT_NODES,
        DEFAULT_SHARDS,
        DEFAULT_VNODES,
    },
    tracing::debug,
    tracing_subscriber::EnvFilter,
};

#[derive(Parser, Debug)]
#[command(
    name = "overcommit",
    version,
    about = "Simulate Scylla cluster load imbalance"
)]
struct Cli {
    /// Number of nodes in the cluster.
    #[arg(short, long, default_value_t = DEFAULT_NODES)]
    nodes: u32,

    /// Number of vnodes per node.
    #[arg(short, long, default_value_t = DEFAULT_VNODES)]
    vnodes: u32,

    /// Number of shards per node.
    #[arg(short, long, default_value_t = DEFAULT_SHARDS)]
    shards: u32,

    /// Number of token MSB bits to ignore for sharding.
    #[arg(short = 'b', long = "ignore-msb-bits", default_value_t = DEFAULT_IGNORE_BITS)]
    ignore_bits: u32,

    /// Sharding algorithm.
    #[arg(short, long, default_value_t = ShardStrategy::default(), value_parser = parse_strategy)]
    algorithm: ShardStrategy,

    /// Seed for the token generator, makes the run reproducible.
    #[arg(long)]
    seed: Option<u64>,

    /// Also report sizes of ranges between vnodes of different nodes.
    #[arg(long)]
    gaps: bool,
}

impl From<&Cli> for SimulationConfig {
    fn from(cli: &Cli) -> Self {
        Self {
            nodes: cli.nodes,
            vnodes: cli.vnodes,
            shards: cli.shards,
            ignore_bits: cli.ignore_bits,
            strategy: cli.algorithm,
        }
    }
}

fn parse_strategy(name: &str) -> Result<ShardStrategy, overcommit::Error> {
    name.parse()
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    debug!(?cli, "parsed arguments");

    match cli.seed {
        Some(seed) => run(&cli, &mut RandomTokens::seeded(seed)),
        None => run(&cli, &mut RandomTokens::default()),
    }
}

fn run(cli: &Cli, tokens: &mut dyn TokenSource) -> Result<()> {
    let config = SimulationConfig::from(cli);
    println!(
        "{} nodes, {} vnodes, {} shards",
        config.nodes, config.vnodes, config.shards
    );

    let ring = Ring::build(config.nodes, config.vnodes, tokens);

    let node_loads = loads(&ring.node_intervals().context("cannot compute node load")?);
    let shard_loads = loads(
        &ring
            .shard_intervals(config.shards, config.ignore_bits, config.strategy)
            .context("cannot compute shard load")?,
    );

    println!("maximum node overcommit:  {}", overcommit(&node_loads)?);
    println!("maximum shard overcommit: {:.6}", overcommit(&shard_loads)?);
    println!("maximum node imbalance:   {}", imbalance(&node_loads)?);
    println!("maximum shard imbalance:  {:.6}", imbalance(&shard_loads)?);

    if cli.gaps {
        match GapStats::from_gaps(&ring.boundary_gaps()) {
            Some(stats) => {
                println!("ranges between nodes:     {}", stats.count);
                println!("expected average range:   {:.8}", 1.0 / stats.count as f64);
                println!("smallest range:           {:.8}", stats.smallest);
                println!("average range:            {:.8}", stats.average);
                println!("largest range:            {:.8}", stats.largest);
                println!("largest/smallest ratio:   {:.2}x", stats.ratio());
            }
            None => println!("no ranges between distinct nodes"),
        }
    }
    Ok(())
}
