use {
    overcommit::{
        loads,
        overcommit,
        simulate,
        Error,
        IntervalSet,
        Node,
        Overcommit,
        RandomTokens,
        Ring,
        ShardStrategy,
        SimulationConfig,
        Token,
        TokenSource,
    },
    std::collections::BTreeMap,
};

const EPS: f64 = 1e-9;

fn bounds(set: &IntervalSet) -> Vec<(f64, f64)> {
    set.iter().map(|x| (x.lo, x.hi)).collect()
}

/// Hands out tokens evenly spaced over the ring: `0, 1/n, 2/n, ...`.
struct Evenly {
    next: u32,
    count: u32,
}

impl TokenSource for Evenly {
    fn next_token(&mut self) -> Token {
        let token = Token::new(f64::from(self.next) / f64::from(self.count)).unwrap();
        self.next += 1;
        token
    }
}

#[test]
fn two_pinned_nodes() {
    let mut ring = Ring::new();
    ring.insert(Token::new(0.25).unwrap(), Node(0));
    ring.insert(Token::new(0.75).unwrap(), Node(1));

    let intervals = ring.node_intervals().unwrap();
    assert_eq!(bounds(&intervals[&Node(0)]), vec![(0.0, 0.25), (0.75, 1.0)]);
    assert_eq!(bounds(&intervals[&Node(1)]), vec![(0.25, 0.75)]);

    let node_loads = loads(&intervals);
    assert_eq!(node_loads, BTreeMap::from([(Node(0), 0.5), (Node(1), 0.5)]));
    assert_eq!(overcommit(&node_loads), Ok(1.0));
}

#[test]
fn unbalanced_pinned_nodes() {
    // Node 0 owns (0.9, 1] and (0, 0.1], node 1 (0.1, 0.3], node 2 (0.3, 0.9].
    let mut ring = Ring::new();
    ring.insert(Token::new(0.1).unwrap(), Node(0));
    ring.insert(Token::new(0.3).unwrap(), Node(1));
    ring.insert(Token::new(0.9).unwrap(), Node(2));

    let node_loads = loads(&ring.node_intervals().unwrap());
    assert!((node_loads[&Node(0)] - 0.2).abs() < EPS);
    assert!((node_loads[&Node(1)] - 0.2).abs() < EPS);
    assert!((node_loads[&Node(2)] - 0.6).abs() < EPS);
    assert!((overcommit(&node_loads).unwrap() - 1.8).abs() < EPS);
}

#[test]
fn evenly_spaced_ring_is_balanced() {
    // 4 nodes with 2 vnodes each, at multiples of 1/8.
    let mut tokens = Evenly { next: 0, count: 8 };
    let ring = Ring::build(4, 2, &mut tokens);
    assert_eq!(ring.len(), 8);

    let overcommit = Overcommit::for_ring(&ring, 2, 0, ShardStrategy::Static).unwrap();
    assert!((overcommit.node - 1.0).abs() < EPS);

    // Node 1 owns (1/8, 3/8], which falls entirely into shard 0.
    assert!((overcommit.shard - 2.0).abs() < EPS);
}

#[test]
fn shard_loads_split_node_loads() {
    let ring = Ring::build(8, 64, &mut RandomTokens::default());
    let node_loads = loads(&ring.node_intervals().unwrap());
    let shard_loads = loads(&ring.shard_intervals(12, 8, ShardStrategy::Static).unwrap());

    for (node, load) in &node_loads {
        let split = shard_loads
            .iter()
            .filter(|((owner, _), _)| owner == node)
            .map(|(_, load)| load)
            .sum::<f64>();
        assert!((split - load).abs() < EPS, "{node}: {split} != {load}");
    }
}

#[test]
fn more_vnodes_smooth_the_load() {
    // Averaged over a few runs, to keep the test stable.
    let average = |vnodes| {
        let config = SimulationConfig {
            nodes: 10,
            vnodes,
            ..Default::default()
        };
        let mut tokens = RandomTokens::seeded(2024);
        (0..8)
            .map(|_| simulate(&config, &mut tokens).unwrap().node)
            .sum::<f64>()
            / 8.0
    };
    assert!(average(256) < average(4));
}

#[test]
fn simulation_errors() {
    let mut tokens = RandomTokens::default();

    let config = SimulationConfig {
        nodes: 0,
        ..Default::default()
    };
    assert_eq!(simulate(&config, &mut tokens), Err(Error::EmptyRing));

    let config = SimulationConfig {
        shards: 0,
        ..Default::default()
    };
    assert_eq!(simulate(&config, &mut tokens), Err(Error::EmptyLoadMap));

    let config = SimulationConfig {
        ignore_bits: 32,
        ..Default::default()
    };
    assert_eq!(
        simulate(&config, &mut tokens),
        Err(Error::TooManyIgnoredBits(32))
    );

    assert_eq!(
        "consistent".parse::<ShardStrategy>(),
        Err(Error::UnknownStrategy("consistent".to_owned()))
    );
}
