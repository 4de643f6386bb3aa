use {
    crate::{Error, IntervalSet, Result},
    std::collections::BTreeMap,
};

/// Load of every partition (node, or `(node, shard)` pair), i.e. the fraction
/// of the token space it owns.
///
/// Loads of a complete ownership mapping sum up to `1.0`.
pub type LoadMap<K> = BTreeMap<K, f64>;

/// Computes the load of every partition of an ownership mapping.
pub fn loads<K: Ord + Clone>(ownership: &BTreeMap<K, IntervalSet>) -> LoadMap<K> {
    ownership
        .iter()
        .map(|(key, ivals)| (key.clone(), ivals.length()))
        .collect()
}

/// Returns the overcommit: the ratio between the load of the busiest partition
/// and the load of the "average" partition.
///
/// Partitions split a token space of size `1.0`, so the average load is
/// `1.0 / count`, and the ratio is `max * count`. A perfectly balanced
/// mapping has an overcommit of `1.0`.
///
/// # Examples
///
/// ```
/// use {overcommit::overcommit, std::collections::BTreeMap};
///
/// let loads = BTreeMap::from([(0, 0.5), (1, 0.25), (2, 0.25)]);
/// assert_eq!(overcommit(&loads).unwrap(), 1.5);
/// ```
pub fn overcommit<K>(loads: &LoadMap<K>) -> Result<f64> {
    let max = loads
        .values()
        .copied()
        .reduce(f64::max)
        .ok_or(Error::EmptyLoadMap)?;
    Ok(max * loads.len() as f64)
}

/// Returns the imbalance: the ratio between the load of the busiest partition
/// and the load of the least busy one.
///
/// If some partition has no load at all, the imbalance is infinite.
pub fn imbalance<K>(loads: &LoadMap<K>) -> Result<f64> {
    let (min, max) = loads
        .values()
        .map(|&load| (load, load))
        .reduce(|(min, max), (lo, hi)| (min.min(lo), max.max(hi)))
        .ok_or(Error::EmptyLoadMap)?;
    Ok(max / min)
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{Interval, Node, RandomTokens, Ring, ShardStrategy, Token},
    };

    #[test]
    fn loads_sum_interval_lengths() {
        let ownership = BTreeMap::from([
            (
                Node(0),
                IntervalSet::from_iter([Interval::new(0.0, 0.25), Interval::new(0.75, 1.0)]),
            ),
            (Node(1), IntervalSet::from_iter([Interval::new(0.25, 0.75)])),
            (Node(2), IntervalSet::new()),
        ]);
        let loads = loads(&ownership);
        assert_eq!(loads, BTreeMap::from([(Node(0), 0.5), (Node(1), 0.5), (Node(2), 0.0)]));
    }

    #[test]
    fn overcommit_basic() {
        assert_eq!(overcommit(&BTreeMap::from([(0, 0.25), (1, 0.75)])), Ok(1.5));
        assert_eq!(overcommit(&BTreeMap::from([(0, 1.0)])), Ok(1.0));
        assert_eq!(overcommit(&LoadMap::<u32>::new()), Err(Error::EmptyLoadMap));
    }

    #[test]
    fn imbalance_basic() {
        assert_eq!(imbalance(&BTreeMap::from([(0, 0.25), (1, 0.75)])), Ok(3.0));
        assert_eq!(imbalance(&BTreeMap::from([(0, 1.0)])), Ok(1.0));
        assert_eq!(
            imbalance(&BTreeMap::from([(0, 0.0), (1, 1.0)])),
            Ok(f64::INFINITY)
        );
        assert_eq!(imbalance(&LoadMap::<u32>::new()), Err(Error::EmptyLoadMap));
    }

    #[test]
    fn pinned_two_nodes_balanced() {
        let mut ring = Ring::new();
        ring.insert(Token::new(0.25).unwrap(), Node(0));
        ring.insert(Token::new(0.75).unwrap(), Node(1));

        let loads = loads(&ring.node_intervals().unwrap());
        assert_eq!(loads[&Node(0)], 0.5);
        assert_eq!(loads[&Node(1)], 0.5);
        assert_eq!(overcommit(&loads), Ok(1.0));
    }

    #[test]
    fn single_node_has_no_overcommit() {
        let ring = Ring::build(1, 64, &mut RandomTokens::default());
        let loads = loads(&ring.node_intervals().unwrap());
        assert_eq!(loads.len(), 1);
        assert_eq!(overcommit(&loads), Ok(1.0));
    }

    #[test]
    fn overcommit_at_least_one() {
        let ring = Ring::build(7, 16, &mut RandomTokens::default());

        let node_loads = loads(&ring.node_intervals().unwrap());
        assert!((node_loads.values().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(overcommit(&node_loads).unwrap() >= 1.0);

        let shard_loads = loads(&ring.shard_intervals(12, 8, ShardStrategy::Static).unwrap());
        assert_eq!(shard_loads.len(), 7 * 12);
        assert!((shard_loads.values().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(overcommit(&shard_loads).unwrap() >= 1.0);
    }
}
