use {
    crate::{iter::Pairs, Error, Interval, IntervalSet, Result, Token, TokenSource},
    crossbeam_skiplist::SkipSet,
    std::{
        collections::{BTreeMap, BTreeSet},
        fmt,
        iter::once,
    },
    tracing::{debug, trace},
};

/// Cluster node, identified by its index.
#[derive(Hash, Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct Node(pub u32);

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node{}", self.0)
    }
}

/// Mapping from a node to the part of the token space it owns.
pub type NodeOwnership = BTreeMap<Node, IntervalSet>;

/// A token placed on the ring on behalf of some node.
///
/// Virtual nodes are ordered by token first and owner second, so ordering
/// stays well-defined even when two nodes happen to draw the same token. This
/// is also the order in which the ring is walked.
#[derive(Hash, Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct VirtualNode {
    pub token: Token,
    pub owner: Node,
}

impl VirtualNode {
    pub fn new(token: Token, owner: Node) -> Self {
        Self { token, owner }
    }

    /// Generates `count` virtual nodes for `owner`, drawing tokens from the
    /// given source.
    ///
    /// Colliding draws collapse into a single vnode, so the returned set may
    /// be (very rarely) smaller than requested.
    pub fn generate<S>(owner: Node, count: u32, tokens: &mut S) -> BTreeSet<Self>
    where
        S: TokenSource + ?Sized,
    {
        (0..count)
            .map(|_| Self::new(tokens.next_token(), owner))
            .collect()
    }
}

impl fmt::Display for VirtualNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} -> {})", self.token, self.owner)
    }
}

/// Consistent hash ring over the normalized `[0, 1)` token space.
///
/// Holds virtual nodes of all cluster nodes, unique and sorted in ascending
/// order. Semantically the ring is a circle: every vnode owns the range
/// `(previous token, own token]`, and the first vnode also owns everything
/// after the last token, wrapping through `1.0 == 0.0`.
#[derive(Debug, Default)]
pub struct Ring {
    vnodes: SkipSet<VirtualNode>,
}

impl Ring {
    /// Creates an empty ring.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a ring of `nodes` nodes (with ids `0..nodes`), each owning
    /// `vnodes` randomly placed virtual nodes.
    ///
    /// # Examples
    ///
    /// ```
    /// use overcommit::{RandomTokens, Ring};
    ///
    /// let ring = Ring::build(3, 16, &mut RandomTokens::seeded(7));
    /// assert_eq!(ring.nodes().len(), 3);
    /// assert!(ring.len() <= 48);
    /// ```
    pub fn build<S>(nodes: u32, vnodes: u32, tokens: &mut S) -> Self
    where
        S: TokenSource + ?Sized,
    {
        let ring = (0..nodes)
            .flat_map(|id| VirtualNode::generate(Node(id), vnodes, &mut *tokens))
            .collect::<Self>();
        debug!(nodes, vnodes, tokens = ring.len(), "built ring");
        ring
    }

    /// Places `owner` at a given token.
    ///
    /// Mostly useful for testing, to pin tokens instead of drawing them at
    /// random. Inserting an existing `(token, owner)` pair is a no-op.
    ///
    /// # Examples
    ///
    /// ```
    /// use overcommit::{Node, Ring, Token};
    ///
    /// let mut ring = Ring::new();
    /// ring.insert(Token::new(0.25).unwrap(), Node(0));
    /// ring.insert(Token::new(0.75).unwrap(), Node(1));
    /// ring.insert(Token::new(0.75).unwrap(), Node(1));
    /// assert_eq!(ring.len(), 2);
    /// ```
    pub fn insert(&mut self, token: Token, owner: Node) {
        self.vnodes.insert(VirtualNode::new(token, owner));
    }

    /// Returns size of the ring, i.e. number of contained virtual nodes.
    pub fn len(&self) -> usize {
        self.vnodes.len()
    }

    /// Returns `true` if the ring is empty.
    pub fn is_empty(&self) -> bool {
        self.vnodes.is_empty()
    }

    /// Returns virtual nodes in ring order.
    pub fn iter(&self) -> impl Iterator<Item = VirtualNode> + '_ {
        self.vnodes.iter().map(|entry| *entry.value())
    }

    /// Returns the set of nodes which own at least one virtual node.
    pub fn nodes(&self) -> BTreeSet<Node> {
        self.iter().map(|vnode| vnode.owner).collect()
    }

    /// Returns ring positions with the wraparound unrolled into a line.
    ///
    /// Yields `(position, owner)` pairs: all virtual nodes in ring order,
    /// preceded by position `0.0` owned by the owner of the last vnode, and
    /// followed by position `1.0` owned by the owner of the first vnode.
    /// Consecutive pairs `(a, b)` then describe the range `(a, b]` owned by
    /// `b`, wrapping segments included.
    ///
    /// Boundary positions are not virtual nodes, and are not part of the ring.
    pub fn padded(&self) -> Result<impl Iterator<Item = (f64, Node)> + '_> {
        let (first, last) = match (self.vnodes.front(), self.vnodes.back()) {
            (Some(first), Some(last)) => (first.value().owner, last.value().owner),
            _ => return Err(Error::EmptyRing),
        };
        let positions = self.iter().map(|vnode| (vnode.token.value(), vnode.owner));
        Ok(once((0.0, last)).chain(positions).chain(once((1.0, first))))
    }

    /// Returns the part of the token space owned by every node.
    ///
    /// Every point of `(0, 1]` is owned by exactly one node.
    pub fn node_intervals(&self) -> Result<NodeOwnership> {
        let mut ret = NodeOwnership::new();
        for ((lo, _), (hi, owner)) in Pairs::new(self.padded()?) {
            trace!(%owner, lo, hi, "assigned range");
            ret.entry(owner).or_default().insert(Interval::new(lo, hi));
        }
        Ok(ret)
    }

    /// Returns sizes of the ranges between adjacent vnodes of different
    /// owners.
    ///
    /// The ring is walked circularly: for every pair of neighbouring virtual
    /// nodes with distinct owners, the clockwise distance between their tokens
    /// is reported (the last pair wraps around through the origin).
    pub fn boundary_gaps(&self) -> Vec<f64> {
        Pairs::new(self.iter().chain(self.iter().next()))
            .filter(|(a, b)| a.owner != b.owner)
            .map(|(a, b)| {
                let gap = b.token.value() - a.token.value();
                if gap < 0.0 {
                    gap + 1.0
                } else {
                    gap
                }
            })
            .collect()
    }
}

impl Clone for Ring {
    fn clone(&self) -> Self {
        self.iter().collect()
    }
}

impl FromIterator<VirtualNode> for Ring {
    fn from_iter<I: IntoIterator<Item = VirtualNode>>(iter: I) -> Self {
        let vnodes = SkipSet::new();
        for vnode in iter {
            vnodes.insert(vnode);
        }
        Self { vnodes }
    }
}

/// Summary of the ranges found between vnodes of different owners.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GapStats {
    pub count: usize,
    pub smallest: f64,
    pub average: f64,
    pub largest: f64,
}

impl GapStats {
    /// Summarizes a list of gaps, `None` if there are none.
    pub fn from_gaps(gaps: &[f64]) -> Option<Self> {
        if gaps.is_empty() {
            return None;
        }
        let smallest = gaps.iter().copied().fold(f64::INFINITY, f64::min);
        let largest = gaps.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let average = gaps.iter().sum::<f64>() / gaps.len() as f64;
        Some(Self {
            count: gaps.len(),
            smallest,
            average,
            largest,
        })
    }

    /// Ratio between the largest and the smallest gap.
    pub fn ratio(&self) -> f64 {
        self.largest / self.smallest
    }
}
