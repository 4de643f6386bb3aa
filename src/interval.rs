use {
    num_traits::Float,
    std::{fmt, ops::BitAnd},
};

/// A (half-open) interval bounded exclusively below and inclusively above i.e.
/// `(lo..hi]`.
///
/// A vnode owns the range ending at its own token, starting just after the
/// previous token, so adjacent intervals tile the token space without
/// overlapping. If `lo >= hi`, the interval is empty.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval<T = f64> {
    pub lo: T,
    pub hi: T,
}

impl<T: Float> Interval<T> {
    /// Creates a new interval `(lo..hi]`.
    pub fn new(lo: T, hi: T) -> Self {
        Self { lo, hi }
    }

    /// Returns `true` if the interval contains no points.
    pub fn is_empty(&self) -> bool {
        // Written this way so that `NaN` bounds are also deemed empty.
        !(self.lo < self.hi)
    }

    /// Returns the length (measure) of the interval, zero if it is empty.
    pub fn length(&self) -> T {
        if self.is_empty() {
            T::zero()
        } else {
            self.hi - self.lo
        }
    }

    /// Returns `true` if `point` is contained in the interval.
    pub fn contains(&self, point: T) -> bool {
        self.lo < point && point <= self.hi
    }

    /// Returns the common part of two intervals, if it is not empty.
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let common = Self::new(self.lo.max(other.lo), self.hi.min(other.hi));
        (!common.is_empty()).then_some(common)
    }

    /// Returns `true` if the intervals share at least one point.
    pub fn is_overlapping(&self, other: &Self) -> bool {
        self.intersection(other).is_some()
    }

    /// Returns `true` if one interval is a continuation of the other.
    ///
    /// That's intervals do not intersect, but can be merged i.e. for given
    /// intervals (a, b] and (b, c] the union is (a, c].
    pub fn is_continuous(&self, other: &Self) -> bool {
        self.hi == other.lo || other.hi == self.lo
    }

    /// Returns the union of `self` and `other` if they can be merged into a
    /// single interval. For intervals that can't be merged, returns `None`.
    pub fn merged(&self, other: &Self) -> Option<Self> {
        match (self.is_empty(), other.is_empty()) {
            (true, _) => Some(*other),
            (_, true) => Some(*self),
            _ if self.is_overlapping(other) || self.is_continuous(other) => Some(Self::new(
                self.lo.min(other.lo),
                self.hi.max(other.hi),
            )),
            _ => None,
        }
    }
}

impl<T: fmt::Display> fmt::Display for Interval<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}]", self.lo, self.hi)
    }
}

/// A set of disjoint half-open intervals.
///
/// Intervals are kept sorted, and inserting an interval that overlaps or
/// touches existing ones joins them, so the set is always in its canonical
/// (minimal) form. Empty intervals are never stored.
///
/// # Examples
///
/// ```
/// use overcommit::{Interval, IntervalSet};
///
/// let mut set = IntervalSet::new();
/// set.insert(Interval::new(0.0, 0.25));
/// set.insert(Interval::new(0.25, 0.5));
/// set.insert(Interval::new(0.75, 1.0));
///
/// // (0, 0.25] and (0.25, 0.5] are joined.
/// assert_eq!(set.len(), 2);
/// assert_eq!(set.length(), 0.75);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalSet<T = f64> {
    intervals: Vec<Interval<T>>,
}

impl<T> Default for IntervalSet<T> {
    fn default() -> Self {
        Self {
            intervals: Vec::new(),
        }
    }
}

impl<T: Float> IntervalSet<T> {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an interval to the set, merging it with the intervals it overlaps
    /// or touches.
    pub fn insert(&mut self, interval: Interval<T>) {
        if interval.is_empty() {
            return;
        }

        // Range `first..last` holds stored intervals that touch `interval`.
        let first = self.intervals.partition_point(|x| x.hi < interval.lo);
        let last = self.intervals.partition_point(|x| x.lo <= interval.hi);

        let mut merged = interval;
        if first < last {
            merged.lo = merged.lo.min(self.intervals[first].lo);
            merged.hi = merged.hi.max(self.intervals[last - 1].hi);
        }
        self.intervals.splice(first..last, [merged]);
    }

    /// Returns the intersection of two sets.
    pub fn intersection(&self, other: &Self) -> Self {
        let mut ret = Self::new();
        let (mut i, mut j) = (0, 0);
        while let (Some(a), Some(b)) = (self.intervals.get(i), other.intervals.get(j)) {
            if let Some(common) = a.intersection(b) {
                ret.insert(common);
            }
            // Move past whichever interval ends first, it cannot intersect
            // anything further.
            if a.hi < b.hi {
                i += 1;
            } else {
                j += 1;
            }
        }
        ret
    }

    /// Returns the union of two sets.
    pub fn union(&self, other: &Self) -> Self {
        let mut ret = self.clone();
        ret.extend(other.iter().copied());
        ret
    }

    /// Returns the total length of the set i.e. the sum of its interval
    /// lengths.
    pub fn length(&self) -> T {
        self.intervals
            .iter()
            .fold(T::zero(), |acc, interval| acc + interval.length())
    }

    /// Returns `true` if `point` is contained in any of the intervals.
    pub fn contains(&self, point: T) -> bool {
        let idx = self.intervals.partition_point(|x| x.hi < point);
        self.intervals
            .get(idx)
            .is_some_and(|interval| interval.contains(point))
    }

    /// Returns `true` if the sets have no points in common.
    pub fn is_disjoint(&self, other: &Self) -> bool {
        self.intersection(other).is_empty()
    }
}

impl<T> IntervalSet<T> {
    /// Returns the number of disjoint intervals in the set.
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    /// Returns `true` if the set holds no intervals.
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Returns iterator over the intervals, in ascending order.
    pub fn iter(&self) -> std::slice::Iter<'_, Interval<T>> {
        self.intervals.iter()
    }
}

impl<T: Float> Extend<Interval<T>> for IntervalSet<T> {
    fn extend<I: IntoIterator<Item = Interval<T>>>(&mut self, iter: I) {
        iter.into_iter().for_each(|interval| self.insert(interval));
    }
}

impl<T: Float> FromIterator<Interval<T>> for IntervalSet<T> {
    fn from_iter<I: IntoIterator<Item = Interval<T>>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<'a, T> IntoIterator for &'a IntervalSet<T> {
    type IntoIter = std::slice::Iter<'a, Interval<T>>;
    type Item = &'a Interval<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.intervals.iter()
    }
}

impl<T: Float> BitAnd for &IntervalSet<T> {
    type Output = IntervalSet<T>;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.intersection(rhs)
    }
}
