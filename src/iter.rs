/// Iterator over consecutive pairs of items: `(a, b), (b, c), (c, d), ...`.
///
/// Used to walk the (padded) ring, where each pair of neighbouring positions
/// delimits the range owned by the second one.
pub(crate) struct Pairs<I: Iterator> {
    iter: I,
    prev: Option<I::Item>,
}

impl<I: Iterator> Pairs<I> {
    pub(crate) fn new(mut iter: I) -> Self {
        let prev = iter.next();
        Self { iter, prev }
    }
}

impl<I> Iterator for Pairs<I>
where
    I: Iterator,
    I::Item: Clone,
{
    type Item = (I::Item, I::Item);

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.iter.next()?;
        let prev = self.prev.replace(next.clone())?;
        Some((prev, next))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.prev {
            Some(_) => self.iter.size_hint(),
            None => (0, Some(0)),
        }
    }
}
