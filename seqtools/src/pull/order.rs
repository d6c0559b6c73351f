//! [`Ordered`]: operators which must buffer the whole upstream before emitting anything.
use std::cmp::Ordering;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use futures::stream::Stream;
use pin_project_lite::pin_project;

use crate::Enumerable;

/// Rearranges a fully buffered upstream.
pub trait Arrange<T> {
    /// Rearranges `items` in place.
    fn arrange(&self, items: &mut Vec<T>);
}

impl<T, A> Arrange<T> for &A
where
    A: Arrange<T> + ?Sized,
{
    fn arrange(&self, items: &mut Vec<T>) {
        (**self).arrange(items)
    }
}

/// Stable sort by a key selector.
///
/// Keys are computed once per element and compared with [`PartialOrd`]. Keys which are not
/// comparable with themselves (such as NaN) sort after all other keys, in both directions, and
/// keep their input order.
#[derive(Clone, Copy, Debug)]
pub struct ByKey<Func> {
    key: Func,
    descending: bool,
}

impl<Func> ByKey<Func> {
    /// Ascending order of `key`.
    pub fn ascending(key: Func) -> Self {
        Self {
            key,
            descending: false,
        }
    }

    /// Descending order of `key`.
    pub fn descending(key: Func) -> Self {
        Self {
            key,
            descending: true,
        }
    }
}

impl<T, Func, Key> Arrange<T> for ByKey<Func>
where
    Func: Fn(&T) -> Key,
    Key: PartialOrd,
{
    fn arrange(&self, items: &mut Vec<T>) {
        let mut keyed = std::mem::take(items)
            .into_iter()
            .map(|item| {
                let key = (self.key)(&item);
                let comparable = key.partial_cmp(&key).is_some();
                (comparable.then_some(key), item)
            })
            .collect::<Vec<_>>();
        keyed.sort_by(|(a, _), (b, _)| match (a, b) {
            (Some(a), Some(b)) => {
                let ord = a.partial_cmp(b).unwrap_or(Ordering::Equal);
                if self.descending { ord.reverse() } else { ord }
            }
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
        items.extend(keyed.into_iter().map(|(_, item)| item));
    }
}

/// Stable sort by a comparator.
#[derive(Clone, Copy, Debug)]
pub struct ByComparator<Func>(pub Func);

impl<T, Func> Arrange<T> for ByComparator<Func>
where
    Func: Fn(&T, &T) -> Ordering,
{
    fn arrange(&self, items: &mut Vec<T>) {
        items.sort_by(|a, b| (self.0)(a, b));
    }
}

/// Reverses the input order.
#[derive(Clone, Copy, Debug, Default)]
pub struct Reversed;

impl<T> Arrange<T> for Reversed {
    fn arrange(&self, items: &mut Vec<T>) {
        items.reverse();
    }
}

/// Buffers all upstream elements, rearranges them, then emits them.
#[must_use = "enumerables do nothing unless consumed"]
pub struct Ordered<E, A> {
    upstream: E,
    arrange: A,
}

impl<E, A> Ordered<E, A> {
    /// Create with `upstream` and the `arrange` strategy.
    pub fn new(upstream: E, arrange: A) -> Self {
        Self { upstream, arrange }
    }
}

impl<E, A> Enumerable for Ordered<E, A>
where
    E: Enumerable,
    A: Arrange<E::Item>,
{
    type Item = E::Item;
    type Iter<'a>
        = OrderedStream<E::Iter<'a>, &'a A>
    where
        Self: 'a;

    fn iterate(&self) -> Self::Iter<'_> {
        OrderedStream::new(self.upstream.iterate(), &self.arrange)
    }
}

pin_project! {
    #[project = OrderedStateProj]
    enum OrderedState<St, Item, A> {
        Accumulating {
            #[pin]
            stream: St,
            accum: Vec<Item>,
            arrange: A,
        },
        Emitting {
            into_iter: std::vec::IntoIter<Item>,
        },
    }
}

pin_project! {
    /// Session for [`Ordered`]: waits for all upstream items, rearranges them, then emits them.
    #[must_use = "streams do nothing unless polled"]
    pub struct OrderedStream<St, A>
    where
        St: Stream,
    {
        #[pin]
        state: OrderedState<St, St::Item, A>,
    }
}

impl<St, A> OrderedStream<St, A>
where
    St: Stream,
    A: Arrange<St::Item>,
{
    /// Create with source `stream` and the `arrange` strategy.
    pub fn new(stream: St, arrange: A) -> Self {
        let size_hint = stream.size_hint().0;
        Self {
            state: OrderedState::Accumulating {
                stream,
                accum: Vec::with_capacity(size_hint),
                arrange,
            },
        }
    }
}

impl<St, A> Stream for OrderedStream<St, A>
where
    St: Stream,
    A: Arrange<St::Item>,
{
    type Item = St::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        if let OrderedStateProj::Accumulating {
            mut stream,
            accum,
            arrange,
        } = this.state.as_mut().project()
        {
            while let Some(item) = ready!(stream.as_mut().poll_next(cx)) {
                accum.push(item);
            }
            // Stream exhausted. Rearrange and transition to emitting.
            tracing::trace!(len = accum.len(), "Materialized upstream.");
            arrange.arrange(accum);
            let into_iter = std::mem::take(accum).into_iter();
            this.state
                .as_mut()
                .set(OrderedState::Emitting { into_iter });
        }

        match this.state.project() {
            OrderedStateProj::Emitting { into_iter } => Poll::Ready(into_iter.next()),
            OrderedStateProj::Accumulating { .. } => unreachable!(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.state {
            OrderedState::Accumulating { stream, accum, .. } => {
                let (lower, upper) = stream.size_hint();
                (
                    lower.saturating_add(accum.len()),
                    upper.and_then(|upper| upper.checked_add(accum.len())),
                )
            }
            OrderedState::Emitting { into_iter } => (into_iter.len(), Some(into_iter.len())),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use crate::{Enumerable, Terminal, source_iter};

    #[tokio::test]
    async fn test_order_by_is_stable() {
        let pairs = source_iter(vec![(2, 'a'), (1, 'b'), (2, 'c'), (1, 'd')]);
        let ordered = pairs.order_by(|(k, _)| *k);
        assert_eq!(
            vec![(1, 'b'), (1, 'd'), (2, 'a'), (2, 'c')],
            ordered.to_vec().await
        );
    }

    #[tokio::test]
    async fn test_order_by_desc_is_stable() {
        let pairs = source_iter(vec![(1, 'a'), (2, 'b'), (1, 'c'), (2, 'd')]);
        let ordered = pairs.order_by_desc(|(k, _)| *k);
        assert_eq!(
            vec![(2, 'b'), (2, 'd'), (1, 'a'), (1, 'c')],
            ordered.to_vec().await
        );
    }

    #[tokio::test]
    async fn test_order_by_floats_and_strings() {
        let floats = source_iter(vec![2.5, -1.0, 0.5]).order_by(|x| *x);
        assert_eq!(vec![-1.0, 0.5, 2.5], floats.to_vec().await);

        let words = source_iter(vec!["pear", "apple", "fig"]).order_by(|w| w.to_string());
        assert_eq!(vec!["apple", "fig", "pear"], words.to_vec().await);
    }

    #[tokio::test]
    async fn test_sort_and_sort_by() {
        assert_eq!(
            vec![1, 2, 3],
            source_iter(vec![3, 1, 2]).sort().to_vec().await
        );
        let by_len = source_iter(vec!["ccc", "a", "bb"]).sort_by(|a, b| a.len().cmp(&b.len()));
        assert_eq!(vec!["a", "bb", "ccc"], by_len.to_vec().await);
    }

    #[tokio::test]
    async fn test_reverse() {
        let reversed = source_iter(1..=4).reverse();
        assert_eq!(vec![4, 3, 2, 1], reversed.to_vec().await);
    }

    fn with_nans(len: usize) -> Vec<(f64, usize)> {
        (0..len)
            .map(|i| {
                let key = if i % 16 == 5 {
                    f64::NAN
                } else {
                    ((i * 37) % 23) as f64 - 10.0
                };
                (key, i)
            })
            .collect()
    }

    fn assert_ordered(sorted: &[(f64, usize)], descending: bool) {
        let nans = sorted.iter().filter(|(k, _)| k.is_nan()).count();
        let (numbers, tail) = sorted.split_at(sorted.len() - nans);
        assert!(tail.iter().all(|(k, _)| k.is_nan()));
        assert!(tail.windows(2).all(|w| w[0].1 < w[1].1));
        assert!(numbers.windows(2).all(|w| {
            let (a, b) = if descending { (w[1], w[0]) } else { (w[0], w[1]) };
            a.0 < b.0 || (a.0 == b.0 && w[0].1 < w[1].1)
        }));
    }

    #[tokio::test]
    async fn test_order_by_incomparable_keys_sort_last() {
        let input = with_nans(64);
        let ascending = source_iter(input.clone()).order_by(|(k, _)| *k).to_vec().await;
        assert_eq!(64, ascending.len());
        assert_ordered(&ascending, false);

        let descending = source_iter(input).order_by_desc(|(k, _)| *k).to_vec().await;
        assert_eq!(64, descending.len());
        assert_ordered(&descending, true);
    }

    #[tokio::test]
    async fn test_order_by_is_lazy() {
        let pulled = Cell::new(0);
        let ordered = source_iter((0..3).map(|x| {
            pulled.set(pulled.get() + 1);
            x
        }))
        .order_by(|x| -x);
        assert_eq!(0, pulled.get());
        assert_eq!(vec![2, 1, 0], ordered.to_vec().await);
        assert_eq!(3, pulled.get());
    }
}
