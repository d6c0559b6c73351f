//! [`Zip`], [`Concat`], and their sessions.
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use futures::stream::Stream;
use pin_project_lite::pin_project;

use crate::Enumerable;

/// Pairs up the elements of two enumerables, stopping at the shorter one.
#[must_use = "enumerables do nothing unless consumed"]
pub struct Zip<E1, E2> {
    left: E1,
    right: E2,
}

impl<E1, E2> Zip<E1, E2> {
    /// Create from the `left` and `right` enumerables.
    pub fn new(left: E1, right: E2) -> Self {
        Self { left, right }
    }
}

impl<E1, E2> Enumerable for Zip<E1, E2>
where
    E1: Enumerable,
    E2: Enumerable,
{
    type Item = (E1::Item, E2::Item);
    type Iter<'a>
        = ZipStream<E1::Iter<'a>, E2::Iter<'a>>
    where
        Self: 'a;

    fn iterate(&self) -> Self::Iter<'_> {
        ZipStream::new(self.left.iterate(), self.right.iterate())
    }
}

pin_project! {
    /// Session for [`Zip`].
    #[must_use = "streams do nothing unless polled"]
    pub struct ZipStream<St1, St2>
    where
        St1: Stream,
    {
        #[pin]
        stream1: St1,
        #[pin]
        stream2: St2,
        // Left item waiting for its right partner.
        left: Option<St1::Item>,
        done: bool,
    }
}

impl<St1, St2> ZipStream<St1, St2>
where
    St1: Stream,
    St2: Stream,
{
    /// Create from two source streams.
    pub fn new(stream1: St1, stream2: St2) -> Self {
        Self {
            stream1,
            stream2,
            left: None,
            done: false,
        }
    }
}

impl<St1, St2> Stream for ZipStream<St1, St2>
where
    St1: Stream,
    St2: Stream,
{
    type Item = (St1::Item, St2::Item);

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        if *this.done {
            return Poll::Ready(None);
        }
        if this.left.is_none() {
            match ready!(this.stream1.as_mut().poll_next(cx)) {
                Some(left) => *this.left = Some(left),
                None => {
                    *this.done = true;
                    return Poll::Ready(None);
                }
            }
        }
        let right = ready!(this.stream2.as_mut().poll_next(cx));
        match (this.left.take(), right) {
            (Some(left), Some(right)) => Poll::Ready(Some((left, right))),
            _ => {
                *this.done = true;
                Poll::Ready(None)
            }
        }
    }
}

/// Yields all elements of the first enumerable, then all elements of the second.
#[must_use = "enumerables do nothing unless consumed"]
pub struct Concat<E1, E2> {
    first: E1,
    second: E2,
}

impl<E1, E2> Concat<E1, E2> {
    /// Create from the `first` and `second` enumerables.
    pub fn new(first: E1, second: E2) -> Self {
        Self { first, second }
    }
}

impl<E1, E2> Enumerable for Concat<E1, E2>
where
    E1: Enumerable,
    E2: Enumerable<Item = E1::Item>,
{
    type Item = E1::Item;
    type Iter<'a>
        = ConcatStream<E1::Iter<'a>, E2::Iter<'a>>
    where
        Self: 'a;

    fn iterate(&self) -> Self::Iter<'_> {
        ConcatStream::new(self.first.iterate(), self.second.iterate())
    }
}

pin_project! {
    /// Session for [`Concat`], also used to stitch together the set operators.
    #[must_use = "streams do nothing unless polled"]
    pub struct ConcatStream<St1, St2> {
        #[pin]
        stream1: St1,
        #[pin]
        stream2: St2,
        first_done: bool,
    }
}

impl<St1, St2> ConcatStream<St1, St2>
where
    St1: Stream,
    St2: Stream<Item = St1::Item>,
{
    /// Create from two source streams.
    pub fn new(stream1: St1, stream2: St2) -> Self {
        Self {
            stream1,
            stream2,
            first_done: false,
        }
    }
}

impl<St1, St2> Stream for ConcatStream<St1, St2>
where
    St1: Stream,
    St2: Stream<Item = St1::Item>,
{
    type Item = St1::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();

        if !*this.first_done {
            if let Some(item) = ready!(this.stream1.poll_next(cx)) {
                return Poll::Ready(Some(item));
            }
            *this.first_done = true;
        }
        this.stream2.poll_next(cx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (lower2, upper2) = self.stream2.size_hint();
        if self.first_done {
            return (lower2, upper2);
        }
        let (lower1, upper1) = self.stream1.size_hint();
        let upper = upper1.zip(upper2).and_then(|(a, b)| a.checked_add(b));
        (lower1.saturating_add(lower2), upper)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use crate::{Enumerable, Terminal, source_iter, source_range};

    #[tokio::test]
    async fn test_zip_truncates_to_shorter() {
        let zipped = source_iter(vec!['a', 'b', 'c']).zip(source_range(2));
        assert_eq!(vec![('a', 0), ('b', 1)], zipped.to_vec().await);
    }

    #[tokio::test]
    async fn test_zip_does_not_pull_right_after_left_ends() {
        let pulled = Cell::new(0);
        let right = source_iter((0..10).map(|x| {
            pulled.set(pulled.get() + 1);
            x
        }));
        let zipped = source_iter(vec!['a', 'b']).zip(right);
        assert_eq!(2, zipped.count().await);
        assert_eq!(2, pulled.get());
    }

    #[tokio::test]
    async fn test_concat() {
        let joined = source_iter(vec![1, 2]).concat(vec![3]).concat([4, 5]);
        assert_eq!(vec![1, 2, 3, 4, 5], joined.to_vec().await);
    }
}
