//! [`Map`], [`MapAsync`], [`Enumerate`], and their sessions.
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use futures::stream::Stream;
use pin_project_lite::pin_project;

use crate::Enumerable;

/// Same as [`Iterator::map`] but as an [`Enumerable`].
#[must_use = "enumerables do nothing unless consumed"]
pub struct Map<E, Func> {
    upstream: E,
    func: Func,
}

impl<E, Func> Map<E, Func> {
    /// Create with `upstream` and mapping `func`.
    pub fn new(upstream: E, func: Func) -> Self {
        Self { upstream, func }
    }
}

impl<E, Func, Out> Enumerable for Map<E, Func>
where
    E: Enumerable,
    Func: Fn(E::Item) -> Out,
{
    type Item = Out;
    type Iter<'a>
        = MapStream<E::Iter<'a>, &'a Func>
    where
        Self: 'a;

    fn iterate(&self) -> Self::Iter<'_> {
        MapStream::new(self.upstream.iterate(), &self.func)
    }
}

pin_project! {
    /// Session for [`Map`].
    #[must_use = "streams do nothing unless polled"]
    pub struct MapStream<St, Func> {
        #[pin]
        stream: St,
        func: Func,
    }
}

impl<St, Func> MapStream<St, Func> {
    /// Create with source `stream` and mapping `func`.
    pub fn new(stream: St, func: Func) -> Self {
        Self { stream, func }
    }
}

impl<St, Func, Out> Stream for MapStream<St, Func>
where
    St: Stream,
    Func: Fn(St::Item) -> Out,
{
    type Item = Out;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();
        let item = ready!(this.stream.poll_next(cx));
        Poll::Ready(item.map(|item| (this.func)(item)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.stream.size_hint()
    }
}

/// Maps each element to a [`Future`] and yields the outputs, one future at a time.
#[must_use = "enumerables do nothing unless consumed"]
pub struct MapAsync<E, Func> {
    upstream: E,
    func: Func,
}

impl<E, Func> MapAsync<E, Func> {
    /// Create with `upstream` and asynchronous mapping `func`.
    pub fn new(upstream: E, func: Func) -> Self {
        Self { upstream, func }
    }
}

impl<E, Func, Fut> Enumerable for MapAsync<E, Func>
where
    E: Enumerable,
    Func: Fn(E::Item) -> Fut,
    Fut: Future,
{
    type Item = Fut::Output;
    type Iter<'a>
        = MapAsyncStream<E::Iter<'a>, &'a Func, Fut>
    where
        Self: 'a;

    fn iterate(&self) -> Self::Iter<'_> {
        MapAsyncStream::new(self.upstream.iterate(), &self.func)
    }
}

pin_project! {
    /// Session for [`MapAsync`].
    ///
    /// The next upstream element is not pulled until the pending future resolves.
    #[must_use = "streams do nothing unless polled"]
    pub struct MapAsyncStream<St, Func, Fut> {
        #[pin]
        stream: St,
        func: Func,
        #[pin]
        pending: Option<Fut>,
    }
}

impl<St, Func, Fut> MapAsyncStream<St, Func, Fut> {
    /// Create with source `stream` and asynchronous mapping `func`.
    pub fn new(stream: St, func: Func) -> Self {
        Self {
            stream,
            func,
            pending: None,
        }
    }
}

impl<St, Func, Fut> Stream for MapAsyncStream<St, Func, Fut>
where
    St: Stream,
    Func: Fn(St::Item) -> Fut,
    Fut: Future,
{
    type Item = Fut::Output;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        if this.pending.is_none() {
            let Some(item) = ready!(this.stream.as_mut().poll_next(cx)) else {
                return Poll::Ready(None);
            };
            this.pending.set(Some((this.func)(item)));
        }

        let Some(future) = this.pending.as_mut().as_pin_mut() else {
            return Poll::Ready(None);
        };
        let output = ready!(future.poll(cx));
        this.pending.set(None);
        Poll::Ready(Some(output))
    }
}

/// Same as [`Iterator::enumerate`] but as an [`Enumerable`].
#[must_use = "enumerables do nothing unless consumed"]
pub struct Enumerate<E> {
    upstream: E,
}

impl<E> Enumerate<E> {
    /// Create with `upstream`.
    pub fn new(upstream: E) -> Self {
        Self { upstream }
    }
}

impl<E> Enumerable for Enumerate<E>
where
    E: Enumerable,
{
    type Item = (usize, E::Item);
    type Iter<'a>
        = EnumerateStream<E::Iter<'a>>
    where
        Self: 'a;

    fn iterate(&self) -> Self::Iter<'_> {
        EnumerateStream {
            stream: self.upstream.iterate(),
            index: 0,
        }
    }
}

pin_project! {
    /// Session for [`Enumerate`].
    #[must_use = "streams do nothing unless polled"]
    pub struct EnumerateStream<St> {
        #[pin]
        stream: St,
        index: usize,
    }
}

impl<St> Stream for EnumerateStream<St>
where
    St: Stream,
{
    type Item = (usize, St::Item);

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();
        let Some(item) = ready!(this.stream.poll_next(cx)) else {
            return Poll::Ready(None);
        };
        let index = *this.index;
        *this.index += 1;
        Poll::Ready(Some((index, item)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.stream.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::{Enumerable, Terminal, source_iter, source_stream};

    #[tokio::test]
    async fn test_map() {
        let mapped = source_iter(vec![1, 2, 3]).map(|x| x * 10);
        assert_eq!(vec![10, 20, 30], mapped.to_vec().await);
    }

    #[tokio::test]
    async fn test_map_async_keeps_order() {
        // Earlier elements sleep longer; output order must still follow input order.
        let mapped = source_iter(vec![3_u64, 2, 1]).map_async(|x| async move {
            tokio::time::sleep(Duration::from_millis(x)).await;
            x * 2
        });
        assert_eq!(vec![6, 4, 2], mapped.to_vec().await);
    }

    #[tokio::test]
    async fn test_map_async_over_stream_source() {
        let mapped = source_stream(|| futures::stream::iter(vec!['a', 'b']))
            .map_async(|c| async move { c.to_ascii_uppercase() });
        assert_eq!(vec!['A', 'B'], mapped.to_vec().await);
    }

    #[tokio::test]
    async fn test_enumerate() {
        let enumerated = source_iter(["x", "y"]).enumerate();
        assert_eq!(vec![(0, "x"), (1, "y")], enumerated.to_vec().await);
    }
}
