//! [`Filter`], [`FilterAsync`], and their sessions.
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use futures::stream::Stream;
use pin_project_lite::pin_project;

use crate::Enumerable;

/// A predicate over an element and its index among the examined elements.
pub trait Predicate<T> {
    /// Returns whether `item`, the `index`-th examined element, is kept.
    fn test(&self, item: &T, index: usize) -> bool;
}

impl<T, P> Predicate<T> for &P
where
    P: Predicate<T> + ?Sized,
{
    fn test(&self, item: &T, index: usize) -> bool {
        (**self).test(item, index)
    }
}

/// [`Predicate`] which only looks at the element.
#[derive(Clone, Copy, Debug)]
pub struct ByItem<Func>(pub Func);

impl<T, Func> Predicate<T> for ByItem<Func>
where
    Func: Fn(&T) -> bool,
{
    fn test(&self, item: &T, _index: usize) -> bool {
        (self.0)(item)
    }
}

/// [`Predicate`] which looks at the element and its index.
#[derive(Clone, Copy, Debug)]
pub struct ByPosition<Func>(pub Func);

impl<T, Func> Predicate<T> for ByPosition<Func>
where
    Func: Fn(&T, usize) -> bool,
{
    fn test(&self, item: &T, index: usize) -> bool {
        (self.0)(item, index)
    }
}

/// Same as [`Iterator::filter`] but as an [`Enumerable`].
#[must_use = "enumerables do nothing unless consumed"]
pub struct Filter<E, Pred> {
    upstream: E,
    pred: Pred,
}

impl<E, Pred> Filter<E, Pred> {
    /// Create with `upstream` and predicate `pred`.
    pub fn new(upstream: E, pred: Pred) -> Self {
        Self { upstream, pred }
    }
}

impl<E, Pred> Enumerable for Filter<E, Pred>
where
    E: Enumerable,
    Pred: Predicate<E::Item>,
{
    type Item = E::Item;
    type Iter<'a>
        = FilterStream<E::Iter<'a>, &'a Pred>
    where
        Self: 'a;

    fn iterate(&self) -> Self::Iter<'_> {
        FilterStream {
            stream: self.upstream.iterate(),
            pred: &self.pred,
            index: 0,
        }
    }
}

pin_project! {
    /// Session for [`Filter`].
    #[must_use = "streams do nothing unless polled"]
    pub struct FilterStream<St, Pred> {
        #[pin]
        stream: St,
        pred: Pred,
        index: usize,
    }
}

impl<St, Pred> Stream for FilterStream<St, Pred>
where
    St: Stream,
    Pred: Predicate<St::Item>,
{
    type Item = St::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        while let Some(item) = ready!(this.stream.as_mut().poll_next(cx)) {
            let index = *this.index;
            *this.index += 1;
            if this.pred.test(&item, index) {
                return Poll::Ready(Some(item));
            }
        }
        Poll::Ready(None)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.stream.size_hint().1)
    }
}

/// Filters with an asynchronous predicate, awaiting one element at a time.
#[must_use = "enumerables do nothing unless consumed"]
pub struct FilterAsync<E, Func> {
    upstream: E,
    func: Func,
}

impl<E, Func> FilterAsync<E, Func> {
    /// Create with `upstream` and asynchronous predicate `func`.
    pub fn new(upstream: E, func: Func) -> Self {
        Self { upstream, func }
    }
}

impl<E, Func, Fut> Enumerable for FilterAsync<E, Func>
where
    E: Enumerable,
    Func: Fn(&E::Item) -> Fut,
    Fut: Future<Output = bool>,
{
    type Item = E::Item;
    type Iter<'a>
        = FilterAsyncStream<E::Iter<'a>, &'a Func, Fut>
    where
        Self: 'a;

    fn iterate(&self) -> Self::Iter<'_> {
        FilterAsyncStream {
            stream: self.upstream.iterate(),
            func: &self.func,
            pending: None,
            item: None,
        }
    }
}

pin_project! {
    /// Session for [`FilterAsync`].
    #[must_use = "streams do nothing unless polled"]
    pub struct FilterAsyncStream<St, Func, Fut>
    where
        St: Stream,
    {
        #[pin]
        stream: St,
        func: Func,
        // Verdict for `item`.
        #[pin]
        pending: Option<Fut>,
        item: Option<St::Item>,
    }
}

impl<St, Func, Fut> Stream for FilterAsyncStream<St, Func, Fut>
where
    St: Stream,
    Func: Fn(&St::Item) -> Fut,
    Fut: Future<Output = bool>,
{
    type Item = St::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            if let Some(future) = this.pending.as_mut().as_pin_mut() {
                let keep = ready!(future.poll(cx));
                this.pending.set(None);
                let item = this.item.take();
                if keep && item.is_some() {
                    return Poll::Ready(item);
                }
            }

            let Some(item) = ready!(this.stream.as_mut().poll_next(cx)) else {
                return Poll::Ready(None);
            };
            this.pending.set(Some((this.func)(&item)));
            *this.item = Some(item);
        }
    }
}
