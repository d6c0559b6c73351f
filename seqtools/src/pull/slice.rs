//! Index- and predicate-counted slicing: [`Skip`], [`Take`], [`SkipWhile`], [`TakeWhile`].
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use futures::stream::Stream;
use pin_project_lite::pin_project;

use crate::Enumerable;

/// Skips the first `count` elements.
#[must_use = "enumerables do nothing unless consumed"]
pub struct Skip<E> {
    upstream: E,
    count: usize,
}

impl<E> Skip<E> {
    /// Create with `upstream`, skipping `count` elements.
    pub fn new(upstream: E, count: usize) -> Self {
        Self { upstream, count }
    }
}

impl<E> Enumerable for Skip<E>
where
    E: Enumerable,
{
    type Item = E::Item;
    type Iter<'a>
        = SkipStream<E::Iter<'a>>
    where
        Self: 'a;

    fn iterate(&self) -> Self::Iter<'_> {
        SkipStream {
            stream: self.upstream.iterate(),
            remaining: self.count,
        }
    }
}

pin_project! {
    /// Session for [`Skip`].
    #[must_use = "streams do nothing unless polled"]
    pub struct SkipStream<St> {
        #[pin]
        stream: St,
        remaining: usize,
    }
}

impl<St> Stream for SkipStream<St>
where
    St: Stream,
{
    type Item = St::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        while 0 < *this.remaining {
            if ready!(this.stream.as_mut().poll_next(cx)).is_none() {
                *this.remaining = 0;
                return Poll::Ready(None);
            }
            *this.remaining -= 1;
        }
        this.stream.poll_next(cx)
    }
}

/// Yields at most `count` elements.
#[must_use = "enumerables do nothing unless consumed"]
pub struct Take<E> {
    upstream: E,
    count: usize,
}

impl<E> Take<E> {
    /// Create with `upstream`, taking `count` elements.
    pub fn new(upstream: E, count: usize) -> Self {
        Self { upstream, count }
    }
}

impl<E> Enumerable for Take<E>
where
    E: Enumerable,
{
    type Item = E::Item;
    type Iter<'a>
        = TakeStream<E::Iter<'a>>
    where
        Self: 'a;

    fn iterate(&self) -> Self::Iter<'_> {
        TakeStream {
            stream: self.upstream.iterate(),
            remaining: self.count,
        }
    }
}

pin_project! {
    /// Session for [`Take`]. Never polls upstream once `remaining` hits zero.
    #[must_use = "streams do nothing unless polled"]
    pub struct TakeStream<St> {
        #[pin]
        stream: St,
        remaining: usize,
    }
}

impl<St> Stream for TakeStream<St>
where
    St: Stream,
{
    type Item = St::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();

        if 0 == *this.remaining {
            return Poll::Ready(None);
        }
        let item = ready!(this.stream.poll_next(cx));
        *this.remaining = if item.is_some() {
            *this.remaining - 1
        } else {
            0
        };
        Poll::Ready(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (lower, upper) = self.stream.size_hint();
        let upper = upper.map_or(self.remaining, |upper| upper.min(self.remaining));
        (lower.min(self.remaining), Some(upper))
    }
}

/// Skips elements while the predicate holds.
#[must_use = "enumerables do nothing unless consumed"]
pub struct SkipWhile<E, Func> {
    upstream: E,
    pred: Func,
}

impl<E, Func> SkipWhile<E, Func> {
    /// Create with `upstream` and predicate `pred`.
    pub fn new(upstream: E, pred: Func) -> Self {
        Self { upstream, pred }
    }
}

impl<E, Func> Enumerable for SkipWhile<E, Func>
where
    E: Enumerable,
    Func: Fn(&E::Item) -> bool,
{
    type Item = E::Item;
    type Iter<'a>
        = SkipWhileStream<E::Iter<'a>, &'a Func>
    where
        Self: 'a;

    fn iterate(&self) -> Self::Iter<'_> {
        SkipWhileStream {
            stream: self.upstream.iterate(),
            pred: &self.pred,
            skipping: true,
        }
    }
}

pin_project! {
    /// Session for [`SkipWhile`].
    #[must_use = "streams do nothing unless polled"]
    pub struct SkipWhileStream<St, Func> {
        #[pin]
        stream: St,
        pred: Func,
        skipping: bool,
    }
}

impl<St, Func> Stream for SkipWhileStream<St, Func>
where
    St: Stream,
    Func: Fn(&St::Item) -> bool,
{
    type Item = St::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        while *this.skipping {
            let Some(item) = ready!(this.stream.as_mut().poll_next(cx)) else {
                return Poll::Ready(None);
            };
            if !(this.pred)(&item) {
                *this.skipping = false;
                return Poll::Ready(Some(item));
            }
        }
        this.stream.poll_next(cx)
    }
}

/// Yields elements while the predicate holds.
#[must_use = "enumerables do nothing unless consumed"]
pub struct TakeWhile<E, Func> {
    upstream: E,
    pred: Func,
}

impl<E, Func> TakeWhile<E, Func> {
    /// Create with `upstream` and predicate `pred`.
    pub fn new(upstream: E, pred: Func) -> Self {
        Self { upstream, pred }
    }
}

impl<E, Func> Enumerable for TakeWhile<E, Func>
where
    E: Enumerable,
    Func: Fn(&E::Item) -> bool,
{
    type Item = E::Item;
    type Iter<'a>
        = TakeWhileStream<E::Iter<'a>, &'a Func>
    where
        Self: 'a;

    fn iterate(&self) -> Self::Iter<'_> {
        TakeWhileStream {
            stream: self.upstream.iterate(),
            pred: &self.pred,
            done: false,
        }
    }
}

pin_project! {
    /// Session for [`TakeWhile`].
    #[must_use = "streams do nothing unless polled"]
    pub struct TakeWhileStream<St, Func> {
        #[pin]
        stream: St,
        pred: Func,
        done: bool,
    }
}

impl<St, Func> Stream for TakeWhileStream<St, Func>
where
    St: Stream,
    Func: Fn(&St::Item) -> bool,
{
    type Item = St::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();

        if *this.done {
            return Poll::Ready(None);
        }
        let item = ready!(this.stream.poll_next(cx));
        match item {
            Some(item) if (this.pred)(&item) => Poll::Ready(Some(item)),
            _ => {
                *this.done = true;
                Poll::Ready(None)
            }
        }
    }
}
