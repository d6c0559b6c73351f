//! [`Flatten`], [`FlatMap`], and depth-limited [`FlatDepth`] over [`Nested`] trees.
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use futures::stream::Stream;
use pin_project_lite::pin_project;

use crate::Enumerable;

/// Same as [`Iterator::flatten`] but as an [`Enumerable`].
#[must_use = "enumerables do nothing unless consumed"]
pub struct Flatten<E> {
    upstream: E,
}

impl<E> Flatten<E> {
    /// Create with `upstream`.
    pub fn new(upstream: E) -> Self {
        Self { upstream }
    }
}

impl<E> Enumerable for Flatten<E>
where
    E: Enumerable,
    E::Item: IntoIterator,
{
    type Item = <E::Item as IntoIterator>::Item;
    type Iter<'a>
        = FlattenStream<E::Iter<'a>, <E::Item as IntoIterator>::IntoIter>
    where
        Self: 'a;

    fn iterate(&self) -> Self::Iter<'_> {
        FlattenStream::new(self.upstream.iterate())
    }
}

pin_project! {
    /// Session for [`Flatten`].
    #[must_use = "streams do nothing unless polled"]
    pub struct FlattenStream<St, Iter> {
        #[pin]
        stream: St,
        current_iter: Option<Iter>,
    }
}

impl<St, IntoIter> FlattenStream<St, IntoIter::IntoIter>
where
    St: Stream<Item = IntoIter>,
    IntoIter: IntoIterator,
{
    /// Create with source `stream`.
    pub fn new(stream: St) -> Self {
        Self {
            stream,
            current_iter: None,
        }
    }
}

impl<St, IntoIter> Stream for FlattenStream<St, IntoIter::IntoIter>
where
    St: Stream<Item = IntoIter>,
    IntoIter: IntoIterator,
{
    type Item = IntoIter::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            if let Some(iter) = this.current_iter.as_mut() {
                if let Some(item) = iter.next() {
                    return Poll::Ready(Some(item));
                }
                *this.current_iter = None;
            }

            let Some(iterable) = ready!(this.stream.as_mut().poll_next(cx)) else {
                return Poll::Ready(None);
            };
            *this.current_iter = Some(iterable.into_iter());
        }
    }
}

/// Same as [`Iterator::flat_map`] but as an [`Enumerable`].
#[must_use = "enumerables do nothing unless consumed"]
pub struct FlatMap<E, Func> {
    upstream: E,
    func: Func,
}

impl<E, Func> FlatMap<E, Func> {
    /// Create with `upstream` and flat-mapping `func`.
    pub fn new(upstream: E, func: Func) -> Self {
        Self { upstream, func }
    }
}

impl<E, Func, IntoIter> Enumerable for FlatMap<E, Func>
where
    E: Enumerable,
    Func: Fn(E::Item) -> IntoIter,
    IntoIter: IntoIterator,
{
    type Item = IntoIter::Item;
    type Iter<'a>
        = FlatMapStream<E::Iter<'a>, &'a Func, IntoIter::IntoIter>
    where
        Self: 'a;

    fn iterate(&self) -> Self::Iter<'_> {
        FlatMapStream {
            stream: self.upstream.iterate(),
            func: &self.func,
            current_iter: None,
        }
    }
}

pin_project! {
    /// Session for [`FlatMap`].
    #[must_use = "streams do nothing unless polled"]
    pub struct FlatMapStream<St, Func, Iter> {
        #[pin]
        stream: St,
        func: Func,
        current_iter: Option<Iter>,
    }
}

impl<St, Func, IntoIter> Stream for FlatMapStream<St, Func, IntoIter::IntoIter>
where
    St: Stream,
    Func: Fn(St::Item) -> IntoIter,
    IntoIter: IntoIterator,
{
    type Item = IntoIter::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            if let Some(iter) = this.current_iter.as_mut() {
                if let Some(item) = iter.next() {
                    return Poll::Ready(Some(item));
                }
                *this.current_iter = None;
            }

            let Some(item) = ready!(this.stream.as_mut().poll_next(cx)) else {
                return Poll::Ready(None);
            };
            *this.current_iter = Some((this.func)(item).into_iter());
        }
    }
}

/// An element which is either a plain value or a list of further elements.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Nested<T> {
    /// A plain value.
    Item(T),
    /// A list, expanded by [`Enumerable::flat_depth`] while depth remains.
    List(Vec<Nested<T>>),
}

impl<T> Nested<T> {
    /// Shorthand for [`Nested::Item`].
    pub fn item(value: T) -> Self {
        Self::Item(value)
    }

    /// Builds a [`Nested::List`] from anything convertible into nested elements.
    pub fn list<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Self>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// The plain value, or `None` for a list.
    pub fn into_item(self) -> Option<T> {
        match self {
            Self::Item(value) => Some(value),
            Self::List(_) => None,
        }
    }
}

impl<T> From<T> for Nested<T> {
    fn from(value: T) -> Self {
        Self::Item(value)
    }
}

/// Expands [`Nested::List`] elements up to a fixed depth.
#[must_use = "enumerables do nothing unless consumed"]
pub struct FlatDepth<E> {
    upstream: E,
    depth: usize,
}

impl<E> FlatDepth<E> {
    /// Create with `upstream`, expanding lists at most `depth` levels deep.
    pub fn new(upstream: E, depth: usize) -> Self {
        Self { upstream, depth }
    }
}

impl<E, T> Enumerable for FlatDepth<E>
where
    E: Enumerable<Item = Nested<T>>,
{
    type Item = Nested<T>;
    type Iter<'a>
        = FlatDepthStream<E::Iter<'a>, T>
    where
        Self: 'a;

    fn iterate(&self) -> Self::Iter<'_> {
        FlatDepthStream {
            stream: self.upstream.iterate(),
            depth: self.depth,
            stack: Vec::new(),
        }
    }
}

pin_project! {
    /// Session for [`FlatDepth`]. Keeps one open iterator per expanded level.
    #[must_use = "streams do nothing unless polled"]
    pub struct FlatDepthStream<St, T> {
        #[pin]
        stream: St,
        depth: usize,
        stack: Vec<std::vec::IntoIter<Nested<T>>>,
    }
}

impl<St, T> Stream for FlatDepthStream<St, T>
where
    St: Stream<Item = Nested<T>>,
{
    type Item = Nested<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            let next = if let Some(level) = this.stack.last_mut() {
                let Some(next) = level.next() else {
                    this.stack.pop();
                    continue;
                };
                next
            } else {
                let Some(next) = ready!(this.stream.as_mut().poll_next(cx)) else {
                    return Poll::Ready(None);
                };
                next
            };

            match next {
                Nested::List(items) if this.stack.len() < *this.depth => {
                    this.stack.push(items.into_iter());
                }
                other => return Poll::Ready(Some(other)),
            }
        }
    }
}
