//! Hash- and scan-based set operators: [`Except`], [`Intersect`], [`Union`], [`Diff`].
use std::hash::Hash;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use futures::stream::Stream;
use pin_project_lite::pin_project;
use rustc_hash::FxHashSet;

use super::zip::ConcatStream;
use crate::Enumerable;

/// Yields the elements whose key does not occur among the keys of `other`.
///
/// Duplicates on the primary side are kept.
#[must_use = "enumerables do nothing unless consumed"]
pub struct Except<E, O, Func> {
    upstream: E,
    other: O,
    key: Func,
}

impl<E, O, Func> Except<E, O, Func> {
    /// Create with `upstream`, the excluded `other`, and key selector `key`.
    pub fn new(upstream: E, other: O, key: Func) -> Self {
        Self {
            upstream,
            other,
            key,
        }
    }
}

impl<E, O, Func, Key> Enumerable for Except<E, O, Func>
where
    E: Enumerable,
    O: Enumerable<Item = E::Item>,
    Func: Fn(&E::Item) -> Key,
    Key: Eq + Hash,
{
    type Item = E::Item;
    type Iter<'a>
        = ExceptStream<E::Iter<'a>, O::Iter<'a>, &'a Func, Key>
    where
        Self: 'a;

    fn iterate(&self) -> Self::Iter<'_> {
        ExceptStream::new(self.upstream.iterate(), self.other.iterate(), &self.key)
    }
}

pin_project! {
    /// Session for [`Except`].
    ///
    /// Drains `other` into a key set on the first poll, then filters `stream`.
    #[must_use = "streams do nothing unless polled"]
    pub struct ExceptStream<St, Ot, Func, Key> {
        #[pin]
        stream: St,
        #[pin]
        other: Ot,
        key: Func,
        excluded: FxHashSet<Key>,
        other_done: bool,
    }
}

impl<St, Ot, Func, Key> ExceptStream<St, Ot, Func, Key>
where
    St: Stream,
    Ot: Stream<Item = St::Item>,
    Func: Fn(&St::Item) -> Key,
    Key: Eq + Hash,
{
    /// Create with the primary `stream`, the excluded `other` stream, and key selector `key`.
    pub fn new(stream: St, other: Ot, key: Func) -> Self {
        Self {
            stream,
            other,
            key,
            excluded: FxHashSet::default(),
            other_done: false,
        }
    }
}

impl<St, Ot, Func, Key> Stream for ExceptStream<St, Ot, Func, Key>
where
    St: Stream,
    Ot: Stream<Item = St::Item>,
    Func: Fn(&St::Item) -> Key,
    Key: Eq + Hash,
{
    type Item = St::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        if !*this.other_done {
            while let Some(item) = ready!(this.other.as_mut().poll_next(cx)) {
                this.excluded.insert((this.key)(&item));
            }
            *this.other_done = true;
            tracing::trace!(excluded = this.excluded.len(), "Collected excluded keys.");
        }

        while let Some(item) = ready!(this.stream.as_mut().poll_next(cx)) {
            if !this.excluded.contains(&(this.key)(&item)) {
                return Poll::Ready(Some(item));
            }
        }
        Poll::Ready(None)
    }
}

/// Yields each element for which some element of `other` matches.
///
/// `other` is re-iterated from scratch for every primary element, so an element is yielded once
/// per occurrence on the primary side however many times it matches.
#[must_use = "enumerables do nothing unless consumed"]
pub struct Intersect<E, O, Func> {
    upstream: E,
    other: O,
    matches: Func,
}

impl<E, O, Func> Intersect<E, O, Func> {
    /// Create with `upstream`, the scanned `other`, and the `matches` test.
    pub fn new(upstream: E, other: O, matches: Func) -> Self {
        Self {
            upstream,
            other,
            matches,
        }
    }
}

impl<E, O, Func> Enumerable for Intersect<E, O, Func>
where
    E: Enumerable,
    O: Enumerable,
    Func: Fn(&E::Item, &O::Item) -> bool,
{
    type Item = E::Item;
    type Iter<'a>
        = IntersectStream<'a, E::Iter<'a>, O, &'a Func>
    where
        Self: 'a;

    fn iterate(&self) -> Self::Iter<'_> {
        IntersectStream {
            stream: self.upstream.iterate(),
            other: &self.other,
            matches: &self.matches,
            scan: None,
            current: None,
        }
    }
}

pin_project! {
    /// Session for [`Intersect`].
    #[must_use = "streams do nothing unless polled"]
    pub struct IntersectStream<'a, St, O, Func>
    where
        St: Stream,
        O: Enumerable,
    {
        #[pin]
        stream: St,
        other: &'a O,
        matches: Func,
        // Scan of `other` for `current`.
        #[pin]
        scan: Option<O::Iter<'a>>,
        current: Option<St::Item>,
    }
}

impl<'a, St, O, Func> Stream for IntersectStream<'a, St, O, Func>
where
    St: Stream,
    O: Enumerable,
    Func: Fn(&St::Item, &O::Item) -> bool,
{
    type Item = St::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            if let Some(scan) = this.scan.as_mut().as_pin_mut() {
                let candidate = ready!(scan.poll_next(cx));
                let matched = match (&candidate, this.current.as_ref()) {
                    (Some(candidate), Some(current)) => (this.matches)(current, candidate),
                    _ => false,
                };
                if matched {
                    this.scan.set(None);
                    return Poll::Ready(this.current.take());
                }
                if candidate.is_none() {
                    // `other` exhausted without a match.
                    this.scan.set(None);
                    *this.current = None;
                }
                continue;
            }

            let Some(item) = ready!(this.stream.as_mut().poll_next(cx)) else {
                return Poll::Ready(None);
            };
            *this.current = Some(item);
            let other: &'a O = *this.other;
            this.scan.set(Some(other.iterate()));
        }
    }
}

/// `upstream.except(other).concat(other)`.
///
/// Elements of `other` are never deduplicated against each other, only against `upstream`.
#[must_use = "enumerables do nothing unless consumed"]
pub struct Union<E, O, Func> {
    upstream: E,
    other: O,
    key: Func,
}

impl<E, O, Func> Union<E, O, Func> {
    /// Create with `upstream`, `other`, and key selector `key`.
    pub fn new(upstream: E, other: O, key: Func) -> Self {
        Self {
            upstream,
            other,
            key,
        }
    }
}

impl<E, O, Func, Key> Enumerable for Union<E, O, Func>
where
    E: Enumerable,
    O: Enumerable<Item = E::Item>,
    Func: Fn(&E::Item) -> Key,
    Key: Eq + Hash,
{
    type Item = E::Item;
    type Iter<'a>
        = ConcatStream<ExceptStream<E::Iter<'a>, O::Iter<'a>, &'a Func, Key>, O::Iter<'a>>
    where
        Self: 'a;

    fn iterate(&self) -> Self::Iter<'_> {
        ConcatStream::new(
            ExceptStream::new(self.upstream.iterate(), self.other.iterate(), &self.key),
            self.other.iterate(),
        )
    }
}

/// Symmetric difference: `upstream.except(other)` followed by `other.except(upstream)`.
#[must_use = "enumerables do nothing unless consumed"]
pub struct Diff<E, O, Func> {
    upstream: E,
    other: O,
    key: Func,
}

impl<E, O, Func> Diff<E, O, Func> {
    /// Create with `upstream`, `other`, and key selector `key`.
    pub fn new(upstream: E, other: O, key: Func) -> Self {
        Self {
            upstream,
            other,
            key,
        }
    }
}

impl<E, O, Func, Key> Enumerable for Diff<E, O, Func>
where
    E: Enumerable,
    O: Enumerable<Item = E::Item>,
    Func: Fn(&E::Item) -> Key,
    Key: Eq + Hash,
{
    type Item = E::Item;
    type Iter<'a>
        = ConcatStream<
        ExceptStream<E::Iter<'a>, O::Iter<'a>, &'a Func, Key>,
        ExceptStream<O::Iter<'a>, E::Iter<'a>, &'a Func, Key>,
    >
    where
        Self: 'a;

    fn iterate(&self) -> Self::Iter<'_> {
        ConcatStream::new(
            ExceptStream::new(self.upstream.iterate(), self.other.iterate(), &self.key),
            ExceptStream::new(self.other.iterate(), self.upstream.iterate(), &self.key),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use crate::{Enumerable, Terminal, source_iter};

    #[tokio::test]
    async fn test_except_keeps_primary_duplicates() {
        let except = source_iter(vec![1, 2, 2, 3, 1]).except(vec![3, 4]);
        assert_eq!(vec![1, 2, 2, 1], except.to_vec().await);
    }

    #[tokio::test]
    async fn test_except_consumes_other_once() {
        let pulled = Cell::new(0);
        let other = source_iter((3..6).map(|x| {
            pulled.set(pulled.get() + 1);
            x
        }));
        let except = source_iter(vec![1, 2, 3, 4]).except(other);
        assert_eq!(vec![1, 2], except.to_vec().await);
        assert_eq!(3, pulled.get());
    }

    #[tokio::test]
    async fn test_intersect_rescans_other() {
        let scans = Cell::new(0);
        let other = source_iter(vec![3, 3, 4]).map(|x| {
            scans.set(scans.get() + 1);
            x
        });
        let intersect = source_iter(vec![1, 3, 3]).intersect(other);
        assert_eq!(vec![3, 3], intersect.to_vec().await);
        // 3 pulls for `1` (no match), 1 pull for each `3` (first element matches).
        assert_eq!(5, scans.get());
    }

    #[tokio::test]
    async fn test_intersect_by() {
        let names = source_iter(vec!["ann", "bob", "cid"]);
        let ids = source_iter(vec![(2, "bob"), (7, "ann")]);
        let known = names.intersect_by(ids, |name, (_, id_name)| name == id_name);
        assert_eq!(vec!["ann", "bob"], known.to_vec().await);
    }

    #[tokio::test]
    async fn test_union_is_except_then_other() {
        let union = source_iter(vec![1, 3, 2]).union(vec![3, 4, 4]);
        assert_eq!(vec![1, 2, 3, 4, 4], union.to_vec().await);
    }

    #[tokio::test]
    async fn test_diff() {
        let diff = source_iter(vec![1, 2, 3]).diff(vec![3, 4, 5]);
        assert_eq!(vec![1, 2, 4, 5], diff.to_vec().await);
    }

    #[tokio::test]
    async fn test_except_by_key() {
        let people = source_iter(vec![("ann", 31), ("bob", 42), ("cid", 31)]);
        let banned = vec![("zed", 31)];
        let allowed = people.except_by(banned, |(_, age)| *age);
        assert_eq!(vec![("bob", 42)], allowed.to_vec().await);
    }
}
