//! [`Distinct`] and its session.
use std::hash::Hash;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use futures::stream::Stream;
use pin_project_lite::pin_project;
use rustc_hash::FxHashSet;

use crate::Enumerable;

/// Yields the first element for each distinct key, in order of first occurrence.
#[must_use = "enumerables do nothing unless consumed"]
pub struct Distinct<E, Func> {
    upstream: E,
    key: Func,
}

impl<E, Func> Distinct<E, Func> {
    /// Create with `upstream` and key selector `key`.
    pub fn new(upstream: E, key: Func) -> Self {
        Self { upstream, key }
    }
}

impl<E, Func, Key> Enumerable for Distinct<E, Func>
where
    E: Enumerable,
    Func: Fn(&E::Item) -> Key,
    Key: Eq + Hash,
{
    type Item = E::Item;
    type Iter<'a>
        = DistinctStream<E::Iter<'a>, &'a Func, Key>
    where
        Self: 'a;

    fn iterate(&self) -> Self::Iter<'_> {
        DistinctStream {
            stream: self.upstream.iterate(),
            key: &self.key,
            seen: FxHashSet::default(),
        }
    }
}

pin_project! {
    /// Session for [`Distinct`]. Buffers only the keys seen so far.
    #[must_use = "streams do nothing unless polled"]
    pub struct DistinctStream<St, Func, Key> {
        #[pin]
        stream: St,
        key: Func,
        seen: FxHashSet<Key>,
    }
}

impl<St, Func, Key> Stream for DistinctStream<St, Func, Key>
where
    St: Stream,
    Func: Fn(&St::Item) -> Key,
    Key: Eq + Hash,
{
    type Item = St::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        while let Some(item) = ready!(this.stream.as_mut().poll_next(cx)) {
            if this.seen.insert((this.key)(&item)) {
                return Poll::Ready(Some(item));
            }
        }
        Poll::Ready(None)
    }
}
