//! [`Join`] and its session.
use std::hash::Hash;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use futures::stream::Stream;
use pin_project_lite::pin_project;
use rustc_hash::FxHashMap;

use crate::Enumerable;

/// Inner join: pairs each upstream element with every element of `other` sharing its key.
#[must_use = "enumerables do nothing unless consumed"]
pub struct Join<E, O, LeftKey, RightKey> {
    upstream: E,
    other: O,
    left_key: LeftKey,
    right_key: RightKey,
}

impl<E, O, LeftKey, RightKey> Join<E, O, LeftKey, RightKey> {
    /// Create with `upstream`, the `other` side, and a key selector for each side.
    pub fn new(upstream: E, other: O, left_key: LeftKey, right_key: RightKey) -> Self {
        Self {
            upstream,
            other,
            left_key,
            right_key,
        }
    }
}

impl<E, O, LeftKey, RightKey, Key> Enumerable for Join<E, O, LeftKey, RightKey>
where
    E: Enumerable,
    O: Enumerable,
    O::Item: Clone,
    LeftKey: Fn(&E::Item) -> Key,
    RightKey: Fn(&O::Item) -> Key,
    Key: Eq + Hash,
{
    type Item = (E::Item, Vec<O::Item>);
    type Iter<'a>
        = JoinStream<E::Iter<'a>, O::Iter<'a>, &'a LeftKey, &'a RightKey, Key>
    where
        Self: 'a;

    fn iterate(&self) -> Self::Iter<'_> {
        JoinStream {
            stream: self.upstream.iterate(),
            other: self.other.iterate(),
            left_key: &self.left_key,
            right_key: &self.right_key,
            other_done: false,
            lookup: FxHashMap::default(),
        }
    }
}

pin_project! {
    /// Session for [`Join`].
    ///
    /// The `other` side is drained into a lookup on the first poll, before any upstream element
    /// is pulled.
    #[must_use = "streams do nothing unless polled"]
    pub struct JoinStream<St, Ot, LeftKey, RightKey, Key>
    where
        Ot: Stream,
    {
        #[pin]
        stream: St,
        #[pin]
        other: Ot,
        left_key: LeftKey,
        right_key: RightKey,
        other_done: bool,
        lookup: FxHashMap<Key, Vec<Ot::Item>>,
    }
}

impl<St, Ot, LeftKey, RightKey, Key> Stream for JoinStream<St, Ot, LeftKey, RightKey, Key>
where
    St: Stream,
    Ot: Stream,
    Ot::Item: Clone,
    LeftKey: Fn(&St::Item) -> Key,
    RightKey: Fn(&Ot::Item) -> Key,
    Key: Eq + Hash,
{
    type Item = (St::Item, Vec<Ot::Item>);

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        if !*this.other_done {
            while let Some(item) = ready!(this.other.as_mut().poll_next(cx)) {
                this.lookup
                    .entry((this.right_key)(&item))
                    .or_default()
                    .push(item);
            }
            *this.other_done = true;
            tracing::trace!(keys = this.lookup.len(), "Built join lookup.");
        }

        while let Some(item) = ready!(this.stream.as_mut().poll_next(cx)) {
            if let Some(matches) = this.lookup.get(&(this.left_key)(&item)) {
                return Poll::Ready(Some((item, matches.clone())));
            }
        }
        Poll::Ready(None)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Enumerable, Terminal, source_iter};

    #[tokio::test]
    async fn test_join() {
        let people = source_iter(vec![(1, "ann"), (2, "bob"), (3, "cid")]);
        let pets = vec![(1, "cat"), (3, "dog"), (1, "eel")];
        let joined = people
            .join(pets, |(id, _)| *id, |(owner, _)| *owner)
            .map(|((_, name), pets)| {
                (name, pets.into_iter().map(|(_, pet)| pet).collect::<Vec<_>>())
            });
        assert_eq!(
            vec![("ann", vec!["cat", "eel"]), ("cid", vec!["dog"])],
            joined.to_vec().await
        );
    }

    #[tokio::test]
    async fn test_join_eq() {
        let joined = source_iter(vec![1, 2, 3, 2]).join_eq([2, 3, 2, 5]);
        assert_eq!(
            vec![(2, vec![2, 2]), (3, vec![3]), (2, vec![2, 2])],
            joined.to_vec().await
        );
    }

    #[tokio::test]
    async fn test_join_empty_other() {
        let joined = source_iter(vec![1, 2]).join(Vec::<i32>::new(), |x| *x, |x| *x);
        assert_eq!(0, joined.count().await);
    }
}
