//! [`GroupBy`] and the [`Group`]s it yields.
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use futures::stream::{self, Stream};
use pin_project_lite::pin_project;

use crate::Enumerable;
use crate::source::IterSource;

/// A run of adjacent elements sharing `key`.
///
/// A group is itself [`Enumerable`] (when its elements are [`Clone`]), so further operators can
/// be chained onto it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Group<K, T> {
    /// The key shared by every element of the group.
    pub key: K,
    items: Vec<T>,
}

impl<K, T> Group<K, T> {
    pub(crate) fn new(key: K, first: T) -> Self {
        Self {
            key,
            items: vec![first],
        }
    }

    /// Number of elements in the group. Never zero.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the group has no elements, which never happens for groups built by
    /// [`Enumerable::group_by`].
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Borrowing iterator over the elements, in input order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// The elements, in input order.
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Consumes the group into a standalone [`Enumerable`] over its elements.
    pub fn into_query(self) -> IterSource<Vec<T>>
    where
        T: Clone,
    {
        IterSource::new(self.items)
    }
}

impl<K, T> IntoIterator for Group<K, T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, K, T> IntoIterator for &'a Group<K, T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<K, T> Enumerable for Group<K, T>
where
    T: Clone,
{
    type Item = T;
    type Iter<'a>
        = stream::Iter<std::iter::Cloned<std::slice::Iter<'a, T>>>
    where
        Self: 'a;

    fn iterate(&self) -> Self::Iter<'_> {
        stream::iter(self.items.iter().cloned())
    }
}

/// Groups runs of adjacent elements by key.
#[must_use = "enumerables do nothing unless consumed"]
pub struct GroupBy<E, Func> {
    upstream: E,
    key: Func,
}

impl<E, Func> GroupBy<E, Func> {
    /// Create with `upstream` and key selector `key`.
    pub fn new(upstream: E, key: Func) -> Self {
        Self { upstream, key }
    }
}

impl<E, Func, Key> Enumerable for GroupBy<E, Func>
where
    E: Enumerable,
    Func: Fn(&E::Item) -> Key,
    Key: PartialEq,
{
    type Item = Group<Key, E::Item>;
    type Iter<'a>
        = GroupByStream<E::Iter<'a>, &'a Func, Key>
    where
        Self: 'a;

    fn iterate(&self) -> Self::Iter<'_> {
        GroupByStream {
            stream: self.upstream.iterate(),
            key: &self.key,
            current: None,
            done: false,
        }
    }
}

pin_project! {
    /// Session for [`GroupBy`]. Holds at most one open group.
    #[must_use = "streams do nothing unless polled"]
    pub struct GroupByStream<St, Func, Key>
    where
        St: Stream,
    {
        #[pin]
        stream: St,
        key: Func,
        current: Option<Group<Key, St::Item>>,
        done: bool,
    }
}

impl<St, Func, Key> Stream for GroupByStream<St, Func, Key>
where
    St: Stream,
    Func: Fn(&St::Item) -> Key,
    Key: PartialEq,
{
    type Item = Group<Key, St::Item>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        while !*this.done {
            let Some(item) = ready!(this.stream.as_mut().poll_next(cx)) else {
                *this.done = true;
                break;
            };
            let key = (this.key)(&item);
            if let Some(group) = this.current.as_mut()
                && group.key == key
            {
                group.items.push(item);
                continue;
            }
            // Key changed, close the open group.
            if let Some(closed) = this.current.replace(Group::new(key, item)) {
                return Poll::Ready(Some(closed));
            }
        }
        Poll::Ready(this.current.take())
    }
}

#[cfg(test)]
mod tests {
    use crate::{Enumerable, Terminal, source_iter};

    #[tokio::test]
    async fn test_group_sorted_input() {
        let rows = source_iter(vec![('a', 10), ('b', 5), ('a', 20), ('c', 1)]);
        let groups = rows.order_by(|(k, _)| *k).group_by(|(k, _)| *k);
        let groups = groups.to_vec().await;

        assert_eq!(
            vec!['a', 'b', 'c'],
            groups.iter().map(|g| g.key).collect::<Vec<_>>()
        );
        let total = groups[0].clone().map(|(_, v)| v).sum().await;
        assert_eq!(30, total);
        assert_eq!(2, groups[0].len());
    }

    #[tokio::test]
    async fn test_group_only_adjacent() {
        let groups = source_iter(vec![1, 1, 2, 1]).group_by(|x| *x).to_vec().await;
        assert_eq!(
            vec![vec![1, 1], vec![2], vec![1]],
            groups
                .into_iter()
                .map(|g| g.into_items())
                .collect::<Vec<_>>()
        );
    }

    #[tokio::test]
    async fn test_group_empty() {
        let groups = source_iter(Vec::<i32>::new()).group_by(|x| *x % 2);
        assert_eq!(0, groups.count().await);
    }

    #[tokio::test]
    async fn test_group_into_query() {
        let mut groups = source_iter(vec!["ab", "ac", "b"])
            .group_by(|w| w.chars().next())
            .to_vec()
            .await;
        let first = groups.remove(0);
        assert_eq!(Some('a'), first.key);
        let upper = first.into_query().map(|w| w.to_uppercase());
        assert_eq!(vec!["AB", "AC"], upper.to_vec().await);
    }
}
