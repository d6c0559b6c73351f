//! [`Terminal`] operations which consume a sequence, and the synchronous [`Blocking`] front.
use std::ops::Add;
use std::pin::pin;

use futures::StreamExt;

use crate::Enumerable;

/// Eager consumers of an [`Enumerable`].
///
/// Each call opens exactly one session and drives it only as far as needed. The returned futures
/// borrow the sequence, which can be consumed again afterwards.
///
/// Implemented for every [`Enumerable`].
pub trait Terminal: Enumerable {
    /// Collects all elements into a [`Vec`].
    fn to_vec(&self) -> impl Future<Output = Vec<Self::Item>> {
        async move { self.iterate().collect().await }
    }

    /// Collects the [`Ok`] values, stopping at and returning the first [`Err`].
    fn try_to_vec<T, Er>(&self) -> impl Future<Output = Result<Vec<T>, Er>>
    where
        Self: Enumerable<Item = Result<T, Er>>,
    {
        async move {
            let mut session = pin!(self.iterate());
            let mut out = Vec::new();
            while let Some(item) = session.next().await {
                out.push(item?);
            }
            Ok(out)
        }
    }

    /// Number of elements.
    fn count(&self) -> impl Future<Output = usize> {
        self.fold(0, |count, _| count + 1)
    }

    /// Adds up all elements, starting from [`Default::default`].
    fn sum(&self) -> impl Future<Output = Self::Item>
    where
        Self::Item: Default + Add<Output = Self::Item>,
    {
        self.fold(Default::default(), |acc, item| acc + item)
    }

    /// Adds up `func` of each element, starting from [`Default::default`].
    fn sum_by<Func, Out>(&self, func: Func) -> impl Future<Output = Out>
    where
        Func: Fn(Self::Item) -> Out,
        Out: Default + Add<Output = Out>,
    {
        self.fold(Out::default(), move |acc, item| acc + func(item))
    }

    /// Combines the elements pairwise with `func`, seeded with the first element.
    ///
    /// Returns `None` for an empty sequence.
    fn reduce<Func>(&self, mut func: Func) -> impl Future<Output = Option<Self::Item>>
    where
        Func: FnMut(Self::Item, Self::Item) -> Self::Item,
    {
        async move {
            let mut session = pin!(self.iterate());
            let mut acc = session.next().await?;
            while let Some(item) = session.next().await {
                acc = func(acc, item);
            }
            Some(acc)
        }
    }

    /// Folds the elements into `init` with `func`.
    fn fold<Acc, Func>(&self, init: Acc, mut func: Func) -> impl Future<Output = Acc>
    where
        Func: FnMut(Acc, Self::Item) -> Acc,
    {
        async move {
            let mut session = pin!(self.iterate());
            let mut acc = init;
            while let Some(item) = session.next().await {
                acc = func(acc, item);
            }
            acc
        }
    }

    /// The first element. Pulls at most one element.
    fn first(&self) -> impl Future<Output = Option<Self::Item>> {
        async move {
            let mut session = pin!(self.iterate());
            session.next().await
        }
    }

    /// The first element, or `default` if the sequence is empty.
    fn first_or(&self, default: Self::Item) -> impl Future<Output = Self::Item> {
        async move { self.first().await.unwrap_or(default) }
    }

    /// The last element.
    fn last(&self) -> impl Future<Output = Option<Self::Item>> {
        self.fold(None, |_, item| Some(item))
    }

    /// The last element, or `default` if the sequence is empty.
    fn last_or(&self, default: Self::Item) -> impl Future<Output = Self::Item> {
        async move { self.last().await.unwrap_or(default) }
    }

    /// `true` if the sequence has at least one element.
    fn any(&self) -> impl Future<Output = bool> {
        async move { self.first().await.is_some() }
    }

    /// `true` if `pred` holds for some element. Stops at the first match.
    fn some<Func>(&self, pred: Func) -> impl Future<Output = bool>
    where
        Func: Fn(&Self::Item) -> bool,
    {
        async move { self.find(pred).await.is_some() }
    }

    /// The first element for which `pred` holds.
    fn find<Func>(&self, pred: Func) -> impl Future<Output = Option<Self::Item>>
    where
        Func: Fn(&Self::Item) -> bool,
    {
        async move {
            let mut session = pin!(self.iterate());
            while let Some(item) = session.next().await {
                if pred(&item) {
                    return Some(item);
                }
            }
            None
        }
    }

    /// `true` if some element equals `value`.
    fn includes(&self, value: &Self::Item) -> impl Future<Output = bool>
    where
        Self::Item: PartialEq,
    {
        self.includes_by(value, <Self::Item as PartialEq>::eq)
    }

    /// `true` if `matches(element, value)` holds for some element.
    fn includes_by<Func>(&self, value: &Self::Item, matches: Func) -> impl Future<Output = bool>
    where
        Func: Fn(&Self::Item, &Self::Item) -> bool,
    {
        self.some(move |item| matches(item, value))
    }

    /// Calls `func` with each element and its position.
    fn for_each<Func>(&self, mut func: Func) -> impl Future<Output = ()>
    where
        Func: FnMut(Self::Item, usize),
    {
        async move {
            let mut session = pin!(self.iterate());
            let mut index = 0;
            while let Some(item) = session.next().await {
                func(item, index);
                index += 1;
            }
        }
    }

    /// Calls the asynchronous `func` with each element and its position, awaiting each call
    /// before pulling the next element.
    fn for_each_async<Func, Fut>(&self, mut func: Func) -> impl Future<Output = ()>
    where
        Func: FnMut(Self::Item, usize) -> Fut,
        Fut: Future<Output = ()>,
    {
        async move {
            let mut session = pin!(self.iterate());
            let mut index = 0;
            while let Some(item) = session.next().await {
                func(item, index).await;
                index += 1;
            }
        }
    }

    /// Synchronous front which runs each terminal operation to completion on this thread.
    #[cfg(feature = "blocking")]
    #[cfg_attr(docsrs, doc(cfg(feature = "blocking")))]
    fn blocking(&self) -> Blocking<'_, Self> {
        Blocking { inner: self }
    }
}

impl<E> Terminal for E where E: Enumerable + ?Sized {}

/// Synchronous mirror of [`Terminal`], returned by [`Terminal::blocking`].
///
/// Sessions are driven with [`futures::executor::block_on`]. Sequences over iterators never
/// suspend, so this never parks the thread for them.
#[cfg(feature = "blocking")]
#[cfg_attr(docsrs, doc(cfg(feature = "blocking")))]
#[derive(Debug)]
pub struct Blocking<'a, E: ?Sized> {
    inner: &'a E,
}

#[cfg(feature = "blocking")]
impl<E: ?Sized> Clone for Blocking<'_, E> {
    fn clone(&self) -> Self {
        *self
    }
}

#[cfg(feature = "blocking")]
impl<E: ?Sized> Copy for Blocking<'_, E> {}

#[cfg(feature = "blocking")]
impl<E> Blocking<'_, E>
where
    E: Enumerable + ?Sized,
{
    /// See [`Terminal::to_vec`].
    pub fn to_vec(self) -> Vec<E::Item> {
        futures::executor::block_on(self.inner.to_vec())
    }

    /// See [`Terminal::try_to_vec`].
    pub fn try_to_vec<T, Er>(self) -> Result<Vec<T>, Er>
    where
        E: Enumerable<Item = Result<T, Er>>,
    {
        futures::executor::block_on(self.inner.try_to_vec())
    }

    /// See [`Terminal::count`].
    pub fn count(self) -> usize {
        futures::executor::block_on(self.inner.count())
    }

    /// See [`Terminal::sum`].
    pub fn sum(self) -> E::Item
    where
        E::Item: Default + Add<Output = E::Item>,
    {
        futures::executor::block_on(self.inner.sum())
    }

    /// See [`Terminal::sum_by`].
    pub fn sum_by<Func, Out>(self, func: Func) -> Out
    where
        Func: Fn(E::Item) -> Out,
        Out: Default + Add<Output = Out>,
    {
        futures::executor::block_on(self.inner.sum_by(func))
    }

    /// See [`Terminal::reduce`].
    pub fn reduce<Func>(self, func: Func) -> Option<E::Item>
    where
        Func: FnMut(E::Item, E::Item) -> E::Item,
    {
        futures::executor::block_on(self.inner.reduce(func))
    }

    /// See [`Terminal::fold`].
    pub fn fold<Acc, Func>(self, init: Acc, func: Func) -> Acc
    where
        Func: FnMut(Acc, E::Item) -> Acc,
    {
        futures::executor::block_on(self.inner.fold(init, func))
    }

    /// See [`Terminal::first`].
    pub fn first(self) -> Option<E::Item> {
        futures::executor::block_on(self.inner.first())
    }

    /// See [`Terminal::first_or`].
    pub fn first_or(self, default: E::Item) -> E::Item {
        futures::executor::block_on(self.inner.first_or(default))
    }

    /// See [`Terminal::last`].
    pub fn last(self) -> Option<E::Item> {
        futures::executor::block_on(self.inner.last())
    }

    /// See [`Terminal::last_or`].
    pub fn last_or(self, default: E::Item) -> E::Item {
        futures::executor::block_on(self.inner.last_or(default))
    }

    /// See [`Terminal::any`].
    pub fn any(self) -> bool {
        futures::executor::block_on(self.inner.any())
    }

    /// See [`Terminal::some`].
    pub fn some<Func>(self, pred: Func) -> bool
    where
        Func: Fn(&E::Item) -> bool,
    {
        futures::executor::block_on(self.inner.some(pred))
    }

    /// See [`Terminal::find`].
    pub fn find<Func>(self, pred: Func) -> Option<E::Item>
    where
        Func: Fn(&E::Item) -> bool,
    {
        futures::executor::block_on(self.inner.find(pred))
    }

    /// See [`Terminal::includes`].
    pub fn includes(self, value: &E::Item) -> bool
    where
        E::Item: PartialEq,
    {
        futures::executor::block_on(self.inner.includes(value))
    }

    /// See [`Terminal::includes_by`].
    pub fn includes_by<Func>(self, value: &E::Item, matches: Func) -> bool
    where
        Func: Fn(&E::Item, &E::Item) -> bool,
    {
        futures::executor::block_on(self.inner.includes_by(value, matches))
    }

    /// See [`Terminal::for_each`].
    pub fn for_each<Func>(self, func: Func)
    where
        Func: FnMut(E::Item, usize),
    {
        futures::executor::block_on(self.inner.for_each(func))
    }

    /// See [`Terminal::for_each_async`].
    pub fn for_each_async<Func, Fut>(self, func: Func)
    where
        Func: FnMut(E::Item, usize) -> Fut,
        Fut: Future<Output = ()>,
    {
        futures::executor::block_on(self.inner.for_each_async(func))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use futures::stream::{self, StreamExt};

    use crate::{Enumerable, Terminal, source_iter, source_stream};

    #[tokio::test]
    async fn test_folds() {
        let numbers = source_iter(vec![1, 2, 3, 4]);
        assert_eq!(10, numbers.sum().await);
        assert_eq!(20, numbers.sum_by(|x| x * 2).await);
        assert_eq!(Some(24), numbers.reduce(|a, b| a * b).await);
        assert_eq!("1234", numbers.fold(String::new(), |s, x| s + &x.to_string()).await);
        assert_eq!(4, numbers.count().await);
    }

    #[tokio::test]
    async fn test_empty() {
        let empty = source_iter(Vec::<i32>::new());
        assert_eq!(None, empty.reduce(|a, b| a + b).await);
        assert_eq!(None, empty.first().await);
        assert_eq!(None, empty.last().await);
        assert_eq!(7, empty.first_or(7).await);
        assert_eq!(8, empty.last_or(8).await);
        assert!(!empty.any().await);
        assert_eq!(0, empty.sum().await);
    }

    #[tokio::test]
    async fn test_first_and_last() {
        let numbers = source_iter([5, 6, 7]);
        assert_eq!(Some(5), numbers.first().await);
        assert_eq!(Some(7), numbers.last().await);
        assert_eq!(5, numbers.first_or(0).await);
        assert_eq!(7, numbers.last_or(0).await);
    }

    #[tokio::test]
    async fn test_short_circuit() {
        let pulled = Cell::new(0);
        let numbers = source_iter((1..=5).map(|x| {
            pulled.set(pulled.get() + 1);
            x
        }));

        assert_eq!(Some(1), numbers.first().await);
        assert_eq!(1, pulled.replace(0));

        assert!(numbers.any().await);
        assert_eq!(1, pulled.replace(0));

        assert_eq!(Some(2), numbers.find(|x| x % 2 == 0).await);
        assert_eq!(2, pulled.replace(0));

        assert!(numbers.some(|x| *x == 3).await);
        assert_eq!(3, pulled.replace(0));

        assert!(numbers.includes(&4).await);
        assert_eq!(4, pulled.replace(0));

        assert!(!numbers.includes(&9).await);
        assert_eq!(5, pulled.replace(0));
    }

    #[tokio::test]
    async fn test_includes_by() {
        let words = source_iter(["Apple", "pear"]);
        assert!(
            words
                .includes_by(&"apple", |a, b| a.eq_ignore_ascii_case(b))
                .await
        );
    }

    #[tokio::test]
    async fn test_try_to_vec() {
        let ok = source_iter(vec![Ok::<_, String>(1), Ok(2)]);
        assert_eq!(Ok(vec![1, 2]), ok.try_to_vec().await);

        let pulled = Cell::new(0);
        let failing = source_iter(vec![Ok(1), Err("bad"), Ok(3)]).map(|item| {
            pulled.set(pulled.get() + 1);
            item
        });
        assert_eq!(Err("bad"), failing.try_to_vec().await);
        assert_eq!(2, pulled.get());
    }

    #[tokio::test]
    async fn test_for_each() {
        let mut seen = Vec::new();
        source_iter(vec!['a', 'b'])
            .for_each(|item, index| seen.push((index, item)))
            .await;
        assert_eq!(vec![(0, 'a'), (1, 'b')], seen);
    }

    #[tokio::test]
    async fn test_for_each_async() {
        let seen = Cell::new(0);
        let cell = &seen;
        let source = source_stream(|| stream::iter(1..=3).then(|x| async move { x }));
        source
            .for_each_async(move |item, _| async move {
                tokio::task::yield_now().await;
                cell.set(cell.get() * 10 + item);
            })
            .await;
        assert_eq!(123, seen.get());
    }

    #[cfg(feature = "blocking")]
    #[test]
    fn test_blocking() {
        let numbers = source_iter(vec![3, 1, 2]);
        let blocking = numbers.blocking();
        assert_eq!(vec![3, 1, 2], blocking.to_vec());
        assert_eq!(3, blocking.count());
        assert_eq!(6, blocking.sum());
        assert_eq!(Some(2), blocking.last());
        assert!(blocking.includes(&1));
        assert_eq!(vec![1, 2, 3], numbers.sort().blocking().to_vec());
    }
}
