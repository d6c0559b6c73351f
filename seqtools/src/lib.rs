#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]

use std::cmp::Ordering;
use std::hash::Hash;

use futures::stream::Stream;

pub mod error;
pub mod pull;
pub mod source;
mod terminal;

pub use error::{Error, Result};
use pull::chunk::Chunk;
use pull::distinct::Distinct;
use pull::filter::{ByItem, ByPosition, Filter, FilterAsync};
use pull::flatten::{FlatDepth, FlatMap, Flatten, Nested};
use pull::group::GroupBy;
use pull::join::Join;
use pull::map::{Enumerate, Map, MapAsync};
use pull::order::{ByComparator, ByKey, Ordered, Reversed};
use pull::set::{Diff, Except, Intersect, Union};
use pull::slice::{Skip, SkipWhile, Take, TakeWhile};
use pull::zip::{Concat, Zip};
pub use source::{
    source_future, source_iter, source_range, source_range_inclusive, source_range_step,
    source_stream,
};
#[cfg(feature = "blocking")]
#[cfg_attr(docsrs, doc(cfg(feature = "blocking")))]
pub use terminal::Blocking;
pub use terminal::Terminal;

/// Depth used by [`Enumerable::flat_deep`].
pub const FLAT_DEEP_DEPTH: usize = 20;

/// Key selector which clones the element, used by the set operators when no key is given.
pub type IdentityKey<T> = fn(&T) -> T;

/// Matcher which compares elements with [`PartialEq`], used by [`Enumerable::intersect`].
pub type EqMatcher<T> = fn(&T, &T) -> bool;

/// Comparator which compares elements with [`Ord`], used by [`Enumerable::sort`].
pub type OrdComparator<T> = fn(&T, &T) -> Ordering;

fn identity_key<T: Clone>(item: &T) -> T {
    item.clone()
}

/// A lazy, re-iterable sequence.
///
/// The only required operation is [`Self::iterate`], which opens a fresh session over the
/// sequence. Every other method builds a new operator node which owns `self` as its upstream;
/// building a chain never touches the source. Consume a chain with the [`Terminal`] methods.
///
/// Sessions are [`Stream`]s. Iterator-backed sources never return [`Poll::Pending`](std::task::Poll),
/// so the same pipeline serves both synchronous ([`Terminal::blocking`]) and asynchronous
/// consumers.
pub trait Enumerable {
    /// The element type.
    type Item;

    /// The session type returned by [`Self::iterate`].
    type Iter<'a>: Stream<Item = Self::Item>
    where
        Self: 'a;

    /// Opens a fresh session which restarts the whole upstream chain.
    ///
    /// Sessions are independent: each keeps its own cursor state.
    fn iterate(&self) -> Self::Iter<'_>;

    /// Applies `func` to each element.
    fn map<Func, Out>(self, func: Func) -> Map<Self, Func>
    where
        Self: Sized,
        Func: Fn(Self::Item) -> Out,
    {
        Map::new(self, func)
    }

    /// Applies the asynchronous `func` to each element, awaiting each output in element order.
    fn map_async<Func, Fut>(self, func: Func) -> MapAsync<Self, Func>
    where
        Self: Sized,
        Func: Fn(Self::Item) -> Fut,
        Fut: Future,
    {
        MapAsync::new(self, func)
    }

    /// Pairs each element with its zero-based position.
    fn enumerate(self) -> Enumerate<Self>
    where
        Self: Sized,
    {
        Enumerate::new(self)
    }

    /// Keeps the elements for which `pred` returns `true`.
    fn filter<Func>(self, pred: Func) -> Filter<Self, ByItem<Func>>
    where
        Self: Sized,
        Func: Fn(&Self::Item) -> bool,
    {
        Filter::new(self, ByItem(pred))
    }

    /// Keeps the elements for which `pred(item, index)` returns `true`.
    ///
    /// `index` counts every examined element, including the rejected ones.
    fn filter_indexed<Func>(self, pred: Func) -> Filter<Self, ByPosition<Func>>
    where
        Self: Sized,
        Func: Fn(&Self::Item, usize) -> bool,
    {
        Filter::new(self, ByPosition(pred))
    }

    /// Keeps the elements whose asynchronous predicate resolves to `true`.
    fn filter_async<Func, Fut>(self, pred: Func) -> FilterAsync<Self, Func>
    where
        Self: Sized,
        Func: Fn(&Self::Item) -> Fut,
        Fut: Future<Output = bool>,
    {
        FilterAsync::new(self, pred)
    }

    /// Skips the first `count` elements.
    fn skip(self, count: usize) -> Skip<Self>
    where
        Self: Sized,
    {
        Skip::new(self, count)
    }

    /// Yields at most `count` elements, then stops pulling from upstream.
    fn take(self, count: usize) -> Take<Self>
    where
        Self: Sized,
    {
        Take::new(self, count)
    }

    /// Skips elements while `pred` holds. After the first rejection everything passes.
    fn skip_while<Func>(self, pred: Func) -> SkipWhile<Self, Func>
    where
        Self: Sized,
        Func: Fn(&Self::Item) -> bool,
    {
        SkipWhile::new(self, pred)
    }

    /// Yields elements while `pred` holds and stops at the first rejection.
    fn take_while<Func>(self, pred: Func) -> TakeWhile<Self, Func>
    where
        Self: Sized,
        Func: Fn(&Self::Item) -> bool,
    {
        TakeWhile::new(self, pred)
    }

    /// Yields the first occurrence of each element.
    fn distinct(self) -> Distinct<Self, IdentityKey<Self::Item>>
    where
        Self: Sized,
        Self::Item: Clone + Eq + Hash,
    {
        Distinct::new(self, identity_key::<Self::Item> as IdentityKey<Self::Item>)
    }

    /// Yields the first element for each distinct `key`.
    fn distinct_by<Func, Key>(self, key: Func) -> Distinct<Self, Func>
    where
        Self: Sized,
        Func: Fn(&Self::Item) -> Key,
        Key: Eq + Hash,
    {
        Distinct::new(self, key)
    }

    /// Yields the elements which do not occur in `other`, keeping duplicates and order.
    fn except<Other>(
        self,
        other: Other,
    ) -> Except<Self, Other::Enumerable, IdentityKey<Self::Item>>
    where
        Self: Sized,
        Self::Item: Clone + Eq + Hash,
        Other: IntoEnumerable<Item = Self::Item>,
    {
        Except::new(
            self,
            other.into_enumerable(),
            identity_key::<Self::Item> as IdentityKey<Self::Item>,
        )
    }

    /// Yields the elements whose `key` does not occur among the keys of `other`.
    fn except_by<Other, Func, Key>(
        self,
        other: Other,
        key: Func,
    ) -> Except<Self, Other::Enumerable, Func>
    where
        Self: Sized,
        Other: IntoEnumerable<Item = Self::Item>,
        Func: Fn(&Self::Item) -> Key,
        Key: Eq + Hash,
    {
        Except::new(self, other.into_enumerable(), key)
    }

    /// Yields each element which also occurs in `other`.
    ///
    /// `other` is re-iterated for every element of `self`.
    fn intersect<Other>(
        self,
        other: Other,
    ) -> Intersect<Self, Other::Enumerable, EqMatcher<Self::Item>>
    where
        Self: Sized,
        Self::Item: PartialEq,
        Other: IntoEnumerable<Item = Self::Item>,
    {
        Intersect::new(
            self,
            other.into_enumerable(),
            <Self::Item as PartialEq>::eq as EqMatcher<Self::Item>,
        )
    }

    /// Yields each element for which `matches` accepts some element of `other`.
    fn intersect_by<Other, Func>(
        self,
        other: Other,
        matches: Func,
    ) -> Intersect<Self, Other::Enumerable, Func>
    where
        Self: Sized,
        Other: IntoEnumerable,
        Func: Fn(&Self::Item, &Other::Item) -> bool,
    {
        Intersect::new(self, other.into_enumerable(), matches)
    }

    /// `self.except(other).concat(other)`.
    fn union<Other>(self, other: Other) -> Union<Self, Other::Enumerable, IdentityKey<Self::Item>>
    where
        Self: Sized,
        Self::Item: Clone + Eq + Hash,
        Other: IntoEnumerable<Item = Self::Item>,
    {
        Union::new(
            self,
            other.into_enumerable(),
            identity_key::<Self::Item> as IdentityKey<Self::Item>,
        )
    }

    /// [`Self::union`] comparing elements by `key`.
    fn union_by<Other, Func, Key>(
        self,
        other: Other,
        key: Func,
    ) -> Union<Self, Other::Enumerable, Func>
    where
        Self: Sized,
        Other: IntoEnumerable<Item = Self::Item>,
        Func: Fn(&Self::Item) -> Key,
        Key: Eq + Hash,
    {
        Union::new(self, other.into_enumerable(), key)
    }

    /// Symmetric difference: `self.except(other)` followed by `other.except(self)`.
    fn diff<Other>(self, other: Other) -> Diff<Self, Other::Enumerable, IdentityKey<Self::Item>>
    where
        Self: Sized,
        Self::Item: Clone + Eq + Hash,
        Other: IntoEnumerable<Item = Self::Item>,
    {
        Diff::new(
            self,
            other.into_enumerable(),
            identity_key::<Self::Item> as IdentityKey<Self::Item>,
        )
    }

    /// [`Self::diff`] comparing elements by `key`.
    fn diff_by<Other, Func, Key>(self, other: Other, key: Func) -> Diff<Self, Other::Enumerable, Func>
    where
        Self: Sized,
        Other: IntoEnumerable<Item = Self::Item>,
        Func: Fn(&Self::Item) -> Key,
        Key: Eq + Hash,
    {
        Diff::new(self, other.into_enumerable(), key)
    }

    /// Stably sorts by `key`, ascending.
    fn order_by<Func, Key>(self, key: Func) -> Ordered<Self, ByKey<Func>>
    where
        Self: Sized,
        Func: Fn(&Self::Item) -> Key,
        Key: PartialOrd,
    {
        Ordered::new(self, ByKey::ascending(key))
    }

    /// Stably sorts by `key`, descending. Equal keys keep their input order.
    fn order_by_desc<Func, Key>(self, key: Func) -> Ordered<Self, ByKey<Func>>
    where
        Self: Sized,
        Func: Fn(&Self::Item) -> Key,
        Key: PartialOrd,
    {
        Ordered::new(self, ByKey::descending(key))
    }

    /// Stably sorts by the elements' [`Ord`] implementation.
    fn sort(self) -> Ordered<Self, ByComparator<OrdComparator<Self::Item>>>
    where
        Self: Sized,
        Self::Item: Ord,
    {
        Ordered::new(
            self,
            ByComparator(<Self::Item as Ord>::cmp as OrdComparator<Self::Item>),
        )
    }

    /// Stably sorts with `compare`.
    fn sort_by<Func>(self, compare: Func) -> Ordered<Self, ByComparator<Func>>
    where
        Self: Sized,
        Func: Fn(&Self::Item, &Self::Item) -> Ordering,
    {
        Ordered::new(self, ByComparator(compare))
    }

    /// Yields the elements in reverse order.
    fn reverse(self) -> Ordered<Self, Reversed>
    where
        Self: Sized,
    {
        Ordered::new(self, Reversed)
    }

    /// Groups adjacent elements sharing the same `key`.
    ///
    /// Only runs of adjacent elements are grouped, in a single pass. The caller must cluster the
    /// input, typically with [`Self::order_by`] on the same key. Non-adjacent repeats of a key
    /// produce separate groups.
    fn group_by<Func, Key>(self, key: Func) -> GroupBy<Self, Func>
    where
        Self: Sized,
        Func: Fn(&Self::Item) -> Key,
        Key: PartialEq,
    {
        GroupBy::new(self, key)
    }

    /// Flattens elements which are themselves iterable, one level deep.
    fn flat(self) -> Flatten<Self>
    where
        Self: Sized,
        Self::Item: IntoIterator,
    {
        Flatten::new(self)
    }

    /// Maps each element to an iterable and flattens the results.
    fn flat_map<Func, IntoIter>(self, func: Func) -> FlatMap<Self, Func>
    where
        Self: Sized,
        Func: Fn(Self::Item) -> IntoIter,
        IntoIter: IntoIterator,
    {
        FlatMap::new(self, func)
    }

    /// Expands [`Nested::List`] elements up to `depth` levels deep.
    fn flat_depth<T>(self, depth: usize) -> FlatDepth<Self>
    where
        Self: Sized + Enumerable<Item = Nested<T>>,
    {
        FlatDepth::new(self, depth)
    }

    /// [`Self::flat_depth`] with [`FLAT_DEEP_DEPTH`].
    fn flat_deep<T>(self) -> FlatDepth<Self>
    where
        Self: Sized + Enumerable<Item = Nested<T>>,
    {
        FlatDepth::new(self, FLAT_DEEP_DEPTH)
    }

    /// Yields consecutive chunks of `size` elements. The last chunk may be shorter.
    ///
    /// Fails with [`Error::InvalidArgument`] if `size` is zero.
    fn chunk(self, size: usize) -> Result<Chunk<Self>>
    where
        Self: Sized,
    {
        Chunk::new(self, size)
    }

    /// Pairs up elements of `self` and `other`, stopping when either runs out.
    fn zip<Other>(self, other: Other) -> Zip<Self, Other::Enumerable>
    where
        Self: Sized,
        Other: IntoEnumerable,
    {
        Zip::new(self, other.into_enumerable())
    }

    /// Yields all of `self`, then all of `other`.
    fn concat<Other>(self, other: Other) -> Concat<Self, Other::Enumerable>
    where
        Self: Sized,
        Other: IntoEnumerable<Item = Self::Item>,
    {
        Concat::new(self, other.into_enumerable())
    }

    /// Inner join: yields each element with all the elements of `other` sharing its key.
    ///
    /// Elements without any match are dropped.
    fn join<Other, LeftKey, RightKey, Key>(
        self,
        other: Other,
        left_key: LeftKey,
        right_key: RightKey,
    ) -> Join<Self, Other::Enumerable, LeftKey, RightKey>
    where
        Self: Sized,
        Other: IntoEnumerable,
        Other::Item: Clone,
        LeftKey: Fn(&Self::Item) -> Key,
        RightKey: Fn(&Other::Item) -> Key,
        Key: Eq + Hash,
    {
        Join::new(self, other.into_enumerable(), left_key, right_key)
    }

    /// [`Self::join`] keyed by the elements themselves.
    fn join_eq<Other>(
        self,
        other: Other,
    ) -> Join<Self, Other::Enumerable, IdentityKey<Self::Item>, IdentityKey<Self::Item>>
    where
        Self: Sized,
        Self::Item: Clone + Eq + Hash,
        Other: IntoEnumerable<Item = Self::Item>,
    {
        Join::new(
            self,
            other.into_enumerable(),
            identity_key::<Self::Item> as IdentityKey<Self::Item>,
            identity_key::<Self::Item> as IdentityKey<Self::Item>,
        )
    }
}

impl<E> Enumerable for &E
where
    E: Enumerable + ?Sized,
{
    type Item = E::Item;
    type Iter<'a>
        = E::Iter<'a>
    where
        Self: 'a;

    fn iterate(&self) -> Self::Iter<'_> {
        (**self).iterate()
    }
}

/// Conversion into an [`Enumerable`], accepted by the binary operators.
pub trait IntoEnumerable {
    /// The element type.
    type Item;
    /// The resulting [`Enumerable`].
    type Enumerable: Enumerable<Item = Self::Item>;

    /// Performs the conversion.
    fn into_enumerable(self) -> Self::Enumerable;
}

impl<E> IntoEnumerable for E
where
    E: Enumerable,
{
    type Item = E::Item;
    type Enumerable = E;

    fn into_enumerable(self) -> Self::Enumerable {
        self
    }
}

impl<T> IntoEnumerable for Vec<T>
where
    T: Clone,
{
    type Item = T;
    type Enumerable = source::IterSource<Vec<T>>;

    fn into_enumerable(self) -> Self::Enumerable {
        source::IterSource::new(self)
    }
}

impl<T, const N: usize> IntoEnumerable for [T; N]
where
    T: Clone,
{
    type Item = T;
    type Enumerable = source::IterSource<[T; N]>;

    fn into_enumerable(self) -> Self::Enumerable {
        source::IterSource::new(self)
    }
}

/// Convenience re-exports of the traits needed to build and consume pipelines.
pub mod prelude {
    pub use crate::pull::flatten::Nested;
    pub use crate::pull::group::Group;
    pub use crate::{
        Enumerable, IntoEnumerable, Terminal, source_future, source_iter, source_range,
        source_range_inclusive, source_range_step, source_stream,
    };
}
