//! Source adapters which turn iterators, streams, and futures into [`Enumerable`]s.
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use futures::stream::{self, Stream};
use pin_project_lite::pin_project;

use crate::{Enumerable, Error, Result};

/// [`Enumerable`] over a cloneable [`IntoIterator`].
///
/// Each session iterates a fresh clone, so the source is never consumed.
#[must_use = "enumerables do nothing unless consumed"]
#[derive(Clone, Debug)]
pub struct IterSource<I> {
    iter: I,
}

impl<I> IterSource<I> {
    /// Create from a cloneable `iter`.
    pub fn new(iter: I) -> Self {
        Self { iter }
    }
}

impl<I> Enumerable for IterSource<I>
where
    I: IntoIterator + Clone,
{
    type Item = I::Item;
    type Iter<'a>
        = stream::Iter<I::IntoIter>
    where
        Self: 'a;

    fn iterate(&self) -> Self::Iter<'_> {
        stream::iter(self.iter.clone())
    }
}

/// [`Enumerable`] over the [`Stream`]s returned by a factory function.
///
/// The factory is called once per session.
#[must_use = "enumerables do nothing unless consumed"]
pub struct StreamSource<Func> {
    func: Func,
}

impl<Func> StreamSource<Func> {
    /// Create from the stream factory `func`.
    pub fn new(func: Func) -> Self {
        Self { func }
    }
}

impl<Func, St> Enumerable for StreamSource<Func>
where
    Func: Fn() -> St,
    St: Stream,
{
    type Item = St::Item;
    type Iter<'a>
        = St
    where
        Self: 'a;

    fn iterate(&self) -> Self::Iter<'_> {
        (self.func)()
    }
}

/// [`Enumerable`] over a [`Future`] which resolves to an iterable.
///
/// Each session calls the factory, awaits its future, then yields the resolved elements.
#[must_use = "enumerables do nothing unless consumed"]
pub struct FutureSource<Func> {
    func: Func,
}

impl<Func> FutureSource<Func> {
    /// Create from the future factory `func`.
    pub fn new(func: Func) -> Self {
        Self { func }
    }
}

impl<Func, Fut, I> Enumerable for FutureSource<Func>
where
    Func: Fn() -> Fut,
    Fut: Future<Output = I>,
    I: IntoIterator,
{
    type Item = I::Item;
    type Iter<'a>
        = DeferredStream<Fut, I::IntoIter>
    where
        Self: 'a;

    fn iterate(&self) -> Self::Iter<'_> {
        DeferredStream::new((self.func)())
    }
}

pin_project! {
    #[project = DeferredProj]
    enum DeferredState<Fut, Iter> {
        Waiting {
            #[pin]
            future: Fut,
        },
        Yielding {
            iter: Iter,
        },
    }
}

pin_project! {
    /// Session for [`FutureSource`]: awaits the future, then yields from its output.
    #[must_use = "streams do nothing unless polled"]
    pub struct DeferredStream<Fut, Iter> {
        #[pin]
        state: DeferredState<Fut, Iter>,
    }
}

impl<Fut, I> DeferredStream<Fut, I::IntoIter>
where
    Fut: Future<Output = I>,
    I: IntoIterator,
{
    /// Create from the pending `future`.
    pub fn new(future: Fut) -> Self {
        Self {
            state: DeferredState::Waiting { future },
        }
    }
}

impl<Fut, I> Stream for DeferredStream<Fut, I::IntoIter>
where
    Fut: Future<Output = I>,
    I: IntoIterator,
{
    type Item = I::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        if let DeferredProj::Waiting { future } = this.state.as_mut().project() {
            let iterable = ready!(future.poll(cx));
            this.state.set(DeferredState::Yielding {
                iter: iterable.into_iter(),
            });
        }

        match this.state.project() {
            DeferredProj::Yielding { iter } => Poll::Ready(iter.next()),
            DeferredProj::Waiting { .. } => unreachable!(),
        }
    }
}

/// [`Enumerable`] over an inclusive, stepped range of integers.
#[must_use = "enumerables do nothing unless consumed"]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RangeSource {
    start: i64,
    end: i64,
    step: i64,
}

impl Enumerable for RangeSource {
    type Item = i64;
    type Iter<'a>
        = stream::Iter<StepRange>
    where
        Self: 'a;

    fn iterate(&self) -> Self::Iter<'_> {
        stream::iter(StepRange {
            next: Some(self.start),
            end: self.end,
            step: self.step,
        })
    }
}

/// Iterator behind [`RangeSource`] sessions. `step` is signed by direction.
#[derive(Clone, Debug)]
pub struct StepRange {
    next: Option<i64>,
    end: i64,
    step: i64,
}

impl Iterator for StepRange {
    type Item = i64;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        let past_end = if 0 < self.step {
            self.end < current
        } else {
            current < self.end
        };
        if past_end {
            self.next = None;
            return None;
        }
        self.next = current.checked_add(self.step);
        Some(current)
    }
}

/// Creates an [`Enumerable`] over a cloneable iterable such as a [`Vec`], array, or slice.
pub fn source_iter<I>(iter: I) -> IterSource<I>
where
    I: IntoIterator + Clone,
{
    IterSource::new(iter)
}

/// Creates an asynchronous [`Enumerable`] calling `func` for a fresh [`Stream`] per session.
pub fn source_stream<Func, St>(func: Func) -> StreamSource<Func>
where
    Func: Fn() -> St,
    St: Stream,
{
    StreamSource::new(func)
}

/// Creates an asynchronous [`Enumerable`] which awaits the iterable produced by `func`.
pub fn source_future<Func, Fut>(func: Func) -> FutureSource<Func>
where
    Func: Fn() -> Fut,
    Fut: Future,
    Fut::Output: IntoIterator,
{
    FutureSource::new(func)
}

/// Counting range `0, 1, .., count - 1`.
pub fn source_range(count: u32) -> RangeSource {
    RangeSource {
        start: 0,
        end: i64::from(count) - 1,
        step: 1,
    }
}

/// Range from `start` to `end` inclusive, descending if `end < start`.
pub fn source_range_inclusive(start: i64, end: i64) -> RangeSource {
    RangeSource {
        start,
        end,
        step: if end < start { -1 } else { 1 },
    }
}

/// Range from `start` towards `end` inclusive in increments of `step`, descending if
/// `end < start`.
///
/// Fails with [`Error::InvalidArgument`] unless `step` is positive.
pub fn source_range_step(start: i64, end: i64, step: i64) -> Result<RangeSource> {
    if step <= 0 {
        return Err(Error::invalid_argument("step", "must be greater than zero"));
    }
    Ok(RangeSource {
        start,
        end,
        step: if end < start { -step } else { step },
    })
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;

    use super::*;

    #[test]
    fn test_step_range() {
        let range = source_range_step(0, 10, 5).unwrap();
        assert_eq!(vec![0, 5, 10], range.iterate().collect_blocking());

        let range = source_range_step(10, 1, 4).unwrap();
        assert_eq!(vec![10, 6, 2], range.iterate().collect_blocking());

        let range = source_range_inclusive(3, 3);
        assert_eq!(vec![3], range.iterate().collect_blocking());
    }

    #[test]
    fn test_counting_range() {
        assert_eq!(
            vec![0, 1, 2, 3, 4],
            source_range(5).iterate().collect_blocking()
        );
        assert!(source_range(0).iterate().collect_blocking().is_empty());
    }

    #[test]
    fn test_step_range_rejects_non_positive() {
        assert!(matches!(
            source_range_step(0, 10, 0),
            Err(Error::InvalidArgument { name: "step", .. })
        ));
        assert!(source_range_step(0, 10, -2).is_err());
    }

    #[test]
    fn test_range_does_not_overflow() {
        let range = source_range_inclusive(i64::MAX - 1, i64::MAX);
        assert_eq!(
            vec![i64::MAX - 1, i64::MAX],
            range.iterate().collect_blocking()
        );
    }

    #[tokio::test]
    async fn test_future_source() {
        let source = source_future(|| async { vec![1, 2, 3] });
        assert_eq!(vec![1, 2, 3], source.iterate().collect::<Vec<_>>().await);
        // Sessions restart the future.
        assert_eq!(vec![1, 2, 3], source.iterate().collect::<Vec<_>>().await);
    }

    #[tokio::test]
    async fn test_stream_source() {
        let source = source_stream(|| stream::iter(0..3).then(|x| async move { x * 2 }));
        assert_eq!(vec![0, 2, 4], source.iterate().collect::<Vec<_>>().await);
    }

    trait CollectBlocking: Stream + Sized {
        fn collect_blocking(self) -> Vec<Self::Item> {
            futures::executor::block_on(self.collect())
        }
    }
    impl<St: Stream> CollectBlocking for St {}
}
