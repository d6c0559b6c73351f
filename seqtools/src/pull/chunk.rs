//! [`Chunk`] and its session.
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use futures::stream::Stream;
use pin_project_lite::pin_project;

use crate::{Enumerable, Error, Result};

/// Yields consecutive [`Vec`]s of `size` elements. The last chunk may be shorter.
#[must_use = "enumerables do nothing unless consumed"]
#[derive(Debug)]
pub struct Chunk<E> {
    upstream: E,
    size: usize,
}

impl<E> Chunk<E> {
    /// Create with `upstream` and chunk `size`.
    ///
    /// Fails with [`Error::InvalidArgument`] if `size` is zero.
    pub fn new(upstream: E, size: usize) -> Result<Self> {
        if size == 0 {
            return Err(Error::invalid_argument("size", "must be greater than zero"));
        }
        Ok(Self { upstream, size })
    }
}

impl<E> Enumerable for Chunk<E>
where
    E: Enumerable,
{
    type Item = Vec<E::Item>;
    type Iter<'a>
        = ChunkStream<E::Iter<'a>>
    where
        Self: 'a;

    fn iterate(&self) -> Self::Iter<'_> {
        ChunkStream {
            stream: self.upstream.iterate(),
            size: self.size,
            buffer: Vec::new(),
        }
    }
}

pin_project! {
    /// Session for [`Chunk`].
    #[must_use = "streams do nothing unless polled"]
    pub struct ChunkStream<St>
    where
        St: Stream,
    {
        #[pin]
        stream: St,
        size: usize,
        buffer: Vec<St::Item>,
    }
}

impl<St> Stream for ChunkStream<St>
where
    St: Stream,
{
    type Item = Vec<St::Item>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        while let Some(item) = ready!(this.stream.as_mut().poll_next(cx)) {
            this.buffer.push(item);
            if this.buffer.len() == *this.size {
                return Poll::Ready(Some(std::mem::take(this.buffer)));
            }
        }
        if this.buffer.is_empty() {
            Poll::Ready(None)
        } else {
            Poll::Ready(Some(std::mem::take(this.buffer)))
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{Enumerable, Error, Terminal, source_range};

    #[tokio::test]
    async fn test_chunk() {
        let chunks = source_range(7).chunk(3).unwrap();
        assert_eq!(
            vec![vec![0, 1, 2], vec![3, 4, 5], vec![6]],
            chunks.to_vec().await
        );

        let exact = source_range(4).chunk(2).unwrap();
        assert_eq!(vec![vec![0, 1], vec![2, 3]], exact.to_vec().await);
    }

    #[tokio::test]
    async fn test_chunk_larger_than_input() {
        let chunks = source_range(3).chunk(usize::MAX).unwrap();
        assert_eq!(vec![vec![0, 1, 2]], chunks.to_vec().await);
    }

    #[tokio::test]
    async fn test_chunk_empty() {
        let chunks = source_range(0).chunk(3).unwrap();
        assert_eq!(0, chunks.count().await);
    }

    #[test]
    fn test_chunk_zero() {
        let error = source_range(3).chunk(0).unwrap_err();
        assert_eq!(
            Error::InvalidArgument {
                name: "size",
                reason: "must be greater than zero"
            },
            error
        );
    }
}
