use futures::stream::{self, StreamExt};
use seqtools::prelude::*;

fn suspending(values: Vec<i32>) -> impl Enumerable<Item = i32> {
    source_stream(move || {
        stream::iter(values.clone()).then(|x| async move {
            tokio::task::yield_now().await;
            x
        })
    })
}

#[tokio::test]
async fn test_map_parity() {
    let sync = source_iter(vec![1, 2, 3]).map(|x| x * 3).blocking().to_vec();
    let async_ = suspending(vec![1, 2, 3]).map(|x| x * 3).to_vec().await;
    assert_eq!(sync, async_);
}

#[tokio::test]
async fn test_pipeline_parity() {
    let input = vec![7, 3, 9, 3, 1, 8, 2, 7];

    let sync = source_iter(input.clone())
        .distinct()
        .filter_indexed(|_, index| index != 1)
        .order_by(|x| *x)
        .skip(1)
        .chunk(2)
        .unwrap()
        .blocking()
        .to_vec();

    let async_ = suspending(input)
        .distinct()
        .filter_async(|_| async { true })
        .filter_indexed(|_, index| index != 1)
        .order_by(|x| *x)
        .skip(1)
        .chunk(2)
        .unwrap()
        .to_vec()
        .await;

    assert_eq!(vec![vec![2, 7], vec![8, 9]], sync);
    assert_eq!(sync, async_);
}

#[tokio::test]
async fn test_async_set_operators() {
    let primary = suspending(vec![1, 2, 3]);
    let other = suspending(vec![3, 4, 5]);

    assert_eq!(vec![1, 2], (&primary).except(&other).to_vec().await);
    assert_eq!(vec![3], (&primary).intersect(&other).to_vec().await);
    assert_eq!(
        vec![1, 2, 3, 4, 5],
        (&primary).union(&other).to_vec().await
    );
    assert_eq!(vec![(1, 3), (2, 4), (3, 5)], primary.zip(other).to_vec().await);
}

#[tokio::test]
async fn test_async_selectors() {
    let doubled = suspending(vec![1, 2, 3])
        .map_async(|x| async move {
            tokio::task::yield_now().await;
            x * 2
        })
        .to_vec()
        .await;
    assert_eq!(vec![2, 4, 6], doubled);

    let source = suspending(vec![1, 2, 3, 4]);
    assert_eq!(10, source.sum().await);
    assert_eq!(Some(4), source.last().await);
    assert!(source.includes(&2).await);
}
