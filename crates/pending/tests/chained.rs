use std::time::Duration;

use optra_optionals::{absent, present, OptionalError};
use optra_pending::{IntoPending, PendingOptional, TransposePending};
use tokio::sync::oneshot;

#[tokio::test]
async fn should_be_able_to_chain_combinators_over_a_live_producer() {
    let (sender, receiver) = oneshot::channel::<u32>();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        sender.send(21).expect("should deliver the produced value");
    });

    let settled = PendingOptional::from_try_future(receiver)
        .map(|n| n * 2)
        .filter(|n| *n == 42)
        .await;

    assert_eq!(settled.into_option(), Some(42));
}

#[tokio::test]
async fn a_dropped_producer_should_settle_the_whole_chain_as_absent() {
    let (sender, receiver) = oneshot::channel::<u32>();
    drop(sender);

    let settled = PendingOptional::from_try_future(receiver).map(|n| n * 2).await;

    assert!(settled.is_none());
}

#[tokio::test]
async fn deferred_mutation_should_fan_out_while_the_producer_is_still_running() {
    let (sender, receiver) = oneshot::channel::<u32>();

    // both sides are derived before the producer has settled.
    let mut pending = PendingOptional::from_try_future(receiver);
    let old = pending.take();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        sender.send(2).expect("should deliver the produced value");
    });

    assert_eq!(old.await.into_option(), Some(2));
    assert!(pending.await.is_none());
}

#[tokio::test]
async fn settled_cells_should_lift_into_pending_chains() {
    let settled = present(2)
        .into_pending()
        .and_then_pending(|n| PendingOptional::from_value_future(async move { n + 1 }))
        .or_else_pending(|| absent::<u32>().into_pending())
        .await;

    assert_eq!(settled.into_option(), Some(3));
}

#[tokio::test]
async fn transpose_pending_should_bridge_optionals_of_futures() {
    let (sender, receiver) = oneshot::channel::<u32>();
    sender.send(7).expect("should deliver the produced value");

    let pending = present(receiver).transpose_pending();
    let settled = pending.await;

    // the receiver future yields an outcome; carry the failure rule
    // through the synchronous transpose.
    let outcome = settled.transpose();
    assert_eq!(outcome.expect("producer stayed alive").into_option(), Some(7));
}

#[tokio::test]
async fn raising_seams_should_survive_the_async_boundary() {
    let err = absent::<u32>()
        .into_pending()
        .try_when(|_| Err::<u32, _>("present"), || Err("absent"))
        .await
        .unwrap_err();

    assert!(matches!(err, OptionalError::Callback { .. }));
    assert_eq!(err.to_string(), "Absent branch failed while matching an optional");
}
