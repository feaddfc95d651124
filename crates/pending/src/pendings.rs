use std::fmt;
use std::future::Future;
use std::mem;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::future::{self, BoxFuture, FutureExt};
use optra_optionals::{BoxedError, Optional, OptionalResult};

use crate::fanout::{self, MutateFn};

/// PendingOptional wraps exactly one future that will eventually settle
/// to an [`Optional`]. Awaiting it always yields the settled cell,
/// never a raw future. Every combinator is deferred: it builds a new
/// `PendingOptional` by continuing from the receiver's future and no
/// work happens until something awaits the end of the chain.
///
/// The mutating members (`take`, `take_if`, `replace`, `cloned`) mirror
/// the synchronous in-place contract: they synchronously swap the
/// receiver's internal future for the post-mutation continuation and
/// hand back a new `PendingOptional` resolving to the pre-mutation
/// snapshot. Both continuations fan out of a single upstream
/// settlement (see the `fanout` module), so the upstream computation
/// runs exactly once no matter which side is awaited, or in what order.
pub struct PendingOptional<T> {
    fut: BoxFuture<'static, Optional<T>>,
}

impl<T: Send + 'static> PendingOptional<T> {
    pub fn settled(optional: Optional<T>) -> Self {
        Self {
            fut: future::ready(optional).boxed(),
        }
    }

    pub fn from_future<F>(fut: F) -> Self
    where
        F: Future<Output = Optional<T>> + Send + 'static,
    {
        Self { fut: fut.boxed() }
    }

    /// Interop with asynchronous producers of bare values: the eventual
    /// value is wrapped as present.
    pub fn from_value_future<F>(fut: F) -> Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        Self {
            fut: fut.map(Optional::present).boxed(),
        }
    }

    /// A failed upstream settles the pending optional as absent, the
    /// asynchronous mirror of the synchronous swallow-on-failure rule.
    pub fn from_try_future<F, E>(fut: F) -> Self
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
        E: fmt::Display,
    {
        Self {
            fut: fut
                .map(|outcome| match outcome {
                    Ok(value) => Optional::present(value),
                    Err(err) => {
                        tracing::debug!(
                            "Pending optional settled absent from a failed upstream: {err}"
                        );
                        Optional::absent()
                    }
                })
                .boxed(),
        }
    }

    pub fn from_try_optional_future<F, E>(fut: F) -> Self
    where
        F: Future<Output = Result<Optional<T>, E>> + Send + 'static,
        E: fmt::Display,
    {
        Self {
            fut: fut
                .map(|outcome| match outcome {
                    Ok(settled) => settled,
                    Err(err) => {
                        tracing::debug!(
                            "Pending optional settled absent from a failed upstream: {err}"
                        );
                        Optional::absent()
                    }
                })
                .boxed(),
        }
    }

    // -- deferred transform combinators: each continues from the
    // receiver's future and applies the synchronous rule at settlement.

    pub fn map<U, F>(self, f: F) -> PendingOptional<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        PendingOptional {
            fut: self.fut.map(|settled| settled.map(f)).boxed(),
        }
    }

    pub fn try_map<U, F, E>(self, f: F) -> PendingOptional<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> Result<U, E> + Send + 'static,
    {
        PendingOptional {
            fut: self.fut.map(|settled| settled.try_map(f)).boxed(),
        }
    }

    pub fn and_then<U, F>(self, f: F) -> PendingOptional<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> Optional<U> + Send + 'static,
    {
        PendingOptional {
            fut: self.fut.map(|settled| settled.and_then(f)).boxed(),
        }
    }

    pub fn try_and_then<U, F, E>(self, f: F) -> PendingOptional<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> Result<Optional<U>, E> + Send + 'static,
    {
        PendingOptional {
            fut: self.fut.map(|settled| settled.try_and_then(f)).boxed(),
        }
    }

    /// Chains an asynchronous continuation: the callback itself hands
    /// back another pending optional which the chain keeps awaiting.
    pub fn and_then_pending<U, F>(self, f: F) -> PendingOptional<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> PendingOptional<U> + Send + 'static,
    {
        PendingOptional {
            fut: async move {
                match self.fut.await.into_option() {
                    Some(value) => f(value).await,
                    None => Optional::absent(),
                }
            }
            .boxed(),
        }
    }

    pub fn filter<F>(self, f: F) -> Self
    where
        F: FnOnce(&T) -> bool + Send + 'static,
    {
        Self {
            fut: self.fut.map(|settled| settled.filter(f)).boxed(),
        }
    }

    pub fn try_filter<F, E>(self, f: F) -> Self
    where
        F: FnOnce(&T) -> Result<bool, E> + Send + 'static,
    {
        Self {
            fut: self.fut.map(|settled| settled.try_filter(f)).boxed(),
        }
    }

    pub fn or_else<F>(self, f: F) -> Self
    where
        F: FnOnce() -> Optional<T> + Send + 'static,
    {
        Self {
            fut: self.fut.map(|settled| settled.or_else(f)).boxed(),
        }
    }

    pub fn try_or_else<F, E>(self, f: F) -> Self
    where
        F: FnOnce() -> Result<Optional<T>, E> + Send + 'static,
    {
        Self {
            fut: self.fut.map(|settled| settled.try_or_else(f)).boxed(),
        }
    }

    pub fn or_else_pending<F>(self, f: F) -> Self
    where
        F: FnOnce() -> PendingOptional<T> + Send + 'static,
    {
        Self {
            fut: async move {
                let settled = self.fut.await;
                if settled.is_some() {
                    settled
                } else {
                    f().await
                }
            }
            .boxed(),
        }
    }

    pub fn inspect<F>(self, f: F) -> Self
    where
        F: FnOnce(&T) + Send + 'static,
    {
        Self {
            fut: self.fut.map(|settled| settled.inspect(f)).boxed(),
        }
    }

    pub fn try_inspect<F, E>(self, f: F) -> Self
    where
        F: FnOnce(&T) -> Result<(), E> + Send + 'static,
    {
        Self {
            fut: self.fut.map(|settled| settled.try_inspect(f)).boxed(),
        }
    }

    // -- deferred combine operations: both sides settle first, then the
    // synchronous rule applies. The two sides do not block each other
    // beyond their own settlements.

    pub fn and<U>(self, other: PendingOptional<U>) -> PendingOptional<U>
    where
        U: Send + 'static,
    {
        PendingOptional {
            fut: async move {
                let (left, right) = futures::join!(self.fut, other.fut);
                left.and(right)
            }
            .boxed(),
        }
    }

    pub fn or(self, other: Self) -> Self {
        Self {
            fut: async move {
                let (left, right) = futures::join!(self.fut, other.fut);
                left.or(right)
            }
            .boxed(),
        }
    }

    pub fn xor(self, other: Self) -> Self {
        Self {
            fut: async move {
                let (left, right) = futures::join!(self.fut, other.fut);
                left.xor(right)
            }
            .boxed(),
        }
    }

    // -- scalar-returning operations: plain futures of the plain value,
    // there is no pending wrapper for non-optional results.

    pub async fn when<U, F, G>(self, on_present: F, on_absent: G) -> U
    where
        F: FnOnce(T) -> U,
        G: FnOnce() -> U,
    {
        self.fut.await.when(on_present, on_absent)
    }

    pub async fn try_when<U, F, G, E>(self, on_present: F, on_absent: G) -> OptionalResult<U>
    where
        F: FnOnce(T) -> Result<U, E>,
        G: FnOnce() -> Result<U, E>,
        E: Into<BoxedError>,
    {
        self.fut.await.try_when(on_present, on_absent)
    }

    pub async fn ok_or<E>(self, err: E) -> Result<T, E> {
        self.fut.await.ok_or(err)
    }

    pub async fn ok_or_else<E, F>(self, f: F) -> Result<T, E>
    where
        F: FnOnce() -> E,
    {
        self.fut.await.ok_or_else(f)
    }

    pub async fn try_ok_or_else<E2, F, E>(self, f: F) -> OptionalResult<Result<T, E2>>
    where
        F: FnOnce() -> Result<E2, E>,
        E: Into<BoxedError>,
    {
        self.fut.await.try_ok_or_else(f)
    }

    // -- deferred mutation: the receiver keeps the post-mutation
    // continuation, the returned pending optional resolves to the
    // pre-mutation snapshot. Both derive from one settlement.
    //
    // insert/get_or_insert have no deferred counterpart on purpose:
    // there is no cell to fill before the settlement exists.

    fn split_with(&mut self, mutation: MutateFn<T>) -> PendingOptional<T> {
        let upstream = mem::replace(&mut self.fut, future::ready(Optional::absent()).boxed());
        let (before, after) = fanout::split(upstream, mutation);
        self.fut = after.boxed();

        PendingOptional { fut: before.boxed() }
    }

    pub fn take(&mut self) -> PendingOptional<T> {
        self.split_with(Box::new(Optional::take))
    }

    pub fn take_if<F>(&mut self, f: F) -> PendingOptional<T>
    where
        F: FnOnce(&mut T) -> bool + Send + 'static,
    {
        self.split_with(Box::new(move |cell| cell.take_if(f)))
    }

    pub fn try_take_if<F, E>(&mut self, f: F) -> PendingOptional<T>
    where
        F: FnOnce(&mut T) -> Result<bool, E> + Send + 'static,
    {
        self.split_with(Box::new(move |cell| cell.try_take_if(f)))
    }

    pub fn replace(&mut self, value: T) -> PendingOptional<T> {
        self.split_with(Box::new(move |cell| cell.replace(value)))
    }

    /// Hands back a pending optional settling to a structural clone of
    /// the eventual cell; the receiver keeps the original and the
    /// upstream still runs exactly once.
    pub fn cloned(&mut self) -> PendingOptional<T>
    where
        T: Clone,
    {
        self.split_with(Box::new(|cell| cell.clone()))
    }
}

impl<T, E> PendingOptional<Result<T, E>>
where
    T: Send + 'static,
    E: Send + 'static,
{
    pub async fn transpose(self) -> Result<Optional<T>, E> {
        self.fut.await.transpose()
    }
}

impl<T: Send + 'static> From<Optional<T>> for PendingOptional<T> {
    fn from(optional: Optional<T>) -> Self {
        Self::settled(optional)
    }
}

impl<T: Send + 'static> From<Option<T>> for PendingOptional<T> {
    fn from(option: Option<T>) -> Self {
        Self::settled(Optional::from(option))
    }
}

impl<T> Future for PendingOptional<T> {
    type Output = Optional<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.fut.as_mut().poll(cx)
    }
}

// an unsettled pending optional has no state to show; the placeholder
// is deliberately distinct from the settled textual forms.
impl<T> fmt::Debug for PendingOptional<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PendingOptional(<unresolved>)")
    }
}

impl<T> fmt::Display for PendingOptional<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Pending")
    }
}

#[cfg(test)]
mod tests {
    use optra_optionals::{absent, present, Optional};

    use crate::pendings::PendingOptional;

    #[tokio::test]
    async fn awaiting_a_settled_pending_should_yield_the_cell() {
        let settled = PendingOptional::settled(present(2)).await;
        assert_eq!(settled.into_option(), Some(2));
    }

    #[tokio::test]
    async fn map_should_defer_until_awaited_and_apply_on_present() {
        let doubled = PendingOptional::settled(present(2)).map(|n| n * 2).await;
        assert_eq!(doubled.into_option(), Some(4));

        let doubled = PendingOptional::settled(absent::<u32>()).map(|n| n * 2).await;
        assert!(doubled.is_none());
    }

    #[tokio::test]
    async fn try_map_should_swallow_a_failing_callback_into_absent() {
        let mapped = PendingOptional::settled(present(2))
            .try_map(|_| Err::<u32, _>("boom"))
            .await;
        assert!(mapped.is_none());
    }

    #[tokio::test]
    async fn from_value_future_should_wrap_the_eventual_value_as_present() {
        let pending = PendingOptional::from_value_future(async { 41 + 1 });
        assert_eq!(pending.await.into_option(), Some(42));
    }

    #[tokio::test]
    async fn a_failed_upstream_should_settle_as_absent() {
        let pending =
            PendingOptional::from_try_future(async { Err::<u32, String>(String::from("boom")) });
        assert!(pending.await.is_none());

        let pending = PendingOptional::from_try_optional_future(async {
            Err::<Optional<u32>, String>(String::from("boom"))
        });
        assert!(pending.await.is_none());
    }

    #[tokio::test]
    async fn and_then_pending_should_chain_an_async_continuation() {
        let chained = PendingOptional::settled(present(2))
            .and_then_pending(|n| PendingOptional::from_value_future(async move { n + 40 }))
            .await;
        assert_eq!(chained.into_option(), Some(42));

        let chained = PendingOptional::settled(absent::<u32>())
            .and_then_pending(|n| PendingOptional::from_value_future(async move { n + 40 }))
            .await;
        assert!(chained.is_none());
    }

    #[tokio::test]
    async fn or_else_pending_should_only_run_for_an_absent_settlement() {
        let fallen = PendingOptional::settled(absent::<u32>())
            .or_else_pending(|| PendingOptional::settled(present(9)))
            .await;
        assert_eq!(fallen.into_option(), Some(9));

        let kept = PendingOptional::settled(present(2))
            .or_else_pending(|| PendingOptional::settled(present(9)))
            .await;
        assert_eq!(kept.into_option(), Some(2));
    }

    #[tokio::test]
    async fn combine_operations_should_await_both_sides() {
        let left = PendingOptional::settled(present(2));
        let right = PendingOptional::from_value_future(async { "right" });
        assert_eq!(left.and(right).await.into_option(), Some("right"));

        let left = PendingOptional::settled(present(2));
        let right = PendingOptional::settled(present(3));
        assert!(left.xor(right).await.is_none());

        let left = PendingOptional::settled(absent::<u32>());
        let right = PendingOptional::settled(present(3));
        assert_eq!(left.or(right).await.into_option(), Some(3));
    }

    #[tokio::test]
    async fn scalar_operations_should_yield_plain_futures() {
        let folded = PendingOptional::settled(present(2))
            .when(|n| n * 2, || 0)
            .await;
        assert_eq!(folded, 4);

        let outcome = PendingOptional::settled(absent::<u32>())
            .ok_or("missing")
            .await;
        assert_eq!(outcome, Err("missing"));

        let swapped = PendingOptional::settled(present(Ok::<_, String>(2)))
            .transpose()
            .await;
        assert_eq!(swapped.unwrap().into_option(), Some(2));
    }

    #[tokio::test]
    async fn take_should_fan_out_snapshot_and_emptied_receiver() {
        let mut pending = PendingOptional::settled(present(2));
        let old = pending.take();

        assert_eq!(old.await.into_option(), Some(2));
        assert!(pending.await.is_none());
    }

    #[tokio::test]
    async fn take_fan_out_should_settle_in_either_await_order() {
        // receiver awaited before the snapshot: the mutation still runs
        // once and the snapshot still sees the pre-mutation value.
        let mut pending = PendingOptional::settled(present(2));
        let old = pending.take();

        assert!(pending.await.is_none());
        assert_eq!(old.await.into_option(), Some(2));
    }

    #[tokio::test]
    async fn dropping_the_snapshot_should_not_lose_the_mutation() {
        let mut pending = PendingOptional::settled(present(2));
        drop(pending.take());

        assert!(pending.await.is_none());
    }

    #[tokio::test]
    async fn replace_should_hand_back_the_previous_settlement() {
        let mut pending = PendingOptional::settled(present(2));
        let old = pending.replace(5);

        assert_eq!(old.await.into_option(), Some(2));
        assert_eq!(pending.await.into_option(), Some(5));
    }

    #[tokio::test]
    async fn take_if_should_only_take_on_a_passing_predicate() {
        let mut pending = PendingOptional::settled(present(2));
        let skipped = pending.take_if(|n| *n > 5);

        assert!(skipped.await.is_none());
        assert_eq!(pending.await.into_option(), Some(2));

        let mut pending = PendingOptional::settled(present(2));
        let taken = pending.take_if(|n| *n == 2);

        assert_eq!(taken.await.into_option(), Some(2));
        assert!(pending.await.is_none());
    }

    #[tokio::test]
    async fn try_take_if_should_swallow_a_failing_predicate() {
        let mut pending = PendingOptional::settled(present(2));
        let taken = pending.try_take_if(|_| Err::<bool, _>("boom"));

        assert!(taken.await.is_none());
        assert_eq!(pending.await.into_option(), Some(2));
    }

    #[tokio::test]
    async fn cloned_should_share_one_settlement_between_both_handles() {
        let mut pending = PendingOptional::settled(present(String::from("shared")));
        let copy = pending.cloned();

        assert_eq!(copy.await.into_option(), Some(String::from("shared")));
        assert_eq!(pending.await.into_option(), Some(String::from("shared")));
    }

    #[test]
    fn pending_optionals_should_display_an_unsettled_placeholder() {
        let pending = PendingOptional::settled(present(2));
        assert_eq!(pending.to_string(), "Pending");
        assert_eq!(format!("{pending:?}"), "PendingOptional(<unresolved>)");

        // block_on shows the placeholder never leaks into the settled form.
        let settled = tokio_test::block_on(pending);
        assert_eq!(settled.to_string(), "Some { 2 }");
    }
}
