// Shared settlement cell backing the deferred mutating operations.
//
// A mutating call on a pending optional produces two derived futures
// out of one upstream settlement: the "before" side resolves to the
// cell as it was at settlement, the "after" side to the cell once the
// mutation has been applied. Whichever side is polled first drives the
// upstream; the mutation itself runs exactly once, and the lock is
// only ever held inside a poll, never across an await.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll, Waker};

use futures::future::BoxFuture;
use optra_optionals::Optional;

pub(crate) type MutateFn<T> = Box<dyn FnOnce(&mut Optional<T>) -> Optional<T> + Send>;

#[derive(Clone, Copy)]
enum Side {
    Before,
    After,
}

struct SharedSettlement<T> {
    upstream: Option<BoxFuture<'static, Optional<T>>>,
    mutation: Option<MutateFn<T>>,
    before: Option<Optional<T>>,
    after: Option<Optional<T>>,
    before_waker: Option<Waker>,
    after_waker: Option<Waker>,
}

pub(crate) struct FanoutFuture<T> {
    side: Side,
    state: Arc<Mutex<SharedSettlement<T>>>,
}

pub(crate) fn split<T: Send + 'static>(
    upstream: BoxFuture<'static, Optional<T>>,
    mutation: MutateFn<T>,
) -> (FanoutFuture<T>, FanoutFuture<T>) {
    let state = Arc::new(Mutex::new(SharedSettlement {
        upstream: Some(upstream),
        mutation: Some(mutation),
        before: None,
        after: None,
        before_waker: None,
        after_waker: None,
    }));

    let before = FanoutFuture {
        side: Side::Before,
        state: state.clone(),
    };
    let after = FanoutFuture {
        side: Side::After,
        state,
    };

    (before, after)
}

impl<T: Send + 'static> Future for FanoutFuture<T> {
    type Output = Optional<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let mut state = this
            .state
            .lock()
            .expect("fanout settlement lock should not be poisoned");

        if let Some(mut upstream) = state.upstream.take() {
            match upstream.as_mut().poll(cx) {
                Poll::Ready(mut settled) => {
                    let mutation = state
                        .mutation
                        .take()
                        .expect("mutation should only be applied once");
                    let before = mutation(&mut settled);
                    state.before = Some(before);
                    state.after = Some(settled);

                    // this side takes its slot below; the other side
                    // gets woken so it can come take its own.
                    let other_waker = match this.side {
                        Side::Before => state.after_waker.take(),
                        Side::After => state.before_waker.take(),
                    };
                    if let Some(waker) = other_waker {
                        waker.wake();
                    }
                }
                Poll::Pending => {
                    state.upstream = Some(upstream);
                }
            }
        }

        let slot = match this.side {
            Side::Before => &mut state.before,
            Side::After => &mut state.after,
        };
        if let Some(value) = slot.take() {
            return Poll::Ready(value);
        }

        match this.side {
            Side::Before => state.before_waker = Some(cx.waker().clone()),
            Side::After => state.after_waker = Some(cx.waker().clone()),
        }

        Poll::Pending
    }
}
