use std::future::Future;

use optra_optionals::Optional;

use crate::pendings::PendingOptional;

/// IntoPending lifts an already settled optional (or a bare std
/// `Option`) into its pending form.
pub trait IntoPending<T> {
    fn into_pending(self) -> PendingOptional<T>;
}

impl<T: Send + 'static> IntoPending<T> for Optional<T> {
    fn into_pending(self) -> PendingOptional<T> {
        PendingOptional::settled(self)
    }
}

impl<T: Send + 'static> IntoPending<T> for Option<T> {
    fn into_pending(self) -> PendingOptional<T> {
        PendingOptional::settled(Optional::from(self))
    }
}

/// TransposePending swaps an optional holding a future into a pending
/// optional of the future's output: a present future gets awaited and
/// stays present, an absent cell settles immediately as absent.
pub trait TransposePending {
    type Output;

    fn transpose_pending(self) -> PendingOptional<Self::Output>;
}

impl<F> TransposePending for Optional<F>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    type Output = F::Output;

    fn transpose_pending(self) -> PendingOptional<F::Output> {
        match self.into_option() {
            Some(fut) => PendingOptional::from_value_future(fut),
            None => PendingOptional::settled(Optional::absent()),
        }
    }
}
