use crate::{Selector, State};
use futures::stream::{BoxStream, StreamExt};

/// Read and dispatch capability of a Redux-style store.
///
/// Implementations must hand out live streams whose first item is the value
/// at subscription time, and must not repeat an item equal to the previous one.
pub trait Store: Clone + Send + Sync + 'static {
    type State: State;
    type Action: Send + 'static;

    /// Streams the selector's output for the current state and every change after it.
    fn select<U>(&self, selector: &Selector<Self::State, U>) -> BoxStream<'static, U>
    where
        U: Clone + PartialEq + Send + Sync + 'static;

    /// Hands an action to the store. Fire and forget.
    fn dispatch(&self, action: Self::Action);
}

/// Reads the selector's current value once.
///
/// The subscription is dropped before this returns, so repeated snapshots never
/// accumulate live subscriptions. Returns `None` only if the store produced no
/// value at all.
pub async fn snapshot<St, U>(store: &St, selector: &Selector<St::State, U>) -> Option<U>
where
    St: Store,
    U: Clone + PartialEq + Send + Sync + 'static,
{
    let mut subscription = store.select(selector);
    subscription.next().await
}
