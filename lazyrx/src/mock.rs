//! Test doubles for code built on [`Store`].

use crate::{Selector, State, Store};
use futures::stream::{BoxStream, StreamExt};
use futures_signals::signal::{Mutable, SignalExt};
use std::fmt::Debug;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type Reducer<S, A> = Arc<dyn Fn(S, &A) -> S + Send + Sync>;

/// A synchronous [`Store`] for tests.
///
/// Every dispatched action is recorded in order. When a reducer is configured it
/// is applied inline during `dispatch`, so the new state is visible to the
/// store's select streams as soon as `dispatch` returns.
pub struct MockStore<S: State, A> {
    /// Current state
    state: Mutable<S>,
    /// Dispatch history
    dispatched: Arc<Mutex<Vec<A>>>,
    reducer: Option<Reducer<S, A>>,
}

impl<S: State, A: Clone> MockStore<S, A> {
    pub fn new(initial_state: S) -> Self {
        MockStore {
            state: Mutable::new(initial_state),
            dispatched: Arc::new(Mutex::new(Vec::new())),
            reducer: None,
        }
    }

    /// Applies `reducer` to every dispatched action.
    pub fn with_reducer<R>(self, reducer: R) -> Self
    where
        R: Fn(S, &A) -> S + Send + Sync + 'static,
    {
        MockStore {
            reducer: Some(Arc::new(reducer)),
            ..self
        }
    }

    pub fn get_state(&self) -> S {
        self.state.get_cloned()
    }

    /// Replaces the state synchronously, without recording anything.
    pub fn set_state<F>(&self, updater: F)
    where
        F: FnOnce(S) -> S,
    {
        let new_state = updater(self.state.get_cloned());
        self.state.set(new_state);
    }

    /// All actions dispatched so far, oldest first.
    pub fn dispatched(&self) -> Vec<A> {
        self.history().clone()
    }

    pub fn dispatch_count(&self) -> usize {
        self.history().len()
    }

    pub fn clear_dispatched(&self) {
        self.history().clear();
    }

    fn history(&self) -> MutexGuard<'_, Vec<A>> {
        self.dispatched
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S: State, A> Clone for MockStore<S, A> {
    fn clone(&self) -> Self {
        MockStore {
            state: self.state.clone(),
            dispatched: Arc::clone(&self.dispatched),
            reducer: self.reducer.clone(),
        }
    }
}

impl<S, A> Store for MockStore<S, A>
where
    S: State,
    A: Clone + Send + Sync + 'static,
{
    type State = S;
    type Action = A;

    fn select<U>(&self, selector: &Selector<S, U>) -> BoxStream<'static, U>
    where
        U: Clone + PartialEq + Send + Sync + 'static,
    {
        let selector = selector.clone();
        self.state
            .signal_ref(move |state| selector.select(state))
            .dedupe_cloned()
            .to_stream()
            .boxed()
    }

    fn dispatch(&self, action: A) {
        self.history().push(action.clone());
        if let Some(reducer) = &self.reducer {
            let new_state = reducer(self.state.get_cloned(), &action);
            self.state.set(new_state);
        }
    }
}

/// Assertion helpers for tests
pub mod assert {
    use super::*;

    pub fn assert_state<S, A>(store: &MockStore<S, A>, expected: S)
    where
        S: State + PartialEq + Debug,
        A: Clone,
    {
        assert_eq!(store.get_state(), expected, "state does not match");
    }

    pub fn assert_dispatched<S, A>(store: &MockStore<S, A>, expected: &[A])
    where
        S: State,
        A: Clone + PartialEq + Debug,
    {
        assert_eq!(
            store.dispatched().as_slice(),
            expected,
            "dispatched actions do not match"
        );
    }

    pub fn assert_dispatch_count<S, A>(store: &MockStore<S, A>, expected: usize)
    where
        S: State,
        A: Clone,
    {
        let actual = store.dispatch_count();
        assert_eq!(
            actual, expected,
            "expected {} dispatched actions, found {}",
            expected, actual
        );
    }
}

/// Scripted event streams
pub mod event_stream {
    use futures::stream::{self, BoxStream, StreamExt};
    use std::time::Duration;
    use tokio::time::sleep;

    /// Yields `events` in order, then ends.
    pub fn mock_stream<T: Send + 'static>(events: Vec<T>) -> BoxStream<'static, T> {
        stream::iter(events).boxed()
    }

    /// Yields every event after waiting for its delay, then ends.
    pub fn mock_delayed_stream<T: Send + 'static>(
        events: Vec<(T, Duration)>,
    ) -> BoxStream<'static, T> {
        stream::iter(events)
            .then(|(event, delay)| async move {
                sleep(delay).await;
                event
            })
            .boxed()
    }
}
