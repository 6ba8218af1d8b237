use crate::{Lazy, LazyError, LoadResult, Selector, State, Store};
use futures::stream::{self, BoxStream, StreamExt};
use futures_signals::signal::{Mutable, MutableSignalCloned, SignalExt, SignalStream};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError as BroadcastRecvError;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::sync::oneshot::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

const ACTION_BUS_CAPACITY: usize = 256;

type Reducer<S, A> = Arc<dyn Fn(S, &A) -> S + Send + Sync>;

/// A Redux-style store: state held in a `Mutable`, changed only through a
/// single queue task.
///
/// Dispatched actions run through the reducer and are then published on the
/// action bus that [`actions`](StateStore::actions) and effects listen to.
/// Must be created inside a tokio runtime.
pub struct StateStore<S: State, A> {
    state: Mutable<S>,
    set_state_tx: UnboundedSender<Box<dyn FnOnce(S) -> S + Send>>,
    action_tx: UnboundedSender<A>,
    with_state_tx: UnboundedSender<Box<dyn FnOnce(S) + Send>>,
    action_bus: broadcast::Sender<A>,
}

impl<S, A> StateStore<S, A>
where
    S: State,
    A: Clone + Send + 'static,
{
    pub fn new<R>(initial_state: S, reducer: R) -> Self
    where
        R: Fn(S, &A) -> S + Send + Sync + 'static,
    {
        let state = Mutable::new(initial_state);
        let (set_state_tx, set_state_rx) =
            tokio::sync::mpsc::unbounded_channel::<Box<dyn FnOnce(S) -> S + Send>>();
        let (action_tx, action_rx) = tokio::sync::mpsc::unbounded_channel::<A>();
        let (with_state_tx, with_state_rx) =
            tokio::sync::mpsc::unbounded_channel::<Box<dyn FnOnce(S) + Send>>();
        let (action_bus, _) = broadcast::channel(ACTION_BUS_CAPACITY);

        let state_clone = state.clone();
        let bus_clone = action_bus.clone();
        let reducer: Reducer<S, A> = Arc::new(reducer);

        tokio::spawn(async move {
            Self::process_queue(
                state_clone,
                reducer,
                bus_clone,
                set_state_rx,
                action_rx,
                with_state_rx,
            )
            .await;
        });

        StateStore {
            state,
            set_state_tx,
            action_tx,
            with_state_tx,
            action_bus,
        }
    }

    async fn process_queue(
        state: Mutable<S>,
        reducer: Reducer<S, A>,
        action_bus: broadcast::Sender<A>,
        mut set_state_rx: UnboundedReceiver<Box<dyn FnOnce(S) -> S + Send>>,
        mut action_rx: UnboundedReceiver<A>,
        mut with_state_rx: UnboundedReceiver<Box<dyn FnOnce(S) + Send>>,
    ) {
        loop {
            tokio::select! {
                biased;
                Some(updater) = set_state_rx.recv() => {
                    let new_state = updater(state.get_cloned());
                    state.set(new_state)
                }
                Some(action) = action_rx.recv() => {
                    let new_state = reducer(state.get_cloned(), &action);
                    state.set(new_state);
                    // No listeners is fine, effects are optional.
                    let _ = action_bus.send(action);
                }
                Some(read) = with_state_rx.recv() => {
                    read(state.get_cloned());
                }
                else => break,
            }
        }
    }

    pub fn to_stream(&self) -> SignalStream<MutableSignalCloned<S>> {
        self.state.signal_cloned().to_stream()
    }

    pub fn to_signal(&self) -> MutableSignalCloned<S> {
        self.state.signal_cloned()
    }

    /// Queues a direct state update, bypassing the reducer.
    pub fn set_state<F>(&self, updater: F)
    where
        F: FnOnce(S) -> S + Send + 'static,
    {
        let _ = self.set_state_tx.send(Box::new(updater));
    }

    pub fn with_state<F>(&self, action: F)
    where
        F: FnOnce(S) + Send + 'static,
    {
        let _ = self.with_state_tx.send(Box::new(action));
    }

    pub fn get_state(&self) -> S {
        self.state.get_cloned()
    }

    /// Resolves to the state once every update queued before this call has run.
    pub async fn await_state(&self) -> Result<S, RecvError> {
        let (tx, rx) = tokio::sync::oneshot::channel();
        let _ = self.with_state_tx.send(Box::new(|state| {
            let _ = tx.send(state);
        }));
        rx.await
    }

    /// Streams every action dispatched after this call, after it was reduced.
    pub fn actions(&self) -> BoxStream<'static, A> {
        let receiver = self.action_bus.subscribe();
        stream::unfold(receiver, |mut receiver| async move {
            loop {
                match receiver.recv().await {
                    Ok(action) => return Some((action, receiver)),
                    Err(BroadcastRecvError::Lagged(skipped)) => {
                        warn!("action listener lagged, {} actions skipped", skipped);
                    }
                    Err(BroadcastRecvError::Closed) => return None,
                }
            }
        })
        .boxed()
    }

    /// Runs `effect` for every dispatched action and dispatches whatever it returns.
    ///
    /// The effect task ends when the store's action bus closes, or when the
    /// returned handle is aborted.
    pub fn register_effect<F, Fut>(&self, effect: F) -> JoinHandle<()>
    where
        F: Fn(A) -> Fut + Send + 'static,
        Fut: Future<Output = Option<A>> + Send + 'static,
    {
        let mut actions = self.actions();
        let action_tx = self.action_tx.clone();
        tokio::spawn(async move {
            while let Some(action) = actions.next().await {
                if let Some(follow_up) = effect(action).await {
                    trace!("effect produced a follow-up action");
                    if action_tx.send(follow_up).is_err() {
                        break;
                    }
                }
            }
        })
    }

    fn update_lazy<T, L>(
        set_state_tx: &UnboundedSender<Box<dyn FnOnce(S) -> S + Send>>,
        lens: L,
        update: impl FnOnce(Lazy<T>) -> Lazy<T> + Send + 'static,
    ) where
        T: Clone + Send + 'static,
        L: Fn(&mut S) -> &mut Lazy<T> + Send + 'static,
    {
        let _ = set_state_tx.send(Box::new(move |mut state| {
            let slot = lens(&mut state);
            let current = slot.clone();
            *slot = update(current);
            state
        }));
    }

    fn settle_lazy<T, L>(
        set_state_tx: &UnboundedSender<Box<dyn FnOnce(S) -> S + Send>>,
        lens: L,
        outcome: Result<T, LazyError>,
    ) where
        T: Clone + Send + 'static,
        L: Fn(&mut S) -> &mut Lazy<T> + Send + 'static,
    {
        match &outcome {
            Ok(_) => debug!("lazy load settled"),
            Err(error) => debug!("lazy load failed: {}", error),
        }
        Self::update_lazy(set_state_tx, lens, move |lazy| match outcome {
            Ok(data) => lazy.resolve(data),
            Err(error) => lazy.reject(error),
        });
    }

    fn load_async_core<T, R, F, L>(
        &self,
        computation: F,
        lens: L,
        cancellation_token: Option<CancellationToken>,
    ) where
        T: Clone + Send + 'static,
        R: LoadResult<T> + Send + 'static,
        F: Future<Output = R> + Send + 'static,
        L: Fn(&mut S) -> &mut Lazy<T> + Clone + Send + 'static,
    {
        let set_state_tx = self.set_state_tx.clone();
        tokio::spawn(async move {
            // Mark the slot as in flight
            Self::update_lazy(&set_state_tx, lens.clone(), Lazy::start_loading);
            // Yield to allow the state to be updated before running the computation
            tokio::task::yield_now().await;
            let outcome = if let Some(token) = cancellation_token {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => Err(LazyError::Cancelled),
                    result = computation => result.into_result(),
                }
            } else {
                computation.await.into_result()
            };
            Self::settle_lazy(&set_state_tx, lens, outcome);
        });
    }

    /// Loads a lazy slot with a future.
    pub fn async_load<T, R, F, L>(&self, lens: L, computation: F)
    where
        T: Clone + Send + 'static,
        R: LoadResult<T> + Send + 'static,
        F: Future<Output = R> + Send + 'static,
        L: Fn(&mut S) -> &mut Lazy<T> + Clone + Send + 'static,
    {
        self.load_async_core(computation, lens, None);
    }

    /// Loads a lazy slot with a future that can be cancelled through `cancellation_token`.
    pub fn async_load_cancellable<T, R, F, Fut, L>(
        &self,
        cancellation_token: CancellationToken,
        lens: L,
        computation: F,
    ) where
        T: Clone + Send + 'static,
        R: LoadResult<T> + Send + 'static,
        Fut: Future<Output = R> + Send + 'static,
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        L: Fn(&mut S) -> &mut Lazy<T> + Clone + Send + 'static,
    {
        self.load_async_core(
            computation(cancellation_token.clone()),
            lens,
            Some(cancellation_token),
        );
    }

    /// Loads a lazy slot with a future, failing with [`LazyError::Timeout`]
    /// if it runs longer than `timeout`.
    pub fn async_load_with_timeout<T, R, F, L>(
        &self,
        lens: L,
        computation: F,
        timeout: std::time::Duration,
    ) where
        T: Clone + Send + 'static,
        R: LoadResult<T> + Send + 'static,
        F: Future<Output = R> + Send + 'static,
        L: Fn(&mut S) -> &mut Lazy<T> + Clone + Send + 'static,
    {
        let set_state_tx = self.set_state_tx.clone();
        tokio::spawn(async move {
            Self::update_lazy(&set_state_tx, lens.clone(), Lazy::start_loading);
            tokio::task::yield_now().await;
            let outcome = match tokio::time::timeout(timeout, computation).await {
                Ok(result) => result.into_result(),
                Err(_) => Err(LazyError::Timeout),
            };
            Self::settle_lazy(&set_state_tx, lens, outcome);
        });
    }

    /// Loads a lazy slot with a blocking computation run on the blocking pool.
    pub fn load<T, R, F, L>(&self, lens: L, computation: F)
    where
        T: Clone + Send + 'static,
        R: LoadResult<T> + Send + 'static,
        F: FnOnce() -> R + Send + 'static,
        L: Fn(&mut S) -> &mut Lazy<T> + Clone + Send + 'static,
    {
        let set_state_tx = self.set_state_tx.clone();
        tokio::spawn(async move {
            Self::update_lazy(&set_state_tx, lens.clone(), Lazy::start_loading);
            tokio::task::yield_now().await;
            let outcome = match tokio::task::spawn_blocking(computation).await {
                Ok(result) => result.into_result(),
                Err(join_error) => Err(LazyError::Error(join_error.to_string())),
            };
            Self::settle_lazy(&set_state_tx, lens, outcome);
        });
    }
}

impl<S: State, A> Clone for StateStore<S, A> {
    fn clone(&self) -> Self {
        StateStore {
            state: self.state.clone(),
            set_state_tx: self.set_state_tx.clone(),
            action_tx: self.action_tx.clone(),
            with_state_tx: self.with_state_tx.clone(),
            action_bus: self.action_bus.clone(),
        }
    }
}

impl<S, A> Store for StateStore<S, A>
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
        if self.action_tx.send(action).is_err() {
            warn!("store queue closed, action dropped");
        }
    }
}
