use crate::macros::{nest_combine, nest_pattern};
use crate::store::snapshot;
use crate::{Lazy, LazyStreamExt, Selector, Store};
use futures::future;
use futures::stream::{self, BoxStream, StreamExt};
use futures_core::stream::Stream;
use pin_project::pin_project;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tracing::{debug, trace};

/// Opens a fresh subscription to a query's sequence.
pub type LazySource<V> = Arc<dyn Fn() -> BoxStream<'static, V> + Send + Sync>;

/// A re-subscribable sequence of lazy snapshots bound to a store.
///
/// Polling the query as a [`Stream`] opens one subscription on first poll.
/// [`subscribe`](LazyQuery::subscribe) and [`select`](LazyQuery::select) open
/// their own independent subscriptions, and cloning yields an unsubscribed copy.
#[pin_project]
pub struct LazyQuery<V, St: Store> {
    store: St,
    source: LazySource<V>,
    active: Option<BoxStream<'static, V>>,
}

impl<V, St> LazyQuery<V, St>
where
    V: Send + 'static,
    St: Store,
{
    pub fn new(store: St, source: LazySource<V>) -> Self {
        LazyQuery {
            store,
            source,
            active: None,
        }
    }

    pub fn store(&self) -> &St {
        &self.store
    }

    pub fn subscribe(&self) -> BoxStream<'static, V> {
        (self.source)()
    }

    /// Waits for one snapshot of this query, then streams `selector` live.
    ///
    /// The snapshot is taken whatever its flags are: this does not wait for the
    /// value to be loaded, only for the query to emit once. Later emissions of
    /// the query are not observed. If the query ends without emitting, the
    /// returned stream ends empty.
    ///
    /// The gate always opens a fresh subscription; clone the query first to
    /// keep using it.
    pub fn select<U>(self, selector: &Selector<St::State, U>) -> BoxStream<'static, U>
    where
        U: Clone + PartialEq + Send + Sync + 'static,
    {
        let store = self.store.clone();
        let selector = selector.clone();

        // Phase one: a single snapshot. The rest of the subscription is dropped
        // together with the tuple.
        let gate = self.subscribe().into_future();

        stream::once(gate)
            .filter_map(|(first, _rest)| future::ready(first.map(|_| ())))
            // Phase two: the derived selector, live from here on.
            .flat_map(move |()| store.select(&selector))
            .boxed()
    }
}

impl<V, St: Store> Clone for LazyQuery<V, St> {
    fn clone(&self) -> Self {
        LazyQuery {
            store: self.store.clone(),
            source: Arc::clone(&self.source),
            active: None,
        }
    }
}

impl<V, St> Stream for LazyQuery<V, St>
where
    V: Send + 'static,
    St: Store,
{
    type Item = V;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();
        let source = this.source;
        let active = this.active.get_or_insert_with(|| source());
        active.poll_next_unpin(cx)
    }
}

/// Input of [`select_lazy`].
pub struct SelectLazy<St: Store, T> {
    store: St,
    selector: Selector<St::State, Lazy<T>>,
    load_action: Option<St::Action>,
    when: Option<Selector<St::State, bool>>,
}

impl<St: Store, T> SelectLazy<St, T> {
    pub fn new(store: St, selector: Selector<St::State, Lazy<T>>) -> Self {
        SelectLazy {
            store,
            selector,
            load_action: None,
            when: None,
        }
    }

    /// Action dispatched when the value has neither been fetched nor is pending.
    pub fn load_action(self, action: St::Action) -> Self {
        SelectLazy {
            load_action: Some(action),
            ..self
        }
    }

    /// Guard consulted before every load. Without one, loads are always allowed.
    pub fn when(self, guard: Selector<St::State, bool>) -> Self {
        SelectLazy {
            when: Some(guard),
            ..self
        }
    }
}

/// Observes a lazy value in the store and triggers its load when needed.
///
/// For every emission of the selected value the guard is read once. If the
/// value is neither fetched nor pending, the guard holds and a load action is
/// configured, the action is dispatched before the emission is forwarded.
/// A newer emission cancels the guard read of an older one.
pub fn select_lazy<St, T>(input: SelectLazy<St, T>) -> LazyQuery<Lazy<T>, St>
where
    St: Store,
    St::Action: Clone + Sync,
    T: Clone + PartialEq + Send + Sync + 'static,
{
    let SelectLazy {
        store,
        selector,
        load_action,
        when,
    } = input;

    let query_store = store.clone();
    let source = move || -> BoxStream<'static, Lazy<T>> {
        let store = store.clone();
        let load_action = load_action.clone();
        let when = when.clone();

        store
            .select(&selector)
            .switch_map(move |lazy: Lazy<T>| {
                let store = store.clone();
                let load_action = load_action.clone();
                let when = when.clone();

                stream::once(async move {
                    let can_load = match &when {
                        Some(guard) => snapshot(&store, guard).await.unwrap_or(false),
                        None => true,
                    };

                    match load_action {
                        Some(action) if lazy.should_load() && can_load => {
                            debug!("lazy value not fetched, dispatching load action");
                            store.dispatch(action);
                        }
                        _ => trace!(
                            fetched = lazy.fetched,
                            pending = lazy.pending,
                            can_load,
                            "lazy load not triggered"
                        ),
                    }

                    lazy
                })
            })
            .boxed()
    };

    LazyQuery::new(query_store, Arc::new(source))
}

/// Tuples of 2 to 8 queries that [`combine_lazy`] accepts.
pub trait CombineLazy<St: Store> {
    type Output: Clone + Send + 'static;

    fn into_source(self) -> LazySource<Self::Output>;
}

macro_rules! impl_combine_lazy {
    ($($value:ident $query:ident),+) => {
        impl<St, $($value),+> CombineLazy<St> for ($(LazyQuery<$value, St>,)+)
        where
            St: Store,
            $($value: Clone + Send + 'static,)+
        {
            type Output = ($($value,)+);

            fn into_source(self) -> LazySource<Self::Output> {
                let ($($query,)+) = self;
                $(let $query = $query.source;)+
                Arc::new(move || {
                    nest_combine!($(($query)()),+)
                        .map(|nest_pattern!($($query),+)| ($($query,)+))
                        .boxed()
                })
            }
        }
    };
}

impl_combine_lazy!(T1 q1, T2 q2);
impl_combine_lazy!(T1 q1, T2 q2, T3 q3);
impl_combine_lazy!(T1 q1, T2 q2, T3 q3, T4 q4);
impl_combine_lazy!(T1 q1, T2 q2, T3 q3, T4 q4, T5 q5);
impl_combine_lazy!(T1 q1, T2 q2, T3 q3, T4 q4, T5 q5, T6 q6);
impl_combine_lazy!(T1 q1, T2 q2, T3 q3, T4 q4, T5 q5, T6 q6, T7 q7);
impl_combine_lazy!(T1 q1, T2 q2, T3 q3, T4 q4, T5 q5, T6 q6, T7 q7, T8 q8);

/// Combines the latest snapshots of several queries into one tuple query.
///
/// Nothing is emitted until every query has emitted once; after that every
/// emission of any input yields one tuple. The result has the same
/// [`select`](LazyQuery::select) capability as a single query.
pub fn combine_lazy<St, C>(store: &St, lazies: C) -> LazyQuery<C::Output, St>
where
    St: Store,
    C: CombineLazy<St>,
{
    LazyQuery::new(store.clone(), lazies.into_source())
}
