use crate::{Lazy, LazyError};
use futures_core::stream::Stream;
use pin_project::pin_project;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tracing::warn;

/// Extension trait that provides the lazy-value operators for Stream types.
///
/// This trait is implemented for all types that implement the `Stream` trait.
/// `first_not_pending` and `skip_until_lazy_loaded` wait on readiness
/// (`fetched && !pending`); `switch_map` is the latest-wins flattening used
/// by [`select_lazy`](crate::select_lazy).
pub trait LazyStreamExt: Stream {
    /// Maps every item to an inner stream and forwards the items of the most
    /// recent inner stream only.
    ///
    /// When the outer stream yields a new item, the current inner stream is
    /// dropped on the spot, before the new one is polled. The combined stream
    /// ends once the outer stream and the last inner stream have both ended.
    ///
    /// ## Examples
    ///
    /// ```
    /// use futures::stream::{self, StreamExt};
    /// use lazyrx::LazyStreamExt;
    ///
    /// async fn example() {
    ///     let values: Vec<i32> = stream::iter(vec![1, 2])
    ///         .switch_map(|n| stream::iter(vec![n, n * 10]))
    ///         .collect()
    ///         .await;
    ///     assert_eq!(values, vec![1, 10, 2, 20]);
    /// }
    /// ```
    fn switch_map<U, F>(self, f: F) -> SwitchMap<Self, U, F>
    where
        F: FnMut(Self::Item) -> U,
        U: Stream,
        Self: Sized,
    {
        SwitchMap {
            stream: self,
            inner: None,
            stream_done: false,
            f,
        }
    }

    /// Resolves to the data of the first ready snapshot.
    ///
    /// Snapshots that are unfetched or pending are skipped, however many of them
    /// arrive first. Resolves to [`LazyError::Incomplete`] if the stream ends
    /// before any snapshot is ready.
    fn first_not_pending<T>(self) -> FirstNotPending<Self>
    where
        Self: Stream<Item = Lazy<T>> + Sized,
    {
        FirstNotPending {
            stream: self,
            done: false,
        }
    }

    /// Discards items of this stream until `lazy` yields its first ready
    /// snapshot, then forwards every later item.
    ///
    /// The gate never closes again once it has opened. If `lazy` ends without
    /// ever being ready, this stream ends too.
    fn skip_until_lazy_loaded<L, T>(self, lazy: L) -> SkipUntilLazyLoaded<Self, L>
    where
        L: Stream<Item = Lazy<T>>,
        Self: Sized,
    {
        SkipUntilLazyLoaded {
            stream: self,
            gate: Some(lazy.first_not_pending()),
            done: false,
        }
    }
}
impl<T: ?Sized> LazyStreamExt for T where T: Stream {}

/// A stream that flattens the latest inner stream produced by a mapping function.
///
/// This stream is created by the `switch_map` method on `LazyStreamExt`.
#[pin_project(project = SwitchMapProj)]
#[derive(Debug)]
#[must_use = "Streams do nothing unless polled"]
pub struct SwitchMap<A, U, F> {
    #[pin]
    stream: A,
    #[pin]
    inner: Option<U>,
    stream_done: bool,
    f: F,
}

impl<A, U, F> Stream for SwitchMap<A, U, F>
where
    A: Stream,
    U: Stream,
    F: FnMut(A::Item) -> U,
{
    type Item = U::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let SwitchMapProj {
            mut stream,
            mut inner,
            stream_done,
            f,
        } = self.project();

        loop {
            if let Some(current) = inner.as_mut().as_pin_mut() {
                match current.poll_next(cx) {
                    Poll::Ready(Some(value)) => return Poll::Ready(Some(value)),
                    Poll::Ready(None) => inner.set(None),
                    Poll::Pending => {}
                }
            }

            if *stream_done {
                return if inner.is_none() {
                    Poll::Ready(None)
                } else {
                    Poll::Pending
                };
            }

            match stream.as_mut().poll_next(cx) {
                // Replacing the inner stream drops the previous one here.
                Poll::Ready(Some(item)) => inner.set(Some(f(item))),
                Poll::Ready(None) => *stream_done = true,
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

/// A future that resolves to the data of the first ready lazy snapshot.
///
/// This future is created by the `first_not_pending` method on `LazyStreamExt`.
#[pin_project(project = FirstNotPendingProj)]
#[derive(Debug)]
#[must_use = "Futures do nothing unless polled"]
pub struct FirstNotPending<A> {
    #[pin]
    stream: A,
    done: bool,
}

impl<A, T> Future for FirstNotPending<A>
where
    A: Stream<Item = Lazy<T>>,
{
    type Output = Result<T, LazyError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let FirstNotPendingProj { mut stream, done } = self.project();

        if *done {
            return Poll::Ready(Err(LazyError::Incomplete));
        }

        loop {
            match stream.as_mut().poll_next(cx) {
                Poll::Ready(Some(lazy)) => {
                    if lazy.is_ready() {
                        *done = true;
                        return Poll::Ready(Ok(lazy.data));
                    }
                }
                Poll::Ready(None) => {
                    *done = true;
                    return Poll::Ready(Err(LazyError::Incomplete));
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

/// A stream that drops items until a lazy value is first ready.
///
/// This stream is created by the `skip_until_lazy_loaded` method on `LazyStreamExt`.
#[pin_project(project = SkipUntilLazyLoadedProj)]
#[derive(Debug)]
#[must_use = "Streams do nothing unless polled"]
pub struct SkipUntilLazyLoaded<A, L> {
    #[pin]
    stream: A,
    #[pin]
    gate: Option<FirstNotPending<L>>,
    done: bool,
}

impl<A, L, T> Stream for SkipUntilLazyLoaded<A, L>
where
    A: Stream,
    L: Stream<Item = Lazy<T>>,
{
    type Item = A::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let SkipUntilLazyLoadedProj {
            mut stream,
            mut gate,
            done,
        } = self.project();

        if *done {
            return Poll::Ready(None);
        }

        loop {
            // The gate is re-checked before every source item so that items
            // arriving after readiness are never dropped.
            let gate_state = gate.as_mut().as_pin_mut().map(|pending| pending.poll(cx));
            match gate_state {
                Some(Poll::Ready(Ok(_))) => gate.set(None),
                Some(Poll::Ready(Err(error))) => {
                    warn!("lazy gate ended before it was ready: {}", error);
                    gate.set(None);
                    *done = true;
                    return Poll::Ready(None);
                }
                Some(Poll::Pending) | None => {}
            }

            match stream.as_mut().poll_next(cx) {
                Poll::Ready(Some(value)) => {
                    if gate.is_none() {
                        return Poll::Ready(Some(value));
                    }
                }
                Poll::Ready(None) => {
                    *done = true;
                    return Poll::Ready(None);
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
