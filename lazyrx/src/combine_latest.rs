use futures::stream::{Fuse, StreamExt};
use futures_core::stream::Stream;
use pin_project::pin_project;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Pairs the latest items of two streams.
///
/// Nothing is emitted until both sides have produced an item. After that,
/// every new item on either side produces exactly one pair. The stream ends
/// when both sides have ended, or as soon as one side ends without ever
/// having produced an item.
///
/// Items that are already queued on both sides when the stream is polled are
/// not paired in arrival order: the sides are taken in alternating turns, so a
/// pair may combine an item with one that arrived after it.
#[pin_project(project = CombineLatestProj)]
#[derive(Debug)]
#[must_use = "Streams do nothing unless polled"]
pub struct CombineLatest<A: Stream, B: Stream> {
    #[pin]
    left: Fuse<A>,
    #[pin]
    right: Fuse<B>,
    latest_left: Option<A::Item>,
    latest_right: Option<B::Item>,
    right_first: bool,
}

impl<A, B> CombineLatest<A, B>
where
    A: Stream,
    B: Stream,
{
    pub fn new(left: A, right: B) -> Self {
        CombineLatest {
            left: left.fuse(),
            right: right.fuse(),
            latest_left: None,
            latest_right: None,
            right_first: false,
        }
    }
}

impl<A, B> Stream for CombineLatest<A, B>
where
    A: Stream,
    B: Stream,
    A::Item: Clone,
    B::Item: Clone,
{
    type Item = (A::Item, B::Item);

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let CombineLatestProj {
            mut left,
            mut right,
            latest_left,
            latest_right,
            right_first,
        } = self.project();

        // Alternate which side goes first so a busy side cannot starve the other.
        let start_right = *right_first;
        *right_first = !*right_first;

        loop {
            let mut progressed = false;

            for poll_right in [start_right, !start_right] {
                let changed = if poll_right {
                    match right.as_mut().poll_next(cx) {
                        Poll::Ready(Some(value)) => {
                            *latest_right = Some(value);
                            true
                        }
                        _ => false,
                    }
                } else {
                    match left.as_mut().poll_next(cx) {
                        Poll::Ready(Some(value)) => {
                            *latest_left = Some(value);
                            true
                        }
                        _ => false,
                    }
                };

                if changed {
                    progressed = true;
                    if let (Some(l), Some(r)) = (latest_left.as_ref(), latest_right.as_ref()) {
                        return Poll::Ready(Some((l.clone(), r.clone())));
                    }
                }
            }

            let left_finished = left.is_done() && (right.is_done() || latest_left.is_none());
            let right_finished = right.is_done() && (left.is_done() || latest_right.is_none());
            if left_finished || right_finished {
                return Poll::Ready(None);
            }

            if !progressed {
                return Poll::Pending;
            }
        }
    }
}
