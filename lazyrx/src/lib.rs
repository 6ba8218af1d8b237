//! Lazily loaded remote data on top of a Redux-style store.
//!
//! A [`Lazy`] value carries `fetched`/`pending`/`error` flags next to its data.
//! [`select_lazy`] watches one in the store and dispatches its load action the
//! first time it is seen unloaded, [`LazyStreamExt`] waits on readiness, and
//! [`combine_lazy`] joins several queries into one.

mod combine_latest;
mod error;
mod lazy;
mod lazy_query;
mod load_result;
mod macros;
mod selector;
mod state_store;
mod store;
mod stream_ext;
pub mod mock;

#[cfg(test)]
mod unit_tests;

pub use combine_latest::*;
pub use error::*;
pub use lazy::*;
pub use lazy_query::*;
pub use load_result::*;
pub use selector::*;
pub use state_store::*;
pub use store::*;
pub use stream_ext::*;

pub trait State: Clone + Send + Sync + 'static {}
