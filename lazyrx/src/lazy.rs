use crate::{LazyError, LoadResult};

/// A piece of remotely sourced state together with its fetch flags.
///
/// `data` holds a caller supplied placeholder until the first load settles.
/// The flags are only ever changed by the store (its reducers or loaders);
/// the stream operators in this crate read `fetched` and `pending` and never
/// touch `error`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Lazy<T> {
    pub fetched: bool,
    pub pending: bool,
    pub error: Option<LazyError>,
    pub data: T,
}

/// Creates a lazy value that has not been fetched yet, carrying `data` as its
/// placeholder.
pub fn create_lazy<T>(data: T) -> Lazy<T> {
    Lazy::new(data)
}

impl<T> Lazy<T> {
    pub fn new(data: T) -> Self {
        Lazy {
            fetched: false,
            pending: false,
            error: None,
            data,
        }
    }

    /// Fetched and not currently reloading.
    pub fn is_ready(&self) -> bool {
        self.fetched && !self.pending
    }

    /// Neither fetched nor in flight, so a load may be triggered.
    pub fn should_load(&self) -> bool {
        !self.fetched && !self.pending
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Borrows the data, whatever the flags say.
    pub fn data_ref(&self) -> &T {
        &self.data
    }

    /// Takes the data, dropping the flags.
    pub fn into_data(self) -> T {
        self.data
    }

    pub fn map<U, F>(self, f: F) -> Lazy<U>
    where
        F: FnOnce(T) -> U,
    {
        Lazy {
            fetched: self.fetched,
            pending: self.pending,
            error: self.error,
            data: f(self.data),
        }
    }

    /// Reducer helper: a load has been issued. Data and flags are kept.
    pub fn start_loading(self) -> Self {
        Lazy {
            pending: true,
            ..self
        }
    }

    /// Reducer helper: the load succeeded with `data`.
    pub fn resolve(self, data: T) -> Self {
        Lazy {
            fetched: true,
            pending: false,
            error: None,
            data,
        }
    }

    /// Reducer helper: the load failed. The previous data is retained.
    pub fn reject(self, error: LazyError) -> Self {
        Lazy {
            fetched: true,
            pending: false,
            error: Some(error),
            ..self
        }
    }

    /// Settles the slot from any loader outcome.
    pub fn settle<R>(self, result: R) -> Self
    where
        R: LoadResult<T>,
    {
        match result.into_result() {
            Ok(data) => self.resolve(data),
            Err(error) => self.reject(error),
        }
    }
}

impl<T> From<T> for Lazy<T> {
    fn from(data: T) -> Self {
        Lazy::new(data)
    }
}
