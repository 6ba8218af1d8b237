use crate::LazyError;

/// Anything a loader computation may return.
///
/// Plain values succeed, `Result` errors become [`LazyError::Error`] and an
/// empty `Option` becomes [`LazyError::None`].
pub trait LoadResult<T> {
    fn into_result(self) -> Result<T, LazyError>;
}

impl<T> LoadResult<T> for T {
    fn into_result(self) -> Result<T, LazyError> {
        Ok(self)
    }
}

impl<T, E> LoadResult<T> for Result<T, E>
where
    E: ToString,
{
    fn into_result(self) -> Result<T, LazyError> {
        self.map_err(|error| LazyError::Error(error.to_string()))
    }
}

impl<T> LoadResult<T> for Option<T> {
    fn into_result(self) -> Result<T, LazyError> {
        self.ok_or(LazyError::None)
    }
}
