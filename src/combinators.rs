use std::future::Future;

/// Asynchronous counterparts of `Result::{map, map_err, and_then, or_else}`.
///
/// Returned futures are lazy, transform is called only once the future is
/// polled and only for the matching variant. The other variant resolves on
/// the first poll without suspending. Dropping a returned future drops the
/// transform's future along with it.
///
/// ```
/// use futures_executor::block_on;
/// use result_extensions::AsyncOutcomeExt;
///
/// let doubled = block_on(Ok::<_, String>(2).async_map(|x| async move { x * 2 }));
/// assert_eq!(doubled, Ok(4));
///
/// let checked = block_on(Ok::<_, String>(2).async_and_then(|x| async move {
///     if x > 1 { Err(String::from("bad")) } else { Ok(x) }
/// }));
/// assert_eq!(checked, Err(String::from("bad")));
/// ```
pub trait AsyncOutcomeExt<S, F>: Sized {
    /// Transforms success payload, failure is passed through untouched.
    fn async_map<S2, T, Fut>(self, transform: T) -> impl Future<Output = Result<S2, F>>
    where
        T: FnOnce(S) -> Fut,
        Fut: Future<Output = S2>;

    /// Transforms failure payload, success is passed through untouched.
    fn async_map_err<F2, T, Fut>(self, transform: T) -> impl Future<Output = Result<S, F2>>
    where
        T: FnOnce(F) -> Fut,
        Fut: Future<Output = F2>;

    /// Chains fallible operation on success payload and returns its result as is.
    fn async_and_then<S2, T, Fut>(self, transform: T) -> impl Future<Output = Result<S2, F>>
    where
        T: FnOnce(S) -> Fut,
        Fut: Future<Output = Result<S2, F>>;

    /// Tries to recover from failure, returning recovery's result as is.
    fn async_or_else<F2, T, Fut>(self, transform: T) -> impl Future<Output = Result<S, F2>>
    where
        T: FnOnce(F) -> Fut,
        Fut: Future<Output = Result<S, F2>>;
}

impl<S, F> AsyncOutcomeExt<S, F> for Result<S, F> {
    fn async_map<S2, T, Fut>(self, transform: T) -> impl Future<Output = Result<S2, F>>
    where
        T: FnOnce(S) -> Fut,
        Fut: Future<Output = S2>,
    {
        async move {
            match self {
                Ok(value) => Ok(transform(value).await),
                Err(error) => Err(error),
            }
        }
    }

    fn async_map_err<F2, T, Fut>(self, transform: T) -> impl Future<Output = Result<S, F2>>
    where
        T: FnOnce(F) -> Fut,
        Fut: Future<Output = F2>,
    {
        async move {
            match self {
                Ok(value) => Ok(value),
                Err(error) => Err(transform(error).await),
            }
        }
    }

    fn async_and_then<S2, T, Fut>(self, transform: T) -> impl Future<Output = Result<S2, F>>
    where
        T: FnOnce(S) -> Fut,
        Fut: Future<Output = Result<S2, F>>,
    {
        async move {
            match self {
                Ok(value) => transform(value).await,
                Err(error) => Err(error),
            }
        }
    }

    fn async_or_else<F2, T, Fut>(self, transform: T) -> impl Future<Output = Result<S, F2>>
    where
        T: FnOnce(F) -> Fut,
        Fut: Future<Output = Result<S, F2>>,
    {
        async move {
            match self {
                Ok(value) => Ok(value),
                Err(error) => transform(error).await,
            }
        }
    }
}
