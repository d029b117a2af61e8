//! `AsyncComputation`: a deferred, fallible asynchronous computation over an
//! input. The most general shape of the async family.

use std::future::Future;

use crate::effect::async_io::AsyncIO;
use crate::effect::async_safe_computation::AsyncSafeComputation;
use crate::effect::async_task::AsyncTask;
use crate::effect::bind::BindInput;
use crate::effect::computation::Computation;
use crate::effect::safe_computation::SafeComputation;
use crate::effect::BoxFuture;
use crate::either::Either;
use crate::result::{ResultExt, ZipResults, ZipResultsWidened};

/// Function type for AsyncComputation internals
type AsyncComputationFn<T, E, I> = Box<dyn FnOnce(I) -> BoxFuture<'static, Result<T, E>> + Send>;

/// A deferred computation `(I) -> Future<Result<T, E>>`.
///
/// # Examples
///
/// ```
/// use wellspring::AsyncComputation;
///
/// # tokio_test::block_on(async {
/// let lookup = AsyncComputation::new(|id: u32| async move {
///     if id == 1 { Ok("root") } else { Err(format!("no user {}", id)) }
/// });
/// assert_eq!(lookup.run(1).await, Ok("root"));
/// # });
/// ```
pub struct AsyncComputation<T, E, I> {
    run_fn: AsyncComputationFn<T, E, I>,
}

impl<T, E, I> std::fmt::Debug for AsyncComputation<T, E, I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncComputation")
            .field("run_fn", &"<function>")
            .finish()
    }
}

impl<T, E, I> AsyncComputation<T, E, I>
where
    T: Send + 'static,
    E: Send + 'static,
    I: Send + 'static,
{
    /// Wrap a closure producing a future of a `Result`.
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: FnOnce(I) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        AsyncComputation {
            run_fn: Box::new(move |input| Box::pin(f(input))),
        }
    }

    /// Ignore the input and succeed with `value`.
    pub fn pure(value: T) -> Self {
        AsyncComputation::new(move |_| async move { Ok(value) })
    }

    /// Ignore the input and fail with `error`.
    pub fn fail(error: E) -> Self {
        AsyncComputation::new(move |_| async move { Err(error) })
    }

    /// Ignore the input and return `result`.
    pub fn from_result(result: Result<T, E>) -> Self {
        AsyncComputation::new(move |_| async move { result })
    }

    /// Run against `input`.
    pub async fn run(self, input: I) -> Result<T, E> {
        (self.run_fn)(input).await
    }

    /// Transform the success value.
    pub fn map<U, F>(self, f: F) -> AsyncComputation<U, E, I>
    where
        F: FnOnce(T) -> U + Send + 'static,
        U: Send + 'static,
    {
        AsyncComputation::new(move |input| async move { self.run(input).await.map(f) })
    }

    /// Transform the error value.
    pub fn map_err<E2, F>(self, f: F) -> AsyncComputation<T, E2, I>
    where
        F: FnOnce(E) -> E2 + Send + 'static,
        E2: Send + 'static,
    {
        AsyncComputation::new(move |input| async move { self.run(input).await.map_err(f) })
    }

    /// Adapt the input through `f` before it reaches this computation.
    pub fn contramap<I0, F>(self, f: F) -> AsyncComputation<T, E, I0>
    where
        F: FnOnce(I0) -> I + Send + 'static,
        I0: Send + 'static,
    {
        AsyncComputation::new(move |input| self.run(f(input)))
    }

    /// Chain a dependent computation over the same input.
    pub fn flat_map<U, F>(self, f: F) -> AsyncComputation<U, E, I>
    where
        F: FnOnce(T) -> AsyncComputation<U, E, I> + Send + 'static,
        U: Send + 'static,
        I: Clone,
    {
        AsyncComputation::new(move |input: I| async move {
            let value = self.run(input.clone()).await?;
            f(value).run(input).await
        })
    }

    /// Apply the function produced by `f`.
    ///
    /// Both run concurrently; this computation's error wins.
    pub fn apply<U, F>(
        self,
        f: impl Into<AsyncComputation<F, E, I>>,
    ) -> AsyncComputation<U, E, I>
    where
        F: FnOnce(T) -> U + Send + 'static,
        U: Send + 'static,
        I: Clone,
    {
        let f = f.into();
        AsyncComputation::new(move |input: I| async move {
            let (value, func) = futures::join!(self.run(input.clone()), f.run(input));
            value.apply(func)
        })
    }

    /// Pair with another computation of the same error type. Both run
    /// concurrently; the first failure by position is reported.
    pub fn zip<U>(
        self,
        other: impl Into<AsyncComputation<U, E, I>>,
    ) -> AsyncComputation<(T, U), E, I>
    where
        U: Send + 'static,
        I: Clone,
    {
        let other = other.into();
        AsyncComputation::new(move |input: I| async move {
            ZipResults::zip_all(futures::join!(self.run(input.clone()), other.run(input)))
        })
    }

    /// Pair with a computation of another error type, widening into `W`.
    pub fn zip_widened<U, E2, W>(
        self,
        other: impl Into<AsyncComputation<U, E2, I>>,
    ) -> AsyncComputation<(T, U), W, I>
    where
        U: Send + 'static,
        E: Into<W>,
        E2: Into<W> + Send + 'static,
        W: Send + 'static,
        I: Clone,
    {
        let other = other.into();
        AsyncComputation::new(move |input: I| async move {
            ZipResultsWidened::<W>::zip_all_widened(futures::join!(
                self.run(input.clone()),
                other.run(input)
            ))
        })
    }

    /// Combine with another computation through `f`.
    pub fn zip_with<U, R, F>(
        self,
        other: impl Into<AsyncComputation<U, E, I>>,
        f: F,
    ) -> AsyncComputation<R, E, I>
    where
        U: Send + 'static,
        R: Send + 'static,
        F: FnOnce(T, U) -> R + Send + 'static,
        I: Clone,
    {
        self.zip(other).map(move |(a, b)| f(a, b))
    }

    /// On success, discard the value and continue with `f`.
    pub fn then_do<U, F>(self, f: F) -> AsyncComputation<U, E, I>
    where
        F: FnOnce() -> U + Send + 'static,
        U: Send + 'static,
    {
        self.map(move |_| f())
    }

    /// On success, continue with an IO, sync or async.
    pub fn then_do_io<U>(self, next: impl Into<AsyncIO<U>>) -> AsyncComputation<U, E, I>
    where
        U: Send + 'static,
    {
        let next = next.into();
        AsyncComputation::new(move |input| async move {
            self.run(input).await?;
            Ok(next.run().await)
        })
    }

    /// On success, continue with a task sharing the error type.
    pub fn then_do_task<U>(self, next: impl Into<AsyncTask<U, E>>) -> AsyncComputation<U, E, I>
    where
        U: Send + 'static,
    {
        let next = next.into();
        AsyncComputation::new(move |input| async move {
            self.run(input).await?;
            next.run().await
        })
    }

    /// On success, continue with a task of another error type; both errors
    /// widen into `W`.
    pub fn then_do_task_widened<U, E2, W>(
        self,
        next: impl Into<AsyncTask<U, E2>>,
    ) -> AsyncComputation<U, W, I>
    where
        U: Send + 'static,
        E: Into<W>,
        E2: Into<W> + Send + 'static,
        W: Send + 'static,
    {
        let next = next.into();
        AsyncComputation::new(move |input| async move {
            self.run(input).await.map_err(Into::into)?;
            next.run().await.map_err(Into::into)
        })
    }

    /// On success, continue with an infallible computation over the same
    /// input.
    pub fn then_do_safe<U>(
        self,
        next: impl Into<AsyncSafeComputation<U, I>>,
    ) -> AsyncComputation<U, E, I>
    where
        U: Send + 'static,
        I: Clone,
    {
        let next = next.into();
        AsyncComputation::new(move |input: I| async move {
            self.run(input.clone()).await?;
            Ok(next.run(input).await)
        })
    }

    /// On success, continue with another computation over the same input.
    pub fn then_do_computation<U>(
        self,
        next: impl Into<AsyncComputation<U, E, I>>,
    ) -> AsyncComputation<U, E, I>
    where
        U: Send + 'static,
        I: Clone,
    {
        let next = next.into();
        self.flat_map(move |_| next)
    }

    /// On success, continue with a computation of another error type; both
    /// errors widen into `W`.
    pub fn then_do_computation_widened<U, E2, W>(
        self,
        next: impl Into<AsyncComputation<U, E2, I>>,
    ) -> AsyncComputation<U, W, I>
    where
        U: Send + 'static,
        E: Into<W>,
        E2: Into<W> + Send + 'static,
        W: Send + 'static,
        I: Clone,
    {
        let next = next.into();
        AsyncComputation::new(move |input: I| async move {
            self.run(input.clone()).await.map_err(Into::into)?;
            next.run(input).await.map_err(Into::into)
        })
    }

    /// Recover from a failure with `f`; the result cannot fail.
    pub fn or_else_do<U, F>(self, f: F) -> AsyncSafeComputation<Either<T, U>, I>
    where
        F: FnOnce(E) -> U + Send + 'static,
        U: Send + 'static,
    {
        AsyncSafeComputation::new(move |input| async move {
            match self.run(input).await {
                Ok(value) => Either::Left(value),
                Err(e) => Either::Right(f(e)),
            }
        })
    }

    /// Recover from a failure by running `fallback`.
    pub fn or_else_do_io<U>(
        self,
        fallback: impl Into<AsyncIO<U>>,
    ) -> AsyncSafeComputation<Either<T, U>, I>
    where
        U: Send + 'static,
    {
        let fallback = fallback.into();
        AsyncSafeComputation::new(move |input| async move {
            match self.run(input).await {
                Ok(value) => Either::Left(value),
                Err(_) => Either::Right(fallback.run().await),
            }
        })
    }

    /// Recover from a failure with an infallible computation over the same
    /// input.
    pub fn or_else_do_safe<U>(
        self,
        fallback: impl Into<AsyncSafeComputation<U, I>>,
    ) -> AsyncSafeComputation<Either<T, U>, I>
    where
        U: Send + 'static,
        I: Clone,
    {
        let fallback = fallback.into();
        AsyncSafeComputation::new(move |input: I| async move {
            match self.run(input.clone()).await {
                Ok(value) => Either::Left(value),
                Err(_) => Either::Right(fallback.run(input).await),
            }
        })
    }

    /// Recover from a failure with a fallback task whose error becomes the
    /// result's error.
    pub fn or_else_do_task<U, E2>(
        self,
        fallback: impl Into<AsyncTask<U, E2>>,
    ) -> AsyncComputation<Either<T, U>, E2, I>
    where
        U: Send + 'static,
        E2: Send + 'static,
    {
        let fallback = fallback.into();
        AsyncComputation::new(move |input| async move {
            match self.run(input).await {
                Ok(value) => Ok(Either::Left(value)),
                Err(_) => fallback.run().await.map(Either::Right),
            }
        })
    }

    /// Recover from a failure with a fallback computation over the same
    /// input.
    pub fn or_else_do_computation<U, E2>(
        self,
        fallback: impl Into<AsyncComputation<U, E2, I>>,
    ) -> AsyncComputation<Either<T, U>, E2, I>
    where
        U: Send + 'static,
        E2: Send + 'static,
        I: Clone,
    {
        let fallback = fallback.into();
        AsyncComputation::new(move |input: I| async move {
            match self.run(input.clone()).await {
                Ok(value) => Ok(Either::Left(value)),
                Err(_) => fallback.run(input).await.map(Either::Right),
            }
        })
    }

    /// Fix the input, producing an [`AsyncTask`].
    pub fn bind_input(self, input: I) -> AsyncTask<T, E> {
        AsyncTask::new(move || self.run(input))
    }

    /// Run inside `span`.
    #[cfg(feature = "tracing")]
    pub fn instrument(self, span: tracing::Span) -> AsyncComputation<T, E, I> {
        use tracing::Instrument as _;
        AsyncComputation::new(move |input| self.run(input).instrument(span))
    }
}

impl<T, E, I> BindInput for AsyncComputation<T, E, I>
where
    T: Send + 'static,
    E: Send + 'static,
    I: Send + 'static,
{
    type Input = I;
    type Bound = AsyncTask<T, E>;

    fn bind_input(self, input: I) -> AsyncTask<T, E> {
        AsyncComputation::bind_input(self, input)
    }
}

impl<T, E, I> From<Computation<T, E, I>> for AsyncComputation<T, E, I>
where
    T: Send + 'static,
    E: Send + 'static,
    I: Send + 'static,
{
    fn from(computation: Computation<T, E, I>) -> Self {
        computation.to_async()
    }
}

impl<T, E, I> From<SafeComputation<T, I>> for AsyncComputation<T, E, I>
where
    T: Send + 'static,
    E: Send + 'static,
    I: Send + 'static,
{
    fn from(computation: SafeComputation<T, I>) -> Self {
        computation.to_async().to_computation()
    }
}

impl<T, E, I> From<AsyncSafeComputation<T, I>> for AsyncComputation<T, E, I>
where
    T: Send + 'static,
    E: Send + 'static,
    I: Send + 'static,
{
    fn from(computation: AsyncSafeComputation<T, I>) -> Self {
        computation.to_computation()
    }
}
