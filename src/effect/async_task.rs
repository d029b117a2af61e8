//! `AsyncTask`: a deferred, fallible asynchronous computation.

use std::future::Future;

use crate::effect::async_computation::AsyncComputation;
use crate::effect::async_io::AsyncIO;
use crate::effect::io::IO;
use crate::effect::task::Task;
use crate::effect::BoxFuture;
use crate::either::Either;
use crate::result::{ResultExt, ZipResults, ZipResultsWidened};

/// Function type for AsyncTask internals
type AsyncTaskFn<T, E> = Box<dyn FnOnce() -> BoxFuture<'static, Result<T, E>> + Send>;

/// A deferred computation `() -> Future<Result<T, E>>`.
///
/// # Examples
///
/// ```
/// use wellspring::AsyncTask;
///
/// # tokio_test::block_on(async {
/// let task = AsyncTask::<_, String>::new(|| async { Ok(21) }).map(|x| x * 2);
/// assert_eq!(task.run().await, Ok(42));
///
/// let failed = AsyncTask::<i32, _>::fail("boom".to_string());
/// assert_eq!(failed.run().await, Err("boom".to_string()));
/// # });
/// ```
pub struct AsyncTask<T, E> {
    run_fn: AsyncTaskFn<T, E>,
}

impl<T, E> std::fmt::Debug for AsyncTask<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncTask")
            .field("run_fn", &"<function>")
            .finish()
    }
}

impl<T, E> AsyncTask<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Wrap a closure producing a future of a `Result`.
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        AsyncTask {
            run_fn: Box::new(move || Box::pin(f())),
        }
    }

    /// Succeed with `value`.
    pub fn pure(value: T) -> Self {
        AsyncTask::new(move || async move { Ok(value) })
    }

    /// Fail with `error`.
    pub fn fail(error: E) -> Self {
        AsyncTask::new(move || async move { Err(error) })
    }

    /// Return `result` when run.
    pub fn from_result(result: Result<T, E>) -> Self {
        AsyncTask::new(move || async move { result })
    }

    /// Run the computation.
    pub async fn run(self) -> Result<T, E> {
        (self.run_fn)().await
    }

    /// Transform the success value.
    pub fn map<U, F>(self, f: F) -> AsyncTask<U, E>
    where
        F: FnOnce(T) -> U + Send + 'static,
        U: Send + 'static,
    {
        AsyncTask::new(move || async move { self.run().await.map(f) })
    }

    /// Transform the error value.
    pub fn map_err<E2, F>(self, f: F) -> AsyncTask<T, E2>
    where
        F: FnOnce(E) -> E2 + Send + 'static,
        E2: Send + 'static,
    {
        AsyncTask::new(move || async move { self.run().await.map_err(f) })
    }

    /// Chain a dependent task. It is created only after this one succeeds.
    pub fn flat_map<U, F>(self, f: F) -> AsyncTask<U, E>
    where
        F: FnOnce(T) -> AsyncTask<U, E> + Send + 'static,
        U: Send + 'static,
    {
        AsyncTask::new(move || async move {
            let value = self.run().await?;
            f(value).run().await
        })
    }

    /// Apply the function produced by `f`.
    ///
    /// Both run concurrently; this task's error wins.
    pub fn apply<U, F>(self, f: impl Into<AsyncTask<F, E>>) -> AsyncTask<U, E>
    where
        F: FnOnce(T) -> U + Send + 'static,
        U: Send + 'static,
    {
        let f = f.into();
        AsyncTask::new(move || async move {
            let (value, func) = futures::join!(self.run(), f.run());
            value.apply(func)
        })
    }

    /// Pair with another task of the same error type.
    ///
    /// Both start together and run to completion; the first failure by
    /// position is reported.
    ///
    /// # Examples
    ///
    /// ```
    /// use wellspring::AsyncTask;
    ///
    /// # tokio_test::block_on(async {
    /// let both = AsyncTask::<_, String>::pure(1).zip(AsyncTask::pure("one"));
    /// assert_eq!(both.run().await, Ok((1, "one")));
    /// # });
    /// ```
    pub fn zip<U>(self, other: impl Into<AsyncTask<U, E>>) -> AsyncTask<(T, U), E>
    where
        U: Send + 'static,
    {
        let other = other.into();
        AsyncTask::new(move || async move {
            ZipResults::zip_all(futures::join!(self.run(), other.run()))
        })
    }

    /// Pair with a task of another error type, widening into `W`.
    pub fn zip_widened<U, E2, W>(self, other: impl Into<AsyncTask<U, E2>>) -> AsyncTask<(T, U), W>
    where
        U: Send + 'static,
        E: Into<W>,
        E2: Into<W> + Send + 'static,
        W: Send + 'static,
    {
        let other = other.into();
        AsyncTask::new(move || async move {
            ZipResultsWidened::<W>::zip_all_widened(futures::join!(self.run(), other.run()))
        })
    }

    /// Combine with another task through `f`.
    pub fn zip_with<U, R, F>(self, other: impl Into<AsyncTask<U, E>>, f: F) -> AsyncTask<R, E>
    where
        U: Send + 'static,
        R: Send + 'static,
        F: FnOnce(T, U) -> R + Send + 'static,
    {
        self.zip(other).map(move |(a, b)| f(a, b))
    }

    /// On success, discard the value and continue with `f`.
    pub fn then_do<U, F>(self, f: F) -> AsyncTask<U, E>
    where
        F: FnOnce() -> U + Send + 'static,
        U: Send + 'static,
    {
        self.map(move |_| f())
    }

    /// On success, continue with an IO, sync or async.
    pub fn then_do_io<U>(self, next: impl Into<AsyncIO<U>>) -> AsyncTask<U, E>
    where
        U: Send + 'static,
    {
        let next = next.into();
        AsyncTask::new(move || async move {
            self.run().await?;
            Ok(next.run().await)
        })
    }

    /// On success, continue with a task sharing the error type.
    pub fn then_do_task<U>(self, next: impl Into<AsyncTask<U, E>>) -> AsyncTask<U, E>
    where
        U: Send + 'static,
    {
        let next = next.into();
        self.flat_map(move |_| next)
    }

    /// On success, continue with a task of another error type; both
    /// errors widen into `W`.
    pub fn then_do_task_widened<U, E2, W>(
        self,
        next: impl Into<AsyncTask<U, E2>>,
    ) -> AsyncTask<U, W>
    where
        U: Send + 'static,
        E: Into<W>,
        E2: Into<W> + Send + 'static,
        W: Send + 'static,
    {
        let next = next.into();
        AsyncTask::new(move || async move {
            self.run().await.map_err(Into::into)?;
            next.run().await.map_err(Into::into)
        })
    }

    /// Recover from a failure with `f`; the result cannot fail.
    pub fn or_else_do<U, F>(self, f: F) -> AsyncIO<Either<T, U>>
    where
        F: FnOnce(E) -> U + Send + 'static,
        U: Send + 'static,
    {
        AsyncIO::new(move || async move {
            match self.run().await {
                Ok(value) => Either::Left(value),
                Err(e) => Either::Right(f(e)),
            }
        })
    }

    /// Recover from a failure by running `fallback`.
    pub fn or_else_do_io<U>(self, fallback: impl Into<AsyncIO<U>>) -> AsyncIO<Either<T, U>>
    where
        U: Send + 'static,
    {
        let fallback = fallback.into();
        AsyncIO::new(move || async move {
            match self.run().await {
                Ok(value) => Either::Left(value),
                Err(_) => Either::Right(fallback.run().await),
            }
        })
    }

    /// Recover from a failure with a fallback task whose error becomes the
    /// result's error.
    pub fn or_else_do_task<U, E2>(
        self,
        fallback: impl Into<AsyncTask<U, E2>>,
    ) -> AsyncTask<Either<T, U>, E2>
    where
        U: Send + 'static,
        E2: Send + 'static,
    {
        let fallback = fallback.into();
        AsyncTask::new(move || async move {
            match self.run().await {
                Ok(value) => Ok(Either::Left(value)),
                Err(_) => fallback.run().await.map(Either::Right),
            }
        })
    }

    /// View as a computation that ignores its input.
    pub fn to_computation<I>(self) -> AsyncComputation<T, E, I>
    where
        I: Send + 'static,
    {
        AsyncComputation::new(move |_: I| self.run())
    }

    /// Run inside `span`.
    ///
    /// # Examples
    ///
    /// ```
    /// use wellspring::AsyncTask;
    ///
    /// # tokio_test::block_on(async {
    /// let task = AsyncTask::<_, String>::pure(42)
    ///     .instrument(tracing::info_span!("load_config", source = "defaults"));
    /// assert_eq!(task.run().await, Ok(42));
    /// # });
    /// ```
    #[cfg(feature = "tracing")]
    pub fn instrument(self, span: tracing::Span) -> AsyncTask<T, E> {
        use tracing::Instrument as _;
        AsyncTask::new(move || self.run().instrument(span))
    }

    /// Iterate `step` until it yields `Either::Right` or fails.
    ///
    /// Each step is awaited in turn inside a single future, so the loop
    /// neither nests futures nor grows the stack.
    pub fn tail_rec<S, F>(seed: S, mut step: F) -> AsyncTask<T, E>
    where
        S: Send + 'static,
        F: FnMut(S) -> AsyncTask<Either<S, T>, E> + Send + 'static,
    {
        AsyncTask::new(move || async move {
            let mut state = seed;
            loop {
                match step(state).run().await? {
                    Either::Left(next) => state = next,
                    Either::Right(done) => return Ok(done),
                }
            }
        })
    }
}

impl<T, E> From<Task<T, E>> for AsyncTask<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    fn from(task: Task<T, E>) -> Self {
        task.to_async()
    }
}

impl<T, E> From<IO<T>> for AsyncTask<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    fn from(io: IO<T>) -> Self {
        io.to_async().to_task()
    }
}

impl<T, E> From<AsyncIO<T>> for AsyncTask<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    fn from(io: AsyncIO<T>) -> Self {
        io.to_task()
    }
}
