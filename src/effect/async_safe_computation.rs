//! `AsyncSafeComputation`: a deferred, infallible asynchronous computation
//! over an input.

use std::future::Future;

use crate::effect::async_computation::AsyncComputation;
use crate::effect::async_io::AsyncIO;
use crate::effect::async_task::AsyncTask;
use crate::effect::bind::BindInput;
use crate::effect::safe_computation::SafeComputation;
use crate::effect::BoxFuture;

/// Function type for AsyncSafeComputation internals
type AsyncSafeFn<T, I> = Box<dyn FnOnce(I) -> BoxFuture<'static, T> + Send>;

/// A deferred computation `(I) -> Future<T>` that cannot fail.
pub struct AsyncSafeComputation<T, I> {
    run_fn: AsyncSafeFn<T, I>,
}

impl<T, I> std::fmt::Debug for AsyncSafeComputation<T, I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncSafeComputation")
            .field("run_fn", &"<function>")
            .finish()
    }
}

impl<T, I> AsyncSafeComputation<T, I>
where
    T: Send + 'static,
    I: Send + 'static,
{
    /// Wrap a closure producing a future.
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: FnOnce(I) -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        AsyncSafeComputation {
            run_fn: Box::new(move |input| Box::pin(f(input))),
        }
    }

    /// Ignore the input and yield `value`.
    pub fn pure(value: T) -> Self {
        AsyncSafeComputation::new(move |_| async move { value })
    }

    /// Run against `input`.
    pub async fn run(self, input: I) -> T {
        (self.run_fn)(input).await
    }

    /// Transform the produced value.
    pub fn map<U, F>(self, f: F) -> AsyncSafeComputation<U, I>
    where
        F: FnOnce(T) -> U + Send + 'static,
        U: Send + 'static,
    {
        AsyncSafeComputation::new(move |input| async move { f(self.run(input).await) })
    }

    /// Adapt the input through `f` before it reaches this computation.
    pub fn contramap<I0, F>(self, f: F) -> AsyncSafeComputation<T, I0>
    where
        F: FnOnce(I0) -> I + Send + 'static,
        I0: Send + 'static,
    {
        AsyncSafeComputation::new(move |input| self.run(f(input)))
    }

    /// Chain a dependent computation over the same input.
    pub fn flat_map<U, F>(self, f: F) -> AsyncSafeComputation<U, I>
    where
        F: FnOnce(T) -> AsyncSafeComputation<U, I> + Send + 'static,
        U: Send + 'static,
        I: Clone,
    {
        AsyncSafeComputation::new(move |input: I| async move {
            let value = self.run(input.clone()).await;
            f(value).run(input).await
        })
    }

    /// Apply the function produced by `f`. Both run concurrently.
    pub fn apply<U, F>(self, f: impl Into<AsyncSafeComputation<F, I>>) -> AsyncSafeComputation<U, I>
    where
        F: FnOnce(T) -> U + Send + 'static,
        U: Send + 'static,
        I: Clone,
    {
        let f = f.into();
        AsyncSafeComputation::new(move |input: I| async move {
            let (value, func) = futures::join!(self.run(input.clone()), f.run(input));
            func(value)
        })
    }

    /// Pair with another computation over the same input. Both run
    /// concurrently.
    pub fn zip<U>(
        self,
        other: impl Into<AsyncSafeComputation<U, I>>,
    ) -> AsyncSafeComputation<(T, U), I>
    where
        U: Send + 'static,
        I: Clone,
    {
        let other = other.into();
        AsyncSafeComputation::new(move |input: I| async move {
            futures::join!(self.run(input.clone()), other.run(input))
        })
    }

    /// Combine with another computation through `f`.
    pub fn zip_with<U, R, F>(
        self,
        other: impl Into<AsyncSafeComputation<U, I>>,
        f: F,
    ) -> AsyncSafeComputation<R, I>
    where
        U: Send + 'static,
        R: Send + 'static,
        F: FnOnce(T, U) -> R + Send + 'static,
        I: Clone,
    {
        self.zip(other).map(move |(a, b)| f(a, b))
    }

    /// Discard the value and continue with `f`.
    pub fn then_do<U, F>(self, f: F) -> AsyncSafeComputation<U, I>
    where
        F: FnOnce() -> U + Send + 'static,
        U: Send + 'static,
    {
        self.map(move |_| f())
    }

    /// Discard the value and continue with an IO, sync or async.
    pub fn then_do_io<U>(self, next: impl Into<AsyncIO<U>>) -> AsyncSafeComputation<U, I>
    where
        U: Send + 'static,
    {
        let next = next.into();
        AsyncSafeComputation::new(move |input| async move {
            self.run(input).await;
            next.run().await
        })
    }

    /// Discard the value and continue with another infallible computation
    /// over the same input.
    pub fn then_do_safe<U>(
        self,
        next: impl Into<AsyncSafeComputation<U, I>>,
    ) -> AsyncSafeComputation<U, I>
    where
        U: Send + 'static,
        I: Clone,
    {
        let next = next.into();
        self.flat_map(move |_| next)
    }

    /// Discard the value and continue with a task; the result can now fail.
    pub fn then_do_task<U, E>(self, next: impl Into<AsyncTask<U, E>>) -> AsyncComputation<U, E, I>
    where
        U: Send + 'static,
        E: Send + 'static,
    {
        let next = next.into();
        AsyncComputation::new(move |input| async move {
            self.run(input).await;
            next.run().await
        })
    }

    /// Discard the value and continue with a fallible computation over the
    /// same input.
    pub fn then_do_computation<U, E>(
        self,
        next: impl Into<AsyncComputation<U, E, I>>,
    ) -> AsyncComputation<U, E, I>
    where
        U: Send + 'static,
        E: Send + 'static,
        I: Clone,
    {
        let next = next.into();
        AsyncComputation::new(move |input: I| async move {
            self.run(input.clone()).await;
            next.run(input).await
        })
    }

    /// Fix the input, producing an [`AsyncIO`].
    pub fn bind_input(self, input: I) -> AsyncIO<T> {
        AsyncIO::new(move || self.run(input))
    }

    /// View as a computation that never fails.
    pub fn to_computation<E>(self) -> AsyncComputation<T, E, I>
    where
        E: Send + 'static,
    {
        AsyncComputation::new(move |input| async move { Ok(self.run(input).await) })
    }

    /// Run inside `span`.
    #[cfg(feature = "tracing")]
    pub fn instrument(self, span: tracing::Span) -> AsyncSafeComputation<T, I> {
        use tracing::Instrument as _;
        AsyncSafeComputation::new(move |input| self.run(input).instrument(span))
    }
}

impl<T, I> BindInput for AsyncSafeComputation<T, I>
where
    T: Send + 'static,
    I: Send + 'static,
{
    type Input = I;
    type Bound = AsyncIO<T>;

    fn bind_input(self, input: I) -> AsyncIO<T> {
        AsyncSafeComputation::bind_input(self, input)
    }
}

impl<T, I> From<SafeComputation<T, I>> for AsyncSafeComputation<T, I>
where
    T: Send + 'static,
    I: Send + 'static,
{
    fn from(computation: SafeComputation<T, I>) -> Self {
        computation.to_async()
    }
}
