//! `AsyncIO`: a deferred, infallible asynchronous computation.

use std::future::Future;

use crate::effect::async_computation::AsyncComputation;
use crate::effect::async_safe_computation::AsyncSafeComputation;
use crate::effect::async_task::AsyncTask;
use crate::effect::io::IO;
use crate::effect::BoxFuture;

/// Function type for AsyncIO internals
type AsyncIoFn<T> = Box<dyn FnOnce() -> BoxFuture<'static, T> + Send>;

/// A deferred computation `() -> Future<T>` that cannot fail.
///
/// Nothing happens until the future returned by [`run`](AsyncIO::run) is
/// awaited.
///
/// # Examples
///
/// ```
/// use wellspring::AsyncIO;
///
/// # tokio_test::block_on(async {
/// let io = AsyncIO::pure(20).map(|x| x + 1).flat_map(|x| AsyncIO::pure(x * 2));
/// assert_eq!(io.run().await, 42);
/// # });
/// ```
pub struct AsyncIO<T> {
    run_fn: AsyncIoFn<T>,
}

impl<T> std::fmt::Debug for AsyncIO<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncIO")
            .field("run_fn", &"<function>")
            .finish()
    }
}

impl<T> AsyncIO<T>
where
    T: Send + 'static,
{
    /// Wrap a closure producing a future.
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        AsyncIO {
            run_fn: Box::new(move || Box::pin(f())),
        }
    }

    /// An effect that yields `value`.
    pub fn pure(value: T) -> Self {
        AsyncIO::new(move || async move { value })
    }

    /// Run the computation.
    pub async fn run(self) -> T {
        (self.run_fn)().await
    }

    /// Transform the produced value.
    pub fn map<U, F>(self, f: F) -> AsyncIO<U>
    where
        F: FnOnce(T) -> U + Send + 'static,
        U: Send + 'static,
    {
        AsyncIO::new(move || async move { f(self.run().await) })
    }

    /// Chain a dependent effect. It is created only after this one resolves.
    pub fn flat_map<U, F>(self, f: F) -> AsyncIO<U>
    where
        F: FnOnce(T) -> AsyncIO<U> + Send + 'static,
        U: Send + 'static,
    {
        AsyncIO::new(move || async move { f(self.run().await).run().await })
    }

    /// Apply the function produced by `f`. Both run concurrently.
    pub fn apply<U, F>(self, f: impl Into<AsyncIO<F>>) -> AsyncIO<U>
    where
        F: FnOnce(T) -> U + Send + 'static,
        U: Send + 'static,
    {
        let f = f.into();
        AsyncIO::new(move || async move {
            let (value, func) = futures::join!(self.run(), f.run());
            func(value)
        })
    }

    /// Pair with another effect. Both run concurrently.
    pub fn zip<U>(self, other: impl Into<AsyncIO<U>>) -> AsyncIO<(T, U)>
    where
        U: Send + 'static,
    {
        let other = other.into();
        AsyncIO::new(move || async move { futures::join!(self.run(), other.run()) })
    }

    /// Combine with another effect through `f`. Both run concurrently.
    pub fn zip_with<U, R, F>(self, other: impl Into<AsyncIO<U>>, f: F) -> AsyncIO<R>
    where
        U: Send + 'static,
        R: Send + 'static,
        F: FnOnce(T, U) -> R + Send + 'static,
    {
        self.zip(other).map(move |(a, b)| f(a, b))
    }

    /// Discard the value and continue with `f`.
    pub fn then_do<U, F>(self, f: F) -> AsyncIO<U>
    where
        F: FnOnce() -> U + Send + 'static,
        U: Send + 'static,
    {
        self.map(move |_| f())
    }

    /// Discard the value and continue with another IO, sync or async.
    pub fn then_do_io<U>(self, next: impl Into<AsyncIO<U>>) -> AsyncIO<U>
    where
        U: Send + 'static,
    {
        let next = next.into();
        self.flat_map(move |_| next)
    }

    /// Discard the value and continue with a task; the result can now fail.
    pub fn then_do_task<U, E>(self, next: impl Into<AsyncTask<U, E>>) -> AsyncTask<U, E>
    where
        U: Send + 'static,
        E: Send + 'static,
    {
        let next = next.into();
        AsyncTask::new(move || async move {
            self.run().await;
            next.run().await
        })
    }

    /// View as a task that never fails.
    pub fn to_task<E>(self) -> AsyncTask<T, E>
    where
        E: Send + 'static,
    {
        AsyncTask::new(move || async move { Ok(self.run().await) })
    }

    /// View as a computation that ignores its input.
    pub fn to_safe_computation<I>(self) -> AsyncSafeComputation<T, I>
    where
        I: Send + 'static,
    {
        AsyncSafeComputation::new(move |_: I| self.run())
    }

    /// View as a fallible computation that ignores its input and never fails.
    pub fn to_computation<E, I>(self) -> AsyncComputation<T, E, I>
    where
        E: Send + 'static,
        I: Send + 'static,
    {
        AsyncComputation::new(move |_: I| async move { Ok(self.run().await) })
    }

    /// Run inside `span`.
    #[cfg(feature = "tracing")]
    pub fn instrument(self, span: tracing::Span) -> AsyncIO<T> {
        use tracing::Instrument as _;
        AsyncIO::new(move || self.run().instrument(span))
    }
}

impl<T> From<IO<T>> for AsyncIO<T>
where
    T: Send + 'static,
{
    fn from(io: IO<T>) -> Self {
        io.to_async()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn construction_defers_execution() {
        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();
        let io = AsyncIO::new(move || async move { flag.store(true, Ordering::SeqCst) });
        assert!(!ran.load(Ordering::SeqCst));
        io.run().await;
        assert!(ran.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn accepts_sync_operands() {
        assert_eq!(AsyncIO::pure(1).zip(IO::pure("a")).run().await, (1, "a"));
        assert_eq!(AsyncIO::pure(1).then_do_io(IO::pure(2)).run().await, 2);
        let applied = AsyncIO::pure(4).apply(IO::pure(|x: i32| x * 10));
        assert_eq!(applied.run().await, 40);
    }

    #[tokio::test]
    async fn then_do_task_widens_to_fallible() {
        let task = AsyncIO::pure(())
            .then_do_task(crate::effect::task::Task::<i32, &str>::fail("no"));
        assert_eq!(task.run().await, Err("no"));
    }

    #[tokio::test]
    async fn conversions_preserve_value() {
        assert_eq!(AsyncIO::pure(3).to_task::<()>().run().await, Ok(3));
        assert_eq!(AsyncIO::pure(3).to_safe_computation::<u8>().run(0).await, 3);
        assert_eq!(AsyncIO::pure(3).to_computation::<(), u8>().run(0).await, Ok(3));
    }

    #[cfg(feature = "tracing")]
    #[tokio::test]
    async fn instrument_keeps_value() {
        let io = AsyncIO::pure(7).instrument(tracing::info_span!("pure"));
        assert_eq!(io.run().await, 7);
    }
}
