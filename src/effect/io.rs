//! `IO`: a deferred, infallible computation that takes no input.

use crate::effect::computation::Computation;
use crate::effect::safe_computation::SafeComputation;
use crate::effect::task::Task;
use crate::either::Either;

#[cfg(feature = "async")]
use crate::effect::async_io::AsyncIO;

/// Function type for IO internals
type IoFn<T> = Box<dyn FnOnce() -> T + Send>;

/// A deferred computation `() -> T` that cannot fail.
///
/// Constructing an `IO` never runs it; [`run`](IO::run) does, once.
///
/// # Examples
///
/// ```
/// use wellspring::IO;
///
/// let io = IO::pure(20).map(|x| x + 1).flat_map(|x| IO::pure(x * 2));
/// assert_eq!(io.run(), 42);
/// ```
pub struct IO<T> {
    run_fn: IoFn<T>,
}

impl<T> std::fmt::Debug for IO<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IO").field("run_fn", &"<function>").finish()
    }
}

impl<T> IO<T>
where
    T: Send + 'static,
{
    /// Wrap a closure.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::atomic::{AtomicBool, Ordering};
    /// use std::sync::Arc;
    /// use wellspring::IO;
    ///
    /// let ran = Arc::new(AtomicBool::new(false));
    /// let flag = ran.clone();
    /// let io = IO::new(move || flag.store(true, Ordering::SeqCst));
    ///
    /// assert!(!ran.load(Ordering::SeqCst));
    /// io.run();
    /// assert!(ran.load(Ordering::SeqCst));
    /// ```
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce() -> T + Send + 'static,
    {
        IO {
            run_fn: Box::new(f),
        }
    }

    /// An IO that yields `value`.
    pub fn pure(value: T) -> Self {
        IO::new(move || value)
    }

    /// Run the computation.
    pub fn run(self) -> T {
        (self.run_fn)()
    }

    /// Transform the produced value.
    pub fn map<U, F>(self, f: F) -> IO<U>
    where
        F: FnOnce(T) -> U + Send + 'static,
        U: Send + 'static,
    {
        IO::new(move || f(self.run()))
    }

    /// Chain a dependent IO.
    pub fn flat_map<U, F>(self, f: F) -> IO<U>
    where
        F: FnOnce(T) -> IO<U> + Send + 'static,
        U: Send + 'static,
    {
        IO::new(move || f(self.run()).run())
    }

    /// Apply the function produced by `f` to this IO's value.
    ///
    /// This IO runs first, then `f`.
    ///
    /// # Examples
    ///
    /// ```
    /// use wellspring::IO;
    ///
    /// let io = IO::pure(2).apply(IO::pure(|x: i32| x * 21));
    /// assert_eq!(io.run(), 42);
    /// ```
    pub fn apply<U, F>(self, f: IO<F>) -> IO<U>
    where
        F: FnOnce(T) -> U + Send + 'static,
        U: Send + 'static,
    {
        IO::new(move || {
            let value = self.run();
            (f.run())(value)
        })
    }

    /// Pair with another IO. Both run, left to right.
    pub fn zip<U>(self, other: IO<U>) -> IO<(T, U)>
    where
        U: Send + 'static,
    {
        IO::new(move || (self.run(), other.run()))
    }

    /// Combine with another IO through `f`.
    pub fn zip_with<U, R, F>(self, other: IO<U>, f: F) -> IO<R>
    where
        U: Send + 'static,
        R: Send + 'static,
        F: FnOnce(T, U) -> R + Send + 'static,
    {
        self.zip(other).map(move |(a, b)| f(a, b))
    }

    /// Discard the value and continue with `f`.
    pub fn then_do<U, F>(self, f: F) -> IO<U>
    where
        F: FnOnce() -> U + Send + 'static,
        U: Send + 'static,
    {
        IO::new(move || {
            self.run();
            f()
        })
    }

    /// Discard the value and continue with another IO.
    pub fn then_do_io<U>(self, next: IO<U>) -> IO<U>
    where
        U: Send + 'static,
    {
        self.flat_map(move |_| next)
    }

    /// Discard the value and continue with a task; the result can now fail.
    pub fn then_do_task<U, E>(self, next: Task<U, E>) -> Task<U, E>
    where
        U: Send + 'static,
        E: Send + 'static,
    {
        Task::new(move || {
            self.run();
            next.run()
        })
    }

    /// View as a task that never fails.
    pub fn to_task<E>(self) -> Task<T, E>
    where
        E: Send + 'static,
    {
        Task::new(move || Ok(self.run()))
    }

    /// View as a computation that ignores its input.
    pub fn to_safe_computation<I>(self) -> SafeComputation<T, I>
    where
        I: Send + 'static,
    {
        SafeComputation::new(move |_: I| self.run())
    }

    /// View as a fallible computation that ignores its input and never fails.
    pub fn to_computation<E, I>(self) -> Computation<T, E, I>
    where
        E: Send + 'static,
        I: Send + 'static,
    {
        Computation::new(move |_: I| Ok(self.run()))
    }

    /// Lift into the async family. The body still runs synchronously when
    /// the returned future is first polled.
    #[cfg(feature = "async")]
    pub fn to_async(self) -> AsyncIO<T> {
        AsyncIO::new(move || async move { self.run() })
    }

    /// Lift into the async family, running the body on tokio's blocking pool.
    ///
    /// A panic inside the body is resumed on the awaiting task.
    ///
    /// # Panics
    ///
    /// The returned effect panics when run outside a tokio runtime.
    #[cfg(feature = "tokio")]
    pub fn to_blocking_async(self) -> AsyncIO<T> {
        AsyncIO::new(move || async move {
            match tokio::task::spawn_blocking(move || self.run()).await {
                Ok(value) => value,
                Err(join_error) => std::panic::resume_unwind(join_error.into_panic()),
            }
        })
    }

    /// Iterate `step` until it yields `Either::Right`.
    ///
    /// Runs in a loop rather than through nested `flat_map` calls, so the
    /// number of iterations is not bounded by the call stack.
    ///
    /// # Examples
    ///
    /// ```
    /// use wellspring::{Either, IO};
    ///
    /// let sum = IO::tail_rec((0u64, 0u64), |(i, acc)| {
    ///     IO::pure(if i == 100_000 {
    ///         Either::Right(acc)
    ///     } else {
    ///         Either::Left((i + 1, acc + i))
    ///     })
    /// });
    /// assert_eq!(sum.run(), 4_999_950_000);
    /// ```
    pub fn tail_rec<S, F>(seed: S, mut step: F) -> IO<T>
    where
        S: Send + 'static,
        F: FnMut(S) -> IO<Either<S, T>> + Send + 'static,
    {
        IO::new(move || {
            let mut state = seed;
            loop {
                match step(state).run() {
                    Either::Left(next) => state = next,
                    Either::Right(done) => return done,
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn construction_defers_execution() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_clone = log.clone();
        let io = IO::new(move || log_clone.lock().unwrap().push("ran"));
        assert!(log.lock().unwrap().is_empty());
        io.run();
        assert_eq!(*log.lock().unwrap(), vec!["ran"]);
    }

    #[test]
    fn apply_runs_self_before_function() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let (l1, l2) = (log.clone(), log.clone());
        let value = IO::new(move || {
            l1.lock().unwrap().push("value");
            3
        });
        let func = IO::new(move || {
            l2.lock().unwrap().push("function");
            |x: i32| x + 1
        });

        assert_eq!(value.apply(func).run(), 4);
        assert_eq!(*log.lock().unwrap(), vec!["value", "function"]);
    }

    #[test]
    fn then_do_discards_value() {
        assert_eq!(IO::pure(1).then_do(|| "next").run(), "next");
        assert_eq!(IO::pure(1).then_do_io(IO::pure(2)).run(), 2);
    }

    #[test]
    fn then_do_task_widens_to_fallible() {
        let task = IO::pure(1).then_do_task(Task::<i32, &str>::fail("boom"));
        assert_eq!(task.run(), Err("boom"));
    }

    #[test]
    fn conversions_preserve_value() {
        assert_eq!(IO::pure(5).to_task::<()>().run(), Ok(5));
        assert_eq!(IO::pure(5).to_safe_computation::<&str>().run("ignored"), 5);
        assert_eq!(IO::pure(5).to_computation::<(), u8>().run(0), Ok(5));
    }

    #[test]
    fn zip_with_combines() {
        assert_eq!(IO::pure(6).zip_with(IO::pure(7), |a, b| a * b).run(), 42);
    }

    #[cfg(feature = "async")]
    #[tokio::test]
    async fn to_async_yields_value() {
        assert_eq!(IO::pure(9).to_async().run().await, 9);
    }

    #[cfg(feature = "tokio")]
    #[tokio::test]
    async fn to_blocking_async_runs_on_blocking_pool() {
        let caller = std::thread::current().id();
        let io = IO::new(|| std::thread::current().id());
        assert_ne!(io.to_blocking_async().run().await, caller);
    }
}
