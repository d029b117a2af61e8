//! `Task`: a deferred, fallible computation that takes no input.

use crate::effect::computation::Computation;
use crate::effect::io::IO;
use crate::either::Either;
use crate::result::{ResultExt, ZipResults, ZipResultsWidened};

#[cfg(feature = "async")]
use crate::effect::async_task::AsyncTask;

/// Function type for Task internals
type TaskFn<T, E> = Box<dyn FnOnce() -> Result<T, E> + Send>;

/// A deferred computation `() -> Result<T, E>`.
///
/// # Examples
///
/// ```
/// use wellspring::Task;
///
/// let task = Task::<_, String>::pure(5)
///     .map(|x| x * 2)
///     .flat_map(|x| Task::pure(x + 10));
/// assert_eq!(task.run(), Ok(20));
///
/// let failed = Task::<i32, _>::fail("boom").map(|x| x * 2);
/// assert_eq!(failed.run(), Err("boom"));
/// ```
pub struct Task<T, E> {
    run_fn: TaskFn<T, E>,
}

impl<T, E> std::fmt::Debug for Task<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("run_fn", &"<function>")
            .finish()
    }
}

impl<T, E> Task<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Wrap a closure returning a `Result`.
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce() -> Result<T, E> + Send + 'static,
    {
        Task {
            run_fn: Box::new(f),
        }
    }

    /// A task that succeeds with `value`.
    pub fn pure(value: T) -> Self {
        Task::new(move || Ok(value))
    }

    /// A task that fails with `error`.
    pub fn fail(error: E) -> Self {
        Task::new(move || Err(error))
    }

    /// Lift an already computed `Result`.
    pub fn from_result(result: Result<T, E>) -> Self {
        Task::new(move || result)
    }

    /// Run the task.
    pub fn run(self) -> Result<T, E> {
        (self.run_fn)()
    }

    /// Transform the success value.
    pub fn map<U, F>(self, f: F) -> Task<U, E>
    where
        F: FnOnce(T) -> U + Send + 'static,
        U: Send + 'static,
    {
        Task::new(move || self.run().map(f))
    }

    /// Transform the error value.
    pub fn map_err<E2, F>(self, f: F) -> Task<T, E2>
    where
        F: FnOnce(E) -> E2 + Send + 'static,
        E2: Send + 'static,
    {
        Task::new(move || self.run().map_err(f))
    }

    /// Chain a dependent task; an error short-circuits.
    pub fn flat_map<U, F>(self, f: F) -> Task<U, E>
    where
        F: FnOnce(T) -> Task<U, E> + Send + 'static,
        U: Send + 'static,
    {
        Task::new(move || f(self.run()?).run())
    }

    /// Apply the function produced by `f`.
    ///
    /// Both tasks run, this one first. If both fail, this task's error is
    /// returned.
    pub fn apply<U, F>(self, f: Task<F, E>) -> Task<U, E>
    where
        F: FnOnce(T) -> U + Send + 'static,
        U: Send + 'static,
    {
        Task::new(move || {
            let value = self.run();
            value.apply(f.run())
        })
    }

    /// Pair with another task sharing the error type.
    ///
    /// Both run; the first failure by position is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use wellspring::Task;
    ///
    /// let zipped = Task::<i32, &str>::fail("first").zip(Task::<i32, &str>::fail("second"));
    /// assert_eq!(zipped.run(), Err("first"));
    /// ```
    pub fn zip<U>(self, other: Task<U, E>) -> Task<(T, U), E>
    where
        U: Send + 'static,
    {
        Task::new(move || ZipResults::zip_all((self.run(), other.run())))
    }

    /// Pair with a task of another error type, widening both errors into `W`.
    pub fn zip_widened<U, E2, W>(self, other: Task<U, E2>) -> Task<(T, U), W>
    where
        U: Send + 'static,
        E2: Send + 'static,
        E: Into<W>,
        E2: Into<W>,
        W: Send + 'static,
    {
        Task::new(move || ZipResultsWidened::<W>::zip_all_widened((self.run(), other.run())))
    }

    /// Combine with another task through `f`.
    pub fn zip_with<U, R, F>(self, other: Task<U, E>, f: F) -> Task<R, E>
    where
        U: Send + 'static,
        R: Send + 'static,
        F: FnOnce(T, U) -> R + Send + 'static,
    {
        self.zip(other).map(move |(a, b)| f(a, b))
    }

    /// On success, discard the value and continue with `f`.
    pub fn then_do<U, F>(self, f: F) -> Task<U, E>
    where
        F: FnOnce() -> U + Send + 'static,
        U: Send + 'static,
    {
        Task::new(move || self.run().map(|_| f()))
    }

    /// On success, discard the value and continue with an IO.
    pub fn then_do_io<U>(self, next: IO<U>) -> Task<U, E>
    where
        U: Send + 'static,
    {
        Task::new(move || self.run().map(|_| next.run()))
    }

    /// On success, discard the value and continue with another task.
    pub fn then_do_task<U>(self, next: Task<U, E>) -> Task<U, E>
    where
        U: Send + 'static,
    {
        self.flat_map(move |_| next)
    }

    /// On success, continue with a task of another error type; both errors
    /// widen into `W`.
    pub fn then_do_task_widened<U, E2, W>(self, next: Task<U, E2>) -> Task<U, W>
    where
        U: Send + 'static,
        E2: Into<W> + Send + 'static,
        E: Into<W>,
        W: Send + 'static,
    {
        Task::new(move || {
            self.run().map_err(Into::into)?;
            next.run().map_err(Into::into)
        })
    }

    /// Recover from a failure with `f`.
    ///
    /// The result cannot fail: `Left` holds the original value, `Right` the
    /// value recovered from the error.
    ///
    /// # Examples
    ///
    /// ```
    /// use wellspring::{Either, Task};
    ///
    /// let recovered = Task::<i32, &str>::fail("boom").or_else_do(|e| e.len());
    /// assert_eq!(recovered.run(), Either::Right(4));
    ///
    /// let untouched = Task::<i32, &str>::pure(1).or_else_do(|e| e.len());
    /// assert_eq!(untouched.run(), Either::Left(1));
    /// ```
    pub fn or_else_do<U, F>(self, f: F) -> IO<Either<T, U>>
    where
        F: FnOnce(E) -> U + Send + 'static,
        U: Send + 'static,
    {
        IO::new(move || match self.run() {
            Ok(value) => Either::Left(value),
            Err(e) => Either::Right(f(e)),
        })
    }

    /// Recover from a failure by running `fallback`.
    pub fn or_else_do_io<U>(self, fallback: IO<U>) -> IO<Either<T, U>>
    where
        U: Send + 'static,
    {
        IO::new(move || match self.run() {
            Ok(value) => Either::Left(value),
            Err(_) => Either::Right(fallback.run()),
        })
    }

    /// Recover from a failure by running a fallback task.
    ///
    /// Only the fallback's error can escape, so it becomes the result's error
    /// type.
    pub fn or_else_do_task<U, E2>(self, fallback: Task<U, E2>) -> Task<Either<T, U>, E2>
    where
        U: Send + 'static,
        E2: Send + 'static,
    {
        Task::new(move || match self.run() {
            Ok(value) => Ok(Either::Left(value)),
            Err(_) => fallback.run().map(Either::Right),
        })
    }

    /// View as a computation that ignores its input.
    pub fn to_computation<I>(self) -> Computation<T, E, I>
    where
        I: Send + 'static,
    {
        Computation::new(move |_: I| self.run())
    }

    /// Lift into the async family.
    #[cfg(feature = "async")]
    pub fn to_async(self) -> AsyncTask<T, E> {
        AsyncTask::new(move || async move { self.run() })
    }

    /// Iterate `step` until it yields `Either::Right` or fails.
    ///
    /// The loop does not grow the call stack with the number of iterations.
    pub fn tail_rec<S, F>(seed: S, mut step: F) -> Task<T, E>
    where
        S: Send + 'static,
        F: FnMut(S) -> Task<Either<S, T>, E> + Send + 'static,
    {
        Task::new(move || {
            let mut state = seed;
            loop {
                match step(state).run()? {
                    Either::Left(next) => state = next,
                    Either::Right(done) => return Ok(done),
                }
            }
        })
    }
}

impl<T, E> From<IO<T>> for Task<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    fn from(io: IO<T>) -> Self {
        io.to_task()
    }
}
