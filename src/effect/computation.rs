//! `Computation`: a deferred, fallible computation over an input.
//!
//! This is the most general synchronous shape. The other three embed into
//! it (`IO::to_computation`, `Task::to_computation`,
//! `SafeComputation::to_computation`), and fixing its input with
//! [`Computation::bind_input`] yields a [`Task`].

use crate::effect::bind::BindInput;
use crate::effect::io::IO;
use crate::effect::safe_computation::SafeComputation;
use crate::effect::task::Task;
use crate::either::Either;
use crate::result::{ResultExt, ZipResults, ZipResultsWidened};

#[cfg(feature = "async")]
use crate::effect::async_computation::AsyncComputation;

/// Function type for Computation internals
type ComputationFn<T, E, I> = Box<dyn FnOnce(I) -> Result<T, E> + Send>;

/// A deferred computation `(I) -> Result<T, E>`.
///
/// # Examples
///
/// ```
/// use wellspring::Computation;
///
/// let parse = Computation::new(|raw: String| raw.parse::<i32>().map_err(|e| e.to_string()));
/// let doubled = parse.map(|n| n * 2);
/// assert_eq!(doubled.run("21".to_string()), Ok(42));
/// ```
pub struct Computation<T, E, I> {
    run_fn: ComputationFn<T, E, I>,
}

impl<T, E, I> std::fmt::Debug for Computation<T, E, I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Computation")
            .field("run_fn", &"<function>")
            .finish()
    }
}

impl<T, E, I> Computation<T, E, I>
where
    T: Send + 'static,
    E: Send + 'static,
    I: Send + 'static,
{
    /// Wrap a closure returning a `Result`.
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce(I) -> Result<T, E> + Send + 'static,
    {
        Computation {
            run_fn: Box::new(f),
        }
    }

    /// Ignore the input and succeed with `value`.
    pub fn pure(value: T) -> Self {
        Computation::new(move |_| Ok(value))
    }

    /// Ignore the input and fail with `error`.
    pub fn fail(error: E) -> Self {
        Computation::new(move |_| Err(error))
    }

    /// Ignore the input and return `result`.
    pub fn from_result(result: Result<T, E>) -> Self {
        Computation::new(move |_| result)
    }

    /// Run against `input`.
    pub fn run(self, input: I) -> Result<T, E> {
        (self.run_fn)(input)
    }

    /// Transform the success value.
    pub fn map<U, F>(self, f: F) -> Computation<U, E, I>
    where
        F: FnOnce(T) -> U + Send + 'static,
        U: Send + 'static,
    {
        Computation::new(move |input| self.run(input).map(f))
    }

    /// Transform the error value.
    pub fn map_err<E2, F>(self, f: F) -> Computation<T, E2, I>
    where
        F: FnOnce(E) -> E2 + Send + 'static,
        E2: Send + 'static,
    {
        Computation::new(move |input| self.run(input).map_err(f))
    }

    /// Adapt the input through `f` before it reaches this computation.
    pub fn contramap<I0, F>(self, f: F) -> Computation<T, E, I0>
    where
        F: FnOnce(I0) -> I + Send + 'static,
        I0: Send + 'static,
    {
        Computation::new(move |input| self.run(f(input)))
    }

    /// Chain a dependent computation over the same input.
    ///
    /// # Examples
    ///
    /// ```
    /// use wellspring::Computation;
    ///
    /// let c = Computation::<_, String, i32>::new(|x| Ok(x + 1))
    ///     .flat_map(|y| Computation::new(move |x: i32| Ok(x * y)));
    /// assert_eq!(c.run(4), Ok(20));
    /// ```
    pub fn flat_map<U, F>(self, f: F) -> Computation<U, E, I>
    where
        F: FnOnce(T) -> Computation<U, E, I> + Send + 'static,
        U: Send + 'static,
        I: Clone,
    {
        Computation::new(move |input: I| {
            let value = self.run(input.clone())?;
            f(value).run(input)
        })
    }

    /// Apply the function produced by `f`.
    ///
    /// Both run, this one first; this computation's error wins.
    pub fn apply<U, F>(self, f: Computation<F, E, I>) -> Computation<U, E, I>
    where
        F: FnOnce(T) -> U + Send + 'static,
        U: Send + 'static,
        I: Clone,
    {
        Computation::new(move |input: I| {
            let value = self.run(input.clone());
            value.apply(f.run(input))
        })
    }

    /// Pair with another computation over the same input and error type.
    pub fn zip<U>(self, other: Computation<U, E, I>) -> Computation<(T, U), E, I>
    where
        U: Send + 'static,
        I: Clone,
    {
        Computation::new(move |input: I| {
            ZipResults::zip_all((self.run(input.clone()), other.run(input)))
        })
    }

    /// Pair with a computation of another error type, widening into `W`.
    pub fn zip_widened<U, E2, W>(self, other: Computation<U, E2, I>) -> Computation<(T, U), W, I>
    where
        U: Send + 'static,
        E: Into<W>,
        E2: Into<W> + Send + 'static,
        W: Send + 'static,
        I: Clone,
    {
        Computation::new(move |input: I| {
            ZipResultsWidened::<W>::zip_all_widened((self.run(input.clone()), other.run(input)))
        })
    }

    /// Combine with another computation over the same input through `f`.
    pub fn zip_with<U, R, F>(self, other: Computation<U, E, I>, f: F) -> Computation<R, E, I>
    where
        U: Send + 'static,
        R: Send + 'static,
        F: FnOnce(T, U) -> R + Send + 'static,
        I: Clone,
    {
        self.zip(other).map(move |(a, b)| f(a, b))
    }

    /// On success, discard the value and continue with `f`.
    pub fn then_do<U, F>(self, f: F) -> Computation<U, E, I>
    where
        F: FnOnce() -> U + Send + 'static,
        U: Send + 'static,
    {
        Computation::new(move |input| self.run(input).map(|_| f()))
    }

    /// On success, discard the value and continue with an IO.
    pub fn then_do_io<U>(self, next: IO<U>) -> Computation<U, E, I>
    where
        U: Send + 'static,
    {
        Computation::new(move |input| self.run(input).map(|_| next.run()))
    }

    /// On success, continue with a task sharing the error type.
    pub fn then_do_task<U>(self, next: Task<U, E>) -> Computation<U, E, I>
    where
        U: Send + 'static,
    {
        Computation::new(move |input| {
            self.run(input)?;
            next.run()
        })
    }

    /// On success, continue with a task of another error type; both errors
    /// widen into `W`.
    pub fn then_do_task_widened<U, E2, W>(self, next: Task<U, E2>) -> Computation<U, W, I>
    where
        U: Send + 'static,
        E: Into<W>,
        E2: Into<W> + Send + 'static,
        W: Send + 'static,
    {
        Computation::new(move |input| {
            self.run(input).map_err(Into::into)?;
            next.run().map_err(Into::into)
        })
    }

    /// On success, continue with an infallible computation over the same
    /// input.
    pub fn then_do_safe<U>(self, next: SafeComputation<U, I>) -> Computation<U, E, I>
    where
        U: Send + 'static,
        I: Clone,
    {
        Computation::new(move |input: I| {
            self.run(input.clone())?;
            Ok(next.run(input))
        })
    }

    /// On success, continue with another computation over the same input.
    pub fn then_do_computation<U>(self, next: Computation<U, E, I>) -> Computation<U, E, I>
    where
        U: Send + 'static,
        I: Clone,
    {
        self.flat_map(move |_| next)
    }

    /// On success, continue with a computation of another error type; both
    /// errors widen into `W`.
    pub fn then_do_computation_widened<U, E2, W>(
        self,
        next: Computation<U, E2, I>,
    ) -> Computation<U, W, I>
    where
        U: Send + 'static,
        E: Into<W>,
        E2: Into<W> + Send + 'static,
        W: Send + 'static,
        I: Clone,
    {
        Computation::new(move |input: I| {
            self.run(input.clone()).map_err(Into::into)?;
            next.run(input).map_err(Into::into)
        })
    }

    /// Recover from a failure with `f`; the result cannot fail.
    pub fn or_else_do<U, F>(self, f: F) -> SafeComputation<Either<T, U>, I>
    where
        F: FnOnce(E) -> U + Send + 'static,
        U: Send + 'static,
    {
        SafeComputation::new(move |input| match self.run(input) {
            Ok(value) => Either::Left(value),
            Err(e) => Either::Right(f(e)),
        })
    }

    /// Recover from a failure by running `fallback`.
    pub fn or_else_do_io<U>(self, fallback: IO<U>) -> SafeComputation<Either<T, U>, I>
    where
        U: Send + 'static,
    {
        SafeComputation::new(move |input| match self.run(input) {
            Ok(value) => Either::Left(value),
            Err(_) => Either::Right(fallback.run()),
        })
    }

    /// Recover from a failure with an infallible computation over the same
    /// input.
    pub fn or_else_do_safe<U>(
        self,
        fallback: SafeComputation<U, I>,
    ) -> SafeComputation<Either<T, U>, I>
    where
        U: Send + 'static,
        I: Clone,
    {
        SafeComputation::new(move |input: I| match self.run(input.clone()) {
            Ok(value) => Either::Left(value),
            Err(_) => Either::Right(fallback.run(input)),
        })
    }

    /// Recover from a failure with a fallback task whose error becomes the
    /// result's error.
    pub fn or_else_do_task<U, E2>(self, fallback: Task<U, E2>) -> Computation<Either<T, U>, E2, I>
    where
        U: Send + 'static,
        E2: Send + 'static,
    {
        Computation::new(move |input| match self.run(input) {
            Ok(value) => Ok(Either::Left(value)),
            Err(_) => fallback.run().map(Either::Right),
        })
    }

    /// Recover from a failure with a fallback computation over the same
    /// input.
    ///
    /// # Examples
    ///
    /// ```
    /// use wellspring::{Computation, Either};
    ///
    /// let primary =
    ///     Computation::<i32, &str, i32>::new(|x| if x > 0 { Ok(x) } else { Err("negative") });
    /// let negate = Computation::<i32, (), i32>::new(|x| Ok(-x));
    /// let recovering = primary.or_else_do_computation(negate);
    ///
    /// assert_eq!(recovering.run(-3), Ok(Either::Right(3)));
    /// ```
    pub fn or_else_do_computation<U, E2>(
        self,
        fallback: Computation<U, E2, I>,
    ) -> Computation<Either<T, U>, E2, I>
    where
        U: Send + 'static,
        E2: Send + 'static,
        I: Clone,
    {
        Computation::new(move |input: I| match self.run(input.clone()) {
            Ok(value) => Ok(Either::Left(value)),
            Err(_) => fallback.run(input).map(Either::Right),
        })
    }

    /// Fix the input, producing a task.
    pub fn bind_input(self, input: I) -> Task<T, E> {
        Task::new(move || self.run(input))
    }

    /// Lift into the async family.
    #[cfg(feature = "async")]
    pub fn to_async(self) -> AsyncComputation<T, E, I> {
        AsyncComputation::new(move |input| async move { self.run(input) })
    }
}

impl<T, E, I> BindInput for Computation<T, E, I>
where
    T: Send + 'static,
    E: Send + 'static,
    I: Send + 'static,
{
    type Input = I;
    type Bound = Task<T, E>;

    fn bind_input(self, input: I) -> Task<T, E> {
        Computation::bind_input(self, input)
    }
}

impl<T, E, I> From<SafeComputation<T, I>> for Computation<T, E, I>
where
    T: Send + 'static,
    E: Send + 'static,
    I: Send + 'static,
{
    fn from(computation: SafeComputation<T, I>) -> Self {
        computation.to_computation()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checked(limit: i32) -> Computation<i32, String, i32> {
        Computation::new(move |x| {
            if x <= limit {
                Ok(x)
            } else {
                Err(format!("{} exceeds {}", x, limit))
            }
        })
    }

    #[test]
    fn contramap_adapts_input() {
        let c = checked(10).contramap(|s: &str| s.len() as i32);
        assert_eq!(c.run("abc"), Ok(3));
    }

    #[test]
    fn zip_reports_first_failure_by_position() {
        let zipped = checked(1).zip(checked(0));
        assert_eq!(zipped.run(5), Err("5 exceeds 1".to_string()));
    }

    #[test]
    fn apply_prefers_self_error() {
        let f = Computation::<fn(i32) -> i32, String, i32>::fail("fn".to_string());
        assert_eq!(checked(0).apply(f).run(3), Err("3 exceeds 0".to_string()));
    }

    #[test]
    fn then_do_variants_discard_value() {
        assert_eq!(checked(10).then_do(|| "done").run(1), Ok("done"));
        assert_eq!(checked(10).then_do_io(IO::pure(7)).run(1), Ok(7));
        assert_eq!(checked(10).then_do_task(Task::pure(8)).run(1), Ok(8));
        assert_eq!(
            checked(10)
                .then_do_safe(SafeComputation::new(|x: i32| x * 3))
                .run(2),
            Ok(6)
        );
        assert_eq!(
            checked(10).then_do_computation(checked(1)).run(2),
            Err("2 exceeds 1".to_string())
        );
    }

    #[test]
    fn widened_sequencing_unions_errors() {
        #[derive(Debug, PartialEq)]
        enum Wide {
            Text(String),
            Code(u8),
        }
        impl From<String> for Wide {
            fn from(e: String) -> Self {
                Wide::Text(e)
            }
        }
        impl From<u8> for Wide {
            fn from(e: u8) -> Self {
                Wide::Code(e)
            }
        }

        let c: Computation<(), Wide, i32> =
            checked(10).then_do_task_widened(Task::<(), u8>::fail(3));
        assert_eq!(c.run(1), Err(Wide::Code(3)));

        let c: Computation<i32, Wide, i32> =
            checked(0).then_do_computation_widened(Computation::<i32, u8, i32>::pure(1));
        assert_eq!(c.run(1), Err(Wide::Text("1 exceeds 0".to_string())));

        let c: Computation<(i32, i32), Wide, i32> =
            checked(10).zip_widened(Computation::<i32, u8, i32>::fail(9));
        assert_eq!(c.run(1), Err(Wide::Code(9)));
    }

    #[test]
    fn or_else_do_records_path() {
        assert_eq!(checked(10).or_else_do(|e| e.len()).run(1), Either::Left(1));
        assert_eq!(
            checked(0).or_else_do(|e| e.len()).run(1),
            Either::Right("1 exceeds 0".len())
        );
        assert_eq!(
            checked(0).or_else_do_safe(SafeComputation::new(|x: i32| x * 100)).run(1),
            Either::Right(100)
        );
        assert_eq!(
            checked(0).or_else_do_task(Task::<i32, u8>::fail(1)).run(1),
            Err(1)
        );
    }

    #[test]
    fn bind_input_yields_equivalent_task() {
        assert_eq!(checked(3).bind_input(2).run(), checked(3).run(2));
        assert_eq!(checked(3).bind_input(9).run(), checked(3).run(9));
    }
}
