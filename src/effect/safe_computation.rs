//! `SafeComputation`: a deferred, infallible computation over an input.

use crate::effect::bind::BindInput;
use crate::effect::computation::Computation;
use crate::effect::io::IO;
use crate::effect::task::Task;

#[cfg(feature = "async")]
use crate::effect::async_safe_computation::AsyncSafeComputation;

/// Function type for SafeComputation internals
type SafeFn<T, I> = Box<dyn FnOnce(I) -> T + Send>;

/// A deferred computation `(I) -> T` that cannot fail.
///
/// Combinators that run more than one computation against the same input
/// (`flat_map`, `apply`, `zip`, `then_do_safe`, ...) clone the input, so
/// they require `I: Clone`.
///
/// # Examples
///
/// ```
/// use wellspring::SafeComputation;
///
/// let greet = SafeComputation::new(|name: String| format!("hello {}", name));
/// let shout = greet.map(|s| s.to_uppercase());
/// assert_eq!(shout.run("ana".to_string()), "HELLO ANA");
/// ```
pub struct SafeComputation<T, I> {
    run_fn: SafeFn<T, I>,
}

impl<T, I> std::fmt::Debug for SafeComputation<T, I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SafeComputation")
            .field("run_fn", &"<function>")
            .finish()
    }
}

impl<T, I> SafeComputation<T, I>
where
    T: Send + 'static,
    I: Send + 'static,
{
    /// Wrap a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce(I) -> T + Send + 'static,
    {
        SafeComputation {
            run_fn: Box::new(f),
        }
    }

    /// A computation that ignores its input and yields `value`.
    pub fn pure(value: T) -> Self {
        SafeComputation::new(move |_| value)
    }

    /// Run against `input`.
    pub fn run(self, input: I) -> T {
        (self.run_fn)(input)
    }

    /// Transform the produced value.
    pub fn map<U, F>(self, f: F) -> SafeComputation<U, I>
    where
        F: FnOnce(T) -> U + Send + 'static,
        U: Send + 'static,
    {
        SafeComputation::new(move |input| f(self.run(input)))
    }

    /// Adapt the input through `f` before it reaches this computation.
    ///
    /// # Examples
    ///
    /// ```
    /// use wellspring::SafeComputation;
    ///
    /// let len = SafeComputation::new(|s: String| s.len());
    /// let from_number = len.contramap(|n: u32| n.to_string());
    /// assert_eq!(from_number.run(12345), 5);
    /// ```
    pub fn contramap<I0, F>(self, f: F) -> SafeComputation<T, I0>
    where
        F: FnOnce(I0) -> I + Send + 'static,
        I0: Send + 'static,
    {
        SafeComputation::new(move |input| self.run(f(input)))
    }

    /// Chain a dependent computation over the same input.
    pub fn flat_map<U, F>(self, f: F) -> SafeComputation<U, I>
    where
        F: FnOnce(T) -> SafeComputation<U, I> + Send + 'static,
        U: Send + 'static,
        I: Clone,
    {
        SafeComputation::new(move |input: I| {
            let value = self.run(input.clone());
            f(value).run(input)
        })
    }

    /// Apply the function produced by `f`; this computation runs first.
    pub fn apply<U, F>(self, f: SafeComputation<F, I>) -> SafeComputation<U, I>
    where
        F: FnOnce(T) -> U + Send + 'static,
        U: Send + 'static,
        I: Clone,
    {
        SafeComputation::new(move |input: I| {
            let value = self.run(input.clone());
            (f.run(input))(value)
        })
    }

    /// Pair with another computation over the same input.
    pub fn zip<U>(self, other: SafeComputation<U, I>) -> SafeComputation<(T, U), I>
    where
        U: Send + 'static,
        I: Clone,
    {
        SafeComputation::new(move |input: I| (self.run(input.clone()), other.run(input)))
    }

    /// Combine with another computation over the same input through `f`.
    pub fn zip_with<U, R, F>(self, other: SafeComputation<U, I>, f: F) -> SafeComputation<R, I>
    where
        U: Send + 'static,
        R: Send + 'static,
        F: FnOnce(T, U) -> R + Send + 'static,
        I: Clone,
    {
        self.zip(other).map(move |(a, b)| f(a, b))
    }

    /// Discard the value and continue with `f`.
    pub fn then_do<U, F>(self, f: F) -> SafeComputation<U, I>
    where
        F: FnOnce() -> U + Send + 'static,
        U: Send + 'static,
    {
        SafeComputation::new(move |input| {
            self.run(input);
            f()
        })
    }

    /// Discard the value and continue with an IO.
    pub fn then_do_io<U>(self, next: IO<U>) -> SafeComputation<U, I>
    where
        U: Send + 'static,
    {
        SafeComputation::new(move |input| {
            self.run(input);
            next.run()
        })
    }

    /// Discard the value and continue with another computation over the
    /// same input.
    pub fn then_do_safe<U>(self, next: SafeComputation<U, I>) -> SafeComputation<U, I>
    where
        U: Send + 'static,
        I: Clone,
    {
        self.flat_map(move |_| next)
    }

    /// Discard the value and continue with a task; the result can now fail.
    pub fn then_do_task<U, E>(self, next: Task<U, E>) -> Computation<U, E, I>
    where
        U: Send + 'static,
        E: Send + 'static,
    {
        Computation::new(move |input| {
            self.run(input);
            next.run()
        })
    }

    /// Discard the value and continue with a fallible computation over the
    /// same input.
    pub fn then_do_computation<U, E>(self, next: Computation<U, E, I>) -> Computation<U, E, I>
    where
        U: Send + 'static,
        E: Send + 'static,
        I: Clone,
    {
        Computation::new(move |input: I| {
            self.run(input.clone());
            next.run(input)
        })
    }

    /// Fix the input, producing an IO.
    ///
    /// # Examples
    ///
    /// ```
    /// use wellspring::SafeComputation;
    ///
    /// let double = SafeComputation::new(|x: i32| x * 2);
    /// assert_eq!(double.bind_input(21).run(), 42);
    /// ```
    pub fn bind_input(self, input: I) -> IO<T> {
        IO::new(move || self.run(input))
    }

    /// View as a computation that never fails.
    pub fn to_computation<E>(self) -> Computation<T, E, I>
    where
        E: Send + 'static,
    {
        Computation::new(move |input| Ok(self.run(input)))
    }

    /// Lift into the async family.
    #[cfg(feature = "async")]
    pub fn to_async(self) -> AsyncSafeComputation<T, I> {
        AsyncSafeComputation::new(move |input| async move { self.run(input) })
    }
}

impl<T, I> BindInput for SafeComputation<T, I>
where
    T: Send + 'static,
    I: Send + 'static,
{
    type Input = I;
    type Bound = IO<T>;

    fn bind_input(self, input: I) -> IO<T> {
        SafeComputation::bind_input(self, input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pure_ignores_input() {
        assert_eq!(SafeComputation::<_, &str>::pure(3).run("anything"), 3);
    }

    #[test]
    fn flat_map_shares_input() {
        let c = SafeComputation::new(|x: i32| x + 1)
            .flat_map(|y| SafeComputation::new(move |x: i32| x * y));
        assert_eq!(c.run(4), 20);
    }

    #[test]
    fn zip_and_apply_see_same_input() {
        let zipped = SafeComputation::new(|x: i32| x).zip(SafeComputation::new(|x: i32| x * 10));
        assert_eq!(zipped.run(2), (2, 20));

        let applied = SafeComputation::new(|x: i32| x)
            .apply(SafeComputation::new(|x: i32| move |v: i32| v + x));
        assert_eq!(applied.run(5), 10);
    }

    #[test]
    fn then_do_task_widens_to_computation() {
        let c = SafeComputation::new(|x: i32| x).then_do_task(Task::<u8, &str>::fail("nope"));
        assert_eq!(c.run(1), Err("nope"));

        let c = SafeComputation::new(|x: i32| x)
            .then_do_computation(Computation::<i32, (), i32>::new(|x| Ok(x + 1)));
        assert_eq!(c.run(1), Ok(2));
    }

    #[test]
    fn bind_input_is_repeatable() {
        let make = || SafeComputation::new(|x: i32| x * 3);
        assert_eq!(make().bind_input(7).run(), make().bind_input(7).run());
    }
}
