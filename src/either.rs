//! A neutral two-way sum type.
//!
//! `Either<L, R>` carries one of two values without implying that either
//! side is an error. The effect combinators use it in two places:
//!
//! - The `or_else_do*` recovery combinators report `Left(original)` when the
//!   receiver succeeded and `Right(fallback)` when the fallback ran, so the
//!   caller can tell which path produced the value.
//! - `tail_rec` loops read `Left(next_state)` as "continue" and
//!   `Right(value)` as "done".
//!
//! # Example
//!
//! ```rust
//! use wellspring::Either;
//!
//! let outcome: Either<i32, &str> = Either::right("from fallback");
//! let label = outcome.fold(|n| format!("original {}", n), |s| s.to_string());
//! assert_eq!(label, "from fallback");
//! ```

/// A value that is either `Left(L)` or `Right(R)`.
///
/// Right-biased: [`map`](Either::map) and [`and_then`](Either::and_then)
/// act on the `Right` variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Either<L, R> {
    /// The left variant
    Left(L),
    /// The right variant
    Right(R),
}

impl<L, R> Either<L, R> {
    /// Create a Left value.
    #[inline]
    pub fn left(value: L) -> Self {
        Either::Left(value)
    }

    /// Create a Right value.
    #[inline]
    pub fn right(value: R) -> Self {
        Either::Right(value)
    }

    /// Returns `true` if this is a `Left` value.
    #[inline]
    pub fn is_left(&self) -> bool {
        matches!(self, Either::Left(_))
    }

    /// Returns `true` if this is a `Right` value.
    #[inline]
    pub fn is_right(&self) -> bool {
        matches!(self, Either::Right(_))
    }

    /// Converts into `Option<L>`, discarding a `Right`.
    pub fn into_left(self) -> Option<L> {
        match self {
            Either::Left(l) => Some(l),
            Either::Right(_) => None,
        }
    }

    /// Converts into `Option<R>`, discarding a `Left`.
    pub fn into_right(self) -> Option<R> {
        match self {
            Either::Left(_) => None,
            Either::Right(r) => Some(r),
        }
    }

    /// Borrow the contents.
    pub fn as_ref(&self) -> Either<&L, &R> {
        match self {
            Either::Left(l) => Either::Left(l),
            Either::Right(r) => Either::Right(r),
        }
    }

    /// Transform the `Left` value.
    pub fn map_left<L2, F>(self, f: F) -> Either<L2, R>
    where
        F: FnOnce(L) -> L2,
    {
        match self {
            Either::Left(l) => Either::Left(f(l)),
            Either::Right(r) => Either::Right(r),
        }
    }

    /// Transform the `Right` value.
    pub fn map_right<R2, F>(self, f: F) -> Either<L, R2>
    where
        F: FnOnce(R) -> R2,
    {
        match self {
            Either::Left(l) => Either::Left(l),
            Either::Right(r) => Either::Right(f(r)),
        }
    }

    /// Alias for [`map_right`](Either::map_right).
    pub fn map<R2, F>(self, f: F) -> Either<L, R2>
    where
        F: FnOnce(R) -> R2,
    {
        self.map_right(f)
    }

    /// Transform both sides.
    pub fn bimap<L2, R2, F, G>(self, f: F, g: G) -> Either<L2, R2>
    where
        F: FnOnce(L) -> L2,
        G: FnOnce(R) -> R2,
    {
        match self {
            Either::Left(l) => Either::Left(f(l)),
            Either::Right(r) => Either::Right(g(r)),
        }
    }

    /// Swap the variants.
    pub fn swap(self) -> Either<R, L> {
        match self {
            Either::Left(l) => Either::Right(l),
            Either::Right(r) => Either::Left(r),
        }
    }

    /// Eliminate the `Either` by handling both sides.
    ///
    /// # Example
    ///
    /// ```rust
    /// use wellspring::Either;
    ///
    /// let e: Either<i32, i32> = Either::left(2);
    /// assert_eq!(e.fold(|l| l * 10, |r| r), 20);
    /// ```
    pub fn fold<T, F, G>(self, left_fn: F, right_fn: G) -> T
    where
        F: FnOnce(L) -> T,
        G: FnOnce(R) -> T,
    {
        match self {
            Either::Left(l) => left_fn(l),
            Either::Right(r) => right_fn(r),
        }
    }

    /// Return the left value or a default.
    pub fn left_or(self, default: L) -> L {
        match self {
            Either::Left(l) => l,
            Either::Right(_) => default,
        }
    }

    /// Return the right value or a default.
    pub fn right_or(self, default: R) -> R {
        match self {
            Either::Left(_) => default,
            Either::Right(r) => r,
        }
    }

    /// Chain on the `Right` variant.
    pub fn and_then<R2, F>(self, f: F) -> Either<L, R2>
    where
        F: FnOnce(R) -> Either<L, R2>,
    {
        match self {
            Either::Left(l) => Either::Left(l),
            Either::Right(r) => f(r),
        }
    }

    /// Convert to `Result`, treating `Left` as the error side.
    pub fn into_result(self) -> Result<R, L> {
        match self {
            Either::Left(l) => Err(l),
            Either::Right(r) => Ok(r),
        }
    }
}

impl<T> Either<T, T> {
    /// Extract the value when both sides share a type.
    ///
    /// Handy after a recovery combinator whose original and fallback values
    /// have the same type and the caller no longer cares which path ran.
    pub fn into_inner(self) -> T {
        match self {
            Either::Left(v) | Either::Right(v) => v,
        }
    }
}

impl<L, R> From<Result<R, L>> for Either<L, R> {
    fn from(result: Result<R, L>) -> Self {
        match result {
            Ok(r) => Either::Right(r),
            Err(l) => Either::Left(l),
        }
    }
}

impl<L, R> From<Either<L, R>> for Result<R, L> {
    fn from(either: Either<L, R>) -> Self {
        either.into_result()
    }
}

#[cfg(feature = "proptest")]
impl<L, R> proptest::arbitrary::Arbitrary for Either<L, R>
where
    L: proptest::arbitrary::Arbitrary + 'static,
    R: proptest::arbitrary::Arbitrary + 'static,
{
    type Parameters = (L::Parameters, R::Parameters);
    type Strategy = proptest::strategy::BoxedStrategy<Self>;

    fn arbitrary_with(args: Self::Parameters) -> Self::Strategy {
        use proptest::prelude::*;

        let (l_params, r_params) = args;
        prop_oneof![
            any_with::<L>(l_params).prop_map(Either::Left),
            any_with::<R>(r_params).prop_map(Either::Right),
        ]
        .boxed()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_swap_involution(x: i32) {
            let e: Either<i32, i32> = Either::left(x);
            prop_assert_eq!(e.swap().swap(), e);

            let e: Either<i32, i32> = Either::right(x);
            prop_assert_eq!(e.swap().swap(), e);
        }

        #[test]
        fn prop_functor_composition(x: i32) {
            let f = |v: i32| v.wrapping_add(1);
            let g = |v: i32| v.wrapping_mul(2);

            let e: Either<(), i32> = Either::right(x);
            prop_assert_eq!(e.map(f).map(g), Either::right(x).map(|v| g(f(v))));
        }
    }
}
