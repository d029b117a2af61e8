//! Extra operations on `Result` and `Option`.
//!
//! The std carriers already provide `map`, `and_then` and `unwrap_or_else`.
//! This module adds the rest of the surface the effect shapes lean on:
//!
//! - [`ResultExt`]: `apply`, `zip`, `fold`, `get_or_throw`,
//!   `get_or_throw_with` and `get_or_absent`
//! - [`OptionExt`]: `get_or_absent` and `get_or_throw`
//! - [`ZipResults`] / [`ZipResultsWidened`]: zip a tuple of 2 to 7 results
//! - [`AbsentValue`]: the fault produced when a value is demanded from an
//!   empty carrier
//!
//! # Zipping already-evaluated results
//!
//! Tuple zipping scans its operands in argument order and surfaces the
//! first `Err`. The operands are values, not deferred effects, so every one
//! of them was evaluated before the scan starts.
//!
//! ```rust
//! use wellspring::result::ZipResults;
//!
//! let zipped = (Ok::<i32, &str>(1), Err::<i32, _>("x"), Err::<i32, _>("y")).zip_all();
//! assert_eq!(zipped, Err("x"));
//!
//! let zipped = (Ok::<_, &str>(1), Ok::<_, &str>("two"), Ok::<_, &str>(3.0)).zip_all();
//! assert_eq!(zipped, Ok((1, "two", 3.0)));
//! ```

use std::any::Any;
use std::error::Error as StdError;
use std::fmt;

/// Fault produced when a caller demands a value from an absent carrier.
///
/// # Example
///
/// ```rust
/// use wellspring::result::OptionExt;
///
/// let missing: Option<i32> = None;
/// let err = missing.get_or_absent("user id").unwrap_err();
/// assert_eq!(err.description(), Some("user id"));
/// assert_eq!(err.to_string(), "queried value not present: user id");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AbsentValue {
    description: Option<String>,
}

impl AbsentValue {
    /// An absent-value fault without a description.
    pub fn new() -> Self {
        AbsentValue { description: None }
    }

    /// An absent-value fault describing what was queried.
    pub fn described(description: impl Into<String>) -> Self {
        AbsentValue {
            description: Some(description.into()),
        }
    }

    /// What was being queried, if recorded.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl fmt::Display for AbsentValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.description {
            Some(description) => write!(f, "queried value not present: {}", description),
            None => write!(f, "queried value not present"),
        }
    }
}

impl StdError for AbsentValue {}

/// Additional combinators for `Result`.
pub trait ResultExt<T, E>: Sized {
    /// Apply a wrapped function to the wrapped value.
    ///
    /// When both sides failed, the receiver's error wins.
    ///
    /// ```rust
    /// use wellspring::result::ResultExt;
    ///
    /// let f: Result<fn(i32) -> i32, &str> = Ok(|x| x + 1);
    /// assert_eq!(Ok::<i32, &str>(1).apply(f), Ok(2));
    /// assert_eq!(Err::<i32, _>("self").apply(Err::<fn(i32) -> i32, _>("fn")), Err("self"));
    /// ```
    fn apply<U, F>(self, f: Result<F, E>) -> Result<U, E>
    where
        F: FnOnce(T) -> U;

    /// Pair with another result; the receiver's error wins.
    fn zip<U>(self, other: Result<U, E>) -> Result<(T, U), E>;

    /// Eliminate the result by handling both variants.
    fn fold<R, F, G>(self, on_err: F, on_ok: G) -> R
    where
        F: FnOnce(E) -> R,
        G: FnOnce(T) -> R;

    /// Return the value or panic with the error's debug text.
    ///
    /// # Panics
    ///
    /// Panics when the result is `Err`.
    fn get_or_throw(self) -> T
    where
        E: fmt::Debug;

    /// Return the value or panic with the payload built by `fault`.
    ///
    /// The payload is raised with [`std::panic::panic_any`], so a caller that
    /// catches the unwind can downcast it back to `P`.
    ///
    /// # Panics
    ///
    /// Panics when the result is `Err`.
    fn get_or_throw_with<P, F>(self, fault: F) -> T
    where
        F: FnOnce(E) -> P,
        P: Any + Send + 'static;

    /// Replace any error with an [`AbsentValue`] carrying `description`.
    fn get_or_absent(self, description: impl Into<String>) -> Result<T, AbsentValue>;
}

impl<T, E> ResultExt<T, E> for Result<T, E> {
    fn apply<U, F>(self, f: Result<F, E>) -> Result<U, E>
    where
        F: FnOnce(T) -> U,
    {
        match (self, f) {
            (Err(e), _) => Err(e),
            (Ok(_), Err(e)) => Err(e),
            (Ok(value), Ok(f)) => Ok(f(value)),
        }
    }

    fn zip<U>(self, other: Result<U, E>) -> Result<(T, U), E> {
        match (self, other) {
            (Ok(a), Ok(b)) => Ok((a, b)),
            (Err(e), _) | (_, Err(e)) => Err(e),
        }
    }

    fn fold<R, F, G>(self, on_err: F, on_ok: G) -> R
    where
        F: FnOnce(E) -> R,
        G: FnOnce(T) -> R,
    {
        match self {
            Ok(value) => on_ok(value),
            Err(e) => on_err(e),
        }
    }

    #[track_caller]
    fn get_or_throw(self) -> T
    where
        E: fmt::Debug,
    {
        match self {
            Ok(value) => value,
            Err(e) => panic!("called `get_or_throw` on an `Err` value: {:?}", e),
        }
    }

    #[track_caller]
    fn get_or_throw_with<P, F>(self, fault: F) -> T
    where
        F: FnOnce(E) -> P,
        P: Any + Send + 'static,
    {
        match self {
            Ok(value) => value,
            Err(e) => std::panic::panic_any(fault(e)),
        }
    }

    fn get_or_absent(self, description: impl Into<String>) -> Result<T, AbsentValue> {
        self.map_err(|_| AbsentValue::described(description))
    }
}

/// Additional accessors for `Option`.
pub trait OptionExt<T>: Sized {
    /// Convert `None` into an [`AbsentValue`] carrying `description`.
    fn get_or_absent(self, description: impl Into<String>) -> Result<T, AbsentValue>;

    /// Return the value or panic with an [`AbsentValue`] message.
    ///
    /// # Panics
    ///
    /// Panics when the option is `None`.
    fn get_or_throw(self, description: &str) -> T;
}

impl<T> OptionExt<T> for Option<T> {
    fn get_or_absent(self, description: impl Into<String>) -> Result<T, AbsentValue> {
        self.ok_or_else(|| AbsentValue::described(description))
    }

    #[track_caller]
    fn get_or_throw(self, description: &str) -> T {
        match self {
            Some(value) => value,
            None => panic!("{}", AbsentValue::described(description)),
        }
    }
}

/// Zip a tuple of results sharing one error type.
pub trait ZipResults {
    /// The tuple of success values.
    type Values;
    /// The shared error type.
    type Error;

    /// All values, or the first error in argument order.
    fn zip_all(self) -> Result<Self::Values, Self::Error>;
}

/// Zip a tuple of results whose error types all convert into `E`.
///
/// ```rust
/// use wellspring::result::ZipResultsWidened;
///
/// #[derive(Debug, PartialEq)]
/// enum AppError { Parse(String), Io(u8) }
/// impl From<String> for AppError { fn from(e: String) -> Self { AppError::Parse(e) } }
/// impl From<u8> for AppError { fn from(e: u8) -> Self { AppError::Io(e) } }
///
/// let zipped: Result<(i32, i32), AppError> =
///     (Ok::<i32, String>(1), Err::<i32, u8>(7)).zip_all_widened();
/// assert_eq!(zipped, Err(AppError::Io(7)));
/// ```
pub trait ZipResultsWidened<E> {
    /// The tuple of success values.
    type Values;

    /// All values, or the first error in argument order converted into `E`.
    fn zip_all_widened(self) -> Result<Self::Values, E>;
}

macro_rules! impl_zip_results {
    ($($T:ident $E:ident $v:ident),+) => {
        impl<Err, $($T),+> ZipResults for ($(Result<$T, Err>,)+) {
            type Values = ($($T,)+);
            type Error = Err;

            fn zip_all(self) -> Result<Self::Values, Err> {
                let ($($v,)+) = self;
                Ok(($($v?,)+))
            }
        }

        impl<W, $($T, $E),+> ZipResultsWidened<W> for ($(Result<$T, $E>,)+)
        where
            $($E: Into<W>,)+
        {
            type Values = ($($T,)+);

            fn zip_all_widened(self) -> Result<Self::Values, W> {
                let ($($v,)+) = self;
                Ok(($($v.map_err(Into::into)?,)+))
            }
        }
    };
}

impl_zip_results!(A EA a, B EB b);
impl_zip_results!(A EA a, B EB b, C EC c);
impl_zip_results!(A EA a, B EB b, C EC c, D ED d);
impl_zip_results!(A EA a, B EB b, C EC c, D ED d, F EF f);
impl_zip_results!(A EA a, B EB b, C EC c, D ED d, F EF f, G EG g);
impl_zip_results!(A EA a, B EB b, C EC c, D ED d, F EF f, G EG g, H EH h);
