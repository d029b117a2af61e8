//! Variadic zipping for tuples of effects.
//!
//! A tuple of two to seven effects of the same shape zips into one effect
//! producing the tuple of their values:
//!
//! ```
//! use wellspring::effect::zip::ZipAll;
//! use wellspring::Task;
//!
//! let all = (
//!     Task::<_, String>::pure(1),
//!     Task::<_, String>::pure("two"),
//!     Task::<_, String>::pure(3.0),
//! )
//!     .zip_all();
//! assert_eq!(all.run(), Ok((1, "two", 3.0)));
//! ```
//!
//! Every operand runs. For fallible shapes the first failure by position is
//! reported. Async tuples start all operands together and gather the
//! results in order. Input shapes hand a clone of the input to each
//! operand.
//!
//! [`ZipAllWidened`] is the same for operands with differing error types,
//! each convertible into a common `W`.

use crate::effect::computation::Computation;
use crate::effect::io::IO;
use crate::effect::safe_computation::SafeComputation;
use crate::effect::task::Task;
use crate::result::{ZipResults, ZipResultsWidened};

#[cfg(feature = "async")]
use crate::effect::{
    async_computation::AsyncComputation, async_io::AsyncIO,
    async_safe_computation::AsyncSafeComputation, async_task::AsyncTask,
};

/// Zip a tuple of same-shaped effects sharing one error type.
pub trait ZipAll {
    /// The zipped effect.
    type Output;

    /// Combine every effect in the tuple into one.
    fn zip_all(self) -> Self::Output;
}

/// Zip a tuple of fallible effects whose error types all convert into `W`.
pub trait ZipAllWidened<W> {
    /// The zipped effect, failing with `W`.
    type Output;

    /// Combine every effect in the tuple into one, widening each error.
    fn zip_all_widened(self) -> Self::Output;
}

macro_rules! impl_zip_all {
    ($($T:ident $E:ident $v:ident),+) => {
        impl<$($T: Send + 'static),+> ZipAll for ($(IO<$T>,)+) {
            type Output = IO<($($T,)+)>;

            fn zip_all(self) -> Self::Output {
                let ($($v,)+) = self;
                IO::new(move || ($($v.run(),)+))
            }
        }

        impl<Err: Send + 'static, $($T: Send + 'static),+> ZipAll for ($(Task<$T, Err>,)+) {
            type Output = Task<($($T,)+), Err>;

            fn zip_all(self) -> Self::Output {
                let ($($v,)+) = self;
                Task::new(move || ZipResults::zip_all(($($v.run(),)+)))
            }
        }

        impl<W, $($T, $E),+> ZipAllWidened<W> for ($(Task<$T, $E>,)+)
        where
            W: Send + 'static,
            $($T: Send + 'static, $E: Into<W> + Send + 'static,)+
        {
            type Output = Task<($($T,)+), W>;

            fn zip_all_widened(self) -> Self::Output {
                let ($($v,)+) = self;
                Task::new(move || ZipResultsWidened::<W>::zip_all_widened(($($v.run(),)+)))
            }
        }

        impl<In, $($T: Send + 'static),+> ZipAll for ($(SafeComputation<$T, In>,)+)
        where
            In: Clone + Send + 'static,
        {
            type Output = SafeComputation<($($T,)+), In>;

            fn zip_all(self) -> Self::Output {
                let ($($v,)+) = self;
                SafeComputation::new(move |input: In| ($($v.run(input.clone()),)+))
            }
        }

        impl<Err, In, $($T: Send + 'static),+> ZipAll for ($(Computation<$T, Err, In>,)+)
        where
            Err: Send + 'static,
            In: Clone + Send + 'static,
        {
            type Output = Computation<($($T,)+), Err, In>;

            fn zip_all(self) -> Self::Output {
                let ($($v,)+) = self;
                Computation::new(move |input: In| {
                    ZipResults::zip_all(($($v.run(input.clone()),)+))
                })
            }
        }

        impl<W, In, $($T, $E),+> ZipAllWidened<W> for ($(Computation<$T, $E, In>,)+)
        where
            W: Send + 'static,
            In: Clone + Send + 'static,
            $($T: Send + 'static, $E: Into<W> + Send + 'static,)+
        {
            type Output = Computation<($($T,)+), W, In>;

            fn zip_all_widened(self) -> Self::Output {
                let ($($v,)+) = self;
                Computation::new(move |input: In| {
                    ZipResultsWidened::<W>::zip_all_widened(($($v.run(input.clone()),)+))
                })
            }
        }

        #[cfg(feature = "async")]
        impl<$($T: Send + 'static),+> ZipAll for ($(AsyncIO<$T>,)+) {
            type Output = AsyncIO<($($T,)+)>;

            fn zip_all(self) -> Self::Output {
                let ($($v,)+) = self;
                AsyncIO::new(move || async move { futures::join!($($v.run()),+) })
            }
        }

        #[cfg(feature = "async")]
        impl<Err: Send + 'static, $($T: Send + 'static),+> ZipAll for ($(AsyncTask<$T, Err>,)+) {
            type Output = AsyncTask<($($T,)+), Err>;

            fn zip_all(self) -> Self::Output {
                let ($($v,)+) = self;
                AsyncTask::new(move || async move {
                    ZipResults::zip_all(futures::join!($($v.run()),+))
                })
            }
        }

        #[cfg(feature = "async")]
        impl<W, $($T, $E),+> ZipAllWidened<W> for ($(AsyncTask<$T, $E>,)+)
        where
            W: Send + 'static,
            $($T: Send + 'static, $E: Into<W> + Send + 'static,)+
        {
            type Output = AsyncTask<($($T,)+), W>;

            fn zip_all_widened(self) -> Self::Output {
                let ($($v,)+) = self;
                AsyncTask::new(move || async move {
                    ZipResultsWidened::<W>::zip_all_widened(futures::join!($($v.run()),+))
                })
            }
        }

        #[cfg(feature = "async")]
        impl<In, $($T: Send + 'static),+> ZipAll for ($(AsyncSafeComputation<$T, In>,)+)
        where
            In: Clone + Send + 'static,
        {
            type Output = AsyncSafeComputation<($($T,)+), In>;

            fn zip_all(self) -> Self::Output {
                let ($($v,)+) = self;
                AsyncSafeComputation::new(move |input: In| async move {
                    futures::join!($($v.run(input.clone())),+)
                })
            }
        }

        #[cfg(feature = "async")]
        impl<Err, In, $($T: Send + 'static),+> ZipAll for ($(AsyncComputation<$T, Err, In>,)+)
        where
            Err: Send + 'static,
            In: Clone + Send + 'static,
        {
            type Output = AsyncComputation<($($T,)+), Err, In>;

            fn zip_all(self) -> Self::Output {
                let ($($v,)+) = self;
                AsyncComputation::new(move |input: In| async move {
                    ZipResults::zip_all(futures::join!($($v.run(input.clone())),+))
                })
            }
        }

        #[cfg(feature = "async")]
        impl<W, In, $($T, $E),+> ZipAllWidened<W> for ($(AsyncComputation<$T, $E, In>,)+)
        where
            W: Send + 'static,
            In: Clone + Send + 'static,
            $($T: Send + 'static, $E: Into<W> + Send + 'static,)+
        {
            type Output = AsyncComputation<($($T,)+), W, In>;

            fn zip_all_widened(self) -> Self::Output {
                let ($($v,)+) = self;
                AsyncComputation::new(move |input: In| async move {
                    ZipResultsWidened::<W>::zip_all_widened(futures::join!(
                        $($v.run(input.clone())),+
                    ))
                })
            }
        }
    };
}

impl_zip_all!(A EA a, B EB b);
impl_zip_all!(A EA a, B EB b, C EC c);
impl_zip_all!(A EA a, B EB b, C EC c, D ED d);
impl_zip_all!(A EA a, B EB b, C EC c, D ED d, F EF f);
impl_zip_all!(A EA a, B EB b, C EC c, D ED d, F EF f, G EG g);
impl_zip_all!(A EA a, B EB b, C EC c, D ED d, F EF f, G EG g, H EH h);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, PartialEq)]
    enum AppError {
        Parse(String),
        Io(u8),
    }

    impl From<String> for AppError {
        fn from(e: String) -> Self {
            AppError::Parse(e)
        }
    }

    impl From<u8> for AppError {
        fn from(e: u8) -> Self {
            AppError::Io(e)
        }
    }

    #[test]
    fn io_tuple_runs_left_to_right() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let step = |n: u8| {
            let order = order.clone();
            IO::new(move || {
                order.lock().unwrap().push(n);
                n
            })
        };
        let all = (step(1), step(2), step(3), step(4)).zip_all();
        assert_eq!(all.run(), (1, 2, 3, 4));
        assert_eq!(*order.lock().unwrap(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn task_tuple_runs_all_and_reports_first_failure() {
        let ran = Arc::new(Mutex::new(0));
        let counted = |r: Result<i32, &'static str>| {
            let ran = ran.clone();
            Task::new(move || {
                *ran.lock().unwrap() += 1;
                r
            })
        };
        let all = (counted(Ok(1)), counted(Err("second")), counted(Err("third"))).zip_all();
        assert_eq!(all.run(), Err("second"));
        assert_eq!(*ran.lock().unwrap(), 3);
    }

    #[test]
    fn widened_task_tuple_unions_errors() {
        let all: Task<(i32, i32), AppError> =
            (Task::<i32, String>::pure(1), Task::<i32, u8>::fail(7)).zip_all_widened();
        assert_eq!(all.run(), Err(AppError::Io(7)));
    }

    #[test]
    fn seven_operands_zip() {
        let all = (
            Task::<_, ()>::pure(1),
            Task::<_, ()>::pure(2),
            Task::<_, ()>::pure(3),
            Task::<_, ()>::pure(4),
            Task::<_, ()>::pure(5),
            Task::<_, ()>::pure(6),
            Task::<_, ()>::pure(7),
        )
            .zip_all();
        assert_eq!(all.run(), Ok((1, 2, 3, 4, 5, 6, 7)));
    }

    #[test]
    fn input_tuples_share_input() {
        let safe = (
            SafeComputation::new(|x: i32| x),
            SafeComputation::new(|x: i32| x * 2),
            SafeComputation::new(|x: i32| x.to_string()),
        )
            .zip_all();
        assert_eq!(safe.run(4), (4, 8, "4".to_string()));

        let checked = (
            Computation::<i32, String, i32>::new(|x| Ok(x)),
            Computation::<i32, u8, i32>::new(|x| if x > 3 { Err(1) } else { Ok(x) }),
        );
        let widened: Computation<(i32, i32), AppError, i32> = checked.zip_all_widened();
        assert_eq!(widened.run(9), Err(AppError::Io(1)));
    }

    #[cfg(feature = "async")]
    #[tokio::test]
    async fn async_tuples_gather_in_order() {
        let all = (AsyncIO::pure(1), AsyncIO::pure("b"), AsyncIO::pure(3u8)).zip_all();
        assert_eq!(all.run().await, (1, "b", 3u8));

        let tasks = (
            AsyncTask::<i32, &str>::pure(1),
            AsyncTask::<i32, &str>::fail("second"),
            AsyncTask::<i32, &str>::fail("third"),
        )
            .zip_all();
        assert_eq!(tasks.run().await, Err("second"));

        let comps = (
            AsyncComputation::<i32, (), i32>::new(|x| async move { Ok(x + 1) }),
            AsyncComputation::<i32, (), i32>::new(|x| async move { Ok(x - 1) }),
        )
            .zip_all();
        assert_eq!(comps.run(10).await, Ok((11, 9)));
    }
}
