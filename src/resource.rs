//! Acquire/use/release resource management.
//!
//! A [`ManagedResource`] pairs an acquisition step with a release step. Each
//! `use_*` call builds an effect that, when run, performs one complete
//! lifecycle:
//!
//! 1. acquire the resource from the input; if that fails, the error is
//!    returned and nothing is released
//! 2. run the usage against a reference to the resource
//! 3. release the resource, whether the usage succeeded, failed, or panicked
//! 4. return the usage's result (or resume its panic)
//!
//! Release failures are logged and do not replace the usage's result.
//!
//! # Example
//!
//! ```
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//! use wellspring::ManagedResource;
//!
//! let open = Arc::new(AtomicUsize::new(0));
//! let (on_acquire, on_release) = (open.clone(), open.clone());
//!
//! let connection = ManagedResource::<String, String>::new(
//!     move |()| {
//!         on_acquire.fetch_add(1, Ordering::SeqCst);
//!         Ok("conn-1".to_string())
//!     },
//!     move |_conn| {
//!         on_release.fetch_sub(1, Ordering::SeqCst);
//!     },
//! );
//!
//! let query = connection.use_with(|conn| Ok(format!("SELECT 1 via {}", conn)));
//! assert_eq!(query.run(()), Ok("SELECT 1 via conn-1".to_string()));
//! assert_eq!(open.load(Ordering::SeqCst), 0);
//! ```

use std::fmt::Debug;
use std::panic::{catch_unwind, resume_unwind, AssertUnwindSafe};
use std::sync::Arc;

use crate::effect::computation::Computation;
use crate::effect::task::Task;

#[cfg(feature = "async")]
use crate::effect::{async_computation::AsyncComputation, async_task::AsyncTask};
#[cfg(feature = "async")]
use futures::FutureExt;

type AcquireFn<R, E, I> = Arc<dyn Fn(I) -> Result<R, E> + Send + Sync>;
type ReleaseFn<R> = Arc<dyn Fn(R) -> Result<(), String> + Send + Sync>;

/// A resource with paired acquisition and release.
///
/// `I` is the input acquisition needs (`()` when it needs nothing). The
/// acquire and release functions are shared, so a `ManagedResource` can be
/// cloned and used any number of times; every use is an independent
/// lifecycle.
pub struct ManagedResource<R, E, I = ()> {
    pub(crate) acquire: AcquireFn<R, E, I>,
    pub(crate) release: ReleaseFn<R>,
}

impl<R, E, I> Clone for ManagedResource<R, E, I> {
    fn clone(&self) -> Self {
        ManagedResource {
            acquire: Arc::clone(&self.acquire),
            release: Arc::clone(&self.release),
        }
    }
}

impl<R, E, I> std::fmt::Debug for ManagedResource<R, E, I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagedResource")
            .field("resource", &std::any::type_name::<R>())
            .field("acquire", &"<function>")
            .field("release", &"<function>")
            .finish()
    }
}

impl<R, E, I> ManagedResource<R, E, I>
where
    R: Send + 'static,
    E: Send + 'static,
    I: Send + 'static,
{
    /// Create a resource from a fallible acquisition and an infallible
    /// release.
    pub fn new<A, Rel>(acquire: A, release: Rel) -> Self
    where
        A: Fn(I) -> Result<R, E> + Send + Sync + 'static,
        Rel: Fn(R) + Send + Sync + 'static,
    {
        ManagedResource {
            acquire: Arc::new(acquire),
            release: Arc::new(move |resource| {
                release(resource);
                Ok(())
            }),
        }
    }

    /// Create a resource whose acquisition cannot fail.
    pub fn from_fn<A, Rel>(acquire: A, release: Rel) -> Self
    where
        A: Fn(I) -> R + Send + Sync + 'static,
        Rel: Fn(R) + Send + Sync + 'static,
    {
        ManagedResource::new(move |input| Ok(acquire(input)), release)
    }

    /// Create a resource whose release can fail.
    ///
    /// A failed release is logged at `warn` level with the error's `Debug`
    /// text; the usage's result is still what the lifecycle returns.
    pub fn with_fallible_release<A, Rel>(acquire: A, release: Rel) -> Self
    where
        A: Fn(I) -> Result<R, E> + Send + Sync + 'static,
        Rel: Fn(R) -> Result<(), E> + Send + Sync + 'static,
        E: Debug,
    {
        ManagedResource {
            acquire: Arc::new(acquire),
            release: Arc::new(move |resource| {
                release(resource).map_err(|err| format!("{:?}", err))
            }),
        }
    }

    /// Transform the acquired resource and replace the release step.
    ///
    /// The original release is not called for resources acquired through
    /// the returned value; `release` takes over.
    pub fn map<R2, F, Rel>(&self, f: F, release: Rel) -> ManagedResource<R2, E, I>
    where
        R2: Send + 'static,
        F: Fn(R) -> R2 + Send + Sync + 'static,
        Rel: Fn(R2) -> Result<(), E> + Send + Sync + 'static,
        E: Debug,
    {
        let acquire = Arc::clone(&self.acquire);
        ManagedResource::with_fallible_release(move |input| acquire(input).map(&f), release)
    }

    /// Use the resource with a fallible function.
    pub fn use_with<U, F>(&self, usage: F) -> Computation<U, E, I>
    where
        F: FnOnce(&R) -> Result<U, E> + Send + 'static,
        U: Send + 'static,
    {
        let resource = self.clone();
        Computation::new(move |input| resource.lifecycle(input, usage))
    }

    /// Use the resource with a function that cannot fail.
    pub fn use_infallible<U, F>(&self, usage: F) -> Computation<U, E, I>
    where
        F: FnOnce(&R) -> U + Send + 'static,
        U: Send + 'static,
    {
        self.use_with(move |resource| Ok(usage(resource)))
    }

    /// Use the resource with a function producing a [`Task`].
    ///
    /// The task runs while the resource is held.
    pub fn use_task<U, F>(&self, usage: F) -> Computation<U, E, I>
    where
        F: FnOnce(&R) -> Task<U, E> + Send + 'static,
        U: Send + 'static,
    {
        self.use_with(move |resource| usage(resource).run())
    }

    /// Use the resource with a function producing an [`AsyncTask`].
    ///
    /// The resource is released once the task's future completes, or after
    /// it panics.
    ///
    /// # Examples
    ///
    /// ```
    /// use wellspring::{AsyncTask, ManagedResource};
    ///
    /// # tokio_test::block_on(async {
    /// let pool = ManagedResource::<Vec<u32>, String>::from_fn(|()| vec![1, 2, 3], |_| {});
    /// let total = pool.use_async(|ids| {
    ///     let ids = ids.clone();
    ///     AsyncTask::new(move || async move { Ok(ids.iter().sum::<u32>()) })
    /// });
    /// assert_eq!(total.run(()).await, Ok(6));
    /// # });
    /// ```
    #[cfg(feature = "async")]
    pub fn use_async<U, F>(&self, usage: F) -> AsyncComputation<U, E, I>
    where
        F: FnOnce(&R) -> AsyncTask<U, E> + Send + 'static,
        U: Send + 'static,
    {
        let ManagedResource { acquire, release } = self.clone();
        AsyncComputation::new(move |input| async move {
            let resource = acquire(input)?;
            let outcome = match catch_unwind(AssertUnwindSafe(|| usage(&resource))) {
                Ok(task) => AssertUnwindSafe(task.run()).catch_unwind().await,
                Err(payload) => Err(payload),
            };
            let released = release(resource);
            settle(outcome, released)
        })
    }

    fn lifecycle<U, F>(&self, input: I, usage: F) -> Result<U, E>
    where
        F: FnOnce(&R) -> Result<U, E>,
    {
        let resource = (self.acquire)(input)?;
        let outcome = catch_unwind(AssertUnwindSafe(|| usage(&resource)));
        let released = (self.release)(resource);
        settle(outcome, released)
    }
}

fn settle<U, E>(
    outcome: std::thread::Result<Result<U, E>>,
    released: Result<(), String>,
) -> Result<U, E> {
    match outcome {
        Ok(result) => {
            if let Err(ref rel_err) = released {
                log_release_failure(rel_err);
            }
            result
        }
        Err(panic_payload) => {
            if let Err(ref rel_err) = released {
                #[cfg(feature = "tracing")]
                tracing::error!("Resource release failed after panic: {}", rel_err);
                #[cfg(not(feature = "tracing"))]
                eprintln!("Resource release failed after panic: {}", rel_err);
            }
            resume_unwind(panic_payload)
        }
    }
}

pub(crate) fn log_release_failure(rel_err: &str) {
    #[cfg(feature = "tracing")]
    tracing::warn!("Resource release failed: {}", rel_err);
    #[cfg(not(feature = "tracing"))]
    eprintln!("Resource release failed: {}", rel_err);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counted(
        acquired: &Arc<AtomicUsize>,
        released: &Arc<AtomicUsize>,
        fail_acquire: bool,
    ) -> ManagedResource<u32, String, ()> {
        let (acquired, released) = (acquired.clone(), released.clone());
        ManagedResource::new(
            move |()| {
                if fail_acquire {
                    return Err("acquire failed".to_string());
                }
                acquired.fetch_add(1, Ordering::SeqCst);
                Ok(7)
            },
            move |_| {
                released.fetch_add(1, Ordering::SeqCst);
            },
        )
    }

    #[test]
    fn releases_after_success_and_failure() {
        let (acquired, released) = (Arc::new(AtomicUsize::new(0)), Arc::new(AtomicUsize::new(0)));
        let resource = counted(&acquired, &released, false);

        assert_eq!(resource.use_infallible(|n| n * 2).run(()), Ok(14));
        assert_eq!(
            resource
                .use_with(|_| Err::<u32, _>("usage failed".to_string()))
                .run(()),
            Err("usage failed".to_string())
        );
        assert_eq!(acquired.load(Ordering::SeqCst), 2);
        assert_eq!(released.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn failed_acquire_skips_release() {
        let (acquired, released) = (Arc::new(AtomicUsize::new(0)), Arc::new(AtomicUsize::new(0)));
        let resource = counted(&acquired, &released, true);

        assert_eq!(
            resource.use_infallible(|n| *n).run(()),
            Err("acquire failed".to_string())
        );
        assert_eq!(released.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn usage_is_deferred_until_run() {
        let (acquired, released) = (Arc::new(AtomicUsize::new(0)), Arc::new(AtomicUsize::new(0)));
        let resource = counted(&acquired, &released, false);

        let pending = resource.use_task(|n| Task::pure(*n));
        assert_eq!(acquired.load(Ordering::SeqCst), 0);
        assert_eq!(pending.run(()), Ok(7));
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn panicking_usage_still_releases() {
        let (acquired, released) = (Arc::new(AtomicUsize::new(0)), Arc::new(AtomicUsize::new(0)));
        let resource = counted(&acquired, &released, false);

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            resource
                .use_infallible(|_| -> u32 { panic!("usage panicked") })
                .run(())
        }));
        assert!(outcome.is_err());
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn release_failure_keeps_usage_result() {
        let resource = ManagedResource::<u32, String>::with_fallible_release(
            |()| Ok(1),
            |_| Err("release failed".to_string()),
        );
        assert_eq!(resource.use_infallible(|n| n + 1).run(()), Ok(2));
    }

    #[cfg(feature = "tracing")]
    #[test]
    #[tracing_test::traced_test]
    fn release_failure_is_logged() {
        let resource = ManagedResource::<u32, String>::with_fallible_release(
            |()| Ok(1),
            |_| Err("socket already closed".to_string()),
        );
        assert_eq!(resource.use_infallible(|n| *n).run(()), Ok(1));
        assert!(logs_contain("Resource release failed"));
        assert!(logs_contain("socket already closed"));
    }

    struct Opaque;

    #[test]
    fn usage_errors_need_no_debug() {
        let released = Arc::new(AtomicUsize::new(0));
        let tracker = released.clone();
        let resource = ManagedResource::<u32, Opaque>::new(
            |()| Ok(3),
            move |_| {
                tracker.fetch_add(1, Ordering::SeqCst);
            },
        );
        let outcome = resource.use_with(|_| Err::<u32, _>(Opaque)).run(());
        assert!(matches!(outcome, Err(Opaque)));
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn map_replaces_release() {
        let released = Arc::new(AtomicUsize::new(0));
        let original_released = Arc::new(AtomicUsize::new(0));
        let tracker = original_released.clone();
        let base = ManagedResource::<u32, String>::new(
            |()| Ok(20),
            move |_| {
                tracker.fetch_add(1, Ordering::SeqCst);
            },
        );
        let tracker = released.clone();
        let mapped = base.map(
            |n| n.to_string(),
            move |_| {
                tracker.fetch_add(1, Ordering::SeqCst);
                Ok(())
            },
        );

        assert_eq!(mapped.use_infallible(|s| s.len()).run(()), Ok(2));
        assert_eq!(released.load(Ordering::SeqCst), 1);
        assert_eq!(original_released.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn acquisition_consumes_input() {
        let resource = ManagedResource::<String, String, u16>::from_fn(
            |port| format!("listener:{}", port),
            |_| {},
        );
        assert_eq!(
            resource.use_infallible(|l| l.clone()).run(8080),
            Ok("listener:8080".to_string())
        );
    }

    #[cfg(feature = "async")]
    #[tokio::test]
    async fn async_use_releases_after_future_completes() {
        let (acquired, released) = (Arc::new(AtomicUsize::new(0)), Arc::new(AtomicUsize::new(0)));
        let resource = counted(&acquired, &released, false);
        let observed = released.clone();

        let effect = resource.use_async(move |n| {
            let n = *n;
            AsyncTask::new(move || async move {
                tokio::task::yield_now().await;
                Ok(observed.load(Ordering::SeqCst) + n as usize)
            })
        });

        assert_eq!(effect.run(()).await, Ok(7));
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }
}
