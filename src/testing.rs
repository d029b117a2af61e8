//! Testing utilities and helpers.
//!
//! This module provides utilities for testing code built on effects and
//! the service registry: a builder for test environments, a probe that
//! counts resource acquisitions and releases, and assertion macros for
//! `Result`s.
//!
//! # Examples
//!
//! ## MockEnv Builder
//!
//! ```rust
//! use wellspring::testing::MockEnv;
//! use wellspring::Tag;
//!
//! const USERS: Tag<Vec<String>> = Tag::new("users");
//!
//! let env = MockEnv::new()
//!     .with(USERS, || vec!["ada".to_string()])
//!     .build();
//! assert_eq!(env.expect(&USERS).len(), 1);
//! ```
//!
//! ## Assertion Macros
//!
//! ```rust
//! use wellspring::{assert_err, assert_ok, Task};
//!
//! assert_ok!(Task::<_, String>::pure(42).run());
//! assert_err!(Task::<i32, _>::fail("boom").run());
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::registry::{Environment, Service, Tag};
use crate::resource::ManagedResource;

/// Builder for creating test environments.
///
/// Each call to `with()` registers one service, created by the given
/// function, under its tag. Later registrations under the same name win.
///
/// # Example
///
/// ```rust
/// use wellspring::testing::MockEnv;
/// use wellspring::Tag;
///
/// #[derive(Clone)]
/// struct Config {
///     debug: bool,
/// }
///
/// const CONFIG: Tag<Config> = Tag::new("config");
/// const DATABASE_URL: Tag<String> = Tag::new("database_url");
///
/// let env = MockEnv::new()
///     .with(CONFIG, || Config { debug: true })
///     .with(DATABASE_URL, || "test://localhost".to_string())
///     .build();
///
/// assert!(env.expect(&CONFIG).debug);
/// assert_eq!(env.expect(&DATABASE_URL), "test://localhost");
/// ```
#[derive(Debug, Default)]
pub struct MockEnv {
    env: Environment,
}

impl MockEnv {
    /// Create a new empty mock environment.
    pub fn new() -> Self {
        MockEnv::default()
    }

    /// Register a service under `tag`.
    ///
    /// The service is created by calling the provided function.
    pub fn with<S, F>(self, tag: Tag<S>, f: F) -> MockEnv
    where
        S: Service,
        F: FnOnce() -> S,
    {
        MockEnv {
            env: self.env.with(tag.tagged(f())),
        }
    }

    /// Build the final environment.
    pub fn build(self) -> Environment {
        self.env
    }
}

/// Counts acquisitions and releases of managed resources.
///
/// Clones share their counters.
///
/// ```rust
/// use wellspring::testing::LifecycleProbe;
///
/// let probe = LifecycleProbe::new();
/// let resource = probe.managed::<_, String, ()>(|()| Ok("handle"));
///
/// assert_eq!(resource.use_infallible(|h| h.len()).run(()), Ok(6));
/// assert_eq!(probe.acquired(), 1);
/// assert_eq!(probe.released(), 1);
/// assert_eq!(probe.outstanding(), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct LifecycleProbe {
    acquired: Arc<AtomicUsize>,
    released: Arc<AtomicUsize>,
}

impl LifecycleProbe {
    /// A probe with both counters at zero.
    pub fn new() -> Self {
        LifecycleProbe::default()
    }

    /// Number of successful acquisitions.
    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    /// Number of releases.
    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    /// Acquisitions not yet released.
    pub fn outstanding(&self) -> usize {
        self.acquired().saturating_sub(self.released())
    }

    /// Wrap `acquire` in a managed resource that reports to this probe.
    pub fn managed<R, E, I>(
        &self,
        acquire: impl Fn(I) -> Result<R, E> + Send + Sync + 'static,
    ) -> ManagedResource<R, E, I>
    where
        R: Send + 'static,
        E: Send + 'static,
        I: Send + 'static,
    {
        let acquired = Arc::clone(&self.acquired);
        let released = Arc::clone(&self.released);
        ManagedResource::new(
            move |input| {
                let resource = acquire(input)?;
                acquired.fetch_add(1, Ordering::SeqCst);
                Ok(resource)
            },
            move |_| {
                released.fetch_add(1, Ordering::SeqCst);
            },
        )
    }

    /// Like [`managed`](LifecycleProbe::managed), with a release step that
    /// can fail. The release is counted either way.
    pub fn managed_with_release<R, E, I>(
        &self,
        acquire: impl Fn(I) -> Result<R, E> + Send + Sync + 'static,
        release: impl Fn(R) -> Result<(), E> + Send + Sync + 'static,
    ) -> ManagedResource<R, E, I>
    where
        R: Send + 'static,
        E: std::fmt::Debug + Send + 'static,
        I: Send + 'static,
    {
        let acquired = Arc::clone(&self.acquired);
        let released = Arc::clone(&self.released);
        ManagedResource::with_fallible_release(
            move |input| {
                let resource = acquire(input)?;
                acquired.fetch_add(1, Ordering::SeqCst);
                Ok(resource)
            },
            move |resource| {
                released.fetch_add(1, Ordering::SeqCst);
                release(resource)
            },
        )
    }
}

/// Assert that a result is `Ok`.
///
/// This macro will panic if the result is an `Err`.
///
/// # Example
///
/// ```rust
/// use wellspring::assert_ok;
///
/// assert_ok!(Ok::<_, String>(42));
/// ```
#[macro_export]
macro_rules! assert_ok {
    ($result:expr) => {
        match $result {
            Ok(_) => {}
            Err(e) => {
                panic!("Expected Ok, got Err: {:?}", e);
            }
        }
    };
}

/// Assert that a result is `Err`.
///
/// This macro will panic if the result is an `Ok`.
///
/// # Example
///
/// ```rust
/// use wellspring::assert_err;
///
/// assert_err!(Err::<i32, _>("boom"));
/// ```
#[macro_export]
macro_rules! assert_err {
    ($result:expr) => {
        match $result {
            Err(_) => {}
            Ok(v) => {
                panic!("Expected Err, got Ok: {:?}", v);
            }
        }
    };
}

/// Assert that a result is `Err` with a specific error.
///
/// # Example
///
/// ```rust
/// use wellspring::assert_err_eq;
///
/// assert_err_eq!(Err::<i32, _>("boom"), "boom");
/// ```
#[macro_export]
macro_rules! assert_err_eq {
    ($result:expr, $expected:expr) => {
        match $result {
            Err(error) => {
                assert_eq!(error, $expected);
            }
            Ok(v) => {
                panic!("Expected Err {:?}, got Ok: {:?}", $expected, v);
            }
        }
    };
}
