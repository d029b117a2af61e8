//! Integration tests for managed resource lifecycles.
//!
//! Every use of a resource must release exactly what it acquired, whatever
//! the usage does.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

use wellspring::testing::LifecycleProbe;
use wellspring::{assert_err_eq, assert_ok, ManagedResource, Task};
#[cfg(feature = "async")]
use wellspring::AsyncTask;

// ============================================================================
// Fixtures
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum DbError {
    Unreachable,
    Query(String),
    Close,
}

#[derive(Debug)]
struct Connection {
    id: u32,
}

impl Connection {
    fn query(&self, sql: &str) -> Result<Vec<String>, DbError> {
        if sql.starts_with("SELECT") {
            Ok(vec![format!("row from conn {}", self.id)])
        } else {
            Err(DbError::Query(sql.to_string()))
        }
    }
}

fn connection(probe: &LifecycleProbe) -> ManagedResource<Connection, DbError, u32> {
    probe.managed(|id: u32| {
        if id == 0 {
            Err(DbError::Unreachable)
        } else {
            Ok(Connection { id })
        }
    })
}

// ============================================================================
// Release guarantees
// ============================================================================

#[test]
fn successful_usage_releases_once() {
    let probe = LifecycleProbe::new();
    let rows = connection(&probe)
        .use_with(|conn| conn.query("SELECT 1"))
        .run(3);

    assert_eq!(rows, Ok(vec!["row from conn 3".to_string()]));
    assert_eq!((probe.acquired(), probe.released()), (1, 1));
}

#[test]
fn failing_usage_releases_and_returns_usage_error() {
    let probe = LifecycleProbe::new();
    let rows = connection(&probe)
        .use_with(|conn| conn.query("DROP TABLE users"))
        .run(3);

    assert_err_eq!(rows, DbError::Query("DROP TABLE users".to_string()));
    assert_eq!(probe.outstanding(), 0);
    assert_eq!(probe.released(), 1);
}

#[test]
fn failed_acquisition_never_runs_usage_or_release() {
    let probe = LifecycleProbe::new();
    let ran = Arc::new(Mutex::new(false));
    let ran_clone = ran.clone();

    let result = connection(&probe)
        .use_infallible(move |_| {
            *ran_clone.lock().unwrap() = true;
        })
        .run(0);

    assert_err_eq!(result, DbError::Unreachable);
    assert!(!*ran.lock().unwrap());
    assert_eq!((probe.acquired(), probe.released()), (0, 0));
}

#[test]
fn panicking_usage_releases_then_propagates() {
    let probe = LifecycleProbe::new();
    let resource = connection(&probe);

    let outcome = catch_unwind(AssertUnwindSafe(|| {
        resource
            .use_infallible(|conn| {
                if conn.id > 0 {
                    panic!("driver bug");
                }
            })
            .run(9)
    }));

    assert!(outcome.is_err());
    assert_eq!((probe.acquired(), probe.released()), (1, 1));
}

#[test]
fn release_failure_does_not_replace_result() {
    let probe = LifecycleProbe::new();
    let resource = probe.managed_with_release(
        |id: u32| Ok(Connection { id }),
        |_| Err(DbError::Close),
    );

    assert_ok!(resource.use_with(|conn| conn.query("SELECT 1")).run(1));
    assert_err_eq!(
        resource.use_with(|conn| conn.query("UPDATE")).run(1),
        DbError::Query("UPDATE".to_string())
    );
    assert_eq!(probe.released(), 2);
}

#[test]
fn every_run_is_an_independent_lifecycle() {
    let probe = LifecycleProbe::new();
    let resource = connection(&probe);

    for id in 1..=5 {
        assert_ok!(resource.use_task(|conn| Task::pure(conn.id)).run(id));
    }
    assert_eq!(probe.acquired(), 5);
    assert_eq!(probe.outstanding(), 0);
}

#[test]
fn nothing_happens_until_run() {
    let probe = LifecycleProbe::new();
    let pending = connection(&probe).use_infallible(|conn| conn.id);

    assert_eq!(probe.acquired(), 0);
    drop(pending);
    assert_eq!(probe.acquired(), 0);
}

// ============================================================================
// Async usage
// ============================================================================

#[cfg(feature = "async")]
#[tokio::test]
async fn async_usage_releases_after_completion() {
    let probe = LifecycleProbe::new();
    let observer = probe.clone();

    let effect = connection(&probe).use_async(move |conn| {
        let id = conn.id;
        AsyncTask::new(move || async move {
            tokio::task::yield_now().await;
            Ok((id, observer.outstanding()))
        })
    });

    assert_eq!(effect.run(4).await, Ok((4, 1)));
    assert_eq!(probe.outstanding(), 0);
}

#[cfg(feature = "async")]
#[tokio::test]
async fn async_failure_releases() {
    let probe = LifecycleProbe::new();
    let effect = connection(&probe)
        .use_async(|_| AsyncTask::<(), _>::fail(DbError::Query("timeout".to_string())));

    assert_err_eq!(effect.run(2).await, DbError::Query("timeout".to_string()));
    assert_eq!(probe.released(), 1);
}
