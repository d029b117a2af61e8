//! Integration tests for concurrent composition of async effects.

#![cfg(feature = "async")]

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use wellspring::prelude::*;

const DELAY: Duration = Duration::from_millis(100);

fn timed(
    label: &'static str,
    starts: Arc<Mutex<Vec<(&'static str, Instant)>>>,
) -> AsyncTask<&'static str, String> {
    AsyncTask::new(move || async move {
        starts.lock().unwrap().push((label, Instant::now()));
        tokio::time::sleep(DELAY).await;
        Ok(label)
    })
}

#[tokio::test]
async fn zip_runs_both_sides_concurrently() {
    let starts = Arc::new(Mutex::new(Vec::new()));
    let begin = Instant::now();

    let result = timed("left", starts.clone())
        .zip(timed("right", starts.clone()))
        .run()
        .await;

    let elapsed = begin.elapsed();
    assert_eq!(result, Ok(("left", "right")));
    assert!(elapsed < DELAY * 2, "zip took {:?}", elapsed);

    let starts = starts.lock().unwrap();
    assert_eq!(starts.len(), 2);
    let gap = if starts[0].1 > starts[1].1 {
        starts[0].1 - starts[1].1
    } else {
        starts[1].1 - starts[0].1
    };
    assert!(gap < DELAY, "second side started {:?} after the first", gap);
}

#[tokio::test]
async fn zip_all_runs_every_operand_concurrently() {
    let starts = Arc::new(Mutex::new(Vec::new()));
    let begin = Instant::now();

    let result = (
        timed("a", starts.clone()),
        timed("b", starts.clone()),
        timed("c", starts.clone()),
        timed("d", starts.clone()),
    )
        .zip_all()
        .run()
        .await;

    assert_eq!(result, Ok(("a", "b", "c", "d")));
    assert!(begin.elapsed() < DELAY * 2);
    assert_eq!(starts.lock().unwrap().len(), 4);
}

#[tokio::test]
async fn apply_runs_function_and_argument_concurrently() {
    let begin = Instant::now();
    let value = AsyncTask::<_, String>::new(|| async {
        tokio::time::sleep(DELAY).await;
        Ok(20)
    });
    let function = AsyncTask::<_, String>::new(|| async {
        tokio::time::sleep(DELAY).await;
        Ok(|n: i32| n + 1)
    });

    assert_eq!(value.apply(function).run().await, Ok(21));
    assert!(begin.elapsed() < DELAY * 2);
}

#[tokio::test]
async fn zip_reports_the_leftmost_failure() {
    let slow_failure = AsyncTask::<i32, _>::new(|| async {
        tokio::time::sleep(DELAY).await;
        Err("left".to_string())
    });
    let fast_failure = AsyncTask::<i32, _>::fail("right".to_string());

    assert_eq!(slow_failure.zip(fast_failure).run().await, Err("left".to_string()));
}

#[tokio::test]
async fn sequencing_stays_sequential() {
    let begin = Instant::now();
    let first = AsyncIO::new(|| async {
        tokio::time::sleep(DELAY).await;
        1
    });

    let total = first
        .flat_map(|n| {
            AsyncIO::new(move || async move {
                tokio::time::sleep(DELAY).await;
                n + 1
            })
        })
        .run()
        .await;

    assert_eq!(total, 2);
    assert!(begin.elapsed() >= DELAY * 2);
}

#[tokio::test]
async fn sync_effects_compose_into_async_chains() {
    let task = AsyncIO::pure(2)
        .then_do_task(Task::<_, String>::pure(3))
        .zip(IO::new(|| 4))
        .map(|(a, b)| a * b);

    assert_eq!(task.run().await, Ok(12));
}
