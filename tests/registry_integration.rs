//! Integration tests for the tagged service registry and layers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use wellspring::prelude::*;
use wellspring::testing::MockEnv;
use wellspring::{assert_err_eq, assert_ok};

// ============================================================================
// Domain services
// ============================================================================

#[derive(Debug, Default)]
struct Logger {
    lines: Mutex<Vec<String>>,
}

impl Logger {
    fn log(&self, line: impl Into<String>) {
        self.lines.lock().unwrap().push(line.into());
    }

    fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

#[derive(Debug)]
struct UserRepo {
    users: Vec<&'static str>,
}

const LOGGER: Tag<Arc<Logger>> = Tag::new("logger");
const REPO: Tag<Arc<UserRepo>> = Tag::new("user_repo");
const MAX_USERS: Tag<usize> = Tag::new("max_users");
const MAX_USERS_TEXT: Tag<String> = Tag::new("max_users");

fn list_users() -> Computation<Vec<&'static str>, String, (Arc<Logger>, Arc<UserRepo>, usize)> {
    Computation::new(|(logger, repo, max): (Arc<Logger>, Arc<UserRepo>, usize)| {
        logger.log(format!("listing up to {} users", max));
        if repo.users.len() > max {
            return Err(format!("{} users exceed limit {}", repo.users.len(), max));
        }
        Ok(repo.users.clone())
    })
}

// ============================================================================
// Environment
// ============================================================================

#[test]
fn extending_an_environment_leaves_the_original_intact() {
    let base = MockEnv::new().with(MAX_USERS, || 10).build();
    let strict = base.with(MAX_USERS.tagged(1));

    assert_eq!(base.get(&MAX_USERS), Some(10));
    assert_eq!(strict.get(&MAX_USERS), Some(1));
}

#[test]
fn environments_are_shared_across_threads() {
    let env = MockEnv::new().with(MAX_USERS, || 3).build();

    let handles: Vec<_> = (0..4)
        .map(|n| {
            let env = env.clone();
            std::thread::spawn(move || env.with(MAX_USERS.tagged(n)).expect(&MAX_USERS))
        })
        .collect();
    let seen: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(seen, vec![0, 1, 2, 3]);
    assert_eq!(env.expect(&MAX_USERS), 3);
}

#[test]
fn bound_effects_receive_the_registered_services() {
    let logger = Arc::new(Logger::default());
    let env = MockEnv::new()
        .with(LOGGER, || logger.clone())
        .with(REPO, || Arc::new(UserRepo { users: vec!["ada", "grace"] }))
        .with(MAX_USERS, || 5)
        .build();

    let task = env.bind(list_users().requires((LOGGER, REPO, MAX_USERS)));

    assert_eq!(task.run(), Ok(vec!["ada", "grace"]));
    assert_eq!(logger.lines(), vec!["listing up to 5 users".to_string()]);
}

#[test]
fn binding_a_computation_error_surfaces_when_run() {
    let env = MockEnv::new()
        .with(LOGGER, || Arc::new(Logger::default()))
        .with(REPO, || Arc::new(UserRepo { users: vec!["ada", "grace"] }))
        .with(MAX_USERS, || 1)
        .build();

    let task = env.bind(list_users().requires((LOGGER, REPO, MAX_USERS)));
    assert_err_eq!(task.run(), "2 users exceed limit 1".to_string());
}

#[test]
fn try_bind_reports_the_missing_tag() {
    let env = MockEnv::new().with(MAX_USERS, || 5).build();

    match env.try_bind(list_users().requires((LOGGER, REPO, MAX_USERS))) {
        Err(err) => assert_eq!(err, RegistryError::MissingService { tag: "logger" }),
        Ok(_) => panic!("binding should fail without a logger"),
    }
}

#[test]
fn try_bind_reports_a_type_mismatch() {
    let env = MockEnv::new().with(MAX_USERS_TEXT, || "ten".to_string()).build();
    let effect = SafeComputation::new(|max: usize| max * 2).requires(MAX_USERS);

    match env.try_bind(effect) {
        Err(RegistryError::TypeMismatch { tag, .. }) => assert_eq!(tag, "max_users"),
        other => panic!("expected a type mismatch, got {:?}", other.map(|io| io.run())),
    }
}

#[test]
#[should_panic(expected = "no service registered under tag `user_repo`")]
fn bind_panics_on_a_missing_service() {
    let env = MockEnv::new()
        .with(LOGGER, || Arc::new(Logger::default()))
        .with(MAX_USERS, || 5)
        .build();
    let _ = env.bind(list_users().requires((LOGGER, REPO, MAX_USERS)));
}

// ============================================================================
// Layers
// ============================================================================

#[test]
fn provided_service_is_the_constructed_instance() {
    let logger = Arc::new(Logger::default());
    let layer = Layer::<_, _, String>::from_service(logger.clone(), LOGGER);

    let expected = logger.clone();
    let task = layer.provide(&Environment::empty(), move |env| {
        let report = Computation::new(move |seen: Arc<Logger>| {
            seen.log("hello");
            Ok(Arc::ptr_eq(&seen, &expected))
        });
        env.bind(report.requires(LOGGER))
    });

    assert_eq!(task.run(), Ok(true));
    assert_eq!(logger.lines(), vec!["hello".to_string()]);
}

#[test]
fn layer_services_do_not_leak_into_the_outer_environment() {
    let layer = Layer::<_, _, String>::make(MAX_USERS, || Ok(42));
    let env = Environment::empty();

    let inside = layer.provide(&env, |env| Task::pure(env.get(&MAX_USERS)));

    assert_eq!(inside.run(), Ok(Some(42)));
    assert!(!env.contains(&MAX_USERS));
}

#[test]
fn layer_built_from_other_services_is_released_after_the_body() {
    let released = Arc::new(AtomicUsize::new(0));
    let on_release = released.clone();

    let repo_layer = Layer::from_managed(
        ManagedResource::new(
            |(logger, max): (Arc<Logger>, usize)| {
                logger.log("opening repo");
                let users = vec!["ada", "grace", "linus"].into_iter().take(max).collect();
                Ok::<_, String>(Arc::new(UserRepo { users }))
            },
            move |_| {
                on_release.fetch_add(1, Ordering::SeqCst);
            },
        ),
        (LOGGER, MAX_USERS),
        REPO,
    );

    let logger = Arc::new(Logger::default());
    let env = Environment::empty()
        .with((LOGGER.tagged(logger.clone()), MAX_USERS.tagged(2)));
    let observed = released.clone();

    let task = repo_layer.provide(&env, move |env| {
        let count = SafeComputation::new(|repo: Arc<UserRepo>| repo.users.len());
        env.bind(count.requires(REPO))
            .to_task()
            .map(move |n| (n, observed.load(Ordering::SeqCst)))
    });

    assert_eq!(task.run(), Ok((2, 0)));
    assert_eq!(released.load(Ordering::SeqCst), 1);
    assert_eq!(logger.lines(), vec!["opening repo".to_string()]);
}

#[test]
fn failing_layer_construction_skips_the_body() {
    let ran = Arc::new(AtomicUsize::new(0));
    let ran_in_body = ran.clone();
    let layer = Layer::<_, _, String>::make(REPO, || Err("database offline".to_string()));

    let task = layer.provide(&Environment::empty(), move |_| {
        ran_in_body.fetch_add(1, Ordering::SeqCst);
        Task::pure(())
    });

    assert_err_eq!(task.run(), "database offline".to_string());
    assert_eq!(ran.load(Ordering::SeqCst), 0);
}

#[test]
fn multi_service_layer_registers_every_tag() {
    let layer = Layer::<_, _, String>::from_fn((), (LOGGER, MAX_USERS), |()| {
        Ok((Arc::new(Logger::default()), 7))
    });

    let task = layer.provide(&Environment::empty(), |env| {
        Task::pure((env.names(), env.expect(&MAX_USERS)))
    });

    assert_eq!(task.run(), Ok((vec!["logger", "max_users"], 7)));
}

#[test]
fn mapped_layer_exposes_the_new_services() {
    let base = Layer::<_, _, String>::make(MAX_USERS, || Ok(3));
    let mapped = base.map(|max| format!("{} users", max), MAX_USERS_TEXT, |_| Ok(()));

    let task = mapped.provide(&Environment::empty(), |env| {
        Task::pure(env.expect(&MAX_USERS_TEXT))
    });

    assert_eq!(task.run(), Ok("3 users".to_string()));
}

#[test]
#[should_panic(expected = "layer declared 2 service tag(s) but produced 1 service(s)")]
fn vec_layer_with_wrong_service_count_panics_on_acquire() {
    const PRIMARY: Tag<u32> = Tag::new("primary");
    const REPLICA: Tag<u32> = Tag::new("replica");

    let layer = Layer::<_, _, String>::from_fn((), vec![PRIMARY, REPLICA], |()| Ok(vec![1]));
    let _ = layer.provide(&Environment::empty(), |_| Task::pure(())).run();
}

#[test]
fn provide_fails_fast_when_inputs_are_missing() {
    let layer = Layer::<_, _, String>::lift_service(MAX_USERS, REPO, |max: usize| {
        Ok(Arc::new(UserRepo { users: vec!["ada"; max] }))
    });

    match layer.try_provide(&Environment::empty(), |_| Task::pure(())) {
        Err(err) => assert_eq!(err.tag(), Some("max_users")),
        Ok(_) => panic!("inputs should be resolved before running"),
    }
}

#[test]
fn layers_nest() {
    let max_layer = Layer::<_, _, String>::make(MAX_USERS, || Ok(2));
    let repo_layer = Layer::<_, _, String>::lift_service(MAX_USERS, REPO, |max: usize| {
        Ok(Arc::new(UserRepo { users: vec!["ada"; max] }))
    });

    let task = max_layer.provide(&Environment::empty(), move |env| {
        repo_layer.provide(&env, |env| Task::pure(env.expect(&REPO).users.len()))
    });

    assert_ok!(task.run());
}

#[cfg(feature = "async")]
#[tokio::test]
async fn provide_async_releases_after_the_future() {
    let released = Arc::new(AtomicUsize::new(0));
    let on_release = released.clone();
    let layer = Layer::from_managed(
        ManagedResource::new(
            |()| Ok::<_, String>(Arc::new(Logger::default())),
            move |_| {
                on_release.fetch_add(1, Ordering::SeqCst);
            },
        ),
        (),
        LOGGER,
    );
    let observed = released.clone();

    let task = layer.provide_async(&Environment::empty(), move |env| {
        let logger = env.expect(&LOGGER);
        AsyncTask::new(move || async move {
            tokio::task::yield_now().await;
            logger.log("async");
            Ok(observed.load(Ordering::SeqCst))
        })
    });

    assert_eq!(task.run().await, Ok(0));
    assert_eq!(released.load(Ordering::SeqCst), 1);
}
