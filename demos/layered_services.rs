//! Layered Services Example
//!
//! Builds a small application out of layers: configuration feeds a
//! connection pool, the pool feeds a repository, and a request handler
//! declares the services it needs with `requires`.
//!
//! Run with: cargo run --example layered_services

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use wellspring::prelude::*;

// ==================== Services ====================

#[derive(Debug, Clone)]
struct Config {
    database_url: String,
    pool_size: usize,
}

#[derive(Debug)]
struct Pool {
    url: String,
    open: AtomicUsize,
}

#[derive(Debug)]
struct UserRepo {
    pool: Arc<Pool>,
}

impl UserRepo {
    fn find(&self, id: u32) -> Result<String, AppError> {
        self.pool.open.fetch_add(1, Ordering::SeqCst);
        match id {
            1 => Ok("ada".to_string()),
            2 => Ok("grace".to_string()),
            _ => Err(AppError::NotFound(id)),
        }
    }
}

#[derive(Debug)]
enum AppError {
    NotFound(u32),
    Config(String),
}

impl From<String> for AppError {
    fn from(message: String) -> Self {
        AppError::Config(message)
    }
}

const CONFIG: Tag<Config> = Tag::new("config");
const POOL: Tag<Arc<Pool>> = Tag::new("pool");
const REPO: Tag<Arc<UserRepo>> = Tag::new("user_repo");

// ==================== Layers ====================

fn pool_layer() -> Layer<Tag<Config>, Tag<Arc<Pool>>, AppError> {
    Layer::from_managed(
        ManagedResource::new(
            |config: Config| {
                println!("  opening pool of {} to {}", config.pool_size, config.database_url);
                Ok(Arc::new(Pool {
                    url: config.database_url,
                    open: AtomicUsize::new(0),
                }))
            },
            |pool: Arc<Pool>| {
                println!(
                    "  closing pool to {} after {} queries",
                    pool.url,
                    pool.open.load(Ordering::SeqCst)
                );
            },
        ),
        CONFIG,
        POOL,
    )
}

fn repo_layer() -> Layer<Tag<Arc<Pool>>, Tag<Arc<UserRepo>>, AppError> {
    Layer::lift_service(POOL, REPO, |pool| Ok(Arc::new(UserRepo { pool })))
}

// ==================== Handlers ====================

fn greet(id: u32) -> Computation<String, AppError, Arc<UserRepo>> {
    Computation::new(move |repo: Arc<UserRepo>| repo.find(id))
        .map(|name| format!("hello, {}", name))
}

fn greet_pair(a: u32, b: u32) -> Computation<String, AppError, Arc<UserRepo>> {
    greet(a).zip(greet(b)).map(|(x, y)| format!("{} / {}", x, y))
}

fn main() {
    println!("Layered Services Example");
    println!("========================\n");

    let env = Environment::empty().with(CONFIG.tagged(Config {
        database_url: "postgres://localhost/app".to_string(),
        pool_size: 4,
    }));

    println!("Example 1: single request");
    let repo = repo_layer();
    let task = pool_layer().provide(&env, move |env| {
        repo.provide(&env, |env| env.bind(greet(1).requires(REPO)))
    });
    println!("  result: {:?}\n", task.run());

    println!("Example 2: two lookups in one request");
    let repo = repo_layer();
    let task = pool_layer().provide(&env, move |env| {
        repo.provide(&env, |env| env.bind(greet_pair(1, 2).requires(REPO)))
    });
    println!("  result: {:?}\n", task.run());

    println!("Example 3: a failing lookup still closes the pool");
    let repo = repo_layer();
    let task = pool_layer().provide(&env, move |env| {
        repo.provide(&env, |env| env.bind(greet(9).requires(REPO)))
    });
    println!("  result: {:?}\n", task.run());

    println!("Example 4: recovering with a default");
    let repo = repo_layer();
    let task = pool_layer().provide(&env, move |env| {
        repo.provide(&env, |env| {
            env.bind(greet(9).requires(REPO))
                .or_else_do(|err| format!("no such user ({:?})", err))
                .map(Either::into_inner)
                .to_task()
        })
    });
    println!("  result: {:?}\n", task.run());

    println!("Example 5: widening errors while zipping");
    let parsed: Task<(usize, &str), AppError> = (
        Task::<_, String>::from_result("4".parse::<usize>().map_err(|e| e.to_string())),
        Task::<_, AppError>::pure("replica"),
    )
        .zip_all_widened();
    println!("  result: {:?}", parsed.run());
}
