//! The effect shapes and their composition.
//!
//! An effect is a value describing a deferred computation. Building one
//! never runs it; `run` does, exactly once. Four synchronous shapes cover
//! the combinations of "takes an input" and "can fail":
//!
//! | | no input | input `I` |
//! |---|---|---|
//! | **infallible** | [`IO<T>`] | [`SafeComputation<T, I>`] |
//! | **fallible** | [`Task<T, E>`] | [`Computation<T, E, I>`] |
//!
//! With the `async` feature each has an async counterpart (`AsyncIO`,
//! `AsyncTask`, `AsyncSafeComputation`, `AsyncComputation`) whose `run`
//! returns a future.
//!
//! # Moving between shapes
//!
//! Shapes only widen: an infallible effect can be viewed as a fallible one
//! (`to_task`, `to_computation`), a no-input effect as an input-taking one
//! that ignores its input, and a sync effect as an async one (`to_async`,
//! or `From`). Binding an input goes the other way and is the only
//! narrowing step (see [`BindInput`]).
//!
//! Sequencing an effect into another shape produces the wider of the two:
//!
//! ```
//! use wellspring::{Computation, SafeComputation, Task, IO};
//!
//! let task: Task<i32, String> = IO::pure(()).then_do_task(Task::pure(1));
//! let computation: Computation<i32, String, u8> =
//!     SafeComputation::new(|_: u8| ()).then_do_task(task);
//! assert_eq!(computation.run(0), Ok(1));
//! ```
//!
//! # Errors of different types
//!
//! The `*_widened` combinators combine effects whose error types differ by
//! converting both into a common type through `Into`:
//!
//! ```
//! use wellspring::Task;
//!
//! #[derive(Debug, PartialEq)]
//! enum AppError {
//!     Config(String),
//!     Network(u16),
//! }
//!
//! impl From<String> for AppError {
//!     fn from(e: String) -> Self {
//!         AppError::Config(e)
//!     }
//! }
//!
//! impl From<u16> for AppError {
//!     fn from(status: u16) -> Self {
//!         AppError::Network(status)
//!     }
//! }
//!
//! let load = Task::<&str, String>::pure("https://example.com");
//! let fetch = Task::<Vec<u8>, u16>::fail(503);
//! let both: Task<(&str, Vec<u8>), AppError> = load.zip_widened(fetch);
//!
//! assert_eq!(both.run(), Err(AppError::Network(503)));
//! ```
//!
//! # Stack depth
//!
//! Synchronous effects run on the caller's stack and each `flat_map` link
//! adds a frame. For loops of unbounded length use `tail_rec`.

pub mod bind;
pub mod computation;
pub mod io;
pub mod prelude;
pub mod safe_computation;
pub mod task;
pub mod zip;

#[cfg(feature = "async")]
pub mod async_computation;
#[cfg(feature = "async")]
pub mod async_io;
#[cfg(feature = "async")]
pub mod async_safe_computation;
#[cfg(feature = "async")]
pub mod async_task;

#[cfg(feature = "async")]
use std::future::Future;
#[cfg(feature = "async")]
use std::pin::Pin;

/// A boxed future that is Send
#[cfg(feature = "async")]
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub use bind::BindInput;
pub use computation::Computation;
pub use io::IO;
pub use safe_computation::SafeComputation;
pub use task::Task;
pub use zip::{ZipAll, ZipAllWidened};

#[cfg(feature = "async")]
pub use async_computation::AsyncComputation;
#[cfg(feature = "async")]
pub use async_io::AsyncIO;
#[cfg(feature = "async")]
pub use async_safe_computation::AsyncSafeComputation;
#[cfg(feature = "async")]
pub use async_task::AsyncTask;
