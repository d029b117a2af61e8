//! # Wellspring
//!
//! Composable effects with managed resources and a tagged service registry.
//!
//! Effects are lazy descriptions of work. They come in shapes that differ in
//! whether they can fail and whether they take an input:
//!
//! - [`IO`] and [`Task`] run without input, infallibly or fallibly.
//! - [`SafeComputation`] and [`Computation`] take an input value.
//! - Each shape has an async counterpart (`AsyncIO`, `AsyncTask`, ...) behind
//!   the `async` feature.
//!
//! Composing two shapes yields the smallest shape that can express both, so
//! chaining an `IO` into a `Task` gives a `Task`, and chaining a `Task` into a
//! `SafeComputation` gives a `Computation`.
//!
//! Services live in an immutable [`Environment`] keyed by [`Tag`]s. Effects
//! that need services declare them with [`BindInput::requires`] and are bound
//! with [`Environment::bind`]. [`Layer`]s construct services from other
//! services through a [`ManagedResource`], so whatever they build is released
//! once the body that uses it finishes.
//!
//! ## Quick Example
//!
//! ```rust
//! use std::sync::Arc;
//! use wellspring::prelude::*;
//!
//! struct Logger {
//!     prefix: String,
//! }
//!
//! impl Logger {
//!     fn line(&self, message: &str) -> String {
//!         format!("[{}] {}", self.prefix, message)
//!     }
//! }
//!
//! const LOGGER: Tag<Arc<Logger>> = Tag::new("logger");
//!
//! let logger_layer = Layer::<_, _, String>::from_service(
//!     Arc::new(Logger { prefix: "app".to_string() }),
//!     LOGGER,
//! );
//!
//! let report = Computation::new(|logger: Arc<Logger>| Ok(logger.line("started")))
//!     .map(|line| line.len());
//!
//! let task = logger_layer.provide(&Environment::empty(), move |env| {
//!     env.bind(report.requires(LOGGER))
//! });
//!
//! assert_eq!(task.run(), Ok("[app] started".len()));
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod effect;
pub mod either;
pub mod registry;
pub mod resource;
pub mod result;
pub mod testing;

// Re-exports
pub use effect::{BindInput, Computation, SafeComputation, Task, ZipAll, ZipAllWidened, IO};
#[cfg(feature = "async")]
pub use effect::{AsyncComputation, AsyncIO, AsyncSafeComputation, AsyncTask, BoxFuture};
pub use either::Either;
pub use registry::{
    Environment, InputTags, Layer, LayerOutput, RegistryError, Requires, Service, ServiceTags,
    Tag, Tagged, TaggedServices,
};
pub use resource::ManagedResource;
pub use result::{AbsentValue, OptionExt, ResultExt, ZipResults, ZipResultsWidened};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::effect::prelude::*;
    pub use crate::registry::{
        Environment, InputTags, Layer, LayerOutput, RegistryError, Requires, Service,
        ServiceTags, Tag, Tagged, TaggedServices,
    };
    pub use crate::resource::ManagedResource;
    pub use crate::result::{AbsentValue, OptionExt, ResultExt, ZipResults, ZipResultsWidened};
}
