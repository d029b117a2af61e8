//! A typed service registry.
//!
//! Services are registered in an [`Environment`] under [`Tag`]s. An
//! input-taking effect declares which tags supply its input with
//! [`requires`](crate::BindInput::requires); [`Environment::bind`] looks the
//! services up and binds them, turning the effect into its no-input
//! counterpart. [`Layer`]s build services from other services with a
//! managed lifecycle and extend an environment for the duration of a body.
//!
//! ```
//! use std::sync::Arc;
//! use wellspring::prelude::*;
//!
//! struct Greeter {
//!     greeting: String,
//! }
//!
//! const GREETING: Tag<String> = Tag::new("greeting");
//! const GREETER: Tag<Arc<Greeter>> = Tag::new("greeter");
//!
//! let greeter_layer = Layer::<_, _, String>::lift_service(GREETING, GREETER, |greeting| {
//!     Ok(Arc::new(Greeter { greeting }))
//! });
//!
//! let env = Environment::empty().with(GREETING.tagged("hello".to_string()));
//! let greet = Computation::new(|greeter: Arc<Greeter>| {
//!     Ok(format!("{}, world", greeter.greeting))
//! });
//!
//! let task = greeter_layer.provide(&env, move |env| env.bind(greet.requires(GREETER)));
//! assert_eq!(task.run(), Ok("hello, world".to_string()));
//! ```

pub mod environment;
pub mod error;
pub mod layer;
pub mod tag;

pub use environment::{Environment, Requires};
pub use error::RegistryError;
pub use layer::{Layer, LayerOutput};
pub use tag::{InputTags, Service, ServiceEntry, ServiceTags, Tag, Tagged, TaggedServices};
