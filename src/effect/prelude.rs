//! Prelude module for convenient imports.
//!
//! Brings every effect shape and the traits carrying the tuple and binding
//! combinators into scope:
//!
//! ```rust
//! use wellspring::effect::prelude::*;
//!
//! let zipped = (IO::pure(1), IO::pure(2)).zip_all();
//! assert_eq!(zipped.run(), (1, 2));
//! ```

pub use crate::effect::bind::BindInput;
pub use crate::effect::computation::Computation;
pub use crate::effect::io::IO;
pub use crate::effect::safe_computation::SafeComputation;
pub use crate::effect::task::Task;
pub use crate::effect::zip::{ZipAll, ZipAllWidened};

#[cfg(feature = "async")]
pub use crate::effect::{
    AsyncComputation, AsyncIO, AsyncSafeComputation, AsyncTask, BoxFuture,
};

pub use crate::either::Either;
