//! Fixing the input of an input-taking effect.

use crate::registry::{InputTags, Requires};

/// An effect shape that takes an input and can have it bound.
///
/// Binding turns each input shape into its no-input counterpart:
///
/// | Shape | Bound |
/// |-------|-------|
/// | `SafeComputation<T, I>` | `IO<T>` |
/// | `Computation<T, E, I>` | `Task<T, E>` |
/// | `AsyncSafeComputation<T, I>` | `AsyncIO<T>` |
/// | `AsyncComputation<T, E, I>` | `AsyncTask<T, E>` |
///
/// Running the bound effect is equivalent to running the original against
/// the bound input.
pub trait BindInput: Sized {
    /// The input the effect consumes.
    type Input;
    /// The effect produced once the input is fixed.
    type Bound;

    /// Fix the input.
    fn bind_input(self, input: Self::Input) -> Self::Bound;

    /// Declare the registry tags whose services make up the input.
    ///
    /// The result is handed to [`Environment::bind`](crate::Environment::bind)
    /// to resolve the services and bind them.
    ///
    /// # Examples
    ///
    /// ```
    /// use wellspring::prelude::*;
    ///
    /// const GREETING: Tag<String> = Tag::new("greeting");
    ///
    /// let env = Environment::empty().with(GREETING.tagged("hello".to_string()));
    /// let shout = SafeComputation::new(|g: String| g.to_uppercase()).requires(GREETING);
    ///
    /// assert_eq!(env.bind(shout).run(), "HELLO");
    /// ```
    fn requires<Tags>(self, tags: Tags) -> Requires<Self, Tags>
    where
        Tags: InputTags<Input = Self::Input>,
    {
        Requires::new(self, tags)
    }
}
