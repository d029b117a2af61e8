//! The service environment and input binding.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::effect::bind::BindInput;
use crate::registry::error::{fault, RegistryError};
use crate::registry::tag::{InputTags, Service, ServiceEntry, Tag, TaggedServices};

/// An immutable registry of tagged services.
///
/// Environments are snapshots: [`with`](Environment::with) returns a new
/// environment and leaves the receiver untouched, so one environment can be
/// shared between threads and extended independently. Cloning is cheap.
///
/// # Examples
///
/// ```
/// use wellspring::{Environment, Tag};
///
/// const REGION: Tag<String> = Tag::new("region");
///
/// let base = Environment::empty();
/// let configured = base.with(REGION.tagged("eu-west-1".to_string()));
///
/// assert_eq!(configured.get(&REGION).as_deref(), Some("eu-west-1"));
/// assert!(base.get(&REGION).is_none());
/// ```
#[derive(Clone, Default)]
pub struct Environment {
    services: Arc<HashMap<&'static str, ServiceEntry>>,
}

impl Environment {
    /// An environment with no services.
    pub fn empty() -> Self {
        Environment::default()
    }

    /// A new environment holding this one's services plus `services`.
    ///
    /// Entries in `services` replace existing entries with the same name.
    pub fn with(&self, services: impl Into<TaggedServices>) -> Environment {
        let added = services.into();
        let mut map = HashMap::clone(&self.services);
        #[cfg(feature = "tracing")]
        tracing::debug!(services = ?added.names(), "extending environment");
        for entry in added.into_entries() {
            map.insert(entry.name(), entry);
        }
        Environment {
            services: Arc::new(map),
        }
    }

    /// Look up a service.
    ///
    /// Returns `None` when the tag is absent or names a service of another
    /// type; use [`try_get`](Environment::try_get) to tell the two apart.
    pub fn get<S: Service>(&self, tag: &Tag<S>) -> Option<S> {
        self.try_get(tag).ok()
    }

    /// Look up a service, reporting why it could not be found.
    pub fn try_get<S: Service>(&self, tag: &Tag<S>) -> Result<S, RegistryError> {
        self.services
            .get(tag.name())
            .ok_or(RegistryError::MissingService { tag: tag.name() })?
            .downcast::<S>()
    }

    /// Look up a service that must be present.
    ///
    /// # Panics
    ///
    /// Panics if the tag is absent or names a service of another type.
    pub fn expect<S: Service>(&self, tag: &Tag<S>) -> S {
        match self.try_get(tag) {
            Ok(service) => service,
            Err(err) => fault(err),
        }
    }

    /// Whether a service is registered under the tag's name.
    pub fn contains<S>(&self, tag: &Tag<S>) -> bool {
        self.services.contains_key(tag.name())
    }

    /// Number of registered services.
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Whether no services are registered.
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Registered tag names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.services.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Assemble the input `tags` declares.
    pub fn resolve<Tags: InputTags>(&self, tags: &Tags) -> Result<Tags::Input, RegistryError> {
        tags.resolve(self)
    }

    /// Resolve an effect's declared services and bind them as its input.
    ///
    /// Resolution happens here, not when the bound effect runs.
    pub fn try_bind<Eff, Tags>(
        &self,
        requires: Requires<Eff, Tags>,
    ) -> Result<Eff::Bound, RegistryError>
    where
        Eff: BindInput,
        Tags: InputTags<Input = Eff::Input>,
    {
        let Requires { effect, tags } = requires;
        let input = tags.resolve(self)?;
        #[cfg(feature = "tracing")]
        tracing::debug!(tags = ?tags.input_names(), "bound effect input");
        Ok(effect.bind_input(input))
    }

    /// Resolve an effect's declared services and bind them as its input.
    ///
    /// # Panics
    ///
    /// Panics if a declared service is absent or has another type.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use wellspring::prelude::*;
    ///
    /// #[derive(Debug)]
    /// struct Clock {
    ///     now: u64,
    /// }
    ///
    /// const CLOCK: Tag<Arc<Clock>> = Tag::new("clock");
    /// const OFFSET: Tag<u64> = Tag::new("offset");
    ///
    /// let env = Environment::empty()
    ///     .with((CLOCK.tagged(Arc::new(Clock { now: 100 })), OFFSET.tagged(5)));
    ///
    /// let deadline = Computation::<_, String, _>::new(|(clock, offset): (Arc<Clock>, u64)| {
    ///     Ok(clock.now + offset)
    /// });
    ///
    /// let task = env.bind(deadline.requires((CLOCK, OFFSET)));
    /// assert_eq!(task.run(), Ok(105));
    /// ```
    pub fn bind<Eff, Tags>(&self, requires: Requires<Eff, Tags>) -> Eff::Bound
    where
        Eff: BindInput,
        Tags: InputTags<Input = Eff::Input>,
    {
        match self.try_bind(requires) {
            Ok(bound) => bound,
            Err(err) => fault(err),
        }
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("services", &self.names())
            .finish()
    }
}

/// An input-taking effect together with the tags that supply its input.
///
/// Built with [`BindInput::requires`] and consumed by
/// [`Environment::bind`].
#[derive(Debug)]
pub struct Requires<Eff, Tags> {
    effect: Eff,
    tags: Tags,
}

impl<Eff, Tags> Requires<Eff, Tags> {
    /// Pair an effect with its input declaration.
    pub fn new(effect: Eff, tags: Tags) -> Self {
        Requires { effect, tags }
    }

    /// The declared tags.
    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    /// Split into the effect and its tags.
    pub fn into_parts(self) -> (Eff, Tags) {
        (self.effect, self.tags)
    }
}
