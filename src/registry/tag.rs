//! Service tags and tagged service collections.

use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;

use crate::registry::environment::Environment;
use crate::registry::error::RegistryError;

/// A value that can be registered as a service.
///
/// Services are shared between the environment and every effect bound
/// from it, so they are cloned out on lookup. Wrap expensive or stateful
/// services in an `Arc` to share one instance.
pub trait Service: Clone + Send + Sync + 'static {}

impl<S> Service for S where S: Clone + Send + Sync + 'static {}

/// A symbolic name for a service of type `S`.
///
/// Tags are compared and hashed by name only; the type parameter makes
/// lookups through the tag return an `S`. Declare them as constants:
///
/// ```
/// use wellspring::Tag;
///
/// const DATABASE_URL: Tag<String> = Tag::new("database_url");
/// assert_eq!(DATABASE_URL.name(), "database_url");
/// ```
pub struct Tag<S> {
    name: &'static str,
    _service: PhantomData<fn() -> S>,
}

impl<S> Tag<S> {
    /// Create a tag named `name`.
    pub const fn new(name: &'static str) -> Self {
        Tag {
            name,
            _service: PhantomData,
        }
    }

    /// The tag's name.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Pair `service` with this tag.
    pub fn tagged(self, service: S) -> Tagged<S> {
        Tagged { tag: self, service }
    }
}

impl<S> Clone for Tag<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for Tag<S> {}

impl<S> PartialEq for Tag<S> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl<S> Eq for Tag<S> {}

impl<S> Hash for Tag<S> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl<S> fmt::Debug for Tag<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({}: {})", self.name, type_name::<S>())
    }
}

/// A service instance paired with the tag that names it.
#[derive(Clone, Debug)]
pub struct Tagged<S> {
    tag: Tag<S>,
    service: S,
}

impl<S> Tagged<S> {
    /// The tag.
    pub fn tag(&self) -> Tag<S> {
        self.tag
    }

    /// The service.
    pub fn service(&self) -> &S {
        &self.service
    }

    /// Take the service out.
    pub fn into_service(self) -> S {
        self.service
    }
}

/// A type-erased service with the name and type it was registered under.
#[derive(Clone)]
pub struct ServiceEntry {
    name: &'static str,
    type_id: TypeId,
    type_name: &'static str,
    value: Arc<dyn Any + Send + Sync>,
}

impl ServiceEntry {
    fn new<S: Service>(tagged: Tagged<S>) -> Self {
        ServiceEntry {
            name: tagged.tag.name(),
            type_id: TypeId::of::<S>(),
            type_name: type_name::<S>(),
            value: Arc::new(tagged.service),
        }
    }

    /// The tag name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The service's type name.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Whether the entry holds an `S`.
    pub fn is<S: Service>(&self) -> bool {
        self.type_id == TypeId::of::<S>()
    }

    pub(crate) fn downcast<S: Service>(&self) -> Result<S, RegistryError> {
        self.value
            .downcast_ref::<S>()
            .cloned()
            .ok_or(RegistryError::TypeMismatch {
                tag: self.name,
                expected: type_name::<S>(),
                found: self.type_name,
            })
    }
}

impl fmt::Debug for ServiceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceEntry")
            .field("name", &self.name)
            .field("type", &self.type_name)
            .finish()
    }
}

/// An ordered collection of tagged services of mixed types.
///
/// Built from one [`Tagged`] or a tuple of them. When two entries share a
/// name, the later one replaces the earlier one in place.
///
/// ```
/// use wellspring::{Tag, TaggedServices};
///
/// const HOST: Tag<String> = Tag::new("host");
/// const PORT: Tag<u16> = Tag::new("port");
///
/// let services: TaggedServices = (HOST.tagged("localhost".into()), PORT.tagged(8080)).into();
/// assert_eq!(services.names(), vec!["host", "port"]);
/// assert_eq!(services.get(&PORT), Some(8080));
/// ```
#[derive(Clone, Debug, Default)]
pub struct TaggedServices {
    entries: Vec<ServiceEntry>,
}

impl TaggedServices {
    /// An empty collection.
    pub fn new() -> Self {
        TaggedServices::default()
    }

    /// Add a service, replacing any entry with the same name.
    pub fn insert<S: Service>(&mut self, tagged: Tagged<S>) {
        let entry = ServiceEntry::new(tagged);
        match self.entries.iter_mut().find(|e| e.name == entry.name) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    /// Add a service, failing if the name is already present.
    pub fn try_push<S: Service>(&mut self, tagged: Tagged<S>) -> Result<(), RegistryError> {
        let name = tagged.tag.name();
        if self.entries.iter().any(|e| e.name == name) {
            return Err(RegistryError::DuplicateTag { tag: name });
        }
        self.entries.push(ServiceEntry::new(tagged));
        Ok(())
    }

    /// Look up a service by tag.
    ///
    /// Returns `None` when the name is absent or holds another type.
    pub fn get<S: Service>(&self, tag: &Tag<S>) -> Option<S> {
        self.entries
            .iter()
            .find(|e| e.name == tag.name())
            .and_then(|e| e.downcast::<S>().ok())
    }

    /// Tag names in insertion order.
    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|e| e.name).collect()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the entries in order.
    pub fn iter(&self) -> impl Iterator<Item = &ServiceEntry> {
        self.entries.iter()
    }

    pub(crate) fn into_entries(self) -> Vec<ServiceEntry> {
        self.entries
    }
}

impl<S: Service> From<Tagged<S>> for TaggedServices {
    fn from(tagged: Tagged<S>) -> Self {
        let mut services = TaggedServices::new();
        services.insert(tagged);
        services
    }
}

/// A declaration of the services an effect needs as its input.
///
/// Implemented for `()` (no services), a single [`Tag`], and tuples of
/// tags. The resolved input is the service itself for a single tag and a
/// tuple of services, in declaration order, for a tuple.
pub trait InputTags: Clone + Send + Sync + 'static {
    /// The assembled input.
    type Input: Send + 'static;

    /// Declared tag names in order.
    fn input_names(&self) -> Vec<&'static str>;

    /// Look up every declared service in `env`.
    fn resolve(&self, env: &Environment) -> Result<Self::Input, RegistryError>;
}

impl InputTags for () {
    type Input = ();

    fn input_names(&self) -> Vec<&'static str> {
        Vec::new()
    }

    fn resolve(&self, _env: &Environment) -> Result<(), RegistryError> {
        Ok(())
    }
}

impl<S: Service> InputTags for Tag<S> {
    type Input = S;

    fn input_names(&self) -> Vec<&'static str> {
        vec![self.name]
    }

    fn resolve(&self, env: &Environment) -> Result<S, RegistryError> {
        env.try_get(self)
    }
}

/// A declaration of the services a layer produces.
///
/// Implemented for a single [`Tag`], tuples of tags, and `Vec<Tag<S>>`.
/// Tuple declarations fix the number of services at compile time; a
/// `Vec` declaration is checked against the produced `Vec` when tagging.
pub trait ServiceTags: Clone + Send + Sync + 'static {
    /// The raw services the declaration tags.
    type Services: Clone + Send + 'static;

    /// Declared tag names in order.
    fn service_names(&self) -> Vec<&'static str>;

    /// Pair each service with its declared tag, in declaration order.
    fn tag(&self, services: Self::Services) -> Result<TaggedServices, RegistryError>;
}

impl<S: Service> ServiceTags for Tag<S> {
    type Services = S;

    fn service_names(&self) -> Vec<&'static str> {
        vec![self.name]
    }

    fn tag(&self, service: S) -> Result<TaggedServices, RegistryError> {
        Ok(self.tagged(service).into())
    }
}

impl<S: Service> ServiceTags for Vec<Tag<S>> {
    type Services = Vec<S>;

    fn service_names(&self) -> Vec<&'static str> {
        self.iter().map(Tag::name).collect()
    }

    fn tag(&self, services: Vec<S>) -> Result<TaggedServices, RegistryError> {
        if services.len() != self.len() {
            return Err(RegistryError::ServiceCountMismatch {
                declared: self.len(),
                produced: services.len(),
            });
        }
        let mut tagged = TaggedServices::new();
        for (tag, service) in self.iter().zip(services) {
            tagged.try_push(tag.tagged(service))?;
        }
        Ok(tagged)
    }
}

macro_rules! impl_tag_tuples {
    ($($S:ident $t:ident $s:ident),+) => {
        impl<$($S: Service),+> From<($(Tagged<$S>,)+)> for TaggedServices {
            fn from(($($t,)+): ($(Tagged<$S>,)+)) -> Self {
                let mut services = TaggedServices::new();
                $(services.insert($t);)+
                services
            }
        }

        impl<$($S: Service),+> InputTags for ($(Tag<$S>,)+) {
            type Input = ($($S,)+);

            fn input_names(&self) -> Vec<&'static str> {
                let ($($t,)+) = self;
                vec![$($t.name()),+]
            }

            fn resolve(&self, env: &Environment) -> Result<Self::Input, RegistryError> {
                let ($($t,)+) = self;
                Ok(($(env.try_get($t)?,)+))
            }
        }

        impl<$($S: Service),+> ServiceTags for ($(Tag<$S>,)+) {
            type Services = ($($S,)+);

            fn service_names(&self) -> Vec<&'static str> {
                let ($($t,)+) = self;
                vec![$($t.name()),+]
            }

            fn tag(&self, services: Self::Services) -> Result<TaggedServices, RegistryError> {
                let ($($s,)+) = services;
                let ($($t,)+) = self;
                let mut tagged = TaggedServices::new();
                $(tagged.try_push($t.tagged($s))?;)+
                Ok(tagged)
            }
        }
    };
}

impl_tag_tuples!(A a aa);
impl_tag_tuples!(A a aa, B b bb);
impl_tag_tuples!(A a aa, B b bb, C c cc);
impl_tag_tuples!(A a aa, B b bb, C c cc, D d dd);
impl_tag_tuples!(A a aa, B b bb, C c cc, D d dd, F f ff);
impl_tag_tuples!(A a aa, B b bb, C c cc, D d dd, F f ff, G g gg);
impl_tag_tuples!(A a aa, B b bb, C c cc, D d dd, F f ff, G g gg, H h hh);
