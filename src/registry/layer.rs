//! Layers: managed resources that turn input services into output services.

use std::collections::HashSet;
use std::fmt::{self, Debug};
use std::sync::Arc;

use crate::effect::computation::Computation;
use crate::effect::task::Task;
use crate::registry::environment::Environment;
use crate::registry::error::{fault, RegistryError};
use crate::registry::tag::{InputTags, Service, ServiceTags, Tag, TaggedServices};
use crate::resource::{log_release_failure, ManagedResource};

#[cfg(feature = "async")]
use crate::effect::async_task::AsyncTask;

/// What a layer's acquisition yields: the raw services and the same
/// services paired with their declared tags.
#[derive(Clone, Debug)]
pub struct LayerOutput<S> {
    services: S,
    tagged: TaggedServices,
}

impl<S> LayerOutput<S> {
    /// The raw services, in the shape the layer's service tags declare.
    pub fn services(&self) -> &S {
        &self.services
    }

    /// The services paired with their tags.
    pub fn tagged(&self) -> &TaggedServices {
        &self.tagged
    }

    /// Split into raw and tagged services.
    pub fn into_parts(self) -> (S, TaggedServices) {
        (self.services, self.tagged)
    }
}

impl<S> From<LayerOutput<S>> for TaggedServices {
    fn from(output: LayerOutput<S>) -> Self {
        output.tagged
    }
}

/// A managed resource whose acquisition consumes the services named by
/// `In` and produces the services named by `Out`.
///
/// Acquiring a layer pairs each produced service with its declared tag, in
/// declaration order; releasing it hands the raw services to the release
/// step. Every use is a full acquire/use/release lifecycle.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use wellspring::prelude::*;
///
/// #[derive(Debug)]
/// struct Pool {
///     url: String,
/// }
///
/// const DATABASE_URL: Tag<String> = Tag::new("database_url");
/// const POOL: Tag<Arc<Pool>> = Tag::new("pool");
///
/// let pool_layer = Layer::<_, _, String>::lift_service(DATABASE_URL, POOL, |url: String| {
///     Ok(Arc::new(Pool { url }))
/// });
///
/// let env = Environment::empty().with(DATABASE_URL.tagged("postgres://db".to_string()));
/// let task = pool_layer.provide(&env, |env| {
///     let pool = env.expect(&POOL);
///     Task::pure(pool.url.len())
/// });
///
/// assert_eq!(task.run(), Ok(13));
/// ```
pub struct Layer<In, Out, E>
where
    In: InputTags,
    Out: ServiceTags,
{
    resource: ManagedResource<LayerOutput<Out::Services>, E, In::Input>,
    input_tags: In,
    service_tags: Out,
}

impl<In, Out, E> Clone for Layer<In, Out, E>
where
    In: InputTags,
    Out: ServiceTags,
{
    fn clone(&self) -> Self {
        Layer {
            resource: self.resource.clone(),
            input_tags: self.input_tags.clone(),
            service_tags: self.service_tags.clone(),
        }
    }
}

impl<In, Out, E> Debug for Layer<In, Out, E>
where
    In: InputTags,
    Out: ServiceTags,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Layer")
            .field("input_tags", &self.input_tags.input_names())
            .field("service_tags", &self.service_tags.service_names())
            .field("resource", &"<managed>")
            .finish()
    }
}

impl<In, Out, E> Layer<In, Out, E>
where
    In: InputTags,
    Out: ServiceTags,
    E: Send + 'static,
{
    /// Attach tag metadata to a managed resource.
    ///
    /// # Panics
    ///
    /// Panics if `service_tags` names a tag twice. Acquiring the layer
    /// panics, after releasing what was acquired, if the produced services
    /// do not match `service_tags`.
    pub fn from_managed(
        resource: ManagedResource<Out::Services, E, In::Input>,
        input_tags: In,
        service_tags: Out,
    ) -> Self {
        if let Err(err) = distinct(&service_tags.service_names()) {
            fault(err);
        }
        let ManagedResource { acquire, release } = resource;
        let release_untagged = release.clone();
        let tags = service_tags.clone();
        let resource = ManagedResource {
            acquire: Arc::new(move |input| {
                let services = acquire(input)?;
                match tags.tag(services.clone()) {
                    Ok(tagged) => {
                        #[cfg(feature = "tracing")]
                        tracing::debug!(services = ?tagged.names(), "layer acquired");
                        Ok(LayerOutput { services, tagged })
                    }
                    Err(err) => {
                        if let Err(rel_err) = release_untagged(services) {
                            log_release_failure(&rel_err);
                        }
                        fault(err)
                    }
                }
            }),
            release: Arc::new(move |output: LayerOutput<Out::Services>| {
                #[cfg(feature = "tracing")]
                tracing::debug!(services = ?output.tagged.names(), "layer released");
                release(output.services)
            }),
        };
        Layer {
            resource,
            input_tags,
            service_tags,
        }
    }

    /// Build a layer whose services are constructed from its inputs and
    /// need no release.
    pub fn from_fn<F>(input_tags: In, service_tags: Out, construct: F) -> Self
    where
        F: Fn(In::Input) -> Result<Out::Services, E> + Send + Sync + 'static,
    {
        Layer::from_managed(
            ManagedResource::new(construct, |_| {}),
            input_tags,
            service_tags,
        )
    }

    /// The declared input tags.
    pub fn input_tags(&self) -> &In {
        &self.input_tags
    }

    /// The declared service tags.
    pub fn service_tags(&self) -> &Out {
        &self.service_tags
    }

    /// The underlying managed resource.
    pub fn resource(&self) -> &ManagedResource<LayerOutput<Out::Services>, E, In::Input> {
        &self.resource
    }

    /// Transform the produced services into another tagged shape.
    ///
    /// `release` replaces this layer's release step: resources acquired
    /// through the new layer are released only by `release`.
    pub fn map<Out2, F, Rel>(&self, f: F, service_tags: Out2, release: Rel) -> Layer<In, Out2, E>
    where
        Out2: ServiceTags,
        F: Fn(Out::Services) -> Out2::Services + Send + Sync + 'static,
        Rel: Fn(Out2::Services) -> Result<(), E> + Send + Sync + 'static,
        E: Debug,
    {
        let mapped = self
            .resource
            .map(move |output: LayerOutput<Out::Services>| f(output.services), release);
        Layer::from_managed(mapped, self.input_tags.clone(), service_tags)
    }

    /// Use the layer's output once its input is supplied.
    pub fn use_with<U, F>(&self, usage: F) -> Computation<U, E, In::Input>
    where
        F: FnOnce(&LayerOutput<Out::Services>) -> Result<U, E> + Send + 'static,
        U: Send + 'static,
    {
        self.resource.use_with(usage)
    }

    /// Run `body` in `env` extended with this layer's services.
    ///
    /// The layer's inputs are resolved from `env` now. When the returned
    /// task runs, the layer is acquired, `body` runs against the extended
    /// environment, and the layer is released.
    pub fn try_provide<U, F>(
        &self,
        env: &Environment,
        body: F,
    ) -> Result<Task<U, E>, RegistryError>
    where
        F: FnOnce(Environment) -> Task<U, E> + Send + 'static,
        U: Send + 'static,
    {
        let input = self.input_tags.resolve(env)?;
        let env = env.clone();
        let computation = self
            .resource
            .use_with(move |output| body(env.with(output.tagged().clone())).run());
        Ok(computation.bind_input(input))
    }

    /// Like [`try_provide`](Layer::try_provide).
    ///
    /// # Panics
    ///
    /// Panics if an input service is absent from `env` or has another type.
    pub fn provide<U, F>(&self, env: &Environment, body: F) -> Task<U, E>
    where
        F: FnOnce(Environment) -> Task<U, E> + Send + 'static,
        U: Send + 'static,
    {
        match self.try_provide(env, body) {
            Ok(task) => task,
            Err(err) => fault(err),
        }
    }

    /// Async counterpart of [`try_provide`](Layer::try_provide). The layer
    /// is released once the body's future completes.
    #[cfg(feature = "async")]
    pub fn try_provide_async<U, F>(
        &self,
        env: &Environment,
        body: F,
    ) -> Result<AsyncTask<U, E>, RegistryError>
    where
        F: FnOnce(Environment) -> AsyncTask<U, E> + Send + 'static,
        U: Send + 'static,
    {
        let input = self.input_tags.resolve(env)?;
        let env = env.clone();
        let computation = self
            .resource
            .use_async(move |output| body(env.with(output.tagged().clone())));
        Ok(computation.bind_input(input))
    }

    /// Async counterpart of [`provide`](Layer::provide).
    ///
    /// # Panics
    ///
    /// Panics if an input service is absent from `env` or has another type.
    #[cfg(feature = "async")]
    pub fn provide_async<U, F>(&self, env: &Environment, body: F) -> AsyncTask<U, E>
    where
        F: FnOnce(Environment) -> AsyncTask<U, E> + Send + 'static,
        U: Send + 'static,
    {
        match self.try_provide_async(env, body) {
            Ok(task) => task,
            Err(err) => fault(err),
        }
    }
}

impl<S, E> Layer<(), Tag<S>, E>
where
    S: Service,
    E: Send + 'static,
{
    /// Wrap an already-built service. The layer needs no input and never
    /// fails.
    pub fn from_service(service: S, tag: Tag<S>) -> Self {
        Layer::from_managed(
            ManagedResource::from_fn(move |()| service.clone(), |_| {}),
            (),
            tag,
        )
    }

    /// Construct the service on every acquisition.
    pub fn make<F>(tag: Tag<S>, construct: F) -> Self
    where
        F: Fn() -> Result<S, E> + Send + Sync + 'static,
    {
        Layer::from_fn((), tag, move |()| construct())
    }
}

impl<In, S, E> Layer<In, Tag<S>, E>
where
    In: InputTags,
    S: Service,
    E: Send + 'static,
{
    /// Construct a single service from the services `input_tags` names.
    pub fn lift_service<F>(input_tags: In, tag: Tag<S>, construct: F) -> Self
    where
        F: Fn(In::Input) -> Result<S, E> + Send + Sync + 'static,
    {
        Layer::from_fn(input_tags, tag, construct)
    }
}

fn distinct(names: &[&'static str]) -> Result<(), RegistryError> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(*name) {
            return Err(RegistryError::DuplicateTag { tag: *name });
        }
    }
    Ok(())
}
