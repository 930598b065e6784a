//! The builder factory: extraction, transformation and materialization
//! behind one reusable configuration.

use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, LazyLock};
use tracing::warn;

use super::instance::InstanceBuilder;
use super::options::BuilderOptions;
use crate::contract::{
    global_registry, Contract, ContractPlan, ContractRegistry, ContractSchema, DynamicObject,
};
use crate::errors::Result;
use crate::pipeline::apply_transform;
use crate::sources::{self, ExtractContext, Source};

/// Builds contract instances from sources.
///
/// A factory owns its [`BuilderOptions`] and shares a [`ContractRegistry`]
/// (the global one unless another is injected). It is cheap to clone and
/// safe to share between threads.
///
/// ```rust,ignore
/// let factory = BuilderFactory::new().with_options(BuilderOptions::strict());
/// let person: Person = factory.create(&map)?;
/// let people: Vec<Person> = factory.create_sequence(vec![&first, &second])?;
/// ```
#[derive(Debug, Clone)]
pub struct BuilderFactory {
    options: Arc<BuilderOptions>,
    registry: Arc<ContractRegistry>,
}

impl Default for BuilderFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl BuilderFactory {
    /// Creates a factory with empty options over the global registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            options: Arc::new(BuilderOptions::default()),
            registry: global_registry(),
        }
    }

    /// Replaces the options.
    #[must_use]
    pub fn with_options(mut self, options: BuilderOptions) -> Self {
        self.options = Arc::new(options);
        self
    }

    /// Uses `registry` instead of the global one.
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<ContractRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// The factory's options.
    #[must_use]
    pub fn options(&self) -> &BuilderOptions {
        &self.options
    }

    /// The registry plans are cached in.
    #[must_use]
    pub fn registry(&self) -> &Arc<ContractRegistry> {
        &self.registry
    }

    /// An instance builder over this factory's registry.
    #[must_use]
    pub fn instance_builder(&self) -> InstanceBuilder {
        InstanceBuilder::new(Arc::clone(&self.registry))
    }

    /// Builds one `T` from `source`.
    pub fn create<'a, T: Contract>(&self, source: impl Into<Source<'a>>) -> Result<T> {
        let plan = self.registry.get_or_create::<T>()?;
        self.produce(&plan, &source.into(), None)
    }

    /// Builds one `T` from a tuple source whose elements are named by
    /// `element_names`. The names are ignored for other sources.
    pub fn create_with_element_names<'a, T: Contract>(
        &self,
        source: impl Into<Source<'a>>,
        element_names: &[String],
    ) -> Result<T> {
        let plan = self.registry.get_or_create::<T>()?;
        self.produce(&plan, &source.into(), Some(element_names))
    }

    /// Builds one `T` per source, in order. Stops at the first failure and
    /// returns that element's error.
    pub fn create_sequence<'a, T: Contract>(
        &self,
        sources: impl IntoIterator<Item = impl Into<Source<'a>>>,
    ) -> Result<Vec<T>> {
        let plan = self.registry.get_or_create::<T>()?;
        self.produce_all(&plan, sources, None)
    }

    /// [`create_sequence`](Self::create_sequence) with tuple element names.
    pub fn create_sequence_with_element_names<'a, T: Contract>(
        &self,
        sources: impl IntoIterator<Item = impl Into<Source<'a>>>,
        element_names: &[String],
    ) -> Result<Vec<T>> {
        let plan = self.registry.get_or_create::<T>()?;
        self.produce_all(&plan, sources, Some(element_names))
    }

    /// Builds one `T` per source and reports each outcome separately.
    pub fn create_each<'a, T: Contract>(
        &self,
        sources: impl IntoIterator<Item = impl Into<Source<'a>>>,
    ) -> Vec<Result<T>> {
        match self.registry.get_or_create::<T>() {
            Ok(plan) => sources
                .into_iter()
                .map(|source| self.produce(&plan, &source.into(), None))
                .collect(),
            Err(err) => sources.into_iter().map(|_| Err(err.clone())).collect(),
        }
    }

    /// Builds a [`DynamicObject`] for a runtime schema.
    pub fn create_dynamic<'a>(
        &self,
        schema: &ContractSchema,
        source: impl Into<Source<'a>>,
    ) -> Result<DynamicObject> {
        let plan = self.registry.get_or_create_schema(schema)?;
        self.produce(&plan, &source.into(), None)
    }

    /// Builds one [`DynamicObject`] per source, stopping at the first failure.
    pub fn create_dynamic_sequence<'a>(
        &self,
        schema: &ContractSchema,
        sources: impl IntoIterator<Item = impl Into<Source<'a>>>,
    ) -> Result<Vec<DynamicObject>> {
        let plan = self.registry.get_or_create_schema(schema)?;
        self.produce_all(&plan, sources, None)
    }

    fn produce<T>(
        &self,
        plan: &ContractPlan<T>,
        source: &Source<'_>,
        element_names: Option<&[String]>,
    ) -> Result<T> {
        let policy = self.options.policy();
        let ctx = ExtractContext {
            contract: plan.name(),
            fields: plan.fields(),
            source_names: &self.options.source_names,
            element_names,
            policy,
        };
        let map = sources::extract(source, &ctx)?;
        let map = apply_transform(map, self.options.transform.as_ref());
        InstanceBuilder::materialize_with(plan, map, policy)
    }

    fn produce_all<'a, T>(
        &self,
        plan: &ContractPlan<T>,
        sources: impl IntoIterator<Item = impl Into<Source<'a>>>,
        element_names: Option<&[String]>,
    ) -> Result<Vec<T>> {
        sources
            .into_iter()
            .enumerate()
            .map(|(index, source)| {
                self.produce(plan, &source.into(), element_names)
                    .inspect_err(|err| {
                        warn!(
                            contract = plan.name(),
                            index,
                            code = err.code(),
                            error = %err,
                            "Sequence aborted"
                        );
                    })
            })
            .collect()
    }
}

static DEFAULT_FACTORY: LazyLock<BuilderFactory> = LazyLock::new(BuilderFactory::new);

/// Process-wide factory with empty options over the global registry.
#[must_use]
pub fn default_factory() -> &'static BuilderFactory {
    &DEFAULT_FACTORY
}

/// A [`BuilderFactory`] bound to one contract type.
pub struct TypedFactory<T> {
    factory: BuilderFactory,
    _contract: PhantomData<fn() -> T>,
}

impl<T: Contract> TypedFactory<T> {
    /// Binds `factory` to `T`.
    #[must_use]
    pub fn new(factory: BuilderFactory) -> Self {
        Self {
            factory,
            _contract: PhantomData,
        }
    }

    /// Binds a factory with `options` over the global registry to `T`.
    #[must_use]
    pub fn with_options(options: BuilderOptions) -> Self {
        Self::new(BuilderFactory::new().with_options(options))
    }

    /// The underlying factory.
    #[must_use]
    pub fn factory(&self) -> &BuilderFactory {
        &self.factory
    }

    /// Builds the materialization strategy ahead of the first call.
    pub fn prepare(&self) -> Result<()> {
        self.factory.registry.get_or_create::<T>().map(|_| ())
    }

    /// Builds one `T`.
    pub fn create<'a>(&self, source: impl Into<Source<'a>>) -> Result<T> {
        self.factory.create(source)
    }

    /// Builds one `T` from a named tuple.
    pub fn create_with_element_names<'a>(
        &self,
        source: impl Into<Source<'a>>,
        element_names: &[String],
    ) -> Result<T> {
        self.factory.create_with_element_names(source, element_names)
    }

    /// Builds one `T` per source, stopping at the first failure.
    pub fn create_sequence<'a>(
        &self,
        sources: impl IntoIterator<Item = impl Into<Source<'a>>>,
    ) -> Result<Vec<T>> {
        self.factory.create_sequence(sources)
    }

    /// Builds one `T` per named tuple, stopping at the first failure.
    pub fn create_sequence_with_element_names<'a>(
        &self,
        sources: impl IntoIterator<Item = impl Into<Source<'a>>>,
        element_names: &[String],
    ) -> Result<Vec<T>> {
        self.factory
            .create_sequence_with_element_names(sources, element_names)
    }

    /// Builds one `T` per source with per-element outcomes.
    pub fn create_each<'a>(
        &self,
        sources: impl IntoIterator<Item = impl Into<Source<'a>>>,
    ) -> Vec<Result<T>> {
        self.factory.create_each(sources)
    }
}

impl<T> Clone for TypedFactory<T> {
    fn clone(&self) -> Self {
        Self {
            factory: self.factory.clone(),
            _contract: PhantomData,
        }
    }
}

impl<T> fmt::Debug for TypedFactory<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedFactory")
            .field("contract", &std::any::type_name::<T>())
            .field("factory", &self.factory)
            .finish()
    }
}
