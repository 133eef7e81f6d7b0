//! Named factories for pluggable components.

use super::process::ProcessEngine;
use super::EngineBox;
use crate::loader::{ComponentError, ExpressionEvaluator, ResolverContext};
use crate::project::ComponentSpec;
use std::collections::BTreeMap;

/// Builds a component from its declared fields and the prepared context.
pub type EngineFactory = Box<
    dyn Fn(
            &toml::Table,
            &ResolverContext,
            &dyn ExpressionEvaluator,
        ) -> Result<EngineBox, ComponentError>
        + Send
        + Sync,
>;

/// Registry of component kinds.
#[derive(Default)]
pub struct ComponentRegistry {
    factories: BTreeMap<String, EngineFactory>,
}

impl ComponentRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in variants.
    ///
    /// - `process`: [`ProcessEngine`]
    #[must_use]
    pub fn builtin() -> Self {
        Self::new().with(ProcessEngine::KIND, |fields, context, evaluator| {
            let engine = ProcessEngine::configure(fields, context, evaluator)?;
            Ok(Box::new(engine) as EngineBox)
        })
    }

    /// Registers `factory` under `kind`, replacing any previous entry.
    pub fn register<F>(&mut self, kind: impl Into<String>, factory: F)
    where
        F: Fn(
                &toml::Table,
                &ResolverContext,
                &dyn ExpressionEvaluator,
            ) -> Result<EngineBox, ComponentError>
            + Send
            + Sync
            + 'static,
    {
        self.factories.insert(kind.into(), Box::new(factory));
    }

    /// Builder-style [`register`](Self::register).
    #[must_use]
    pub fn with<F>(mut self, kind: impl Into<String>, factory: F) -> Self
    where
        F: Fn(
                &toml::Table,
                &ResolverContext,
                &dyn ExpressionEvaluator,
            ) -> Result<EngineBox, ComponentError>
            + Send
            + Sync
            + 'static,
    {
        self.register(kind, factory);
        self
    }

    /// Returns the registered kinds in sorted order.
    #[must_use]
    pub fn kinds(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }

    /// Instantiates the component described by `spec`.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::UnknownKind`] if nothing is registered under
    /// `spec.kind`, or whatever the factory reports.
    pub fn instantiate(
        &self,
        spec: &ComponentSpec,
        context: &ResolverContext,
        evaluator: &dyn ExpressionEvaluator,
    ) -> Result<EngineBox, ComponentError> {
        let factory = self
            .factories
            .get(&spec.kind)
            .ok_or_else(|| ComponentError::UnknownKind {
                kind: spec.kind.clone(),
                available: self.kinds(),
            })?;
        factory(&spec.fields, context, evaluator)
    }
}
