//! Controller loaders.
//!
//! A loader resolves a matched location to a controller definition. The set
//! of loaders is registered statically at startup; a loader may still defer
//! its answer (e.g. pick a variant from the request).

use futures_util::future::BoxFuture;
use thiserror::Error;

use crate::context::Context;
use crate::controller::ControllerDef;
use crate::routing::Location;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("no controller available for `{0}`")]
    Unavailable(String),

    #[error("controller load failed: {0}")]
    Failed(String),
}

pub type LoadFuture<T> = BoxFuture<'static, Result<&'static ControllerDef<T>, LoadError>>;

/// Resolves a location to a controller definition.
pub enum Loader<T: 'static> {
    /// Always the same controller.
    Static(&'static ControllerDef<T>),
    /// Decided per request, possibly asynchronously.
    Deferred(fn(&Location, &Context) -> LoadFuture<T>),
}

impl<T: 'static> Loader<T> {
    pub async fn load(
        &self,
        location: &Location,
        context: &Context,
    ) -> Result<&'static ControllerDef<T>, LoadError> {
        match self {
            Loader::Static(def) => Ok(*def),
            Loader::Deferred(resolve) => resolve(location, context).await,
        }
    }
}

impl<T: 'static> Clone for Loader<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: 'static> Copy for Loader<T> {}

impl<T: 'static> std::fmt::Debug for Loader<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Loader::Static(def) => f.debug_tuple("Static").field(&def.name).finish(),
            Loader::Deferred(_) => f.write_str("Deferred"),
        }
    }
}
