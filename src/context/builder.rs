//! Context construction for both environments.

use crate::context::{Context, Environment, Preload, PreloadBag, Settings, Transport};

impl Context {
    /// Build a server context around a transport.
    ///
    /// The preload bag starts pending; the lifecycle seals it before the
    /// controller's first render.
    pub fn for_server(settings: &Settings, transport: Transport) -> Self {
        let restapi = settings
            .server_restapi
            .clone()
            .filter(|api| !api.is_empty())
            .unwrap_or_else(|| settings.restapi.clone());

        Self {
            environment: Environment::Server(transport),
            basename: settings.basename.clone(),
            public_path: settings.public_path.clone(),
            restapi,
            extra: settings.extra.clone(),
            preload: PreloadBag::pending(),
        }
    }

    /// Build a client context.
    ///
    /// `preload` is the bag recovered from the server document for the first
    /// controller of a page; later navigations pass `None`.
    pub fn for_client(settings: &Settings, preload: Option<Preload>) -> Self {
        Self {
            environment: Environment::Client,
            basename: settings.basename.clone(),
            public_path: settings.public_path.clone(),
            restapi: settings.restapi.clone(),
            extra: settings.extra.clone(),
            preload: PreloadBag::sealed(preload.unwrap_or_default()),
        }
    }
}
