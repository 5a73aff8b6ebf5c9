//! Per-render environment descriptor.
//!
//! # Data Flow
//! ```text
//! Server:  request parts + Settings → Context::for_server
//!              → preload bag pending until the controller's preload hook ran
//! Client:  hydration payload + Settings → Context::for_client
//!              → preload bag sealed at construction
//!
//! Context (Arc) → Controller → RenderScope → renderer
//! ```
//!
//! # Design Decisions
//! - Environment is an enum: "client" and "server" cannot both be true
//! - Transport handles only exist on the server variant
//! - Context is immutable after handoff; the preload bag is write-once

pub mod builder;
pub mod preload;
pub mod transport;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use preload::{Preload, PreloadBag, PreloadError};
pub use transport::{AbortSignal, ResponseControl, ResponseDirectives, Transport};

/// Application settings shared by server and client contexts.
///
/// Loaded from the `[context]` config section and embedded (minus the
/// server-only fields) in every emitted document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Path prefix the application is mounted under.
    pub basename: String,

    /// Prefix for static asset URLs.
    #[serde(alias = "public_path")]
    pub public_path: String,

    /// Base URL of the REST API as seen by the browser.
    pub restapi: String,

    /// Base URL of the REST API as seen by the server; falls back to `restapi`.
    #[serde(skip_serializing, alias = "server_restapi")]
    pub server_restapi: Option<String>,

    /// Free-form settings handed to controllers untouched.
    pub extra: Map<String, Value>,
}

/// Which side of the isomorphic boundary a render runs on.
#[derive(Debug)]
pub enum Environment {
    Server(Transport),
    Client,
}

/// The environment a controller is constructed with.
#[derive(Debug)]
pub struct Context {
    environment: Environment,
    basename: String,
    public_path: String,
    restapi: String,
    extra: Map<String, Value>,
    preload: PreloadBag,
}

impl Context {
    pub fn is_server(&self) -> bool {
        matches!(self.environment, Environment::Server(_))
    }

    pub fn is_client(&self) -> bool {
        matches!(self.environment, Environment::Client)
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Request/response handles; `None` on the client.
    pub fn transport(&self) -> Option<&Transport> {
        match &self.environment {
            Environment::Server(transport) => Some(transport),
            Environment::Client => None,
        }
    }

    pub fn basename(&self) -> &str {
        &self.basename
    }

    pub fn public_path(&self) -> &str {
        &self.public_path
    }

    pub fn restapi(&self) -> &str {
        &self.restapi
    }

    /// A free-form setting from the `extra` table.
    pub fn setting(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    pub fn preload(&self) -> &PreloadBag {
        &self.preload
    }

    /// The abort signal of the underlying transport, if any.
    pub fn abort_signal(&self) -> Option<&AbortSignal> {
        self.transport().map(Transport::abort_signal)
    }
}
