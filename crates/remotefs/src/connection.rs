//! Connection context shared by items.
//!
//! A [`Connection`] bundles the capabilities an item needs: the server
//! descriptor, the transport session and a tracing span identifying the
//! server in every log record. Items hold an `Arc<Connection>`; the
//! transport sits behind a mutex so a session is never driven from two
//! threads at once, while separate connections proceed independently.

use std::fmt;
use std::sync::{Arc, Mutex};

use protocol::ServerDescriptor;
use tracing::Span;

use crate::config::Config;
use crate::error::{ItemError, Result};
use crate::transport::Transport;

pub struct Connection {
    server: ServerDescriptor,
    default_root: String,
    transport: Mutex<Box<dyn Transport>>,
    span: Span,
}

impl Connection {
    /// Create a connection whose items default to the server home directory.
    pub fn new(server: ServerDescriptor, transport: impl Transport + 'static) -> Arc<Self> {
        let root = server.home().to_string();
        Self::with_root(server, root, transport)
    }

    /// Create a connection with an explicit default chroot root.
    pub fn with_root(
        server: ServerDescriptor,
        default_root: impl Into<String>,
        transport: impl Transport + 'static,
    ) -> Arc<Self> {
        let span = tracing::info_span!("remotefs", server = %server);
        Arc::new(Self {
            server,
            default_root: default_root.into(),
            transport: Mutex::new(Box::new(transport)),
            span,
        })
    }

    /// Create a connection from configuration.
    pub fn from_config(config: &Config, transport: impl Transport + 'static) -> Arc<Self> {
        Self::with_root(
            config.server.clone(),
            config.effective_root().to_string(),
            transport,
        )
    }

    pub fn server(&self) -> &ServerDescriptor {
        &self.server
    }

    /// Root used by items constructed without an explicit chroot root.
    pub fn default_root(&self) -> &str {
        &self.default_root
    }

    /// Span every operation on this connection is logged under.
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Run `f` with exclusive access to the transport.
    pub fn with_transport<T>(&self, f: impl FnOnce(&mut dyn Transport) -> T) -> Result<T> {
        let mut transport = self
            .transport
            .lock()
            .map_err(|_| ItemError::ConnectionPoisoned)?;
        Ok(f(&mut **transport))
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("server", &self.server)
            .field("default_root", &self.default_root)
            .finish_non_exhaustive()
    }
}
