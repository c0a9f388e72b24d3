//! Live connection handle returned by a successful connect.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::config::ConnectionConfig;
use crate::transport::Transport;

/// Opaque handle to an established connection
///
/// Handles are cheap to clone. Two handles compare equal only when they are
/// clones of the same established connection; a reconnect after `disconnect`
/// yields a handle that is not equal to the old one even if the configuration
/// is identical.
#[derive(Clone)]
pub struct ConnectionHandle {
    inner: Arc<HandleInner>,
}

struct HandleInner {
    id: Uuid,
    alias: String,
    config: ConnectionConfig,
    connected_at: DateTime<Utc>,
    transport: Box<dyn Transport>,
}

impl ConnectionHandle {
    pub(crate) fn new(
        alias: String,
        config: ConnectionConfig,
        transport: Box<dyn Transport>,
    ) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                id: Uuid::new_v4(),
                alias,
                config,
                connected_at: Utc::now(),
                transport,
            }),
        }
    }

    /// Unique identifier of this connection
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// Alias the connection was established for
    #[must_use]
    pub fn alias(&self) -> &str {
        &self.inner.alias
    }

    /// Configuration the connection was established with
    #[must_use]
    pub fn config(&self) -> &ConnectionConfig {
        &self.inner.config
    }

    /// Time the connection was established
    #[must_use]
    pub fn connected_at(&self) -> DateTime<Utc> {
        self.inner.connected_at
    }

    /// Address of the remote peer, as reported by the transport
    #[must_use]
    pub fn peer(&self) -> String {
        self.inner.transport.peer()
    }

    /// Returns true if the underlying transport has not been closed
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.inner.transport.is_open()
    }

    pub(crate) fn close(&self) {
        self.inner.transport.close();
    }
}

impl PartialEq for ConnectionHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for ConnectionHandle {}

impl fmt::Debug for ConnectionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionHandle")
            .field("id", &self.inner.id)
            .field("alias", &self.inner.alias)
            .field("config", &self.inner.config)
            .field("connected_at", &self.inner.connected_at)
            .field("transport", &self.inner.transport)
            .finish()
    }
}
