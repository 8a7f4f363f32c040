//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Connection registry
//!
//! The registry owns the listener and every negotiated connection. It is
//! driven entirely by the console's poll loop:
//! - Accepting at most one pending client per tick and running the handshake
//! - Tracking connections in admission order
//! - Tearing connections down, highest index first
//! - Connection lifecycle metrics

use crate::connection::{Connection, Transport};
use crate::{ConnectionId, ConnectionInfo, Result, ServerConfig, ServerMetrics, ServiceError};
use futures::FutureExt;
use std::net::SocketAddr;
use std::sync::Arc;
use teleconsole_telnetcodec::{NegotiationScript, negotiate};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, instrument, warn};

/// A client taken off the listener that has not been negotiated yet
#[derive(Debug)]
pub struct PendingConnection {
    stream: TcpStream,
    peer_addr: SocketAddr,
}

impl PendingConnection {
    /// Get the peer address
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Take the raw stream, abandoning admission
    pub fn into_stream(self) -> TcpStream {
        self.stream
    }
}

/// Owner of the listener and all negotiated connections.
pub struct ConnectionRegistry {
    listener: Option<TcpListener>,
    connections: Vec<Connection>,
    next_id: u64,
    max_connections: usize,
    transmit_limit: usize,
    negotiation: NegotiationScript,
    pub(crate) metrics: Arc<ServerMetrics>,
}

impl ConnectionRegistry {
    /// Create a registry without a listener
    ///
    /// Connections can only be added with [`ConnectionRegistry::adopt`].
    pub fn new(config: &ServerConfig, metrics: Arc<ServerMetrics>) -> Self {
        ConnectionRegistry {
            listener: None,
            connections: Vec::new(),
            next_id: 1,
            max_connections: config.max_connections,
            transmit_limit: config.transmit_buffer_limit,
            negotiation: config.negotiation.clone(),
            metrics,
        }
    }

    /// Create a registry listening on the configured address
    pub async fn bind(config: &ServerConfig, metrics: Arc<ServerMetrics>) -> Result<Self> {
        let listener = TcpListener::bind(config.bind_address).await?;
        let actual_addr = listener.local_addr()?;
        info!("Telnet console bound to {}", actual_addr);

        let mut registry = ConnectionRegistry::new(config, metrics);
        registry.listener = Some(listener);
        Ok(registry)
    }

    /// Listener address, if bound
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener
            .as_ref()
            .and_then(|listener| listener.local_addr().ok())
    }

    fn next_connection_id(&mut self) -> ConnectionId {
        let id = ConnectionId::new(self.next_id);
        self.next_id += 1;
        id
    }

    /// Take one waiting client off the listener without blocking.
    ///
    /// Accept failures are logged and counted; they never close the listener.
    pub fn try_accept(&mut self) -> Option<PendingConnection> {
        let listener = self.listener.as_ref()?;
        match listener.accept().now_or_never()? {
            Ok((stream, peer_addr)) => {
                debug!(peer_addr = %peer_addr, "Accepted connection");
                Some(PendingConnection { stream, peer_addr })
            }
            Err(err) => {
                warn!("Failed to accept connection: {}", err);
                self.metrics.connection_error();
                None
            }
        }
    }

    /// Run the handshake on a pending client and register it.
    ///
    /// This awaits the full negotiation script, so while it runs no other
    /// connection is served. On any failure the stream is dropped.
    #[instrument(skip_all, fields(peer_addr = %pending.peer_addr))]
    pub async fn admit(&mut self, pending: PendingConnection) -> Result<ConnectionId> {
        let PendingConnection {
            mut stream,
            peer_addr,
        } = pending;

        if self.connections.len() >= self.max_connections {
            warn!(
                "Connection limit reached ({}), rejecting connection from {}",
                self.max_connections, peer_addr
            );
            self.metrics.connection_error();
            return Err(ServiceError::MaxConnectionsReached(self.max_connections));
        }

        if let Err(err) = negotiate(&mut stream, &self.negotiation).await {
            warn!(error = %err, "Telnet negotiation failed");
            self.metrics.negotiation_failure();
            return Err(err.into());
        }

        Ok(self.adopt(Box::new(stream), peer_addr))
    }

    /// Register a transport that needs no handshake.
    ///
    /// The connection limit is not applied.
    pub fn adopt(&mut self, transport: Box<dyn Transport>, peer_addr: SocketAddr) -> ConnectionId {
        let id = self.next_connection_id();
        self.connections
            .push(Connection::new(id, peer_addr, transport, self.transmit_limit));
        self.metrics.connection_opened();
        id
    }

    /// Number of registered connections
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Number of connections past the password prompt
    pub fn authenticated_count(&self) -> usize {
        self.connections
            .iter()
            .filter(|connection| connection.is_authenticated())
            .count()
    }

    /// Registered connections in admission order
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn get(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.iter().find(|connection| connection.id() == id)
    }

    pub fn get_mut(&mut self, id: ConnectionId) -> Option<&mut Connection> {
        self.connections
            .iter_mut()
            .find(|connection| connection.id() == id)
    }

    pub(crate) fn connection_mut(&mut self, index: usize) -> Option<&mut Connection> {
        self.connections.get_mut(index)
    }

    pub(crate) fn connections_mut(&mut self) -> &mut [Connection] {
        &mut self.connections
    }

    /// Snapshot every connection
    pub fn infos(&self) -> Vec<ConnectionInfo> {
        self.connections.iter().map(Connection::info).collect()
    }

    /// Tear down the connections at `indices`.
    ///
    /// Indices refer to the registry as it was before the call. Duplicates are
    /// ignored and removal runs from the highest index down, so one tick can
    /// collect indices and apply them together. Returns the removed
    /// connections, highest index first.
    pub fn remove_all(&mut self, indices: impl IntoIterator<Item = usize>) -> Vec<ConnectionInfo> {
        let mut indices: Vec<usize> = indices
            .into_iter()
            .filter(|index| *index < self.connections.len())
            .collect();
        indices.sort_unstable_by(|a, b| b.cmp(a));
        indices.dedup();

        indices
            .into_iter()
            .map(|index| self.close_at(index))
            .collect()
    }

    /// Tear down one connection by id
    pub fn remove(&mut self, id: ConnectionId) -> Result<ConnectionInfo> {
        let index = self
            .connections
            .iter()
            .position(|connection| connection.id() == id)
            .ok_or(ServiceError::ConnectionNotFound(id))?;
        Ok(self.close_at(index))
    }

    fn close_at(&mut self, index: usize) -> ConnectionInfo {
        let connection = self.connections.remove(index);
        let info = connection.info();
        info!(
            connection_id = %info.id,
            peer_addr = %info.peer_addr,
            "Closed telnet client"
        );
        self.metrics.connection_closed(info.duration());
        connection.close();
        info
    }

    /// Close every connection and the listener
    pub fn shutdown(&mut self) -> Vec<ConnectionInfo> {
        let removed = self.remove_all(0..self.connections.len());
        if self.listener.take().is_some() {
            info!("Telnet console listener closed");
        }
        removed
    }
}

impl std::fmt::Debug for ConnectionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionRegistry")
            .field("local_addr", &self.local_addr())
            .field("connection_count", &self.connections.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use tracing_test::traced_test;

    struct SilentTransport;

    impl Transport for SilentTransport {
        fn try_read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::ErrorKind::WouldBlock.into())
        }

        fn try_write(&mut self, buf: &[u8]) -> io::Result<usize> {
            Ok(buf.len())
        }
    }

    fn registry() -> ConnectionRegistry {
        ConnectionRegistry::new(&ServerConfig::default(), Arc::new(ServerMetrics::new()))
    }

    fn peer(port: u16) -> SocketAddr {
        SocketAddr::from(([10, 0, 0, 1], port))
    }

    #[test]
    fn test_ids_are_never_reused() {
        let mut registry = registry();
        let first = registry.adopt(Box::new(SilentTransport), peer(1));
        registry.remove(first).unwrap();
        let second = registry.adopt(Box::new(SilentTransport), peer(2));
        assert_ne!(first, second);
        assert_eq!(second.as_u64(), first.as_u64() + 1);
    }

    #[test]
    fn test_remove_all_descending_and_deduplicated() {
        let mut registry = registry();
        let ids: Vec<_> = (0..4)
            .map(|port| registry.adopt(Box::new(SilentTransport), peer(port)))
            .collect();

        let removed = registry.remove_all([1, 3, 1, 9]);
        let removed_ids: Vec<_> = removed.iter().map(|info| info.id).collect();
        assert_eq!(removed_ids, vec![ids[3], ids[1]]);

        let remaining: Vec<_> = registry.connections().iter().map(Connection::id).collect();
        assert_eq!(remaining, vec![ids[0], ids[2]]);
        assert_eq!(registry.metrics.active_connections(), 2);
    }

    #[test]
    #[traced_test]
    fn test_close_is_logged() {
        let mut registry = registry();
        let id = registry.adopt(Box::new(SilentTransport), peer(9));
        registry.remove(id).unwrap();
        assert!(logs_contain("Closed telnet client"));
    }

    #[test]
    fn test_remove_unknown() {
        let mut registry = registry();
        let err = registry.remove(ConnectionId::new(77)).unwrap_err();
        assert!(matches!(err, ServiceError::ConnectionNotFound(id) if id.as_u64() == 77));
    }

    #[test]
    fn test_try_accept_without_listener() {
        let mut registry = registry();
        assert!(registry.try_accept().is_none());
        assert!(registry.local_addr().is_none());
    }

    #[test]
    fn test_shutdown_closes_everything() {
        let mut registry = registry();
        registry.adopt(Box::new(SilentTransport), peer(1));
        registry.adopt(Box::new(SilentTransport), peer(2));
        assert_eq!(registry.shutdown().len(), 2);
        assert!(registry.is_empty());
    }
}
