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

//! Core types for the console service

use enum_kinds::EnumKind;
use std::fmt;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// Unique identifier for a connection (monotonically increasing, never reused)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Create a new connection ID
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the underlying u64 value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Authentication progress of one connection.
///
/// Unauthenticated connections accumulate their password attempt here and
/// receive no broadcast output.
#[derive(Debug, Clone, PartialEq, Eq, EnumKind)]
#[enum_kind(ConnectionState, derive(Hash))]
pub enum AuthState {
    /// Waiting for the password, with the characters typed so far
    Unauthenticated { attempt: String },
    /// Password accepted; the connection shares the console
    Authenticated,
}

impl Default for AuthState {
    fn default() -> Self {
        AuthState::Unauthenticated {
            attempt: String::new(),
        }
    }
}

impl AuthState {
    /// Payload-free view of the state
    pub fn state(&self) -> ConnectionState {
        ConnectionState::from(self)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "unauthenticated"),
            Self::Authenticated => write!(f, "authenticated"),
        }
    }
}

/// Connection information snapshot
#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    /// Connection ID
    pub id: ConnectionId,
    /// Authentication state
    pub state: ConnectionState,
    /// Peer address
    pub peer_addr: SocketAddr,
    /// When the connection was admitted
    pub created_at: Instant,
    /// Last time data arrived from the client
    pub last_activity: Instant,
    /// Total bytes sent
    pub bytes_sent: u64,
    /// Total bytes received
    pub bytes_received: u64,
    /// Bytes waiting in the transmit buffer
    pub pending_output: usize,
}

impl ConnectionInfo {
    /// Get the connection duration
    pub fn duration(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// Get the idle duration
    pub fn idle_duration(&self) -> Duration {
        self.last_activity.elapsed()
    }
}

/// Console snapshot for debug information
#[derive(Debug, Clone)]
pub struct ServerSnapshot {
    /// Number of registered connections
    pub active_connections: usize,
    /// Connections past the password prompt
    pub authenticated_connections: usize,
    /// Total connections admitted since start
    pub total_connections: u64,
    /// Listener address, if the console owns a listener
    pub bind_address: Option<SocketAddr>,
    /// Connection currently driving the line editor
    pub driver: Option<ConnectionId>,
    /// Console uptime
    pub uptime: Duration,
    /// Console start time
    pub started_at: Instant,
}

impl fmt::Display for ServerSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let addr = match self.bind_address {
            Some(addr) => addr.to_string(),
            None => "detached".to_string(),
        };
        write!(
            f,
            "TelnetConsole {{ active: {}, authenticated: {}, total: {}, addr: {}, uptime: {:?} }}",
            self.active_connections,
            self.authenticated_connections,
            self.total_connections,
            addr,
            self.uptime
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id() {
        let id1 = ConnectionId::new(1);
        let id2 = ConnectionId::new(2);

        assert_eq!(id1.as_u64(), 1);
        assert_eq!(id2.as_u64(), 2);
        assert_ne!(id1, id2);
        assert!(id1 < id2);
        assert_eq!(id2.to_string(), "conn-2");
    }

    #[test]
    fn test_auth_state_kind() {
        let waiting = AuthState::default();
        assert_eq!(waiting.state(), ConnectionState::Unauthenticated);
        assert!(!waiting.is_authenticated());
        assert_eq!(AuthState::Authenticated.state(), ConnectionState::Authenticated);
        assert_eq!(ConnectionState::Authenticated.to_string(), "authenticated");
    }

    #[test]
    fn test_snapshot_display() {
        let snapshot = ServerSnapshot {
            active_connections: 2,
            authenticated_connections: 1,
            total_connections: 5,
            bind_address: None,
            driver: None,
            uptime: Duration::from_secs(1),
            started_at: Instant::now(),
        };
        assert!(snapshot.to_string().contains("addr: detached"));
    }
}
