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

//! Error types for the console service

use crate::types::ConnectionId;
use teleconsole_credential::CredentialError;
use teleconsole_telnetcodec::NegotiationError;
use thiserror::Error;

/// Result type for service operations
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Console service error types
#[derive(Debug, Error)]
pub enum ServiceError {
    /// I/O error from the listener or a socket
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Option negotiation with a new client failed
    #[error("Negotiation failed: {0}")]
    Negotiation(#[from] NegotiationError),

    /// The stored credential could not be used
    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),

    /// Connection with the given ID was not found
    #[error("Connection {0} not found")]
    ConnectionNotFound(ConnectionId),

    /// Connection has been closed
    #[error("Connection closed")]
    ConnectionClosed,

    /// Maximum number of connections reached
    #[error("Maximum connections ({0}) reached")]
    MaxConnectionsReached(usize),

    /// Configuration rejected by [`crate::ServerConfig::validate`]
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ServiceError {
    /// Check if the error is recoverable
    ///
    /// Recoverable errors affect a single client; the console keeps serving
    /// everyone else.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ServiceError::Negotiation(_)
                | ServiceError::ConnectionClosed
                | ServiceError::MaxConnectionsReached(_)
                | ServiceError::Io(_)
        )
    }

    /// Check if the error is a connection error
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            ServiceError::ConnectionNotFound(_)
                | ServiceError::ConnectionClosed
                | ServiceError::Negotiation(_)
                | ServiceError::Io(_)
        )
    }
}
