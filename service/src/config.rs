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

//! Console configuration

use crate::{Result, ServiceError};
use std::net::SocketAddr;
use std::time::Duration;
use teleconsole_credential::{Credential, SHA256_ALGORITHM};
use teleconsole_telnetcodec::NegotiationScript;
use teleconsole_terminal::DEFAULT_ESCAPE_TIMEOUT;

/// Default telnet port
pub const DEFAULT_PORT: u16 = 23;

/// Console configuration
///
/// Use the builder methods to customize the configuration.
///
/// # Example
///
/// ```
/// use teleconsole_service::ServerConfig;
/// use std::time::Duration;
///
/// let config = ServerConfig::new(
///     "127.0.0.1:2323".parse().unwrap(),
///     teleconsole_credential::create("secret"),
/// )
/// .with_max_connections(4)
/// .with_device_name("bench-rig");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the listener to
    pub bind_address: SocketAddr,

    /// Stored credential, `$5$<salt>$<digest>$`
    pub credential: String,

    /// Maximum number of registered connections
    ///
    /// Clients beyond this are closed as soon as they are accepted.
    pub max_connections: usize,

    /// Per-connection transmit buffer cap in bytes
    ///
    /// When a client cannot keep up, only the most recent output is kept.
    pub transmit_buffer_limit: usize,

    /// Largest single read from a connection
    pub read_chunk_size: usize,

    /// Password attempt buffer size; verification triggers once it is exceeded
    pub attempt_limit: usize,

    /// Quiet period after the last input before the poll loop starts sleeping
    pub idle_threshold: Duration,

    /// Sleep taken by an idle tick
    pub idle_sleep: Duration,

    /// Gap after which a partial escape sequence is abandoned
    pub escape_timeout: Duration,

    /// Device name shown in the welcome banner
    pub device_name: String,

    /// Firmware version shown in the welcome banner
    pub firmware_version: String,

    /// Handshake sent to every new client
    pub negotiation: NegotiationScript,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            credential: String::new(),
            max_connections: 8,
            transmit_buffer_limit: 80,
            read_chunk_size: 1024,
            attempt_limit: 64,
            idle_threshold: Duration::from_millis(100),
            idle_sleep: Duration::from_millis(100),
            escape_timeout: DEFAULT_ESCAPE_TIMEOUT,
            device_name: env!("CARGO_PKG_NAME").to_string(),
            firmware_version: env!("CARGO_PKG_VERSION").to_string(),
            negotiation: NegotiationScript::default(),
        }
    }
}

impl ServerConfig {
    /// Create a new configuration with the given bind address and credential
    ///
    /// All other settings will use their default values.
    pub fn new(bind_address: SocketAddr, credential: impl Into<String>) -> Self {
        Self {
            bind_address,
            credential: credential.into(),
            ..Default::default()
        }
    }

    /// Replace the stored credential
    pub fn with_credential(mut self, credential: impl Into<String>) -> Self {
        self.credential = credential.into();
        self
    }

    /// Set the maximum number of registered connections
    pub fn with_max_connections(mut self, max: usize) -> Self {
        self.max_connections = max;
        self
    }

    /// Set the per-connection transmit buffer cap
    pub fn with_transmit_buffer_limit(mut self, limit: usize) -> Self {
        self.transmit_buffer_limit = limit;
        self
    }

    /// Set the read chunk size
    pub fn with_read_chunk_size(mut self, size: usize) -> Self {
        self.read_chunk_size = size;
        self
    }

    /// Set the password attempt buffer size
    pub fn with_attempt_limit(mut self, limit: usize) -> Self {
        self.attempt_limit = limit;
        self
    }

    /// Set the idle threshold and sleep
    pub fn with_idle(mut self, threshold: Duration, sleep: Duration) -> Self {
        self.idle_threshold = threshold;
        self.idle_sleep = sleep;
        self
    }

    /// Set the escape sequence timeout
    pub fn with_escape_timeout(mut self, timeout: Duration) -> Self {
        self.escape_timeout = timeout;
        self
    }

    /// Set the device name shown in the banner
    pub fn with_device_name(mut self, name: impl Into<String>) -> Self {
        self.device_name = name.into();
        self
    }

    /// Set the firmware version shown in the banner
    pub fn with_firmware_version(mut self, version: impl Into<String>) -> Self {
        self.firmware_version = version.into();
        self
    }

    /// Replace the negotiation handshake
    pub fn with_negotiation(mut self, script: NegotiationScript) -> Self {
        self.negotiation = script;
        self
    }

    /// Welcome banner broadcast after a successful login
    pub fn banner(&self) -> String {
        format!(
            "\r\nWelcome to {} - {}\r\n",
            self.device_name, self.firmware_version
        )
    }

    /// Validate the configuration
    ///
    /// Returns an error if the configuration is invalid. A credential using an
    /// algorithm other than salted SHA-256 is accepted with a warning; no
    /// password will ever match it.
    pub fn validate(&self) -> Result<()> {
        let credential: Credential = self
            .credential
            .parse()
            .map_err(|err| ServiceError::InvalidConfig(format!("credential: {err}")))?;
        if credential.algorithm() != SHA256_ALGORITHM {
            tracing::warn!(
                algorithm = credential.algorithm(),
                "Stored credential uses an unsupported algorithm; every login will fail"
            );
        }

        if self.max_connections == 0 {
            return Err(ServiceError::InvalidConfig(
                "max_connections must be greater than 0".to_string(),
            ));
        }

        if self.transmit_buffer_limit == 0 {
            return Err(ServiceError::InvalidConfig(
                "transmit_buffer_limit must be greater than 0".to_string(),
            ));
        }

        if self.read_chunk_size == 0 {
            return Err(ServiceError::InvalidConfig(
                "read_chunk_size must be greater than 0".to_string(),
            ));
        }

        if self.attempt_limit < 2 {
            return Err(ServiceError::InvalidConfig(
                "attempt_limit must be at least 2".to_string(),
            ));
        }

        Ok(())
    }
}
