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

//! Authenticated Telnet Console
//!
//! Lets any number of telnet clients share one interactive console. New
//! clients are negotiated into character-at-a-time mode, asked for a
//! password, and then all see the same output and drive the same line
//! editor.
//!
//! - Single-threaded and pull-driven: nothing runs unless the host polls
//! - Bounded per-client output buffers; slow clients lose old output
//! - Per-client failures tear down that client only
//! - Lock-free metrics and monitoring
//!
//! # Architecture
//!
//! ```text
//! TelnetConsole ── AuthenticationGate
//!     │         └─ LineEditor
//!     ↓
//! ConnectionRegistry → Connection → Transport (TcpStream)
//! ```
//!
//! # Example
//!
//! ```no_run
//! use teleconsole_service::{ServerConfig, TelnetConsole};
//! use teleconsole_terminal::NoHistory;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::new(
//!         "127.0.0.1:2323".parse()?,
//!         teleconsole_credential::create("secret"),
//!     );
//!     let mut console = TelnetConsole::bind(config).await?;
//!     loop {
//!         for event in console.poll(&NoHistory).await? {
//!             println!("{event:?}");
//!         }
//!     }
//! }
//! ```

mod auth;
mod broadcast;
mod config;
mod connection;
mod error;
mod event;
mod manager;
mod metrics;
mod server;
mod types;

pub use auth::{AuthOutcome, AuthenticationGate, DEFAULT_ATTEMPT_LIMIT, REJECTION};
pub use broadcast::{BroadcastResult, normalize};
pub use config::{DEFAULT_PORT, ServerConfig};
pub use connection::{Connection, ReadOutcome, TransmitBuffer, Transport};
pub use error::{Result, ServiceError};
pub use event::{ConsoleEvent, ConsoleEventKind};
pub use manager::{ConnectionRegistry, PendingConnection};
pub use metrics::{MetricsSnapshot, ServerMetrics};
pub use server::TelnetConsole;
pub use types::{AuthState, ConnectionId, ConnectionInfo, ConnectionState, ServerSnapshot};
