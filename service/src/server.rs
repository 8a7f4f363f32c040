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

//! Telnet console
//!
//! The [`TelnetConsole`] is the main entry point. It owns the connection
//! registry, the password gate and the single line editor shared by every
//! authenticated client, and is advanced one tick at a time by the host.

use crate::auth::{AuthOutcome, AuthenticationGate, REJECTION};
use crate::broadcast::{BroadcastResult, normalize};
use crate::connection::{ReadOutcome, Transport};
use crate::manager::{ConnectionRegistry, PendingConnection};
use crate::{
    AuthState, ConnectionId, ConnectionInfo, ConsoleEvent, MetricsSnapshot, Result, ServerConfig,
    ServerMetrics, ServerSnapshot, ServiceError,
};
use std::net::SocketAddr;
use std::sync::Arc;
use teleconsole_telnetcodec::NegotiationError;
use teleconsole_terminal::{EditorEvent, HistoryProvider, LineEditor, TerminalSize, echo};
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Authenticated, line-edited telnet console
///
/// The console never spawns tasks. The host calls [`TelnetConsole::poll`]
/// whenever it wants input; each call reads every connection once, accepts
/// at most one new client, and sends whatever output has accumulated.
///
/// # Example
///
/// ```no_run
/// use teleconsole_service::{ConsoleEvent, ServerConfig, TelnetConsole};
/// use teleconsole_terminal::{EditorEvent, MemoryHistory};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = ServerConfig::new(
///         "0.0.0.0:2323".parse()?,
///         teleconsole_credential::create("secret"),
///     );
///     let mut console = TelnetConsole::bind(config).await?;
///     let mut history = MemoryHistory::with_capacity(32);
///
///     loop {
///         for event in console.poll(&history).await? {
///             if let ConsoleEvent::Input {
///                 event: EditorEvent::LineCompleted { line },
///                 ..
///             } = event
///             {
///                 console.write(&format!("{line}\n"));
///                 history.push(line);
///             }
///         }
///     }
/// }
/// ```
pub struct TelnetConsole {
    config: ServerConfig,
    registry: ConnectionRegistry,
    gate: AuthenticationGate,
    editor: LineEditor,
    driver: Option<ConnectionId>,
    output: String,
    pending_events: Vec<ConsoleEvent>,
    read_buffer: Vec<u8>,
    last_input: Option<Instant>,
    metrics: Arc<ServerMetrics>,
    started_at: std::time::Instant,
}

impl TelnetConsole {
    /// Create a console listening on the configured address
    pub async fn bind(config: ServerConfig) -> Result<Self> {
        config.validate()?;
        let metrics = Arc::new(ServerMetrics::new());
        let registry = ConnectionRegistry::bind(&config, metrics.clone()).await?;
        Ok(TelnetConsole::with_registry(config, registry, metrics))
    }

    /// Create a console without a listener
    ///
    /// Clients are supplied by the host through [`TelnetConsole::adopt`].
    pub fn detached(config: ServerConfig) -> Result<Self> {
        config.validate()?;
        let metrics = Arc::new(ServerMetrics::new());
        let registry = ConnectionRegistry::new(&config, metrics.clone());
        Ok(TelnetConsole::with_registry(config, registry, metrics))
    }

    fn with_registry(
        config: ServerConfig,
        registry: ConnectionRegistry,
        metrics: Arc<ServerMetrics>,
    ) -> Self {
        TelnetConsole {
            gate: AuthenticationGate::new(config.credential.clone())
                .with_attempt_limit(config.attempt_limit),
            editor: LineEditor::new().with_escape_timeout(config.escape_timeout),
            read_buffer: vec![0; config.read_chunk_size],
            registry,
            driver: None,
            output: String::new(),
            pending_events: Vec::new(),
            last_input: None,
            metrics,
            started_at: std::time::Instant::now(),
            config,
        }
    }

    /// Run one tick.
    ///
    /// 1. Yield to the runtime and expire a stale escape sequence.
    /// 2. Read each connection once, feeding the password gate or the editor.
    /// 3. Tear down connections that closed, failed or were rejected.
    /// 4. Accept and negotiate at most one new client.
    /// 5. Broadcast the echo and notices produced by this tick.
    /// 6. Sleep briefly if the console has been quiet.
    ///
    /// Per-connection failures never surface as errors; they become
    /// [`ConsoleEvent::Disconnected`].
    #[instrument(level = "trace", skip_all)]
    pub async fn poll(&mut self, history: &dyn HistoryProvider) -> Result<Vec<ConsoleEvent>> {
        tokio::task::yield_now().await;
        let mut events = std::mem::take(&mut self.pending_events);
        let now = Instant::now();

        if let Some(event) = self.editor.expire(now.into_std()) {
            if let Some(connection) = self.driver {
                events.push(ConsoleEvent::Input { connection, event });
            }
        }

        let received = self.service_connections(now, history, &mut events);

        if let Some(pending) = self.registry.try_accept() {
            self.accept(pending, &mut events).await;
        }

        let output = normalize(&std::mem::take(&mut self.output));
        let result = self.registry.broadcast(output.as_bytes());
        self.record_failures(&result);
        events.append(&mut self.pending_events);

        let quiet = self
            .last_input
            .is_none_or(|last| now.duration_since(last) > self.config.idle_threshold);
        if !received && quiet {
            tokio::time::sleep(self.config.idle_sleep).await;
        }
        Ok(events)
    }

    fn service_connections(
        &mut self,
        now: Instant,
        history: &dyn HistoryProvider,
        events: &mut Vec<ConsoleEvent>,
    ) -> bool {
        let mut received = false;
        let mut teardown = Vec::new();

        for index in 0..self.registry.len() {
            let Some(connection) = self.registry.connection_mut(index) else {
                break;
            };
            let id = connection.id();
            let peer_addr = connection.peer_addr();

            let count = match connection.read(&mut self.read_buffer) {
                ReadOutcome::Idle => continue,
                ReadOutcome::Data(count) => count,
                ReadOutcome::Closed => {
                    debug!(connection_id = %id, peer_addr = %peer_addr, "Client closed the connection");
                    teardown.push(index);
                    continue;
                }
                ReadOutcome::Failed(err) => {
                    warn!(connection_id = %id, peer_addr = %peer_addr, error = %err, "Read failed");
                    self.metrics.connection_error();
                    queue_notice(
                        &mut self.output,
                        &format!("Handling exceptional condition for {}", peer_addr.ip()),
                    );
                    teardown.push(index);
                    continue;
                }
            };
            self.metrics.bytes_received(count as u64);

            let filtered = connection.filter_input(&self.read_buffer[..count]);
            if let Some(window) = filtered.window_size() {
                let size = TerminalSize::new(usize::from(window.cols), usize::from(window.rows));
                debug!(connection_id = %id, %size, "Window size reported");
                self.editor.set_size(size);
                events.push(ConsoleEvent::Input {
                    connection: id,
                    event: EditorEvent::SizeChanged { size },
                });
            }

            let data = trim_trailing_nuls(&filtered.data);
            if data.is_empty() {
                continue;
            }
            received = true;
            self.last_input = Some(now);
            let text = String::from_utf8_lossy(data);

            let outcome = match connection.auth_state_mut() {
                AuthState::Unauthenticated { attempt } => Some(self.gate.offer(attempt, &text)),
                AuthState::Authenticated => None,
            };

            match outcome {
                None => {
                    self.driver = Some(id);
                    for event in
                        self.editor
                            .process(&text, now.into_std(), history, &mut self.output)
                    {
                        if matches!(event, EditorEvent::LineCompleted { .. }) {
                            self.metrics.line_completed();
                        }
                        events.push(ConsoleEvent::Input {
                            connection: id,
                            event,
                        });
                    }
                }
                Some(AuthOutcome::Pending) => {}
                Some(AuthOutcome::Accepted) => {
                    info!(connection_id = %id, peer_addr = %peer_addr, "Telnet client authenticated");
                    self.metrics.auth_success();
                    connection.set_authenticated();
                    self.output.push_str(&self.config.banner());
                    events.push(ConsoleEvent::Authenticated { connection: id });
                }
                Some(AuthOutcome::Rejected(err)) => {
                    if err.is_configuration_error() {
                        warn!(
                            connection_id = %id,
                            peer_addr = %peer_addr,
                            error = %err,
                            "Stored credential cannot be verified, rejecting login"
                        );
                    } else {
                        info!(connection_id = %id, peer_addr = %peer_addr, "Telnet login rejected");
                    }
                    self.metrics.auth_failure();
                    if let Err(err) = connection.send_direct(REJECTION) {
                        debug!(connection_id = %id, error = %err, "Could not deliver rejection");
                    }
                    teardown.push(index);
                    events.push(ConsoleEvent::AuthenticationFailed { connection: id });
                }
            }
        }

        for info in self.registry.remove_all(teardown) {
            self.forget(&info);
            events.push(ConsoleEvent::Disconnected {
                connection: info.id,
            });
        }
        received
    }

    async fn accept(&mut self, pending: PendingConnection, events: &mut Vec<ConsoleEvent>) {
        let peer_addr = pending.peer_addr();
        queue_notice(
            &mut self.output,
            &format!("Telnet connection from {}", peer_addr.ip()),
        );
        match self.registry.admit(pending).await {
            Ok(connection) => events.push(ConsoleEvent::Connected {
                connection,
                peer_addr,
            }),
            Err(ServiceError::Negotiation(NegotiationError::Timeout { .. })) => queue_notice(
                &mut self.output,
                &format!(
                    "No response from telnet client {} within timeout. Disconnected",
                    peer_addr.ip()
                ),
            ),
            Err(err) => debug!(peer_addr = %peer_addr, error = %err, "Client not admitted"),
        }
    }

    fn forget(&mut self, info: &ConnectionInfo) {
        queue_notice(
            &mut self.output,
            &format!("Closed telnet client {} IP {}", info.id, info.peer_addr.ip()),
        );
        if self.driver == Some(info.id) {
            self.driver = None;
        }
    }

    fn record_failures(&mut self, result: &BroadcastResult) {
        for (_, reason) in &result.failed {
            queue_notice(
                &mut self.output,
                &format!("Telnet socket send exception: {reason}"),
            );
        }
        for info in &result.closed {
            self.forget(info);
            self.pending_events
                .push(ConsoleEvent::Disconnected { connection: info.id });
        }
    }

    /// Register a transport that needs no handshake
    pub fn adopt(&mut self, transport: Box<dyn Transport>, peer_addr: SocketAddr) -> ConnectionId {
        let connection = self.registry.adopt(transport, peer_addr);
        self.pending_events.push(ConsoleEvent::Connected {
            connection,
            peer_addr,
        });
        connection
    }

    /// Broadcast `text` to every authenticated client, promoting `\n` to `\r\n`
    pub fn write(&mut self, text: &str) -> BroadcastResult {
        let mut payload = normalize(&std::mem::take(&mut self.output));
        payload.push_str(&normalize(text));
        let result = self.registry.broadcast(payload.as_bytes());
        self.record_failures(&result);
        result
    }

    /// Broadcast raw output bytes, decoded lossily. Returns `bytes.len()`.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> usize {
        self.write(&String::from_utf8_lossy(bytes));
        bytes.len()
    }

    /// Send `text` to one authenticated client only.
    ///
    /// # Errors
    ///
    /// [`ServiceError::ConnectionNotFound`] for an unknown or unauthenticated
    /// connection, [`ServiceError::ConnectionClosed`] when the send fails and
    /// the connection is torn down.
    pub fn write_to(&mut self, id: ConnectionId, text: &str) -> Result<()> {
        let connection = self
            .registry
            .get_mut(id)
            .filter(|connection| connection.is_authenticated())
            .ok_or(ServiceError::ConnectionNotFound(id))?;
        connection
            .transmit_buffer_mut()
            .push(normalize(text).as_bytes());
        match connection.send_pending() {
            Ok(sent) => {
                let dropped = connection.transmit_buffer_mut().enforce_limit();
                self.metrics.bytes_sent(sent as u64);
                if dropped > 0 {
                    self.metrics.bytes_dropped(dropped as u64);
                }
                Ok(())
            }
            Err(err) => {
                warn!(connection_id = %id, error = %err, "Telnet send failed");
                self.metrics.connection_error();
                let info = self.registry.remove(id)?;
                self.forget(&info);
                self.pending_events
                    .push(ConsoleEvent::Disconnected { connection: id });
                Err(ServiceError::ConnectionClosed)
            }
        }
    }

    /// Log `message` and show it to every authenticated client as an overlay
    /// in the top-left corner of the screen
    pub fn notice(&mut self, message: &str) -> BroadcastResult {
        queue_notice(&mut self.output, message);
        self.write("")
    }

    /// Send everything queued, waiting until every client has taken it
    pub async fn flush(&mut self) -> BroadcastResult {
        let mut result = self.write("");
        let flushed = self.registry.flush().await;
        self.record_failures(&flushed);
        result.merge(flushed);
        result
    }

    /// Replace the line being edited, e.g. with a history entry chosen by the
    /// shell. The redraw goes out with the next tick.
    pub fn replace_line(&mut self, text: &str) {
        self.editor.replace_line(text, &mut self.output);
    }

    /// Disconnect one client
    pub fn disconnect(&mut self, id: ConnectionId) -> Result<()> {
        let info = self.registry.remove(id)?;
        self.forget(&info);
        self.pending_events
            .push(ConsoleEvent::Disconnected { connection: id });
        Ok(())
    }

    /// Replace the stored credential for future logins
    pub fn set_credential(&mut self, credential: &str) -> Result<()> {
        self.gate.set_credential(credential)?;
        self.config.credential = credential.to_string();
        Ok(())
    }

    /// Close every connection and the listener
    pub fn shutdown(&mut self) {
        info!("Shutting down telnet console");
        self.registry.shutdown();
        self.driver = None;
        self.output.clear();
    }

    /// Connection whose keystrokes the editor is currently handling
    pub fn driver(&self) -> Option<ConnectionId> {
        self.driver
    }

    /// Shared line editor
    pub fn editor(&self) -> &LineEditor {
        &self.editor
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Listener address, if bound
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.registry.local_addr()
    }

    /// Get the number of registered connections
    pub fn connection_count(&self) -> usize {
        self.registry.len()
    }

    /// Get information about every connection
    pub fn connections(&self) -> Vec<ConnectionInfo> {
        self.registry.infos()
    }

    /// Get a snapshot of the console state
    pub fn snapshot(&self) -> ServerSnapshot {
        ServerSnapshot {
            active_connections: self.registry.len(),
            authenticated_connections: self.registry.authenticated_count(),
            total_connections: self.metrics.total_connections(),
            bind_address: self.registry.local_addr(),
            driver: self.driver,
            uptime: self.started_at.elapsed(),
            started_at: self.started_at,
        }
    }

    /// Get a snapshot of the console metrics
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

impl std::fmt::Debug for TelnetConsole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelnetConsole")
            .field("registry", &self.registry)
            .field("driver", &self.driver)
            .field("line", &self.editor.line())
            .finish_non_exhaustive()
    }
}

/// Log an operator notice and queue its overlay
fn queue_notice(output: &mut String, message: &str) {
    info!("{}", message);
    output.push_str(&echo::overlay(message));
}

fn trim_trailing_nuls(data: &[u8]) -> &[u8] {
    let end = data
        .iter()
        .rposition(|byte| *byte != 0)
        .map_or(0, |last| last + 1);
    &data[..end]
}
