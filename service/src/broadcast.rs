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

//! Output fan-out to authenticated connections

use crate::{ConnectionId, ConnectionInfo, ConnectionRegistry};
use tracing::{trace, warn};

/// Promote every bare `\n` to `\r\n`, leaving existing `\r\n` pairs alone.
///
/// ```
/// use teleconsole_service::normalize;
///
/// assert_eq!(normalize("a\nb\r\nc"), "a\r\nb\r\nc");
/// ```
pub fn normalize(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\n', "\r\n")
}

/// Result of a broadcast operation
#[derive(Debug, Clone, Default)]
pub struct BroadcastResult {
    /// Authenticated connections the output was queued for
    pub targets: usize,
    /// Bytes the sockets accepted
    pub bytes_sent: usize,
    /// Bytes discarded by the transmit cap
    pub dropped: usize,
    /// Connections torn down because their send failed
    pub failed: Vec<(ConnectionId, String)>,
    /// Snapshots of the torn down connections, highest index first
    pub closed: Vec<ConnectionInfo>,
    /// Whether any connection still has queued output
    pub pending: bool,
}

impl BroadcastResult {
    /// Check if every send succeeded
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }

    /// Fold a later pass into this result
    pub fn merge(&mut self, other: BroadcastResult) {
        self.targets = self.targets.max(other.targets);
        self.bytes_sent += other.bytes_sent;
        self.dropped += other.dropped;
        self.failed.extend(other.failed);
        self.closed.extend(other.closed);
        self.pending = other.pending;
    }
}

impl ConnectionRegistry {
    /// Queue `bytes` for every authenticated connection and try to send.
    ///
    /// Per connection: append, make one non-blocking send, keep the unsent
    /// remainder, then cut the remainder down to the transmit cap by dropping
    /// the oldest bytes. A connection whose send fails is torn down before
    /// this returns. An empty `bytes` only retries queued output.
    pub fn broadcast(&mut self, bytes: &[u8]) -> BroadcastResult {
        let mut result = BroadcastResult::default();
        let mut failed = Vec::new();

        for (index, connection) in self.connections_mut().iter_mut().enumerate() {
            if !connection.is_authenticated() {
                continue;
            }
            result.targets += 1;
            connection.transmit_buffer_mut().push(bytes);

            match connection.send_pending() {
                Ok(sent) => result.bytes_sent += sent,
                Err(err) => {
                    warn!(
                        connection_id = %connection.id(),
                        peer_addr = %connection.peer_addr(),
                        error = %err,
                        "Telnet send failed"
                    );
                    result.failed.push((connection.id(), err.to_string()));
                    failed.push(index);
                    continue;
                }
            }

            let dropped = connection.transmit_buffer_mut().enforce_limit();
            if dropped > 0 {
                trace!(connection_id = %connection.id(), dropped, "Transmit buffer overflow");
                result.dropped += dropped;
            }
            result.pending |= !connection.transmit_buffer().is_empty();
        }

        if result.bytes_sent > 0 {
            self.metrics.bytes_sent(result.bytes_sent as u64);
        }
        if result.dropped > 0 {
            self.metrics.bytes_dropped(result.dropped as u64);
        }
        if !failed.is_empty() {
            for _ in &failed {
                self.metrics.connection_error();
            }
            result.closed = self.remove_all(failed);
        }
        result
    }

    /// Retry queued output until every transmit buffer is empty.
    ///
    /// Yields to the runtime between passes so socket readiness is refreshed.
    /// There is no timeout: a client that never drains keeps this looping.
    pub async fn flush(&mut self) -> BroadcastResult {
        let mut total = BroadcastResult::default();
        loop {
            let pass = self.broadcast(&[]);
            let pending = pass.pending;
            total.merge(pass);
            if !pending {
                return total;
            }
            tokio::task::yield_now().await;
        }
    }
}
