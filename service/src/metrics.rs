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

//! Console metrics
//!
//! Every recording method updates both the in-process atomics read by
//! [`ServerMetrics::snapshot`] and the `metrics` facade, so an exporter
//! installed by the host sees the same numbers.

use metrics::{counter, gauge};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Lock-free console metrics
#[derive(Debug)]
pub struct ServerMetrics {
    // Connection counts
    total_connections: AtomicU64,
    active_connections: AtomicU64,

    // Throughput
    bytes_sent: AtomicU64,
    bytes_received: AtomicU64,
    dropped_bytes: AtomicU64,
    lines_completed: AtomicU64,

    // Authentication
    auth_successes: AtomicU64,
    auth_failures: AtomicU64,

    // Errors
    connection_errors: AtomicU64,
    negotiation_failures: AtomicU64,

    // Timing (stored as nanoseconds)
    total_connection_duration_ns: AtomicU64,

    started_at: Instant,
}

impl Default for ServerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerMetrics {
    /// Create a new metrics instance
    pub fn new() -> Self {
        Self {
            total_connections: AtomicU64::new(0),
            active_connections: AtomicU64::new(0),
            bytes_sent: AtomicU64::new(0),
            bytes_received: AtomicU64::new(0),
            dropped_bytes: AtomicU64::new(0),
            lines_completed: AtomicU64::new(0),
            auth_successes: AtomicU64::new(0),
            auth_failures: AtomicU64::new(0),
            connection_errors: AtomicU64::new(0),
            negotiation_failures: AtomicU64::new(0),
            total_connection_duration_ns: AtomicU64::new(0),
            started_at: Instant::now(),
        }
    }

    // Connection tracking

    /// Record a connection being admitted to the registry
    pub fn connection_opened(&self) {
        self.total_connections.fetch_add(1, Ordering::Relaxed);
        self.active_connections.fetch_add(1, Ordering::Relaxed);
        counter!("teleconsole.connections.total").increment(1);
        gauge!("teleconsole.connections.active").increment(1.0);
    }

    /// Record a registered connection being closed
    pub fn connection_closed(&self, duration: Duration) {
        self.active_connections.fetch_sub(1, Ordering::Relaxed);
        self.total_connection_duration_ns
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
        counter!("teleconsole.connections.closed").increment(1);
        gauge!("teleconsole.connections.active").decrement(1.0);
    }

    /// Get the current number of registered connections
    pub fn active_connections(&self) -> u64 {
        self.active_connections.load(Ordering::Relaxed)
    }

    /// Get the total number of admitted connections
    pub fn total_connections(&self) -> u64 {
        self.total_connections.load(Ordering::Relaxed)
    }

    // Throughput tracking

    /// Record bytes handed to a socket
    pub fn bytes_sent(&self, count: u64) {
        self.bytes_sent.fetch_add(count, Ordering::Relaxed);
        counter!("teleconsole.bytes.sent").increment(count);
    }

    /// Record bytes read from a socket
    pub fn bytes_received(&self, count: u64) {
        self.bytes_received.fetch_add(count, Ordering::Relaxed);
        counter!("teleconsole.bytes.received").increment(count);
    }

    /// Record output discarded by the transmit cap
    pub fn bytes_dropped(&self, count: u64) {
        self.dropped_bytes.fetch_add(count, Ordering::Relaxed);
        counter!("teleconsole.broadcast.dropped_bytes").increment(count);
    }

    /// Record a line handed to the shell
    pub fn line_completed(&self) {
        self.lines_completed.fetch_add(1, Ordering::Relaxed);
    }

    // Authentication

    /// Record an accepted password
    pub fn auth_success(&self) {
        self.auth_successes.fetch_add(1, Ordering::Relaxed);
        counter!("teleconsole.auth.success").increment(1);
    }

    /// Record a rejected password
    pub fn auth_failure(&self) {
        self.auth_failures.fetch_add(1, Ordering::Relaxed);
        counter!("teleconsole.auth.failure").increment(1);
    }

    // Error tracking

    /// Record an accept, read or send failure, or a rejected client
    pub fn connection_error(&self) {
        self.connection_errors.fetch_add(1, Ordering::Relaxed);
        counter!("teleconsole.connections.errors").increment(1);
    }

    /// Record a handshake that timed out or was cut short
    pub fn negotiation_failure(&self) {
        self.negotiation_failures.fetch_add(1, Ordering::Relaxed);
        counter!("teleconsole.connections.negotiation_failures").increment(1);
    }

    // Snapshot

    /// Get a point-in-time view of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_connections: self.total_connections.load(Ordering::Relaxed),
            active_connections: self.active_connections.load(Ordering::Relaxed),
            bytes_sent: self.bytes_sent.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            dropped_bytes: self.dropped_bytes.load(Ordering::Relaxed),
            lines_completed: self.lines_completed.load(Ordering::Relaxed),
            auth_successes: self.auth_successes.load(Ordering::Relaxed),
            auth_failures: self.auth_failures.load(Ordering::Relaxed),
            connection_errors: self.connection_errors.load(Ordering::Relaxed),
            negotiation_failures: self.negotiation_failures.load(Ordering::Relaxed),
            uptime: self.started_at.elapsed(),
            avg_connection_duration: self.average_connection_duration(),
        }
    }

    fn average_connection_duration(&self) -> Duration {
        let closed = self.total_connections.load(Ordering::Relaxed)
            - self.active_connections.load(Ordering::Relaxed);
        if closed == 0 {
            return Duration::ZERO;
        }
        let total_ns = self.total_connection_duration_ns.load(Ordering::Relaxed);
        Duration::from_nanos(total_ns / closed)
    }
}

/// A snapshot of console metrics at a point in time
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    /// Total connections admitted
    pub total_connections: u64,
    /// Currently registered connections
    pub active_connections: u64,
    /// Total bytes sent
    pub bytes_sent: u64,
    /// Total bytes received
    pub bytes_received: u64,
    /// Output dropped by the transmit cap
    pub dropped_bytes: u64,
    /// Lines completed in the editor
    pub lines_completed: u64,
    /// Accepted passwords
    pub auth_successes: u64,
    /// Rejected passwords
    pub auth_failures: u64,
    /// Accept, read and send failures
    pub connection_errors: u64,
    /// Failed handshakes
    pub negotiation_failures: u64,
    /// Time since the metrics were created
    pub uptime: Duration,
    /// Average lifetime of closed connections
    pub avg_connection_duration: Duration,
}

impl MetricsSnapshot {
    /// Calculate bytes per second (sent)
    pub fn bytes_sent_per_sec(&self) -> f64 {
        if self.uptime.is_zero() {
            return 0.0;
        }
        self.bytes_sent as f64 / self.uptime.as_secs_f64()
    }

    /// Calculate bytes per second (received)
    pub fn bytes_received_per_sec(&self) -> f64 {
        if self.uptime.is_zero() {
            return 0.0;
        }
        self.bytes_received as f64 / self.uptime.as_secs_f64()
    }

    /// Calculate total error count
    pub fn total_errors(&self) -> u64 {
        self.connection_errors + self.negotiation_failures + self.auth_failures
    }
}
