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

//! Registered telnet connections

use crate::types::{AuthState, ConnectionId, ConnectionInfo};
use bytes::{Buf, BytesMut};
use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::time::Instant;
use teleconsole_telnetcodec::{FilteredInput, TelnetInputCodec};
use tokio::net::TcpStream;
use tracing::{debug, info, instrument, trace};

/// Non-blocking byte transport under a connection.
///
/// Both calls must return immediately: `WouldBlock` when no data is ready or
/// the socket cannot accept more, `Ok(0)` from `try_read` at end of stream.
pub trait Transport: Send {
    /// Read whatever is available into `buf`
    fn try_read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Write as much of `buf` as the socket accepts
    fn try_write(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Release the transport. Dropping it must have the same effect.
    fn close(&mut self) {}
}

impl Transport for TcpStream {
    fn try_read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        TcpStream::try_read(self, buf)
    }

    fn try_write(&mut self, buf: &[u8]) -> io::Result<usize> {
        TcpStream::try_write(self, buf)
    }
}

/// Result of one zero-timeout read
#[derive(Debug)]
pub enum ReadOutcome {
    /// `n` bytes were read into the caller's buffer
    Data(usize),
    /// Nothing to read right now
    Idle,
    /// Peer closed the connection
    Closed,
    /// Socket failure; the connection must be torn down
    Failed(io::Error),
}

/// Bounded FIFO of bytes waiting to be sent.
///
/// Once the contents exceed the limit, the oldest bytes are discarded.
#[derive(Debug, Clone)]
pub struct TransmitBuffer {
    buffer: BytesMut,
    limit: usize,
}

impl TransmitBuffer {
    /// Create an empty buffer holding at most `limit` bytes between sends
    pub fn new(limit: usize) -> Self {
        TransmitBuffer {
            buffer: BytesMut::with_capacity(limit),
            limit,
        }
    }

    /// Append bytes to the back of the queue
    pub fn push(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Discard `count` sent bytes from the front
    pub fn consume(&mut self, count: usize) {
        self.buffer.advance(count.min(self.buffer.len()));
    }

    /// Drop the oldest bytes beyond the limit, returning how many were dropped
    pub fn enforce_limit(&mut self) -> usize {
        let excess = self.buffer.len().saturating_sub(self.limit);
        self.buffer.advance(excess);
        excess
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

/// One client that has completed the handshake.
pub struct Connection {
    id: ConnectionId,
    peer_addr: SocketAddr,
    transport: Box<dyn Transport>,
    transmit: TransmitBuffer,
    auth: AuthState,
    input: TelnetInputCodec,
    created_at: Instant,
    last_activity: Instant,
    bytes_sent: u64,
    bytes_received: u64,
}

impl Connection {
    /// Wrap a negotiated transport
    #[instrument(skip(transport), fields(connection_id = %id))]
    pub fn new(
        id: ConnectionId,
        peer_addr: SocketAddr,
        transport: Box<dyn Transport>,
        transmit_limit: usize,
    ) -> Self {
        info!(peer_addr = %peer_addr, "Registering telnet connection");
        let now = Instant::now();
        Connection {
            id,
            peer_addr,
            transport,
            transmit: TransmitBuffer::new(transmit_limit),
            auth: AuthState::default(),
            input: TelnetInputCodec::new(),
            created_at: now,
            last_activity: now,
            bytes_sent: 0,
            bytes_received: 0,
        }
    }

    /// Get the connection ID
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Get the peer address
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Get when the connection was admitted
    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn auth_state(&self) -> &AuthState {
        &self.auth
    }

    pub fn auth_state_mut(&mut self) -> &mut AuthState {
        &mut self.auth
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth.is_authenticated()
    }

    /// Mark the password as accepted
    pub fn set_authenticated(&mut self) {
        debug!(connection_id = %self.id, "Connection authenticated");
        self.auth = AuthState::Authenticated;
    }

    /// Bytes queued for this client
    pub fn pending_output(&self) -> &[u8] {
        self.transmit.as_bytes()
    }

    pub fn transmit_buffer(&self) -> &TransmitBuffer {
        &self.transmit
    }

    pub fn transmit_buffer_mut(&mut self) -> &mut TransmitBuffer {
        &mut self.transmit
    }

    /// One zero-timeout read of at most `buf.len()` bytes
    pub fn read(&mut self, buf: &mut [u8]) -> ReadOutcome {
        match self.transport.try_read(buf) {
            Ok(0) => ReadOutcome::Closed,
            Ok(count) => {
                trace!(connection_id = %self.id, count, "Read from client");
                self.bytes_received += count as u64;
                self.last_activity = Instant::now();
                ReadOutcome::Data(count)
            }
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
                ) =>
            {
                ReadOutcome::Idle
            }
            Err(err) => ReadOutcome::Failed(err),
        }
    }

    /// Strip telnet commands from a chunk read from this connection
    pub fn filter_input(&mut self, chunk: &[u8]) -> FilteredInput {
        self.input.filter(chunk)
    }

    /// Make one non-blocking send attempt of the queued bytes.
    ///
    /// Returns the number of bytes the socket took; the rest stays queued.
    /// Nothing is attempted when the queue is empty.
    pub fn send_pending(&mut self) -> io::Result<usize> {
        if self.transmit.is_empty() {
            return Ok(0);
        }
        let sent = write_nonblocking(self.transport.as_mut(), self.transmit.as_bytes())?;
        self.transmit.consume(sent);
        self.bytes_sent += sent as u64;
        Ok(sent)
    }

    /// Write `bytes` straight to the socket, bypassing the queue
    pub fn send_direct(&mut self, bytes: &[u8]) -> io::Result<usize> {
        let sent = write_nonblocking(self.transport.as_mut(), bytes)?;
        self.bytes_sent += sent as u64;
        Ok(sent)
    }

    /// Close the transport
    pub fn close(mut self) {
        debug!(connection_id = %self.id, peer_addr = %self.peer_addr, "Closing transport");
        self.transport.close();
    }

    /// Get a point-in-time view of the connection
    pub fn info(&self) -> ConnectionInfo {
        ConnectionInfo {
            id: self.id,
            state: self.auth.state(),
            peer_addr: self.peer_addr,
            created_at: self.created_at,
            last_activity: self.last_activity,
            bytes_sent: self.bytes_sent,
            bytes_received: self.bytes_received,
            pending_output: self.transmit.len(),
        }
    }
}

fn write_nonblocking(transport: &mut dyn Transport, bytes: &[u8]) -> io::Result<usize> {
    match transport.try_write(bytes) {
        Err(err) if err.kind() == io::ErrorKind::WouldBlock => Ok(0),
        result => result,
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("peer_addr", &self.peer_addr)
            .field("state", &self.auth.state())
            .field("pending_output", &self.transmit.len())
            .finish_non_exhaustive()
    }
}
