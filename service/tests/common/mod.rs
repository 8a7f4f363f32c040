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

//! Shared fixtures for the console integration tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use teleconsole_service::{ConnectionId, ConsoleEvent, ServerConfig, TelnetConsole, Transport};
use teleconsole_telnetcodec::NegotiationScript;
use teleconsole_terminal::{HistoryProvider, NoHistory};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{Instant, timeout};

/// Stored credential for the password `pass`
pub const PASS_CREDENTIAL: &str = "$5$bl0zjwUtt8T2WLJBH5Vadl/Ix6X+cFdJr5td4a0B+n0=$1txXuyLLzAvAMM/jYSlpRScy3nSwvTQ05Mv7At5LiSs=$";

/// Banner produced by [`config`]
pub const BANNER: &str = "\r\nWelcome to rig - 1.0\r\n";

/// Upper bound on ticks in [`poll_until`]
const MAX_TICKS: usize = 500;

pub fn config() -> ServerConfig {
    ServerConfig::new("127.0.0.1:0".parse().unwrap(), PASS_CREDENTIAL)
        .with_device_name("rig")
        .with_firmware_version("1.0")
}

/// Config with a quick handshake for real sockets
pub fn tcp_config() -> ServerConfig {
    config().with_negotiation(
        NegotiationScript::default()
            .with_step_delay(Duration::from_millis(10))
            .with_reply_timeout(Duration::from_secs(5)),
    )
}

pub fn peer(port: u16) -> SocketAddr {
    SocketAddr::from(([192, 168, 4, 2], port))
}

#[derive(Default)]
struct MockState {
    inbound: VecDeque<Vec<u8>>,
    outbound: Vec<u8>,
    hung_up: bool,
    write_limit: Option<usize>,
    fail_writes: bool,
    write_calls: usize,
    closed: bool,
}

/// Scripted in-memory transport.
///
/// Each pushed chunk is returned by exactly one read. Writes accept
/// everything unless a write limit is set; a limit of zero makes the
/// transport permanently unwritable.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        MockTransport::default()
    }

    pub fn boxed(&self) -> Box<dyn Transport> {
        Box::new(self.clone())
    }

    pub fn push_input(&self, bytes: &[u8]) {
        self.state.lock().unwrap().inbound.push_back(bytes.to_vec());
    }

    pub fn hang_up(&self) {
        self.state.lock().unwrap().hung_up = true;
    }

    pub fn set_write_limit(&self, limit: Option<usize>) {
        self.state.lock().unwrap().write_limit = limit;
    }

    pub fn fail_writes(&self) {
        self.state.lock().unwrap().fail_writes = true;
    }

    pub fn take_output(&self) -> Vec<u8> {
        std::mem::take(&mut self.state.lock().unwrap().outbound)
    }

    pub fn take_output_string(&self) -> String {
        String::from_utf8_lossy(&self.take_output()).into_owned()
    }

    pub fn write_calls(&self) -> usize {
        self.state.lock().unwrap().write_calls
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().unwrap().closed
    }
}

impl Transport for MockTransport {
    fn try_read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut state = self.state.lock().unwrap();
        match state.inbound.pop_front() {
            Some(mut chunk) => {
                if chunk.len() > buf.len() {
                    let rest = chunk.split_off(buf.len());
                    state.inbound.push_front(rest);
                }
                buf[..chunk.len()].copy_from_slice(&chunk);
                Ok(chunk.len())
            }
            None if state.hung_up => Ok(0),
            None => Err(io::ErrorKind::WouldBlock.into()),
        }
    }

    fn try_write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.state.lock().unwrap();
        state.write_calls += 1;
        if state.fail_writes {
            return Err(io::ErrorKind::ConnectionReset.into());
        }
        let count = match state.write_limit {
            Some(0) => return Err(io::ErrorKind::WouldBlock.into()),
            Some(limit) => limit.min(buf.len()),
            None => buf.len(),
        };
        state.outbound.extend_from_slice(&buf[..count]);
        Ok(count)
    }

    fn close(&mut self) {
        self.state.lock().unwrap().closed = true;
    }
}

/// Poll until `done` holds for the events seen so far
pub async fn poll_until(
    console: &mut TelnetConsole,
    history: &dyn HistoryProvider,
    done: impl Fn(&[ConsoleEvent]) -> bool,
) -> Vec<ConsoleEvent> {
    let deadline = Instant::now() + Duration::from_secs(20);
    let mut seen = Vec::new();
    for _ in 0..MAX_TICKS {
        if done(&seen) {
            return seen;
        }
        assert!(Instant::now() < deadline, "timed out; events so far: {seen:?}");
        seen.extend(console.poll(history).await.unwrap());
    }
    panic!("condition not reached; events so far: {seen:?}");
}

/// Adopt `transport` and log it in with the right password
pub async fn login(console: &mut TelnetConsole, transport: &MockTransport, port: u16) -> ConnectionId {
    let id = console.adopt(transport.boxed(), peer(port));
    transport.push_input(b"pass\r");
    poll_until(console, &NoHistory, |events| {
        events.contains(&ConsoleEvent::Authenticated { connection: id })
    })
    .await;
    id
}

/// Telnet client speaking just enough protocol to get through the handshake
pub struct TelnetTestClient {
    stream: TcpStream,
}

impl TelnetTestClient {
    pub async fn connect(addr: SocketAddr) -> Self {
        TelnetTestClient {
            stream: TcpStream::connect(addr).await.unwrap(),
        }
    }

    /// Read the three bursts and the prompt, answering the draining bursts
    pub async fn complete_negotiation(&mut self) -> Vec<u8> {
        let mut received = self.read_exact(12).await;
        received.extend(self.read_exact(18).await);
        self.send(&[0xFF, 0xFB, 0x18]).await;
        received.extend(self.read_exact(18).await);
        self.send(&[0xFF, 0xFC, 0x01]).await;
        let prompt = self.read_exact(10).await;
        assert_eq!(prompt, b"Password: ");
        received.extend(prompt);
        received
    }

    pub async fn read_exact(&mut self, count: usize) -> Vec<u8> {
        let mut buf = vec![0u8; count];
        timeout(Duration::from_secs(10), self.stream.read_exact(&mut buf))
            .await
            .expect("read timed out")
            .unwrap();
        buf
    }

    pub async fn send(&mut self, bytes: &[u8]) {
        self.stream.write_all(bytes).await.unwrap();
    }

    /// Read until `needle` shows up, returning everything read
    pub async fn read_until(&mut self, needle: &str) -> String {
        let mut received = Vec::new();
        let mut buf = [0u8; 256];
        while !String::from_utf8_lossy(&received).contains(needle) {
            let count = timeout(Duration::from_secs(10), self.stream.read(&mut buf))
                .await
                .expect("read timed out")
                .unwrap();
            assert!(count > 0, "connection closed before {needle:?}");
            received.extend_from_slice(&buf[..count]);
        }
        String::from_utf8_lossy(&received).into_owned()
    }

    /// Read until the server closes the connection
    pub async fn read_to_close(&mut self) -> Vec<u8> {
        let mut received = Vec::new();
        let mut buf = [0u8; 256];
        loop {
            match timeout(Duration::from_secs(10), self.stream.read(&mut buf))
                .await
                .expect("read timed out")
            {
                Ok(0) | Err(_) => return received,
                Ok(count) => received.extend_from_slice(&buf[..count]),
            }
        }
    }
}
