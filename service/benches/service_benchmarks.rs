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

//! Benchmarks for console output and login handling

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use teleconsole_service::{
    AuthenticationGate, ConnectionRegistry, ServerConfig, ServerMetrics, Transport, normalize,
};
use tokio::runtime::Runtime;

/// Transport that accepts every write and never has input
struct SinkTransport;

impl Transport for SinkTransport {
    fn try_read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::ErrorKind::WouldBlock.into())
    }

    fn try_write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(buf.len())
    }
}

/// Transport that takes two bytes per write
struct TrickleTransport;

impl Transport for TrickleTransport {
    fn try_read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::ErrorKind::WouldBlock.into())
    }

    fn try_write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(buf.len().min(2))
    }
}

fn registry_with(count: usize, transport: fn() -> Box<dyn Transport>) -> ConnectionRegistry {
    let mut registry =
        ConnectionRegistry::new(&ServerConfig::default(), Arc::new(ServerMetrics::new()));
    for port in 0..count {
        let id = registry.adopt(transport(), SocketAddr::from(([127, 0, 0, 1], port as u16)));
        if let Some(connection) = registry.get_mut(id) {
            connection.set_authenticated();
        }
    }
    registry
}

// ===== Output Benchmarks =====

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");
    let text = "status: ok\nuptime: 12d\r\nload: 0.1\n".repeat(8);
    group.throughput(Throughput::Bytes(text.len() as u64));
    group.bench_function("mixed_line_endings", |b| {
        b.iter(|| black_box(normalize(black_box(&text))))
    });
    group.finish();
}

fn bench_broadcast(c: &mut Criterion) {
    let mut group = c.benchmark_group("broadcast");
    let payload = b"temperature=21.5C humidity=40%\r\n";

    for clients in [1usize, 4, 8] {
        group.throughput(Throughput::Bytes((payload.len() * clients) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(clients), &clients, |b, &clients| {
            let mut registry = registry_with(clients, || Box::new(SinkTransport));
            b.iter(|| black_box(registry.broadcast(black_box(payload))));
        });
    }

    group.finish();
}

fn bench_flush(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("flush");

    group.bench_function("trickle_80_bytes", |b| {
        b.to_async(&rt).iter(|| async {
            let mut registry = registry_with(1, || Box::new(TrickleTransport));
            registry.broadcast(&[b'x'; 80]);
            black_box(registry.flush().await)
        });
    });

    group.finish();
}

// ===== Login Benchmarks =====

fn bench_login(c: &mut Criterion) {
    let mut group = c.benchmark_group("login");
    let gate = AuthenticationGate::new(teleconsole_credential::create("correct horse"));

    group.bench_function("accepted", |b| {
        b.iter(|| {
            let mut attempt = String::new();
            black_box(gate.offer(&mut attempt, black_box("correct horse\r")))
        })
    });

    group.bench_function("pending", |b| {
        b.iter(|| {
            let mut attempt = String::new();
            black_box(gate.offer(&mut attempt, black_box("correct")))
        })
    });

    group.finish();
}

criterion_group!(benches, bench_normalize, bench_broadcast, bench_flush, bench_login);
criterion_main!(benches);
