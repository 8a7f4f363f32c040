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

//! Benchmarks for telnet input filtering

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use teleconsole_telnetcodec::{TelnetInputCodec, consts};

fn plain_chunk(size: usize) -> Vec<u8> {
    (0..size).map(|i| b'a' + (i % 26) as u8).collect()
}

fn mixed_chunk(size: usize) -> Vec<u8> {
    let mut chunk = Vec::with_capacity(size);
    while chunk.len() < size {
        chunk.extend_from_slice(b"ls -la");
        chunk.extend_from_slice(&[consts::IAC, consts::WILL, consts::option::NAWS]);
        chunk.extend_from_slice(&[consts::IAC, consts::SB, consts::option::NAWS, 0, 80, 0, 24]);
        chunk.extend_from_slice(&[consts::IAC, consts::SE]);
    }
    chunk
}

fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter");
    for size in [64usize, 256, 1024] {
        group.throughput(Throughput::Bytes(size as u64));
        let plain = plain_chunk(size);
        group.bench_with_input(BenchmarkId::new("plain", size), &plain, |b, chunk| {
            let mut codec = TelnetInputCodec::new();
            b.iter(|| codec.filter(black_box(chunk)));
        });
        let mixed = mixed_chunk(size);
        group.bench_with_input(BenchmarkId::new("mixed", size), &mixed, |b, chunk| {
            let mut codec = TelnetInputCodec::new();
            b.iter(|| codec.filter(black_box(chunk)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_filter);
criterion_main!(benches);
