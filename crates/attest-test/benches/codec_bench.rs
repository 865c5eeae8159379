//! Benchmarks for the fragment codec and content fingerprint

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use attest_crypto::ContentFingerprint;
use attest_state::{AssemblyLimits, ChunkAssembly};
use attest_wire::{compress, decompress, split, Fragment};

fn sample_table(rows: usize) -> Vec<u8> {
    let mut table = String::from("id,name,score,comment\n");
    for i in 0..rows {
        let comment = if i % 3 == 0 { "na" } else { "checked" };
        table.push_str(&format!("{},row{},{},{}\n", i, i, i * 7 % 100, comment));
    }
    table.into_bytes()
}

fn bench_compress(c: &mut Criterion) {
    let mut group = c.benchmark_group("compress");

    for rows in [10, 1_000, 10_000] {
        let table = sample_table(rows);
        group.throughput(Throughput::Bytes(table.len() as u64));
        group.bench_function(format!("{}_rows", rows), |b| {
            b.iter(|| compress(black_box(&table)).unwrap())
        });
    }

    group.finish();
}

fn bench_split_assemble(c: &mut Criterion) {
    let table = sample_table(1_000);
    let fragments = split(&table, 512).unwrap();
    let hex: Vec<String> = fragments.iter().map(Fragment::to_hex).collect();

    c.bench_function("split_1000_rows", |b| {
        b.iter(|| split(black_box(&table), 512).unwrap())
    });

    c.bench_function("assemble_reversed", |b| {
        b.iter(|| {
            let mut parsed = hex.iter().rev().map(|h| Fragment::from_hex(h).unwrap());
            let mut assembly =
                ChunkAssembly::start(parsed.next().unwrap(), AssemblyLimits::default()).unwrap();
            for fragment in parsed {
                assembly.ingest(fragment).unwrap();
            }
            decompress(&assembly.into_payload()).unwrap()
        })
    });
}

fn bench_fingerprint(c: &mut Criterion) {
    let mut group = c.benchmark_group("fingerprint");

    for rows in [10, 10_000] {
        let table = sample_table(rows);
        group.throughput(Throughput::Bytes(table.len() as u64));
        group.bench_function(format!("{}_rows", rows), |b| {
            b.iter(|| ContentFingerprint::compute(black_box(&table)).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_compress, bench_split_assemble, bench_fingerprint);
criterion_main!(benches);
