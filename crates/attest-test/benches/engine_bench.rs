//! Benchmarks for completeness scoring and claim resolution

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use attest_core::{Address, ClaimId, Timestamp};
use attest_crypto::fingerprint;
use attest_state::{ClaimEngine, TableScorer};

fn sample_table(rows: usize) -> String {
    let mut table = String::from("a,b,c,d\n");
    for i in 0..rows {
        let blank = if i % 4 == 0 { "" } else { "x" };
        table.push_str(&format!("{},NA,{},{}\n", i, blank, i * 3));
    }
    table
}

fn bench_completeness(c: &mut Criterion) {
    let scorer = TableScorer::default();
    let table = sample_table(10_000);

    c.bench_function("completeness_10000_rows", |b| {
        b.iter(|| scorer.completeness(black_box(table.as_bytes())).unwrap())
    });
}

fn bench_claim_cycle(c: &mut Criterion) {
    let table = sample_table(100);
    let id = ClaimId::new(fingerprint(table.as_bytes()).unwrap()).unwrap();
    let value = TableScorer::default().completeness(table.as_bytes()).unwrap();
    let owner = Address::new("0xowner").unwrap();
    let rival = Address::new("0xrival").unwrap();

    c.bench_function("create_dispute_validate", |b| {
        b.iter(|| {
            let mut engine = ClaimEngine::default();
            engine
                .create(id.clone(), value, &owner, Timestamp::ZERO)
                .unwrap();
            engine
                .dispute(&id, &rival, Timestamp::from_secs(1))
                .unwrap();
            black_box(
                engine
                    .validate(&id, &owner, table.as_bytes(), Timestamp::from_secs(2))
                    .unwrap(),
            )
        })
    });
}

criterion_group!(benches, bench_completeness, bench_claim_cycle);
criterion_main!(benches);
