// SPDX-License-Identifier: Apache-2.0

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rsia_kpi_core::validate_batch;
use rsia_kpi_model::{EncodedEvidence, KpiEntry, MasterIndicator, MIME_PNG};

fn bench_validate_batch(c: &mut Criterion) {
    let mut master = Vec::new();
    for employee in 0..200 {
        for indicator in 0..10 {
            master.push(MasterIndicator::new(
                &format!("Employee {employee}"),
                &format!("Indicator {indicator}"),
                if indicator % 3 == 0 { "Fluktuatif" } else { "95%" },
            ));
        }
    }
    let evidence = EncodedEvidence::from_base64("b.png", MIME_PNG, "iVBORw0KGgo=").expect("evidence");
    let entries: Vec<KpiEntry> = (0..10)
        .map(|i| {
            let target = if i % 3 == 0 { "120 units" } else { "95%" };
            KpiEntry::new(&format!("Indicator {i}"), target, "96%", evidence.clone()).expect("entry")
        })
        .collect();

    c.bench_function("validate_batch_10_of_2000", |b| {
        b.iter(|| {
            validate_batch(black_box(&entries), black_box("Employee 199"), black_box(&master))
                .expect("valid batch")
        })
    });
}

criterion_group!(benches, bench_validate_batch);
criterion_main!(benches);
