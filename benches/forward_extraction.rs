use criterion::{black_box, criterion_group, criterion_main, Criterion};
use forward_tracker::forwards::{forward_sources_from_slice, render_report, SourceCounter};

fn extraction_benchmark(c: &mut Criterion) {
    let log = sample_log(2_000);

    c.bench_function("forward_sources_from_slice_2k", |b| {
        b.iter(|| {
            let sources = forward_sources_from_slice(black_box(&log)).unwrap();
            black_box(sources.len());
        });
    });
}

fn counter_benchmark(c: &mut Criterion) {
    let ids: Vec<i64> = (0..10_000i64).map(|i| 1_000 + (i % 97)).collect();

    c.bench_function("source_counter_most_common", |b| {
        b.iter(|| {
            let mut counter = SourceCounter::new();
            counter.extend(black_box(&ids).iter().copied());
            black_box(counter.most_common().len());
        });
    });
}

fn report_benchmark(c: &mut Criterion) {
    let mut counter = SourceCounter::new();
    counter.extend((0..5_000i64).map(|i| i % 311));

    c.bench_function("render_report_hot_path", |b| {
        b.iter(|| {
            let report = render_report(black_box(&counter));
            black_box(report.len());
        });
    });
}

/// Synthetic channel log where every third message is a channel forward.
fn sample_log(records: usize) -> Vec<u8> {
    let mut log = String::from("[\n");
    for i in 0..records {
        if i > 0 {
            log.push_str(",\n");
        }
        if i % 3 == 0 {
            log.push_str(&format!(
                "{{\"id\": {}, \"date\": \"2023-06-01T12:00:00+00:00\", \"message\": \"fwd\", \
                 \"fwd_from\": {{\"date\": \"2023-05-30T09:00:00+00:00\", \
                 \"from_id\": {{\"_\": \"PeerChannel\", \"channel_id\": {}}}}}}}",
                i,
                1_000 + (i as i64 % 17)
            ));
        } else {
            log.push_str(&format!(
                "{{\"id\": {}, \"date\": \"2023-06-01T12:00:00+00:00\", \"message\": \"plain\"}}",
                i
            ));
        }
    }
    log.push_str("\n]");
    log.into_bytes()
}

criterion_group!(
    forward_extraction,
    extraction_benchmark,
    counter_benchmark,
    report_benchmark
);
criterion_main!(forward_extraction);
