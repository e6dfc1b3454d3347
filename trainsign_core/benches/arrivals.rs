use chrono::{Duration, NaiveDate, NaiveDateTime};
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use trainsign_core::{filter_upcoming, parse_timestamp, to_triple};

fn noon() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .unwrap()
}

// A feed-sized list: a train every 4 minutes for the next two hours,
// half of them carrying an offset suffix.
fn synth_feed(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| {
            let t = noon() + Duration::seconds(i as i64 * 240 - 600);
            if i % 2 == 0 {
                t.format("%Y-%m-%dT%H:%M:%S-04:00").to_string()
            } else {
                t.format("%Y-%m-%dT%H:%M:%S").to_string()
            }
        })
        .collect()
}

pub fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse_timestamp_offset", |b| {
        b.iter(|| parse_timestamp(black_box("2024-01-01T12:15:00-05:00")))
    });
    c.bench_function("parse_timestamp_naive", |b| {
        b.iter(|| parse_timestamp(black_box("2024-01-01T12:15:00")))
    });
}

pub fn bench_filter(c: &mut Criterion) {
    let feed = synth_feed(30);
    c.bench_function("filter_upcoming_30", |b| {
        b.iter(|| {
            let offsets = filter_upcoming(noon(), black_box(&feed)).unwrap_or_default();
            to_triple(&offsets)
        })
    });
}

criterion_group!(benches, bench_parse, bench_filter);
criterion_main!(benches);
