use cloudsmith_check::{ScanResult, Thresholds, VulnerabilitySummary};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn scan_payload(n: usize) -> String {
    let severities = ["Low", "Medium", "High", "Critical", "Unknown"];
    let items: Vec<serde_json::Value> = (0..n)
        .map(|i| {
            serde_json::json!({
                "identifier": format!("scan-{}", i),
                "package": {
                    "identifier": format!("pkg-{}", i % 50),
                    "name": "pkg",
                    "version": "1.0.0"
                },
                "num_vulnerabilities": i % 7,
                "max_severity": severities[i % severities.len()]
            })
        })
        .collect();
    serde_json::Value::Array(items).to_string()
}

fn vulnerability_summary_benchmark(c: &mut Criterion) {
    let payload = scan_payload(500);

    c.bench_function("parse_and_summarise_scans", |b| {
        b.iter(|| {
            let scans: Vec<ScanResult> = serde_json::from_str(black_box(&payload)).unwrap();
            black_box(VulnerabilitySummary::from_scans(&scans));
        })
    });
}

fn threshold_benchmark(c: &mut Criterion) {
    let thresholds = Thresholds::default();
    let samples = vec![0.0, 0.914, 42.0, 79.9, 80.0, 99.99, 100.0, 250.0];

    c.bench_function("evaluate_thresholds", |b| {
        b.iter(|| {
            for pct in &samples {
                black_box(thresholds.evaluate(black_box(*pct)));
            }
        })
    });
}

criterion_group!(benches, vulnerability_summary_benchmark, threshold_benchmark);
criterion_main!(benches);
