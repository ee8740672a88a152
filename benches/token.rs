//! Performance benchmarks for admin token handling.
//!
//! Run with: `cargo bench --bench token`
//!
//! ## Performance Targets
//!
//! | Operation | Target | Notes |
//! |-----------|--------|-------|
//! | Verify | <1ms p99 | HS256 signature + claims |
//! | Issue | <1ms p99 | Credential check + signing |
//! | Credential mismatch | Same as match | Constant-time comparison |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use love_test_service::{AdminCredential, TokenConfig, TokenService};

const USERNAME: &str = "admin";
const PASSWORD: &str = "benchmark_password";

fn make_service() -> TokenService {
    TokenService::new(
        AdminCredential::new(USERNAME, PASSWORD),
        TokenConfig {
            secret: "benchmark_secret_32_bytes_min___".to_string(),
            ..TokenConfig::default()
        },
    )
}

/// Benchmark verification of a valid token.
fn bench_verify(c: &mut Criterion) {
    let service = make_service();
    let token = service.issue(USERNAME, PASSWORD).unwrap().token;

    let mut group = c.benchmark_group("verify");
    group.throughput(Throughput::Elements(1));
    group.bench_function("valid", |b| {
        b.iter(|| service.verify(black_box(Some(token.as_str()))).unwrap())
    });
    group.bench_function("garbage", |b| {
        b.iter(|| service.verify(black_box(Some("not.a.token"))).is_err())
    });
    group.finish();
}

/// Benchmark login, matching and mismatching.
///
/// The mismatch cases should sit close to each other regardless of where
/// the supplied password first differs.
fn bench_issue(c: &mut Criterion) {
    let service = make_service();

    let mut group = c.benchmark_group("issue");
    group.bench_function("match", |b| {
        b.iter(|| service.issue(black_box(USERNAME), black_box(PASSWORD)).unwrap())
    });

    let attempts = [
        ("first_byte", "xenchmark_password".to_string()),
        ("last_byte", "benchmark_passworx".to_string()),
        ("long", "b".repeat(4096)),
    ];
    for (label, attempt) in &attempts {
        group.bench_with_input(BenchmarkId::new("mismatch", label), attempt, |b, attempt| {
            b.iter(|| service.issue(black_box(USERNAME), black_box(attempt)).is_err())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_verify, bench_issue);
criterion_main!(benches);
