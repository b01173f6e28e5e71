//! CSRF Token Benchmarks
//!
//! Measures token issuance, cookie verification and full request checks.
//!
//! Run with: cargo bench --bench csrf_benchmarks

use criterion::{Criterion, criterion_group, criterion_main};
use palisade::{CsrfConfig, CsrfMiddleware, HttpRequest, TokenCodec, VerificationEngine};
use std::hint::black_box;

const SECRET: &[u8] = b"benchmark_secret_key_32_bytes!!!";

fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("csrf_codec");

    let codec = TokenCodec::new(&CsrfConfig::new(SECRET.to_vec()).unwrap()).unwrap();

    group.bench_function("issue", |b| b.iter(|| black_box(codec.issue())));

    let raw = codec.generate_raw();
    group.bench_function("sign", |b| b.iter(|| black_box(codec.sign(black_box(&raw)))));

    let signed = codec.sign(&raw);
    group.bench_function("verify", |b| {
        b.iter(|| codec.verify(black_box(signed.as_str())).unwrap())
    });

    group.bench_function("verify/tampered", |b| {
        b.iter(|| codec.verify(black_box("wrongvalue")).unwrap_err())
    });

    group.finish();
}

fn bench_verification(c: &mut Criterion) {
    let mut group = c.benchmark_group("csrf_verification");

    let config = CsrfConfig::new(SECRET.to_vec()).unwrap();
    let engine = VerificationEngine::new(TokenCodec::new(&config).unwrap());
    let raw = engine.codec().generate_raw();
    let signed = engine.codec().sign(&raw);
    let submitted = raw.encode();

    group.bench_function("engine/accepted", |b| {
        b.iter(|| engine.verify(black_box(Some(signed.as_str())), black_box(Some(&submitted))))
    });

    let csrf = CsrfMiddleware::new(config).unwrap();
    let form_request = HttpRequest::new("POST", "/service/form")
        .with_header("Cookie", format!("csrftoken={}", signed))
        .with_header("Content-Type", "application/x-www-form-urlencoded")
        .with_body(format!("name=alice&csrf-token={}", submitted).into_bytes());

    group.bench_function("request/form", |b| {
        b.iter(|| csrf.verify_request(black_box(&form_request)))
    });

    let header_request = HttpRequest::new("POST", "/api/items")
        .with_header("Cookie", format!("csrftoken={}", signed))
        .with_header("X-CSRF-TOKEN", submitted.clone());

    group.bench_function("request/header", |b| {
        b.iter(|| csrf.verify_request(black_box(&header_request)))
    });

    group.finish();
}

criterion_group!(benches, bench_codec, bench_verification);
criterion_main!(benches);
