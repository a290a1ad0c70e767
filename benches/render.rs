//! Benchmarks for the newsletter rendering pipeline.
//!
//! Run with: cargo bench

use criterion::{Criterion, criterion_group, criterion_main};

use mailframe::dom::parse_document;
use mailframe::frame::{FrameConfig, NewsletterFrame};
use mailframe::layout::{NormalizeMode, StaticProbe, normalize};
use mailframe::{build_sanitized_document, repair_encoding, sanitize_html};

const NEWSLETTER: &str = include_str!("../tests/fixtures/newsletter.html");

// ============================================================================
// String Pipeline Benchmarks
// ============================================================================

fn bench_repair_encoding(c: &mut Criterion) {
    c.bench_function("repair_encoding", |b| {
        b.iter(|| repair_encoding(Some(NEWSLETTER)));
    });
}

fn bench_sanitize(c: &mut Criterion) {
    c.bench_function("sanitize_html", |b| {
        b.iter(|| sanitize_html(NEWSLETTER));
    });
}

fn bench_build_document(c: &mut Criterion) {
    let repaired = repair_encoding(Some(NEWSLETTER));
    c.bench_function("build_sanitized_document", |b| {
        b.iter(|| build_sanitized_document(Some(&repaired), false));
    });
}

// ============================================================================
// Layout Benchmarks
// ============================================================================

fn bench_normalize_preview(c: &mut Criterion) {
    let html = build_sanitized_document(Some(&repair_encoding(Some(NEWSLETTER))), false);
    let probe = StaticProbe::new(Some(320.0));
    let mode = NormalizeMode::Preview {
        viewport_width: 320.0,
    };

    c.bench_function("normalize_preview", |b| {
        b.iter(|| {
            let mut dom = parse_document(&html);
            normalize(&mut dom, mode, &probe)
        });
    });
}

fn bench_frame_lifecycle(c: &mut Criterion) {
    c.bench_function("frame_lifecycle", |b| {
        b.iter(|| {
            let mut frame = NewsletterFrame::new(FrameConfig::default());
            frame.write(Some(NEWSLETTER));
            frame.on_load();
            frame.advance(std::time::Duration::from_millis(500));
            frame.passes_run()
        });
    });
}

criterion_group!(
    benches,
    // String pipeline
    bench_repair_encoding,
    bench_sanitize,
    bench_build_document,
    // Layout
    bench_normalize_preview,
    bench_frame_lifecycle,
);
criterion_main!(benches);
