//! Benchmarks for wordlens word operations.
//!
//! Run with: cargo bench
//!
//! These benchmarks cover DOCX loading, paragraph comparison and word
//! formatting at various sizes.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use wordlens::{CompareOptions, MemoryDocument};

#[path = "../tests/common/mod.rs"]
mod common;

/// A package whose paragraphs mix plain and bold runs.
fn mixed_docx(paragraph_count: usize) -> Vec<u8> {
    let body: String = (0..paragraph_count)
        .map(|i| {
            format!(
                concat!(
                    r#"<w:p><w:r><w:t xml:space="preserve">Entry {} keeps </w:t></w:r>"#,
                    r#"<w:r><w:rPr><w:b/></w:rPr><w:t>one</w:t></w:r>"#,
                    r#"<w:r><w:t xml:space="preserve"> emphasized word among the rest.</w:t></w:r></w:p>"#,
                ),
                i
            )
        })
        .collect();
    common::build_docx(&body)
}

fn long_paragraph(words: usize) -> String {
    (0..words)
        .map(|i| format!("word{}", i % 17))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Benchmark DOCX loading at various sizes.
fn bench_docx_loading(c: &mut Criterion) {
    let mut group = c.benchmark_group("docx_loading");

    for para_count in [10, 100, 500, 1000].iter() {
        let data = mixed_docx(*para_count);
        let size = data.len() as u64;

        group.throughput(Throughput::Bytes(size));
        group.bench_with_input(BenchmarkId::new("paragraphs", para_count), &data, |b, data| {
            b.iter(|| {
                let _ = wordlens::DocxDocument::from_bytes(black_box(data.clone()));
            });
        });
    }

    group.finish();
}

/// Benchmark word-by-word paragraph comparison.
fn bench_paragraph_comparison(c: &mut Criterion) {
    let mut group = c.benchmark_group("paragraph_comparison");

    for word_count in [10, 100, 1000].iter() {
        let text = long_paragraph(*word_count);
        group.throughput(Throughput::Elements(*word_count as u64));
        group.bench_with_input(BenchmarkId::new("words", word_count), &text, |b, text| {
            b.iter(|| {
                let mut doc = MemoryDocument::from_texts([text.as_str(), text.as_str()]);
                let _ = wordlens::compare_first_paragraphs(&mut doc, black_box(&CompareOptions::default()));
            });
        });
    }

    group.finish();
}

/// Benchmark formatting a word and saving the package.
fn bench_format_and_save(c: &mut Criterion) {
    let mut group = c.benchmark_group("format_and_save");

    for para_count in [10, 100, 500].iter() {
        let data = mixed_docx(*para_count);

        group.bench_with_input(BenchmarkId::new("paragraphs", para_count), &data, |b, data| {
            b.iter(|| {
                let mut doc = wordlens::DocxDocument::from_bytes(data.clone()).unwrap();
                let first = wordlens::paragraph_at(&mut doc, 1).unwrap();
                wordlens::set_or_cancel_word_bold(&mut doc, first, 2, true).unwrap();
                let _ = black_box(doc.to_bytes());
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_docx_loading,
    bench_paragraph_comparison,
    bench_format_and_save,
);
criterion_main!(benches);
